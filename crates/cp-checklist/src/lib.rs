//! Commercial property inspection checklists: intake, PDF rendering, and delivery.

pub mod config;
pub mod error;
pub mod telemetry;
pub mod workflows;
