mod cli;
mod commands;
mod infra;
mod routes;
mod server;

use cp_checklist::error::AppError;

pub async fn run() -> Result<(), AppError> {
    cli::run().await
}
