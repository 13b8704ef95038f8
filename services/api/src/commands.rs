use chrono::{DateTime, Local};
use clap::Args;
use cp_checklist::config::AppConfig;
use cp_checklist::error::AppError;
use cp_checklist::workflows::checklist::{
    validate, ChecklistRenderer, ChecklistServiceError, ChecklistSubmission,
    PropertyRecipientMap, RenderedDocument,
};
use std::path::{Path, PathBuf};

#[derive(Args, Debug)]
pub(crate) struct RenderArgs {
    /// Checklist submission as JSON, using the same field names as the web form
    #[arg(long)]
    pub(crate) input: PathBuf,
    /// Where to write the rendered PDF
    #[arg(long)]
    pub(crate) output: PathBuf,
}

#[derive(Args, Debug, Default)]
pub(crate) struct RecipientsArgs {
    /// Resolve a single property instead of listing the table
    #[arg(long)]
    pub(crate) property: Option<String>,
}

pub(crate) async fn run_render(args: RenderArgs) -> Result<(), AppError> {
    let document = render_file(&args.input, &args.output, Local::now()).await?;
    let business = document
        .layout
        .text_lines()
        .into_iter()
        .find(|line| line.starts_with("Business Name:"))
        .unwrap_or_default();

    println!("Checklist rendered");
    println!("- {business}");
    println!(
        "- {} page(s), {} bytes -> {}",
        document.page_count,
        document.bytes.len(),
        args.output.display()
    );
    println!("- {}", document.layout.footer);
    Ok(())
}

pub(crate) async fn render_file(
    input: &Path,
    output: &Path,
    generated_at: DateTime<Local>,
) -> Result<RenderedDocument, AppError> {
    let raw = tokio::fs::read(input).await?;
    let submission: ChecklistSubmission = serde_json::from_slice(&raw)?;
    validate(&submission).map_err(ChecklistServiceError::Rejected)?;

    let document = ChecklistRenderer.render(&submission, generated_at)?;
    if let Some(parent) = output.parent().filter(|dir| !dir.as_os_str().is_empty()) {
        tokio::fs::create_dir_all(parent).await?;
    }
    tokio::fs::write(output, &document.bytes).await?;
    Ok(document)
}

pub(crate) fn run_recipients(args: RecipientsArgs) -> Result<(), AppError> {
    let config = AppConfig::load()?;
    for line in describe_recipients(&config.recipients, args.property.as_deref()) {
        println!("{line}");
    }
    Ok(())
}

pub(crate) fn describe_recipients(
    recipients: &PropertyRecipientMap,
    property: Option<&str>,
) -> Vec<String> {
    if let Some(property) = property {
        let mapped = recipients.lookup(property).is_some();
        let address = recipients.resolve(Some(property));
        let note = if mapped { "" } else { " (default)" };
        return vec![format!("{property} -> {address}{note}")];
    }

    let mut lines = vec!["Property recipients".to_string()];
    lines.extend(
        recipients
            .entries()
            .iter()
            .map(|(property, address)| format!("- {property}: {address}")),
    );
    lines.push(format!("- (any other): {}", recipients.default_recipient()));
    lines
}
