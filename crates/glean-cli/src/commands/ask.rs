//! Ask command implementation.

use crate::cli::AskArgs;
use crate::commands::open_document;
use crate::config::Config;
use crate::error::{CliError, Result};
use crate::loader::load_document;
use crate::output::Formatter;

/// Execute the ask command.
pub async fn execute_ask(args: AskArgs, config: &Config, formatter: &Formatter) -> Result<()> {
    let question = args.question.join(" ");
    if question.trim().is_empty() {
        return Err(CliError::InvalidInput("Question must not be empty".to_string()));
    }

    let loaded = load_document(&args.input)?;

    let mut service_config = config.service_config();
    if let Some(top_k) = args.top_k {
        service_config.pipeline.top_k = top_k;
    }

    let (service, id) = open_document(config.provider(), &service_config, &loaded).await?;
    let answer = service.ask(&id, &question).await?;

    println!("{}", formatter.format_answer(&answer)?);
    Ok(())
}
