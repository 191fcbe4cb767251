//! Extract command implementation.

use crate::cli::ExtractArgs;
use crate::commands::open_document;
use crate::config::Config;
use crate::error::Result;
use crate::loader::load_document;
use crate::output::Formatter;

/// Execute the extract command.
pub async fn execute_extract(args: ExtractArgs, config: &Config, formatter: &Formatter) -> Result<()> {
    let loaded = load_document(&args.input)?;

    let mut service_config = config.service_config();
    if let Some(max_chunks) = args.max_chunks {
        service_config.pipeline.max_chunks = max_chunks;
    }

    let (service, id) = open_document(config.provider(), &service_config, &loaded).await?;
    let payload = service.extract(&id).await?;

    println!("{}", formatter.format_extraction(&payload)?);
    Ok(())
}
