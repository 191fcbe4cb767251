//! Command implementations.

pub mod ask;
pub mod chunks;
pub mod config;
pub mod extract;
pub mod process;

pub use self::ask::execute_ask;
pub use self::chunks::execute_chunks;
pub use self::config::execute_config;
pub use self::extract::execute_extract;
pub use self::process::execute_process;

use crate::error::Result;
use crate::loader::LoadedDocument;
use glean_domain::{DocumentId, LlmProvider};
use glean_service::{DocumentService, InMemoryRegistry, ServiceConfig};
use std::fmt::Display;

/// Service holding one uploaded document
pub type DocumentSession<L> = DocumentService<L, InMemoryRegistry>;

/// Register `loaded` with a fresh in-memory service.
pub async fn open_document<L>(
    llm: L,
    service_config: &ServiceConfig,
    loaded: &LoadedDocument,
) -> Result<(DocumentSession<L>, DocumentId)>
where
    L: LlmProvider + Send + Sync + 'static,
    L::Error: Display,
{
    let service = DocumentService::from_config(llm, InMemoryRegistry::new(), service_config)?;
    let summary = service.upload(&loaded.filename, &loaded.text).await?;
    Ok((service, summary.id))
}
