//! Clients for the remote systems this tool administers.
//!
//! Each service sits behind a trait so the batch operations can run against
//! in-memory fakes in tests.

pub mod http;
pub mod repository;
pub mod search;
pub mod workflow;

pub use http::ServiceError;
pub use repository::{FedoraRepository, ObjectRepository};
pub use search::{druids_by_source_id, SearchIndex, SolrIndex};
pub use workflow::{HttpWorkflowService, WorkflowService};

use crate::config::DorConfig;
use std::sync::Arc;

/// The service clients a command needs, built once from configuration
#[derive(Clone)]
pub struct Services {
    pub workflow: Arc<dyn WorkflowService>,
    pub repository: Arc<dyn ObjectRepository>,
    pub search: Arc<dyn SearchIndex>,
    /// Repository name passed to the workflow service
    pub repo: String,
}

impl Services {
    pub fn from_config(config: &DorConfig) -> Result<Self, ServiceError> {
        let repository = FedoraRepository::new(&config.fedora.url, &config.dor_services.url)?
            .with_credentials(config.fedora.user.clone(), config.fedora.password.clone());

        Ok(Self {
            workflow: Arc::new(HttpWorkflowService::new(&config.workflow.url)?),
            repository: Arc::new(repository),
            search: Arc::new(SolrIndex::new(&config.solr.url)?),
            repo: config.workflow.repository.clone(),
        })
    }
}
