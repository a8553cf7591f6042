//! Collections that a form controller reloads after a successful change.

use crate::catalog::{DeletePolicy, EntityProfile};
use crate::error::GatewayError;
use crate::gateway::RecordGateway;
use crate::view::TableView;
use async_trait::async_trait;
use tracing::{info, warn};

/// Capability set handed to the form controller when it opens.
#[async_trait]
pub trait Collection: Send + Sync {
    /// Table name used for every gateway call.
    fn name(&self) -> &str;

    fn delete_policy(&self) -> DeletePolicy;

    async fn reload(&mut self, gateway: &dyn RecordGateway) -> Result<(), GatewayError>;
}

/// One table's records and view state.
#[derive(Debug, Clone)]
pub struct RecordCollection {
    pub profile: EntityProfile,
    pub view: TableView,
}

impl RecordCollection {
    pub fn new(profile: EntityProfile, page_size: usize) -> Self {
        let view = TableView::new(profile.search.clone(), page_size);
        Self { profile, view }
    }

    pub fn with_reset_page_on_sort(mut self, reset: bool) -> Self {
        self.view = self.view.with_reset_page_on_sort(reset);
        self
    }
}

#[async_trait]
impl Collection for RecordCollection {
    fn name(&self) -> &str {
        &self.profile.table
    }

    fn delete_policy(&self) -> DeletePolicy {
        self.profile.delete_policy
    }

    /// A failed reload keeps the previous rows and records the reason.
    async fn reload(&mut self, gateway: &dyn RecordGateway) -> Result<(), GatewayError> {
        self.view.begin_loading();
        match gateway.list(&self.profile.table).await {
            Ok(records) => {
                info!(table = %self.profile.table, count = records.len(), "Collection reloaded");
                self.view.load(records);
                Ok(())
            }
            Err(err) => {
                warn!(table = %self.profile.table, error = %err, "Collection reload failed");
                self.view.fail(err.user_message());
                Err(err)
            }
        }
    }
}
