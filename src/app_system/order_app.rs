use std::sync::Arc;

use tokio::task::JoinHandle;
use tracing::{error, info};

use super::Config;
use crate::api::OrderApi;
use crate::clients::OrderViewClient;
use crate::error::ViewError;
use crate::order_view::OrderViewService;
use crate::session::Session;

/// Starts the order view for a logged-in session and tears it down again.
pub struct OrderApp {
    pub view: OrderViewClient,
    pub session: Session,
    handle: JoinHandle<()>,
}

impl OrderApp {
    /// Spawns the view service and loads the initial orders.
    ///
    /// A failed initial load is not fatal: the error is already in the view
    /// state and the caller may reload.
    pub async fn start<A: OrderApi>(api: Arc<A>, session: Session, config: &Config) -> Self {
        info!(user_id = session.user.id, is_admin = session.is_admin, "Starting order view");

        let (service, view) = OrderViewService::new(api, session.clone(), config.view_settings());
        let handle = tokio::spawn(service.run());

        if let Err(e) = view.reload().await {
            error!(error = %e, "Initial order load failed");
        }

        Self {
            view,
            session,
            handle,
        }
    }

    pub async fn shutdown(self) -> Result<(), ViewError> {
        info!("Shutting down order view...");
        self.view.shutdown().await?;

        if let Err(e) = self.handle.await {
            error!("Order view task failed: {:?}", e);
            return Err(ViewError::ServiceClosed(format!("Order view task failed: {e}")));
        }

        info!("Order view shutdown complete.");
        Ok(())
    }
}
