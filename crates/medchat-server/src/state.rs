//! Shared application state.

use std::sync::Arc;

use medchat_core::{InferenceGateway, SessionLog};

/// State handed to every handler.
///
/// Holds the single gateway instance built at startup; the session log is
/// reached through it so there is exactly one writer.
#[derive(Clone)]
pub struct AppState {
    /// The inference gateway
    pub gateway: Arc<InferenceGateway>,
}

impl AppState {
    /// Wrap a gateway
    pub fn new(gateway: InferenceGateway) -> Self {
        Self {
            gateway: Arc::new(gateway),
        }
    }

    /// The session log the gateway records into
    #[must_use]
    pub fn session_log(&self) -> &Arc<SessionLog> {
        self.gateway.session_log()
    }
}
