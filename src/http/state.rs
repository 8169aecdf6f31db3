use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::RwLock;

use crate::config::Config;
use crate::session::SessionCounters;
use crate::translit::Transliterator;
use crate::upstream::UpstreamConnector;

/// Shared application state for HTTP and WebSocket handlers
#[derive(Clone)]
pub struct AppState {
    /// Service configuration
    pub config: Arc<Config>,

    /// Process-wide transliteration engine, loaded once at startup
    pub translit: Arc<Transliterator>,

    /// Opens upstream recognition sessions
    pub connector: Arc<dyn UpstreamConnector>,

    /// Live sessions (session_id → counters)
    pub sessions: Arc<RwLock<HashMap<String, Arc<SessionCounters>>>>,
}

impl AppState {
    pub fn new(
        config: Config,
        translit: Transliterator,
        connector: Arc<dyn UpstreamConnector>,
    ) -> Self {
        Self {
            config: Arc::new(config),
            translit: Arc::new(translit),
            connector,
            sessions: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    /// Make a session visible to the introspection endpoints.
    pub async fn register_session(&self, counters: Arc<SessionCounters>) {
        let mut sessions = self.sessions.write().await;
        sessions.insert(counters.session_id().to_string(), counters);
    }

    /// Drop a finished session from introspection.
    pub async fn remove_session(&self, session_id: &str) {
        let mut sessions = self.sessions.write().await;
        sessions.remove(session_id);
    }
}
