use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use uuid::Uuid;

use copydesk_core::events::EventBus;
use copydesk_core::reviser::Reviser;
use copydesk_core::store::Store;
use copydesk_core::workflow::RevisionSession;

use crate::config::AppConfig;

/// Shared application state, passed to all handlers via Axum's `State`
/// extractor. Wrapped in `Arc` so cloning is cheap.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<InnerState>,
}

struct InnerState {
    store: Arc<dyn Store>,
    config: AppConfig,
    event_bus: EventBus,
    reviser: Arc<dyn Reviser>,
    /// One revision session per article; created lazily and kept for the
    /// process lifetime so the single-flight guard holds across requests.
    sessions: RwLock<HashMap<Uuid, Arc<RevisionSession>>>,
}

impl AppState {
    pub fn new(
        store: Arc<dyn Store>,
        config: AppConfig,
        event_bus: EventBus,
        reviser: Arc<dyn Reviser>,
    ) -> Self {
        Self {
            inner: Arc::new(InnerState {
                store,
                config,
                event_bus,
                reviser,
                sessions: RwLock::new(HashMap::new()),
            }),
        }
    }

    pub fn store(&self) -> &Arc<dyn Store> {
        &self.inner.store
    }

    #[allow(dead_code)]
    pub fn config(&self) -> &AppConfig {
        &self.inner.config
    }

    pub fn event_bus(&self) -> &EventBus {
        &self.inner.event_bus
    }

    /// Fetch or create the revision session for an article.
    pub fn session_for(&self, article_id: Uuid) -> Arc<RevisionSession> {
        let mut sessions = self
            .inner
            .sessions
            .write()
            .expect("session registry lock poisoned");
        sessions
            .entry(article_id)
            .or_insert_with(|| {
                Arc::new(RevisionSession::new(
                    article_id,
                    self.inner.store.clone(),
                    self.inner.reviser.clone(),
                    self.inner.event_bus.clone(),
                ))
            })
            .clone()
    }

    pub fn session_count(&self) -> usize {
        self.inner
            .sessions
            .read()
            .expect("session registry lock poisoned")
            .len()
    }
}
