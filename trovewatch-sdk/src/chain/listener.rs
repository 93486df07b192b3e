use crate::objects::LedgerEvent;
use std::sync::Arc;
use uuid::Uuid;

/// Identity of a registered listener.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(Uuid);

impl ListenerId {
    fn generate() -> Self {
        Self(Uuid::now_v7())
    }
}

impl std::fmt::Display for ListenerId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

/// A callback invoked by an [`EventSource`](super::EventSource) for each
/// matching event.
///
/// Clones share the callback and the id, and equality is by id, so the
/// value handed to `subscribe` can later be handed to `unsubscribe`.
#[derive(Clone)]
pub struct Listener {
    id: ListenerId,
    callback: Arc<dyn Fn(&LedgerEvent) + Send + Sync>,
}

impl Listener {
    pub fn new(callback: impl Fn(&LedgerEvent) + Send + Sync + 'static) -> Self {
        Self {
            id: ListenerId::generate(),
            callback: Arc::new(callback),
        }
    }

    pub fn id(&self) -> ListenerId {
        self.id
    }

    pub fn notify(&self, event: &LedgerEvent) {
        (self.callback)(event)
    }
}

impl PartialEq for Listener {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for Listener {}

impl std::fmt::Debug for Listener {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Listener").field("id", &self.id).finish()
    }
}
