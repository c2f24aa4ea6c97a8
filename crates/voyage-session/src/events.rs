//! Auth state change notifications

use parking_lot::RwLock;
use serde::Serialize;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use crate::session::UserProfile;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthStateChange {
    pub authenticated: bool,
    pub user: Option<UserProfile>,
}

/// Handle returned by `on_state_change`, used to unsubscribe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

type Listener = Arc<dyn Fn(&AuthStateChange) + Send + Sync>;

#[derive(Clone, Default)]
pub(crate) struct Listeners {
    entries: Arc<RwLock<Vec<(SubscriptionId, Listener)>>>,
    next_id: Arc<AtomicU64>,
}

impl Listeners {
    pub fn subscribe<F>(&self, listener: F) -> SubscriptionId
    where
        F: Fn(&AuthStateChange) + Send + Sync + 'static,
    {
        let id = SubscriptionId(self.next_id.fetch_add(1, Ordering::Relaxed));
        self.entries.write().push((id, Arc::new(listener)));
        id
    }

    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        let mut entries = self.entries.write();
        let before = entries.len();
        entries.retain(|(entry_id, _)| *entry_id != id);
        entries.len() != before
    }

    /// Deliver to every current listener in registration order.
    ///
    /// The list is snapshotted first so a listener may subscribe,
    /// unsubscribe or query the session without deadlocking.
    pub fn notify(&self, change: &AuthStateChange) {
        let snapshot: Vec<Listener> = self
            .entries
            .read()
            .iter()
            .map(|(_, listener)| Arc::clone(listener))
            .collect();

        for listener in snapshot {
            listener(change);
        }
    }

    pub fn len(&self) -> usize {
        self.entries.read().len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use parking_lot::Mutex;

    fn change(authenticated: bool) -> AuthStateChange {
        AuthStateChange {
            authenticated,
            user: None,
        }
    }

    #[test]
    fn test_delivers_in_registration_order() {
        let listeners = Listeners::default();
        let seen = Arc::new(Mutex::new(Vec::new()));

        for name in ["header", "page"] {
            let seen = Arc::clone(&seen);
            listeners.subscribe(move |c| seen.lock().push((name, c.authenticated)));
        }

        listeners.notify(&change(true));
        assert_eq!(*seen.lock(), vec![("header", true), ("page", true)]);
    }

    #[test]
    fn test_unsubscribe() {
        let listeners = Listeners::default();
        let count = Arc::new(AtomicU64::new(0));

        let counter = Arc::clone(&count);
        let id = listeners.subscribe(move |_| {
            counter.fetch_add(1, Ordering::SeqCst);
        });

        listeners.notify(&change(false));
        assert!(listeners.unsubscribe(id));
        assert!(!listeners.unsubscribe(id));
        listeners.notify(&change(false));

        assert_eq!(count.load(Ordering::SeqCst), 1);
        assert_eq!(listeners.len(), 0);
    }

    #[test]
    fn test_listener_can_subscribe_during_notify() {
        let listeners = Listeners::default();
        let inner = listeners.clone();
        listeners.subscribe(move |_| {
            inner.subscribe(|_| {});
        });

        listeners.notify(&change(true));
        assert_eq!(listeners.len(), 2);
    }
}
