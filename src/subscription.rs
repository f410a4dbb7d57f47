//! Abonnements aux changements d'une collection de services.
//!
//! Un [`Subscription`] est rendu à l'appelant par `ShiftStore::subscribe`. L'annulation
//! est idempotente : `cancel()` peut être appelé plusieurs fois, et le `Drop` annule si
//! ce n'est pas déjà fait. Après le retour de `cancel()`, le callback n'est plus jamais
//! invoqué.

use crate::model::{ShiftRecord, UserId};
use std::sync::{Arc, Mutex, Weak};

/// Callback de livraison : reçoit la liste complète, triée par date.
pub type OnChange = Box<dyn FnMut(&[ShiftRecord]) + Send>;

type SharedCallback = Arc<Mutex<Option<OnChange>>>;

struct Entry {
    key: u64,
    uid: UserId,
    callback: SharedCallback,
}

#[derive(Default)]
struct Inner {
    next_key: u64,
    entries: Vec<Entry>,
}

/// Registre des abonnés d'un store.
#[derive(Clone, Default)]
pub struct SubscriberRegistry {
    inner: Arc<Mutex<Inner>>,
}

impl SubscriberRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Enregistre un callback pour `uid` et livre immédiatement `initial`.
    pub fn register(
        &self,
        uid: &UserId,
        on_change: OnChange,
        initial: &[ShiftRecord],
    ) -> Subscription {
        let callback: SharedCallback = Arc::new(Mutex::new(Some(on_change)));
        let key = {
            let mut inner = lock(&self.inner);
            let key = inner.next_key;
            inner.next_key += 1;
            inner.entries.push(Entry {
                key,
                uid: uid.clone(),
                callback: Arc::clone(&callback),
            });
            key
        };
        deliver(&callback, initial);
        Subscription {
            registry: Arc::downgrade(&self.inner),
            key,
            callback: Some(callback),
        }
    }

    /// Livre `shifts` à tous les abonnés de `uid`.
    ///
    /// Le verrou du registre est relâché avant l'appel des callbacks.
    pub fn publish(&self, uid: &UserId, shifts: &[ShiftRecord]) {
        let targets: Vec<SharedCallback> = lock(&self.inner)
            .entries
            .iter()
            .filter(|e| &e.uid == uid)
            .map(|e| Arc::clone(&e.callback))
            .collect();
        for callback in &targets {
            deliver(callback, shifts);
        }
    }

    pub fn subscriber_count(&self, uid: &UserId) -> usize {
        lock(&self.inner).entries.iter().filter(|e| &e.uid == uid).count()
    }
}

fn deliver(callback: &SharedCallback, shifts: &[ShiftRecord]) {
    if let Some(f) = lock(callback).as_mut() {
        f(shifts);
    }
}

fn lock<T>(m: &Mutex<T>) -> std::sync::MutexGuard<'_, T> {
    m.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

/// Poignée d'abonnement annulable.
#[must_use = "dropping a Subscription cancels it immediately"]
pub struct Subscription {
    registry: Weak<Mutex<Inner>>,
    key: u64,
    callback: Option<SharedCallback>,
}

impl Subscription {
    /// Annule l'abonnement. Les appels suivants sont sans effet.
    pub fn cancel(&mut self) {
        let Some(callback) = self.callback.take() else {
            return;
        };
        // Vider le slot attend une éventuelle livraison en cours.
        lock(&callback).take();
        if let Some(inner) = self.registry.upgrade() {
            lock(&inner).entries.retain(|e| e.key != self.key);
        }
        tracing::debug!(key = self.key, "subscription cancelled");
    }

    pub fn is_active(&self) -> bool {
        self.callback.is_some()
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.cancel();
    }
}

impl std::fmt::Debug for Subscription {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Subscription")
            .field("key", &self.key)
            .field("active", &self.is_active())
            .finish()
    }
}
