//! Client-side in-flight call bookkeeping: a small map keyed by a
//! monotonically-issued id. `tonic`'s generated client already correlates
//! request/response per `await`, so the bookkeeping here tracks *what's
//! outstanding* for diagnostics rather than doing the correlation itself.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

/// Default reservation for the in-flight map; typical, grows on demand.
const DEFAULT_CAPACITY: usize = 16;

struct Inner {
    next_id: AtomicU64,
    inflight: Mutex<HashMap<u64, &'static str>>,
}

/// Thread-safe allocator of in-flight call slots, shared by every clone of
/// [`crate::client::ReceiverClient`].
#[derive(Clone)]
pub struct ClientCallPool {
    inner: Arc<Inner>,
}

impl ClientCallPool {
    pub fn new() -> Self {
        Self {
            inner: Arc::new(Inner {
                next_id: AtomicU64::new(1),
                inflight: Mutex::new(HashMap::with_capacity(DEFAULT_CAPACITY)),
            }),
        }
    }

    /// Allocates a slot for a call named `name`; the returned guard frees it
    /// on drop, wherever the call eventually completes or is abandoned.
    pub fn begin(&self, name: &'static str) -> ClientCallGuard {
        let id = self.inner.next_id.fetch_add(1, Ordering::Relaxed);
        self.inner.inflight.lock().unwrap().insert(id, name);
        ClientCallGuard {
            pool: self.inner.clone(),
            id,
        }
    }

    pub fn inflight_count(&self) -> usize {
        self.inner.inflight.lock().unwrap().len()
    }
}

impl Default for ClientCallPool {
    fn default() -> Self {
        Self::new()
    }
}

/// RAII handle to one pool slot. Freed on drop, mirroring
/// [`receiver_core::hub::SubscriberHandle`]'s disconnect-on-drop shape.
pub struct ClientCallGuard {
    pool: Arc<Inner>,
    id: u64,
}

impl Drop for ClientCallGuard {
    fn drop(&mut self) {
        self.pool.inflight.lock().unwrap().remove(&self.id);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn slot_is_freed_on_drop() {
        let pool = ClientCallPool::new();
        assert_eq!(pool.inflight_count(), 0);
        {
            let _guard = pool.begin("start");
            assert_eq!(pool.inflight_count(), 1);
        }
        assert_eq!(pool.inflight_count(), 0);
    }

    #[test]
    fn tracks_multiple_concurrent_calls() {
        let pool = ClientCallPool::new();
        let a = pool.begin("start");
        let b = pool.begin("stop");
        assert_eq!(pool.inflight_count(), 2);
        drop(a);
        assert_eq!(pool.inflight_count(), 1);
        drop(b);
        assert_eq!(pool.inflight_count(), 0);
    }
}
