//! Transient handles to encoded image data.
//!
//! A [`HandleRegistry`] hands out [`TransientHandle`]s for encoded bytes so
//! they can be previewed or downloaded. A handle is an owned, non-`Clone`
//! value: releasing it consumes it, and dropping it releases it. Each handle
//! is therefore released exactly once, and a released handle can no longer
//! be resolved.

use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, Weak};
use parking_lot::Mutex;
use serde::Serialize;
use tracing::{debug, warn};

/// Identifier of a live handle, rendered as a `blob:` style URL.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct HandleId(u64);

impl fmt::Display for HandleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "blob:image-compressor/{}", self.0)
    }
}

/// Counters describing the registry's lifetime activity.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HandleStats {
    pub created: u64,
    pub released: u64,
    pub live: usize,
}

#[derive(Default)]
struct RegistryInner {
    next_id: u64,
    live: HashMap<HandleId, Arc<[u8]>>,
    created: u64,
    released: u64,
}

/// Issues and resolves transient handles. Cheap to clone; clones share state.
#[derive(Clone, Default)]
pub struct HandleRegistry {
    inner: Arc<Mutex<RegistryInner>>,
}

impl HandleRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `bytes` and return the only handle to them.
    pub fn create(&self, bytes: impl Into<Arc<[u8]>>) -> TransientHandle {
        let bytes = bytes.into();
        let len = bytes.len();
        let mut inner = self.inner.lock();
        let id = HandleId(inner.next_id);
        inner.next_id += 1;
        inner.created += 1;
        inner.live.insert(id, bytes);
        debug!("Created handle {} ({} bytes)", id, len);

        TransientHandle {
            id,
            registry: Arc::downgrade(&self.inner),
        }
    }

    /// Bytes behind a live handle, `None` once it has been released.
    pub fn resolve(&self, id: HandleId) -> Option<Arc<[u8]>> {
        self.inner.lock().live.get(&id).cloned()
    }

    pub fn stats(&self) -> HandleStats {
        let inner = self.inner.lock();
        HandleStats {
            created: inner.created,
            released: inner.released,
            live: inner.live.len(),
        }
    }
}

/// Owned reference to encoded bytes held by a [`HandleRegistry`].
///
/// Not `Clone`. Dropping the handle releases it.
pub struct TransientHandle {
    id: HandleId,
    registry: Weak<Mutex<RegistryInner>>,
}

impl TransientHandle {
    pub fn id(&self) -> HandleId {
        self.id
    }

    /// Release the handle now rather than at end of scope.
    pub fn release(self) {
        drop(self);
    }
}

impl fmt::Debug for TransientHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("TransientHandle").field(&self.id).finish()
    }
}

impl Drop for TransientHandle {
    fn drop(&mut self) {
        // Registry already gone: nothing left to release into.
        let Some(registry) = self.registry.upgrade() else {
            return;
        };
        let mut inner = registry.lock();
        if inner.live.remove(&self.id).is_some() {
            inner.released += 1;
            debug!("Released handle {}", self.id);
        } else {
            warn!("Handle {} was not live at release", self.id);
        }
    }
}
