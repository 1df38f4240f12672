//! Holds the committed scene buffers and discards results of superseded builds.
//!
//! Every build takes a ticket carrying the generation it was started under.
//! Only a ticket from the latest generation may commit, so a slow build that
//! finishes after a newer one started is dropped instead of overwriting it.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use parking_lot::Mutex;

use super::{build_scene_buffers, SceneBuffers};
use crate::config::BuildConfig;
use crate::scene::Scene;
use crate::util::Result;

/// Proof that a build was started, tagged with its generation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BuildTicket {
    generation: u64,
}

impl BuildTicket {
    pub fn generation(&self) -> u64 {
        self.generation
    }
}

#[derive(Debug, Default)]
pub struct SceneSlot {
    generation: AtomicU64,
    current: Mutex<Option<Arc<SceneBuffers>>>,
}

impl SceneSlot {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a build. Any ticket issued earlier becomes stale.
    pub fn begin(&self) -> BuildTicket {
        let generation = self.generation.fetch_add(1, Ordering::SeqCst).wrapping_add(1);
        BuildTicket { generation }
    }

    /// Install `buffers` if `ticket` is still the latest. Returns whether it was.
    pub fn commit(&self, ticket: BuildTicket, buffers: SceneBuffers) -> bool {
        let mut current = self.current.lock();
        let latest = self.generation.load(Ordering::SeqCst);
        if ticket.generation != latest {
            tracing::debug!(
                ticket = ticket.generation,
                latest,
                "discarding stale scene build"
            );
            return false;
        }
        *current = Some(Arc::new(buffers));
        true
    }

    /// Last committed buffers.
    pub fn current(&self) -> Option<Arc<SceneBuffers>> {
        self.current.lock().clone()
    }

    /// Generation of the most recent [`SceneSlot::begin`].
    pub fn generation(&self) -> u64 {
        self.generation.load(Ordering::SeqCst)
    }

    /// Build and commit in one go.
    ///
    /// `Ok(false)` means a newer build started meanwhile. On error the
    /// previously committed buffers stay in place.
    pub fn rebuild(&self, scene: &Scene, config: &BuildConfig) -> Result<bool> {
        let ticket = self.begin();
        let buffers = build_scene_buffers(scene, config)?;
        Ok(self.commit(ticket, buffers))
    }
}
