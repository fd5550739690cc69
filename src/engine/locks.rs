// codepatcher: Code Patch Manager
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! Per-patch single-flight guards.

use dashmap::DashMap;
use std::sync::Arc;
use tokio::sync::{Mutex, OwnedMutexGuard};

/// One async mutex per patch id. Operations on the same patch queue up;
/// different patches never contend.
#[derive(Debug, Clone, Default)]
pub struct PatchLocks {
    inner: Arc<DashMap<i64, Arc<Mutex<()>>>>,
}

impl PatchLocks {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Wait for exclusive access to `patch_id`.
    pub async fn acquire(&self, patch_id: i64) -> OwnedMutexGuard<()> {
        // Clone the Arc out so the shard lock is released before awaiting.
        let lock = self.inner.entry(patch_id).or_default().clone();
        lock.lock_owned().await
    }

    /// Drop the guard slot of a patch that no longer exists.
    pub fn forget(&self, patch_id: i64) {
        self.inner
            .remove_if(&patch_id, |_, lock| Arc::strong_count(lock) == 1);
    }

    /// Number of patches with a guard slot.
    #[must_use]
    pub fn len(&self) -> usize {
        self.inner.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }
}
