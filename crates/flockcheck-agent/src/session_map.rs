// SPDX-FileCopyrightText: 2026 Flockcheck Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Key-partitioned store of per-user session slots.
//!
//! Each user owns one slot behind its own async mutex. Holding the slot lock
//! for the whole handling of an event serializes that user's events while
//! other users proceed independently.

use std::sync::Arc;

use dashmap::DashMap;
use flockcheck_core::UserId;
use tokio::sync::{Mutex, OwnedMutexGuard};
use tokio::time::Instant;

use crate::session::{Session, SessionState};

/// State plus working copy for one user.
#[derive(Debug)]
pub struct UserSlot {
    pub state: SessionState,
    pub session: Option<Session>,
    /// Last time an event for this user was handled.
    pub touched_at: Instant,
}

impl UserSlot {
    fn new() -> Self {
        Self {
            state: SessionState::Terminated,
            session: None,
            touched_at: Instant::now(),
        }
    }
}

/// Shared handle to all user slots. Cloning shares the same map.
#[derive(Debug, Clone, Default)]
pub struct SessionMap {
    slots: Arc<DashMap<UserId, Arc<Mutex<UserSlot>>>>,
}

impl SessionMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Locks the slot for `user`, creating an empty one on first contact.
    pub async fn lock(&self, user: &UserId) -> OwnedMutexGuard<UserSlot> {
        // Clone the Arc out so the shard lock is released before awaiting.
        let slot = self
            .slots
            .entry(user.clone())
            .or_insert_with(|| Arc::new(Mutex::new(UserSlot::new())))
            .clone();
        slot.lock_owned().await
    }

    /// Current state and session for `user`, if the user has a slot.
    pub async fn snapshot(&self, user: &UserId) -> Option<(SessionState, Option<Session>)> {
        let slot = self.slots.get(user).map(|s| s.clone())?;
        let guard = slot.lock().await;
        Some((guard.state, guard.session.clone()))
    }

    /// Removes the slot for `user` if it holds nothing worth keeping.
    ///
    /// A slot is kept while it is locked or shared, or while it has a session
    /// or a non-terminated state. A removed slot is indistinguishable from one
    /// that was never created. Returns whether the slot was removed.
    pub fn prune(&self, user: &UserId) -> bool {
        self.slots
            .remove_if(user, |_, slot| {
                Arc::strong_count(slot) == 1
                    && slot.try_lock().is_ok_and(|s| {
                        s.state == SessionState::Terminated && s.session.is_none()
                    })
            })
            .is_some()
    }

    /// Number of users that currently have a slot.
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[tokio::test]
    async fn first_lock_creates_terminated_slot() {
        let map = SessionMap::new();
        let user = UserId::from("u1");
        assert!(map.snapshot(&user).await.is_none());

        {
            let slot = map.lock(&user).await;
            assert_eq!(slot.state, SessionState::Terminated);
            assert!(slot.session.is_none());
        }
        assert_eq!(map.len(), 1);
        assert_eq!(
            map.snapshot(&user).await,
            Some((SessionState::Terminated, None))
        );
    }

    #[tokio::test]
    async fn prune_removes_only_empty_terminated_slots() {
        let map = SessionMap::new();
        let idle = UserId::from("idle");
        let kept = UserId::from("kept");
        let busy = UserId::from("busy");
        drop(map.lock(&idle).await);
        {
            let mut slot = map.lock(&kept).await;
            slot.session = Some(Session::new());
        }
        let held = map.lock(&busy).await;

        assert!(map.prune(&idle));
        assert!(!map.prune(&kept));
        assert!(!map.prune(&busy));
        assert!(!map.prune(&UserId::from("never-seen")));
        assert_eq!(map.len(), 2);

        drop(held);
        assert!(map.prune(&busy));
        assert_eq!(map.len(), 1);
    }

    #[tokio::test]
    async fn clones_share_slots() {
        let map = SessionMap::new();
        let other = map.clone();
        let user = UserId::from("u1");
        {
            let mut slot = map.lock(&user).await;
            slot.state = SessionState::SelectingField;
            slot.session = Some(Session::new());
        }
        let (state, session) = other.snapshot(&user).await.unwrap();
        assert_eq!(state, SessionState::SelectingField);
        assert!(session.is_some());
    }

    #[tokio::test]
    async fn distinct_users_do_not_block_each_other() {
        let map = SessionMap::new();
        let _held = map.lock(&UserId::from("a")).await;
        let other = tokio::time::timeout(Duration::from_secs(1), map.lock(&UserId::from("b"))).await;
        assert!(other.is_ok(), "lock for another user should not wait");
    }

    #[tokio::test]
    async fn same_user_waits_for_holder() {
        let map = SessionMap::new();
        let user = UserId::from("a");
        let held = map.lock(&user).await;
        let second = tokio::time::timeout(Duration::from_millis(50), map.lock(&user)).await;
        assert!(second.is_err(), "second lock should wait while the first is held");
        drop(held);
        assert!(tokio::time::timeout(Duration::from_secs(1), map.lock(&user)).await.is_ok());
    }
}
