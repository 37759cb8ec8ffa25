// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! In-process store for local development and tests.

use crate::models::{HistoryRecord, User};
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use std::sync::Arc;

/// In-memory database. Cheap to clone; clones share the same data.
#[derive(Clone, Default)]
pub struct MemoryDb {
    /// username -> user
    users: Arc<DashMap<String, User>>,
    /// user id -> username
    usernames: Arc<DashMap<u64, String>>,
    /// user id -> records in insertion order
    history: Arc<DashMap<u64, Vec<HistoryRecord>>>,
}

impl MemoryDb {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get_user_by_username(&self, username: &str) -> Option<User> {
        self.users.get(username).map(|u| u.clone())
    }

    pub fn get_user(&self, user_id: u64) -> Option<User> {
        let username = self.usernames.get(&user_id)?.clone();
        self.get_user_by_username(&username)
    }

    /// Insert a user unless the username is taken (atomic per username).
    pub fn create_user(&self, user: &User) -> bool {
        match self.users.entry(user.username.clone()) {
            Entry::Occupied(_) => false,
            Entry::Vacant(slot) => {
                slot.insert(user.clone());
                self.usernames.insert(user.id, user.username.clone());
                true
            }
        }
    }

    pub fn insert_history(&self, record: &HistoryRecord) {
        self.history
            .entry(record.user_id)
            .or_default()
            .push(record.clone());
    }

    /// Newest first.
    pub fn list_history(&self, user_id: u64) -> Vec<HistoryRecord> {
        self.history
            .get(&user_id)
            .map(|records| records.iter().rev().cloned().collect())
            .unwrap_or_default()
    }

    pub fn delete_history(&self, user_id: u64, id: u64) -> bool {
        let Some(mut records) = self.history.get_mut(&user_id) else {
            return false;
        };
        let before = records.len();
        records.retain(|r| r.id != id);
        records.len() != before
    }
}
