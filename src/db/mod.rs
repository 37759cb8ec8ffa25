// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Database layer (Firestore, or an in-process store for local runs).

pub mod firestore;
pub mod memory;

pub use firestore::FirestoreDb;
pub use memory::MemoryDb;

use crate::config::StorageBackend;
use crate::error::AppError;
use crate::models::{HistoryRecord, User};
use ring::rand::{SecureRandom, SystemRandom};

/// Collection names as constants.
pub mod collections {
    /// Keyed by URL-encoded username
    pub const USERS: &str = "users";
    /// Keyed by history record id
    pub const CODE_HISTORY: &str = "code_history";
}

/// IDs stay below 2^53 so they survive a round trip through JSON numbers in
/// any client.
const MAX_SAFE_ID: u64 = (1 << 53) - 1;

/// Generate a random, non-zero record ID.
pub fn new_id() -> Result<u64, AppError> {
    let rng = SystemRandom::new();
    loop {
        let mut bytes = [0u8; 8];
        rng.fill(&mut bytes)
            .map_err(|_| AppError::Internal(anyhow::anyhow!("System RNG failure")))?;
        let id = u64::from_le_bytes(bytes) & MAX_SAFE_ID;
        if id != 0 {
            return Ok(id);
        }
    }
}

/// Storage handle used by the route handlers.
#[derive(Clone)]
pub enum Database {
    Firestore(FirestoreDb),
    Memory(MemoryDb),
}

impl Database {
    /// Connect to the configured backend.
    pub async fn connect(backend: &StorageBackend) -> Result<Self, AppError> {
        match backend {
            StorageBackend::Firestore { project_id } => {
                Ok(Self::Firestore(FirestoreDb::new(project_id).await?))
            }
            StorageBackend::Memory => {
                tracing::warn!("Using in-process store; data will not survive a restart");
                Ok(Self::Memory(MemoryDb::new()))
            }
        }
    }

    // ─── User Operations ─────────────────────────────────────────

    /// Look up a user by login name.
    pub async fn get_user_by_username(&self, username: &str) -> Result<Option<User>, AppError> {
        match self {
            Self::Firestore(db) => db.get_user_by_username(username).await,
            Self::Memory(db) => Ok(db.get_user_by_username(username)),
        }
    }

    /// Look up a user by ID.
    pub async fn get_user(&self, user_id: u64) -> Result<Option<User>, AppError> {
        match self {
            Self::Firestore(db) => db.get_user(user_id).await,
            Self::Memory(db) => Ok(db.get_user(user_id)),
        }
    }

    /// Create a user. Returns `false` if the username is already taken.
    pub async fn create_user(&self, user: &User) -> Result<bool, AppError> {
        match self {
            Self::Firestore(db) => db.create_user(user).await,
            Self::Memory(db) => Ok(db.create_user(user)),
        }
    }

    // ─── History Operations ──────────────────────────────────────

    /// Store a history record.
    pub async fn insert_history(&self, record: &HistoryRecord) -> Result<(), AppError> {
        match self {
            Self::Firestore(db) => db.insert_history(record).await,
            Self::Memory(db) => {
                db.insert_history(record);
                Ok(())
            }
        }
    }

    /// All history for a user, newest first.
    pub async fn list_history(&self, user_id: u64) -> Result<Vec<HistoryRecord>, AppError> {
        match self {
            Self::Firestore(db) => db.list_history(user_id).await,
            Self::Memory(db) => Ok(db.list_history(user_id)),
        }
    }

    /// Delete one of a user's records. Returns `false` if no record with that
    /// ID belongs to the user.
    pub async fn delete_history(&self, user_id: u64, id: u64) -> Result<bool, AppError> {
        match self {
            Self::Firestore(db) => db.delete_history(user_id, id).await,
            Self::Memory(db) => Ok(db.delete_history(user_id, id)),
        }
    }
}
