// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Firestore client wrapper with typed operations.
//!
//! Provides high-level operations for:
//! - Users (keyed by URL-encoded username)
//! - Code history (keyed by record id, filtered by owner)

use crate::db::collections;
use crate::error::AppError;
use crate::models::{HistoryRecord, User};

/// Firestore database client.
#[derive(Clone)]
pub struct FirestoreDb {
    client: Option<firestore::FirestoreDb>,
}

impl FirestoreDb {
    /// Create a new Firestore client.
    ///
    /// For local development with emulator, set FIRESTORE_EMULATOR_HOST.
    pub async fn new(project_id: &str) -> Result<Self, AppError> {
        // The emulator accepts any token; skip the credential lookup.
        if std::env::var("FIRESTORE_EMULATOR_HOST").is_ok() {
            return Self::create_emulator_client(project_id).await;
        }

        let client = firestore::FirestoreDb::new(project_id)
            .await
            .map_err(|e| AppError::Database(format!("Failed to connect to Firestore: {}", e)))?;

        tracing::info!(project = project_id, "Connected to Firestore");

        Ok(Self {
            client: Some(client),
        })
    }

    /// Create a Firestore client for the emulator with unauthenticated access.
    async fn create_emulator_client(project_id: &str) -> Result<Self, AppError> {
        tracing::info!("Using unauthenticated connection for Firestore Emulator");

        let token_source = gcloud_sdk::ExternalJwtFunctionSource::new(|| async {
            Ok(gcloud_sdk::Token {
                token_type: "Bearer".to_string(),
                token: gcloud_sdk::SecretValue::new(
                    "eyJhbGciOiJub25lIn0.eyJ1aWQiOiJ0ZXN0In0."
                        .to_string()
                        .into(),
                ),
                expiry: chrono::Utc::now() + chrono::Duration::hours(1),
            })
        });

        let options = firestore::FirestoreDbOptions::new(project_id.to_string());

        let client = firestore::FirestoreDb::with_options_token_source(
            options,
            gcloud_sdk::GCP_DEFAULT_SCOPES.clone(),
            gcloud_sdk::TokenSourceType::ExternalSource(Box::new(token_source)),
        )
        .await
        .map_err(|e| {
            AppError::Database(format!("Failed to connect to Firestore Emulator: {}", e))
        })?;

        tracing::info!(
            project = project_id,
            "Connected to Firestore (Emulator/Unauthenticated)"
        );

        Ok(Self {
            client: Some(client),
        })
    }

    /// Create a mock Firestore client for testing (offline mode).
    ///
    /// All database operations will return an error if called.
    pub fn new_mock() -> Self {
        Self { client: None }
    }

    /// Helper to get the client or return an error if offline.
    fn get_client(&self) -> Result<&firestore::FirestoreDb, AppError> {
        self.client
            .as_ref()
            .ok_or_else(|| AppError::Database("Database not connected (offline mode)".to_string()))
    }

    // ─── User Operations ─────────────────────────────────────────

    /// Get a user by login name.
    pub async fn get_user_by_username(&self, username: &str) -> Result<Option<User>, AppError> {
        self.get_client()?
            .fluent()
            .select()
            .by_id_in(collections::USERS)
            .obj()
            .one(&user_doc_id(username))
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Get a user by numeric ID.
    pub async fn get_user(&self, user_id: u64) -> Result<Option<User>, AppError> {
        let users: Vec<User> = self
            .get_client()?
            .fluent()
            .select()
            .from(collections::USERS)
            .filter(move |q| q.field("id").eq(user_id))
            .limit(1)
            .obj()
            .query()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        Ok(users.into_iter().next())
    }

    /// Create a user if the username is free.
    ///
    /// Check-then-write: two concurrent registrations of the same name can
    /// both pass the check, and the later write wins.
    pub async fn create_user(&self, user: &User) -> Result<bool, AppError> {
        if self.get_user_by_username(&user.username).await?.is_some() {
            return Ok(false);
        }

        let _: () = self
            .get_client()?
            .fluent()
            .update()
            .in_col(collections::USERS)
            .document_id(user_doc_id(&user.username))
            .object(user)
            .execute()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(true)
    }

    // ─── History Operations ──────────────────────────────────────

    /// Store a history record.
    pub async fn insert_history(&self, record: &HistoryRecord) -> Result<(), AppError> {
        let _: () = self
            .get_client()?
            .fluent()
            .update()
            .in_col(collections::CODE_HISTORY)
            .document_id(record.id.to_string())
            .object(record)
            .execute()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(())
    }

    /// Get all history records for a user, newest first.
    pub async fn list_history(&self, user_id: u64) -> Result<Vec<HistoryRecord>, AppError> {
        self.get_client()?
            .fluent()
            .select()
            .from(collections::CODE_HISTORY)
            .filter(move |q| q.field("user_id").eq(user_id))
            .order_by([("created_at", firestore::FirestoreQueryDirection::Descending)])
            .obj()
            .query()
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Delete a record if it belongs to `user_id`.
    pub async fn delete_history(&self, user_id: u64, id: u64) -> Result<bool, AppError> {
        let client = self.get_client()?;

        let existing: Option<HistoryRecord> = client
            .fluent()
            .select()
            .by_id_in(collections::CODE_HISTORY)
            .obj()
            .one(&id.to_string())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        match existing {
            Some(record) if record.user_id == user_id => {}
            Some(_) => {
                tracing::warn!(user_id, history_id = id, "Refusing to delete another user's record");
                return Ok(false);
            }
            None => return Ok(false),
        }

        client
            .fluent()
            .delete()
            .from(collections::CODE_HISTORY)
            .document_id(id.to_string())
            .execute()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        Ok(true)
    }
}

/// Usernames are free-form; escape them for use as a document ID.
fn user_doc_id(username: &str) -> String {
    urlencoding::encode(username).into_owned()
}
