// ============================
// crates/backend-lib/src/store.rs
// ============================
//! User store abstraction with an in-memory implementation.
//!
//! The relational store (SQL views, stored procedures) is an external
//! collaborator; the auth core only needs the narrow contract below. The
//! in-memory implementation backs the binary in development and the tests.

use crate::error::AppError;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use dashmap::DashMap;
use moneyminder_common::{UserId, UserPublic};
use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::Arc;

/// A stored user record. The only consumer of `password_hash` is
/// password verification; it must never leave the process.
#[derive(Debug, Clone)]
pub struct UserRecord {
    pub user_id: UserId,
    pub username: String,
    pub email: String,
    pub password_hash: String,
    pub base_currency: String,
    pub created_at: DateTime<Utc>,
}

impl UserRecord {
    /// Public projection, safe to return to clients
    pub fn public(&self) -> UserPublic {
        UserPublic {
            user_id: self.user_id,
            username: self.username.clone(),
            email: self.email.clone(),
            base_currency: self.base_currency.clone(),
        }
    }
}

/// A new user to persist
#[derive(Debug, Clone)]
pub struct NewUser {
    pub username: String,
    pub email: String,
    pub password_hash: String,
    pub base_currency: String,
}

/// Trait for user store backends
#[async_trait]
pub trait UserStore: Send + Sync {
    /// Look up a user by email
    async fn find_by_email(&self, email: &str) -> Result<Option<UserRecord>, AppError>;

    /// Look up a user by id
    async fn find_by_id(&self, user_id: UserId) -> Result<Option<UserRecord>, AppError>;

    /// Check whether an email is already registered
    async fn exists_by_email(&self, email: &str) -> Result<bool, AppError>;

    /// Insert a new user, returning its id
    async fn insert(&self, user: NewUser) -> Result<UserId, AppError>;
}

/// In-memory implementation of the `UserStore` trait
#[derive(Clone, Default)]
pub struct InMemoryUserStore {
    users: Arc<DashMap<UserId, UserRecord>>,
    next_id: Arc<AtomicI64>,
}

impl InMemoryUserStore {
    pub fn new() -> Self {
        Self {
            users: Arc::new(DashMap::new()),
            next_id: Arc::new(AtomicI64::new(1)),
        }
    }
}

#[async_trait]
impl UserStore for InMemoryUserStore {
    async fn find_by_email(&self, email: &str) -> Result<Option<UserRecord>, AppError> {
        Ok(self
            .users
            .iter()
            .find(|entry| entry.email == email)
            .map(|entry| entry.clone()))
    }

    async fn find_by_id(&self, user_id: UserId) -> Result<Option<UserRecord>, AppError> {
        Ok(self.users.get(&user_id).map(|entry| entry.clone()))
    }

    async fn exists_by_email(&self, email: &str) -> Result<bool, AppError> {
        Ok(self.users.iter().any(|entry| entry.email == email))
    }

    async fn insert(&self, user: NewUser) -> Result<UserId, AppError> {
        let user_id = self.next_id.fetch_add(1, Ordering::SeqCst);
        let record = UserRecord {
            user_id,
            username: user.username,
            email: user.email,
            password_hash: user.password_hash,
            base_currency: user.base_currency,
            created_at: Utc::now(),
        };
        self.users.insert(user_id, record);
        Ok(user_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_user(email: &str) -> NewUser {
        NewUser {
            username: "john_doe".to_string(),
            email: email.to_string(),
            password_hash: "$scrypt$dummy".to_string(),
            base_currency: "VND".to_string(),
        }
    }

    #[tokio::test]
    async fn test_insert_and_lookup() {
        let store = InMemoryUserStore::new();

        let id = store.insert(sample_user("john@example.com")).await.unwrap();
        assert!(store.exists_by_email("john@example.com").await.unwrap());

        let by_email = store
            .find_by_email("john@example.com")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(by_email.user_id, id);
        assert_eq!(by_email.username, "john_doe");

        let by_id = store.find_by_id(id).await.unwrap().unwrap();
        assert_eq!(by_id.email, "john@example.com");

        assert!(store.find_by_email("nobody@example.com").await.unwrap().is_none());
        assert!(!store.exists_by_email("nobody@example.com").await.unwrap());
    }

    #[tokio::test]
    async fn test_ids_are_unique() {
        let store = InMemoryUserStore::new();
        let a = store.insert(sample_user("a@example.com")).await.unwrap();
        let b = store.insert(sample_user("b@example.com")).await.unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn test_public_projection_excludes_hash() {
        let record = UserRecord {
            user_id: 7,
            username: "john_doe".to_string(),
            email: "john@example.com".to_string(),
            password_hash: "$scrypt$dummy".to_string(),
            base_currency: "VND".to_string(),
            created_at: Utc::now(),
        };
        let public = record.public();
        let json = serde_json::to_string(&public).unwrap();
        assert!(!json.contains("scrypt"));
        assert!(!json.contains("password"));
    }
}
