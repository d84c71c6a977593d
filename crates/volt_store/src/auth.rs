//! Identity provider contract and an in-memory stand-in.
//!
//! Identity verification is delegated to an external provider; this module
//! fixes the contract the rest of the system consumes and supplies a
//! functional in-process implementation for development and tests. It is
//! not a credential store: passwords are held in memory, unhashed.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tokio::sync::watch;

use volt_core::UserRole;

use crate::memory::MemoryStore;
use crate::StoreError;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthUser {
    pub user_id: uuid::Uuid,
    pub email: String,
}

#[derive(Error, Debug, PartialEq)]
pub enum AuthError {
    #[error("an account already exists for {email}")]
    EmailTaken { email: String },
    #[error("invalid email or password")]
    InvalidCredentials,
    #[error("identity backend unavailable: {reason}")]
    Unavailable { reason: String },
}

pub trait IdentityProvider: Send + Sync {
    fn sign_up(&self, email: &str, password: &str) -> Result<AuthUser, AuthError>;
    fn sign_in(&self, email: &str, password: &str) -> Result<AuthUser, AuthError>;
    fn sign_out(&self);
    /// Current-user-changed notification. Delivers the signed-in identity,
    /// or `None` after sign-out.
    fn current_user(&self) -> watch::Receiver<Option<AuthUser>>;
}

struct Credential {
    password: String,
    user_id: uuid::Uuid,
}

pub struct MemoryIdentity {
    store: Arc<MemoryStore>,
    credentials: Mutex<HashMap<String, Credential>>,
    current: watch::Sender<Option<AuthUser>>,
}

impl MemoryIdentity {
    pub fn new(store: Arc<MemoryStore>) -> Self {
        let (current, _) = watch::channel(None);
        MemoryIdentity {
            store,
            credentials: Mutex::new(HashMap::new()),
            current,
        }
    }
}

impl IdentityProvider for MemoryIdentity {
    /// Registers the credential and creates the backing user record with a
    /// default profile.
    fn sign_up(&self, email: &str, password: &str) -> Result<AuthUser, AuthError> {
        let mut credentials = self.credentials.lock().map_err(|_| AuthError::Unavailable {
            reason: "credential lock poisoned".into(),
        })?;
        if credentials.contains_key(email) {
            return Err(AuthError::EmailTaken {
                email: email.to_string(),
            });
        }
        let user = self
            .store
            .create_user(email, UserRole::User)
            .map_err(|err| match err {
                StoreError::Unavailable { reason } => AuthError::Unavailable { reason },
                other => AuthError::Unavailable {
                    reason: other.to_string(),
                },
            })?;
        credentials.insert(
            email.to_string(),
            Credential {
                password: password.to_string(),
                user_id: user.id,
            },
        );
        let auth = AuthUser {
            user_id: user.id,
            email: email.to_string(),
        };
        let _ = self.current.send(Some(auth.clone()));
        tracing::info!(email, user_id = %user.id, "account created");
        Ok(auth)
    }

    fn sign_in(&self, email: &str, password: &str) -> Result<AuthUser, AuthError> {
        let credentials = self.credentials.lock().map_err(|_| AuthError::Unavailable {
            reason: "credential lock poisoned".into(),
        })?;
        let credential = credentials
            .get(email)
            .filter(|c| c.password == password)
            .ok_or(AuthError::InvalidCredentials)?;
        let auth = AuthUser {
            user_id: credential.user_id,
            email: email.to_string(),
        };
        let _ = self.current.send(Some(auth.clone()));
        Ok(auth)
    }

    fn sign_out(&self) {
        let _ = self.current.send(None);
    }

    fn current_user(&self) -> watch::Receiver<Option<AuthUser>> {
        self.current.subscribe()
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn identity() -> MemoryIdentity {
        MemoryIdentity::new(Arc::new(MemoryStore::new()))
    }

    #[test]
    fn sign_up_then_sign_in() {
        let identity = identity();
        let created = identity.sign_up("ada@example.com", "hunter2").unwrap();
        let signed_in = identity.sign_in("ada@example.com", "hunter2").unwrap();
        assert_eq!(created, signed_in);

        // The backing user record exists with a fresh profile.
        let user = identity.store.user(created.user_id).unwrap();
        assert_eq!(user.email, "ada@example.com");
        assert_eq!(user.profile.loyalty_points, 0);
    }

    #[test]
    fn duplicate_email_is_rejected() {
        let identity = identity();
        identity.sign_up("ada@example.com", "hunter2").unwrap();
        let err = identity.sign_up("ada@example.com", "other").unwrap_err();
        assert_eq!(
            err,
            AuthError::EmailTaken {
                email: "ada@example.com".into()
            }
        );
    }

    #[test]
    fn wrong_password_is_invalid_credentials() {
        let identity = identity();
        identity.sign_up("ada@example.com", "hunter2").unwrap();
        let err = identity.sign_in("ada@example.com", "wrong").unwrap_err();
        assert_eq!(err, AuthError::InvalidCredentials);
        let err = identity.sign_in("nobody@example.com", "hunter2").unwrap_err();
        assert_eq!(err, AuthError::InvalidCredentials);
    }

    #[test]
    fn current_user_notification_tracks_sign_in_and_out() {
        let identity = identity();
        let watcher = identity.current_user();
        assert!(watcher.borrow().is_none());

        let auth = identity.sign_up("ada@example.com", "hunter2").unwrap();
        assert_eq!(watcher.borrow().as_ref(), Some(&auth));

        identity.sign_out();
        assert!(watcher.borrow().is_none());
    }
}
