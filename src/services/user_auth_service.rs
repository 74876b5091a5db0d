use std::sync::Arc;

use tracing::{error, info};

use crate::auth_client::{AuthApi, AuthClientError, Credentials};
use crate::models::Role;
use crate::storage::postgres::DEFAULT_TRAINER_ID;
use crate::storage::{Storage, StorageError};

use super::ServiceError;

/// Registration and login. Credential storage is owned by the remote
/// authorization service; this service only persists the local user row and
/// its empty role profile.
pub struct UserAuthService {
    storage: Arc<dyn Storage>,
    auth_client: Arc<dyn AuthApi>,
}

impl UserAuthService {
    pub fn new(storage: Arc<dyn Storage>, auth_client: Arc<dyn AuthApi>) -> Self {
        Self {
            storage,
            auth_client,
        }
    }

    /// Registers a new user and returns the token issued by the
    /// authorization service.
    ///
    /// The remote credential registration happens before any local write, so
    /// a failed auth call leaves no local row behind. The existence pre-check
    /// is not transactional with the insert; a concurrent duplicate is caught
    /// by the unique index on email instead.
    pub async fn register_user(
        &self,
        email: &str,
        password: &str,
        name: &str,
        role: Role,
    ) -> Result<String, ServiceError> {
        let existing = self
            .storage
            .get_user(email)
            .await
            .map_err(ServiceError::Storage)?;
        if existing.is_some() {
            info!("user {email} already exists");
            return Err(ServiceError::UserAlreadyExists);
        }

        let credentials = Credentials {
            login: email.to_owned(),
            password: password.to_owned(),
        };
        let token = self.auth_client.register_user(&credentials).await?;

        let user_id = self
            .storage
            .save_user(email, name, role)
            .await
            .map_err(|e| match e {
                StorageError::DuplicateKey => ServiceError::UserAlreadyExists,
                StorageError::FieldIsTooLong => ServiceError::FieldIsTooLong,
                other => {
                    error!("save user failed: {other}");
                    ServiceError::Storage(other)
                }
            })?;

        // Empty profile row keyed by role; filled in by the explicit
        // create-profile call later. Not atomic with the user insert.
        let profile_write = match role {
            Role::Client => {
                self.storage
                    .save_client(user_id, DEFAULT_TRAINER_ID, 0.0, 0.0, 0.0)
                    .await
            }
            Role::Trainer => self.storage.save_trainer(user_id, "", "", "").await,
        };
        profile_write.map_err(|e| {
            error!("could not save new {role} profile: {e}");
            ServiceError::Storage(e)
        })?;

        info!("registered user {email} as {role}");
        Ok(token)
    }

    /// Delegates entirely to the authorization service.
    pub async fn login(&self, email: &str, password: &str) -> Result<String, ServiceError> {
        let credentials = Credentials {
            login: email.to_owned(),
            password: password.to_owned(),
        };

        match self.auth_client.login_user(&credentials).await {
            Ok(token) => {
                info!("user {email} successfully signed in");
                Ok(token)
            }
            Err(AuthClientError::ClientUnavailable) => {
                Err(ServiceError::Auth(AuthClientError::ClientUnavailable))
            }
            Err(_) => Err(ServiceError::InvalidCredentials),
        }
    }
}
