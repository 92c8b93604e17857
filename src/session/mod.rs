use crate::error::DocsignError;
use crate::storage::{AUTH_USER_KEY, KeyValueStore};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{info, warn};

/// Password every demo account accepts.
pub const DEMO_PASSWORD: &str = "password";
pub const ADMIN_EMAIL: &str = "admin@example.com";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: String,
    pub email: String,
    pub name: String,
    #[serde(rename = "isAdmin")]
    pub is_admin: bool,
}

impl User {
    fn for_email(email: &str) -> Self {
        if email == ADMIN_EMAIL {
            User {
                id: "1".to_string(),
                email: email.to_string(),
                name: "Admin User".to_string(),
                is_admin: true,
            }
        } else {
            let name = email.split('@').next().unwrap_or(email);
            User {
                id: "2".to_string(),
                email: email.to_string(),
                name: name.to_string(),
                is_admin: false,
            }
        }
    }
}

/// The demo login, persisted under [`AUTH_USER_KEY`].
///
/// There is no real authentication here; any email is accepted with the
/// demo password.
pub struct DemoSession {
    backend: Arc<dyn KeyValueStore>,
}

impl DemoSession {
    pub fn new(backend: Arc<dyn KeyValueStore>) -> Self {
        Self { backend }
    }

    pub fn login(&self, email: &str, password: &str) -> Result<User, DocsignError> {
        if password != DEMO_PASSWORD {
            warn!("rejected demo login for {}", email);
            return Err(DocsignError::InvalidCredentials);
        }
        let email = email.trim();
        if email.is_empty() {
            return Err(DocsignError::ValidationError("email is required".to_string()));
        }
        let user = User::for_email(email);
        self.backend.put(AUTH_USER_KEY, &serde_json::to_vec(&user)?)?;
        info!("logged in {} (admin: {})", user.email, user.is_admin);
        Ok(user)
    }

    pub fn logout(&self) -> Result<(), DocsignError> {
        self.backend.remove(AUTH_USER_KEY)?;
        info!("logged out");
        Ok(())
    }

    pub fn current_user(&self) -> Result<Option<User>, DocsignError> {
        match self.backend.get(AUTH_USER_KEY)? {
            Some(bytes) => Ok(Some(serde_json::from_slice(&bytes)?)),
            None => Ok(None),
        }
    }

    pub fn require_authenticated(&self) -> Result<User, DocsignError> {
        self.current_user()?.ok_or(DocsignError::Unauthenticated)
    }

    pub fn require_admin(&self) -> Result<User, DocsignError> {
        let user = self.require_authenticated()?;
        if user.is_admin {
            Ok(user)
        } else {
            Err(DocsignError::Forbidden { email: user.email })
        }
    }
}
