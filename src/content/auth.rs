//! Identity, roles and the admin write capability.
//!
//! Sign-in itself is handled by the identity provider. This module only turns
//! an authenticated user id into a role by reading its profile record.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::client::RemoteStore;

/// Role stored on a user's profile.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UserRole {
    Admin,
    #[default]
    User,
}

/// `profiles` row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Profile {
    pub id: Uuid,
    #[serde(default)]
    pub role: UserRole,
    #[serde(default)]
    pub avatar_url: Option<String>,
}

/// Proof that the caller may write remote content.
///
/// Only obtainable from a [`Session`] whose profile has the admin role.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AdminCapability {
    _private: (),
}

/// The current user, if any, with their resolved profile.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Session {
    pub user_id: Option<Uuid>,
    pub email: Option<String>,
    pub profile: Option<Profile>,
}

impl Session {
    /// Nobody signed in.
    pub fn anonymous() -> Self {
        Self::default()
    }

    /// Resolve the profile of a signed-in user.
    ///
    /// A missing profile, an absent remote or a failed lookup all leave the
    /// user with the default role.
    pub async fn resolve<R: RemoteStore>(
        remote: Option<&R>,
        user_id: Uuid,
        email: Option<String>,
    ) -> Self {
        let profile = match remote {
            Some(remote) => match remote.fetch_profile(user_id).await {
                Ok(profile) => profile,
                Err(e) => {
                    tracing::error!("Error fetching profile for {}: {}", user_id, e);
                    None
                }
            },
            None => None,
        };

        Self {
            user_id: Some(user_id),
            email,
            profile,
        }
    }

    pub fn is_signed_in(&self) -> bool {
        self.user_id.is_some()
    }

    pub fn role(&self) -> UserRole {
        self.profile.as_ref().map(|p| p.role).unwrap_or_default()
    }

    /// Name shown in the profile card: the local part of the email.
    pub fn display_name(&self) -> Option<&str> {
        self.email.as_deref().and_then(|e| e.split('@').next())
    }

    /// Write capability for admins, `None` for everyone else.
    pub fn admin_capability(&self) -> Option<AdminCapability> {
        (self.is_signed_in() && self.role() == UserRole::Admin)
            .then_some(AdminCapability { _private: () })
    }
}
