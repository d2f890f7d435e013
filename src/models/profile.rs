//! User profile model for storage and API.

use crate::error::AppError;
use serde::{Deserialize, Serialize};

const MAX_DISPLAY_NAME_LEN: usize = 50;

/// User profile stored in Firestore, keyed by user ID.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Profile {
    /// User ID from the identity provider (also used as document ID)
    pub id: String,
    #[serde(default)]
    pub display_name: Option<String>,
    /// Avatar color key or uploaded image URL
    #[serde(default)]
    pub avatar_url: Option<String>,
    #[serde(default)]
    pub created_at: String,
    /// Can moderate resort submissions
    #[serde(default)]
    pub admin: bool,
}

/// Profile fields a user may change.
#[derive(Debug, Clone, Deserialize)]
pub struct ProfileInput {
    pub display_name: String,
    #[serde(default)]
    pub avatar_url: Option<String>,
}

impl ProfileInput {
    /// Apply to an existing profile (or a fresh one). `admin` is never
    /// taken from user input.
    pub fn apply(self, existing: Option<Profile>, user_id: &str, now: &str) -> Result<Profile, AppError> {
        let display_name = self.display_name.trim();
        if display_name.is_empty() || display_name.chars().count() > MAX_DISPLAY_NAME_LEN {
            return Err(AppError::BadRequest(format!(
                "display_name must be 1-{} characters",
                MAX_DISPLAY_NAME_LEN
            )));
        }

        let mut profile = existing.unwrap_or_else(|| Profile {
            id: user_id.to_string(),
            display_name: None,
            avatar_url: None,
            created_at: now.to_string(),
            admin: false,
        });
        profile.display_name = Some(display_name.to_string());
        profile.avatar_url = self.avatar_url;
        Ok(profile)
    }
}
