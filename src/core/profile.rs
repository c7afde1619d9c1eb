use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::core::types::UserId;

/// A registered user as held by the storage layer.
///
/// Note there is no partner pointer here: partnership membership lives
/// exclusively in the relation table, and "does this user have a partner"
/// is an existence query against it. A denormalized pointer on the user
/// record can drift out of sync with the relation and is deliberately
/// absent.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserRecord {
    pub id: UserId,
    pub name: String,
    /// Stored lowercased; unique across users
    pub email: String,
    pub bio: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Fields supplied when registering a new user
#[derive(Debug, Clone)]
pub struct NewUser {
    pub name: String,
    pub email: String,
    pub bio: Option<String>,
}

/// Public view of a user, safe to return to other users
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserProfile {
    pub id: UserId,
    pub name: String,
    pub bio: Option<String>,
    pub member_since: DateTime<Utc>,
}

impl UserProfile {
    #[must_use]
    pub fn from_record(record: &UserRecord) -> Self {
        Self {
            id: record.id.clone(),
            name: record.name.clone(),
            bio: record.bio.clone(),
            member_since: record.created_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_profile_hides_email() {
        let record = UserRecord {
            id: UserId::new("u1"),
            name: "Alice".to_string(),
            email: "alice@example.com".to_string(),
            bio: Some("running and reading".to_string()),
            created_at: Utc::now(),
        };

        let profile = UserProfile::from_record(&record);
        let json = serde_json::to_string(&profile).unwrap();
        assert!(!json.contains("alice@example.com"));
        assert!(json.contains("Alice"));
    }
}
