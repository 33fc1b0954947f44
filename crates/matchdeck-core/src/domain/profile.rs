//! User profile and match record models.
//!
//! Field names follow the stored document shape (`displayName`, `photoURL`,
//! `usersMatched`), so these types can be written to and read from the store
//! without a separate wire struct.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::ids::{MatchId, UserId};

/// A user's public profile, one document per user at `users/{id}`.
///
/// Pass and swipe records store a copy of the target's profile as their body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    pub id: UserId,
    pub display_name: String,
    #[serde(rename = "photoURL")]
    pub photo_url: String,
    pub age: u32,
    #[serde(default)]
    pub job: String,
}

impl UserProfile {
    /// Decode a profile document.
    ///
    /// Profile documents may omit their own id in the body; the document id
    /// is authoritative and overrides whatever the body says.
    pub fn from_document(
        doc_id: &str,
        data: &serde_json::Value,
    ) -> Result<Self, serde_json::Error> {
        let mut data = data.clone();
        if let serde_json::Value::Object(fields) = &mut data {
            fields.insert("id".to_string(), serde_json::Value::String(doc_id.to_string()));
        }
        serde_json::from_value(data)
    }
}

/// The record written once reciprocity is detected.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchRecord {
    /// Profile snapshots of both participants, keyed by user id.
    pub users: BTreeMap<UserId, UserProfile>,

    /// The pair of ids; the user whose swipe completed the match comes first.
    #[serde(rename = "usersMatched")]
    pub users_matched: [UserId; 2],

    /// Assigned by the store at commit time; absent until then.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<DateTime<Utc>>,
}

impl MatchRecord {
    pub fn new(actor: &UserProfile, target: &UserProfile) -> Self {
        let mut users = BTreeMap::new();
        users.insert(actor.id, actor.clone());
        users.insert(target.id, target.clone());
        Self {
            users,
            users_matched: [actor.id, target.id],
            timestamp: None,
        }
    }

    pub fn id(&self) -> MatchId {
        MatchId::between(self.users_matched[0], self.users_matched[1])
    }
}
