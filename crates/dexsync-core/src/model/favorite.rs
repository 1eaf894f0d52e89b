// ── Favorites and pending sync actions ──
//
// These are persisted verbatim, so the serde field names are part of the
// on-disk format: `{id, name, image, addedAt}` for entries and
// `{action, pokemon, timestamp}` for queued actions.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

/// A catalog entry the user marked as favorite.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FavoriteEntry {
    pub id: u32,
    pub name: String,
    #[serde(rename = "image")]
    pub image_url: String,
    pub added_at: DateTime<Utc>,
}

/// The minimum a caller supplies to mark something as favorite.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FavoriteInput {
    pub id: u32,
    pub name: String,
}

impl FavoriteInput {
    pub fn new(id: u32, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
        }
    }
}

/// Direction of a queued favorites change.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum SyncActionKind {
    Add,
    Remove,
}

/// A local favorites change not yet reconciled.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PendingSyncAction {
    #[serde(rename = "action")]
    pub kind: SyncActionKind,
    #[serde(rename = "pokemon")]
    pub entry: FavoriteEntry,
    pub timestamp: DateTime<Utc>,
}

impl PendingSyncAction {
    pub fn new(kind: SyncActionKind, entry: FavoriteEntry, timestamp: DateTime<Utc>) -> Self {
        Self {
            kind,
            entry,
            timestamp,
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn entry() -> FavoriteEntry {
        FavoriteEntry {
            id: 25,
            name: "pikachu".into(),
            image_url: "https://img.example/25.png".into(),
            added_at: Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap(),
        }
    }

    #[test]
    fn entry_uses_stored_field_names() {
        let json = serde_json::to_value(entry()).unwrap();
        assert_eq!(json["id"], 25);
        assert_eq!(json["image"], "https://img.example/25.png");
        assert_eq!(json["addedAt"], "2024-05-01T12:00:00Z");
        assert!(json.get("image_url").is_none());
    }

    #[test]
    fn action_uses_stored_field_names() {
        let action = PendingSyncAction::new(SyncActionKind::Remove, entry(), entry().added_at);
        let json = serde_json::to_value(&action).unwrap();
        assert_eq!(json["action"], "remove");
        assert_eq!(json["pokemon"]["name"], "pikachu");
    }

    #[test]
    fn reads_entries_written_with_millisecond_timestamps() {
        let raw = r#"{"id":1,"name":"bulbasaur","image":"x","addedAt":"2024-01-02T03:04:05.678Z"}"#;
        let parsed: FavoriteEntry = serde_json::from_str(raw).unwrap();
        assert_eq!(parsed.id, 1);
        assert_eq!(parsed.added_at.timestamp_subsec_millis(), 678);
    }

    #[test]
    fn action_kind_parses_from_text() {
        assert_eq!("add".parse::<SyncActionKind>().unwrap(), SyncActionKind::Add);
        assert_eq!(SyncActionKind::Remove.to_string(), "remove");
    }
}
