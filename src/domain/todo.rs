use std::fmt;

use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(transparent)]
pub struct TodoId(pub i64);

impl fmt::Display for TodoId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { write!(f, "{}", self.0) }
}

/// Fields the list view needs.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct TodoSummary {
    pub id: TodoId,
    pub title: String,
    #[serde(with = "finished_flag", default)]
    pub is_finished: bool,
    #[serde(with = "timestamp", default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
}

/// Full record shown by the detail view.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Todo {
    pub id: TodoId,
    pub title: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub description: String,
    #[serde(with = "finished_flag", default)]
    pub is_finished: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cover: Option<String>,
    #[serde(with = "timestamp", default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
}

impl Todo {
    pub fn summary(&self) -> TodoSummary {
        TodoSummary { id: self.id, title: self.title.clone(), is_finished: self.is_finished, created_at: self.created_at }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct NewTodo {
    pub title: String,
    pub description: String,
}

/// Body of an edit. All three fields are always sent; the server keeps no partial state.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct TodoUpdate {
    pub title: String,
    pub description: String,
    #[serde(with = "finished_flag")]
    pub is_finished: bool,
}

/// Completion filter for list requests.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ListFilter { #[default] All, Pending, Done }

impl ListFilter {
    pub fn next(self) -> Self {
        match self { ListFilter::All => ListFilter::Pending, ListFilter::Pending => ListFilter::Done, ListFilter::Done => ListFilter::All }
    }

    pub fn as_flag(self) -> Option<bool> {
        match self { ListFilter::All => None, ListFilter::Pending => Some(false), ListFilter::Done => Some(true) }
    }

    pub fn label(self) -> &'static str {
        match self { ListFilter::All => "All", ListFilter::Pending => "Pending", ListFilter::Done => "Done" }
    }
}

fn null_as_empty<'de, D: Deserializer<'de>>(d: D) -> Result<String, D::Error> {
    Ok(Option::<String>::deserialize(d)?.unwrap_or_default())
}

/// The API sends completion as `0`/`1`; some deployments send booleans.
pub mod finished_flag {
    use serde::de::{self, Unexpected};
    use super::*;

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Wire { Bool(bool), Int(i64) }

    pub fn serialize<S: Serializer>(value: &bool, s: S) -> Result<S::Ok, S::Error> { s.serialize_u8(u8::from(*value)) }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<bool, D::Error> {
        match Wire::deserialize(d)? {
            Wire::Bool(b) => Ok(b),
            Wire::Int(0) => Ok(false),
            Wire::Int(1) => Ok(true),
            Wire::Int(n) => Err(de::Error::invalid_value(Unexpected::Signed(n), &"0 or 1")),
        }
    }
}

/// RFC 3339 or `YYYY-MM-DD HH:MM:SS` (taken as UTC).
pub mod timestamp {
    use serde::de;
    use super::*;

    const PLAIN_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

    pub fn parse(raw: &str) -> Option<DateTime<Utc>> {
        if let Ok(dt) = DateTime::parse_from_rfc3339(raw) { return Some(dt.with_timezone(&Utc)); }
        NaiveDateTime::parse_from_str(raw, PLAIN_FORMAT).ok().map(|naive| naive.and_utc())
    }

    pub fn serialize<S: Serializer>(value: &Option<DateTime<Utc>>, s: S) -> Result<S::Ok, S::Error> {
        match value { Some(dt) => s.serialize_str(&dt.to_rfc3339()), None => s.serialize_none() }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Option<DateTime<Utc>>, D::Error> {
        match Option::<String>::deserialize(d)? {
            None => Ok(None),
            Some(raw) => parse(&raw).map(Some).ok_or_else(|| de::Error::custom(format!("invalid timestamp: {raw}"))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use serde_json::json;

    #[test]
    fn summary_accepts_integer_flag_and_missing_timestamp() {
        let s: TodoSummary = serde_json::from_value(json!({ "id": 1, "title": "Buy milk", "is_finished": 0 })).unwrap();
        assert_eq!(s.id, TodoId(1));
        assert!(!s.is_finished);
        assert_eq!(s.created_at, None);
    }

    #[test]
    fn todo_accepts_boolean_flag_and_plain_timestamp() {
        let t: Todo = serde_json::from_value(json!({
            "id": 7, "title": "Read", "description": null, "is_finished": true,
            "cover": "https://img.example/7.png", "created_at": "2024-05-01 08:30:00"
        })).unwrap();
        assert!(t.is_finished);
        assert_eq!(t.description, "");
        assert_eq!(t.cover.as_deref(), Some("https://img.example/7.png"));
        assert_eq!(t.created_at, Some(Utc.with_ymd_and_hms(2024, 5, 1, 8, 30, 0).unwrap()));
    }

    #[test]
    fn out_of_range_flag_is_rejected() {
        let res = serde_json::from_value::<TodoSummary>(json!({ "id": 1, "title": "x", "is_finished": 2 }));
        assert!(res.is_err());
    }

    #[test]
    fn update_serializes_flag_as_integer() {
        let body = serde_json::to_value(TodoUpdate { title: "a".into(), description: "".into(), is_finished: true }).unwrap();
        assert_eq!(body, json!({ "title": "a", "description": "", "is_finished": 1 }));
    }

    #[test]
    fn filter_cycles_through_all_states() {
        let f = ListFilter::default();
        assert_eq!(f.as_flag(), None);
        assert_eq!(f.next().as_flag(), Some(false));
        assert_eq!(f.next().next().as_flag(), Some(true));
        assert_eq!(f.next().next().next(), ListFilter::All);
    }
}
