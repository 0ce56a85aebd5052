//! Vault entry data model.
//!
//! [`EntryIndex`] is the lightweight, non-secret directory listing fetched in
//! one round trip. [`CredentialRecord`] is the full decrypted field set for
//! one entry, fetched on demand and held only for the current invocation.

use std::fmt;

use serde::Deserialize;
use zeroize::{Zeroize, ZeroizeOnDrop};

use crate::error::Error;

/// One row of the vault directory. Enumerable without decrypting secrets.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct EntryIndex {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub url: String,
    pub uuid: String,
}

#[derive(Clone, Zeroize, ZeroizeOnDrop)]
struct Field {
    name: String,
    value: String,
}

/// The resolved secret payload for one entry.
///
/// Fields keep the order the vault returned them in; the reveal panel walks
/// them in exactly this order. Values are zeroed from memory on drop and
/// never appear in `Debug` output.
#[derive(Clone, Default, Zeroize, ZeroizeOnDrop)]
pub struct CredentialRecord {
    fields: Vec<Field>,
}

impl CredentialRecord {
    /// Parse one login object from a vault response.
    ///
    /// Scalar values are kept as strings; nested structures are not part of
    /// the record contract and are skipped. A record without both `login`
    /// and `password` is a protocol violation.
    pub fn from_value(value: &serde_json::Value) -> Result<Self, Error> {
        let obj = value
            .as_object()
            .ok_or_else(|| Error::Protocol("login entry is not an object".into()))?;

        let mut record = Self::default();
        for (name, v) in obj {
            let value = match v {
                serde_json::Value::String(s) => s.clone(),
                serde_json::Value::Number(n) => n.to_string(),
                serde_json::Value::Bool(b) => b.to_string(),
                serde_json::Value::Null
                | serde_json::Value::Array(_)
                | serde_json::Value::Object(_) => continue,
            };
            record.fields.push(Field {
                name: name.clone(),
                value,
            });
        }

        if record.get("login").is_none() || record.get("password").is_none() {
            return Err(Error::Protocol(
                "login entry is missing login or password".into(),
            ));
        }
        Ok(record)
    }

    /// Build a record from `(name, value)` pairs, preserving order.
    pub fn from_pairs<I, S>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (S, S)>,
        S: Into<String>,
    {
        Self {
            fields: pairs
                .into_iter()
                .map(|(name, value)| Field {
                    name: name.into(),
                    value: value.into(),
                })
                .collect(),
        }
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|f| f.name == name)
            .map(|f| f.value.as_str())
    }

    pub fn login(&self) -> &str {
        self.get("login").unwrap_or_default()
    }

    pub fn password(&self) -> &str {
        self.get("password").unwrap_or_default()
    }

    /// Replace a field's value in place, or append when absent. In-place
    /// replacement keeps the record's display order stable.
    pub fn set(&mut self, name: &str, value: String) {
        match self.fields.iter_mut().find(|f| f.name == name) {
            Some(field) => {
                field.value.zeroize();
                field.value = value;
            }
            None => self.fields.push(Field {
                name: name.to_string(),
                value,
            }),
        }
    }

    /// Apply the directory listing's override precedence: a non-empty index
    /// title or url wins over the same-named fetched field; an empty index
    /// field leaves the fetched value alone.
    pub fn apply_index(&mut self, index: &EntryIndex) {
        if !index.title.is_empty() {
            self.set("title", index.title.clone());
        }
        if !index.url.is_empty() {
            self.set("url", index.url.clone());
        }
    }

    /// Fields in vault order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.fields
            .iter()
            .map(|f| (f.name.as_str(), f.value.as_str()))
    }

    pub fn to_json(&self) -> serde_json::Value {
        let mut map = serde_json::Map::new();
        for f in &self.fields {
            map.insert(f.name.clone(), serde_json::Value::String(f.value.clone()));
        }
        serde_json::Value::Object(map)
    }
}

impl fmt::Debug for CredentialRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut s = f.debug_struct("CredentialRecord");
        for field in &self.fields {
            s.field(&field.name, &"[REDACTED]");
        }
        s.finish()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn index(title: &str, url: &str) -> EntryIndex {
        EntryIndex {
            title: title.into(),
            url: url.into(),
            uuid: "2dd61ba04a1a4ca39ba8b5ed904e7b12".into(),
        }
    }

    #[test]
    fn from_value_keeps_vault_field_order() {
        let record = CredentialRecord::from_value(&serde_json::json!({
            "login": "alice",
            "password": "s3cr3t",
            "url": "https://example.org",
            "notes": "a\nb",
        }))
        .unwrap();

        let names: Vec<&str> = record.iter().map(|(name, _)| name).collect();
        assert_eq!(names, vec!["login", "password", "url", "notes"]);
    }

    #[test]
    fn from_value_stringifies_scalars_and_skips_nested() {
        let record = CredentialRecord::from_value(&serde_json::json!({
            "login": "alice",
            "password": "pw",
            "uses": 3,
            "expired": false,
            "group": {"name": "x"},
        }))
        .unwrap();

        assert_eq!(record.get("uses"), Some("3"));
        assert_eq!(record.get("expired"), Some("false"));
        assert_eq!(record.get("group"), None);
    }

    #[test]
    fn from_value_requires_login_and_password() {
        let err = CredentialRecord::from_value(&serde_json::json!({"login": "alice"})).unwrap_err();
        assert!(matches!(err, Error::Protocol(_)));

        let err = CredentialRecord::from_value(&serde_json::json!("nope")).unwrap_err();
        assert!(matches!(err, Error::Protocol(_)));
    }

    #[test]
    fn nonempty_index_fields_override_fetched_values() {
        let mut record = CredentialRecord::from_pairs([
            ("login", "alice"),
            ("password", "pw"),
            ("title", "stale title"),
            ("url", "https://stale.example"),
        ]);

        record.apply_index(&index("Fresh Title", "https://fresh.example"));

        assert_eq!(record.get("title"), Some("Fresh Title"));
        assert_eq!(record.get("url"), Some("https://fresh.example"));
    }

    #[test]
    fn empty_index_fields_do_not_override() {
        let mut record = CredentialRecord::from_pairs([
            ("login", "alice"),
            ("password", "pw"),
            ("title", "kept"),
            ("url", "https://kept.example"),
        ]);

        record.apply_index(&index("", ""));

        assert_eq!(record.get("title"), Some("kept"));
        assert_eq!(record.get("url"), Some("https://kept.example"));
    }

    #[test]
    fn index_override_is_per_field() {
        // Empty title with a set url overrides only the url.
        let mut record =
            CredentialRecord::from_pairs([("login", "a"), ("password", "b"), ("title", "kept")]);

        record.apply_index(&index("", "https://new.example"));

        assert_eq!(record.get("title"), Some("kept"));
        assert_eq!(record.get("url"), Some("https://new.example"));
    }

    #[test]
    fn override_keeps_field_position() {
        let mut record = CredentialRecord::from_pairs([
            ("title", "old"),
            ("login", "alice"),
            ("password", "pw"),
        ]);

        record.apply_index(&index("new", ""));

        let names: Vec<&str> = record.iter().map(|(name, _)| name).collect();
        assert_eq!(names, vec!["title", "login", "password"]);
        assert_eq!(record.get("title"), Some("new"));
    }

    #[test]
    fn to_json_contains_all_fields() {
        let record = CredentialRecord::from_pairs([("login", "alice"), ("password", "s3cr3t")]);
        let json = record.to_json();
        assert_eq!(json["login"], "alice");
        assert_eq!(json["password"], "s3cr3t");
    }

    #[test]
    fn debug_never_shows_values() {
        let record = CredentialRecord::from_pairs([("password", "hunter2")]);
        let rendered = format!("{record:?}");
        assert!(!rendered.contains("hunter2"));
        assert!(rendered.contains("[REDACTED]"));
    }

    #[test]
    fn entry_index_deserializes_with_missing_fields() {
        let entry: EntryIndex =
            serde_json::from_value(serde_json::json!({"uuid": "abc123"})).unwrap();
        assert_eq!(entry.title, "");
        assert_eq!(entry.url, "");
    }
}
