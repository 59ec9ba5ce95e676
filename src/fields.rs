use crate::err;

use anyhow::Result;
use qstring::QString;
use serde_json::{Map, Value};

/// Fields sent in the body of a request, either as json object or url encoded form.
///
/// Form values are always strings, json values keep their type. A `null` json value is treated
/// as if the field was not sent at all.
#[derive(Debug, Default, Clone, PartialEq)]
pub(crate) struct Fields(Map<String, Value>);

impl Fields {
    /// Parses the request body. An empty body results in no fields regardless of content type.
    pub(crate) fn parse(content_type: Option<&str>, body: &[u8]) -> Result<Fields> {
        if body.iter().all(u8::is_ascii_whitespace) {
            return Ok(Fields::default());
        }

        let is_json = content_type.map_or(false, |content_type| content_type.to_ascii_lowercase().contains("json"));

        if is_json {
            return match serde_json::from_slice::<Value>(body) {
                Ok(Value::Object(map)) => Ok(Fields(map)),
                _ => Err(err!(BAD_REQUEST, "Malformed request body"))
            };
        }

        let body = std::str::from_utf8(body).map_err(|_| err!(BAD_REQUEST, "Malformed request body"))?;

        // `+` encodes a space in forms, a literal plus is sent as %2B
        Ok(QString::from(body.replace('+', "%20").as_str())
            .into_pairs()
            .into_iter()
            .map(|(key, value)| (key, Value::String(value)))
            .collect())
    }

    /// Returns the field formatted as text. Strings are returned as-is, other json values
    /// (numbers, booleans, ...) as their json representation.
    pub(crate) fn text(&self, key: &str) -> Option<String> {
        match self.0.get(key)? {
            Value::Null => None,
            Value::String(str) => Some(str.clone()),
            other => Some(other.to_string())
        }
    }

    /// Returns the field as boolean. `Some(Err)` if the field was sent but is not a boolean.
    ///
    /// Accepted are json booleans, `1` and `0`, as well as their string representations.
    pub(crate) fn boolean(&self, key: &str) -> Option<Result<bool, String>> {
        let text = self.text(key)?;

        Some(match text.to_ascii_lowercase().as_str() {
            "true" | "1" => Ok(true),
            "false" | "0" => Ok(false),
            _ => Err(text)
        })
    }

    /// Removes the field from this set and returns it as text.
    pub(crate) fn remove(&mut self, key: &str) -> Option<String> {
        let text = self.text(key);
        self.0.remove(key);
        text
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl FromIterator<(String, Value)> for Fields {
    fn from_iter<I: IntoIterator<Item = (String, Value)>>(iter: I) -> Self {
        Fields(iter.into_iter().collect())
    }
}

impl From<Value> for Fields {
    /// Non-object values result in no fields.
    fn from(value: Value) -> Self {
        match value {
            Value::Object(map) => Fields(map),
            _ => Fields::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use serde_json::json;

    #[test]
    fn parses_url_encoded_forms() {
        let fields = Fields::parse(
            Some("application/x-www-form-urlencoded"),
            b"issue_title=Fix+error&issue_text=1%2B1&created_by=Joe&assigned_to=",
        ).unwrap();

        assert_eq!(fields.text("issue_title").as_deref(), Some("Fix error"));
        assert_eq!(fields.text("issue_text").as_deref(), Some("1+1"));
        assert_eq!(fields.text("created_by").as_deref(), Some("Joe"));
        assert_eq!(fields.text("assigned_to").as_deref(), Some(""));
        assert_eq!(fields.text("status_text"), None);
    }

    #[test]
    fn parses_json_objects() {
        let fields = Fields::parse(Some("application/json; charset=utf-8"), br#"{"_id": 745, "open": false, "issue_text": null}"#).unwrap();

        assert_eq!(fields.text("_id").as_deref(), Some("745"));
        assert_eq!(fields.boolean("open"), Some(Ok(false)));
        assert_eq!(fields.text("issue_text"), None);
    }

    #[test]
    fn empty_body_has_no_fields() {
        assert!(Fields::parse(Some("application/json"), b"").unwrap().is_empty());
        assert!(Fields::parse(None, b"  ").unwrap().is_empty());
    }

    #[test]
    fn rejects_malformed_json() {
        assert!(Fields::parse(Some("application/json"), b"{\"_id\":").is_err());
        assert!(Fields::parse(Some("application/json"), b"[1, 2]").is_err());
    }

    #[test]
    fn booleans_accept_strings() {
        let fields = Fields::from(json!({ "a": "true", "b": "0", "c": true, "d": "maybe" }));

        assert_eq!(fields.boolean("a"), Some(Ok(true)));
        assert_eq!(fields.boolean("b"), Some(Ok(false)));
        assert_eq!(fields.boolean("c"), Some(Ok(true)));
        assert_eq!(fields.boolean("d"), Some(Err("maybe".to_owned())));
        assert_eq!(fields.boolean("e"), None);
    }

    #[test]
    fn remove_takes_field_out_of_the_set() {
        let mut fields = Fields::from(json!({ "_id": "64fa70ee35412c842c4fccd0" }));

        assert_eq!(fields.remove("_id").as_deref(), Some("64fa70ee35412c842c4fccd0"));
        assert!(fields.is_empty());
    }
}
