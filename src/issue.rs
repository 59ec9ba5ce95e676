use crate::utils::object_id::ObjectId;

use chrono::{SecondsFormat, Utc};
use derive_more::Display;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A single tracked item of a project.
///
/// Field order matches the order of the keys in the json representation.
#[derive(FromRow, Display, Debug, Clone, PartialEq, Deserialize, Serialize)]
#[display(fmt = "{} ({})", issue_title, id)]
pub(crate) struct Issue {
    #[serde(rename = "_id")]
    #[sqlx(try_from = "String")]
    pub(crate) id: ObjectId,

    pub(crate) project: String, // Write-once

    pub(crate) issue_title: String,
    pub(crate) issue_text: String,

    pub(crate) created_on: String, // Write-once
    pub(crate) updated_on: String,

    pub(crate) created_by: String,
    pub(crate) assigned_to: String,

    pub(crate) open: bool,
    pub(crate) status_text: String,
}

impl Issue {
    /// Returns the value of the attribute with the provided json key, formatted as string.
    ///
    /// Returns `None` if the issue has no attribute with that key.
    pub(crate) fn attribute(&self, key: &str) -> Option<String> {
        Some(match key {
            "_id" => self.id.to_string(),
            "project" => self.project.clone(),
            "issue_title" => self.issue_title.clone(),
            "issue_text" => self.issue_text.clone(),
            "created_on" => self.created_on.clone(),
            "updated_on" => self.updated_on.clone(),
            "created_by" => self.created_by.clone(),
            "assigned_to" => self.assigned_to.clone(),
            "open" => self.open.to_string(),
            "status_text" => self.status_text.clone(),
            _ => return None
        })
    }
}

/// An issue which has not yet been saved to the store, thus has no id yet.
#[derive(Debug, Clone)]
pub(crate) struct NewIssue {
    pub(crate) project: String,
    pub(crate) issue_title: String,
    pub(crate) issue_text: String,
    pub(crate) created_by: String,
    pub(crate) assigned_to: String,
    pub(crate) status_text: String,
    pub(crate) created_on: String,
}

impl NewIssue {
    /// Attaches the store assigned id. `updated_on` equals `created_on` and `open` is always `true`.
    pub(crate) fn into_issue(self, id: ObjectId) -> Issue {
        Issue {
            id,
            project: self.project,
            issue_title: self.issue_title,
            issue_text: self.issue_text,
            updated_on: self.created_on.clone(),
            created_on: self.created_on,
            created_by: self.created_by,
            assigned_to: self.assigned_to,
            open: true,
            status_text: self.status_text,
        }
    }
}

/// Partial update of an issue. `None` fields are left untouched.
#[derive(Debug, Clone, Default)]
pub(crate) struct IssueUpdate {
    pub(crate) issue_title: Option<String>,
    pub(crate) issue_text: Option<String>,
    pub(crate) created_by: Option<String>,
    pub(crate) assigned_to: Option<String>,
    pub(crate) status_text: Option<String>,
    pub(crate) open: Option<bool>,
    pub(crate) updated_on: String,
}

impl IssueUpdate {
    pub(crate) fn apply(&self, issue: &mut Issue) {
        fn merge<T: Clone>(target: &mut T, value: &Option<T>) {
            if let Some(value) = value {
                *target = value.clone();
            }
        }

        merge(&mut issue.issue_title, &self.issue_title);
        merge(&mut issue.issue_text, &self.issue_text);
        merge(&mut issue.created_by, &self.created_by);
        merge(&mut issue.assigned_to, &self.assigned_to);
        merge(&mut issue.status_text, &self.status_text);
        merge(&mut issue.open, &self.open);

        issue.updated_on = self.updated_on.clone();
    }
}

/// Current time in the format used for `created_on` and `updated_on`, e.g. `2023-09-08T15:29:08.176Z`
pub(crate) fn timestamp() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn issue() -> Issue {
        NewIssue {
            project: "apitest".to_owned(),
            issue_title: "Fix error in posting data".to_owned(),
            issue_text: "When we post data it has an error.".to_owned(),
            created_by: "Joe".to_owned(),
            assigned_to: String::new(),
            status_text: String::new(),
            created_on: "2023-09-08T15:29:08.176Z".to_owned(),
        }.into_issue("64fb3dc40deb0cbfe1bc9993".parse().unwrap())
    }

    #[test]
    fn serializes_in_document_order() {
        let json = serde_json::to_string(&issue()).unwrap();

        assert_eq!(json, concat!(
            r#"{"_id":"64fb3dc40deb0cbfe1bc9993","project":"apitest","issue_title":"Fix error in posting data","#,
            r#""issue_text":"When we post data it has an error.","created_on":"2023-09-08T15:29:08.176Z","#,
            r#""updated_on":"2023-09-08T15:29:08.176Z","created_by":"Joe","assigned_to":"","open":true,"status_text":""}"#
        ));
    }

    #[test]
    fn attributes_are_string_normalized() {
        let issue = issue();

        assert_eq!(issue.attribute("open").as_deref(), Some("true"));
        assert_eq!(issue.attribute("_id").as_deref(), Some("64fb3dc40deb0cbfe1bc9993"));
        assert_eq!(issue.attribute("assigned_to").as_deref(), Some(""));
        assert_eq!(issue.attribute("status_test"), None);
    }

    #[test]
    fn update_only_touches_provided_fields() {
        let mut issue = issue();

        IssueUpdate {
            issue_text: Some("text updated".to_owned()),
            open: Some(false),
            updated_on: "2023-09-09T10:00:00.000Z".to_owned(),
            ..Default::default()
        }.apply(&mut issue);

        assert_eq!(issue.issue_text, "text updated");
        assert!(!issue.open);
        assert_eq!(issue.issue_title, "Fix error in posting data");
        assert_eq!(issue.created_on, "2023-09-08T15:29:08.176Z");
        assert_eq!(issue.updated_on, "2023-09-09T10:00:00.000Z");
    }

    #[test]
    fn timestamps_have_millisecond_precision() {
        let now = timestamp();

        assert_eq!(now.len(), "2023-09-08T15:29:08.176Z".len());
        assert!(now.ends_with('Z'));
    }
}
