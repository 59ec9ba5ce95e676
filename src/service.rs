use crate::fields::Fields;
use crate::filter::Filter;
use crate::issue::{timestamp, Issue, IssueUpdate, NewIssue};
use crate::store::IssueStore;
use crate::utils::object_id;

use std::sync::Arc;

use anyhow::Result;
use log::{debug, info};
use serde::Serialize;

pub(crate) const REQUIRED_FIELDS_MISSING: &str = "required field(s) missing";
pub(crate) const MISSING_ID: &str = "missing _id";
pub(crate) const NO_UPDATE_FIELDS: &str = "no update field(s) sent";
pub(crate) const COULD_NOT_UPDATE: &str = "could not update";
pub(crate) const COULD_NOT_DELETE: &str = "could not delete";
pub(crate) const UPDATED: &str = "successfully updated";
pub(crate) const DELETED: &str = "successfully deleted";

/// Payload of a handled request.
///
/// Validation errors are replies as well (not `Err`), they are sent with status 200 and
/// can only be told apart from successes by the `error` key.
#[derive(Serialize, Debug, PartialEq)]
#[serde(untagged)]
pub(crate) enum Reply {
    Issue(Issue),
    Success {
        result: &'static str,
        #[serde(rename = "_id")]
        id: String,
    },
    Failure {
        error: &'static str,
        #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
        id: Option<String>,
    },
}

impl Reply {
    fn success(result: &'static str, id: String) -> Reply {
        Reply::Success { result, id }
    }

    fn failure(error: &'static str) -> Reply {
        Reply::Failure { error, id: None }
    }

    fn failure_with_id(error: &'static str, id: String) -> Reply {
        Reply::Failure { error, id: Some(id) }
    }

    pub(crate) fn is_failure(&self) -> bool {
        matches!(self, Reply::Failure { .. })
    }
}

/// Validation and filtering in front of an [IssueStore].
///
/// Every method performs at most one store operation and only after all validation passed.
/// `Err` is only returned for store failures.
pub(crate) struct IssueService {
    store: Arc<dyn IssueStore>,
}

impl IssueService {
    pub(crate) fn new(store: Arc<dyn IssueStore>) -> Self {
        IssueService { store }
    }

    pub(crate) async fn create(&self, project: &str, fields: &Fields) -> Result<Reply> {
        let (issue_title, issue_text, created_by) = match (fields.text("issue_title"), fields.text("issue_text"), fields.text("created_by")) {
            (Some(title), Some(text), Some(created_by)) => (title, text, created_by),
            _ => return Ok(Reply::failure(REQUIRED_FIELDS_MISSING))
        };

        let issue = self.store.insert(NewIssue {
            project: project.to_owned(),
            issue_title,
            issue_text,
            created_by,
            assigned_to: fields.text("assigned_to").unwrap_or_default(),
            status_text: fields.text("status_text").unwrap_or_default(),
            created_on: timestamp(),
        }).await?;

        info!("New issue created: {} in project {}", &issue, project);

        Ok(Reply::Issue(issue))
    }

    pub(crate) async fn list(&self, project: &str, filter: &Filter) -> Result<Vec<Issue>> {
        let issues = self.store.find_by_project(project).await?;
        let total = issues.len();

        let issues = filter.apply(issues);

        debug!("Listing {} of {} issues in project {} ({:?})", issues.len(), total, project, filter);

        Ok(issues)
    }

    pub(crate) async fn update(&self, mut fields: Fields) -> Result<Reply> {
        // The id is never part of the update, clients may not change it
        let id = match fields.remove("_id") {
            Some(id) => id,
            None => return Ok(Reply::failure(MISSING_ID))
        };

        if fields.is_empty() {
            return Ok(Reply::failure_with_id(NO_UPDATE_FIELDS, id));
        }

        let object_id = match object_id::parse_canonical(id.as_str()) {
            Some(object_id) => object_id,
            None => return Ok(Reply::failure_with_id(COULD_NOT_UPDATE, id))
        };

        let update = match issue_update(&fields) {
            Some(update) => update,
            None => return Ok(Reply::failure_with_id(COULD_NOT_UPDATE, id))
        };

        if !self.store.update_by_id(&object_id, update).await? {
            return Ok(Reply::failure_with_id(COULD_NOT_UPDATE, id));
        }

        debug!("Updated issue {}", &object_id);

        Ok(Reply::success(UPDATED, id))
    }

    pub(crate) async fn delete(&self, fields: &Fields) -> Result<Reply> {
        let id = match fields.text("_id") {
            Some(id) => id,
            None => return Ok(Reply::failure(MISSING_ID))
        };

        let object_id = match object_id::parse_canonical(id.as_str()) {
            Some(object_id) => object_id,
            None => return Ok(Reply::failure_with_id(COULD_NOT_DELETE, id))
        };

        if !self.store.delete_by_id(&object_id).await? {
            return Ok(Reply::failure_with_id(COULD_NOT_DELETE, id));
        }

        info!("Deleted issue {}", &object_id);

        Ok(Reply::success(DELETED, id))
    }
}

/// Builds the partial update out of the sent fields and stamps `updated_on`.
///
/// Only fields a client may change are picked up, everything else (`project`, `created_on`, unknown keys)
/// is ignored. Returns `None` if `open` is not a boolean.
fn issue_update(fields: &Fields) -> Option<IssueUpdate> {
    let open = match fields.boolean("open") {
        Some(Ok(open)) => Some(open),
        Some(Err(value)) => {
            debug!("Rejecting update with non-boolean open value `{}`", value);
            return None;
        }
        None => None
    };

    Some(IssueUpdate {
        issue_title: fields.text("issue_title"),
        issue_text: fields.text("issue_text"),
        created_by: fields.text("created_by"),
        assigned_to: fields.text("assigned_to"),
        status_text: fields.text("status_text"),
        open,
        updated_on: timestamp(),
    })
}
