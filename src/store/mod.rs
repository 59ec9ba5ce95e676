use crate::issue::{Issue, IssueUpdate, NewIssue};
use crate::utils::object_id::ObjectId;

use anyhow::Result;
use async_trait::async_trait;

pub(crate) mod memory;
pub(crate) mod postgres;

/// Persistence used by the [IssueService](crate::service::IssueService).
///
/// Every method is a single store operation. Errors are connection or query failures,
/// a missing record is not an error.
#[async_trait]
pub(crate) trait IssueStore: Send + Sync {
    /// Saves the issue and returns it including its newly assigned id.
    async fn insert(&self, issue: NewIssue) -> Result<Issue>;

    /// Returns all issues of the project in insertion order.
    async fn find_by_project(&self, project: &str) -> Result<Vec<Issue>>;

    /// Merges the update into the issue with the provided id. Returns `false` if no such issue exists.
    async fn update_by_id(&self, id: &ObjectId, update: IssueUpdate) -> Result<bool>;

    /// Removes the issue with the provided id. Returns `false` if no such issue exists.
    async fn delete_by_id(&self, id: &ObjectId) -> Result<bool>;
}
