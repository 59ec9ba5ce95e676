use crate::issue::{Issue, IssueUpdate, NewIssue};
use crate::store::IssueStore;
use crate::utils::object_id::ObjectId;

use anyhow::Result;
use async_trait::async_trait;
use tokio::sync::RwLock;

/// Keeps all issues in process memory. Nothing survives a restart.
#[derive(Default)]
pub(crate) struct MemoryIssueStore {
    issues: RwLock<Vec<Issue>>,
}

#[async_trait]
impl IssueStore for MemoryIssueStore {
    async fn insert(&self, issue: NewIssue) -> Result<Issue> {
        let issue = issue.into_issue(ObjectId::new());

        self.issues.write().await.push(issue.clone());

        Ok(issue)
    }

    async fn find_by_project(&self, project: &str) -> Result<Vec<Issue>> {
        let issues = self.issues.read().await;

        Ok(issues.iter().filter(|issue| issue.project == project).cloned().collect())
    }

    async fn update_by_id(&self, id: &ObjectId, update: IssueUpdate) -> Result<bool> {
        let mut issues = self.issues.write().await;

        Ok(match issues.iter_mut().find(|issue| &issue.id == id) {
            Some(issue) => {
                update.apply(issue);
                true
            }
            None => false
        })
    }

    async fn delete_by_id(&self, id: &ObjectId) -> Result<bool> {
        let mut issues = self.issues.write().await;
        let before = issues.len();

        issues.retain(|issue| &issue.id != id);

        Ok(issues.len() < before)
    }
}
