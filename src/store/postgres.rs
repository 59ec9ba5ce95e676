use crate::issue::{Issue, IssueUpdate, NewIssue};
use crate::store::IssueStore;
use crate::utils::object_id::ObjectId;

use anyhow::{Context, Result};
use async_trait::async_trait;
use log::debug;
use sqlx::PgPool;

/// `created_on` is a millisecond precision utc timestamp and sorts lexicographically. Ids only break ties
/// as their counter part may wrap around.
const FIND_BY_PROJECT: &str = "select * from issues where project = $1 order by created_on, id";

pub(crate) const SCHEMA: &str = include_str!("../../schema.sql");

pub(crate) struct PgIssueStore {
    db_pool: PgPool,
}

impl PgIssueStore {
    pub(crate) fn new(db_pool: PgPool) -> Self {
        PgIssueStore { db_pool }
    }
}

#[async_trait]
impl IssueStore for PgIssueStore {
    async fn insert(&self, issue: NewIssue) -> Result<Issue> {
        let id = ObjectId::new();

        let issue: Issue = sqlx::query_as::<_, Issue>("insert into issues (id, project, issue_title, issue_text, created_on, updated_on, created_by, assigned_to, open, status_text) values ($1, $2, $3, $4, $5, $5, $6, $7, true, $8) returning *")
            .bind(id.to_string())
            .bind(&issue.project)
            .bind(&issue.issue_title)
            .bind(&issue.issue_text)
            .bind(&issue.created_on)
            .bind(&issue.created_by)
            .bind(&issue.assigned_to)
            .bind(&issue.status_text)
            .fetch_one(&self.db_pool)
            .await
            .context("Failed to insert issue into database")?;

        debug!("Inserted issue {} into project {}", &issue, &issue.project);

        Ok(issue)
    }

    async fn find_by_project(&self, project: &str) -> Result<Vec<Issue>> {
        let issues = sqlx::query_as::<_, Issue>(FIND_BY_PROJECT)
            .bind(project)
            .fetch_all(&self.db_pool)
            .await
            .with_context(|| format!("Failed to read issues of project {}", project))?;

        Ok(issues)
    }

    async fn update_by_id(&self, id: &ObjectId, update: IssueUpdate) -> Result<bool> {
        let result = sqlx::query(
            "update issues set \
                issue_title = coalesce($2, issue_title), \
                issue_text = coalesce($3, issue_text), \
                created_by = coalesce($4, created_by), \
                assigned_to = coalesce($5, assigned_to), \
                status_text = coalesce($6, status_text), \
                open = coalesce($7, open), \
                updated_on = $8 \
            where id = $1",
        )
            .bind(id.to_string())
            .bind(&update.issue_title)
            .bind(&update.issue_text)
            .bind(&update.created_by)
            .bind(&update.assigned_to)
            .bind(&update.status_text)
            .bind(update.open)
            .bind(&update.updated_on)
            .execute(&self.db_pool)
            .await
            .with_context(|| format!("Failed to update issue {}", id))?;

        Ok(result.rows_affected() > 0)
    }

    async fn delete_by_id(&self, id: &ObjectId) -> Result<bool> {
        let result = sqlx::query("delete from issues where id = $1")
            .bind(id.to_string())
            .execute(&self.db_pool)
            .await
            .with_context(|| format!("Failed to delete issue {}", id))?;

        Ok(result.rows_affected() > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use crate::issue::timestamp;

    #[test]
    fn issues_are_listed_by_creation_time() {
        assert!(FIND_BY_PROJECT.ends_with("order by created_on, id"));

        let earlier = timestamp();
        std::thread::sleep(std::time::Duration::from_millis(2));
        assert!(earlier < timestamp());
    }
}
