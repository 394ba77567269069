//! Purpose: Tasks, their goals, and the transactions performed on them.
//! Exports: `Task`, `TaskGoal`, `TaskTransaction`.
//! Role: The unit of collaboration the task manager persists and routes.
//! Invariants: A task always names a goal, a requester, and a task type.
//! Invariants: Transactions are server-materialized history; they never merge in.
//! Invariants: A closed task closes at or after its creation time.

use crate::core::error::Error;
use crate::core::merge::{
    Identified, Merge, Update, merge_field, merge_nested, merge_text, validate_identified_list,
    validate_list,
};
use crate::core::validate::{
    DESCRIPTION_LEN_MAX, TEXT_LEN_MAX, Validate, ValidationContext, text_of, validate_json_object,
    validate_keywords, validate_required_text, validate_text, validate_timestamp,
};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::norm::ProtocolNorm;

#[derive(Clone, Debug, Default, Deserialize, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskGoal {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub keywords: Option<Vec<String>>,
}

#[async_trait]
impl Validate for TaskGoal {
    async fn validate(&self, ctx: &ValidationContext<'_>) -> Result<(), Error> {
        validate_required_text(&ctx.field("name"), &self.name, TEXT_LEN_MAX)?;
        validate_text(&ctx.field("description"), &self.description, DESCRIPTION_LEN_MAX)?;
        validate_keywords(ctx, "keywords", &self.keywords)?;
        Ok(())
    }
}

#[async_trait]
impl Merge for TaskGoal {
    async fn merge(&self, source: Self, ctx: &ValidationContext<'_>) -> Result<Self, Error> {
        let merged = Self {
            name: merge_text(&self.name, source.name),
            description: merge_text(&self.description, source.description),
            keywords: merge_field(&self.keywords, source.keywords),
        };
        merged.validate(ctx).await?;
        Ok(merged)
    }
}

/// An action a user performed (or asked to perform) on a task.
#[derive(Clone, Debug, Default, Deserialize, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskTransaction {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub task_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub attributes: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub actioneer_id: Option<String>,
    #[serde(default, rename = "_creationTs", skip_serializing_if = "Option::is_none")]
    pub creation_ts: Option<i64>,
    #[serde(default, rename = "_lastUpdateTs", skip_serializing_if = "Option::is_none")]
    pub last_update_ts: Option<i64>,
}

impl Identified for TaskTransaction {
    fn id(&self) -> Option<&str> {
        self.id.as_deref()
    }
}

#[async_trait]
impl Validate for TaskTransaction {
    async fn validate(&self, ctx: &ValidationContext<'_>) -> Result<(), Error> {
        validate_text(&ctx.field("id"), &self.id, TEXT_LEN_MAX)?;
        validate_text(&ctx.field("taskId"), &self.task_id, TEXT_LEN_MAX)?;
        validate_required_text(&ctx.field("label"), &self.label, TEXT_LEN_MAX)?;
        validate_json_object(&ctx.field("attributes"), &self.attributes)?;
        validate_text(&ctx.field("actioneerId"), &self.actioneer_id, TEXT_LEN_MAX)?;
        validate_timestamp(&ctx.field("_creationTs"), self.creation_ts)?;
        validate_timestamp(&ctx.field("_lastUpdateTs"), self.last_update_ts)?;
        if let Some(task_id) = text_of(&self.task_id) {
            ctx.field("taskId").check_task(task_id).await?;
        }
        if let Some(actioneer_id) = text_of(&self.actioneer_id) {
            ctx.field("actioneerId").check_profile(actioneer_id).await?;
        }
        Ok(())
    }
}

#[derive(Clone, Debug, Default, Deserialize, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub task_type_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub requester_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub app_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub community_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub goal: Option<TaskGoal>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub norms: Option<Vec<ProtocolNorm>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub attributes: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub close_ts: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub transactions: Option<Vec<TaskTransaction>>,
    #[serde(default, rename = "_creationTs", skip_serializing_if = "Option::is_none")]
    pub creation_ts: Option<i64>,
    #[serde(default, rename = "_lastUpdateTs", skip_serializing_if = "Option::is_none")]
    pub last_update_ts: Option<i64>,
}

#[async_trait]
impl Validate for Task {
    async fn validate(&self, ctx: &ValidationContext<'_>) -> Result<(), Error> {
        validate_text(&ctx.field("id"), &self.id, TEXT_LEN_MAX)?;
        validate_required_text(&ctx.field("taskTypeId"), &self.task_type_id, TEXT_LEN_MAX)?;
        validate_required_text(&ctx.field("requesterId"), &self.requester_id, TEXT_LEN_MAX)?;
        validate_text(&ctx.field("appId"), &self.app_id, TEXT_LEN_MAX)?;
        validate_text(&ctx.field("communityId"), &self.community_id, TEXT_LEN_MAX)?;
        let Some(goal) = &self.goal else {
            return Err(ctx.field("goal").error("value is required"));
        };
        goal.validate(&ctx.field("goal")).await?;
        validate_list(&self.norms, ctx, "norms").await?;
        validate_json_object(&ctx.field("attributes"), &self.attributes)?;
        validate_timestamp(&ctx.field("closeTs"), self.close_ts)?;
        validate_timestamp(&ctx.field("_creationTs"), self.creation_ts)?;
        validate_timestamp(&ctx.field("_lastUpdateTs"), self.last_update_ts)?;
        if let (Some(close_ts), Some(creation_ts)) = (self.close_ts, self.creation_ts) {
            if close_ts < creation_ts {
                return Err(ctx
                    .field("closeTs")
                    .error("a task cannot close before it was created"));
            }
        }
        validate_identified_list(&self.transactions, ctx, "transactions").await?;
        if let Some(task_type_id) = text_of(&self.task_type_id) {
            ctx.field("taskTypeId").check_task_type(task_type_id).await?;
        }
        if let Some(requester_id) = text_of(&self.requester_id) {
            ctx.field("requesterId").check_profile(requester_id).await?;
        }
        if let Some(community_id) = text_of(&self.community_id) {
            ctx.field("communityId").check_community(community_id).await?;
        }
        Ok(())
    }
}

#[async_trait]
impl Merge for Task {
    async fn merge(&self, source: Self, ctx: &ValidationContext<'_>) -> Result<Self, Error> {
        if source.transactions.is_some() {
            return Err(ctx
                .field("transactions")
                .error("task transactions are service history and cannot be merged"));
        }
        let merged = Self {
            id: self.id.clone(),
            task_type_id: merge_text(&self.task_type_id, source.task_type_id),
            requester_id: merge_text(&self.requester_id, source.requester_id),
            app_id: merge_text(&self.app_id, source.app_id),
            community_id: merge_text(&self.community_id, source.community_id),
            goal: merge_nested(&self.goal, source.goal, &ctx.field("goal")).await?,
            norms: merge_field(&self.norms, source.norms),
            attributes: merge_field(&self.attributes, source.attributes),
            close_ts: merge_field(&self.close_ts, source.close_ts),
            transactions: self.transactions.clone(),
            creation_ts: self.creation_ts,
            last_update_ts: self.last_update_ts,
        };
        merged.validate(ctx).await?;
        Ok(merged)
    }
}

#[async_trait]
impl Update for Task {
    async fn update(&self, source: Self, ctx: &ValidationContext<'_>) -> Result<Self, Error> {
        if source.transactions.is_some() {
            return Err(ctx
                .field("transactions")
                .error("task transactions are service history and cannot be replaced"));
        }
        let updated = Self {
            id: self.id.clone(),
            transactions: self.transactions.clone(),
            creation_ts: self.creation_ts,
            last_update_ts: self.last_update_ts,
            ..source
        };
        updated.validate(ctx).await?;
        Ok(updated)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn task() -> Task {
        Task {
            id: Some("t1".to_string()),
            task_type_id: Some("tt1".to_string()),
            requester_id: Some("u1".to_string()),
            app_id: Some("app1".to_string()),
            goal: Some(TaskGoal {
                name: Some("fix a flat tire".to_string()),
                ..TaskGoal::default()
            }),
            attributes: Some(json!({"deadline": "tonight"})),
            creation_ts: Some(1_720_000_000),
            ..Task::default()
        }
    }

    #[tokio::test]
    async fn task_requires_goal_requester_and_type() {
        let ctx = ValidationContext::root();
        assert!(task().validate(&ctx).await.is_ok());

        let mut goalless = task();
        goalless.goal = None;
        assert_eq!(
            goalless.validate(&ctx).await.expect_err("goal").field(),
            Some("goal")
        );

        let mut anonymous = task();
        anonymous.requester_id = None;
        assert_eq!(
            anonymous.validate(&ctx).await.expect_err("requester").field(),
            Some("requesterId")
        );
    }

    #[tokio::test]
    async fn goal_name_is_mandatory() {
        let ctx = ValidationContext::root();
        let mut unnamed = task();
        unnamed.goal = Some(TaskGoal::default());
        let err = unnamed.validate(&ctx).await.expect_err("goal name");
        assert_eq!(err.field(), Some("goal.name"));
    }

    #[tokio::test]
    async fn close_cannot_precede_creation() {
        let ctx = ValidationContext::root();
        let mut early = task();
        early.close_ts = Some(1_719_999_999);
        let err = early.validate(&ctx).await.expect_err("early close");
        assert_eq!(err.field(), Some("closeTs"));

        let mut fine = task();
        fine.close_ts = Some(1_720_000_001);
        assert!(fine.validate(&ctx).await.is_ok());
    }

    #[tokio::test]
    async fn attributes_must_be_an_object() {
        let ctx = ValidationContext::root();
        let mut listy = task();
        listy.attributes = Some(json!(["not", "an", "object"]));
        assert_eq!(
            listy.validate(&ctx).await.expect_err("attributes").field(),
            Some("attributes")
        );
    }

    #[tokio::test]
    async fn merge_rejects_source_transactions() {
        let ctx = ValidationContext::root();
        let source = Task {
            transactions: Some(vec![TaskTransaction {
                label: Some("volunteer".to_string()),
                ..TaskTransaction::default()
            }]),
            ..Task::default()
        };
        let err = task().merge(source, &ctx).await.expect_err("history");
        assert_eq!(err.field(), Some("transactions"));
    }

    #[tokio::test]
    async fn merge_keeps_history_and_identity() {
        let ctx = ValidationContext::root();
        let mut target = task();
        target.transactions = Some(vec![TaskTransaction {
            id: Some("tx1".to_string()),
            label: Some("volunteer".to_string()),
            ..TaskTransaction::default()
        }]);
        let source = Task {
            goal: Some(TaskGoal {
                description: Some("rear wheel".to_string()),
                ..TaskGoal::default()
            }),
            ..Task::default()
        };
        let merged = target.merge(source, &ctx).await.expect("merge");
        assert_eq!(merged.id.as_deref(), Some("t1"));
        assert_eq!(merged.transactions.as_ref().map(Vec::len), Some(1));
        let goal = merged.goal.expect("goal");
        assert_eq!(goal.name.as_deref(), Some("fix a flat tire"));
        assert_eq!(goal.description.as_deref(), Some("rear wheel"));
    }

    #[tokio::test]
    async fn transaction_requires_label() {
        let ctx = ValidationContext::root();
        let unlabeled = TaskTransaction {
            task_id: Some("t1".to_string()),
            ..TaskTransaction::default()
        };
        assert_eq!(
            unlabeled.validate(&ctx).await.expect_err("label").field(),
            Some("label")
        );
    }
}
