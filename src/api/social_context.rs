//! Purpose: Typed client for the social context builder service.
//! Exports: `SocialContextBuilderClient`, `InteractionReport`.
//! Role: Read social relations, rank volunteers, report interactions.

use crate::models::SocialRelationship;
use serde::{Deserialize, Serialize};

use super::client::{ApiResult, ServiceClient};

/// An interaction between two users, reported so the builder can learn ties.
#[derive(Clone, Debug, Default, Deserialize, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InteractionReport {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sender_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub receiver_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub task_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
}

#[derive(Clone)]
pub struct SocialContextBuilderClient {
    client: ServiceClient,
}

impl SocialContextBuilderClient {
    pub fn new(client: ServiceClient) -> Self {
        Self { client }
    }

    pub fn client(&self) -> &ServiceClient {
        &self.client
    }

    /// The social ties the builder currently knows for a user.
    pub async fn relations(&self, user_id: &str) -> ApiResult<Vec<SocialRelationship>> {
        self.client.get_json(&["social", "relations", user_id]).await
    }

    /// Rank candidate volunteers for a task by social closeness to the user.
    pub async fn rank_volunteers(
        &self,
        user_id: &str,
        task_id: &str,
        volunteers: &[String],
    ) -> ApiResult<Vec<String>> {
        self.client
            .post_json(&["social", "preferences", user_id, task_id], volunteers)
            .await
    }

    /// Fire-and-forget interaction report; a 2xx answer means accepted.
    pub async fn notify_interaction(&self, report: &InteractionReport) -> ApiResult<()> {
        self.client
            .post_accepted(&["social", "notification", "interaction"], report)
            .await
    }
}
