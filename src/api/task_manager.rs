//! Purpose: Typed client for the task manager service.
//! Exports: `TaskManagerClient`.
//! Role: CRUD + merge for tasks and task types, plus transaction posting.
//! Invariants: Exists-probes translate `NotFound` into `false`, never an error.

use crate::core::error::ErrorKind;
use crate::models::{Task, TaskTransaction, TaskType};

use super::client::{ApiResult, ServiceClient};

#[derive(Clone)]
pub struct TaskManagerClient {
    client: ServiceClient,
}

impl TaskManagerClient {
    pub fn new(client: ServiceClient) -> Self {
        Self { client }
    }

    pub fn client(&self) -> &ServiceClient {
        &self.client
    }

    pub async fn create_task(&self, task: &Task) -> ApiResult<Task> {
        self.client.post_json(&["tasks"], task).await
    }

    pub async fn task(&self, task_id: &str) -> ApiResult<Task> {
        self.client.get_json(&["tasks", task_id]).await
    }

    /// Partial update; absent fields keep their stored values.
    pub async fn merge_task(&self, task_id: &str, partial: &Task) -> ApiResult<Task> {
        self.client.patch_json(&["tasks", task_id], partial).await
    }

    pub async fn delete_task(&self, task_id: &str) -> ApiResult<()> {
        self.client.delete(&["tasks", task_id]).await
    }

    pub async fn task_exists(&self, task_id: &str) -> ApiResult<bool> {
        match self.task(task_id).await {
            Ok(_) => Ok(true),
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(false),
            Err(err) => Err(err),
        }
    }

    /// Hand a user action to the task manager, which routes it to the
    /// interaction engine and materializes it on the task.
    pub async fn post_transaction(
        &self,
        transaction: &TaskTransaction,
    ) -> ApiResult<TaskTransaction> {
        self.client
            .post_json(&["tasks", "transactions"], transaction)
            .await
    }

    pub async fn create_task_type(&self, task_type: &TaskType) -> ApiResult<TaskType> {
        self.client.post_json(&["taskTypes"], task_type).await
    }

    pub async fn task_type(&self, task_type_id: &str) -> ApiResult<TaskType> {
        self.client.get_json(&["taskTypes", task_type_id]).await
    }

    pub async fn merge_task_type(
        &self,
        task_type_id: &str,
        partial: &TaskType,
    ) -> ApiResult<TaskType> {
        self.client
            .patch_json(&["taskTypes", task_type_id], partial)
            .await
    }

    pub async fn delete_task_type(&self, task_type_id: &str) -> ApiResult<()> {
        self.client.delete(&["taskTypes", task_type_id]).await
    }

    pub async fn task_type_exists(&self, task_type_id: &str) -> ApiResult<bool> {
        match self.task_type(task_type_id).await {
            Ok(_) => Ok(true),
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(false),
            Err(err) => Err(err),
        }
    }
}
