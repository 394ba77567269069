//! Purpose: Task types: the templates tasks are created from.
//! Exports: `TaskType`.
//! Invariants: Attribute/transaction descriptors are carried as JSON objects,
//! not interpreted by this crate.

use crate::core::error::Error;
use crate::core::merge::{Merge, Update, merge_field, merge_text, validate_list};
use crate::core::validate::{
    DESCRIPTION_LEN_MAX, TEXT_LEN_MAX, Validate, ValidationContext, validate_json_object,
    validate_keywords, validate_required_text, validate_text, validate_timestamp,
};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::norm::ProtocolNorm;

#[derive(Clone, Debug, Default, Deserialize, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskType {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub keywords: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub attributes: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub transactions: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub norms: Option<Vec<ProtocolNorm>>,
    #[serde(default, rename = "_creationTs", skip_serializing_if = "Option::is_none")]
    pub creation_ts: Option<i64>,
    #[serde(default, rename = "_lastUpdateTs", skip_serializing_if = "Option::is_none")]
    pub last_update_ts: Option<i64>,
}

#[async_trait]
impl Validate for TaskType {
    async fn validate(&self, ctx: &ValidationContext<'_>) -> Result<(), Error> {
        validate_text(&ctx.field("id"), &self.id, TEXT_LEN_MAX)?;
        validate_required_text(&ctx.field("name"), &self.name, TEXT_LEN_MAX)?;
        validate_text(&ctx.field("description"), &self.description, DESCRIPTION_LEN_MAX)?;
        validate_keywords(ctx, "keywords", &self.keywords)?;
        validate_json_object(&ctx.field("attributes"), &self.attributes)?;
        validate_json_object(&ctx.field("transactions"), &self.transactions)?;
        validate_list(&self.norms, ctx, "norms").await?;
        validate_timestamp(&ctx.field("_creationTs"), self.creation_ts)?;
        validate_timestamp(&ctx.field("_lastUpdateTs"), self.last_update_ts)?;
        Ok(())
    }
}

#[async_trait]
impl Merge for TaskType {
    async fn merge(&self, source: Self, ctx: &ValidationContext<'_>) -> Result<Self, Error> {
        let merged = Self {
            id: self.id.clone(),
            name: merge_text(&self.name, source.name),
            description: merge_text(&self.description, source.description),
            keywords: merge_field(&self.keywords, source.keywords),
            attributes: merge_field(&self.attributes, source.attributes),
            transactions: merge_field(&self.transactions, source.transactions),
            norms: merge_field(&self.norms, source.norms),
            creation_ts: self.creation_ts,
            last_update_ts: self.last_update_ts,
        };
        merged.validate(ctx).await?;
        Ok(merged)
    }
}

#[async_trait]
impl Update for TaskType {
    async fn update(&self, source: Self, ctx: &ValidationContext<'_>) -> Result<Self, Error> {
        let updated = Self {
            id: self.id.clone(),
            creation_ts: self.creation_ts,
            last_update_ts: self.last_update_ts,
            ..source
        };
        updated.validate(ctx).await?;
        Ok(updated)
    }
}
