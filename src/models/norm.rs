//! Purpose: Protocol norms attached to profiles, communities, tasks, and task types.
//! Exports: `ProtocolNorm`.
//! Role: Carries the behavioural rules the interaction engine evaluates.
//! Invariants: `whenever` and `thenceforth` are mandatory and must differ.

use crate::core::error::Error;
use crate::core::merge::{Merge, Update, merge_text};
use crate::core::validate::{
    DESCRIPTION_LEN_MAX, TEXT_LEN_MAX, Validate, ValidationContext, text_of, validate_required_text,
    validate_text,
};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, Default, Deserialize, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProtocolNorm {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub whenever: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub thenceforth: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ontology: Option<String>,
}

#[async_trait]
impl Validate for ProtocolNorm {
    async fn validate(&self, ctx: &ValidationContext<'_>) -> Result<(), Error> {
        validate_text(&ctx.field("description"), &self.description, DESCRIPTION_LEN_MAX)?;
        validate_required_text(&ctx.field("whenever"), &self.whenever, DESCRIPTION_LEN_MAX)?;
        validate_required_text(&ctx.field("thenceforth"), &self.thenceforth, DESCRIPTION_LEN_MAX)?;
        validate_text(&ctx.field("ontology"), &self.ontology, TEXT_LEN_MAX)?;
        if text_of(&self.whenever) == text_of(&self.thenceforth) {
            return Err(ctx
                .field("thenceforth")
                .error("the norm condition and action cannot be the same"));
        }
        Ok(())
    }
}

#[async_trait]
impl Merge for ProtocolNorm {
    async fn merge(&self, source: Self, ctx: &ValidationContext<'_>) -> Result<Self, Error> {
        let merged = Self {
            description: merge_text(&self.description, source.description),
            whenever: merge_text(&self.whenever, source.whenever),
            thenceforth: merge_text(&self.thenceforth, source.thenceforth),
            ontology: merge_text(&self.ontology, source.ontology),
        };
        merged.validate(ctx).await?;
        Ok(merged)
    }
}

#[async_trait]
impl Update for ProtocolNorm {
    async fn update(&self, source: Self, ctx: &ValidationContext<'_>) -> Result<Self, Error> {
        source.validate(ctx).await?;
        Ok(source)
    }
}
