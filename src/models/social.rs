//! Purpose: Social sub-entities of a user profile.
//! Exports: `SocialRelationship`, `RelationshipType`, `SocialPractice`, `Routine`,
//! `ScoredLabel`, `Label`.
//! Invariants: Relationship targets are user profile ids known to the profile manager.
//! Invariants: Weights, confidences, and label scores live in [0, 1].

use crate::core::error::Error;
use crate::core::merge::{
    Identified, Merge, Update, merge_field, merge_text, validate_list,
};
use crate::core::validate::{
    TEXT_LEN_MAX, Validate, ValidationContext, text_of, validate_latitude, validate_longitude,
    validate_required_text, validate_text, validate_unit_interval,
};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::attributes::{Competence, Material};
use super::norm::ProtocolNorm;

#[derive(Clone, Copy, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum RelationshipType {
    Friend,
    Colleague,
    Follower,
    Family,
    Acquaintance,
}

/// A directed social tie from the profile owner to another user.
#[derive(Clone, Debug, Default, Deserialize, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SocialRelationship {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub app_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,
    #[serde(default, rename = "type", skip_serializing_if = "Option::is_none")]
    pub relation_type: Option<RelationshipType>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub weight: Option<f64>,
}

#[async_trait]
impl Validate for SocialRelationship {
    async fn validate(&self, ctx: &ValidationContext<'_>) -> Result<(), Error> {
        validate_text(&ctx.field("appId"), &self.app_id, TEXT_LEN_MAX)?;
        validate_required_text(&ctx.field("userId"), &self.user_id, TEXT_LEN_MAX)?;
        if self.relation_type.is_none() {
            return Err(ctx.field("type").error("value is required"));
        }
        validate_unit_interval(&ctx.field("weight"), self.weight)?;
        if let Some(user_id) = text_of(&self.user_id) {
            ctx.field("userId").check_profile(user_id).await?;
        }
        Ok(())
    }
}

#[async_trait]
impl Merge for SocialRelationship {
    async fn merge(&self, source: Self, ctx: &ValidationContext<'_>) -> Result<Self, Error> {
        let merged = Self {
            app_id: merge_text(&self.app_id, source.app_id),
            user_id: merge_text(&self.user_id, source.user_id),
            relation_type: merge_field(&self.relation_type, source.relation_type),
            weight: merge_field(&self.weight, source.weight),
        };
        merged.validate(ctx).await?;
        Ok(merged)
    }
}

#[async_trait]
impl Update for SocialRelationship {
    async fn update(&self, source: Self, ctx: &ValidationContext<'_>) -> Result<Self, Error> {
        source.validate(ctx).await?;
        Ok(source)
    }
}

/// A recurring practice, with the resources and skills it involves.
#[derive(Clone, Debug, Default, Deserialize, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SocialPractice {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub materials: Option<Vec<Material>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub competences: Option<Vec<Competence>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub norms: Option<Vec<ProtocolNorm>>,
}

impl Identified for SocialPractice {
    fn id(&self) -> Option<&str> {
        self.id.as_deref()
    }
}

#[async_trait]
impl Validate for SocialPractice {
    async fn validate(&self, ctx: &ValidationContext<'_>) -> Result<(), Error> {
        validate_text(&ctx.field("id"), &self.id, TEXT_LEN_MAX)?;
        validate_text(&ctx.field("label"), &self.label, TEXT_LEN_MAX)?;
        validate_list(&self.materials, ctx, "materials").await?;
        validate_list(&self.competences, ctx, "competences").await?;
        validate_list(&self.norms, ctx, "norms").await?;
        Ok(())
    }
}

#[async_trait]
impl Merge for SocialPractice {
    async fn merge(&self, source: Self, ctx: &ValidationContext<'_>) -> Result<Self, Error> {
        let merged = Self {
            id: self.id.clone().or(source.id),
            label: merge_text(&self.label, source.label),
            materials: merge_field(&self.materials, source.materials),
            competences: merge_field(&self.competences, source.competences),
            norms: merge_field(&self.norms, source.norms),
        };
        merged.validate(ctx).await?;
        Ok(merged)
    }
}

#[async_trait]
impl Update for SocialPractice {
    async fn update(&self, source: Self, ctx: &ValidationContext<'_>) -> Result<Self, Error> {
        let updated = Self {
            id: self.id.clone(),
            ..source
        };
        updated.validate(ctx).await?;
        Ok(updated)
    }
}

/// A labelled point of interest inside a routine slot.
#[derive(Clone, Debug, Default, Deserialize, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Label {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub semantic_class: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub latitude: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub longitude: Option<f64>,
}

#[async_trait]
impl Validate for Label {
    async fn validate(&self, ctx: &ValidationContext<'_>) -> Result<(), Error> {
        validate_required_text(&ctx.field("name"), &self.name, TEXT_LEN_MAX)?;
        validate_text(&ctx.field("semanticClass"), &self.semantic_class, TEXT_LEN_MAX)?;
        validate_latitude(&ctx.field("latitude"), self.latitude)?;
        validate_longitude(&ctx.field("longitude"), self.longitude)?;
        Ok(())
    }
}

#[derive(Clone, Debug, Default, Deserialize, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScoredLabel {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<Label>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub score: Option<f64>,
}

#[async_trait]
impl Validate for ScoredLabel {
    async fn validate(&self, ctx: &ValidationContext<'_>) -> Result<(), Error> {
        let Some(label) = &self.label else {
            return Err(ctx.field("label").error("value is required"));
        };
        label.validate(&ctx.field("label")).await?;
        validate_unit_interval(&ctx.field("score"), self.score)?;
        Ok(())
    }
}

/// A learnt daily behaviour of a user: where they tend to be per time slot.
#[derive(Clone, Debug, Default, Deserialize, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Routine {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub weekday: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label_distribution: Option<BTreeMap<String, Vec<ScoredLabel>>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub confidence: Option<f64>,
}

#[async_trait]
impl Validate for Routine {
    async fn validate(&self, ctx: &ValidationContext<'_>) -> Result<(), Error> {
        validate_required_text(&ctx.field("userId"), &self.user_id, TEXT_LEN_MAX)?;
        validate_required_text(&ctx.field("weekday"), &self.weekday, TEXT_LEN_MAX)?;
        validate_unit_interval(&ctx.field("confidence"), self.confidence)?;
        if let Some(distribution) = &self.label_distribution {
            let distribution_ctx = ctx.field("labelDistribution");
            for (slot, labels) in distribution {
                for (index, scored) in labels.iter().enumerate() {
                    scored.validate(&distribution_ctx.element(slot, index)).await?;
                }
            }
        }
        if let Some(user_id) = text_of(&self.user_id) {
            ctx.field("userId").check_profile(user_id).await?;
        }
        Ok(())
    }
}

#[async_trait]
impl Merge for Routine {
    async fn merge(&self, source: Self, ctx: &ValidationContext<'_>) -> Result<Self, Error> {
        let merged = Self {
            user_id: merge_text(&self.user_id, source.user_id),
            weekday: merge_text(&self.weekday, source.weekday),
            label_distribution: merge_field(&self.label_distribution, source.label_distribution),
            confidence: merge_field(&self.confidence, source.confidence),
        };
        merged.validate(ctx).await?;
        Ok(merged)
    }
}

#[async_trait]
impl Update for Routine {
    async fn update(&self, source: Self, ctx: &ValidationContext<'_>) -> Result<Self, Error> {
        source.validate(ctx).await?;
        Ok(source)
    }
}
