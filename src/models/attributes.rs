//! Purpose: Profile attribute sub-entities: materials, competences, meanings.
//! Exports: `Material`, `Competence`, `Meaning`.
//! Invariants: Names are mandatory; levels live in [0, 1]; quantities are >= 1.

use crate::core::error::Error;
use crate::core::merge::{Merge, Update, merge_field, merge_text};
use crate::core::validate::{
    DESCRIPTION_LEN_MAX, TEXT_LEN_MAX, Validate, ValidationContext, validate_min_quantity,
    validate_required_text, validate_text, validate_unit_interval,
};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// A physical resource a user can contribute to a task.
#[derive(Clone, Debug, Default, Deserialize, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Material {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub quantity: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub classification: Option<String>,
}

#[async_trait]
impl Validate for Material {
    async fn validate(&self, ctx: &ValidationContext<'_>) -> Result<(), Error> {
        validate_required_text(&ctx.field("name"), &self.name, TEXT_LEN_MAX)?;
        validate_text(&ctx.field("description"), &self.description, DESCRIPTION_LEN_MAX)?;
        validate_min_quantity(&ctx.field("quantity"), self.quantity)?;
        validate_text(&ctx.field("classification"), &self.classification, TEXT_LEN_MAX)?;
        Ok(())
    }
}

#[async_trait]
impl Merge for Material {
    async fn merge(&self, source: Self, ctx: &ValidationContext<'_>) -> Result<Self, Error> {
        let merged = Self {
            name: merge_text(&self.name, source.name),
            description: merge_text(&self.description, source.description),
            quantity: merge_field(&self.quantity, source.quantity),
            classification: merge_text(&self.classification, source.classification),
        };
        merged.validate(ctx).await?;
        Ok(merged)
    }
}

#[async_trait]
impl Update for Material {
    async fn update(&self, source: Self, ctx: &ValidationContext<'_>) -> Result<Self, Error> {
        source.validate(ctx).await?;
        Ok(source)
    }
}

/// A skill the user has, scored in [0, 1].
#[derive(Clone, Debug, Default, Deserialize, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Competence {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ontology: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub level: Option<f64>,
}

#[async_trait]
impl Validate for Competence {
    async fn validate(&self, ctx: &ValidationContext<'_>) -> Result<(), Error> {
        validate_required_text(&ctx.field("name"), &self.name, TEXT_LEN_MAX)?;
        validate_text(&ctx.field("ontology"), &self.ontology, TEXT_LEN_MAX)?;
        validate_unit_interval(&ctx.field("level"), self.level)?;
        Ok(())
    }
}

#[async_trait]
impl Merge for Competence {
    async fn merge(&self, source: Self, ctx: &ValidationContext<'_>) -> Result<Self, Error> {
        let merged = Self {
            name: merge_text(&self.name, source.name),
            ontology: merge_text(&self.ontology, source.ontology),
            level: merge_field(&self.level, source.level),
        };
        merged.validate(ctx).await?;
        Ok(merged)
    }
}

#[async_trait]
impl Update for Competence {
    async fn update(&self, source: Self, ctx: &ValidationContext<'_>) -> Result<Self, Error> {
        source.validate(ctx).await?;
        Ok(source)
    }
}

/// How much a cultural or psychological category applies to the user.
#[derive(Clone, Debug, Default, Deserialize, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Meaning {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub level: Option<f64>,
}

#[async_trait]
impl Validate for Meaning {
    async fn validate(&self, ctx: &ValidationContext<'_>) -> Result<(), Error> {
        validate_required_text(&ctx.field("name"), &self.name, TEXT_LEN_MAX)?;
        validate_text(&ctx.field("category"), &self.category, TEXT_LEN_MAX)?;
        validate_unit_interval(&ctx.field("level"), self.level)?;
        Ok(())
    }
}

#[async_trait]
impl Merge for Meaning {
    async fn merge(&self, source: Self, ctx: &ValidationContext<'_>) -> Result<Self, Error> {
        let merged = Self {
            name: merge_text(&self.name, source.name),
            category: merge_text(&self.category, source.category),
            level: merge_field(&self.level, source.level),
        };
        merged.validate(ctx).await?;
        Ok(merged)
    }
}

#[async_trait]
impl Update for Meaning {
    async fn update(&self, source: Self, ctx: &ValidationContext<'_>) -> Result<Self, Error> {
        source.validate(ctx).await?;
        Ok(source)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn material_requires_name_and_positive_quantity() {
        let ctx = ValidationContext::root();
        let material = Material {
            name: Some("bicycle".to_string()),
            quantity: Some(1),
            ..Material::default()
        };
        assert!(material.validate(&ctx).await.is_ok());

        let unnamed = Material {
            quantity: Some(1),
            ..Material::default()
        };
        assert_eq!(
            unnamed.validate(&ctx).await.expect_err("name").field(),
            Some("name")
        );

        let zero = Material {
            name: Some("bicycle".to_string()),
            quantity: Some(0),
            ..Material::default()
        };
        assert_eq!(
            zero.validate(&ctx).await.expect_err("quantity").field(),
            Some("quantity")
        );
    }

    #[tokio::test]
    async fn competence_level_must_be_unit_interval() {
        let ctx = ValidationContext::root();
        let competence = Competence {
            name: Some("welding".to_string()),
            ontology: None,
            level: Some(1.2),
        };
        assert_eq!(
            competence.validate(&ctx).await.expect_err("level").field(),
            Some("level")
        );
    }

    #[tokio::test]
    async fn meaning_merges_field_by_field() {
        let ctx = ValidationContext::root();
        let target = Meaning {
            name: Some("extraversion".to_string()),
            category: Some("big-five".to_string()),
            level: Some(0.4),
        };
        let merged = target
            .merge(
                Meaning {
                    level: Some(0.7),
                    ..Meaning::default()
                },
                &ctx,
            )
            .await
            .expect("merge");
        assert_eq!(merged.name.as_deref(), Some("extraversion"));
        assert_eq!(merged.category.as_deref(), Some("big-five"));
        assert_eq!(merged.level, Some(0.7));
    }
}
