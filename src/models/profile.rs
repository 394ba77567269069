//! Purpose: The user profile aggregate and its name/date sub-entities.
//! Exports: `UserProfile`, `UserName`, `ProfileDate`, `Gender`.
//! Role: Central model of the platform; everything else references profile ids.
//! Invariants: An empty profile is valid; every present field obeys its rule.
//! Invariants: Timestamps and the id are assigned by the profile manager, never merged in.
//! Invariants: JSON field names are camelCase with `_creationTs`/`_lastUpdateTs`.

use crate::core::error::Error;
use crate::core::merge::{
    Merge, Update, merge_field, merge_identified_list, merge_nested, merge_text,
    validate_identified_list, validate_list,
};
use crate::core::validate::{
    TEXT_LEN_MAX, Validate, ValidationContext, text_of, validate_birth_date, validate_email,
    validate_http_url, validate_locale, validate_phone, validate_text, validate_timestamp,
};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use super::activity::{PlannedActivity, RelevantLocation};
use super::attributes::{Competence, Material, Meaning};
use super::norm::ProtocolNorm;
use super::social::{Routine, SocialPractice, SocialRelationship};

#[derive(Clone, Copy, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum Gender {
    Female,
    Male,
    NonBinary,
    NotSaid,
    Other,
}

#[derive(Clone, Debug, Default, Deserialize, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserName {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prefix: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub first: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub middle: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub suffix: Option<String>,
}

#[async_trait]
impl Validate for UserName {
    async fn validate(&self, ctx: &ValidationContext<'_>) -> Result<(), Error> {
        validate_text(&ctx.field("prefix"), &self.prefix, TEXT_LEN_MAX)?;
        validate_text(&ctx.field("first"), &self.first, TEXT_LEN_MAX)?;
        validate_text(&ctx.field("middle"), &self.middle, TEXT_LEN_MAX)?;
        validate_text(&ctx.field("last"), &self.last, TEXT_LEN_MAX)?;
        validate_text(&ctx.field("suffix"), &self.suffix, TEXT_LEN_MAX)?;
        Ok(())
    }
}

#[async_trait]
impl Merge for UserName {
    async fn merge(&self, source: Self, ctx: &ValidationContext<'_>) -> Result<Self, Error> {
        let merged = Self {
            prefix: merge_text(&self.prefix, source.prefix),
            first: merge_text(&self.first, source.first),
            middle: merge_text(&self.middle, source.middle),
            last: merge_text(&self.last, source.last),
            suffix: merge_text(&self.suffix, source.suffix),
        };
        merged.validate(ctx).await?;
        Ok(merged)
    }
}

/// A (birth) date split into its calendar parts.
#[derive(Clone, Copy, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileDate {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub year: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub month: Option<u8>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub day: Option<u8>,
}

#[async_trait]
impl Validate for ProfileDate {
    async fn validate(&self, ctx: &ValidationContext<'_>) -> Result<(), Error> {
        validate_birth_date(ctx, self.year, self.month, self.day)
    }
}

#[async_trait]
impl Merge for ProfileDate {
    async fn merge(&self, source: Self, ctx: &ValidationContext<'_>) -> Result<Self, Error> {
        let merged = Self {
            year: source.year.or(self.year),
            month: source.month.or(self.month),
            day: source.day.or(self.day),
        };
        merged.validate(ctx).await?;
        Ok(merged)
    }
}

#[derive(Clone, Debug, Default, Deserialize, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<UserName>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date_of_birth: Option<ProfileDate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gender: Option<Gender>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone_number: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub locale: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub avatar: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nationality: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub occupation: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub norms: Option<Vec<ProtocolNorm>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub planned_activities: Option<Vec<PlannedActivity>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub relevant_locations: Option<Vec<RelevantLocation>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub relationships: Option<Vec<SocialRelationship>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub social_practices: Option<Vec<SocialPractice>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub personal_behaviors: Option<Vec<Routine>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub materials: Option<Vec<Material>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub competences: Option<Vec<Competence>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub meanings: Option<Vec<Meaning>>,
    #[serde(default, rename = "_creationTs", skip_serializing_if = "Option::is_none")]
    pub creation_ts: Option<i64>,
    #[serde(default, rename = "_lastUpdateTs", skip_serializing_if = "Option::is_none")]
    pub last_update_ts: Option<i64>,
}

#[async_trait]
impl Validate for UserProfile {
    async fn validate(&self, ctx: &ValidationContext<'_>) -> Result<(), Error> {
        validate_text(&ctx.field("id"), &self.id, TEXT_LEN_MAX)?;
        if let Some(name) = &self.name {
            name.validate(&ctx.field("name")).await?;
        }
        if let Some(date_of_birth) = &self.date_of_birth {
            date_of_birth.validate(&ctx.field("dateOfBirth")).await?;
        }
        validate_email(&ctx.field("email"), &self.email)?;
        validate_phone(&ctx.field("phoneNumber"), &self.phone_number)?;
        validate_locale(&ctx.field("locale"), &self.locale)?;
        validate_http_url(&ctx.field("avatar"), &self.avatar)?;
        validate_text(&ctx.field("nationality"), &self.nationality, TEXT_LEN_MAX)?;
        validate_text(&ctx.field("occupation"), &self.occupation, TEXT_LEN_MAX)?;
        validate_list(&self.norms, ctx, "norms").await?;
        validate_identified_list(&self.planned_activities, ctx, "plannedActivities").await?;
        validate_identified_list(&self.relevant_locations, ctx, "relevantLocations").await?;
        validate_relationships(&self.relationships, ctx).await?;
        validate_identified_list(&self.social_practices, ctx, "socialPractices").await?;
        validate_list(&self.personal_behaviors, ctx, "personalBehaviors").await?;
        validate_list(&self.materials, ctx, "materials").await?;
        validate_list(&self.competences, ctx, "competences").await?;
        validate_list(&self.meanings, ctx, "meanings").await?;
        validate_timestamp(&ctx.field("_creationTs"), self.creation_ts)?;
        validate_timestamp(&ctx.field("_lastUpdateTs"), self.last_update_ts)?;
        Ok(())
    }
}

#[async_trait]
impl Merge for UserProfile {
    async fn merge(&self, source: Self, ctx: &ValidationContext<'_>) -> Result<Self, Error> {
        let merged = Self {
            id: self.id.clone(),
            name: merge_nested(&self.name, source.name, &ctx.field("name")).await?,
            date_of_birth: merge_nested(
                &self.date_of_birth,
                source.date_of_birth,
                &ctx.field("dateOfBirth"),
            )
            .await?,
            gender: merge_field(&self.gender, source.gender),
            email: merge_text(&self.email, source.email),
            phone_number: merge_text(&self.phone_number, source.phone_number),
            locale: merge_text(&self.locale, source.locale),
            avatar: merge_text(&self.avatar, source.avatar),
            nationality: merge_text(&self.nationality, source.nationality),
            occupation: merge_text(&self.occupation, source.occupation),
            norms: merge_field(&self.norms, source.norms),
            planned_activities: merge_identified_list(
                &self.planned_activities,
                source.planned_activities,
                ctx,
                "plannedActivities",
            )
            .await?,
            relevant_locations: merge_identified_list(
                &self.relevant_locations,
                source.relevant_locations,
                ctx,
                "relevantLocations",
            )
            .await?,
            relationships: merge_field(&self.relationships, source.relationships),
            social_practices: merge_identified_list(
                &self.social_practices,
                source.social_practices,
                ctx,
                "socialPractices",
            )
            .await?,
            personal_behaviors: merge_field(&self.personal_behaviors, source.personal_behaviors),
            materials: merge_field(&self.materials, source.materials),
            competences: merge_field(&self.competences, source.competences),
            meanings: merge_field(&self.meanings, source.meanings),
            creation_ts: self.creation_ts,
            last_update_ts: self.last_update_ts,
        };
        merged.validate(ctx).await?;
        Ok(merged)
    }
}

#[async_trait]
impl Update for UserProfile {
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

/// Relationships are unique per (target user, type) pair.
async fn validate_relationships(
    relationships: &Option<Vec<SocialRelationship>>,
    ctx: &ValidationContext<'_>,
) -> Result<(), Error> {
    let Some(relationships) = relationships else {
        return Ok(());
    };
    for (index, relationship) in relationships.iter().enumerate() {
        let element_ctx = ctx.element("relationships", index);
        relationship.validate(&element_ctx).await?;
        let duplicate = relationships[..index].iter().any(|other| {
            text_of(&other.user_id) == text_of(&relationship.user_id)
                && other.relation_type == relationship.relation_type
        });
        if duplicate {
            return Err(element_ctx.error("duplicate relationship for the same user and type"));
        }
    }
    Ok(())
}
