//! Purpose: Community profiles and their membership records.
//! Exports: `CommunityProfile`, `CommunityMember`.
//! Invariants: Members are unique by user id and each id is known to the profile manager.
//! Invariants: Timestamps and the community id are assigned by the profile manager.

use crate::core::error::Error;
use crate::core::merge::{
    Identified, Merge, Update, merge_field, merge_identified_list, merge_text,
    validate_identified_list, validate_list,
};
use crate::core::validate::{
    DESCRIPTION_LEN_MAX, TEXT_LEN_MAX, Validate, ValidationContext, text_of, validate_keywords,
    validate_required_text, validate_text, validate_timestamp,
};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use super::norm::ProtocolNorm;
use super::social::SocialPractice;

#[derive(Clone, Debug, Default, Deserialize, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CommunityMember {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub privileges: Option<Vec<String>>,
    #[serde(default, rename = "_creationTs", skip_serializing_if = "Option::is_none")]
    pub creation_ts: Option<i64>,
    #[serde(default, rename = "_lastUpdateTs", skip_serializing_if = "Option::is_none")]
    pub last_update_ts: Option<i64>,
}

impl Identified for CommunityMember {
    fn id(&self) -> Option<&str> {
        self.user_id.as_deref()
    }
}

#[async_trait]
impl Validate for CommunityMember {
    async fn validate(&self, ctx: &ValidationContext<'_>) -> Result<(), Error> {
        validate_required_text(&ctx.field("userId"), &self.user_id, TEXT_LEN_MAX)?;
        if let Some(privileges) = &self.privileges {
            let mut seen: Vec<&str> = Vec::new();
            for (index, privilege) in privileges.iter().enumerate() {
                let element_ctx = ctx.element("privileges", index);
                let trimmed = privilege.trim();
                if trimmed.is_empty() {
                    return Err(element_ctx.error("privilege cannot be empty"));
                }
                if trimmed.chars().count() > TEXT_LEN_MAX {
                    return Err(element_ctx.error(format!("value exceeds {TEXT_LEN_MAX} characters")));
                }
                if seen.contains(&trimmed) {
                    return Err(element_ctx.error(format!("duplicate privilege '{trimmed}'")));
                }
                seen.push(trimmed);
            }
        }
        validate_timestamp(&ctx.field("_creationTs"), self.creation_ts)?;
        validate_timestamp(&ctx.field("_lastUpdateTs"), self.last_update_ts)?;
        if let Some(user_id) = text_of(&self.user_id) {
            ctx.field("userId").check_profile(user_id).await?;
        }
        Ok(())
    }
}

#[async_trait]
impl Merge for CommunityMember {
    async fn merge(&self, source: Self, ctx: &ValidationContext<'_>) -> Result<Self, Error> {
        let merged = Self {
            user_id: self.user_id.clone().or(source.user_id),
            privileges: merge_field(&self.privileges, source.privileges),
            creation_ts: self.creation_ts,
            last_update_ts: self.last_update_ts,
        };
        merged.validate(ctx).await?;
        Ok(merged)
    }
}

#[derive(Clone, Debug, Default, Deserialize, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CommunityProfile {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub app_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub keywords: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub members: Option<Vec<CommunityMember>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub social_practices: Option<Vec<SocialPractice>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub norms: Option<Vec<ProtocolNorm>>,
    #[serde(default, rename = "_creationTs", skip_serializing_if = "Option::is_none")]
    pub creation_ts: Option<i64>,
    #[serde(default, rename = "_lastUpdateTs", skip_serializing_if = "Option::is_none")]
    pub last_update_ts: Option<i64>,
}

#[async_trait]
impl Validate for CommunityProfile {
    async fn validate(&self, ctx: &ValidationContext<'_>) -> Result<(), Error> {
        validate_text(&ctx.field("id"), &self.id, TEXT_LEN_MAX)?;
        validate_text(&ctx.field("appId"), &self.app_id, TEXT_LEN_MAX)?;
        validate_required_text(&ctx.field("name"), &self.name, TEXT_LEN_MAX)?;
        validate_text(&ctx.field("description"), &self.description, DESCRIPTION_LEN_MAX)?;
        validate_keywords(ctx, "keywords", &self.keywords)?;
        validate_identified_list(&self.members, ctx, "members").await?;
        validate_identified_list(&self.social_practices, ctx, "socialPractices").await?;
        validate_list(&self.norms, ctx, "norms").await?;
        validate_timestamp(&ctx.field("_creationTs"), self.creation_ts)?;
        validate_timestamp(&ctx.field("_lastUpdateTs"), self.last_update_ts)?;
        Ok(())
    }
}

#[async_trait]
impl Merge for CommunityProfile {
    async fn merge(&self, source: Self, ctx: &ValidationContext<'_>) -> Result<Self, Error> {
        let merged = Self {
            id: self.id.clone(),
            app_id: merge_text(&self.app_id, source.app_id),
            name: merge_text(&self.name, source.name),
            description: merge_text(&self.description, source.description),
            keywords: merge_field(&self.keywords, source.keywords),
            members: merge_identified_list(&self.members, source.members, ctx, "members").await?,
            social_practices: merge_identified_list(
                &self.social_practices,
                source.social_practices,
                ctx,
                "socialPractices",
            )
            .await?,
            norms: merge_field(&self.norms, source.norms),
            creation_ts: self.creation_ts,
            last_update_ts: self.last_update_ts,
        };
        merged.validate(ctx).await?;
        Ok(merged)
    }
}

#[async_trait]
impl Update for CommunityProfile {
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

#[cfg(test)]
mod tests {
    use super::*;

    fn community() -> CommunityProfile {
        CommunityProfile {
            id: Some("c1".to_string()),
            app_id: Some("app1".to_string()),
            name: Some("bicycle kitchen".to_string()),
            members: Some(vec![CommunityMember {
                user_id: Some("u1".to_string()),
                privileges: Some(vec!["admin".to_string()]),
                ..CommunityMember::default()
            }]),
            ..CommunityProfile::default()
        }
    }

    #[tokio::test]
    async fn community_requires_a_name() {
        let ctx = ValidationContext::root();
        assert!(community().validate(&ctx).await.is_ok());
        let mut unnamed = community();
        unnamed.name = None;
        assert_eq!(
            unnamed.validate(&ctx).await.expect_err("name").field(),
            Some("name")
        );
    }

    #[tokio::test]
    async fn members_are_unique_by_user_id() {
        let ctx = ValidationContext::root();
        let mut doubled = community();
        let member = CommunityMember {
            user_id: Some("u1".to_string()),
            ..CommunityMember::default()
        };
        doubled.members = Some(vec![member.clone(), member]);
        let err = doubled.validate(&ctx).await.expect_err("duplicate member");
        assert_eq!(err.field(), Some("members[1]"));
    }

    #[tokio::test]
    async fn member_privileges_cannot_repeat() {
        let ctx = ValidationContext::root();
        let member = CommunityMember {
            user_id: Some("u1".to_string()),
            privileges: Some(vec!["post".to_string(), "post".to_string()]),
            ..CommunityMember::default()
        };
        let err = member.validate(&ctx).await.expect_err("duplicate privilege");
        assert_eq!(err.field(), Some("privileges[1]"));
    }

    #[tokio::test]
    async fn merge_by_user_id_extends_privileges() {
        let ctx = ValidationContext::root();
        let source = CommunityProfile {
            members: Some(vec![CommunityMember {
                user_id: Some("u1".to_string()),
                privileges: Some(vec!["admin".to_string(), "moderate".to_string()]),
                ..CommunityMember::default()
            }]),
            ..CommunityProfile::default()
        };
        let merged = community().merge(source, &ctx).await.expect("merge");
        let members = merged.members.expect("members");
        assert_eq!(members.len(), 1);
        assert_eq!(
            members[0].privileges,
            Some(vec!["admin".to_string(), "moderate".to_string()])
        );
        assert_eq!(merged.name.as_deref(), Some("bicycle kitchen"));
    }
}
