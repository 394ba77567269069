//! Purpose: Planned activities and relevant locations of a user profile.
//! Exports: `PlannedActivity`, `ActivityStatus`, `RelevantLocation`.
//! Invariants: Activity attendees are user profile ids known to the profile manager.
//! Invariants: A complete time window runs from `startTime` strictly before `endTime`.

use crate::core::error::Error;
use crate::core::merge::{Identified, Merge, Update, merge_field, merge_text};
use crate::core::validate::{
    DESCRIPTION_LEN_MAX, TEXT_LEN_MAX, Validate, ValidationContext, validate_id_list,
    validate_latitude, validate_longitude, validate_rfc3339, validate_text,
};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ActivityStatus {
    Proposed,
    Confirmed,
    Tentative,
    Cancelled,
    Completed,
}

#[derive(Clone, Debug, Default, Deserialize, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PlannedActivity {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_time: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_time: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub attendees: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<ActivityStatus>,
}

impl Identified for PlannedActivity {
    fn id(&self) -> Option<&str> {
        self.id.as_deref()
    }
}

#[async_trait]
impl Validate for PlannedActivity {
    async fn validate(&self, ctx: &ValidationContext<'_>) -> Result<(), Error> {
        validate_text(&ctx.field("id"), &self.id, TEXT_LEN_MAX)?;
        let start = validate_rfc3339(&ctx.field("startTime"), &self.start_time)?;
        let end = validate_rfc3339(&ctx.field("endTime"), &self.end_time)?;
        if let (Some(start), Some(end)) = (start, end) {
            if start >= end {
                return Err(ctx
                    .field("startTime")
                    .error("start time must precede the end time"));
            }
        }
        validate_text(&ctx.field("description"), &self.description, DESCRIPTION_LEN_MAX)?;
        validate_id_list(ctx, "attendees", &self.attendees)?;
        if let Some(attendees) = &self.attendees {
            for (index, attendee) in attendees.iter().enumerate() {
                ctx.element("attendees", index)
                    .check_profile(attendee.trim())
                    .await?;
            }
        }
        Ok(())
    }
}

#[async_trait]
impl Merge for PlannedActivity {
    async fn merge(&self, source: Self, ctx: &ValidationContext<'_>) -> Result<Self, Error> {
        let merged = Self {
            id: self.id.clone().or(source.id),
            start_time: merge_text(&self.start_time, source.start_time),
            end_time: merge_text(&self.end_time, source.end_time),
            description: merge_text(&self.description, source.description),
            attendees: merge_field(&self.attendees, source.attendees),
            status: merge_field(&self.status, source.status),
        };
        merged.validate(ctx).await?;
        Ok(merged)
    }
}

#[async_trait]
impl Update for PlannedActivity {
    async fn update(&self, source: Self, ctx: &ValidationContext<'_>) -> Result<Self, Error> {
        let updated = Self {
            id: self.id.clone(),
            ..source
        };
        updated.validate(ctx).await?;
        Ok(updated)
    }
}

/// A place that matters to the user (home, work, gym, ...).
#[derive(Clone, Debug, Default, Deserialize, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RelevantLocation {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub latitude: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub longitude: Option<f64>,
}

impl Identified for RelevantLocation {
    fn id(&self) -> Option<&str> {
        self.id.as_deref()
    }
}

#[async_trait]
impl Validate for RelevantLocation {
    async fn validate(&self, ctx: &ValidationContext<'_>) -> Result<(), Error> {
        validate_text(&ctx.field("id"), &self.id, TEXT_LEN_MAX)?;
        validate_text(&ctx.field("label"), &self.label, TEXT_LEN_MAX)?;
        validate_latitude(&ctx.field("latitude"), self.latitude)?;
        validate_longitude(&ctx.field("longitude"), self.longitude)?;
        Ok(())
    }
}

#[async_trait]
impl Merge for RelevantLocation {
    async fn merge(&self, source: Self, ctx: &ValidationContext<'_>) -> Result<Self, Error> {
        let merged = Self {
            id: self.id.clone().or(source.id),
            label: merge_text(&self.label, source.label),
            latitude: merge_field(&self.latitude, source.latitude),
            longitude: merge_field(&self.longitude, source.longitude),
        };
        merged.validate(ctx).await?;
        Ok(merged)
    }
}

#[async_trait]
impl Update for RelevantLocation {
    async fn update(&self, source: Self, ctx: &ValidationContext<'_>) -> Result<Self, Error> {
        let updated = Self {
            id: self.id.clone(),
            ..source
        };
        updated.validate(ctx).await?;
        Ok(updated)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn activity_time_window_must_be_ordered() {
        let ctx = ValidationContext::root();
        let activity = PlannedActivity {
            start_time: Some("2026-09-01T10:00:00Z".to_string()),
            end_time: Some("2026-09-01T09:00:00Z".to_string()),
            ..PlannedActivity::default()
        };
        let err = activity.validate(&ctx).await.expect_err("inverted window");
        assert_eq!(err.field(), Some("startTime"));
    }

    #[tokio::test]
    async fn activity_rejects_bad_timestamps() {
        let ctx = ValidationContext::root();
        let activity = PlannedActivity {
            start_time: Some("tomorrow at noon".to_string()),
            ..PlannedActivity::default()
        };
        assert!(activity.validate(&ctx).await.is_err());
    }

    #[tokio::test]
    async fn activity_rejects_duplicate_attendees() {
        let ctx = ValidationContext::root();
        let activity = PlannedActivity {
            attendees: Some(vec!["u1".to_string(), "u1".to_string()]),
            ..PlannedActivity::default()
        };
        let err = activity.validate(&ctx).await.expect_err("duplicate");
        assert_eq!(err.field(), Some("attendees[1]"));
    }

    #[tokio::test]
    async fn location_bounds_are_enforced() {
        let ctx = ValidationContext::root();
        let location = RelevantLocation {
            label: Some("office".to_string()),
            latitude: Some(46.07),
            longitude: Some(211.12),
            ..RelevantLocation::default()
        };
        let err = location.validate(&ctx).await.expect_err("longitude");
        assert_eq!(err.field(), Some("longitude"));
    }

    #[tokio::test]
    async fn merge_keeps_target_id() {
        let ctx = ValidationContext::root();
        let target = PlannedActivity {
            id: Some("a1".to_string()),
            description: Some("coffee".to_string()),
            ..PlannedActivity::default()
        };
        let merged = target
            .merge(
                PlannedActivity {
                    id: Some("ignored".to_string()),
                    status: Some(ActivityStatus::Confirmed),
                    ..PlannedActivity::default()
                },
                &ctx,
            )
            .await
            .expect("merge");
        assert_eq!(merged.id.as_deref(), Some("a1"));
        assert_eq!(merged.description.as_deref(), Some("coffee"));
        assert_eq!(merged.status, Some(ActivityStatus::Confirmed));
    }
}
