//! Purpose: Merge and update semantics shared by every model in the crate.
//! Exports: `Merge`, `Update`, `Identified`, field/list merge helpers.
//! Role: Partial updates fall back to existing values; full updates replace them.
//! Invariants: A merged or updated model keeps the target's id and creation time.
//! Invariants: Every `merge`/`update` impl validates its result before returning.

use crate::core::error::Error;
use crate::core::validate::{Validate, ValidationContext};
use async_trait::async_trait;

/// Partial update: `None` source fields fall back to the target's values.
#[async_trait]
pub trait Merge: Validate + Clone {
    async fn merge(&self, source: Self, ctx: &ValidationContext<'_>) -> Result<Self, Error>;
}

/// Full replacement of every caller-settable field.
#[async_trait]
pub trait Update: Validate + Clone {
    async fn update(&self, source: Self, ctx: &ValidationContext<'_>) -> Result<Self, Error>;
}

/// List elements that merge positionally by id.
pub trait Identified {
    fn id(&self) -> Option<&str>;
}

/// Source-over-target fallback for scalar fields and wholesale lists.
pub fn merge_field<T: Clone>(target: &Option<T>, source: Option<T>) -> Option<T> {
    source.or_else(|| target.clone())
}

/// Text fallback: a whitespace-only source counts as absent, a provided
/// source is stored trimmed.
pub fn merge_text(target: &Option<String>, source: Option<String>) -> Option<String> {
    match source {
        Some(value) => {
            let trimmed = value.trim();
            if trimmed.is_empty() {
                target.clone()
            } else if trimmed.len() == value.len() {
                Some(value)
            } else {
                Some(trimmed.to_string())
            }
        }
        None => target.clone(),
    }
}

/// Merge an optional nested model: an absent source keeps the target, a
/// source with no target counterpart stands alone.
pub async fn merge_nested<T>(
    target: &Option<T>,
    source: Option<T>,
    ctx: &ValidationContext<'_>,
) -> Result<Option<T>, Error>
where
    T: Merge,
{
    match (target.as_ref(), source) {
        (_, None) => Ok(target.clone()),
        (Some(current), Some(source)) => Ok(Some(current.merge(source, ctx).await?)),
        (None, Some(source)) => Ok(Some(source)),
    }
}

/// Merge an optional list of identified elements. A source element whose id
/// matches a target element merges onto it; unmatched elements stand alone.
/// Duplicate ids surface when the owner validates the merged list.
pub async fn merge_identified_list<T>(
    target: &Option<Vec<T>>,
    source: Option<Vec<T>>,
    ctx: &ValidationContext<'_>,
    field: &str,
) -> Result<Option<Vec<T>>, Error>
where
    T: Merge + Identified,
{
    let Some(source) = source else {
        return Ok(target.clone());
    };
    let empty: Vec<T> = Vec::new();
    let existing = target.as_deref().unwrap_or(&empty);
    let mut merged = Vec::with_capacity(source.len());
    for (index, element) in source.into_iter().enumerate() {
        let matched = element
            .id()
            .and_then(|id| existing.iter().find(|current| current.id() == Some(id)))
            .cloned();
        let out = match matched {
            Some(current) => current.merge(element, &ctx.element(field, index)).await?,
            None => element,
        };
        merged.push(out);
    }
    Ok(Some(merged))
}

/// Validate every element of an optional identified list and reject
/// duplicate ids.
pub async fn validate_identified_list<T>(
    value: &Option<Vec<T>>,
    ctx: &ValidationContext<'_>,
    field: &str,
) -> Result<(), Error>
where
    T: Validate + Identified,
{
    let Some(items) = value else {
        return Ok(());
    };
    let mut seen: Vec<&str> = Vec::new();
    for (index, item) in items.iter().enumerate() {
        let element_ctx = ctx.element(field, index);
        item.validate(&element_ctx).await?;
        if let Some(id) = item.id() {
            if seen.contains(&id) {
                return Err(element_ctx.error(format!("duplicate id '{id}'")));
            }
            seen.push(id);
        }
    }
    Ok(())
}

/// Validate every element of an optional unkeyed list.
pub async fn validate_list<T>(
    value: &Option<Vec<T>>,
    ctx: &ValidationContext<'_>,
    field: &str,
) -> Result<(), Error>
where
    T: Validate,
{
    let Some(items) = value else {
        return Ok(());
    };
    for (index, item) in items.iter().enumerate() {
        item.validate(&ctx.element(field, index)).await?;
    }
    Ok(())
}
