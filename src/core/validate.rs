//! Purpose: Field-level validation engine shared by every model in the crate.
//! Exports: `ValidationContext`, `Validate`, `ReferenceResolver`, field-rule helpers.
//! Role: Single source of truth for what the platform accepts in model fields.
//! Invariants: Every failure names the offending field with a dotted JSON path.
//! Invariants: Whitespace-only strings count as absent before any other rule.
//! Invariants: Referential checks are skipped when no resolver is attached.

use crate::core::error::{Error, ErrorKind};
use async_trait::async_trait;
use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::Value;
use time::format_description::well_known::Rfc3339;
use time::{Date, Month, OffsetDateTime};
use url::Url;

/// Length cap for names, labels, keywords, and ids.
pub const TEXT_LEN_MAX: usize = 255;
/// Length cap for free-form descriptions and norm conditions.
pub const DESCRIPTION_LEN_MAX: usize = 1024;

const BIRTH_YEAR_MIN: i32 = 1900;

static EMAIL_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Za-z0-9._%+-]+@[A-Za-z0-9.-]+\.[A-Za-z]{2,}$").expect("email pattern"));
static PHONE_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\+?[0-9 ().-]{5,24}$").expect("phone pattern"));
static LOCALE_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[a-z]{2,3}([_-][A-Z]{2})?$").expect("locale pattern"));

/// Answers whether ids exist on the sibling services.
///
/// Implemented by `api::ServiceRegistry` for live lookups and by in-memory
/// stubs in tests.
#[async_trait]
pub trait ReferenceResolver: Send + Sync {
    async fn profile_exists(&self, id: &str) -> Result<bool, Error>;
    async fn community_exists(&self, id: &str) -> Result<bool, Error>;
    async fn task_exists(&self, id: &str) -> Result<bool, Error>;
    async fn task_type_exists(&self, id: &str) -> Result<bool, Error>;
}

#[async_trait]
pub trait Validate: Send + Sync {
    async fn validate(&self, ctx: &ValidationContext<'_>) -> Result<(), Error>;
}

/// Where in the model tree a check is running, and how to reach siblings.
#[derive(Clone)]
pub struct ValidationContext<'a> {
    prefix: String,
    resolver: Option<&'a dyn ReferenceResolver>,
}

impl<'a> ValidationContext<'a> {
    /// Context for offline validation: field rules only, no referential checks.
    pub fn root() -> ValidationContext<'static> {
        ValidationContext {
            prefix: String::new(),
            resolver: None,
        }
    }

    pub fn with_resolver(resolver: &'a dyn ReferenceResolver) -> Self {
        Self {
            prefix: String::new(),
            resolver: Some(resolver),
        }
    }

    pub fn field(&self, name: &str) -> ValidationContext<'a> {
        let prefix = if self.prefix.is_empty() {
            name.to_string()
        } else {
            format!("{}.{name}", self.prefix)
        };
        ValidationContext {
            prefix,
            resolver: self.resolver,
        }
    }

    pub fn element(&self, name: &str, index: usize) -> ValidationContext<'a> {
        let mut child = self.field(name);
        child.prefix.push_str(&format!("[{index}]"));
        child
    }

    pub fn path(&self) -> &str {
        &self.prefix
    }

    pub fn resolver(&self) -> Option<&'a dyn ReferenceResolver> {
        self.resolver
    }

    pub fn error(&self, message: impl Into<String>) -> Error {
        let err = Error::new(ErrorKind::Validation).with_message(message);
        if self.prefix.is_empty() {
            err
        } else {
            err.with_field(self.prefix.clone())
        }
    }

    pub async fn check_profile(&self, id: &str) -> Result<(), Error> {
        let Some(resolver) = self.resolver else {
            return Ok(());
        };
        if resolver.profile_exists(id).await? {
            Ok(())
        } else {
            Err(self.error(format!("unknown user profile id '{id}'")))
        }
    }

    pub async fn check_community(&self, id: &str) -> Result<(), Error> {
        let Some(resolver) = self.resolver else {
            return Ok(());
        };
        if resolver.community_exists(id).await? {
            Ok(())
        } else {
            Err(self.error(format!("unknown community id '{id}'")))
        }
    }

    pub async fn check_task(&self, id: &str) -> Result<(), Error> {
        let Some(resolver) = self.resolver else {
            return Ok(());
        };
        if resolver.task_exists(id).await? {
            Ok(())
        } else {
            Err(self.error(format!("unknown task id '{id}'")))
        }
    }

    pub async fn check_task_type(&self, id: &str) -> Result<(), Error> {
        let Some(resolver) = self.resolver else {
            return Ok(());
        };
        if resolver.task_type_exists(id).await? {
            Ok(())
        } else {
            Err(self.error(format!("unknown task type id '{id}'")))
        }
    }
}

/// The trimmed value of an optional text field; whitespace-only is absent.
pub fn text_of(value: &Option<String>) -> Option<&str> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|value| !value.is_empty())
}

pub fn validate_text(
    ctx: &ValidationContext<'_>,
    value: &Option<String>,
    max_len: usize,
) -> Result<(), Error> {
    if let Some(value) = text_of(value) {
        if value.chars().count() > max_len {
            return Err(ctx.error(format!("value exceeds {max_len} characters")));
        }
    }
    Ok(())
}

pub fn validate_required_text(
    ctx: &ValidationContext<'_>,
    value: &Option<String>,
    max_len: usize,
) -> Result<(), Error> {
    validate_text(ctx, value, max_len)?;
    if text_of(value).is_none() {
        return Err(ctx.error("value is required"));
    }
    Ok(())
}

pub fn validate_keywords(
    ctx: &ValidationContext<'_>,
    field: &str,
    value: &Option<Vec<String>>,
) -> Result<(), Error> {
    let Some(keywords) = value else {
        return Ok(());
    };
    let mut seen: Vec<&str> = Vec::new();
    for (index, keyword) in keywords.iter().enumerate() {
        let element_ctx = ctx.element(field, index);
        let trimmed = keyword.trim();
        if trimmed.is_empty() {
            return Err(element_ctx.error("keyword cannot be empty"));
        }
        if trimmed.chars().count() > TEXT_LEN_MAX {
            return Err(element_ctx.error(format!("value exceeds {TEXT_LEN_MAX} characters")));
        }
        if seen.contains(&trimmed) {
            return Err(element_ctx.error(format!("duplicate keyword '{trimmed}'")));
        }
        seen.push(trimmed);
    }
    Ok(())
}

pub fn validate_email(ctx: &ValidationContext<'_>, value: &Option<String>) -> Result<(), Error> {
    validate_text(ctx, value, TEXT_LEN_MAX)?;
    if let Some(value) = text_of(value) {
        if !EMAIL_RE.is_match(value) {
            return Err(ctx.error(format!("'{value}' is not a valid email address")));
        }
    }
    Ok(())
}

pub fn validate_phone(ctx: &ValidationContext<'_>, value: &Option<String>) -> Result<(), Error> {
    if let Some(value) = text_of(value) {
        let digits = value.chars().filter(char::is_ascii_digit).count();
        if !PHONE_RE.is_match(value) || digits < 5 {
            return Err(ctx.error(format!("'{value}' is not a valid phone number")));
        }
    }
    Ok(())
}

pub fn validate_locale(ctx: &ValidationContext<'_>, value: &Option<String>) -> Result<(), Error> {
    if let Some(value) = text_of(value) {
        if !LOCALE_RE.is_match(value) {
            return Err(ctx.error(format!("'{value}' is not a valid locale")));
        }
    }
    Ok(())
}

pub fn validate_http_url(ctx: &ValidationContext<'_>, value: &Option<String>) -> Result<(), Error> {
    if let Some(value) = text_of(value) {
        let url = Url::parse(value).map_err(|_| ctx.error(format!("'{value}' is not a valid URL")))?;
        if url.scheme() != "http" && url.scheme() != "https" {
            return Err(ctx.error(format!("'{value}' is not an http(s) URL")));
        }
    }
    Ok(())
}

pub fn validate_unit_interval(ctx: &ValidationContext<'_>, value: Option<f64>) -> Result<(), Error> {
    if let Some(value) = value {
        if !(0.0..=1.0).contains(&value) {
            return Err(ctx.error(format!("{value} is outside [0, 1]")));
        }
    }
    Ok(())
}

pub fn validate_latitude(ctx: &ValidationContext<'_>, value: Option<f64>) -> Result<(), Error> {
    if let Some(value) = value {
        if !(-90.0..=90.0).contains(&value) {
            return Err(ctx.error(format!("{value} is outside [-90, 90]")));
        }
    }
    Ok(())
}

pub fn validate_longitude(ctx: &ValidationContext<'_>, value: Option<f64>) -> Result<(), Error> {
    if let Some(value) = value {
        if !(-180.0..=180.0).contains(&value) {
            return Err(ctx.error(format!("{value} is outside [-180, 180]")));
        }
    }
    Ok(())
}

pub fn validate_min_quantity(ctx: &ValidationContext<'_>, value: Option<u32>) -> Result<(), Error> {
    if value == Some(0) {
        return Err(ctx.error("quantity must be at least 1"));
    }
    Ok(())
}

pub fn validate_timestamp(ctx: &ValidationContext<'_>, value: Option<i64>) -> Result<(), Error> {
    if let Some(value) = value {
        if value < 0 {
            return Err(ctx.error("timestamp cannot be negative"));
        }
    }
    Ok(())
}

/// A birth date is a complete (year, month, day) triple naming a real
/// calendar day, no earlier than 1900 and not in the future.
pub fn validate_birth_date(
    ctx: &ValidationContext<'_>,
    year: Option<i32>,
    month: Option<u8>,
    day: Option<u8>,
) -> Result<(), Error> {
    match (year, month, day) {
        (None, None, None) => Ok(()),
        (Some(year), Some(month), Some(day)) => {
            let month = Month::try_from(month)
                .map_err(|_| ctx.error(format!("{month} is not a calendar month")))?;
            let date = Date::from_calendar_date(year, month, day)
                .map_err(|_| ctx.error(format!("day {day} does not exist in that month")))?;
            if year < BIRTH_YEAR_MIN {
                return Err(ctx.error(format!("birth year must be {BIRTH_YEAR_MIN} or later")));
            }
            if date > OffsetDateTime::now_utc().date() {
                return Err(ctx.error("birth date cannot be in the future"));
            }
            Ok(())
        }
        _ => Err(ctx.error("year, month and day must be set together")),
    }
}

pub fn parse_rfc3339(ctx: &ValidationContext<'_>, value: &str) -> Result<OffsetDateTime, Error> {
    OffsetDateTime::parse(value, &Rfc3339)
        .map_err(|_| ctx.error(format!("'{value}' is not an RFC 3339 timestamp")))
}

pub fn validate_rfc3339(
    ctx: &ValidationContext<'_>,
    value: &Option<String>,
) -> Result<Option<OffsetDateTime>, Error> {
    match text_of(value) {
        Some(value) => Ok(Some(parse_rfc3339(ctx, value)?)),
        None => Ok(None),
    }
}

pub fn validate_id_list(
    ctx: &ValidationContext<'_>,
    field: &str,
    value: &Option<Vec<String>>,
) -> Result<(), Error> {
    let Some(ids) = value else {
        return Ok(());
    };
    let mut seen: Vec<&str> = Vec::new();
    for (index, id) in ids.iter().enumerate() {
        let element_ctx = ctx.element(field, index);
        let trimmed = id.trim();
        if trimmed.is_empty() {
            return Err(element_ctx.error("id cannot be empty"));
        }
        if trimmed.chars().count() > TEXT_LEN_MAX {
            return Err(element_ctx.error(format!("value exceeds {TEXT_LEN_MAX} characters")));
        }
        if seen.contains(&trimmed) {
            return Err(element_ctx.error(format!("duplicate id '{trimmed}'")));
        }
        seen.push(trimmed);
    }
    Ok(())
}

pub fn validate_json_object(ctx: &ValidationContext<'_>, value: &Option<Value>) -> Result<(), Error> {
    if let Some(value) = value {
        if !value.is_object() {
            return Err(ctx.error("value must be a JSON object"));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn root() -> ValidationContext<'static> {
        ValidationContext::root()
    }

    #[test]
    fn field_paths_are_dotted_and_indexed() {
        let ctx = root();
        assert_eq!(ctx.field("name").field("first").path(), "name.first");
        assert_eq!(ctx.element("norms", 3).path(), "norms[3]");
    }

    #[test]
    fn whitespace_only_text_counts_as_absent() {
        assert_eq!(text_of(&Some("   ".to_string())), None);
        assert_eq!(text_of(&Some("  bob ".to_string())), Some("bob"));
        let ctx = root().field("name");
        let err = validate_required_text(&ctx, &Some("  ".to_string()), TEXT_LEN_MAX)
            .expect_err("required");
        assert_eq!(err.field(), Some("name"));
    }

    #[test]
    fn overlong_text_is_rejected_after_trim() {
        let ctx = root().field("label");
        let padded = format!("  {}  ", "x".repeat(TEXT_LEN_MAX));
        assert!(validate_text(&ctx, &Some(padded), TEXT_LEN_MAX).is_ok());
        let too_long = "x".repeat(TEXT_LEN_MAX + 1);
        assert!(validate_text(&ctx, &Some(too_long), TEXT_LEN_MAX).is_err());
    }

    #[test]
    fn email_format_is_enforced() {
        let ctx = root().field("email");
        assert!(validate_email(&ctx, &Some("jane.doe@example.org".into())).is_ok());
        assert!(validate_email(&ctx, &None).is_ok());
        assert!(validate_email(&ctx, &Some("not-an-email".into())).is_err());
        assert!(validate_email(&ctx, &Some("a@b".into())).is_err());
    }

    #[test]
    fn phone_needs_enough_digits() {
        let ctx = root().field("phoneNumber");
        assert!(validate_phone(&ctx, &Some("+39 0461 312300".into())).is_ok());
        assert!(validate_phone(&ctx, &Some("++--".into())).is_err());
        assert!(validate_phone(&ctx, &Some("12".into())).is_err());
    }

    #[test]
    fn locale_accepts_language_and_region() {
        let ctx = root().field("locale");
        assert!(validate_locale(&ctx, &Some("en".into())).is_ok());
        assert!(validate_locale(&ctx, &Some("it_IT".into())).is_ok());
        assert!(validate_locale(&ctx, &Some("en-GB".into())).is_ok());
        assert!(validate_locale(&ctx, &Some("English".into())).is_err());
    }

    #[test]
    fn avatar_must_be_http_url() {
        let ctx = root().field("avatar");
        assert!(validate_http_url(&ctx, &Some("https://cdn.example.org/a.png".into())).is_ok());
        assert!(validate_http_url(&ctx, &Some("ftp://example.org/a.png".into())).is_err());
        assert!(validate_http_url(&ctx, &Some("not a url".into())).is_err());
    }

    #[test]
    fn birth_date_rules() {
        let ctx = root().field("dateOfBirth");
        assert!(validate_birth_date(&ctx, None, None, None).is_ok());
        assert!(validate_birth_date(&ctx, Some(1987), Some(5), Some(21)).is_ok());
        // leap day
        assert!(validate_birth_date(&ctx, Some(2000), Some(2), Some(29)).is_ok());
        assert!(validate_birth_date(&ctx, Some(2001), Some(2), Some(29)).is_err());
        assert!(validate_birth_date(&ctx, Some(1803), Some(1), Some(1)).is_err());
        assert!(validate_birth_date(&ctx, Some(9999), Some(1), Some(1)).is_err());
        assert!(validate_birth_date(&ctx, Some(1987), None, Some(21)).is_err());
    }

    #[test]
    fn id_lists_reject_duplicates_and_blanks() {
        let ctx = root();
        let ok = Some(vec!["u1".to_string(), "u2".to_string()]);
        assert!(validate_id_list(&ctx, "attendees", &ok).is_ok());
        let blank = Some(vec!["u1".to_string(), "  ".to_string()]);
        let err = validate_id_list(&ctx, "attendees", &blank).expect_err("blank");
        assert_eq!(err.field(), Some("attendees[1]"));
        let dup = Some(vec!["u1".to_string(), " u1".to_string()]);
        assert!(validate_id_list(&ctx, "attendees", &dup).is_err());
    }

    #[test]
    fn keywords_reject_duplicates() {
        let ctx = root();
        let dup = Some(vec!["rust".to_string(), "rust".to_string()]);
        assert!(validate_keywords(&ctx, "keywords", &dup).is_err());
    }

    #[test]
    fn json_attributes_must_be_objects() {
        let ctx = root().field("attributes");
        assert!(validate_json_object(&ctx, &Some(serde_json::json!({"a": 1}))).is_ok());
        assert!(validate_json_object(&ctx, &Some(serde_json::json!([1, 2]))).is_err());
    }

    struct StaticResolver {
        known: &'static str,
    }

    #[async_trait]
    impl ReferenceResolver for StaticResolver {
        async fn profile_exists(&self, id: &str) -> Result<bool, Error> {
            Ok(id == self.known)
        }
        async fn community_exists(&self, _id: &str) -> Result<bool, Error> {
            Ok(false)
        }
        async fn task_exists(&self, _id: &str) -> Result<bool, Error> {
            Ok(false)
        }
        async fn task_type_exists(&self, _id: &str) -> Result<bool, Error> {
            Ok(false)
        }
    }

    #[tokio::test]
    async fn referential_checks_use_the_resolver() {
        let resolver = StaticResolver { known: "u1" };
        let ctx = ValidationContext::with_resolver(&resolver).field("requesterId");
        assert!(ctx.check_profile("u1").await.is_ok());
        let err = ctx.check_profile("u2").await.expect_err("unknown");
        assert_eq!(err.field(), Some("requesterId"));
    }

    #[tokio::test]
    async fn referential_checks_skip_without_resolver() {
        let ctx = ValidationContext::root();
        assert!(ctx.check_profile("anything").await.is_ok());
        assert!(ctx.check_task("anything").await.is_ok());
    }
}
