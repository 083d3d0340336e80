//! Helper functions and utilities
//!
//! This module contains common helper functions used throughout the application.

use std::sync::OnceLock;
use chrono::{DateTime, Datelike, NaiveDate, Utc};
use rand::distributions::Alphanumeric;
use rand::Rng;
use regex::Regex;
use url::Url;
use crate::utils::errors::{LaunchpadError, Result};

/// Default page size for paginated listings
pub const DEFAULT_PAGE_SIZE: i64 = 20;

/// Largest page size a client may request
pub const MAX_PAGE_SIZE: i64 = 100;

fn email_regex() -> &'static Regex {
    static EMAIL: OnceLock<Regex> = OnceLock::new();
    EMAIL.get_or_init(|| {
        Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").expect("email regex is valid")
    })
}

fn username_regex() -> &'static Regex {
    static USERNAME: OnceLock<Regex> = OnceLock::new();
    USERNAME.get_or_init(|| Regex::new(r"^[a-z0-9_]{3,32}$").expect("username regex is valid"))
}

fn slug_separator_regex() -> &'static Regex {
    static SEPARATOR: OnceLock<Regex> = OnceLock::new();
    SEPARATOR.get_or_init(|| Regex::new(r"[^a-z0-9]+").expect("slug regex is valid"))
}

/// Generate a random alphanumeric string
pub fn generate_random_string(length: usize) -> String {
    rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(length)
        .map(char::from)
        .collect()
}

/// Turn a product name into a URL slug.
///
/// Lowercases, collapses every run of non-alphanumeric ASCII into a single `-` and
/// trims dashes from both ends. Names without any usable characters become `product`.
pub fn slugify(name: &str) -> String {
    let lower = name.to_lowercase();
    let slug = slug_separator_regex().replace_all(&lower, "-");
    let slug = slug.trim_matches('-');

    let slug: String = slug.chars().take(60).collect();
    let slug = slug.trim_end_matches('-');

    if slug.is_empty() {
        "product".to_string()
    } else {
        slug.to_string()
    }
}

/// Slug candidate for the given collision attempt (`acme`, `acme-2`, `acme-3`, ...)
pub fn slug_candidate(base: &str, attempt: u32) -> String {
    if attempt <= 1 {
        base.to_string()
    } else {
        format!("{}-{}", base, attempt)
    }
}

/// Normalize whitespace in text
pub fn normalize_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Validate email format
pub fn is_valid_email(email: &str) -> bool {
    email.len() <= 254 && email_regex().is_match(email)
}

/// Validate username format (already lowercased)
pub fn is_valid_username(username: &str) -> bool {
    username_regex().is_match(username)
}

/// Parse an absolute http(s) URL
pub fn parse_web_url(field: &str, value: &str) -> Result<String> {
    let parsed = Url::parse(value.trim())
        .map_err(|_| LaunchpadError::InvalidInput(format!("{} must be a valid URL", field)))?;

    match parsed.scheme() {
        "http" | "https" if parsed.host_str().is_some() => Ok(parsed.to_string()),
        _ => Err(LaunchpadError::InvalidInput(format!("{} must be an http or https URL", field))),
    }
}

/// Trim a required text field and check its length in characters
pub fn require_text(field: &str, value: &str, min: usize, max: usize) -> Result<String> {
    let trimmed = value.trim();
    let len = trimmed.chars().count();

    if len < min {
        return Err(LaunchpadError::InvalidInput(if min <= 1 {
            format!("{} is required", field)
        } else {
            format!("{} must be at least {} characters", field, min)
        }));
    }

    if len > max {
        return Err(LaunchpadError::InvalidInput(format!(
            "{} must be at most {} characters",
            field, max
        )));
    }

    Ok(trimmed.to_string())
}

/// Trim an optional text field; blank values become `None`
pub fn optional_text(field: &str, value: Option<&str>, max: usize) -> Result<Option<String>> {
    match value.map(str::trim) {
        None | Some("") => Ok(None),
        Some(v) => require_text(field, v, 1, max).map(Some),
    }
}

/// `ILIKE` pattern matching `search` anywhere, with wildcards in the search
/// taken literally. Pair with `ESCAPE '\'`.
pub fn contains_pattern(search: &str) -> String {
    let mut pattern = String::with_capacity(search.len() + 2);
    pattern.push('%');
    for c in search.chars() {
        if matches!(c, '%' | '_' | '\\') {
            pattern.push('\\');
        }
        pattern.push(c);
    }
    pattern.push('%');
    pattern
}

/// Clamp client supplied pagination into `(limit, offset)`
pub fn pagination(page: Option<i64>, per_page: Option<i64>) -> (i64, i64) {
    let per_page = per_page.unwrap_or(DEFAULT_PAGE_SIZE).clamp(1, MAX_PAGE_SIZE);
    let page = page.unwrap_or(1).max(1);
    (per_page, calculate_offset(page, per_page))
}

/// Calculate pagination offset
pub fn calculate_offset(page: i64, page_size: i64) -> i64 {
    page.saturating_sub(1).saturating_mul(page_size)
}

/// Month key used by the boost sales counters (`YYYY-MM`)
pub fn month_key(timestamp: DateTime<Utc>) -> String {
    timestamp.format("%Y-%m").to_string()
}

/// The `count` month keys ending with the month of `now`, oldest first
pub fn recent_month_keys(now: DateTime<Utc>, count: u32) -> Vec<String> {
    let mut year = now.year();
    let mut month = now.month();
    let mut keys = Vec::with_capacity(count as usize);

    for _ in 0..count {
        keys.push(format!("{:04}-{:02}", year, month));
        if month == 1 {
            month = 12;
            year -= 1;
        } else {
            month -= 1;
        }
    }

    keys.reverse();
    keys
}

/// First instant of a `YYYY-MM` month key
pub fn month_start(key: &str) -> Option<DateTime<Utc>> {
    let date = NaiveDate::parse_from_str(&format!("{}-01", key), "%Y-%m-%d").ok()?;
    Some(date.and_hms_opt(0, 0, 0)?.and_utc())
}
