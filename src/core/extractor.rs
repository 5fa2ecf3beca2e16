use crate::models::AppIdentifier;
use regex::Regex;
use std::sync::LazyLock;
use thiserror::Error;

/// Human-readable list of accepted input shapes, used in error hints
pub const ACCEPTED_FORMATS: &str =
    "com.whatsapp or https://play.google.com/store/apps/details?id=com.whatsapp";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ExtractError {
    #[error("input is empty")]
    Empty,

    #[error("could not find an application identifier in '{0}'")]
    NotFound(String),
}

/// Marker rules, tried in order. A capture stops at the first character
/// outside `[A-Za-z0-9._]` and only counts when it contains a `.`.
static MARKER_RULES: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    [
        r"(?i)id=([A-Za-z0-9._]+)",
        r"(?i)appId=([A-Za-z0-9._]+)",
        r"(?i)/details\?id=([A-Za-z0-9._]+)",
        r"(?i)play\.google\.com/store/apps/details\?id=([A-Za-z0-9._]+)",
    ]
    .iter()
    .map(|pattern| Regex::new(pattern).expect("marker pattern is valid"))
    .collect()
});

#[inline]
fn is_identifier_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '.' || c == '_'
}

/// True when `candidate` is non-empty, uses only identifier characters and
/// contains at least one `.`
pub fn is_bare_identifier(candidate: &str) -> bool {
    !candidate.is_empty() && candidate.contains('.') && candidate.chars().all(is_identifier_char)
}

/// Extract the application identifier from a listing URL, query fragment or
/// bare identifier.
pub fn extract(raw: &str) -> Result<AppIdentifier, ExtractError> {
    let input = raw.trim();
    if input.is_empty() {
        return Err(ExtractError::Empty);
    }

    for rule in MARKER_RULES.iter() {
        let found = rule
            .captures_iter(input)
            .filter_map(|c| c.get(1))
            .find(|m| m.as_str().contains('.'));
        if let Some(found) = found {
            return Ok(AppIdentifier::new_unchecked(found.as_str()));
        }
    }

    if is_bare_identifier(input) {
        return Ok(AppIdentifier::new_unchecked(input));
    }

    if let Some(segment) = last_identifier_segment(input) {
        return Ok(AppIdentifier::new_unchecked(segment));
    }

    Err(ExtractError::NotFound(input.to_string()))
}

/// Scan path segments from the end for one shaped like an identifier.
///
/// The host of an absolute URL is never a candidate.
fn last_identifier_segment(input: &str) -> Option<&str> {
    let path = match input.split_once("://") {
        Some((_, rest)) => rest.split_once('/').map(|(_, path)| path)?,
        None => input,
    };

    path.split('/')
        .rev()
        .map(|segment| segment.split(['?', '#']).next().unwrap_or(segment))
        .find(|segment| is_bare_identifier(segment))
}
