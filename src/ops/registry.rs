// ============================================================================
// NAMED FILTERS — string key → fresh Filter
// ============================================================================

use std::str::FromStr;

use super::filters::{Filter, FilterKind};
use super::processor::FilterError;

/// Every registry key, in listing order.
pub const FILTER_NAMES: [&str; 6] = ["red", "green", "blue", "grayscale", "contrast", "alpha"];

/// Build the filter registered under `name` at its default intensity.
///
/// Each call returns a new value, so adjusting the intensity of one resolved
/// filter never leaks into later lookups.
pub fn filter_by_name(name: &str) -> Option<Filter> {
    FilterKind::from_name(name).map(Filter::new)
}

/// Like [`filter_by_name`] but reports unknown names as an error.
pub fn resolve(name: &str) -> Result<Filter, FilterError> {
    filter_by_name(name).ok_or_else(|| FilterError::FilterNotFound(name.to_string()))
}

/// Textual filter reference: `name` or `name=intensity`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FilterSpec {
    pub kind: FilterKind,
    pub intensity: Option<i32>,
}

impl FilterSpec {
    pub fn to_filter(&self) -> Filter {
        match self.intensity {
            Some(i) => Filter::with_intensity(self.kind, i),
            None => Filter::new(self.kind),
        }
    }
}

impl FromStr for FilterSpec {
    type Err = FilterError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (name, intensity) = match s.split_once('=') {
            Some((name, value)) => {
                let value = value.trim();
                let parsed = value
                    .parse::<i32>()
                    .map_err(|_| FilterError::InvalidSpec(s.to_string()))?;
                (name.trim(), Some(parsed))
            }
            None => (s.trim(), None),
        };
        let kind = FilterKind::from_name(name)
            .ok_or_else(|| FilterError::FilterNotFound(name.to_string()))?;
        Ok(Self { kind, intensity })
    }
}

impl std::fmt::Display for FilterSpec {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.intensity {
            Some(i) => write!(f, "{}={}", self.kind, i),
            None => write!(f, "{}", self.kind),
        }
    }
}
