//! Domain primitives for the curation workflow.
//!
//! Newtypes keep internal recommendation ids and upstream TMDB movie ids from
//! being swapped at call sites; both are plain integers on the wire.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::constants::limits::MAX_PAGE;

/// Internal identifier of a stored recommendation record.
///
/// # Examples
///
/// ```rust
/// use marquee::domain::RecommendationId;
///
/// let id = RecommendationId::new(7);
/// assert_eq!(id.value(), 7);
/// assert_eq!(id.to_string(), "7");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct RecommendationId(i32);

impl RecommendationId {
    #[must_use]
    pub const fn new(id: i32) -> Self {
        Self(id)
    }

    #[must_use]
    pub const fn value(&self) -> i32 {
        self.0
    }
}

impl fmt::Display for RecommendationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<i32> for RecommendationId {
    fn from(id: i32) -> Self {
        Self::new(id)
    }
}

impl From<RecommendationId> for i32 {
    fn from(id: RecommendationId) -> Self {
        id.0
    }
}

impl Serialize for RecommendationId {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_i32(self.0)
    }
}

impl<'de> Deserialize<'de> for RecommendationId {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        i32::deserialize(deserializer).map(Self::new)
    }
}

/// Upstream (TMDB) movie identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MovieId(i32);

impl MovieId {
    #[must_use]
    pub const fn new(id: i32) -> Self {
        Self(id)
    }

    #[must_use]
    pub const fn value(&self) -> i32 {
        self.0
    }
}

impl fmt::Display for MovieId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<i32> for MovieId {
    fn from(id: i32) -> Self {
        Self::new(id)
    }
}

/// One-based page number accepted by the upstream listing endpoints.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Page(u32);

impl Page {
    pub const FIRST: Self = Self(1);

    /// Returns `None` outside `1..=500`, the range the provider serves.
    #[must_use]
    pub const fn new(page: u32) -> Option<Self> {
        if page >= 1 && page <= MAX_PAGE {
            Some(Self(page))
        } else {
            None
        }
    }

    #[must_use]
    pub const fn value(&self) -> u32 {
        self.0
    }
}

impl Default for Page {
    fn default() -> Self {
        Self::FIRST
    }
}

/// Identity bound into an authenticated session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdminIdentity {
    pub id: i32,
    pub username: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn recommendation_id_conversions() {
        let id = RecommendationId::new(42);
        assert_eq!(id.value(), 42);
        assert_eq!(id.to_string(), "42");
        assert_eq!(i32::from(id), 42);
        assert_eq!(RecommendationId::from(42), id);
    }

    #[test]
    fn movie_id_is_transparent_on_the_wire() {
        let json = serde_json::to_string(&MovieId::new(550)).unwrap();
        assert_eq!(json, "550");
        let back: MovieId = serde_json::from_str("550").unwrap();
        assert_eq!(back.value(), 550);
    }

    #[test]
    fn page_bounds() {
        assert_eq!(Page::default().value(), 1);
        assert!(Page::new(1).is_some());
        assert!(Page::new(500).is_some());
        assert!(Page::new(0).is_none());
        assert!(Page::new(501).is_none());
    }
}
