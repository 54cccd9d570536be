use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};

use crate::error::KeyError;

/// Launch visibility of an image as tracked during a run.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ImageStatus {
    Public,
    Private,
    Updating,
    Error,
}

impl ImageStatus {
    pub fn label(&self) -> &'static str {
        match self {
            ImageStatus::Public => "PUBLIC",
            ImageStatus::Private => "PRIVATE",
            ImageStatus::Updating => "UPDATING...",
            ImageStatus::Error => "ERROR",
        }
    }
}

/// Identity of an image across regions: `region:identifier`.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ImageKey {
    pub region: String,
    pub id: String,
}

impl ImageKey {
    pub fn new(region: impl Into<String>, id: impl Into<String>) -> Self {
        Self { region: region.into(), id: id.into() }
    }
}

impl fmt::Display for ImageKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.region, self.id)
    }
}

impl FromStr for ImageKey {
    type Err = KeyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let parts: Vec<&str> = s.split(':').collect();
        match parts.as_slice() {
            [region, id] if !region.is_empty() && !id.is_empty() => Ok(ImageKey::new(*region, *id)),
            _ => Err(KeyError(s.to_string())),
        }
    }
}

#[derive(Clone, Debug)]
pub struct ImageRecord {
    pub id: String,
    pub name: String,
    pub region: String,
    pub created: Option<DateTime<Utc>>,
    pub status: ImageStatus,
    pub architecture: String,
    /// Image this one was presumably copied from (tag or description).
    pub copied_from: Option<String>,
    pub error: Option<String>,
}

impl ImageRecord {
    pub fn key(&self) -> ImageKey {
        ImageKey::new(self.region.clone(), self.id.clone())
    }

    pub fn has_key(&self, key: &ImageKey) -> bool {
        self.region == key.region && self.id == key.id
    }

    pub fn is_public(&self) -> bool {
        self.status == ImageStatus::Public
    }

    pub fn is_private(&self) -> bool {
        self.status == ImageStatus::Private
    }

    /// Creation date as `YYYY-MM-DD HH:MM:SS`, or a placeholder when unknown.
    pub fn created_display(&self) -> String {
        self.created
            .map(|d| d.format("%Y-%m-%d %H:%M:%S").to_string())
            .unwrap_or_else(|| "-".repeat(19))
    }
}
