use serde_json::Value;

use crate::error::{BloodMatchError, Result};
use crate::parsers::Dataset;
use crate::types::*;

/// Accepted JSON layouts. Bare arrays hold a single record kind, recognised
/// from the keys of the first element; an object bundles all three.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum JsonLayout {
    Requests,
    Profiles,
    Locations,
    Bundle,
    Empty,
}

impl JsonLayout {
    fn detect(value: &Value) -> Option<Self> {
        match value {
            Value::Object(_) => Some(JsonLayout::Bundle),
            Value::Array(items) => match items.first() {
                None => Some(JsonLayout::Empty),
                Some(Value::Object(first)) => {
                    if first.contains_key("id") {
                        Some(JsonLayout::Requests)
                    } else if first.contains_key("principal") {
                        Some(JsonLayout::Profiles)
                    } else if first.contains_key("type") {
                        Some(JsonLayout::Locations)
                    } else {
                        None
                    }
                }
                Some(_) => None,
            },
            _ => None,
        }
    }
}

/// Parser for JSON exports of the donation service
pub struct JsonDatasetParser;

impl JsonDatasetParser {
    pub fn new() -> Self {
        Self
    }

    /// The layout is picked before the records are decoded, so a bad record
    /// reports serde_json's own message with its line and column.
    pub fn parse_str(&self, contents: &str, source: &str) -> Result<Dataset> {
        let value: Value = serde_json::from_str(contents)?;
        let layout =
            JsonLayout::detect(&value).ok_or_else(|| BloodMatchError::UnknownJsonLayout {
                path: source.to_string(),
            })?;

        let dataset = match layout {
            JsonLayout::Requests => Dataset {
                requests: serde_json::from_str::<Vec<BloodRequest>>(contents)?,
                ..Dataset::default()
            },
            JsonLayout::Profiles => Dataset {
                profiles: serde_json::from_str::<Vec<UserProfile>>(contents)?,
                ..Dataset::default()
            },
            JsonLayout::Locations => Dataset {
                locations: serde_json::from_str::<Vec<ActiveLocation>>(contents)?,
                ..Dataset::default()
            },
            JsonLayout::Bundle => serde_json::from_str::<Dataset>(contents)?,
            JsonLayout::Empty => Dataset::default(),
        };

        Ok(dataset)
    }
}

impl Default for JsonDatasetParser {
    fn default() -> Self {
        Self::new()
    }
}
