use chrono::{DateTime, TimeZone, Utc};
use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::ParseBloodGroupError;

/// The eight standard ABO/Rh blood groups
///
/// Serialized with the wire names used by the donation service (`aPositive`,
/// `abNegative`, ...). Deserialization also accepts display labels so that
/// hand-written CSV exports with `A+` or `O-` columns load as well.
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(rename_all = "camelCase")]
pub enum BloodGroup {
    APositive,
    ANegative,
    BPositive,
    BNegative,
    AbPositive,
    AbNegative,
    OPositive,
    ONegative,
}

lazy_static! {
    static ref BLOOD_GROUP_PATTERN: Regex =
        Regex::new(r"(?i)^\s*(ab|a|b|o)\s*(\+|-|−|positive|pos|negative|neg)\s*$")
            .expect("blood group pattern is valid");
}

impl BloodGroup {
    pub const ALL: [BloodGroup; 8] = [
        BloodGroup::APositive,
        BloodGroup::ANegative,
        BloodGroup::BPositive,
        BloodGroup::BNegative,
        BloodGroup::AbPositive,
        BloodGroup::AbNegative,
        BloodGroup::OPositive,
        BloodGroup::ONegative,
    ];

    /// Conventional display label, e.g. `AB-`
    pub fn label(&self) -> &'static str {
        match self {
            BloodGroup::APositive => "A+",
            BloodGroup::ANegative => "A-",
            BloodGroup::BPositive => "B+",
            BloodGroup::BNegative => "B-",
            BloodGroup::AbPositive => "AB+",
            BloodGroup::AbNegative => "AB-",
            BloodGroup::OPositive => "O+",
            BloodGroup::ONegative => "O-",
        }
    }

    pub fn is_rh_positive(&self) -> bool {
        matches!(
            self,
            BloodGroup::APositive
                | BloodGroup::BPositive
                | BloodGroup::AbPositive
                | BloodGroup::OPositive
        )
    }
}

impl fmt::Display for BloodGroup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for BloodGroup {
    type Err = ParseBloodGroupError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let caps = BLOOD_GROUP_PATTERN
            .captures(s)
            .ok_or_else(|| ParseBloodGroupError(s.to_string()))?;

        let positive = matches!(
            caps[2].to_lowercase().as_str(),
            "+" | "pos" | "positive"
        );

        let group = match (caps[1].to_lowercase().as_str(), positive) {
            ("a", true) => BloodGroup::APositive,
            ("a", false) => BloodGroup::ANegative,
            ("b", true) => BloodGroup::BPositive,
            ("b", false) => BloodGroup::BNegative,
            ("ab", true) => BloodGroup::AbPositive,
            ("ab", false) => BloodGroup::AbNegative,
            ("o", true) => BloodGroup::OPositive,
            ("o", false) => BloodGroup::ONegative,
            _ => return Err(ParseBloodGroupError(s.to_string())),
        };

        Ok(group)
    }
}

impl<'de> Deserialize<'de> for BloodGroup {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Urgency {
    Normal,
    High,
    Critical,
}

impl Urgency {
    pub fn display_name(&self) -> &'static str {
        match self {
            Urgency::Normal => "Normal",
            Urgency::High => "High",
            Urgency::Critical => "Critical",
        }
    }

    /// Badge variant used when listing a request
    pub fn badge_variant(&self) -> &'static str {
        match self {
            Urgency::Critical => "destructive",
            Urgency::High => "default",
            Urgency::Normal => "secondary",
        }
    }

    /// Text colour of the urgency line on a map marker
    pub fn color(&self) -> &'static str {
        match self {
            Urgency::Critical => "#dc2626",
            Urgency::High => "#f59e0b",
            Urgency::Normal => "#10b981",
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum RequestStatus {
    Pending,
    Matched,
    Completed,
    Cancelled,
}

impl RequestStatus {
    pub fn status_class(&self) -> &'static str {
        match self {
            RequestStatus::Completed => "bg-green-500/10 text-green-700 dark:text-green-400",
            RequestStatus::Matched => "bg-blue-500/10 text-blue-700 dark:text-blue-400",
            RequestStatus::Cancelled => "bg-gray-500/10 text-gray-700 dark:text-gray-400",
            RequestStatus::Pending => "bg-yellow-500/10 text-yellow-700 dark:text-yellow-400",
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum LocationKind {
    Donor,
    Request,
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum UserRole {
    Admin,
    #[default]
    User,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Location {
    #[serde(default)]
    pub address: String,
    #[serde(default)]
    pub city: String,
    pub latitude: f64,
    pub longitude: f64,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct Coordinates {
    pub latitude: f64,
    pub longitude: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct BloodRequest {
    pub id: String,
    pub status: RequestStatus,
    pub requester: String,
    pub urgency: Urgency,
    /// Nanoseconds since the Unix epoch
    pub created_at: i64,
    pub blood_group: BloodGroup,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub matched_donor: Option<String>,
    pub location: Location,
}

impl BloodRequest {
    /// Street address when known, city otherwise
    pub fn display_location(&self) -> &str {
        if self.location.address.is_empty() {
            &self.location.city
        } else {
            &self.location.address
        }
    }

    pub fn created_at_utc(&self) -> DateTime<Utc> {
        Utc.timestamp_nanos(self.created_at)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    pub principal: String,
    pub name: String,
    #[serde(default)]
    pub contact_pref: String,
    #[serde(default)]
    pub role: UserRole,
    pub available: bool,
    pub blood_group: BloodGroup,
    pub location: Location,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ActiveLocation {
    #[serde(rename = "type")]
    pub kind: LocationKind,
    pub blood_group: BloodGroup,
    pub coordinates: Coordinates,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub request_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub requester: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub urgency: Option<Urgency>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub availability: Option<bool>,
}
