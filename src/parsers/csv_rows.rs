use csv::{ReaderBuilder, StringRecord, Trim};
use serde::de::DeserializeOwned;
use serde::Deserialize;

use crate::error::{BloodMatchError, Result};
use crate::parsers::Dataset;
use crate::types::*;

#[derive(Debug, Deserialize)]
struct RequestRow {
    id: String,
    status: RequestStatus,
    requester: String,
    urgency: Urgency,
    created_at: Option<i64>,
    blood_group: BloodGroup,
    matched_donor: Option<String>,
    #[serde(default)]
    address: String,
    #[serde(default)]
    city: String,
    latitude: f64,
    longitude: f64,
}

impl From<RequestRow> for BloodRequest {
    fn from(row: RequestRow) -> Self {
        BloodRequest {
            id: row.id,
            status: row.status,
            requester: row.requester,
            urgency: row.urgency,
            created_at: row.created_at.unwrap_or(0),
            blood_group: row.blood_group,
            matched_donor: row.matched_donor,
            location: Location {
                address: row.address,
                city: row.city,
                latitude: row.latitude,
                longitude: row.longitude,
            },
        }
    }
}

#[derive(Debug, Deserialize)]
struct ProfileRow {
    principal: String,
    name: String,
    #[serde(default)]
    contact_pref: String,
    role: Option<UserRole>,
    available: bool,
    blood_group: BloodGroup,
    #[serde(default)]
    address: String,
    #[serde(default)]
    city: String,
    latitude: f64,
    longitude: f64,
}

impl From<ProfileRow> for UserProfile {
    fn from(row: ProfileRow) -> Self {
        UserProfile {
            principal: row.principal,
            name: row.name,
            contact_pref: row.contact_pref,
            role: row.role.unwrap_or_default(),
            available: row.available,
            blood_group: row.blood_group,
            location: Location {
                address: row.address,
                city: row.city,
                latitude: row.latitude,
                longitude: row.longitude,
            },
        }
    }
}

#[derive(Debug, Deserialize)]
struct LocationRow {
    #[serde(rename = "type")]
    kind: LocationKind,
    blood_group: BloodGroup,
    latitude: f64,
    longitude: f64,
    request_id: Option<String>,
    requester: Option<String>,
    urgency: Option<Urgency>,
    availability: Option<bool>,
}

impl From<LocationRow> for ActiveLocation {
    fn from(row: LocationRow) -> Self {
        ActiveLocation {
            kind: row.kind,
            blood_group: row.blood_group,
            coordinates: Coordinates {
                latitude: row.latitude,
                longitude: row.longitude,
            },
            request_id: row.request_id,
            requester: row.requester,
            urgency: row.urgency,
            availability: row.availability,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum CsvLayout {
    Requests,
    Profiles,
    Locations,
}

impl CsvLayout {
    fn detect(headers: &StringRecord) -> Option<Self> {
        let has = |name: &str| headers.iter().any(|h| h == name);

        if has("id") && has("status") {
            Some(CsvLayout::Requests)
        } else if has("principal") && has("name") {
            Some(CsvLayout::Profiles)
        } else if has("type") && has("blood_group") {
            Some(CsvLayout::Locations)
        } else {
            None
        }
    }
}

/// CSV exports hold one record kind per file, recognised from the header row.
/// Column names are snake_case, empty cells read as missing optional values.
pub struct CsvDatasetParser;

impl CsvDatasetParser {
    pub fn new() -> Self {
        Self
    }

    pub fn parse_str(&self, contents: &str, source: &str) -> Result<Dataset> {
        let mut reader = ReaderBuilder::new()
            .trim(Trim::All)
            .from_reader(contents.as_bytes());

        let headers: StringRecord = reader
            .headers()?
            .iter()
            .map(|h| h.to_lowercase())
            .collect();
        reader.set_headers(headers.clone());

        let layout =
            CsvLayout::detect(&headers).ok_or_else(|| BloodMatchError::UnknownCsvLayout {
                path: source.to_string(),
                headers: headers.iter().map(str::to_string).collect(),
            })?;

        let mut dataset = Dataset::default();
        match layout {
            CsvLayout::Requests => {
                dataset.requests = read_rows::<RequestRow, BloodRequest>(&mut reader)?
            }
            CsvLayout::Profiles => {
                dataset.profiles = read_rows::<ProfileRow, UserProfile>(&mut reader)?
            }
            CsvLayout::Locations => {
                dataset.locations = read_rows::<LocationRow, ActiveLocation>(&mut reader)?
            }
        }

        Ok(dataset)
    }
}

impl Default for CsvDatasetParser {
    fn default() -> Self {
        Self::new()
    }
}

fn read_rows<R, T>(reader: &mut csv::Reader<&[u8]>) -> Result<Vec<T>>
where
    R: DeserializeOwned,
    T: From<R>,
{
    reader
        .deserialize::<R>()
        .map(|row| row.map(T::from).map_err(BloodMatchError::from))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_requests_csv() {
        let csv = "id,status,requester,urgency,created_at,blood_group,matched_donor,address,city,latitude,longitude\n\
                   r1,pending,p1,high,0,A-,,,Abuja,9.05,7.49\n\
                   r2,matched,p2,normal,5,oPositive,p9,3 Ring Rd,Ibadan,7.37,3.9\n";

        let dataset = CsvDatasetParser::new().parse_str(csv, "requests.csv").unwrap();
        assert_eq!(dataset.requests.len(), 2);
        assert_eq!(dataset.requests[0].blood_group, BloodGroup::ANegative);
        assert_eq!(dataset.requests[0].matched_donor, None);
        assert_eq!(dataset.requests[0].display_location(), "Abuja");
        assert_eq!(dataset.requests[1].matched_donor.as_deref(), Some("p9"));
    }

    #[test]
    fn test_requests_csv_blank_or_missing_created_at() {
        let blank = "id,status,requester,urgency,created_at,blood_group,latitude,longitude\n\
                     r1,pending,p1,normal,,B+,0.0,0.0\n";
        let dataset = CsvDatasetParser::new().parse_str(blank, "requests.csv").unwrap();
        assert_eq!(dataset.requests[0].created_at, 0);

        let missing = "id,status,requester,urgency,blood_group,latitude,longitude\n\
                       r2,pending,p1,normal,B+,0.0,0.0\n";
        let dataset = CsvDatasetParser::new().parse_str(missing, "requests.csv").unwrap();
        assert_eq!(dataset.requests[0].created_at, 0);
    }

    #[test]
    fn test_profiles_csv_with_mixed_case_headers() {
        let csv = "Principal,Name,Contact_Pref,Role,Available,Blood_Group,Address,City,Latitude,Longitude\n\
                   p1, Ada ,sms,,true,AB+,,Enugu,6.4,7.5\n";

        let dataset = CsvDatasetParser::new().parse_str(csv, "profiles.csv").unwrap();
        assert_eq!(dataset.profiles.len(), 1);
        let profile = &dataset.profiles[0];
        assert_eq!(profile.name, "Ada");
        assert_eq!(profile.role, UserRole::User);
        assert_eq!(profile.blood_group, BloodGroup::AbPositive);
    }

    #[test]
    fn test_locations_csv() {
        let csv = "type,blood_group,latitude,longitude,request_id,requester,urgency,availability\n\
                   donor,B-,1.0,2.0,,,,true\n\
                   request,O+,3.0,4.0,r7,p3,critical,\n";

        let dataset = CsvDatasetParser::new().parse_str(csv, "locations.csv").unwrap();
        assert_eq!(dataset.locations.len(), 2);
        assert_eq!(dataset.locations[0].availability, Some(true));
        assert_eq!(dataset.locations[1].urgency, Some(Urgency::Critical));
        assert_eq!(dataset.locations[1].availability, None);
    }

    #[test]
    fn test_unknown_layout() {
        let err = CsvDatasetParser::new()
            .parse_str("foo,bar\n1,2\n", "odd.csv")
            .unwrap_err();
        assert!(matches!(err, BloodMatchError::UnknownCsvLayout { .. }));
    }
}
