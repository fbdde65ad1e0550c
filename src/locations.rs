use serde::{Deserialize, Serialize};

use crate::compatibility::format_label;
use crate::types::*;

pub const DONOR_COLOR: &str = "#10b981";
pub const REQUEST_COLOR: &str = "#ef4444";

/// Zoom ceiling applied when the map only holds one marker
pub const MAX_SINGLE_MARKER_ZOOM: u8 = 15;

/// Display model for one marker on the live map
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MarkerView {
    pub kind: LocationKind,
    pub title: &'static str,
    pub color: &'static str,
    pub blood_group: String,
    pub latitude: f64,
    pub longitude: f64,
    pub urgency: Option<String>,
    pub urgency_color: Option<&'static str>,
    pub status: Option<&'static str>,
}

impl MarkerView {
    pub fn from_location(location: &ActiveLocation) -> Self {
        let is_donor = location.kind == LocationKind::Donor;

        // Urgency only applies to requests, availability only to donors
        let urgency = location.urgency.filter(|_| !is_donor);
        let status = location
            .availability
            .filter(|_| is_donor)
            .map(|available| if available { "Available" } else { "Unavailable" });

        Self {
            kind: location.kind,
            title: if is_donor {
                "Available Donor"
            } else {
                "Blood Request"
            },
            color: if is_donor { DONOR_COLOR } else { REQUEST_COLOR },
            blood_group: format_label(location.blood_group),
            latitude: location.coordinates.latitude,
            longitude: location.coordinates.longitude,
            urgency: urgency.map(|u| u.display_name().to_string()),
            urgency_color: urgency.map(|u| u.color()),
            status,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LocationSummary {
    pub total: usize,
    pub donors: usize,
    pub requests: usize,
}

impl LocationSummary {
    pub fn from_locations(locations: &[ActiveLocation]) -> Self {
        let donors = locations
            .iter()
            .filter(|l| l.kind == LocationKind::Donor)
            .count();

        Self {
            total: locations.len(),
            donors,
            requests: locations.len() - donors,
        }
    }
}

/// Bounding box around every marker
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MapBounds {
    pub south: f64,
    pub west: f64,
    pub north: f64,
    pub east: f64,
    pub max_zoom: Option<u8>,
}

impl MapBounds {
    pub fn from_locations(locations: &[ActiveLocation]) -> Option<Self> {
        let first = locations.first()?.coordinates;

        let mut bounds = locations.iter().skip(1).fold(
            Self {
                south: first.latitude,
                west: first.longitude,
                north: first.latitude,
                east: first.longitude,
                max_zoom: None,
            },
            |mut b, l| {
                b.south = b.south.min(l.coordinates.latitude);
                b.north = b.north.max(l.coordinates.latitude);
                b.west = b.west.min(l.coordinates.longitude);
                b.east = b.east.max(l.coordinates.longitude);
                b
            },
        );

        if locations.len() == 1 {
            bounds.max_zoom = Some(MAX_SINGLE_MARKER_ZOOM);
        }

        Some(bounds)
    }
}

/// Everything the live map needs for one refresh
#[derive(Debug, Clone, Serialize)]
pub struct MapReport {
    pub summary: LocationSummary,
    pub bounds: Option<MapBounds>,
    pub markers: Vec<MarkerView>,
}

impl MapReport {
    pub fn from_locations(locations: &[ActiveLocation]) -> Self {
        Self {
            summary: LocationSummary::from_locations(locations),
            bounds: MapBounds::from_locations(locations),
            markers: locations.iter().map(MarkerView::from_location).collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn location(kind: LocationKind, lat: f64, lng: f64) -> ActiveLocation {
        ActiveLocation {
            kind,
            blood_group: BloodGroup::BNegative,
            coordinates: Coordinates {
                latitude: lat,
                longitude: lng,
            },
            request_id: None,
            requester: None,
            urgency: None,
            availability: None,
        }
    }

    #[test]
    fn test_donor_marker() {
        let mut loc = location(LocationKind::Donor, 1.0, 2.0);
        loc.availability = Some(false);
        loc.urgency = Some(Urgency::Critical);

        let marker = MarkerView::from_location(&loc);
        assert_eq!(marker.title, "Available Donor");
        assert_eq!(marker.color, DONOR_COLOR);
        assert_eq!(marker.blood_group, "B-");
        assert_eq!(marker.status, Some("Unavailable"));
        assert_eq!(marker.urgency, None);
    }

    #[test]
    fn test_request_marker() {
        let mut loc = location(LocationKind::Request, 1.0, 2.0);
        loc.urgency = Some(Urgency::High);
        loc.availability = Some(true);

        let marker = MarkerView::from_location(&loc);
        assert_eq!(marker.title, "Blood Request");
        assert_eq!(marker.color, REQUEST_COLOR);
        assert_eq!(marker.urgency.as_deref(), Some("High"));
        assert_eq!(marker.urgency_color, Some("#f59e0b"));
        assert_eq!(marker.status, None);

        loc.urgency = Some(Urgency::Critical);
        let marker = MarkerView::from_location(&loc);
        assert_eq!(marker.urgency.as_deref(), Some("Critical"));
        assert_eq!(marker.urgency_color, Some("#dc2626"));

        loc.urgency = Some(Urgency::Normal);
        let marker = MarkerView::from_location(&loc);
        assert_eq!(marker.urgency.as_deref(), Some("Normal"));
        assert_eq!(marker.urgency_color, Some("#10b981"));

        loc.urgency = None;
        let marker = MarkerView::from_location(&loc);
        assert_eq!(marker.urgency, None);
        assert_eq!(marker.urgency_color, None);
    }

    #[test]
    fn test_summary_counts() {
        let locations = vec![
            location(LocationKind::Donor, 0.0, 0.0),
            location(LocationKind::Request, 0.0, 0.0),
            location(LocationKind::Request, 0.0, 0.0),
        ];
        assert_eq!(
            LocationSummary::from_locations(&locations),
            LocationSummary {
                total: 3,
                donors: 1,
                requests: 2
            }
        );
    }

    #[test]
    fn test_bounds() {
        assert!(MapBounds::from_locations(&[]).is_none());

        let single = MapBounds::from_locations(&[location(LocationKind::Donor, 4.0, 5.0)]).unwrap();
        assert_eq!(single.max_zoom, Some(MAX_SINGLE_MARKER_ZOOM));

        let bounds = MapBounds::from_locations(&[
            location(LocationKind::Donor, -1.0, 10.0),
            location(LocationKind::Request, 3.0, -2.0),
        ])
        .unwrap();
        assert_eq!((bounds.south, bounds.north), (-1.0, 3.0));
        assert_eq!((bounds.west, bounds.east), (-2.0, 10.0));
        assert_eq!(bounds.max_zoom, None);
    }
}
