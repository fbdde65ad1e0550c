use blood_match::{
    can_donate_to_receiver, format_label, is_compatible, BloodGroup, DatasetParser, DonorFinder,
    FileDiscovery, MapReport, ReportFormat, ReportGenerator, RequestMatcher, RequestStatus,
};
use std::fs;
use tempfile::TempDir;

const PROFILES_JSON: &str = r#"[
    {"principal": "donor-a", "name": "Amaka", "available": true, "bloodGroup": "oNegative",
     "location": {"address": "", "city": "Lagos", "latitude": 6.52, "longitude": 3.37}},
    {"principal": "donor-b", "name": "Bayo", "available": false, "bloodGroup": "aPositive",
     "location": {"address": "", "city": "Ibadan", "latitude": 7.37, "longitude": 3.9}},
    {"principal": "donor-c", "name": "Chidi", "available": true, "bloodGroup": "aPositive",
     "location": {"address": "", "city": "Enugu", "latitude": 6.45, "longitude": 7.5}}
]"#;

const REQUESTS_CSV: &str = "\
id,status,requester,urgency,created_at,blood_group,matched_donor,address,city,latitude,longitude
r1,pending,donor-c,critical,0,A+,,,Enugu,6.45,7.5
r2,pending,patient-1,high,0,AB+,,12 Broad St,Lagos,6.45,3.39
r3,completed,patient-2,normal,0,A+,donor-a,,Kano,12.0,8.5
r4,pending,patient-3,normal,0,O-,,,Jos,9.9,8.9
";

const LOCATIONS_JSON: &str = r#"[
    {"type": "donor", "bloodGroup": "oNegative", "coordinates": {"latitude": 6.52, "longitude": 3.37}, "availability": true},
    {"type": "request", "bloodGroup": "abPositive", "coordinates": {"latitude": 6.45, "longitude": 3.39}, "urgency": "high", "requestId": "r2"},
    {"type": "request", "bloodGroup": "oNegative", "coordinates": {"latitude": 9.9, "longitude": 8.9}, "urgency": "normal", "requestId": "r4"}
]"#;

#[test]
fn test_compatibility_properties() {
    for donor in BloodGroup::ALL {
        assert!(is_compatible(donor, donor));
        assert!(is_compatible(donor, BloodGroup::AbPositive));
        assert!(is_compatible(BloodGroup::ONegative, donor));
        for recipient in BloodGroup::ALL {
            assert_eq!(
                can_donate_to_receiver(donor, recipient),
                is_compatible(donor, recipient)
            );
        }
    }
    assert!(!is_compatible(BloodGroup::APositive, BloodGroup::ONegative));
    assert_eq!(format_label(BloodGroup::AbNegative), "AB-");
}

#[test]
fn test_end_to_end_matching_from_files() -> anyhow::Result<()> {
    let dir = TempDir::new()?;
    let data_dir = dir.path().join("export");
    fs::create_dir(&data_dir)?;
    fs::write(data_dir.join("profiles.json"), PROFILES_JSON)?;
    fs::write(data_dir.join("requests.csv"), REQUESTS_CSV)?;
    fs::write(data_dir.join("locations.json"), LOCATIONS_JSON)?;
    fs::write(data_dir.join("README.md"), "ignored")?;

    let files = FileDiscovery::new(false).discover(&[data_dir.clone()])?;
    assert_eq!(files.len(), 3);

    let parser = DatasetParser::new();
    let mut dataset = blood_match::Dataset::default();
    for file in &files {
        dataset.merge(parser.parse(file)?);
    }
    assert_eq!(dataset.profiles.len(), 3);
    assert_eq!(dataset.requests.len(), 4);
    assert_eq!(dataset.locations.len(), 3);

    // A+ donor: own request r1 hidden, r3 closed, r4 incompatible
    let chidi = dataset.profile("donor-c").expect("profile present");
    let report = RequestMatcher::new(chidi).report(&dataset.requests);
    let ids: Vec<&str> = report.requests.iter().map(|r| r.id.as_str()).collect();
    assert_eq!(ids, vec!["r2"]);
    assert!(report
        .requests
        .iter()
        .all(|r| r.status == RequestStatus::Pending));

    let amaka = dataset.profile("donor-a").expect("profile present");
    let universal = RequestMatcher::new(amaka).report(&dataset.requests);
    assert_eq!(universal.requests.len(), 3);
    assert_eq!(universal.urgency_counts.critical, 1);

    let donors = DonorFinder::new().report(BloodGroup::APositive, &dataset.profiles);
    let names: Vec<&str> = donors.donors.iter().map(|d| d.name.as_str()).collect();
    assert_eq!(names, vec!["Chidi", "Amaka"]);

    let map = MapReport::from_locations(&dataset.locations);
    assert_eq!(map.summary.total, 3);
    assert_eq!(map.summary.donors, 1);
    assert_eq!(map.summary.requests, 2);
    assert_eq!(map.markers[0].blood_group, "O-");

    let generator = ReportGenerator::new(&dir.path().join("reports"))?;
    let written = generator.generate(&report, ReportFormat::Json)?;
    let json: serde_json::Value = serde_json::from_str(&fs::read_to_string(&written[0])?)?;
    assert_eq!(json["donor_blood_group"], "aPositive");
    assert_eq!(json["requests"][0]["id"], "r2");

    Ok(())
}
