use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::compatibility::can_donate_to_receiver;
use crate::types::*;

/// Selects the open requests a donor is able to serve
pub struct RequestMatcher<'a> {
    donor: &'a UserProfile,
}

impl<'a> RequestMatcher<'a> {
    pub fn new(donor: &'a UserProfile) -> Self {
        Self { donor }
    }

    /// Requests visible to the donor, in input order
    pub fn matching_requests(&self, requests: &[BloodRequest]) -> Vec<BloodRequest> {
        let matches: Vec<BloodRequest> = requests
            .par_iter()
            .filter(|request| self.is_match(request))
            .cloned()
            .collect();

        debug!(
            "{} of {} requests match donor {} ({})",
            matches.len(),
            requests.len(),
            self.donor.principal,
            self.donor.blood_group
        );

        matches
    }

    fn is_match(&self, request: &BloodRequest) -> bool {
        // Own requests are never offered back to the requester
        if request.requester == self.donor.principal {
            return false;
        }

        if request.status != RequestStatus::Pending {
            return false;
        }

        can_donate_to_receiver(self.donor.blood_group, request.blood_group)
    }

    pub fn report(&self, requests: &[BloodRequest]) -> MatchReport {
        let matches = self.matching_requests(requests);
        let urgency_counts = UrgencyCounts::from_requests(&matches);

        info!(
            "Donor {} can serve {} requests ({} critical)",
            self.donor.principal,
            matches.len(),
            urgency_counts.critical
        );

        MatchReport {
            donor_principal: self.donor.principal.clone(),
            donor_blood_group: self.donor.blood_group,
            requests_considered: requests.len(),
            urgency_counts,
            requests: matches,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UrgencyCounts {
    pub critical: usize,
    pub high: usize,
    pub normal: usize,
}

impl UrgencyCounts {
    pub fn from_requests(requests: &[BloodRequest]) -> Self {
        requests.iter().fold(Self::default(), |mut counts, request| {
            match request.urgency {
                Urgency::Critical => counts.critical += 1,
                Urgency::High => counts.high += 1,
                Urgency::Normal => counts.normal += 1,
            }
            counts
        })
    }
}

/// Requests a donor can serve
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MatchReport {
    pub donor_principal: String,
    pub donor_blood_group: BloodGroup,
    pub requests_considered: usize,
    pub urgency_counts: UrgencyCounts,
    pub requests: Vec<BloodRequest>,
}

/// A profile able to donate to a given recipient group
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DonorMatch {
    pub principal: String,
    pub name: String,
    pub blood_group: BloodGroup,
    pub exact_match: bool,
    pub city: String,
}

/// Looks up available donors for a recipient blood group
pub struct DonorFinder;

impl DonorFinder {
    pub fn new() -> Self {
        Self
    }

    /// Available, compatible donors. Exact group matches come first, then
    /// donors are ordered by name.
    pub fn donors_for(&self, recipient: BloodGroup, profiles: &[UserProfile]) -> Vec<DonorMatch> {
        let mut donors: Vec<DonorMatch> = profiles
            .par_iter()
            .filter(|profile| profile.available)
            .filter(|profile| can_donate_to_receiver(profile.blood_group, recipient))
            .map(|profile| DonorMatch {
                principal: profile.principal.clone(),
                name: profile.name.clone(),
                blood_group: profile.blood_group,
                exact_match: profile.blood_group == recipient,
                city: profile.location.city.clone(),
            })
            .collect();

        donors.sort_by(|a, b| {
            b.exact_match
                .cmp(&a.exact_match)
                .then_with(|| a.name.cmp(&b.name))
        });

        debug!(
            "{} of {} profiles can donate to {}",
            donors.len(),
            profiles.len(),
            recipient
        );

        donors
    }

    pub fn report(&self, recipient: BloodGroup, profiles: &[UserProfile]) -> DonorReport {
        DonorReport {
            recipient_blood_group: recipient,
            profiles_considered: profiles.len(),
            donors: self.donors_for(recipient, profiles),
        }
    }
}

impl Default for DonorFinder {
    fn default() -> Self {
        Self::new()
    }
}

/// Donors found for a recipient group
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DonorReport {
    pub recipient_blood_group: BloodGroup,
    pub profiles_considered: usize,
    pub donors: Vec<DonorMatch>,
}
