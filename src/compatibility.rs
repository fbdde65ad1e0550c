//! Donor to recipient blood group compatibility.
//!
//! The rules live in a single [`CompatibilityTable`] built on first use and
//! shared read-only by every caller, so queries are safe from any thread.

use lazy_static::lazy_static;
use std::collections::HashMap;

use crate::types::BloodGroup;
use crate::types::BloodGroup::*;

lazy_static! {
    static ref STANDARD_TABLE: CompatibilityTable = CompatibilityTable::standard();
}

/// Fixed donor -> acceptable recipients relation (ABO/Rh red cell rules)
#[derive(Debug, Clone)]
pub struct CompatibilityTable {
    recipients: HashMap<BloodGroup, Vec<BloodGroup>>,
}

impl CompatibilityTable {
    fn standard() -> Self {
        let rows: [(BloodGroup, &[BloodGroup]); 8] = [
            (
                ONegative,
                &[
                    ONegative, OPositive, ANegative, APositive, BNegative, BPositive, AbNegative,
                    AbPositive,
                ],
            ),
            (OPositive, &[OPositive, APositive, BPositive, AbPositive]),
            (ANegative, &[ANegative, APositive, AbNegative, AbPositive]),
            (APositive, &[APositive, AbPositive]),
            (BNegative, &[BNegative, BPositive, AbNegative, AbPositive]),
            (BPositive, &[BPositive, AbPositive]),
            (AbNegative, &[AbNegative, AbPositive]),
            (AbPositive, &[AbPositive]),
        ];

        Self {
            recipients: rows
                .iter()
                .map(|(donor, recipients)| (*donor, recipients.to_vec()))
                .collect(),
        }
    }

    /// The process-wide table
    pub fn global() -> &'static CompatibilityTable {
        &STANDARD_TABLE
    }

    /// Whether `donor` may give to `recipient`. A donor missing from the
    /// table is treated as incompatible.
    pub fn is_compatible(&self, donor: BloodGroup, recipient: BloodGroup) -> bool {
        self.recipients
            .get(&donor)
            .map(|recipients| recipients.contains(&recipient))
            .unwrap_or(false)
    }

    pub fn recipients(&self, donor: BloodGroup) -> &[BloodGroup] {
        self.recipients
            .get(&donor)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Every group that can give to `recipient`, in [`BloodGroup::ALL`] order
    pub fn donors_for(&self, recipient: BloodGroup) -> Vec<BloodGroup> {
        BloodGroup::ALL
            .iter()
            .copied()
            .filter(|donor| self.is_compatible(*donor, recipient))
            .collect()
    }

    /// Rows in [`BloodGroup::ALL`] order
    pub fn entries(&self) -> impl Iterator<Item = (BloodGroup, &[BloodGroup])> + '_ {
        BloodGroup::ALL
            .iter()
            .map(move |donor| (*donor, self.recipients(*donor)))
    }
}

pub fn is_compatible(donor: BloodGroup, recipient: BloodGroup) -> bool {
    CompatibilityTable::global().is_compatible(donor, recipient)
}

/// Call-site name used when filtering requests a donor can serve
pub use self::is_compatible as can_donate_to_receiver;

pub fn format_label(blood_group: BloodGroup) -> String {
    blood_group.label().to_string()
}

/// Format a raw value as received from the donation service. Values that are
/// not a known blood group are returned unchanged.
pub fn format_wire_label(raw: &str) -> String {
    raw.parse::<BloodGroup>()
        .map(format_label)
        .unwrap_or_else(|_| raw.to_string())
}
