/// Hash rate magnitude units
///
/// Units are ordered by magnitude (H < KH < ... < ZH), each one exactly
/// 1000x the previous. The variant only identifies the magnitude; parsing,
/// formatting and scaling live in the functions below.
use serde::ser::SerializeStruct;
use serde::{Serialize, Serializer};
use std::fmt;

/// Factor between two neighbouring units
pub const UNIT_STEP: f64 = 1000.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub enum HashRateUnit {
    #[default]
    H,
    KH,
    MH,
    GH,
    TH,
    PH,
    EH,
    ZH,
}

impl HashRateUnit {
    /// All units, smallest first
    pub const ALL: [HashRateUnit; 8] = [
        HashRateUnit::H,
        HashRateUnit::KH,
        HashRateUnit::MH,
        HashRateUnit::GH,
        HashRateUnit::TH,
        HashRateUnit::PH,
        HashRateUnit::EH,
        HashRateUnit::ZH,
    ];

    /// Parse a compact alias ("G", "GH", "T", ...)
    ///
    /// Matching is case-sensitive. Anything unrecognized (including the empty
    /// string) is the base unit, so this never fails.
    pub fn from_alias(alias: &str) -> Self {
        match alias {
            "K" | "KH" => HashRateUnit::KH,
            "M" | "MH" => HashRateUnit::MH,
            "G" | "GH" => HashRateUnit::GH,
            "T" | "TH" => HashRateUnit::TH,
            "P" | "PH" => HashRateUnit::PH,
            "E" | "EH" => HashRateUnit::EH,
            "Z" | "ZH" => HashRateUnit::ZH,
            _ => HashRateUnit::H,
        }
    }

    /// Display suffix, e.g. "GH/s"
    pub fn suffix(&self) -> &'static str {
        match self {
            HashRateUnit::H => "H/s",
            HashRateUnit::KH => "KH/s",
            HashRateUnit::MH => "MH/s",
            HashRateUnit::GH => "GH/s",
            HashRateUnit::TH => "TH/s",
            HashRateUnit::PH => "PH/s",
            HashRateUnit::EH => "EH/s",
            HashRateUnit::ZH => "ZH/s",
        }
    }

    /// Position in [`HashRateUnit::ALL`]
    pub fn index(&self) -> usize {
        *self as usize
    }

    /// Number of hashes per second represented by one of this unit
    pub fn magnitude(&self) -> f64 {
        // Repeated multiplication keeps every power of 1000 up to ZH exact
        (0..self.index()).fold(1.0, |acc, _| acc * UNIT_STEP)
    }

    /// Next larger unit, `None` for the largest
    pub fn next(&self) -> Option<HashRateUnit> {
        HashRateUnit::ALL.get(self.index() + 1).copied()
    }

    /// Largest supported unit
    pub fn largest() -> HashRateUnit {
        HashRateUnit::ZH
    }
}

impl fmt::Display for HashRateUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.suffix())
    }
}

impl From<&str> for HashRateUnit {
    fn from(alias: &str) -> Self {
        HashRateUnit::from_alias(alias)
    }
}

impl Serialize for HashRateUnit {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut state = serializer.serialize_struct("HashRateUnit", 2)?;
        state.serialize_field("value", &self.magnitude())?;
        state.serialize_field("suffix", self.suffix())?;
        state.end()
    }
}
