//! Susceptibility interpretation vocabulary
//!
//! The closed set of clinical interpretations a drug susceptibility test can
//! produce. Raw laboratory exports carry these as single letters or free
//! text; everything outside the recognized forms is rejected rather than
//! coerced.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Clinical interpretation of one drug susceptibility test
///
/// The derived ordering is the S < I < R < N sort key used by downstream
/// report tables. Clinical precedence for consolidation (most conservative
/// result wins) is handled separately by
/// [`crate::algorithm::antibiogram::reduce_interpretations`].
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub enum Interpretation {
    /// The organism is susceptible to the drug
    #[serde(rename = "S")]
    Susceptible,
    /// Intermediate susceptibility
    #[serde(rename = "I")]
    Intermediate,
    /// The organism is resistant to the drug
    #[serde(rename = "R")]
    Resistant,
    /// The drug was not tested against the organism
    #[serde(rename = "N")]
    NotTested,
}

impl Interpretation {
    /// Parse a raw laboratory value into the closed vocabulary
    ///
    /// Accepts the single-letter codes and the common long forms, ignoring
    /// case and surrounding whitespace. Returns `None` for anything else so
    /// callers can count the rejection instead of silently coercing it.
    #[must_use]
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_uppercase().as_str() {
            "S" | "SUSCEPTIBLE" => Some(Self::Susceptible),
            "I" | "INTERMEDIATE" => Some(Self::Intermediate),
            "R" | "RESISTANT" => Some(Self::Resistant),
            "N" | "NT" | "NOT TESTED" | "NOT-TESTED" => Some(Self::NotTested),
            _ => None,
        }
    }

    /// Single-letter code used in flat report tables
    #[must_use]
    pub const fn code(self) -> &'static str {
        match self {
            Self::Susceptible => "S",
            Self::Intermediate => "I",
            Self::Resistant => "R",
            Self::NotTested => "N",
        }
    }

    /// Whether this value is an actual test result (S, I or R)
    #[must_use]
    pub const fn is_testable(self) -> bool {
        !matches!(self, Self::NotTested)
    }
}

impl fmt::Display for Interpretation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}
