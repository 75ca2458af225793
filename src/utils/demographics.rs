//! Demographic helpers
//!
//! Age banding used by the cohort summaries. Bands are the 10-year groups
//! the surveillance reports aggregate on.

/// Map an age in years to its reporting band
///
/// Negative ages have no band and map to `"Unknown"`.
#[must_use]
pub fn age_to_age_group(age: i32) -> &'static str {
    match age {
        i32::MIN..=-1 => "Unknown",
        0..=10 => "00-10",
        11..=20 => "11-20",
        21..=30 => "21-30",
        31..=40 => "31-40",
        41..=50 => "41-50",
        51..=60 => "51-60",
        61..=70 => "61-70",
        71..=80 => "71-80",
        _ => "80+",
    }
}
