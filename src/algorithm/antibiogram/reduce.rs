//! Precedence reduction of conflicting interpretations
//!
//! When the same isolate/drug pair was tested more than once the raw rows can
//! disagree. The reduction keeps the most clinically conservative result:
//! a resistance seen in any test wins over an intermediate, which wins over a
//! susceptible. `NotTested` only ever surfaces when it is the sole value.

use crate::models::interpretation::Interpretation;
use smallvec::SmallVec;

/// Distinct interpretations observed for one isolate/drug pair
///
/// The vocabulary has four members, so the set always fits inline.
pub type InterpretationSet = SmallVec<[Interpretation; 4]>;

/// Add a value to the set unless it is already present
pub fn collect_distinct(set: &mut InterpretationSet, value: Interpretation) {
    if !set.contains(&value) {
        set.push(value);
    }
}

/// Reduce a set of distinct interpretations to the single reported value
///
/// Precedence is `Resistant > Intermediate > Susceptible > NotTested`; an
/// empty set reduces to `None` and the cell stays absent.
#[must_use]
pub fn reduce_interpretations(values: &[Interpretation]) -> Option<Interpretation> {
    if values.contains(&Interpretation::Resistant) {
        Some(Interpretation::Resistant)
    } else if values.contains(&Interpretation::Intermediate) {
        Some(Interpretation::Intermediate)
    } else if values.contains(&Interpretation::Susceptible) {
        Some(Interpretation::Susceptible)
    } else if values.contains(&Interpretation::NotTested) {
        Some(Interpretation::NotTested)
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::interpretation::Interpretation::*;

    #[test]
    fn test_precedence_law() {
        // Any subset containing Resistant reduces to Resistant
        assert_eq!(reduce_interpretations(&[Resistant]), Some(Resistant));
        assert_eq!(reduce_interpretations(&[Susceptible, Resistant]), Some(Resistant));
        assert_eq!(
            reduce_interpretations(&[Susceptible, Intermediate, Resistant]),
            Some(Resistant)
        );

        // No Resistant: Intermediate wins
        assert_eq!(
            reduce_interpretations(&[Susceptible, Intermediate]),
            Some(Intermediate)
        );
        assert_eq!(reduce_interpretations(&[Intermediate]), Some(Intermediate));

        // Only Susceptible
        assert_eq!(reduce_interpretations(&[Susceptible]), Some(Susceptible));
    }

    #[test]
    fn test_not_tested_never_outranks_a_result() {
        assert_eq!(
            reduce_interpretations(&[NotTested, Susceptible]),
            Some(Susceptible)
        );
        assert_eq!(reduce_interpretations(&[NotTested]), Some(NotTested));
    }

    #[test]
    fn test_empty_set_reduces_to_none() {
        assert_eq!(reduce_interpretations(&[]), None);
    }

    #[test]
    fn test_collect_distinct_collapses_duplicates() {
        let mut set = InterpretationSet::new();
        collect_distinct(&mut set, Susceptible);
        collect_distinct(&mut set, Susceptible);
        collect_distinct(&mut set, Resistant);
        assert_eq!(set.as_slice(), &[Susceptible, Resistant]);
    }
}
