// SPDX-FileCopyrightText: 2026 Flockcheck Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Field registry: per-field validation of operator answers.
//!
//! Validation is pure. A rejected answer carries the re-prompt text shown
//! to the operator and never touches session state.

use std::ops::RangeInclusive;

use flockcheck_core::FieldId;
use thiserror::Error;

/// Accepted body weight in kilograms.
pub const WEIGHT_RANGE_KG: RangeInclusive<f64> = 0.03..=30.0;

/// Accepted body temperature in degrees Celsius.
pub const TEMPERATURE_RANGE_C: RangeInclusive<f64> = 30.0..=45.0;

/// Minimum length, in characters, of a trimmed free-text answer.
pub const MIN_NOTE_CHARS: usize = 2;

/// An answer that fails its field rule.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{reason}")]
pub struct Invalid {
    pub field: FieldId,
    pub reason: &'static str,
}

impl Invalid {
    fn for_field(field: FieldId) -> Self {
        let reason = match field {
            FieldId::Weight => "Please enter a valid weight in kg (e.g., 1.5).",
            FieldId::Temperature => "Please enter a valid temperature in °C (e.g., 41.5).",
            FieldId::MedicationNotes | FieldId::SymptomNotes => {
                "Please enter more details (at least 2 characters)."
            }
        };
        Self { field, reason }
    }
}

/// Validates `raw` for `field`, returning the trimmed value to store.
pub fn validate(field: FieldId, raw: &str) -> Result<String, Invalid> {
    let value = raw.trim();
    let ok = match field {
        FieldId::Weight => in_range(value, &WEIGHT_RANGE_KG),
        FieldId::Temperature => in_range(value, &TEMPERATURE_RANGE_C),
        FieldId::MedicationNotes | FieldId::SymptomNotes => {
            value.chars().count() >= MIN_NOTE_CHARS
        }
    };
    if ok {
        Ok(value.to_string())
    } else {
        Err(Invalid::for_field(field))
    }
}

// NaN fails `contains`, so it needs no special case.
fn in_range(value: &str, range: &RangeInclusive<f64>) -> bool {
    value
        .parse::<f64>()
        .map(|n| range.contains(&n))
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn weight_boundaries() {
        assert!(validate(FieldId::Weight, "0.03").is_ok());
        assert!(validate(FieldId::Weight, "30").is_ok());
        assert!(validate(FieldId::Weight, "0.0299").is_err());
        assert!(validate(FieldId::Weight, "30.01").is_err());
    }

    #[test]
    fn temperature_boundaries() {
        assert!(validate(FieldId::Temperature, "30").is_ok());
        assert!(validate(FieldId::Temperature, "45").is_ok());
        assert!(validate(FieldId::Temperature, "29.99").is_err());
        assert!(validate(FieldId::Temperature, "45.01").is_err());
    }

    #[test]
    fn numbers_are_trimmed_and_junk_rejected() {
        assert_eq!(validate(FieldId::Weight, "  1.5 \n").unwrap(), "1.5");
        for junk in ["", "   ", "abc", "1,5", "NaN", "inf", "1.5kg"] {
            assert!(validate(FieldId::Weight, junk).is_err(), "{junk:?}");
        }
    }

    #[test]
    fn rejection_carries_unit_and_example() {
        let err = validate(FieldId::Temperature, "9999").unwrap_err();
        assert_eq!(err.field, FieldId::Temperature);
        assert!(err.reason.contains("°C"));
        assert!(err.reason.contains("41.5"));
        assert_eq!(err.to_string(), err.reason);
    }

    #[test]
    fn notes_need_two_characters_after_trim() {
        for field in [FieldId::MedicationNotes, FieldId::SymptomNotes] {
            assert!(validate(field, "").is_err());
            assert!(validate(field, " a ").is_err());
            assert_eq!(validate(field, " ab ").unwrap(), "ab");
            assert!(validate(field, "!?").is_ok());
            // Two characters, more than two bytes.
            assert!(validate(field, "éé").is_ok());
            assert!(validate(field, "é").is_err());
        }
    }

    proptest! {
        #[test]
        fn weight_ok_iff_in_range(w in -10.0f64..50.0) {
            let accepted = validate(FieldId::Weight, &w.to_string()).is_ok();
            prop_assert_eq!(accepted, (0.03..=30.0).contains(&w));
        }

        #[test]
        fn temperature_ok_iff_in_range(t in 0.0f64..80.0) {
            let accepted = validate(FieldId::Temperature, &t.to_string()).is_ok();
            prop_assert_eq!(accepted, (30.0..=45.0).contains(&t));
        }

        #[test]
        fn notes_ok_iff_two_chars(s in "\\PC{0,6}") {
            let accepted = validate(FieldId::SymptomNotes, &s).is_ok();
            prop_assert_eq!(accepted, s.trim().chars().count() >= 2);
        }
    }
}
