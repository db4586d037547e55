//! Field codecs shared by the scanner data objects.
//!
//! Three shapes cover every setting the handhelds expose:
//!
//! - closed enumerations with a short wire code ([`WireEnum`]),
//! - bounded integers ([`IntRange`]),
//! - pairs of enumerations carried in separate fields ([`decode_pair`]).
//!
//! Decoding never clamps and never falls back to a default: text that is not
//! a member of the closed set, or an integer outside its range, is an error.

use scanlib_core::DecodeError;

/// A closed set of named variants, each with a fixed wire code.
///
/// Implementors list every variant in [`VARIANTS`](WireEnum::VARIANTS);
/// the lookups are derived from that table.
pub trait WireEnum: Copy + Eq + 'static {
    /// Field name used in error messages.
    const FIELD: &'static str;

    /// Every variant, in display order.
    const VARIANTS: &'static [Self];

    /// Code sent to and received from the scanner (e.g. `"AO"`, `"99"`).
    fn code(self) -> &'static str;

    /// Variant name as written in save files (e.g. `"AlwaysOn"`).
    fn name(self) -> &'static str;

    /// Human-readable label (e.g. `"Always On"`).
    fn label(self) -> &'static str;

    /// Look up a variant by wire code.
    fn from_code(code: &str) -> Result<Self, DecodeError> {
        Self::VARIANTS
            .iter()
            .copied()
            .find(|v| v.code() == code)
            .ok_or_else(|| unknown::<Self>(code))
    }

    /// Look up a variant by name.
    fn from_name(name: &str) -> Result<Self, DecodeError> {
        Self::VARIANTS
            .iter()
            .copied()
            .find(|v| v.name() == name)
            .ok_or_else(|| unknown::<Self>(name))
    }

    /// Accept either a wire code or a variant name.
    ///
    /// The wire code table is consulted first, then the name table, so a
    /// string that is both resolves as a code.
    fn decode(text: &str) -> Result<Self, DecodeError> {
        Self::from_code(text).or_else(|_| Self::from_name(text))
    }
}

fn unknown<E: WireEnum>(text: &str) -> DecodeError {
    DecodeError::UnknownCode {
        field: E::FIELD,
        value: text.to_string(),
    }
}

/// An inclusive integer range with the name of the field it guards.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IntRange {
    pub field: &'static str,
    pub min: i64,
    pub max: i64,
}

impl IntRange {
    pub const fn new(field: &'static str, min: i64, max: i64) -> Self {
        IntRange { field, min, max }
    }

    /// Reject values outside `[min, max]`.
    pub fn check(&self, value: i64) -> Result<i64, DecodeError> {
        if (self.min..=self.max).contains(&value) {
            Ok(value)
        } else {
            Err(DecodeError::Range {
                field: self.field,
                value,
                min: self.min,
                max: self.max,
            })
        }
    }

    /// Parse decimal text, then range-check it.
    ///
    /// Surrounding whitespace is ignored. Anything else that is not an
    /// integer is a [`DecodeError::Format`].
    pub fn decode(&self, text: &str) -> Result<i64, DecodeError> {
        let value = text
            .trim()
            .parse::<i64>()
            .map_err(|_| DecodeError::Format {
                field: self.field,
                value: text.to_string(),
                expected: "integer",
            })?;
        self.check(value)
    }

    pub fn encode(&self, value: i64) -> String {
        value.to_string()
    }
}

/// Decode two enumerations from their own fields.
///
/// Both are decoded before anything is returned, so a caller that commits
/// only on `Ok` never applies half of the pair.
pub fn decode_pair<A: WireEnum, B: WireEnum>(a: &str, b: &str) -> Result<(A, B), DecodeError> {
    Ok((A::decode(a)?, B::decode(b)?))
}

/// Fail with [`DecodeError::FieldCount`] unless exactly `expected` fields
/// were supplied.
pub fn expect_fields<'a, const N: usize>(
    code: &'static str,
    fields: &[&'a str],
) -> Result<[&'a str; N], DecodeError> {
    <[&str; N]>::try_from(fields).map_err(|_| DecodeError::FieldCount {
        code,
        expected: N,
        actual: fields.len(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    enum Squelch {
        Open,
        Closed,
        // Its code collides with another variant's name.
        Tricky,
    }

    impl WireEnum for Squelch {
        const FIELD: &'static str = "squelch";
        const VARIANTS: &'static [Self] = &[Squelch::Open, Squelch::Closed, Squelch::Tricky];

        fn code(self) -> &'static str {
            match self {
                Squelch::Open => "O",
                Squelch::Closed => "C",
                Squelch::Tricky => "Open",
            }
        }

        fn name(self) -> &'static str {
            match self {
                Squelch::Open => "Open",
                Squelch::Closed => "Closed",
                Squelch::Tricky => "Tricky",
            }
        }

        fn label(self) -> &'static str {
            self.name()
        }
    }

    #[test]
    fn from_code_and_name() {
        assert_eq!(Squelch::from_code("C"), Ok(Squelch::Closed));
        assert_eq!(Squelch::from_name("Closed"), Ok(Squelch::Closed));
        assert!(Squelch::from_code("Closed").is_err());
    }

    #[test]
    fn decode_accepts_code_or_name() {
        assert_eq!(Squelch::decode("O"), Ok(Squelch::Open));
        assert_eq!(Squelch::decode("Closed"), Ok(Squelch::Closed));
    }

    #[test]
    fn decode_prefers_code_over_name() {
        // "Open" is Tricky's code and Open's name.
        assert_eq!(Squelch::decode("Open"), Ok(Squelch::Tricky));
    }

    #[test]
    fn decode_unknown_reports_field() {
        assert_eq!(
            Squelch::decode("x"),
            Err(DecodeError::UnknownCode {
                field: "squelch",
                value: "x".into()
            })
        );
    }

    #[test]
    fn int_range_bounds_are_inclusive() {
        let r = IntRange::new("hours", 1, 16);
        assert_eq!(r.decode("1"), Ok(1));
        assert_eq!(r.decode("16"), Ok(16));
        assert!(matches!(r.decode("0"), Err(DecodeError::Range { value: 0, .. })));
        assert!(matches!(r.decode("17"), Err(DecodeError::Range { value: 17, .. })));
    }

    #[test]
    fn int_range_format_before_range() {
        let r = IntRange::new("hours", 1, 16);
        assert!(matches!(r.decode("nine"), Err(DecodeError::Format { .. })));
        assert!(matches!(r.decode(""), Err(DecodeError::Format { .. })));
        assert!(matches!(r.decode("-3"), Err(DecodeError::Range { value: -3, .. })));
        assert_eq!(r.decode(" 9 "), Ok(9));
    }

    #[test]
    fn pair_fails_on_either_side() {
        assert_eq!(
            decode_pair::<Squelch, Squelch>("O", "C"),
            Ok((Squelch::Open, Squelch::Closed))
        );
        assert!(decode_pair::<Squelch, Squelch>("?", "C").is_err());
        assert!(decode_pair::<Squelch, Squelch>("O", "?").is_err());
    }

    #[test]
    fn expect_fields_checks_count() {
        assert_eq!(expect_fields::<2>("KBP", &["0", "1"]), Ok(["0", "1"]));
        assert_eq!(
            expect_fields::<2>("KBP", &["0"]),
            Err(DecodeError::FieldCount {
                code: "KBP",
                expected: 2,
                actual: 1
            })
        );
    }
}
