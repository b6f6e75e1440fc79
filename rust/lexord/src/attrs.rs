//! Tunable collator attributes: strength, case handling, numeric ordering,
//! alternate (variable-weight) handling, normalization mode and French
//! secondary ordering.
//!
//! Attribute kinds and values are closed enums. `Attributes::set` validates
//! every kind/value combination and rejects mismatches instead of silently
//! ignoring them.

use lexord_common::{Result, error::Error};

/// Granularity of collation distinctions considered during comparison.
///
/// Levels nest: `Secondary` implies `Primary`, and so on. `Identical` appends
/// a final code-point tiebreaker after all weight levels.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub enum Strength {
    /// Base letters only.
    Primary,
    /// Base letters and diacritics.
    Secondary,
    /// Base letters, diacritics and case.
    Tertiary,
    /// Adds the variable-weight level used with shifted alternate handling.
    Quaternary,
    /// Full code-point tiebreak for otherwise-equal strings.
    Identical,
}

impl Strength {
    pub(crate) const fn name(&self) -> &'static str {
        match self {
            Strength::Primary => "primary",
            Strength::Secondary => "secondary",
            Strength::Tertiary => "tertiary",
            Strength::Quaternary => "quaternary",
            Strength::Identical => "identical",
        }
    }
}

/// Whether rule text and input are assumed to require normalization.
///
/// The engine treats input as already normalized; the mode is carried as
/// configuration so that callers can introspect what a collator was opened
/// with.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, Default)]
pub enum NormalizationMode {
    #[default]
    Off,
    On,
}

/// The recognized attribute kinds of a [`crate::Collator`].
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum AttributeKind {
    Strength,
    CaseFirst,
    CaseLevel,
    NumericCollation,
    AlternateHandling,
    NormalizationMode,
    FrenchCollation,
}

impl AttributeKind {
    pub const fn name(&self) -> &'static str {
        match self {
            AttributeKind::Strength => "strength",
            AttributeKind::CaseFirst => "case-first",
            AttributeKind::CaseLevel => "case-level",
            AttributeKind::NumericCollation => "numeric-collation",
            AttributeKind::AlternateHandling => "alternate-handling",
            AttributeKind::NormalizationMode => "normalization-mode",
            AttributeKind::FrenchCollation => "french-collation",
        }
    }
}

impl TryFrom<&str> for AttributeKind {
    type Error = Error;

    fn try_from(name: &str) -> Result<Self> {
        match name {
            "strength" => Ok(AttributeKind::Strength),
            "case-first" => Ok(AttributeKind::CaseFirst),
            "case-level" => Ok(AttributeKind::CaseLevel),
            "numeric-collation" => Ok(AttributeKind::NumericCollation),
            "alternate-handling" => Ok(AttributeKind::AlternateHandling),
            "normalization-mode" => Ok(AttributeKind::NormalizationMode),
            "french-collation" => Ok(AttributeKind::FrenchCollation),
            _ => Err(Error::invalid_arg(
                "name",
                format!("Unrecognized attribute: {name}"),
            )),
        }
    }
}

/// A value assignable to an attribute kind. Which values are legal depends on
/// the kind; see [`Attributes::set`].
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum AttributeValue {
    /// Reset the attribute to its engine default.
    Default,
    Off,
    On,
    Primary,
    Secondary,
    Tertiary,
    Quaternary,
    Identical,
    NonIgnorable,
    Shifted,
    LowerFirst,
    UpperFirst,
}

impl AttributeValue {
    pub const fn name(&self) -> &'static str {
        match self {
            AttributeValue::Default => "default",
            AttributeValue::Off => "off",
            AttributeValue::On => "on",
            AttributeValue::Primary => "primary",
            AttributeValue::Secondary => "secondary",
            AttributeValue::Tertiary => "tertiary",
            AttributeValue::Quaternary => "quaternary",
            AttributeValue::Identical => "identical",
            AttributeValue::NonIgnorable => "non-ignorable",
            AttributeValue::Shifted => "shifted",
            AttributeValue::LowerFirst => "lower-first",
            AttributeValue::UpperFirst => "upper-first",
        }
    }
}

/// Case-first ordering at the tertiary (or case) level.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, Default)]
pub(crate) enum CaseFirst {
    #[default]
    Off,
    LowerFirst,
    UpperFirst,
}

/// Treatment of variable-weight characters (spaces, punctuation).
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, Default)]
pub(crate) enum Alternate {
    #[default]
    NonIgnorable,
    Shifted,
}

/// The resolved attribute set of one collator instance.
#[derive(Debug, Clone, Eq, PartialEq)]
pub(crate) struct Attributes {
    pub strength: Strength,
    pub case_first: CaseFirst,
    pub case_level: bool,
    pub numeric: bool,
    pub alternate: Alternate,
    pub normalization: NormalizationMode,
    pub french: bool,
}

impl Default for Attributes {
    fn default() -> Attributes {
        Attributes {
            strength: Strength::Tertiary,
            case_first: CaseFirst::Off,
            case_level: false,
            numeric: false,
            alternate: Alternate::NonIgnorable,
            normalization: NormalizationMode::Off,
            french: false,
        }
    }
}

impl Attributes {
    pub fn get(&self, kind: AttributeKind) -> AttributeValue {
        match kind {
            AttributeKind::Strength => match self.strength {
                Strength::Primary => AttributeValue::Primary,
                Strength::Secondary => AttributeValue::Secondary,
                Strength::Tertiary => AttributeValue::Tertiary,
                Strength::Quaternary => AttributeValue::Quaternary,
                Strength::Identical => AttributeValue::Identical,
            },
            AttributeKind::CaseFirst => match self.case_first {
                CaseFirst::Off => AttributeValue::Off,
                CaseFirst::LowerFirst => AttributeValue::LowerFirst,
                CaseFirst::UpperFirst => AttributeValue::UpperFirst,
            },
            AttributeKind::CaseLevel => on_off(self.case_level),
            AttributeKind::NumericCollation => on_off(self.numeric),
            AttributeKind::AlternateHandling => match self.alternate {
                Alternate::NonIgnorable => AttributeValue::NonIgnorable,
                Alternate::Shifted => AttributeValue::Shifted,
            },
            AttributeKind::NormalizationMode => match self.normalization {
                NormalizationMode::Off => AttributeValue::Off,
                NormalizationMode::On => AttributeValue::On,
            },
            AttributeKind::FrenchCollation => on_off(self.french),
        }
    }

    /// Assigns `value` to the attribute `kind`, rejecting combinations the
    /// kind does not accept.
    pub fn set(&mut self, kind: AttributeKind, value: AttributeValue) -> Result<()> {
        match (kind, value) {
            (AttributeKind::Strength, AttributeValue::Default) => {
                self.strength = Strength::Tertiary;
            }
            (AttributeKind::Strength, AttributeValue::Primary) => {
                self.strength = Strength::Primary;
            }
            (AttributeKind::Strength, AttributeValue::Secondary) => {
                self.strength = Strength::Secondary;
            }
            (AttributeKind::Strength, AttributeValue::Tertiary) => {
                self.strength = Strength::Tertiary;
            }
            (AttributeKind::Strength, AttributeValue::Quaternary) => {
                self.strength = Strength::Quaternary;
            }
            (AttributeKind::Strength, AttributeValue::Identical) => {
                self.strength = Strength::Identical;
            }
            (AttributeKind::CaseFirst, AttributeValue::Default | AttributeValue::Off) => {
                self.case_first = CaseFirst::Off;
            }
            (AttributeKind::CaseFirst, AttributeValue::LowerFirst) => {
                self.case_first = CaseFirst::LowerFirst;
            }
            (AttributeKind::CaseFirst, AttributeValue::UpperFirst) => {
                self.case_first = CaseFirst::UpperFirst;
            }
            (AttributeKind::CaseLevel, value) => {
                self.case_level = as_bool(kind, value, false)?;
            }
            (AttributeKind::NumericCollation, value) => {
                self.numeric = as_bool(kind, value, false)?;
            }
            (
                AttributeKind::AlternateHandling,
                AttributeValue::Default | AttributeValue::NonIgnorable,
            ) => {
                self.alternate = Alternate::NonIgnorable;
            }
            (AttributeKind::AlternateHandling, AttributeValue::Shifted) => {
                self.alternate = Alternate::Shifted;
            }
            (AttributeKind::NormalizationMode, AttributeValue::Default | AttributeValue::Off) => {
                self.normalization = NormalizationMode::Off;
            }
            (AttributeKind::NormalizationMode, AttributeValue::On) => {
                self.normalization = NormalizationMode::On;
            }
            (AttributeKind::FrenchCollation, value) => {
                self.french = as_bool(kind, value, false)?;
            }
            (kind, value) => {
                return Err(Error::invalid_attribute(kind.name(), value.name()));
            }
        }
        Ok(())
    }
}

const fn on_off(value: bool) -> AttributeValue {
    if value {
        AttributeValue::On
    } else {
        AttributeValue::Off
    }
}

fn as_bool(kind: AttributeKind, value: AttributeValue, default: bool) -> Result<bool> {
    match value {
        AttributeValue::Default => Ok(default),
        AttributeValue::Off => Ok(false),
        AttributeValue::On => Ok(true),
        other => Err(Error::invalid_attribute(kind.name(), other.name())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_tertiary_non_ignorable() {
        let attrs = Attributes::default();
        assert_eq!(attrs.get(AttributeKind::Strength), AttributeValue::Tertiary);
        assert_eq!(
            attrs.get(AttributeKind::AlternateHandling),
            AttributeValue::NonIgnorable
        );
        assert_eq!(attrs.get(AttributeKind::CaseLevel), AttributeValue::Off);
    }

    #[test]
    fn set_and_get_round_trip() {
        let mut attrs = Attributes::default();
        attrs
            .set(AttributeKind::Strength, AttributeValue::Primary)
            .unwrap();
        attrs
            .set(AttributeKind::NumericCollation, AttributeValue::On)
            .unwrap();
        attrs
            .set(AttributeKind::CaseFirst, AttributeValue::UpperFirst)
            .unwrap();
        assert_eq!(attrs.get(AttributeKind::Strength), AttributeValue::Primary);
        assert_eq!(attrs.get(AttributeKind::NumericCollation), AttributeValue::On);
        assert_eq!(
            attrs.get(AttributeKind::CaseFirst),
            AttributeValue::UpperFirst
        );
    }

    #[test]
    fn invalid_combination_is_rejected() {
        let mut attrs = Attributes::default();
        let err = attrs
            .set(AttributeKind::Strength, AttributeValue::Shifted)
            .unwrap_err();
        assert!(err.to_string().contains("strength"));

        let err = attrs
            .set(AttributeKind::CaseLevel, AttributeValue::Quaternary)
            .unwrap_err();
        assert!(err.to_string().contains("case-level"));
    }

    #[test]
    fn default_value_resets() {
        let mut attrs = Attributes::default();
        attrs
            .set(AttributeKind::Strength, AttributeValue::Identical)
            .unwrap();
        attrs
            .set(AttributeKind::Strength, AttributeValue::Default)
            .unwrap();
        assert_eq!(attrs.get(AttributeKind::Strength), AttributeValue::Tertiary);
    }

    #[test]
    fn strength_names_match_attribute_values() {
        for (strength, value) in [
            (Strength::Primary, AttributeValue::Primary),
            (Strength::Secondary, AttributeValue::Secondary),
            (Strength::Tertiary, AttributeValue::Tertiary),
            (Strength::Quaternary, AttributeValue::Quaternary),
            (Strength::Identical, AttributeValue::Identical),
        ] {
            assert_eq!(strength.name(), value.name());
        }
    }

    #[test]
    fn kind_names_round_trip() {
        for kind in [
            AttributeKind::Strength,
            AttributeKind::CaseFirst,
            AttributeKind::CaseLevel,
            AttributeKind::NumericCollation,
            AttributeKind::AlternateHandling,
            AttributeKind::NormalizationMode,
            AttributeKind::FrenchCollation,
        ] {
            assert_eq!(AttributeKind::try_from(kind.name()).unwrap(), kind);
        }
        assert!(AttributeKind::try_from("unknown").is_err());
    }
}
