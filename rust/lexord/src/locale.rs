//! Locale tag resolution for collator construction.
//!
//! Tags use the `lang` or `lang_REGION` shape (`"en"`, `"en_US"`, `"fr-CA"`).
//! Resolution policy: an exact `lang_REGION` entry wins; a recognized language
//! with an unrecognized region falls back to the language-level entry; an
//! unrecognized or malformed language fails with `InvalidLocale`. There is no
//! silent fallback to root.

use lexord_common::{Result, error::Error};

/// Built-in configuration for one locale: its tailoring rules (in the rule
/// grammar accepted by [`crate::Collator::open_from_rules`]) and the locale's
/// default for French secondary ordering.
#[derive(Debug, Clone, Copy)]
pub(crate) struct LocaleData {
    pub tag: &'static str,
    pub rules: &'static str,
    pub french: bool,
}

/// The locale repertoire carried by the engine. Tailorings are deliberately
/// compact: base ordering comes from the implicit weight synthesis in
/// `weights`, and each entry only states what the locale reorders.
const LOCALES: &[LocaleData] = &[
    LocaleData {
        tag: "root",
        rules: "",
        french: false,
    },
    LocaleData {
        tag: "en",
        rules: "",
        french: false,
    },
    LocaleData {
        tag: "de",
        rules: "",
        french: false,
    },
    LocaleData {
        tag: "es",
        rules: "&n<\u{f1}<<<\u{d1}",
        french: false,
    },
    LocaleData {
        tag: "fr",
        rules: "",
        french: false,
    },
    LocaleData {
        tag: "fr_CA",
        rules: "",
        french: true,
    },
    LocaleData {
        tag: "sv",
        rules: "&z<\u{e5}<<<\u{c5}<\u{e4}<<<\u{c4}<\u{f6}<<<\u{d6}",
        french: false,
    },
];

/// Resolves a locale tag to its built-in data.
pub(crate) fn resolve(tag: &str) -> Result<LocaleData> {
    let (language, region) = parse_tag(tag)?;
    if let Some(region) = &region {
        let full = format!("{language}_{region}");
        if let Some(data) = LOCALES.iter().find(|l| l.tag == full) {
            return Ok(*data);
        }
    }
    LOCALES
        .iter()
        .find(|l| l.tag == language)
        .copied()
        .ok_or_else(|| Error::invalid_locale(tag, format!("unrecognized language '{language}'")))
}

/// Returns the canonical `lang` or `lang_REGION` form of a well-formed tag.
pub(crate) fn canonicalize(tag: &str) -> Result<String> {
    let (language, region) = parse_tag(tag)?;
    Ok(match region {
        Some(region) => format!("{language}_{region}"),
        None => language,
    })
}

/// Splits a tag into lowercase language and uppercase region subtags,
/// validating well-formedness.
fn parse_tag(tag: &str) -> Result<(String, Option<String>)> {
    if tag.is_empty() || tag == "root" {
        return Ok(("root".to_string(), None));
    }
    let mut parts = tag.split(['_', '-']);
    let language = parts.next().unwrap_or_default();
    let region = parts.next();
    if parts.next().is_some() {
        return Err(Error::invalid_locale(tag, "too many subtags"));
    }
    if !(2..=3).contains(&language.len()) || !language.bytes().all(|b| b.is_ascii_alphabetic()) {
        return Err(Error::invalid_locale(tag, "malformed language subtag"));
    }
    let language = language.to_ascii_lowercase();
    let region = match region {
        None => None,
        Some(r)
            if (r.len() == 2 && r.bytes().all(|b| b.is_ascii_alphabetic()))
                || (r.len() == 3 && r.bytes().all(|b| b.is_ascii_digit())) =>
        {
            Some(r.to_ascii_uppercase())
        }
        Some(_) => {
            return Err(Error::invalid_locale(tag, "malformed region subtag"));
        }
    };
    Ok((language, region))
}
