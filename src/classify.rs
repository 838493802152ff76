// src/classify.rs
//! Cybersecurity-incident disclosure classifier.
//!
//! Pure function of document text. Two tiers of terms:
//! - item-specific terms name the dedicated 8-K item (1.05) and count anywhere;
//! - contextual terms only count when the filing reports under Item 8.01
//!   ("Other Events"), where issuers sometimes describe incidents in prose.
//!
//! Safe-harbor boilerplate ("Forward-Looking Statements" up to the next item
//! heading) is cut before scanning, since risk-factor lists mention "cyber"
//! in nearly every filing.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;
use std::borrow::Cow;

/// Terms naming the cybersecurity-incident item itself.
pub const ITEM_SPECIFIC_TERMS: [&str; 4] = [
    "Material Cybersecurity Incidents",
    "Item 1.05",
    "ITEM 1.05",
    "MATERIAL CYBERSECURITY INCIDENTS",
];

/// Incident language trusted only under an Item 8.01 heading.
pub const CONTEXTUAL_TERMS: [&str; 9] = [
    "unauthorized access",
    "unauthorized activity",
    "cybersecurity incident",
    "cyber-attack",
    "cyberattack",
    "threat actor",
    "security incident",
    "ransomware attack",
    "cyber incident",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Tier {
    /// Matched under Item 8.01.
    Contextual,
    /// Matched an Item 1.05 term.
    ItemSpecific,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct TermMatch {
    pub tier: Tier,
    pub term: &'static str,
}

/// Outcome of [`classify`]. `matched` is `None` for a negative verdict.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct Classification {
    pub matched: Option<TermMatch>,
}

impl Classification {
    pub fn is_disclosure(&self) -> bool {
        self.matched.is_some()
    }

    pub fn tier(&self) -> Option<Tier> {
        self.matched.map(|m| m.tier)
    }
}

/// One term, tried bounded first and then as a raw substring. Either hit counts:
/// markup residue can break word boundaries around an otherwise exact phrase.
struct TermPattern {
    term: &'static str,
    bounded: Regex,
    raw: Regex,
}

impl TermPattern {
    fn new(term: &'static str) -> Self {
        let esc = regex::escape(term);
        Self {
            term,
            bounded: Regex::new(&format!(r"(?i)\b\s*{esc}\s*\b")).expect("bounded term regex"),
            raw: Regex::new(&format!(r"(?i){esc}")).expect("raw term regex"),
        }
    }

    fn is_match(&self, text: &str) -> bool {
        self.bounded.is_match(text) || self.raw.is_match(text)
    }
}

static ITEM_SPECIFIC: Lazy<Vec<TermPattern>> =
    Lazy::new(|| ITEM_SPECIFIC_TERMS.iter().copied().map(TermPattern::new).collect());
static CONTEXTUAL: Lazy<Vec<TermPattern>> =
    Lazy::new(|| CONTEXTUAL_TERMS.iter().copied().map(TermPattern::new).collect());

static RE_SAFE_HARBOR: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)forward-looking statements").expect("safe harbor regex"));
static RE_ITEM_HEADING: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)item\s+\d+\.\d+").expect("item heading regex"));
// No trailing \b: "Item 8.01Other Events" is a common tag-stripping artifact.
static RE_OTHER_EVENTS: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)\bitem\s*8\.01(?:[^0-9]|$)").expect("item 8.01 regex"));

/// Remove the first "Forward-Looking Statements" span, up to the next
/// `Item N.N` heading or the end of the text. Only one span is removed.
pub fn excise_forward_looking(text: &str) -> Cow<'_, str> {
    let Some(start) = RE_SAFE_HARBOR.find(text) else {
        return Cow::Borrowed(text);
    };
    let end = RE_ITEM_HEADING
        .find_at(text, start.end())
        .map(|m| m.start())
        .unwrap_or(text.len());

    let mut out = String::with_capacity(text.len() - (end - start.start()));
    out.push_str(&text[..start.start()]);
    out.push_str(&text[end..]);
    Cow::Owned(out)
}

pub fn has_other_events_heading(text: &str) -> bool {
    RE_OTHER_EVENTS.is_match(text)
}

fn first_match(patterns: &[TermPattern], text: &str) -> Option<&'static str> {
    patterns.iter().find(|p| p.is_match(text)).map(|p| p.term)
}

/// Decide whether `text` discloses a material cybersecurity incident.
///
/// Phase 1: if an Item 8.01 heading is present, any contextual term is a hit.
/// Phase 2: any item-specific term is a hit, regardless of phase 1.
pub fn classify(text: &str) -> Classification {
    let body = excise_forward_looking(text);

    if has_other_events_heading(&body) {
        if let Some(term) = first_match(&CONTEXTUAL, &body) {
            return Classification {
                matched: Some(TermMatch {
                    tier: Tier::Contextual,
                    term,
                }),
            };
        }
    }

    let matched = first_match(&ITEM_SPECIFIC, &body).map(|term| TermMatch {
        tier: Tier::ItemSpecific,
        term,
    });
    Classification { matched }
}

pub fn is_disclosure(text: &str) -> bool {
    classify(text).is_disclosure()
}
