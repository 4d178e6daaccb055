use std::sync::OnceLock;

use regex::Regex;

/// Which tier of the fallback chain produced the score.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum MatchedPattern {
    ExplicitLabel,
    SecondaryLabel,
    FallbackLastNumber,
    None,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct ScoreExtraction {
    pub(crate) score: Option<i32>,
    pub(crate) pattern: MatchedPattern,
}

fn explicit_label() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"(?i)nota\s*final[^0-9]*?([+-]?[0-9]{1,4})").expect("hardcoded regex")
    })
}

fn secondary_label() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"(?i)nota\s*(?:final|total|da\s*reda[çc][ãa]o)[^0-9]*?([+-]?[0-9]{1,4})")
            .expect("hardcoded regex")
    })
}

fn standalone_number() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"[+-]?\b[0-9]{1,4}\b").expect("hardcoded regex"))
}

/// Recovers the final score from a free-text grading response.
///
/// The backend is asked to close with a "Nota Final: <n>" sentence but is not
/// guaranteed to comply, so the tiers are tried in order: the explicit label,
/// the broader label set, then the last standalone 1-4 digit run anywhere in
/// the text. A response with no digits at all yields `score: None`; that is
/// a valid outcome, not an error. The fallback tier can pick up a number that
/// is not a score (a year, a count); tolerated by design.
pub(crate) fn extract_score(raw: &str) -> ScoreExtraction {
    if let Some(score) = first_capture(explicit_label(), raw) {
        return ScoreExtraction { score: Some(score), pattern: MatchedPattern::ExplicitLabel };
    }

    if let Some(score) = first_capture(secondary_label(), raw) {
        return ScoreExtraction { score: Some(score), pattern: MatchedPattern::SecondaryLabel };
    }

    let last = standalone_number()
        .find_iter(raw)
        .filter_map(|found| found.as_str().parse::<i32>().ok())
        .last();
    if let Some(score) = last {
        return ScoreExtraction { score: Some(score), pattern: MatchedPattern::FallbackLastNumber };
    }

    ScoreExtraction { score: None, pattern: MatchedPattern::None }
}

fn first_capture(regex: &Regex, raw: &str) -> Option<i32> {
    regex
        .captures(raw)
        .and_then(|captures| captures.get(1))
        .and_then(|group| group.as_str().parse::<i32>().ok())
}
