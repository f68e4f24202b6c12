//! Medicine extraction from recognized prescription text.
//!
//! Three tiers run against a single catalogue-name snapshot: whole-word
//! regex matches, then bigram-similarity fuzzy matches, then remote
//! biomedical NER. Earlier tiers short-circuit the later ones.

use regex::Regex;

use crate::models::{MatchSource, RecognizedMedicine};
use crate::pipeline::similarity::{compare_two_strings, find_best_match};

/// Similarity above which a noisy token is rewritten to its catalogue name.
const REFINE_THRESHOLD: f64 = 0.6;
/// Similarity above which a catalogue name counts as a fuzzy hit.
const FUZZY_THRESHOLD: f64 = 0.5;
/// Similarity above which a candidate word maps back to a catalogue name.
const MATCH_THRESHOLD: f64 = 0.4;

/// Token-level cleanup of OCR text against the catalogue. Each whitespace
/// token is stripped of non-alphanumeric characters and scored (lowercased)
/// against every catalogue name; when the best-scoring name clears the
/// threshold the token is replaced by that canonical name, everything else
/// passes through untouched.
pub fn refine_text(text: &str, catalogue_names: &[String]) -> String {
    let lowered: Vec<String> = catalogue_names.iter().map(|n| n.to_lowercase()).collect();

    text.split_whitespace()
        .map(|token| {
            let cleaned: String = token
                .chars()
                .filter(|c| c.is_ascii_alphanumeric())
                .collect();
            if cleaned.len() < 2 {
                return token.to_string();
            }
            let cleaned_lower = cleaned.to_lowercase();
            match find_best_match(&cleaned_lower, &lowered) {
                Some(best) if best.rating > REFINE_THRESHOLD => {
                    catalogue_names[best.index].clone()
                }
                _ => token.to_string(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

/// Tier 1: catalogue names appearing verbatim in the text as whole words,
/// case-insensitively.
pub fn direct_matches(text: &str, catalogue_names: &[String]) -> Vec<RecognizedMedicine> {
    let mut found = Vec::new();
    for name in catalogue_names {
        let pattern = format!(r"(?i)\b{}\b", regex::escape(name));
        let Ok(re) = Regex::new(&pattern) else {
            continue;
        };
        if re.is_match(text) {
            found.push(RecognizedMedicine {
                word: name.clone(),
                score: Some(1.0),
                source: MatchSource::DirectMatch,
            });
        }
    }
    found
}

/// Tier 2: catalogue names scoring above the fuzzy threshold against the
/// whole lowercased text.
pub fn fuzzy_matches(text: &str, catalogue_names: &[String]) -> Vec<RecognizedMedicine> {
    let text_lower = text.to_lowercase();
    catalogue_names
        .iter()
        .filter(|name| compare_two_strings(&name.to_lowercase(), &text_lower) > FUZZY_THRESHOLD)
        .map(|name| RecognizedMedicine {
            word: name.clone(),
            score: Some(0.5),
            source: MatchSource::FuzzyMatch,
        })
        .collect()
}

/// Map candidate words back onto catalogue names. Candidates are trimmed and
/// deduplicated preserving first occurrence, then each one is resolved to its
/// best-scoring catalogue name when that score clears the match threshold.
/// The result keeps canonical casing and is itself deduplicated.
pub fn match_to_catalogue(candidates: &[String], catalogue_names: &[String]) -> Vec<String> {
    let mut seen = std::collections::HashSet::new();
    let mut unique: Vec<String> = Vec::new();
    for candidate in candidates {
        let trimmed = candidate.trim().to_string();
        if trimmed.is_empty() {
            continue;
        }
        if seen.insert(trimmed.to_lowercase()) {
            unique.push(trimmed);
        }
    }

    let lowered: Vec<String> = catalogue_names.iter().map(|n| n.to_lowercase()).collect();

    let mut matched_seen = std::collections::HashSet::new();
    let mut matched = Vec::new();
    for candidate in &unique {
        let Some(best) = find_best_match(&candidate.to_lowercase(), &lowered) else {
            continue;
        };
        if best.rating > MATCH_THRESHOLD {
            let canonical = catalogue_names[best.index].clone();
            if matched_seen.insert(canonical.to_lowercase()) {
                matched.push(canonical);
            }
        }
    }
    matched
}
