//! Character-bigram similarity scoring used to rank noisy OCR tokens against
//! the medicine catalogue.

/// Dice coefficient over character bigrams. Whitespace is stripped before
/// comparison; identical strings score 1.0 and strings shorter than two
/// characters (other than an exact match) score 0.0.
pub fn compare_two_strings(first: &str, second: &str) -> f64 {
    let first: String = first.chars().filter(|c| !c.is_whitespace()).collect();
    let second: String = second.chars().filter(|c| !c.is_whitespace()).collect();

    if first == second {
        return 1.0;
    }
    if first.chars().count() < 2 || second.chars().count() < 2 {
        return 0.0;
    }

    let mut first_bigrams = std::collections::HashMap::new();
    let first_chars: Vec<char> = first.chars().collect();
    for window in first_chars.windows(2) {
        *first_bigrams.entry((window[0], window[1])).or_insert(0u32) += 1;
    }

    let second_chars: Vec<char> = second.chars().collect();
    let mut intersection = 0u32;
    for window in second_chars.windows(2) {
        let bigram = (window[0], window[1]);
        if let Some(count) = first_bigrams.get_mut(&bigram) {
            if *count > 0 {
                *count -= 1;
                intersection += 1;
            }
        }
    }

    let total = (first_chars.len() - 1) + (second_chars.len() - 1);
    (2.0 * f64::from(intersection)) / total as f64
}

/// Best-scoring catalogue entry for a query string.
#[derive(Debug, Clone, PartialEq)]
pub struct BestMatch {
    pub index: usize,
    pub target: String,
    pub rating: f64,
}

/// Score `main` against every target and return the best. None when the
/// target list is empty.
pub fn find_best_match(main: &str, targets: &[String]) -> Option<BestMatch> {
    let mut best: Option<BestMatch> = None;
    for (index, target) in targets.iter().enumerate() {
        let rating = compare_two_strings(main, target);
        let better = match &best {
            Some(b) => rating > b.rating,
            None => true,
        };
        if better {
            best = Some(BestMatch {
                index,
                target: target.clone(),
                rating,
            });
        }
    }
    best
}
