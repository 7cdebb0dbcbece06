use serde::Serialize;

/// Minimum similarity (percent) for two names to count as the same person.
pub const NAME_MATCH_THRESHOLD: u8 = 80;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NameMatch {
    pub is_match: bool,
    pub similarity: u8,
    pub user_name: String,
    pub document_name: String,
}

/// Fuzzy-compare the profile name with the name read off a document.
pub fn name_match(user_name: &str, document_name: &str) -> NameMatch {
    let user_name = normalize_name(user_name);
    let document_name = normalize_name(document_name);
    let similarity = similarity(&user_name, &document_name);

    NameMatch {
        is_match: similarity >= NAME_MATCH_THRESHOLD,
        similarity,
        user_name,
        document_name,
    }
}

/// Lower-case, trim, drop everything but `a-z` and whitespace, then collapse
/// whitespace runs to single spaces. Trimming happens before stripping, so a
/// trailing punctuation mark can leave a trailing space behind.
pub fn normalize_name(raw: &str) -> String {
    let lowered = raw.to_lowercase();
    let mut normalized = String::with_capacity(lowered.len());
    let mut in_space = false;

    for ch in lowered.trim_matches(is_separator).chars() {
        if is_separator(ch) {
            if !in_space {
                normalized.push(' ');
            }
            in_space = true;
        } else if ch.is_ascii_lowercase() {
            normalized.push(ch);
            in_space = false;
        }
    }

    normalized
}

// OCR output often carries U+FEFF, which `char::is_whitespace` excludes.
fn is_separator(ch: char) -> bool {
    ch.is_whitespace() || ch == '\u{feff}'
}

/// Percentage similarity derived from edit distance; two empty strings are
/// identical.
pub fn similarity(left: &str, right: &str) -> u8 {
    let max_len = left.chars().count().max(right.chars().count());
    if max_len == 0 {
        return 100;
    }

    let distance = levenshtein(left, right);
    let ratio = (max_len - distance) as f64 / max_len as f64;
    (ratio * 100.0).round() as u8
}

/// Classic Levenshtein distance with unit costs, computed row by row.
pub fn levenshtein(left: &str, right: &str) -> usize {
    let left: Vec<char> = left.chars().collect();
    let right: Vec<char> = right.chars().collect();

    let mut previous: Vec<usize> = (0..=right.len()).collect();
    let mut current = vec![0; right.len() + 1];

    for (i, l) in left.iter().enumerate() {
        current[0] = i + 1;
        for (j, r) in right.iter().enumerate() {
            current[j + 1] = if l == r {
                previous[j]
            } else {
                1 + previous[j].min(previous[j + 1]).min(current[j])
            };
        }
        std::mem::swap(&mut previous, &mut current);
    }

    previous[right.len()]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identical_names_score_full_similarity() {
        for name in ["Ravi Kumar", "  ", "", "O'Brien-Smith 3rd", "ÉLODIE"] {
            let result = name_match(name, name);
            assert_eq!(result.similarity, 100, "{name:?}");
            assert!(result.is_match);
        }
    }

    #[test]
    fn normalization_strips_punctuation_and_collapses_spaces() {
        assert_eq!(normalize_name("  Dr. Meena   K.  Rao "), "dr meena k rao");
        assert_eq!(normalize_name("Anil\t\tSharma"), "anil sharma");
        assert_eq!(normalize_name("Sunita ."), "sunita ");
    }

    #[test]
    fn byte_order_marks_count_as_whitespace() {
        assert_eq!(normalize_name("Ravi\u{FEFF}Kumar"), "ravi kumar");
        assert_eq!(normalize_name("\u{FEFF}Ravi \u{FEFF} Kumar\u{FEFF}"), "ravi kumar");
        assert!(name_match("Ravi Kumar", "\u{FEFF}RAVI\u{FEFF}KUMAR").is_match);
    }

    #[test]
    fn distance_is_symmetric() {
        let pairs = [
            ("kitten", "sitting"),
            ("priya", "piya"),
            ("", "abc"),
            ("rajesh kumar", "kumar rajesh"),
        ];
        for (a, b) in pairs {
            assert_eq!(levenshtein(a, b), levenshtein(b, a), "{a} vs {b}");
        }
        assert_eq!(levenshtein("kitten", "sitting"), 3);
    }

    #[test]
    fn minor_spelling_differences_still_match() {
        let result = name_match("Mohammed Iqbal", "Mohamed Iqbal");
        assert!(result.is_match);
        assert_eq!(result.similarity, 93);
    }

    #[test]
    fn different_people_do_not_match() {
        let result = name_match("Ravi Kumar", "Sunita Devi");
        assert!(!result.is_match);
        assert!(result.similarity < NAME_MATCH_THRESHOLD);
    }

    #[test]
    fn empty_against_non_empty_scores_zero() {
        assert_eq!(similarity("", "ravi"), 0);
    }
}
