//! Pali alphabet collation.
//!
//! Pali sorts by its own script ordering, not by Unicode code point:
//! vowels first, then the niggahīta, then the consonant series. Aspirated
//! stops (`kh`, `gh`, `ṭh`, ...) are single alphabet units spelled with two
//! codepoints, so every scan here is longest-match over units.

/// The Pali alphabet in collation order. Digraphs are distinct units that
/// sort after their unaspirated counterpart.
pub const PALI_ALPHABET: [&str; 41] = [
    "a", "ā", "i", "ī", "u", "ū", "e", "o", "ṃ", "k", "kh", "g", "gh", "ṅ", "c", "ch", "j", "jh",
    "ñ", "ṭ", "ṭh", "ḍ", "ḍh", "ṇ", "t", "th", "d", "dh", "n", "p", "ph", "b", "bh", "m", "y",
    "r", "l", "v", "s", "h", "ḷ",
];

/// Rank of characters outside the Pali alphabet: they sort after every
/// alphabet unit, by code point, so hyphens and latin oddities still get a
/// stable total order.
const FOREIGN_BASE: u32 = PALI_ALPHABET.len() as u32;

/// Matches the longest alphabet unit at the start of `rest`.
/// Returns the unit and its rank.
fn match_unit(rest: &str) -> Option<(&'static str, u32)> {
    let mut best: Option<(&'static str, u32)> = None;
    for (rank, unit) in PALI_ALPHABET.iter().enumerate() {
        if rest.starts_with(unit) {
            match best {
                Some((b, _)) if b.len() >= unit.len() => {}
                _ => best = Some((unit, rank as u32)),
            }
        }
    }
    best
}

/// Computes the collation key for a headword.
///
/// Keys compare element-wise; shorter prefixes sort first, matching the
/// behavior expected of a dictionary ("dhamma" before "dhammacakka").
pub fn sort_key(word: &str) -> Vec<u32> {
    let mut key = Vec::with_capacity(word.len());
    let mut rest = word;
    while !rest.is_empty() {
        if let Some((unit, rank)) = match_unit(rest) {
            key.push(rank);
            rest = &rest[unit.len()..];
        } else {
            let c = rest.chars().next().unwrap();
            // Spaces separate homonym ordinals; keep them lowest so
            // "dhamma 1" still sorts directly after "dhamma".
            if c != ' ' {
                key.push(FOREIGN_BASE + c as u32);
            }
            rest = &rest[c.len_utf8()..];
        }
    }
    key
}

/// Returns the alphabet unit a headword files under, e.g. `"kh"` for
/// `"khanti"`. Words starting outside the alphabet file under `None`.
pub fn first_letter(word: &str) -> Option<&'static str> {
    match_unit(word).map(|(unit, _)| unit)
}

/// Strips diacritics down to plain ASCII, e.g. `"saṃsāra"` → `"samsara"`.
/// Used for clean lookup forms and ASCII file names.
pub fn strip_diacritics(word: &str) -> String {
    word.chars()
        .map(|c| match c {
            'ā' => 'a',
            'ī' => 'i',
            'ū' => 'u',
            'ṃ' | 'ṁ' => 'm',
            'ṅ' | 'ñ' | 'ṇ' => 'n',
            'ṭ' => 't',
            'ḍ' => 'd',
            'ḷ' => 'l',
            other => other,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_sorted(words: &[&str]) {
        let mut sorted = words.to_vec();
        sorted.sort_by_key(|w| sort_key(w));
        assert_eq!(sorted, words.to_vec(), "expected collation order");
    }

    #[test]
    fn vowels_precede_consonants() {
        assert_sorted(&["añña", "ābādha", "iti", "okāsa", "kamma"]);
    }

    #[test]
    fn digraph_sorts_after_unaspirated() {
        // kh is its own letter after k, not a k followed by h.
        assert_sorted(&["kāya", "kosa", "khanti", "gāma", "ghara"]);
    }

    #[test]
    fn retroflex_series_ordering() {
        assert_sorted(&["ṭīkā", "ṭhāna", "ḍasati", "ṇa-kāra", "tatta", "thera"]);
    }

    #[test]
    fn prefix_sorts_before_longer_word() {
        assert_sorted(&["dhamma", "dhammacakka"]);
    }

    #[test]
    fn homonym_ordinals_keep_entry_order() {
        assert_sorted(&["nibbāna 1", "nibbāna 2"]);
    }

    #[test]
    fn first_letter_picks_digraph_unit() {
        assert_eq!(first_letter("khanti"), Some("kh"));
        assert_eq!(first_letter("kamma"), Some("k"));
        assert_eq!(first_letter("ṭhāna"), Some("ṭh"));
        assert_eq!(first_letter("1234"), None);
    }

    #[test]
    fn strip_diacritics_folds_to_ascii() {
        assert_eq!(strip_diacritics("saṃsāra"), "samsara");
        assert_eq!(strip_diacritics("ṭhāna"), "thana");
        assert_eq!(strip_diacritics("nibbāna"), "nibbana");
    }
}
