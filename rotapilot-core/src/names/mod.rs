//! Fuzzy employee-name matching.
//!
//! The rota source carries bare first names while the portal may show
//! full names, titles, or nicknames, so equality is far too strict.
//! [`NameResolver::similar`] applies a ranked cascade of heuristics:
//! exact normalized match, nickname equivalence, substring containment,
//! a shared-initial rule for very short names, and finally a bounded
//! Levenshtein distance for typos. It never errors: empty input simply
//! never matches.

mod nicknames;

pub use nicknames::canonical;

/// Leading title tokens stripped during normalization.
const TITLES: [&str; 6] = ["mr", "mrs", "miss", "ms", "dr", "prof"];

/// Punctuation stripped from names before comparison.
const PUNCTUATION: &str = ".,/#!$%^&*;:{}=-_`~()";

/// Name normalization and similarity scoring.
///
/// `first_name_only` reduces every name to its first whitespace token
/// before comparison. It defaults to on because the schedule data
/// contains first names only; turn it off when matching against a
/// portal known to key rows by full name.
#[derive(Debug, Clone)]
pub struct NameResolver {
    first_name_only: bool,
}

impl Default for NameResolver {
    fn default() -> Self {
        Self {
            first_name_only: true,
        }
    }
}

impl NameResolver {
    pub fn new(first_name_only: bool) -> Self {
        Self { first_name_only }
    }

    /// Normalize a display name to a comparison key: lowercase, leading
    /// title dropped, punctuation removed, whitespace collapsed, and
    /// optionally reduced to the first token.
    pub fn normalize(&self, name: &str) -> String {
        let lowered = name.to_lowercase();
        let stripped: String = lowered
            .chars()
            .filter(|c| !PUNCTUATION.contains(*c))
            .collect();

        let mut tokens = stripped.split_whitespace().peekable();
        if let Some(first) = tokens.peek() {
            if TITLES.contains(first) {
                tokens.next();
            }
        }

        if self.first_name_only {
            tokens.next().unwrap_or_default().to_string()
        } else {
            tokens.collect::<Vec<_>>().join(" ")
        }
    }

    /// Decide whether two display names plausibly refer to the same
    /// person. Rules are tried in order; any hit is a match.
    pub fn similar(&self, a: &str, b: &str) -> bool {
        let key_a = self.normalize(a);
        let key_b = self.normalize(b);
        if key_a.is_empty() || key_b.is_empty() {
            return false;
        }

        // 1. Exact match after normalization.
        if key_a == key_b {
            return true;
        }

        // 2. Nickname equivalence (rob == robert == bobby).
        if canonical(&key_a) == canonical(&key_b) {
            return true;
        }

        // 3. One key contained in the other.
        if key_a.contains(&key_b) || key_b.contains(&key_a) {
            return true;
        }

        // 4. Shared first character when either name is very short.
        let first_a = key_a.chars().next();
        let first_b = key_b.chars().next();
        if first_a == first_b && (key_a.chars().count() <= 3 || key_b.chars().count() <= 3) {
            return true;
        }

        // 5. Bounded edit distance for typos: one edit allowed per three
        //    characters of the longer name.
        let len_a = key_a.chars().count();
        let len_b = key_b.chars().count();
        if len_a > 2 && len_b > 2 {
            let max_allowed = len_a.max(len_b).div_ceil(3);
            if levenshtein(&key_a, &key_b) <= max_allowed {
                return true;
            }
        }

        false
    }
}

/// Exact Levenshtein edit distance (insertion, deletion, substitution
/// each cost 1), computed over chars with a two-row DP table.
pub fn levenshtein(a: &str, b: &str) -> usize {
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();
    if a.is_empty() {
        return b.len();
    }
    if b.is_empty() {
        return a.len();
    }

    let mut prev: Vec<usize> = (0..=a.len()).collect();
    let mut curr = vec![0usize; a.len() + 1];

    for (i, bc) in b.iter().enumerate() {
        curr[0] = i + 1;
        for (j, ac) in a.iter().enumerate() {
            let substitution = prev[j] + usize::from(ac != bc);
            curr[j + 1] = substitution.min(prev[j + 1] + 1).min(curr[j] + 1);
        }
        std::mem::swap(&mut prev, &mut curr);
    }

    prev[a.len()]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_strips_titles_and_punctuation() {
        let resolver = NameResolver::default();
        assert_eq!(resolver.normalize("Mr. Robert Smith"), "robert");
        assert_eq!(resolver.normalize("DR   Jane-Anne"), "janeanne");
        assert_eq!(resolver.normalize(""), "");

        let full = NameResolver::new(false);
        assert_eq!(full.normalize("Mrs. Mary Jones"), "mary jones");
    }

    #[test]
    fn test_similar_nicknames_and_substrings() {
        let resolver = NameResolver::default();
        assert!(resolver.similar("Robert Smith", "Rob"));
        assert!(resolver.similar("Rob", "Robert"));
        assert!(resolver.similar("Bobby", "Robert"));
        assert!(resolver.similar("Elizabeth Brown", "liz"));
    }

    #[test]
    fn test_dissimilar_names_rejected() {
        let resolver = NameResolver::default();
        assert!(!resolver.similar("Jane", "John"));
        assert!(!resolver.similar("Margaret", "Melissa"));
        assert!(!resolver.similar("", "Robert"));
        assert!(!resolver.similar("Robert", ""));
    }

    #[test]
    fn test_short_name_initial_rule() {
        let resolver = NameResolver::default();
        // "Jo" shares an initial with "Joanne" and is short enough.
        assert!(resolver.similar("Jo", "Joanne"));
        assert!(!resolver.similar("Jo", "Karen"));
    }

    #[test]
    fn test_edit_distance_tolerates_typos() {
        let resolver = NameResolver::default();
        assert!(resolver.similar("Cristopher", "Christopher"));
        assert!(resolver.similar("Mathew", "Matthew"));
    }

    #[test]
    fn test_levenshtein_known_values() {
        assert_eq!(levenshtein("kitten", "sitting"), 3);
        assert_eq!(levenshtein("", "abc"), 3);
        assert_eq!(levenshtein("abc", ""), 3);
        assert_eq!(levenshtein("same", "same"), 0);
    }

    #[test]
    fn test_levenshtein_symmetry() {
        let pairs = [("kitten", "sitting"), ("rob", "robert"), ("a", "xyz")];
        for (a, b) in pairs {
            assert_eq!(levenshtein(a, b), levenshtein(b, a));
            assert_eq!(levenshtein(a, a), 0);
        }
    }
}
