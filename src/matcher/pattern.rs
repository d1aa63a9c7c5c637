//! Pattern classification for derived addresses.

use std::collections::{HashMap, HashSet};
use std::fmt;

/// Which rule an interesting address satisfied.
///
/// Variants are listed in evaluation priority.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MarkerKind {
    /// A long run of one repeated character
    SequentialRun,
    /// One character occurring many times anywhere
    FrequentChar,
    /// Few distinct characters overall
    LowDiversity,
}

impl MarkerKind {
    /// All kinds, in evaluation priority.
    pub const fn all() -> [MarkerKind; 3] {
        [
            MarkerKind::SequentialRun,
            MarkerKind::FrequentChar,
            MarkerKind::LowDiversity,
        ]
    }

    /// Symbol printed next to a match.
    pub const fn symbol(self) -> &'static str {
        match self {
            MarkerKind::SequentialRun => "🔁",
            MarkerKind::FrequentChar => "💠",
            MarkerKind::LowDiversity => "🌈",
        }
    }
}

impl fmt::Display for MarkerKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MarkerKind::SequentialRun => write!(f, "sequential-run"),
            MarkerKind::FrequentChar => write!(f, "frequent-char"),
            MarkerKind::LowDiversity => write!(f, "low-diversity"),
        }
    }
}

/// Thresholds for the three rules, fixed for a whole run.
///
/// The thresholds are not validated here: a run or repeat threshold of 1 or
/// less makes every non-empty address match.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pattern {
    sequential_run: usize,
    total_repeats: usize,
    unique_cap: usize,
}

impl Pattern {
    /// Creates a new pattern.
    pub const fn new(sequential_run: usize, total_repeats: usize, unique_cap: usize) -> Self {
        Self {
            sequential_run,
            total_repeats,
            unique_cap,
        }
    }

    pub fn sequential_run(&self) -> usize {
        self.sequential_run
    }

    pub fn total_repeats(&self) -> usize {
        self.total_repeats
    }

    pub fn unique_cap(&self) -> usize {
        self.unique_cap
    }

    /// Classifies an address. First matching rule wins; `None` means
    /// the address is not interesting.
    #[inline]
    pub fn classify(&self, address: &str) -> Option<MarkerKind> {
        if has_sequential_run(address, self.sequential_run) {
            Some(MarkerKind::SequentialRun)
        } else if has_frequent_char(address, self.total_repeats) {
            Some(MarkerKind::FrequentChar)
        } else if unique_char_count(address) <= self.unique_cap {
            Some(MarkerKind::LowDiversity)
        } else {
            None
        }
    }
}

#[inline]
fn folded(s: &str) -> impl Iterator<Item = char> + '_ {
    s.chars().flat_map(char::to_lowercase)
}

/// True if `s` holds `threshold` or more consecutive identical characters,
/// ignoring case.
pub fn has_sequential_run(s: &str, threshold: usize) -> bool {
    let mut prev = None;
    let mut run = 0usize;
    for c in folded(s) {
        if prev == Some(c) {
            run += 1;
        } else {
            prev = Some(c);
            run = 1;
        }
        if run >= threshold {
            return true;
        }
    }
    false
}

/// True if some character occurs `threshold` or more times anywhere in `s`,
/// ignoring case.
pub fn has_frequent_char(s: &str, threshold: usize) -> bool {
    let mut tally: HashMap<char, usize> = HashMap::new();
    for c in folded(s) {
        let count = tally.entry(c).or_insert(0);
        *count += 1;
        if *count >= threshold {
            return true;
        }
    }
    false
}

/// Number of distinct characters in `s`, ignoring case.
pub fn unique_char_count(s: &str) -> usize {
    folded(s).collect::<HashSet<_>>().len()
}

#[cfg(test)]
mod tests {
    use super::*;

    const DEFAULT: Pattern = Pattern::new(9, 14, 10);

    #[test]
    fn test_sequential_run_match() {
        assert_eq!(
            DEFAULT.classify("1aaaaaaaaa1"),
            Some(MarkerKind::SequentialRun)
        );
    }

    #[test]
    fn test_frequent_char_match() {
        let addr = "a1a2a3a4a5a6a7a8a9a0aBaCaDaE";
        assert_eq!(addr.matches('a').count(), 14);
        assert_eq!(DEFAULT.classify(addr), Some(MarkerKind::FrequentChar));
    }

    #[test]
    fn test_low_diversity_match() {
        assert_eq!(unique_char_count("1111222233"), 3);
        assert_eq!(
            DEFAULT.classify("1111222233"),
            Some(MarkerKind::LowDiversity)
        );
    }

    #[test]
    fn test_diverse_address_no_match() {
        assert_eq!(
            DEFAULT.classify("abcdefghijklmnopqrstuvwxyz0123456789"),
            None
        );
    }

    #[test]
    fn test_realistic_addresses() {
        assert_eq!(DEFAULT.classify("1BgGZ9tcN4rm9KBzDn7KprQz87SZ26SAMH"), None);
        assert_eq!(
            DEFAULT.classify("1BitcoinEaterAddressDontSendf59kuE"),
            None
        );
        assert_eq!(
            DEFAULT.classify("1111111111111111111114oLvT2"),
            Some(MarkerKind::SequentialRun)
        );
    }

    #[test]
    fn test_low_threshold_always_true() {
        for s in ["x", "ab", "1BgGZ9tcN4rm9KBzDn7KprQz87SZ26SAMH"] {
            assert!(has_sequential_run(s, 1));
            assert!(has_sequential_run(s, 0));
            assert!(has_frequent_char(s, 1));
        }
        assert!(!has_sequential_run("", 1));
    }

    #[test]
    fn test_no_repeats_never_matches() {
        let s = "abcdefghij0123456789";
        for threshold in 2..40 {
            assert!(!has_sequential_run(s, threshold));
            assert!(!has_frequent_char(s, threshold));
        }
    }

    #[test]
    fn test_case_insensitive() {
        assert!(has_sequential_run("xAaAaAaAaAx", 9));
        assert!(has_frequent_char("aAbAcAdA", 5));
        assert_eq!(unique_char_count("aAbB"), 2);

        let samples = [
            "1aaaaaaaaa1",
            "a1a2a3a4a5a6a7a8a9a0aBaCaDaE",
            "1111222233",
            "abcdefghijklmnopqrstuvwxyz0123456789",
            "1BgGZ9tcN4rm9KBzDn7KprQz87SZ26SAMH",
        ];
        for s in samples {
            assert_eq!(DEFAULT.classify(s), DEFAULT.classify(&s.to_uppercase()));
        }
    }

    #[test]
    fn test_priority_order() {
        // Satisfies all three rules.
        let s = "aaaaaaaaaaaaaa";
        assert!(has_frequent_char(s, 14));
        assert!(unique_char_count(s) <= 10);
        assert_eq!(DEFAULT.classify(s), Some(MarkerKind::SequentialRun));

        // Frequent and low diversity, but no long run.
        let s = "abababababababababababababab";
        assert_eq!(DEFAULT.classify(s), Some(MarkerKind::FrequentChar));
    }

    #[test]
    fn test_classify_is_pure() {
        let s = "1111222233";
        let first = DEFAULT.classify(s);
        for _ in 0..10 {
            assert_eq!(DEFAULT.classify(s), first);
        }
    }

    #[test]
    fn test_marker_symbols() {
        let symbols: Vec<_> = MarkerKind::all().iter().map(|m| m.symbol()).collect();
        assert_eq!(symbols, ["🔁", "💠", "🌈"]);
        assert_eq!(MarkerKind::LowDiversity.to_string(), "low-diversity");
    }
}
