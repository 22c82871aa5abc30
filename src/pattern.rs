use std::fmt;

use itertools::Itertools;

use crate::error::{Error, Result};

pub const DEFAULT_DIGITS: [char; 4] = ['5', '6', '8', '9'];

const BASE58_ALPHABET_SIZE: f64 = 58.0;

/// Accepts addresses ending in `run` consecutive copies of `digit`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TailRule {
    digit: u8,
    run: usize,
}

impl TailRule {
    pub fn digit(&self) -> char {
        self.digit as char
    }

    pub fn run(&self) -> usize {
        self.run
    }

    #[inline]
    pub fn matches(&self, address: &str) -> bool {
        let bytes = address.as_bytes();
        if bytes.len() < self.run {
            return false;
        }
        bytes[bytes.len() - self.run..]
            .iter()
            .all(|&b| b == self.digit)
    }
}

/// Set of tail rules, OR-ed together. No rules means every address matches.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PatternSet {
    rules: Vec<TailRule>,
}

impl PatternSet {
    pub fn compile(tail_length: i64, digits: &[char]) -> Result<Self> {
        if tail_length < 0 {
            return Err(Error::invalid(
                "tail_length",
                format!("must be zero or positive, got {}", tail_length),
            ));
        }
        if tail_length == 0 {
            return Ok(Self::default());
        }

        if digits.is_empty() {
            return Err(Error::invalid(
                "digits",
                "at least one digit is required when tail length is positive",
            ));
        }
        if let Some(bad) = digits.iter().find(|c| !c.is_ascii_digit()) {
            return Err(Error::invalid(
                "digits",
                format!("'{}' is not a decimal digit", bad),
            ));
        }

        let run = usize::try_from(tail_length)
            .map_err(|_| Error::invalid("tail_length", "does not fit in usize"))?;
        let rules = digits
            .iter()
            .unique()
            .map(|&c| TailRule { digit: c as u8, run })
            .collect();

        Ok(Self { rules })
    }

    #[inline]
    pub fn matches(&self, address: &str) -> bool {
        self.rules.is_empty() || self.rules.iter().any(|rule| rule.matches(address))
    }

    pub fn rules(&self) -> &[TailRule] {
        &self.rules
    }

    /// True when no filtering happens and every candidate is recorded.
    pub fn accepts_everything(&self) -> bool {
        self.rules.is_empty()
    }

    /// Chance that a uniformly random Base58 address is accepted.
    pub fn probability(&self) -> f64 {
        self.rules
            .iter()
            .map(|rule| {
                i32::try_from(rule.run())
                    .map(|run| BASE58_ALPHABET_SIZE.powi(-run))
                    .unwrap_or(0.0)
            })
            .reduce(|acc, p| acc + p)
            .unwrap_or(1.0)
    }
}

impl fmt::Display for PatternSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.rules.first() {
            None => write!(f, "any address"),
            Some(first) => write!(
                f,
                "addresses ending in {} x [{}]",
                first.run(),
                self.rules.iter().map(TailRule::digit).join(", ")
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;

    fn default_set(k: i64) -> PatternSet {
        PatternSet::compile(k, &DEFAULT_DIGITS).unwrap()
    }

    #[rstest]
    #[case("")]
    #[case("T")]
    #[case("TXYZabc1234")]
    #[case("TJRabPrwbZy45sbavfcjinPJC18kjpRTv8")]
    fn zero_tail_accepts_everything(#[case] address: &str) {
        let set = default_set(0);
        assert!(set.accepts_everything());
        assert!(set.matches(address));
    }

    #[test]
    fn zero_tail_ignores_digit_alphabet() {
        assert!(PatternSet::compile(0, &[]).unwrap().accepts_everything());
    }

    #[test]
    fn negative_tail_is_rejected() {
        let err = PatternSet::compile(-1, &DEFAULT_DIGITS).unwrap_err();
        assert!(err.is_invalid_parameter());
    }

    #[rstest]
    #[case("TAbc5555", 4, true)]
    #[case("TAbc6666", 4, true)]
    #[case("TAbc88888", 4, true)]
    #[case("TAbc9999", 4, true)]
    #[case("TAbc7777", 4, false)]
    #[case("TAbc5556", 4, false)]
    #[case("TAbc6555", 3, true)]
    #[case("TAbc6555", 4, false)]
    #[case("555", 4, false)]
    #[case("5555", 4, true)]
    #[case("T99", 2, true)]
    #[case("T98", 2, false)]
    fn tail_runs(#[case] address: &str, #[case] k: i64, #[case] expected: bool) {
        assert_eq!(default_set(k).matches(address), expected);
    }

    #[test]
    fn anchored_to_end_of_address() {
        let set = default_set(4);
        assert!(!set.matches("T5555abcdef"));
        assert!(!set.matches("T8888x"));
    }

    #[test]
    fn custom_digit_alphabet() {
        let set = PatternSet::compile(3, &['1', '7']).unwrap();
        assert!(set.matches("Tabc111"));
        assert!(set.matches("Tabc777"));
        assert!(!set.matches("Tabc555"));
    }

    #[rstest]
    #[case(&[])]
    #[case(&['5', 'a'])]
    #[case(&['-'])]
    fn bad_digit_alphabet_is_rejected(#[case] digits: &[char]) {
        let err = PatternSet::compile(2, digits).unwrap_err();
        assert!(err.is_invalid_parameter());
    }

    #[test]
    fn duplicate_digits_collapse() {
        let set = PatternSet::compile(2, &['5', '5', '6']).unwrap();
        assert_eq!(set.rules().len(), 2);
    }

    #[test]
    fn probability_estimate() {
        assert_eq!(default_set(0).probability(), 1.0);
        let p = default_set(2).probability();
        assert!((p - 4.0 / 3364.0).abs() < 1e-12);
    }

    #[cfg(target_pointer_width = "64")]
    #[test]
    fn probability_of_huge_tail_is_zero() {
        let set = PatternSet::compile(4_294_967_298, &['5']).unwrap();
        assert_eq!(set.probability(), 0.0);
        assert!(!set.matches("TJRabPrwbZy45sbavfcjinPJC18kjp55555"));
    }

    #[test]
    fn display() {
        assert_eq!(default_set(0).to_string(), "any address");
        assert_eq!(
            default_set(4).to_string(),
            "addresses ending in 4 x [5, 6, 8, 9]"
        );
    }
}
