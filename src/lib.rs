use std::time::Duration;

mod error;
mod keypair;
mod pattern;
mod pool;
mod progress;
mod sink;

pub use error::{Error, Result};
pub use keypair::{derive_address, Keypair, KeypairSource, TronKeypairSource};
pub use pattern::{PatternSet, TailRule, DEFAULT_DIGITS};
pub use pool::{RunSummary, StopSignal, WorkerPool};
pub use progress::{ProgressCounter, Tick};
pub use sink::{MatchRecord, ParseRecordError, ResultSink};

pub const DEFAULT_THREADS: i64 = 1;
pub const DEFAULT_TAIL_LENGTH: i64 = 4;
pub const DEFAULT_PRINT_EVERY: i64 = 100_000;
pub const DEFAULT_OUTPUT: &str = "data/wallet.txt";

pub struct Config<'a> {
    pub threads: usize,
    pub pattern: PatternSet,
    pub print_every: u64,
    pub output: &'a str,
    pub max_attempts: Option<u64>,
    pub duration: Option<Duration>,
}

impl<'a> Config<'a> {
    /// Validates every knob up front; nothing touches the disk until a
    /// `Config` exists.
    pub fn new(
        threads: i64,
        tail_length: i64,
        print_every: i64,
        digits: &[char],
        output: &'a str,
        max_attempts: Option<u64>,
        duration: Option<Duration>,
    ) -> Result<Self> {
        let pattern = PatternSet::compile(tail_length, digits)?;

        let threads = positive("threads", threads)?;
        let threads = usize::try_from(threads)
            .map_err(|_| Error::invalid("threads", "too many threads"))?;
        let print_every = positive("print_every", print_every)?;

        if output.trim().is_empty() {
            return Err(Error::invalid("output", "path cannot be empty"));
        }
        if max_attempts == Some(0) {
            return Err(Error::invalid("max_attempts", "must be positive"));
        }
        if duration.is_some_and(|d| d.is_zero()) {
            return Err(Error::invalid("duration", "must be positive"));
        }

        fn positive(name: &'static str, value: i64) -> Result<u64> {
            u64::try_from(value)
                .ok()
                .filter(|v| *v > 0)
                .ok_or_else(|| Error::invalid(name, format!("must be positive, got {}", value)))
        }

        Ok(Self {
            threads,
            pattern,
            print_every,
            output,
            max_attempts,
            duration,
        })
    }

    /// Expected number of attempts between two matches.
    pub fn expected_attempts(&self) -> f64 {
        1.0 / self.pattern.probability()
    }
}

/// Opens the append-only result store named by the config.
pub fn output_file(config: &Config) -> Result<ResultSink> {
    ResultSink::open(config.output)
}

/// Builds the pool for `config` and runs it until `stop` is raised, a bound
/// in the config is reached, or a worker fails.
pub fn crunch<S: KeypairSource>(
    config: &Config,
    source: &S,
    stop: StopSignal,
) -> Result<RunSummary> {
    let sink = output_file(config)?;
    let counter = ProgressCounter::new(config.print_every)?;

    WorkerPool::new(config.threads, config.pattern.clone(), counter, sink)?
        .with_max_attempts(config.max_attempts)
        .with_duration(config.duration)
        .with_stop_signal(stop)
        .run(source)
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;

    fn config(threads: i64, tail: i64, print_every: i64) -> Result<Config<'static>> {
        Config::new(
            threads,
            tail,
            print_every,
            &DEFAULT_DIGITS,
            DEFAULT_OUTPUT,
            None,
            None,
        )
    }

    #[test]
    fn defaults_are_valid() {
        let config = config(DEFAULT_THREADS, DEFAULT_TAIL_LENGTH, DEFAULT_PRINT_EVERY).unwrap();
        assert_eq!(config.threads, 1);
        assert_eq!(config.print_every, 100_000);
        assert_eq!(config.pattern.rules().len(), 4);
    }

    #[rstest]
    #[case(0, 4, 100)]
    #[case(-2, 4, 100)]
    #[case(1, -1, 100)]
    #[case(1, 4, 0)]
    #[case(1, 4, -100)]
    fn bad_parameters_are_rejected(#[case] threads: i64, #[case] tail: i64, #[case] print_every: i64) {
        let err = config(threads, tail, print_every).err().unwrap();
        assert!(err.is_invalid_parameter());
    }

    #[test]
    fn bounds_must_be_positive() {
        let zero_attempts = Config::new(1, 1, 1, &DEFAULT_DIGITS, "out.txt", Some(0), None);
        assert!(zero_attempts.err().unwrap().is_invalid_parameter());

        let zero_duration =
            Config::new(1, 1, 1, &DEFAULT_DIGITS, "out.txt", None, Some(Duration::ZERO));
        assert!(zero_duration.err().unwrap().is_invalid_parameter());

        let empty_output = Config::new(1, 1, 1, &DEFAULT_DIGITS, " ", None, None);
        assert!(empty_output.err().unwrap().is_invalid_parameter());
    }

    #[test]
    fn expected_attempts() {
        let config = config(1, 1, 1).unwrap();
        assert!((config.expected_attempts() - 14.5).abs() < 1e-9);
    }

    #[cfg(target_pointer_width = "64")]
    #[test]
    fn unreachable_tail_expects_no_match() {
        let config = config(1, 4_294_967_298, 1).unwrap();
        assert!(config.expected_attempts().is_infinite());
    }
}
