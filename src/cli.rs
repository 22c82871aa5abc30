use clap::{Parser, ValueHint};
use tailcrunch::{
    DEFAULT_DIGITS, DEFAULT_OUTPUT, DEFAULT_PRINT_EVERY, DEFAULT_TAIL_LENGTH, DEFAULT_THREADS,
};

/// Generate TRON wallets whose address ends in a run of repeated digits.
#[derive(Parser, Debug)]
#[command(name = "tailcrunch", version, about)]
pub struct Cli {
    /// Number of worker threads
    #[arg(short, long, default_value_t = DEFAULT_THREADS, allow_negative_numbers = true)]
    pub threads: i64,

    /// Number of matching tail digits (0 records every wallet)
    #[arg(short = 'n', long, default_value_t = DEFAULT_TAIL_LENGTH, allow_negative_numbers = true)]
    pub matches: i64,

    /// Attempts between progress lines
    #[arg(
        short = 'd',
        long = "print",
        default_value_t = DEFAULT_PRINT_EVERY,
        allow_negative_numbers = true
    )]
    pub print_every: i64,

    /// Digits a tail may repeat, comma separated
    #[arg(long, value_delimiter = ',', default_values_t = DEFAULT_DIGITS)]
    pub digits: Vec<char>,

    /// File that matches are appended to
    #[arg(short, long, default_value = DEFAULT_OUTPUT, value_hint = ValueHint::FilePath)]
    pub output: String,

    /// Stop after roughly this many attempts
    #[arg(long, value_name = "N")]
    pub max_attempts: Option<u64>,

    /// Stop after this many seconds
    #[arg(long, value_name = "SECS")]
    pub duration: Option<u64>,

    /// Log filter for diagnostics on stderr, e.g. `debug` or `tailcrunch=trace`
    #[arg(long, default_value = "info")]
    pub log_level: String,
}

#[cfg(test)]
mod tests {
    use clap::CommandFactory;

    use super::*;

    #[test]
    fn command_is_well_formed() {
        Cli::command().debug_assert();
    }

    #[test]
    fn defaults() {
        let cli = Cli::parse_from(["tailcrunch"]);
        assert_eq!(cli.threads, 1);
        assert_eq!(cli.matches, 4);
        assert_eq!(cli.print_every, 100_000);
        assert_eq!(cli.digits, vec!['5', '6', '8', '9']);
        assert_eq!(cli.output, "data/wallet.txt");
        assert_eq!(cli.max_attempts, None);
    }

    #[test]
    fn short_flags_and_negative_tail() {
        let cli = Cli::parse_from(["tailcrunch", "-t", "4", "-n", "-1", "-d", "1000"]);
        assert_eq!(cli.threads, 4);
        assert_eq!(cli.matches, -1);
        assert_eq!(cli.print_every, 1000);
    }

    #[test]
    fn digit_list() {
        let cli = Cli::parse_from(["tailcrunch", "--digits", "1,7"]);
        assert_eq!(cli.digits, vec!['1', '7']);
    }
}
