use clap::{Parser, ValueEnum};
use std::path::PathBuf;

/// Replay cafeteria operation logs against the canteen engine
#[derive(Parser, Debug)]
#[command(name = "canteen-engine")]
#[command(about = "Replay cafeteria operation logs and report orders and balances", long_about = None)]
pub struct CliArgs {
    /// Input CSV file path containing operation rows
    #[arg(value_name = "INPUT", help = "Path to the input CSV file")]
    pub input_file: PathBuf,

    /// Processing strategy to use for replaying operations
    #[arg(
        long = "strategy",
        value_name = "STRATEGY",
        default_value = "sync",
        help = "Processing strategy: 'sync' for synchronous or 'async' for streaming input"
    )]
    pub strategy: StrategyType,
}

/// Available processing strategies for operation replay
#[derive(Clone, Debug, ValueEnum)]
pub enum StrategyType {
    Sync,
    Async,
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    // Strategy parsing tests
    #[rstest]
    #[case::default_strategy(&["program", "ops.csv"], StrategyType::Sync)]
    #[case::explicit_sync(&["program", "--strategy", "sync", "ops.csv"], StrategyType::Sync)]
    #[case::explicit_async(&["program", "--strategy", "async", "ops.csv"], StrategyType::Async)]
    fn test_strategy_parsing(#[case] args: &[&str], #[case] expected: StrategyType) {
        let parsed = CliArgs::try_parse_from(args).unwrap();
        match (&parsed.strategy, &expected) {
            (StrategyType::Sync, StrategyType::Sync) => (),
            (StrategyType::Async, StrategyType::Async) => (),
            _ => panic!("Expected {:?}, got {:?}", expected, parsed.strategy),
        }
    }

    #[test]
    fn test_input_file_is_captured() {
        let parsed = CliArgs::try_parse_from(["program", "fixtures/day.csv"]).unwrap();
        assert_eq!(parsed.input_file, PathBuf::from("fixtures/day.csv"));
    }

    // Error handling tests
    #[rstest]
    #[case::missing_input(&["program"])]
    #[case::invalid_strategy(&["program", "--strategy", "parallel", "ops.csv"])]
    fn test_parsing_errors(#[case] args: &[&str]) {
        let result = CliArgs::try_parse_from(args);
        assert!(result.is_err());
    }
}
