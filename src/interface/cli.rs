//! # Command Line
//!
//! Argument definitions for the `marionette` binary.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::domain::emotion::Emotion;

/// Marionette - drives a robot over a publish-subscribe bus
#[derive(Parser, Debug)]
#[command(name = "marionette")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Configuration file
    #[arg(short, long, default_value = "data/config.yaml")]
    pub config: PathBuf,

    /// Use the in-memory bus with a simulated robot instead of redis
    #[arg(long)]
    pub simulate: bool,

    /// Intent payload (`name|arg...`) the simulated robot hears, one per listening window
    #[arg(long = "answer", value_name = "PAYLOAD", requires = "simulate")]
    pub answers: Vec<String>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Ask for the user's name and greet them
    Greet,
    /// Speak a sentence and wait until it has been said
    Say {
        text: String,
        #[arg(long, value_enum)]
        emotion: Option<Emotion>,
        /// Speak with body animation
        #[arg(long)]
        animated: bool,
    },
    /// Log every incoming event
    Listen {
        /// Stop after this many seconds (default: until Ctrl-C)
        #[arg(long)]
        seconds: Option<u64>,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_say_with_emotion() {
        let cli = Cli::parse_from([
            "marionette",
            "say",
            "Hello there",
            "--emotion",
            "happy",
            "--animated",
        ]);
        assert_eq!(
            cli.command,
            Command::Say {
                text: "Hello there".into(),
                emotion: Some(Emotion::Happy),
                animated: true,
            }
        );
        assert_eq!(cli.config, PathBuf::from("data/config.yaml"));
    }

    #[test]
    fn test_parse_simulated_answers() {
        let cli = Cli::parse_from([
            "marionette",
            "--simulate",
            "--answer",
            "answer_name|Alice",
            "--answer",
            "activation",
            "greet",
        ]);
        assert!(cli.simulate);
        assert_eq!(cli.answers, vec!["answer_name|Alice", "activation"]);
        assert_eq!(cli.command, Command::Greet);
    }

    #[test]
    fn test_answers_require_simulation() {
        assert!(Cli::try_parse_from(["marionette", "--answer", "x", "greet"]).is_err());
    }

    #[test]
    fn test_parse_listen() {
        let cli = Cli::parse_from(["marionette", "-c", "robot.yaml", "listen", "--seconds", "30"]);
        assert_eq!(cli.command, Command::Listen { seconds: Some(30) });
        assert_eq!(cli.config, PathBuf::from("robot.yaml"));
    }
}
