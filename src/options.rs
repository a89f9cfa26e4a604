use std::fmt::Display;
use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// Sort installed apps into category folders.
#[derive(Parser, Debug)]
#[command(name = "appcat", version)]
pub struct Options {
    /// Configuration file (defaults to `config.*` in the working directory)
    #[arg(long, global = true)]
    pub config: Option<String>,

    /// Overrides `logging.level`
    #[arg(long, global = true)]
    pub log_level: Option<String>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, PartialEq)]
pub enum Command {
    /// Classify a single app
    Classify {
        #[arg(long, default_value = "")]
        name: String,
        #[arg(long)]
        package: String,
    },
    /// Classify `name<TAB>package` lines from a file or stdin
    Batch {
        #[arg(long)]
        input: Option<PathBuf>,
    },
    /// Print the generated training corpus as JSON lines
    Corpus,
    /// Train Naive Bayes on the generated corpus and save it
    Train {
        #[arg(long)]
        out: PathBuf,
    },
}

impl Display for Command {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::Classify { .. } => "classify",
            Self::Batch { .. } => "batch",
            Self::Corpus => "corpus",
            Self::Train { .. } => "train",
        };
        write!(f, "{}", name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_classify() {
        let opts = Options::try_parse_from([
            "appcat", "classify", "--name", "Spotify", "--package", "com.spotify.music",
        ])
        .unwrap();
        assert_eq!(
            opts.command,
            Command::Classify { name: "Spotify".into(), package: "com.spotify.music".into() }
        );
        assert_eq!(opts.command.to_string(), "classify");
    }

    #[test]
    fn global_flags_follow_subcommand() {
        let opts = Options::try_parse_from(["appcat", "batch", "--log-level", "debug"]).unwrap();
        assert_eq!(opts.log_level.as_deref(), Some("debug"));
        assert_eq!(opts.command, Command::Batch { input: None });
    }

    #[test]
    fn train_requires_out() {
        assert!(Options::try_parse_from(["appcat", "train"]).is_err());
        assert!(Options::try_parse_from(["appcat", "classify"]).is_err());
    }
}
