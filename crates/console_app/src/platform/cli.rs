use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};

use super::logging::LogDestination;

#[derive(Parser, Debug)]
#[command(name = "console_app")]
#[command(author, version, about = "Upload, list and transcode media files on a console server", long_about = None)]
pub struct Args {
    /// Configuration file (default: ./upload_console.ron when present)
    #[arg(short, long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// API root, overrides the configuration file
    #[arg(long, value_name = "URL")]
    pub base_url: Option<String>,

    /// Where log output goes
    #[arg(long, value_enum, default_value_t = LogTo::File)]
    pub log_to: LogTo,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Interactive console (default)
    Console,
    /// List uploaded files
    Files,
    /// List processed files
    Processed,
    /// Validate and upload files
    Upload {
        #[arg(required = true, value_name = "PATH")]
        paths: Vec<PathBuf>,
    },
    /// Delete an uploaded file
    Delete {
        filename: String,
        /// Skip the confirmation question
        #[arg(short, long)]
        yes: bool,
    },
    /// Submit a file for processing and follow the task until it ends
    Process {
        filename: String,
        /// Skip the confirmation question
        #[arg(short, long)]
        yes: bool,
    },
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogTo {
    File,
    Terminal,
    Both,
}

impl From<LogTo> for LogDestination {
    fn from(value: LogTo) -> Self {
        match value {
            LogTo::File => LogDestination::File,
            LogTo::Terminal => LogDestination::Terminal,
            LogTo::Both => LogDestination::Both,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_to_interactive_console() {
        let args = Args::try_parse_from(["console_app"]).unwrap();
        assert_eq!(args.command, None);
        assert_eq!(args.log_to, LogTo::File);
        assert!(args.base_url.is_none());
    }

    #[test]
    fn parses_one_shot_commands() {
        let args = Args::try_parse_from([
            "console_app",
            "--base-url",
            "http://10.0.0.5:8000/api",
            "--log-to",
            "both",
            "process",
            "movie.mkv",
            "--yes",
        ])
        .unwrap();
        assert_eq!(args.base_url.as_deref(), Some("http://10.0.0.5:8000/api"));
        assert_eq!(args.log_to, LogTo::Both);
        assert_eq!(
            args.command,
            Some(Command::Process {
                filename: "movie.mkv".to_string(),
                yes: true
            })
        );
    }

    #[test]
    fn upload_requires_a_path() {
        assert!(Args::try_parse_from(["console_app", "upload"]).is_err());
    }
}
