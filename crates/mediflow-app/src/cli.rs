//! CLI argument definitions for the Mediflow application.
//!
//! Uses `clap` with derive macros for ergonomic argument parsing.
//! Priority resolution: CLI args > env vars > config file > defaults.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Mediflow — a voice-enabled medical appointment scheduling assistant.
#[derive(Parser, Debug)]
#[command(name = "mediflow", version, about)]
pub struct CliArgs {
    /// Path to the configuration file.
    #[arg(short = 'c', long = "config")]
    pub config: Option<PathBuf>,

    /// API server port.
    #[arg(short = 'p', long = "port")]
    pub port: Option<u16>,

    /// Directory holding the provider and schedule CSV tables.
    #[arg(short = 'd', long = "data-dir")]
    pub data_dir: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error).
    #[arg(short = 'l', long = "log-level")]
    pub log_level: Option<String>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Run the HTTP API server.
    Serve,
    /// Hold a scheduling conversation in the terminal.
    ///
    /// Each turn is a typed line, or `@path/to/audio.wav` to transcribe a
    /// recorded clip instead. Replies are printed, and synthesized to files
    /// when `--audio-out` is set.
    Talk {
        /// Directory to write synthesized reply audio into.
        #[arg(long = "audio-out")]
        audio_out: Option<PathBuf>,
    },
}

impl CliArgs {
    /// Resolve the configuration file path.
    ///
    /// Priority: --config flag > MEDIFLOW_CONFIG env var > ~/.mediflow/config.toml.
    pub fn resolve_config_path(&self) -> PathBuf {
        if let Some(ref p) = self.config {
            return p.clone();
        }
        if let Ok(p) = std::env::var("MEDIFLOW_CONFIG") {
            return PathBuf::from(p);
        }
        default_config_path()
    }

    /// Resolve the API server port.
    ///
    /// Priority: --port flag > MEDIFLOW_PORT env var > config file value.
    pub fn resolve_port(&self, config_port: u16) -> u16 {
        if let Some(p) = self.port {
            return p;
        }
        if let Ok(val) = std::env::var("MEDIFLOW_PORT") {
            if let Ok(p) = val.parse::<u16>() {
                return p;
            }
        }
        config_port
    }

    /// Resolve the log level.
    ///
    /// Priority: --log-level flag > config file value.
    pub fn resolve_log_level(&self, config_level: &str) -> String {
        self.log_level
            .clone()
            .unwrap_or_else(|| config_level.to_string())
    }
}

/// Default config file path for the current platform.
fn default_config_path() -> PathBuf {
    #[cfg(target_os = "windows")]
    if let Ok(home) = std::env::var("USERPROFILE") {
        return PathBuf::from(home).join(".mediflow").join("config.toml");
    }
    #[cfg(not(target_os = "windows"))]
    if let Ok(home) = std::env::var("HOME") {
        return PathBuf::from(home).join(".mediflow").join("config.toml");
    }
    PathBuf::from("config.toml")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> CliArgs {
        CliArgs::parse_from(args)
    }

    #[test]
    fn test_port_flag_wins_over_config() {
        let cli = parse(&["mediflow", "--port", "9000", "serve"]);
        assert_eq!(cli.resolve_port(8000), 9000);
    }

    #[test]
    fn test_port_falls_back_to_config() {
        let cli = parse(&["mediflow", "serve"]);
        if std::env::var("MEDIFLOW_PORT").is_err() {
            assert_eq!(cli.resolve_port(8000), 8000);
        }
    }

    #[test]
    fn test_log_level_flag_wins() {
        let cli = parse(&["mediflow", "--log-level", "debug", "serve"]);
        assert_eq!(cli.resolve_log_level("info"), "debug");
        let cli = parse(&["mediflow", "serve"]);
        assert_eq!(cli.resolve_log_level("info"), "info");
    }

    #[test]
    fn test_config_flag_wins() {
        let cli = parse(&["mediflow", "--config", "/tmp/m.toml", "serve"]);
        assert_eq!(cli.resolve_config_path(), PathBuf::from("/tmp/m.toml"));
    }

    #[test]
    fn test_talk_subcommand_parses_audio_out() {
        let cli = parse(&["mediflow", "talk", "--audio-out", "/tmp/replies"]);
        match cli.command {
            Command::Talk { audio_out } => {
                assert_eq!(audio_out, Some(PathBuf::from("/tmp/replies")));
            }
            _ => panic!("expected talk subcommand"),
        }
    }
}
