//! Weft CLI: elaboration-time static analysis of component designs.
//!
//! `weft check` builds the design described by `weft.toml`, elaborates it and
//! runs the legality checker. `weft dump` does the same and then prints what
//! every function and update block reads, writes and calls.

#![warn(missing_docs)]

mod check;
mod dump;
mod pipeline;

use std::io::IsTerminal;
use std::process;

use clap::{Parser, Subcommand, ValueEnum};
use tracing_subscriber::EnvFilter;

/// Weft: find out what every update block touches, and whether that is legal.
#[derive(Parser, Debug)]
#[command(name = "weft", version, about = "Weft elaboration checker")]
pub struct Cli {
    /// Suppress all output except errors.
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Enable verbose (debug-level) output.
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Control colored output.
    #[arg(long, global = true, value_enum, default_value_t = ColorChoice::Auto)]
    pub color: ColorChoice,

    /// Path to a `weft.toml` file or the directory holding it.
    #[arg(long, global = true)]
    pub config: Option<String>,

    /// The subcommand to run.
    #[command(subcommand)]
    pub command: Command,
}

/// Available CLI commands.
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Elaborate the design and run the legality checker.
    Check,
    /// Elaborate, check and print the read/write/call report.
    Dump(DumpArgs),
}

/// Arguments for the `weft dump` subcommand.
#[derive(Parser, Debug)]
pub struct DumpArgs {
    /// Output format of the report.
    #[arg(short, long, value_enum, default_value_t = ReportFormat::Text)]
    pub format: ReportFormat,
}

/// Controls whether colored output is produced.
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum ColorChoice {
    /// Detect from terminal capabilities.
    Auto,
    /// Always produce colored output.
    Always,
    /// Never produce colored output.
    Never,
}

/// Report output format.
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum ReportFormat {
    /// Indented text with nested call trees.
    Text,
    /// The aggregated summary as JSON.
    Json,
}

/// Global settings derived from CLI flags.
pub struct GlobalArgs {
    /// Whether to suppress non-error output.
    pub quiet: bool,
    /// Whether to print verbose/debug information.
    pub verbose: bool,
    /// Whether to use colored output.
    pub color: bool,
    /// Optional path to a config file or project directory.
    pub config: Option<String>,
}

/// Default log filter when `WEFT_LOG` is unset.
fn default_filter(global: &GlobalArgs) -> &'static str {
    if global.verbose {
        "weft=debug"
    } else if global.quiet {
        "weft=error"
    } else {
        "weft=info"
    }
}

fn init_logging(global: &GlobalArgs) {
    let filter = EnvFilter::try_from_env("WEFT_LOG")
        .unwrap_or_else(|_| EnvFilter::new(default_filter(global)));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn main() {
    let cli = Cli::parse();

    let color = match cli.color {
        ColorChoice::Auto => std::io::stderr().is_terminal(),
        ColorChoice::Always => true,
        ColorChoice::Never => false,
    };

    let global = GlobalArgs {
        quiet: cli.quiet,
        verbose: cli.verbose,
        color,
        config: cli.config,
    };
    init_logging(&global);

    let result = match cli.command {
        Command::Check => check::run(&global),
        Command::Dump(ref args) => dump::run(args, &global),
    };

    match result {
        Ok(code) => process::exit(code),
        Err(e) => {
            eprintln!("error: {e}");
            process::exit(1);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_check() {
        let cli = Cli::parse_from(["weft", "check"]);
        assert!(matches!(cli.command, Command::Check));
        assert!(!cli.quiet);
        assert_eq!(cli.color, ColorChoice::Auto);
        assert!(cli.config.is_none());
    }

    #[test]
    fn parse_dump_default_format() {
        let cli = Cli::parse_from(["weft", "dump"]);
        match cli.command {
            Command::Dump(ref args) => assert_eq!(args.format, ReportFormat::Text),
            _ => panic!("expected Dump command"),
        }
    }

    #[test]
    fn parse_dump_json() {
        let cli = Cli::parse_from(["weft", "dump", "--format", "json"]);
        match cli.command {
            Command::Dump(ref args) => assert_eq!(args.format, ReportFormat::Json),
            _ => panic!("expected Dump command"),
        }
    }

    #[test]
    fn parse_global_flags_after_command() {
        let cli = Cli::parse_from([
            "weft",
            "check",
            "--config",
            "/tmp/demo/weft.toml",
            "--color",
            "never",
            "-v",
        ]);
        assert_eq!(cli.config.as_deref(), Some("/tmp/demo/weft.toml"));
        assert_eq!(cli.color, ColorChoice::Never);
        assert!(cli.verbose);
    }

    #[test]
    fn unknown_command_is_rejected() {
        assert!(Cli::try_parse_from(["weft", "simulate"]).is_err());
    }

    #[test]
    fn verbose_raises_log_level() {
        let mut global = GlobalArgs {
            quiet: false,
            verbose: false,
            color: false,
            config: None,
        };
        assert_eq!(default_filter(&global), "weft=info");
        global.verbose = true;
        assert_eq!(default_filter(&global), "weft=debug");
        global.verbose = false;
        global.quiet = true;
        assert_eq!(default_filter(&global), "weft=error");
    }
}
