//! Command line surface of the `sweep-server` binary.

pub mod scan;

use std::path::PathBuf;

use clap::{Args as ClapArgs, Parser, Subcommand};

/// CLI entry point
#[derive(Parser, Debug)]
#[command(name = "sweep-server")]
#[command(
    about = "Resumable maintenance scanner: tags published content in batches"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Command>,

    #[command(flatten)]
    pub serve: ServeArgs,
}

#[derive(ClapArgs, Debug, Clone, Default)]
pub struct ServeArgs {
    /// Configuration file (TOML). Defaults to sweep.toml or config/sweep.toml
    #[arg(long, env = "SWEEP_CONFIG", global = true)]
    pub config: Option<PathBuf>,

    /// Server port (overrides config)
    #[arg(short, long, env = "SERVER_PORT")]
    pub port: Option<u16>,

    /// Server host (overrides config)
    #[arg(long, env = "SERVER_HOST")]
    pub host: Option<String>,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Run a full maintenance scan in the foreground and exit
    Scan(ScanArgs),
    /// Print the current scan progress as JSON
    Status,
    /// Forget the recorded scan; pending continuations become no-ops
    Reset,
}

#[derive(ClapArgs, Debug, Clone, Default)]
pub struct ScanArgs {
    /// Comma-separated content types to scan. Defaults to all public types
    #[arg(
        long = "post-types",
        alias = "post_types",
        value_delimiter = ',',
        value_name = "TYPES"
    )]
    pub post_types: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scan_accepts_both_flag_spellings() {
        let cli = Cli::try_parse_from([
            "sweep-server",
            "scan",
            "--post-types=post,page",
        ])
        .unwrap();
        let Some(Command::Scan(args)) = cli.command else {
            panic!("expected scan command");
        };
        assert_eq!(args.post_types, vec!["post", "page"]);

        let cli = Cli::try_parse_from([
            "sweep-server",
            "scan",
            "--post_types=attachment",
        ])
        .unwrap();
        let Some(Command::Scan(args)) = cli.command else {
            panic!("expected scan command");
        };
        assert_eq!(args.post_types, vec!["attachment"]);
    }

    #[test]
    fn no_subcommand_means_serve() {
        let cli =
            Cli::try_parse_from(["sweep-server", "--port", "4000"]).unwrap();
        assert!(cli.command.is_none());
        assert_eq!(cli.serve.port, Some(4000));
    }

    #[test]
    fn scan_without_types_is_empty() {
        let cli = Cli::try_parse_from(["sweep-server", "scan"]).unwrap();
        let Some(Command::Scan(args)) = cli.command else {
            panic!("expected scan command");
        };
        assert!(args.post_types.is_empty());
    }
}
