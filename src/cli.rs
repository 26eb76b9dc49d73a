use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

use crate::vcs::VcsKind;

/// Command line interface for the asset freshness gate.
#[derive(Parser, Debug)]
#[command(
    name = "assetgate",
    version,
    about = "Rebuild a bundled asset when tracked sources are newer than it",
    subcommand_required = false,
    arg_required_else_help = false,
    args_conflicts_with_subcommands = true
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,
    /// Options for the default `run` when no subcommand is given.
    #[command(flatten)]
    pub run: RunOpts,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    #[command(
        about = "Run the build task if the artifact is stale (default).",
        long_about = "Compares the artifact's modification time against every file tracked by the VCS. If any tracked file is newer, the artifact is missing, or the tracked files cannot be listed or stat'd, the build command is spawned with inherited stdio and awaited."
    )]
    Run(RunOpts),
    #[command(
        about = "Report whether the artifact is stale without building.",
        long_about = "Prints `stale: <reason>` or `up to date`. Pass --exit-code to exit with status 1 when stale, for use in shell conditionals."
    )]
    Check(CheckOpts),
    #[command(
        about = "Scaffold an assetgate.toml in the current directory.",
        long_about = "Creates a starter assetgate.toml with the artifact path, build command, and VCS backend so you can adjust them later."
    )]
    Init(InitOpts),
}

/// Options shared by `run` and `check`. CLI values override the config file.
#[derive(Args, Debug, Clone, Default)]
pub struct GateOpts {
    /// Path to the gate config (defaults to ./assetgate.toml when present).
    #[arg(long)]
    pub config: Option<PathBuf>,
    /// Built artifact whose freshness is checked.
    #[arg(long)]
    pub artifact: Option<String>,
    /// Build command line, e.g. "deno task build".
    #[arg(long)]
    pub build: Option<String>,
    /// Version control backend used to list tracked files.
    #[arg(long, value_enum)]
    pub vcs: Option<VcsKind>,
    /// Repository directory to list files in and run the build from.
    #[arg(long)]
    pub root: Option<String>,
}

#[derive(Args, Debug, Clone, Default)]
pub struct RunOpts {
    #[command(flatten)]
    pub gate: GateOpts,
    /// Build even if the artifact is up to date.
    #[arg(long)]
    pub force: bool,
}

#[derive(Args, Debug, Clone, Default)]
pub struct CheckOpts {
    #[command(flatten)]
    pub gate: GateOpts,
    /// Exit with status 1 when the artifact is stale.
    #[arg(long)]
    pub exit_code: bool,
}

#[derive(Args, Debug, Clone)]
pub struct InitOpts {
    /// Where to write the scaffolded config (defaults to ./assetgate.toml).
    #[arg(long)]
    pub path: Option<PathBuf>,
    /// Artifact path to record in the scaffold.
    #[arg(long)]
    pub artifact: Option<String>,
    /// Overwrite an existing config.
    #[arg(long)]
    pub force: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bare_invocation_accepts_run_flags() {
        let cli =
            Cli::try_parse_from(["assetgate", "--artifact", "dist/app.js", "--force"]).unwrap();
        assert!(cli.command.is_none());
        assert_eq!(cli.run.gate.artifact.as_deref(), Some("dist/app.js"));
        assert!(cli.run.force);
    }

    #[test]
    fn check_parses_exit_code_and_vcs() {
        let cli =
            Cli::try_parse_from(["assetgate", "check", "--exit-code", "--vcs", "jj"]).unwrap();
        let Some(Commands::Check(opts)) = cli.command else {
            panic!("expected check subcommand");
        };
        assert!(opts.exit_code);
        assert_eq!(opts.gate.vcs, Some(VcsKind::Jj));
    }

    #[test]
    fn top_level_flags_conflict_with_subcommands() {
        assert!(Cli::try_parse_from(["assetgate", "--force", "check"]).is_err());
    }
}
