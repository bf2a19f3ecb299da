use clap::{Args, Parser, Subcommand};
use clap_complete::Shell;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "whiskform")]
#[command(author = "Alberto Cavalcante")]
#[command(version)]
#[command(about = "Declarative management of OpenWhisk actions", long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Workspace configuration file
    #[arg(
        short,
        long,
        global = true,
        env = "WHISKFORM_CONFIG",
        default_value = "whiskform.toml"
    )]
    pub config: String,

    /// State file
    #[arg(long, global = true, env = "WHISKFORM_STATE", default_value = "whiskform.state.json")]
    pub state: String,

    /// Verbosity level
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress non-essential output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Check the configuration without contacting OpenWhisk
    Validate,

    /// Show what apply would change
    Plan(TargetArgs),

    /// Create, update and replace actions to match the configuration
    Apply(ApplyArgs),

    /// Delete managed actions
    Destroy(DestroyArgs),

    /// Update state from the live actions
    Refresh(RefreshArgs),

    /// Show managed instances, or one instance in detail
    Show(ShowArgs),

    /// Adopt an existing action into state
    Import {
        /// Instance address, e.g. ibm_openwhisk_action.hello
        address: String,

        /// Remote identifier (the action name)
        id: String,
    },

    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

#[derive(Args)]
pub struct TargetArgs {
    /// Limit to a resource type or a single instance (type.label)
    #[arg(short, long)]
    pub target: Option<String>,
}

#[derive(Args)]
pub struct ApplyArgs {
    /// Limit to a resource type or a single instance (type.label)
    #[arg(short, long)]
    pub target: Option<String>,

    /// Show the plan without applying it
    #[arg(long)]
    pub dry_run: bool,

    /// Skip the confirmation prompt
    #[arg(short, long)]
    pub yes: bool,

    /// Number of parallel jobs
    #[arg(short, long, default_value = "4")]
    pub jobs: u16,
}

#[derive(Args)]
pub struct DestroyArgs {
    /// Limit to a resource type or a single instance (type.label)
    #[arg(short, long)]
    pub target: Option<String>,

    /// Skip the confirmation prompt
    #[arg(short, long)]
    pub yes: bool,

    /// Number of parallel jobs
    #[arg(short, long, default_value = "4")]
    pub jobs: u16,
}

#[derive(Args)]
pub struct RefreshArgs {
    /// Number of parallel jobs
    #[arg(short, long, default_value = "4")]
    pub jobs: u16,
}

#[derive(Args)]
pub struct ShowArgs {
    /// Instance address; all instances when omitted
    pub address: Option<String>,

    /// Print state as JSON
    #[arg(long)]
    pub json: bool,
}

/// Paths the commands work with
pub struct Paths {
    pub config: PathBuf,
    pub state: PathBuf,
}

impl Cli {
    pub fn paths(&self) -> Paths {
        Paths {
            config: crate::config::expand_path(&self.config),
            state: crate::config::expand_path(&self.state),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_is_well_formed() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_apply_args() {
        let cli = Cli::try_parse_from([
            "whiskform",
            "apply",
            "--target",
            "ibm_openwhisk_action.hello",
            "--yes",
            "-j",
            "2",
        ])
        .unwrap();
        match cli.command {
            Command::Apply(args) => {
                assert_eq!(args.target.as_deref(), Some("ibm_openwhisk_action.hello"));
                assert!(args.yes);
                assert!(!args.dry_run);
                assert_eq!(args.jobs, 2);
            }
            _ => panic!("Expected apply"),
        }
    }

    #[test]
    fn test_global_flags() {
        let cli = Cli::try_parse_from([
            "whiskform",
            "plan",
            "-vv",
            "--config",
            "other.toml",
            "--state",
            "s.json",
        ])
        .unwrap();
        assert_eq!(cli.verbose, 2);
        assert_eq!(cli.config, "other.toml");
        assert_eq!(cli.paths().state, PathBuf::from("s.json"));
    }

    #[test]
    fn test_import_requires_address_and_id() {
        assert!(Cli::try_parse_from(["whiskform", "import", "ibm_openwhisk_action.x"]).is_err());
        let cli =
            Cli::try_parse_from(["whiskform", "import", "ibm_openwhisk_action.x", "x"]).unwrap();
        assert!(matches!(cli.command, Command::Import { .. }));
    }
}
