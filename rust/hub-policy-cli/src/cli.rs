use std::path::PathBuf;

use clap::{ArgAction, Parser, Subcommand};
use hub_policy::EntityType;

#[derive(Debug, Parser)]
#[command(name = "hub-policy")]
#[command(bin_name = "hub-policy")]
#[command(about = "Evaluate Hub permissions and capabilities", long_about = None)]
pub struct HubPolicyCli {
    /// JSON rule set to register on top of the bundled rules
    #[arg(long = "rules", value_name = "FILE", global = true)]
    pub rules: Vec<PathBuf>,

    /// JSON resolver settings; defaults apply when omitted
    #[arg(long, value_name = "FILE", global = true)]
    pub settings: Option<PathBuf>,

    /// Log more; repeat for trace output
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Resolve a single permission
    Check {
        permission: String,

        #[arg(long, value_name = "FILE")]
        context: PathBuf,

        #[arg(long, value_name = "FILE")]
        entity: Option<PathBuf>,
    },

    /// Evaluate every capability of an entity
    Capabilities {
        #[arg(long, value_name = "FILE")]
        context: PathBuf,

        #[arg(long, value_name = "FILE")]
        entity: PathBuf,
    },

    /// List registered rules
    Rules {
        #[arg(long, value_name = "TYPE")]
        entity_type: Option<EntityType>,
    },
}

impl HubPolicyCli {
    /// Log directive implied by `-v` flags, if any were given.
    pub fn log_directive(&self) -> Option<&'static str> {
        match self.verbose {
            0 => None,
            1 => Some("hub_policy=debug,hub_policy_cli=debug"),
            _ => Some("trace"),
        }
    }
}
