//! CLI argument definitions using clap

use std::path::PathBuf;

use clap::{ArgAction, Parser, Subcommand, ValueHint};

use crate::domain::{OutputFormat, SortKey};

/// A Unix-style password manager using macOS Keychain
#[derive(Parser, Debug)]
#[command(name = "passkc")]
#[command(author, version, about)]
#[command(long_about = "passkc is a command-line tool for managing credentials in macOS Keychain.

Examples:
  # Get credentials and pipe to clipboard
  passkc get domain.com -q | pbcopy

  # List credentials and filter
  passkc show | grep \"google\"

  # Set credentials from file
  passkc set -f credentials.txt

  # Output in JSON format
  passkc show -o json | jq '.[] | select(.domain == \"google.com\")'")]
#[command(propagate_version = true)]
pub struct Cli {
    /// Output format (text|json|csv)
    #[arg(short, long, global = true)]
    pub output: Option<OutputFormat>,

    /// Config file (default: ~/.config/passkc/passkc.toml)
    #[arg(short, long, global = true, value_hint = ValueHint::FilePath)]
    pub config: Option<PathBuf>,

    /// Suppress prompts and non-essential output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Default domain to use when none is given
    #[arg(long = "domain", global = true, env = "PASSKC_DEFAULT_DOMAIN")]
    pub default_domain: Option<String>,

    /// Enable diagnostic logging on stderr (-v, -vv, -vvv)
    #[arg(short, long, global = true, action = ArgAction::Count)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// List all stored credentials
    #[command(long_about = "List all stored credentials.
Supports filtering, sorting, and multiple output formats.

Examples:
  passkc show
  passkc show -o json
  passkc show --pattern google
  passkc show --pattern google --sort username")]
    Show {
        /// Filter by case-insensitive substring of domain or username
        #[arg(long)]
        pattern: Option<String>,
        /// Sort by field (domain|username)
        #[arg(long)]
        sort: Option<SortKey>,
    },

    /// Retrieve credentials for a website or service
    #[command(long_about = "Retrieve your saved username and password for a domain.

By default only the domain and username are shown; the password stays hidden.
Use -p to print the password, or -q to print only the password.

Examples:
  passkc get github.com                    # Show domain and username only
  passkc get github.com -p                 # Show password only
  passkc get github.com -o json            # Output as JSON (includes password)
  passkc get github.com -q | pbcopy        # Copy password to clipboard
  echo \"github.com\" | passkc get           # Read domain from pipe")]
    Get {
        /// Domain to look up (read from stdin when piped)
        domain: Option<String>,
        /// Output only the password
        #[arg(short, long)]
        password_only: bool,
    },

    /// Save credentials for a website or service
    #[command(long_about = "Save your username and password for a domain.

If you only provide the domain, you'll be prompted for the username.
You'll always be prompted for the password unless it comes from a file or pipe.

Examples:
  passkc set github.com                    # Prompts for username and password
  passkc set github.com myusername         # Prompts for password only
  passkc set -f credentials.txt            # Import from file

File format (one per line, # comments allowed):
  domain username [password]")]
    Set {
        /// Domain to save
        domain: Option<String>,
        /// Username (prompted when omitted)
        username: Option<String>,
        /// Import credentials from file
        #[arg(short, long, value_hint = ValueHint::FilePath, conflicts_with_all = ["domain", "username"])]
        file: Option<PathBuf>,
    },

    /// Remove credentials for a website or service
    #[command(long_about = "Remove stored credentials for a domain.

This permanently deletes the saved username and password.
You'll be asked to confirm unless --force or -q is given.

Examples:
  passkc remove github.com                 # Remove with confirmation prompt
  passkc remove github.com --force         # Remove without confirmation
  passkc remove github.com -q              # Remove quietly")]
    Remove {
        /// Domain to remove
        domain: Option<String>,
        /// Remove without confirmation prompt
        #[arg(short, long)]
        force: bool,
    },

    /// Update username and password for existing credentials
    #[command(long_about = "Update the username and password for existing credentials.

You'll be prompted to enter a new password.
To change only the password, use: passkc set <domain> <username>")]
    Modify {
        /// Domain to update
        domain: String,
        /// New username
        username: String,
    },

    /// Manage settings
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },

    /// Generate shell completions
    Completion {
        /// Shell type
        #[arg(value_enum)]
        shell: clap_complete::Shell,
    },
}

#[derive(Subcommand, Debug)]
pub enum ConfigCommands {
    /// Show effective config
    Show,

    /// Show config file path
    Path,

    /// Create config template
    Init {
        /// Overwrite an existing config file
        #[arg(short, long)]
        force: bool,
    },
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    // https://docs.rs/clap/latest/clap/_derive/_tutorial/index.html#testing
    #[test]
    fn verify_cli() {
        Cli::command().debug_assert();
    }

    #[test]
    fn given_global_flags_after_subcommand_when_parsing_then_accepted() {
        let cli = Cli::try_parse_from(["passkc", "show", "-o", "json", "-q", "--sort", "username"])
            .unwrap();
        assert_eq!(cli.output, Some(OutputFormat::Json));
        assert!(cli.quiet);
        assert!(matches!(
            cli.command,
            Commands::Show {
                sort: Some(SortKey::Username),
                ..
            }
        ));
    }

    #[test]
    fn given_unknown_output_format_when_parsing_then_rejected() {
        assert!(Cli::try_parse_from(["passkc", "show", "-o", "yaml"]).is_err());
    }

    #[test]
    fn given_file_and_domain_when_parsing_set_then_rejected() {
        assert!(Cli::try_parse_from(["passkc", "set", "a.com", "-f", "creds.txt"]).is_err());
    }
}
