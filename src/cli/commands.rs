//! Command dispatch
//!
//! Each verb resolves its inputs (arguments, piped stdin, prompts, defaults),
//! calls the credential service and renders the result. Output goes to the
//! writers handed to [`Dispatcher::execute`]; prompts go through the
//! container's [`Prompter`](crate::infrastructure::traits::Prompter).

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use clap::CommandFactory;
use clap_complete::Shell;
use tracing::{debug, instrument};

use crate::application::ApplicationError;
use crate::cli::args::{Cli, Commands, ConfigCommands};
use crate::cli::error::{CliError, CliResult};
use crate::cli::output;
use crate::cli::render::{render_credential, render_list};
use crate::config::{resolve_config_path, Settings};
use crate::domain::{
    select_credentials, validate_domain, validate_password, validate_username, ImportRecord,
    OutputFormat, SortKey,
};
use crate::infrastructure::di::ServiceContainer;
use crate::infrastructure::InfraError;

const GET_USAGE: &str = "Usage: passkc get <domain>

Examples:
  passkc get github.com                    # Show domain and username
  passkc get github.com -p                 # Show password only
  echo \"github.com\" | passkc get           # Read domain from pipe";

const SET_USAGE: &str = "Usage: passkc set <domain> [username]

Examples:
  passkc set github.com                    # Prompts for username and password
  passkc set github.com myusername         # Prompts for password only
  passkc set -f credentials.txt            # Import from file";

const REMOVE_USAGE: &str = "Usage: passkc remove <domain>

Examples:
  passkc remove github.com                 # Remove with confirmation prompt
  passkc remove github.com --force         # Remove without confirmation";

const INVALID_STDIN: &str = "invalid input format. Expected: domain username [password]";

/// Executes parsed commands against a service container.
pub struct Dispatcher<'a> {
    container: &'a ServiceContainer,
    output: OutputFormat,
    quiet: bool,
    default_domain: Option<String>,
    config_path: Option<PathBuf>,
}

impl<'a> Dispatcher<'a> {
    /// Resolve global flags against the loaded settings.
    pub fn new(container: &'a ServiceContainer, cli: &Cli) -> Self {
        let settings = &container.settings;
        Self {
            container,
            output: cli.output.unwrap_or(settings.output),
            quiet: cli.quiet,
            default_domain: cli
                .default_domain
                .clone()
                .or_else(|| settings.default_domain.clone())
                .filter(|d| !d.trim().is_empty()),
            config_path: cli.config.clone(),
        }
    }

    /// Run one command. `out` receives data, `err` receives warnings.
    pub fn execute(
        &self,
        command: &Commands,
        out: &mut dyn Write,
        err: &mut dyn Write,
    ) -> CliResult<()> {
        match command {
            Commands::Show { pattern, sort } => self.show(pattern.as_deref(), *sort, out),
            Commands::Get {
                domain,
                password_only,
            } => self.get(domain.as_deref(), *password_only, out),
            Commands::Set {
                domain,
                username,
                file,
            } => match file {
                Some(path) => self.import(path, out, err),
                None => self.set(domain.as_deref(), username.as_deref(), out),
            },
            Commands::Remove { domain, force } => self.remove(domain.as_deref(), *force, out),
            Commands::Modify { domain, username } => self.modify(domain, username, out),
            Commands::Config { command } => self.config(command, out),
            Commands::Completion { shell } => self.completion(*shell, out),
        }
    }

    #[instrument(skip(self, out))]
    fn show(
        &self,
        pattern: Option<&str>,
        sort: Option<SortKey>,
        out: &mut dyn Write,
    ) -> CliResult<()> {
        let sort = sort.unwrap_or(self.container.settings.sort);
        let all = self.container.credentials.list()?;
        let selected = select_credentials(all, pattern, sort);
        debug!("show: {} credentials", selected.len());
        render_list(out, &selected, self.output, self.quiet)?;
        Ok(())
    }

    #[instrument(skip(self, out))]
    fn get(&self, domain: Option<&str>, password_only: bool, out: &mut dyn Write) -> CliResult<()> {
        let domain = match non_empty(domain) {
            Some(d) => Some(d),
            None => self.piped_line()?.or_else(|| self.default_domain.clone()),
        }
        .ok_or_else(|| CliError::Usage(GET_USAGE.to_string()))?;

        validate_domain(&domain)?;
        let credential = self.container.credentials.get(&domain)?;
        render_credential(
            out,
            &credential,
            self.output,
            password_only || self.quiet,
        )?;
        Ok(())
    }

    #[instrument(skip(self, out))]
    fn set(
        &self,
        domain: Option<&str>,
        username: Option<&str>,
        out: &mut dyn Write,
    ) -> CliResult<()> {
        if let Some(domain) = non_empty(domain) {
            return self.save_interactive(&domain, non_empty(username), out);
        }

        if self.container.input.is_piped() {
            let line = self
                .piped_line()?
                .ok_or_else(|| CliError::InvalidArgs(INVALID_STDIN.to_string()))?;
            let record = ImportRecord::parse(&line)
                .ok()
                .flatten()
                .ok_or_else(|| CliError::InvalidArgs(INVALID_STDIN.to_string()))?;
            validate_domain(&record.domain)?;
            validate_username(&record.username)?;
            let password = match record.password {
                Some(p) => p,
                None => self.prompt_password(&record.domain, &record.username)?,
            };
            return self.save(&record.domain, &record.username, &password, out);
        }

        match self.default_domain.clone() {
            Some(domain) => self.save_interactive(&domain, None, out),
            None => Err(CliError::Usage(SET_USAGE.to_string())),
        }
    }

    /// Validate, prompt for whatever is missing, then save.
    fn save_interactive(
        &self,
        domain: &str,
        username: Option<String>,
        out: &mut dyn Write,
    ) -> CliResult<()> {
        validate_domain(domain)?;
        let username = match username {
            Some(u) => u,
            None => self
                .container
                .prompter
                .input(&format!("Username for {domain}"))
                .map_err(InfraError::prompt)?,
        };
        validate_username(&username)?;
        let password = self.prompt_password(domain, &username)?;
        self.save(domain, &username, &password, out)
    }

    fn save(
        &self,
        domain: &str,
        username: &str,
        password: &str,
        out: &mut dyn Write,
    ) -> CliResult<()> {
        let outcome = self.container.credentials.set(domain, username, password)?;
        debug!("set {}: {:?}", domain, outcome);
        if !self.quiet {
            output::success(out, &format!("Saved credentials for {username}@{domain}"))?;
        }
        Ok(())
    }

    /// Import `domain username [password]` lines from a file.
    ///
    /// Bad lines and per-line store failures are reported on `err` and skipped.
    #[instrument(skip(self, out, err))]
    fn import(&self, path: &Path, out: &mut dyn Write, err: &mut dyn Write) -> CliResult<()> {
        let content = fs::read_to_string(path)
            .map_err(|e| InfraError::io(format!("cannot open file '{}'", path.display()), e))?;

        let mut imported = 0usize;
        for (idx, line) in content.lines().enumerate() {
            let line_num = idx + 1;
            let record = match ImportRecord::parse(line) {
                Ok(Some(record)) => record,
                Ok(None) => continue,
                Err(e) => {
                    output::warning(err, &format!("skipping line {line_num}: {e}"))?;
                    continue;
                }
            };

            let password = match &record.password {
                Some(p) => p.clone(),
                None => match self.prompt_password(&record.domain, &record.username) {
                    Ok(p) => p,
                    Err(e) => {
                        output::failure(err, &format!("line {line_num}: {e}"))?;
                        continue;
                    }
                },
            };

            match self
                .container
                .credentials
                .set(&record.domain, &record.username, &password)
            {
                Ok(_) => {
                    imported += 1;
                    if !self.quiet {
                        output::success(
                            out,
                            &format!("Saved credentials for {}@{}", record.username, record.domain),
                        )?;
                    }
                }
                Err(e) => output::failure(err, &format!("line {line_num}: {e}"))?,
            }
        }

        debug!("import: {} credentials from {}", imported, path.display());
        if !self.quiet {
            writeln!(out)?;
            output::info(out, &format!("Imported {imported} credentials successfully"))?;
        }
        Ok(())
    }

    #[instrument(skip(self, out))]
    fn remove(&self, domain: Option<&str>, force: bool, out: &mut dyn Write) -> CliResult<()> {
        let domain = non_empty(domain)
            .or_else(|| self.default_domain.clone())
            .ok_or_else(|| CliError::Usage(REMOVE_USAGE.to_string()))?;
        validate_domain(&domain)?;

        let existing = self
            .container
            .credentials
            .find(&domain)?
            .ok_or_else(|| ApplicationError::NotFound {
                domain: domain.clone(),
            })?;

        let ask = !force && !self.quiet && self.container.settings.confirm_remove;
        if ask {
            let confirmed = self
                .container
                .prompter
                .confirm(&format!(
                    "Are you sure you want to remove credentials for '{}' (username: {})?",
                    existing.domain, existing.username
                ))
                .map_err(InfraError::prompt)?;
            if !confirmed {
                output::info(out, "Cancelled.")?;
                return Ok(());
            }
        }

        self.container.credentials.remove(&domain)?;
        if !self.quiet {
            output::success(out, &format!("Removed credentials for {domain}"))?;
        }
        Ok(())
    }

    #[instrument(skip(self, out))]
    fn modify(&self, domain: &str, username: &str, out: &mut dyn Write) -> CliResult<()> {
        let domain = domain.trim();
        let username = username.trim();
        validate_domain(domain)?;
        validate_username(username)?;
        if self.container.credentials.find(domain)?.is_none() {
            return Err(ApplicationError::NotFound {
                domain: domain.to_string(),
            }
            .into());
        }

        if !self.quiet {
            output::info(
                out,
                &format!("Updating credentials for {domain} with username '{username}'"),
            )?;
        }
        let password = self.prompt_password(domain, username)?;
        self.container.credentials.modify(domain, username, &password)?;
        if !self.quiet {
            output::success(out, &format!("Updated credentials for {domain}"))?;
        }
        Ok(())
    }

    fn config(&self, command: &ConfigCommands, out: &mut dyn Write) -> CliResult<()> {
        match command {
            ConfigCommands::Show => {
                let rendered = self.container.settings.to_toml()?;
                write!(out, "{rendered}")?;
            }
            ConfigCommands::Path => {
                let path = self.config_file()?;
                output::info(out, &path.display())?;
            }
            ConfigCommands::Init { force } => {
                let path = self.config_file()?;
                if path.exists() && !force {
                    return Err(CliError::InvalidArgs(format!(
                        "config file already exists: {} (use --force to overwrite)",
                        path.display()
                    )));
                }
                if let Some(parent) = path.parent() {
                    fs::create_dir_all(parent).map_err(|e| {
                        InfraError::io(format!("create {}", parent.display()), e)
                    })?;
                }
                fs::write(&path, Settings::template())
                    .map_err(|e| InfraError::io(format!("write {}", path.display()), e))?;
                if !self.quiet {
                    output::success(out, &format!("Created {}", path.display()))?;
                }
            }
        }
        Ok(())
    }

    fn completion(&self, shell: Shell, out: &mut dyn Write) -> CliResult<()> {
        let mut cmd = Cli::command();
        let name = cmd.get_name().to_string();
        clap_complete::generate(shell, &mut cmd, name, out);
        Ok(())
    }

    fn config_file(&self) -> CliResult<PathBuf> {
        resolve_config_path(self.config_path.as_deref()).ok_or_else(|| {
            CliError::InvalidArgs("cannot determine config directory".to_string())
        })
    }

    fn prompt_password(&self, domain: &str, username: &str) -> CliResult<String> {
        let password = self
            .container
            .prompter
            .password(&format!("Password for {username}@{domain}"))
            .map_err(InfraError::prompt)?;
        validate_password(&password)?;
        Ok(password)
    }

    /// One trimmed, non-empty line from piped stdin.
    fn piped_line(&self) -> CliResult<Option<String>> {
        let input = &self.container.input;
        if !input.is_piped() {
            return Ok(None);
        }
        let line = input
            .read_line()
            .map_err(|e| InfraError::io("read stdin", e))?;
        Ok(non_empty(line.as_deref()))
    }
}

fn non_empty(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}
