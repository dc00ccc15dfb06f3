//! Rendering credentials as text, JSON or CSV

use std::io::{self, Write};

use crate::cli::output;
use crate::domain::{Credential, OutputFormat};

/// Render a credential listing.
///
/// JSON is always an array (`[]` when empty); CSV always carries its header.
/// Text prints a header line unless `quiet`, then one `domain (username)` per line.
pub fn render_list(
    w: &mut dyn Write,
    credentials: &[Credential],
    format: OutputFormat,
    quiet: bool,
) -> io::Result<()> {
    match format {
        OutputFormat::Json => write_json(w, &credentials),
        OutputFormat::Csv => {
            let mut writer = csv::Writer::from_writer(w);
            writer.write_record(["Domain", "Username"])?;
            for cred in credentials {
                writer.write_record([&cred.domain, &cred.username])?;
            }
            writer.flush()
        }
        OutputFormat::Text => {
            if !quiet {
                output::header(w, "List of credentials:")?;
            }
            for cred in credentials {
                writeln!(w, "{} ({})", cred.domain, cred.username)?;
            }
            Ok(())
        }
    }
}

/// Render a single credential.
///
/// With `password_only` in text mode the bare password is written with no
/// trailing newline, ready for `| pbcopy`. JSON and CSV always include it.
pub fn render_credential(
    w: &mut dyn Write,
    credential: &Credential,
    format: OutputFormat,
    password_only: bool,
) -> io::Result<()> {
    let password = credential.password.as_deref().unwrap_or_default();
    match format {
        OutputFormat::Json => write_json(w, credential),
        OutputFormat::Csv => {
            let mut writer = csv::Writer::from_writer(w);
            writer.write_record([
                credential.domain.as_str(),
                credential.username.as_str(),
                password,
            ])?;
            writer.flush()
        }
        OutputFormat::Text if password_only => {
            write!(w, "{}", password)?;
            w.flush()
        }
        OutputFormat::Text => {
            writeln!(w, "Domain: {}", credential.domain)?;
            writeln!(w, "Username: {}", credential.username)?;
            writeln!(w)?;
            writeln!(w, "To get the password:")?;
            output::detail(
                w,
                &format!("passkc get {} -p              # Show password", credential.domain),
            )?;
            output::detail(
                w,
                &format!("passkc get {} -q | pbcopy     # Copy to clipboard", credential.domain),
            )
        }
    }
}

fn write_json<T: serde::Serialize + ?Sized>(w: &mut dyn Write, value: &T) -> io::Result<()> {
    serde_json::to_writer(&mut *w, value)?;
    writeln!(w)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn rendered(f: impl FnOnce(&mut Vec<u8>) -> io::Result<()>) -> String {
        let mut buf = Vec::new();
        f(&mut buf).unwrap();
        String::from_utf8(buf).unwrap()
    }

    fn sample() -> Vec<Credential> {
        vec![
            Credential::new("github.com", "alice"),
            Credential::new("example.com", "bob"),
        ]
    }

    #[test]
    fn given_empty_list_when_rendering_json_then_empty_array() {
        let out = rendered(|w| render_list(w, &[], OutputFormat::Json, false));
        assert_eq!(out, "[]\n");
    }

    #[test]
    fn given_list_when_rendering_json_then_passwords_omitted() {
        let out = rendered(|w| render_list(w, &sample(), OutputFormat::Json, false));
        assert_eq!(
            out,
            "[{\"domain\":\"github.com\",\"username\":\"alice\"},{\"domain\":\"example.com\",\"username\":\"bob\"}]\n"
        );
    }

    #[test]
    fn given_list_when_rendering_csv_then_header_and_rows() {
        let out = rendered(|w| render_list(w, &sample(), OutputFormat::Csv, false));
        assert_eq!(out, "Domain,Username\ngithub.com,alice\nexample.com,bob\n");
    }

    #[test]
    fn given_field_with_comma_when_rendering_csv_then_quoted() {
        let creds = vec![Credential::new("a.com", "last,first")];
        let out = rendered(|w| render_list(w, &creds, OutputFormat::Csv, false));
        assert_eq!(out, "Domain,Username\na.com,\"last,first\"\n");
    }

    #[rstest]
    #[case(false, true)]
    #[case(true, false)]
    fn given_quiet_flag_when_rendering_text_then_header_toggled(
        #[case] quiet: bool,
        #[case] has_header: bool,
    ) {
        let out = rendered(|w| render_list(w, &sample(), OutputFormat::Text, quiet));
        assert_eq!(out.contains("List of credentials:"), has_header);
        assert!(out.contains("github.com (alice)\n"));
        assert!(out.contains("example.com (bob)\n"));
    }

    #[test]
    fn given_credential_when_rendering_text_then_password_hidden() {
        let cred = Credential::with_password("github.com", "alice", "s3cret");
        let out = rendered(|w| render_credential(w, &cred, OutputFormat::Text, false));
        assert!(out.starts_with("Domain: github.com\nUsername: alice\n"));
        assert!(!out.contains("s3cret"));
    }

    #[test]
    fn given_password_only_when_rendering_text_then_bare_password() {
        let cred = Credential::with_password("github.com", "alice", "s3cret");
        let out = rendered(|w| render_credential(w, &cred, OutputFormat::Text, true));
        assert_eq!(out, "s3cret");
    }

    #[test]
    fn given_credential_when_rendering_json_then_password_included() {
        let cred = Credential::with_password("github.com", "alice", "s3cret");
        let out = rendered(|w| render_credential(w, &cred, OutputFormat::Json, false));
        assert_eq!(
            out,
            "{\"domain\":\"github.com\",\"username\":\"alice\",\"password\":\"s3cret\"}\n"
        );
    }

    #[test]
    fn given_credential_when_rendering_csv_then_single_row_without_header() {
        let cred = Credential::with_password("github.com", "alice", "s3cret");
        let out = rendered(|w| render_credential(w, &cred, OutputFormat::Csv, false));
        assert_eq!(out, "github.com,alice,s3cret\n");
    }
}
