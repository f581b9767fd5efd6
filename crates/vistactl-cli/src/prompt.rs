//! Interactive prompts
//!
//! All prompting is skipped in non-interactive mode; callers turn a missing
//! required value into a fatal error instead of blocking on a TTY.

use console::Term;
use std::io::Write;

use crate::error::Result;

/// Ask a yes/no question, defaulting to no
pub fn confirm(question: &str) -> Result<bool> {
    let term = Term::stderr();
    eprint!("{} [y/N] ", question);
    std::io::stderr().flush().ok();

    let answer = term.read_line()?;
    Ok(matches!(answer.trim().to_lowercase().as_str(), "y" | "yes"))
}

/// Ask for an optional value; an empty answer means "not set"
pub fn optional(question: &str) -> Result<Option<String>> {
    let term = Term::stderr();
    eprint!("{}: ", question);
    std::io::stderr().flush().ok();

    let answer = term.read_line()?;
    let answer = answer.trim();
    if answer.is_empty() {
        Ok(None)
    } else {
        Ok(Some(answer.to_string()))
    }
}

/// Ask for a secret without echoing it
pub fn secret(question: &str) -> Result<String> {
    Ok(rpassword::prompt_password(format!("{}: ", question))?)
}
