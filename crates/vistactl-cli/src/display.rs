//! Display formatting for CLI output

use console::style;

/// Print a step in progress
pub fn step(message: &str) {
    println!("{} {}", style("→").blue().bold(), message);
}

/// Print a completed step
pub fn done(message: &str) {
    println!("{} {}", style("✓").green().bold(), message);
}

/// Print a skipped step with its reason
pub fn skipped(message: &str) {
    println!("{} {}", style("⊘").dim(), style(message).dim());
}

/// Print a warning line
pub fn warn(message: &str) {
    println!("{} {}", style("⚠").yellow(), message);
}

/// Print a section header
pub fn section(title: &str) {
    println!("\n{}", style(title).bold().underlined());
}

/// Spinner for bounded waits
pub fn spinner(message: &str) -> indicatif::ProgressBar {
    let bar = indicatif::ProgressBar::new_spinner();
    bar.set_message(message.to_string());
    bar.enable_steady_tick(std::time::Duration::from_millis(100));
    bar
}

/// Print a check outcome line
pub fn check(name: &str, success: bool, detail: &str) {
    let icon = if success {
        style("✓").green()
    } else {
        style("✗").red()
    };
    println!("  {} {}", icon, style(name).bold());
    for line in detail.lines() {
        println!("      {}", line);
    }
}
