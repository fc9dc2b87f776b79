//! CLI output formatting.

use std::fmt::Display;

use owo_colors::OwoColorize;
use tabled::Tabled;

/// Print the application header.
pub fn header(version: &str) {
    println!("{} {}", "marketpulse-x".bold(), version.dimmed());
    println!();
}

/// Print a labeled value.
pub fn field(label: &str, value: impl Display) {
    println!("  {:<16} {}", label.dimmed(), value);
}

/// Print a success line.
pub fn success(message: &str) {
    println!("  {} {}", "✓".green(), message);
}

/// Print a warning line.
pub fn warning(message: &str) {
    println!("  {} {}", "⚠".yellow(), message);
}

/// Print an error line.
pub fn error(message: &str) {
    eprintln!("  {} {}", "×".red(), message);
}

/// Print a section header.
pub fn section(title: &str) {
    println!();
    println!("{}", title.bold());
}

/// One row of the `status` command's market table.
#[derive(Tabled)]
pub struct MarketRow {
    #[tabled(rename = "market")]
    pub market_id: String,
    pub title: String,
    pub status: String,
}

/// One row of the `status` command's rule table.
#[derive(Tabled)]
pub struct RuleRow {
    pub rule: String,
    #[tabled(rename = "type")]
    pub rule_type: String,
    pub enabled: bool,
}

/// Render `rows` as an indented, bordered table, or a muted placeholder
/// if empty.
pub fn table<T: Tabled>(rows: Vec<T>) {
    if rows.is_empty() {
        println!("  {}", "(none)".dimmed());
        return;
    }
    for line in tabled::Table::new(rows).to_string().lines() {
        println!("  {line}");
    }
}
