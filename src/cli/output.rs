//! Styled console output helpers

use console::style;

#[derive(Default)]
pub struct Output;

impl Output {
    pub fn new() -> Self {
        Self
    }

    pub fn success(&self, message: &str) {
        println!("{} {}", style("✓").green(), message);
    }

    pub fn error(&self, message: &str) {
        eprintln!("{} {}", style("✗").red(), message);
    }

    pub fn warning(&self, message: &str) {
        println!("{} {}", style("⚠").yellow(), message);
    }

    pub fn info(&self, message: &str) {
        println!("{} {}", style("ℹ").blue(), message);
    }

    pub fn section(&self, title: &str) {
        println!("\n{}", style(title).bold());
        println!("{}", "─".repeat(40));
    }

    /// Aligned key/value line for summary tables
    pub fn kv(&self, key: &str, value: &str) {
        println!("  {:<22} {}", style(key).dim(), value);
    }

    /// In-place progress line; call `progress_done` after the last update
    pub fn progress(&self, done: usize, total: usize) {
        print!("\r  {} {}/{} records", style("→").cyan(), done, total);
        use std::io::Write;
        let _ = std::io::stdout().flush();
    }

    pub fn progress_done(&self) {
        println!();
    }
}
