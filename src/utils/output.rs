// Colored terminal output helpers
use colored::Colorize;
use std::io::{self, Write};

pub fn print_success(msg: &str) {
    println!("{}  {}", "PASS".green(), msg);
}

pub fn print_failure(msg: &str) {
    eprintln!("{}  {}", "FAIL".red(), msg);
}

pub fn print_warning(msg: &str) {
    eprintln!("{}  {}", "WARN".yellow(), msg);
}

/// Print an error the way `main` reports fatal errors
pub fn print_error(err: &dyn std::fmt::Display) {
    eprintln!("{} {}", "Error:".red().bold(), err);
}

/// Write captured command output to stderr exactly as the command produced it
pub fn print_captured(output: &str) {
    let mut stderr = io::stderr().lock();
    let _ = stderr.write_all(output.as_bytes());
    if !output.ends_with('\n') {
        let _ = stderr.write_all(b"\n");
    }
    let _ = stderr.flush();
}
