//! Log formatting and output with ANSI colors and text wrapping
//!
//! Handles:
//! - Colorized console output with tag and level formatting
//! - Text wrapping at word boundaries
//! - Broken pipe handling for piped commands

use super::levels::LogLevel;
use super::tags::LogTag;
use chrono::Local;
use colored::*;
use std::io::{stderr, stdout, ErrorKind, Write};

/// Log format widths for alignment
const TAG_WIDTH: usize = 8;
const LOG_TYPE_WIDTH: usize = 8;
const BRACKET_SPACE_WIDTH: usize = 3;
const TOTAL_PREFIX_WIDTH: usize = TAG_WIDTH + LOG_TYPE_WIDTH + BRACKET_SPACE_WIDTH * 2;

/// Maximum line length before wrapping
const MAX_LINE_LENGTH: usize = 145;

/// Format and output a log message
///
/// Errors and warnings go to stderr, everything else to stdout.
pub fn format_and_log(tag: LogTag, level: LogLevel, message: &str) {
    let time = Local::now().format("%H:%M:%S").to_string();
    let prefix = format!("{} ", time).dimmed().to_string();
    let prefix_width = time.len() + 1;

    let base_line = format!("{}[{}] [{}] ", prefix, format_tag(&tag), format_level(level));

    let available_space = MAX_LINE_LENGTH
        .checked_sub(prefix_width + TOTAL_PREFIX_WIDTH)
        .filter(|space| *space > 0)
        .unwrap_or(50);

    let chunks = wrap_text(message, available_space);
    let to_stderr = level <= LogLevel::Warning;

    print_safe(&format!("{}{}", base_line, chunks[0]), to_stderr);

    let continuation_prefix = " ".repeat(prefix_width + TOTAL_PREFIX_WIDTH);
    for chunk in &chunks[1..] {
        print_safe(&format!("{}{}", continuation_prefix, chunk), to_stderr);
    }
}

/// Format a tag with appropriate color
fn format_tag(tag: &LogTag) -> ColoredString {
    let label = format!("{:<width$}", tag.to_plain_string(), width = TAG_WIDTH);
    match tag {
        LogTag::Pool => label.bright_blue().bold(),
        LogTag::Api => label.bright_purple().bold(),
        LogTag::Config => label.bright_yellow().bold(),
        LogTag::Setup => label.bright_green().bold(),
        LogTag::System => label.bright_cyan().bold(),
        LogTag::Other(_) => label.white().bold(),
    }
}

/// Format log level with appropriate color
fn format_level(level: LogLevel) -> ColoredString {
    let label = format!("{:<width$}", level.as_str(), width = LOG_TYPE_WIDTH);
    match level {
        LogLevel::Error => label.bright_red().bold(),
        LogLevel::Warning => label.bright_yellow().bold(),
        LogLevel::Debug | LogLevel::Verbose => label.dimmed(),
        LogLevel::Info => label.white().bold(),
    }
}

/// Print a line but exit quietly on broken pipe
fn print_safe(message: &str, to_stderr: bool) {
    let result = if to_stderr {
        writeln!(stderr(), "{}", message)
    } else {
        writeln!(stdout(), "{}", message).and_then(|_| stdout().flush())
    };

    if let Err(e) = result {
        if e.kind() == ErrorKind::BrokenPipe {
            std::process::exit(0);
        }
    }
}

/// Wrap text at word boundaries, respecting existing newlines
fn wrap_text(text: &str, max_width: usize) -> Vec<String> {
    let mut result = Vec::new();

    for line in text.split('\n') {
        if line.chars().count() <= max_width {
            result.push(line.to_string());
            continue;
        }

        let mut current_line = String::new();
        for word in line.split_whitespace() {
            let word_len = word.chars().count();
            let current_len = current_line.chars().count();

            if word_len > max_width {
                if !current_line.is_empty() {
                    result.push(std::mem::take(&mut current_line));
                }
                let chars: Vec<char> = word.chars().collect();
                for chunk in chars.chunks(max_width) {
                    result.push(chunk.iter().collect());
                }
            } else if current_line.is_empty() {
                current_line = word.to_string();
            } else if current_len + word_len + 1 <= max_width {
                current_line.push(' ');
                current_line.push_str(word);
            } else {
                result.push(std::mem::replace(&mut current_line, word.to_string()));
            }
        }

        if !current_line.is_empty() {
            result.push(current_line);
        }
    }

    if result.is_empty() {
        result.push(String::new());
    }

    result
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wrap_short_line() {
        assert_eq!(wrap_text("hello world", 20), vec!["hello world"]);
    }

    #[test]
    fn test_wrap_at_word_boundary() {
        assert_eq!(
            wrap_text("fetching workers from pool", 12),
            vec!["fetching", "workers from", "pool"]
        );
    }

    #[test]
    fn test_wrap_breaks_long_words() {
        let url = "https://solo.ckpool.org/users/bc1q";
        let chunks = wrap_text(url, 10);
        assert!(chunks.iter().all(|c| c.chars().count() <= 10));
        assert_eq!(chunks.concat(), url);
    }

    #[test]
    fn test_wrap_keeps_newlines() {
        assert_eq!(wrap_text("a\nb", 10), vec!["a", "b"]);
        assert_eq!(wrap_text("", 10), vec![""]);
    }
}
