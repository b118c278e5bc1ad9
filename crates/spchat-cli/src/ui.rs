//! Terminal UI utilities for the shell

use colored::*;
use crossterm::{
    event::{self, Event, KeyCode},
    terminal::{disable_raw_mode, enable_raw_mode, size},
};
use std::io::{self, IsTerminal, Write};

use spchat_core::{Document, Error, Message, Result, Role};

/// Display startup banner
pub fn display_banner() {
    let terminal_width = size().map(|(w, _)| w as usize).unwrap_or(80);
    let banner_width = std::cmp::min(60, terminal_width.saturating_sub(4));

    let top_border = format!("┌{}┐", "─".repeat(banner_width - 2));
    let bottom_border = format!("└{}┘", "─".repeat(banner_width - 2));
    let empty_line = format!("│{}│", " ".repeat(banner_width - 2));

    println!();
    println!("{}", top_border.blue());
    println!("{}", empty_line.blue());

    let title = "spchat - SharePoint RAG Chat";
    let title_line = format!(
        "│  {}{}│",
        title.blue().bold(),
        " ".repeat(banner_width.saturating_sub(title.len() + 4))
    );
    println!("{}", title_line);
    println!("{}", empty_line.blue());
    println!("{}", bottom_border.blue());
    println!();
    println!(
        "{}",
        "Type 'connect' to index a SharePoint site, then ask questions. 'help' lists commands."
            .dimmed()
    );
    println!();
}

/// Handle input with command history navigation
pub async fn handle_input_with_history(history: &mut Vec<String>) -> Result<String> {
    // Piped input: read a plain line from stdin.
    if !io::stdin().is_terminal() {
        let mut input = String::new();
        io::stdin().read_line(&mut input)?;
        let input = input.trim().to_string();
        if !input.is_empty() {
            history.push(input.clone());
        }
        return Ok(input);
    }

    enable_raw_mode()?;
    let mut input = String::new();
    let mut history_index: Option<usize> = None;
    let mut cursor_pos = 0;

    print!("{} ", "spchat>".green().bold());
    io::stdout().flush()?;

    loop {
        if let Event::Key(key_event) = event::read()? {
            match key_event.code {
                KeyCode::Enter => {
                    disable_raw_mode()?;
                    println!();
                    if !input.is_empty() {
                        history.push(input.clone());
                    }
                    return Ok(input);
                }
                KeyCode::Char(c) => {
                    cursor_pos = insert_at(&mut input, cursor_pos, c);
                    print!("\r{} {}", "spchat>".green().bold(), input);
                    io::stdout().flush()?;
                }
                KeyCode::Backspace => {
                    if let Some(new_pos) = remove_before(&mut input, cursor_pos) {
                        cursor_pos = new_pos;
                        print!(
                            "\r{} {}  \r{} {}",
                            "spchat>".green().bold(),
                            input,
                            "spchat>".green().bold(),
                            input
                        );
                        io::stdout().flush()?;
                    }
                }
                KeyCode::Up => {
                    if !history.is_empty() {
                        let new_index = match history_index {
                            None => history.len() - 1,
                            Some(idx) if idx > 0 => idx - 1,
                            Some(idx) => idx,
                        };
                        history_index = Some(new_index);
                        input = history[new_index].clone();
                        cursor_pos = input.len();
                        print!(
                            "\r{} {}  \r{} {}",
                            "spchat>".green().bold(),
                            " ".repeat(50),
                            "spchat>".green().bold(),
                            input
                        );
                        io::stdout().flush()?;
                    }
                }
                KeyCode::Down => {
                    if let Some(idx) = history_index {
                        if idx < history.len() - 1 {
                            let new_index = idx + 1;
                            history_index = Some(new_index);
                            input = history[new_index].clone();
                        } else {
                            history_index = None;
                            input.clear();
                        }
                        cursor_pos = input.len();
                        print!(
                            "\r{} {}  \r{} {}",
                            "spchat>".green().bold(),
                            " ".repeat(50),
                            "spchat>".green().bold(),
                            input
                        );
                        io::stdout().flush()?;
                    }
                }
                KeyCode::Esc => {
                    disable_raw_mode()?;
                    println!();
                    return Ok(String::new());
                }
                _ => {}
            }
        }
    }
}

/// Insert a character at the cursor's byte offset; returns the new offset.
/// The cursor is tracked in bytes because `String` edits take byte indices
/// and multibyte input (accents, CJK) would otherwise land off-boundary.
fn insert_at(input: &mut String, cursor: usize, c: char) -> usize {
    input.insert(cursor, c);
    cursor + c.len_utf8()
}

/// Remove the character before the cursor's byte offset; returns the new
/// offset, or None when the cursor is at the start
fn remove_before(input: &mut String, cursor: usize) -> Option<usize> {
    let (idx, _) = input[..cursor].char_indices().next_back()?;
    input.remove(idx);
    Some(idx)
}

/// Prompt for a credential value with an environment-sourced default
pub fn prompt_credential(label: &str, default: &str) -> Result<String> {
    if default.is_empty() {
        print!("{}: ", label.bold());
    } else {
        print!("{} [{}]: ", label.bold(), default);
    }
    io::stdout().flush()?;

    let mut value = String::new();
    io::stdin().read_line(&mut value)?;
    let value = value.trim();

    if value.is_empty() {
        Ok(default.to_string())
    } else {
        Ok(value.to_string())
    }
}

/// Prompt for a secret, echoing asterisks instead of the typed characters
pub fn prompt_secret(label: &str, has_default: bool) -> Result<String> {
    if has_default {
        print!("{} [keep current]: ", label.bold());
    } else {
        print!("{}: ", label.bold());
    }
    io::stdout().flush()?;

    if !io::stdin().is_terminal() {
        let mut value = String::new();
        io::stdin().read_line(&mut value)?;
        return Ok(value.trim().to_string());
    }

    enable_raw_mode()?;
    let mut value = String::new();

    loop {
        if let Event::Key(key_event) = event::read()? {
            match key_event.code {
                KeyCode::Enter => {
                    disable_raw_mode()?;
                    println!();
                    return Ok(value);
                }
                KeyCode::Char(c) => {
                    value.push(c);
                    print!("*");
                    io::stdout().flush()?;
                }
                KeyCode::Backspace => {
                    if value.pop().is_some() {
                        print!("\u{8} \u{8}");
                        io::stdout().flush()?;
                    }
                }
                KeyCode::Esc => {
                    disable_raw_mode()?;
                    println!();
                    return Ok(String::new());
                }
                _ => {}
            }
        }
    }
}

/// Display help message
pub fn print_help() {
    println!("{}", "Available commands:".bold());
    println!(
        "  {} - Enter credentials, fetch and index the site's documents",
        "connect".green()
    );
    println!("  {} - List the indexed document names", "docs".green());
    println!("  {} - Show this help message", "help".green());
    println!("  {} - Exit the application", "exit/quit".green());
    println!();
    println!("{}", "Anything else is asked as a question, e.g.:".bold());
    println!("  What is the vacation policy?");
    println!("  Who approves expense reports?");
}

/// Print a waiting/progress status line
pub fn print_status(text: &str) {
    println!("{} {}", "⏳".yellow(), text.dimmed());
}

/// Print an inline error, with a retry hint for transient failures
pub fn print_error(err: &Error) {
    println!("{} {}", "❌".red(), err.to_string().red());
    if err.is_retryable() {
        println!("{}", "   This looks transient; try the action again.".dimmed());
    }
}

/// Render one conversation message, sources bulleted after assistant turns
pub fn print_message(message: &Message) {
    match message.role {
        Role::User => println!("{} {}", "you>".cyan().bold(), message.content),
        Role::Assistant => {
            println!("{} {}", "bot>".magenta().bold(), message.content);
            if !message.sources.is_empty() {
                println!("{}", "Sources:".bold());
                for source in &message.sources {
                    println!("  {} {}", "•".magenta(), source);
                }
            }
        }
    }
}

/// List indexed documents
pub fn print_documents(documents: &[Document]) {
    if documents.is_empty() {
        println!("{}", "No documents indexed yet.".dimmed());
        return;
    }

    println!("{}", format!("Indexed documents ({}):", documents.len()).bold());
    for document in documents {
        println!("  {} {}", "•".green(), document.name);
    }
}
