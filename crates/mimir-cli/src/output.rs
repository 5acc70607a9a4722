use chrono::{DateTime, Utc};
use comfy_table::{ContentArrangement, Table, presets::UTF8_FULL_CONDENSED};
use mimir::memory::Role;
use mimir::session::{MemorySnapshot, PersistedFiles};

use crate::commands::COMMANDS;
use crate::error::CliResult;

#[derive(Clone, Copy, Debug, Default)]
pub enum OutputFormat {
    #[default]
    Table,
    Json,
}

pub fn truncate_string(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max_len.saturating_sub(3)).collect();
        format!("{kept}...")
    }
}

pub fn format_timestamp(dt: &DateTime<Utc>) -> String {
    dt.format("%Y-%m-%d %H:%M").to_string()
}

/// Dump both memories
pub fn print_memory(
    snapshot: &MemorySnapshot,
    nick: &str,
    ai_prefix: &str,
    format: OutputFormat,
) -> CliResult<()> {
    match format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(snapshot)?);
        }
        OutputFormat::Table => {
            println!("{}", short_term_table(snapshot, nick, ai_prefix));
            println!(
                "Short-term: {} of {} messages\n",
                snapshot.short_term.len(),
                snapshot.short_term.capacity()
            );

            if snapshot.facts.is_empty() {
                println!("No long-term facts yet.");
            } else {
                println!("{}", long_term_table(snapshot));
            }
            println!(
                "Long-term: {} entities, {} facts",
                snapshot.entities.len(),
                snapshot.facts.len()
            );
        }
    }
    Ok(())
}

fn short_term_table(snapshot: &MemorySnapshot, nick: &str, ai_prefix: &str) -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL_CONDENSED)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(["Time", "Speaker", "Message"]);

    for message in snapshot.short_term.messages() {
        let speaker = match message.role {
            Role::Human => nick,
            Role::Ai => ai_prefix,
        };
        table.add_row([
            format_timestamp(&message.timestamp),
            speaker.to_string(),
            truncate_string(&message.content, 120),
        ]);
    }
    table
}

fn long_term_table(snapshot: &MemorySnapshot) -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL_CONDENSED)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(["Subject", "Relation", "Object"]);

    for fact in &snapshot.facts {
        table.add_row([&fact.subject, &fact.predicate, &fact.object]);
    }
    table
}

pub fn print_saved(files: &PersistedFiles, format: OutputFormat) -> CliResult<()> {
    match format {
        OutputFormat::Json => {
            let output = serde_json::json!({
                "short_term": files.short_term.display().to_string(),
                "long_term": files.long_term.display().to_string(),
            });
            println!("{}", serde_json::to_string_pretty(&output)?);
        }
        OutputFormat::Table => {
            println!("Memory saved to:");
            println!("  {}", files.short_term.display());
            println!("  {}", files.long_term.display());
        }
    }
    Ok(())
}

pub fn print_help() {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL_CONDENSED)
        .set_header(["Command", "Description"]);
    for (aliases, description) in COMMANDS {
        table.add_row([*aliases, *description]);
    }
    println!("{table}");
    println!("Anything else is said to the Dungeon Master.");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate_string() {
        assert_eq!(truncate_string("short", 10), "short");
        assert_eq!(truncate_string("a goblin appears", 10), "a gobli...");
    }

    #[test]
    fn test_truncate_string_is_char_safe() {
        assert_eq!(truncate_string("Ærgræðgi fjörður", 8), "Ærgræ...");
    }

    #[test]
    fn test_format_timestamp() {
        let dt = DateTime::parse_from_rfc3339("2024-03-05T17:04:09Z")
            .unwrap()
            .with_timezone(&Utc);
        assert_eq!(format_timestamp(&dt), "2024-03-05 17:04");
    }
}
