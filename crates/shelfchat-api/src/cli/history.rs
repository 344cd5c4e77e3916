//! `shelfchat history show|clear` - the persisted record without a UI.

use anyhow::Result;
use comfy_table::{Cell, Color, ContentArrangement, Table, presets};
use console::style;
use dialoguer::Confirm;

use shelfchat_core::chat::history::HistoryStore;
use shelfchat_core::storage::kv_store::KvStore;
use shelfchat_types::chat::{Message, Role};

/// Longest content shown per table cell.
const PREVIEW_CHARS: usize = 120;

/// Print the persisted conversation, optionally only its last `limit` messages.
pub async fn show_history<K: KvStore>(
    history: &HistoryStore<K>,
    limit: Option<usize>,
    json: bool,
) -> Result<()> {
    let messages = history.load().await?;
    let summary = history.summary().await?;
    let shown = tail(&messages, limit);

    if json {
        let out = serde_json::json!({
            "message_count": summary.message_count,
            "updated_at": summary.updated_at,
            "messages": shown,
        });
        println!("{}", serde_json::to_string_pretty(&out)?);
        return Ok(());
    }

    if messages.is_empty() {
        println!();
        println!("  {}", style("No chat history.").dim());
        println!();
        return Ok(());
    }

    let mut table = Table::new();
    table.load_preset(presets::UTF8_FULL_CONDENSED);
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(vec![
        Cell::new("#").fg(Color::White),
        Cell::new("Role").fg(Color::White),
        Cell::new("Content").fg(Color::White),
    ]);

    let offset = messages.len() - shown.len();
    for (i, msg) in shown.iter().enumerate() {
        let color = match msg.role {
            Role::User => Color::Green,
            Role::Assistant => Color::Cyan,
        };
        let role = Cell::new(format!("{} {}", msg.role.avatar(), msg.role)).fg(color);
        table.add_row(vec![
            Cell::new(offset + i + 1).fg(Color::DarkGrey),
            role,
            Cell::new(preview(&msg.content, PREVIEW_CHARS)),
        ]);
    }

    println!();
    println!("{table}");
    let updated = summary
        .updated_at
        .map(|t| t.format("%Y-%m-%d %H:%M:%S UTC").to_string())
        .unwrap_or_else(|| "never".to_string());
    println!(
        "  {} messages, last saved {}",
        style(summary.message_count).bold(),
        style(updated).dim()
    );
    println!();
    Ok(())
}

/// Persist the empty conversation, asking first unless `force`.
pub async fn clear_history<K: KvStore>(
    history: &HistoryStore<K>,
    force: bool,
    json: bool,
) -> Result<()> {
    if !force && !json {
        let confirmed = Confirm::new()
            .with_prompt("Delete the entire chat history?")
            .default(false)
            .interact()?;

        if !confirmed {
            println!("  Cancelled.");
            return Ok(());
        }
    }

    history.clear().await?;

    if json {
        println!("{}", serde_json::json!({ "cleared": true }));
    } else {
        println!("  {} Chat history deleted.", style("✓").red().bold());
    }
    Ok(())
}

fn tail(messages: &[Message], limit: Option<usize>) -> &[Message] {
    match limit {
        Some(n) if n < messages.len() => &messages[messages.len() - n..],
        _ => messages,
    }
}

/// Single-line preview cut at a char boundary.
pub(crate) fn preview(content: &str, max_chars: usize) -> String {
    let flat = content.replace('\n', " ");
    if flat.chars().count() <= max_chars {
        return flat;
    }
    let cut: String = flat.chars().take(max_chars.saturating_sub(3)).collect();
    format!("{cut}...")
}
