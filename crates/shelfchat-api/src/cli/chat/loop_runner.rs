//! Terminal chat loop.
//!
//! Holds the session lock for the whole run. Each prompt runs one turn while
//! the updates it emits are drawn concurrently: a spinner until the first
//! fragment, raw fragments as they arrive, then the finished reply again as
//! markdown.

use std::time::Duration;

use console::{Term, measure_text_width, style};
use crossterm::style::Color;
use crossterm::{cursor, execute, terminal};
use indicatif::{ProgressBar, ProgressStyle};
use tokio::sync::mpsc;

use shelfchat_types::chat::{Message, Role, TurnUpdate};

use crate::cli::history::preview;
use crate::state::{AppState, ConcreteSession};

use super::banner::print_welcome_banner;
use super::commands::{self, ChatCommand};
use super::input::{ChatInput, InputEvent};
use super::renderer::ChatRenderer;

const UPDATE_BUFFER: usize = 64;

/// Prefix printed before streamed assistant text.
const REPLY_PREFIX: &str = "  🤖 ";

/// Run the interactive chat until `/exit` or Ctrl+D.
pub async fn run_chat_loop(state: &AppState) -> anyhow::Result<()> {
    let mut session = state.session.lock().await;

    if let Some(reason) = session.status().halted_reason() {
        anyhow::bail!("{reason}");
    }

    let renderer = ChatRenderer::new(Color::Cyan);
    print_welcome_banner(&state.config.title, session.model(), session.messages().len());
    for message in session.messages() {
        print_message(&renderer, message);
    }

    let prompt = format!("  {} ", style("👤 >").green().bold());
    let (mut chat_input, _writer) = ChatInput::new(prompt)
        .map_err(|e| anyhow::anyhow!("Failed to initialize input: {e}"))?;

    loop {
        match chat_input.read_line().await {
            InputEvent::Eof => {
                println!("\n  {}", style("Session ended.").dim());
                break;
            }
            InputEvent::Interrupted => {
                println!("\n  {}", style("Press Ctrl+D to exit, or keep chatting.").dim());
            }
            InputEvent::Message(text) => {
                if text.is_empty() {
                    continue;
                }

                let _cooked = CookedMode::enter();
                match commands::parse(&text) {
                    Some(ChatCommand::Help) => commands::print_help(),
                    Some(ChatCommand::Clear) => {
                        session.clear().await?;
                        println!("\n  {} Chat history deleted.\n", style("✓").red().bold());
                    }
                    Some(ChatCommand::History) => print_history(session.messages()),
                    Some(ChatCommand::Exit) => {
                        println!("\n  {}", style("Session ended.").dim());
                        break;
                    }
                    Some(ChatCommand::Unknown(name)) => {
                        println!(
                            "\n  {} Unknown command: {}. Type /help for available commands.\n",
                            style("?").yellow().bold(),
                            style(name).dim()
                        );
                    }
                    None => run_turn(&mut session, &renderer, &text).await?,
                }
            }
        }
    }

    chat_input.flush();
    Ok(())
}

/// One turn: submit and draw its updates side by side.
async fn run_turn(
    session: &mut ConcreteSession,
    renderer: &ChatRenderer,
    prompt: &str,
) -> anyhow::Result<()> {
    let (tx, mut rx) = mpsc::channel(UPDATE_BUFFER);
    let spinner = thinking_spinner();

    let display = async {
        let mut streamed = String::new();
        let mut failure = None;
        while let Some(update) = rx.recv().await {
            match update {
                TurnUpdate::Partial { delta, .. } => {
                    if streamed.is_empty() {
                        spinner.finish_and_clear();
                        print!("\n{REPLY_PREFIX}");
                    }
                    renderer.print_streaming_token(&delta);
                    streamed.push_str(&delta);
                }
                TurnUpdate::Failed { error } => failure = Some(error),
                TurnUpdate::User(_) | TurnUpdate::Completed(_) => {}
            }
        }
        spinner.finish_and_clear();
        (streamed, failure)
    };

    let (result, (streamed, failure)) = tokio::join!(session.submit(prompt, tx), display);

    if !streamed.is_empty() {
        println!();
        erase_streamed(&streamed);
    }
    if let Some(error) = failure {
        eprintln!(
            "\n  {} Error from OpenAI API: {error}",
            style("!").red().bold()
        );
    }

    let reply = result?;
    print_message(renderer, &reply);
    Ok(())
}

fn thinking_spinner() -> ProgressBar {
    let spinner = ProgressBar::new_spinner();
    if let Ok(s) = ProgressStyle::default_spinner().template("  {spinner:.cyan} {msg}") {
        spinner.set_style(s);
    }
    spinner.set_message("thinking...");
    spinner.enable_steady_tick(Duration::from_millis(80));
    spinner
}

/// Remove the raw streamed text so the rendered reply replaces it.
///
/// Only on a real terminal; piped output keeps both.
fn erase_streamed(streamed: &str) {
    let term = Term::stdout();
    if !term.is_term() {
        return;
    }
    let (cols, _) = terminal::size().unwrap_or((80, 24));
    let rows = rows_used(&format!("\n{REPLY_PREFIX}{streamed}"), cols);
    let mut out = std::io::stdout();
    let _ = execute!(
        out,
        cursor::MoveToPreviousLine(rows),
        terminal::Clear(terminal::ClearType::FromCursorDown)
    );
}

/// Terminal rows taken by `text` at width `cols`.
fn rows_used(text: &str, cols: u16) -> u16 {
    let cols = usize::from(cols.max(1));
    let rows: usize = text
        .split('\n')
        .map(|line| measure_text_width(line).div_ceil(cols).max(1))
        .sum();
    u16::try_from(rows).unwrap_or(u16::MAX)
}

fn print_message(renderer: &ChatRenderer, message: &Message) {
    match message.role {
        Role::User => println!(
            "\n  {} {}",
            message.role.avatar(),
            style(&message.content).green()
        ),
        Role::Assistant => {
            let rendered = renderer.render_final(&message.content);
            println!("\n  {} {}\n", message.role.avatar(), rendered.trim());
        }
    }
}

fn print_history(messages: &[Message]) {
    println!();
    if messages.is_empty() {
        println!("  {}", style("No messages yet.").dim());
    }
    for message in messages {
        println!(
            "  {} {}",
            message.role.avatar(),
            preview(&message.content, 100)
        );
    }
    println!();
}

/// Cooked terminal mode while output is printed outside the readline prompt.
struct CookedMode;

impl CookedMode {
    fn enter() -> Self {
        let _ = terminal::disable_raw_mode();
        Self
    }
}

impl Drop for CookedMode {
    fn drop(&mut self) {
        if Term::stdout().is_term() {
            let _ = terminal::enable_raw_mode();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rows_used_counts_wrapped_lines() {
        assert_eq!(rows_used("abc", 80), 1);
        assert_eq!(rows_used("", 80), 1);
        assert_eq!(rows_used("\nabc", 80), 2);
        assert_eq!(rows_used(&"x".repeat(81), 80), 2);
        assert_eq!(rows_used(&"x".repeat(160), 80), 2);
    }

    #[test]
    fn test_rows_used_zero_width_terminal() {
        assert_eq!(rows_used("abc", 0), 3);
    }
}
