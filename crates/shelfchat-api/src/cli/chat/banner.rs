//! Welcome banner for terminal sessions.

use console::style;

/// Print the title, model and how much history was restored.
pub fn print_welcome_banner(title: &str, model: &str, message_count: usize) {
    println!();
    println!("  {} {}", "🤖", style(title).cyan().bold());
    println!();
    println!("  {}  {}", style("Model:").bold(), style(model).dim());
    if message_count > 0 {
        println!(
            "  {}  {}",
            style("History:").bold(),
            style(format!("{message_count} messages restored")).dim()
        );
    }
    println!();
    println!(
        "  {}",
        style("Type /help for commands, Ctrl+D to exit").dim()
    );
    println!("  {}", style("---").dim());
    println!();
}
