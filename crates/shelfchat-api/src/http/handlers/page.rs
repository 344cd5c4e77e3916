//! GET / - the chat page.

use axum::extract::State;
use axum::response::Html;

use crate::state::AppState;

const INDEX_HTML: &str = include_str!("../../../assets/index.html");

/// Serve the single-page chat UI with the configured title and placeholder.
pub async fn index(State(state): State<AppState>) -> Html<String> {
    Html(render_index(&state.config.title, &state.config.input_placeholder))
}

fn render_index(title: &str, placeholder: &str) -> String {
    INDEX_HTML
        .replace("{{title}}", &escape_html(title))
        .replace("{{placeholder}}", &escape_html(placeholder))
}

fn escape_html(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            other => out.push(other),
        }
    }
    out
}
