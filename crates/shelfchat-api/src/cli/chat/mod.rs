//! Interactive terminal chat.
//!
//! Streams replies as they arrive, re-renders the finished reply as
//! markdown and offers a few slash commands. Entry point:
//! `loop_runner::run_chat_loop`.

pub mod banner;
pub mod commands;
pub mod input;
pub mod loop_runner;
pub mod renderer;
