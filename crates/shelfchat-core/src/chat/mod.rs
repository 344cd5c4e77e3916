//! Chat session: history persistence, completion relay, session controller.

pub mod history;
pub mod relay;
pub mod session;
