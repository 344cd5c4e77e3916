//! HTTP layer for shelfchat.
//!
//! Serves the single chat page at `/` and a small JSON/SSE API under
//! `/api/v1/` with the envelope response format.

pub mod error;
pub mod handlers;
pub mod markdown;
pub mod response;
pub mod router;
