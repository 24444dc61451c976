//! # HTTP Server
//!
//! axum server exposing the forum over WebSocket.
//!
//! # Endpoints
//!
//! - `/health` - Health check
//! - `/ws` - One WebSocket per client: request/reply frames plus live events

pub mod config;
pub mod protocol;
pub mod server;
mod ws;

pub use config::HttpServerConfig;
pub use protocol::ClientFrame;
pub use server::{AppState, HttpServer};
