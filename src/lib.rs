//! agora - a forum backend built on a declarative mutation pipeline
//!
//! Layers, leaf-first:
//! - `schema`: entity descriptors and the validation gate
//! - `storage`: document store collaborator (`MemoryStore`)
//! - `realtime`: event bus fanning out change notifications
//! - `mutation`: projection and the executor (validate → project → persist → publish)
//! - `model`: forum entities (node, user, topic, replay, notice)
//! - `auth`: password hashing and connection sessions
//! - `forum`: module actions and request dispatch
//! - `http_server`: axum WebSocket transport
//! - `cli`: configuration and process startup

pub mod auth;
pub mod cli;
pub mod forum;
pub mod http_server;
pub mod model;
pub mod mutation;
pub mod observability;
pub mod realtime;
pub mod schema;
pub mod storage;
