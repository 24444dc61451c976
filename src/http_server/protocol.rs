//! Wire frames
//!
//! Client → server: `{"module": "...", "action": "...", "body": {...}}`
//!
//! Server → client replies use `Response::to_frame`; pushed events use
//! `Event::to_wire_format`.

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::auth::Session;
use crate::forum::{Forum, RequestContext};
use crate::observability::{log_event_with_fields, LogEvent};

/// One request from a client
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClientFrame {
    pub module: String,
    pub action: String,
    #[serde(default)]
    pub body: Value,
}

/// Decode a text frame, dispatch it, and build the reply frame
pub fn handle_text(forum: &Forum, session: &Session, client_ip: &str, text: &str) -> Value {
    let frame: ClientFrame = match serde_json::from_str(text) {
        Ok(frame) => frame,
        Err(e) => {
            log_event_with_fields(
                LogEvent::RequestMalformed,
                &[("client", client_ip), ("reason", &e.to_string())],
            );
            return malformed(&e.to_string());
        }
    };

    let ctx = RequestContext::new(session, client_ip);
    forum
        .dispatch(&ctx, &frame.module, &frame.action, &frame.body)
        .to_frame(&frame.module, &frame.action)
}

/// Failure frame for input that never reached a module
pub fn malformed(reason: &str) -> Value {
    failure(&format!("Malformed request: {}", reason))
}

/// Failure frame not tied to any module action
pub fn failure(message: &str) -> Value {
    json!({
        "type": "failure",
        "module": "",
        "action": "",
        "message": message,
    })
}
