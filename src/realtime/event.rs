//! # Domain Events
//!
//! The payload fanned out to subscribers.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A change notification: which module changed and what the client should do
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Event {
    module: String,
    action: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    data: Option<Value>,
}

impl Event {
    pub fn new(module: impl Into<String>, action: impl Into<String>) -> Self {
        Self {
            module: module.into(),
            action: action.into(),
            data: None,
        }
    }

    /// Attach a payload
    pub fn with_data(mut self, data: Value) -> Self {
        self.data = Some(data);
        self
    }

    pub fn module(&self) -> &str {
        &self.module
    }

    pub fn action(&self) -> &str {
        &self.action
    }

    pub fn data(&self) -> Option<&Value> {
        self.data.as_ref()
    }

    /// Frame pushed to clients
    pub fn to_wire_format(&self) -> Value {
        let mut frame = serde_json::json!({
            "type": "event",
            "module": self.module,
            "action": self.action,
        });
        if let Some(data) = &self.data {
            frame["data"] = data.clone();
        }
        frame
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_minimal_event_shape() {
        let event = Event::new("node", "list");
        let encoded = serde_json::to_value(&event).unwrap();
        assert_eq!(encoded, json!({"module": "node", "action": "list"}));
    }

    #[test]
    fn test_wire_format_with_data() {
        let event = Event::new("notice", "list").with_data(json!({"unread": 2}));
        let wire = event.to_wire_format();
        assert_eq!(wire["type"], "event");
        assert_eq!(wire["module"], "notice");
        assert_eq!(wire["action"], "list");
        assert_eq!(wire["data"]["unread"], 2);
    }

    #[test]
    fn test_wire_format_omits_missing_data() {
        let wire = Event::new("replay", "list").to_wire_format();
        assert!(wire.get("data").is_none());
    }
}
