//! Wire frames exchanged with the actuation surface.
//!
//! Both directions carry JSON objects over the shared connection:
//!
//! ```text
//! bridge → robot: {"type":"command","id":7,"action":"walk_to","params":{...}}
//! robot → bridge: {"type":"command_result","id":7,"result":{...}}
//! ```

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A frame on the robot link, either direction.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Frame {
    /// Outgoing command tagged with a correlation id.
    Command {
        /// Correlation id; strictly increasing per process.
        id: u64,
        /// Abstract action name.
        action: String,
        /// Action parameters.
        params: Value,
    },
    /// Incoming result matched back to its command by id.
    CommandResult {
        /// Correlation id of the answered command.
        id: u64,
        /// Result payload.
        result: Value,
    },
}

impl Frame {
    /// Parse a frame from its JSON text representation.
    pub fn parse(text: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(text)
    }

    /// Serialize to JSON text.
    ///
    /// Frame fields are plain JSON values, so serialization cannot fail.
    #[must_use]
    pub fn to_json(&self) -> String {
        serde_json::to_string(self).expect("frame serialization is infallible")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn command_wire_shape() {
        let frame = Frame::Command {
            id: 7,
            action: "walk_to".into(),
            params: json!({"x": 1.0, "y": 2.0}),
        };
        let v: Value = serde_json::from_str(&frame.to_json()).unwrap();
        assert_eq!(v["type"], "command");
        assert_eq!(v["id"], 7);
        assert_eq!(v["action"], "walk_to");
        assert_eq!(v["params"]["x"], 1.0);
    }

    #[test]
    fn command_result_parses() {
        let frame =
            Frame::parse(r#"{"type":"command_result","id":3,"result":{"ok":true}}"#).unwrap();
        match frame {
            Frame::CommandResult { id, result } => {
                assert_eq!(id, 3);
                assert_eq!(result["ok"], true);
            }
            other => panic!("expected command_result, got {other:?}"),
        }
    }

    #[test]
    fn unknown_type_is_rejected() {
        assert!(Frame::parse(r#"{"type":"telemetry","id":1}"#).is_err());
        assert!(Frame::parse("not json").is_err());
    }

    #[test]
    fn round_trip() {
        let frame = Frame::CommandResult {
            id: 42,
            result: json!({"grasped": "cup"}),
        };
        assert_eq!(Frame::parse(&frame.to_json()).unwrap(), frame);
    }
}
