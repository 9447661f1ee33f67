//! Static tool catalog.
//!
//! Every operation the model can request, with its argument schema. The
//! catalog is fixed and versionless: the same set is sent with every turn.

use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

/// Default per-command timeout budget.
pub const DEFAULT_COMMAND_TIMEOUT_MS: u64 = 10_000;

/// `walk_to` runs a multi-phase remote operation (plan, walk, settle), so its
/// budget is a fixed multiple of the default.
pub const WALK_TIMEOUT_MULTIPLIER: u64 = 6;

/// One catalog entry: name, human-readable description, argument schema.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ToolSpec {
    /// Operation name, matching the relay action.
    pub name: String,
    /// Description shown to the model.
    pub description: String,
    /// JSON Schema for the arguments.
    pub parameters: ToolParameterSchema,
}

/// JSON Schema subset used for tool parameters.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ToolParameterSchema {
    /// Always `"object"`.
    #[serde(rename = "type")]
    pub schema_type: String,
    /// Property name → schema fragment.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub properties: Option<serde_json::Map<String, Value>>,
    /// Names of required properties.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub required: Option<Vec<String>>,
}

/// Fluent builder for [`ToolSpec`] schemas.
struct SpecBuilder {
    name: String,
    description: String,
    properties: serde_json::Map<String, Value>,
    required: Vec<String>,
}

impl SpecBuilder {
    fn new(name: &str, description: &str) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            properties: serde_json::Map::new(),
            required: Vec::new(),
        }
    }

    fn property(mut self, name: &str, schema: Value) -> Self {
        let _ = self.properties.insert(name.into(), schema);
        self
    }

    fn required_property(mut self, name: &str, schema: Value) -> Self {
        let _ = self.properties.insert(name.into(), schema);
        self.required.push(name.into());
        self
    }

    fn build(self) -> ToolSpec {
        ToolSpec {
            name: self.name,
            description: self.description,
            parameters: ToolParameterSchema {
                schema_type: "object".into(),
                properties: if self.properties.is_empty() {
                    None
                } else {
                    Some(self.properties)
                },
                required: if self.required.is_empty() {
                    None
                } else {
                    Some(self.required)
                },
            },
        }
    }
}

/// The fixed set of operations exposed to the model every turn.
#[must_use]
pub fn catalog() -> Vec<ToolSpec> {
    vec![
        SpecBuilder::new(
            "observe_scene",
            "Capture the robot's current observation of the scene: camera images plus \
             detected objects and the robot's own pose. Use this before acting on \
             anything you have not seen recently.",
        )
        .property(
            "sources",
            json!({
                "type": "object",
                "description": "Which data sources to include. Each defaults to enabled.",
                "properties": {
                    "head_camera": {"type": "boolean", "description": "Include the head camera image"},
                    "wrist_camera": {"type": "boolean", "description": "Include the wrist camera image"}
                }
            }),
        )
        .build(),
        SpecBuilder::new("move_head", "Pan and tilt the robot's head to look around.")
            .required_property(
                "pan_degrees",
                json!({"type": "number", "description": "Horizontal angle, positive is left"}),
            )
            .required_property(
                "tilt_degrees",
                json!({"type": "number", "description": "Vertical angle, positive is up"}),
            )
            .build(),
        SpecBuilder::new(
            "walk_to",
            "Walk to a target position on the floor plane. This is a long-running \
             operation: the robot plans a path, walks it, and settles into balance.",
        )
        .required_property(
            "x",
            json!({"type": "number", "description": "Target x in meters, robot frame"}),
        )
        .required_property(
            "y",
            json!({"type": "number", "description": "Target y in meters, robot frame"}),
        )
        .property(
            "heading_degrees",
            json!({"type": "number", "description": "Final heading; defaults to facing the walk direction"}),
        )
        .build(),
        SpecBuilder::new(
            "grasp_object",
            "Close a gripper on a named object visible in the scene.",
        )
        .required_property(
            "object",
            json!({"type": "string", "description": "Object label from observe_scene"}),
        )
        .property(
            "hand",
            json!({"type": "string", "enum": ["left", "right"], "description": "Which hand; defaults to right"}),
        )
        .build(),
        SpecBuilder::new("release_object", "Open a gripper, releasing whatever it holds.")
            .property(
                "hand",
                json!({"type": "string", "enum": ["left", "right"], "description": "Which hand; defaults to right"}),
            )
            .build(),
        SpecBuilder::new("set_posture", "Move the whole body into a named posture.")
            .required_property(
                "posture",
                json!({"type": "string", "enum": ["stand", "crouch", "sit"]}),
            )
            .build(),
        SpecBuilder::new("say", "Speak text through the robot's speaker.")
            .required_property("text", json!({"type": "string", "description": "What to say"}))
            .build(),
    ]
}

/// Look up a catalog entry by name.
#[must_use]
pub fn find(name: &str) -> Option<ToolSpec> {
    catalog().into_iter().find(|spec| spec.name == name)
}

/// Timeout budget for the named tool, derived from the configured base.
#[must_use]
pub fn timeout_ms_for(name: &str, base_ms: u64) -> u64 {
    if name == "walk_to" {
        base_ms * WALK_TIMEOUT_MULTIPLIER
    } else {
        base_ms
    }
}
