//! Session-scoped defaults for optional data sources.

use serde::{Deserialize, Serialize};

/// Per-session boolean defaults for optional data sources.
///
/// Each toggle applies when a tool invocation does not set the corresponding
/// field explicitly; everything defaults to enabled.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionDefaults {
    /// Include the head camera in observations.
    pub head_camera: bool,
    /// Include the wrist camera in observations.
    pub wrist_camera: bool,
}

impl Default for SessionDefaults {
    fn default() -> Self {
        Self {
            head_camera: true,
            wrist_camera: true,
        }
    }
}

impl SessionDefaults {
    /// Apply per-call overrides on top of the session defaults.
    #[must_use]
    pub fn overlaid(self, overrides: &SourceOverrides) -> Self {
        Self {
            head_camera: overrides.head_camera.unwrap_or(self.head_camera),
            wrist_camera: overrides.wrist_camera.unwrap_or(self.wrist_camera),
        }
    }
}

/// Per-call overrides of the session defaults; unset fields inherit.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SourceOverrides {
    /// Override for the head camera toggle.
    pub head_camera: Option<bool>,
    /// Override for the wrist camera toggle.
    pub wrist_camera: Option<bool>,
}
