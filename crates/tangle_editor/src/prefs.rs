// SPDX-License-Identifier: MIT OR Apache-2.0
//! Ambient editor preferences.

use serde::{Deserialize, Serialize};

use crate::wire::WirePath;

/// User-tunable editor settings, persisted by the host as RON.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EditorPrefs {
    /// Snap dragged nodes and reroute points to the grid. A held ctrl
    /// inverts this for the duration of the drag.
    pub grid_snap: bool,
    /// Releasing a connect gesture over empty canvas opens a type-filtered
    /// creation menu.
    pub drag_to_create: bool,
    /// Scroll zoom keeps the canvas point under the pointer fixed.
    pub zoom_to_mouse: bool,
    /// Show port tooltips on hover.
    pub port_tooltips: bool,
    /// Routing style for connection wires.
    pub wire_path: WirePath,
}

impl Default for EditorPrefs {
    fn default() -> Self {
        Self {
            grid_snap: true,
            drag_to_create: true,
            zoom_to_mouse: true,
            port_tooltips: true,
            wire_path: WirePath::Curvy,
        }
    }
}

impl EditorPrefs {
    /// Serialize to pretty RON.
    pub fn to_ron(&self) -> Result<String, ron::Error> {
        ron::ser::to_string_pretty(self, ron::ser::PrettyConfig::default())
    }

    /// Deserialize from RON.
    pub fn from_ron(s: &str) -> Result<Self, ron::error::SpannedError> {
        ron::from_str(s)
    }
}
