//! Scene configuration

use std::fs;
use std::path::Path;

use glam::Vec3;
use serde::{Deserialize, Serialize};

use super::error::SceneError;

/// Scene configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SceneConfig {
    /// Scene name, used in logs
    pub name: String,
    /// Pre-allocated node slots
    pub node_capacity: usize,
    /// Color of the default material
    pub default_color: Vec3,
    /// Render children of live nodes, not just the top-level nodes
    pub recursive_render: bool,
}

impl Default for SceneConfig {
    fn default() -> Self {
        Self {
            name: String::from("Untitled"),
            node_capacity: 256,
            default_color: Vec3::splat(0.8),
            recursive_render: true,
        }
    }
}

impl SceneConfig {
    /// Set the scene name
    #[must_use]
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Set the number of pre-allocated node slots
    #[must_use]
    pub fn with_node_capacity(mut self, capacity: usize) -> Self {
        self.node_capacity = capacity;
        self
    }

    /// Set the default material color
    #[must_use]
    pub fn with_default_color(mut self, color: Vec3) -> Self {
        self.default_color = color;
        self
    }

    /// Enable or disable rendering of child nodes
    #[must_use]
    pub fn with_recursive_render(mut self, recursive: bool) -> Self {
        self.recursive_render = recursive;
        self
    }

    /// Parse a configuration from RON text. Missing fields keep their defaults.
    ///
    /// # Errors
    ///
    /// Returns an error if the text is not a valid configuration
    pub fn from_ron_str(text: &str) -> Result<Self, SceneError> {
        ron::from_str(text).map_err(|e| SceneError::DeserializeError(e.to_string()))
    }

    /// Load a configuration from a RON file
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or deserialization fails
    pub fn load_ron(path: impl AsRef<Path>) -> Result<Self, SceneError> {
        let content = fs::read_to_string(path).map_err(|e| SceneError::IoError(e.to_string()))?;
        Self::from_ron_str(&content)
    }
}
