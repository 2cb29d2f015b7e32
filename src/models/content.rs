//! Content node model
//!
//! The content-tree node supplied by the host repository. The node itself is
//! opaque to this crate; only the id participates in cache key construction.

use serde::{Deserialize, Serialize};

/// A node in the host's content tree.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContentNode {
    /// Unique page id within the content tree
    pub id: i32,
    /// Node name as shown in the content editor
    pub name: String,
    /// URL path of the node
    pub path: String,
}

impl ContentNode {
    /// Creates a new ContentNode.
    pub fn new(id: i32, name: impl Into<String>, path: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            path: path.into(),
        }
    }
}
