//! Error types for graph navigation.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// The error type for reading a graph and driving its viewport.
#[derive(Debug, Error)]
pub enum NavError {
    #[error("Failed to parse graph XML: {0}")]
    Xml(#[from] roxmltree::Error),

    #[error("Document has no <svg> element")]
    MissingSvg,

    #[error("<svg> element has no graph group")]
    MissingGraphGroup,

    #[error("Graph group contains no geometry")]
    EmptyGraph,

    #[error("Node {index} has no <title>")]
    MissingTitle { index: usize },

    #[error("Node {label:?} has unsupported primitive {tag:?}")]
    UnsupportedPrimitive { label: String, tag: String },

    #[error("Node {label:?} has malformed path data near {token:?}")]
    MalformedPath { label: String, token: String },

    #[error("Node {label:?} has no sampled path points")]
    EmptyPath { label: String },

    #[error("Node {label:?} has bad ellipse attribute {attribute}")]
    BadEllipse { label: String, attribute: &'static str },

    #[error("Bounds are not finite: {0:?}")]
    InvalidBounds([[f64; 2]; 2]),

    #[error("Viewport size must be positive, got {width}x{height}")]
    InvalidViewportSize { width: f64, height: f64 },

    #[error("Node not found: {0}")]
    UnknownNode(String),

    #[error("Graph has no selectable nodes")]
    NoNodes,

    #[error("Failed to read config {path:?}: {source}")]
    ConfigIo {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Invalid config: {0}")]
    ConfigYaml(#[from] serde_yaml::Error),
}

impl NavError {
    /// Whether the error concerns one node's title or geometry only.
    pub fn is_node_local(&self) -> bool {
        matches!(
            self,
            NavError::MissingTitle { .. }
                | NavError::UnsupportedPrimitive { .. }
                | NavError::MalformedPath { .. }
                | NavError::EmptyPath { .. }
                | NavError::BadEllipse { .. }
        )
    }
}

/// A specialized Result type for navigation operations.
pub type Result<T> = std::result::Result<T, NavError>;
