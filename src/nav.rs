//! One-shot setup tying the graph, its node index, the selector and the
//! viewport together.

use std::fs;
use std::path::Path;

use serde::Deserialize;
use tracing::info;

use crate::error::{NavError, Result};
use crate::geometry::{overlay_bounds, BBox, LatLngBounds};
use crate::index::NodeIndex;
use crate::selector::{Selector, DEFAULT_PREFERRED_LABELS};
use crate::svg::{find_svg, graph_extent, graph_group, parse_document};
use crate::viewport::{Camera, Flight, Viewport, ViewportOptions};

#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct NavConfig {
    pub viewport: ViewportOptions,
    pub preferred_labels: Vec<String>,
    pub skip_invalid_nodes: bool,
}

impl Default for NavConfig {
    fn default() -> Self {
        Self {
            viewport: ViewportOptions::default(),
            preferred_labels: DEFAULT_PREFERRED_LABELS
                .iter()
                .map(|label| label.to_string())
                .collect(),
            skip_invalid_nodes: false,
        }
    }
}

impl NavConfig {
    pub fn from_yaml_file(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path).map_err(|source| NavError::ConfigIo {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(serde_yaml::from_str(&text)?)
    }
}

/// Everything built at startup, handed to later selection changes.
#[derive(Debug)]
pub struct NavContext {
    index: NodeIndex,
    selector: Selector,
    viewport: Viewport,
    extent: BBox,
    overlay: LatLngBounds,
    initial_flight: Flight,
}

/// Index the nodes of a graph without setting up a viewport.
pub fn build_index(svg_text: &str, skip_invalid_nodes: bool) -> Result<NodeIndex> {
    let doc = parse_document(svg_text)?;
    let svg = find_svg(&doc)?;
    let extent = graph_extent(graph_group(svg)?)?;
    NodeIndex::build(svg, extent.y(), skip_invalid_nodes)
}

/// Read the graph, index its nodes, frame the whole graph, then fly to the
/// default node.
pub fn initialize(svg_text: &str, config: &NavConfig) -> Result<NavContext> {
    let mut viewport = Viewport::new(config.viewport.clone())?;

    let doc = parse_document(svg_text)?;
    let svg = find_svg(&doc)?;
    let extent = graph_extent(graph_group(svg)?)?;
    info!(
        x = extent.x(),
        y = extent.y(),
        width = extent.width(),
        height = extent.height(),
        "graph extent"
    );

    let index = NodeIndex::build(svg, extent.y(), config.skip_invalid_nodes)?;
    let mut selector = Selector::populate(&index);

    let overlay = LatLngBounds::from_corners(overlay_bounds(&extent))?;
    viewport.fit_bounds(&overlay);
    let (_, initial_flight) =
        selector.select_default(config.preferred_labels.as_slice(), &index, &mut viewport)?;

    Ok(NavContext {
        index,
        selector,
        viewport,
        extent,
        overlay,
        initial_flight,
    })
}

impl NavContext {
    pub fn index(&self) -> &NodeIndex {
        &self.index
    }

    pub fn selector(&self) -> &Selector {
        &self.selector
    }

    pub fn viewport(&self) -> &Viewport {
        &self.viewport
    }

    pub fn extent(&self) -> BBox {
        self.extent
    }

    pub fn overlay_bounds(&self) -> LatLngBounds {
        self.overlay
    }

    /// Flight taken to the default node during setup.
    pub fn initial_flight(&self) -> &Flight {
        &self.initial_flight
    }

    /// Currently selected node label.
    pub fn focus(&self) -> Option<&str> {
        self.selector.selected()
    }

    pub fn select(&mut self, label: &str) -> Result<Flight> {
        self.selector.change(label, &self.index, &mut self.viewport)
    }
}
