use std::collections::BTreeMap;

use roxmltree::Node;
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::error::Result;
use crate::geometry::NodeBounds;
use crate::svg::{node_elements, parse_graph_node};

/// Node label to map bounds, ordered by label.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct NodeIndex {
    entries: BTreeMap<String, NodeBounds>,
}

impl NodeIndex {
    /// Scan every `.node` under `scope` and record its bounds.
    ///
    /// `origin_y` is the y of the graph extent, used to flip SVG y into map
    /// latitude. A duplicated label keeps the last node seen. With
    /// `skip_invalid_nodes`, a node whose title or geometry cannot be read is
    /// logged and left out instead of failing the whole index.
    pub fn build(scope: Node, origin_y: f64, skip_invalid_nodes: bool) -> Result<Self> {
        let mut entries = BTreeMap::new();
        for (index, element) in node_elements(scope).into_iter().enumerate() {
            let read = parse_graph_node(element, index)
                .and_then(|node| node.primitive.bbox(&node.label).map(|bbox| (node.label, bbox)));
            let (label, bbox) = match read {
                Ok(read) => read,
                Err(err) if skip_invalid_nodes && err.is_node_local() => {
                    warn!(index, error = %err, "skipping invalid node");
                    continue;
                }
                Err(err) => return Err(err),
            };
            debug!(
                label = %label,
                x = bbox.x(),
                y = bbox.y(),
                width = bbox.width(),
                height = bbox.height(),
                "node bounds"
            );
            let bounds = NodeBounds::from_bbox(&bbox, origin_y);
            if entries.insert(label.clone(), bounds).is_some() {
                warn!(%label, "duplicate node label, keeping the last one");
            }
        }
        info!(nodes = entries.len(), "built node index");
        Ok(Self { entries })
    }

    pub fn get(&self, label: &str) -> Option<&NodeBounds> {
        self.entries.get(label)
    }

    /// Labels in ascending order.
    pub fn labels(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &NodeBounds)> {
        self.entries.iter().map(|(label, bounds)| (label.as_str(), bounds))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
