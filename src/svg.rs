//! Reading node geometry out of a rendered graph SVG.

use roxmltree::{Document, Node, ParsingOptions};

use crate::error::{NavError, Result};
use crate::geometry::{accumulate, BBox};

const GRAPH_CONTAINER_ID: &str = "graph";
const NODE_CLASS: &str = "node";
const PATH_PREFIX_TOKENS: usize = 4;
const PATH_ENDPOINT_STRIDE: usize = 3;
const PATH_COMMANDS: &str = "MmLlHhVvCcSsQqTtAaZz";

/// The single geometric primitive a node is drawn with.
#[derive(Clone, Debug, PartialEq)]
pub enum Primitive {
    Path { d: String },
    Ellipse { cx: f64, cy: f64, rx: f64, ry: f64 },
    Unsupported { tag: String },
}

impl Primitive {
    /// Bounding box of the primitive. `label` names the node in errors.
    pub fn bbox(&self, label: &str) -> Result<BBox> {
        match self {
            Primitive::Path { d } => path_endpoint_bbox(d, label),
            Primitive::Ellipse { cx, cy, rx, ry } => Ok(BBox {
                xmin: cx - rx,
                xmax: cx + rx,
                ymin: cy - ry,
                ymax: cy + ry,
            }),
            Primitive::Unsupported { tag } => Err(NavError::UnsupportedPrimitive {
                label: label.to_string(),
                tag: tag.clone(),
            }),
        }
    }
}

/// A `.node` group: its trimmed title and primitive.
#[derive(Clone, Debug, PartialEq)]
pub struct GraphNode {
    pub label: String,
    pub primitive: Primitive,
}

/// Parse graph markup. Graphviz output carries a DOCTYPE, so DTDs are allowed.
pub fn parse_document(text: &str) -> Result<Document<'_>> {
    let options = ParsingOptions {
        allow_dtd: true,
        ..ParsingOptions::default()
    };
    Ok(Document::parse_with_options(text, options)?)
}

/// Locate the graph `<svg>`: the one inside `#graph` if present, else the first.
pub fn find_svg<'a, 'input>(doc: &'a Document<'input>) -> Result<Node<'a, 'input>> {
    let container = doc
        .descendants()
        .find(|node| node.attribute("id") == Some(GRAPH_CONTAINER_ID) && !node.has_tag_name("g"));
    let scope = container.unwrap_or_else(|| doc.root());
    scope
        .descendants()
        .find(|node| node.has_tag_name("svg"))
        .ok_or(NavError::MissingSvg)
}

/// First `<g>` child of the `<svg>`, the group holding the rendered graph.
pub fn graph_group<'a, 'input>(svg: Node<'a, 'input>) -> Result<Node<'a, 'input>> {
    svg.children()
        .find(|node| node.has_tag_name("g"))
        .ok_or(NavError::MissingGraphGroup)
}

/// Bounding box of everything drawn in `group`, in the group's own coordinates.
pub fn graph_extent(group: Node) -> Result<BBox> {
    let mut acc: Option<BBox> = None;
    for node in group.descendants().filter(|node| node.is_element()) {
        match node.tag_name().name() {
            "polygon" | "polyline" => {
                for (x, y) in point_list(node.attribute("points").unwrap_or_default()) {
                    acc = accumulate(acc, x, y);
                }
            }
            "path" => {
                for (x, y) in path_coordinates(node.attribute("d").unwrap_or_default()) {
                    acc = accumulate(acc, x, y);
                }
            }
            "ellipse" => {
                let attrs = ["cx", "cy", "rx", "ry"].map(|name| parse_f64(node.attribute(name)));
                if let [Some(cx), Some(cy), Some(rx), Some(ry)] = attrs {
                    acc = accumulate(acc, cx - rx, cy - ry);
                    acc = accumulate(acc, cx + rx, cy + ry);
                }
            }
            _ => {}
        }
    }
    acc.ok_or(NavError::EmptyGraph)
}

/// All elements classed `node` below `scope`, in document order.
pub fn node_elements<'a, 'input>(scope: Node<'a, 'input>) -> Vec<Node<'a, 'input>> {
    scope
        .descendants()
        .filter(|node| {
            node.is_element()
                && node
                    .attribute("class")
                    .is_some_and(|class| class.split_whitespace().any(|c| c == NODE_CLASS))
        })
        .collect()
}

/// Read title and primitive from one node element. `index` is used in errors.
pub fn parse_graph_node(node: Node, index: usize) -> Result<GraphNode> {
    let title = node
        .descendants()
        .find(|child| child.has_tag_name("title"))
        .ok_or(NavError::MissingTitle { index })?;
    let label: String = title
        .descendants()
        .filter(|child| child.is_text())
        .filter_map(|child| child.text())
        .collect::<String>()
        .trim()
        .to_string();

    let shape = node
        .descendants()
        .find(|child| child.has_tag_name("path") || child.has_tag_name("ellipse"));
    let primitive = match shape {
        Some(shape) if shape.has_tag_name("path") => Primitive::Path {
            d: shape.attribute("d").unwrap_or_default().to_string(),
        },
        Some(shape) => Primitive::Ellipse {
            cx: ellipse_attr(shape, "cx", &label)?,
            cy: ellipse_attr(shape, "cy", &label)?,
            rx: ellipse_attr(shape, "rx", &label)?,
            ry: ellipse_attr(shape, "ry", &label)?,
        },
        None => Primitive::Unsupported {
            tag: first_shape_tag(node).unwrap_or_else(|| "none".to_string()),
        },
    };
    Ok(GraphNode { label, primitive })
}

/// Approximate path bounds from curve endpoints only.
///
/// The path data is split on `M`, `C` and spaces. The leading four tokens
/// (empty head, move point, first two control points) are dropped, then every
/// third token is sampled, which lands on cubic segment endpoints. Control
/// point extrema are ignored, so strongly curved paths are underestimated.
pub fn path_endpoint_bbox(d: &str, label: &str) -> Result<BBox> {
    let tokens: Vec<&str> = d.split(&['M', 'C', ' '][..]).collect();
    let mut acc: Option<BBox> = None;
    for token in tokens
        .iter()
        .skip(PATH_PREFIX_TOKENS)
        .step_by(PATH_ENDPOINT_STRIDE)
    {
        let mut numbers = token.split(',').map(|part| part.trim().parse::<f64>());
        let (Some(Ok(x)), Some(Ok(y))) = (numbers.next(), numbers.next()) else {
            return Err(NavError::MalformedPath {
                label: label.to_string(),
                token: token.to_string(),
            });
        };
        acc = accumulate(acc, x, y);
    }
    acc.ok_or_else(|| NavError::EmptyPath {
        label: label.to_string(),
    })
}

fn ellipse_attr(node: Node, attribute: &'static str, label: &str) -> Result<f64> {
    parse_f64(node.attribute(attribute)).ok_or_else(|| NavError::BadEllipse {
        label: label.to_string(),
        attribute,
    })
}

fn first_shape_tag(node: Node) -> Option<String> {
    node.descendants()
        .filter(|child| child.is_element() && child.id() != node.id())
        .map(|child| child.tag_name().name().to_string())
        .find(|tag| !matches!(tag.as_str(), "title" | "text" | "a" | "g"))
}

fn parse_f64(value: Option<&str>) -> Option<f64> {
    value.and_then(|v| v.trim().parse::<f64>().ok())
}

fn point_list(points: &str) -> Vec<(f64, f64)> {
    points
        .split_whitespace()
        .filter_map(|pair| {
            let (x, y) = pair.split_once(',')?;
            Some((x.parse().ok()?, y.parse().ok()?))
        })
        .collect()
}

/// Every coordinate pair in a path, control points included.
fn path_coordinates(d: &str) -> Vec<(f64, f64)> {
    let numbers: Vec<f64> = d
        .split(|c: char| PATH_COMMANDS.contains(c) || c == ',' || c.is_whitespace())
        .filter_map(|part| part.parse::<f64>().ok())
        .collect();
    numbers
        .chunks_exact(2)
        .map(|pair| (pair[0], pair[1]))
        .collect()
}
