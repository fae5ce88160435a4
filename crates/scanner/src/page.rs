use std::collections::HashMap;

/// Bounding box in page coordinates, as reported by the host's layout.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self { x, y, width, height }
    }

    pub fn sized(width: f64, height: f64) -> Self {
        Self::new(0.0, 0.0, width, height)
    }
}

pub type NodeId = usize;

/// One element of a page snapshot. The host supplies geometry and the
/// resolved background-image; the heuristics only read.
#[derive(Debug, Clone, Default)]
pub struct PageNode {
    /// Host-stable identity, constant across snapshots of the same
    /// element. Drives the scanner's processed-once marking.
    pub key: u64,
    pub tag: String,
    pub id: String,
    pub class_name: String,
    pub attrs: HashMap<String, String>,
    /// Computed `background-image` value, e.g. `url("...")`.
    pub background_image: Option<String>,
    pub rect: Rect,
    pub parent: Option<NodeId>,
}

impl PageNode {
    pub fn new(tag: &str) -> Self {
        Self {
            tag: tag.to_ascii_lowercase(),
            ..Default::default()
        }
    }

    pub fn with_key(mut self, key: u64) -> Self {
        self.key = key;
        self
    }

    pub fn with_id(mut self, id: &str) -> Self {
        self.id = id.to_string();
        self
    }

    pub fn with_class(mut self, class_name: &str) -> Self {
        self.class_name = class_name.to_string();
        self
    }

    pub fn with_attr(mut self, name: &str, value: &str) -> Self {
        self.attrs.insert(name.to_string(), value.to_string());
        self
    }

    pub fn with_background(mut self, value: &str) -> Self {
        self.background_image = Some(value.to_string());
        self
    }

    pub fn with_rect(mut self, rect: Rect) -> Self {
        self.rect = rect;
        self
    }

    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attrs.get(name).map(String::as_str)
    }
}

/// Flat arena of nodes with parent links, produced by a host adapter per
/// observation cycle.
#[derive(Debug, Clone, Default)]
pub struct PageSnapshot {
    nodes: Vec<PageNode>,
}

impl PageSnapshot {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a node; assigns its key from the arena index when the host
    /// did not provide one.
    pub fn push(&mut self, mut node: PageNode, parent: Option<NodeId>) -> NodeId {
        let id = self.nodes.len();
        node.parent = parent;
        if node.key == 0 {
            node.key = id as u64 + 1;
        }
        self.nodes.push(node);
        id
    }

    pub fn get(&self, id: NodeId) -> Option<&PageNode> {
        self.nodes.get(id)
    }

    pub fn find_by_key(&self, key: u64) -> Option<&PageNode> {
        self.nodes.iter().find(|n| n.key == key)
    }

    pub fn iter(&self) -> impl Iterator<Item = (NodeId, &PageNode)> {
        self.nodes.iter().enumerate()
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Walk from a node up through its ancestors, nearest first.
    pub fn ancestors(&self, id: NodeId) -> impl Iterator<Item = &PageNode> {
        let mut current = self.get(id).and_then(|n| n.parent);
        std::iter::from_fn(move || {
            let node = self.get(current?)?;
            current = node.parent;
            Some(node)
        })
    }

    /// All nodes whose ancestor chain contains `id`.
    pub fn descendants(&self, id: NodeId) -> impl Iterator<Item = (NodeId, &PageNode)> {
        self.iter().filter(move |(child, _)| {
            let mut cursor = self.get(*child).and_then(|n| n.parent);
            while let Some(p) = cursor {
                if p == id {
                    return true;
                }
                cursor = self.get(p).and_then(|n| n.parent);
            }
            false
        })
    }
}
