use std::time::{Duration, Instant};

use crate::heuristics::image_url;
use crate::page::{NodeId, PageSnapshot};

/// Rescans triggered by page changes are coalesced over this window.
pub const SCAN_DEBOUNCE: Duration = Duration::from_millis(500);

/// A change notification from the host's mutation observation, already
/// reduced to the two shapes the scanner cares about.
#[derive(Debug, Clone, PartialEq)]
pub enum PageChange {
    NodesAdded(Vec<NodeId>),
    AttributeChanged { node: NodeId, name: String },
}

/// Filter mirroring the original mutation handling: added subtrees count
/// when they contain anything image-like; attribute changes count for
/// `src`, `style`, `class` and any `data-*`.
pub fn is_scan_relevant(snapshot: &PageSnapshot, change: &PageChange) -> bool {
    match change {
        PageChange::NodesAdded(ids) => ids.iter().any(|id| {
            let Some(node) = snapshot.get(*id) else {
                return false;
            };
            if node.tag == "img" || image_url(node).is_some() {
                return true;
            }
            snapshot
                .descendants(*id)
                .any(|(_, n)| n.tag == "img" || n.background_image.is_some())
        }),
        PageChange::AttributeChanged { name, .. } => {
            name == "src" || name == "style" || name == "class" || name.starts_with("data-")
        }
    }
}

/// Trailing-edge debounce: every relevant change pushes the deadline out;
/// the rescan fires once the page has been quiet for the full window.
#[derive(Debug)]
pub struct Debouncer {
    delay: Duration,
    deadline: Option<Instant>,
}

impl Debouncer {
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            deadline: None,
        }
    }

    pub fn note(&mut self, now: Instant) {
        self.deadline = Some(now + self.delay);
    }

    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    /// Consume the pending deadline if it has elapsed.
    pub fn fire(&mut self, now: Instant) -> bool {
        match self.deadline {
            Some(deadline) if now >= deadline => {
                self.deadline = None;
                true
            }
            _ => false,
        }
    }
}
