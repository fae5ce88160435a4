use std::collections::HashSet;
use tracing::debug;

use crate::heuristics::{image_url, is_likely_product_image};
use crate::page::{NodeId, PageSnapshot, Rect};

/// Root id of the injected overlay; images inside it are never offered
/// try-on controls.
pub const OVERLAY_ROOT_ID: &str = "stylecast-overlay";

/// Tags scanned for background-image candidates in addition to `img`.
const BACKGROUND_TAGS: &[&str] = &["div", "section", "article", "figure", "span"];

#[derive(Debug, Clone, PartialEq)]
pub struct Detection {
    pub node_key: u64,
    pub image_url: String,
    pub rect: Rect,
}

/// One scan pass over a snapshot. Keeps the set of already-processed
/// node keys so an element acquires controls at most once, across any
/// number of rescans.
#[derive(Debug, Default)]
pub struct Scanner {
    processed: HashSet<u64>,
}

impl Scanner {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn scan(&mut self, snapshot: &PageSnapshot) -> Vec<Detection> {
        let mut detections = Vec::new();
        for (id, node) in snapshot.iter() {
            if self.processed.contains(&node.key) {
                continue;
            }
            if node.tag != "img" && !BACKGROUND_TAGS.contains(&node.tag.as_str()) {
                continue;
            }
            if self.inside_overlay(snapshot, id) {
                continue;
            }
            let Some(url) = image_url(node) else {
                continue;
            };
            if !is_likely_product_image(snapshot, id) {
                continue;
            }
            self.processed.insert(node.key);
            debug!(key = node.key, url = %url, "Product image detected");
            detections.push(Detection {
                node_key: node.key,
                image_url: url,
                rect: node.rect,
            });
        }
        detections
    }

    fn inside_overlay(&self, snapshot: &PageSnapshot, id: NodeId) -> bool {
        snapshot
            .get(id)
            .map(|n| n.id == OVERLAY_ROOT_ID)
            .unwrap_or(false)
            || snapshot.ancestors(id).any(|n| n.id == OVERLAY_ROOT_ID)
    }

    pub fn processed_count(&self) -> usize {
        self.processed.len()
    }
}
