use std::collections::HashMap;
use std::time::{Duration, Instant};

use crate::page::{PageSnapshot, Rect};
use crate::scan::Detection;

/// Overlay rects are refreshed on this cadence while the source element
/// stays attached.
pub const REPOSITION_INTERVAL: Duration = Duration::from_millis(500);

/// Controls stay visible this long after the pointer leaves, so a move
/// between the element and its controls does not flicker.
pub const HOVER_GRACE: Duration = Duration::from_millis(100);

/// Hover visibility with a grace period on leave. Driven by explicit
/// instants so it is testable without a real clock.
#[derive(Debug, Default)]
pub struct HoverState {
    visible: bool,
    hide_at: Option<Instant>,
}

impl HoverState {
    pub fn on_enter(&mut self) {
        self.visible = true;
        self.hide_at = None;
    }

    pub fn on_leave(&mut self, now: Instant) {
        if self.visible {
            self.hide_at = Some(now + HOVER_GRACE);
        }
    }

    pub fn is_visible(&mut self, now: Instant) -> bool {
        if let Some(deadline) = self.hide_at {
            if now >= deadline {
                self.visible = false;
                self.hide_at = None;
            }
        }
        self.visible
    }
}

/// A detection's in-page control overlay: its current rect plus hover
/// state. One per accepted element.
#[derive(Debug)]
pub struct Anchor {
    pub node_key: u64,
    pub image_url: String,
    pub rect: Rect,
    pub hover: HoverState,
}

/// Tracks every live anchor against fresh snapshots: repositions anchors
/// whose element moved, drops anchors whose element left the page.
#[derive(Debug, Default)]
pub struct AnchorTracker {
    anchors: HashMap<u64, Anchor>,
}

impl AnchorTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn attach(&mut self, detection: &Detection) {
        self.anchors.insert(
            detection.node_key,
            Anchor {
                node_key: detection.node_key,
                image_url: detection.image_url.clone(),
                rect: detection.rect,
                hover: HoverState::default(),
            },
        );
    }

    /// One reposition tick: update rects from the snapshot and remove
    /// anchors for detached elements. Returns the removed keys.
    pub fn refresh(&mut self, snapshot: &PageSnapshot) -> Vec<u64> {
        let mut removed = Vec::new();
        self.anchors.retain(|key, anchor| {
            match snapshot.find_by_key(*key) {
                Some(node) => {
                    anchor.rect = node.rect;
                    true
                }
                None => {
                    removed.push(*key);
                    false
                }
            }
        });
        removed
    }

    pub fn get_mut(&mut self, key: u64) -> Option<&mut Anchor> {
        self.anchors.get_mut(&key)
    }

    pub fn len(&self) -> usize {
        self.anchors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.anchors.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::page::PageNode;

    fn detection(key: u64) -> Detection {
        Detection {
            node_key: key,
            image_url: "https://shop.example/p.jpg".to_string(),
            rect: Rect::sized(150.0, 150.0),
        }
    }

    #[test]
    fn refresh_tracks_moved_elements() {
        let mut tracker = AnchorTracker::new();
        tracker.attach(&detection(5));

        let mut snapshot = PageSnapshot::new();
        snapshot.push(
            PageNode::new("img")
                .with_key(5)
                .with_rect(Rect::new(40.0, 600.0, 150.0, 150.0)),
            None,
        );

        assert!(tracker.refresh(&snapshot).is_empty());
        assert_eq!(tracker.get_mut(5).unwrap().rect.y, 600.0);
    }

    #[test]
    fn refresh_drops_detached_elements() {
        let mut tracker = AnchorTracker::new();
        tracker.attach(&detection(5));
        tracker.attach(&detection(6));

        let mut snapshot = PageSnapshot::new();
        snapshot.push(PageNode::new("img").with_key(6), None);

        assert_eq!(tracker.refresh(&snapshot), vec![5]);
        assert_eq!(tracker.len(), 1);
    }

    #[test]
    fn hover_grace_keeps_controls_visible_briefly() {
        let mut hover = HoverState::default();
        let t0 = Instant::now();

        hover.on_enter();
        hover.on_leave(t0);
        // Inside the grace window: still visible.
        assert!(hover.is_visible(t0 + Duration::from_millis(50)));
        // Re-enter cancels the pending hide.
        hover.on_enter();
        assert!(hover.is_visible(t0 + Duration::from_secs(10)));

        hover.on_leave(t0 + Duration::from_secs(10));
        assert!(!hover.is_visible(t0 + Duration::from_secs(11)));
    }

    #[test]
    fn leave_without_enter_is_a_no_op() {
        let mut hover = HoverState::default();
        hover.on_leave(Instant::now());
        assert!(!hover.is_visible(Instant::now()));
    }
}
