pub mod anchor;
pub mod heuristics;
pub mod html;
pub mod observer;
pub mod page;
pub mod scan;
pub mod service;

pub use anchor::{Anchor, AnchorTracker, HoverState, HOVER_GRACE, REPOSITION_INTERVAL};
pub use heuristics::{image_url, is_likely_product_image, LAZY_ATTRS, PRODUCT_KEYWORDS};
pub use html::snapshot_from_html;
pub use observer::{is_scan_relevant, Debouncer, PageChange, SCAN_DEBOUNCE};
pub use page::{NodeId, PageNode, PageSnapshot, Rect};
pub use scan::{Detection, Scanner, OVERLAY_ROOT_ID};
pub use service::{PageProvider, ScanService};
