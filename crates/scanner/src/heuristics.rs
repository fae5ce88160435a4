use once_cell::sync::Lazy;
use regex::Regex;

use crate::page::{NodeId, PageNode, PageSnapshot};

/// Class/id substrings that mark an element (or a near ancestor) as
/// product-like. Any single hit accepts the element.
pub const PRODUCT_KEYWORDS: &[&str] = &[
    "product", "item", "clothing", "apparel", "fashion", "outfit", "dress", "shirt", "pant",
    "jacket", "shoe", "garment", "thumbnail", "gallery", "hero", "main", "primary",
];

/// Lazy-load attributes consulted when `src` is absent.
pub const LAZY_ATTRS: &[&str] = &["data-src", "data-original", "data-lazy", "data-image", "data-background"];

/// Below this size an element is never considered.
pub const MIN_CONSIDER_PX: f64 = 80.0;
/// Without a keyword hit, this is the acceptance floor.
pub const MIN_FALLBACK_PX: f64 = 120.0;

/// How many ancestors (beyond the element itself) are checked for
/// product keywords.
const ANCESTOR_DEPTH: usize = 2;

static BACKGROUND_URL: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"url\(["']?(.*?)["']?\)"#).expect("background url regex is valid"));

/// Resolve the image URL an element refers to: `src` for images, then
/// lazy-load attributes, then a CSS `background-image` URL.
pub fn image_url(node: &PageNode) -> Option<String> {
    if node.tag == "img" {
        if let Some(src) = node.attr("src").filter(|s| !s.is_empty()) {
            return Some(src.to_string());
        }
    }

    for attr in LAZY_ATTRS {
        if let Some(value) = node.attr(attr).filter(|v| !v.is_empty()) {
            return Some(value.to_string());
        }
    }

    if let Some(background) = node.background_image.as_deref() {
        if background != "none" {
            if let Some(caps) = BACKGROUND_URL.captures(background) {
                let url = caps.get(1).map(|m| m.as_str()).unwrap_or("");
                if !url.is_empty() {
                    return Some(url.to_string());
                }
            }
        }
    }

    None
}

fn has_product_keyword(node: &PageNode) -> bool {
    let class_name = node.class_name.to_lowercase();
    let id = node.id.to_lowercase();
    PRODUCT_KEYWORDS
        .iter()
        .any(|kw| class_name.contains(kw) || id.contains(kw))
}

/// Decide whether an element is likely a product photograph. Rules, each
/// independently sufficient once the 80px floor is met:
/// keyword on the element or its two nearest ancestors, or a bounding box
/// of at least 120x120.
pub fn is_likely_product_image(snapshot: &PageSnapshot, id: NodeId) -> bool {
    let Some(node) = snapshot.get(id) else {
        return false;
    };

    if node.rect.width < MIN_CONSIDER_PX || node.rect.height < MIN_CONSIDER_PX {
        return false;
    }

    if has_product_keyword(node) {
        return true;
    }
    for ancestor in snapshot.ancestors(id).take(ANCESTOR_DEPTH) {
        if has_product_keyword(ancestor) {
            return true;
        }
    }

    node.rect.width >= MIN_FALLBACK_PX && node.rect.height >= MIN_FALLBACK_PX
}
