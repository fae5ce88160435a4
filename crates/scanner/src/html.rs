use scraper::{ElementRef, Html};

use crate::page::{NodeId, PageNode, PageSnapshot, Rect};

/// Build a page snapshot from a static HTML document. There is no layout
/// engine here, so geometry comes from `width`/`height` attributes or
/// inline style; elements without either get a zero rect and fall below
/// the scanner's size floor.
pub fn snapshot_from_html(html: &str) -> PageSnapshot {
    let document = Html::parse_document(html);
    let mut snapshot = PageSnapshot::new();
    build(document.root_element(), None, &mut snapshot);
    snapshot
}

fn build(element: ElementRef<'_>, parent: Option<NodeId>, snapshot: &mut PageSnapshot) {
    let id = snapshot.push(node_from(element), parent);
    for child in element.children() {
        if let Some(child_element) = ElementRef::wrap(child) {
            build(child_element, Some(id), snapshot);
        }
    }
}

fn node_from(element: ElementRef<'_>) -> PageNode {
    let value = element.value();
    let mut node = PageNode::new(value.name());
    for (name, attr_value) in value.attrs() {
        node.attrs.insert(name.to_string(), attr_value.to_string());
    }
    node.id = node.attr("id").unwrap_or_default().to_string();
    node.class_name = node.attr("class").unwrap_or_default().to_string();

    let style = node.attr("style").unwrap_or_default().to_string();
    if let Some(background) = style_property(&style, "background-image")
        .or_else(|| style_property(&style, "background").filter(|v| v.contains("url(")))
    {
        node.background_image = Some(background);
    }

    let width = dimension(&node, &style, "width");
    let height = dimension(&node, &style, "height");
    node.rect = Rect::sized(width, height);
    node
}

fn style_property(style: &str, property: &str) -> Option<String> {
    style.split(';').find_map(|declaration| {
        let (name, value) = declaration.split_once(':')?;
        if name.trim().eq_ignore_ascii_case(property) {
            Some(value.trim().to_string())
        } else {
            None
        }
    })
}

fn dimension(node: &PageNode, style: &str, name: &str) -> f64 {
    if let Some(value) = node.attr(name).and_then(|v| v.parse::<f64>().ok()) {
        return value;
    }
    style_property(style, name)
        .and_then(|v| v.trim_end_matches("px").trim().parse::<f64>().ok())
        .unwrap_or(0.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::heuristics::is_likely_product_image;
    use crate::scan::Scanner;

    #[test]
    fn parses_img_with_attribute_geometry() {
        let snapshot = snapshot_from_html(
            r#"<html><body>
                <img class="product-thumbnail" src="https://shop.example/a.jpg"
                     width="150" height="150">
            </body></html>"#,
        );
        let (id, node) = snapshot.iter().find(|(_, n)| n.tag == "img").unwrap();
        assert_eq!(node.rect.width, 150.0);
        assert!(is_likely_product_image(&snapshot, id));
    }

    #[test]
    fn reads_inline_style_geometry_and_background() {
        let snapshot = snapshot_from_html(
            r#"<html><body>
                <div class="hero" style="width: 400px; height: 300px;
                     background-image: url('https://shop.example/hero.jpg')"></div>
            </body></html>"#,
        );
        let mut scanner = Scanner::new();
        let detections = scanner.scan(&snapshot);
        assert_eq!(detections.len(), 1);
        assert_eq!(detections[0].image_url, "https://shop.example/hero.jpg");
    }

    #[test]
    fn scan_over_document_respects_size_floor() {
        let snapshot = snapshot_from_html(
            r#"<html><body>
                <img class="product-thumbnail" src="https://shop.example/big.jpg"
                     width="150" height="150">
                <img class="product-thumbnail" src="https://shop.example/small.jpg"
                     width="50" height="50">
            </body></html>"#,
        );
        let mut scanner = Scanner::new();
        let detections = scanner.scan(&snapshot);
        assert_eq!(detections.len(), 1);
        assert!(detections[0].image_url.ends_with("big.jpg"));
    }
}
