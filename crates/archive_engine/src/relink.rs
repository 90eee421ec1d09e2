//! Writes a page back out with selected attribute values replaced.
//!
//! Overrides are keyed by node id, one attribute per node. Parsing the same
//! source twice yields the same ids, so a plan made on one parse applies to
//! another. Attribute order follows the document (scraper's `deterministic`
//! feature).

use std::collections::HashMap;

use ego_tree::NodeId;
use engine_logging::engine_trace;
use scraper::node::Node;
use scraper::Html;

pub(crate) type AttrOverrides = HashMap<NodeId, (&'static str, String)>;

/// Re-parses `page_source`, applies `overrides` and serializes the result.
pub(crate) fn relink(page_source: &str, overrides: &AttrOverrides) -> String {
    let mut doc = Html::parse_document(page_source);
    for (id, (attr, replacement)) in overrides {
        let Some(mut node) = doc.tree.get_mut(*id) else {
            engine_trace!("Override target {:?} not in document", id);
            continue;
        };
        if let Node::Element(element) = node.value() {
            for (name, value) in element.attrs.iter_mut() {
                if &*name.local == *attr {
                    value.clear();
                    value.push_slice(replacement);
                }
            }
        }
    }
    doc.html()
}

#[cfg(test)]
mod tests {
    use super::*;
    use scraper::Selector;

    fn first_id(src: &str, selector: &str) -> NodeId {
        let doc = Html::parse_document(src);
        let sel = Selector::parse(selector).unwrap();
        let id = doc.select(&sel).next().unwrap().id();
        id
    }

    #[test]
    fn untouched_document_round_trips_structure() {
        let src = r#"<!DOCTYPE html><html><head><style>a > b { x: "&" }</style></head><body><p class="q">1 &lt; 2 &amp; "ok"</p><br><!-- c --></body></html>"#;
        assert_eq!(relink(src, &AttrOverrides::new()), src);
    }

    #[test]
    fn override_replaces_only_the_targeted_attribute() {
        let src = r#"<html><body><img src="a.png" alt="x"><img src="b.png"></body></html>"#;
        let mut overrides = AttrOverrides::new();
        overrides.insert(first_id(src, "img"), ("src", "img_0.png".to_string()));

        let html = relink(src, &overrides);
        assert!(html.contains(r#"<img src="img_0.png" alt="x">"#));
        assert!(html.contains(r#"<img src="b.png">"#));
    }

    #[test]
    fn attribute_order_and_namespaces_survive() {
        let src = r##"<html><head><link rel="stylesheet" href="/s.css" media="all"></head><body><svg><use xlink:href="#icon"></use></svg><p xml:lang="ko">김치</p></body></html>"##;
        let mut overrides = AttrOverrides::new();
        overrides.insert(first_id(src, "link"), ("href", "../css/s.css".to_string()));

        let html = relink(src, &overrides);
        assert!(html.contains(r#"<link rel="stylesheet" href="../css/s.css" media="all">"#));
        assert!(html.contains(r##"xlink:href="#icon""##));
        assert!(!html.contains(r##"<use href="#icon">"##));
    }
}
