use std::collections::HashMap;

use ego_tree::NodeId;
use scraper::{Html, Node, Selector};
use tracing::debug;
use url::Url;

use crate::catalog::ResourceRef;

/// One attribute occurrence discovered during a catalog scan, resolved
/// against the document base. `entry` indexes the catalog slice the scan
/// ran with, so the same slice must be handed to [`apply_rewrites`].
#[derive(Debug, Clone)]
pub struct ScannedRef {
    pub entry: usize,
    pub raw: String,
    pub url: Url,
}

/// A rewrite map: (catalog entry index, original attribute value) to the
/// local value that replaces it.
pub type RewriteMap = HashMap<(usize, String), String>;

/// True when both URLs share scheme, host and port.
pub fn same_origin(a: &Url, b: &Url) -> bool {
    a.scheme() == b.scheme()
        && a.host_str() == b.host_str()
        && a.port_or_known_default() == b.port_or_known_default()
}

/// The page URL with query and fragment stripped; references resolve
/// against this.
pub fn canonical_url(url: &Url) -> Url {
    let mut canonical = url.clone();
    canonical.set_query(None);
    canonical.set_fragment(None);
    canonical
}

/// Collect every attribute occurrence for the given catalog entries, in
/// entry order. Empty values are dropped silently; values that do not
/// resolve against the base are dropped with a debug log.
pub fn scan_references(html: &str, base: &Url, entries: &[&'static ResourceRef]) -> Vec<ScannedRef> {
    let document = Html::parse_document(html);
    let mut references = Vec::new();

    for (index, entry) in entries.iter().enumerate() {
        let selector = entry_selector(entry);
        for element in document.select(&selector) {
            let Some(raw) = element.value().attr(entry.attr) else {
                continue;
            };
            let raw = raw.trim();
            if raw.is_empty() {
                continue;
            }
            match base.join(raw) {
                Ok(url) => references.push(ScannedRef {
                    entry: index,
                    raw: raw.to_string(),
                    url,
                }),
                Err(err) => debug!("unresolvable reference {:?} on <{}>: {}", raw, entry.tag, err),
            }
        }
    }

    references
}

/// Re-scan the document and apply the rewrite map in one pass, then
/// serialize. Attributes without a map entry are left untouched.
pub fn apply_rewrites(html: &str, entries: &[&'static ResourceRef], rewrites: &RewriteMap) -> String {
    let mut document = Html::parse_document(html);

    let mut edits: Vec<(NodeId, &'static str, String)> = Vec::new();
    for (index, entry) in entries.iter().enumerate() {
        let selector = entry_selector(entry);
        for element in document.select(&selector) {
            if let Some(raw) = element.value().attr(entry.attr)
                && let Some(local) = rewrites.get(&(index, raw.trim().to_string()))
            {
                edits.push((element.id(), entry.attr, local.clone()));
            }
        }
    }

    for (node_id, attr, local) in edits {
        let Some(mut node) = document.tree.get_mut(node_id) else {
            continue;
        };
        if let Node::Element(element) = node.value() {
            for (name, value) in element.attrs.iter_mut() {
                if name.local.as_ref() == attr {
                    *value = local.as_str().into();
                }
            }
        }
    }

    document.root_element().html()
}

// Catalog tags and attributes are plain identifiers; the selectors they
// form always parse.
fn entry_selector(entry: &ResourceRef) -> Selector {
    Selector::parse(&format!("{}[{}]", entry.tag, entry.attr)).unwrap()
}
