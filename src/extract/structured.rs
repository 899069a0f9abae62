//! Strategy 3: JSON-LD structured data

use crate::extract::candidate::{area, parse_dimension, Candidate, Strategy};
use crate::extract::markup::{attr_lower, Page};
use scraper::Selector;
use serde_json::{Map, Value};
use std::collections::HashMap;

/// schema.org types whose `logo` / `image` describe the site owner
const ORGANIZATION_TYPES: &[&str] = &[
    "organization",
    "corporation",
    "localbusiness",
    "onlinebusiness",
    "onlinestore",
    "store",
    "newsmediaorganization",
    "educationalorganization",
    "governmentorganization",
    "ngo",
    "brand",
    "website",
];

/// Nodes of one JSON-LD block that carry an `@id`, keyed by it
type NodeIndex<'a> = HashMap<&'a str, &'a Map<String, Value>>;

/// Extracts `logo` (or, failing that, `image`) fields of organization-like
/// entities from every `<script type="application/ld+json">` block
///
/// Nested entities (`@graph`, `publisher`, `brand`, ...) are searched too.
/// An image given only as a `{"@id": ...}` reference is looked up among the
/// nodes of the same block. Blocks that are not valid JSON are skipped.
pub fn structured_data(page: &Page) -> Vec<Candidate> {
    let Ok(script_selector) = Selector::parse("script[type]") else {
        return Vec::new();
    };
    let mut candidates = Vec::new();

    for (position, element) in page.select(&script_selector) {
        if attr_lower(&element, "type") != "application/ld+json" {
            continue;
        }

        let text: String = element.text().collect();
        let Ok(value) = serde_json::from_str::<Value>(text.trim()) else {
            tracing::trace!("Skipping invalid JSON-LD block at element {}", position);
            continue;
        };

        let mut nodes = NodeIndex::new();
        index_nodes(&value, &mut nodes);

        let mut found = Vec::new();
        collect_entities(&value, &nodes, &mut found);

        candidates.extend(found.into_iter().map(|(reference, size)| {
            Candidate::new(reference, Strategy::StructuredData, position).with_area(size)
        }));
    }

    candidates
}

/// Records every node that defines something beyond its own `@id`
///
/// Bare `{"@id": ...}` objects are references, not definitions. The first
/// definition of an id wins.
fn index_nodes<'a>(value: &'a Value, nodes: &mut NodeIndex<'a>) {
    match value {
        Value::Array(items) => {
            for item in items {
                index_nodes(item, nodes);
            }
        }
        Value::Object(map) => {
            if let Some(id) = map.get("@id").and_then(Value::as_str) {
                if map.len() > 1 {
                    nodes.entry(id).or_insert(map);
                }
            }
            for nested in map.values() {
                index_nodes(nested, nodes);
            }
        }
        _ => {}
    }
}

/// Walks a JSON-LD value depth-first, collecting image references of
/// organization-like entities
fn collect_entities(
    value: &Value,
    nodes: &NodeIndex<'_>,
    found: &mut Vec<(String, Option<u64>)>,
) {
    match value {
        Value::Array(items) => {
            for item in items {
                collect_entities(item, nodes, found);
            }
        }
        Value::Object(map) => {
            if is_organization(map.get("@type")) {
                let before = found.len();
                if let Some(logo) = map.get("logo") {
                    collect_images(logo, nodes, found);
                }
                if found.len() == before {
                    if let Some(image) = map.get("image") {
                        collect_images(image, nodes, found);
                    }
                }
            }

            for (key, nested) in map {
                if key == "logo" || key == "image" {
                    continue;
                }
                if nested.is_object() || nested.is_array() {
                    collect_entities(nested, nodes, found);
                }
            }
        }
        _ => {}
    }
}

/// Whether an `@type` value names an organization-like type
fn is_organization(type_value: Option<&Value>) -> bool {
    let matches = |name: &str| {
        let name = name.rsplit('/').next().unwrap_or(name).to_ascii_lowercase();
        ORGANIZATION_TYPES.contains(&name.as_str())
    };

    match type_value {
        Some(Value::String(name)) => matches(name),
        Some(Value::Array(names)) => names.iter().filter_map(Value::as_str).any(matches),
        _ => false,
    }
}

/// Collects references from an image-valued field: a URL string, an
/// `ImageObject`, a reference to one, or an array of these
///
/// A reference whose target is missing, or has no URL, yields nothing.
fn collect_images(
    value: &Value,
    nodes: &NodeIndex<'_>,
    found: &mut Vec<(String, Option<u64>)>,
) {
    match value {
        Value::String(url) if !url.trim().is_empty() => found.push((url.clone(), None)),
        Value::Array(items) => {
            for item in items {
                collect_images(item, nodes, found);
            }
        }
        Value::Object(object) => {
            let image = image_object(object).or_else(|| {
                let id = object.get("@id").and_then(Value::as_str)?;
                nodes.get(id).and_then(|node| image_object(node))
            });
            if let Some(image) = image {
                found.push(image);
            }
        }
        _ => {}
    }
}

/// The URL and declared area of an `ImageObject`-like node
fn image_object(object: &Map<String, Value>) -> Option<(String, Option<u64>)> {
    let url = ["url", "contentUrl"]
        .iter()
        .filter_map(|key| object.get(*key).and_then(Value::as_str))
        .find(|url| !url.trim().is_empty())?;

    let dimension = |key: &str| match object.get(key) {
        Some(Value::Number(n)) => n.as_f64().filter(|v| *v > 0.0).map(|v| v as u64),
        Some(Value::String(s)) => parse_dimension(s),
        _ => None,
    };
    Some((url.to_string(), area(dimension("width"), dimension("height"))))
}
