//! Random bounded-depth XML/JSON documents.
//!
//! The generator builds one element tree top-down, probabilistically attaching
//! attributes and text content at each node, stopping at `max_depth` and
//! capping the total number of elements per depth level at `max_elements`.
//! The same tree shape backs both renderings.

use fake::faker::address::en::CountryCode;
use fake::faker::lorem::en::Word;
use fake::Fake;
use rand::Rng;
use serde_json::{Map, Value};

/// Options for the xml/json looks-real kinds.
#[derive(Debug, Clone)]
pub struct DocumentOpts {
    pub max_depth: usize,
    pub max_elements: usize,
    /// Tag vocabulary. Must be non-empty for the xml/json kinds; the build
    /// phase enforces this.
    pub tag_seed: Vec<String>,
}

impl Default for DocumentOpts {
    fn default() -> Self {
        Self {
            max_depth: 10,
            max_elements: 100,
            tag_seed: Vec::new(),
        }
    }
}

#[derive(Debug)]
struct Element {
    tag: String,
    attrs: Vec<(String, String)>,
    text: Option<String>,
    children: Vec<Element>,
}

/// Render a random XML document, with declaration.
pub fn random_xml<R: Rng>(rng: &mut R, opts: &DocumentOpts) -> String {
    let root = build_tree(rng, opts);

    let mut out = String::from("<?xml version=\"1.0\" encoding=\"UTF-8\"?>");
    write_xml(&root, &mut out);
    out
}

/// Render a random JSON document from the same tree shape as [`random_xml`]:
/// attributes become `@`-prefixed keys, text becomes `#text`, children are
/// grouped by tag (an array when a tag repeats).
pub fn random_json<R: Rng>(rng: &mut R, opts: &DocumentOpts) -> String {
    let root = build_tree(rng, opts);
    let mut doc = Map::new();
    doc.insert(root.tag.clone(), to_json(&root));
    Value::Object(doc).to_string()
}

fn build_tree<R: Rng>(rng: &mut R, opts: &DocumentOpts) -> Element {
    // One counter per depth level below the root.
    let mut level_counts = vec![0usize; opts.max_depth + 1];
    let mut root = new_element(rng, opts, 0);
    populate(rng, opts, &mut root, 1, &mut level_counts);
    root
}

fn populate<R: Rng>(
    rng: &mut R,
    opts: &DocumentOpts,
    parent: &mut Element,
    depth: usize,
    level_counts: &mut [usize],
) {
    if depth > opts.max_depth {
        return;
    }

    // Between one and ten children per node, subject to the per-level cap.
    let wanted = rng.gen_range(1..=10);
    for _ in 0..wanted {
        if level_counts[depth] >= opts.max_elements {
            break;
        }
        level_counts[depth] += 1;

        let mut child = new_element(rng, opts, depth);
        populate(rng, opts, &mut child, depth + 1, level_counts);
        parent.children.push(child);
    }
}

fn new_element<R: Rng>(rng: &mut R, opts: &DocumentOpts, depth: usize) -> Element {
    let tag = if opts.tag_seed.is_empty() {
        Word().fake_with_rng(rng)
    } else {
        opts.tag_seed[rng.gen_range(0..opts.tag_seed.len())].clone()
    };

    let mut attrs = Vec::new();
    let mut text = None;

    // The root element carries neither attributes nor text.
    if depth > 0 {
        if rng.gen_bool(0.5) {
            let key: String = Word().fake_with_rng(rng);
            let value: String = CountryCode().fake_with_rng(rng);
            attrs.push((key, value));
        }
        if rng.gen_bool(0.9) {
            let value: String = if rng.gen_bool(0.5) {
                Word().fake_with_rng(rng)
            } else {
                rng.gen_range(0..1_000_000).to_string()
            };
            text = Some(value);
        }
    }

    Element {
        tag,
        attrs,
        text,
        children: Vec::new(),
    }
}

fn write_xml(el: &Element, out: &mut String) {
    out.push('<');
    out.push_str(&el.tag);
    for (k, v) in &el.attrs {
        out.push(' ');
        out.push_str(k);
        out.push_str("=\"");
        out.push_str(v);
        out.push('"');
    }
    out.push('>');

    if let Some(text) = &el.text {
        out.push_str(text);
    }
    for child in &el.children {
        write_xml(child, out);
    }

    out.push_str("</");
    out.push_str(&el.tag);
    out.push('>');
}

fn to_json(el: &Element) -> Value {
    let mut obj = Map::new();

    for (k, v) in &el.attrs {
        obj.insert(format!("@{k}"), Value::String(v.clone()));
    }
    if let Some(text) = &el.text {
        obj.insert("#text".to_string(), Value::String(text.clone()));
    }

    for child in &el.children {
        let value = to_json(child);
        match obj.get_mut(&child.tag) {
            None => {
                obj.insert(child.tag.clone(), value);
            }
            Some(Value::Array(items)) => items.push(value),
            Some(existing) => {
                let first = existing.take();
                *existing = Value::Array(vec![first, value]);
            }
        }
    }

    Value::Object(obj)
}
