//! Legacy FreeMind XML import
//!
//! Converts the FreeMind mind-map format (nested `<node TEXT="...">`
//! elements under a `<map>` root) into the native document shape: each node
//! becomes `{ "id", "title", "ideas" }` with children keyed by their rank
//! ("1", "2", ...) in document order. Identity markers are assigned
//! depth-first starting from 1 at the root, so an imported map carries the
//! same root marker as a newly created one.

use mapvault_domain::{Document, MapVaultError, Result};
use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;
use serde_json::{Map, Number, Value};

struct Node {
    title: String,
    children: Vec<Node>,
}

fn decode_err(detail: impl std::fmt::Display) -> MapVaultError {
    MapVaultError::Decode(format!("malformed FreeMind document: {detail}"))
}

fn node_title(element: &BytesStart<'_>) -> Result<String> {
    let attr = element.try_get_attribute("TEXT").map_err(decode_err)?;
    match attr {
        Some(attr) => Ok(attr.unescape_value().map_err(decode_err)?.into_owned()),
        None => Ok(String::new()),
    }
}

/// Import a FreeMind XML document.
///
/// # Errors
/// Returns `Decode` for unparseable XML, unbalanced node elements, or a
/// document without a root node.
pub fn import(xml: &str) -> Result<Document> {
    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text(true);

    // Stack of open <node> elements; non-node elements (map, font, icon,
    // edge, ...) are skipped entirely.
    let mut open: Vec<Node> = Vec::new();
    let mut root: Option<Node> = None;

    loop {
        match reader.read_event().map_err(decode_err)? {
            Event::Start(element) if element.name().as_ref() == b"node" => {
                open.push(Node { title: node_title(&element)?, children: Vec::new() });
            }
            Event::Empty(element) if element.name().as_ref() == b"node" => {
                let leaf = Node { title: node_title(&element)?, children: Vec::new() };
                match open.last_mut() {
                    Some(parent) => parent.children.push(leaf),
                    None if root.is_none() => root = Some(leaf),
                    None => return Err(decode_err("multiple root nodes")),
                }
            }
            Event::End(element) if element.name().as_ref() == b"node" => {
                let node = open.pop().ok_or_else(|| decode_err("unbalanced node element"))?;
                match open.last_mut() {
                    Some(parent) => parent.children.push(node),
                    None if root.is_none() => root = Some(node),
                    None => return Err(decode_err("multiple root nodes")),
                }
            }
            Event::Eof => break,
            _ => {}
        }
    }

    if !open.is_empty() {
        return Err(decode_err("unterminated node element"));
    }
    let root = root.ok_or_else(|| decode_err("no root node"))?;

    let mut next_id: i64 = 1;
    Ok(Document::from_value(to_value(root, &mut next_id)))
}

fn to_value(node: Node, next_id: &mut i64) -> Value {
    let mut out = Map::new();
    out.insert("id".to_string(), Value::Number(Number::from(*next_id)));
    *next_id += 1;
    out.insert("title".to_string(), Value::String(node.title));

    if !node.children.is_empty() {
        let mut ideas = Map::new();
        for (rank, child) in node.children.into_iter().enumerate() {
            ideas.insert((rank + 1).to_string(), to_value(child, next_id));
        }
        out.insert("ideas".to_string(), Value::Object(ideas));
    }
    Value::Object(out)
}
