//! XML document → nested JSON tree
//!
//! Conversion rules:
//! - attributes become `@name` keys
//! - text of an element with attributes or children becomes `#text`
//! - an element with only text becomes a string, an empty element `null`
//! - repeated sibling elements collapse into an array, a single one does not
//!
//! The last rule means a list with one item looks like an object; readers go
//! through [`one_or_many`] to get a uniform view.

use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;
use serde_json::{Map, Value};
use shelfgraph_common::{Error, Result};

struct Frame {
    name: String,
    fields: Map<String, Value>,
    text: String,
}

impl Frame {
    fn open(start: &BytesStart<'_>) -> Result<Self> {
        let name = String::from_utf8_lossy(start.name().as_ref()).into_owned();
        let mut fields = Map::new();
        for attr in start.attributes() {
            let attr = attr.map_err(|e| xml_error(format!("attribute of <{}>: {}", name, e)))?;
            let key = format!("@{}", String::from_utf8_lossy(attr.key.as_ref()));
            let value = attr
                .unescape_value()
                .map_err(|e| xml_error(format!("attribute of <{}>: {}", name, e)))?;
            fields.insert(key, Value::String(value.into_owned()));
        }
        Ok(Self {
            name,
            fields,
            text: String::new(),
        })
    }

    fn close(self) -> (String, Value) {
        let value = if self.fields.is_empty() {
            if self.text.is_empty() {
                Value::Null
            } else {
                Value::String(self.text)
            }
        } else {
            let mut fields = self.fields;
            if !self.text.is_empty() {
                fields.insert("#text".to_string(), Value::String(self.text));
            }
            Value::Object(fields)
        };
        (self.name, value)
    }

    fn attach(&mut self, name: String, value: Value) {
        match self.fields.get_mut(&name) {
            Some(Value::Array(items)) => items.push(value),
            Some(existing) => {
                let first = existing.take();
                *existing = Value::Array(vec![first, value]);
            }
            None => {
                self.fields.insert(name, value);
            }
        }
    }
}

fn xml_error(message: String) -> Error {
    Error::RemoteService(format!("XML parse error: {}", message))
}

/// Parse an XML document into a tree keyed by the root element's name
pub fn xml_to_tree(xml: &str) -> Result<Value> {
    let mut reader = Reader::from_str(xml);
    reader.trim_text(true);

    let mut stack = vec![Frame {
        name: String::new(),
        fields: Map::new(),
        text: String::new(),
    }];

    loop {
        let event = reader
            .read_event()
            .map_err(|e| xml_error(format!("at byte {}: {}", reader.buffer_position(), e)))?;

        match event {
            Event::Start(start) => stack.push(Frame::open(&start)?),
            Event::Empty(start) => {
                let (name, value) = Frame::open(&start)?.close();
                if let Some(parent) = stack.last_mut() {
                    parent.attach(name, value);
                }
            }
            Event::Text(text) => {
                let text = text
                    .unescape()
                    .map_err(|e| xml_error(format!("at byte {}: {}", reader.buffer_position(), e)))?;
                if let Some(top) = stack.last_mut() {
                    top.text.push_str(&text);
                }
            }
            Event::CData(data) => {
                if let Some(top) = stack.last_mut() {
                    top.text.push_str(&String::from_utf8_lossy(&data.into_inner()));
                }
            }
            Event::End(_) => {
                if stack.len() < 2 {
                    return Err(xml_error("unbalanced closing tag".to_string()));
                }
                if let Some(frame) = stack.pop() {
                    let (name, value) = frame.close();
                    if let Some(parent) = stack.last_mut() {
                        parent.attach(name, value);
                    }
                }
            }
            Event::Eof => break,
            _ => {}
        }
    }

    if stack.len() != 1 {
        return Err(xml_error("document ended inside an element".to_string()));
    }

    Ok(Value::Object(stack.remove(0).fields))
}

/// Follow a key path through nested objects
pub fn lookup<'a>(value: &'a Value, path: &[&str]) -> Option<&'a Value> {
    path.iter().try_fold(value, |current, key| current.get(*key))
}

/// Uniform view of an element that may appear zero, one, or many times
pub fn one_or_many(value: Option<&Value>) -> Vec<&Value> {
    match value {
        None | Some(Value::Null) => Vec::new(),
        Some(Value::Array(items)) => items.iter().collect(),
        Some(single) => vec![single],
    }
}

/// Scalar text of a leaf, unwrapping `{"@type": .., "#text": ..}` nodes
pub fn scalar_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.trim().to_string()),
        Value::Number(n) => Some(n.to_string()),
        Value::Object(fields) => fields.get("#text").and_then(scalar_text),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_attributes_and_text() {
        let tree = xml_to_tree(r#"<book><id type="integer">42</id><title>Dr. No</title></book>"#).unwrap();
        assert_eq!(
            tree,
            json!({"book": {"id": {"@type": "integer", "#text": "42"}, "title": "Dr. No"}})
        );
    }

    #[test]
    fn test_repeated_siblings_become_array() {
        let tree = xml_to_tree("<books><book>a</book><book>b</book><book>c</book></books>").unwrap();
        assert_eq!(tree, json!({"books": {"book": ["a", "b", "c"]}}));
    }

    #[test]
    fn test_single_child_stays_scalar() {
        let tree = xml_to_tree("<books><book>a</book></books>").unwrap();
        assert_eq!(one_or_many(lookup(&tree, &["books", "book"])).len(), 1);
    }

    #[test]
    fn test_empty_elements_are_null() {
        let tree = xml_to_tree("<work><average_rating/><ratings_count></ratings_count></work>").unwrap();
        assert_eq!(tree, json!({"work": {"average_rating": null, "ratings_count": null}}));
        assert!(one_or_many(lookup(&tree, &["work", "average_rating"])).is_empty());
    }

    #[test]
    fn test_cdata_and_entities() {
        let tree = xml_to_tree("<t><a><![CDATA[Live & Let Die]]></a><b>From Russia &amp; Love</b></t>").unwrap();
        assert_eq!(scalar_text(lookup(&tree, &["t", "a"]).unwrap()).unwrap(), "Live & Let Die");
        assert_eq!(scalar_text(lookup(&tree, &["t", "b"]).unwrap()).unwrap(), "From Russia & Love");
    }

    #[test]
    fn test_declaration_is_ignored() {
        let tree = xml_to_tree("<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n<r><x>1</x></r>").unwrap();
        assert_eq!(tree, json!({"r": {"x": "1"}}));
    }

    #[test]
    fn test_truncated_document_is_error() {
        assert!(xml_to_tree("<r><x>1</x>").is_err());
    }

    #[test]
    fn test_scalar_text_variants() {
        assert_eq!(scalar_text(&json!(" 3.95 ")).as_deref(), Some("3.95"));
        assert_eq!(scalar_text(&json!(12)).as_deref(), Some("12"));
        assert_eq!(scalar_text(&json!({"#text": "7"})).as_deref(), Some("7"));
        assert_eq!(scalar_text(&json!({"@type": "integer"})), None);
        assert_eq!(scalar_text(&Value::Null), None);
    }
}
