//! Positional JSON decoding
//!
//! Input is parsed with serde_json only. It is data, never code.
//!
//! ```text
//! forest = [thread*]
//! thread = [name, frame*]
//! frame  = [descriptor, native, slot*]
//! slot   = [name, display, ref?]
//! node   = ["obj", jni, slot*] | ["seq", jni, item*] | [tag, value] | value
//! ```

use serde_json::Value;

use crate::error::{Error, Result};

use super::{Forest, Frame, Node, Slot, Thread};

/// Render a JSON scalar the way it is displayed: strings verbatim,
/// everything else in its JSON spelling.
pub fn display_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Pull the forest literal out of a page that embeds it in the element
/// with `id="forest"`. Returns None when there is no such element.
pub fn extract_embedded_forest(page: &str) -> Option<String> {
    let marker = page
        .find("id=\"forest\"")
        .or_else(|| page.find("id='forest'"))?;
    let open_end = marker + page[marker..].find('>')? + 1;
    let close = open_end + page[open_end..].find("</")?;
    Some(unescape_html(&page[open_end..close]))
}

fn unescape_html(text: &str) -> String {
    text.replace("&quot;", "\"")
        .replace("&#34;", "\"")
        .replace("&#39;", "'")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&amp;", "&")
}

impl Forest {
    /// Parse a JSON forest
    pub fn from_json(text: &str) -> Result<Self> {
        let value: Value = serde_json::from_str(text)
            .map_err(|e| Error::MalformedForest(format!("not valid JSON: {}", e)))?;
        Self::from_value(&value)
    }

    /// Parse either a bare JSON forest or a page embedding one
    pub fn from_page(text: &str) -> Result<Self> {
        if text.trim_start().starts_with('[') {
            return Self::from_json(text);
        }
        let embedded = extract_embedded_forest(text).ok_or_else(|| {
            Error::MalformedForest("no #forest element found in page".to_string())
        })?;
        Self::from_json(&embedded)
    }

    pub fn from_value(value: &Value) -> Result<Self> {
        let threads = as_array(value, "forest", Error::MalformedForest)?
            .iter()
            .enumerate()
            .map(|(i, thread)| decode_thread(thread, i))
            .collect::<Result<Vec<_>>>()?;
        Ok(Self { threads })
    }
}

impl Node {
    /// Parse a fetched node payload
    pub fn from_json(text: &str) -> Result<Self> {
        let value: Value = serde_json::from_str(text)
            .map_err(|e| Error::MalformedNode(format!("not valid JSON: {}", e)))?;
        Self::from_value(&value)
    }

    pub fn from_value(value: &Value) -> Result<Self> {
        let fields = match value {
            Value::Array(fields) => fields,
            Value::Object(_) => {
                return Err(Error::MalformedNode("expected an array or scalar".to_string()));
            }
            scalar => return Ok(Node::Scalar(display_value(scalar))),
        };

        let (tag, rest) = fields
            .split_first()
            .ok_or_else(|| Error::MalformedNode("empty node".to_string()))?;
        let tag = tag
            .as_str()
            .ok_or_else(|| Error::MalformedNode(format!("tag must be a string, got {}", tag)))?;

        match tag {
            "obj" => {
                let (jni, slots) = split_jni(rest)?;
                let slots = slots
                    .iter()
                    .map(|slot| decode_slot(slot, Error::MalformedNode))
                    .collect::<Result<Vec<_>>>()?;
                Ok(Node::Object { jni, slots })
            }
            "seq" => {
                let (jni, items) = split_jni(rest)?;
                Ok(Node::Sequence {
                    jni,
                    items: items.iter().map(display_value).collect(),
                })
            }
            _ => Ok(Node::Scalar(
                rest.first().map(display_value).unwrap_or_default(),
            )),
        }
    }
}

fn split_jni(fields: &[Value]) -> Result<(String, &[Value])> {
    let (jni, rest) = fields
        .split_first()
        .ok_or_else(|| Error::MalformedNode("missing type descriptor".to_string()))?;
    let jni = jni
        .as_str()
        .ok_or_else(|| Error::MalformedNode(format!("type descriptor must be a string, got {}", jni)))?;
    Ok((jni.to_string(), rest))
}

fn decode_thread(value: &Value, index: usize) -> Result<Thread> {
    let fields = as_array(value, "thread", Error::MalformedForest)?;
    let (name, frames) = fields
        .split_first()
        .ok_or_else(|| Error::MalformedForest(format!("thread {} is empty", index)))?;

    let frames = frames
        .iter()
        .map(decode_frame)
        .collect::<Result<Vec<_>>>()?;

    Ok(Thread {
        name: display_value(name),
        frames,
    })
}

fn decode_frame(value: &Value) -> Result<Frame> {
    let fields = as_array(value, "frame", Error::MalformedForest)?;
    let [function, native, slots @ ..] = fields.as_slice() else {
        return Err(Error::MalformedForest(format!(
            "frame needs a descriptor and a native flag, got {}",
            value
        )));
    };

    let function = function
        .as_str()
        .ok_or_else(|| Error::MalformedForest(format!("frame descriptor must be a string, got {}", function)))?;
    let native = native
        .as_bool()
        .ok_or_else(|| Error::MalformedForest(format!("native flag must be a boolean, got {}", native)))?;
    let slots = slots
        .iter()
        .map(|slot| decode_slot(slot, Error::MalformedForest))
        .collect::<Result<Vec<_>>>()?;

    Ok(Frame {
        function: function.to_string(),
        native,
        slots,
    })
}

fn decode_slot(value: &Value, malformed: fn(String) -> Error) -> Result<Slot> {
    let fields = as_array(value, "slot", malformed)?;
    let [name, display, rest @ ..] = fields.as_slice() else {
        return Err(malformed(format!("slot needs a name and a value, got {}", value)));
    };

    let reference = match rest.first() {
        None | Some(Value::Null) => None,
        Some(Value::String(s)) => Some(s.clone()),
        Some(Value::Number(n)) => Some(n.to_string()),
        Some(other) => {
            return Err(malformed(format!(
                "slot reference must be a string or number, got {}",
                other
            )));
        }
    };

    Ok(Slot {
        name: display_value(name),
        value: display_value(display),
        reference,
    })
}

fn as_array<'a>(
    value: &'a Value,
    what: &str,
    malformed: fn(String) -> Error,
) -> Result<&'a Vec<Value>> {
    value
        .as_array()
        .ok_or_else(|| malformed(format!("{} must be an array, got {}", what, value)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn sample_forest() -> Value {
        json!([
            ["<1> main", [
                "android/os/MessageQueue.nativePollOnce(JI)V", true
            ], [
                "com/example/Main.run()V:42", false,
                ["this", "<c.e.Main>", "/t/0/1/this"],
                ["count", 3, "/t/0/1/count"],
                ["label", null]
            ]],
            ["<2> worker"]
        ])
    }

    #[test]
    fn test_decode_forest() {
        let forest = Forest::from_value(&sample_forest()).unwrap();
        assert_eq!(forest.len(), 2);
        assert_eq!(forest.frame_count(), 2);

        let main = &forest.threads[0];
        assert_eq!(main.name, "<1> main");
        assert!(main.frames[0].native);
        assert!(main.frames[0].slots.is_empty());

        let run = &main.frames[1];
        assert_eq!(run.function, "com/example/Main.run()V:42");
        assert!(!run.native);
        assert_eq!(run.slots.len(), 3);
        assert_eq!(run.slots[0].reference.as_deref(), Some("/t/0/1/this"));
        assert_eq!(run.slots[1].value, "3");
        assert_eq!(run.slots[2].value, "null");
        assert!(!run.slots[2].is_expandable());

        assert!(forest.threads[1].frames.is_empty());
    }

    #[test]
    fn test_slot_order_preserved() {
        let forest = Forest::from_json(
            r#"[["t", ["f()V", false, ["z", "1"], ["a", "2"], ["m", "3"]]]]"#,
        )
        .unwrap();
        let names: Vec<&str> = forest.threads[0].frames[0]
            .slots
            .iter()
            .map(|s| s.name.as_str())
            .collect();
        assert_eq!(names, vec!["z", "a", "m"]);
    }

    #[test]
    fn test_forest_rejects_code() {
        let err = Forest::from_json("(function(){ return [] })()").unwrap_err();
        assert!(matches!(err, Error::MalformedForest(_)));
    }

    #[test]
    fn test_forest_rejects_bad_frame() {
        let err = Forest::from_json(r#"[["t", ["f()V"]]]"#).unwrap_err();
        assert!(matches!(err, Error::MalformedForest(_)));

        let err = Forest::from_json(r#"[["t", ["f()V", "yes"]]]"#).unwrap_err();
        assert!(matches!(err, Error::MalformedForest(_)));

        let err = Forest::from_json(r#"[[]]"#).unwrap_err();
        assert!(matches!(err, Error::MalformedForest(_)));
    }

    #[test]
    fn test_decode_object_node() {
        let node = Node::from_value(&json!([
            "obj", "Lcom/example/Main;",
            ["mName", "main", "mName"],
            ["mId", 7, "mId"]
        ]))
        .unwrap();

        match node {
            Node::Object { jni, slots } => {
                assert_eq!(jni, "Lcom/example/Main;");
                assert_eq!(slots.len(), 2);
                assert_eq!(slots[1].value, "7");
                assert_eq!(slots[1].reference.as_deref(), Some("mId"));
            }
            other => panic!("expected object, got {:?}", other),
        }
    }

    #[test]
    fn test_decode_sequence_node() {
        let node = Node::from_value(&json!(["seq", "[I", 1, 2, 3])).unwrap();
        assert_eq!(
            node,
            Node::Sequence {
                jni: "[I".to_string(),
                items: vec!["1".into(), "2".into(), "3".into()],
            }
        );
        assert_eq!(node.child_count(), 3);
    }

    #[test]
    fn test_unknown_tag_is_scalar() {
        assert_eq!(
            Node::from_value(&json!(["val", 42])).unwrap(),
            Node::Scalar("42".to_string())
        );
        assert_eq!(
            Node::from_value(&json!(["whatever", "text"])).unwrap(),
            Node::Scalar("text".to_string())
        );
        assert_eq!(
            Node::from_value(&json!(["val"])).unwrap(),
            Node::Scalar(String::new())
        );
    }

    #[test]
    fn test_bare_scalar_payload() {
        assert_eq!(
            Node::from_json("\"hello\"").unwrap(),
            Node::Scalar("hello".to_string())
        );
        assert_eq!(Node::from_json("true").unwrap(), Node::Scalar("true".to_string()));
    }

    #[test]
    fn test_malformed_nodes() {
        for payload in [r#"[]"#, r#"[1, 2]"#, r#"["obj"]"#, r#"["obj", "LFoo;", "x"]"#, r#"{"a": 1}"#, "not json"] {
            let err = Node::from_json(payload).unwrap_err();
            assert!(matches!(err, Error::MalformedNode(_)), "payload {payload}");
        }
    }

    #[test]
    fn test_numeric_reference() {
        let node = Node::from_value(&json!(["obj", "LFoo;", ["x", "1", 0]])).unwrap();
        let Node::Object { slots, .. } = node else {
            panic!("expected object");
        };
        assert_eq!(slots[0].reference.as_deref(), Some("0"));
    }

    #[test]
    fn test_extract_embedded_forest() {
        let page = r#"<html><body>
            <div id="forest" style="display:none">[[&quot;main&quot;, [&quot;f()V&quot;, false]]]</div>
            <div id="threads"></div>
        </body></html>"#;

        let text = extract_embedded_forest(page).unwrap();
        assert_eq!(text, r#"[["main", ["f()V", false]]]"#);

        let forest = Forest::from_page(page).unwrap();
        assert_eq!(forest.threads[0].name, "main");
    }

    #[test]
    fn test_from_page_accepts_bare_json() {
        let forest = Forest::from_page("  [[\"main\"]]").unwrap();
        assert_eq!(forest.len(), 1);
    }

    #[test]
    fn test_from_page_without_forest() {
        let err = Forest::from_page("<html></html>").unwrap_err();
        assert!(matches!(err, Error::MalformedForest(_)));
    }
}
