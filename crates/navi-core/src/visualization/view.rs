//! Node rendering
//!
//! Turns one fetched [`Node`] into a [`NodeView`]: a heading plus collapsed
//! children. A child is never expanded here; expandable values carry the path
//! that will fetch them, captured when the view is built.

use serde::Serialize;

use crate::abbrev::Abbreviated;
use crate::model::{Node, Slot};
use crate::path::RefPath;

use super::RenderOptions;

/// A displayed value, interactive when it has a target
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ValueView {
    pub text: String,
    /// Path fetched when this value is activated
    #[serde(skip_serializing_if = "Option::is_none")]
    pub target: Option<RefPath>,
}

impl ValueView {
    pub fn plain(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            target: None,
        }
    }

    pub fn link(text: impl Into<String>, target: RefPath) -> Self {
        Self {
            text: text.into(),
            target: Some(target),
        }
    }

    pub fn is_interactive(&self) -> bool {
        self.target.is_some()
    }

    fn render_text(&self, options: &RenderOptions) -> String {
        match &self.target {
            Some(target) if options.show_paths => format!("{} -> {}", self.text, target),
            _ => self.text.clone(),
        }
    }
}

/// A `name = value` row
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SlotView {
    pub name: String,
    pub value: ValueView,
}

/// Body of a rendered node, one variant per node kind
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum NodeBody {
    Object {
        heading: Abbreviated,
        slots: Vec<SlotView>,
    },
    Sequence {
        heading: Abbreviated,
        items: Vec<ValueView>,
    },
    Scalar {
        value: ValueView,
    },
}

/// A rendered node and the base path its children resolve against
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NodeView {
    pub base: RefPath,
    #[serde(flatten)]
    pub body: NodeBody,
}

impl NodeView {
    /// Render a fetched node. `base` is the path it was fetched from.
    pub fn render(base: RefPath, node: Node) -> Self {
        let body = match node {
            Node::Object { jni, slots } => NodeBody::Object {
                heading: Abbreviated::jni(jni),
                slots: render_slots(&base, &slots),
            },
            Node::Sequence { jni, items } => NodeBody::Sequence {
                heading: Abbreviated::jni(jni),
                items: render_items(&base, &items),
            },
            Node::Scalar(value) => NodeBody::Scalar {
                value: ValueView::plain(value),
            },
        };
        Self { base, body }
    }

    pub fn heading(&self) -> Option<&Abbreviated> {
        match &self.body {
            NodeBody::Object { heading, .. } | NodeBody::Sequence { heading, .. } => Some(heading),
            NodeBody::Scalar { .. } => None,
        }
    }

    /// Interactive values in display order
    pub fn links(&self) -> Vec<&ValueView> {
        match &self.body {
            NodeBody::Object { slots, .. } => slots
                .iter()
                .map(|slot| &slot.value)
                .filter(|value| value.is_interactive())
                .collect(),
            NodeBody::Sequence { items, .. } => {
                items.iter().filter(|item| item.is_interactive()).collect()
            }
            NodeBody::Scalar { .. } => Vec::new(),
        }
    }

    /// Render as plain text
    pub fn render_text(&self, options: &RenderOptions) -> String {
        let indent = " ".repeat(options.indent_width);
        let mut output = String::new();

        match &self.body {
            NodeBody::Object { heading, slots } => {
                output.push_str(heading.text(options.full_names));
                output.push('\n');
                for slot in slots {
                    output.push_str(&format!(
                        "{}{} = {}\n",
                        indent,
                        slot.name,
                        slot.value.render_text(options)
                    ));
                }
            }
            NodeBody::Sequence { heading, items } => {
                output.push_str(heading.text(options.full_names));
                output.push('\n');
                if !items.is_empty() {
                    let joined: Vec<String> =
                        items.iter().map(|item| item.render_text(options)).collect();
                    output.push_str(&indent);
                    output.push_str(&joined.join(", "));
                    output.push('\n');
                }
            }
            NodeBody::Scalar { value } => {
                output.push_str(&value.text);
                output.push('\n');
            }
        }

        output
    }
}

/// Render slots owned by a node (or frame) at `base`.
///
/// Each expandable slot captures its own resolved path.
pub fn render_slots(base: &RefPath, slots: &[Slot]) -> Vec<SlotView> {
    slots
        .iter()
        .map(|slot| SlotView {
            name: slot.name.clone(),
            value: match &slot.reference {
                Some(fragment) => ValueView::link(&slot.value, base.child(fragment)),
                None => ValueView::plain(&slot.value),
            },
        })
        .collect()
}

/// Render sequence items; each item is addressed by its position.
pub fn render_items(base: &RefPath, items: &[String]) -> Vec<ValueView> {
    items
        .iter()
        .enumerate()
        .map(|(index, item)| ValueView::link(item, base.index(index)))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn object() -> Node {
        Node::Object {
            jni: "Ljava/util/HashMap;".to_string(),
            slots: vec![
                Slot::new("table", "<j.u.HashMap$Node[]>").with_reference("table"),
                Slot::new("size", "2").with_reference("size"),
                Slot::new("comment", "n/a"),
            ],
        }
    }

    #[test]
    fn test_object_view() {
        let view = NodeView::render("/t/0/1/this".into(), object());

        let heading = view.heading().unwrap();
        assert_eq!(heading.display, "j.u.HashMap");
        assert_eq!(heading.original, "Ljava/util/HashMap;");

        let NodeBody::Object { slots, .. } = &view.body else {
            panic!("expected object body");
        };
        let names: Vec<&str> = slots.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names, vec!["table", "size", "comment"]);
        assert_eq!(
            slots[0].value.target.as_ref().map(RefPath::as_str),
            Some("/t/0/1/this/table")
        );
        assert!(!slots[2].value.is_interactive());
    }

    #[test]
    fn test_object_links_relative_to_base_with_trailing_slash() {
        let view = NodeView::render("/t/0/1/this/".into(), object());
        let targets: Vec<&str> = view
            .links()
            .iter()
            .filter_map(|v| v.target.as_ref().map(RefPath::as_str))
            .collect();
        assert_eq!(targets, vec!["/t/0/1/this/table", "/t/0/1/this/size"]);
    }

    #[test]
    fn test_sequence_paths_bounded() {
        let node = Node::Sequence {
            jni: "[I".to_string(),
            items: vec!["1".into(), "2".into(), "3".into()],
        };
        let view = NodeView::render("x".into(), node);

        let targets: Vec<String> = view
            .links()
            .iter()
            .filter_map(|v| v.target.as_ref().map(|t| t.to_string()))
            .collect();
        assert_eq!(targets, vec!["x/0", "x/1", "x/2"]);
    }

    #[test]
    fn test_empty_sequence_has_no_links() {
        let node = Node::Sequence {
            jni: "[Ljava/lang/Object;".to_string(),
            items: Vec::new(),
        };
        let view = NodeView::render("x".into(), node);
        assert!(view.links().is_empty());
        assert_eq!(view.render_text(&RenderOptions::default()), "j.l.Object[]\n");
    }

    #[test]
    fn test_scalar_view_not_interactive() {
        let view = NodeView::render("/t/0/0/x".into(), Node::Scalar("42".into()));
        assert!(view.heading().is_none());
        assert!(view.links().is_empty());
        assert_eq!(view.render_text(&RenderOptions::default()), "42\n");
    }

    #[test]
    fn test_render_text_object() {
        let view = NodeView::render("/o".into(), object());
        let text = view.render_text(&RenderOptions::default());
        assert!(text.starts_with("j.u.HashMap\n"));
        assert!(text.contains("size = 2 -> /o/size"));
        assert!(text.contains("comment = n/a\n"));

        let full = view.render_text(&RenderOptions::default().with_full_names(true));
        assert!(full.starts_with("Ljava/util/HashMap;\n"));
    }

    #[test]
    fn test_render_text_sequence() {
        let node = Node::Sequence {
            jni: "[[I".to_string(),
            items: vec!["<I[]>".into(), "<I[]>".into()],
        };
        let view = NodeView::render("a".into(), node);
        let text = view.render_text(&RenderOptions::minimal());
        assert_eq!(text, "I[][]\n    <I[]>, <I[]>\n");
    }

    #[test]
    fn test_serialize_view() {
        let view = NodeView::render("/o".into(), object());
        let json = serde_json::to_value(&view).unwrap();
        assert_eq!(json["kind"], "object");
        assert_eq!(json["base"], "/o");
        assert_eq!(json["slots"][0]["value"]["target"], "/o/table");
        assert!(json["slots"][2]["value"].get("target").is_none());
    }
}
