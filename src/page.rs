//! Page documents and their element records.
//!
//! Page JSON is written by hand, so parsing is lenient: fields of the wrong
//! shape are ignored rather than rejected, and every element is validated
//! into one of the closed [`Element`] variants. Records whose `type` is
//! missing or unrecognized become [`Element::Unknown`].

use serde_json::{Map, Value};

use crate::elements::ElementKind;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Page {
    pub title: Option<String>,
    pub name: Option<String>,
    pub date: Option<String>,
    pub page_type: Option<String>,
    pub brief: Vec<String>,
    pub elements: Vec<Element>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Element {
    Synopsis(TextElement),
    DesignBrief(BriefElement),
    Notes(TextElement),
    Pdf(MediaElement),
    Video(MediaElement),
    Script(MediaElement),
    Image(MediaElement),
    Unknown(UnknownElement),
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct TextElement {
    pub title: Option<String>,
    pub label: Option<String>,
    pub content: String,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct BriefElement {
    pub title: Option<String>,
    /// Present when the record carried an `items` list of texts.
    pub entries: Option<Vec<String>>,
    pub content: String,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct MediaElement {
    pub title: Option<String>,
    pub label: Option<String>,
    pub items: Vec<Item>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Item {
    pub src: Option<String>,
    pub label: Option<String>,
    pub language: Option<String>,
    pub alt: Option<String>,
    pub description: Option<String>,
    pub code: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct UnknownElement {
    pub kind: String,
    pub title: Option<String>,
    pub label: Option<String>,
}

impl Page {
    pub fn from_json_str(raw: &str) -> Result<Self, String> {
        let value: Value = serde_json::from_str(raw).map_err(|err| err.to_string())?;
        match value {
            Value::Object(map) => Ok(Self::from_map(&map)),
            _ => Err("expected a JSON object".to_string()),
        }
    }

    pub fn from_map(map: &Map<String, Value>) -> Self {
        let brief = match map.get("brief") {
            Some(Value::Array(lines)) => lines.iter().filter_map(value_string).collect(),
            _ => Vec::new(),
        };
        let elements = match map.get("elements") {
            Some(Value::Array(records)) => records.iter().map(Element::from_value).collect(),
            _ => Vec::new(),
        };

        Self {
            title: string_field(map, "title"),
            name: string_field(map, "name"),
            date: string_field(map, "date").filter(|d| !d.trim().is_empty()),
            page_type: string_field(map, "type"),
            brief,
            elements,
        }
    }
}

impl Element {
    pub fn from_value(value: &Value) -> Self {
        let empty = Map::new();
        let map = value.as_object().unwrap_or(&empty);
        let raw_kind = string_field(map, "type").unwrap_or_default();
        let title = string_field(map, "title");
        let label = string_field(map, "label");
        let content = string_field(map, "content")
            .or_else(|| string_field(map, "text"))
            .unwrap_or_default();

        let Some(kind) = ElementKind::from_tag(&raw_kind) else {
            return Element::Unknown(UnknownElement {
                kind: raw_kind,
                title,
                label,
            });
        };

        let text = || TextElement {
            title: title.clone(),
            label: label.clone(),
            content: content.clone(),
        };
        let media = || MediaElement {
            title: title.clone(),
            label: label.clone(),
            items: normalize_items(map),
        };

        match kind {
            ElementKind::Synopsis => Element::Synopsis(text()),
            ElementKind::Notes => Element::Notes(text()),
            ElementKind::DesignBrief => Element::DesignBrief(BriefElement {
                title: title.clone(),
                entries: match map.get("items") {
                    Some(Value::Array(items)) => {
                        Some(items.iter().filter_map(value_string).collect())
                    }
                    _ => None,
                },
                content: content.clone(),
            }),
            ElementKind::Pdf => Element::Pdf(media()),
            ElementKind::Video => Element::Video(media()),
            ElementKind::Script => Element::Script(media()),
            ElementKind::Image => Element::Image(media()),
        }
    }

    pub fn kind(&self) -> Option<ElementKind> {
        Some(match self {
            Element::Synopsis(_) => ElementKind::Synopsis,
            Element::DesignBrief(_) => ElementKind::DesignBrief,
            Element::Notes(_) => ElementKind::Notes,
            Element::Pdf(_) => ElementKind::Pdf,
            Element::Video(_) => ElementKind::Video,
            Element::Script(_) => ElementKind::Script,
            Element::Image(_) => ElementKind::Image,
            Element::Unknown(_) => return None,
        })
    }
}

impl Item {
    fn from_map(map: &Map<String, Value>) -> Self {
        Self {
            src: string_field(map, "src"),
            label: string_field(map, "label"),
            language: string_field(map, "language").filter(|l| !l.trim().is_empty()),
            alt: string_field(map, "alt"),
            description: string_field(map, "description").filter(|d| !d.trim().is_empty()),
            code: map.get("code").filter(|v| !v.is_null()).and_then(value_string),
        }
    }
}

/// `items` objects in order; a lone `src` on the element stands for a single
/// item.
fn normalize_items(map: &Map<String, Value>) -> Vec<Item> {
    match map.get("items") {
        Some(Value::Array(items)) => items
            .iter()
            .filter_map(Value::as_object)
            .map(Item::from_map)
            .collect(),
        _ => match string_field(map, "src").filter(|src| !src.is_empty()) {
            Some(src) => vec![Item {
                src: Some(src),
                label: string_field(map, "label"),
                ..Item::default()
            }],
            None => Vec::new(),
        },
    }
}

fn string_field(map: &Map<String, Value>, key: &str) -> Option<String> {
    map.get(key).and_then(value_string)
}

fn value_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn parses_page_fields_leniently() {
        let page = Page::from_json_str(
            r#"{"title": "{id}", "date": 20250828, "type": "Build",
                "brief": ["one", 2, null], "elements": "not a list"}"#,
        )
        .expect("page parses");

        assert_eq!(page.title.as_deref(), Some("{id}"));
        assert_eq!(page.date.as_deref(), Some("20250828"));
        assert_eq!(page.page_type.as_deref(), Some("Build"));
        assert_eq!(page.brief, vec!["one".to_string(), "2".to_string()]);
        assert!(page.elements.is_empty());
    }

    #[test]
    fn rejects_non_object_documents() {
        assert!(Page::from_json_str("[1, 2]").is_err());
        assert!(Page::from_json_str("{broken").is_err());
    }

    #[test]
    fn element_tags_are_normalized() {
        let element = Element::from_value(&json!({"type": " Design Brief ", "items": ["a", "b"]}));
        assert_eq!(
            element,
            Element::DesignBrief(BriefElement {
                title: None,
                entries: Some(vec!["a".into(), "b".into()]),
                content: String::new(),
            })
        );
        assert_eq!(
            Element::from_value(&json!({"type": "IMAGES", "src": "a.png"})).kind(),
            Some(ElementKind::Image)
        );
    }

    #[test]
    fn unknown_and_missing_types_are_explicit() {
        let element = Element::from_value(&json!({"type": "Spreadsheet", "title": "Costs"}));
        assert_eq!(
            element,
            Element::Unknown(UnknownElement {
                kind: "Spreadsheet".into(),
                title: Some("Costs".into()),
                label: None,
            })
        );
        assert!(matches!(Element::from_value(&json!({})), Element::Unknown(_)));
        assert!(matches!(Element::from_value(&json!("text")), Element::Unknown(_)));
    }

    #[test]
    fn lone_src_becomes_single_item() {
        let Element::Pdf(pdf) = Element::from_value(&json!({"type": "pdf", "src": "a.pdf", "label": "Plan"}))
        else {
            panic!("expected pdf element");
        };
        assert_eq!(pdf.items.len(), 1);
        assert_eq!(pdf.items[0].src.as_deref(), Some("a.pdf"));
        assert_eq!(pdf.items[0].label.as_deref(), Some("Plan"));
    }

    #[test]
    fn non_object_items_are_skipped() {
        let Element::Script(script) = Element::from_value(&json!({
            "type": "script",
            "items": [{"src": "main.py"}, "stray", {"code": "print(1)", "language": ""}]
        })) else {
            panic!("expected script element");
        };
        assert_eq!(script.items.len(), 2);
        assert_eq!(script.items[1].code.as_deref(), Some("print(1)"));
        assert_eq!(script.items[1].language, None);
    }

    #[test]
    fn text_falls_back_to_text_field() {
        let Element::Notes(notes) = Element::from_value(&json!({"type": "notes", "text": "hi"})) else {
            panic!("expected notes element");
        };
        assert_eq!(notes.content, "hi");
    }
}
