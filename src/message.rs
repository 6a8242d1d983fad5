use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Reference to whoever posted an inbound message. `href` is `None` when the
/// sender is cross-origin-opaque and its location cannot be read.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SenderRef {
    pub href: Option<String>,
}

impl SenderRef {
    pub fn window(href: &str) -> Self {
        Self {
            href: Some(href.to_string()),
        }
    }

    pub fn opaque() -> Self {
        Self { href: None }
    }
}

/// An inbound cross-boundary message: the poster's origin, a reference to the
/// poster, and an arbitrary JSON payload inspected for recognized command
/// keys.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Inbound {
    pub origin: String,
    #[serde(default)]
    pub sender: SenderRef,
    #[serde(default)]
    pub data: Value,
}

/// A reply (or forward) headed for the embedding page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Outbound {
    pub target_origin: String,
    pub data: Value,
}

/// Payload of an `overrideElementAttribute` command. Absent fields default to
/// empty strings and flow straight into the attribute write; nothing here is
/// rejected.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct OverrideRequest {
    pub selector: String,
    pub attribute_name: String,
    pub attribute_contents: String,
}

/// Field merged into every outbound message so the embedder can tell which
/// exhibitor page is talking.
pub const HREF_FIELD: &str = "waczExhibitorHref";

/// Merges the page-address field into a payload. Non-object payloads collapse
/// to an object carrying only the address field.
pub fn with_href(payload: &Value, href: &str) -> Value {
    let mut map = match payload {
        Value::Object(map) => map.clone(),
        _ => Map::new(),
    };
    map.insert(HREF_FIELD.to_string(), Value::String(href.to_string()));
    Value::Object(map)
}
