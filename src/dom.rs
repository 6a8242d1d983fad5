use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use serde_json::Value;

/// Shared handle to a node in the widget's internal structure.
pub type NodeHandle = Arc<Node>;

/// One node of the embedded widget's internals: an element (or document) with
/// attributes, children, and optionally an attached shadow root or a nested
/// frame document. Mirrors the shape the playback widget actually exposes,
/// without any rendering behind it.
#[derive(Debug)]
pub struct Node {
    tag: String,
    attrs: Mutex<HashMap<String, String>>,
    children: Mutex<Vec<NodeHandle>>,
    shadow_root: Mutex<Option<NodeHandle>>,
    content_document: Mutex<Option<NodeHandle>>,
    data: Mutex<Option<Value>>,
    cross_origin: AtomicBool,
}

impl Node {
    pub fn element(tag: &str) -> NodeHandle {
        Arc::new(Self {
            tag: tag.to_string(),
            attrs: Mutex::new(HashMap::new()),
            children: Mutex::new(Vec::new()),
            shadow_root: Mutex::new(None),
            content_document: Mutex::new(None),
            data: Mutex::new(None),
            cross_origin: AtomicBool::new(false),
        })
    }

    pub fn document() -> NodeHandle {
        Self::element("#document")
    }

    pub fn tag(&self) -> &str {
        &self.tag
    }

    pub fn append_child(&self, child: NodeHandle) {
        self.children.lock().expect("children lock").push(child);
    }

    pub fn set_attribute(&self, name: &str, value: &str) {
        self.attrs
            .lock()
            .expect("attrs lock")
            .insert(name.to_string(), value.to_string());
    }

    pub fn remove_attribute(&self, name: &str) {
        self.attrs.lock().expect("attrs lock").remove(name);
    }

    pub fn attribute(&self, name: &str) -> Option<String> {
        self.attrs.lock().expect("attrs lock").get(name).cloned()
    }

    /// Attaches (or returns the existing) isolated sub-tree root.
    pub fn attach_shadow(&self) -> NodeHandle {
        let mut slot = self.shadow_root.lock().expect("shadow lock");
        slot.get_or_insert_with(Node::document).clone()
    }

    pub fn shadow_root(&self) -> Option<NodeHandle> {
        self.shadow_root.lock().expect("shadow lock").clone()
    }

    /// Attaches (or returns the existing) nested frame document.
    pub fn attach_content_document(&self) -> NodeHandle {
        let mut slot = self.content_document.lock().expect("frame lock");
        slot.get_or_insert_with(Node::document).clone()
    }

    pub fn content_document(&self) -> Option<NodeHandle> {
        self.content_document.lock().expect("frame lock").clone()
    }

    /// Marks the node's nested document as cross-origin: traversal into it
    /// fails with an access error instead of a not-ready error.
    pub fn mark_cross_origin(&self) {
        self.cross_origin.store(true, Ordering::SeqCst);
    }

    pub fn is_cross_origin(&self) -> bool {
        self.cross_origin.load(Ordering::SeqCst)
    }

    /// Arbitrary JSON payload carried by the node (the collection-info object
    /// lives here on the widget's collection element).
    pub fn set_data(&self, value: Value) {
        *self.data.lock().expect("data lock") = Some(value);
    }

    pub fn data(&self) -> Option<Value> {
        self.data.lock().expect("data lock").clone()
    }

    /// Depth-first search of this subtree for the first match. Does not cross
    /// shadow or frame boundaries; those are explicit traversal hops.
    /// Supports `tag`, `#id`, `.class`, and `tag#id`.
    pub fn query_selector(self: &Arc<Self>, selector: &str) -> Option<NodeHandle> {
        let children = self.children.lock().expect("children lock").clone();
        for child in children {
            if child.matches(selector) {
                return Some(child);
            }
            if let Some(found) = child.query_selector(selector) {
                return Some(found);
            }
        }
        None
    }

    fn matches(&self, selector: &str) -> bool {
        if let Some(id) = selector.strip_prefix('#') {
            return self.attribute("id").as_deref() == Some(id);
        }
        if let Some(class) = selector.strip_prefix('.') {
            return self
                .attribute("class")
                .map(|value| value.split_whitespace().any(|c| c == class))
                .unwrap_or(false);
        }
        match selector.split_once('#') {
            Some((tag, id)) => self.tag == tag && self.attribute("id").as_deref() == Some(id),
            None => self.tag == selector,
        }
    }
}
