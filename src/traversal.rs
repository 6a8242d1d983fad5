use thiserror::Error;

use crate::dom::NodeHandle;

/// One step through the widget's nested structure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Hop {
    /// Enter an element's nested frame document.
    FrameDocument,
    /// Enter an element's isolated (shadow) sub-tree.
    ShadowRoot,
    /// Select a descendant of the current node.
    Select(String),
}

/// An ordered hop sequence ending at a single element. Kept as data so the
/// fixed paths can change without touching the relay logic.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TraversalPath(pub Vec<Hop>);

#[derive(Debug, Error)]
pub enum TraversalError {
    /// An intermediate node is not there yet. Retryable: the widget may still
    /// be rendering.
    #[error("node missing at hop: {0}")]
    NodeMissing(String),
    /// The traversal hit a cross-origin frame document.
    #[error("access denied at hop: {0}")]
    AccessDenied(String),
}

impl TraversalError {
    pub fn is_retryable(&self) -> bool {
        matches!(self, TraversalError::NodeMissing(_))
    }
}

/// The path from the widget element to the innermost document that override
/// requests select into: frame document, app root, then the shadow chain down
/// to the replay frame.
pub fn override_path(selector: &str) -> TraversalPath {
    TraversalPath(vec![
        Hop::FrameDocument,
        Hop::Select("replay-app-main".into()),
        Hop::ShadowRoot,
        Hop::Select("wr-coll".into()),
        Hop::ShadowRoot,
        Hop::Select("wr-coll-replay".into()),
        Hop::ShadowRoot,
        Hop::Select("iframe".into()),
        Hop::FrameDocument,
        Hop::Select(selector.to_string()),
    ])
}

/// The shorter path to the element carrying the collection-info payload.
pub fn coll_info_path() -> TraversalPath {
    TraversalPath(vec![
        Hop::FrameDocument,
        Hop::Select("replay-app-main".into()),
        Hop::ShadowRoot,
        Hop::Select("wr-coll".into()),
    ])
}

/// Performs one synchronous resolution attempt from `root`. Never waits:
/// callers that want to ride out rendering delays poll via the locator.
pub fn resolve_path(root: &NodeHandle, path: &TraversalPath) -> Result<NodeHandle, TraversalError> {
    let mut current = root.clone();
    for hop in &path.0 {
        current = match hop {
            Hop::FrameDocument => {
                if current.is_cross_origin() {
                    return Err(TraversalError::AccessDenied(format!(
                        "frame document of <{}>",
                        current.tag()
                    )));
                }
                current.content_document().ok_or_else(|| {
                    TraversalError::NodeMissing(format!("frame document of <{}>", current.tag()))
                })?
            }
            Hop::ShadowRoot => current.shadow_root().ok_or_else(|| {
                TraversalError::NodeMissing(format!("shadow root of <{}>", current.tag()))
            })?,
            Hop::Select(selector) => current
                .query_selector(selector)
                .ok_or_else(|| TraversalError::NodeMissing(selector.clone()))?,
        };
    }
    Ok(current)
}
