use std::sync::atomic::{AtomicBool, Ordering};

use serde_json::Value;

use crate::dom::{Node, NodeHandle};
use crate::params::EmbedParams;
use crate::traversal::{resolve_path, TraversalError, TraversalPath};

/// Capability surface the relay needs from the embedded playback widget:
/// a readiness snapshot, attribute writes, and one-shot resolution of a
/// traversal path into its internals. Implemented against whatever structure
/// the widget actually exposes.
pub trait Widget: Send + Sync {
    /// Snapshot of the widget's readiness flag at call time.
    fn inited(&self) -> bool;

    /// Last-write-wins attribute mutation on the widget element itself.
    fn set_attribute(&self, name: &str, value: &str);

    /// One synchronous traversal attempt from the widget element.
    fn resolve(&self, path: &TraversalPath) -> Result<NodeHandle, TraversalError>;
}

/// The embedded `<replay-web-page>` handle, modeled over the in-memory node
/// structure. Created exactly once at startup; only its attributes are ever
/// mutated afterwards.
pub struct ReplayWidget {
    element: NodeHandle,
    inited: AtomicBool,
}

impl ReplayWidget {
    pub fn new(params: &EmbedParams) -> Self {
        let element = Node::element("replay-web-page");
        element.set_attribute("source", &params.source);
        if let Some(url) = &params.url {
            element.set_attribute("url", url);
        }
        if let Some(ts) = &params.ts {
            element.set_attribute("ts", ts);
        }
        element.set_attribute("embed", params.embed.as_str());
        if params.deep_link {
            element.set_attribute("deepLink", "");
        }
        // Sandboxed by default; noSandbox inverts it.
        if !params.no_sandbox {
            element.set_attribute("sandbox", "");
        }
        Self {
            element,
            inited: AtomicBool::new(false),
        }
    }

    /// The widget element itself (the traversal root).
    pub fn element(&self) -> &NodeHandle {
        &self.element
    }

    /// Builds the widget's nested internal structure (frame document, app
    /// root, shadow chain, innermost replay frame document) and flips the
    /// readiness flag. Stands in for the widget rendering itself; returns the
    /// innermost document so callers can populate it.
    pub fn hydrate(&self, coll_info: Value) -> NodeHandle {
        let doc = self.element.attach_content_document();
        let app = match doc.query_selector("replay-app-main") {
            Some(app) => app,
            None => {
                let app = Node::element("replay-app-main");
                doc.append_child(app.clone());
                app
            }
        };
        let app_shadow = app.attach_shadow();
        let coll = match app_shadow.query_selector("wr-coll") {
            Some(coll) => coll,
            None => {
                let coll = Node::element("wr-coll");
                app_shadow.append_child(coll.clone());
                coll
            }
        };
        coll.set_data(coll_info);
        let coll_shadow = coll.attach_shadow();
        let replay = match coll_shadow.query_selector("wr-coll-replay") {
            Some(replay) => replay,
            None => {
                let replay = Node::element("wr-coll-replay");
                coll_shadow.append_child(replay.clone());
                replay
            }
        };
        let replay_shadow = replay.attach_shadow();
        let frame = match replay_shadow.query_selector("iframe") {
            Some(frame) => frame,
            None => {
                let frame = Node::element("iframe");
                replay_shadow.append_child(frame.clone());
                frame
            }
        };
        let inner = frame.attach_content_document();
        self.inited.store(true, Ordering::SeqCst);
        inner
    }

    pub fn set_inited(&self, value: bool) {
        self.inited.store(value, Ordering::SeqCst);
    }
}

impl Widget for ReplayWidget {
    fn inited(&self) -> bool {
        self.inited.load(Ordering::SeqCst)
    }

    fn set_attribute(&self, name: &str, value: &str) {
        self.element.set_attribute(name, value);
    }

    fn resolve(&self, path: &TraversalPath) -> Result<NodeHandle, TraversalError> {
        resolve_path(&self.element, path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::params::EmbedMode;
    use crate::traversal::coll_info_path;
    use serde_json::json;

    fn params() -> EmbedParams {
        EmbedParams {
            source: "archive.wacz".into(),
            url: Some("https://example.com/".into()),
            ts: None,
            embed: EmbedMode::ReplayOnly,
            deep_link: false,
            no_sandbox: false,
        }
    }

    #[test]
    fn maps_params_onto_attributes() {
        let widget = ReplayWidget::new(&params());
        assert_eq!(
            widget.element().attribute("source").as_deref(),
            Some("archive.wacz")
        );
        assert_eq!(
            widget.element().attribute("embed").as_deref(),
            Some("replayonly")
        );
        assert_eq!(widget.element().attribute("sandbox").as_deref(), Some(""));
        assert!(widget.element().attribute("ts").is_none());
    }

    #[test]
    fn no_sandbox_drops_the_default() {
        let mut p = params();
        p.no_sandbox = true;
        let widget = ReplayWidget::new(&p);
        assert!(widget.element().attribute("sandbox").is_none());
    }

    #[test]
    fn hydrate_flips_readiness_and_exposes_coll_info() {
        let widget = ReplayWidget::new(&params());
        assert!(!widget.inited());
        assert!(widget.resolve(&coll_info_path()).is_err());

        widget.hydrate(json!({"coll_count": 1}));
        assert!(widget.inited());
        let coll = widget.resolve(&coll_info_path()).expect("coll element");
        assert_eq!(coll.data(), Some(json!({"coll_count": 1})));
    }

    #[test]
    fn hydrate_is_idempotent() {
        let widget = ReplayWidget::new(&params());
        let first = widget.hydrate(json!({}));
        let second = widget.hydrate(json!({}));
        assert!(std::sync::Arc::ptr_eq(&first, &second));
    }
}
