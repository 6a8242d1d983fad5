use std::sync::Arc;

use serde_json::{json, Value};
use tokio::sync::mpsc;
use url::Url;
use uuid::Uuid;

use crate::locator::{locate, LocateError, Ticker};
use crate::message::{with_href, Inbound, Outbound, OverrideRequest};
use crate::timestamp;
use crate::traversal::{coll_info_path, override_path, TraversalError};
use crate::widget::Widget;

/// The message router. Owns the widget handle and all reply semantics;
/// constructed once at startup. Handling is re-entrant: each override request
/// runs on its own task over a fresh traversal, so no locking beyond the
/// widget's own attribute map is needed.
#[derive(Clone)]
pub struct Relay {
    widget: Arc<dyn Widget>,
    href: String,
    replay_base: String,
    outbound: mpsc::UnboundedSender<Outbound>,
    ticker: Ticker,
}

impl Relay {
    pub fn new(
        widget: Arc<dyn Widget>,
        page: Url,
        outbound: mpsc::UnboundedSender<Outbound>,
    ) -> Self {
        let replay_base = page
            .join("replay/")
            .map(|u| u.to_string())
            .unwrap_or_else(|_| format!("{page}replay/"));
        Self {
            widget,
            href: page.to_string(),
            replay_base,
            outbound,
            ticker: Ticker::frame(),
        }
    }

    /// Overrides the poll cadence (tests use `Ticker::immediate`).
    pub fn with_ticker(mut self, ticker: Ticker) -> Self {
        self.ticker = ticker;
        self
    }

    /// Classifies and dispatches one inbound message. Worker-origin messages
    /// are forwarded to the parent; everything else is inspected for command
    /// keys, and every recognized key runs its handler independently.
    pub fn on_message(&self, msg: Inbound) {
        match &msg.sender.href {
            Some(href) if href.starts_with(&self.replay_base) => {
                self.forward_worker(&msg.data);
                return;
            }
            Some(_) => {}
            None => {
                // Cross-origin-opaque sender: cannot be classified as the
                // worker, so skip forwarding and fall through to dispatch.
                tracing::debug!(target = "relay", "sender location unreadable");
            }
        }

        if let Some(value) = msg.data.get("updateUrl") {
            self.update_url(value);
        }
        if let Some(value) = msg.data.get("updateTs") {
            self.update_ts(value);
        }
        if msg.data.get("getInited").is_some() {
            self.reply_inited(&msg.origin);
        }
        if msg.data.get("getCollInfo").is_some() {
            self.reply_coll_info(&msg.origin);
        }
        if let Some(value) = msg.data.get("overrideElementAttribute") {
            let request: OverrideRequest = serde_json::from_value(value.clone()).unwrap_or_default();
            self.spawn_override(request, msg.origin);
        }
    }

    /// Re-emits a message from the widget's internal worker to the parent,
    /// with the page-address field merged in. Target origin is wildcard: the
    /// worker payload is already public to whoever embeds us.
    fn forward_worker(&self, data: &Value) {
        self.send(Outbound {
            target_origin: "*".to_string(),
            data: with_href(data, &self.href),
        });
    }

    fn update_url(&self, value: &Value) {
        let url = match value.as_str() {
            Some(s) => s.to_string(),
            None => value.to_string(),
        };
        tracing::debug!(target = "relay", url = %url, "updateUrl");
        self.widget.set_attribute("url", &url);
    }

    fn update_ts(&self, value: &Value) {
        match timestamp::normalize(value) {
            Some(ts) => {
                tracing::debug!(target = "relay", ts = %ts, "updateTs");
                self.widget.set_attribute("ts", &ts);
            }
            None => {
                tracing::warn!(target = "relay", value = %value, "updateTs value not numeric, ignored");
            }
        }
    }

    fn reply_inited(&self, origin: &str) {
        let data = with_href(&json!({ "inited": self.widget.inited() }), &self.href);
        self.send(Outbound {
            target_origin: origin.to_string(),
            data,
        });
    }

    /// One synchronous traversal attempt; any failure degrades to an empty
    /// object. The reply always goes out.
    fn reply_coll_info(&self, origin: &str) {
        let coll_info = self
            .widget
            .resolve(&coll_info_path())
            .ok()
            .and_then(|node| node.data())
            .unwrap_or_else(|| json!({}));
        let data = with_href(&json!({ "collInfo": coll_info }), &self.href);
        self.send(Outbound {
            target_origin: origin.to_string(),
            data,
        });
    }

    fn spawn_override(&self, request: OverrideRequest, origin: String) {
        let relay = self.clone();
        let request_id = Uuid::new_v4();
        tokio::spawn(async move {
            let result = relay.apply_override(&request, &origin).await;
            if let Err(err) = &result {
                tracing::error!(
                    target = "relay",
                    %request_id,
                    selector = %request.selector,
                    error = %err,
                    "override traversal failed"
                );
            }
            result
        });
    }

    /// Polls the fixed override path until the target resolves, then applies
    /// the attribute write. Success is fire-and-forget; exhausting the budget
    /// reports back to the requester; anything else propagates.
    pub async fn apply_override(
        &self,
        request: &OverrideRequest,
        origin: &str,
    ) -> Result<(), TraversalError> {
        let path = override_path(&request.selector);
        let widget = Arc::clone(&self.widget);
        match locate(|| widget.resolve(&path), &self.ticker).await {
            Ok(element) => {
                element.set_attribute(&request.attribute_name, &request.attribute_contents);
                tracing::info!(
                    target = "relay",
                    selector = %request.selector,
                    attribute = %request.attribute_name,
                    "override applied"
                );
                Ok(())
            }
            Err(LocateError::Timeout) => {
                tracing::warn!(target = "relay", selector = %request.selector, "override timed out");
                let body = with_href(
                    &json!({ "status": "timed out", "request": request }),
                    &self.href,
                );
                self.send(Outbound {
                    target_origin: origin.to_string(),
                    data: json!({ "overrideElementAttribute": body }),
                });
                Ok(())
            }
            Err(LocateError::Traversal(err)) => Err(err),
        }
    }

    fn send(&self, out: Outbound) {
        if self.outbound.send(out).is_err() {
            tracing::warn!(target = "relay", "outbound channel closed, reply dropped");
        }
    }
}
