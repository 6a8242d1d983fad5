pub mod dom;
pub mod locator;
pub mod message;
pub mod params;
pub mod relay;
pub mod timestamp;
pub mod traversal;
pub mod widget;

pub use locator::{locate, LocateError, Ticker, MAX_ATTEMPTS};
pub use message::{Inbound, Outbound, OverrideRequest, SenderRef};
pub use params::{EmbedMode, EmbedParams, ParamsError};
pub use relay::Relay;
pub use traversal::{Hop, TraversalError, TraversalPath};
pub use widget::{ReplayWidget, Widget};
