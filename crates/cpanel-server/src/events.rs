//! Real-time event types.
//!
//! Inbound events arrive from the transport as a [`RawEvent`] (name plus
//! untyped JSON payload) and are validated into an [`InboundEvent`] before
//! dispatch. Outbound events are broadcast to a [`PeerGroup`] through the
//! host and serialize as `{"event": <name>, "data": <payload>}`.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::EventError;
use crate::paths::PathRecord;

/// Set a host option.
pub const OPTION_SET: &str = "cp:option:set";
/// Reload every browser.
pub const BROWSER_RELOAD: &str = "cp:browser:reload";
/// Send every browser to a URL.
pub const BROWSER_URL: &str = "cp:browser:url";
/// A browser announces the path it is showing.
pub const CLIENT_CONNECTED: &str = "cp:client:connected";

/// Event as received from the transport, before validation.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RawEvent {
    /// Event name.
    pub event: String,
    /// Event payload, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
}

impl RawEvent {
    /// Create a raw event.
    #[must_use]
    pub fn new(event: impl Into<String>, data: Option<Value>) -> Self {
        Self {
            event: event.into(),
            data,
        }
    }
}

/// Payload of `cp:option:set`.
#[derive(Clone, Debug, PartialEq, Deserialize)]
pub struct OptionChange {
    /// Option key (e.g. `ghostMode.clicks`).
    pub key: String,
    /// New value, passed to the host as-is.
    pub value: Value,
}

/// Payload of `cp:browser:url`.
#[derive(Clone, Debug, PartialEq, Deserialize)]
pub struct NavigateRequest {
    /// URL relative to the host's local URL.
    pub url: String,
}

/// Validated inbound event.
#[derive(Clone, Debug, PartialEq)]
pub enum InboundEvent {
    /// Apply a single option change to the host.
    OptionSet(OptionChange),
    /// Reload all browsers.
    BrowserReload,
    /// Navigate all browsers to a URL, if it is reachable.
    BrowserNavigate(NavigateRequest),
    /// Track a visited path.
    ClientConnected(PathRecord),
}

impl InboundEvent {
    /// Validate a raw event.
    ///
    /// # Errors
    ///
    /// Returns [`EventError::Unknown`] for unrecognized event names and
    /// [`EventError::Payload`] when the payload does not match the event.
    pub fn decode(raw: RawEvent) -> Result<Self, EventError> {
        match raw.event.as_str() {
            OPTION_SET => payload(&raw.event, raw.data).map(Self::OptionSet),
            BROWSER_RELOAD => Ok(Self::BrowserReload),
            BROWSER_URL => payload(&raw.event, raw.data).map(Self::BrowserNavigate),
            CLIENT_CONNECTED => payload(&raw.event, raw.data).map(Self::ClientConnected),
            _ => Err(EventError::Unknown(raw.event)),
        }
    }

    /// Wire name of the event.
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            Self::OptionSet(_) => OPTION_SET,
            Self::BrowserReload => BROWSER_RELOAD,
            Self::BrowserNavigate(_) => BROWSER_URL,
            Self::ClientConnected(_) => CLIENT_CONNECTED,
        }
    }
}

fn payload<T: DeserializeOwned>(event: &str, data: Option<Value>) -> Result<T, EventError> {
    serde_json::from_value(data.unwrap_or(Value::Null)).map_err(|source| EventError::Payload {
        event: event.to_owned(),
        source,
    })
}

/// Recipient group of a broadcast.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum PeerGroup {
    /// Open instances of the control panel UI.
    ControlUi,
    /// Browsers monitored by the host.
    Browsers,
}

/// Payload of `browser:location`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Location {
    /// Absolute URL to navigate to.
    pub url: String,
    /// Always `true`: browsers must follow even if they would ignore sync.
    #[serde(rename = "override")]
    pub force: bool,
}

/// Event broadcast by the control panel.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(tag = "event", content = "data")]
pub enum OutboundEvent {
    /// Full list of tracked paths.
    #[serde(rename = "cp:urls:update")]
    UrlsUpdate(Vec<PathRecord>),
    /// Reload signal, no payload.
    #[serde(rename = "browser:reload")]
    Reload,
    /// Navigation override.
    #[serde(rename = "browser:location")]
    Location(Location),
}

impl OutboundEvent {
    /// Group this event is broadcast to.
    #[must_use]
    pub fn group(&self) -> PeerGroup {
        match self {
            Self::UrlsUpdate(_) => PeerGroup::ControlUi,
            Self::Reload | Self::Location(_) => PeerGroup::Browsers,
        }
    }

    /// Wire name of the event.
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            Self::UrlsUpdate(_) => "cp:urls:update",
            Self::Reload => "browser:reload",
            Self::Location(_) => "browser:location",
        }
    }
}
