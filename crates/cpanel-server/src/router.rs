//! Event routing between control connections and the host.
//!
//! Every new connection first receives the current path list (broadcast to
//! the whole control UI group), then has its inbound events validated and
//! dispatched in arrival order:
//!
//! | inbound | effect |
//! |---|---|
//! | `cp:option:set` | [`Host::set_option`] |
//! | `cp:browser:reload` | `browser:reload` to all browsers |
//! | `cp:browser:url` | `browser:location` to all browsers, if the URL is reachable |
//! | `cp:client:connected` | track the path, broadcast the list if it changed |

use std::sync::Arc;

use tokio::sync::mpsc;
use tokio::task::{JoinHandle, JoinSet};

use crate::events::{InboundEvent, Location, NavigateRequest, OutboundEvent};
use crate::host::{Connection, Host, LOCAL_URL_OPTION};
use crate::paths::{PathRecord, Session};
use crate::verify::{UrlVerifier, create_url};

/// Routes real-time events for one control panel session.
///
/// Unattached until [`attach`](Self::attach) consumes it; there is no way
/// back.
pub struct EventRouter {
    host: Arc<dyn Host>,
    verifier: Arc<dyn UrlVerifier>,
    session: Arc<Session>,
}

impl EventRouter {
    /// Create an unattached router.
    #[must_use]
    pub fn new(host: Arc<dyn Host>, verifier: Arc<dyn UrlVerifier>, session: Arc<Session>) -> Self {
        Self {
            host,
            verifier,
            session,
        }
    }

    /// Start accepting connections.
    ///
    /// Spawns the accept loop, which runs until the host closes the
    /// connection stream. Each connection is served on its own task, so a
    /// failing handler only takes down its own connection.
    pub fn attach(self, mut connections: mpsc::UnboundedReceiver<Connection>) -> JoinHandle<()> {
        let router = Arc::new(self);
        tracing::debug!("Event router attached");

        tokio::spawn(async move {
            while let Some(connection) = connections.recv().await {
                Arc::clone(&router).accept(connection);
            }
            tracing::debug!("Connection stream closed");
        })
    }

    /// Greet a new connection and spawn its event loop.
    ///
    /// The path list is broadcast before the task is spawned, so it always
    /// precedes anything the connection's own events trigger.
    pub(crate) fn accept(self: Arc<Self>, connection: Connection) -> JoinHandle<()> {
        self.session.with_paths(|paths| {
            self.emit(&OutboundEvent::UrlsUpdate(paths.to_vec()));
        });

        tokio::spawn(async move { self.serve(connection).await })
    }

    /// Serve inbound events until the peer disconnects.
    async fn serve(&self, mut connection: Connection) {
        let id = connection.id;
        // Bound once per connection, like the handlers themselves.
        let local_url = self
            .host
            .option(LOCAL_URL_OPTION)
            .and_then(|value| value.as_str().map(str::to_owned));
        let mut navigations = JoinSet::new();

        tracing::debug!(%id, "Control connection opened");

        while let Some(raw) = connection.events.recv().await {
            match InboundEvent::decode(raw) {
                Ok(event) => {
                    tracing::debug!(%id, event = event.name(), "Dispatching event");
                    self.dispatch(event, local_url.as_deref(), &mut navigations);
                }
                Err(e) => tracing::warn!(%id, error = %e, "Dropping inbound event"),
            }
            while navigations.try_join_next().is_some() {}
        }

        while navigations.join_next().await.is_some() {}
        tracing::debug!(%id, "Control connection closed");
    }

    fn dispatch(&self, event: InboundEvent, local_url: Option<&str>, navigations: &mut JoinSet<()>) {
        match event {
            InboundEvent::OptionSet(change) => self.host.set_option(&change.key, change.value),
            InboundEvent::BrowserReload => self.emit(&OutboundEvent::Reload),
            InboundEvent::BrowserNavigate(request) => {
                navigations.spawn(navigate(
                    Arc::clone(&self.host),
                    Arc::clone(&self.verifier),
                    local_url.map(str::to_owned),
                    request,
                ));
            }
            InboundEvent::ClientConnected(record) => self.track(record),
        }
    }

    /// Record a visited path and broadcast the list if it changed.
    fn track(&self, record: PathRecord) {
        self.session.record_path(record, |paths| {
            self.emit(&OutboundEvent::UrlsUpdate(paths.to_vec()));
        });
    }

    fn emit(&self, event: &OutboundEvent) {
        self.host.broadcast(event.group(), event);
    }
}

/// Send all browsers to `request.url` once it is known to be reachable.
///
/// Failures are not reported back to the requesting client; they are only
/// visible as debug events.
async fn navigate(
    host: Arc<dyn Host>,
    verifier: Arc<dyn UrlVerifier>,
    local_url: Option<String>,
    request: NavigateRequest,
) {
    let Some(base) = local_url else {
        tracing::debug!(url = %request.url, "Host has no local URL, ignoring navigation");
        return;
    };

    let url = match create_url(&base, &request.url) {
        Ok(url) => url,
        Err(e) => {
            tracing::debug!(base = %base, url = %request.url, error = %e, "Cannot build navigation URL");
            return;
        }
    };

    match verifier.verify(&url).await {
        Ok(()) => {
            let event = OutboundEvent::Location(Location {
                url: url.to_string(),
                force: true,
            });
            host.broadcast(event.group(), &event);
        }
        Err(e) => {
            tracing::debug!(url = %url, error = %e, "Navigation target unreachable");
        }
    }
}
