//! Recording doubles for the host and its collaborators.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum::Router;
use axum::routing::get;
use serde_json::Value;
use tokio::sync::{Notify, mpsc};
use tracing_subscriber::layer::{Context, Layer, SubscriberExt};
use url::Url;

use crate::error::{PortError, VerifyError};
use crate::events::{OutboundEvent, PeerGroup};
use crate::host::{Connection, Host, LOCAL_URL_OPTION, Middleware};
use crate::ports::PortFinder;
use crate::verify::UrlVerifier;

/// Host that records every call made against it.
pub(crate) struct MockHost {
    options: Mutex<HashMap<String, Value>>,
    option_writes: Mutex<Vec<(String, Value)>>,
    broadcasts: Mutex<Vec<(PeerGroup, OutboundEvent)>>,
    middleware_lookups: AtomicUsize,
    connection_requests: AtomicUsize,
    incoming: mpsc::UnboundedSender<Connection>,
    connections: Mutex<Option<mpsc::UnboundedReceiver<Connection>>>,
    with_middleware: bool,
}

impl MockHost {
    pub(crate) fn new() -> Self {
        let (incoming, connections) = mpsc::unbounded_channel();
        let mut options = HashMap::new();
        options.insert(
            LOCAL_URL_OPTION.to_owned(),
            Value::from("http://localhost:3000"),
        );
        Self {
            options: Mutex::new(options),
            option_writes: Mutex::new(Vec::new()),
            broadcasts: Mutex::new(Vec::new()),
            middleware_lookups: AtomicUsize::new(0),
            connection_requests: AtomicUsize::new(0),
            incoming,
            connections: Mutex::new(Some(connections)),
            with_middleware: true,
        }
    }

    /// Host that cannot provide any middleware.
    pub(crate) fn without_middleware() -> Self {
        Self {
            with_middleware: false,
            ..Self::new()
        }
    }

    /// Open a connection and return the sender feeding its events.
    pub(crate) fn connect(&self) -> mpsc::UnboundedSender<crate::events::RawEvent> {
        let (tx, connection) = Connection::channel();
        self.incoming.send(connection).unwrap();
        tx
    }

    pub(crate) fn broadcasts(&self) -> Vec<(PeerGroup, OutboundEvent)> {
        self.broadcasts.lock().unwrap().clone()
    }

    pub(crate) fn option_writes(&self) -> Vec<(String, Value)> {
        self.option_writes.lock().unwrap().clone()
    }

    pub(crate) fn middleware_lookups(&self) -> usize {
        self.middleware_lookups.load(Ordering::SeqCst)
    }

    pub(crate) fn connection_requests(&self) -> usize {
        self.connection_requests.load(Ordering::SeqCst)
    }
}

impl Host for MockHost {
    fn option(&self, key: &str) -> Option<Value> {
        self.options.lock().unwrap().get(key).cloned()
    }

    fn set_option(&self, key: &str, value: Value) {
        self.option_writes
            .lock()
            .unwrap()
            .push((key.to_owned(), value.clone()));
        self.options.lock().unwrap().insert(key.to_owned(), value);
    }

    fn middleware(&self, name: &str) -> Option<Middleware> {
        self.middleware_lookups.fetch_add(1, Ordering::SeqCst);
        if !self.with_middleware {
            return None;
        }
        let body = format!("// {name}");
        Some(Router::new().route("/", get(move || async move { body })))
    }

    fn broadcast(&self, group: PeerGroup, event: &OutboundEvent) {
        self.broadcasts.lock().unwrap().push((group, event.clone()));
    }

    fn connections(&self) -> mpsc::UnboundedReceiver<Connection> {
        self.connection_requests.fetch_add(1, Ordering::SeqCst);
        self.connections
            .lock()
            .unwrap()
            .take()
            .unwrap_or_else(|| mpsc::unbounded_channel().1)
    }
}

/// Port finder resolving with fixed ports, or failing when empty.
pub(crate) struct FixedPorts(pub(crate) Vec<u16>);

#[async_trait]
impl PortFinder for FixedPorts {
    async fn find_ports(&self, count: usize) -> Result<Vec<u16>, PortError> {
        if self.0.len() < count {
            return Err(PortError::Exhausted {
                start: 0,
                end: 0,
                count,
                found: self.0.len(),
            });
        }
        Ok(self.0.clone())
    }
}

/// Verifier with a fixed answer that records checked URLs.
pub(crate) struct StubVerifier {
    reachable: bool,
    checked: Mutex<Vec<Url>>,
}

impl StubVerifier {
    pub(crate) fn reachable() -> Self {
        Self {
            reachable: true,
            checked: Mutex::new(Vec::new()),
        }
    }

    pub(crate) fn unreachable() -> Self {
        Self {
            reachable: false,
            checked: Mutex::new(Vec::new()),
        }
    }

    pub(crate) fn checked(&self) -> Vec<Url> {
        self.checked.lock().unwrap().clone()
    }
}

#[async_trait]
impl UrlVerifier for StubVerifier {
    async fn verify(&self, url: &Url) -> Result<(), VerifyError> {
        self.checked.lock().unwrap().push(url.clone());
        if self.reachable {
            Ok(())
        } else {
            Err(VerifyError::Status {
                url: url.to_string(),
                status: 404,
            })
        }
    }
}

/// Verifier that holds every check until [`release`](Self::release) is called.
pub(crate) struct GatedVerifier {
    gate: Notify,
    checked: Mutex<Vec<Url>>,
}

impl GatedVerifier {
    pub(crate) fn new() -> Self {
        Self {
            gate: Notify::new(),
            checked: Mutex::new(Vec::new()),
        }
    }

    /// Let one pending (or the next) check answer "reachable".
    pub(crate) fn release(&self) {
        self.gate.notify_one();
    }

    pub(crate) fn checked(&self) -> Vec<Url> {
        self.checked.lock().unwrap().clone()
    }
}

#[async_trait]
impl UrlVerifier for GatedVerifier {
    async fn verify(&self, url: &Url) -> Result<(), VerifyError> {
        self.checked.lock().unwrap().push(url.clone());
        self.gate.notified().await;
        Ok(())
    }
}

/// Counts `error!` events that carry a `plugin` field.
#[derive(Clone, Default)]
pub(crate) struct FailureReports(Arc<AtomicUsize>);

impl FailureReports {
    /// Install as the subscriber for the current thread.
    pub(crate) fn install(&self) -> tracing::subscriber::DefaultGuard {
        tracing::subscriber::set_default(tracing_subscriber::registry().with(self.clone()))
    }

    pub(crate) fn count(&self) -> usize {
        self.0.load(Ordering::SeqCst)
    }
}

impl<S: tracing::Subscriber> Layer<S> for FailureReports {
    fn on_event(&self, event: &tracing::Event<'_>, _ctx: Context<'_, S>) {
        let metadata = event.metadata();
        if *metadata.level() == tracing::Level::ERROR && metadata.fields().field("plugin").is_some()
        {
            self.0.fetch_add(1, Ordering::SeqCst);
        }
    }
}
