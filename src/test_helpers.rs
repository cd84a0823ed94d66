//! Shared test helpers: an in-memory, instrumented [`Transport`] and a
//! `tracing` layer that records which identifier each event was logged for.

use async_trait::async_trait;
use reqwest::header::HeaderMap;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;
use tracing::field::{Field, Visit};
use tracing::span::{Attributes, Id};
use tracing::{Event, Level, Subscriber};
use tracing_subscriber::layer::{Context, Layer, SubscriberExt};
use tracing_subscriber::registry::LookupSpan;
use url::Url;

use crate::config::ApiConfig;
use crate::error::TransportError;
use crate::transport::{Transport, TransportResponse};

type Responder =
    dyn Fn(&Url, u32) -> Result<TransportResponse, TransportError> + Send + Sync + 'static;

/// Scripted transport that records every request
///
/// The responder receives the requested URL and how many times that exact
/// URL has been requested so far (1 on the first call).
pub(crate) struct MockTransport {
    responder: Box<Responder>,
    delay: Duration,
    calls: Mutex<HashMap<String, u32>>,
    requests: Mutex<Vec<(Url, HeaderMap)>>,
    in_flight: AtomicUsize,
    max_in_flight: AtomicUsize,
}

impl MockTransport {
    pub(crate) fn new<F>(responder: F) -> Self
    where
        F: Fn(&Url, u32) -> Result<TransportResponse, TransportError> + Send + Sync + 'static,
    {
        Self {
            responder: Box::new(responder),
            delay: Duration::ZERO,
            calls: Mutex::new(HashMap::new()),
            requests: Mutex::new(Vec::new()),
            in_flight: AtomicUsize::new(0),
            max_in_flight: AtomicUsize::new(0),
        }
    }

    /// Hold every request open for `delay` so concurrent calls overlap
    pub(crate) fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    pub(crate) fn ok(body: impl Into<Vec<u8>>) -> Result<TransportResponse, TransportError> {
        Ok(TransportResponse {
            status: 200,
            body: body.into(),
        })
    }

    pub(crate) fn status(url: &Url, status: u16) -> Result<TransportResponse, TransportError> {
        Err(TransportError::Status {
            url: url.to_string(),
            status,
        })
    }

    pub(crate) fn total_calls(&self) -> u32 {
        self.calls.lock().unwrap().values().sum()
    }

    pub(crate) fn calls_for(&self, url: &str) -> u32 {
        self.calls.lock().unwrap().get(url).copied().unwrap_or(0)
    }

    pub(crate) fn requests(&self) -> Vec<(Url, HeaderMap)> {
        self.requests.lock().unwrap().clone()
    }

    /// Highest number of requests that were in progress at the same time
    pub(crate) fn max_in_flight(&self) -> usize {
        self.max_in_flight.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Transport for MockTransport {
    async fn get(
        &self,
        url: &Url,
        headers: &HeaderMap,
    ) -> Result<TransportResponse, TransportError> {
        let call = {
            let mut calls = self.calls.lock().unwrap();
            let count = calls.entry(url.to_string()).or_insert(0);
            *count += 1;
            *count
        };
        self.requests
            .lock()
            .unwrap()
            .push((url.clone(), headers.clone()));

        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(now, Ordering::SeqCst);
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        self.in_flight.fetch_sub(1, Ordering::SeqCst);

        (self.responder)(url, call)
    }
}

pub(crate) fn test_api_config() -> ApiConfig {
    ApiConfig {
        profile_endpoint: "https://api.test/open/profile".to_string(),
        api_key: None,
        request_timeout: Duration::from_secs(5),
    }
}

pub(crate) fn avatar_url(name: &str) -> String {
    format!("https://img.test/{name}.png")
}

/// Minimal profile body as the API would return it
pub(crate) fn profile_json(username: &str, avatar: Option<&str>) -> Vec<u8> {
    serde_json::json!({
        "name": username.to_uppercase(),
        "username": username,
        "followers_count": 1000,
        "friends_count": 10,
        "likes_count": 5,
        "statuses_count": 42,
        "is_verified": false,
        "joined": "2010-01-02T03:04:05Z",
        "avatar": avatar,
    })
    .to_string()
    .into_bytes()
}

/// One logged event: its level and the `identifier` of the nearest enclosing
/// span that has one
pub(crate) type CapturedEvent = (Level, Option<String>);

/// Install a thread-local subscriber that records every event
///
/// Events are captured until the returned guard is dropped. Only futures
/// polled on the current thread are seen, so use a current-thread runtime.
pub(crate) fn capture_events() -> (
    Arc<Mutex<Vec<CapturedEvent>>>,
    tracing::subscriber::DefaultGuard,
) {
    let events = Arc::new(Mutex::new(Vec::new()));
    let subscriber = tracing_subscriber::registry().with(EventCapture {
        events: Arc::clone(&events),
    });
    let guard = tracing::subscriber::set_default(subscriber);
    (events, guard)
}

struct EventCapture {
    events: Arc<Mutex<Vec<CapturedEvent>>>,
}

struct SpanIdentifier(String);

#[derive(Default)]
struct IdentifierVisitor(Option<String>);

impl Visit for IdentifierVisitor {
    fn record_str(&mut self, field: &Field, value: &str) {
        if field.name() == "identifier" {
            self.0 = Some(value.to_string());
        }
    }

    fn record_debug(&mut self, field: &Field, value: &dyn std::fmt::Debug) {
        if field.name() == "identifier" {
            self.0 = Some(format!("{value:?}"));
        }
    }
}

impl<S> Layer<S> for EventCapture
where
    S: Subscriber + for<'a> LookupSpan<'a>,
{
    fn on_new_span(&self, attrs: &Attributes<'_>, id: &Id, ctx: Context<'_, S>) {
        let mut visitor = IdentifierVisitor::default();
        attrs.record(&mut visitor);
        if let (Some(identifier), Some(span)) = (visitor.0, ctx.span(id)) {
            span.extensions_mut().insert(SpanIdentifier(identifier));
        }
    }

    fn on_event(&self, event: &Event<'_>, ctx: Context<'_, S>) {
        let mut identifier = None;
        if let Some(scope) = ctx.event_scope(event) {
            for span in scope {
                let extensions = span.extensions();
                if let Some(found) = extensions.get::<SpanIdentifier>() {
                    identifier = Some(found.0.clone());
                    break;
                }
            }
        }
        self.events
            .lock()
            .unwrap()
            .push((*event.metadata().level(), identifier));
    }
}
