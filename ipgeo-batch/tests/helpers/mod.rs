//! Test Helper Utilities
//!
//! Stub lookup transport with scripted per-address latency and outcome,
//! plus in-flight accounting for pool-bound assertions.

#![allow(dead_code)]

use async_trait::async_trait;
use ipgeo_batch::services::{LookupTransport, TransportError};
use ipgeo_batch::{AddressRecord, FieldSet};
use serde_json::{Map, Value};
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

/// Scripted response for one address
#[derive(Clone)]
pub struct Scripted {
    pub delay: Duration,
    pub outcome: Result<Value, TransportError>,
}

impl Scripted {
    pub fn ok(payload: Value) -> Self {
        Self {
            delay: Duration::ZERO,
            outcome: Ok(payload),
        }
    }

    pub fn err(error: TransportError) -> Self {
        Self {
            delay: Duration::ZERO,
            outcome: Err(error),
        }
    }

    pub fn after(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }
}

/// Deterministic stand-in for the HTTP transport
pub struct StubTransport {
    scripts: HashMap<String, Scripted>,
    fallback: Scripted,
    in_flight: AtomicUsize,
    max_in_flight: AtomicUsize,
    calls: Mutex<Vec<(String, String)>>,
}

impl StubTransport {
    /// Unknown addresses get `fallback`
    pub fn new(fallback: Scripted) -> Self {
        Self {
            scripts: HashMap::new(),
            fallback,
            in_flight: AtomicUsize::new(0),
            max_in_flight: AtomicUsize::new(0),
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn script(mut self, address: &str, scripted: Scripted) -> Self {
        self.scripts.insert(address.to_string(), scripted);
        self
    }

    /// Highest number of concurrent fetches observed
    pub fn max_in_flight(&self) -> usize {
        self.max_in_flight.load(Ordering::SeqCst)
    }

    /// `(address, fields query)` per fetch, in call order
    pub fn calls(&self) -> Vec<(String, String)> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl LookupTransport for StubTransport {
    async fn fetch(
        &self,
        address: &AddressRecord,
        fields: &FieldSet,
    ) -> Result<Map<String, Value>, TransportError> {
        self.calls
            .lock()
            .unwrap()
            .push((address.to_string(), fields.query_param()));

        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(now, Ordering::SeqCst);

        let scripted = self
            .scripts
            .get(address.as_str())
            .unwrap_or(&self.fallback)
            .clone();
        if !scripted.delay.is_zero() {
            tokio::time::sleep(scripted.delay).await;
        }

        self.in_flight.fetch_sub(1, Ordering::SeqCst);
        scripted.outcome.map(|value| match value {
            Value::Object(map) => map,
            _ => Map::new(),
        })
    }
}

pub fn addresses(list: &[&str]) -> Vec<AddressRecord> {
    list.iter().map(|a| AddressRecord::new(*a)).collect()
}
