#![allow(dead_code)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use manifold_core::{Context, Manifest, Renderer, SharedRenderer, Values};

pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

pub fn pod(name: &str) -> Manifest { Manifest::new("v1", "Pod", name).with_namespace("default") }
pub fn service(name: &str) -> Manifest { Manifest::new("v1", "Service", name).with_namespace("default") }
pub fn deployment(name: &str) -> Manifest { Manifest::new("apps/v1", "Deployment", name).with_namespace("default") }

pub fn names(docs: &[Manifest]) -> Vec<&str> { docs.iter().map(|d| d.name()).collect() }

pub fn values(v: serde_json::Value) -> Values {
    match v {
        serde_json::Value::Object(m) => m,
        other => panic!("values must be an object, got {other}"),
    }
}

/// Increments on drop, so completed and aborted invocations both count.
struct Settled(Arc<AtomicUsize>);

impl Drop for Settled {
    fn drop(&mut self) { self.0.fetch_add(1, Ordering::SeqCst); }
}

/// Canned renderer with optional delay and failure that records its calls.
pub struct Mock {
    name: String,
    docs: Vec<Manifest>,
    fail: Option<String>,
    delay: Option<Duration>,
    pub calls: Arc<AtomicUsize>,
    pub completed: Arc<AtomicUsize>,
    pub settled: Arc<AtomicUsize>,
    pub captured: Arc<Mutex<Vec<Values>>>,
}

impl Mock {
    pub fn new(name: &str, docs: Vec<Manifest>) -> Self {
        Self {
            name: name.to_string(),
            docs,
            fail: None,
            delay: None,
            calls: Arc::default(),
            completed: Arc::default(),
            settled: Arc::default(),
            captured: Arc::default(),
        }
    }

    pub fn failing(name: &str, message: &str) -> Self {
        Self { fail: Some(message.to_string()), ..Self::new(name, Vec::new()) }
    }

    pub fn delayed(mut self, delay: Duration) -> Self { self.delay = Some(delay); self }

    pub fn shared(self) -> SharedRenderer { Arc::new(self) }
}

#[async_trait::async_trait]
impl Renderer for Mock {
    fn name(&self) -> &str { &self.name }

    async fn process(&self, _ctx: &Context, values: &Values) -> anyhow::Result<Vec<Manifest>> {
        let _settled = Settled(self.settled.clone());
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.captured.lock().expect("lock").push(values.clone());
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        if let Some(msg) = &self.fail {
            anyhow::bail!("{msg}");
        }
        self.completed.fetch_add(1, Ordering::SeqCst);
        Ok(self.docs.clone())
    }
}

/// Renderer that only finishes when its context ends.
pub struct Blocking;

#[async_trait::async_trait]
impl Renderer for Blocking {
    fn name(&self) -> &str { "blocking" }

    async fn process(&self, ctx: &Context, _values: &Values) -> anyhow::Result<Vec<Manifest>> {
        Err(ctx.done().await.into())
    }
}
