use manifold_core::{merge_values, SharedFilter, SharedRenderer, SharedTransformer, Values};

use crate::Engine;

/// Engine configuration. Fixed once the engine is built.
#[derive(Clone, Default)]
pub struct Options {
    pub renderers: Vec<SharedRenderer>,
    /// Applied to every render, before render-time filters.
    pub filters: Vec<SharedFilter>,
    /// Applied to every render, before render-time transformers.
    pub transformers: Vec<SharedTransformer>,
    /// Base values; per-render values are deep-merged on top.
    pub values: Values,
    /// Invoke renderers concurrently.
    pub parallel: bool,
}

fn env_flag(key: &str) -> bool {
    std::env::var(key)
        .ok()
        .map(|v| matches!(v.trim().to_ascii_lowercase().as_str(), "1" | "true" | "yes"))
        .unwrap_or(false)
}

impl Options {
    /// Defaults seeded from the environment (`MANIFOLD_PARALLEL`).
    pub fn from_env() -> Self {
        Self { parallel: env_flag("MANIFOLD_PARALLEL"), ..Default::default() }
    }

    pub fn with_renderer(mut self, renderer: SharedRenderer) -> Self { self.renderers.push(renderer); self }
    pub fn with_filter(mut self, filter: SharedFilter) -> Self { self.filters.push(filter); self }
    pub fn with_transformer(mut self, transformer: SharedTransformer) -> Self { self.transformers.push(transformer); self }
    pub fn with_values(mut self, values: Values) -> Self { self.values = merge_values(&self.values, &values); self }
    pub fn with_parallel(mut self, parallel: bool) -> Self { self.parallel = parallel; self }

    /// Append another record: lists extend in order, values deep-merge and
    /// parallel is enabled if either side enables it.
    pub fn merge(mut self, other: Options) -> Self {
        self.renderers.extend(other.renderers);
        self.filters.extend(other.filters);
        self.transformers.extend(other.transformers);
        self.values = merge_values(&self.values, &other.values);
        self.parallel |= other.parallel;
        self
    }
}

/// Incremental construction over [`Options`].
#[derive(Default)]
pub struct EngineBuilder {
    opts: Options,
}

impl EngineBuilder {
    pub fn new() -> Self { Self::default() }

    pub fn renderer(mut self, renderer: SharedRenderer) -> Self { self.opts = self.opts.with_renderer(renderer); self }
    pub fn filter(mut self, filter: SharedFilter) -> Self { self.opts = self.opts.with_filter(filter); self }
    pub fn transformer(mut self, transformer: SharedTransformer) -> Self { self.opts = self.opts.with_transformer(transformer); self }
    pub fn values(mut self, values: Values) -> Self { self.opts = self.opts.with_values(values); self }
    pub fn parallel(mut self, parallel: bool) -> Self { self.opts = self.opts.with_parallel(parallel); self }
    pub fn options(mut self, opts: Options) -> Self { self.opts = self.opts.merge(opts); self }

    /// Validates every renderer; fails on the first invalid one.
    pub fn build(self) -> manifold_core::Result<Engine> { Engine::new(self.opts) }
}

impl From<Options> for EngineBuilder {
    fn from(opts: Options) -> Self { Self { opts } }
}

/// Per-render configuration, appended after the engine-level settings.
#[derive(Clone, Default)]
pub struct RenderOptions {
    pub filters: Vec<SharedFilter>,
    pub transformers: Vec<SharedTransformer>,
    pub values: Values,
}

impl RenderOptions {
    pub fn new() -> Self { Self::default() }

    pub fn with_filter(mut self, filter: SharedFilter) -> Self { self.filters.push(filter); self }
    pub fn with_transformer(mut self, transformer: SharedTransformer) -> Self { self.transformers.push(transformer); self }
    pub fn with_values(mut self, values: Values) -> Self { self.values = merge_values(&self.values, &values); self }
}
