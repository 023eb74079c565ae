use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::time::Instant;

use futures::FutureExt;
use manifold_core::{
    merge_values, validate_renderer, Context, Error, Manifest, Renderer, Result, SharedFilter, SharedRenderer,
    SharedTransformer, Values,
};
use metrics::{counter, histogram};
use tokio::task::JoinSet;
use tracing::{debug, info, warn};

use crate::options::{EngineBuilder, Options, RenderOptions};

/// Runs a fixed set of renderers and pipes their combined output through
/// the engine-level and per-render filters and transformers.
///
/// An engine is immutable after construction and can be shared across
/// tasks; concurrent [`Engine::render`] calls do not interfere.
pub struct Engine {
    opts: Options,
}

impl std::fmt::Debug for Engine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let names: Vec<&str> = self.opts.renderers.iter().map(|r| r.name()).collect();
        f.debug_struct("Engine")
            .field("renderers", &names)
            .field("filters", &self.opts.filters.len())
            .field("transformers", &self.opts.transformers.len())
            .field("parallel", &self.opts.parallel)
            .finish()
    }
}

impl Engine {
    /// Validates every renderer and freezes the configuration.
    pub fn new(opts: Options) -> Result<Self> {
        for (index, renderer) in opts.renderers.iter().enumerate() {
            validate_renderer(index, renderer.as_ref())?;
        }
        debug!(renderers = opts.renderers.len(), parallel = opts.parallel, "engine: built");
        Ok(Self { opts })
    }

    pub fn builder() -> EngineBuilder { EngineBuilder::new() }

    pub fn renderers(&self) -> &[SharedRenderer] { &self.opts.renderers }
    pub fn is_parallel(&self) -> bool { self.opts.parallel }

    /// Render all manifests, then filter and transform them.
    ///
    /// Output keeps renderer registration order in both modes. Any failure
    /// yields an error and no partial result.
    pub async fn render(&self, ctx: &Context, render: RenderOptions) -> Result<Vec<Manifest>> {
        let t0 = Instant::now();
        counter!("render_total", 1u64);
        let res = self.render_inner(ctx, render).await;
        let took_ms = t0.elapsed().as_millis() as f64;
        histogram!("render_latency_ms", took_ms);
        match &res {
            Ok(docs) => info!(
                renderers = self.opts.renderers.len(),
                parallel = self.opts.parallel,
                documents = docs.len(),
                took_ms,
                "engine: render ok"
            ),
            Err(e) => {
                counter!("render_errors_total", 1u64);
                let chain: Vec<String> = anyhow::Chain::new(e).map(|c| c.to_string()).collect();
                warn!(error = %chain.join(": "), took_ms, "engine: render failed");
            }
        }
        res
    }

    async fn render_inner(&self, ctx: &Context, render: RenderOptions) -> Result<Vec<Manifest>> {
        ctx.check()?;
        let values = merge_values(&self.opts.values, &render.values);
        let docs = if self.opts.parallel {
            self.render_parallel(ctx, values).await?
        } else {
            self.render_sequential(ctx, &values).await?
        };

        let filters: Vec<SharedFilter> = self.opts.filters.iter().cloned().chain(render.filters).collect();
        let transformers: Vec<SharedTransformer> =
            self.opts.transformers.iter().cloned().chain(render.transformers).collect();
        manifold_pipeline::apply(ctx, docs, &filters, &transformers)
    }

    async fn render_sequential(&self, ctx: &Context, values: &Values) -> Result<Vec<Manifest>> {
        let mut out = Vec::new();
        for renderer in &self.opts.renderers {
            out.extend(invoke(ctx, renderer.as_ref(), values).await?);
        }
        Ok(out)
    }

    /// One task per renderer on a child scope. The first failure cancels
    /// the scope and aborts the siblings; every task is joined before
    /// returning.
    async fn render_parallel(&self, ctx: &Context, values: Values) -> Result<Vec<Manifest>> {
        let n = self.opts.renderers.len();
        if n == 0 {
            return Ok(Vec::new());
        }
        let scope = ctx.child();
        let values = Arc::new(values);
        let mut set: JoinSet<(usize, Result<Vec<Manifest>>)> = JoinSet::new();
        for (index, renderer) in self.opts.renderers.iter().enumerate() {
            let (renderer, scope, values) = (Arc::clone(renderer), scope.clone(), Arc::clone(&values));
            set.spawn(async move { (index, invoke(&scope, renderer.as_ref(), &values).await) });
        }

        let mut slots: Vec<Option<Vec<Manifest>>> = vec![None; n];
        let mut first_err: Option<Error> = None;
        while let Some(joined) = set.join_next().await {
            match joined {
                Ok((index, Ok(docs))) => slots[index] = Some(docs),
                Ok((index, Err(e))) => {
                    if first_err.is_none() {
                        debug!(renderer = self.opts.renderers[index].name(), "engine: renderer failed, cancelling siblings");
                        scope.cancel();
                        set.abort_all();
                        first_err = Some(e);
                    }
                }
                // aborted sibling
                Err(join_err) if join_err.is_cancelled() => {}
                // invoke already turns panics into errors; left for runtime shutdown
                Err(join_err) => {
                    if first_err.is_none() {
                        scope.cancel();
                        set.abort_all();
                        first_err = Some(Error::Renderer {
                            name: String::from("<unknown>"),
                            source: anyhow::anyhow!("renderer task failed: {join_err}"),
                        });
                    }
                }
            }
        }
        if let Some(e) = first_err {
            return Err(e);
        }
        Ok(slots.into_iter().flatten().flatten().collect())
    }
}

/// Invoke one renderer, racing it against the context. A panic inside the
/// renderer becomes [`Error::Renderer`].
async fn invoke(ctx: &Context, renderer: &dyn Renderer, values: &Values) -> Result<Vec<Manifest>> {
    ctx.check()?;
    let name = renderer.name();
    debug!(renderer = name, "engine: invoking renderer");
    let process = AssertUnwindSafe(renderer.process(ctx, values)).catch_unwind();
    let docs = tokio::select! {
        res = process => match res {
            Ok(res) => res.map_err(|e| Error::renderer(name, e))?,
            Err(payload) => {
                let source = anyhow::anyhow!("renderer panicked: {}", panic_message(payload.as_ref()));
                return Err(Error::Renderer { name: name.to_string(), source });
            }
        },
        err = ctx.done() => return Err(err),
    };
    counter!("renderer_documents_total", docs.len() as u64);
    debug!(renderer = name, documents = docs.len(), "engine: renderer done");
    Ok(docs)
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> &str {
    payload
        .downcast_ref::<&str>()
        .copied()
        .or_else(|| payload.downcast_ref::<String>().map(String::as_str))
        .unwrap_or("non-string payload")
}
