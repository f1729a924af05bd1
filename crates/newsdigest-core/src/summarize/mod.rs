mod t5;
mod text;

pub use t5::{T5Loader, T5Summarizer};
pub use text::clean_content;

use std::sync::Arc;

use tokio::sync::OnceCell;

use crate::{Error, Result};

/// A loaded summarization model (tokenizer + weights)
///
/// Calls are blocking and may be made from several threads at once.
pub trait SummaryModel: Send + Sync {
    /// Produce a summary of `text`. Empty input yields an empty summary.
    fn summarize(&self, text: &str) -> Result<String>;
}

/// Performs the expensive, one-time load of a [`SummaryModel`]
pub trait ModelLoader: Send + Sync + 'static {
    type Model: SummaryModel + 'static;

    fn load(&self) -> Result<Self::Model>;
}

/// Lazily loaded, process-lifetime summarization resource
///
/// The first [`get_or_load`](Self::get_or_load) runs the loader on the blocking
/// pool; every later call returns the same `Arc`. Concurrent first calls wait on
/// a single load. A failed load is not cached, so the next call tries again.
pub struct ResourceCell<L: ModelLoader> {
    loader: Arc<L>,
    cell: OnceCell<Arc<L::Model>>,
}

impl<L: ModelLoader> ResourceCell<L> {
    pub fn new(loader: L) -> Self {
        Self {
            loader: Arc::new(loader),
            cell: OnceCell::new(),
        }
    }

    /// Return the resource, loading it on first use
    pub async fn get_or_load(&self) -> Result<Arc<L::Model>> {
        let resource = self
            .cell
            .get_or_try_init(|| async {
                let loader = Arc::clone(&self.loader);
                tracing::info!("Loading summarization model...");
                let model = tokio::task::spawn_blocking(move || loader.load())
                    .await
                    .map_err(|e| Error::Task(format!("Model load task failed: {}", e)))??;
                tracing::info!("Summarization model ready");
                Ok::<_, Error>(Arc::new(model))
            })
            .await?;

        Ok(Arc::clone(resource))
    }

    pub fn is_loaded(&self) -> bool {
        self.cell.initialized()
    }
}

/// Summarize article content with an already loaded resource
///
/// The content is cleaned first; if nothing is left the model is not invoked.
/// Inference runs on the blocking pool.
pub async fn summarize<M>(resource: &Arc<M>, content: &str) -> Result<String>
where
    M: SummaryModel + ?Sized + 'static,
{
    let text = clean_content(content);
    if text.is_empty() {
        return Ok(String::new());
    }

    let model = Arc::clone(resource);
    tokio::task::spawn_blocking(move || model.summarize(&text))
        .await
        .map_err(|e| Error::Task(format!("Summarization task failed: {}", e)))?
}
