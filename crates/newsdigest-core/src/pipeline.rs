//! Fetch-then-summarize run for a single user trigger.
//!
//! A run fetches headlines, then summarizes each article in the order the
//! source returned them, emitting one [`PipelineEvent::Article`] per article.
//! Nothing is kept between runs except the summarization resource.

use std::sync::Arc;

use futures::stream::{self, StreamExt};
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use crate::news::{Article, HeadlineQuery, HeadlineSource};
use crate::summarize::{self, ModelLoader, ResourceCell, SummaryModel};
use crate::timestamp::normalize_published;
use crate::Result;

/// Shown when the source yields nothing, whatever the cause
pub const NO_ARTICLES_MESSAGE: &str = "No articles found or API limit reached.";
/// Shown in place of a summary that could not be generated
pub const SUMMARY_PLACEHOLDER: &str = "Summary unavailable.";

/// Progress and results emitted during a run, in display order
#[derive(Debug, Clone, PartialEq)]
pub enum PipelineEvent {
    /// The headline request is about to be sent
    Fetching { query: HeadlineQuery },
    /// The source returned nothing; the run ends here
    NoArticles { message: String },
    /// Articles were retrieved and will be summarized
    Fetched { count: usize },
    /// Summarization of an article has started (1-based index)
    Summarizing { index: usize, title: String },
    /// One finished article block
    Article(RenderedArticle),
    /// The run is over
    Finished { rendered: usize },
}

/// Outcome of summarizing one article
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Summary {
    Generated(String),
    Failed { reason: String },
}

impl Summary {
    /// Text to display for this summary
    pub fn text(&self) -> &str {
        match self {
            Summary::Generated(text) => text,
            Summary::Failed { .. } => SUMMARY_PLACEHOLDER,
        }
    }

    pub fn is_failed(&self) -> bool {
        matches!(self, Summary::Failed { .. })
    }
}

/// Everything the display layer needs for one article block
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedArticle {
    /// 1-based position in the fetched list
    pub index: usize,
    pub title: String,
    pub source: String,
    pub url: String,
    /// Formatted (or raw, if unparseable) publication time; `None` hides the line
    pub published: Option<String>,
    pub summary: Summary,
}

impl RenderedArticle {
    fn from_article(index: usize, article: &Article, summary: Summary) -> Self {
        Self {
            index,
            title: article.title_or_placeholder().to_string(),
            source: article.source_or_placeholder().to_string(),
            url: article.url_or_placeholder().to_string(),
            published: normalize_published(article.published_at.as_deref()),
            summary,
        }
    }
}

/// Headline-to-summary pipeline
///
/// Owns the headline source and the lazily loaded summarization resource.
pub struct Pipeline<S, L>
where
    S: HeadlineSource,
    L: ModelLoader,
{
    source: S,
    resource: ResourceCell<L>,
    concurrency: usize,
}

impl<S, L> Pipeline<S, L>
where
    S: HeadlineSource,
    L: ModelLoader,
{
    pub fn new(source: S, loader: L) -> Self {
        Self {
            source,
            resource: ResourceCell::new(loader),
            concurrency: 1,
        }
    }

    /// Summarize up to `concurrency` articles at once; output order is unchanged
    pub fn with_concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency.max(1);
        self
    }

    /// Load the summarization resource now instead of on the first run
    pub async fn warm_up(&self) -> Result<()> {
        self.resource.get_or_load().await.map(|_| ())
    }

    #[cfg(test)]
    pub(crate) fn source(&self) -> &S {
        &self.source
    }

    /// Execute one fetch-and-summarize run, streaming events to `events`
    ///
    /// Returns the number of rendered articles. Once `Fetched` is emitted every
    /// article gets a block: if the model cannot be loaded, or one article fails,
    /// the affected summaries are rendered as failed.
    pub async fn run(
        &self,
        query: &HeadlineQuery,
        events: &mpsc::UnboundedSender<PipelineEvent>,
    ) -> usize {
        let emit = |event: PipelineEvent| {
            if events.send(event).is_err() {
                warn!("Failed to send pipeline event: receiver dropped");
            }
        };

        emit(PipelineEvent::Fetching { query: *query });
        let articles = self.source.fetch_headlines(query).await;

        if articles.is_empty() {
            info!("No articles for {}", query);
            emit(PipelineEvent::NoArticles {
                message: NO_ARTICLES_MESSAGE.to_string(),
            });
            emit(PipelineEvent::Finished { rendered: 0 });
            return 0;
        }

        info!("Fetched {} articles for {}", articles.len(), query);
        emit(PipelineEvent::Fetched { count: articles.len() });

        let model = self.resource.get_or_load().await.map_err(|e| {
            warn!("Summarization model unavailable: {}", e);
            e.to_string()
        });

        let mut blocks = stream::iter(articles.into_iter().enumerate())
            .map(|(i, article)| {
                let model = model.clone();
                let index = i + 1;
                emit(PipelineEvent::Summarizing {
                    index,
                    title: article.title_or_placeholder().to_string(),
                });
                async move {
                    match model {
                        Ok(model) => render_article(index, &article, &model).await,
                        Err(reason) => {
                            RenderedArticle::from_article(index, &article, Summary::Failed { reason })
                        }
                    }
                }
            })
            .buffered(self.concurrency);

        let mut rendered = 0;
        while let Some(block) = blocks.next().await {
            rendered += 1;
            emit(PipelineEvent::Article(block));
        }

        emit(PipelineEvent::Finished { rendered });
        rendered
    }
}

/// Summarize one article, containing any failure to this article
async fn render_article<M>(index: usize, article: &Article, model: &Arc<M>) -> RenderedArticle
where
    M: SummaryModel + ?Sized + 'static,
{
    let summary = match summarize::summarize(model, article.content_or_empty()).await {
        Ok(text) => {
            debug!("Summarized article {}: {}", index, article.title_or_placeholder());
            Summary::Generated(text)
        }
        Err(e) => {
            warn!("Failed to summarize '{}': {}", article.title_or_placeholder(), e);
            Summary::Failed { reason: e.to_string() }
        }
    };

    RenderedArticle::from_article(index, article, summary)
}
