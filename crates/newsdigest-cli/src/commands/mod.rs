pub mod fetch;
pub mod headlines;
pub mod session;

use std::io::Write;

use anyhow::Result;
use clap::Args;
use tokio::sync::mpsc;

use newsdigest_core::{
    AppConfig, Category, Country, HeadlineQuery, NewsClient, PageSize, Pipeline, T5Loader,
};

use crate::render::render_event;

pub type NewsPipeline = Pipeline<NewsClient, T5Loader>;

/// Headline selection shared by the one-shot commands
#[derive(Args, Debug, Clone)]
pub struct SelectionArgs {
    /// Country code (in, us, gb, au, ca)
    #[arg(short = 'c', long)]
    pub country: Option<Country>,
    /// Category (general, technology, business, entertainment, health, science, sports)
    #[arg(short = 't', long)]
    pub category: Option<Category>,
    /// Number of articles, 1-10
    #[arg(short = 'n', long)]
    pub count: Option<PageSize>,
}

impl SelectionArgs {
    /// Resolve against the configured defaults
    pub fn query(&self, config: &AppConfig) -> HeadlineQuery {
        let defaults = config.news.default_query();
        HeadlineQuery::new(
            self.country.unwrap_or(defaults.country),
            self.category.unwrap_or(defaults.category),
            self.count.unwrap_or(defaults.page_size),
        )
    }
}

pub fn build_pipeline(config: &AppConfig) -> Result<NewsPipeline> {
    let client = NewsClient::new(config)?;
    if config.news.resolved_api_key().is_none() {
        tracing::warn!("No news API key configured; requests will likely be rejected");
    }
    let loader = T5Loader::new(config.model.clone());
    Ok(Pipeline::new(client, loader).with_concurrency(config.pipeline.concurrency))
}

/// Run the pipeline once, printing blocks as they are produced
pub async fn trigger(pipeline: &NewsPipeline, query: HeadlineQuery) -> usize {
    let (tx, mut rx) = mpsc::unbounded_channel();

    let run = async move {
        let rendered = pipeline.run(&query, &tx).await;
        drop(tx);
        rendered
    };

    let printer = async {
        let stdout = std::io::stdout();
        while let Some(event) = rx.recv().await {
            let mut out = stdout.lock();
            if let Err(e) = render_event(&event, &mut out).and_then(|_| out.flush()) {
                tracing::warn!("Failed to write output: {}", e);
            }
        }
    };

    let (rendered, ()) = tokio::join!(run, printer);
    rendered
}
