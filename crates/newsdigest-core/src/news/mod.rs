mod client;
mod models;

pub use client::NewsClient;
pub use models::{
    Article, ArticleSource, Category, Country, HeadlineQuery, PageSize, SOURCE_PLACEHOLDER,
    TITLE_PLACEHOLDER, URL_PLACEHOLDER,
};

/// Supplier of ordered headline lists
///
/// Implementations resolve every ordinary failure (network, HTTP status,
/// malformed payload) to an empty list and never return more than
/// `query.page_size` articles.
#[async_trait::async_trait]
pub trait HeadlineSource: Send + Sync {
    async fn fetch_headlines(&self, query: &HeadlineQuery) -> Vec<Article>;
}
