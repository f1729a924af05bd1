pub mod config;
pub mod error;
pub mod news;
pub mod pipeline;
pub mod summarize;
pub mod timestamp;

pub use config::AppConfig;
pub use error::{Error, Result};
pub use news::{Article, Category, Country, HeadlineQuery, HeadlineSource, NewsClient, PageSize};
pub use pipeline::{Pipeline, PipelineEvent, RenderedArticle, Summary};
pub use summarize::{ModelLoader, ResourceCell, SummaryModel, T5Loader};
