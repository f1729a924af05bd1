use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::{Error, Result};

pub const TITLE_PLACEHOLDER: &str = "No title";
pub const SOURCE_PLACEHOLDER: &str = "Unknown";
pub const URL_PLACEHOLDER: &str = "#";

/// Regions the headline endpoint is queried for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Country {
    In,
    Us,
    Gb,
    Au,
    Ca,
}

impl Country {
    pub const ALL: [Country; 5] = [Country::In, Country::Us, Country::Gb, Country::Au, Country::Ca];

    pub fn code(&self) -> &'static str {
        match self {
            Country::In => "in",
            Country::Us => "us",
            Country::Gb => "gb",
            Country::Au => "au",
            Country::Ca => "ca",
        }
    }
}

impl fmt::Display for Country {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for Country {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let wanted = s.trim().to_ascii_lowercase();
        Country::ALL
            .into_iter()
            .find(|c| c.code() == wanted)
            .ok_or_else(|| Error::InvalidSelection(format!("unknown country '{}'", s.trim())))
    }
}

/// Topic categories offered by the headline endpoint
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    General,
    Technology,
    Business,
    Entertainment,
    Health,
    Science,
    Sports,
}

impl Category {
    pub const ALL: [Category; 7] = [
        Category::General,
        Category::Technology,
        Category::Business,
        Category::Entertainment,
        Category::Health,
        Category::Science,
        Category::Sports,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Category::General => "general",
            Category::Technology => "technology",
            Category::Business => "business",
            Category::Entertainment => "entertainment",
            Category::Health => "health",
            Category::Science => "science",
            Category::Sports => "sports",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Category {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let wanted = s.trim().to_ascii_lowercase();
        Category::ALL
            .into_iter()
            .find(|c| c.as_str() == wanted)
            .ok_or_else(|| Error::InvalidSelection(format!("unknown category '{}'", s.trim())))
    }
}

/// Number of headlines to request, always within 1..=10
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct PageSize(u8);

impl PageSize {
    pub const MIN: u8 = 1;
    pub const MAX: u8 = 10;

    pub fn new(value: u8) -> Result<Self> {
        if (Self::MIN..=Self::MAX).contains(&value) {
            Ok(Self(value))
        } else {
            Err(Error::InvalidSelection(format!(
                "article count must be between {} and {}, got {}",
                Self::MIN,
                Self::MAX,
                value
            )))
        }
    }

    pub fn get(&self) -> usize {
        self.0 as usize
    }
}

impl Default for PageSize {
    fn default() -> Self {
        Self(5)
    }
}

impl TryFrom<u8> for PageSize {
    type Error = Error;

    fn try_from(value: u8) -> Result<Self> {
        Self::new(value)
    }
}

impl From<PageSize> for u8 {
    fn from(size: PageSize) -> u8 {
        size.0
    }
}

impl FromStr for PageSize {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let value: u8 = s
            .trim()
            .parse()
            .map_err(|_| Error::InvalidSelection(format!("'{}' is not a valid article count", s.trim())))?;
        Self::new(value)
    }
}

/// The selection a single fetch is made with
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HeadlineQuery {
    pub country: Country,
    pub category: Category,
    pub page_size: PageSize,
}

impl HeadlineQuery {
    pub fn new(country: Country, category: Category, page_size: PageSize) -> Self {
        Self { country, category, page_size }
    }
}

impl fmt::Display for HeadlineQuery {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{} (max {})", self.country, self.category, self.page_size.get())
    }
}

/// A headline as returned by the news API. Every field may be missing.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Article {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub source: Option<ArticleSource>,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub content: Option<String>,
    #[serde(default)]
    pub published_at: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArticleSource {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
}

impl Article {
    pub fn title_or_placeholder(&self) -> &str {
        non_blank(self.title.as_deref()).unwrap_or(TITLE_PLACEHOLDER)
    }

    pub fn source_or_placeholder(&self) -> &str {
        non_blank(self.source.as_ref().and_then(|s| s.name.as_deref())).unwrap_or(SOURCE_PLACEHOLDER)
    }

    pub fn url_or_placeholder(&self) -> &str {
        non_blank(self.url.as_deref()).unwrap_or(URL_PLACEHOLDER)
    }

    pub fn content_or_empty(&self) -> &str {
        self.content.as_deref().unwrap_or("")
    }
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.trim().is_empty())
}

/// Envelope of the `top-headlines` response
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct HeadlinesResponse {
    pub status: String,
    #[serde(default)]
    pub code: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub articles: Vec<Article>,
}
