use std::io::{self, Write};

use anyhow::Result;

use newsdigest_core::pipeline::NO_ARTICLES_MESSAGE;
use newsdigest_core::timestamp::normalize_published;
use newsdigest_core::{AppConfig, Article, HeadlineSource, NewsClient};

use super::SelectionArgs;

/// Print the raw headline list without loading the summarization model
pub async fn run(config: &AppConfig, selection: &SelectionArgs) -> Result<()> {
    let client = NewsClient::new(config)?;
    let query = selection.query(config);

    println!("Fetching headlines for {}...\n", query);

    // Failure causes are logged by the client; the listing only knows "nothing to show"
    let articles = client.fetch_headlines(&query).await;

    let stdout = io::stdout();
    let mut out = stdout.lock();
    write_headlines(&articles, &mut out)?;
    out.flush()?;

    Ok(())
}

fn write_headlines(articles: &[Article], out: &mut impl Write) -> io::Result<()> {
    if articles.is_empty() {
        return writeln!(out, "Error: {}", NO_ARTICLES_MESSAGE);
    }

    for (i, article) in articles.iter().enumerate() {
        writeln!(out, "  {}. {}", i + 1, article.title_or_placeholder())?;
        let published = normalize_published(article.published_at.as_deref())
            .map(|p| format!(" - {}", p))
            .unwrap_or_default();
        writeln!(out, "     {}{}", article.source_or_placeholder(), published)?;
        writeln!(out, "     {}", article.url_or_placeholder())?;
        writeln!(out)?;
    }

    Ok(())
}
