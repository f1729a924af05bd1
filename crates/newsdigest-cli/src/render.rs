use std::io::{self, Write};

use newsdigest_core::pipeline::{PipelineEvent, RenderedArticle, Summary};

const RULE: &str = "---";

/// Write the terminal form of a pipeline event
pub fn render_event(event: &PipelineEvent, out: &mut impl Write) -> io::Result<()> {
    match event {
        PipelineEvent::Fetching { query } => {
            writeln!(out, "Fetching latest news for {}...", query)
        }
        PipelineEvent::NoArticles { message } => writeln!(out, "Error: {}", message),
        PipelineEvent::Fetched { count } => {
            writeln!(out, "Fetched {} articles successfully!\n", count)
        }
        PipelineEvent::Summarizing { index, title } => {
            writeln!(out, "Generating summary for {}. {}...", index, title)
        }
        PipelineEvent::Article(block) => render_article(block, out),
        PipelineEvent::Finished { .. } => out.flush(),
    }
}

fn render_article(block: &RenderedArticle, out: &mut impl Write) -> io::Result<()> {
    writeln!(out)?;
    writeln!(out, "### {}. {}", block.index, block.title)?;
    writeln!(out, "Source: {}", block.source)?;
    if let Some(ref published) = block.published {
        writeln!(out, "Published: {}", published)?;
    }
    writeln!(out, "Link: {}", block.url)?;
    writeln!(out)?;
    writeln!(out, "Summary:")?;
    match &block.summary {
        Summary::Generated(text) if text.is_empty() => writeln!(out, "  (no content to summarize)")?,
        Summary::Generated(text) => writeln!(out, "  {}", text)?,
        Summary::Failed { reason } => {
            writeln!(out, "  {}", block.summary.text())?;
            writeln!(out, "  [{}]", reason)?;
        }
    }
    writeln!(out, "{}", RULE)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rendered(event: &PipelineEvent) -> String {
        let mut buf = Vec::new();
        render_event(event, &mut buf).unwrap();
        String::from_utf8(buf).unwrap()
    }

    fn block(published: Option<&str>, summary: Summary) -> RenderedArticle {
        RenderedArticle {
            index: 2,
            title: "Chipmaker beats estimates".to_string(),
            source: "Reuters".to_string(),
            url: "https://example.com/chips".to_string(),
            published: published.map(str::to_string),
            summary,
        }
    }

    #[test]
    fn test_article_block_layout() {
        let text = rendered(&PipelineEvent::Article(block(
            Some("Mar 05, 2024 02:07 PM"),
            Summary::Generated("Revenue rose 20 percent.".to_string()),
        )));

        assert!(text.contains("### 2. Chipmaker beats estimates"));
        assert!(text.contains("Source: Reuters"));
        assert!(text.contains("Published: Mar 05, 2024 02:07 PM"));
        assert!(text.contains("Link: https://example.com/chips"));
        assert!(text.contains("  Revenue rose 20 percent."));
        assert!(text.trim_end().ends_with(RULE));
    }

    #[test]
    fn test_published_line_omitted() {
        let text = rendered(&PipelineEvent::Article(block(
            None,
            Summary::Generated("ok".to_string()),
        )));
        assert!(!text.contains("Published"));
    }

    #[test]
    fn test_failed_summary_shows_placeholder_and_reason() {
        let text = rendered(&PipelineEvent::Article(block(
            None,
            Summary::Failed { reason: "Model error: out of memory".to_string() },
        )));
        assert!(text.contains("Summary unavailable."));
        assert!(text.contains("[Model error: out of memory]"));
    }

    #[test]
    fn test_status_lines() {
        assert_eq!(
            rendered(&PipelineEvent::NoArticles { message: "nothing".to_string() }),
            "Error: nothing\n"
        );
        assert!(rendered(&PipelineEvent::Fetched { count: 4 }).starts_with("Fetched 4 articles successfully!"));
    }
}
