use std::io::Write;

use anyhow::Result;
use tokio::io::{AsyncBufReadExt, BufReader};

use newsdigest_core::{AppConfig, Category, Country, HeadlineQuery, PageSize};

use super::{build_pipeline, trigger};

/// What a line typed at the session prompt asks for
#[derive(Debug, PartialEq, Eq)]
enum Input {
    Trigger(HeadlineQuery),
    Countries,
    Categories,
    Help,
    Quit,
}

/// Parse a prompt line against the current selection
///
/// Tokens may come in any order; each one replaces the matching part of the
/// selection. A blank line re-runs the current selection.
fn parse_input(line: &str, current: HeadlineQuery) -> std::result::Result<Input, String> {
    let line = line.trim();
    match line.to_ascii_lowercase().as_str() {
        "q" | "quit" | "exit" => return Ok(Input::Quit),
        "countries" => return Ok(Input::Countries),
        "categories" => return Ok(Input::Categories),
        "?" | "h" | "help" => return Ok(Input::Help),
        _ => {}
    }

    let mut query = current;
    for token in line.split_whitespace() {
        if let Ok(country) = token.parse::<Country>() {
            query.country = country;
        } else if let Ok(category) = token.parse::<Category>() {
            query.category = category;
        } else if token.chars().all(|c| c.is_ascii_digit()) {
            query.page_size = token.parse::<PageSize>().map_err(|e| e.to_string())?;
        } else {
            return Err(format!("Unrecognized input '{}' (type 'help' for usage)", token));
        }
    }

    Ok(Input::Trigger(query))
}

fn join_values<T: ToString>(values: impl IntoIterator<Item = T>) -> String {
    values.into_iter().map(|v| v.to_string()).collect::<Vec<_>>().join(", ")
}

fn print_help() {
    println!("Enter a selection and press Enter to fetch & summarize, e.g.:");
    println!("  us technology 3");
    println!("  gb            (change only the country)");
    println!("  <Enter>       (repeat the current selection)");
    println!("Other commands: countries, categories, help, quit");
}

fn prompt(current: &HeadlineQuery) {
    print!("\n[{}] > ", current);
    // A failed flush only delays the prompt
    let _ = std::io::stdout().flush();
}

/// Long-lived interactive session: load the model once, then fetch on demand
pub async fn run(config: &AppConfig) -> Result<()> {
    let pipeline = build_pipeline(config)?;

    println!("Real-Time News Summarizer");
    println!("Loading summarization model {}...", config.model.model_id);
    pipeline.warm_up().await?;
    println!("Model ready.\n");
    print_help();

    let mut current = config.news.default_query();
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    loop {
        prompt(&current);

        let Some(line) = lines.next_line().await? else {
            println!();
            break;
        };

        match parse_input(&line, current) {
            Ok(Input::Trigger(query)) => {
                current = query;
                trigger(&pipeline, query).await;
            }
            Ok(Input::Countries) => println!("Countries: {}", join_values(Country::ALL)),
            Ok(Input::Categories) => println!("Categories: {}", join_values(Category::ALL)),
            Ok(Input::Help) => print_help(),
            Ok(Input::Quit) => break,
            Err(message) => println!("{}", message),
        }
    }

    Ok(())
}
