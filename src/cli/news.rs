use super::ui;
use crate::core::{NewsFeed, NewsService};
use anyhow::Result;
use comfy_table::Cell;

fn display_as_table(feed: &NewsFeed) -> String {
    let mut table = ui::new_styled_table();
    table.set_header(vec![
        ui::header_cell("Published"),
        ui::header_cell("Headline"),
        ui::header_cell("Link"),
    ]);
    for item in &feed.items {
        let headline = if item.summary.is_empty() {
            item.title.clone()
        } else {
            format!(
                "{}\n{}",
                item.title,
                ui::style_text(&item.summary, ui::StyleType::Subtle)
            )
        };
        table.add_row(vec![
            ui::format_optional_cell(item.published.as_deref(), str::to_string),
            Cell::new(headline),
            Cell::new(&item.url),
        ]);
    }
    table.to_string()
}

pub async fn run(news: &NewsService, ticker: &str) -> Result<()> {
    let spinner = ui::new_spinner(&format!("Fetching headlines for {}", ticker.trim()));
    let result = news.headlines(ticker).await;
    spinner.finish_and_clear();

    let feed = result?;
    println!(
        "\n{} ({})",
        ui::style_text(&feed.ticker, ui::StyleType::Title),
        ui::style_text(&feed.source, ui::StyleType::Subtle)
    );
    if feed.items.is_empty() {
        println!("No headlines found.");
        return Ok(());
    }
    println!("{}", display_as_table(&feed));
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::NewsItem;

    #[test]
    fn test_display_as_table() {
        let feed = NewsFeed {
            ticker: "AAPL".to_string(),
            source: "Yahoo Finance".to_string(),
            items: vec![
                NewsItem {
                    title: "Apple unveils new chips".to_string(),
                    url: "https://example.com/a".to_string(),
                    summary: "Apple announced new silicon.".to_string(),
                    published: Some("Mon, 13 Oct 2025 14:05:00 +0000".to_string()),
                },
                NewsItem {
                    title: "Undated story".to_string(),
                    url: "https://example.com/b".to_string(),
                    summary: String::new(),
                    published: None,
                },
            ],
        };

        let table = display_as_table(&feed);
        assert!(table.contains("Apple unveils new chips"));
        assert!(table.contains("Apple announced new silicon."));
        assert!(table.contains("https://example.com/b"));
        assert!(table.contains("N/A"));
    }
}
