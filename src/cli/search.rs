use super::ui;
use crate::core::{SearchError, SearchResult, StockSearch};
use anyhow::Result;
use comfy_table::Cell;
use futures::future::join_all;

fn display_as_table(results: &[(String, Result<SearchResult, SearchError>)]) -> String {
    let mut table = ui::new_styled_table();
    table.set_header(vec![
        ui::header_cell("Query"),
        ui::header_cell("Ticker"),
        ui::header_cell("Company"),
        ui::header_cell("Sector"),
        ui::header_cell("Score"),
        ui::header_cell("Return"),
        ui::header_cell("Risk"),
        ui::header_cell("Data"),
    ]);

    for (query, result) in results {
        match result {
            Ok(r) => table.add_row(vec![
                Cell::new(query),
                Cell::new(&r.ticker),
                Cell::new(&r.company),
                Cell::new(&r.sector),
                ui::score_cell(r.score),
                ui::change_cell(r.return_pct),
                ui::risk_cell(r.risk),
                ui::quality_cell(r.quality),
            ]),
            Err(e) => table.add_row(vec![
                Cell::new(query),
                Cell::new(ui::style_text(&e.to_string(), ui::StyleType::Error)),
            ]),
        };
    }

    table.to_string()
}

/// Looks up every query concurrently and prints one row per query.
pub async fn run(search: &StockSearch, queries: &[String]) -> Result<()> {
    if queries.is_empty() {
        println!("Nothing to search for.");
        return Ok(());
    }

    let pb = ui::new_progress_bar(queries.len() as u64);
    let futures = queries.iter().map(|query| {
        let pb = pb.clone();
        async move {
            let result = search.search(query).await;
            pb.inc(1);
            (query.clone(), result)
        }
    });
    let results: Vec<_> = join_all(futures).await;
    pb.finish_and_clear();

    println!("{}", display_as_table(&results));
    if results
        .iter()
        .any(|(_, r)| r.as_ref().is_ok_and(SearchResult::is_degraded))
    {
        println!(
            "{}",
            ui::style_text(
                "Degraded rows use placeholder figures: market data was unavailable.",
                ui::StyleType::Subtle
            )
        );
    }
    Ok(())
}
