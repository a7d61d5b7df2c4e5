use super::ui;
use crate::core::{Favorite, FavoritesStore};
use anyhow::Result;
use comfy_table::Cell;

/// Favorites on the command line belong to this user.
pub const LOCAL_USER: &str = "local";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FavoritesCommand {
    List,
    Add { ticker: String, name: Option<String> },
    Remove { ticker: String },
}

fn display_as_table(favorites: &[Favorite]) -> String {
    let mut table = ui::new_styled_table();
    table.set_header(vec![
        ui::header_cell("Ticker"),
        ui::header_cell("Name"),
        ui::header_cell("Added"),
    ]);
    for favorite in favorites {
        table.add_row(vec![
            Cell::new(&favorite.ticker),
            Cell::new(&favorite.name),
            Cell::new(favorite.added_at.format("%Y-%m-%d %H:%M")),
        ]);
    }
    table.to_string()
}

pub async fn run(store: &dyn FavoritesStore, command: FavoritesCommand) -> Result<()> {
    match command {
        FavoritesCommand::List => {
            let favorites = store.list(LOCAL_USER).await?;
            if favorites.is_empty() {
                println!("No favorites yet. Add one with `favorites add <TICKER>`.");
            } else {
                println!("{}", display_as_table(&favorites));
            }
        }
        FavoritesCommand::Add { ticker, name } => {
            let favorite = store.add(LOCAL_USER, &ticker, name.as_deref()).await?;
            println!(
                "{} {} ({})",
                ui::style_text("Added", ui::StyleType::Success),
                favorite.ticker,
                favorite.name
            );
        }
        FavoritesCommand::Remove { ticker } => {
            if store.remove(LOCAL_USER, &ticker).await? {
                println!("Removed {}", ticker.trim().to_uppercase());
            } else {
                println!(
                    "{}",
                    ui::style_text(
                        &format!("{} is not a favorite", ticker.trim().to_uppercase()),
                        ui::StyleType::Error
                    )
                );
            }
        }
    }
    Ok(())
}
