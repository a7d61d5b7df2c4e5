pub mod favorites;
pub mod news;
pub mod search;
pub mod setup;
pub mod ui;
