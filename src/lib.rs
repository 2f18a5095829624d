pub mod catalog;
pub mod commands;
pub mod db;
pub mod deeplink;
pub mod export;
pub mod live;
pub mod llm;
pub mod models;
pub mod nutrition;
pub mod stats;
pub mod suggestion;
pub mod summary;
pub mod widget;
pub mod workouts;

#[cfg(test)]
mod test_utils;
