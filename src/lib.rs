pub mod cascade;
pub mod catalog;
pub mod categories;
pub mod config;
pub mod db;
pub mod explain;
pub mod ingest;
pub mod models;
pub mod parser;
pub mod selector;
pub mod server;

#[cfg(test)]
mod test_support;

pub use config::AppConfig;
pub use server::run_server;
