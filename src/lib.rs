pub mod cli;
pub mod config;
pub mod db;
pub mod engine;
pub mod error;
pub mod routes;
pub mod services;
pub mod state;
pub mod store;

#[cfg(test)]
pub mod test_support;
