pub mod ai;
pub mod client;
pub mod config;
pub mod errors;
pub mod extract;
pub mod gateway;
pub mod llm_client;
pub mod models;
pub mod recovery;
pub mod routes;
pub mod state;
