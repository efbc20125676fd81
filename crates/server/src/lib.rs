pub mod config;
pub mod engine;
pub mod error;
pub mod process;
pub mod relay;
pub mod routes;
pub mod socket;
