pub mod analysis_ws;
pub mod health;
