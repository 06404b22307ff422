pub mod app_state;
pub mod backends;
pub mod demo;
pub mod errors;
pub mod middleware;
pub mod startup;
pub mod telemetry;
