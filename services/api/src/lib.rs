//! Media gateway
//!
//! Authenticated proxy in front of the stock-media provider and the hosted
//! upload service. Provider credentials live only here.

pub mod cache;
pub mod error;
pub mod middleware;
pub mod routes;
pub mod state;

pub use state::AppState;
