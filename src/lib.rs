//! Fixed indexed annuity value estimates: index crediting, market-data lookup and
//! client PDF reports behind a small HTTP API.

pub mod app;
pub mod config;
pub mod errors;
pub mod external;
pub mod logging;
pub mod models;
pub mod routes;
pub mod services;
pub mod state;
pub mod utils;
