//! HTTP front end of the shortest URL shortener.

pub mod app;
pub mod cli;
pub mod error;
pub mod handlers;
pub mod model;
pub mod shutdown;
pub mod state;
