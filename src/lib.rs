//! Client for the Stockfighter simulated stock exchange API.
//!
//! [`exchange::StockfighterClient`] is the async client returning
//! [`Result`]s; [`exchange::BlockingClient`] implements the synchronous
//! [`exchange::Stockfighter`] trait on top of it.

pub mod config;
pub mod error;
pub mod exchange;
pub mod logging;
pub mod types;

pub use config::{AuthScheme, Config};
pub use error::{Error, Result};
