//! Core of the Gmail alias bot.
//!
//! Dot-trick alias enumeration, the persistent per-address progress ledger, and the
//! conversation flow around them. Telegram lives behind the messaging port in an
//! adapter crate.

pub mod combinatorics;
pub mod config;
pub mod dialog;
pub mod domain;
pub mod errors;
pub mod formatting;
pub mod ledger;
pub mod logging;
pub mod messaging;
pub mod normalize;
pub mod service;
pub mod session;
pub mod utils;

pub use errors::{AliasError, Error, Result};
