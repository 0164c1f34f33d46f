#![forbid(unsafe_code)]

//! flashtui: review flashcards and edit notes in the terminal.
//!
//! The binary is a thin shell around [`cli::run`]. Everything the views do
//! goes through [`App`], which owns the drawing surface and the collection.

pub mod app;
pub mod cli;
pub mod collection;
pub mod commands;
pub mod config;
pub mod error;
pub mod views;

#[cfg(test)]
mod testing;

pub use app::App;
pub use error::{Error, Result};
