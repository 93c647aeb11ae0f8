//! Terminal front end for the chat view.
//!
//! - [`app`]: event loop tying key presses and replies to the view
//! - [`handlers`]: key bindings
//! - [`render`]: ratatui drawing code

pub mod app;
pub mod handlers;
pub mod render;

pub use app::{run, run_loop};
