//! Interactive controller for exploratory rendering.
//!
//! The application layer for interactive use: callers submit view parameters
//! and receive frames, progress, and errors through a presenter port. Only
//! the newest request is ever rendered; superseded work is dropped before it
//! reaches the presenter.

mod controller;
pub mod data;
pub mod errors;
pub mod events;
pub mod ports;

pub use controller::InteractiveController;
