//! UI layer for desktop GUI: app shell and shared widgets.

pub mod app;
pub mod widgets;

pub use app::TherapyDeskApp;
