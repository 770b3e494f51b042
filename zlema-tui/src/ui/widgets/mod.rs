//! Small reusable widgets shared by panels.

pub mod slider;

pub use slider::{slider, slider_line};
