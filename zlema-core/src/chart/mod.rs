//! Chart model: a renderer-independent list of traces built from dashboard state.
//!
//! The TUI draws a [`ChartSpec`] onto a terminal canvas and the CLI prints a
//! summary of it, so the draw order and colouring rules live here once.

pub mod builder;
pub mod style;
pub mod trace;

pub use builder::{average_series, build_chart, split_by_threshold, ChartInput};
pub use style::{palette, Dash, Rgba, TraceStyle};
pub use trace::{ChartSpec, Panel, Trace, TraceCategory, TraceKind};
