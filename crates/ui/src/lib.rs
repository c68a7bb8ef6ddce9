//! Headless view-models for the practice screens. Hosts render these and forward
//! gestures back as session events.

pub mod context;
pub mod state;
pub mod vm;

pub use context::{AppContext, UiApp, build_app_context};
pub use state::{ViewError, ViewState};
