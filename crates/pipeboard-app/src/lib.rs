//! Dashboard binary wiring: config → snapshot fetch → push stream →
//! reconciliation loop → published views.

pub mod render;
pub mod service;

pub use render::render_view;
pub use service::{run_projection_loop, ProjectionView};
