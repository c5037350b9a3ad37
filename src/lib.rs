//! Portable core of a set of OpenGL sample renderers.
//!
//! `engine` holds mesh generation, shader building, the frame renderer, the
//! camera and the producer/consumer slots. `samples` builds the concrete
//! renderers on top of it behind the `SurfaceRenderer` lifecycle.

pub mod config;
pub mod engine;
pub mod logging;
pub mod samples;
