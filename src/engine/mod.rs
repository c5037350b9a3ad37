pub mod errors;
pub mod utils;
pub mod components;
pub mod rendering;
pub mod systems;
pub mod managers;

// Re-export the types most callers need
pub use errors::{ MeshError, RenderError, ResourceError, ShaderError };
pub use rendering::gl_api::{ GlApi, Viewport };
