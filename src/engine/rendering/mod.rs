pub mod gl_api;
pub mod renderer;
pub mod shader;

#[cfg(test)]
pub mod fake_gl;

pub use renderer::{ FrameRenderer, GpuMesh, Uniform, VertexLayout };
pub use shader::ShaderProgram;
