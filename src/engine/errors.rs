use thiserror::Error;

use crate::engine::rendering::gl_api::ShaderStage;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum MeshError {
    #[error("angular step must be in (0, 360] degrees, got {0}")]
    InvalidStep(f32),

    #[error("radius must be positive and finite, got {0}")]
    InvalidRadius(f32),

    #[error("segment count must be at least 3, got {0}")]
    TooFewSegments(u32),

    #[error("position buffer length {0} is not a multiple of 3")]
    RaggedPositions(usize),

    #[error("vertex attribute has {actual} floats, expected {expected}")]
    AttributeLength { expected: usize, actual: usize },

    #[error("index {index} out of range for {vertex_count} vertices")]
    IndexOutOfRange { index: u16, vertex_count: usize },

    #[error("triangle index list length {0} is not a multiple of 3")]
    PartialTriangle(usize),

    #[error("step needs {cells} cells, at most {max} allowed")]
    TooManyCells { cells: f64, max: usize },

    #[error("{0} vertices do not fit 16-bit indices")]
    TooManyVertices(usize),
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ShaderError {
    #[error("failed to create {0}: {1}")]
    Create(&'static str, String),

    #[error("{stage:?} shader failed to compile: {log}")]
    Compile { stage: ShaderStage, log: String },

    #[error("program failed to link: {log}")]
    Link { log: String },
}

#[derive(Debug, Error)]
pub enum ResourceError {
    #[error("texture unavailable: {0}")]
    Texture(String),

    #[error("buffer unavailable: {0}")]
    Buffer(String),

    #[error("image is {width}x{height} but carries {len} bytes")]
    ImageSize { width: u32, height: u32, len: usize },

    #[error("failed to decode image: {0}")]
    Image(#[from] image::ImageError),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// Anything that stops a sample from reaching a drawable state.
#[derive(Debug, Error)]
pub enum RenderError {
    #[error(transparent)]
    Mesh(#[from] MeshError),

    #[error(transparent)]
    Shader(#[from] ShaderError),

    #[error(transparent)]
    Resource(#[from] ResourceError),
}
