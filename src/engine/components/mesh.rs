use crate::engine::errors::MeshError;

pub const POSITION_COMPONENTS: usize = 3;
pub const UV_COMPONENTS: usize = 2;
pub const COLOR_COMPONENTS: usize = 4;

/// Primitive topology a mesh is meant to be drawn with.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Topology {
    Lines,
    LineLoop,
    Triangles,
    TriangleFan,
}

impl Topology {
    pub fn gl_mode(self) -> u32 {
        match self {
            Topology::Lines => glow::LINES,
            Topology::LineLoop => glow::LINE_LOOP,
            Topology::Triangles => glow::TRIANGLES,
            Topology::TriangleFan => glow::TRIANGLE_FAN,
        }
    }
}

/// Per-vertex data carried alongside positions.
#[derive(Debug, Clone, PartialEq)]
pub enum VertexAttribute {
    None,
    TexCoords(Vec<f32>),
    Colors(Vec<f32>),
}

impl VertexAttribute {
    pub fn components(&self) -> usize {
        match self {
            VertexAttribute::None => 0,
            VertexAttribute::TexCoords(_) => UV_COMPONENTS,
            VertexAttribute::Colors(_) => COLOR_COMPONENTS,
        }
    }

    pub fn data(&self) -> Option<&[f32]> {
        match self {
            VertexAttribute::None => None,
            VertexAttribute::TexCoords(data) | VertexAttribute::Colors(data) => Some(data),
        }
    }
}

/// CPU-side geometry. Vertex count is fixed once constructed.
#[derive(Debug, Clone, PartialEq)]
pub struct Mesh {
    positions: Vec<f32>,
    attribute: VertexAttribute,
    indices: Option<Vec<u16>>,
    topology: Topology,
}

impl Mesh {
    pub fn new(
        positions: Vec<f32>,
        attribute: VertexAttribute,
        indices: Option<Vec<u16>>,
        topology: Topology
    ) -> Result<Self, MeshError> {
        if positions.len() % POSITION_COMPONENTS != 0 {
            return Err(MeshError::RaggedPositions(positions.len()));
        }
        let vertex_count = positions.len() / POSITION_COMPONENTS;

        if let Some(data) = attribute.data() {
            let components = attribute.components();
            if data.len() != vertex_count * components {
                return Err(MeshError::AttributeLength {
                    expected: vertex_count * components,
                    actual: data.len(),
                });
            }
        }

        if let Some(indices) = &indices {
            if vertex_count > (u16::MAX as usize) + 1 {
                return Err(MeshError::TooManyVertices(vertex_count));
            }
            if let Some(&bad) = indices.iter().find(|&&i| (i as usize) >= vertex_count) {
                return Err(MeshError::IndexOutOfRange { index: bad, vertex_count });
            }
            if topology == Topology::Triangles && indices.len() % 3 != 0 {
                return Err(MeshError::PartialTriangle(indices.len()));
            }
        }

        Ok(Self { positions, attribute, indices, topology })
    }

    pub fn positions(&self) -> &[f32] {
        &self.positions
    }

    pub fn attribute(&self) -> &VertexAttribute {
        &self.attribute
    }

    pub fn tex_coords(&self) -> Option<&[f32]> {
        match &self.attribute {
            VertexAttribute::TexCoords(data) => Some(data),
            _ => None,
        }
    }

    pub fn colors(&self) -> Option<&[f32]> {
        match &self.attribute {
            VertexAttribute::Colors(data) => Some(data),
            _ => None,
        }
    }

    pub fn indices(&self) -> Option<&[u16]> {
        self.indices.as_deref()
    }

    pub fn topology(&self) -> Topology {
        self.topology
    }

    pub fn vertex_count(&self) -> usize {
        self.positions.len() / POSITION_COMPONENTS
    }

    /// Number of elements a draw call consumes: indices when present, vertices otherwise.
    pub fn draw_count(&self) -> usize {
        match &self.indices {
            Some(indices) => indices.len(),
            None => self.vertex_count(),
        }
    }

    pub fn vertex(&self, index: usize) -> [f32; 3] {
        let base = index * POSITION_COMPONENTS;
        [self.positions[base], self.positions[base + 1], self.positions[base + 2]]
    }
}
