use super::gl_api::{ BufferTarget, GlApi, Viewport };
use super::shader::ShaderProgram;
use crate::engine::components::mesh::{ Mesh, Topology, POSITION_COMPONENTS };
use crate::engine::errors::ResourceError;
use crate::engine::utils::math::Mat4x4;

/// Shader attribute names a mesh's buffers feed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VertexLayout {
    pub position: &'static str,
    pub attribute: Option<&'static str>,
}

impl VertexLayout {
    pub const fn positions(position: &'static str) -> Self {
        Self { position, attribute: None }
    }

    pub const fn with_attribute(position: &'static str, attribute: &'static str) -> Self {
        Self { position, attribute: Some(attribute) }
    }
}

struct AttributeBuffer<G: GlApi> {
    name: &'static str,
    buffer: G::Buffer,
    components: i32,
}

/// Mesh buffers living on the GPU. Uploaded once, drawn every frame.
pub struct GpuMesh<G: GlApi> {
    vao: G::VertexArray,
    attributes: Vec<AttributeBuffer<G>>,
    elements: Option<G::Buffer>,
    topology: Topology,
    count: i32,
}

impl<G: GlApi> GpuMesh<G> {
    pub fn upload(gl: &G, mesh: &Mesh, layout: VertexLayout) -> Result<Self, ResourceError> {
        let vao = gl.create_vertex_array().map_err(ResourceError::Buffer)?;
        gl.bind_vertex_array(Some(vao));

        let mut gpu = Self {
            vao,
            attributes: Vec::with_capacity(2),
            elements: None,
            topology: mesh.topology(),
            count: mesh.draw_count() as i32,
        };

        let mut streams = vec![(layout.position, mesh.positions(), POSITION_COMPONENTS)];
        if let (Some(name), Some(data)) = (layout.attribute, mesh.attribute().data()) {
            streams.push((name, data, mesh.attribute().components()));
        }

        for (name, data, components) in streams {
            let buffer = match gl.create_buffer() {
                Ok(buffer) => buffer,
                Err(e) => {
                    gl.bind_vertex_array(None);
                    gpu.release(gl);
                    return Err(ResourceError::Buffer(e));
                }
            };
            gl.bind_buffer(BufferTarget::Array, Some(buffer));
            gl.buffer_data(BufferTarget::Array, bytemuck::cast_slice(data));
            gpu.attributes.push(AttributeBuffer { name, buffer, components: components as i32 });
        }

        if let Some(indices) = mesh.indices() {
            match gl.create_buffer() {
                Ok(buffer) => {
                    gl.bind_buffer(BufferTarget::ElementArray, Some(buffer));
                    gl.buffer_data(BufferTarget::ElementArray, bytemuck::cast_slice(indices));
                    gpu.elements = Some(buffer);
                }
                Err(e) => {
                    gl.bind_vertex_array(None);
                    gpu.release(gl);
                    return Err(ResourceError::Buffer(e));
                }
            }
        }

        gl.bind_vertex_array(None);
        gl.bind_buffer(BufferTarget::Array, None);
        Ok(gpu)
    }

    pub fn topology(&self) -> Topology {
        self.topology
    }

    pub fn count(&self) -> i32 {
        self.count
    }

    pub fn is_indexed(&self) -> bool {
        self.elements.is_some()
    }

    pub fn release(self, gl: &G) {
        for attribute in &self.attributes {
            gl.delete_buffer(attribute.buffer);
        }
        if let Some(elements) = self.elements {
            gl.delete_buffer(elements);
        }
        gl.delete_vertex_array(self.vao);
    }
}

/// One uniform upload for a draw, borrowed from the caller's state.
#[derive(Debug, Clone, Copy)]
pub enum Uniform<'a> {
    Matrix(&'a str, &'a Mat4x4),
    Int(&'a str, i32),
    Vec4(&'a str, [f32; 4]),
    /// `float name[N]`, uploaded from element 0.
    Floats(&'a str, &'a [f32]),
}

/// Texture bound to a unit for the duration of a draw.
#[derive(Debug, Clone, Copy)]
pub struct TextureBinding<T> {
    pub unit: u32,
    pub texture: T,
}

/// Per-frame driver: clears the target and issues one draw per mesh.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrameRenderer {
    pub clear_color: [f32; 4],
    pub depth_test: bool,
}

impl Default for FrameRenderer {
    fn default() -> Self {
        Self { clear_color: [0.0, 0.0, 0.0, 1.0], depth_test: false }
    }
}

impl FrameRenderer {
    pub fn new(clear_color: [f32; 4], depth_test: bool) -> Self {
        Self { clear_color, depth_test }
    }

    pub fn begin_frame<G: GlApi>(&self, gl: &G, viewport: Viewport) {
        gl.viewport(viewport);
        gl.set_depth_test(self.depth_test);
        gl.clear(self.clear_color, self.depth_test);
    }

    /// Sets the viewport without clearing, for the second eye of a stereo frame.
    pub fn set_viewport<G: GlApi>(&self, gl: &G, viewport: Viewport) {
        gl.viewport(viewport);
    }

    pub fn draw<G: GlApi>(
        &self,
        gl: &G,
        program: &ShaderProgram<G>,
        mesh: &GpuMesh<G>,
        uniforms: &[Uniform<'_>],
        texture: Option<TextureBinding<G::Texture>>
    ) {
        gl.use_program(Some(program.program()));

        for uniform in uniforms {
            match *uniform {
                Uniform::Matrix(name, matrix) => {
                    if let Some(location) = program.uniform(name) {
                        gl.uniform_matrix4(location, matrix);
                    }
                }
                Uniform::Int(name, value) => {
                    if let Some(location) = program.uniform(name) {
                        gl.uniform_i32(location, value);
                    }
                }
                Uniform::Vec4(name, value) => {
                    if let Some(location) = program.uniform(name) {
                        gl.uniform_vec4(location, value);
                    }
                }
                Uniform::Floats(name, values) => {
                    if let Some(location) = program.uniform(name) {
                        gl.uniform_f32_array(location, values);
                    }
                }
            }
        }

        gl.bind_vertex_array(Some(mesh.vao));

        // at most two streams per mesh, kept on the stack
        let mut enabled = [None; 2];
        for (slot, attribute) in enabled.iter_mut().zip(&mesh.attributes) {
            if let Some(location) = program.attribute(attribute.name) {
                gl.bind_buffer(BufferTarget::Array, Some(attribute.buffer));
                gl.vertex_attrib_pointer_f32(location, attribute.components);
                gl.enable_vertex_attrib_array(location);
                *slot = Some(location);
            }
        }

        if let Some(binding) = texture {
            gl.bind_texture_2d(binding.unit, Some(binding.texture));
        }

        match mesh.elements {
            Some(elements) => {
                gl.bind_buffer(BufferTarget::ElementArray, Some(elements));
                gl.draw_elements_u16(mesh.topology, mesh.count);
            }
            None => gl.draw_arrays(mesh.topology, mesh.count),
        }

        for location in enabled.iter().flatten() {
            gl.disable_vertex_attrib_array(*location);
        }
        gl.bind_vertex_array(None);
    }
}
