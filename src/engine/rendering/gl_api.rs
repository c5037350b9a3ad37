//! The slice of OpenGL the samples actually use.
//!
//! Renderers are generic over [`GlApi`] so they run against `glow::Context` in
//! the host and against a recording fake in tests.

use std::fmt::Debug;

use glow::HasContext;

use crate::engine::components::mesh::Topology;
use crate::engine::utils::math::Mat4x4;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ShaderStage {
    Vertex,
    Fragment,
}

impl ShaderStage {
    pub fn gl_kind(self) -> u32 {
        match self {
            ShaderStage::Vertex => glow::VERTEX_SHADER,
            ShaderStage::Fragment => glow::FRAGMENT_SHADER,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BufferTarget {
    Array,
    ElementArray,
}

impl BufferTarget {
    fn gl_target(self) -> u32 {
        match self {
            BufferTarget::Array => glow::ARRAY_BUFFER,
            BufferTarget::ElementArray => glow::ELEMENT_ARRAY_BUFFER,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Viewport {
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
}

impl Viewport {
    pub fn new(x: i32, y: i32, width: i32, height: i32) -> Self {
        Self { x, y, width, height }
    }
}

pub trait GlApi {
    type Shader: Copy + Debug + PartialEq;
    type Program: Copy + Debug + PartialEq;
    type Buffer: Copy + Debug + PartialEq;
    type VertexArray: Copy + Debug + PartialEq;
    type Texture: Copy + Debug + PartialEq;
    type UniformLocation: Clone + Debug;

    // shaders and programs
    fn create_shader(&self, stage: ShaderStage) -> Result<Self::Shader, String>;
    fn compile_shader_source(&self, shader: Self::Shader, source: &str) -> bool;
    fn shader_info_log(&self, shader: Self::Shader) -> String;
    fn delete_shader(&self, shader: Self::Shader);
    fn create_program(&self) -> Result<Self::Program, String>;
    fn attach_shader(&self, program: Self::Program, shader: Self::Shader);
    fn detach_shader(&self, program: Self::Program, shader: Self::Shader);
    fn link_program(&self, program: Self::Program) -> bool;
    fn validate_program(&self, program: Self::Program) -> bool;
    fn program_info_log(&self, program: Self::Program) -> String;
    fn delete_program(&self, program: Self::Program);
    fn use_program(&self, program: Option<Self::Program>);
    fn attrib_location(&self, program: Self::Program, name: &str) -> Option<u32>;
    fn uniform_location(&self, program: Self::Program, name: &str) -> Option<Self::UniformLocation>;
    fn uniform_matrix4(&self, location: &Self::UniformLocation, matrix: &Mat4x4);
    fn uniform_i32(&self, location: &Self::UniformLocation, value: i32);
    fn uniform_vec4(&self, location: &Self::UniformLocation, value: [f32; 4]);
    fn uniform_f32_array(&self, location: &Self::UniformLocation, values: &[f32]);

    // buffers and vertex state
    fn create_buffer(&self) -> Result<Self::Buffer, String>;
    fn bind_buffer(&self, target: BufferTarget, buffer: Option<Self::Buffer>);
    fn buffer_data(&self, target: BufferTarget, data: &[u8]);
    fn delete_buffer(&self, buffer: Self::Buffer);
    fn create_vertex_array(&self) -> Result<Self::VertexArray, String>;
    fn bind_vertex_array(&self, vao: Option<Self::VertexArray>);
    fn delete_vertex_array(&self, vao: Self::VertexArray);
    fn vertex_attrib_pointer_f32(&self, index: u32, components: i32);
    fn enable_vertex_attrib_array(&self, index: u32);
    fn disable_vertex_attrib_array(&self, index: u32);

    // textures
    fn create_texture(&self) -> Result<Self::Texture, String>;
    fn bind_texture_2d(&self, unit: u32, texture: Option<Self::Texture>);
    fn tex_image_rgba8(&self, width: u32, height: u32, pixels: &[u8]);
    fn tex_sub_image_rgba8(&self, width: u32, height: u32, pixels: &[u8]);
    fn delete_texture(&self, texture: Self::Texture);

    // frame
    fn viewport(&self, viewport: Viewport);
    fn clear(&self, color: [f32; 4], depth: bool);
    fn set_depth_test(&self, enabled: bool);
    fn draw_arrays(&self, topology: Topology, count: i32);
    fn draw_elements_u16(&self, topology: Topology, count: i32);
}

impl GlApi for glow::Context {
    type Shader = glow::Shader;
    type Program = glow::Program;
    type Buffer = glow::Buffer;
    type VertexArray = glow::VertexArray;
    type Texture = glow::Texture;
    type UniformLocation = glow::UniformLocation;

    fn create_shader(&self, stage: ShaderStage) -> Result<Self::Shader, String> {
        unsafe { HasContext::create_shader(self, stage.gl_kind()) }
    }

    fn compile_shader_source(&self, shader: Self::Shader, source: &str) -> bool {
        unsafe {
            self.shader_source(shader, source);
            self.compile_shader(shader);
            self.get_shader_compile_status(shader)
        }
    }

    fn shader_info_log(&self, shader: Self::Shader) -> String {
        unsafe { self.get_shader_info_log(shader) }
    }

    fn delete_shader(&self, shader: Self::Shader) {
        unsafe { HasContext::delete_shader(self, shader) }
    }

    fn create_program(&self) -> Result<Self::Program, String> {
        unsafe { HasContext::create_program(self) }
    }

    fn attach_shader(&self, program: Self::Program, shader: Self::Shader) {
        unsafe { HasContext::attach_shader(self, program, shader) }
    }

    fn detach_shader(&self, program: Self::Program, shader: Self::Shader) {
        unsafe { HasContext::detach_shader(self, program, shader) }
    }

    fn link_program(&self, program: Self::Program) -> bool {
        unsafe {
            HasContext::link_program(self, program);
            self.get_program_link_status(program)
        }
    }

    fn validate_program(&self, program: Self::Program) -> bool {
        unsafe {
            HasContext::validate_program(self, program);
            self.get_program_parameter_i32(program, glow::VALIDATE_STATUS) != 0
        }
    }

    fn program_info_log(&self, program: Self::Program) -> String {
        unsafe { self.get_program_info_log(program) }
    }

    fn delete_program(&self, program: Self::Program) {
        unsafe { HasContext::delete_program(self, program) }
    }

    fn use_program(&self, program: Option<Self::Program>) {
        unsafe { HasContext::use_program(self, program) }
    }

    fn attrib_location(&self, program: Self::Program, name: &str) -> Option<u32> {
        unsafe { self.get_attrib_location(program, name) }
    }

    fn uniform_location(&self, program: Self::Program, name: &str) -> Option<Self::UniformLocation> {
        unsafe { self.get_uniform_location(program, name) }
    }

    fn uniform_matrix4(&self, location: &Self::UniformLocation, matrix: &Mat4x4) {
        unsafe { self.uniform_matrix_4_f32_slice(Some(location), true, matrix) }
    }

    fn uniform_i32(&self, location: &Self::UniformLocation, value: i32) {
        unsafe { self.uniform_1_i32(Some(location), value) }
    }

    fn uniform_vec4(&self, location: &Self::UniformLocation, value: [f32; 4]) {
        unsafe { self.uniform_4_f32(Some(location), value[0], value[1], value[2], value[3]) }
    }

    fn uniform_f32_array(&self, location: &Self::UniformLocation, values: &[f32]) {
        unsafe { self.uniform_1_f32_slice(Some(location), values) }
    }

    fn create_buffer(&self) -> Result<Self::Buffer, String> {
        unsafe { HasContext::create_buffer(self) }
    }

    fn bind_buffer(&self, target: BufferTarget, buffer: Option<Self::Buffer>) {
        unsafe { HasContext::bind_buffer(self, target.gl_target(), buffer) }
    }

    fn buffer_data(&self, target: BufferTarget, data: &[u8]) {
        unsafe { self.buffer_data_u8_slice(target.gl_target(), data, glow::STATIC_DRAW) }
    }

    fn delete_buffer(&self, buffer: Self::Buffer) {
        unsafe { HasContext::delete_buffer(self, buffer) }
    }

    fn create_vertex_array(&self) -> Result<Self::VertexArray, String> {
        unsafe { HasContext::create_vertex_array(self) }
    }

    fn bind_vertex_array(&self, vao: Option<Self::VertexArray>) {
        unsafe { HasContext::bind_vertex_array(self, vao) }
    }

    fn delete_vertex_array(&self, vao: Self::VertexArray) {
        unsafe { HasContext::delete_vertex_array(self, vao) }
    }

    fn vertex_attrib_pointer_f32(&self, index: u32, components: i32) {
        unsafe { HasContext::vertex_attrib_pointer_f32(self, index, components, glow::FLOAT, false, 0, 0) }
    }

    fn enable_vertex_attrib_array(&self, index: u32) {
        unsafe { HasContext::enable_vertex_attrib_array(self, index) }
    }

    fn disable_vertex_attrib_array(&self, index: u32) {
        unsafe { HasContext::disable_vertex_attrib_array(self, index) }
    }

    fn create_texture(&self) -> Result<Self::Texture, String> {
        unsafe { HasContext::create_texture(self) }
    }

    fn bind_texture_2d(&self, unit: u32, texture: Option<Self::Texture>) {
        unsafe {
            self.active_texture(glow::TEXTURE0 + unit);
            self.bind_texture(glow::TEXTURE_2D, texture);
        }
    }

    fn tex_image_rgba8(&self, width: u32, height: u32, pixels: &[u8]) {
        unsafe {
            self.tex_image_2d(
                glow::TEXTURE_2D,
                0,
                glow::RGBA as i32,
                width as i32,
                height as i32,
                0,
                glow::RGBA,
                glow::UNSIGNED_BYTE,
                glow::PixelUnpackData::Slice(Some(pixels))
            );
            self.tex_parameter_i32(glow::TEXTURE_2D, glow::TEXTURE_MIN_FILTER, glow::LINEAR_MIPMAP_LINEAR as i32);
            self.tex_parameter_i32(glow::TEXTURE_2D, glow::TEXTURE_MAG_FILTER, glow::LINEAR as i32);
            self.tex_parameter_i32(glow::TEXTURE_2D, glow::TEXTURE_WRAP_S, glow::REPEAT as i32);
            self.tex_parameter_i32(glow::TEXTURE_2D, glow::TEXTURE_WRAP_T, glow::CLAMP_TO_EDGE as i32);
            self.generate_mipmap(glow::TEXTURE_2D);
        }
    }

    fn tex_sub_image_rgba8(&self, width: u32, height: u32, pixels: &[u8]) {
        unsafe {
            self.tex_sub_image_2d(
                glow::TEXTURE_2D,
                0,
                0,
                0,
                width as i32,
                height as i32,
                glow::RGBA,
                glow::UNSIGNED_BYTE,
                glow::PixelUnpackData::Slice(Some(pixels))
            );
            self.generate_mipmap(glow::TEXTURE_2D);
        }
    }

    fn delete_texture(&self, texture: Self::Texture) {
        unsafe { HasContext::delete_texture(self, texture) }
    }

    fn viewport(&self, viewport: Viewport) {
        unsafe { HasContext::viewport(self, viewport.x, viewport.y, viewport.width, viewport.height) }
    }

    fn clear(&self, color: [f32; 4], depth: bool) {
        unsafe {
            self.clear_color(color[0], color[1], color[2], color[3]);
            let mut mask = glow::COLOR_BUFFER_BIT;
            if depth {
                self.clear_depth_f32(1.0);
                mask |= glow::DEPTH_BUFFER_BIT;
            }
            HasContext::clear(self, mask);
        }
    }

    fn set_depth_test(&self, enabled: bool) {
        unsafe {
            if enabled {
                self.enable(glow::DEPTH_TEST);
                self.depth_func(glow::LESS);
            } else {
                self.disable(glow::DEPTH_TEST);
            }
        }
    }

    fn draw_arrays(&self, topology: Topology, count: i32) {
        unsafe { HasContext::draw_arrays(self, topology.gl_mode(), 0, count) }
    }

    fn draw_elements_u16(&self, topology: Topology, count: i32) {
        unsafe { self.draw_elements(topology.gl_mode(), count, glow::UNSIGNED_SHORT, 0) }
    }
}
