//! Recording stand-in for a GL context used by unit tests.
//!
//! Shaders "compile" when their source contains `void main`; programs "link"
//! unless `fail_link` is set. Attribute and uniform names resolve when any
//! attached shader source mentions them.

use std::cell::{ Cell, RefCell };
use std::collections::{ BTreeSet, HashMap };

use super::gl_api::{ BufferTarget, GlApi, ShaderStage, Viewport };
use crate::engine::components::mesh::Topology;
use crate::engine::utils::math::Mat4x4;

#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    UseProgram(Option<u32>),
    UniformMatrix(String),
    UniformInt(String, i32),
    UniformVec4(String, [f32; 4]),
    UniformFloats(String, Vec<f32>),
    BindVertexArray(Option<u32>),
    BindBuffer(BufferTarget, Option<u32>),
    AttribPointer(u32, i32),
    EnableAttrib(u32),
    DisableAttrib(u32),
    BindTexture(u32, Option<u32>),
    TexImage(u32, u32),
    TexSubImage(u32, u32),
    Viewport(Viewport),
    Clear { depth: bool },
    DepthTest(bool),
    DrawArrays(Topology, i32),
    DrawElements(Topology, i32),
}

#[derive(Default)]
pub struct FakeGl {
    next_id: Cell<u32>,
    pub fail_link: Cell<bool>,
    pub fail_create: Cell<bool>,
    sources: RefCell<HashMap<u32, String>>,
    attached: RefCell<HashMap<u32, Vec<u32>>>,
    live_shaders: RefCell<BTreeSet<u32>>,
    live_programs: RefCell<BTreeSet<u32>>,
    live_buffers: RefCell<BTreeSet<u32>>,
    live_vaos: RefCell<BTreeSet<u32>>,
    live_textures: RefCell<BTreeSet<u32>>,
    uniform_names: RefCell<HashMap<u32, String>>,
    attrib_names: RefCell<HashMap<String, u32>>,
    pub calls: RefCell<Vec<Call>>,
}

impl FakeGl {
    pub fn new() -> Self {
        Self { next_id: Cell::new(1), ..Default::default() }
    }

    fn alloc(&self) -> Result<u32, String> {
        if self.fail_create.get() {
            return Err("out of handles".to_string());
        }
        let id = self.next_id.get();
        self.next_id.set(id + 1);
        Ok(id)
    }

    fn record(&self, call: Call) {
        self.calls.borrow_mut().push(call);
    }

    /// Number of GL objects still alive across every kind.
    pub fn live_objects(&self) -> usize {
        self.live_shaders.borrow().len() +
            self.live_programs.borrow().len() +
            self.live_buffers.borrow().len() +
            self.live_vaos.borrow().len() +
            self.live_textures.borrow().len()
    }

    pub fn live_programs(&self) -> usize {
        self.live_programs.borrow().len()
    }

    pub fn live_textures(&self) -> usize {
        self.live_textures.borrow().len()
    }

    pub fn take_calls(&self) -> Vec<Call> {
        std::mem::take(&mut *self.calls.borrow_mut())
    }

    pub fn count(&self, pred: impl Fn(&Call) -> bool) -> usize {
        self.calls
            .borrow()
            .iter()
            .filter(|c| pred(c))
            .count()
    }

    fn program_mentions(&self, program: u32, name: &str) -> bool {
        let attached = self.attached.borrow();
        let sources = self.sources.borrow();
        attached
            .get(&program)
            .map(|shaders| {
                shaders.iter().any(|s| sources.get(s).is_some_and(|src| src.contains(name)))
            })
            .unwrap_or(false)
    }
}

impl GlApi for FakeGl {
    type Shader = u32;
    type Program = u32;
    type Buffer = u32;
    type VertexArray = u32;
    type Texture = u32;
    type UniformLocation = u32;

    fn create_shader(&self, _stage: ShaderStage) -> Result<u32, String> {
        let id = self.alloc()?;
        self.live_shaders.borrow_mut().insert(id);
        Ok(id)
    }

    fn compile_shader_source(&self, shader: u32, source: &str) -> bool {
        self.sources.borrow_mut().insert(shader, source.to_string());
        source.contains("void main")
    }

    fn shader_info_log(&self, _shader: u32) -> String {
        "ERROR: 0:1: syntax error".to_string()
    }

    fn delete_shader(&self, shader: u32) {
        self.live_shaders.borrow_mut().remove(&shader);
    }

    fn create_program(&self) -> Result<u32, String> {
        let id = self.alloc()?;
        self.live_programs.borrow_mut().insert(id);
        Ok(id)
    }

    fn attach_shader(&self, program: u32, shader: u32) {
        self.attached.borrow_mut().entry(program).or_default().push(shader);
    }

    fn detach_shader(&self, program: u32, shader: u32) {
        if let Some(list) = self.attached.borrow_mut().get_mut(&program) {
            list.retain(|s| *s != shader);
        }
    }

    fn link_program(&self, _program: u32) -> bool {
        !self.fail_link.get()
    }

    fn validate_program(&self, program: u32) -> bool {
        self.live_programs.borrow().contains(&program)
    }

    fn program_info_log(&self, _program: u32) -> String {
        "ERROR: unresolved varying".to_string()
    }

    fn delete_program(&self, program: u32) {
        self.live_programs.borrow_mut().remove(&program);
    }

    fn use_program(&self, program: Option<u32>) {
        self.record(Call::UseProgram(program));
    }

    fn attrib_location(&self, program: u32, name: &str) -> Option<u32> {
        if !self.program_mentions(program, name) {
            return None;
        }
        let mut names = self.attrib_names.borrow_mut();
        let next = names.len() as u32;
        Some(*names.entry(name.to_string()).or_insert(next))
    }

    fn uniform_location(&self, program: u32, name: &str) -> Option<u32> {
        if !self.program_mentions(program, name) {
            return None;
        }
        let id = self.alloc().ok()?;
        self.uniform_names.borrow_mut().insert(id, name.to_string());
        Some(id)
    }

    fn uniform_matrix4(&self, location: &u32, _matrix: &Mat4x4) {
        let name = self.uniform_names.borrow().get(location).cloned().unwrap_or_default();
        self.record(Call::UniformMatrix(name));
    }

    fn uniform_i32(&self, location: &u32, value: i32) {
        let name = self.uniform_names.borrow().get(location).cloned().unwrap_or_default();
        self.record(Call::UniformInt(name, value));
    }

    fn uniform_vec4(&self, location: &u32, value: [f32; 4]) {
        let name = self.uniform_names.borrow().get(location).cloned().unwrap_or_default();
        self.record(Call::UniformVec4(name, value));
    }

    fn uniform_f32_array(&self, location: &u32, values: &[f32]) {
        let name = self.uniform_names.borrow().get(location).cloned().unwrap_or_default();
        self.record(Call::UniformFloats(name, values.to_vec()));
    }

    fn create_buffer(&self) -> Result<u32, String> {
        let id = self.alloc()?;
        self.live_buffers.borrow_mut().insert(id);
        Ok(id)
    }

    fn bind_buffer(&self, target: BufferTarget, buffer: Option<u32>) {
        self.record(Call::BindBuffer(target, buffer));
    }

    fn buffer_data(&self, _target: BufferTarget, _data: &[u8]) {}

    fn delete_buffer(&self, buffer: u32) {
        self.live_buffers.borrow_mut().remove(&buffer);
    }

    fn create_vertex_array(&self) -> Result<u32, String> {
        let id = self.alloc()?;
        self.live_vaos.borrow_mut().insert(id);
        Ok(id)
    }

    fn bind_vertex_array(&self, vao: Option<u32>) {
        self.record(Call::BindVertexArray(vao));
    }

    fn delete_vertex_array(&self, vao: u32) {
        self.live_vaos.borrow_mut().remove(&vao);
    }

    fn vertex_attrib_pointer_f32(&self, index: u32, components: i32) {
        self.record(Call::AttribPointer(index, components));
    }

    fn enable_vertex_attrib_array(&self, index: u32) {
        self.record(Call::EnableAttrib(index));
    }

    fn disable_vertex_attrib_array(&self, index: u32) {
        self.record(Call::DisableAttrib(index));
    }

    fn create_texture(&self) -> Result<u32, String> {
        let id = self.alloc()?;
        self.live_textures.borrow_mut().insert(id);
        Ok(id)
    }

    fn bind_texture_2d(&self, unit: u32, texture: Option<u32>) {
        self.record(Call::BindTexture(unit, texture));
    }

    fn tex_image_rgba8(&self, width: u32, height: u32, _pixels: &[u8]) {
        self.record(Call::TexImage(width, height));
    }

    fn tex_sub_image_rgba8(&self, width: u32, height: u32, _pixels: &[u8]) {
        self.record(Call::TexSubImage(width, height));
    }

    fn delete_texture(&self, texture: u32) {
        self.live_textures.borrow_mut().remove(&texture);
    }

    fn viewport(&self, viewport: Viewport) {
        self.record(Call::Viewport(viewport));
    }

    fn clear(&self, _color: [f32; 4], depth: bool) {
        self.record(Call::Clear { depth });
    }

    fn set_depth_test(&self, enabled: bool) {
        self.record(Call::DepthTest(enabled));
    }

    fn draw_arrays(&self, topology: Topology, count: i32) {
        self.record(Call::DrawArrays(topology, count));
    }

    fn draw_elements_u16(&self, topology: Topology, count: i32) {
        self.record(Call::DrawElements(topology, count));
    }
}
