use std::collections::HashMap;

use super::gl_api::{ GlApi, ShaderStage };
use crate::engine::errors::ShaderError;

/// Compiles one stage. The shader object is deleted again when compilation fails.
pub fn compile<G: GlApi>(gl: &G, stage: ShaderStage, source: &str) -> Result<G::Shader, ShaderError> {
    let shader = gl.create_shader(stage).map_err(|e| ShaderError::Create("shader", e))?;
    if !gl.compile_shader_source(shader, source) {
        let log = gl.shader_info_log(shader);
        gl.delete_shader(shader);
        return Err(ShaderError::Compile { stage, log });
    }
    Ok(shader)
}

/// Links a program from two compiled stages. The program is deleted when linking fails;
/// the stages stay owned by the caller.
pub fn link<G: GlApi>(gl: &G, vs: G::Shader, fs: G::Shader) -> Result<G::Program, ShaderError> {
    let program = gl.create_program().map_err(|e| ShaderError::Create("program", e))?;
    gl.attach_shader(program, vs);
    gl.attach_shader(program, fs);
    if !gl.link_program(program) {
        let log = gl.program_info_log(program);
        gl.detach_shader(program, vs);
        gl.detach_shader(program, fs);
        gl.delete_program(program);
        return Err(ShaderError::Link { log });
    }
    Ok(program)
}

pub fn resolve_attribute<G: GlApi>(gl: &G, program: G::Program, name: &str) -> Option<u32> {
    gl.attrib_location(program, name)
}

pub fn resolve_uniform<G: GlApi>(gl: &G, program: G::Program, name: &str) -> Option<G::UniformLocation> {
    gl.uniform_location(program, name)
}

/// A linked program together with its stages and the locations resolved right after link.
pub struct ShaderProgram<G: GlApi> {
    program: G::Program,
    vertex: G::Shader,
    fragment: G::Shader,
    attributes: HashMap<String, u32>,
    uniforms: HashMap<String, G::UniformLocation>,
}

impl<G: GlApi> ShaderProgram<G> {
    pub fn build(
        gl: &G,
        vertex_src: &str,
        fragment_src: &str,
        attributes: &[&str],
        uniforms: &[&str]
    ) -> Result<Self, ShaderError> {
        let vertex = compile(gl, ShaderStage::Vertex, vertex_src)?;
        let fragment = match compile(gl, ShaderStage::Fragment, fragment_src) {
            Ok(fs) => fs,
            Err(e) => {
                gl.delete_shader(vertex);
                return Err(e);
            }
        };
        let program = match link(gl, vertex, fragment) {
            Ok(program) => program,
            Err(e) => {
                gl.delete_shader(vertex);
                gl.delete_shader(fragment);
                return Err(e);
            }
        };

        let mut resolved_attributes = HashMap::with_capacity(attributes.len());
        for name in attributes {
            match resolve_attribute(gl, program, name) {
                Some(location) => {
                    resolved_attributes.insert((*name).to_string(), location);
                }
                None => log::warn!("[SHADER] attribute `{}` not found in program", name),
            }
        }

        let mut resolved_uniforms = HashMap::with_capacity(uniforms.len());
        for name in uniforms {
            match resolve_uniform(gl, program, name) {
                Some(location) => {
                    resolved_uniforms.insert((*name).to_string(), location);
                }
                None => log::warn!("[SHADER] uniform `{}` not found in program", name),
            }
        }

        log::debug!(
            "[SHADER] linked program with {} attributes, {} uniforms",
            resolved_attributes.len(),
            resolved_uniforms.len()
        );

        Ok(Self {
            program,
            vertex,
            fragment,
            attributes: resolved_attributes,
            uniforms: resolved_uniforms,
        })
    }

    pub fn program(&self) -> G::Program {
        self.program
    }

    pub fn attribute(&self, name: &str) -> Option<u32> {
        self.attributes.get(name).copied()
    }

    pub fn uniform(&self, name: &str) -> Option<&G::UniformLocation> {
        self.uniforms.get(name)
    }

    pub fn validate(&self, gl: &G) -> bool {
        let valid = gl.validate_program(self.program);
        if !valid {
            log::error!("[SHADER] program validation failed: {}", gl.program_info_log(self.program));
        }
        valid
    }

    pub fn release(self, gl: &G) {
        gl.use_program(None);
        gl.detach_shader(self.program, self.vertex);
        gl.detach_shader(self.program, self.fragment);
        gl.delete_shader(self.vertex);
        gl.delete_shader(self.fragment);
        gl.delete_program(self.program);
    }
}
