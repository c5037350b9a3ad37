use super::{ InputEvent, SceneState, SurfaceRenderer };
use crate::config::SampleConfig;
use crate::engine::components::camera::{ Camera, Composition, Projection };
use crate::engine::components::mesh::{ Mesh, Topology, VertexAttribute };
use crate::engine::errors::RenderError;
use crate::engine::managers::assets_manager::ShaderAsset;
use crate::engine::rendering::gl_api::GlApi;
use crate::engine::rendering::renderer::{ FrameRenderer, Uniform, VertexLayout };

const LAYOUT: VertexLayout = VertexLayout::with_attribute("vPosition", "aColor");

/// Vertex-colored triangle under an aspect-corrected orthographic projection,
/// filled or as a closed outline.
pub struct TriangleSample<G: GlApi> {
    name: &'static str,
    state: SceneState<G>,
    mesh: Mesh,
}

impl<G: GlApi> TriangleSample<G> {
    pub fn new(config: &SampleConfig) -> Result<Self, RenderError> {
        Self::with_topology(config, "TRIANGLE", Topology::Triangles)
    }

    /// The same three vertices joined by a line loop.
    pub fn outline(config: &SampleConfig) -> Result<Self, RenderError> {
        Self::with_topology(config, "TRIANGLE_OUTLINE", Topology::LineLoop)
    }

    fn with_topology(config: &SampleConfig, name: &'static str, topology: Topology) -> Result<Self, RenderError> {
        let mesh = Mesh::new(
            vec![0.0, 0.5, 0.0, -0.5, -0.5, 0.0, 0.5, -0.5, 0.0],
            VertexAttribute::Colors(vec![1.0, 0.0, 0.0, 1.0, 0.0, 1.0, 0.0, 1.0, 0.0, 0.0, 1.0, 1.0]),
            None,
            topology
        )?;
        let camera = Camera::new(
            Projection::Orthographic { content_aspect: None, near: 3.0, far: 7.0 },
            Composition::ProjectionViewModel
        ).with_view([0.0, 0.0, 7.0], [0.0, 0.0, 0.0], [0.0, 1.0, 0.0]);

        Ok(Self {
            name,
            state: SceneState::new(camera, FrameRenderer::new(config.clear_color, false), None),
            mesh,
        })
    }
}

impl<G: GlApi> SurfaceRenderer<G> for TriangleSample<G> {
    fn on_surface_created(&mut self, gl: &G) -> Result<(), RenderError> {
        self.state.create(gl, self.name, ShaderAsset::Color, std::slice::from_ref(&self.mesh), LAYOUT, None)
    }

    fn on_surface_changed(&mut self, _gl: &G, width: u32, height: u32) {
        self.state.resize(width, height);
    }

    fn on_draw_frame(&mut self, gl: &G) {
        let state = &self.state;
        state.renderer.begin_frame(gl, state.full_viewport());
        let Some(scene) = &state.scene else {
            return;
        };
        let matrix = state.camera.frame_matrix();
        for mesh in &scene.meshes {
            state.renderer.draw(gl, &scene.program, mesh, &[Uniform::Matrix("u_Matrix", &matrix)], None);
        }
    }

    fn on_surface_destroyed(&mut self, gl: &G) {
        self.state.destroy(gl, self.name);
    }

    fn handle_input(&mut self, event: InputEvent<'_>) {
        self.state.handle_common_input(event);
    }
}
