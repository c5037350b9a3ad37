use super::{ InputEvent, SceneState, SurfaceRenderer };
use crate::config::SampleConfig;
use crate::engine::components::camera::{ Camera, Composition, Projection };
use crate::engine::components::mesh::{ Mesh, VertexAttribute };
use crate::engine::components::shapes;
use crate::engine::errors::RenderError;
use crate::engine::managers::assets_manager::ShaderAsset;
use crate::engine::rendering::gl_api::GlApi;
use crate::engine::rendering::renderer::{ FrameRenderer, Uniform, VertexLayout };

const NAME: &str = "CIRCLE";
const LAYOUT: VertexLayout = VertexLayout::with_attribute("vPosition", "aColor");
const COLOR: [f32; 4] = [1.0, 0.0, 0.0, 1.0];
/// Sixty rim segments.
const STEP_DEG: f32 = 6.0;

/// Unit disc drawn as one vertex-colored triangle fan.
pub struct CircleSample<G: GlApi> {
    state: SceneState<G>,
    mesh: Mesh,
}

impl<G: GlApi> CircleSample<G> {
    pub fn new(config: &SampleConfig) -> Result<Self, RenderError> {
        let disc = shapes::disc(1.0, STEP_DEG, 0.0)?;
        let mesh = Mesh::new(
            disc.positions().to_vec(),
            VertexAttribute::Colors(COLOR.repeat(disc.vertex_count())),
            disc.indices().map(<[u16]>::to_vec),
            disc.topology()
        )?;

        let camera = Camera::new(Projection::Frustum { near: 3.0, far: 7.0 }, Composition::ProjectionViewModel)
            .with_view([0.0, 0.0, 7.0], [0.0, 0.0, 0.0], [0.0, 1.0, 0.0]);

        Ok(Self {
            state: SceneState::new(camera, FrameRenderer::new(config.clear_color, false), None),
            mesh,
        })
    }
}

impl<G: GlApi> SurfaceRenderer<G> for CircleSample<G> {
    fn on_surface_created(&mut self, gl: &G) -> Result<(), RenderError> {
        self.state.create(gl, NAME, ShaderAsset::Color, std::slice::from_ref(&self.mesh), LAYOUT, None)
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
        self.state.destroy(gl, NAME);
    }

    fn handle_input(&mut self, event: InputEvent<'_>) {
        self.state.handle_common_input(event);
    }
}
