use super::{ InputEvent, SampleInputs, SceneState, SurfaceRenderer };
use crate::config::SampleConfig;
use crate::engine::components::camera::{ Camera, Composition, Projection };
use crate::engine::components::mesh::Mesh;
use crate::engine::components::shapes::{ self, SphereParams };
use crate::engine::errors::RenderError;
use crate::engine::managers::assets_manager::ShaderAsset;
use crate::engine::rendering::gl_api::GlApi;
use crate::engine::rendering::renderer::{ FrameRenderer, Uniform, VertexLayout };

const NAME: &str = "BALL";
const LAYOUT: VertexLayout = VertexLayout::positions("vPosition");
const COLOR: [f32; 4] = [0.95, 0.75, 0.2, 1.0];

/// Untextured unit sphere seen from outside.
pub struct BallSample<G: GlApi> {
    state: SceneState<G>,
    mesh: Mesh,
}

impl<G: GlApi> BallSample<G> {
    pub fn new(config: &SampleConfig, inputs: SampleInputs) -> Result<Self, RenderError> {
        let mesh = shapes::uv_sphere(&SphereParams::new(1.0, config.step_deg).untextured())?;
        let camera = Camera::new(Projection::Frustum { near: 3.0, far: 7.0 }, Composition::ProjectionViewModel)
            .with_mapping(config.orientation_mapping)
            .with_view([6.0, 0.0, -1.0], [0.0, 0.0, 0.0], [0.0, 0.0, 1.0]);

        Ok(Self {
            state: SceneState::new(camera, FrameRenderer::new(config.clear_color, true), inputs.rotation),
            mesh,
        })
    }
}

impl<G: GlApi> SurfaceRenderer<G> for BallSample<G> {
    fn on_surface_created(&mut self, gl: &G) -> Result<(), RenderError> {
        self.state.create(gl, NAME, ShaderAsset::Solid, std::slice::from_ref(&self.mesh), LAYOUT, None)
    }

    fn on_surface_changed(&mut self, _gl: &G, width: u32, height: u32) {
        self.state.resize(width, height);
    }

    fn on_draw_frame(&mut self, gl: &G) {
        self.state.poll_rotation();
        let rotation = *self.state.camera.rotation_matrix();
        self.state.camera.set_model(rotation);

        let state = &self.state;
        state.renderer.begin_frame(gl, state.full_viewport());
        let Some(scene) = &state.scene else {
            return;
        };
        let matrix = state.camera.frame_matrix();
        let uniforms = [Uniform::Matrix("u_Matrix", &matrix), Uniform::Vec4("u_Color", COLOR)];
        for mesh in &scene.meshes {
            state.renderer.draw(gl, &scene.program, mesh, &uniforms, None);
        }
    }

    fn on_surface_destroyed(&mut self, gl: &G) {
        self.state.destroy(gl, NAME);
    }

    fn handle_input(&mut self, event: InputEvent<'_>) {
        self.state.handle_common_input(event);
    }
}
