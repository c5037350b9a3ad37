use super::{ InputEvent, SampleInputs, SceneState, SurfaceRenderer };
use crate::config::SampleConfig;
use crate::engine::components::camera::{ Camera, Composition, Projection };
use crate::engine::components::mesh::{ Mesh, VertexAttribute };
use crate::engine::components::shapes;
use crate::engine::errors::RenderError;
use crate::engine::managers::assets_manager::ShaderAsset;
use crate::engine::rendering::gl_api::GlApi;
use crate::engine::rendering::renderer::{ FrameRenderer, Uniform, VertexLayout };

const NAME: &str = "CONE";
const LAYOUT: VertexLayout = VertexLayout::with_attribute("vPosition", "aColor");
const APEX_COLOR: [f32; 4] = [0.9, 0.3, 0.2, 1.0];
const RIM_COLOR: [f32; 4] = [1.0, 1.0, 1.0, 1.0];

/// Vertex-colored cone: apex fan plus base disc.
pub struct ConeSample<G: GlApi> {
    state: SceneState<G>,
    meshes: [Mesh; 2],
}

impl<G: GlApi> ConeSample<G> {
    pub fn new(config: &SampleConfig, inputs: SampleInputs) -> Result<Self, RenderError> {
        let cone = shapes::cone(1.0, 1.5, config.step_deg, Some((APEX_COLOR, RIM_COLOR)))?;
        // the base gets the rim color on every vertex so it shades like the side's edge
        let base = Mesh::new(
            cone.base.positions().to_vec(),
            VertexAttribute::Colors(RIM_COLOR.repeat(cone.base.vertex_count())),
            cone.base.indices().map(<[u16]>::to_vec),
            cone.base.topology()
        )?;

        let camera = Camera::new(Projection::Frustum { near: 3.0, far: 7.0 }, Composition::ProjectionViewModel)
            .with_mapping(config.orientation_mapping)
            .with_view([6.0, 0.0, -1.0], [0.0, 0.0, 0.0], [0.0, 0.0, 1.0]);

        Ok(Self {
            state: SceneState::new(camera, FrameRenderer::new(config.clear_color, true), inputs.rotation),
            meshes: [cone.side, base],
        })
    }
}

impl<G: GlApi> SurfaceRenderer<G> for ConeSample<G> {
    fn on_surface_created(&mut self, gl: &G) -> Result<(), RenderError> {
        self.state.create(gl, NAME, ShaderAsset::Color, &self.meshes, LAYOUT, None)
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
