use super::{ InputEvent, SampleInputs, SceneState, SurfaceRenderer };
use crate::config::SampleConfig;
use crate::engine::components::camera::{ Camera, Composition, Projection };
use crate::engine::components::mesh::Mesh;
use crate::engine::components::shapes;
use crate::engine::errors::RenderError;
use crate::engine::managers::assets_manager::ShaderAsset;
use crate::engine::rendering::gl_api::GlApi;
use crate::engine::rendering::renderer::{ FrameRenderer, Uniform, VertexLayout };
use crate::engine::utils::math::{ mat4x4_mul, mat4x4_translate };

const NAME: &str = "CYLINDER";
const LAYOUT: VertexLayout = VertexLayout::positions("vPosition");
const SIDE_COLOR: [f32; 4] = [0.2, 0.6, 0.9, 1.0];
const CAP_COLOR: [f32; 4] = [0.9, 0.9, 0.9, 1.0];
const HEIGHT: f32 = 1.5;

/// Solid cylinder: indexed side wall with two disc caps.
pub struct CylinderSample<G: GlApi> {
    state: SceneState<G>,
    meshes: [Mesh; 3],
}

impl<G: GlApi> CylinderSample<G> {
    pub fn new(config: &SampleConfig, inputs: SampleInputs) -> Result<Self, RenderError> {
        let cylinder = shapes::cylinder(1.0, HEIGHT, config.step_deg)?;
        let camera = Camera::new(Projection::Frustum { near: 3.0, far: 7.0 }, Composition::ProjectionViewModel)
            .with_mapping(config.orientation_mapping)
            .with_view([6.0, 0.0, -1.0], [0.0, 0.0, 0.0], [0.0, 0.0, 1.0]);

        Ok(Self {
            state: SceneState::new(camera, FrameRenderer::new(config.clear_color, true), inputs.rotation),
            meshes: [cylinder.side, cylinder.top, cylinder.bottom],
        })
    }
}

impl<G: GlApi> SurfaceRenderer<G> for CylinderSample<G> {
    fn on_surface_created(&mut self, gl: &G) -> Result<(), RenderError> {
        self.state.create(gl, NAME, ShaderAsset::Solid, &self.meshes, LAYOUT, None)
    }

    fn on_surface_changed(&mut self, _gl: &G, width: u32, height: u32) {
        self.state.resize(width, height);
    }

    fn on_draw_frame(&mut self, gl: &G) {
        self.state.poll_rotation();
        // spin around the cylinder's middle rather than its base
        let centered = mat4x4_mul(*self.state.camera.rotation_matrix(), mat4x4_translate(0.0, 0.0, -HEIGHT / 2.0));
        self.state.camera.set_model(centered);

        let state = &self.state;
        state.renderer.begin_frame(gl, state.full_viewport());
        let Some(scene) = &state.scene else {
            return;
        };
        let matrix = state.camera.frame_matrix();
        for (index, mesh) in scene.meshes.iter().enumerate() {
            let color = if index == 0 { SIDE_COLOR } else { CAP_COLOR };
            let uniforms = [Uniform::Matrix("u_Matrix", &matrix), Uniform::Vec4("u_Color", color)];
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
