use super::{ InputEvent, SampleInputs, SceneState, SurfaceRenderer };
use crate::config::SampleConfig;
use crate::engine::components::camera::{ Camera, Composition, Projection };
use crate::engine::components::mesh::Mesh;
use crate::engine::components::shapes::{ self, SphereParams, UpAxis };
use crate::engine::components::texture::DecodedImage;
use crate::engine::errors::RenderError;
use crate::engine::managers::assets_manager::{ placeholder_image, ShaderAsset };
use crate::engine::rendering::gl_api::GlApi;
use crate::engine::rendering::renderer::{ FrameRenderer, Uniform, VertexLayout };

const NAME: &str = "EARTH_MAP";
const LAYOUT: VertexLayout = VertexLayout::with_attribute("aPosition", "aCoordinate");

/// Equirectangular image on the inside of a sphere, looked around from its center.
///
/// Projection, rotation, view and model go to the shader as separate uniforms.
pub struct EarthSample<G: GlApi> {
    state: SceneState<G>,
    mesh: Mesh,
    image: DecodedImage,
}

impl<G: GlApi> EarthSample<G> {
    pub fn new(config: &SampleConfig, inputs: SampleInputs) -> Result<Self, RenderError> {
        let params = SphereParams {
            mirror_u: config.mirror_u,
            ..SphereParams::new(config.dome_radius, config.step_deg).with_up(UpAxis::Y)
        };
        let image = match inputs.image {
            Some(image) => image,
            None => placeholder_image(512, 256, 32)?,
        };
        let camera = Camera::new(
            Projection::Perspective { fov_y_deg: config.fov_deg, near: 0.1, far: 300.0 },
            Composition::ProjectionRotationView
        )
            .with_mapping(config.orientation_mapping)
            .with_view([0.0, 0.0, 0.0], [0.0, 0.0, 1.0], [0.0, 1.0, 0.0]);

        Ok(Self {
            state: SceneState::new(camera, FrameRenderer::new(config.clear_color, false), inputs.rotation),
            mesh: shapes::uv_sphere(&params)?,
            image,
        })
    }
}

impl<G: GlApi> SurfaceRenderer<G> for EarthSample<G> {
    fn on_surface_created(&mut self, gl: &G) -> Result<(), RenderError> {
        self.state.create(
            gl,
            NAME,
            ShaderAsset::Earth,
            std::slice::from_ref(&self.mesh),
            LAYOUT,
            Some(&self.image)
        )
    }

    fn on_surface_changed(&mut self, _gl: &G, width: u32, height: u32) {
        self.state.resize(width, height);
    }

    fn on_draw_frame(&mut self, gl: &G) {
        self.state.poll_rotation();

        let state = &self.state;
        state.renderer.begin_frame(gl, state.full_viewport());
        let Some(scene) = &state.scene else {
            return;
        };
        let camera = &state.camera;
        let uniforms = [
            Uniform::Matrix("uProjMatrix", camera.projection_matrix()),
            Uniform::Matrix("uRotateMatrix", camera.rotation_matrix()),
            Uniform::Matrix("uViewMatrix", camera.view_matrix()),
            Uniform::Matrix("uModelMatrix", camera.model_matrix()),
            Uniform::Int("uTexture", 0),
        ];
        for mesh in &scene.meshes {
            state.renderer.draw(gl, &scene.program, mesh, &uniforms, scene.texture_binding());
        }
    }

    fn on_surface_destroyed(&mut self, gl: &G) {
        self.state.destroy(gl, NAME);
    }

    fn handle_input(&mut self, event: InputEvent<'_>) {
        self.state.handle_common_input(event);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::rendering::fake_gl::{ Call, FakeGl };

    #[test]
    fn uploads_all_four_matrices() {
        let gl = FakeGl::new();
        let config = SampleConfig { step_deg: 30.0, ..Default::default() };
        let mut sample = EarthSample::<FakeGl>::new(&config, SampleInputs::default()).unwrap();
        sample.on_surface_created(&gl).unwrap();
        sample.on_surface_changed(&gl, 800, 600);
        gl.take_calls();

        sample.on_draw_frame(&gl);
        for name in ["uProjMatrix", "uRotateMatrix", "uViewMatrix", "uModelMatrix"] {
            assert_eq!(gl.count(|c| *c == Call::UniformMatrix(name.to_string())), 1, "{name}");
        }
        assert_eq!(gl.count(|c| *c == Call::DrawArrays(crate::engine::components::mesh::Topology::Triangles, 6 * 12 * 6)), 1);
        sample.on_surface_destroyed(&gl);
    }
}
