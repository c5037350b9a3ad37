use super::{ InputEvent, SampleInputs, SceneState, SurfaceRenderer };
use crate::config::SampleConfig;
use crate::engine::components::camera::{ Camera, Composition, Projection };
use crate::engine::components::mesh::Mesh;
use crate::engine::components::shapes;
use crate::engine::components::texture::DecodedImage;
use crate::engine::errors::RenderError;
use crate::engine::managers::assets_manager::{ placeholder_image, ShaderAsset };
use crate::engine::rendering::gl_api::GlApi;
use crate::engine::rendering::renderer::{ FrameRenderer, Uniform, VertexLayout };

const NAME: &str = "TEXTURED_QUAD";
const LAYOUT: VertexLayout = VertexLayout::with_attribute("vPosition", "aTextureCoord");

/// An image on a quad, letterboxed to keep its own aspect ratio.
pub struct TexturedQuadSample<G: GlApi> {
    state: SceneState<G>,
    mesh: Mesh,
    image: DecodedImage,
}

impl<G: GlApi> TexturedQuadSample<G> {
    pub fn new(config: &SampleConfig, inputs: SampleInputs) -> Result<Self, RenderError> {
        let image = match inputs.image {
            Some(image) => image,
            None => placeholder_image(256, 256, 32)?,
        };
        let camera = Camera::new(
            Projection::Orthographic {
                content_aspect: Some(image.aspect_ratio()),
                near: 3.0,
                far: 7.0,
            },
            Composition::ProjectionViewModel
        ).with_view([0.0, 0.0, 7.0], [0.0, 0.0, 0.0], [0.0, 1.0, 0.0]);

        Ok(Self {
            state: SceneState::new(camera, FrameRenderer::new(config.clear_color, false), None),
            mesh: shapes::quad(1.0, 1.0)?,
            image,
        })
    }
}

impl<G: GlApi> SurfaceRenderer<G> for TexturedQuadSample<G> {
    fn on_surface_created(&mut self, gl: &G) -> Result<(), RenderError> {
        self.state.create(
            gl,
            NAME,
            ShaderAsset::Texture,
            std::slice::from_ref(&self.mesh),
            LAYOUT,
            Some(&self.image)
        )
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
        let uniforms = [Uniform::Matrix("u_Matrix", &matrix), Uniform::Int("uTextureUnit", 0)];
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
