use super::{ FrameFeed, InputEvent, SampleInputs, SceneState, SurfaceRenderer };
use crate::config::SampleConfig;
use crate::engine::components::camera::{ Camera, Composition, DisplayMode, Projection };
use crate::engine::components::mesh::Mesh;
use crate::engine::components::shapes::{ self, SphereParams, UpAxis };
use crate::engine::components::texture::DecodedImage;
use crate::engine::errors::RenderError;
use crate::engine::managers::assets_manager::{ placeholder_image, ShaderAsset };
use crate::engine::rendering::gl_api::GlApi;
use crate::engine::rendering::renderer::{ FrameRenderer, Uniform, VertexLayout };

const NAME: &str = "VR_DOME";
const LAYOUT: VertexLayout = VertexLayout::with_attribute("vPosition", "a_texCoord");

/// Inward-facing textured dome fed with video-like frames.
///
/// In `Stereo` mode the same dome is drawn once per eye into each half of the
/// surface, each half with a projection fitted to its own aspect.
pub struct VrDomeSample<G: GlApi> {
    state: SceneState<G>,
    mesh: Mesh,
    image: DecodedImage,
    frames: Option<FrameFeed>,
    display_mode: DisplayMode,
}

impl<G: GlApi> VrDomeSample<G> {
    pub fn new(config: &SampleConfig, inputs: SampleInputs) -> Result<Self, RenderError> {
        let params = SphereParams {
            mirror_u: config.mirror_u,
            ..SphereParams::new(config.dome_radius, config.step_deg).with_up(UpAxis::Y)
        };
        let image = match inputs.image {
            Some(image) => image,
            None => placeholder_image(256, 128, 16)?,
        };
        let mut camera = Camera::new(
            Projection::Adaptive { fov_y_deg: config.fov_deg, near: 1.0, far: 300.0 },
            Composition::ProjectionRotationView
        ).with_mapping(config.orientation_mapping);
        camera.set_look_direction(0.0, 0.0, 1.0);
        camera.set_interaction_enabled(config.interaction);

        Ok(Self {
            state: SceneState::new(camera, FrameRenderer::new(config.clear_color, true), inputs.rotation),
            mesh: shapes::uv_sphere(&params)?,
            image,
            frames: inputs.frames,
            display_mode: config.display_mode,
        })
    }

    pub fn display_mode(&self) -> DisplayMode {
        self.display_mode
    }

    pub fn toggle_display_mode(&mut self) -> DisplayMode {
        self.display_mode = self.display_mode.toggled();
        log::info!("[{}] display mode {:?}", NAME, self.display_mode);
        self.display_mode
    }

    /// Uploads the pending frame, at most once per signal.
    fn consume_frame(&mut self, gl: &G) {
        let Some(feed) = &self.frames else {
            return;
        };
        if !feed.signal.take() {
            return;
        }
        let Some(frame) = feed.frames.take() else {
            return;
        };
        if let Some(texture) = self.state.scene.as_mut().and_then(|scene| scene.texture.as_mut()) {
            texture.update(gl, &frame);
        }
        // a later surface rebuild starts from the newest frame
        self.image = frame;
    }
}

impl<G: GlApi> SurfaceRenderer<G> for VrDomeSample<G> {
    fn on_surface_created(&mut self, gl: &G) -> Result<(), RenderError> {
        self.state.create(
            gl,
            NAME,
            ShaderAsset::VrDome,
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
        self.consume_frame(gl);

        let state = &self.state;
        state.renderer.begin_frame(gl, state.full_viewport());
        let Some(scene) = &state.scene else {
            return;
        };
        let (width, height) = state.size;
        for viewport in self.display_mode.viewports(width, height) {
            state.renderer.set_viewport(gl, viewport);
            let matrix = state.camera.frame_matrix_for(viewport);
            let uniforms = [Uniform::Matrix("uMVPMatrix", &matrix), Uniform::Int("s_texture", 0)];
            for mesh in &scene.meshes {
                state.renderer.draw(gl, &scene.program, mesh, &uniforms, scene.texture_binding());
            }
        }
    }

    fn on_surface_destroyed(&mut self, gl: &G) {
        self.state.destroy(gl, NAME);
    }

    fn handle_input(&mut self, event: InputEvent<'_>) {
        if !self.state.handle_common_input(event) {
            self.toggle_display_mode();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::rendering::fake_gl::{ Call, FakeGl };
    use crate::engine::rendering::gl_api::Viewport;
    use crate::engine::systems::shared_slot::{ SharedSlot, SlotReader };
    use crate::engine::utils::math::{ mat4x4_identity, mat4x4_rot_y, Mat4x4 };

    fn config() -> SampleConfig {
        SampleConfig { step_deg: 30.0, ..Default::default() }
    }

    fn draws(gl: &FakeGl) -> usize {
        gl.count(|c| matches!(c, Call::DrawArrays(..) | Call::DrawElements(..)))
    }

    fn ready(sample: &mut VrDomeSample<FakeGl>, gl: &FakeGl) {
        sample.on_surface_created(gl).unwrap();
        sample.on_surface_changed(gl, 800, 400);
        gl.take_calls();
    }

    #[test]
    fn stereo_draws_each_half() {
        let gl = FakeGl::new();
        let mut sample = VrDomeSample::new(&config(), SampleInputs::default()).unwrap();
        ready(&mut sample, &gl);

        sample.on_draw_frame(&gl);
        assert_eq!(draws(&gl), 1);
        gl.take_calls();

        sample.handle_input(InputEvent::ToggleDisplayMode);
        assert_eq!(sample.display_mode(), DisplayMode::Stereo);
        sample.on_draw_frame(&gl);
        let calls = gl.take_calls();
        assert!(calls.contains(&Call::Viewport(Viewport::new(0, 0, 400, 400))));
        assert!(calls.contains(&Call::Viewport(Viewport::new(400, 0, 400, 400))));
        assert_eq!(calls.iter().filter(|c| matches!(c, Call::Clear { .. })).count(), 1);
        assert_eq!(
            calls.iter().filter(|c| matches!(c, Call::DrawArrays(..) | Call::DrawElements(..))).count(),
            2
        );

        sample.handle_input(InputEvent::ToggleDisplayMode);
        assert_eq!(sample.display_mode(), DisplayMode::Normal);
        sample.on_surface_destroyed(&gl);
        assert_eq!(gl.live_objects(), 0);
    }

    #[test]
    fn each_signal_updates_the_texture_once() {
        let gl = FakeGl::new();
        let feed = FrameFeed::default();
        let inputs = SampleInputs { frames: Some(feed.clone()), ..Default::default() };
        let mut sample = VrDomeSample::new(&config(), inputs).unwrap();
        ready(&mut sample, &gl);

        feed.frames.publish(DecodedImage::solid(256, 128, [9, 9, 9, 255]).unwrap());
        feed.signal.notify();
        sample.on_draw_frame(&gl);
        sample.on_draw_frame(&gl);
        assert_eq!(gl.count(|c| matches!(c, Call::TexSubImage(256, 128))), 1);

        feed.frames.publish(DecodedImage::solid(64, 64, [1, 2, 3, 255]).unwrap());
        feed.signal.notify();
        sample.on_draw_frame(&gl);
        assert_eq!(gl.count(|c| matches!(c, Call::TexImage(64, 64))), 1);
        assert_eq!(draws(&gl), 3);
        sample.on_surface_destroyed(&gl);
    }

    #[test]
    fn orientation_is_ignored_while_interaction_is_off() {
        let slot = SharedSlot::<Mat4x4>::new();
        let config = SampleConfig { interaction: false, ..config() };
        let inputs = SampleInputs { rotation: Some(SlotReader::new(slot.clone())), ..Default::default() };
        let gl = FakeGl::new();
        let mut sample = VrDomeSample::new(&config, inputs).unwrap();
        ready(&mut sample, &gl);

        slot.publish(mat4x4_rot_y(0.5));
        sample.on_draw_frame(&gl);
        assert_eq!(*sample.state.camera.rotation_matrix(), mat4x4_identity());

        sample.handle_input(InputEvent::ToggleInteraction);
        slot.publish(mat4x4_rot_y(0.5));
        sample.on_draw_frame(&gl);
        assert_eq!(*sample.state.camera.rotation_matrix(), mat4x4_rot_y(0.5));

        // touch rotation applies even when sensor input is off
        sample.handle_input(InputEvent::ToggleInteraction);
        sample.handle_input(InputEvent::Drag { dx: 40.0, dy: 0.0 });
        assert_ne!(*sample.state.camera.rotation_matrix(), mat4x4_rot_y(0.5));
    }
}
