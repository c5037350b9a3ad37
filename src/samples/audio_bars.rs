use super::{ InputEvent, SampleInputs, SceneState, SurfaceRenderer };
use crate::config::SampleConfig;
use crate::engine::components::camera::{ Camera, Composition, Projection };
use crate::engine::components::mesh::{ Mesh, Topology, VertexAttribute };
use crate::engine::errors::RenderError;
use crate::engine::managers::assets_manager::ShaderAsset;
use crate::engine::rendering::gl_api::GlApi;
use crate::engine::rendering::renderer::{ FrameRenderer, Uniform, VertexLayout };
use crate::engine::systems::audio::fill_amplitudes;
use crate::engine::systems::shared_slot::SlotReader;

const NAME: &str = "AUDIO_BARS";
const LAYOUT: VertexLayout = VertexLayout::positions("vPosition");
const COLOR: [f32; 4] = [0.3, 0.85, 0.5, 1.0];

/// Must match the `u_Amplitudes` array length in the shader.
pub const BAR_COUNT: usize = 64;

/// One vertical line per amplitude bin, scaled on the GPU by the newest audio block.
pub struct AudioBarsSample<G: GlApi> {
    state: SceneState<G>,
    mesh: Mesh,
    audio: Option<SlotReader<Vec<i16>>>,
    amplitudes: [f32; BAR_COUNT],
}

/// Two vertices per bar at y = ±1 with the bar index in z.
fn bar_mesh() -> Result<Mesh, RenderError> {
    let mut positions = Vec::with_capacity(BAR_COUNT * 6);
    for bar in 0..BAR_COUNT {
        let x = -0.9 + (1.8 * (bar as f32)) / ((BAR_COUNT - 1) as f32);
        let index = bar as f32;
        positions.extend_from_slice(&[x, 1.0, index, x, -1.0, index]);
    }
    Ok(Mesh::new(positions, VertexAttribute::None, None, Topology::Lines)?)
}

impl<G: GlApi> AudioBarsSample<G> {
    pub fn new(config: &SampleConfig, inputs: SampleInputs) -> Result<Self, RenderError> {
        let camera = Camera::new(
            Projection::Orthographic { content_aspect: None, near: 3.0, far: 7.0 },
            Composition::ProjectionViewModel
        ).with_view([0.0, 0.0, 7.0], [0.0, 0.0, 0.0], [0.0, 1.0, 0.0]);

        if inputs.audio.is_none() {
            log::warn!("[{}] no audio source, bars stay flat", NAME);
        }

        Ok(Self {
            state: SceneState::new(camera, FrameRenderer::new(config.clear_color, false), None),
            mesh: bar_mesh()?,
            audio: inputs.audio,
            amplitudes: [0.0; BAR_COUNT],
        })
    }

    pub fn amplitudes(&self) -> &[f32; BAR_COUNT] {
        &self.amplitudes
    }

    fn poll_audio(&mut self) {
        if let Some(block) = self.audio.as_mut().and_then(SlotReader::poll) {
            fill_amplitudes(&block, &mut self.amplitudes);
        }
    }
}

impl<G: GlApi> SurfaceRenderer<G> for AudioBarsSample<G> {
    fn on_surface_created(&mut self, gl: &G) -> Result<(), RenderError> {
        self.state.create(gl, NAME, ShaderAsset::AudioBars, std::slice::from_ref(&self.mesh), LAYOUT, None)
    }

    fn on_surface_changed(&mut self, _gl: &G, width: u32, height: u32) {
        self.state.resize(width, height);
    }

    fn on_draw_frame(&mut self, gl: &G) {
        self.poll_audio();

        let state = &self.state;
        state.renderer.begin_frame(gl, state.full_viewport());
        let Some(scene) = &state.scene else {
            return;
        };
        let matrix = state.camera.frame_matrix();
        let uniforms = [
            Uniform::Matrix("u_Matrix", &matrix),
            Uniform::Floats("u_Amplitudes", &self.amplitudes),
            Uniform::Vec4("u_Color", COLOR),
        ];
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
