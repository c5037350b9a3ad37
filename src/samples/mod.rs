//! Sample renderers driven through the surface lifecycle.
//!
//! Every sample builds its CPU meshes when constructed, uploads them in
//! `on_surface_created`, recomputes projection in `on_surface_changed`, draws in
//! `on_draw_frame` and frees every GPU object in `on_surface_destroyed`.

pub mod audio_bars;
pub mod ball;
pub mod circle;
pub mod cone;
pub mod cylinder;
pub mod earth;
pub mod native;
pub mod textured_quad;
pub mod triangle;
pub mod vr_dome;

use clap::ValueEnum;
use serde::{ Deserialize, Serialize };

use crate::config::SampleConfig;
use crate::engine::components::camera::{ Camera, DragRotation };
use crate::engine::components::mesh::Mesh;
use crate::engine::components::texture::{ DecodedImage, Texture };
use crate::engine::errors::RenderError;
use crate::engine::managers::assets_manager::{ shader_source, ShaderAsset };
use crate::engine::rendering::gl_api::{ GlApi, Viewport };
use crate::engine::rendering::renderer::{ FrameRenderer, GpuMesh, TextureBinding, VertexLayout };
use crate::engine::rendering::shader::ShaderProgram;
use crate::engine::systems::audio::AudioBlockSlot;
use crate::engine::systems::frame_signal::FrameSignal;
use crate::engine::systems::shared_slot::{ SharedSlot, SlotReader };
use crate::engine::utils::math::Mat4x4;

pub use audio_bars::AudioBarsSample;
pub use ball::BallSample;
pub use circle::CircleSample;
pub use cone::ConeSample;
pub use cylinder::CylinderSample;
pub use earth::EarthSample;
pub use textured_quad::TexturedQuadSample;
pub use triangle::TriangleSample;
pub use vr_dome::VrDomeSample;

/// Lifecycle a host surface drives, in the order created → changed* → draw* → destroyed.
pub trait SurfaceRenderer<G: GlApi> {
    fn on_surface_created(&mut self, gl: &G) -> Result<(), RenderError>;
    fn on_surface_changed(&mut self, gl: &G, width: u32, height: u32);
    fn on_draw_frame(&mut self, gl: &G);
    fn on_surface_destroyed(&mut self, gl: &G);

    fn handle_input(&mut self, _event: InputEvent<'_>) {}
}

/// User and sensor input forwarded by the host.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum InputEvent<'a> {
    /// 3×3 or 4×4 row-major rotation from an orientation source.
    Orientation(&'a [f32]),
    /// Pointer drag in pixels.
    Drag { dx: f32, dy: f32 },
    ToggleDisplayMode,
    ToggleInteraction,
    LookDirection([f32; 3]),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum SampleKind {
    #[default]
    Triangle,
    TriangleOutline,
    Circle,
    TexturedQuad,
    Cone,
    Cylinder,
    Ball,
    EarthMap,
    VrDome,
    AudioBars,
}

impl SampleKind {
    pub const ALL: [SampleKind; 10] = [
        SampleKind::Triangle,
        SampleKind::TriangleOutline,
        SampleKind::Circle,
        SampleKind::TexturedQuad,
        SampleKind::Cone,
        SampleKind::Cylinder,
        SampleKind::Ball,
        SampleKind::EarthMap,
        SampleKind::VrDome,
        SampleKind::AudioBars,
    ];

    pub fn uses_texture(self) -> bool {
        matches!(self, SampleKind::TexturedQuad | SampleKind::EarthMap | SampleKind::VrDome)
    }

    pub fn uses_audio(self) -> bool {
        matches!(self, SampleKind::AudioBars)
    }
}

/// Decoded frames plus the signal announcing each one.
#[derive(Clone, Default)]
pub struct FrameFeed {
    pub frames: SharedSlot<DecodedImage>,
    pub signal: FrameSignal,
}

/// External data a sample consumes besides its configuration.
#[derive(Default)]
pub struct SampleInputs {
    pub image: Option<DecodedImage>,
    pub frames: Option<FrameFeed>,
    pub rotation: Option<SlotReader<Mat4x4>>,
    pub audio: Option<SlotReader<Vec<i16>>>,
}

impl SampleInputs {
    /// Routes blocks published on `slot` to the sample.
    pub fn with_audio(mut self, slot: &AudioBlockSlot) -> Self {
        self.audio = Some(slot.reader());
        self
    }
}

/// GPU objects one sample owns between surface creation and destruction.
pub(crate) struct GpuScene<G: GlApi> {
    pub program: ShaderProgram<G>,
    pub meshes: Vec<GpuMesh<G>>,
    pub texture: Option<Texture<G>>,
}

impl<G: GlApi> GpuScene<G> {
    /// Builds program, meshes and texture. Anything created before a failure is released.
    pub fn build(
        gl: &G,
        asset: ShaderAsset,
        meshes: &[Mesh],
        layout: VertexLayout,
        image: Option<&DecodedImage>
    ) -> Result<Self, RenderError> {
        let source = shader_source(asset);
        let program = ShaderProgram::build(
            gl,
            source.vertex,
            source.fragment,
            source.attributes,
            source.uniforms
        )?;

        let mut scene = Self { program, meshes: Vec::with_capacity(meshes.len()), texture: None };
        for mesh in meshes {
            match GpuMesh::upload(gl, mesh, layout) {
                Ok(gpu) => scene.meshes.push(gpu),
                Err(e) => {
                    scene.release(gl);
                    return Err(e.into());
                }
            }
        }
        if let Some(image) = image {
            match Texture::create(gl, image) {
                Ok(texture) => {
                    scene.texture = Some(texture);
                }
                Err(e) => {
                    scene.release(gl);
                    return Err(e.into());
                }
            }
        }
        Ok(scene)
    }

    pub fn texture_binding(&self) -> Option<TextureBinding<G::Texture>> {
        self.texture.as_ref().map(|texture| TextureBinding { unit: 0, texture: texture.handle() })
    }

    pub fn release(self, gl: &G) {
        for mesh in self.meshes {
            mesh.release(gl);
        }
        if let Some(texture) = self.texture {
            texture.release(gl);
        }
        self.program.release(gl);
    }
}

/// Camera, surface size and GPU scene shared by every sample.
pub(crate) struct SceneState<G: GlApi> {
    pub camera: Camera,
    pub renderer: FrameRenderer,
    pub drag: DragRotation,
    pub rotation: Option<SlotReader<Mat4x4>>,
    pub size: (u32, u32),
    pub scene: Option<GpuScene<G>>,
}

impl<G: GlApi> SceneState<G> {
    pub fn new(camera: Camera, renderer: FrameRenderer, rotation: Option<SlotReader<Mat4x4>>) -> Self {
        Self {
            camera,
            renderer,
            drag: DragRotation::new(0.005),
            rotation,
            size: (1, 1),
            scene: None,
        }
    }

    pub fn create(
        &mut self,
        gl: &G,
        name: &str,
        asset: ShaderAsset,
        meshes: &[Mesh],
        layout: VertexLayout,
        image: Option<&DecodedImage>
    ) -> Result<(), RenderError> {
        if self.scene.take().is_some() {
            // the previous context is gone along with its objects
            log::debug!("[{}] surface recreated without destroy, dropping stale handles", name);
        }
        match GpuScene::build(gl, asset, meshes, layout, image) {
            Ok(scene) => {
                log::info!("[{}] surface created", name);
                self.scene = Some(scene);
                Ok(())
            }
            Err(e) => {
                log::error!("[{}] setup failed, nothing will be drawn: {}", name, e);
                Err(e)
            }
        }
    }

    pub fn resize(&mut self, width: u32, height: u32) {
        self.size = (width.max(1), height.max(1));
        self.camera.on_resize(self.size.0, self.size.1);
    }

    pub fn full_viewport(&self) -> Viewport {
        Viewport::new(0, 0, self.size.0 as i32, self.size.1 as i32)
    }

    /// Applies the newest rotation published by the producer thread, if any.
    pub fn poll_rotation(&mut self) {
        if let Some(reader) = self.rotation.as_mut() {
            if let Some(rotation) = reader.poll() {
                self.camera.on_orientation(&rotation);
            }
        }
    }

    /// Input shared by every sample; returns false for events it does not handle.
    pub fn handle_common_input(&mut self, event: InputEvent<'_>) -> bool {
        match event {
            InputEvent::Orientation(source) => {
                self.camera.on_orientation(source);
                true
            }
            InputEvent::Drag { dx, dy } => {
                let rotation = self.drag.drag(dx, dy);
                self.camera.on_touch_rotation(rotation);
                true
            }
            InputEvent::ToggleInteraction => {
                let enabled = self.camera.toggle_interaction();
                log::info!("[INPUT] orientation input {}", if enabled { "enabled" } else { "disabled" });
                true
            }
            InputEvent::LookDirection([x, y, z]) => {
                self.camera.set_look_direction(x, y, z);
                true
            }
            InputEvent::ToggleDisplayMode => false,
        }
    }

    pub fn destroy(&mut self, gl: &G, name: &str) {
        if let Some(scene) = self.scene.take() {
            scene.release(gl);
            log::info!("[{}] surface destroyed, GPU objects released", name);
        }
    }
}

macro_rules! dispatch {
    ($self:ident, $sample:ident => $body:expr) => {
        match $self {
            Sample::Triangle($sample) => $body,
            Sample::TriangleOutline($sample) => $body,
            Sample::Circle($sample) => $body,
            Sample::TexturedQuad($sample) => $body,
            Sample::Cone($sample) => $body,
            Sample::Cylinder($sample) => $body,
            Sample::Ball($sample) => $body,
            Sample::EarthMap($sample) => $body,
            Sample::VrDome($sample) => $body,
            Sample::AudioBars($sample) => $body,
        }
    };
}

/// The closed set of samples the host can run.
pub enum Sample<G: GlApi> {
    Triangle(TriangleSample<G>),
    TriangleOutline(TriangleSample<G>),
    Circle(CircleSample<G>),
    TexturedQuad(TexturedQuadSample<G>),
    Cone(ConeSample<G>),
    Cylinder(CylinderSample<G>),
    Ball(BallSample<G>),
    EarthMap(EarthSample<G>),
    VrDome(VrDomeSample<G>),
    AudioBars(AudioBarsSample<G>),
}

impl<G: GlApi> Sample<G> {
    pub fn new(config: &SampleConfig, inputs: SampleInputs) -> Result<Self, RenderError> {
        let sample = match config.sample {
            SampleKind::Triangle => Sample::Triangle(TriangleSample::new(config)?),
            SampleKind::TriangleOutline => Sample::TriangleOutline(TriangleSample::outline(config)?),
            SampleKind::Circle => Sample::Circle(CircleSample::new(config)?),
            SampleKind::TexturedQuad => Sample::TexturedQuad(TexturedQuadSample::new(config, inputs)?),
            SampleKind::Cone => Sample::Cone(ConeSample::new(config, inputs)?),
            SampleKind::Cylinder => Sample::Cylinder(CylinderSample::new(config, inputs)?),
            SampleKind::Ball => Sample::Ball(BallSample::new(config, inputs)?),
            SampleKind::EarthMap => Sample::EarthMap(EarthSample::new(config, inputs)?),
            SampleKind::VrDome => Sample::VrDome(VrDomeSample::new(config, inputs)?),
            SampleKind::AudioBars => Sample::AudioBars(AudioBarsSample::new(config, inputs)?),
        };
        log::info!("[SAMPLE] {:?} ready", config.sample);
        Ok(sample)
    }

    pub fn kind(&self) -> SampleKind {
        match self {
            Sample::Triangle(_) => SampleKind::Triangle,
            Sample::TriangleOutline(_) => SampleKind::TriangleOutline,
            Sample::Circle(_) => SampleKind::Circle,
            Sample::TexturedQuad(_) => SampleKind::TexturedQuad,
            Sample::Cone(_) => SampleKind::Cone,
            Sample::Cylinder(_) => SampleKind::Cylinder,
            Sample::Ball(_) => SampleKind::Ball,
            Sample::EarthMap(_) => SampleKind::EarthMap,
            Sample::VrDome(_) => SampleKind::VrDome,
            Sample::AudioBars(_) => SampleKind::AudioBars,
        }
    }
}

impl<G: GlApi> SurfaceRenderer<G> for Sample<G> {
    fn on_surface_created(&mut self, gl: &G) -> Result<(), RenderError> {
        dispatch!(self, sample => sample.on_surface_created(gl))
    }

    fn on_surface_changed(&mut self, gl: &G, width: u32, height: u32) {
        dispatch!(self, sample => sample.on_surface_changed(gl, width, height))
    }

    fn on_draw_frame(&mut self, gl: &G) {
        dispatch!(self, sample => sample.on_draw_frame(gl))
    }

    fn on_surface_destroyed(&mut self, gl: &G) {
        dispatch!(self, sample => sample.on_surface_destroyed(gl))
    }

    fn handle_input(&mut self, event: InputEvent<'_>) {
        dispatch!(self, sample => sample.handle_input(event))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::rendering::fake_gl::{ Call, FakeGl };

    fn inputs_for(kind: SampleKind) -> SampleInputs {
        let inputs = SampleInputs {
            image: kind.uses_texture().then(|| DecodedImage::solid(4, 2, [255, 0, 0, 255]).unwrap()),
            ..Default::default()
        };
        if kind.uses_audio() {
            let audio = AudioBlockSlot::new();
            audio.publish(vec![8_192; 512]);
            return inputs.with_audio(&audio);
        }
        inputs
    }

    fn config_for(kind: SampleKind) -> SampleConfig {
        SampleConfig { sample: kind, step_deg: 30.0, ..Default::default() }
    }

    #[test]
    fn every_sample_releases_everything_on_destroy() {
        for kind in SampleKind::ALL {
            let gl = FakeGl::new();
            let mut sample = Sample::<FakeGl>::new(&config_for(kind), inputs_for(kind)).unwrap();
            assert_eq!(sample.kind(), kind);

            sample.on_surface_created(&gl).unwrap();
            assert!(gl.live_objects() > 0, "{kind:?}");
            sample.on_surface_changed(&gl, 800, 600);
            sample.on_draw_frame(&gl);
            assert!(gl.count(|c| matches!(c, Call::DrawArrays(..) | Call::DrawElements(..))) > 0, "{kind:?}");

            sample.on_surface_destroyed(&gl);
            assert_eq!(gl.live_objects(), 0, "{kind:?}");
        }
    }

    #[test]
    fn samples_rebuild_after_destroy() {
        let gl = FakeGl::new();
        let kind = SampleKind::EarthMap;
        let mut sample = Sample::<FakeGl>::new(&config_for(kind), inputs_for(kind)).unwrap();
        sample.on_surface_created(&gl).unwrap();
        let live = gl.live_objects();
        sample.on_surface_destroyed(&gl);
        sample.on_surface_created(&gl).unwrap();
        assert_eq!(gl.live_objects(), live);
        sample.on_surface_destroyed(&gl);
        assert_eq!(gl.live_objects(), 0);
    }

    #[test]
    fn failed_setup_draws_nothing() {
        let gl = FakeGl::new();
        gl.fail_link.set(true);
        let mut sample = Sample::<FakeGl>::new(&config_for(SampleKind::Ball), SampleInputs::default()).unwrap();
        assert!(sample.on_surface_created(&gl).is_err());
        sample.on_surface_changed(&gl, 640, 480);
        sample.on_draw_frame(&gl);
        assert_eq!(gl.count(|c| matches!(c, Call::DrawArrays(..) | Call::DrawElements(..))), 0);
        assert_eq!(gl.live_objects(), 0);
    }

    #[test]
    fn repeated_resize_is_tolerated() {
        let gl = FakeGl::new();
        let mut sample = Sample::<FakeGl>::new(&config_for(SampleKind::Cone), SampleInputs::default()).unwrap();
        sample.on_surface_created(&gl).unwrap();
        for (w, h) in [(800, 600), (600, 800), (600, 800), (1, 1)] {
            sample.on_surface_changed(&gl, w, h);
            sample.on_draw_frame(&gl);
        }
        sample.on_surface_destroyed(&gl);
        assert_eq!(gl.live_objects(), 0);
    }

    #[test]
    fn invalid_step_fails_at_construction() {
        for step_deg in [0.0, 1e-30] {
            for sample in [SampleKind::Ball, SampleKind::Cone, SampleKind::VrDome] {
                let config = SampleConfig { sample, step_deg, ..Default::default() };
                assert!(Sample::<FakeGl>::new(&config, inputs_for(sample)).is_err(), "{sample:?} {step_deg}");
            }
        }
    }

    #[test]
    fn catalogue_covers_every_drawn_topology() {
        use crate::engine::components::mesh::Topology;

        let gl = FakeGl::new();
        for kind in SampleKind::ALL {
            let mut sample = Sample::<FakeGl>::new(&config_for(kind), inputs_for(kind)).unwrap();
            sample.on_surface_created(&gl).unwrap();
            sample.on_surface_changed(&gl, 320, 240);
            sample.on_draw_frame(&gl);
            sample.on_surface_destroyed(&gl);
        }
        for topology in [Topology::Lines, Topology::LineLoop, Topology::Triangles, Topology::TriangleFan] {
            let drawn = gl.count(|c| {
                matches!(c, Call::DrawArrays(t, _) | Call::DrawElements(t, _) if *t == topology)
            });
            assert!(drawn > 0, "{topology:?}");
        }
    }

    #[test]
    fn sample_kind_parses_from_kebab_case() {
        let kind: SampleKind = serde_json::from_str("\"earth-map\"").unwrap();
        assert_eq!(kind, SampleKind::EarthMap);
        assert_eq!(SampleKind::from_str("vr-dome", true).unwrap(), SampleKind::VrDome);
        assert_eq!(SampleKind::from_str("triangle-outline", true).unwrap(), SampleKind::TriangleOutline);
        assert_eq!(SampleKind::from_str("audio-bars", true).unwrap(), SampleKind::AudioBars);
    }
}
