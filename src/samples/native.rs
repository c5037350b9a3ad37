//! Bridge to an out-of-process or FFI render engine that owns its own samples.
//!
//! Only the command surface is modelled here. `NativeSurface` forwards the host
//! lifecycle to a `NativeRenderService` and pumps captured audio blocks into it.

use std::fmt;

use super::SurfaceRenderer;
use crate::engine::components::texture::DecodedImage;
use crate::engine::errors::RenderError;
use crate::engine::rendering::gl_api::GlApi;
use crate::engine::systems::shared_slot::SlotReader;

/// First sample id; every sample id is this plus its position.
pub const SAMPLE_ID_BASE: i32 = 200;

/// Parameter selectors understood by `set_params_*`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ParamKind {
    /// `value0` carries a `NativeSample` id.
    SampleType,
    TouchLocation,
    GravityXy,
}

impl ParamKind {
    pub fn id(self) -> i32 {
        match self {
            ParamKind::SampleType => SAMPLE_ID_BASE,
            ParamKind::TouchLocation => SAMPLE_ID_BASE + 999,
            ParamKind::GravityXy => SAMPLE_ID_BASE + 1000,
        }
    }
}

/// Pixel layouts an image upload can carry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ImageFormat {
    Rgba = 1,
    Nv21 = 2,
    Nv12 = 3,
    I420 = 4,
    Yuyv = 5,
    Gray = 6,
}

macro_rules! native_samples {
    ($($variant:ident),+ $(,)?) => {
        /// The engine's closed sample catalogue.
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        pub enum NativeSample {
            $($variant),+
        }

        impl NativeSample {
            pub const ALL: &'static [NativeSample] = &[$(NativeSample::$variant),+];
        }
    };
}

native_samples!(
    Triangle,
    TextureMap,
    YuvTextureMap,
    Vao,
    Fbo,
    Egl,
    FboLeg,
    CoordSystem,
    BasicLighting,
    TransformFeedback,
    MultiLights,
    DepthTesting,
    Instancing,
    StencilTesting,
    Blending,
    Particles,
    Skybox,
    Model3d,
    Pbo,
    BeatingHeart,
    Cloud,
    TimeTunnel,
    BezierCurve,
    BigEyes,
    FaceSlender,
    BigHead,
    RotaryHead,
    VisualizeAudio,
    ScratchCard,
    Avatar,
    ShockWave,
    Mrt,
    FboBlit,
    Tbo,
    Ubo,
    Rgb2Yuv,
    MultiThreadRender,
    TextRender,
    StayColor,
    Transition,
);

impl NativeSample {
    pub fn id(self) -> i32 {
        SAMPLE_ID_BASE + (self as i32)
    }

    pub fn from_id(id: i32) -> Option<Self> {
        let index = usize::try_from(id.checked_sub(SAMPLE_ID_BASE)?).ok()?;
        Self::ALL.get(index).copied()
    }

    /// Whether the engine expects captured audio while this sample runs.
    pub fn wants_audio(self) -> bool {
        self == NativeSample::VisualizeAudio
    }
}

impl fmt::Display for NativeSample {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}({})", self, self.id())
    }
}

/// Command surface of the native engine. Implementations own their GL state.
pub trait NativeRenderService {
    fn init(&mut self);
    fn uninit(&mut self);
    fn set_params_int(&mut self, kind: i32, value0: i32, value1: i32);
    fn set_params_float(&mut self, kind: i32, value0: f32, value1: f32);
    fn update_transform_matrix(&mut self, rotate_x: f32, rotate_y: f32, scale_x: f32, scale_y: f32);
    fn set_image_data(&mut self, format: ImageFormat, width: u32, height: u32, bytes: &[u8]);
    fn set_image_data_with_index(
        &mut self,
        index: u32,
        format: ImageFormat,
        width: u32,
        height: u32,
        bytes: &[u8]
    );
    fn set_audio_data(&mut self, samples: &[i16]);
    fn on_surface_created(&mut self);
    fn on_surface_changed(&mut self, width: u32, height: u32);
    fn on_draw_frame(&mut self);
}

/// Drives a `NativeRenderService` through the surface lifecycle.
///
/// The service is initialised on construction and uninitialised on drop.
pub struct NativeSurface<S: NativeRenderService> {
    service: S,
    sample: Option<NativeSample>,
    audio: Option<SlotReader<Vec<i16>>>,
}

impl<S: NativeRenderService> NativeSurface<S> {
    pub fn new(mut service: S) -> Self {
        service.init();
        Self { service, sample: None, audio: None }
    }

    pub fn service(&self) -> &S {
        &self.service
    }

    pub fn sample(&self) -> Option<NativeSample> {
        self.sample
    }

    pub fn select(&mut self, sample: NativeSample) {
        log::info!("[NATIVE] selecting {}", sample);
        self.service.set_params_int(ParamKind::SampleType.id(), sample.id(), 0);
        self.sample = Some(sample);
    }

    pub fn attach_audio(&mut self, reader: SlotReader<Vec<i16>>) {
        self.audio = Some(reader);
    }

    pub fn set_touch_location(&mut self, x: f32, y: f32) {
        self.service.set_params_float(ParamKind::TouchLocation.id(), x, y);
    }

    pub fn set_gravity(&mut self, x: f32, y: f32) {
        self.service.set_params_float(ParamKind::GravityXy.id(), x, y);
    }

    pub fn update_transform(&mut self, rotate_x: f32, rotate_y: f32, scale: f32) {
        self.service.update_transform_matrix(rotate_x, rotate_y, scale, scale);
    }

    /// Sends an RGBA image, into slot `index` when the sample takes several.
    pub fn set_image(&mut self, index: Option<u32>, image: &DecodedImage) {
        let (width, height) = (image.width(), image.height());
        match index {
            Some(index) =>
                self.service.set_image_data_with_index(index, ImageFormat::Rgba, width, height, image.pixels()),
            None => self.service.set_image_data(ImageFormat::Rgba, width, height, image.pixels()),
        }
    }

    fn pump_audio(&mut self) {
        let Some(reader) = self.audio.as_mut() else {
            return;
        };
        // drain even when unused so a later selection starts from fresh audio
        let block = reader.poll();
        if !self.sample.is_some_and(NativeSample::wants_audio) {
            return;
        }
        if let Some(block) = block {
            self.service.set_audio_data(&block);
        }
    }
}

impl<S: NativeRenderService> Drop for NativeSurface<S> {
    fn drop(&mut self) {
        self.service.uninit();
    }
}

impl<G: GlApi, S: NativeRenderService> SurfaceRenderer<G> for NativeSurface<S> {
    fn on_surface_created(&mut self, _gl: &G) -> Result<(), RenderError> {
        self.service.on_surface_created();
        Ok(())
    }

    fn on_surface_changed(&mut self, _gl: &G, width: u32, height: u32) {
        self.service.on_surface_changed(width, height);
    }

    fn on_draw_frame(&mut self, _gl: &G) {
        self.pump_audio();
        self.service.on_draw_frame();
    }

    fn on_surface_destroyed(&mut self, _gl: &G) {}
}
