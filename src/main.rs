//! Desktop host for the sample renderers.
//!
//! Opens a GL 3.3 core window, drives the selected sample through the surface
//! lifecycle and feeds it from background producers: a spinning orientation
//! source, a synthetic tone for the audio bars and, for the dome, a directory
//! of frames played at a fixed rate.

use std::error::Error;
use std::f64::consts::TAU;
use std::ffi::CString;
use std::num::NonZeroU32;
use std::path::PathBuf;
use std::sync::atomic::{ AtomicBool, Ordering };
use std::sync::Arc;
use std::thread::JoinHandle;
use std::time::{ Duration, Instant };

use clap::Parser;
use glutin::config::ConfigTemplateBuilder;
use glutin::context::{ ContextApi, ContextAttributesBuilder, GlProfile, Version };
use glutin::display::GetGlDisplay;
use glutin::prelude::*;
use glutin::surface::{ SurfaceAttributesBuilder, WindowSurface };
use glutin_winit::DisplayBuilder;
use parking_lot::Mutex;
use raw_window_handle::HasWindowHandle;
use winit::application::ApplicationHandler;
use winit::dpi::{ LogicalSize, PhysicalPosition };
use winit::event::{ ElementState, KeyEvent, MouseButton, WindowEvent };
use winit::event_loop::{ ActiveEventLoop, EventLoop, EventLoopProxy };
use winit::keyboard::{ KeyCode, PhysicalKey };
use winit::window::{ Window, WindowId };

use dome_samples::config::SampleConfig;
use dome_samples::engine::components::camera::{ DisplayMode, OrientationMapping };
use dome_samples::engine::components::texture::DecodedImage;
use dome_samples::engine::managers::assets_manager::{ frame_paths, load_image_or_placeholder };
use dome_samples::engine::systems::audio::AudioBlockSlot;
use dome_samples::engine::systems::frame_signal::FrameSignal;
use dome_samples::engine::systems::shared_slot::{ SharedSlot, SlotReader };
use dome_samples::engine::utils::math::{ mat4x4_rot_y, Mat4x4 };
use dome_samples::logging::{ init_logging, LoggingConfig };
use dome_samples::samples::{ FrameFeed, InputEvent, Sample, SampleInputs, SampleKind, SurfaceRenderer };

#[derive(Debug, Parser)]
#[command(name = "dome-samples", about = "OpenGL sample renderers")]
struct Cli {
    /// JSON config file; flags below override its values.
    #[arg(long)]
    config: Option<PathBuf>,
    #[arg(long, value_enum)]
    sample: Option<SampleKind>,
    #[arg(long)]
    image: Option<PathBuf>,
    /// Directory of frames to play on the dome.
    #[arg(long)]
    frames: Option<PathBuf>,
    #[arg(long)]
    fps: Option<f32>,
    /// Spin speed of the synthetic orientation source in degrees per second.
    #[arg(long)]
    spin: Option<f32>,
    #[arg(long, value_enum)]
    display_mode: Option<DisplayMode>,
    #[arg(long, value_enum)]
    orientation_mapping: Option<OrientationMapping>,
    /// Start with orientation input ignored.
    #[arg(long)]
    no_interaction: bool,
    #[arg(long)]
    step: Option<f32>,
    #[arg(long)]
    radius: Option<f32>,
    #[arg(long)]
    fov: Option<f32>,
    #[arg(long)]
    mirror_u: bool,
    /// Log filter, e.g. "debug" or "dome_samples=trace".
    #[arg(long)]
    log: Option<String>,
}

impl Cli {
    fn apply(&self, config: &mut SampleConfig) {
        if let Some(sample) = self.sample {
            config.sample = sample;
        }
        if let Some(image) = &self.image {
            config.image = Some(image.clone());
        }
        if let Some(frames) = &self.frames {
            config.frames_dir = Some(frames.clone());
        }
        if let Some(fps) = self.fps {
            config.fps = fps;
        }
        if let Some(spin) = self.spin {
            config.spin_deg_per_sec = spin;
        }
        if let Some(mode) = self.display_mode {
            config.display_mode = mode;
        }
        if let Some(mapping) = self.orientation_mapping {
            config.orientation_mapping = mapping;
        }
        if self.no_interaction {
            config.interaction = false;
        }
        if let Some(step) = self.step {
            config.step_deg = step;
        }
        if let Some(radius) = self.radius {
            config.dome_radius = radius;
        }
        if let Some(fov) = self.fov {
            config.fov_deg = fov;
        }
        if self.mirror_u {
            config.mirror_u = true;
        }
    }
}

#[derive(Debug, Clone, Copy)]
enum HostEvent {
    FrameReady,
}

/// Background producer threads sharing one stop flag.
#[derive(Default)]
struct Workers {
    stop: Arc<AtomicBool>,
    handles: Vec<JoinHandle<()>>,
}

impl Workers {
    fn spawn(
        &mut self,
        name: &str,
        work: impl FnOnce(Arc<AtomicBool>) + Send + 'static
    ) -> std::io::Result<()> {
        let stop = self.stop.clone();
        let handle = std::thread::Builder::new().name(name.to_string()).spawn(move || work(stop))?;
        self.handles.push(handle);
        Ok(())
    }

    fn shutdown(&mut self) {
        self.stop.store(true, Ordering::Relaxed);
        for handle in self.handles.drain(..) {
            if handle.join().is_err() {
                log::error!("[HOST] producer thread panicked");
            }
        }
    }
}

/// Publishes a rotation about Y at roughly 60 Hz.
fn spin_producer(slot: SharedSlot<Mat4x4>, deg_per_sec: f32) -> impl FnOnce(Arc<AtomicBool>) + Send {
    move |stop| {
        let start = Instant::now();
        while !stop.load(Ordering::Relaxed) {
            let angle = (start.elapsed().as_secs_f32() * deg_per_sec).to_radians();
            slot.publish(mat4x4_rot_y(angle));
            std::thread::sleep(Duration::from_millis(16));
        }
    }
}

const AUDIO_RATE: f64 = 44_100.0;
const AUDIO_BLOCK: usize = 1024;

/// Publishes capture-sized blocks of a warbling tone in place of a microphone.
fn tone_producer(slot: AudioBlockSlot) -> impl FnOnce(Arc<AtomicBool>) + Send {
    move |stop| {
        let block_time = Duration::from_secs_f64((AUDIO_BLOCK as f64) / AUDIO_RATE);
        let start = Instant::now();
        let mut phase = 0.0_f64;
        while !stop.load(Ordering::Relaxed) {
            let t = start.elapsed().as_secs_f64();
            let frequency = 220.0 + 180.0 * (t * 0.5).sin();
            let gain = (0.35 + 0.3 * (t * 3.0).sin().abs()) * (i16::MAX as f64);
            let block = (0..AUDIO_BLOCK)
                .map(|_| {
                    phase = (phase + (TAU * frequency) / AUDIO_RATE) % TAU;
                    (phase.sin() * gain) as i16
                })
                .collect();
            slot.publish(block);
            std::thread::sleep(block_time);
        }
    }
}

/// Decodes `paths` in a loop and hands each frame to the render thread.
fn frame_producer(paths: Vec<PathBuf>, interval: Duration, feed: FrameFeed) -> impl FnOnce(Arc<AtomicBool>) + Send {
    move |stop| {
        for path in paths.iter().cycle() {
            if stop.load(Ordering::Relaxed) {
                break;
            }
            match DecodedImage::from_file(path) {
                Ok(frame) => {
                    feed.frames.publish(frame);
                    feed.signal.notify();
                }
                Err(e) => log::warn!("[FRAMES] skipping {}: {}", path.display(), e),
            }
            std::thread::sleep(interval);
        }
    }
}

struct GlState {
    window: Window,
    context: glutin::context::PossiblyCurrentContext,
    surface: glutin::surface::Surface<WindowSurface>,
    gl: glow::Context,
}

struct App {
    config: SampleConfig,
    sample: Sample<glow::Context>,
    state: Option<GlState>,
    workers: Workers,
    dragging: bool,
    cursor: Option<PhysicalPosition<f64>>,
    error: Option<Box<dyn Error>>,
}

impl App {
    fn create_surface(&mut self, event_loop: &ActiveEventLoop) -> Result<(), Box<dyn Error>> {
        let attributes = Window::default_attributes()
            .with_title(self.config.window.title.clone())
            .with_inner_size(LogicalSize::new(self.config.window.width, self.config.window.height));

        let display_builder = DisplayBuilder::new().with_window_attributes(Some(attributes));
        let (window, gl_config) = display_builder.build(
            event_loop,
            ConfigTemplateBuilder::new().with_depth_size(24),
            |configs| {
                configs
                    .reduce(|best, next| if next.num_samples() > best.num_samples() { next } else { best })
                    .expect("display offers no GL config")
            }
        )?;
        let window = window.ok_or("window creation failed")?;

        let display = gl_config.display();
        let raw_handle = window.window_handle()?.as_raw();
        let context_attributes = ContextAttributesBuilder::new()
            .with_context_api(ContextApi::OpenGl(Some(Version::new(3, 3))))
            .with_profile(GlProfile::Core)
            .build(Some(raw_handle));
        let not_current = unsafe { display.create_context(&gl_config, &context_attributes)? };

        let size = window.inner_size();
        let surface_attributes = SurfaceAttributesBuilder::<WindowSurface>
            ::new()
            .build(
                raw_handle,
                NonZeroU32::new(size.width).unwrap_or(NonZeroU32::MIN),
                NonZeroU32::new(size.height).unwrap_or(NonZeroU32::MIN)
            );
        let surface = unsafe { display.create_window_surface(&gl_config, &surface_attributes)? };
        let context = not_current.make_current(&surface)?;

        let gl = unsafe {
            glow::Context::from_loader_function(|name| {
                match CString::new(name) {
                    Ok(name) => display.get_proc_address(&name) as *const _,
                    Err(_) => std::ptr::null(),
                }
            })
        };

        // a failed setup is already logged by the sample, which then skips drawing
        if let Err(e) = self.sample.on_surface_created(&gl) {
            log::warn!("[HOST] {:?} will render nothing: {}", self.sample.kind(), e);
        }
        self.sample.on_surface_changed(&gl, size.width, size.height);
        window.request_redraw();

        self.state = Some(GlState { window, context, surface, gl });
        Ok(())
    }

    fn key(&mut self, event_loop: &ActiveEventLoop, event: &KeyEvent) {
        if event.state != ElementState::Pressed || event.repeat {
            return;
        }
        let PhysicalKey::Code(code) = event.physical_key else {
            return;
        };
        let input = match code {
            KeyCode::Escape => {
                event_loop.exit();
                return;
            }
            KeyCode::Space => InputEvent::ToggleDisplayMode,
            KeyCode::KeyI => InputEvent::ToggleInteraction,
            KeyCode::ArrowLeft => InputEvent::LookDirection([-0.5, 0.0, 1.0]),
            KeyCode::ArrowRight => InputEvent::LookDirection([0.5, 0.0, 1.0]),
            KeyCode::ArrowUp => InputEvent::LookDirection([0.0, 0.5, 1.0]),
            KeyCode::ArrowDown => InputEvent::LookDirection([0.0, -0.5, 1.0]),
            KeyCode::KeyR => InputEvent::LookDirection([0.0, 0.0, 1.0]),
            _ => {
                return;
            }
        };
        self.sample.handle_input(input);
    }
}

impl ApplicationHandler<HostEvent> for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.state.is_some() {
            return;
        }
        if let Err(e) = self.create_surface(event_loop) {
            log::error!("[HOST] failed to create GL surface: {}", e);
            self.error = Some(e);
            event_loop.exit();
        }
    }

    fn user_event(&mut self, _event_loop: &ActiveEventLoop, event: HostEvent) {
        match event {
            HostEvent::FrameReady => {
                if let Some(state) = &self.state {
                    state.window.request_redraw();
                }
            }
        }
    }

    fn window_event(&mut self, event_loop: &ActiveEventLoop, _id: WindowId, event: WindowEvent) {
        match event {
            WindowEvent::CloseRequested => event_loop.exit(),

            WindowEvent::Resized(size) => {
                if let Some(state) = &self.state {
                    if let (Some(width), Some(height)) = (NonZeroU32::new(size.width), NonZeroU32::new(size.height)) {
                        state.surface.resize(&state.context, width, height);
                        self.sample.on_surface_changed(&state.gl, size.width, size.height);
                    }
                    state.window.request_redraw();
                }
            }

            WindowEvent::RedrawRequested => {
                if let Some(state) = &self.state {
                    self.sample.on_draw_frame(&state.gl);
                    if let Err(e) = state.surface.swap_buffers(&state.context) {
                        log::error!("[HOST] swap_buffers failed: {}", e);
                    }
                    state.window.request_redraw();
                }
            }

            WindowEvent::KeyboardInput { event, .. } => self.key(event_loop, &event),

            WindowEvent::MouseInput { state, button: MouseButton::Left, .. } => {
                self.dragging = state == ElementState::Pressed;
            }

            WindowEvent::CursorMoved { position, .. } => {
                if let (true, Some(last)) = (self.dragging, self.cursor) {
                    self.sample.handle_input(InputEvent::Drag {
                        dx: (position.x - last.x) as f32,
                        dy: (position.y - last.y) as f32,
                    });
                }
                self.cursor = Some(position);
            }

            _ => {}
        }
    }

    fn exiting(&mut self, _event_loop: &ActiveEventLoop) {
        if let Some(state) = &self.state {
            self.sample.on_surface_destroyed(&state.gl);
        }
        self.workers.shutdown();
    }
}

impl Drop for App {
    fn drop(&mut self) {
        self.workers.shutdown();
    }
}

fn main() -> Result<(), Box<dyn Error>> {
    let cli = Cli::parse();
    init_logging(LoggingConfig { env_filter: cli.log.clone(), ..Default::default() });

    let mut config = match &cli.config {
        Some(path) => SampleConfig::load(path)?,
        None => SampleConfig::default(),
    };
    cli.apply(&mut config);
    config.validate()?;
    log::info!("[HOST] starting {:?}", config.sample);

    let event_loop = EventLoop::<HostEvent>::with_user_event().build()?;
    let mut workers = Workers::default();
    let mut inputs = SampleInputs::default();

    if config.sample.uses_texture() {
        inputs.image = Some(load_image_or_placeholder(config.image.as_deref())?);
    }

    if config.spin_deg_per_sec != 0.0 {
        let slot = SharedSlot::new();
        inputs.rotation = Some(SlotReader::new(slot.clone()));
        workers.spawn("spin", spin_producer(slot, config.spin_deg_per_sec))?;
    }

    if config.sample.uses_audio() {
        let audio = AudioBlockSlot::new();
        inputs = inputs.with_audio(&audio);
        workers.spawn("tone", tone_producer(audio))?;
    }

    if let (SampleKind::VrDome, Some(dir)) = (config.sample, &config.frames_dir) {
        let paths = frame_paths(dir)?;
        if paths.is_empty() {
            log::warn!("[FRAMES] no png or jpeg frames in {}", dir.display());
        } else {
            log::info!("[FRAMES] playing {} frames from {}", paths.len(), dir.display());
            let proxy: Mutex<EventLoopProxy<HostEvent>> = Mutex::new(event_loop.create_proxy());
            let feed = FrameFeed {
                frames: SharedSlot::new(),
                signal: FrameSignal::with_wake(move || {
                    // the loop is gone once the window closes
                    let _ = proxy.lock().send_event(HostEvent::FrameReady);
                }),
            };
            inputs.frames = Some(feed.clone());
            workers.spawn("frames", frame_producer(paths, config.frame_interval(), feed))?;
        }
    }

    let sample = Sample::new(&config, inputs)?;
    let mut app = App {
        config,
        sample,
        state: None,
        workers,
        dragging: false,
        cursor: None,
        error: None,
    };

    event_loop.run_app(&mut app)?;
    match app.error.take() {
        Some(e) => Err(e),
        None => Ok(()),
    }
}
