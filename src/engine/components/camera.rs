use clap::ValueEnum;
use serde::{ Deserialize, Serialize };

use crate::engine::rendering::gl_api::Viewport;
use crate::engine::utils::math::{
    Mat4x4,
    Vec3,
    mat4x4_frustum,
    mat4x4_from_yaw_pitch,
    mat4x4_identity,
    mat4x4_look_at,
    mat4x4_mul,
    mat4x4_ortho,
    mat4x4_perspective,
    mat4x4_transpose,
};

/// How `on_resize` turns a surface size into a projection.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum Projection {
    /// Aspect-corrected box. With `content_aspect` set, the box is fitted to
    /// content of that width/height ratio.
    Orthographic {
        content_aspect: Option<f32>,
        near: f32,
        far: f32,
    },
    /// `[-ratio, ratio] × [-1, 1]` at the near plane.
    Frustum {
        near: f32,
        far: f32,
    },
    Perspective {
        fov_y_deg: f32,
        near: f32,
        far: f32,
    },
    /// Portrait gets a frustum `[-1, 1] × [-ratio, ratio]`, landscape a perspective.
    Adaptive {
        fov_y_deg: f32,
        near: f32,
        far: f32,
    },
}

impl Projection {
    /// Horizontal and vertical half extents of the orthographic box for a surface size.
    pub fn ortho_extents(content_aspect: Option<f32>, width: u32, height: u32) -> (f32, f32) {
        let surface = (width.max(1) as f32) / (height.max(1) as f32);
        match content_aspect {
            None => {
                if surface >= 1.0 { (surface, 1.0) } else { (1.0, 1.0 / surface) }
            }
            Some(content) => {
                if width > height {
                    if content > surface {
                        (surface * content, 1.0)
                    } else {
                        (surface / content, 1.0)
                    }
                } else {
                    (1.0, content / surface)
                }
            }
        }
    }

    pub fn matrix(&self, width: u32, height: u32) -> Mat4x4 {
        let (w, h) = (width.max(1) as f32, height.max(1) as f32);
        match *self {
            Projection::Orthographic { content_aspect, near, far } => {
                let (x, y) = Self::ortho_extents(content_aspect, width, height);
                mat4x4_ortho(-x, x, -y, y, near, far)
            }
            Projection::Frustum { near, far } => {
                let ratio = w / h;
                mat4x4_frustum(-ratio, ratio, -1.0, 1.0, near, far)
            }
            Projection::Perspective { fov_y_deg, near, far } => {
                mat4x4_perspective(fov_y_deg.to_radians(), w / h, near, far)
            }
            Projection::Adaptive { fov_y_deg, near, far } => {
                if width < height {
                    let ratio = h / w;
                    mat4x4_frustum(-1.0, 1.0, -ratio, ratio, near, far)
                } else {
                    mat4x4_perspective(fov_y_deg.to_radians(), w / h, near, far)
                }
            }
        }
    }
}

/// Axis remapping applied to externally supplied orientation matrices.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum OrientationMapping {
    #[default]
    Passthrough,
    /// Inverts the rotation, turning a device-to-world matrix into a world-to-eye one.
    Transpose,
    /// Maps device Y onto Z for a device held upright.
    #[serde(rename = "swap-yz")]
    #[value(name = "swap-yz")]
    SwapYZ,
}

impl OrientationMapping {
    pub fn apply(self, matrix: Mat4x4) -> Mat4x4 {
        match self {
            OrientationMapping::Passthrough => matrix,
            OrientationMapping::Transpose => mat4x4_transpose(matrix),
            OrientationMapping::SwapYZ => {
                // new columns: x, z, -y
                let mut out = matrix;
                for row in 0..3 {
                    out[row * 4 + 1] = matrix[row * 4 + 2];
                    out[row * 4 + 2] = -matrix[row * 4 + 1];
                }
                out
            }
        }
    }
}

/// Order the frame matrix is composed in. Must match what the shader expects.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Composition {
    /// projection × view × model
    ProjectionViewModel,
    /// projection × rotation × view × model
    ProjectionRotationView,
}

/// Widens a 9-float row-major rotation to 4×4; a 16-float one is copied as is.
pub fn orientation_from_slice(source: &[f32]) -> Option<Mat4x4> {
    match source.len() {
        16 => {
            let mut out = [0.0; 16];
            out.copy_from_slice(source);
            Some(out)
        }
        9 => {
            let mut out = mat4x4_identity();
            for row in 0..3 {
                out[row * 4..row * 4 + 3].copy_from_slice(&source[row * 3..row * 3 + 3]);
            }
            Some(out)
        }
        _ => None,
    }
}

#[derive(Debug, Clone)]
pub struct Camera {
    projection: Projection,
    composition: Composition,
    mapping: OrientationMapping,
    interaction_enabled: bool,
    projection_matrix: Mat4x4,
    view: Mat4x4,
    model: Mat4x4,
    rotation: Mat4x4,
    eye: Vec3,
    target: Vec3,
    up: Vec3,
}

impl Camera {
    pub fn new(projection: Projection, composition: Composition) -> Self {
        let eye = [0.0, 0.0, 0.0];
        let target = [0.0, 0.0, -1.0];
        let up = [0.0, 1.0, 0.0];
        Self {
            projection,
            composition,
            mapping: OrientationMapping::Passthrough,
            interaction_enabled: true,
            projection_matrix: mat4x4_identity(),
            view: mat4x4_look_at(eye, target, up),
            model: mat4x4_identity(),
            rotation: mat4x4_identity(),
            eye,
            target,
            up,
        }
    }

    pub fn with_mapping(mut self, mapping: OrientationMapping) -> Self {
        self.mapping = mapping;
        self
    }

    pub fn with_view(mut self, eye: Vec3, target: Vec3, up: Vec3) -> Self {
        self.set_view(eye, target, up);
        self
    }

    pub fn set_view(&mut self, eye: Vec3, target: Vec3, up: Vec3) {
        self.eye = eye;
        self.target = target;
        self.up = up;
        self.view = mat4x4_look_at(eye, target, up);
    }

    /// Points the view from the current eye towards `(x, y, -z)`.
    pub fn set_look_direction(&mut self, x: f32, y: f32, z: f32) {
        let target = [self.eye[0] + x, self.eye[1] + y, self.eye[2] - z];
        if target == self.eye {
            log::warn!("[CAMERA] ignoring zero look direction");
            return;
        }
        self.set_view(self.eye, target, self.up);
    }

    pub fn set_model(&mut self, model: Mat4x4) {
        self.model = model;
    }

    pub fn on_resize(&mut self, width: u32, height: u32) -> Mat4x4 {
        self.projection_matrix = self.projection.matrix(width, height);
        self.projection_matrix
    }

    /// Feeds a 3×3 or 4×4 row-major rotation from an orientation source.
    ///
    /// Returns whether the rotation changed. Updates arriving while interaction is
    /// disabled are dropped.
    pub fn on_orientation(&mut self, source: &[f32]) -> bool {
        let Some(matrix) = orientation_from_slice(source) else {
            log::warn!("[CAMERA] orientation matrix needs 9 or 16 floats, got {}", source.len());
            return false;
        };
        if !self.interaction_enabled {
            return false;
        }
        self.rotation = self.mapping.apply(matrix);
        true
    }

    /// Touch-driven rotation applies regardless of the interaction flag.
    pub fn on_touch_rotation(&mut self, rotation: Mat4x4) {
        self.rotation = rotation;
    }

    pub fn set_interaction_enabled(&mut self, enabled: bool) {
        self.interaction_enabled = enabled;
    }

    pub fn toggle_interaction(&mut self) -> bool {
        self.interaction_enabled = !self.interaction_enabled;
        self.interaction_enabled
    }

    pub fn interaction_enabled(&self) -> bool {
        self.interaction_enabled
    }

    pub fn projection_matrix(&self) -> &Mat4x4 {
        &self.projection_matrix
    }

    pub fn view_matrix(&self) -> &Mat4x4 {
        &self.view
    }

    pub fn model_matrix(&self) -> &Mat4x4 {
        &self.model
    }

    pub fn rotation_matrix(&self) -> &Mat4x4 {
        &self.rotation
    }

    pub fn composition(&self) -> Composition {
        self.composition
    }

    fn compose(&self, projection: Mat4x4) -> Mat4x4 {
        match self.composition {
            Composition::ProjectionViewModel => {
                mat4x4_mul(mat4x4_mul(projection, self.view), self.model)
            }
            Composition::ProjectionRotationView => {
                let pr = mat4x4_mul(projection, self.rotation);
                mat4x4_mul(mat4x4_mul(pr, self.view), self.model)
            }
        }
    }

    /// Frame matrix using the projection stored by the last `on_resize`.
    pub fn frame_matrix(&self) -> Mat4x4 {
        self.compose(self.projection_matrix)
    }

    /// Frame matrix with a projection computed for this viewport's own aspect.
    pub fn frame_matrix_for(&self, viewport: Viewport) -> Mat4x4 {
        let projection = self.projection.matrix(viewport.width.max(1) as u32, viewport.height.max(1) as u32);
        self.compose(projection)
    }

    pub fn projection_for(&self, viewport: Viewport) -> Mat4x4 {
        self.projection.matrix(viewport.width.max(1) as u32, viewport.height.max(1) as u32)
    }
}

/// Normal draws once per frame; Stereo draws each eye into its half of the surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum DisplayMode {
    #[default]
    Normal,
    Stereo,
}

impl DisplayMode {
    pub fn toggled(self) -> Self {
        match self {
            DisplayMode::Normal => DisplayMode::Stereo,
            DisplayMode::Stereo => DisplayMode::Normal,
        }
    }

    pub fn viewports(self, width: u32, height: u32) -> impl Iterator<Item = Viewport> {
        let (w, h) = (width as i32, height as i32);
        let (views, count) = match self {
            DisplayMode::Normal => ([Viewport::new(0, 0, w, h), Viewport::default()], 1),
            DisplayMode::Stereo => {
                let half = w / 2;
                ([Viewport::new(0, 0, half, h), Viewport::new(half, 0, w - half, h)], 2)
            }
        };
        views.into_iter().take(count)
    }
}

/// Accumulates drag deltas (pixels) into a yaw/pitch rotation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DragRotation {
    yaw: f32,
    pitch: f32,
    radians_per_pixel: f32,
}

impl DragRotation {
    const PITCH_LIMIT: f32 = 89.0 * (std::f32::consts::PI / 180.0);

    pub fn new(radians_per_pixel: f32) -> Self {
        Self { yaw: 0.0, pitch: 0.0, radians_per_pixel }
    }

    pub fn drag(&mut self, dx: f32, dy: f32) -> Mat4x4 {
        self.yaw += dx * self.radians_per_pixel;
        self.pitch = (self.pitch + dy * self.radians_per_pixel).clamp(-Self::PITCH_LIMIT, Self::PITCH_LIMIT);
        self.matrix()
    }

    pub fn matrix(&self) -> Mat4x4 {
        mat4x4_from_yaw_pitch(self.yaw, self.pitch)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::utils::math::mat4x4_rot_z;

    fn approx(a: f32, b: f32) -> bool {
        (a - b).abs() < 1e-5
    }

    const ORTHO: Projection = Projection::Orthographic { content_aspect: None, near: 3.0, far: 7.0 };

    #[test]
    fn ortho_resize_swaps_extents() {
        for (w, h) in [(1920, 1080), (640, 480), (300, 900)] {
            let (x, y) = Projection::ortho_extents(None, w, h);
            let (sx, sy) = Projection::ortho_extents(None, h, w);
            assert!(approx(x, sy) && approx(y, sx), "{w}x{h}");

            let a = ORTHO.matrix(w, h);
            let b = ORTHO.matrix(h, w);
            assert!(approx(a[0], b[5]) && approx(a[5], b[0]));
        }
    }

    #[test]
    fn ortho_fits_content_aspect_in_landscape() {
        // wide content on a slightly less wide surface
        let (x, y) = Projection::ortho_extents(Some(2.0), 1600, 1000);
        assert!(approx(x, 3.2) && approx(y, 1.0));
        let (x, y) = Projection::ortho_extents(Some(1.0), 1600, 1000);
        assert!(approx(x, 1.6) && approx(y, 1.0));
        let (x, y) = Projection::ortho_extents(Some(1.0), 1000, 2000);
        assert!(approx(x, 1.0) && approx(y, 2.0));
    }

    #[test]
    fn adaptive_picks_frustum_in_portrait() {
        let adaptive = Projection::Adaptive { fov_y_deg: 70.0, near: 1.0, far: 300.0 };
        let portrait = adaptive.matrix(500, 1000);
        assert_eq!(portrait, mat4x4_frustum(-1.0, 1.0, -2.0, 2.0, 1.0, 300.0));
        let landscape = adaptive.matrix(1000, 500);
        assert_eq!(landscape, mat4x4_perspective((70.0_f32).to_radians(), 2.0, 1.0, 300.0));
    }

    #[test]
    fn orientation_is_dropped_while_interaction_disabled() {
        let mut camera = Camera::new(ORTHO, Composition::ProjectionRotationView);
        let rotation = mat4x4_rot_z(0.5);

        camera.set_interaction_enabled(false);
        assert!(!camera.on_orientation(&rotation));
        assert_eq!(camera.rotation_matrix(), &mat4x4_identity());

        camera.set_interaction_enabled(true);
        assert!(camera.on_orientation(&rotation));
        assert_eq!(camera.rotation_matrix(), &rotation);
    }

    #[test]
    fn touch_rotation_ignores_interaction_flag() {
        let mut camera = Camera::new(ORTHO, Composition::ProjectionRotationView);
        camera.toggle_interaction();
        assert!(!camera.interaction_enabled());
        camera.on_touch_rotation(mat4x4_rot_z(1.0));
        assert_eq!(camera.rotation_matrix(), &mat4x4_rot_z(1.0));
    }

    #[test]
    fn three_by_three_orientation_is_padded() {
        let mut camera = Camera::new(ORTHO, Composition::ProjectionRotationView);
        let r = mat4x4_rot_z(0.3);
        let compact = [r[0], r[1], r[2], r[4], r[5], r[6], r[8], r[9], r[10]];
        assert!(camera.on_orientation(&compact));
        assert_eq!(camera.rotation_matrix(), &r);
        assert!(!camera.on_orientation(&[1.0; 4]));
    }

    #[test]
    fn mappings_stay_rotations() {
        let r = mat4x4_rot_z(0.7);
        assert_eq!(OrientationMapping::Passthrough.apply(r), r);
        assert_eq!(OrientationMapping::Transpose.apply(r), mat4x4_transpose(r));

        let swapped = OrientationMapping::SwapYZ.apply(mat4x4_identity());
        // x stays, y column becomes old z, z column becomes -old y
        assert_eq!(&swapped[0..3], &[1.0, 0.0, 0.0]);
        assert_eq!(&swapped[4..7], &[0.0, 0.0, -1.0]);
        assert_eq!(&swapped[8..11], &[0.0, 1.0, 0.0]);
    }

    #[test]
    fn composition_order_is_respected() {
        let mut camera = Camera::new(ORTHO, Composition::ProjectionViewModel);
        camera.on_resize(800, 600);
        camera.on_touch_rotation(mat4x4_rot_z(0.4));
        // rotation does not take part in projection × view × model
        let expected = mat4x4_mul(mat4x4_mul(*camera.projection_matrix(), *camera.view_matrix()), mat4x4_identity());
        assert_eq!(camera.frame_matrix(), expected);
    }

    #[test]
    fn look_direction_moves_target() {
        let mut camera = Camera::new(ORTHO, Composition::ProjectionRotationView);
        let default_view = *camera.view_matrix();
        camera.set_look_direction(0.0, 0.0, 1.0);
        assert_eq!(camera.view_matrix(), &default_view);
        camera.set_look_direction(1.0, 0.0, 0.0);
        assert_ne!(camera.view_matrix(), &default_view);
        camera.set_look_direction(0.0, 0.0, 0.0);
        assert_ne!(camera.view_matrix(), &default_view);
    }

    #[test]
    fn stereo_splits_surface_into_two_halves() {
        let normal: Vec<_> = DisplayMode::Normal.viewports(1280, 720).collect();
        assert_eq!(normal, vec![Viewport::new(0, 0, 1280, 720)]);

        let stereo: Vec<_> = DisplayMode::Normal.toggled().viewports(1281, 720).collect();
        assert_eq!(stereo, vec![Viewport::new(0, 0, 640, 720), Viewport::new(640, 0, 641, 720)]);
        assert_eq!(DisplayMode::Stereo.toggled(), DisplayMode::Normal);
    }

    #[test]
    fn stereo_eyes_use_half_width_projection() {
        let camera = Camera::new(
            Projection::Perspective { fov_y_deg: 70.0, near: 1.0, far: 300.0 },
            Composition::ProjectionRotationView
        );
        let eye = Viewport::new(0, 0, 640, 720);
        let full = Viewport::new(0, 0, 1280, 720);
        assert_ne!(camera.projection_for(eye), camera.projection_for(full));
        assert!(approx(camera.projection_for(eye)[5], camera.projection_for(full)[5]));
    }

    #[test]
    fn drag_pitch_is_clamped() {
        let mut drag = DragRotation::new(0.01);
        drag.drag(0.0, 100_000.0);
        let m = drag.drag(0.0, 1.0);
        assert_eq!(m, mat4x4_from_yaw_pitch(0.0, DragRotation::PITCH_LIMIT));
    }
}
