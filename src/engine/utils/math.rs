//! Row-major 4x4 matrix helpers.
//!
//! Matrices are stored row by row and uploaded with `transpose = true`.

pub type Mat4x4 = [f32; 16];
pub type Vec3 = [f32; 3];

pub fn mat4x4_identity() -> Mat4x4 {
    [
      1.0, 0.0, 0.0, 0.0,
      0.0, 1.0, 0.0, 0.0,
      0.0, 0.0, 1.0, 0.0,
      0.0, 0.0, 0.0, 1.0
    ]
}

pub fn mat4x4_translate(x: f32, y: f32, z: f32) -> Mat4x4 {
    [
      1.0, 0.0, 0.0,  x,
      0.0, 1.0, 0.0,  y,
      0.0, 0.0, 1.0,  z,
      0.0, 0.0, 0.0, 1.0
    ]
}

pub fn mat4x4_rot_x(angle: f32) -> Mat4x4 {
    let c = angle.cos();
    let s = angle.sin();

    [
      1.0, 0.0, 0.0, 0.0,
      0.0,  c,  -s,  0.0,
      0.0,  s,   c,  0.0,
      0.0, 0.0, 0.0, 1.0
    ]
}

pub fn mat4x4_rot_y(angle: f32) -> Mat4x4 {
    let c = angle.cos();
    let s = angle.sin();

    [
       c,  0.0,  s,  0.0,
      0.0, 1.0, 0.0, 0.0,
      -s,  0.0,  c,  0.0,
      0.0, 0.0, 0.0, 1.0
    ]
}

pub fn mat4x4_rot_z(angle: f32) -> Mat4x4 {
    let c = angle.cos();
    let s = angle.sin();

    [
       c,  -s,  0.0, 0.0,
       s,   c,  0.0, 0.0,
      0.0, 0.0, 1.0, 0.0,
      0.0, 0.0, 0.0, 1.0
    ]
}

pub fn mat4x4_transpose(matrix: Mat4x4) -> Mat4x4 {
    let mut ret = [0.0; 16];
    for i in 0..16 {
        let row = i / 4;
        let col = i % 4;
        ret[col * 4 + row] = matrix[row * 4 + col];
    }
    ret
}

pub fn vec4_dot(a: [f32; 4], b: [f32; 4]) -> f32 {
    a[0] * b[0] + a[1] * b[1] + a[2] * b[2] + a[3] * b[3]
}

pub fn mat4x4_row(mat: &Mat4x4, row: usize) -> [f32; 4] {
    let start_idx = row * 4;
    [mat[start_idx], mat[start_idx + 1], mat[start_idx + 2], mat[start_idx + 3]]
}

pub fn mat4x4_col(mat: &Mat4x4, col: usize) -> [f32; 4] {
    [mat[col], mat[4 + col], mat[8 + col], mat[12 + col]]
}

pub fn mat4x4_mul(a: Mat4x4, b: Mat4x4) -> Mat4x4 {
    let mut ret = [0.0; 16];
    for (i, value) in ret.iter_mut().enumerate() {
        let row = i / 4;
        let col = i % 4;
        *value = vec4_dot(mat4x4_row(&a, row), mat4x4_col(&b, col));
    }
    ret
}

/// Transforms a point (w = 1) and returns the homogeneous result.
pub fn mat4x4_transform_point(mat: &Mat4x4, p: Vec3) -> [f32; 4] {
    let v = [p[0], p[1], p[2], 1.0];
    [
        vec4_dot(mat4x4_row(mat, 0), v),
        vec4_dot(mat4x4_row(mat, 1), v),
        vec4_dot(mat4x4_row(mat, 2), v),
        vec4_dot(mat4x4_row(mat, 3), v),
    ]
}

pub fn mat4x4_perspective(fov_y_radians: f32, aspect_ratio: f32, near: f32, far: f32) -> Mat4x4 {
    let f = 1.0 / (fov_y_radians * 0.5).tan();
    let range_inv = 1.0 / (near - far);

    [
        f / aspect_ratio, 0.0, 0.0,                          0.0,
        0.0,              f,   0.0,                          0.0,
        0.0,              0.0, (near + far) * range_inv,     (2.0 * near * far) * range_inv,
        0.0,              0.0, -1.0,                         0.0,
    ]
}

pub fn mat4x4_frustum(left: f32, right: f32, bottom: f32, top: f32, near: f32, far: f32) -> Mat4x4 {
    let rw = 1.0 / (right - left);
    let rh = 1.0 / (top - bottom);
    let rd = 1.0 / (near - far);

    [
        2.0 * near * rw, 0.0,             (right + left) * rw, 0.0,
        0.0,             2.0 * near * rh, (top + bottom) * rh, 0.0,
        0.0,             0.0,             (far + near) * rd,   2.0 * far * near * rd,
        0.0,             0.0,             -1.0,                0.0,
    ]
}

pub fn mat4x4_ortho(left: f32, right: f32, bottom: f32, top: f32, near: f32, far: f32) -> Mat4x4 {
    let rw = 1.0 / (right - left);
    let rh = 1.0 / (top - bottom);
    let rd = 1.0 / (far - near);

    [
        2.0 * rw, 0.0,      0.0,       -(right + left) * rw,
        0.0,      2.0 * rh, 0.0,       -(top + bottom) * rh,
        0.0,      0.0,      -2.0 * rd, -(far + near) * rd,
        0.0,      0.0,      0.0,       1.0,
    ]
}

pub fn vec3_sub(a: Vec3, b: Vec3) -> Vec3 {
    [a[0] - b[0], a[1] - b[1], a[2] - b[2]]
}

pub fn vec3_dot(a: Vec3, b: Vec3) -> f32 {
    a[0] * b[0] + a[1] * b[1] + a[2] * b[2]
}

pub fn vec3_cross(a: Vec3, b: Vec3) -> Vec3 {
    [
        a[1] * b[2] - a[2] * b[1],
        a[2] * b[0] - a[0] * b[2],
        a[0] * b[1] - a[1] * b[0],
    ]
}

pub fn vec3_length(v: Vec3) -> f32 {
    vec3_dot(v, v).sqrt()
}

pub fn vec3_normalize(v: Vec3) -> Vec3 {
    let len = vec3_length(v);
    if len <= f32::EPSILON {
        return v;
    }
    [v[0] / len, v[1] / len, v[2] / len]
}

/// View matrix looking from `eye` towards `center`.
pub fn mat4x4_look_at(eye: Vec3, center: Vec3, up: Vec3) -> Mat4x4 {
    let forward = vec3_normalize(vec3_sub(center, eye));
    let side = vec3_normalize(vec3_cross(forward, up));
    let up = vec3_cross(side, forward);

    [
        side[0],     side[1],     side[2],     -vec3_dot(side, eye),
        up[0],       up[1],       up[2],       -vec3_dot(up, eye),
        -forward[0], -forward[1], -forward[2], vec3_dot(forward, eye),
        0.0,         0.0,         0.0,         1.0,
    ]
}

/// Rotation from yaw (about Y) then pitch (about X), used for drag-to-look.
pub fn mat4x4_from_yaw_pitch(yaw: f32, pitch: f32) -> Mat4x4 {
    mat4x4_mul(mat4x4_rot_x(pitch), mat4x4_rot_y(yaw))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx(a: f32, b: f32) -> bool {
        (a - b).abs() < 1e-5
    }

    fn approx_mat(a: &Mat4x4, b: &Mat4x4) -> bool {
        a.iter().zip(b.iter()).all(|(x, y)| approx(*x, *y))
    }

    #[test]
    fn identity_is_neutral_for_mul() {
        let m = mat4x4_translate(1.0, 2.0, 3.0);
        assert!(approx_mat(&mat4x4_mul(mat4x4_identity(), m), &m));
        assert!(approx_mat(&mat4x4_mul(m, mat4x4_identity()), &m));
    }

    #[test]
    fn translate_moves_point() {
        let p = mat4x4_transform_point(&mat4x4_translate(1.0, -2.0, 0.5), [1.0, 1.0, 1.0]);
        assert!(approx(p[0], 2.0) && approx(p[1], -1.0) && approx(p[2], 1.5) && approx(p[3], 1.0));
    }

    #[test]
    fn transpose_twice_is_identity_op() {
        let m = mat4x4_from_yaw_pitch(0.3, -0.2);
        assert!(approx_mat(&mat4x4_transpose(mat4x4_transpose(m)), &m));
    }

    #[test]
    fn rotation_transpose_is_inverse() {
        let m = mat4x4_from_yaw_pitch(1.1, 0.4);
        assert!(approx_mat(&mat4x4_mul(m, mat4x4_transpose(m)), &mat4x4_identity()));
    }

    #[test]
    fn look_at_maps_center_onto_negative_z() {
        let view = mat4x4_look_at([0.0, 0.0, 7.0], [0.0, 0.0, 0.0], [0.0, 1.0, 0.0]);
        let p = mat4x4_transform_point(&view, [0.0, 0.0, 0.0]);
        assert!(approx(p[0], 0.0) && approx(p[1], 0.0) && approx(p[2], -7.0));
    }

    #[test]
    fn ortho_maps_box_corners_to_ndc() {
        let m = mat4x4_ortho(-2.0, 2.0, -1.0, 1.0, 3.0, 7.0);
        let p = mat4x4_transform_point(&m, [2.0, -1.0, -3.0]);
        assert!(approx(p[0], 1.0) && approx(p[1], -1.0) && approx(p[2], -1.0));
        let q = mat4x4_transform_point(&m, [-2.0, 1.0, -7.0]);
        assert!(approx(q[0], -1.0) && approx(q[1], 1.0) && approx(q[2], 1.0));
    }

    #[test]
    fn frustum_near_plane_maps_to_minus_one() {
        let m = mat4x4_frustum(-1.0, 1.0, -1.0, 1.0, 3.0, 7.0);
        let p = mat4x4_transform_point(&m, [1.0, 1.0, -3.0]);
        assert!(approx(p[0] / p[3], 1.0));
        assert!(approx(p[1] / p[3], 1.0));
        assert!(approx(p[2] / p[3], -1.0));
    }

    #[test]
    fn perspective_matches_symmetric_frustum() {
        let fov = 90.0_f32.to_radians();
        let p = mat4x4_perspective(fov, 1.0, 1.0, 10.0);
        let f = mat4x4_frustum(-1.0, 1.0, -1.0, 1.0, 1.0, 10.0);
        assert!(approx_mat(&p, &f));
    }
}
