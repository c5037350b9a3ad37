//! Procedural primitive meshes: discs, cones, cylinders, UV-spheres and quads.
//!
//! Angles in the public API are in degrees. Generators validate their step so a
//! zero, negative or non-finite step can never spin forever.

use super::mesh::{ Mesh, Topology, VertexAttribute };
use crate::engine::errors::MeshError;

pub type Rgba = [f32; 4];

/// Which axis the sphere poles sit on.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum UpAxis {
    /// x = r·sinθ·cosφ, y = r·sinθ·sinφ, z = r·cosθ
    Z,
    /// x = r·sinθ·cosφ, y = r·cosθ, z = r·sinθ·sinφ
    Y,
}

#[derive(Clone, Debug, PartialEq)]
pub struct SphereParams {
    pub radius: f32,
    pub lat_step_deg: f32,
    pub lon_step_deg: f32,
    pub up: UpAxis,
    pub textured: bool,
    pub mirror_u: bool,
}

impl SphereParams {
    pub fn new(radius: f32, step_deg: f32) -> Self {
        Self {
            radius,
            lat_step_deg: step_deg,
            lon_step_deg: step_deg,
            up: UpAxis::Z,
            textured: true,
            mirror_u: false,
        }
    }

    pub fn with_up(mut self, up: UpAxis) -> Self {
        self.up = up;
        self
    }

    pub fn untextured(mut self) -> Self {
        self.textured = false;
        self
    }

    pub fn mirrored(mut self) -> Self {
        self.mirror_u = true;
        self
    }
}

fn validate_step(step_deg: f32) -> Result<f64, MeshError> {
    if !step_deg.is_finite() || step_deg <= 0.0 || step_deg > 360.0 {
        return Err(MeshError::InvalidStep(step_deg));
    }
    Ok(step_deg as f64)
}

fn validate_radius(radius: f32) -> Result<f64, MeshError> {
    if !radius.is_finite() || radius <= 0.0 {
        return Err(MeshError::InvalidRadius(radius));
    }
    Ok(radius as f64)
}

/// Most steps one sweep may take. A fan over that many rim vertices plus its
/// center still fits 16-bit indices.
pub const MAX_STEPS: usize = (u16::MAX as usize) - 1;

/// Most latitude × longitude cells one UV-sphere may have.
pub const MAX_SPHERE_CELLS: usize = 1 << 20;

/// Number of steps needed to cover `span` degrees, counting a trailing partial step.
pub fn step_count(span_deg: f64, step_deg: f64) -> Result<usize, MeshError> {
    // the epsilon keeps exact divisors like 360/9 from rounding up to an extra cell
    let steps = ((span_deg / step_deg) - 1e-9).ceil().max(1.0);
    if steps > (MAX_STEPS as f64) {
        return Err(MeshError::TooManyCells { cells: steps, max: MAX_STEPS });
    }
    Ok(steps as usize)
}

/// Rim ring in the XY plane at height `z`, `n` vertices at angles `k·step`.
fn rim(radius: f64, step_rad: f64, n: usize, z: f32, out: &mut Vec<f32>) {
    for k in 0..n {
        let angle = (k as f64) * step_rad;
        out.push((radius * angle.cos()) as f32);
        out.push((radius * angle.sin()) as f32);
        out.push(z);
    }
}

/// Closing fan indices: center, every rim vertex, then the first rim vertex again.
fn fan_indices(rim_vertices: usize) -> Vec<u16> {
    let mut indices: Vec<u16> = (0..=rim_vertices as u16).collect();
    indices.push(1);
    indices
}

/// Center vertex followed by one rim vertex per angular step, drawn as a fan.
pub fn disc(radius: f32, step_deg: f32, z: f32) -> Result<Mesh, MeshError> {
    let radius = validate_radius(radius)?;
    let step = validate_step(step_deg)?;
    let n = step_count(360.0, step)?;

    let mut positions = Vec::with_capacity((n + 1) * 3);
    positions.extend_from_slice(&[0.0, 0.0, z]);
    rim(radius, step.to_radians(), n, z, &mut positions);

    Mesh::new(positions, VertexAttribute::None, Some(fan_indices(n)), Topology::TriangleFan)
}

#[derive(Debug)]
pub struct ConeMesh {
    pub side: Mesh,
    pub base: Mesh,
}

/// Cone around +Z: side fan from the apex, base disc at z = 0.
pub fn cone(
    radius: f32,
    apex_z: f32,
    step_deg: f32,
    colors: Option<(Rgba, Rgba)>
) -> Result<ConeMesh, MeshError> {
    let r = validate_radius(radius)?;
    let step = validate_step(step_deg)?;
    let n = step_count(360.0, step)?;

    let mut side = Vec::with_capacity((n + 1) * 3);
    side.extend_from_slice(&[0.0, 0.0, apex_z]);
    rim(r, step.to_radians(), n, 0.0, &mut side);

    let attribute = match colors {
        Some((apex, rim_color)) => {
            let mut data = Vec::with_capacity((n + 1) * 4);
            data.extend_from_slice(&apex);
            for _ in 0..n {
                data.extend_from_slice(&rim_color);
            }
            VertexAttribute::Colors(data)
        }
        None => VertexAttribute::None,
    };

    let side = Mesh::new(side, attribute, Some(fan_indices(n)), Topology::TriangleFan)?;
    let base = disc(radius, step_deg, 0.0)?;
    Ok(ConeMesh { side, base })
}

#[derive(Debug)]
pub struct CylinderMesh {
    pub side: Mesh,
    pub top: Mesh,
    pub bottom: Mesh,
}

/// Cylinder along +Z from 0 to `height`.
pub fn cylinder(radius: f32, height: f32, step_deg: f32) -> Result<CylinderMesh, MeshError> {
    let r = validate_radius(radius)?;
    let step = validate_step(step_deg)?;
    let n = step_count(360.0, step)?;
    if n < 3 {
        return Err(MeshError::TooFewSegments(n as u32));
    }

    // rings interleaved: 2k is the top vertex, 2k + 1 the bottom one
    let mut positions = Vec::with_capacity(n * 6);
    for k in 0..n {
        let angle = (k as f64) * step.to_radians();
        let x = (r * angle.cos()) as f32;
        let y = (r * angle.sin()) as f32;
        positions.extend_from_slice(&[x, y, height, x, y, 0.0]);
    }

    let mut indices = Vec::with_capacity(n * 6);
    for k in 0..n {
        let top = (2 * k) as u16;
        let bottom = top + 1;
        let next_top = (2 * ((k + 1) % n)) as u16;
        let next_bottom = next_top + 1;
        indices.extend_from_slice(&[top, bottom, next_top, next_top, bottom, next_bottom]);
    }

    Ok(CylinderMesh {
        side: Mesh::new(positions, VertexAttribute::None, Some(indices), Topology::Triangles)?,
        top: disc(radius, step_deg, height)?,
        bottom: disc(radius, step_deg, 0.0)?,
    })
}

fn sphere_point(radius: f64, theta: f64, phi: f64, up: UpAxis) -> [f32; 3] {
    let ring = radius * theta.sin();
    let axial = (radius * theta.cos()) as f32;
    let a = (ring * phi.cos()) as f32;
    let b = (ring * phi.sin()) as f32;
    match up {
        UpAxis::Z => [a, b, axial],
        UpAxis::Y => [a, axial, b],
    }
}

/// UV-sphere as a plain triangle list, two triangles per latitude/longitude cell.
///
/// The final partial step is kept, so the last ring or column may overshoot
/// π / 2π slightly. Pole cells degenerate into zero-area triangles.
pub fn uv_sphere(params: &SphereParams) -> Result<Mesh, MeshError> {
    let radius = validate_radius(params.radius)?;
    let lat_step = validate_step(params.lat_step_deg)?;
    let lon_step = validate_step(params.lon_step_deg)?;
    let lat_cells = step_count(180.0, lat_step)?;
    let lon_cells = step_count(360.0, lon_step)?;
    let cells = lat_cells
        .checked_mul(lon_cells)
        .filter(|cells| *cells <= MAX_SPHERE_CELLS)
        .ok_or(MeshError::TooManyCells {
            cells: (lat_cells as f64) * (lon_cells as f64),
            max: MAX_SPHERE_CELLS,
        })?;

    let vertex_count = cells * 6;
    let mut positions = Vec::with_capacity(vertex_count * 3);
    let mut uvs = Vec::with_capacity(if params.textured { vertex_count * 2 } else { 0 });

    let d_theta = lat_step.to_radians();
    let d_phi = lon_step.to_radians();

    for i in 0..lat_cells {
        let theta0 = (i as f64) * d_theta;
        let theta1 = theta0 + d_theta;
        let t0 = (i as f64) * lat_step / 180.0;
        let t1 = ((i + 1) as f64) * lat_step / 180.0;

        for j in 0..lon_cells {
            let phi0 = (j as f64) * d_phi;
            let phi1 = phi0 + d_phi;

            let p0 = sphere_point(radius, theta0, phi0, params.up);
            let p1 = sphere_point(radius, theta0, phi1, params.up);
            let p2 = sphere_point(radius, theta1, phi1, params.up);
            let p3 = sphere_point(radius, theta1, phi0, params.up);

            for p in [p1, p0, p3, p1, p3, p2] {
                positions.extend_from_slice(&p);
            }

            if params.textured {
                let mut s0 = (j as f64) * lon_step / 360.0;
                let mut s1 = ((j + 1) as f64) * lon_step / 360.0;
                if params.mirror_u {
                    s0 = 1.0 - s0;
                    s1 = 1.0 - s1;
                }
                let (s0, s1, t0, t1) = (s0 as f32, s1 as f32, t0 as f32, t1 as f32);
                uvs.extend_from_slice(&[s1, t0, s0, t0, s0, t1, s1, t0, s0, t1, s1, t1]);
            }
        }
    }

    let attribute = if params.textured {
        VertexAttribute::TexCoords(uvs)
    } else {
        VertexAttribute::None
    };
    Mesh::new(positions, attribute, None, Topology::Triangles)
}

/// Textured rectangle: center plus four corners, four indexed triangles.
///
/// `t` runs top to bottom so a decoded image (first row on top) shows upright.
pub fn quad(half_width: f32, half_height: f32) -> Result<Mesh, MeshError> {
    validate_radius(half_width)?;
    validate_radius(half_height)?;
    let (w, h) = (half_width, half_height);

    let positions = vec![
        0.0, 0.0, 0.0,
        w, h, 0.0,
        -w, h, 0.0,
        -w, -h, 0.0,
        w, -h, 0.0
    ];
    let uvs = vec![
        0.5, 0.5,
        1.0, 0.0,
        0.0, 0.0,
        0.0, 1.0,
        1.0, 1.0
    ];
    let indices = vec![0, 1, 2, 0, 2, 3, 0, 3, 4, 0, 4, 1];

    Mesh::new(positions, VertexAttribute::TexCoords(uvs), Some(indices), Topology::Triangles)
}
