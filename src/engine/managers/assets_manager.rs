use std::collections::HashMap;
use std::path::{ Path, PathBuf };

use once_cell::sync::Lazy;
use serde::{ Deserialize, Serialize };

use crate::engine::components::texture::DecodedImage;
use crate::engine::errors::ResourceError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ShaderAsset {
    /// Per-vertex color, `u_Matrix`.
    Color,
    /// Uniform color with depth shading, `u_Matrix`.
    Solid,
    /// Textured quad, `u_Matrix`.
    Texture,
    /// Textured globe with separate projection/rotation/view/model uniforms.
    Earth,
    /// Inward-facing video dome, `uMVPMatrix`.
    VrDome,
    /// Vertical bars scaled by a `u_Amplitudes[64]` array.
    AudioBars,
}

/// Both stages of a program plus the names the draw code binds.
#[derive(Debug)]
pub struct ShaderSource {
    pub vertex: &'static str,
    pub fragment: &'static str,
    pub attributes: &'static [&'static str],
    pub uniforms: &'static [&'static str],
}

static SHADERS: Lazy<HashMap<ShaderAsset, ShaderSource>> = Lazy::new(|| {
    let mut shaders = HashMap::new();
    shaders.insert(ShaderAsset::Color, ShaderSource {
        vertex: include_str!("../../assets/shaders/color.vert"),
        fragment: include_str!("../../assets/shaders/color.frag"),
        attributes: &["vPosition", "aColor"],
        uniforms: &["u_Matrix"],
    });
    shaders.insert(ShaderAsset::Solid, ShaderSource {
        vertex: include_str!("../../assets/shaders/solid.vert"),
        fragment: include_str!("../../assets/shaders/solid.frag"),
        attributes: &["vPosition"],
        uniforms: &["u_Matrix", "u_Color"],
    });
    shaders.insert(ShaderAsset::Texture, ShaderSource {
        vertex: include_str!("../../assets/shaders/texture.vert"),
        fragment: include_str!("../../assets/shaders/texture.frag"),
        attributes: &["vPosition", "aTextureCoord"],
        uniforms: &["u_Matrix", "uTextureUnit"],
    });
    shaders.insert(ShaderAsset::Earth, ShaderSource {
        vertex: include_str!("../../assets/shaders/earth.vert"),
        fragment: include_str!("../../assets/shaders/earth.frag"),
        attributes: &["aPosition", "aCoordinate"],
        uniforms: &["uProjMatrix", "uRotateMatrix", "uViewMatrix", "uModelMatrix", "uTexture"],
    });
    shaders.insert(ShaderAsset::VrDome, ShaderSource {
        vertex: include_str!("../../assets/shaders/vr_dome.vert"),
        fragment: include_str!("../../assets/shaders/vr_dome.frag"),
        attributes: &["vPosition", "a_texCoord"],
        uniforms: &["uMVPMatrix", "s_texture"],
    });
    shaders.insert(ShaderAsset::AudioBars, ShaderSource {
        vertex: include_str!("../../assets/shaders/audio_bars.vert"),
        fragment: include_str!("../../assets/shaders/audio_bars.frag"),
        attributes: &["vPosition"],
        uniforms: &["u_Matrix", "u_Amplitudes", "u_Color"],
    });
    shaders
});

pub fn shader_source(asset: ShaderAsset) -> &'static ShaderSource {
    // every variant is inserted above
    &SHADERS[&asset]
}

/// Checkerboard stand-in used when no image file is configured.
pub fn placeholder_image(width: u32, height: u32, cell: u32) -> Result<DecodedImage, ResourceError> {
    let cell = cell.max(1);
    let mut rgba = Vec::with_capacity((width as usize) * (height as usize) * 4);
    for y in 0..height {
        for x in 0..width {
            let light = ((x / cell) + (y / cell)) % 2 == 0;
            let texel = if light { [230, 230, 230, 255] } else { [40, 90, 160, 255] };
            rgba.extend_from_slice(&texel);
        }
    }
    DecodedImage::new(width, height, rgba)
}

/// Decodes `path` when given, otherwise returns the checkerboard. A file that fails
/// to decode is logged and replaced by the checkerboard too.
pub fn load_image_or_placeholder(path: Option<&Path>) -> Result<DecodedImage, ResourceError> {
    if let Some(path) = path {
        match DecodedImage::from_file(path) {
            Ok(image) => {
                log::info!("[ASSETS] loaded {} ({}x{})", path.display(), image.width(), image.height());
                return Ok(image);
            }
            Err(e) => log::error!("[ASSETS] failed to load {}: {}", path.display(), e),
        }
    }
    placeholder_image(256, 128, 16)
}

fn is_image_file(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| matches!(ext.to_ascii_lowercase().as_str(), "png" | "jpg" | "jpeg"))
        .unwrap_or(false)
}

/// Image files in `dir`, sorted by name so numbered frames play in order.
pub fn frame_paths(dir: &Path) -> Result<Vec<PathBuf>, ResourceError> {
    let mut paths = Vec::new();
    for entry in std::fs::read_dir(dir)? {
        let path = entry?.path();
        if path.is_file() && is_image_file(&path) {
            paths.push(path);
        }
    }
    paths.sort();
    Ok(paths)
}
