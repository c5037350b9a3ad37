use std::io::Cursor;
use std::path::Path;

use image::io::Reader as ImageReader;

use crate::engine::errors::ResourceError;
use crate::engine::rendering::gl_api::GlApi;

/// RGBA8 pixels, first row on top.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedImage {
    width: u32,
    height: u32,
    rgba: Vec<u8>,
}

impl DecodedImage {
    pub fn new(width: u32, height: u32, rgba: Vec<u8>) -> Result<Self, ResourceError> {
        let expected = (width as usize) * (height as usize) * 4;
        if width == 0 || height == 0 || rgba.len() != expected {
            return Err(ResourceError::ImageSize { width, height, len: rgba.len() });
        }
        Ok(Self { width, height, rgba })
    }

    /// Single-color image, used as a placeholder until real frames arrive.
    pub fn solid(width: u32, height: u32, color: [u8; 4]) -> Result<Self, ResourceError> {
        let rgba = color
            .iter()
            .copied()
            .cycle()
            .take((width as usize) * (height as usize) * 4)
            .collect();
        Self::new(width, height, rgba)
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self, ResourceError> {
        let image = ImageReader::new(Cursor::new(bytes)).with_guessed_format()?.decode()?;
        log::debug!("[TEXTURE] decoded {:?} image", image.color());
        let rgba = image.to_rgba8();
        let (width, height) = rgba.dimensions();
        Self::new(width, height, rgba.into_raw())
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ResourceError> {
        let bytes = std::fs::read(path.as_ref())?;
        Self::from_bytes(&bytes)
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn aspect_ratio(&self) -> f32 {
        (self.width as f32) / (self.height as f32)
    }

    pub fn pixels(&self) -> &[u8] {
        &self.rgba
    }
}

/// A 2D texture plus the size it was last specified with.
pub struct Texture<G: GlApi> {
    handle: G::Texture,
    width: u32,
    height: u32,
}

impl<G: GlApi> Texture<G> {
    pub fn create(gl: &G, image: &DecodedImage) -> Result<Self, ResourceError> {
        let handle = gl.create_texture().map_err(ResourceError::Texture)?;
        gl.bind_texture_2d(0, Some(handle));
        gl.tex_image_rgba8(image.width, image.height, &image.rgba);
        gl.bind_texture_2d(0, None);
        log::debug!("[TEXTURE] created {}x{}", image.width, image.height);
        Ok(Self { handle, width: image.width, height: image.height })
    }

    /// Uploads a new frame. Storage is re-specified only when the size changes.
    pub fn update(&mut self, gl: &G, image: &DecodedImage) {
        gl.bind_texture_2d(0, Some(self.handle));
        if image.width != self.width || image.height != self.height {
            gl.tex_image_rgba8(image.width, image.height, &image.rgba);
            self.width = image.width;
            self.height = image.height;
        } else {
            gl.tex_sub_image_rgba8(image.width, image.height, &image.rgba);
        }
        gl.bind_texture_2d(0, None);
    }

    pub fn handle(&self) -> G::Texture {
        self.handle
    }

    pub fn size(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    pub fn release(self, gl: &G) {
        gl.delete_texture(self.handle);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::rendering::fake_gl::{ Call, FakeGl };

    #[test]
    fn rejects_short_pixel_buffer() {
        assert!(matches!(
            DecodedImage::new(2, 2, vec![0; 15]),
            Err(ResourceError::ImageSize { width: 2, height: 2, len: 15 })
        ));
        assert!(DecodedImage::new(0, 4, vec![]).is_err());
    }

    #[test]
    fn decodes_png_bytes() {
        let mut png = Vec::new();
        let source = image::RgbaImage::from_pixel(3, 2, image::Rgba([10, 20, 30, 255]));
        source.write_to(&mut Cursor::new(&mut png), image::ImageFormat::Png).unwrap();

        let decoded = DecodedImage::from_bytes(&png).unwrap();
        assert_eq!((decoded.width(), decoded.height()), (3, 2));
        assert_eq!(&decoded.pixels()[..4], &[10, 20, 30, 255]);
    }

    #[test]
    fn garbage_bytes_are_an_error() {
        assert!(DecodedImage::from_bytes(b"definitely not an image").is_err());
    }

    #[test]
    fn update_respecifies_only_on_resize() {
        let gl = FakeGl::new();
        let small = DecodedImage::solid(4, 4, [255; 4]).unwrap();
        let large = DecodedImage::solid(8, 4, [0; 4]).unwrap();

        let mut texture = Texture::create(&gl, &small).unwrap();
        texture.update(&gl, &small);
        texture.update(&gl, &large);
        texture.update(&gl, &large);

        assert_eq!(gl.count(|c| matches!(c, Call::TexImage(..))), 2);
        assert_eq!(gl.count(|c| matches!(c, Call::TexSubImage(..))), 2);
        assert_eq!(texture.size(), (8, 4));

        texture.release(&gl);
        assert_eq!(gl.live_textures(), 0);
    }
}
