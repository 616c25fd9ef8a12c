//! Texture decoding with color-space and orientation flags.

use std::path::Path;

use crate::error::AppError;

/// How texel values should be interpreted when sampled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ColorSpace {
    /// Values are sRGB-encoded; the GPU decodes to linear on sample.
    #[default]
    Srgb,
    /// Values are linear data.
    Linear,
}

/// Decode-time flags for a texture.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TextureOptions {
    /// Color space the texels are stored in.
    pub color_space: ColorSpace,
    /// Flip rows so the first row in memory is the bottom of the image.
    pub flip_y: bool,
}

impl Default for TextureOptions {
    fn default() -> Self {
        Self {
            color_space: ColorSpace::Srgb,
            flip_y: true,
        }
    }
}

impl TextureOptions {
    /// Flags for sprite textures whose texels are used as linear values.
    #[must_use]
    pub fn sprite() -> Self {
        Self {
            color_space: ColorSpace::Linear,
            flip_y: true,
        }
    }

    /// Flags for textures baked against glTF UVs (top-left origin).
    #[must_use]
    pub fn gltf_baked() -> Self {
        Self {
            color_space: ColorSpace::Srgb,
            flip_y: false,
        }
    }
}

/// Decoded RGBA8 texture ready for upload.
#[derive(Clone, PartialEq, Eq)]
pub struct TextureData {
    /// Width in texels.
    pub width: u32,
    /// Height in texels.
    pub height: u32,
    /// Tightly packed RGBA8 rows.
    pub rgba: Vec<u8>,
    /// Color space of `rgba`.
    pub color_space: ColorSpace,
}

impl std::fmt::Debug for TextureData {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TextureData")
            .field("width", &self.width)
            .field("height", &self.height)
            .field("bytes", &self.rgba.len())
            .field("color_space", &self.color_space)
            .finish()
    }
}

impl TextureData {
    /// 1x1 opaque white texel, bound while the real texture is loading.
    #[must_use]
    pub fn white() -> Self {
        Self {
            width: 1,
            height: 1,
            rgba: vec![255; 4],
            color_space: ColorSpace::Srgb,
        }
    }

    /// Bytes per row of `rgba`.
    #[must_use]
    pub fn bytes_per_row(&self) -> u32 {
        self.width * 4
    }
}

/// Decode an encoded image (PNG, JPEG, ...) into RGBA8.
pub fn decode_texture(
    bytes: &[u8],
    options: TextureOptions,
) -> Result<TextureData, AppError> {
    let mut rgba = image::load_from_memory(bytes)?.to_rgba8();
    if options.flip_y {
        image::imageops::flip_vertical_in_place(&mut rgba);
    }
    let (width, height) = rgba.dimensions();
    Ok(TextureData {
        width,
        height,
        rgba: rgba.into_raw(),
        color_space: options.color_space,
    })
}

/// Read and decode a texture file.
pub fn load_texture(
    path: &Path,
    options: TextureOptions,
) -> Result<TextureData, AppError> {
    let bytes = std::fs::read(path)?;
    decode_texture(&bytes, options)
}

#[cfg(test)]
mod tests {
    use super::*;

    /// 1x2 PNG: red top row, blue bottom row.
    fn two_row_png() -> Vec<u8> {
        let mut img = image::RgbaImage::new(1, 2);
        img.put_pixel(0, 0, image::Rgba([255, 0, 0, 255]));
        img.put_pixel(0, 1, image::Rgba([0, 0, 255, 255]));
        let mut bytes = Vec::new();
        img.write_to(
            &mut std::io::Cursor::new(&mut bytes),
            image::ImageFormat::Png,
        )
        .unwrap();
        bytes
    }

    #[test]
    fn decode_without_flip_keeps_row_order() {
        let tex =
            decode_texture(&two_row_png(), TextureOptions::gltf_baked())
                .unwrap();
        assert_eq!((tex.width, tex.height), (1, 2));
        assert_eq!(&tex.rgba[0..4], &[255, 0, 0, 255]);
        assert_eq!(tex.color_space, ColorSpace::Srgb);
    }

    #[test]
    fn default_flags_flip_rows() {
        let tex =
            decode_texture(&two_row_png(), TextureOptions::default()).unwrap();
        assert_eq!(&tex.rgba[0..4], &[0, 0, 255, 255]);
        assert_eq!(&tex.rgba[4..8], &[255, 0, 0, 255]);
    }

    #[test]
    fn sprite_flags_are_linear_and_flipped() {
        let tex =
            decode_texture(&two_row_png(), TextureOptions::sprite()).unwrap();
        assert_eq!(tex.color_space, ColorSpace::Linear);
        assert_eq!(&tex.rgba[0..4], &[0, 0, 255, 255]);
    }

    #[test]
    fn linear_flag_is_carried() {
        let tex = decode_texture(
            &two_row_png(),
            TextureOptions {
                color_space: ColorSpace::Linear,
                flip_y: false,
            },
        )
        .unwrap();
        assert_eq!(tex.color_space, ColorSpace::Linear);
        assert_eq!(tex.bytes_per_row(), 4);
    }

    #[test]
    fn garbage_bytes_fail_to_decode() {
        let err = decode_texture(b"not an image", TextureOptions::default())
            .unwrap_err();
        assert!(matches!(err, AppError::Texture(_)));
    }

    #[test]
    fn missing_file_is_io_error() {
        let err = load_texture(
            Path::new("definitely/not/here.png"),
            TextureOptions::default(),
        )
        .unwrap_err();
        assert!(matches!(err, AppError::Io(_)));
    }
}
