use std::path::Path;

use anyhow::{Result, anyhow};

use crate::extent::{Extent, RectF};

/// Source of pixel data for histogram computation.
///
/// A renderer reports the real-valued extent of its image and renders any
/// integral sub-extent of it into a flat RGBA f32 buffer: row-major, tightly
/// packed, row stride `width * 16` bytes, values unclamped (HDR sources may
/// exceed 1.0, out-of-gamut values may be negative). No color-space
/// conversion is applied beyond the renderer's own working space.
pub trait Renderer {
    fn extent(&self) -> RectF;

    fn render(&self, extent: Extent) -> Result<Vec<f32>>;
}

/// A renderer over an in-memory RGBA f32 buffer, anchored at the origin.
pub struct BufferRenderer {
    width: u32,
    height: u32,
    data: Vec<f32>,
}

impl BufferRenderer {
    pub fn new(width: u32, height: u32, data: Vec<f32>) -> Result<Self> {
        let expected = width as usize * height as usize * 4;
        if data.len() != expected {
            return Err(anyhow!(
                "buffer length {} does not match {width}x{height} RGBA f32 (expected {expected})",
                data.len()
            ));
        }
        Ok(BufferRenderer {
            width,
            height,
            data,
        })
    }
}

impl Renderer for BufferRenderer {
    fn extent(&self) -> RectF {
        RectF::new(0.0, 0.0, self.width as f32, self.height as f32)
    }

    fn render(&self, extent: Extent) -> Result<Vec<f32>> {
        crop_rgba_f32(&self.data, self.width, self.height, extent)
    }
}

/// A renderer that decodes an image file into an RGBA f32 buffer.
///
/// Decoding happens once at construction. EXR input preserves HDR values;
/// LDR formats land in 0..1.
pub struct ImageFileRenderer {
    image: image::Rgba32FImage,
}

impl ImageFileRenderer {
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let image = image::open(path)
            .map_err(|e| anyhow!("failed to open image {}: {e}", path.display()))?
            .to_rgba32f();
        Ok(ImageFileRenderer { image })
    }
}

impl Renderer for ImageFileRenderer {
    fn extent(&self) -> RectF {
        RectF::new(
            0.0,
            0.0,
            self.image.width() as f32,
            self.image.height() as f32,
        )
    }

    fn render(&self, extent: Extent) -> Result<Vec<f32>> {
        crop_rgba_f32(
            self.image.as_raw(),
            self.image.width(),
            self.image.height(),
            extent,
        )
    }
}

/// Copy an integral sub-extent out of a tightly packed RGBA f32 buffer.
fn crop_rgba_f32(data: &[f32], width: u32, height: u32, extent: Extent) -> Result<Vec<f32>> {
    if extent.is_empty() {
        return Ok(Vec::new());
    }
    if extent.x < 0
        || extent.y < 0
        || extent.x as u64 + u64::from(extent.width) > u64::from(width)
        || extent.y as u64 + u64::from(extent.height) > u64::from(height)
    {
        return Err(anyhow!(
            "extent {extent:?} outside {width}x{height} source image"
        ));
    }

    if extent.x == 0 && extent.y == 0 && extent.width == width && extent.height == height {
        return Ok(data.to_vec());
    }

    let row_len = extent.width as usize * 4;
    let mut out = Vec::with_capacity(extent.height as usize * row_len);
    for row in 0..extent.height as usize {
        let src_row = extent.y as usize + row;
        let start = (src_row * width as usize + extent.x as usize) * 4;
        out.extend_from_slice(&data[start..start + row_len]);
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ramp_image(width: u32, height: u32) -> Vec<f32> {
        let mut data = Vec::new();
        for i in 0..width * height {
            let v = i as f32;
            data.extend_from_slice(&[v, v + 0.25, v + 0.5, 1.0]);
        }
        data
    }

    #[test]
    fn buffer_renderer_full_extent_returns_whole_buffer() {
        let data = ramp_image(3, 2);
        let renderer = BufferRenderer::new(3, 2, data.clone()).unwrap();
        let extent = Extent::integral(renderer.extent());
        assert_eq!(renderer.render(extent).unwrap(), data);
    }

    #[test]
    fn buffer_renderer_crops_sub_extent_row_major() {
        let renderer = BufferRenderer::new(3, 2, ramp_image(3, 2)).unwrap();
        let out = renderer.render(Extent::new(1, 1, 2, 1)).unwrap();
        // Pixels 4 and 5 of the ramp.
        assert_eq!(out[0], 4.0);
        assert_eq!(out[4], 5.0);
        assert_eq!(out.len(), 8);
    }

    #[test]
    fn buffer_renderer_rejects_out_of_bounds_extent() {
        let renderer = BufferRenderer::new(2, 2, ramp_image(2, 2)).unwrap();
        assert!(renderer.render(Extent::new(1, 0, 2, 2)).is_err());
        assert!(renderer.render(Extent::new(-1, 0, 1, 1)).is_err());
    }

    #[test]
    fn buffer_renderer_rejects_mismatched_length() {
        assert!(BufferRenderer::new(2, 2, vec![0.0; 15]).is_err());
    }
}
