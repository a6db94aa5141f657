//! CPU histogram strategy: a straight scan over the RGBA f32 buffer.

use super::binning::bin_index;

/// Compute per-channel histograms over a tightly packed RGBA f32 buffer.
///
/// Returns `[R, G, B]` count sequences of length `bins`. Counts are stored as
/// f32 for uniformity with the GPU readback; they are exact up to 2^24 pixels,
/// which bounds the image size this representation supports.
///
/// Callers are expected to have screened out `bins == 0` and empty buffers;
/// this function assumes `bins > 0`.
pub fn compute(buffer: &[f32], bins: u32, max_pixel_value: f32) -> Vec<Vec<f32>> {
    let mut counts = vec![vec![0.0f32; bins as usize]; 3];

    for pixel in buffer.chunks_exact(4) {
        // Alpha is ignored.
        for channel in 0..3 {
            let index = bin_index(pixel[channel], max_pixel_value, bins);
            counts[channel][index] += 1.0;
        }
    }

    counts
}
