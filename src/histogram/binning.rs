//! Shared bin-index mapping.
//!
//! Both strategies must classify every value identically, so the scale factor
//! is computed once here and handed to the CPU scan and the GPU kernel
//! unchanged. The GPU kernel performs the same clamp, multiply, truncate
//! sequence in f32.

/// Scale factor mapping a clamped channel value to a bin index.
///
/// `bins == 1` yields 0.0, which sends every value to bin 0.
pub fn bin_factor(bins: u32, max_pixel_value: f32) -> f32 {
    (bins - 1) as f32 / max_pixel_value
}

/// Map a raw channel value to a bin index in `[0, bins - 1]`.
///
/// Values are clamped to `[0, max_pixel_value]` first, so negative and
/// super-max HDR values land in the first and last bin rather than being
/// dropped. The upper boundary takes an explicit branch: `max * (bins-1)/max`
/// can round just below `bins - 1` in f32, and a value exactly at the maximum
/// must not fall into the second-to-last bin. The GPU kernel carries the same
/// branch.
pub fn bin_index(v: f32, max_pixel_value: f32, bins: u32) -> usize {
    let last = bins - 1;
    if v >= max_pixel_value {
        return last as usize;
    }
    let index = (v.max(0.0) * bin_factor(bins, max_pixel_value)) as u32;
    index.min(last) as usize
}
