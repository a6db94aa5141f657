use hdr_image_histogram::histogram::binning::bin_index;
use hdr_image_histogram::histogram::cpu;
use proptest::prelude::*;

proptest! {
    #[test]
    fn every_pixel_lands_in_exactly_one_bin_per_channel(
        pixels in prop::collection::vec(
            [-4.0f32..40.0, -4.0f32..40.0, -4.0f32..40.0, 0.0f32..1.0],
            0..256,
        ),
        bins in 1u32..300,
        max_pixel_value in 0.1f32..32.0,
    ) {
        let buffer: Vec<f32> = pixels.iter().flatten().copied().collect();
        let counts = cpu::compute(&buffer, bins, max_pixel_value);

        prop_assert_eq!(counts.len(), 3);
        for channel in &counts {
            prop_assert_eq!(channel.len(), bins as usize);
            prop_assert_eq!(channel.iter().sum::<f32>(), pixels.len() as f32);
            for &count in channel {
                prop_assert!(count >= 0.0);
                prop_assert_eq!(count.fract(), 0.0);
            }
        }
    }

    #[test]
    fn bin_index_stays_in_range(
        v in -1000.0f32..1000.0,
        bins in 1u32..4096,
        max_pixel_value in 0.001f32..256.0,
    ) {
        let index = bin_index(v, max_pixel_value, bins);
        prop_assert!(index < bins as usize);
    }

    #[test]
    fn max_value_always_maps_to_last_bin(
        bins in 1u32..4096,
        max_pixel_value in 0.001f32..256.0,
    ) {
        prop_assert_eq!(
            bin_index(max_pixel_value, max_pixel_value, bins),
            (bins - 1) as usize
        );
    }
}
