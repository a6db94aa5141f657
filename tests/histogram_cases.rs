use hdr_image_histogram::{BufferRenderer, HistogramConfig, histogram, histogram_with_gpu};

fn solid_pixels(count: usize, rgb: [f32; 3]) -> Vec<f32> {
    let mut data = Vec::with_capacity(count * 4);
    for _ in 0..count {
        data.extend_from_slice(&[rgb[0], rgb[1], rgb[2], 1.0]);
    }
    data
}

#[test]
fn ramp_2x2_puts_one_pixel_in_each_bin() {
    let data: Vec<f32> = [0.0f32, 1.0, 2.0, 3.0]
        .iter()
        .flat_map(|&v| [v, v, v, 1.0])
        .collect();
    let renderer = BufferRenderer::new(2, 2, data).unwrap();
    let config = HistogramConfig {
        bins: 4,
        max_pixel_value: 3.0,
    };

    let result = histogram_with_gpu(&renderer, config, None).unwrap();
    assert_eq!(result.len(), 3);
    for channel in &result {
        assert_eq!(channel, &vec![1.0, 1.0, 1.0, 1.0]);
        assert_eq!(channel.iter().sum::<f32>(), 4.0);
    }
}

#[test]
fn all_black_10x10_lands_entirely_in_bin_zero() {
    let renderer = BufferRenderer::new(10, 10, solid_pixels(100, [0.0, 0.0, 0.0])).unwrap();
    let result = histogram_with_gpu(&renderer, HistogramConfig::default(), None).unwrap();

    assert_eq!(result.len(), 3);
    for channel in &result {
        assert_eq!(channel.len(), 256);
        assert_eq!(channel[0], 100.0);
        assert!(channel[1..].iter().all(|&c| c == 0.0));
    }
}

#[test]
fn super_max_red_pixel_clamps_into_last_bin() {
    let renderer = BufferRenderer::new(1, 1, solid_pixels(1, [20.0, 0.0, 0.0])).unwrap();
    let config = HistogramConfig {
        bins: 16,
        max_pixel_value: 16.0,
    };

    let result = histogram_with_gpu(&renderer, config, None).unwrap();
    assert_eq!(result[0][15], 1.0);
    assert!(result[0][..15].iter().all(|&c| c == 0.0));
    // Green and blue sit at zero intensity.
    assert_eq!(result[1][0], 1.0);
    assert_eq!(result[2][0], 1.0);
}

#[test]
fn negative_out_of_gamut_values_clamp_into_bin_zero() {
    let renderer = BufferRenderer::new(1, 1, solid_pixels(1, [-0.5, -4.0, 0.0])).unwrap();
    let config = HistogramConfig {
        bins: 8,
        max_pixel_value: 1.0,
    };

    let result = histogram_with_gpu(&renderer, config, None).unwrap();
    for channel in &result {
        assert_eq!(channel[0], 1.0);
    }
}

#[test]
fn zero_bins_returns_empty_list_not_three_empty_channels() {
    let renderer = BufferRenderer::new(4, 4, solid_pixels(16, [0.5, 0.5, 0.5])).unwrap();
    let config = HistogramConfig {
        bins: 0,
        max_pixel_value: 16.0,
    };

    let result = histogram_with_gpu(&renderer, config, None).unwrap();
    assert_eq!(result.len(), 0);
}

#[test]
fn empty_extent_returns_empty_list() {
    let renderer = BufferRenderer::new(0, 0, Vec::new()).unwrap();
    let result = histogram_with_gpu(&renderer, HistogramConfig::default(), None).unwrap();
    assert_eq!(result.len(), 0);
}

#[test]
fn public_entry_point_is_strategy_agnostic() {
    // Whichever strategy the capability probe picks, the counts must match
    // the CPU-only run bin for bin.
    let data: Vec<f32> = (0..64)
        .flat_map(|i| {
            let v = i as f32 / 4.0;
            [v, 8.0 - v, v * 2.0, 1.0]
        })
        .collect();
    let renderer = BufferRenderer::new(8, 8, data).unwrap();
    let config = HistogramConfig {
        bins: 32,
        max_pixel_value: 16.0,
    };

    let probed = histogram(&renderer, config).unwrap();
    let cpu_only = histogram_with_gpu(&renderer, config, None).unwrap();
    assert_eq!(probed, cpu_only);
}
