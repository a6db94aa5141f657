//! Backend-agnostic chart geometry for a histogram result.
//!
//! Consumers draw the returned polylines and indicator rect with whatever
//! backend they have; nothing here touches a device or a canvas. Display
//! dynamic-range capability comes in through [`HeadroomProvider`] so the
//! engine itself stays free of platform queries.

use crate::extent::RectF;

/// Read-only display capability queries.
///
/// `potential_headroom` is how far above standard range the display could
/// go; `current_headroom` is where it is right now. Both are 1.0 on an SDR
/// display.
pub trait HeadroomProvider {
    fn potential_headroom(&self) -> f32;

    fn current_headroom(&self) -> f32;
}

/// A plain standard-range display.
pub struct SdrDisplay;

impl HeadroomProvider for SdrDisplay {
    fn potential_headroom(&self) -> f32 {
        1.0
    }

    fn current_headroom(&self) -> f32 {
        1.0
    }
}

/// Default channel colors, RGBA in 0..1: red, green, blue.
pub const DEFAULT_CHANNEL_COLORS: [[f32; 4]; 3] = [
    [1.0, 0.0, 0.0, 1.0],
    [0.0, 1.0, 0.0, 1.0],
    [0.0, 0.0, 1.0, 1.0],
];

/// One channel's polyline. Points are in the bounds' coordinate space with y
/// growing upward from the bottom edge.
#[derive(Debug, Clone, PartialEq)]
pub struct ChannelStroke {
    pub color: [f32; 4],
    pub points: Vec<[f32; 2]>,
}

/// The dynamic-range indicator drawn over the right side of the chart.
#[derive(Debug, Clone, PartialEq)]
pub struct HeadroomIndicator {
    pub rect: RectF,
    pub color: [f32; 4],
}

#[derive(Debug, Clone, PartialEq)]
pub struct ChartGeometry {
    pub strokes: Vec<ChannelStroke>,
    pub stroke_width: f32,
    pub headroom: HeadroomIndicator,
}

/// Lay out a histogram as line-chart geometry within `bounds`.
///
/// Each channel is normalized to its own peak, so channels with very
/// different totals remain comparable in shape. Channels beyond the supplied
/// colors are skipped; an empty histogram yields no strokes but still
/// carries the headroom indicator.
pub fn chart_geometry(
    histogram: &[Vec<f32>],
    colors: &[[f32; 4]],
    bounds: RectF,
    display: &dyn HeadroomProvider,
) -> ChartGeometry {
    let bins = histogram.first().map_or(0, |c| c.len());
    let stroke_width = if bins > 0 {
        (bounds.width / bins as f32).max(1.0)
    } else {
        1.0
    };

    let mut strokes = Vec::new();
    for (channel, counts) in histogram.iter().enumerate() {
        let Some(&color) = colors.get(channel) else {
            break;
        };
        if counts.is_empty() {
            continue;
        }

        let max_count = counts.iter().cloned().fold(0.0f32, f32::max).max(1.0);
        let x_step = bounds.width / counts.len() as f32;

        let mut points = Vec::with_capacity(counts.len() + 1);
        for (i, &count) in counts.iter().enumerate() {
            let x = bounds.x + i as f32 * x_step + x_step / 2.0;
            let y = bounds.y + count / max_count * bounds.height;
            if i == 0 {
                // Anchor the line at the baseline before the first bin.
                points.push([x, bounds.y]);
            }
            points.push([x, y]);
        }
        strokes.push(ChannelStroke { color, points });
    }

    ChartGeometry {
        strokes,
        stroke_width,
        headroom: headroom_indicator(bounds, display),
    }
}

/// Indicator over the right half: a red wash when the display has no EDR
/// headroom at all, otherwise a white band whose width shrinks as the
/// current headroom grows (clamped to 1..8).
fn headroom_indicator(bounds: RectF, display: &dyn HeadroomProvider) -> HeadroomIndicator {
    let half_width = bounds.width / 2.0;
    if display.potential_headroom() <= 1.0 {
        return HeadroomIndicator {
            rect: RectF::new(bounds.x + half_width, bounds.y, half_width, bounds.height),
            color: [1.0, 0.0, 0.0, 0.5],
        };
    }

    let normalized = display.current_headroom().clamp(1.0, 8.0);
    let width = half_width / normalized;
    HeadroomIndicator {
        rect: RectF::new(
            bounds.x + bounds.width - width,
            bounds.y,
            width,
            bounds.height,
        ),
        color: [1.0, 1.0, 1.0, 0.5],
    }
}
