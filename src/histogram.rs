//! Per-channel RGB histogram engine.
//!
//! One public entry point, two interchangeable strategies behind it: a wgpu
//! compute kernel and a plain CPU scan. Strategy choice is a per-call
//! capability probe; any GPU failure at any stage falls back to the CPU scan
//! over the same buffer, so callers only ever see a populated result or the
//! degenerate empty one.

pub mod binning;
pub mod cpu;
pub mod gpu;

use anyhow::Result;

use crate::extent::Extent;
use crate::renderer::Renderer;

/// Histogram parameters.
///
/// `max_pixel_value` is the intensity mapped to the last bin. 1.0 suits
/// standard-range content; the default of 16.0 leaves room for HDR sources.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HistogramConfig {
    pub bins: u32,
    pub max_pixel_value: f32,
}

impl Default for HistogramConfig {
    fn default() -> Self {
        HistogramConfig {
            bins: 256,
            max_pixel_value: 16.0,
        }
    }
}

/// One histogram backend.
///
/// Strategies are tried in order; the first success wins. The CPU strategy
/// never fails for capability reasons, which guarantees the list terminates
/// with a result.
trait HistogramStrategy {
    fn name(&self) -> &'static str;

    fn compute(
        &self,
        buffer: &[f32],
        extent: Extent,
        config: HistogramConfig,
    ) -> Result<Vec<Vec<f32>>>;
}

struct GpuStrategy<'a> {
    ctx: &'a gpu::GpuContext,
}

impl HistogramStrategy for GpuStrategy<'_> {
    fn name(&self) -> &'static str {
        "gpu"
    }

    fn compute(
        &self,
        buffer: &[f32],
        extent: Extent,
        config: HistogramConfig,
    ) -> Result<Vec<Vec<f32>>> {
        gpu::compute(self.ctx, buffer, extent, config.bins, config.max_pixel_value)
    }
}

struct CpuStrategy;

impl HistogramStrategy for CpuStrategy {
    fn name(&self) -> &'static str {
        "cpu"
    }

    fn compute(
        &self,
        buffer: &[f32],
        _extent: Extent,
        config: HistogramConfig,
    ) -> Result<Vec<Vec<f32>>> {
        Ok(cpu::compute(buffer, config.bins, config.max_pixel_value))
    }
}

/// Compute `[R, G, B]` histograms for the renderer's full extent.
///
/// Returns an empty `Vec` (not three empty channels) when the integral
/// extent is empty or `bins == 0`; neither is an error. Renderer failures
/// propagate. GPU availability is probed per call; see
/// [`histogram_with_gpu`] to amortize the probe across calls.
///
/// Counts come back as whole-number f32 and are exact up to 2^24 pixels.
pub fn histogram(renderer: &dyn Renderer, config: HistogramConfig) -> Result<Vec<Vec<f32>>> {
    let gpu = gpu::GpuContext::acquire().ok();
    histogram_with_gpu(renderer, config, gpu.as_ref())
}

/// Like [`histogram`], but with an explicit GPU context.
///
/// `None` skips the GPU path entirely. A context acquired once can serve many
/// calls; each call still submits and blocks independently.
pub fn histogram_with_gpu(
    renderer: &dyn Renderer,
    config: HistogramConfig,
    gpu: Option<&gpu::GpuContext>,
) -> Result<Vec<Vec<f32>>> {
    let extent = Extent::integral(renderer.extent());
    if extent.is_empty() || config.bins == 0 {
        return Ok(Vec::new());
    }

    let buffer = renderer.render(extent)?;

    let gpu_strategy = gpu.map(|ctx| GpuStrategy { ctx });
    let cpu_strategy = CpuStrategy;
    let mut strategies: Vec<&dyn HistogramStrategy> = Vec::new();
    if let Some(s) = gpu_strategy.as_ref() {
        strategies.push(s);
    }
    strategies.push(&cpu_strategy);

    let last = strategies.len() - 1;
    for (i, strategy) in strategies.iter().enumerate() {
        match strategy.compute(&buffer, extent, config) {
            Ok(counts) => return Ok(counts),
            Err(e) if i < last => {
                eprintln!(
                    "[histogram] {} path failed, falling back: {e}",
                    strategy.name()
                );
            }
            Err(e) => return Err(e),
        }
    }

    // The list always ends with the CPU strategy, which only fails fatally.
    Err(anyhow::anyhow!("no histogram strategy produced a result"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::renderer::BufferRenderer;

    #[test]
    fn zero_bins_yields_empty_result() {
        let renderer = BufferRenderer::new(2, 2, vec![0.0; 16]).unwrap();
        let config = HistogramConfig {
            bins: 0,
            max_pixel_value: 16.0,
        };
        let result = histogram_with_gpu(&renderer, config, None).unwrap();
        assert!(result.is_empty());
    }

    #[test]
    fn empty_extent_yields_empty_result() {
        let renderer = BufferRenderer::new(0, 4, Vec::new()).unwrap();
        let result = histogram_with_gpu(&renderer, HistogramConfig::default(), None).unwrap();
        assert!(result.is_empty());
    }

    #[test]
    fn default_config_is_256_bins_hdr_range() {
        let config = HistogramConfig::default();
        assert_eq!(config.bins, 256);
        assert_eq!(config.max_pixel_value, 16.0);
    }
}
