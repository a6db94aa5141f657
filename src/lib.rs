//! Per-channel RGB intensity histograms for HDR image buffers, with a wgpu
//! compute path and a CPU fallback that produce identical counts.

pub mod chart;
pub mod extent;
pub mod histogram;
pub mod renderer;

pub use chart::{ChartGeometry, HeadroomProvider, SdrDisplay, chart_geometry};
pub use extent::{Extent, RectF};
pub use histogram::{HistogramConfig, histogram, histogram_with_gpu};
pub use renderer::{BufferRenderer, ImageFileRenderer, Renderer};
