//! GPU histogram strategy: upload the rendered extent as an `Rgba32Float`
//! texture, bin it with a compute kernel, read the packed counts back.
//!
//! Every fallible step returns `Err` so the selector can drop to the CPU
//! strategy; nothing here reaches the public caller as an error.

use anyhow::{Result, anyhow};
use wgpu::util::DeviceExt;

use super::binning::bin_factor;
use crate::extent::Extent;

const WORKGROUP_SIZE: u32 = 16;

const COMPUTE_SHADER_SRC: &str = r#"
struct Params {
    size: vec2<u32>,
    bins: u32,
    bin_factor: f32,
    max_pixel_value: f32,
    _pad0: u32,
    _pad1: u32,
    _pad2: u32,
};

@group(0) @binding(0)
var source_tex: texture_2d<f32>;

@group(0) @binding(1)
var<storage, read_write> histogram: array<atomic<u32>>;

@group(0) @binding(2)
var<uniform> params: Params;

// Mirrors the shared CPU mapping exactly: explicit branch for values at or
// above the maximum, then clamp-at-zero, multiply, truncate.
fn channel_bin(v: f32) -> u32 {
    let last = params.bins - 1u;
    if (v >= params.max_pixel_value) {
        return last;
    }
    return min(u32(max(v, 0.0) * params.bin_factor), last);
}

@compute @workgroup_size(16, 16, 1)
fn main(@builtin(global_invocation_id) gid: vec3<u32>) {
    if (gid.x >= params.size.x || gid.y >= params.size.y) {
        return;
    }

    let rgba = textureLoad(source_tex, vec2<i32>(gid.xy), 0);

    atomicAdd(&histogram[channel_bin(rgba.r)], 1u);
    atomicAdd(&histogram[params.bins + channel_bin(rgba.g)], 1u);
    atomicAdd(&histogram[2u * params.bins + channel_bin(rgba.b)], 1u);
}
"#;

#[repr(C)]
#[derive(Clone, Copy, bytemuck::Pod, bytemuck::Zeroable)]
struct Params {
    size: [u32; 2],
    bins: u32,
    bin_factor: f32,
    max_pixel_value: f32,
    _pad: [u32; 3],
}

/// A device/queue pair for histogram dispatch.
///
/// Acquisition is the capability probe: if no adapter or device can be
/// obtained, the constructor fails and the caller stays on the CPU path.
/// The pair is safe to reuse across calls; each call submits one command
/// buffer and blocks until readback completes, so callers wanting
/// overlapping requests should use separate contexts.
pub struct GpuContext {
    device: wgpu::Device,
    queue: wgpu::Queue,
}

impl GpuContext {
    pub fn acquire() -> Result<Self> {
        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor::default());
        let adapter = pollster::block_on(instance.request_adapter(&wgpu::RequestAdapterOptions {
            power_preference: wgpu::PowerPreference::HighPerformance,
            compatible_surface: None,
            force_fallback_adapter: false,
        }))
        .map_err(|e| anyhow!("no suitable gpu adapter: {e}"))?;

        let (device, queue) = pollster::block_on(adapter.request_device(&wgpu::DeviceDescriptor {
            label: Some("sys.histogram.device"),
            required_features: wgpu::Features::empty(),
            required_limits: wgpu::Limits::default(),
            memory_hints: wgpu::MemoryHints::default(),
            trace: wgpu::Trace::default(),
            experimental_features: wgpu::ExperimentalFeatures::disabled(),
        }))
        .map_err(|e| anyhow!("failed to acquire gpu device: {e}"))?;

        Ok(GpuContext { device, queue })
    }

    /// Reject inputs the device cannot represent before allocating anything.
    fn check_limits(&self, extent: Extent, bins: u32) -> Result<()> {
        let limits = self.device.limits();
        if extent.width > limits.max_texture_dimension_2d
            || extent.height > limits.max_texture_dimension_2d
        {
            return Err(anyhow!(
                "extent {}x{} exceeds max texture dimension {}",
                extent.width,
                extent.height,
                limits.max_texture_dimension_2d
            ));
        }
        let counts_bytes = u64::from(bins) * 3 * std::mem::size_of::<u32>() as u64;
        if counts_bytes > u64::from(limits.max_storage_buffer_binding_size) {
            return Err(anyhow!(
                "{bins} bins need {counts_bytes} bytes of storage, limit is {}",
                limits.max_storage_buffer_binding_size
            ));
        }
        Ok(())
    }
}

/// Run the histogram kernel over an already-rendered RGBA f32 buffer.
///
/// The buffer is uploaded into an `Rgba32Float` texture covering the extent,
/// so the kernel reads exactly the f32 values the CPU strategy would scan.
/// The precomputed bin factor is passed to the kernel unchanged, which keeps
/// the two strategies classifying every value identically.
pub fn compute(
    ctx: &GpuContext,
    buffer: &[f32],
    extent: Extent,
    bins: u32,
    max_pixel_value: f32,
) -> Result<Vec<Vec<f32>>> {
    ctx.check_limits(extent, bins)?;

    let expected = extent.pixel_count() as usize * 4;
    if buffer.len() != expected {
        return Err(anyhow!(
            "buffer length {} does not match extent {extent:?} (expected {expected})",
            buffer.len()
        ));
    }

    let device = &ctx.device;
    let queue = &ctx.queue;

    let texture = device.create_texture(&wgpu::TextureDescriptor {
        label: Some("sys.histogram.source"),
        size: wgpu::Extent3d {
            width: extent.width,
            height: extent.height,
            depth_or_array_layers: 1,
        },
        mip_level_count: 1,
        sample_count: 1,
        dimension: wgpu::TextureDimension::D2,
        format: wgpu::TextureFormat::Rgba32Float,
        usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
        view_formats: &[],
    });

    queue.write_texture(
        wgpu::TexelCopyTextureInfo {
            texture: &texture,
            mip_level: 0,
            origin: wgpu::Origin3d::ZERO,
            aspect: wgpu::TextureAspect::All,
        },
        bytemuck::cast_slice(buffer),
        wgpu::TexelCopyBufferLayout {
            offset: 0,
            bytes_per_row: Some(extent.width * 16),
            rows_per_image: Some(extent.height),
        },
        wgpu::Extent3d {
            width: extent.width,
            height: extent.height,
            depth_or_array_layers: 1,
        },
    );

    let texture_view = texture.create_view(&wgpu::TextureViewDescriptor::default());

    let counts_bytes = u64::from(bins) * 3 * std::mem::size_of::<u32>() as u64;

    // Freshly created, so zero-initialized.
    let counts_buffer = device.create_buffer(&wgpu::BufferDescriptor {
        label: Some("sys.histogram.counts"),
        size: counts_bytes,
        usage: wgpu::BufferUsages::STORAGE | wgpu::BufferUsages::COPY_SRC,
        mapped_at_creation: false,
    });

    let readback_buffer = device.create_buffer(&wgpu::BufferDescriptor {
        label: Some("sys.histogram.counts.readback"),
        size: counts_bytes,
        usage: wgpu::BufferUsages::MAP_READ | wgpu::BufferUsages::COPY_DST,
        mapped_at_creation: false,
    });

    let params = Params {
        size: [extent.width, extent.height],
        bins,
        bin_factor: bin_factor(bins, max_pixel_value),
        max_pixel_value,
        _pad: [0; 3],
    };
    let params_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
        label: Some("sys.histogram.params"),
        contents: bytemuck::bytes_of(&params),
        usage: wgpu::BufferUsages::UNIFORM,
    });

    let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
        label: Some("sys.histogram.compute"),
        source: wgpu::ShaderSource::Wgsl(COMPUTE_SHADER_SRC.into()),
    });

    let bind_group_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
        label: Some("sys.histogram.bgl"),
        entries: &[
            wgpu::BindGroupLayoutEntry {
                binding: 0,
                visibility: wgpu::ShaderStages::COMPUTE,
                ty: wgpu::BindingType::Texture {
                    sample_type: wgpu::TextureSampleType::Float { filterable: false },
                    view_dimension: wgpu::TextureViewDimension::D2,
                    multisampled: false,
                },
                count: None,
            },
            wgpu::BindGroupLayoutEntry {
                binding: 1,
                visibility: wgpu::ShaderStages::COMPUTE,
                ty: wgpu::BindingType::Buffer {
                    ty: wgpu::BufferBindingType::Storage { read_only: false },
                    has_dynamic_offset: false,
                    min_binding_size: None,
                },
                count: None,
            },
            wgpu::BindGroupLayoutEntry {
                binding: 2,
                visibility: wgpu::ShaderStages::COMPUTE,
                ty: wgpu::BindingType::Buffer {
                    ty: wgpu::BufferBindingType::Uniform,
                    has_dynamic_offset: false,
                    min_binding_size: None,
                },
                count: None,
            },
        ],
    });

    let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
        label: Some("sys.histogram.layout"),
        bind_group_layouts: &[&bind_group_layout],
        push_constant_ranges: &[],
    });

    let pipeline = device.create_compute_pipeline(&wgpu::ComputePipelineDescriptor {
        label: Some("sys.histogram.pipeline"),
        layout: Some(&pipeline_layout),
        module: &shader,
        entry_point: Some("main"),
        compilation_options: Default::default(),
        cache: None,
    });

    let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
        label: Some("sys.histogram.bg"),
        layout: &bind_group_layout,
        entries: &[
            wgpu::BindGroupEntry {
                binding: 0,
                resource: wgpu::BindingResource::TextureView(&texture_view),
            },
            wgpu::BindGroupEntry {
                binding: 1,
                resource: wgpu::BindingResource::Buffer(wgpu::BufferBinding {
                    buffer: &counts_buffer,
                    offset: 0,
                    size: None,
                }),
            },
            wgpu::BindGroupEntry {
                binding: 2,
                resource: wgpu::BindingResource::Buffer(wgpu::BufferBinding {
                    buffer: &params_buffer,
                    offset: 0,
                    size: None,
                }),
            },
        ],
    });

    let mut encoder = device.create_command_encoder(&wgpu::CommandEncoderDescriptor {
        label: Some("sys.histogram.encoder"),
    });

    {
        let mut cpass = encoder.begin_compute_pass(&wgpu::ComputePassDescriptor {
            label: Some("sys.histogram.pass"),
            timestamp_writes: None,
        });
        cpass.set_pipeline(&pipeline);
        cpass.set_bind_group(0, &bind_group, &[]);
        cpass.dispatch_workgroups(
            extent.width.div_ceil(WORKGROUP_SIZE),
            extent.height.div_ceil(WORKGROUP_SIZE),
            1,
        );
    }

    encoder.copy_buffer_to_buffer(&counts_buffer, 0, &readback_buffer, 0, counts_bytes);

    queue.submit(std::iter::once(encoder.finish()));

    let bytes = map_readback_buffer(device, &readback_buffer, counts_bytes)?;
    let words: &[u32] = bytemuck::cast_slice(&bytes);

    Ok(words
        .chunks_exact(bins as usize)
        .map(|run| run.iter().map(|&c| c as f32).collect())
        .collect())
}

/// Block until the readback buffer is mapped and copy its contents out.
fn map_readback_buffer(device: &wgpu::Device, buffer: &wgpu::Buffer, size: u64) -> Result<Vec<u8>> {
    let slice = buffer.slice(0..size);
    let (tx, rx) = std::sync::mpsc::channel();
    slice.map_async(wgpu::MapMode::Read, move |result| {
        let _ = tx.send(result);
    });

    device
        .poll(wgpu::PollType::wait_indefinitely())
        .map_err(|e| anyhow!("device poll failed during readback: {e:?}"))?;

    match rx.try_recv() {
        Ok(Ok(())) => {}
        Ok(Err(e)) => {
            buffer.unmap();
            return Err(anyhow!("readback map failed: {e}"));
        }
        Err(_) => {
            buffer.unmap();
            return Err(anyhow!("readback map callback never fired"));
        }
    }

    let mapped = slice.get_mapped_range();
    let bytes = mapped.to_vec();
    drop(mapped);
    buffer.unmap();
    Ok(bytes)
}
