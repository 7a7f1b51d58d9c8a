//! wgpu stream provider.
//!
//! Arrays live in device-resident storage buffers; every kernel is one
//! compute dispatch followed by a blocking queue poll, so a kernel call
//! returns only after its writes are visible, so external wall-clock timing
//! measures execution rather than launch. Host and device data cross only at
//! `init_arrays` (an on-device fill dispatch) and `read_arrays` (a staged
//! copy through a mappable buffer).

use crate::error::WgpuStreamError;
use crate::shaders;
use rustream_common::{ExecutionTarget, KernelError, Result, StreamConfig, StreamError};
use rustream_kernels::StreamProvider;
use wgpu::util::DeviceExt;

const ELEM_SIZE: u64 = std::mem::size_of::<f32>() as u64;

#[repr(C)]
#[derive(Clone, Copy, bytemuck::Pod, bytemuck::Zeroable)]
struct KernelParams {
    n: u32,
    scalar: f32,
}

#[repr(C)]
#[derive(Clone, Copy, bytemuck::Pod, bytemuck::Zeroable)]
struct FillParams {
    n: u32,
    init_a: f32,
    init_b: f32,
    init_c: f32,
}

struct Pipelines {
    fill: wgpu::ComputePipeline,
    copy: wgpu::ComputePipeline,
    mul: wgpu::ComputePipeline,
    add: wgpu::ComputePipeline,
    triad: wgpu::ComputePipeline,
    nstream: wgpu::ComputePipeline,
    dot: wgpu::ComputePipeline,
}

/// Stream provider executing on a wgpu accelerator.
///
/// f32 only: WGSL compute shaders have no f64. Construction selects the
/// adapter named by `ExecutionTarget::Accelerator(index)` in enumeration
/// order (the same order `rustream-device-probe` reports).
pub struct WgpuStream {
    // Buffers and pipelines are declared before the device so they are
    // released while the device is still alive.
    a: wgpu::Buffer,
    b: wgpu::Buffer,
    c: wgpu::Buffer,
    partials: wgpu::Buffer,
    staging: wgpu::Buffer,
    partials_staging: wgpu::Buffer,
    fill_params: wgpu::Buffer,
    #[allow(dead_code)]
    kernel_params: wgpu::Buffer,
    bind_elementwise: wgpu::BindGroup,
    bind_fill: wgpu::BindGroup,
    bind_dot: wgpu::BindGroup,
    pipelines: Pipelines,
    device: wgpu::Device,
    queue: wgpu::Queue,
    array_size: usize,
    n: u32,
    elementwise_workgroups: u32,
}

impl WgpuStream {
    /// Set up the device, pipelines, and device-resident arrays.
    ///
    /// Allocate-only: no data is moved until `init_arrays`. Storage buffers
    /// start zero-initialised per the WebGPU contract.
    pub fn new(config: &StreamConfig) -> Result<Self> {
        let ExecutionTarget::Accelerator(index) = config.target else {
            return Err(StreamError::Device {
                reason: "wgpu stream requires an accelerator target".to_string(),
            });
        };
        Ok(pollster::block_on(Self::new_async(config, index))?)
    }

    async fn new_async(
        config: &StreamConfig,
        index: usize,
    ) -> std::result::Result<Self, WgpuStreamError> {
        let array_size = config.array_size;
        let n = u32::try_from(array_size)
            .map_err(|_| WgpuStreamError::UnsupportedArraySize { size: array_size })?;

        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            backends: wgpu::Backends::all(),
            ..Default::default()
        });
        let adapter = instance
            .enumerate_adapters(wgpu::Backends::all())
            .into_iter()
            .nth(index)
            .ok_or(WgpuStreamError::AdapterNotFound { index })?;

        let info = adapter.get_info();
        tracing::info!(
            adapter_name = %info.name,
            backend = ?info.backend,
            index,
            "wgpu adapter selected"
        );

        // wgpu rejects zero-sized buffers; keep one element of backing store
        // for the N = 0 case (kernels dispatch nothing and never touch it).
        let array_bytes = u64::from(n).max(1) * ELEM_SIZE;
        let staging_bytes = 3 * array_bytes;

        let limits = adapter.limits();
        if array_bytes > u64::from(limits.max_storage_buffer_binding_size) {
            return Err(WgpuStreamError::BufferTooLarge {
                requested: array_bytes,
                limit: u64::from(limits.max_storage_buffer_binding_size),
            });
        }
        if staging_bytes > limits.max_buffer_size {
            return Err(WgpuStreamError::BufferTooLarge {
                requested: staging_bytes,
                limit: limits.max_buffer_size,
            });
        }

        let (device, queue) = adapter
            .request_device(
                &wgpu::DeviceDescriptor {
                    label: Some("rustream_device"),
                    required_features: wgpu::Features::empty(),
                    required_limits: limits.clone(),
                    memory_hints: wgpu::MemoryHints::default(),
                },
                None,
            )
            .await?;

        let layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("rustream_bind_group_layout"),
            entries: &[
                storage_entry(0),
                storage_entry(1),
                storage_entry(2),
                wgpu::BindGroupLayoutEntry {
                    binding: 3,
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
            label: Some("rustream_pipeline_layout"),
            bind_group_layouts: &[&layout],
            push_constant_ranges: &[],
        });

        let pipelines = Pipelines {
            fill: compile(&device, &pipeline_layout, shaders::FILL_SRC, "fill"),
            copy: compile(&device, &pipeline_layout, shaders::COPY_SRC, "copy"),
            mul: compile(&device, &pipeline_layout, shaders::MUL_SRC, "mul"),
            add: compile(&device, &pipeline_layout, shaders::ADD_SRC, "add"),
            triad: compile(&device, &pipeline_layout, shaders::TRIAD_SRC, "triad"),
            nstream: compile(&device, &pipeline_layout, shaders::NSTREAM_SRC, "nstream"),
            dot: compile(&device, &pipeline_layout, shaders::DOT_SRC, "dot"),
        };

        let storage_buffer = |label: &str| {
            device.create_buffer(&wgpu::BufferDescriptor {
                label: Some(label),
                size: array_bytes,
                usage: wgpu::BufferUsages::STORAGE | wgpu::BufferUsages::COPY_SRC,
                mapped_at_creation: false,
            })
        };
        let a = storage_buffer("rustream_a");
        let b = storage_buffer("rustream_b");
        let c = storage_buffer("rustream_c");

        let partials_bytes = u64::from(shaders::DOT_WORKGROUPS) * ELEM_SIZE;
        let partials = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("rustream_dot_partials"),
            size: partials_bytes,
            usage: wgpu::BufferUsages::STORAGE | wgpu::BufferUsages::COPY_SRC,
            mapped_at_creation: false,
        });

        let staging = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("rustream_staging"),
            size: staging_bytes,
            usage: wgpu::BufferUsages::MAP_READ | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });
        let partials_staging = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("rustream_dot_staging"),
            size: partials_bytes,
            usage: wgpu::BufferUsages::MAP_READ | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        #[allow(clippy::cast_possible_truncation)]
        let kernel_params = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("rustream_kernel_params"),
            contents: bytemuck::bytes_of(&KernelParams { n, scalar: config.scalar as f32 }),
            usage: wgpu::BufferUsages::UNIFORM,
        });
        let fill_params = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("rustream_fill_params"),
            size: std::mem::size_of::<FillParams>() as u64,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        let bind = |label: &str, third: &wgpu::Buffer, params: &wgpu::Buffer| {
            device.create_bind_group(&wgpu::BindGroupDescriptor {
                label: Some(label),
                layout: &layout,
                entries: &[
                    wgpu::BindGroupEntry { binding: 0, resource: a.as_entire_binding() },
                    wgpu::BindGroupEntry { binding: 1, resource: b.as_entire_binding() },
                    wgpu::BindGroupEntry { binding: 2, resource: third.as_entire_binding() },
                    wgpu::BindGroupEntry { binding: 3, resource: params.as_entire_binding() },
                ],
            })
        };
        let bind_elementwise = bind("rustream_bind_elementwise", &c, &kernel_params);
        let bind_fill = bind("rustream_bind_fill", &c, &fill_params);
        let bind_dot = bind("rustream_bind_dot", &partials, &kernel_params);

        let elementwise_workgroups =
            n.div_ceil(shaders::WORKGROUP_SIZE).min(limits.max_compute_workgroups_per_dimension);

        Ok(Self {
            a,
            b,
            c,
            partials,
            staging,
            partials_staging,
            fill_params,
            kernel_params,
            bind_elementwise,
            bind_fill,
            bind_dot,
            pipelines,
            device,
            queue,
            array_size,
            n,
            elementwise_workgroups,
        })
    }

    /// Encode and submit one kernel dispatch, then block until it completes.
    ///
    /// The blocking poll is what makes a kernel call's return happen-after
    /// its writes are visible to any subsequent read.
    fn dispatch(&self, pipeline: &wgpu::ComputePipeline, bind_group: &wgpu::BindGroup, workgroups: u32) {
        let mut encoder = self.device.create_command_encoder(&wgpu::CommandEncoderDescriptor {
            label: Some("rustream_dispatch_encoder"),
        });
        {
            let mut pass = encoder.begin_compute_pass(&wgpu::ComputePassDescriptor {
                label: Some("rustream_compute_pass"),
                timestamp_writes: None,
            });
            pass.set_pipeline(pipeline);
            pass.set_bind_group(0, bind_group, &[]);
            pass.dispatch_workgroups(workgroups, 1, 1);
        }
        self.queue.submit(Some(encoder.finish()));
        self.device.poll(wgpu::Maintain::Wait);
    }

    /// Map a staging buffer and read back `bytes` worth of f32 data.
    fn read_staging(
        &self,
        buffer: &wgpu::Buffer,
        bytes: u64,
    ) -> std::result::Result<Vec<f32>, WgpuStreamError> {
        let slice = buffer.slice(0..bytes);
        let (sender, receiver) = std::sync::mpsc::channel();
        slice.map_async(wgpu::MapMode::Read, move |result| {
            let _ = sender.send(result);
        });
        self.device.poll(wgpu::Maintain::Wait);
        receiver.recv().map_err(|_| WgpuStreamError::MapInterrupted)??;

        let data = slice.get_mapped_range();
        let host: Vec<f32> = bytemuck::cast_slice(&data).to_vec();
        drop(data);
        buffer.unmap();
        Ok(host)
    }

    fn check_len(&self, len: usize) -> Result<()> {
        if len == self.array_size {
            Ok(())
        } else {
            Err(KernelError::ShapeMismatch { expected: self.array_size, got: len }.into())
        }
    }
}

impl StreamProvider<f32> for WgpuStream {
    fn name(&self) -> &'static str {
        "wgpu"
    }

    fn array_size(&self) -> usize {
        self.array_size
    }

    fn init_arrays(&mut self, init_a: f32, init_b: f32, init_c: f32) -> Result<()> {
        self.queue.write_buffer(
            &self.fill_params,
            0,
            bytemuck::bytes_of(&FillParams { n: self.n, init_a, init_b, init_c }),
        );
        self.dispatch(&self.pipelines.fill, &self.bind_fill, self.elementwise_workgroups);
        Ok(())
    }

    fn read_arrays(&self, a: &mut [f32], b: &mut [f32], c: &mut [f32]) -> Result<()> {
        self.check_len(a.len())?;
        self.check_len(b.len())?;
        self.check_len(c.len())?;

        let n = self.array_size;
        if n == 0 {
            return Ok(());
        }

        let bytes = n as u64 * ELEM_SIZE;
        let mut encoder = self.device.create_command_encoder(&wgpu::CommandEncoderDescriptor {
            label: Some("rustream_readback_encoder"),
        });
        encoder.copy_buffer_to_buffer(&self.a, 0, &self.staging, 0, bytes);
        encoder.copy_buffer_to_buffer(&self.b, 0, &self.staging, bytes, bytes);
        encoder.copy_buffer_to_buffer(&self.c, 0, &self.staging, 2 * bytes, bytes);
        self.queue.submit(Some(encoder.finish()));

        let host = self.read_staging(&self.staging, 3 * bytes)?;
        let (host_a, rest) = host.split_at(n);
        let (host_b, host_c) = rest.split_at(n);
        rayon::join(
            || a.copy_from_slice(host_a),
            || rayon::join(|| b.copy_from_slice(host_b), || c.copy_from_slice(host_c)),
        );
        Ok(())
    }

    fn copy(&mut self) -> Result<()> {
        self.dispatch(&self.pipelines.copy, &self.bind_elementwise, self.elementwise_workgroups);
        Ok(())
    }

    fn mul(&mut self) -> Result<()> {
        self.dispatch(&self.pipelines.mul, &self.bind_elementwise, self.elementwise_workgroups);
        Ok(())
    }

    fn add(&mut self) -> Result<()> {
        self.dispatch(&self.pipelines.add, &self.bind_elementwise, self.elementwise_workgroups);
        Ok(())
    }

    fn triad(&mut self) -> Result<()> {
        self.dispatch(&self.pipelines.triad, &self.bind_elementwise, self.elementwise_workgroups);
        Ok(())
    }

    fn nstream(&mut self) -> Result<()> {
        self.dispatch(&self.pipelines.nstream, &self.bind_elementwise, self.elementwise_workgroups);
        Ok(())
    }

    fn dot(&mut self) -> Result<f32> {
        self.dispatch(&self.pipelines.dot, &self.bind_dot, shaders::DOT_WORKGROUPS);

        let partials_bytes = u64::from(shaders::DOT_WORKGROUPS) * ELEM_SIZE;
        let mut encoder = self.device.create_command_encoder(&wgpu::CommandEncoderDescriptor {
            label: Some("rustream_dot_readback_encoder"),
        });
        encoder.copy_buffer_to_buffer(&self.partials, 0, &self.partials_staging, 0, partials_bytes);
        self.queue.submit(Some(encoder.finish()));

        let partials = self.read_staging(&self.partials_staging, partials_bytes)?;
        Ok(partials.iter().copied().sum())
    }
}

fn storage_entry(binding: u32) -> wgpu::BindGroupLayoutEntry {
    wgpu::BindGroupLayoutEntry {
        binding,
        visibility: wgpu::ShaderStages::COMPUTE,
        ty: wgpu::BindingType::Buffer {
            ty: wgpu::BufferBindingType::Storage { read_only: false },
            has_dynamic_offset: false,
            min_binding_size: None,
        },
        count: None,
    }
}

fn compile(
    device: &wgpu::Device,
    layout: &wgpu::PipelineLayout,
    source: &str,
    label: &str,
) -> wgpu::ComputePipeline {
    let module = device.create_shader_module(wgpu::ShaderModuleDescriptor {
        label: Some(label),
        source: wgpu::ShaderSource::Wgsl(source.into()),
    });
    device.create_compute_pipeline(&wgpu::ComputePipelineDescriptor {
        label: Some(label),
        layout: Some(layout),
        module: &module,
        entry_point: Some("main"),
        compilation_options: Default::default(),
        cache: None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn host_target_is_rejected() {
        let config = StreamConfig::new(16, ExecutionTarget::Host);
        let err = WgpuStream::new(&config).err().unwrap();
        assert!(matches!(err, StreamError::Device { .. }));
    }

    #[test]
    fn params_are_pod_with_expected_layout() {
        assert_eq!(std::mem::size_of::<KernelParams>(), 8);
        assert_eq!(std::mem::size_of::<FillParams>(), 16);
        let bytes = bytemuck::bytes_of(&FillParams { n: 2, init_a: 1.0, init_b: 2.0, init_c: 3.0 });
        assert_eq!(bytes.len(), 16);
    }
}
