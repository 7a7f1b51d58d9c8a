//! WGSL compute shader sources for the stream kernels.
//!
//! One module per kernel, each with a single `main` entry point at a
//! workgroup size of 256. Elementwise kernels use a grid-stride loop so a
//! bounded dispatch covers any array length; the dot kernel reduces into one
//! partial sum per workgroup via shared memory, and the host sums the
//! partials.
//!
//! Binding convention: `A`, `B`, `C` sit at bindings 0..2 (the dot kernel
//! replaces binding 2 with its partial-sums buffer) and the parameter
//! uniform at binding 3. All storage bindings are `read_write` so every
//! kernel shares one bind group layout.

/// Number of invocations per workgroup, shared by all kernels.
pub const WORKGROUP_SIZE: u32 = 256;

/// Number of workgroups (and partial sums) used by the dot reduction.
pub const DOT_WORKGROUPS: u32 = 256;

/// Uniform fill: `A[i] = init_a; B[i] = init_b; C[i] = init_c`.
pub const FILL_SRC: &str = r"
struct FillParams {
    n: u32,
    init_a: f32,
    init_b: f32,
    init_c: f32,
}

@group(0) @binding(0) var<storage, read_write> a: array<f32>;
@group(0) @binding(1) var<storage, read_write> b: array<f32>;
@group(0) @binding(2) var<storage, read_write> c: array<f32>;
@group(0) @binding(3) var<uniform> params: FillParams;

@compute @workgroup_size(256, 1, 1)
fn main(
    @builtin(global_invocation_id) gid: vec3<u32>,
    @builtin(num_workgroups) nwg: vec3<u32>,
) {
    var i = gid.x;
    let stride = nwg.x * 256u;
    while i < params.n {
        a[i] = params.init_a;
        b[i] = params.init_b;
        c[i] = params.init_c;
        i = i + stride;
    }
}
";

/// `C[i] = A[i]`
pub const COPY_SRC: &str = r"
struct KernelParams {
    n: u32,
    scalar: f32,
}

@group(0) @binding(0) var<storage, read_write> a: array<f32>;
@group(0) @binding(2) var<storage, read_write> c: array<f32>;
@group(0) @binding(3) var<uniform> params: KernelParams;

@compute @workgroup_size(256, 1, 1)
fn main(
    @builtin(global_invocation_id) gid: vec3<u32>,
    @builtin(num_workgroups) nwg: vec3<u32>,
) {
    var i = gid.x;
    let stride = nwg.x * 256u;
    while i < params.n {
        c[i] = a[i];
        i = i + stride;
    }
}
";

/// `B[i] = scalar * C[i]`
pub const MUL_SRC: &str = r"
struct KernelParams {
    n: u32,
    scalar: f32,
}

@group(0) @binding(1) var<storage, read_write> b: array<f32>;
@group(0) @binding(2) var<storage, read_write> c: array<f32>;
@group(0) @binding(3) var<uniform> params: KernelParams;

@compute @workgroup_size(256, 1, 1)
fn main(
    @builtin(global_invocation_id) gid: vec3<u32>,
    @builtin(num_workgroups) nwg: vec3<u32>,
) {
    var i = gid.x;
    let stride = nwg.x * 256u;
    while i < params.n {
        b[i] = params.scalar * c[i];
        i = i + stride;
    }
}
";

/// `C[i] = A[i] + B[i]`
pub const ADD_SRC: &str = r"
struct KernelParams {
    n: u32,
    scalar: f32,
}

@group(0) @binding(0) var<storage, read_write> a: array<f32>;
@group(0) @binding(1) var<storage, read_write> b: array<f32>;
@group(0) @binding(2) var<storage, read_write> c: array<f32>;
@group(0) @binding(3) var<uniform> params: KernelParams;

@compute @workgroup_size(256, 1, 1)
fn main(
    @builtin(global_invocation_id) gid: vec3<u32>,
    @builtin(num_workgroups) nwg: vec3<u32>,
) {
    var i = gid.x;
    let stride = nwg.x * 256u;
    while i < params.n {
        c[i] = a[i] + b[i];
        i = i + stride;
    }
}
";

/// `A[i] = B[i] + scalar * C[i]`
pub const TRIAD_SRC: &str = r"
struct KernelParams {
    n: u32,
    scalar: f32,
}

@group(0) @binding(0) var<storage, read_write> a: array<f32>;
@group(0) @binding(1) var<storage, read_write> b: array<f32>;
@group(0) @binding(2) var<storage, read_write> c: array<f32>;
@group(0) @binding(3) var<uniform> params: KernelParams;

@compute @workgroup_size(256, 1, 1)
fn main(
    @builtin(global_invocation_id) gid: vec3<u32>,
    @builtin(num_workgroups) nwg: vec3<u32>,
) {
    var i = gid.x;
    let stride = nwg.x * 256u;
    while i < params.n {
        a[i] = b[i] + params.scalar * c[i];
        i = i + stride;
    }
}
";

/// `A[i] += B[i] + scalar * C[i]`
pub const NSTREAM_SRC: &str = r"
struct KernelParams {
    n: u32,
    scalar: f32,
}

@group(0) @binding(0) var<storage, read_write> a: array<f32>;
@group(0) @binding(1) var<storage, read_write> b: array<f32>;
@group(0) @binding(2) var<storage, read_write> c: array<f32>;
@group(0) @binding(3) var<uniform> params: KernelParams;

@compute @workgroup_size(256, 1, 1)
fn main(
    @builtin(global_invocation_id) gid: vec3<u32>,
    @builtin(num_workgroups) nwg: vec3<u32>,
) {
    var i = gid.x;
    let stride = nwg.x * 256u;
    while i < params.n {
        a[i] = a[i] + b[i] + params.scalar * c[i];
        i = i + stride;
    }
}
";

/// Dot product: one partial sum per workgroup via shared-memory tree
/// reduction; binding 2 is the partial-sums buffer.
pub const DOT_SRC: &str = r"
struct KernelParams {
    n: u32,
    scalar: f32,
}

@group(0) @binding(0) var<storage, read_write> a: array<f32>;
@group(0) @binding(1) var<storage, read_write> b: array<f32>;
@group(0) @binding(2) var<storage, read_write> partials: array<f32>;
@group(0) @binding(3) var<uniform> params: KernelParams;

const WG_SIZE: u32 = 256u;

var<workgroup> scratch: array<f32, 256>;

@compute @workgroup_size(256, 1, 1)
fn main(
    @builtin(local_invocation_id) lid: vec3<u32>,
    @builtin(workgroup_id) wgid: vec3<u32>,
    @builtin(num_workgroups) nwg: vec3<u32>,
) {
    let tid = lid.x;
    let stride = nwg.x * WG_SIZE;

    var local_sum: f32 = 0.0;
    var i = wgid.x * WG_SIZE + tid;
    while i < params.n {
        local_sum = local_sum + a[i] * b[i];
        i = i + stride;
    }
    scratch[tid] = local_sum;
    workgroupBarrier();

    var offset: u32 = WG_SIZE / 2u;
    while offset > 0u {
        if tid < offset {
            scratch[tid] = scratch[tid] + scratch[tid + offset];
        }
        workgroupBarrier();
        offset = offset / 2u;
    }

    if tid == 0u {
        partials[wgid.x] = scratch[0];
    }
}
";

/// Returns all shader sources as `(name, source)` pairs for bulk validation.
pub fn all_shader_sources() -> Vec<(&'static str, &'static str)> {
    vec![
        ("fill", FILL_SRC),
        ("copy", COPY_SRC),
        ("mul", MUL_SRC),
        ("add", ADD_SRC),
        ("triad", TRIAD_SRC),
        ("nstream", NSTREAM_SRC),
        ("dot", DOT_SRC),
    ]
}

#[cfg(test)]
mod tests {
    use naga::front::wgsl;

    fn validate_wgsl(source: &str) -> Result<(), String> {
        let module = wgsl::parse_str(source).map_err(|e| format!("{e}"))?;
        let mut validator = naga::valid::Validator::new(
            naga::valid::ValidationFlags::all(),
            naga::valid::Capabilities::all(),
        );
        validator.validate(&module).map_err(|e| format!("{e}"))?;
        Ok(())
    }

    #[test]
    fn test_fill_valid() {
        validate_wgsl(super::FILL_SRC).unwrap();
    }

    #[test]
    fn test_copy_valid() {
        validate_wgsl(super::COPY_SRC).unwrap();
    }

    #[test]
    fn test_mul_valid() {
        validate_wgsl(super::MUL_SRC).unwrap();
    }

    #[test]
    fn test_add_valid() {
        validate_wgsl(super::ADD_SRC).unwrap();
    }

    #[test]
    fn test_triad_valid() {
        validate_wgsl(super::TRIAD_SRC).unwrap();
    }

    #[test]
    fn test_nstream_valid() {
        validate_wgsl(super::NSTREAM_SRC).unwrap();
    }

    #[test]
    fn test_dot_valid() {
        validate_wgsl(super::DOT_SRC).unwrap();
    }

    #[test]
    fn test_all_shader_sources_validate() {
        let sources = super::all_shader_sources();
        assert_eq!(sources.len(), 7, "expected 7 shader sources");
        for (name, source) in &sources {
            validate_wgsl(source).unwrap_or_else(|e| {
                panic!("shader '{name}' failed validation: {e}");
            });
        }
    }

    #[test]
    fn test_every_source_has_a_main_entry() {
        for (name, source) in super::all_shader_sources() {
            assert!(source.contains("fn main"), "shader '{name}' lacks a main entry point");
        }
    }
}
