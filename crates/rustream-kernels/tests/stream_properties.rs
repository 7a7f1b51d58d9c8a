//! Property tests for the host stream provider.
//!
//! Exactness-sensitive properties draw integer-valued elements so every
//! product and partial sum stays exactly representable; the parallel
//! reduction order then cannot perturb the expected results.

use proptest::prelude::*;
use rustream_common::{ExecutionTarget, StreamConfig, StreamElement};
use rustream_kernels::{create_stream, HostStream, StreamProvider};

fn config(n: usize, scalar: f64) -> StreamConfig {
    let mut config = StreamConfig::new(n, ExecutionTarget::Host);
    config.scalar = scalar;
    config
}

fn read_all<T: StreamElement>(s: &dyn StreamProvider<T>) -> (Vec<T>, Vec<T>, Vec<T>) {
    let n = s.array_size();
    let mut a = vec![T::ZERO; n];
    let mut b = vec![T::ZERO; n];
    let mut c = vec![T::ZERO; n];
    s.read_arrays(&mut a, &mut b, &mut c).unwrap();
    (a, b, c)
}

/// Integer-valued f64 in a range where sums of 1024 products stay exact.
fn int_elem() -> impl Strategy<Value = f64> {
    (-100i32..=100).prop_map(f64::from)
}

proptest! {
    #[test]
    fn init_then_read_reproduces_fills(
        n in 0usize..1024,
        ia in -1e12f64..1e12,
        ib in -1e12f64..1e12,
        ic in -1e12f64..1e12,
    ) {
        let mut s = HostStream::<f64>::new(&config(n, 0.4)).unwrap();
        s.init_arrays(ia, ib, ic).unwrap();
        let (a, b, c) = read_all(&s);
        prop_assert!(a.iter().all(|&x| x == ia));
        prop_assert!(b.iter().all(|&x| x == ib));
        prop_assert!(c.iter().all(|&x| x == ic));
    }

    #[test]
    fn copy_is_idempotent(n in 0usize..512, ia in int_elem(), ic in int_elem()) {
        let mut s = HostStream::<f64>::new(&config(n, 0.4)).unwrap();
        s.init_arrays(ia, 0.0, ic).unwrap();

        s.copy().unwrap();
        let (_, _, once) = read_all(&s);
        s.copy().unwrap();
        let (_, _, twice) = read_all(&s);

        prop_assert_eq!(once, twice);
    }

    #[test]
    fn mul_then_add_follow_the_formulas(
        n in 0usize..512,
        ia in int_elem(),
        ic in int_elem(),
        scalar in -8i32..=8,
    ) {
        let scalar = f64::from(scalar);
        let mut s = HostStream::<f64>::new(&config(n, scalar)).unwrap();
        s.init_arrays(ia, 0.0, ic).unwrap();

        s.mul().unwrap();
        let (_, b, _) = read_all(&s);
        prop_assert!(b.iter().all(|&x| x == scalar * ic));

        s.add().unwrap();
        let (_, _, c) = read_all(&s);
        prop_assert!(c.iter().all(|&x| x == ia + scalar * ic));
    }

    #[test]
    fn triad_writes_a_and_preserves_c(
        n in 0usize..512,
        ib in int_elem(),
        ic in int_elem(),
        scalar in -8i32..=8,
    ) {
        let scalar = f64::from(scalar);
        let mut s = HostStream::<f64>::new(&config(n, scalar)).unwrap();
        s.init_arrays(0.0, ib, ic).unwrap();

        s.triad().unwrap();
        let (a, b, c) = read_all(&s);
        prop_assert!(a.iter().all(|&x| x == ib + scalar * ic));
        prop_assert!(b.iter().all(|&x| x == ib));
        prop_assert!(c.iter().all(|&x| x == ic));
    }

    #[test]
    fn nstream_accumulates_over_repeated_calls(
        n in 0usize..512,
        ia in int_elem(),
        ib in int_elem(),
        ic in int_elem(),
        scalar in -8i32..=8,
    ) {
        let scalar = f64::from(scalar);
        let mut s = HostStream::<f64>::new(&config(n, scalar)).unwrap();
        s.init_arrays(ia, ib, ic).unwrap();

        let step = ib + scalar * ic;
        s.nstream().unwrap();
        let (a, _, _) = read_all(&s);
        prop_assert!(a.iter().all(|&x| x == ia + step));

        s.nstream().unwrap();
        let (a, _, _) = read_all(&s);
        prop_assert!(a.iter().all(|&x| x == ia + step + step));
    }

    #[test]
    fn dot_of_uniform_fills_is_exact(
        n in 0usize..1024,
        ia in int_elem(),
        ib in int_elem(),
    ) {
        let mut s = HostStream::<f64>::new(&config(n, 0.4)).unwrap();
        s.init_arrays(ia, ib, 0.0).unwrap();
        // n identical integer-valued products; exact in any summation order.
        prop_assert_eq!(s.dot().unwrap(), ia * ib * n as f64);
    }

    #[test]
    fn read_then_reinit_round_trips(
        n in 1usize..512,
        ia in -1e9f64..1e9,
        ib in -1e9f64..1e9,
        ic in -1e9f64..1e9,
    ) {
        let mut s = HostStream::<f64>::new(&config(n, 0.4)).unwrap();
        s.init_arrays(ia, ib, ic).unwrap();
        let (a1, b1, c1) = read_all(&s);

        s.init_arrays(a1[0], b1[0], c1[0]).unwrap();
        let (a2, b2, c2) = read_all(&s);
        prop_assert_eq!(a1, a2);
        prop_assert_eq!(b1, b2);
        prop_assert_eq!(c1, c2);
    }

    #[test]
    fn f32_and_f64_agree_on_integer_inputs(
        n in 0usize..256,
        ia in -50i32..=50,
        ib in -50i32..=50,
    ) {
        let mut s64 = HostStream::<f64>::new(&config(n, 2.0)).unwrap();
        let mut s32 = HostStream::<f32>::new(&config(n, 2.0)).unwrap();
        s64.init_arrays(f64::from(ia), f64::from(ib), 1.0).unwrap();
        s32.init_arrays(ia as f32, ib as f32, 1.0).unwrap();

        prop_assert_eq!(s64.dot().unwrap(), f64::from(s32.dot().unwrap()));
    }
}

#[test]
fn dot_through_the_factory() {
    let mut boxed = create_stream::<f64>(&config(3, 0.4)).unwrap();
    boxed.init_arrays(2.0, 16.0, 0.0).unwrap();
    assert_eq!(boxed.dot().unwrap(), 96.0);
}

#[test]
fn mul_then_add_reference_chain() {
    // init(2,3,4), scalar 5: mul -> B == 20, then add -> C == 22.
    let mut s = HostStream::<f64>::new(&config(64, 5.0)).unwrap();
    s.init_arrays(2.0, 3.0, 4.0).unwrap();
    s.mul().unwrap();
    let (_, b, _) = read_all(&s);
    assert!(b.iter().all(|&x| x == 20.0));

    s.add().unwrap();
    let (_, _, c) = read_all(&s);
    assert!(c.iter().all(|&x| x == 22.0));
}

#[test]
fn dot_on_empty_arrays_is_zero() {
    let mut s = HostStream::<f32>::new(&config(0, 0.4)).unwrap();
    assert_eq!(s.dot().unwrap(), 0.0);
}
