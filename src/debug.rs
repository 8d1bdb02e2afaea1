use burn::{
    prelude::Backend,
    tensor::{PrintOptions, Tensor, cast::ToElement, set_print_options},
};

/// Sets how many decimals tensors show when printed, e.g. in `debug!` output of the CLI.
pub fn set_print_precision(precision: usize) {
    set_print_options(PrintOptions {
        precision: Some(precision),
        edge_items: 4,
        ..Default::default()
    });
}

/// Number of NaN or infinite entries in `tensor`.
///
/// Degenerate boxes are passed through the geometry functions unchanged, this is how callers
/// find out afterwards.
pub fn non_finite_count<B: Backend, const D: usize>(tensor: Tensor<B, D>) -> usize {
    let nan = tensor.clone().is_nan().int().sum().into_scalar().to_i64();
    let inf = tensor.is_inf().int().sum().into_scalar().to_i64();

    (nan + inf) as usize
}

// Helper function for comparing floats
#[cfg(test)]
pub fn assert_approx_eq<F>(a: &F, b: &F, epsilon: F)
where
    F: num::Float + std::fmt::Display + std::fmt::Debug,
{
    assert!(
        (*a - *b).abs() <= epsilon,
        "Values differ: {:?} vs {:?} (tolerance: {:?})",
        *a,
        *b,
        epsilon
    );
}
