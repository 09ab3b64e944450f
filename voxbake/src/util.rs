/// Execute `function` on all of `items`, in parallel if the `"auto-threads"` feature is enabled.
///
/// The output is in the same order as the input either way, so results do not depend on
/// whether threads were used.
pub(crate) fn maybe_parallel_map<T, U>(items: &[T], function: impl Fn(&T) -> U + Send + Sync) -> Vec<U>
where
    T: Sync,
    U: Send,
{
    #[cfg(not(feature = "auto-threads"))]
    {
        items.iter().map(function).collect()
    }

    #[cfg(feature = "auto-threads")]
    {
        use rayon::prelude::{IntoParallelRefIterator as _, ParallelIterator as _};

        items.par_iter().map(function).collect()
    }
}
