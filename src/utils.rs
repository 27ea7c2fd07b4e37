use num_traits::Float;

/// `(Σx, Σx², n)` of a sequence.
fn moments<T, I>(values: I) -> (T, T, T)
where
    I: IntoIterator<Item = T>,
    T: Float,
{
    values
        .into_iter()
        .fold((T::zero(), T::zero(), T::zero()), |(sum, sum_sq, n), x| {
            (sum + x, sum_sq + x * x, n + T::one())
        })
}

/// Sum of squared errors around the mean, computed as `Σx² − (Σx)²/n`.
///
/// This is the unnormalized quantity: it is not divided by `n`.
pub(crate) fn sum_of_squared_errors<T, I>(values: I) -> T
where
    I: IntoIterator<Item = T>,
    T: Float,
{
    let (sum, sum_sq, n) = moments(values);
    if n.is_zero() {
        return T::zero();
    }
    sum_sq - sum * sum / n
}

/// Arithmetic mean, zero for an empty sequence.
pub(crate) fn mean<T, I>(values: I) -> T
where
    I: IntoIterator<Item = T>,
    T: Float,
{
    let (sum, _, n) = moments(values);
    if n.is_zero() {
        return T::zero();
    }
    sum / n
}
