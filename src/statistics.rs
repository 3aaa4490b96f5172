//! Small descriptive statistics over flat numeric slices.
use num_traits::Float;

pub fn sum<T: Float>(values: &[T]) -> T {
    values.iter().fold(T::zero(), |acc, v| acc + *v)
}

/// The smallest and largest value in `values`, or `None` if it is empty
pub fn minmax<T: Float>(values: &[T]) -> Option<(T, T)> {
    if values.is_empty() {
        return None;
    }
    let mut max = -T::infinity();
    let mut min = T::infinity();

    for v in values.iter() {
        if *v > max {
            max = *v;
        }
        if *v < min {
            min = *v
        }
    }
    Some((min, max))
}
