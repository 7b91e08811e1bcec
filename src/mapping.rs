/// Linearly remap `value` from `[start1, stop1]` onto `[start2, stop2]`.
///
/// Values outside the source range extrapolate; nothing is clamped. A degenerate
/// source range (`start1 == stop1`) divides by zero and yields a non-finite result,
/// so callers must pass a non-empty range.
#[inline]
pub fn map(value: f32, start1: f32, stop1: f32, start2: f32, stop2: f32) -> f32 {
    (value - start1) / (stop1 - start1) * (stop2 - start2) + start2
}
