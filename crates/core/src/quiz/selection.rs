/// Returns the half-open range `[start, end)` of `words`, clamped to `[0, len]`.
///
/// Out-of-range bounds are clamped and an inverted range yields an empty vector.
#[must_use]
pub fn select_range<T: Clone>(words: &[T], start: i64, end: i64) -> Vec<T> {
    let len = words.len();
    let start = clamp_index(start, len);
    let end = clamp_index(end, len);
    if start >= end {
        return Vec::new();
    }
    words[start..end].to_vec()
}

fn clamp_index(raw: i64, len: usize) -> usize {
    if raw <= 0 {
        return 0;
    }
    usize::try_from(raw).map_or(len, |idx| idx.min(len))
}
