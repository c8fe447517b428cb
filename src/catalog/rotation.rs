use rand::Rng;

/// Picks `min(n, source.len())` distinct entries with a partial Fisher–Yates
/// shuffle over a scratch copy. `source` is never reordered.
pub fn pick_random<T: Clone, R: Rng + ?Sized>(n: usize, source: &[T], rng: &mut R) -> Vec<T> {
    let count = n.min(source.len());
    let mut scratch: Vec<T> = source.to_vec();
    let mut picked = Vec::with_capacity(count);
    for i in 0..count {
        let j = rng.gen_range(i..scratch.len());
        scratch.swap(i, j);
        picked.push(scratch[i].clone());
    }
    picked
}
