use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// One pseudo-random stream per environment.
///
/// Resets draw only from the streams of the environments being reset, so the
/// values an environment sees depend on the run seed and its own reset
/// history, never on which other environments were reset alongside it.
#[derive(Debug, Clone)]
pub struct EnvRngs {
    streams: Vec<StdRng>,
}

impl EnvRngs {
    pub fn new(num_envs: usize, seed: u64) -> Self {
        let streams = (0..num_envs)
            .map(|i| StdRng::seed_from_u64(splitmix64(seed ^ splitmix64(i as u64))))
            .collect();
        Self { streams }
    }

    pub fn len(&self) -> usize {
        self.streams.len()
    }

    pub fn is_empty(&self) -> bool {
        self.streams.is_empty()
    }

    pub fn env(&mut self, id: usize) -> &mut StdRng {
        &mut self.streams[id]
    }

    /// `U(lo, hi)` drawn from environment `id`'s stream.
    #[inline]
    pub fn uniform(&mut self, id: usize, lo: f32, hi: f32) -> f32 {
        self.streams[id].gen::<f32>() * (hi - lo) + lo
    }

    /// `U(-half_width, half_width)`.
    #[inline]
    pub fn symmetric(&mut self, id: usize, half_width: f32) -> f32 {
        (self.streams[id].gen::<f32>() * 2.0 - 1.0) * half_width
    }

    /// Uniform angle in `[0, 2π)`.
    #[inline]
    pub fn angle(&mut self, id: usize) -> f32 {
        self.streams[id].gen::<f32>() * std::f32::consts::TAU
    }

    #[inline]
    pub fn sign(&mut self, id: usize) -> f32 {
        if self.streams[id].gen::<bool>() {
            1.0
        } else {
            -1.0
        }
    }
}

fn splitmix64(mut z: u64) -> u64 {
    z = z.wrapping_add(0x9E37_79B9_7F4A_7C15);
    z = (z ^ (z >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
    z = (z ^ (z >> 27)).wrapping_mul(0x94D0_49BB_1331_11EB);
    z ^ (z >> 31)
}
