//! Seedable random streams for event generation.

use std::hash::Hasher;

use rand::rngs::StdRng;
use rand::{Error, RngCore, SeedableRng};
use siphasher::sip::SipHasher13;

/// Random stream handed to samplers, decays and generators.
///
/// A run is fully determined by its master seed. Parallel workers each draw
/// from their own substream, seeded through [`derive_substream_seed`], so a
/// partitioned run repeats exactly for the same worker count.
#[derive(Debug, Clone)]
pub struct RngHandle {
    seed: u64,
    stream: StdRng,
}

impl RngHandle {
    /// Stream seeded directly with `seed`.
    pub fn from_seed(seed: u64) -> Self {
        Self {
            seed,
            stream: StdRng::seed_from_u64(seed),
        }
    }

    /// Stream for worker `worker` of a run seeded with `master_seed`.
    pub fn substream(master_seed: u64, worker: u64) -> Self {
        Self::from_seed(derive_substream_seed(master_seed, worker))
    }

    /// Seed this stream was created from.
    pub fn seed(&self) -> u64 {
        self.seed
    }
}

impl RngCore for RngHandle {
    fn next_u32(&mut self) -> u32 {
        self.stream.next_u32()
    }

    fn next_u64(&mut self) -> u64 {
        self.stream.next_u64()
    }

    fn fill_bytes(&mut self, dest: &mut [u8]) {
        self.stream.fill_bytes(dest);
    }

    fn try_fill_bytes(&mut self, dest: &mut [u8]) -> Result<(), Error> {
        self.stream.try_fill_bytes(dest)
    }
}

/// SipHash-1-3 (zero keys) of `(master_seed, worker)`.
pub fn derive_substream_seed(master_seed: u64, worker: u64) -> u64 {
    let mut hasher = SipHasher13::new_with_keys(0, 0);
    hasher.write_u64(master_seed);
    hasher.write_u64(worker);
    hasher.finish()
}
