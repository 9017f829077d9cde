//! Deterministic generator used to size and fill test blobs.

const M: u32 = 0x7fffffff;
const A: u64 = 16807;

pub struct Random {
    seed: u32,
}

impl Random {
    pub fn new(seed: u32) -> Self {
        let mut seed = seed & M;
        if seed == 0 || seed == M {
            seed = 1;
        }
        Self { seed }
    }

    pub fn next(&mut self) -> u32 {
        let product = self.seed as u64 * A;
        // product % M
        self.seed = ((product >> 31) + (product & M as u64)) as u32;
        if self.seed > M {
            self.seed -= M;
        }
        self.seed
    }

    pub fn uniform(&mut self, n: u32) -> u32 {
        self.next() % n
    }

    /// Picks "base" uniformly from [0, max_log] and then returns "base"
    /// random bits, so small values are much more likely than large ones.
    pub fn skewed(&mut self, max_log: u32) -> u32 {
        let tmp = 1 << self.uniform(max_log + 1);
        self.uniform(tmp)
    }

    pub fn bytes(&mut self, n: usize) -> Vec<u8> {
        (0..n).map(|_| self.uniform(256) as u8).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::Random;

    #[test]
    fn test_random_is_deterministic() {
        let mut a = Random::new(301);
        let mut b = Random::new(301);
        for _ in 0..1000 {
            assert_eq!(a.next(), b.next());
        }
        assert_eq!(Random::new(7).bytes(64), Random::new(7).bytes(64));
    }

    #[test]
    fn test_random_skewed_bounds() {
        let mut rnd = Random::new(42);
        for _ in 0..1000 {
            assert!(rnd.skewed(10) < 1 << 10);
        }
    }
}
