use crate::analysis::narrative;
use crate::analysis::pools::SwotPools;
use crate::analysis::{AnalysisMode, ProductSynthesizer};
use crate::domain::product::ProductMetrics;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use std::ops::RangeInclusive;
use xxhash_rust::xxh3::xxh3_64_with_seed;

const SEED_HASH_KEY: u64 = 0x6d61_726b_6574;
const SEED_MODULUS: u64 = 10_000;

const STRENGTHS_DRAW: RangeInclusive<usize> = 3..=5;
const WEAKNESSES_DRAW: RangeInclusive<usize> = 3..=4;
const OPPORTUNITIES_DRAW: RangeInclusive<usize> = 3..=5;
const THREATS_DRAW: RangeInclusive<usize> = 3..=4;

/// Stable per-name seed in `[0, 10000)`, identical across processes.
pub fn seed_for(name: &str) -> u64 {
    xxh3_64_with_seed(name.as_bytes(), SEED_HASH_KEY) % SEED_MODULUS
}

fn round2(x: f64) -> f64 {
    (x * 100.0).round() / 100.0
}

fn draw(rng: &mut StdRng, pool: &[String], size: RangeInclusive<usize>) -> Vec<String> {
    let n = rng.gen_range(size).min(pool.len());
    pool.choose_multiple(rng, n).cloned().collect()
}

/// Fabricates metrics from a name-derived seed. No I/O, no failure modes.
#[derive(Debug, Clone, Default)]
pub struct SeededSynthesizer {
    pools: SwotPools,
}

impl SeededSynthesizer {
    pub fn new(pools: SwotPools) -> Self {
        Self { pools }
    }

    pub fn metrics_for(&self, product: &str, sector: &str) -> ProductMetrics {
        let mut rng = StdRng::seed_from_u64(seed_for(product));

        let market_share = round2(rng.gen_range(5.0..35.0));
        let price = round2(rng.gen_range(100.0..2000.0));
        let satisfaction = round2(rng.gen_range(3.0..4.8));
        let growth = round2(rng.gen_range(-10.0..40.0));

        let strengths = draw(&mut rng, &self.pools.strengths, STRENGTHS_DRAW);
        let weaknesses = draw(&mut rng, &self.pools.weaknesses, WEAKNESSES_DRAW);
        let opportunities = draw(&mut rng, &self.pools.opportunities, OPPORTUNITIES_DRAW);
        let threats = draw(&mut rng, &self.pools.threats, THREATS_DRAW);

        ProductMetrics {
            name: product.to_string(),
            market_share,
            price,
            satisfaction,
            growth,
            strengths,
            weaknesses,
            opportunities,
            threats,
            positioning: narrative::positioning(product, sector, market_share, price),
            target_audience: narrative::target_audience(price, satisfaction, growth),
        }
    }
}

#[async_trait::async_trait]
impl ProductSynthesizer for SeededSynthesizer {
    fn mode(&self) -> AnalysisMode {
        AnalysisMode::Simulation
    }

    async fn synthesize(&self, product: &str, sector: &str) -> anyhow::Result<ProductMetrics> {
        Ok(self.metrics_for(product, sector))
    }
}
