//! Fixture builders shared by reviewcrew tests.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use uuid::Uuid;

use reviewcrew_common::{Criterion, Direction, Normalization, ProductScoreRecord};

/// Stable review id for fixtures.
pub fn review_id() -> Uuid {
    Uuid::from_u128(0x7e57_0000_0000_0000_0000_0000_0000_0001)
}

pub fn criterion(id: &str, direction: Direction, normalization: Normalization, weight: f64) -> Criterion {
    Criterion::new(id, direction, normalization, weight)
}

pub fn product(id: &str, scores: &[(&str, f64)]) -> ProductScoreRecord {
    scores
        .iter()
        .fold(ProductScoreRecord::new(id), |p, (cid, raw)| p.with_score(*cid, *raw))
}

/// Two-criterion, two-product cohort: c1 is a cost (lower better), c2 a
/// benefit; p2 wins both.
pub fn price_vs_quality_criteria() -> Vec<Criterion> {
    vec![
        criterion("c1", Direction::LowerBetter, Normalization::Minmax, 0.3),
        criterion("c2", Direction::HigherBetter, Normalization::Minmax, 0.7),
    ]
}

pub fn price_vs_quality_products() -> Vec<ProductScoreRecord> {
    vec![
        product("p1", &[("c1", 50.0), ("c2", 80.0)]),
        product("p2", &[("c1", 30.0), ("c2", 90.0)]),
    ]
}

/// Seeded random cohort over `criteria`. Roughly one raw score in ten is
/// left out to exercise the missing-score path.
pub fn random_cohort(seed: u64, size: usize, criteria: &[Criterion]) -> Vec<ProductScoreRecord> {
    let mut rng = StdRng::seed_from_u64(seed);
    (0..size)
        .map(|i| {
            let mut p = ProductScoreRecord::new(format!("product-{i:03}"));
            for c in criteria {
                if rng.gen_bool(0.9) {
                    p = p.with_score(c.id.clone(), rng.gen_range(0.0..100.0));
                }
            }
            p
        })
        .collect()
}
