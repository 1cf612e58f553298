use fastrand::Rng;
use image::Rgb;

use super::Candidate;
use crate::config::GaParams;

/// Random color whose three channel values are drawn without replacement
/// from the full 8-bit range, so they are pairwise distinct.
pub fn random_color(rng: &mut Rng) -> Rgb<u8> {
    let mut channels = [0u8; 3];
    let mut filled = 0;
    while filled < 3 {
        let value = rng.u8(..);
        if !channels[..filled].contains(&value) {
            channels[filled] = value;
            filled += 1;
        }
    }
    Rgb(channels)
}

/// Uniform crossover: each channel is copied whole from one parent or the
/// other on an independent coin flip, never blended.
pub fn crossover(p1: Rgb<u8>, p2: Rgb<u8>, rng: &mut Rng) -> Rgb<u8> {
    let mut child = [0u8; 3];
    for c in 0..3 {
        child[c] = if rng.bool() { p1.0[c] } else { p2.0[c] };
    }
    Rgb(child)
}

/// Builds the next generation from a fitness-sorted population.
pub fn next_generation(sorted: &[Candidate], params: &GaParams, rng: &mut Rng) -> Vec<Candidate> {
    let mut next = Vec::with_capacity(params.population_size);

    // 1. Elites survive unchanged
    next.extend_from_slice(&sorted[..params.elite_count().min(sorted.len())]);

    // 2. Children bred from the fittest parents, both drawn uniformly with
    //    replacement from the pool
    let pool = params.parent_pool().clamp(1, sorted.len());
    for _ in 0..params.child_count() {
        let p1 = sorted[rng.usize(0..pool)].color;
        let p2 = sorted[rng.usize(0..pool)].color;
        next.push(Candidate::unscored(crossover(p1, p2, rng)));
    }

    // 3. Fresh mutants fill the generation back up to full size
    while next.len() < params.population_size {
        next.push(Candidate::unscored(random_color(rng)));
    }

    next
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn sorted_population(n: usize) -> Vec<Candidate> {
        (0..n)
            .map(|i| Candidate {
                color: Rgb([i as u8, (i + 1) as u8, (i + 2) as u8]),
                fitness: i as f32,
            })
            .collect()
    }

    #[test]
    fn test_random_color_channels_are_distinct() {
        let mut rng = fastrand::Rng::with_seed(42);
        for _ in 0..200 {
            let [r, g, b] = random_color(&mut rng).0;
            assert!(r != g && g != b && r != b, "channels collided");
        }
    }

    #[test]
    fn test_crossover_never_blends() {
        let mut rng = fastrand::Rng::with_seed(42);
        let p1 = Rgb([10, 200, 35]);
        let p2 = Rgb([90, 15, 250]);
        for _ in 0..200 {
            let child = crossover(p1, p2, &mut rng);
            for c in 0..3 {
                assert!(
                    child.0[c] == p1.0[c] || child.0[c] == p2.0[c],
                    "channel {} was invented",
                    c
                );
            }
        }
    }

    #[test]
    fn test_generation_is_always_full_size() {
        let mut rng = fastrand::Rng::with_seed(42);
        let params = GaParams::default();
        let next = next_generation(&sorted_population(25), &params, &mut rng);
        assert_eq!(next.len(), 25, "generation came up short");
    }

    #[test]
    fn test_elites_lead_the_next_generation() {
        let mut rng = fastrand::Rng::with_seed(42);
        let params = GaParams::default();
        let sorted = sorted_population(25);
        let next = next_generation(&sorted, &params, &mut rng);
        for i in 0..params.elite_count() {
            assert_eq!(next[i].color, sorted[i].color, "elite {} displaced", i);
        }
    }

    #[test]
    fn test_children_descend_from_the_parent_pool() {
        let mut rng = fastrand::Rng::with_seed(7);
        let params = GaParams::default();
        let sorted = sorted_population(25);
        let pool = params.parent_pool();
        let next = next_generation(&sorted, &params, &mut rng);

        for child in &next[params.elite_count()..params.elite_count() + params.child_count()] {
            for c in 0..3 {
                let inherited = sorted[..pool].iter().any(|p| p.color.0[c] == child.color.0[c]);
                assert!(inherited, "child channel {} has no parent in the pool", c);
            }
        }
    }

    proptest! {
        #[test]
        fn test_child_channels_come_from_parents(
            seed in any::<u64>(),
            a in any::<[u8; 3]>(),
            b in any::<[u8; 3]>()
        ) {
            let mut rng = fastrand::Rng::with_seed(seed);
            let child = crossover(Rgb(a), Rgb(b), &mut rng);
            for c in 0..3 {
                prop_assert!(child.0[c] == a[c] || child.0[c] == b[c]);
            }
        }

        #[test]
        fn test_generation_size_is_invariant(seed in any::<u64>()) {
            let mut rng = fastrand::Rng::with_seed(seed);
            let params = GaParams::default();
            let next = next_generation(&sorted_population(25), &params, &mut rng);
            prop_assert_eq!(next.len(), params.population_size);
        }
    }
}
