//! Reproduction pairs: crossover and mutation.
//!
//! A [`ReproductionPair`] snapshots the traits of two admitted organisms and
//! derives two pair-level values from them:
//!
//! - `fertility`: the mean parental fertility rounded to the nearest integer
//!   (ties to even, negative means count as zero). This is the number of
//!   offspring the pair produces.
//! - `mutation_chance`: the mean parental mutation chance.
//!
//! Every child trait is a weighted blend `a·w + b·(1−w)` with its own weight
//! `w ~ U(0, 1)`, and with probability `mutation_chance` it is multiplied by
//! an independent `U(1 − range, 1 + range)` factor.
//!
//! The pair owns a random stream seeded from both parents' lineage seeds,
//! and hands each child a lineage seed drawn from that stream.

use evosim_types::HeritableTraits;
use evosim_world::{combine_seeds, rng_from_seed};
use rand::Rng;
use rand_chacha::ChaCha12Rng;

use crate::config::ReproductionConfig;
use crate::organism::Organism;

/// Two parents coupled for reproduction.
#[derive(Debug, Clone)]
pub struct ReproductionPair {
    /// Snapshot of the first parent's traits.
    parent_a: HeritableTraits,
    /// Snapshot of the second parent's traits.
    parent_b: HeritableTraits,
    /// Number of offspring this pair produces.
    fertility: u32,
    /// Probability that a crossed-over trait mutates.
    mutation_chance: f64,
    /// Stream owned by this pair.
    rng: ChaCha12Rng,
}

impl ReproductionPair {
    /// Couple two organisms.
    pub fn new(parent_a: &Organism, parent_b: &Organism) -> Self {
        let a = *parent_a.traits();
        let b = *parent_b.traits();
        Self {
            parent_a: a,
            parent_b: b,
            fertility: pair_fertility(a.fertility, b.fertility),
            mutation_chance: f64::midpoint(a.mutation_chance, b.mutation_chance),
            rng: rng_from_seed(combine_seeds(parent_a.lineage_seed(), parent_b.lineage_seed())),
        }
    }

    /// Number of offspring this pair produces.
    pub const fn fertility(&self) -> u32 {
        self.fertility
    }

    /// Probability that a crossed-over trait mutates.
    pub const fn mutation_chance(&self) -> f64 {
        self.mutation_chance
    }

    /// Trait snapshots of both parents.
    pub const fn parents(&self) -> (&HeritableTraits, &HeritableTraits) {
        (&self.parent_a, &self.parent_b)
    }

    /// Cross over a single trait value.
    pub fn crossover_attribute(&mut self, a: f64, b: f64, mutation_range: f64) -> f64 {
        let weight: f64 = self.rng.random();
        let mut child = a.mul_add(weight, b * (1.0 - weight));

        if self.rng.random::<f64>() < self.mutation_chance {
            let low = 1.0 - mutation_range;
            let factor = (2.0 * mutation_range).mul_add(self.rng.random::<f64>(), low);
            child *= factor;
        }

        child
    }

    /// Produce one child, crossing over each trait independently.
    pub fn crossover(&mut self, config: &ReproductionConfig) -> Organism {
        let (a, b) = (self.parent_a, self.parent_b);
        let traits = HeritableTraits::from_fn(|kind| {
            self.crossover_attribute(a.get(kind), b.get(kind), config.mutation_range)
        });
        let lineage_seed: u64 = self.rng.random();
        Organism::new(traits, lineage_seed)
    }

    /// Produce exactly [`ReproductionPair::fertility`] children.
    pub fn produce_offspring(&mut self, config: &ReproductionConfig) -> Vec<Organism> {
        (0..self.fertility).map(|_| self.crossover(config)).collect()
    }
}

/// Round the mean of two fertilities to an offspring count.
///
/// Ties round to even; negative or NaN means produce no offspring.
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
pub fn pair_fertility(a: f64, b: f64) -> u32 {
    let rounded = f64::midpoint(a, b).round_ties_even();
    if rounded.is_nan() || rounded <= 0.0 {
        0
    } else {
        // Float-to-int `as` saturates at `u32::MAX`.
        rounded as u32
    }
}

#[cfg(test)]
#[allow(clippy::float_cmp)]
mod tests {
    use evosim_types::TraitKind;

    use super::*;

    fn organism(fertility: f64, mutation_chance: f64, seed: u64) -> Organism {
        Organism::new(
            HeritableTraits {
                temperature_ideal: 20.0,
                temperature_range: 4.0,
                resilience: 0.3,
                fertility,
                mutation_chance,
            },
            seed,
        )
    }

    fn other(fertility: f64, mutation_chance: f64, seed: u64) -> Organism {
        Organism::new(
            HeritableTraits {
                temperature_ideal: 30.0,
                temperature_range: 8.0,
                resilience: 0.7,
                fertility,
                mutation_chance,
            },
            seed,
        )
    }

    #[test]
    fn fertility_rounds_to_nearest_even_on_ties() {
        assert_eq!(pair_fertility(2.0, 3.0), 2); // 2.5 -> 2
        assert_eq!(pair_fertility(3.0, 4.0), 4); // 3.5 -> 4
        assert_eq!(pair_fertility(2.2, 2.6), 2); // 2.4 -> 2
        assert_eq!(pair_fertility(2.8, 3.0), 3); // 2.9 -> 3
    }

    #[test]
    fn non_positive_fertility_yields_no_offspring() {
        assert_eq!(pair_fertility(0.0, 0.0), 0);
        assert_eq!(pair_fertility(-3.0, 1.0), 0);
        assert_eq!(pair_fertility(f64::NAN, 1.0), 0);
    }

    #[test]
    fn offspring_count_matches_pair_fertility() {
        let config = ReproductionConfig::default();
        for (fa, fb) in [(0.0, 0.0), (1.0, 2.0), (2.4, 3.9), (5.0, 5.0), (0.2, 0.6)] {
            let mut pair = ReproductionPair::new(&organism(fa, 0.2, 1), &other(fb, 0.2, 2));
            let offspring = pair.produce_offspring(&config);
            assert_eq!(offspring.len(), usize::try_from(pair_fertility(fa, fb)).unwrap_or(0));
        }
    }

    #[test]
    fn mutation_chance_is_parent_average() {
        let pair = ReproductionPair::new(&organism(2.0, 0.1, 1), &other(2.0, 0.3, 2));
        assert!((pair.mutation_chance() - 0.2).abs() < 1e-12);
    }

    #[test]
    fn without_mutation_children_blend_parents() {
        let config = ReproductionConfig::default();
        let a = organism(4.0, 0.0, 11);
        let b = other(6.0, 0.0, 12);
        let mut pair = ReproductionPair::new(&a, &b);
        let offspring = pair.produce_offspring(&config);
        assert_eq!(offspring.len(), 5);

        for child in &offspring {
            for kind in TraitKind::ALL {
                let (x, y) = (a.traits().get(kind), b.traits().get(kind));
                let value = child.traits().get(kind);
                let (lo, hi) = (x.min(y), x.max(y));
                assert!(
                    value >= lo - 1e-12 && value <= hi + 1e-12,
                    "{kind} = {value} outside blend [{lo}, {hi}]"
                );
            }
        }
    }

    #[test]
    fn without_mutation_child_is_exact_blend_of_pair_stream() {
        let config = ReproductionConfig::default();
        let mut pair = ReproductionPair::new(&organism(4.0, 0.0, 11), &other(6.0, 0.0, 12));
        let (a, b) = pair.parents();
        let (a, b) = (*a, *b);
        let child = pair.crossover(&config);

        // Per trait: weight draw, then mutation roll; no factor draw when
        // the mutation chance is zero.
        let mut replay = rng_from_seed(combine_seeds(11, 12));
        for kind in TraitKind::ALL {
            let w: f64 = replay.random();
            let _roll: f64 = replay.random();
            let expected = a.get(kind).mul_add(w, b.get(kind) * (1.0 - w));
            assert_eq!(child.traits().get(kind), expected, "{kind}");
        }
        let lineage_seed: u64 = replay.random();
        assert_eq!(child.lineage_seed(), lineage_seed);
    }

    #[test]
    fn traits_use_independent_weights() {
        let config = ReproductionConfig::default();
        let mut pair = ReproductionPair::new(&organism(2.0, 0.0, 3), &other(2.0, 0.0, 4));
        let child = pair.crossover(&config);
        // Weight implied by each trait: (value - b) / (a - b).
        let t = child.traits();
        let w_ideal = (t.temperature_ideal - 30.0) / (20.0 - 30.0);
        let w_range = (t.temperature_range - 8.0) / (4.0 - 8.0);
        let w_resilience = (t.resilience - 0.7) / (0.3 - 0.7);
        assert!((w_ideal - w_range).abs() > 1e-9 || (w_range - w_resilience).abs() > 1e-9);
    }

    #[test]
    fn mutation_stays_within_range() {
        let config = ReproductionConfig {
            mutation_range: 0.1,
        };
        let a = organism(2.0, 1.0, 5);
        let b = organism(2.0, 1.0, 6);
        let mut pair = ReproductionPair::new(&a, &b);
        for child in pair.produce_offspring(&config) {
            // Identical parents: the blend is the parent value, so mutation
            // alone moves the child.
            let ideal = child.traits().temperature_ideal;
            assert!((18.0 - 1e-9..=22.0 + 1e-9).contains(&ideal), "ideal {ideal}");
        }
    }

    #[test]
    fn certain_mutation_perturbs_children() {
        let config = ReproductionConfig::default();
        let a = organism(10.0, 1.0, 7);
        let b = organism(10.0, 1.0, 8);
        let mut pair = ReproductionPair::new(&a, &b);
        let offspring = pair.produce_offspring(&config);
        assert_eq!(offspring.len(), 10);
        assert!(
            offspring
                .iter()
                .any(|c| (c.traits().temperature_ideal - 20.0).abs() > 1e-9),
            "at least one child should mutate"
        );
    }

    #[test]
    fn same_parents_same_offspring() {
        let config = ReproductionConfig::default();
        let mut first = ReproductionPair::new(&organism(3.0, 0.5, 21), &other(3.0, 0.5, 22));
        let mut second = ReproductionPair::new(&organism(3.0, 0.5, 21), &other(3.0, 0.5, 22));
        assert_eq!(first.produce_offspring(&config), second.produce_offspring(&config));
    }

    #[test]
    fn children_receive_distinct_lineage_seeds() {
        let config = ReproductionConfig::default();
        let mut pair = ReproductionPair::new(&organism(6.0, 0.1, 1), &other(6.0, 0.1, 2));
        let seeds: std::collections::BTreeSet<u64> = pair
            .produce_offspring(&config)
            .iter()
            .map(Organism::lineage_seed)
            .collect();
        assert_eq!(seeds.len(), 6);
    }
}
