//! Seed population sampling.
//!
//! The initial population is drawn trait by trait: each of the five traits
//! has its own [`TruncatedNormal`] and its own derived stream, and one column
//! of `n` values is sampled per trait. Organism `i` takes the `i`-th value of
//! every column and the lineage seed derived for index `i`.

use std::collections::BTreeMap;

use evosim_types::{HeritableTraits, TraitKind};
use evosim_world::{SeedStream, SeedTree, TruncatedNormal};
use tracing::debug;

use crate::error::OrganismError;
use crate::organism::Organism;

/// One truncated normal per heritable trait.
#[derive(Debug, Clone)]
pub struct TraitDistributions {
    /// Distribution of every trait in [`TraitKind::ALL`].
    distributions: BTreeMap<TraitKind, TruncatedNormal>,
}

impl TraitDistributions {
    /// Bundle per-trait distributions.
    ///
    /// # Errors
    ///
    /// Returns [`OrganismError::MissingTrait`] for the first trait of
    /// [`TraitKind::ALL`] without a distribution.
    pub fn new(distributions: BTreeMap<TraitKind, TruncatedNormal>) -> Result<Self, OrganismError> {
        if let Some(missing) = TraitKind::ALL
            .into_iter()
            .find(|kind| !distributions.contains_key(kind))
        {
            return Err(OrganismError::MissingTrait(missing));
        }
        Ok(Self { distributions })
    }

    /// Distribution of a single trait.
    pub fn get(&self, kind: TraitKind) -> Option<&TruncatedNormal> {
        self.distributions.get(&kind)
    }

    /// Sample `n` organisms.
    ///
    /// Columns are drawn in [`TraitKind::ALL`] order from the trait-column
    /// streams of `seeds`; lineage seeds come from the organism streams.
    pub fn sample_population(&self, n: usize, seeds: &SeedTree) -> Vec<Organism> {
        let columns: BTreeMap<TraitKind, Vec<f64>> = self
            .distributions
            .iter()
            .map(|(&kind, distribution)| {
                let mut rng = seeds.rng(SeedStream::TraitColumn(kind));
                (kind, distribution.sample_n(&mut rng, n))
            })
            .collect();

        let organisms: Vec<Organism> = (0..n)
            .map(|i| {
                let traits = HeritableTraits::from_fn(|kind| {
                    columns
                        .get(&kind)
                        .and_then(|column| column.get(i))
                        .copied()
                        .unwrap_or_default()
                });
                let index = u64::try_from(i).unwrap_or(u64::MAX);
                Organism::new(traits, seeds.derive(SeedStream::Organism(index)))
            })
            .collect();

        debug!(population = organisms.len(), root_seed = seeds.root(), "Seed population sampled");
        organisms
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn distributions() -> BTreeMap<TraitKind, TruncatedNormal> {
        let mut map = BTreeMap::new();
        map.insert(TraitKind::TemperatureIdeal, TruncatedNormal::new(20.0, 5.0, 10.0, 30.0).unwrap());
        map.insert(TraitKind::TemperatureRange, TruncatedNormal::new(5.0, 2.0, 1.0, 10.0).unwrap());
        map.insert(TraitKind::Resilience, TruncatedNormal::new(0.3, 0.1, 0.0, 1.0).unwrap());
        map.insert(TraitKind::Fertility, TruncatedNormal::new(2.0, 1.0, 0.0, 5.0).unwrap());
        map.insert(TraitKind::MutationChance, TruncatedNormal::new(0.1, 0.05, 0.0, 1.0).unwrap());
        map
    }

    #[test]
    fn missing_trait_is_rejected() {
        let mut map = distributions();
        map.remove(&TraitKind::Resilience);
        assert!(matches!(
            TraitDistributions::new(map),
            Err(OrganismError::MissingTrait(TraitKind::Resilience))
        ));
    }

    #[test]
    fn sampled_traits_respect_bounds() {
        let traits = TraitDistributions::new(distributions()).unwrap();
        let population = traits.sample_population(200, &SeedTree::new(3));
        assert_eq!(population.len(), 200);
        for organism in &population {
            let t = organism.traits();
            assert!((10.0..=30.0).contains(&t.temperature_ideal));
            assert!((1.0..=10.0).contains(&t.temperature_range));
            assert!((0.0..=1.0).contains(&t.resilience));
            assert!((0.0..=5.0).contains(&t.fertility));
            assert!((0.0..=1.0).contains(&t.mutation_chance));
            assert!(organism.current_score().is_none());
        }
    }

    #[test]
    fn sampling_is_reproducible() {
        let traits = TraitDistributions::new(distributions()).unwrap();
        let a = traits.sample_population(20, &SeedTree::new(8));
        let b = traits.sample_population(20, &SeedTree::new(8));
        assert_eq!(a, b);
    }

    #[test]
    fn organisms_get_distinct_lineage_seeds() {
        let traits = TraitDistributions::new(distributions()).unwrap();
        let population = traits.sample_population(50, &SeedTree::new(8));
        let seeds: std::collections::BTreeSet<u64> =
            population.iter().map(Organism::lineage_seed).collect();
        assert_eq!(seeds.len(), 50);
    }

    #[test]
    fn empty_population_is_allowed() {
        let traits = TraitDistributions::new(distributions()).unwrap();
        assert!(traits.sample_population(0, &SeedTree::new(1)).is_empty());
    }
}
