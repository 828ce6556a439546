//! The generation step: one round of scoring, selection, and reproduction.
//!
//! Each generation runs through these phases:
//!
//! 1. **Environment** -- step every attribute process to the generation
//!    index.
//! 2. **Scoring** -- compute each organism's food requirement and fitness.
//! 3. **Survival** -- one uniform draw per organism; it dies if its fitness
//!    is below the draw.
//! 4. **Record** -- summarize the scored population (survivors and
//!    casualties alike) into a [`GenerationRecord`].
//! 5. **Halt check** -- fewer than two survivors ends the run.
//! 6. **Admission** -- the fittest survivors are admitted to the breeding
//!    pool until the food budget is reached.
//! 7. **Pairing** -- the pool is shuffled and paired off; an odd organism out
//!    does not reproduce.
//! 8. **Reproduction** -- each pair produces its offspring.
//! 9. **Replacement** -- the offspring become the next population and the
//!    food accumulator is reset.
//!
//! Survival draws and the shuffle come from the ecosystem's own stream, so a
//! generation is deterministic given the root seed.

use evosim_organisms::{Organism, ReproductionConfig, ReproductionPair};
use evosim_types::{EnvironmentConditions, GenerationRecord};
use rand::Rng;
use rand::seq::SliceRandom;
use tracing::{debug, warn};

use crate::ecosystem::{Ecosystem, EcosystemError, EcosystemState};
use crate::stats;

/// Whether the run can continue after a generation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GenerationOutcome {
    /// Offspring replaced the population.
    Advanced,
    /// Fewer than two organisms survived; no reproduction took place.
    Halted,
}

/// Summary of a single executed generation.
#[derive(Debug, Clone, PartialEq)]
pub struct GenerationSummary {
    /// The generation index.
    pub generation: u32,
    /// Conditions during the generation.
    pub conditions: EnvironmentConditions,
    /// Statistics over the scored population.
    pub record: GenerationRecord,
    /// Organisms that passed the survival test.
    pub survivors: usize,
    /// Survivors admitted to the breeding pool.
    pub admitted: usize,
    /// Pairs formed from the pool.
    pub pairs: usize,
    /// Children produced.
    pub offspring: usize,
    /// Food consumed by admitted survivors.
    pub utilized_food: f64,
    /// Whether the run continues.
    pub outcome: GenerationOutcome,
}

/// Execute one generation.
///
/// The record is produced before the halt check, so a halting generation is
/// still recorded. On halt the scored population is kept and no offspring
/// are produced.
///
/// # Errors
///
/// Returns [`EcosystemError::InvalidState`] unless the ecosystem is running,
/// [`EcosystemError::World`] if the attribute sequences are shorter than
/// `generation`, and [`EcosystemError::Organism`] if scoring fails.
pub fn run_generation(
    ecosystem: &mut Ecosystem,
    generation: u32,
) -> Result<GenerationSummary, EcosystemError> {
    if !matches!(ecosystem.state, EcosystemState::Running { .. }) {
        return Err(EcosystemError::InvalidState {
            operation: "run a generation",
            state: ecosystem.state,
        });
    }
    let mut organisms = ecosystem
        .organisms
        .take()
        .ok_or(EcosystemError::InvalidState {
            operation: "run a generation without organisms",
            state: ecosystem.state,
        })?;
    ecosystem.state = EcosystemState::Running { generation };
    ecosystem.utilized_food = 0.0;

    // --- Phase 1: Environment ---
    let index = usize::try_from(generation).unwrap_or(usize::MAX);
    let conditions = match ecosystem.step_attributes(index) {
        Ok(conditions) => conditions,
        Err(e) => {
            ecosystem.organisms = Some(organisms);
            return Err(e);
        }
    };

    // --- Phases 2-3: Scoring and survival ---
    if let Err(e) = score_and_test(&mut organisms, &conditions, &mut ecosystem.rng) {
        ecosystem.organisms = Some(organisms);
        return Err(e);
    }

    // --- Phase 4: Record ---
    let record = stats::build_record(generation, &conditions, &organisms);
    let survivors = organisms.iter().filter(|o| o.survives()).count();

    // --- Phase 5: Halt check ---
    if survivors < 2 {
        warn!(
            generation,
            survivors,
            population = organisms.len(),
            "Too few survivors to reproduce, halting"
        );
        ecosystem.organisms = Some(organisms);
        ecosystem.state = EcosystemState::Halted { generation };
        return Ok(GenerationSummary {
            generation,
            conditions,
            record,
            survivors,
            admitted: 0,
            pairs: 0,
            offspring: 0,
            utilized_food: 0.0,
            outcome: GenerationOutcome::Halted,
        });
    }

    // --- Phase 6: Admission ---
    let living: Vec<Organism> = organisms.into_iter().filter(Organism::survives).collect();
    let (pool, utilized_food) = admit_reproducers(living, conditions.food);
    ecosystem.utilized_food = utilized_food;
    let admitted = pool.len();

    // --- Phase 7: Pairing ---
    let (mut pairs, unpaired) = breeding_pairs(pool, &mut ecosystem.rng);

    // --- Phases 8-9: Reproduction and replacement ---
    let next = reproduce(&mut pairs, &ecosystem.reproduction);
    let offspring = next.len();

    debug!(
        generation,
        survivors,
        admitted,
        pairs = pairs.len(),
        unpaired = unpaired.is_some(),
        offspring,
        utilized_food,
        available_food = conditions.food,
        "Generation reproduced"
    );

    ecosystem.organisms = Some(next);
    ecosystem.utilized_food = 0.0;

    Ok(GenerationSummary {
        generation,
        conditions,
        record,
        survivors,
        admitted,
        pairs: pairs.len(),
        offspring,
        utilized_food,
        outcome: GenerationOutcome::Advanced,
    })
}

/// Score every organism and run its survival test, one draw each in
/// population order.
fn score_and_test<R: Rng + ?Sized>(
    organisms: &mut [Organism],
    conditions: &EnvironmentConditions,
    rng: &mut R,
) -> Result<(), EcosystemError> {
    for organism in organisms {
        organism.score(conditions)?;
        let draw: f64 = rng.random();
        organism.survival_test(draw)?;
    }
    Ok(())
}

/// Admit the fittest survivors to the breeding pool.
///
/// Survivors are taken in descending fitness order while the food consumed
/// so far is below `food_budget`. The organism that crosses the budget is
/// still admitted. Returns the pool and the food it consumed.
pub fn admit_reproducers(mut survivors: Vec<Organism>, food_budget: f64) -> (Vec<Organism>, f64) {
    survivors.sort_by(|a, b| {
        let fa = a.fitness().unwrap_or(0.0);
        let fb = b.fitness().unwrap_or(0.0);
        fa.total_cmp(&fb)
    });

    let mut pool = Vec::with_capacity(survivors.len());
    let mut utilized_food = 0.0;
    while utilized_food < food_budget {
        let Some(organism) = survivors.pop() else {
            break;
        };
        utilized_food += organism.food_requirement().unwrap_or(0.0);
        pool.push(organism);
    }
    (pool, utilized_food)
}

/// Pair off a shuffled pool from the back, two at a time.
///
/// Returns the pairs and the organism left over from an odd-sized pool.
pub fn form_pairs(mut pool: Vec<Organism>) -> (Vec<ReproductionPair>, Option<Organism>) {
    let mut pairs = Vec::with_capacity(pool.len() / 2);
    while pool.len() > 1 {
        let (Some(a), Some(b)) = (pool.pop(), pool.pop()) else {
            break;
        };
        pairs.push(ReproductionPair::new(&a, &b));
    }
    (pairs, pool.pop())
}

/// Shuffle the admitted pool, then pair it off.
///
/// The pool arrives in descending fitness order; the shuffle decouples
/// mates from fitness rank.
pub fn breeding_pairs<R: Rng + ?Sized>(
    mut pool: Vec<Organism>,
    rng: &mut R,
) -> (Vec<ReproductionPair>, Option<Organism>) {
    pool.shuffle(rng);
    form_pairs(pool)
}

/// Produce every pair's offspring, in pair order.
fn reproduce(pairs: &mut [ReproductionPair], config: &ReproductionConfig) -> Vec<Organism> {
    pairs
        .iter_mut()
        .flat_map(|pair| pair.produce_offspring(config))
        .collect()
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::float_cmp)]
mod tests {
    use evosim_types::HeritableTraits;

    use super::*;

    fn conditions(food: f64) -> EnvironmentConditions {
        EnvironmentConditions {
            temperature: 20.0,
            temperature_min: 0.0,
            temperature_max: 40.0,
            hazard_rate: 0.0,
            food,
        }
    }

    fn scored(resilience: f64, temperature_range: f64, seed: u64) -> Organism {
        let mut o = Organism::new(
            HeritableTraits {
                temperature_ideal: 20.0,
                temperature_range,
                resilience,
                fertility: 2.0,
                mutation_chance: 0.0,
            },
            seed,
        );
        o.score(&conditions(100.0)).unwrap();
        o
    }

    #[test]
    fn admission_prefers_fitter_organisms() {
        let weak = scored(0.0, 4.0, 1);
        let strong = scored(0.2, 4.0, 2);
        let requirement = strong.food_requirement().unwrap();

        // Budget is exhausted by the first admission.
        let (pool, used) = admit_reproducers(vec![weak, strong], requirement * 0.5);
        assert_eq!(pool.len(), 1);
        assert_eq!(pool.first().unwrap().lineage_seed(), 2);
        assert!((used - requirement).abs() < 1e-12);
    }

    #[test]
    fn admission_stops_when_survivors_run_out() {
        let pool_in = vec![scored(0.1, 4.0, 1), scored(0.1, 4.0, 2)];
        let (pool, _) = admit_reproducers(pool_in, 1.0e9);
        assert_eq!(pool.len(), 2);
    }

    #[test]
    fn zero_budget_admits_nobody() {
        let (pool, used) = admit_reproducers(vec![scored(0.1, 4.0, 1)], 0.0);
        assert!(pool.is_empty());
        assert_eq!(used, 0.0);
    }

    #[test]
    fn odd_pool_leaves_one_unpaired() {
        let pool = vec![
            scored(0.1, 4.0, 1),
            scored(0.1, 4.0, 2),
            scored(0.1, 4.0, 3),
        ];
        let (pairs, unpaired) = form_pairs(pool);
        assert_eq!(pairs.len(), 1);
        assert_eq!(unpaired.unwrap().lineage_seed(), 1);
    }

    #[test]
    fn even_pool_pairs_everyone() {
        let pool = vec![
            scored(0.1, 4.0, 1),
            scored(0.1, 4.0, 2),
            scored(0.1, 4.0, 3),
            scored(0.1, 4.0, 4),
        ];
        let (pairs, unpaired) = form_pairs(pool);
        assert_eq!(pairs.len(), 2);
        assert!(unpaired.is_none());
    }

    #[test]
    fn shuffle_breaks_fitness_rank_pairing() {
        // Distinct fitness: 0.75 + resilience.
        let pool = || -> Vec<Organism> {
            let survivors = (0..8_u32)
                .map(|i| scored(0.03 * f64::from(i), 4.0, u64::from(i)))
                .collect();
            admit_reproducers(survivors, 1.0e9).0
        };
        let ranked: Vec<u64> = pool().iter().map(Organism::lineage_seed).collect();
        assert_eq!(ranked, vec![7, 6, 5, 4, 3, 2, 1, 0]);

        // Unshuffled, the two least fit would always mate first.
        let (unshuffled, _) = form_pairs(pool());
        let (a, b) = unshuffled.first().unwrap().parents();
        assert_eq!((a.resilience, b.resilience), (0.0, 0.03));

        let rank_pairing = |seed: u64| {
            let mut rng = evosim_world::rng_from_seed(seed);
            let (pairs, unpaired) = breeding_pairs(pool(), &mut rng);
            assert_eq!(pairs.len(), 4);
            assert!(unpaired.is_none());
            pairs.iter().all(|pair| {
                let (a, b) = pair.parents();
                (a.resilience - b.resilience).abs() < 0.03 + 1e-9
            })
        };
        assert!(
            (0..20).any(|seed| !rank_pairing(seed)),
            "shuffled pools should not always pair neighbours in fitness rank"
        );
    }

    #[test]
    fn reproduce_yields_fertility_children_per_pair() {
        let (mut pairs, _) = form_pairs(vec![scored(0.1, 4.0, 1), scored(0.1, 4.0, 2)]);
        let children = reproduce(&mut pairs, &ReproductionConfig::default());
        assert_eq!(children.len(), 2);
        for child in &children {
            assert!(child.current_score().is_none());
        }
    }

    #[test]
    fn certain_survivors_all_pass() {
        let mut organisms = vec![scored(1.0, 50.0, 1), scored(1.0, 50.0, 2)];
        let mut rng = evosim_world::rng_from_seed(3);
        score_and_test(&mut organisms, &conditions(10.0), &mut rng).unwrap();
        assert!(organisms.iter().all(Organism::survives));
        assert!(organisms.iter().all(|o| o.fitness() == Some(1.0)));
    }
}
