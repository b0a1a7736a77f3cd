//! Speciation by compatibility distance.

use super::config::NeatConfig;
use super::genome::Genome;

/// A group of structurally similar genomes.
#[derive(Debug, Clone)]
pub struct Species {
    /// Identifier, unique within a run.
    pub id: usize,
    /// Genome new members are compared against.
    pub representative: Genome,
    /// Indices into the current population.
    pub members: Vec<usize>,
    /// Best fitness the species has ever reached.
    pub best_fitness: f64,
    /// Generation at which `best_fitness` last improved.
    pub last_improved: usize,
}

impl Species {
    fn new(id: usize, representative: Genome, generation: usize) -> Self {
        Self {
            id,
            representative,
            members: Vec::new(),
            best_fitness: f64::NEG_INFINITY,
            last_improved: generation,
        }
    }

    /// Whether the species went `limit` generations without improving.
    pub fn is_stagnant(&self, generation: usize, limit: usize) -> bool {
        limit > 0 && generation.saturating_sub(self.last_improved) >= limit
    }
}

/// Assigns every genome of `population` to exactly one species.
///
/// Existing species keep their representative from the previous
/// generation; genomes matching none of them found a new species.
/// Empty species are dropped, and each surviving species takes its first
/// member as the representative for the next round. Fitness records are
/// refreshed from the (already evaluated) members.
pub fn speciate(
    population: &[Genome],
    species: &mut Vec<Species>,
    next_id: &mut usize,
    config: &NeatConfig,
    generation: usize,
) {
    for s in species.iter_mut() {
        s.members.clear();
    }

    for (idx, genome) in population.iter().enumerate() {
        let home = species.iter().position(|s| {
            genome.distance(
                &s.representative,
                config.disjoint_coefficient,
                config.weight_coefficient,
            ) < config.compatibility_threshold
        });
        match home {
            Some(i) => species[i].members.push(idx),
            None => {
                let mut s = Species::new(*next_id, genome.clone(), generation);
                *next_id += 1;
                s.members.push(idx);
                species.push(s);
            }
        }
    }

    species.retain(|s| !s.members.is_empty());

    for s in species.iter_mut() {
        s.representative = population[s.members[0]].clone();
        let best = s
            .members
            .iter()
            .map(|&i| population[i].fitness())
            .fold(f64::NEG_INFINITY, f64::max);
        if best > s.best_fitness {
            s.best_fitness = best;
            s.last_improved = generation;
        }
    }
}

/// Splits `total` offspring between species in proportion to their
/// shared (adjusted) fitness.
///
/// Fitness is shifted so the worst genome scores zero, then divided by
/// species size (explicit fitness sharing). Rounding remainders go to the
/// largest fractional parts. Species at index `protect`, if any, always
/// receives at least one offspring.
pub fn allocate_offspring(
    population: &[Genome],
    species: &[Species],
    total: usize,
    protect: Option<usize>,
) -> Vec<usize> {
    if species.is_empty() {
        return Vec::new();
    }

    let min_fitness = species
        .iter()
        .flat_map(|s| s.members.iter().map(|&i| population[i].fitness()))
        .fold(f64::INFINITY, f64::min);

    let shares: Vec<f64> = species
        .iter()
        .map(|s| {
            let size = s.members.len() as f64;
            s.members
                .iter()
                .map(|&i| (population[i].fitness() - min_fitness) / size)
                .sum()
        })
        .collect();
    let total_share: f64 = shares.iter().sum();

    let exact: Vec<f64> = if total_share > 0.0 && total_share.is_finite() {
        shares
            .iter()
            .map(|s| s / total_share * total as f64)
            .collect()
    } else {
        vec![total as f64 / species.len() as f64; species.len()]
    };

    let mut counts: Vec<usize> = exact.iter().map(|e| e.floor() as usize).collect();
    let assigned: usize = counts.iter().sum();
    let mut order: Vec<usize> = (0..species.len()).collect();
    order.sort_by(|&a, &b| {
        let fa = exact[a] - exact[a].floor();
        let fb = exact[b] - exact[b].floor();
        fb.partial_cmp(&fa).unwrap_or(std::cmp::Ordering::Equal)
    });
    for &i in order.iter().cycle().take(total.saturating_sub(assigned)) {
        counts[i] += 1;
    }

    if let Some(p) = protect {
        if p < counts.len() && counts[p] == 0 {
            if let Some(donor) = (0..counts.len()).max_by_key(|&i| counts[i]) {
                if counts[donor] > 0 {
                    counts[donor] -= 1;
                    counts[p] += 1;
                }
            }
        }
    }

    counts
}
