//! Dataset partitioning into named subsets.
//!
//! Two interchangeable strategies: proportional random (seeded shuffle,
//! contiguous blocks) and predicate membership (e.g. by recording block).
//! A single split request must use one strategy throughout.

use crate::dataset::{Dataset, Utterance};
use crate::error::{CorpusError, Result};
use rand::SeedableRng;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use std::collections::BTreeMap;
use tracing::info;

/// How one named subset is filled.
pub enum SubsetRule {
    /// Fraction of the shuffled utterance set, `floor(fraction * total)` ids.
    Fraction(f64),
    /// Membership test over utterance metadata.
    Predicate(Box<dyn Fn(&Utterance) -> bool>),
}

impl SubsetRule {
    /// Predicate rule keeping utterances whose block is in `blocks`.
    pub fn block_membership(blocks: Vec<String>) -> Self {
        SubsetRule::Predicate(Box::new(move |utterance| {
            blocks.iter().any(|b| b == &utterance.session_or_block)
        }))
    }
}

/// Partition the dataset's utterance ids into the named subsets.
///
/// With fractional rules, ids beyond the sum of the floored subset sizes
/// are assigned to no subset at all: the remainder is dropped, never
/// redistributed. Predicate subsets may overlap or leave ids unassigned;
/// that is the caller's responsibility.
pub fn split(
    dataset: &Dataset,
    rules: Vec<(String, SubsetRule)>,
    seed: u64,
) -> Result<BTreeMap<String, Vec<String>>> {
    let fractional = rules
        .iter()
        .filter(|(_, r)| matches!(r, SubsetRule::Fraction(_)))
        .count();
    if fractional != 0 && fractional != rules.len() {
        return Err(CorpusError::InvalidSplitSpec {
            message: "subset rules must be all fractions or all predicates".to_string(),
        });
    }

    let subsets = if fractional > 0 {
        split_by_fractions(dataset, &rules, seed)?
    } else {
        split_by_predicates(dataset, &rules)
    };

    for (name, ids) in &subsets {
        info!("Subset {} holds {} utterances", name, ids.len());
    }
    Ok(subsets)
}

fn split_by_fractions(
    dataset: &Dataset,
    rules: &[(String, SubsetRule)],
    seed: u64,
) -> Result<BTreeMap<String, Vec<String>>> {
    let mut ids: Vec<String> = dataset.utterances.keys().cloned().collect();
    let mut rng = StdRng::seed_from_u64(seed);
    ids.shuffle(&mut rng);

    let total = ids.len();
    let mut subsets = BTreeMap::new();
    let mut cursor = 0usize;
    for (name, rule) in rules {
        let SubsetRule::Fraction(fraction) = rule else {
            unreachable!("rule homogeneity was checked by split()");
        };
        if !(0.0..=1.0).contains(fraction) {
            return Err(CorpusError::InvalidSplitSpec {
                message: format!("fraction {fraction} for subset {name} is outside [0, 1]"),
            });
        }

        let count = (fraction * total as f64) as usize;
        let end = (cursor + count).min(total);
        subsets.insert(name.clone(), ids[cursor..end].to_vec());
        cursor = end;
    }
    Ok(subsets)
}

fn split_by_predicates(
    dataset: &Dataset,
    rules: &[(String, SubsetRule)],
) -> BTreeMap<String, Vec<String>> {
    let mut subsets = BTreeMap::new();
    for (name, rule) in rules {
        let SubsetRule::Predicate(predicate) = rule else {
            unreachable!("rule homogeneity was checked by split()");
        };
        let ids: Vec<String> = dataset
            .utterances
            .values()
            .filter(|u| predicate(u))
            .map(|u| u.utterance_id.clone())
            .collect();
        subsets.insert(name.clone(), ids);
    }
    subsets
}
