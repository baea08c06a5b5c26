//! Vose's alias method: O(n) construction, O(1) sampling.

use std::collections::VecDeque;
use std::fmt;

use rust_decimal::Decimal;
use tracing::{debug, trace};

use crate::error::WeightError;
use crate::sampler::{RandomSource, SamplerConfig};
use crate::weight::{self, Weight, WeightedItem};

/// One bucket of capacity one.
///
/// A coin toss below [`probability`](Self::probability) lands on the
/// primary item, anything else lands on the alias. Pure buckets have a
/// probability of exactly one and no alias.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AliasTuple {
    probability: Decimal,
    primary: usize,
    alias: Option<usize>,
}

impl AliasTuple {
    /// Chance of landing on the primary item, in `[0, 1]`.
    pub fn probability(&self) -> Decimal {
        self.probability
    }

    /// Index of the primary item in [`AliasTable::items`].
    pub fn primary(&self) -> usize {
        self.primary
    }

    /// Index of the aliased item, absent for pure buckets.
    pub fn alias(&self) -> Option<usize> {
        self.alias
    }

    pub fn is_pure(&self) -> bool {
        self.alias.is_none()
    }

    #[inline]
    fn resolve(&self, toss: Decimal) -> usize {
        match self.alias {
            Some(alias) if toss >= self.probability => alias,
            _ => self.primary,
        }
    }
}

/// An immutable alias table over a fixed set of weighted items.
///
/// The table holds no random state, so it can be shared freely between
/// threads as long as each caller brings its own [`RandomSource`].
#[derive(Debug, Clone)]
pub struct AliasTable<T> {
    tuples: Vec<AliasTuple>,
    items: Vec<T>,
}

/// Normalized weight waiting in one of the worklists.
#[derive(Debug, Clone, Copy)]
struct Work {
    index: usize,
    weight: Decimal,
}

impl<T> AliasTable<T> {
    /// Build from weighted items, keeping their input order in [`items`](Self::items).
    ///
    /// # Errors
    /// * [`WeightError::Empty`] if there are no items.
    /// * [`WeightError::Negative`] if any weight is below zero.
    /// * [`WeightError::Unrepresentable`] if a weight does not fit a decimal.
    /// * [`WeightError::Overflow`] if the weights cannot be summed or rescaled.
    ///
    /// # Complexity
    /// O(n log n) for the initial ordering, O(n) for the pairing itself.
    pub fn new<I, W>(items: I) -> Result<Self, WeightError>
    where
        I: IntoIterator<Item = WeightedItem<T, W>>,
        W: Weight,
    {
        let iter = items.into_iter();
        let (lower, _) = iter.size_hint();
        let mut values = Vec::with_capacity(lower);
        let mut weights = Vec::with_capacity(lower);
        for (index, WeightedItem { item, weight: raw }) in iter.enumerate() {
            weights.push(weight::coerce(index, raw)?);
            values.push(item);
        }

        let total = weight::normalize(&mut weights)?;
        let tuples = pair_buckets(&weights);
        let pure = tuples.iter().filter(|t| t.is_pure()).count();
        debug!(
            items = tuples.len(),
            %total,
            pure,
            aliased = tuples.len() - pure,
            "built alias table"
        );

        Ok(Self {
            tuples,
            items: values,
        })
    }

    /// Build from `(item, weight)` pairs. See [`new`](Self::new).
    pub fn from_pairs<I, W>(pairs: I) -> Result<Self, WeightError>
    where
        I: IntoIterator<Item = (T, W)>,
        W: Weight,
    {
        Self::new(pairs.into_iter().map(WeightedItem::from))
    }

    /// Draw an item index using the default coin precision.
    #[inline]
    pub fn sample_index<R: RandomSource + ?Sized>(&self, rng: &mut R) -> usize {
        self.sample_index_with(rng, SamplerConfig::default())
    }

    /// Draw an item index: a fair roll picks the bucket, a biased coin
    /// picks between its primary and alias.
    #[inline]
    pub fn sample_index_with<R: RandomSource + ?Sized>(
        &self,
        rng: &mut R,
        config: SamplerConfig,
    ) -> usize {
        let bucket = &self.tuples[rng.uniform_int(self.tuples.len())];
        bucket.resolve(config.toss(rng))
    }

    /// Sample an item **by reference**.
    pub fn sample<'a, R: RandomSource + ?Sized>(&'a self, rng: &mut R) -> &'a T {
        &self.items[self.sample_index(rng)]
    }

    /// Sample an item **by value** (clones the chosen element).
    pub fn sample_owned<R: RandomSource + ?Sized>(&self, rng: &mut R) -> T
    where
        T: Clone,
    {
        self.sample(rng).clone()
    }

    /// Number of buckets, always equal to the number of items.
    pub fn len(&self) -> usize {
        self.tuples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tuples.is_empty()
    }

    /// Items in the order they were supplied.
    pub fn items(&self) -> &[T] {
        &self.items
    }

    pub fn tuples(&self) -> &[AliasTuple] {
        &self.tuples
    }
}

fn pair_buckets(weights: &[Decimal]) -> Vec<AliasTuple> {
    let mut order: Vec<usize> = (0..weights.len()).collect();
    // stable: ties keep input order
    order.sort_by(|&a, &b| weights[a].cmp(&weights[b]));
    let split = order.partition_point(|&i| weights[i] < Decimal::ONE);

    let work = |&index: &usize| Work {
        index,
        weight: weights[index],
    };
    let mut small: VecDeque<Work> = order[..split].iter().map(work).collect();
    let mut large: VecDeque<Work> = order[split..].iter().map(work).collect();

    let mut tuples = Vec::with_capacity(weights.len());
    while let Some((lesser, greater)) = pop_pair(&mut small, &mut large) {
        trace!(
            primary = lesser.index,
            alias = greater.index,
            probability = %lesser.weight,
            "paired buckets"
        );
        tuples.push(AliasTuple {
            probability: lesser.weight,
            primary: lesser.index,
            alias: Some(greater.index),
        });

        let residual = Work {
            index: greater.index,
            weight: greater.weight + lesser.weight - Decimal::ONE,
        };
        if residual.weight < Decimal::ONE {
            small.push_back(residual);
        } else {
            large.push_back(residual);
        }
    }

    // Leftovers on either side carry rounding slack; they fill whole buckets.
    tuples.extend(large.into_iter().chain(small).map(|w| AliasTuple {
        probability: Decimal::ONE,
        primary: w.index,
        alias: None,
    }));
    tuples
}

fn pop_pair(small: &mut VecDeque<Work>, large: &mut VecDeque<Work>) -> Option<(Work, Work)> {
    if small.is_empty() || large.is_empty() {
        return None;
    }
    Some((small.pop_front()?, large.pop_front()?))
}

impl<T: fmt::Debug> fmt::Display for AliasTable<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("[")?;
        for (i, tuple) in self.tuples.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(
                f,
                "{{probability: {}, primary: {:?}, alias: ",
                tuple.probability.normalize(),
                self.items[tuple.primary]
            )?;
            match tuple.alias {
                Some(alias) => write!(f, "{:?}}}", self.items[alias])?,
                None => f.write_str("[nil]}")?,
            }
        }
        f.write_str("]")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use rand::{SeedableRng, rngs::StdRng};
    use std::str::FromStr;

    const DRAWS: usize = 100_000;
    const TOLERANCE: f64 = 0.05;

    #[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
    enum Marble {
        Blue,
        Red,
        Yellow,
        Green,
    }

    fn counts<T>(table: &AliasTable<T>, seed: u64) -> Vec<usize> {
        let mut rng = StdRng::seed_from_u64(seed);
        let mut counts = vec![0usize; table.len()];
        for _ in 0..DRAWS {
            counts[table.sample_index(&mut rng)] += 1;
        }
        counts
    }

    fn assert_within_tolerance(name: &str, weights: &[u32]) {
        let marbles = [Marble::Blue, Marble::Red, Marble::Yellow, Marble::Green];
        let table =
            AliasTable::from_pairs(marbles.iter().copied().zip(weights.iter().copied())).unwrap();

        let effective: Vec<f64> = weights
            .iter()
            .map(|&w| if w == 0 { 1.0 } else { f64::from(w) })
            .collect();
        let total: f64 = effective.iter().sum();

        for (i, &c) in counts(&table, 7).iter().enumerate() {
            let expected = effective[i] / total;
            let observed = c as f64 / DRAWS as f64;
            assert!(
                (observed - expected).abs() <= TOLERANCE,
                "{name}: {:?} observed {observed} expected {expected}",
                table.items()[i]
            );
        }
    }

    #[test]
    fn rejects_bad_inputs() {
        let empty: [(u8, u32); 0] = [];
        assert_eq!(
            AliasTable::from_pairs(empty).unwrap_err(),
            WeightError::Empty
        );
        assert!(matches!(
            AliasTable::from_pairs([("a", 1i32), ("b", -1)]),
            Err(WeightError::Negative { index: 1, .. })
        ));
        assert!(matches!(
            AliasTable::from_pairs([("a", Decimal::NEGATIVE_ONE)]),
            Err(WeightError::Negative { index: 0, .. })
        ));
        assert!(matches!(
            AliasTable::from_pairs([("a", u128::MAX)]),
            Err(WeightError::Unrepresentable { index: 0, .. })
        ));
    }

    #[test]
    fn one_to_three_layout() {
        let table = AliasTable::from_pairs([("a", 1u8), ("b", 3)]).unwrap();
        let half = Decimal::from_str("0.5").unwrap();
        assert_eq!(
            table.tuples(),
            &[
                AliasTuple {
                    probability: half,
                    primary: 0,
                    alias: Some(1),
                },
                AliasTuple {
                    probability: Decimal::ONE,
                    primary: 1,
                    alias: None,
                },
            ]
        );
        assert_eq!(
            table.to_string(),
            "[{probability: 0.5, primary: \"a\", alias: \"b\"}, \
             {probability: 1, primary: \"b\", alias: [nil]}]"
        );
    }

    #[test]
    fn residuals_requeue_onto_large() {
        let table = AliasTable::from_pairs([('x', 1u16), ('y', 1), ('z', 3)]).unwrap();
        let p = Decimal::from_str("0.6").unwrap();
        let primaries: Vec<_> = table.tuples().iter().map(|t| t.primary()).collect();
        assert_eq!(primaries, vec![0, 1, 2]);
        assert_eq!(table.tuples()[0].probability(), p);
        assert_eq!(table.tuples()[1].probability(), p);
        assert_eq!(table.tuples()[0].alias(), Some(2));
        assert_eq!(table.tuples()[1].alias(), Some(2));
        assert!(table.tuples()[2].is_pure());
    }

    #[test]
    fn degenerate_singleton() {
        let table = AliasTable::from_pairs([("only", 0u64)]).unwrap();
        assert_eq!(table.tuples()[0].probability(), Decimal::ONE);
        let mut rng = StdRng::seed_from_u64(1);
        for _ in 0..1000 {
            assert_eq!(*table.sample(&mut rng), "only");
        }
    }

    #[test]
    fn frequencies_match_weights() {
        assert_within_tolerance("1(unweighted):3", &[0, 3]);
        assert_within_tolerance("1:3", &[1, 3]);
        assert_within_tolerance("1(unweighted):1(unweighted)", &[0, 0]);
        assert_within_tolerance("1(unweighted):1", &[0, 1]);
        assert_within_tolerance("1:1", &[1, 1]);
        assert_within_tolerance("1:1:1", &[1, 1, 1]);
        assert_within_tolerance("1:1:3", &[1, 1, 3]);
        assert_within_tolerance("1(unweighted):1(unweighted):3", &[0, 0, 3]);
        assert_within_tolerance("1:5:100", &[1, 5, 100]);
        assert_within_tolerance("1:5:15:100", &[1, 5, 15, 100]);
        assert_within_tolerance("1:50:100:1000", &[1, 50, 100, 1000]);
    }

    #[test]
    fn one_to_three_counts() {
        let table = AliasTable::from_pairs([("a", 1u32), ("b", 3)]).unwrap();
        let c = counts(&table, 42);
        assert!((20_000..=30_000).contains(&c[0]), "a drawn {} times", c[0]);
        assert!((70_000..=80_000).contains(&c[1]), "b drawn {} times", c[1]);
    }

    #[test]
    fn rare_item_in_skewed_table() {
        let table =
            AliasTable::from_pairs([(0, 1u32), (1, 50), (2, 100), (3, 1000)]).unwrap();
        let c = counts(&table, 1151);
        // expectation is DRAWS / 1151, roughly 87
        assert!((40..=140).contains(&c[0]), "rare item drawn {} times", c[0]);
    }

    #[test]
    fn reconstruction_is_deterministic() {
        let pairs = [("a", 2u32), ("b", 9), ("c", 0), ("d", 31)];
        let first = AliasTable::from_pairs(pairs).unwrap();
        let second = AliasTable::from_pairs(pairs).unwrap();
        assert_eq!(first.tuples(), second.tuples());

        let mut r1 = StdRng::seed_from_u64(99);
        let mut r2 = StdRng::seed_from_u64(99);
        for _ in 0..1000 {
            assert_eq!(first.sample(&mut r1), second.sample(&mut r2));
        }
    }

    #[test]
    fn decimal_weights_are_accepted() {
        let table = AliasTable::from_pairs([
            ("tenth", Decimal::from_str("0.1").unwrap()),
            ("rest", Decimal::from_str("0.9").unwrap()),
        ])
        .unwrap();
        assert_eq!(
            table.tuples()[0].probability(),
            Decimal::from_str("0.2").unwrap()
        );
    }

    #[test]
    fn weights_near_decimal_range_still_build() {
        let big = Decimal::from_str("50000000000000000000000000000").unwrap();
        let table = AliasTable::from_pairs([("big", big), ("tiny", Decimal::ONE)]).unwrap();
        assert_eq!(table.len(), 2);
        let mut rng = StdRng::seed_from_u64(11);
        for _ in 0..1000 {
            assert_eq!(*table.sample(&mut rng), "big");
        }

        let half_range = 1i128 << 95;
        let table = AliasTable::from_pairs([("a", half_range), ("b", half_range)]).unwrap();
        assert!(table.tuples().iter().all(|t| t.is_pure()));
    }

    #[test]
    fn thousands_of_items_across_nine_decades() {
        const N: usize = 3000;
        // weights span 1 ..= 9 * 10^8
        let weights: Vec<u64> = (0..N)
            .map(|i| (1 + (i as u64 * 7919) % 9) * 10u64.pow((i % 9) as u32))
            .collect();
        let table = AliasTable::from_pairs(weights.iter().copied().enumerate()).unwrap();
        assert_eq!(table.len(), N);

        for t in table.tuples() {
            assert!(t.probability() >= Decimal::ZERO);
            assert!(t.probability() <= Decimal::ONE);
            assert_eq!(t.alias().is_none(), t.probability() == Decimal::ONE);
        }

        let total = Decimal::from(weights.iter().sum::<u64>());
        let n = Decimal::from(N);
        let eps = Decimal::from_str("0.000000000000000001").unwrap();
        for (i, got) in bucket_mass(&table).iter().enumerate() {
            let want = Decimal::from(weights[i]) * n / total;
            assert!((*got - want).abs() < eps, "item {i}: mass {got} vs {want}");
        }
    }

    fn bucket_mass(table: &AliasTable<usize>) -> Vec<Decimal> {
        let mut mass = vec![Decimal::ZERO; table.len()];
        for t in table.tuples() {
            mass[t.primary()] += t.probability();
            if let Some(alias) = t.alias() {
                mass[alias] += Decimal::ONE - t.probability();
            }
        }
        mass
    }

    proptest! {
        #[test]
        fn tables_are_well_formed(weights in prop::collection::vec(0u32..10_000, 1..200)) {
            let table = AliasTable::from_pairs(weights.iter().copied().enumerate()).unwrap();
            prop_assert_eq!(table.len(), weights.len());

            let mut seen = vec![0usize; weights.len()];
            for t in table.tuples() {
                prop_assert!(t.probability() >= Decimal::ZERO);
                prop_assert!(t.probability() <= Decimal::ONE);
                prop_assert_eq!(t.alias().is_none(), t.probability() == Decimal::ONE);
                seen[t.primary()] += 1;
            }
            prop_assert!(seen.iter().all(|&s| s == 1));
        }

        #[test]
        fn buckets_preserve_probability_mass(weights in prop::collection::vec(0u64..1_000_000, 1..100)) {
            let table = AliasTable::from_pairs(weights.iter().copied().enumerate()).unwrap();

            let mut expected: Vec<Decimal> = weights
                .iter()
                .map(|&w| if w == 0 { Decimal::ONE } else { Decimal::from(w) })
                .collect();
            weight::normalize(&mut expected).unwrap();

            let eps = Decimal::from_str("0.000000000000000001").unwrap();
            for (got, want) in bucket_mass(&table).iter().zip(&expected) {
                prop_assert!((*got - *want).abs() < eps, "mass {} vs {}", got, want);
            }
        }
    }
}
