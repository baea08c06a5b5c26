use std::fmt;

use rand::Rng;
use rust_decimal::Decimal;

use crate::{
    WeightedRandom,
    error::WeightError,
    table::AliasTable,
    weight::{Weight, WeightedItem},
};

/// The randomness a sampler consumes.
///
/// Every [`rand::Rng`] is a `RandomSource`; implement it directly to
/// drive sampling from a scripted or external generator.
pub trait RandomSource {
    /// Uniform integer in `[0, n)`. Used for the fair bucket roll.
    fn uniform_int(&mut self, n: usize) -> usize;
    /// Uniform integer in `[0, m)`. Used to derive the coin toss.
    fn uniform_int64(&mut self, m: u64) -> u64;
}

impl<R: Rng + ?Sized> RandomSource for R {
    #[inline]
    fn uniform_int(&mut self, n: usize) -> usize {
        self.random_range(0..n)
    }
    #[inline]
    fn uniform_int64(&mut self, m: u64) -> u64 {
        self.random_range(0..m)
    }
}

/// How finely the biased coin toss is resolved.
///
/// The toss draws an integer below `10^coin_digits` and reads it as a
/// decimal fraction with `coin_digits` places, so the toss is exact.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SamplerConfig {
    coin_digits: u32,
}

impl SamplerConfig {
    pub const MAX_COIN_DIGITS: u32 = 18;

    /// Two digits: a toss granularity of 1%.
    pub const REFERENCE: Self = Self { coin_digits: 2 };

    /// # Errors
    /// [`WeightError::CoinPrecision`] unless `1 <= coin_digits <= 18`.
    pub fn new(coin_digits: u32) -> Result<Self, WeightError> {
        if coin_digits == 0 || coin_digits > Self::MAX_COIN_DIGITS {
            return Err(WeightError::CoinPrecision {
                digits: coin_digits,
            });
        }
        Ok(Self { coin_digits })
    }

    pub const fn coin_digits(&self) -> u32 {
        self.coin_digits
    }

    /// Number of distinct toss outcomes, `10^coin_digits`.
    pub const fn coin_resolution(&self) -> u64 {
        10u64.pow(self.coin_digits)
    }

    /// A uniform value in `[0, 1)`.
    #[inline]
    pub(crate) fn toss<R: RandomSource + ?Sized>(&self, rng: &mut R) -> Decimal {
        let k = rng.uniform_int64(self.coin_resolution());
        Decimal::from_i128_with_scale(i128::from(k), self.coin_digits)
    }
}

impl Default for SamplerConfig {
    fn default() -> Self {
        Self { coin_digits: 9 }
    }
}

/// An alias table bundled with the random source that drives it.
///
/// This is the handle most callers want: build it once, then call
/// [`next`](WeightedRandom::next) as often as needed. To share one table
/// across threads, keep the [`AliasTable`] and give each thread its own
/// generator instead.
#[derive(Debug, Clone)]
pub struct VoseAlias<T, R> {
    random: R,
    table: AliasTable<T>,
    config: SamplerConfig,
}

impl<T, R: RandomSource> VoseAlias<T, R> {
    /// # Errors
    /// See [`AliasTable::new`].
    ///
    /// # Examples
    /// ```rust
    /// use rand::{SeedableRng, rngs::StdRng};
    /// use weightedrand::{VoseAlias, WeightedItem, WeightedRandom};
    ///
    /// let mut wr = VoseAlias::new(
    ///     StdRng::seed_from_u64(1337),
    ///     [WeightedItem::new("silksong", 1u32), WeightedItem::new("stardew", 3)],
    /// )?;
    /// let pick = wr.next();
    /// assert!(pick == "silksong" || pick == "stardew");
    /// # Ok::<(), weightedrand::WeightError>(())
    /// ```
    pub fn new<I, W>(random: R, items: I) -> Result<Self, WeightError>
    where
        I: IntoIterator<Item = WeightedItem<T, W>>,
        W: Weight,
    {
        Self::with_config(random, items, SamplerConfig::default())
    }

    pub fn with_config<I, W>(random: R, items: I, config: SamplerConfig) -> Result<Self, WeightError>
    where
        I: IntoIterator<Item = WeightedItem<T, W>>,
        W: Weight,
    {
        let table = AliasTable::new(items)?;
        Ok(Self {
            random,
            table,
            config,
        })
    }

    pub fn from_table(random: R, table: AliasTable<T>) -> Self {
        Self {
            random,
            table,
            config: SamplerConfig::default(),
        }
    }

    pub fn set_config(&mut self, config: SamplerConfig) {
        self.config = config;
    }

    /// Draw one item without cloning it.
    #[inline]
    pub fn next_ref(&mut self) -> &T {
        let i = self.table.sample_index_with(&mut self.random, self.config);
        &self.table.items()[i]
    }

    pub fn table(&self) -> &AliasTable<T> {
        &self.table
    }

    pub fn config(&self) -> SamplerConfig {
        self.config
    }

    pub fn into_parts(self) -> (AliasTable<T>, R) {
        (self.table, self.random)
    }
}

impl<T: Clone, R: RandomSource> WeightedRandom<T> for VoseAlias<T, R> {
    #[inline]
    fn next(&mut self) -> T {
        self.next_ref().clone()
    }
}

impl<T: fmt::Debug, R> fmt::Display for VoseAlias<T, R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{{random: {}, tuples: {}}}",
            std::any::type_name::<R>(),
            self.table
        )
    }
}
