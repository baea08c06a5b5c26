//! # weightedrand
//!
//! Weighted random selection in O(1) per draw, built on
//! [Vose's Alias Method](https://www.keithschwarz.com/darts-dice-coins/).
//!
//! Weights are integers of any width (or [`rust_decimal::Decimal`]) and are
//! normalized with exact decimal arithmetic, so no binary floating point
//! error creeps into the table.
//!
//! There are three ways in:
//!
//! 1. **A sampler handle** with [`VoseAlias::new`], which owns its random
//!    source and hands out items through [`WeightedRandom::next`].
//! 2. **A bare table** with [`AliasTable::from_pairs`], sampled with any
//!    caller supplied [`RandomSource`]. The table is immutable and can be
//!    shared across threads.
//! 3. **Compile-time enums** with the [`WeightedEnum`] derive macro (from the
//!    companion `weightedrand_macros` crate).
//!
//! ## Quick start
//!
//! ```rust
//! use rand::{SeedableRng, rngs::StdRng};
//! use weightedrand::{AliasTable, VoseAlias, WeightedItem, WeightedRandom};
//!
//! # fn main() -> Result<(), weightedrand::WeightError> {
//! let mut games = VoseAlias::new(
//!     StdRng::seed_from_u64(1337),
//!     [
//!         WeightedItem::new("Hollow Knight: Silksong", 1u32),
//!         WeightedItem::new("Don't Starve Together", 3),
//!         WeightedItem::new("Stardew Valley", 3),
//!         WeightedItem::new("Deep Rock Galactic", 7),
//!     ],
//! )?;
//! let tonight = games.next();
//!
//! let table = AliasTable::from_pairs([("sword", 1u8), ("shield", 3)])?;
//! let mut rng = rand::rng();
//! let loot = table.sample(&mut rng); // &&str
//! # let _ = (tonight, loot);
//! # Ok(()) }
//! ```
//!
//! ## Quick start (enum + macro)
//!
//! ```rust
//! use weightedrand::WeightedEnum;
//!
//! #[derive(Copy, Clone, Debug, WeightedEnum)]
//! enum Marble {
//!     #[weight(1)]  Red,
//!     #[weight(5)]  Orange,
//!     #[weight(100)] Yellow,
//!     Blue, // no weight: drawn as if weighted 1
//! }
//!
//! # fn main() -> Result<(), weightedrand::WeightError> {
//! let table = Marble::alias_table()?;
//! let marble = table.sample_owned(&mut rand::rng());
//! # let _ = marble;
//! # Ok(()) }
//! ```
//!
//! ## Performance
//! * **Build**: O(n log n) to order the weights, then O(n) pairing.
//! * **Sample**: O(1) per draw (2 random numbers, 1 decimal comparison).
//!
//! ## Gotchas
//! * A weight of **zero** is read as "unset" and behaves like a weight of
//!   one. There is no way to give an item zero probability; leave it out.
//! * Negative weights are rejected.
//! * Tables are fixed once built. If weights change, rebuild.

extern crate self as weightedrand;

mod error;
mod sampler;
mod table;
mod weight;

pub use error::WeightError;
pub use sampler::{RandomSource, SamplerConfig, VoseAlias};
pub use table::{AliasTable, AliasTuple};
pub use weight::{Weight, WeightedItem};

/// Derive macro imported from `weightedrand_macros`.
/// See the crate-level example for usage.
pub use weightedrand_macros::WeightedEnum;

/// Anything that yields weighted picks one at a time.
pub trait WeightedRandom<T> {
    /// Draw the next item. Draws are independent of each other.
    fn next(&mut self) -> T;
}

/// Trait implemented by the `WeightedEnum` derive macro.
///
/// Each variant and its weight is exposed via [`WeightedEnum::ENTRIES`],
/// which enables building a ready-to-sample [`AliasTable`].
pub trait WeightedEnum: Sized + 'static {
    /// All `(variant, weight)` pairs for the enum, in declaration order.
    const ENTRIES: &'static [(Self, u64)];

    /// Convenience constructor that builds an [`AliasTable`] from the enum entries.
    ///
    /// # Errors
    /// [`WeightError::Empty`] for an enum without variants.
    fn alias_table() -> Result<AliasTable<Self>, WeightError>
    where
        Self: Copy,
    {
        AliasTable::from_pairs(Self::ENTRIES.iter().copied())
    }
}
