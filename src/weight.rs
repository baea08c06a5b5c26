//! Weights and their coercion into exact decimals.
//!
//! Every accepted weight type is funnelled into a single
//! [`Decimal`] before any arithmetic happens, so the table builder never
//! touches binary floating point.

use std::fmt;

use rust_decimal::Decimal;

use crate::error::WeightError;

/// A numeric type usable as an item weight.
///
/// Implemented for every primitive integer width and for [`Decimal`]
/// itself. Floating point types are deliberately absent.
pub trait Weight: Copy + fmt::Display {
    /// Exact decimal value of this weight, or `None` when it does not fit
    /// the 96-bit decimal mantissa.
    fn to_decimal(self) -> Option<Decimal>;
}

macro_rules! lossless_weight {
    ($($ty:ty),* $(,)?) => {
        $(
            impl Weight for $ty {
                #[inline]
                fn to_decimal(self) -> Option<Decimal> {
                    Some(Decimal::from(self))
                }
            }
        )*
    };
}

lossless_weight!(i8, i16, i32, i64, isize, u8, u16, u32, u64, usize);

impl Weight for i128 {
    #[inline]
    fn to_decimal(self) -> Option<Decimal> {
        Decimal::try_from_i128_with_scale(self, 0).ok()
    }
}

impl Weight for u128 {
    #[inline]
    fn to_decimal(self) -> Option<Decimal> {
        i128::try_from(self).ok()?.to_decimal()
    }
}

impl Weight for Decimal {
    #[inline]
    fn to_decimal(self) -> Option<Decimal> {
        Some(self)
    }
}

/// An item paired with the weight it is drawn by.
///
/// A weight of zero means "unset" and is treated as a weight of one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct WeightedItem<T, W> {
    pub item: T,
    pub weight: W,
}

impl<T, W> WeightedItem<T, W> {
    pub const fn new(item: T, weight: W) -> Self {
        Self { item, weight }
    }

    /// An item without an explicit weight; it is drawn as if weighted `1`.
    pub fn unweighted(item: T) -> Self
    where
        W: Default,
    {
        Self {
            item,
            weight: W::default(),
        }
    }
}

impl<T, W> From<(T, W)> for WeightedItem<T, W> {
    fn from((item, weight): (T, W)) -> Self {
        Self { item, weight }
    }
}

impl<T: fmt::Debug, W: fmt::Display> fmt::Display for WeightedItem<T, W> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{{weight: {}, item: {:?}}}", self.weight, self.item)
    }
}

/// Coerce one raw weight, substituting `1` for zero.
///
/// `index` is only used to label errors.
pub(crate) fn coerce<W: Weight>(index: usize, weight: W) -> Result<Decimal, WeightError> {
    let value = weight
        .to_decimal()
        .ok_or_else(|| WeightError::Unrepresentable {
            index,
            value: weight.to_string(),
        })?;
    if value.is_zero() {
        Ok(Decimal::ONE)
    } else if value.is_sign_negative() {
        Err(WeightError::Negative { index, value })
    } else {
        Ok(value)
    }
}

/// Rescale coerced weights in place so that they sum to their count.
///
/// Returns the total the weights were divided by. When the raw sum does not
/// fit a `Decimal`, every weight is first divided by the largest one and the
/// returned total is the sum of those ratios. The mean of the rescaled
/// weights is one, which is what lets the alias method fit the mass into
/// `n` buckets of capacity one.
pub(crate) fn normalize(weights: &mut [Decimal]) -> Result<Decimal, WeightError> {
    if weights.is_empty() {
        return Err(WeightError::Empty);
    }
    let total = match checked_sum(weights) {
        Some(total) => total,
        None => {
            let max = weights.iter().copied().max().ok_or(WeightError::Empty)?;
            for w in weights.iter_mut() {
                *w = w.checked_div(max).ok_or(WeightError::Overflow)?;
            }
            checked_sum(weights).ok_or(WeightError::Overflow)?
        }
    };

    let n = Decimal::from(weights.len());
    for w in weights.iter_mut() {
        // w * n first keeps the most digits; divide first only when that overflows
        *w = w
            .checked_mul(n)
            .and_then(|scaled| scaled.checked_div(total))
            .or_else(|| w.checked_div(total)?.checked_mul(n))
            .ok_or(WeightError::Overflow)?;
    }
    Ok(total)
}

fn checked_sum(weights: &[Decimal]) -> Option<Decimal> {
    weights
        .iter()
        .try_fold(Decimal::ZERO, |acc, w| acc.checked_add(*w))
}
