use rust_decimal::Decimal;

/// Reasons an alias table (or a sampler around one) cannot be built.
///
/// Construction either succeeds with a complete table or returns one of
/// these; no partially built table is ever handed out.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum WeightError {
    #[error("at least one item must be provided")]
    Empty,
    #[error("weight must be non-negative, but item {index} has weight {value}")]
    Negative { index: usize, value: Decimal },
    #[error("weight {value} of item {index} cannot be represented as a decimal")]
    Unrepresentable { index: usize, value: String },
    #[error("total weight overflows the decimal range")]
    Overflow,
    #[error("coin toss precision must be 1..=18 decimal digits, got {digits}")]
    CoinPrecision { digits: u32 },
}
