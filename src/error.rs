use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum SimError {
    #[error("Shoe exhausted: no cards left to draw")]
    EmptyShoe,
    #[error("Deck count must be at least 1, got {0}")]
    InvalidDeckCount(u8),
    #[error("Penetration must lie in (0, 1], got {0}")]
    InvalidPenetration(f64),
    #[error("Bucket precision must lie in 1..=65535, got {0}")]
    InvalidPrecision(u32),
    #[error("Payout denominator cannot be zero")]
    InvalidPayout,
    #[error("Number of seats must be between 1 and 8, got {0}")]
    InvalidSeatCount(usize),
    #[error("Shoe may reshuffle with only {available} cards left, {seats} seats need {needed}")]
    ShoeTooShallow {
        seats: usize,
        needed: usize,
        available: usize,
    },
}
