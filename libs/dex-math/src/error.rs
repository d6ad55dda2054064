/// Fixed-point math failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum MathError {
    #[error("division by zero")]
    DivisionByZero,
    #[error("arithmetic overflow")]
    Overflow,
    #[error("tick out of bounds")]
    TickOutOfBounds,
    #[error("sqrt price out of bounds")]
    SqrtPriceOutOfBounds,
    #[error("liquidity underflow")]
    LiquidityUnderflow,
    #[error("liquidity overflow")]
    LiquidityOverflow,
}

impl MathError {
    pub const ALL: [MathError; 6] = [
        MathError::DivisionByZero,
        MathError::Overflow,
        MathError::TickOutOfBounds,
        MathError::SqrtPriceOutOfBounds,
        MathError::LiquidityUnderflow,
        MathError::LiquidityOverflow,
    ];

    /// Stable code, unique within this enum.
    pub const fn code(self) -> u32 {
        match self {
            MathError::DivisionByZero => 1,
            MathError::Overflow => 2,
            MathError::TickOutOfBounds => 3,
            MathError::SqrtPriceOutOfBounds => 4,
            MathError::LiquidityUnderflow => 5,
            MathError::LiquidityOverflow => 6,
        }
    }

    pub fn from_code(code: u32) -> Option<Self> {
        Self::ALL.into_iter().find(|err| err.code() == code)
    }
}
