use thiserror::Error;

use crate::adapter::AdapterError;
use crate::core_types::{AdapterId, AssetId, Principal};
use crate::money::MoneyError;

#[derive(Debug, Error)]
pub enum OracleError {
    #[error("No price found for {base} / {quote}")]
    NotFound { base: AssetId, quote: AssetId },

    #[error("Caller {caller} is not the governance principal")]
    Unauthorized { caller: Principal },

    #[error("Adapter {0} is already registered")]
    DuplicateAdapter(AdapterId),

    #[error("Adapter {0} is not registered")]
    AdapterNotFound(AdapterId),

    #[error("No price set for {base} / {quote}")]
    PriceNotSet { base: AssetId, quote: AssetId },

    #[error("Arithmetic overflow")]
    ArithmeticOverflow,

    #[error("Division by zero")]
    DivisionByZero,

    #[error("Invalid amount: {0}")]
    InvalidAmount(String),

    #[error("Adapter {adapter} failed: {source}")]
    Adapter {
        adapter: AdapterId,
        #[source]
        source: AdapterError,
    },
}

impl From<MoneyError> for OracleError {
    fn from(e: MoneyError) -> Self {
        match e {
            MoneyError::Overflow => OracleError::ArithmeticOverflow,
            MoneyError::DivisionByZero => OracleError::DivisionByZero,
            MoneyError::InvalidFormat(msg) => OracleError::InvalidAmount(msg),
        }
    }
}

pub type OracleResult<T> = Result<T, OracleError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_money_errors_keep_their_kind() {
        assert!(matches!(
            OracleError::from(MoneyError::Overflow),
            OracleError::ArithmeticOverflow
        ));
        assert!(matches!(
            OracleError::from(MoneyError::DivisionByZero),
            OracleError::DivisionByZero
        ));
        assert!(matches!(
            OracleError::from(MoneyError::InvalidFormat("1.5".into())),
            OracleError::InvalidAmount(msg) if msg == "1.5"
        ));
    }
}
