//! Multi-dimensional data-quality validation for OHLCV series.
//!
//! [`DataValidator`] runs independent checks (structural, consistency,
//! price-limit, suspension, volume pattern, continuity) and folds their
//! findings into a single [`ValidationReport`] with a score in [0, 100].

pub mod report;
pub mod validator;

pub use report::{
    CheckResult, ConsistencyFinding, Gap, PriceField, PriceLimitViolation, SeriesSummary,
    StructuralFinding, SuspensionDay, ValidationReport, VolumeAnomaly, VolumeAnomalyKind,
};
pub use validator::{DataValidator, ValidationOptions, PRICE_LIMIT_EPSILON};
