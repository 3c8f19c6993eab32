//! Built-in user-defined functions.
//!
//! These are ordinary hook implementations, shipped so the gateway binary can
//! serve something useful without embedding and so the engine can be
//! exercised with realistic folds. [`SampleUdf`] selects one by name.

mod fraud;
mod scores;
mod uppercase;

use std::{fmt, str::FromStr, sync::Arc};

pub use fraud::{AuthorizationCount, FraudThreshold};
pub use scores::{TeamScore, UserScore};
use serde_json::Value;
use thiserror::Error;
pub use uppercase::Uppercase;

use crate::{aggregator::Aggregator, error::HookError, handler::Handler, mapper::Mapper};

/// Name of a built-in UDF.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SampleUdf {
    /// Sum of scores per team.
    TeamScore,
    /// Sum of scores per player.
    UserScore,
    /// Cards with more authorizations than a threshold.
    FraudDetection,
    /// Upper-cases every string of a document.
    Uppercase,
}

/// Returned when a UDF name is not one of [`SampleUdf::ALL`].
#[derive(Debug, Error, PartialEq, Eq)]
#[error("unknown UDF '{0}', expected one of: team-score, user-score, fraud-detection, uppercase")]
pub struct UnknownUdf(pub String);

impl SampleUdf {
    /// Every built-in UDF.
    pub const ALL: [Self; 4] = [
        Self::TeamScore,
        Self::UserScore,
        Self::FraudDetection,
        Self::Uppercase,
    ];

    /// Name accepted by [`FromStr`].
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::TeamScore => "team-score",
            Self::UserScore => "user-score",
            Self::FraudDetection => "fraud-detection",
            Self::Uppercase => "uppercase",
        }
    }

    /// Build the handler serving this UDF.
    ///
    /// `fraud_threshold` is only used by [`SampleUdf::FraudDetection`].
    #[must_use]
    pub fn handler(self, fraud_threshold: u64) -> Arc<dyn Handler> {
        match self {
            Self::TeamScore => Arc::new(Aggregator::new(TeamScore)),
            Self::UserScore => Arc::new(Aggregator::new(UserScore)),
            Self::FraudDetection => Arc::new(
                Aggregator::new(AuthorizationCount)
                    .with_finalize(FraudThreshold::new(fraud_threshold)),
            ),
            Self::Uppercase => Arc::new(Mapper::new(Uppercase)),
        }
    }
}

impl fmt::Display for SampleUdf {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { f.write_str(self.name()) }
}

impl FromStr for SampleUdf {
    type Err = UnknownUdf;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|udf| udf.name().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| UnknownUdf(s.to_owned()))
    }
}

/// Read `field` of `item` as an integer.
///
/// JSON numbers and strings holding a decimal integer are accepted.
pub(crate) fn integer_field(item: &Value, field: &str) -> Result<i64, HookError> {
    let value = item
        .get(field)
        .ok_or_else(|| format!("missing field '{field}'"))?;
    let parsed = match value {
        Value::Number(number) => number.as_i64(),
        Value::String(text) => text.trim().parse().ok(),
        _ => None,
    };
    parsed.ok_or_else(|| format!("field '{field}' is not an integer: {value}").into())
}

/// Read `field` of `item` as a key.
///
/// Strings are used verbatim; numbers are rendered as JSON.
pub(crate) fn key_field(item: &Value, field: &str) -> Result<String, HookError> {
    match item.get(field) {
        Some(Value::String(key)) => Ok(key.clone()),
        Some(Value::Number(key)) => Ok(key.to_string()),
        Some(other) => Err(format!("field '{field}' cannot be used as a key: {other}").into()),
        None => Err(format!("missing field '{field}'").into()),
    }
}
