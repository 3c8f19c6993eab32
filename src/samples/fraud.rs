//! Card authorization counting for fraud detection.

use serde_json::{Value, json};

use super::{
    integer_field,
    key_field,
    scores::{add_to, new_record},
};
use crate::{
    error::HookError,
    headers::Headers,
    hooks::{Accumulate, Finalize},
    state::AggregationState,
};

/// Counts authorizations per `card_number`.
#[derive(Clone, Copy, Debug, Default)]
pub struct AuthorizationCount;

impl Accumulate for AuthorizationCount {
    fn accumulate(
        &self,
        headers: &Headers,
        item: Value,
        state: &mut AggregationState,
    ) -> Result<(), HookError> {
        let card = key_field(&item, "card_number")?;
        let record = state.get_or_insert_with(card.clone(), || {
            new_record(headers, [("card_number", json!(card)), ("count", json!(0))])
        });
        add_to(record, "count", 1)
    }
}

/// Keeps cards whose `count` is strictly greater than the threshold.
#[derive(Clone, Copy, Debug)]
pub struct FraudThreshold {
    threshold: u64,
}

impl FraudThreshold {
    /// Report cards with more than `threshold` authorizations.
    #[must_use]
    pub const fn new(threshold: u64) -> Self { Self { threshold } }

    /// Configured threshold.
    #[must_use]
    pub const fn threshold(&self) -> u64 { self.threshold }
}

impl Finalize for FraudThreshold {
    fn finalize(&self, mut state: AggregationState) -> Result<AggregationState, HookError> {
        let mut invalid = None;
        state.retain(|card, record| match integer_field(record, "count") {
            Ok(count) => u64::try_from(count).is_ok_and(|count| count > self.threshold),
            Err(err) => {
                invalid.get_or_insert_with(|| format!("card '{card}': {err}"));
                false
            }
        });
        invalid.map_or(Ok(state), |message| Err(message.into()))
    }
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;
    use crate::{finalize::finalize, fold::fold};

    fn authorizations(card: &str, times: usize) -> Vec<Vec<u8>> {
        (0..times)
            .map(|_| json!({"card_number": card, "amount": 10}).to_string().into_bytes())
            .collect()
    }

    #[rstest]
    #[case(6, true)]
    #[case(5, false)]
    #[case(0, false)]
    fn reports_cards_strictly_above_threshold(#[case] times: usize, #[case] reported: bool) {
        let mut batch = authorizations("1234", times);
        batch.extend(authorizations("9999", 1));

        let state = fold(&Headers::new(), batch, &AuthorizationCount).expect("fold");
        let out = finalize(&FraudThreshold::new(5), state).expect("finalize");

        assert_eq!(out.contains_key("1234"), reported);
        assert!(!out.contains_key("9999"));
    }

    #[rstest]
    fn counts_carry_window_and_card() {
        let headers = Headers::from([("windowStartTime".to_owned(), "w0".to_owned())]);

        let state = fold(&headers, authorizations("1234", 2), &AuthorizationCount).expect("fold");

        assert_eq!(
            state.get("1234"),
            Some(&json!({"from": "w0", "card_number": "1234", "count": 2}))
        );
    }

    #[rstest]
    fn corrupt_counts_fail_finalize() {
        let mut state = AggregationState::new();
        state.insert("1234", json!({"count": "many"}));

        let err = FraudThreshold::new(5).finalize(state).expect_err("must fail");

        assert!(err.to_string().starts_with("card '1234'"));
    }
}
