//! Gaming score aggregations.

use serde_json::{Map, Value, json};

use super::{integer_field, key_field};
use crate::{
    error::HookError,
    headers::{Headers, WindowBounds},
    hooks::Accumulate,
    state::AggregationState,
};

/// Sums `score` per `team` into `totalScore`.
///
/// Items that carry `userTotalScore` instead of `score` are accepted, so the
/// output of [`UserScore`] can be fed straight in.
#[derive(Clone, Copy, Debug, Default)]
pub struct TeamScore;

impl Accumulate for TeamScore {
    fn accumulate(
        &self,
        headers: &Headers,
        item: Value,
        state: &mut AggregationState,
    ) -> Result<(), HookError> {
        let team = key_field(&item, "team")?;
        let score = if item.get("score").is_some() {
            integer_field(&item, "score")?
        } else {
            integer_field(&item, "userTotalScore")?
        };
        let record = state.get_or_insert_with(team.clone(), || {
            new_record(headers, [("team", json!(team)), ("totalScore", json!(0))])
        });
        add_to(record, "totalScore", score)
    }
}

/// Sums `score` per `fullName` into `userTotalScore`.
#[derive(Clone, Copy, Debug, Default)]
pub struct UserScore;

impl Accumulate for UserScore {
    fn accumulate(
        &self,
        headers: &Headers,
        item: Value,
        state: &mut AggregationState,
    ) -> Result<(), HookError> {
        let user = key_field(&item, "fullName")?;
        let score = integer_field(&item, "score")?;
        let team = item.get("team").cloned().unwrap_or(Value::Null);
        let record = state.get_or_insert_with(user.clone(), || {
            new_record(
                headers,
                [
                    ("user", json!(user)),
                    ("team", team),
                    ("userTotalScore", json!(0)),
                ],
            )
        });
        add_to(record, "userTotalScore", score)
    }
}

/// Build a record stamped with the window bounds followed by `fields`.
pub(super) fn new_record<const N: usize>(headers: &Headers, fields: [(&str, Value); N]) -> Value {
    let mut record = Map::new();
    WindowBounds::from_headers(headers).stamp(&mut record);
    for (name, value) in fields {
        record.insert(name.to_owned(), value);
    }
    Value::Object(record)
}

/// Add `amount` to the integer `field` of `record`.
pub(super) fn add_to(record: &mut Value, field: &str, amount: i64) -> Result<(), HookError> {
    let current = integer_field(record, field)?;
    let total = current
        .checked_add(amount)
        .ok_or_else(|| format!("'{field}' overflowed"))?;
    record[field] = json!(total);
    Ok(())
}
