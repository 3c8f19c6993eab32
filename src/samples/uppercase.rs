//! Upper-casing mapper.

use serde_json::Value;

use crate::{error::HookError, headers::Headers, hooks::Map};

/// Upper-cases every string in a document, leaving object keys untouched.
#[derive(Clone, Copy, Debug, Default)]
pub struct Uppercase;

impl Map for Uppercase {
    fn map(&self, _headers: &Headers, mut item: Value) -> Result<Value, HookError> {
        shout(&mut item);
        Ok(item)
    }
}

fn shout(value: &mut Value) {
    match value {
        Value::String(text) => *text = text.to_uppercase(),
        Value::Array(items) => items.iter_mut().for_each(shout),
        Value::Object(fields) => fields.values_mut().for_each(shout),
        Value::Null | Value::Bool(_) | Value::Number(_) => {}
    }
}
