//! JSON input, read against registered shapes.

use qmap_model::{Catalog, ObjectValue, Ty, Value, ValueError};
use serde_json::Value as JsonValue;

/// Convert a JSON document into a value of type `ty`.
///
/// Object keys are matched to members case-insensitively; unknown keys are
/// ignored and absent members take their default value. Enums accept a
/// variant name or a discriminant.
///
/// # Errors
///
/// Structural mismatches and unregistered object shapes.
pub fn value_from_json(json: &JsonValue, ty: &Ty, catalog: &Catalog) -> Result<Value, ValueError> {
    if json.is_null() {
        return Ok(Value::Null);
    }
    match ty.unwrap_optional() {
        Ty::Object(name) => {
            let JsonValue::Object(fields) = json else {
                return Err(ValueError::shape(name.as_str(), json_kind(json)));
            };
            let desc = catalog
                .object(name)
                .ok_or_else(|| ValueError::shape(name.as_str(), "unregistered shape"))?;
            let mut object = catalog.blank_object(desc);
            for member in &desc.members {
                let Some((_, field)) = fields.iter().find(|(key, _)| member.matches(key)) else {
                    continue;
                };
                let value = value_from_json(field, &member.ty, catalog)
                    .map_err(|err| err.in_member(member.name.as_str()))?;
                object.set(&member.name, value);
            }
            Ok(object.into())
        }
        Ty::Sequence { element, .. } => {
            let JsonValue::Array(items) = json else {
                return Err(ValueError::shape("sequence", json_kind(json)));
            };
            items
                .iter()
                .map(|item| match element.as_deref() {
                    Some(element) => value_from_json(item, element, catalog),
                    None => Ok(untyped(item)),
                })
                .collect::<Result<Vec<_>, _>>()
                .map(Value::Seq)
        }
        Ty::Enum(name) => {
            let desc = catalog
                .enumeration(name)
                .ok_or_else(|| ValueError::shape(name.as_str(), "unregistered enum"))?;
            let discriminant = match json {
                JsonValue::String(text) => desc.discriminant_of(text),
                JsonValue::Number(number) => number.as_i64(),
                other => return Err(ValueError::shape(name.as_str(), json_kind(other))),
            };
            discriminant
                .map(|d| Value::Enum(desc.value_of(d)))
                .ok_or_else(|| ValueError::Unparsable {
                    text: json.to_string(),
                    target: name.to_string(),
                })
        }
        Ty::Scalar(kind) if kind.is_float() => json
            .as_f64()
            .map(Value::Float)
            .ok_or_else(|| ValueError::shape(kind.as_str(), json_kind(json))),
        _ => Ok(untyped(json)),
    }
}

fn untyped(json: &JsonValue) -> Value {
    match json {
        JsonValue::Null => Value::Null,
        JsonValue::Bool(b) => Value::Bool(*b),
        JsonValue::Number(number) => number
            .as_i64()
            .map_or_else(|| Value::Float(number.as_f64().unwrap_or(f64::NAN)), Value::Int),
        JsonValue::String(text) => Value::Text(text.clone()),
        JsonValue::Array(items) => Value::Seq(items.iter().map(untyped).collect()),
        JsonValue::Object(fields) => fields
            .iter()
            .fold(ObjectValue::new("Object"), |obj, (key, value)| {
                obj.with(key.clone(), untyped(value))
            })
            .into(),
    }
}

fn json_kind(json: &JsonValue) -> &'static str {
    match json {
        JsonValue::Null => "null",
        JsonValue::Bool(_) => "bool",
        JsonValue::Number(_) => "number",
        JsonValue::String(_) => "string",
        JsonValue::Array(_) => "array",
        JsonValue::Object(_) => "object",
    }
}
