//! Type conversion rules.
//!
//! Decides how a value of one member type becomes a value of another, and
//! performs the scalar coercions at run time. Rules are tried in order:
//!
//! 1. identity (equal types, or `T` into `Option<T>`)
//! 2. nullable unwrap (`Option<T>` source, defaulting when absent)
//! 3. scalar conversion
//! 4. nested object transformation
//! 5. collection mapping
//!
//! No match means the destination member is left unbound.

use std::sync::Arc;

use qmap_model::{Catalog, EnumDesc, ScalarKind, Ty, Value, ValueError};

use crate::synth::Synthesizer;
use crate::{ConfigError, Expr, TypePair};

/// Outcome of classifying a (from, to) type pair.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConversionRule {
    Identity,
    NullableUnwrap,
    Scalar,
    Nested(TypePair),
    Collection,
    NoMatch,
}

/// Pick the first conversion rule that applies.
pub fn classify(from: &Ty, to: &Ty) -> ConversionRule {
    if from == to || from == to.unwrap_optional() {
        return ConversionRule::Identity;
    }
    if from.is_optional() {
        return ConversionRule::NullableUnwrap;
    }
    let target = to.unwrap_optional();
    match (from, target) {
        (Ty::Scalar(_) | Ty::Enum(_), Ty::Scalar(_) | Ty::Enum(_))
            if scalar_convertible(from, target) =>
        {
            ConversionRule::Scalar
        }
        (Ty::Object(source), Ty::Object(destination)) => {
            ConversionRule::Nested(TypePair::new(source.clone(), destination.clone()))
        }
        (Ty::Sequence { .. }, Ty::Sequence { .. }) => ConversionRule::Collection,
        _ => ConversionRule::NoMatch,
    }
}

/// Anything renders to text and text parses to anything; numbers and enums
/// interconvert through discriminants. Bool only meets text.
fn scalar_convertible(from: &Ty, to: &Ty) -> bool {
    let numeric_like = |ty: &Ty| matches!(ty, Ty::Enum(_)) || ty.is_numeric();
    to.is_text() || from.is_text() || (numeric_like(from) && numeric_like(to))
}

impl Synthesizer<'_> {
    /// Expression converting `value` (typed `from`) into `to`, or `None`
    /// when no rule applies.
    pub(crate) fn convert(
        &mut self,
        value: Expr,
        from: &Ty,
        to: &Ty,
    ) -> Result<Option<Expr>, ConfigError> {
        match classify(from, to) {
            ConversionRule::Identity => Ok(Some(value)),
            ConversionRule::NullableUnwrap => {
                let Some(converted) = self.convert(value.clone(), from.unwrap_optional(), to)?
                else {
                    return Ok(None);
                };
                if handles_null(&converted, &value) {
                    return Ok(Some(converted));
                }
                Ok(Some(Expr::condition(
                    value.is_null(),
                    Expr::Default(to.clone()),
                    converted,
                )))
            }
            ConversionRule::Scalar => Ok(Some(Expr::Convert {
                value: Box::new(value),
                from: from.clone(),
                to: to.unwrap_optional().clone(),
            })),
            ConversionRule::Nested(pair) => {
                self.ensure(&pair)?;
                Ok(Some(Expr::condition(
                    value.clone().is_null(),
                    Expr::Default(to.clone()),
                    Expr::invoke(pair, value),
                )))
            }
            ConversionRule::Collection => self.collection(value, from, to),
            ConversionRule::NoMatch => Ok(None),
        }
    }
}

/// True when `converted` already yields a sensible value for a null `value`.
fn handles_null(converted: &Expr, value: &Expr) -> bool {
    match converted {
        Expr::Condition { test, .. } => matches!(&**test, Expr::IsNull(inner) if **inner == *value),
        Expr::Collect { source, .. } => **source == *value,
        _ => false,
    }
}

/// A scalar-like type resolved against the catalog for run-time coercion.
#[derive(Debug, Clone)]
pub(crate) enum ScalarTarget {
    Kind(ScalarKind),
    Enum(Arc<EnumDesc>),
}

impl ScalarTarget {
    pub(crate) fn resolve(ty: &Ty, catalog: &Catalog) -> Result<Self, ConfigError> {
        match ty.unwrap_optional() {
            Ty::Scalar(kind) => Ok(Self::Kind(*kind)),
            Ty::Enum(name) => catalog
                .enumeration(name)
                .map(|desc| Self::Enum(Arc::new(desc.clone())))
                .ok_or_else(|| ConfigError::unknown_type(name)),
            other => Err(ConfigError::invalid_expression(format!(
                "{other} is not a scalar type"
            ))),
        }
    }

    fn name(&self) -> String {
        match self {
            Self::Kind(kind) => kind.as_str().to_string(),
            Self::Enum(desc) => desc.name.to_string(),
        }
    }
}

/// Run-time scalar conversion. Null passes through.
pub(crate) fn coerce(
    value: &Value,
    from: &ScalarTarget,
    to: &ScalarTarget,
) -> Result<Value, ValueError> {
    match (value, to) {
        (Value::Null, _) => Ok(Value::Null),
        (_, ScalarTarget::Kind(ScalarKind::Text)) => render(value, from).map(Value::Text),
        (Value::Text(text), target) => parse(text, target),
        (_, target) => Number::read(value)?.cast(target),
    }
}

fn render(value: &Value, from: &ScalarTarget) -> Result<String, ValueError> {
    match (value, from) {
        (Value::Float(f), ScalarTarget::Kind(ScalarKind::F32)) => Ok((*f as f32).to_string()),
        _ => value.to_text(),
    }
}

fn parse(text: &str, target: &ScalarTarget) -> Result<Value, ValueError> {
    let trimmed = text.trim();
    let unparsable = || ValueError::Unparsable {
        text: text.to_string(),
        target: target.name(),
    };
    match target {
        ScalarTarget::Kind(ScalarKind::Bool) => match trimmed.to_ascii_lowercase().as_str() {
            "true" => Ok(Value::Bool(true)),
            "false" => Ok(Value::Bool(false)),
            _ => Err(unparsable()),
        },
        ScalarTarget::Kind(ScalarKind::I32) => trimmed
            .parse::<i32>()
            .map(Value::from)
            .map_err(|_| unparsable()),
        ScalarTarget::Kind(ScalarKind::I64) => trimmed
            .parse::<i64>()
            .map(Value::Int)
            .map_err(|_| unparsable()),
        ScalarTarget::Kind(ScalarKind::F32) => trimmed
            .parse::<f32>()
            .map(|f| Value::Float(f64::from(f)))
            .map_err(|_| unparsable()),
        ScalarTarget::Kind(ScalarKind::F64) => trimmed
            .parse::<f64>()
            .map(Value::Float)
            .map_err(|_| unparsable()),
        ScalarTarget::Kind(ScalarKind::Text) => Ok(Value::Text(text.to_string())),
        ScalarTarget::Enum(desc) => desc
            .discriminant_of(trimmed)
            .or_else(|| trimmed.parse::<i64>().ok())
            .map(|d| Value::Enum(desc.value_of(d)))
            .ok_or_else(unparsable),
    }
}

#[derive(Debug, Clone, Copy)]
enum Number {
    Int(i64),
    Float(f64),
}

impl Number {
    fn read(value: &Value) -> Result<Self, ValueError> {
        match value {
            Value::Int(i) => Ok(Self::Int(*i)),
            Value::Float(f) => Ok(Self::Float(*f)),
            Value::Enum(e) => Ok(Self::Int(e.discriminant)),
            other => Err(ValueError::shape("number", other.kind_name())),
        }
    }

    /// Narrowing truncates toward zero; integer overflow wraps.
    fn cast(self, target: &ScalarTarget) -> Result<Value, ValueError> {
        match (target, self) {
            (ScalarTarget::Kind(ScalarKind::I32), Self::Int(i)) => Ok(Value::from(i as i32)),
            (ScalarTarget::Kind(ScalarKind::I32), Self::Float(f)) => Ok(Value::from(f as i32)),
            (ScalarTarget::Kind(ScalarKind::I64), Self::Int(i)) => Ok(Value::Int(i)),
            (ScalarTarget::Kind(ScalarKind::I64), Self::Float(f)) => Ok(Value::Int(f as i64)),
            (ScalarTarget::Kind(ScalarKind::F32), Self::Int(i)) => {
                Ok(Value::Float(f64::from(i as f32)))
            }
            (ScalarTarget::Kind(ScalarKind::F32), Self::Float(f)) => {
                Ok(Value::Float(f64::from(f as f32)))
            }
            (ScalarTarget::Kind(ScalarKind::F64), Self::Int(i)) => Ok(Value::Float(i as f64)),
            (ScalarTarget::Kind(ScalarKind::F64), Self::Float(f)) => Ok(Value::Float(f)),
            (ScalarTarget::Enum(desc), Self::Int(i)) => Ok(Value::Enum(desc.value_of(i))),
            (ScalarTarget::Enum(desc), Self::Float(f)) => Ok(Value::Enum(desc.value_of(f as i64))),
            (ScalarTarget::Kind(kind), _) => Err(ValueError::shape(kind.as_str(), "number")),
        }
    }
}

#[cfg(test)]
mod tests {
    use qmap_model::EnumValue;

    use super::*;

    fn kind(kind: ScalarKind) -> ScalarTarget {
        ScalarTarget::Kind(kind)
    }

    fn genre() -> ScalarTarget {
        ScalarTarget::Enum(Arc::new(
            EnumDesc::new("Genre")
                .variant("Unknown", 0)
                .variant("Novel", 1)
                .variant("Poetry", 2),
        ))
    }

    #[test]
    fn rule_order() {
        assert_eq!(classify(&Ty::f64(), &Ty::f64()), ConversionRule::Identity);
        assert_eq!(
            classify(&Ty::f64(), &Ty::optional(Ty::f64())),
            ConversionRule::Identity
        );
        assert_eq!(
            classify(&Ty::optional(Ty::f64()), &Ty::i32()),
            ConversionRule::NullableUnwrap
        );
        assert_eq!(classify(&Ty::f64(), &Ty::i32()), ConversionRule::Scalar);
        assert_eq!(
            classify(&Ty::object("Animal"), &Ty::object("AnimalDto")),
            ConversionRule::Nested(TypePair::new("Animal", "AnimalDto"))
        );
        assert_eq!(
            classify(&Ty::list(Ty::object("Animal")), &Ty::array(Ty::object("AnimalDto"))),
            ConversionRule::Collection
        );
        assert_eq!(classify(&Ty::text(), &Ty::list(Ty::text())), ConversionRule::NoMatch);
    }

    #[test]
    fn scalar_compatibility() {
        assert_eq!(classify(&Ty::bool(), &Ty::text()), ConversionRule::Scalar);
        assert_eq!(classify(&Ty::text(), &Ty::bool()), ConversionRule::Scalar);
        assert_eq!(
            classify(&Ty::enumeration("Genre"), &Ty::i32()),
            ConversionRule::Scalar
        );
        assert_eq!(classify(&Ty::bool(), &Ty::i32()), ConversionRule::NoMatch);
        assert_eq!(
            classify(&Ty::enumeration("Genre"), &Ty::bool()),
            ConversionRule::NoMatch
        );
    }

    #[test]
    fn float_to_int_truncates() {
        let out = coerce(&Value::Float(26.3), &kind(ScalarKind::F64), &kind(ScalarKind::I32));
        assert_eq!(out.unwrap(), Value::Int(26));
        let out = coerce(&Value::Float(-2.9), &kind(ScalarKind::F64), &kind(ScalarKind::I64));
        assert_eq!(out.unwrap(), Value::Int(-2));
    }

    #[test]
    fn text_rendering_and_parsing() {
        let text = kind(ScalarKind::Text);
        assert_eq!(
            coerce(&Value::Int(42), &kind(ScalarKind::I32), &text).unwrap(),
            Value::from("42")
        );
        assert_eq!(
            coerce(&Value::Float(f64::from(0.1f32)), &kind(ScalarKind::F32), &text).unwrap(),
            Value::from("0.1")
        );
        assert_eq!(
            coerce(&Value::from(" 17 "), &text, &kind(ScalarKind::I64)).unwrap(),
            Value::Int(17)
        );
        assert_eq!(
            coerce(&Value::from("TRUE"), &text, &kind(ScalarKind::Bool)).unwrap(),
            Value::Bool(true)
        );
        let err = coerce(&Value::from("abc"), &text, &kind(ScalarKind::I32)).unwrap_err();
        assert_eq!(
            err,
            ValueError::Unparsable {
                text: "abc".into(),
                target: "i32".into()
            }
        );
    }

    #[test]
    fn enums_convert_through_discriminants() {
        let novel = Value::Enum(EnumValue {
            name: "Novel".into(),
            discriminant: 1,
        });
        assert_eq!(
            coerce(&novel, &genre(), &kind(ScalarKind::I32)).unwrap(),
            Value::Int(1)
        );
        assert_eq!(
            coerce(&Value::Int(2), &kind(ScalarKind::I32), &genre()).unwrap(),
            Value::Enum(EnumValue {
                name: "Poetry".into(),
                discriminant: 2
            })
        );
        assert_eq!(
            coerce(&Value::from("poetry"), &kind(ScalarKind::Text), &genre()).unwrap(),
            Value::Enum(EnumValue {
                name: "Poetry".into(),
                discriminant: 2
            })
        );
        assert_eq!(
            coerce(&novel, &genre(), &kind(ScalarKind::Text)).unwrap(),
            Value::from("Novel")
        );
    }

    #[test]
    fn null_passes_through() {
        let out = coerce(&Value::Null, &kind(ScalarKind::F64), &kind(ScalarKind::I32));
        assert_eq!(out.unwrap(), Value::Null);
    }
}
