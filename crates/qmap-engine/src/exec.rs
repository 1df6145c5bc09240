//! Lowering of transformation trees into executable closures.

use std::sync::Arc;

use qmap_model::{Catalog, LazySeq, SeqShape, Value, ValueError};

use crate::cache::TransformationCache;
use crate::convert::{ScalarTarget, coerce};
use crate::{BinaryOp, ConfigError, Expr, TypePair, Var};

/// An executable expression: evaluates with one variable bound to a value.
pub(crate) type Program = Arc<dyn Fn(Var, &Value) -> Result<Value, ValueError> + Send + Sync>;

static NULL: Value = Value::Null;

/// Compiles expressions against a catalog and the transformation cache.
///
/// Nested transformations are looked up through cache slots, so a program
/// may refer to a pair that is still compiling.
pub(crate) struct ProgramBuilder<'a> {
    catalog: &'a Catalog,
    cache: &'a TransformationCache,
    created: &'a mut Vec<TypePair>,
}

impl<'a> ProgramBuilder<'a> {
    pub(crate) fn new(
        catalog: &'a Catalog,
        cache: &'a TransformationCache,
        created: &'a mut Vec<TypePair>,
    ) -> Self {
        Self {
            catalog,
            cache,
            created,
        }
    }

    pub(crate) fn build(&mut self, expr: &Expr) -> Result<Program, ConfigError> {
        match expr {
            Expr::Var(var) => Ok(read(*var, Vec::new())),
            Expr::Member { target, member } => match as_path(expr) {
                Some((var, path)) => Ok(read(var, path)),
                None => {
                    let target = self.build(target)?;
                    let member = member.clone();
                    Ok(Arc::new(move |bound: Var, value: &Value| {
                        let target = target(bound, value)?;
                        read_path(&target, std::slice::from_ref(&member)).cloned()
                    }))
                }
            },
            Expr::Literal { value, .. } => Ok(constant(value.clone())),
            Expr::Default(ty) => Ok(constant(self.catalog.default_value(ty))),
            Expr::Convert { value, from, to } => {
                let from = ScalarTarget::resolve(from, self.catalog)?;
                let to = ScalarTarget::resolve(to, self.catalog)?;
                let operand = self.operand(value)?;
                Ok(Arc::new(move |bound: Var, value: &Value| {
                    operand.with(bound, value, |input| coerce(input, &from, &to))
                }))
            }
            Expr::IsNull(inner) => {
                let operand = self.operand(inner)?;
                Ok(Arc::new(move |bound: Var, value: &Value| {
                    operand.with(bound, value, |input| Ok(Value::Bool(input.is_null())))
                }))
            }
            Expr::Condition {
                test,
                then,
                otherwise,
            } => {
                let test = self.build(test)?;
                let then = self.build(then)?;
                let otherwise = self.build(otherwise)?;
                Ok(Arc::new(move |bound: Var, value: &Value| match test(bound, value)? {
                    Value::Bool(true) => then(bound, value),
                    Value::Bool(false) | Value::Null => otherwise(bound, value),
                    other => Err(ValueError::shape("bool", other.kind_name())),
                }))
            }
            Expr::Binary { op, lhs, rhs } => {
                let op = *op;
                let lhs = self.build(lhs)?;
                let rhs = self.build(rhs)?;
                Ok(Arc::new(move |bound: Var, value: &Value| {
                    binary(op, &lhs(bound, value)?, &rhs(bound, value)?)
                }))
            }
            Expr::Call { func, args } => {
                let func = func.clone();
                let args = self.build_all(args)?;
                Ok(Arc::new(move |bound: Var, value: &Value| {
                    let values = args
                        .iter()
                        .map(|arg| arg(bound, value))
                        .collect::<Result<Vec<_>, _>>()?;
                    func.call(&values)
                }))
            }
            Expr::Invoke { pair, arg } => {
                let slot = self.cache.slot(pair, self.created);
                let operand = self.operand(arg)?;
                Ok(Arc::new(move |bound: Var, value: &Value| {
                    operand.with(bound, value, |input| {
                        let transformation =
                            slot.get()
                                .ok_or_else(|| ValueError::TransformationUnavailable {
                                    pair: slot.pair().to_string(),
                                })?;
                        transformation.apply(input)
                    })
                }))
            }
            Expr::Collect {
                source,
                var,
                body,
                shape,
                ..
            } => {
                let var = *var;
                let shape = *shape;
                let source = self.operand(source)?;
                let body = self.build(body)?;
                Ok(Arc::new(move |bound: Var, value: &Value| {
                    source.with(bound, value, |items| collect(items, var, &body, shape))
                }))
            }
            Expr::Construct {
                ty,
                constructor,
                overload,
                args,
                bindings,
            } => {
                let desc = self
                    .catalog
                    .object(ty)
                    .ok_or_else(|| ConfigError::unknown_type(ty))?;
                let blank = self.catalog.blank_object(desc);
                let constructor = match constructor {
                    Some(name) => Some(
                        desc.find_overload(name, *overload)
                            .cloned()
                            .ok_or_else(|| ConfigError::NoMatchingConstructor {
                                destination_type: ty.to_string(),
                                signature: name.clone(),
                            })?,
                    ),
                    None => None,
                };
                let args = self.build_all(args)?;
                let bindings = bindings
                    .iter()
                    .map(|binding| Ok((binding.member.clone(), self.build(&binding.value)?)))
                    .collect::<Result<Vec<_>, ConfigError>>()?;
                Ok(Arc::new(move |bound: Var, value: &Value| {
                    let mut instance = blank.clone();
                    if let Some(constructor) = &constructor {
                        let values = args
                            .iter()
                            .map(|arg| arg(bound, value))
                            .collect::<Result<Vec<_>, _>>()?;
                        constructor.initialize(&mut instance, values)?;
                    }
                    for (member, program) in &bindings {
                        let assigned = program(bound, value).map_err(|err| err.in_member(member))?;
                        instance.set(member, assigned);
                    }
                    Ok(Value::Object(instance))
                }))
            }
        }
    }

    fn build_all(&mut self, exprs: &[Expr]) -> Result<Vec<Program>, ConfigError> {
        exprs.iter().map(|expr| self.build(expr)).collect()
    }

    fn operand(&mut self, expr: &Expr) -> Result<Operand, ConfigError> {
        match as_path(expr) {
            Some((var, path)) => Ok(Operand::Path { var, path }),
            None => self.build(expr).map(Operand::Computed),
        }
    }
}

/// An input that is read by reference when it is a plain member path.
enum Operand {
    Path { var: Var, path: Vec<String> },
    Computed(Program),
}

impl Operand {
    fn with<R>(
        &self,
        bound: Var,
        value: &Value,
        f: impl FnOnce(&Value) -> Result<R, ValueError>,
    ) -> Result<R, ValueError> {
        match self {
            Self::Path { var, path } => {
                if *var != bound {
                    return Err(unbound(*var));
                }
                f(read_path(value, path)?)
            }
            Self::Computed(program) => f(&program(bound, value)?),
        }
    }
}

/// `var.a.b.c` as (var, [a, b, c]).
fn as_path(expr: &Expr) -> Option<(Var, Vec<String>)> {
    match expr {
        Expr::Var(var) => Some((*var, Vec::new())),
        Expr::Member { target, member } => {
            let (var, mut path) = as_path(target)?;
            path.push(member.clone());
            Some((var, path))
        }
        _ => None,
    }
}

fn read(var: Var, path: Vec<String>) -> Program {
    Arc::new(move |bound: Var, value: &Value| {
        if bound != var {
            return Err(unbound(var));
        }
        read_path(value, &path).cloned()
    })
}

/// Follow member names; a null anywhere along the way reads as null.
fn read_path<'v>(mut value: &'v Value, path: &[String]) -> Result<&'v Value, ValueError> {
    for member in path {
        value = match value {
            Value::Null => return Ok(&NULL),
            Value::Object(object) => object.get(member).unwrap_or(&NULL),
            other => {
                return Err(ValueError::shape("object", other.kind_name()).in_member(member));
            }
        };
    }
    Ok(value)
}

fn constant(value: Value) -> Program {
    Arc::new(move |_: Var, _: &Value| Ok(value.clone()))
}

fn unbound(var: Var) -> ValueError {
    ValueError::UnboundVariable(var.to_string())
}

fn collect(source: &Value, var: Var, body: &Program, shape: SeqShape) -> Result<Value, ValueError> {
    match shape {
        SeqShape::Lazy => {
            let upstream = match source {
                Value::Lazy(seq) => seq.clone(),
                other => LazySeq::from_items(other.items()?.into_owned()),
            };
            let body = Arc::clone(body);
            Ok(Value::Lazy(upstream.filter_map(Arc::new(move |item: &Value| {
                if item.is_null() {
                    Ok(None)
                } else {
                    body(var, item).map(Some)
                }
            }))))
        }
        SeqShape::Array | SeqShape::List => source
            .items()?
            .iter()
            .filter(|item| !item.is_null())
            .map(|item| body(var, item))
            .collect::<Result<Vec<_>, _>>()
            .map(Value::Seq),
    }
}

fn binary(op: BinaryOp, lhs: &Value, rhs: &Value) -> Result<Value, ValueError> {
    match op {
        BinaryOp::Concat => Ok(Value::Text(lhs.to_text()? + &rhs.to_text()?)),
        BinaryOp::Eq => Ok(Value::Bool(lhs == rhs)),
        BinaryOp::Ne => Ok(Value::Bool(lhs != rhs)),
        BinaryOp::Add => arithmetic(lhs, rhs, i64::wrapping_add, |a, b| a + b),
        BinaryOp::Sub => arithmetic(lhs, rhs, i64::wrapping_sub, |a, b| a - b),
        BinaryOp::Mul => arithmetic(lhs, rhs, i64::wrapping_mul, |a, b| a * b),
        BinaryOp::Div => match (lhs, rhs) {
            (Value::Int(a), Value::Int(b)) => {
                a.checked_div(*b)
                    .map(Value::Int)
                    .ok_or_else(|| ValueError::Function {
                        function: "/".to_string(),
                        message: format!("cannot divide {a} by {b}"),
                    })
            }
            _ => arithmetic(lhs, rhs, i64::wrapping_div, |a, b| a / b),
        },
    }
}

/// Null operands give null; two integers stay integral.
fn arithmetic(
    lhs: &Value,
    rhs: &Value,
    int: fn(i64, i64) -> i64,
    float: fn(f64, f64) -> f64,
) -> Result<Value, ValueError> {
    match (lhs, rhs) {
        (Value::Null, _) | (_, Value::Null) => Ok(Value::Null),
        (Value::Int(a), Value::Int(b)) => Ok(Value::Int(int(*a, *b))),
        _ => match (lhs.as_f64(), rhs.as_f64()) {
            (Some(a), Some(b)) => Ok(Value::Float(float(a, b))),
            (None, _) => Err(ValueError::shape("number", lhs.kind_name())),
            (_, None) => Err(ValueError::shape("number", rhs.kind_name())),
        },
    }
}
