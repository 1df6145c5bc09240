//! Static typing of transformation expressions.

use qmap_model::{ScalarKind, Ty};

use crate::{BinaryOp, ConfigError, Expr, MemberReflector, Var};

/// Variable types in scope while typing an expression.
#[derive(Debug, Clone)]
pub(crate) struct TypeEnv<'c> {
    reflector: MemberReflector<'c>,
    bindings: Vec<(Var, Ty)>,
}

impl<'c> TypeEnv<'c> {
    /// Scope of a transformation body: only the source variable is bound.
    pub(crate) fn source(reflector: MemberReflector<'c>, source: Ty) -> Self {
        Self {
            reflector,
            bindings: vec![(Var::SOURCE, source)],
        }
    }

    fn lookup(&self, var: Var) -> Option<&Ty> {
        self.bindings
            .iter()
            .rev()
            .find(|(bound, _)| *bound == var)
            .map(|(_, ty)| ty)
    }

    fn with(&self, var: Var, ty: Ty) -> Self {
        let mut env = self.clone();
        env.bindings.push((var, ty));
        env
    }
}

/// Result type of an expression.
///
/// Reading a member through an optional target yields an optional result.
pub(crate) fn infer(expr: &Expr, env: &TypeEnv<'_>) -> Result<Ty, ConfigError> {
    match expr {
        Expr::Var(var) => env
            .lookup(*var)
            .cloned()
            .ok_or_else(|| ConfigError::invalid_expression(format!("unbound variable {var}"))),
        Expr::Literal { ty, .. } | Expr::Default(ty) => Ok(ty.clone()),
        Expr::Member { target, member } => {
            let target_ty = infer(target, env)?;
            let Some(type_name) = target_ty.object_name() else {
                return Err(ConfigError::invalid_expression(format!(
                    "cannot read member '{member}' of {target_ty}"
                )));
            };
            let found = env
                .reflector
                .find_readable(target_ty.unwrap_optional(), member)
                .ok_or_else(|| ConfigError::UnknownMember {
                    member: member.clone(),
                    type_name: type_name.to_string(),
                })?;
            if target_ty.is_optional() && !found.ty.is_optional() {
                Ok(Ty::optional(found.ty.clone()))
            } else {
                Ok(found.ty.clone())
            }
        }
        Expr::Convert { to, .. } => Ok(to.clone()),
        Expr::IsNull(inner) => {
            infer(inner, env)?;
            Ok(Ty::bool())
        }
        Expr::Condition {
            test,
            then,
            otherwise,
        } => {
            let test_ty = infer(test, env)?;
            if test_ty.unwrap_optional() != &Ty::bool() {
                return Err(ConfigError::invalid_expression(format!(
                    "condition must be bool, found {test_ty}"
                )));
            }
            infer(otherwise, env)?;
            infer(then, env)
        }
        Expr::Binary { op, lhs, rhs } => {
            let lhs = infer(lhs, env)?;
            let rhs = infer(rhs, env)?;
            binary_result(*op, &lhs, &rhs)
        }
        Expr::Call { func, args } => {
            for arg in args {
                infer(arg, env)?;
            }
            Ok(func.returns().clone())
        }
        Expr::Invoke { pair, arg } => {
            infer(arg, env)?;
            Ok(pair.destination_ty())
        }
        Expr::Collect {
            source,
            var,
            body,
            element,
            shape,
        } => {
            let source_ty = infer(source, env)?;
            let item = source_ty.element().cloned().ok_or_else(|| {
                ConfigError::invalid_expression(format!("cannot iterate over {source_ty}"))
            })?;
            infer(body, &env.with(*var, item.unwrap_optional().clone()))?;
            Ok(Ty::sequence(*shape, element.clone()))
        }
        Expr::Construct { ty, args, bindings, .. } => {
            for arg in args {
                infer(arg, env)?;
            }
            for binding in bindings {
                infer(&binding.value, env)?;
            }
            Ok(Ty::Object(ty.clone()))
        }
    }
}

fn binary_result(op: BinaryOp, lhs: &Ty, rhs: &Ty) -> Result<Ty, ConfigError> {
    match op {
        BinaryOp::Concat => Ok(Ty::text()),
        BinaryOp::Eq | BinaryOp::Ne => Ok(Ty::bool()),
        BinaryOp::Add | BinaryOp::Sub | BinaryOp::Mul | BinaryOp::Div => {
            let (Some(l), Some(r)) = (numeric_kind(lhs), numeric_kind(rhs)) else {
                return Err(ConfigError::invalid_expression(format!(
                    "operator {} needs numeric operands, found {lhs} and {rhs}",
                    op.symbol()
                )));
            };
            let widened = Ty::Scalar(widen(l, r));
            if lhs.is_optional() || rhs.is_optional() {
                Ok(Ty::optional(widened))
            } else {
                Ok(widened)
            }
        }
    }
}

fn numeric_kind(ty: &Ty) -> Option<ScalarKind> {
    ty.scalar_kind().filter(|kind| kind.is_numeric())
}

/// Common type of two numeric operands.
fn widen(l: ScalarKind, r: ScalarKind) -> ScalarKind {
    [ScalarKind::F64, ScalarKind::F32, ScalarKind::I64]
        .into_iter()
        .find(|kind| l == *kind || r == *kind)
        .unwrap_or(ScalarKind::I32)
}
