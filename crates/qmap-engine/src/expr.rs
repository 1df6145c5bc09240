//! Transformation IR.
//!
//! A transformation is an [`Expr`] tree over a single source variable. The
//! same tree is compiled into an executable program and, in deferred mode,
//! handed to a query provider as a [`Projection`](crate::Projection).

use std::convert::Infallible;
use std::fmt;
use std::sync::Arc;

use qmap_model::{SeqShape, Ty, TypeName, Value, ValueError};

use crate::TypePair;

/// A variable bound by a transformation or a collection body.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Var(u32);

impl Var {
    /// The source instance of a transformation.
    pub const SOURCE: Var = Var(0);

    pub(crate) fn element(id: u32) -> Self {
        Self(id)
    }

    pub fn id(self) -> u32 {
        self.0
    }
}

impl fmt::Display for Var {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if *self == Self::SOURCE {
            f.write_str("src")
        } else {
            write!(f, "e{}", self.0)
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BinaryOp {
    /// Text concatenation; null operands render as empty text.
    Concat,
    Add,
    Sub,
    Mul,
    Div,
    Eq,
    Ne,
}

impl BinaryOp {
    pub fn symbol(self) -> &'static str {
        match self {
            Self::Concat | Self::Add => "+",
            Self::Sub => "-",
            Self::Mul => "*",
            Self::Div => "/",
            Self::Eq => "==",
            Self::Ne => "!=",
        }
    }

    pub fn is_arithmetic(self) -> bool {
        matches!(self, Self::Add | Self::Sub | Self::Mul | Self::Div)
    }
}

type NativeFn = dyn Fn(&[Value]) -> Result<Value, ValueError> + Send + Sync;

/// A named native function callable from a member match expression.
#[derive(Clone)]
pub struct UserFn {
    name: String,
    returns: Ty,
    func: Arc<NativeFn>,
}

impl UserFn {
    pub fn new<F>(name: impl Into<String>, returns: Ty, func: F) -> Self
    where
        F: Fn(&[Value]) -> Result<Value, ValueError> + Send + Sync + 'static,
    {
        Self {
            name: name.into(),
            returns,
            func: Arc::new(func),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Declared result type.
    pub fn returns(&self) -> &Ty {
        &self.returns
    }

    pub fn call(&self, args: &[Value]) -> Result<Value, ValueError> {
        (self.func)(args)
    }
}

impl fmt::Debug for UserFn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UserFn")
            .field("name", &self.name)
            .field("returns", &self.returns)
            .finish_non_exhaustive()
    }
}

impl PartialEq for UserFn {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name && Arc::ptr_eq(&self.func, &other.func)
    }
}

/// Assignment of a value to a destination member.
#[derive(Debug, Clone, PartialEq)]
pub struct Binding {
    pub member: String,
    pub value: Expr,
}

/// A node of a transformation tree.
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    Var(Var),
    Literal {
        value: Value,
        ty: Ty,
    },
    /// Zero value of a type.
    Default(Ty),
    /// Member read; yields null when the target is null.
    Member {
        target: Box<Expr>,
        member: String,
    },
    /// Scalar conversion between two non-optional scalar-like types.
    Convert {
        value: Box<Expr>,
        from: Ty,
        to: Ty,
    },
    IsNull(Box<Expr>),
    Condition {
        test: Box<Expr>,
        then: Box<Expr>,
        otherwise: Box<Expr>,
    },
    Binary {
        op: BinaryOp,
        lhs: Box<Expr>,
        rhs: Box<Expr>,
    },
    Call {
        func: UserFn,
        args: Vec<Expr>,
    },
    /// Run the compiled transformation of another pair; null in, null out.
    Invoke {
        pair: TypePair,
        arg: Box<Expr>,
    },
    /// Map every non-null element of a sequence through `body`, where
    /// `var` is bound to the element. The body sees no other variable.
    Collect {
        source: Box<Expr>,
        var: Var,
        body: Box<Expr>,
        element: Ty,
        shape: SeqShape,
    },
    /// Instantiate an object shape, optionally through a named constructor,
    /// then assign member bindings in order.
    Construct {
        ty: TypeName,
        constructor: Option<String>,
        /// Position among the constructors sharing that name.
        overload: usize,
        args: Vec<Expr>,
        bindings: Vec<Binding>,
    },
}

impl Expr {
    /// The source instance of the transformation being configured.
    pub fn source() -> Self {
        Self::Var(Var::SOURCE)
    }

    pub fn literal(value: impl Into<Value>, ty: Ty) -> Self {
        Self::Literal {
            value: value.into(),
            ty,
        }
    }

    pub fn text(value: impl Into<String>) -> Self {
        Self::literal(value.into(), Ty::text())
    }

    pub fn int(value: i32) -> Self {
        Self::literal(value, Ty::i32())
    }

    pub fn float(value: f64) -> Self {
        Self::literal(value, Ty::f64())
    }

    pub fn bool(value: bool) -> Self {
        Self::literal(value, Ty::bool())
    }

    pub fn call(func: UserFn, args: Vec<Expr>) -> Self {
        Self::Call { func, args }
    }

    /// Invocation of a named constructor, for
    /// [`TypeMapping::using_constructor`](crate::TypeMapping::using_constructor).
    pub fn construct(
        ty: impl Into<TypeName>,
        constructor: impl Into<String>,
        args: Vec<Expr>,
    ) -> Self {
        Self::Construct {
            ty: ty.into(),
            constructor: Some(constructor.into()),
            overload: 0,
            args,
            bindings: Vec::new(),
        }
    }

    pub fn condition(test: Expr, then: Expr, otherwise: Expr) -> Self {
        Self::Condition {
            test: Box::new(test),
            then: Box::new(then),
            otherwise: Box::new(otherwise),
        }
    }

    pub(crate) fn invoke(pair: TypePair, arg: Expr) -> Self {
        Self::Invoke {
            pair,
            arg: Box::new(arg),
        }
    }

    #[must_use]
    pub fn member(self, name: impl Into<String>) -> Self {
        Self::Member {
            target: Box::new(self),
            member: name.into(),
        }
    }

    #[must_use]
    pub fn is_null(self) -> Self {
        Self::IsNull(Box::new(self))
    }

    #[must_use]
    pub fn binary(self, op: BinaryOp, rhs: impl Into<Expr>) -> Self {
        Self::Binary {
            op,
            lhs: Box::new(self),
            rhs: Box::new(rhs.into()),
        }
    }

    #[must_use]
    pub fn concat(self, rhs: impl Into<Expr>) -> Self {
        self.binary(BinaryOp::Concat, rhs)
    }

    #[must_use]
    pub fn plus(self, rhs: impl Into<Expr>) -> Self {
        self.binary(BinaryOp::Add, rhs)
    }

    #[must_use]
    pub fn minus(self, rhs: impl Into<Expr>) -> Self {
        self.binary(BinaryOp::Sub, rhs)
    }

    #[must_use]
    pub fn times(self, rhs: impl Into<Expr>) -> Self {
        self.binary(BinaryOp::Mul, rhs)
    }

    #[must_use]
    pub fn divided_by(self, rhs: impl Into<Expr>) -> Self {
        self.binary(BinaryOp::Div, rhs)
    }

    #[must_use]
    pub fn equals(self, rhs: impl Into<Expr>) -> Self {
        self.binary(BinaryOp::Eq, rhs)
    }

    #[must_use]
    pub fn not_equals(self, rhs: impl Into<Expr>) -> Self {
        self.binary(BinaryOp::Ne, rhs)
    }

    /// Short node name, used in error messages.
    pub fn kind_name(&self) -> &'static str {
        match self {
            Self::Var(_) => "variable",
            Self::Literal { .. } => "literal",
            Self::Default(_) => "default value",
            Self::Member { .. } => "member access",
            Self::Convert { .. } => "conversion",
            Self::IsNull(_) => "null test",
            Self::Condition { .. } => "condition",
            Self::Binary { .. } => "binary operation",
            Self::Call { .. } => "function call",
            Self::Invoke { .. } => "nested transformation",
            Self::Collect { .. } => "collection mapping",
            Self::Construct { .. } => "construction",
        }
    }

    /// Direct children in evaluation order.
    pub fn children(&self) -> Vec<&Expr> {
        match self {
            Self::Var(_) | Self::Literal { .. } | Self::Default(_) => Vec::new(),
            Self::Member { target: inner, .. }
            | Self::Convert { value: inner, .. }
            | Self::IsNull(inner)
            | Self::Invoke { arg: inner, .. } => vec![&**inner],
            Self::Condition {
                test,
                then,
                otherwise,
            } => vec![&**test, &**then, &**otherwise],
            Self::Binary { lhs, rhs, .. } => vec![&**lhs, &**rhs],
            Self::Call { args, .. } => args.iter().collect(),
            Self::Collect { source, body, .. } => vec![&**source, &**body],
            Self::Construct { args, bindings, .. } => args
                .iter()
                .chain(bindings.iter().map(|b| &b.value))
                .collect(),
        }
    }

    /// Rebuild this node with every direct child replaced by `f(child)`.
    pub fn try_map_children<E, F>(&self, mut f: F) -> Result<Expr, E>
    where
        F: FnMut(&Expr) -> Result<Expr, E>,
    {
        let mut boxed = |expr: &Expr| f(expr).map(Box::new);
        Ok(match self {
            Self::Var(_) | Self::Literal { .. } | Self::Default(_) => self.clone(),
            Self::Member { target, member } => Self::Member {
                target: boxed(target)?,
                member: member.clone(),
            },
            Self::Convert { value, from, to } => Self::Convert {
                value: boxed(value)?,
                from: from.clone(),
                to: to.clone(),
            },
            Self::IsNull(inner) => Self::IsNull(boxed(inner)?),
            Self::Condition {
                test,
                then,
                otherwise,
            } => Self::Condition {
                test: boxed(test)?,
                then: boxed(then)?,
                otherwise: boxed(otherwise)?,
            },
            Self::Binary { op, lhs, rhs } => Self::Binary {
                op: *op,
                lhs: boxed(lhs)?,
                rhs: boxed(rhs)?,
            },
            Self::Call { func, args } => Self::Call {
                func: func.clone(),
                args: args
                    .iter()
                    .map(|arg| boxed(arg).map(|b| *b))
                    .collect::<Result<_, E>>()?,
            },
            Self::Invoke { pair, arg } => Self::Invoke {
                pair: pair.clone(),
                arg: boxed(arg)?,
            },
            Self::Collect {
                source,
                var,
                body,
                element,
                shape,
            } => Self::Collect {
                source: boxed(source)?,
                var: *var,
                body: boxed(body)?,
                element: element.clone(),
                shape: *shape,
            },
            Self::Construct {
                ty,
                constructor,
                overload,
                args,
                bindings,
            } => Self::Construct {
                ty: ty.clone(),
                constructor: constructor.clone(),
                overload: *overload,
                args: args
                    .iter()
                    .map(|arg| boxed(arg).map(|b| *b))
                    .collect::<Result<_, E>>()?,
                bindings: bindings
                    .iter()
                    .map(|binding| {
                        boxed(&binding.value).map(|value| Binding {
                            member: binding.member.clone(),
                            value: *value,
                        })
                    })
                    .collect::<Result<_, E>>()?,
            },
        })
    }

    /// Replace every free occurrence of `var` with `replacement`.
    ///
    /// A collection body that rebinds `var` is left untouched.
    pub fn substitute(&self, var: Var, replacement: &Expr) -> Expr {
        match self {
            Self::Var(v) if *v == var => replacement.clone(),
            Self::Collect {
                source,
                var: bound,
                body,
                element,
                shape,
            } if *bound == var => Self::Collect {
                source: Box::new(source.substitute(var, replacement)),
                var: *bound,
                body: body.clone(),
                element: element.clone(),
                shape: *shape,
            },
            other => other
                .try_map_children(|child| Ok::<_, Infallible>(child.substitute(var, replacement)))
                .unwrap_or_else(|never| match never {}),
        }
    }

    /// True when `var` occurs free in this tree.
    pub fn references(&self, var: Var) -> bool {
        match self {
            Self::Var(v) => *v == var,
            Self::Collect {
                source,
                var: bound,
                body,
                ..
            } => source.references(var) || (*bound != var && body.references(var)),
            other => other.children().into_iter().any(|child| child.references(var)),
        }
    }

    /// Number of nodes in this tree.
    pub fn size(&self) -> usize {
        1 + self.children().into_iter().map(Expr::size).sum::<usize>()
    }
}

impl From<&str> for Expr {
    fn from(value: &str) -> Self {
        Self::text(value)
    }
}

impl From<String> for Expr {
    fn from(value: String) -> Self {
        Self::text(value)
    }
}

impl From<i32> for Expr {
    fn from(value: i32) -> Self {
        Self::int(value)
    }
}

impl From<f64> for Expr {
    fn from(value: f64) -> Self {
        Self::float(value)
    }
}

impl From<bool> for Expr {
    fn from(value: bool) -> Self {
        Self::bool(value)
    }
}
