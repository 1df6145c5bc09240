//! Human-readable rendering of transformation trees.
//!
//! Constructions are laid out one binding per line; everything else is
//! rendered inline. Element variables are numbered `e1, e2, ...` in order
//! of first appearance, so the text does not depend on compilation order.

use std::fmt::{self, Write};

use qmap_model::{SeqShape, Value};

use crate::cache::Transformation;
use crate::{Expr, Projection, TypePair, Var};

const INDENT: usize = 4;

impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        Renderer::new(self).expr(f, self, 0)
    }
}

impl fmt::Display for Transformation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write_lambda(f, self.pair(), self.body())
    }
}

impl fmt::Display for Projection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write_lambda(f, self.pair(), self.body())
    }
}

fn write_lambda(f: &mut impl Write, pair: &TypePair, body: &Expr) -> fmt::Result {
    write!(f, "|src: {}| ", pair.source)?;
    Renderer::new(body).expr(f, body, 0)
}

/// Display names for the element variables of one rendered tree.
struct Renderer {
    elements: Vec<Var>,
}

impl Renderer {
    fn new(root: &Expr) -> Self {
        let mut elements = Vec::new();
        number(root, &mut elements);
        Self { elements }
    }

    fn var(&self, f: &mut impl Write, var: Var) -> fmt::Result {
        match self.elements.iter().position(|seen| *seen == var) {
            Some(idx) => write!(f, "e{}", idx + 1),
            None => write!(f, "{var}"),
        }
    }

    fn expr(&self, f: &mut impl Write, expr: &Expr, indent: usize) -> fmt::Result {
        match expr {
            Expr::Var(var) => self.var(f, *var),
            Expr::Literal { value, .. } => write_literal(f, value),
            Expr::Default(ty) => write!(f, "default::<{ty}>()"),
            Expr::Member { target, member } => {
                self.expr(f, target, indent)?;
                write!(f, ".{member}")
            }
            Expr::Convert { value, from, to } => {
                self.expr(f, value, indent)?;
                if to.is_text() {
                    f.write_str(".to_string()")
                } else if from.is_text() {
                    write!(f, ".parse::<{to}>()")
                } else {
                    write!(f, " as {to}")
                }
            }
            Expr::IsNull(inner) => {
                self.expr(f, inner, indent)?;
                f.write_str(" is null")
            }
            Expr::Condition {
                test,
                then,
                otherwise,
            } => {
                f.write_char('(')?;
                self.expr(f, test, indent)?;
                f.write_str(" ? ")?;
                self.expr(f, then, indent)?;
                f.write_str(" : ")?;
                self.expr(f, otherwise, indent)?;
                f.write_char(')')
            }
            Expr::Binary { op, lhs, rhs } => {
                f.write_char('(')?;
                self.expr(f, lhs, indent)?;
                write!(f, " {} ", op.symbol())?;
                self.expr(f, rhs, indent)?;
                f.write_char(')')
            }
            Expr::Call { func, args } => {
                write!(f, "{}", func.name())?;
                self.args(f, args, indent)
            }
            Expr::Invoke { pair, arg } => {
                write!(f, "map::<{}, {}>(", pair.source, pair.destination)?;
                self.expr(f, arg, indent)?;
                f.write_char(')')
            }
            Expr::Collect {
                source,
                var,
                body,
                element,
                shape,
            } => {
                self.expr(f, source, indent)?;
                f.write_str(".iter().flatten().map(|")?;
                self.var(f, *var)?;
                f.write_str("| ")?;
                self.expr(f, body, indent)?;
                f.write_char(')')?;
                match shape {
                    SeqShape::List => write!(f, ".collect::<Vec<{element}>>()"),
                    SeqShape::Array => write!(f, ".collect::<Box<[{element}]>>()"),
                    SeqShape::Lazy => Ok(()),
                }
            }
            Expr::Construct {
                ty,
                constructor,
                args,
                bindings,
                ..
            } => {
                match constructor {
                    Some(name) => {
                        write!(f, "{ty}::{name}")?;
                        self.args(f, args, indent)?;
                    }
                    None => write!(f, "{ty}")?,
                }
                if bindings.is_empty() {
                    return Ok(());
                }
                f.write_str(" {\n")?;
                for binding in bindings {
                    write!(f, "{:width$}{}: ", "", binding.member, width = indent + INDENT)?;
                    self.expr(f, &binding.value, indent + INDENT)?;
                    f.write_str(",\n")?;
                }
                write!(f, "{:indent$}}}", "")
            }
        }
    }

    fn args(&self, f: &mut impl Write, args: &[Expr], indent: usize) -> fmt::Result {
        f.write_char('(')?;
        for (idx, arg) in args.iter().enumerate() {
            if idx > 0 {
                f.write_str(", ")?;
            }
            self.expr(f, arg, indent)?;
        }
        f.write_char(')')
    }
}

fn number(expr: &Expr, elements: &mut Vec<Var>) {
    match expr {
        Expr::Var(var) => note(*var, elements),
        Expr::Collect {
            source, var, body, ..
        } => {
            number(source, elements);
            note(*var, elements);
            number(body, elements);
        }
        _ => {
            for child in expr.children() {
                number(child, elements);
            }
        }
    }
}

fn note(var: Var, elements: &mut Vec<Var>) {
    if var != Var::SOURCE && !elements.contains(&var) {
        elements.push(var);
    }
}

fn write_literal(f: &mut impl Write, value: &Value) -> fmt::Result {
    match value {
        Value::Null => f.write_str("null"),
        Value::Text(text) => write!(f, "{text:?}"),
        Value::Float(x) if x.fract() == 0.0 && x.is_finite() => write!(f, "{x:.1}"),
        Value::Seq(_) | Value::Lazy(_) | Value::Object(_) => write!(f, "<{}>", value.kind_name()),
        scalar => match scalar.to_text() {
            Ok(text) => f.write_str(&text),
            Err(_) => write!(f, "<{}>", scalar.kind_name()),
        },
    }
}
