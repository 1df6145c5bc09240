//! Deferred mode: transformations handed to an external query provider as
//! self-contained expressions instead of being executed in process.

use qmap_model::{Ty, TypeName};

use crate::{ConfigError, Expr, Mapper, TypePair, Var};

/// A transformation as one standalone expression over [`Var::SOURCE`].
///
/// Nested object transformations are inlined so a provider never needs the
/// mapper to understand it. A pair that would inline into itself stays an
/// [`Expr::Invoke`].
#[derive(Debug, Clone, PartialEq)]
pub struct Projection {
    pair: TypePair,
    body: Expr,
}

impl Projection {
    pub(crate) fn build(mapper: &Mapper, pair: &TypePair) -> Result<Self, ConfigError> {
        let transformation = mapper.transformation(pair)?;
        let mut stack = vec![pair.clone()];
        let body = inline(transformation.body(), mapper, &mut stack)?;
        Ok(Self {
            pair: pair.clone(),
            body,
        })
    }

    pub fn pair(&self) -> &TypePair {
        &self.pair
    }

    /// The variable standing for each source element.
    pub fn parameter(&self) -> Var {
        Var::SOURCE
    }

    pub fn source_type(&self) -> Ty {
        self.pair.source_ty()
    }

    pub fn result_type(&self) -> Ty {
        self.pair.destination_ty()
    }

    pub fn body(&self) -> &Expr {
        &self.body
    }

    pub fn into_body(self) -> Expr {
        self.body
    }
}

/// Replace nested transformation calls with their bodies.
fn inline(expr: &Expr, mapper: &Mapper, stack: &mut Vec<TypePair>) -> Result<Expr, ConfigError> {
    match expr {
        Expr::Invoke { pair, arg } if !stack.contains(pair) => {
            let arg = inline(arg, mapper, stack)?;
            let nested = mapper.transformation(pair)?;
            stack.push(pair.clone());
            let body = inline(nested.body(), mapper, stack);
            stack.pop();
            Ok(body?.substitute(Var::SOURCE, &arg))
        }
        other => other.try_map_children(|child| inline(child, mapper, stack)),
    }
}

/// A source of elements that can apply a [`Projection`] itself, e.g. by
/// translating it into a database query.
pub trait Queryable {
    type Output;

    /// Name of the object shape the query yields.
    fn element_type(&self) -> TypeName;

    /// Attach the projection to the query.
    fn select(self, projection: Projection) -> Self::Output;
}
