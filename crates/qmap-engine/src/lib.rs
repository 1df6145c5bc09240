//! Object-graph transformation engine.
//!
//! Given two registered object shapes, the engine synthesizes a
//! transformation that builds a destination instance from a source
//! instance, compiles it once, and caches it for the mapper's lifetime.
//!
//! # Pipeline
//!
//! 1. **Configure** ([`MapperBuilder`]): register shapes, add member matches
//!    and constructor choices per [`TypePair`]
//! 2. **Synthesize**: pick a constructor, bind every writable destination
//!    member by name, convert values with the [conversion rules](convert)
//! 3. **Compile**: lower the [`Expr`] tree into closures, cached per pair
//! 4. **Run**: eager ([`Mapper::map_all`]), lazy ([`Mapper::map_iter`]), or
//!    deferred to a query provider ([`Mapper::map_query`])
//!
//! Transformations can be inspected as text with [`Mapper::inspect`].

#![deny(unsafe_code)]

mod cache;
mod collection;
mod constructor;
pub mod convert;
mod error;
mod exec;
mod expr;
mod mapper;
mod pair;
mod query;
mod reflector;
mod registry;
mod render;
mod synth;
mod typing;

pub use cache::Transformation;
pub use convert::{ConversionRule, classify};
pub use error::{ConfigError, MapError, PairSide, Result};
pub use expr::{BinaryOp, Binding, Expr, UserFn, Var};
pub use mapper::Mapper;
pub use pair::TypePair;
pub use query::{Projection, Queryable};
pub use reflector::MemberReflector;
pub use registry::{ConstructorChoice, MapperBuilder, MappingConfiguration, MemberMatch, TypeMapping};

pub use qmap_model as model;
