//! The built mapper: compiles transformations on first use and runs them.

use std::collections::HashMap;
use std::sync::Arc;

use qmap_model::{Catalog, Reflect, Value};
use tracing::{debug, info_span};

use crate::cache::{Transformation, TransformationCache};
use crate::pair::object_name;
use crate::query::{Projection, Queryable};
use crate::synth::Synthesizer;
use crate::{ConfigError, MapError, MapperBuilder, MappingConfiguration, Result, TypePair};

/// Compiles and caches one transformation per type pair.
///
/// Configuration is frozen; compiled transformations are shared and safe to
/// run from many threads at once. Each pair is compiled at most once.
///
/// # Example
///
/// ```ignore
/// let mut builder = Mapper::builder();
/// builder.configure::<Person, PersonDto, _>(|m| {
///     m.match_member(
///         "Fullname",
///         Expr::source().member("Firstname").concat(" ").concat(Expr::source().member("Lastname")),
///     )?;
///     Ok(())
/// })?;
/// let mapper = builder.build();
/// let dto: PersonDto = mapper.map(&person)?;
/// ```
#[derive(Debug)]
pub struct Mapper {
    catalog: Catalog,
    configurations: HashMap<TypePair, MappingConfiguration>,
    cache: TransformationCache,
}

impl Mapper {
    pub fn builder() -> MapperBuilder {
        MapperBuilder::new()
    }

    pub(crate) fn new(
        catalog: Catalog,
        configurations: HashMap<TypePair, MappingConfiguration>,
    ) -> Self {
        Self {
            catalog,
            configurations,
            cache: TransformationCache::new(),
        }
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn configuration(&self, pair: &TypePair) -> Option<&MappingConfiguration> {
        self.configurations.get(pair)
    }

    pub fn is_compiled(&self, pair: &TypePair) -> bool {
        self.cache.compiled(pair).is_some()
    }

    pub fn compiled_count(&self) -> usize {
        self.cache.compiled_count()
    }

    /// The compiled transformation for `pair`, compiling it (and the pairs
    /// it reaches) on first request.
    ///
    /// # Errors
    ///
    /// Configuration problems found while synthesizing. Nothing from a
    /// failed compilation stays cached.
    pub fn transformation(&self, pair: &TypePair) -> std::result::Result<Arc<Transformation>, ConfigError> {
        if let Some(compiled) = self.cache.compiled(pair) {
            return Ok(compiled);
        }
        let _guard = self.cache.lock_compilation();
        if let Some(compiled) = self.cache.compiled(pair) {
            return Ok(compiled);
        }

        let span = info_span!("compile", pair = %pair);
        span.in_scope(|| {
            let mut synthesizer = Synthesizer::new(&self.catalog, &self.configurations, &self.cache);
            match synthesizer.compile(pair) {
                Ok(transformation) => Ok(transformation),
                Err(err) => {
                    debug!(
                        error = %err,
                        discarded = synthesizer.created.len(),
                        "compilation failed"
                    );
                    self.cache.discard(&synthesizer.created);
                    Err(err)
                }
            }
        })
    }

    /// Map one dynamic value.
    ///
    /// # Errors
    ///
    /// Compilation errors, or value errors raised while converting.
    pub fn map_value(&self, pair: &TypePair, source: &Value) -> Result<Value> {
        let transformation = self.transformation(pair)?;
        Ok(transformation.apply(source)?)
    }

    /// Map every value eagerly.
    ///
    /// # Errors
    ///
    /// Stops at the first failing element.
    pub fn map_values(&self, pair: &TypePair, sources: &[Value]) -> Result<Vec<Value>> {
        let transformation = self.transformation(pair)?;
        sources
            .iter()
            .map(|source| transformation.apply(source).map_err(MapError::from))
            .collect()
    }

    /// Map one typed instance.
    ///
    /// # Errors
    ///
    /// See [`map_value`](Self::map_value).
    pub fn map<S: Reflect, D: Reflect>(&self, source: &S) -> Result<D> {
        let pair = TypePair::of::<S, D>()?;
        let value = self.map_value(&pair, &source.to_value())?;
        Ok(D::from_value(value)?)
    }

    /// Map a slice eagerly; the output has the same length and order.
    ///
    /// # Errors
    ///
    /// Stops at the first failing element.
    pub fn map_all<S: Reflect, D: Reflect>(&self, sources: &[S]) -> Result<Vec<D>> {
        let pair = TypePair::of::<S, D>()?;
        let transformation = self.transformation(&pair)?;
        sources
            .iter()
            .map(|source| {
                let value = transformation.apply(&source.to_value())?;
                Ok(D::from_value(value)?)
            })
            .collect()
    }

    /// Map lazily: the transformation is compiled now, each element is
    /// mapped when the iterator reaches it.
    ///
    /// # Errors
    ///
    /// Compilation errors are returned up front; element errors are yielded.
    pub fn map_iter<S, D, I>(&self, sources: I) -> Result<impl Iterator<Item = Result<D>>>
    where
        S: Reflect,
        D: Reflect,
        I: IntoIterator<Item = S>,
    {
        let pair = TypePair::of::<S, D>()?;
        let transformation = self.transformation(&pair)?;
        Ok(sources.into_iter().map(move |source| {
            let value = transformation.apply(&source.to_value())?;
            Ok(D::from_value(value)?)
        }))
    }

    /// The transformation of `S -> D` as a standalone expression, with nested
    /// object transformations inlined.
    ///
    /// # Errors
    ///
    /// Compilation errors.
    pub fn project<S: Reflect, D: Reflect>(&self) -> Result<Projection> {
        let pair = TypePair::of::<S, D>()?;
        Ok(self.project_pair(&pair)?)
    }

    pub fn project_pair(&self, pair: &TypePair) -> std::result::Result<Projection, ConfigError> {
        Projection::build(self, pair)
    }

    /// Hand the projection of `query`'s element type into `D` to the query.
    ///
    /// # Errors
    ///
    /// Compilation errors.
    pub fn map_query<D: Reflect, Q: Queryable>(&self, query: Q) -> Result<Q::Output> {
        let pair = TypePair::new(query.element_type(), object_name(&D::ty())?);
        let projection = self.project_pair(&pair)?;
        Ok(query.select(projection))
    }

    /// Human-readable rendering of the compiled `S -> D` transformation.
    ///
    /// # Errors
    ///
    /// Compilation errors.
    pub fn inspect<S: Reflect, D: Reflect>(&self) -> Result<String> {
        let pair = TypePair::of::<S, D>()?;
        Ok(self.inspect_pair(&pair)?)
    }

    pub fn inspect_pair(&self, pair: &TypePair) -> std::result::Result<String, ConfigError> {
        self.transformation(pair)
            .map(|transformation| transformation.to_string())
    }
}
