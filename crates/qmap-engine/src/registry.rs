//! Mapping configuration and the builder that collects it.
//!
//! Configuration happens entirely on a [`MapperBuilder`]. Building the
//! [`Mapper`] freezes it, so a pair can never be reconfigured after its
//! transformation has been compiled.

use std::collections::HashMap;

use qmap_model::{Catalog, ConstructorDesc, Reflect, TypeDesc};
use tracing::{debug, info};

use crate::typing::{self, TypeEnv};
use crate::{ConfigError, Expr, Mapper, MemberReflector, TypePair};

/// A user-supplied source expression for one destination member.
#[derive(Debug, Clone, PartialEq)]
pub struct MemberMatch {
    /// Destination member name, as declared.
    pub member: String,
    /// Expression over [`Expr::source`].
    pub source: Expr,
}

/// An explicitly chosen destination constructor with its argument expressions.
#[derive(Debug, Clone, PartialEq)]
pub struct ConstructorChoice {
    pub constructor: String,
    /// Position among the destination's constructors sharing that name.
    pub overload: usize,
    pub args: Vec<Expr>,
}

/// Everything configured for one type pair.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MappingConfiguration {
    matches: Vec<MemberMatch>,
    constructor: Option<ConstructorChoice>,
}

impl MappingConfiguration {
    /// Match for a destination member, compared case-insensitively.
    pub fn member_match(&self, member: &str) -> Option<&MemberMatch> {
        self.matches
            .iter()
            .find(|m| m.member.eq_ignore_ascii_case(member))
    }

    pub fn matches(&self) -> &[MemberMatch] {
        &self.matches
    }

    pub fn constructor(&self) -> Option<&ConstructorChoice> {
        self.constructor.as_ref()
    }
}

/// Fluent configurator handed to [`MapperBuilder::configure`].
///
/// Every call is validated against the registered shapes immediately.
pub struct TypeMapping<'c> {
    pair: TypePair,
    reflector: MemberReflector<'c>,
    configuration: MappingConfiguration,
}

impl<'c> TypeMapping<'c> {
    fn new(pair: TypePair, reflector: MemberReflector<'c>) -> Self {
        Self {
            pair,
            reflector,
            configuration: MappingConfiguration::default(),
        }
    }

    pub fn pair(&self) -> &TypePair {
        &self.pair
    }

    fn env(&self) -> TypeEnv<'c> {
        TypeEnv::source(self.reflector, self.pair.source_ty())
    }

    /// Compute a destination member from `source`, an expression over
    /// [`Expr::source`]. A later match for the same member replaces it.
    ///
    /// # Errors
    ///
    /// The member must exist and be writable, and `source` must type-check
    /// against the source shape.
    pub fn match_member(
        &mut self,
        member: &str,
        source: impl Into<Expr>,
    ) -> Result<&mut Self, ConfigError> {
        let source = source.into();
        let destination = self.reflector.object(&self.pair.destination)?;
        let declared = destination
            .find_member(member)
            .ok_or_else(|| ConfigError::UnknownMember {
                member: member.to_string(),
                type_name: self.pair.destination.to_string(),
            })?;
        if !declared.writable {
            return Err(ConfigError::NotWritable {
                member: declared.name.clone(),
                type_name: self.pair.destination.to_string(),
            });
        }
        typing::infer(&source, &self.env())?;

        self.configuration
            .matches
            .retain(|m| !m.member.eq_ignore_ascii_case(&declared.name));
        self.configuration.matches.push(MemberMatch {
            member: declared.name.clone(),
            source,
        });
        Ok(self)
    }

    /// Create destination instances through an explicit constructor
    /// invocation built with [`Expr::construct`].
    ///
    /// Among same-named overloads with the right parameter count, one whose
    /// parameter types equal the argument types wins, else the first.
    ///
    /// # Errors
    ///
    /// Anything other than a bare invocation of one of the destination's
    /// constructors, with its exact parameter count, is rejected.
    pub fn using_constructor(&mut self, invocation: Expr) -> Result<&mut Self, ConfigError> {
        let destination_type = self.pair.destination.to_string();
        let (name, args) = match invocation {
            Expr::Construct {
                ty,
                constructor: Some(name),
                args,
                bindings,
                ..
            } if ty == self.pair.destination && bindings.is_empty() => (name, args),
            other => {
                return Err(ConfigError::NotAConstructor {
                    destination_type,
                    found: other.kind_name().to_string(),
                });
            }
        };
        let env = self.env();
        let types = args
            .iter()
            .map(|arg| typing::infer(arg, &env))
            .collect::<Result<Vec<_>, _>>()?;
        let destination = self.reflector.object(&self.pair.destination)?;
        let candidates: Vec<(usize, &ConstructorDesc)> = destination
            .overloads(&name)
            .enumerate()
            .filter(|(_, ctor)| ctor.params.len() == args.len())
            .collect();
        let (overload, ctor) = candidates
            .iter()
            .find(|(_, ctor)| ctor.param_types().eq(types.iter()))
            .or_else(|| candidates.first())
            .copied()
            .ok_or_else(|| ConfigError::NoMatchingConstructor {
                destination_type,
                signature: format!("{name} with {} argument(s)", args.len()),
            })?;
        debug!(pair = %self.pair, constructor = %ctor.signature(), overload, "constructor chosen");
        self.configuration.constructor = Some(ConstructorChoice {
            constructor: ctor.name.clone(),
            overload,
            args,
        });
        Ok(self)
    }

    /// Create destination instances through the constructor whose parameter
    /// types equal the argument types exactly.
    ///
    /// # Errors
    ///
    /// Fails when no constructor has that exact signature.
    pub fn using_arguments(&mut self, args: Vec<Expr>) -> Result<&mut Self, ConfigError> {
        let env = self.env();
        let types = args
            .iter()
            .map(|arg| typing::infer(arg, &env))
            .collect::<Result<Vec<_>, _>>()?;
        let destination = self.reflector.object(&self.pair.destination)?;
        let (index, ctor) = destination
            .constructors
            .iter()
            .enumerate()
            .find(|(_, ctor)| ctor.param_types().eq(types.iter()))
            .ok_or_else(|| {
                let rendered: Vec<String> = types.iter().map(ToString::to_string).collect();
                ConfigError::NoMatchingConstructor {
                    destination_type: self.pair.destination.to_string(),
                    signature: format!("({})", rendered.join(", ")),
                }
            })?;
        let overload = destination.overload_of(index);
        debug!(pair = %self.pair, constructor = %ctor.signature(), overload, "constructor chosen");
        self.configuration.constructor = Some(ConstructorChoice {
            constructor: ctor.name.clone(),
            overload,
            args,
        });
        Ok(self)
    }

    fn into_configuration(self) -> MappingConfiguration {
        self.configuration
    }
}

/// Collects shapes and per-pair configuration, then builds a [`Mapper`].
#[derive(Debug, Default)]
pub struct MapperBuilder {
    catalog: Catalog,
    configurations: HashMap<TypePair, MappingConfiguration>,
}

impl MapperBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start from an existing catalog.
    pub fn with_catalog(catalog: Catalog) -> Self {
        Self {
            catalog,
            configurations: HashMap::new(),
        }
    }

    /// Describe `T` and every shape reachable from it.
    pub fn register<T: Reflect>(&mut self) -> &mut Self {
        self.catalog.register_type::<T>();
        self
    }

    /// Register a hand-written descriptor.
    ///
    /// # Errors
    ///
    /// Propagates catalog validation failures.
    pub fn register_desc(&mut self, desc: impl Into<TypeDesc>) -> Result<&mut Self, ConfigError> {
        self.catalog.register(desc)?;
        Ok(self)
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    /// Configure the mapping between two reflected types.
    ///
    /// # Errors
    ///
    /// See [`configure_pair`](Self::configure_pair).
    pub fn configure<S, D, F>(&mut self, configure: F) -> Result<&mut Self, ConfigError>
    where
        S: Reflect,
        D: Reflect,
        F: FnOnce(&mut TypeMapping<'_>) -> Result<(), ConfigError>,
    {
        let pair = TypePair::of::<S, D>()?;
        self.register::<S>().register::<D>();
        self.configure_pair(pair, configure)
    }

    /// Configure the mapping between two registered object shapes.
    ///
    /// # Errors
    ///
    /// A pair may be configured once. Both sides must be registered object
    /// shapes, and every match and constructor choice must validate.
    pub fn configure_pair<F>(&mut self, pair: TypePair, configure: F) -> Result<&mut Self, ConfigError>
    where
        F: FnOnce(&mut TypeMapping<'_>) -> Result<(), ConfigError>,
    {
        if self.configurations.contains_key(&pair) {
            return Err(ConfigError::DuplicateConfiguration {
                source_type: pair.source.to_string(),
                destination_type: pair.destination.to_string(),
            });
        }
        let reflector = MemberReflector::new(&self.catalog);
        reflector.object(&pair.source)?;
        reflector.object(&pair.destination)?;

        let mut mapping = TypeMapping::new(pair.clone(), reflector);
        configure(&mut mapping)?;
        let configuration = mapping.into_configuration();
        debug!(
            pair = %pair,
            matches = configuration.matches.len(),
            explicit_constructor = configuration.constructor.is_some(),
            "configured mapping"
        );
        self.configurations.insert(pair, configuration);
        Ok(self)
    }

    /// Freeze configuration. Nothing is compiled until first use.
    pub fn build(self) -> Mapper {
        info!(
            types = self.catalog.len(),
            configured_pairs = self.configurations.len(),
            "mapper built"
        );
        Mapper::new(self.catalog, self.configurations)
    }
}
