//! Transformation synthesis: builds the construction expression for a type
//! pair and compiles it, pulling in nested pairs as they are discovered.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Instant;

use qmap_model::Catalog;
use tracing::{debug, trace, warn};

use crate::cache::{Transformation, TransformationCache};
use crate::exec::ProgramBuilder;
use crate::typing::{self, TypeEnv};
use crate::{Binding, ConfigError, Expr, MappingConfiguration, MemberReflector, TypePair, Var};

/// One compilation session. Pairs reached while compiling are compiled in
/// the same session; a pair that is reached again while it is still being
/// built is invoked through its cache slot instead of being re-entered.
pub(crate) struct Synthesizer<'a> {
    pub(crate) reflector: MemberReflector<'a>,
    configurations: &'a HashMap<TypePair, MappingConfiguration>,
    cache: &'a TransformationCache,
    in_progress: Vec<TypePair>,
    /// Cache slots created by this session, discarded if it fails.
    pub(crate) created: Vec<TypePair>,
}

impl<'a> Synthesizer<'a> {
    pub(crate) fn new(
        catalog: &'a Catalog,
        configurations: &'a HashMap<TypePair, MappingConfiguration>,
        cache: &'a TransformationCache,
    ) -> Self {
        Self {
            reflector: MemberReflector::new(catalog),
            configurations,
            cache,
            in_progress: Vec::new(),
            created: Vec::new(),
        }
    }

    /// Compile `pair` and every pair it depends on.
    pub(crate) fn compile(&mut self, pair: &TypePair) -> Result<Arc<Transformation>, ConfigError> {
        let started = Instant::now();
        let slot = self.cache.slot(pair, &mut self.created);
        self.in_progress.push(pair.clone());
        let body = self.synthesize(pair);
        self.in_progress.retain(|p| p != pair);
        let body = body?;

        let program = ProgramBuilder::new(self.reflector.catalog(), self.cache, &mut self.created)
            .build(&body)?;
        let bindings = match &body {
            Expr::Construct { bindings, .. } => bindings.len(),
            _ => 0,
        };
        let transformation = slot.fill(Arc::new(Transformation::new(pair.clone(), body, program)));
        debug!(
            pair = %pair,
            bindings,
            elapsed_us = started.elapsed().as_micros() as u64,
            "compiled transformation"
        );
        Ok(transformation)
    }

    /// Make sure `pair` is compiled or being compiled.
    pub(crate) fn ensure(&mut self, pair: &TypePair) -> Result<(), ConfigError> {
        if self.in_progress.contains(pair) {
            trace!(pair = %pair, "recursive pair, invoking through cache");
            return Ok(());
        }
        if self.cache.compiled(pair).is_some() {
            return Ok(());
        }
        self.compile(pair).map(|_| ())
    }

    pub(crate) fn fresh_var(&self) -> Var {
        self.cache.fresh_var()
    }

    pub(crate) fn source_env(&self, pair: &TypePair) -> TypeEnv<'a> {
        TypeEnv::source(self.reflector, pair.source_ty())
    }

    /// Construction expression for `pair` over [`Var::SOURCE`].
    fn synthesize(&mut self, pair: &TypePair) -> Result<Expr, ConfigError> {
        self.reflector.object(&pair.source)?;
        let destination = self.reflector.object(&pair.destination)?;
        let configuration = self.configurations.get(pair);
        let source = Expr::source();
        let source_ty = pair.source_ty();

        let constructor = self.resolve_constructor(
            pair,
            destination,
            configuration.and_then(MappingConfiguration::constructor),
        )?;

        let mut bindings = Vec::new();
        for member in destination.writable_members() {
            let configured = configuration.and_then(|c| c.member_match(&member.name));
            if constructor.covers(&member.name) {
                if configured.is_some() {
                    warn!(
                        pair = %pair,
                        member = %member.name,
                        "member is set by the constructor, ignoring its configured match"
                    );
                }
                continue;
            }

            let resolved = match configured {
                Some(matched) => {
                    let ty = typing::infer(&matched.source, &self.source_env(pair))?;
                    Some((matched.source.clone(), ty))
                }
                None => self
                    .reflector
                    .find_readable(&source_ty, &member.name)
                    .map(|found| (source.clone().member(found.name.clone()), found.ty.clone())),
            };
            let Some((value, value_ty)) = resolved else {
                debug!(pair = %pair, member = %member.name, "no source member, leaving default");
                continue;
            };

            match self.convert(value, &value_ty, &member.ty)? {
                Some(value) => {
                    trace!(pair = %pair, member = %member.name, "bound member");
                    bindings.push(Binding {
                        member: member.name.clone(),
                        value,
                    });
                }
                None => debug!(
                    pair = %pair,
                    member = %member.name,
                    from = %value_ty,
                    to = %member.ty,
                    "no conversion, leaving default"
                ),
            }
        }

        Ok(Expr::Construct {
            ty: pair.destination.clone(),
            constructor: constructor.name,
            overload: constructor.overload,
            args: constructor.args,
            bindings,
        })
    }
}
