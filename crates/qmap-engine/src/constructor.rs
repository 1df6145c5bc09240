//! Constructor selection and argument binding.

use qmap_model::{ConstructorDesc, ObjectDesc, ParamDesc};
use tracing::{debug, trace};

use crate::synth::Synthesizer;
use crate::{ConfigError, ConstructorChoice, Expr, PairSide, TypePair, typing};

/// How a destination instance gets created.
#[derive(Debug, Clone, Default)]
pub(crate) struct ResolvedConstructor {
    /// `None` for the implicit parameterless constructor.
    pub(crate) name: Option<String>,
    pub(crate) overload: usize,
    pub(crate) args: Vec<Expr>,
    /// Destination members the constructor already sets.
    covered: Vec<String>,
}

impl ResolvedConstructor {
    pub(crate) fn covers(&self, member: &str) -> bool {
        self.covered.iter().any(|c| c.eq_ignore_ascii_case(member))
    }
}

/// Index of the first public constructor, else of the first non-public one.
pub(crate) fn select(constructors: &[ConstructorDesc]) -> Option<usize> {
    constructors
        .iter()
        .position(ConstructorDesc::is_public)
        .or_else(|| (!constructors.is_empty()).then_some(0))
}

impl Synthesizer<'_> {
    pub(crate) fn resolve_constructor(
        &mut self,
        pair: &TypePair,
        destination: &ObjectDesc,
        choice: Option<&ConstructorChoice>,
    ) -> Result<ResolvedConstructor, ConfigError> {
        if let Some(choice) = choice {
            return self.configured_constructor(pair, destination, choice);
        }
        let Some(index) = select(&destination.constructors) else {
            return Ok(ResolvedConstructor::default());
        };
        let ctor = &destination.constructors[index];

        let source_ty = pair.source_ty();
        let destination_ty = pair.destination_ty();
        let mut resolved = ResolvedConstructor {
            name: Some(ctor.name.clone()),
            overload: destination.overload_of(index),
            ..ResolvedConstructor::default()
        };
        for param in &ctor.params {
            let source_member = self
                .reflector
                .find_readable(&source_ty, &param.name)
                .ok_or_else(|| unmatched(param, PairSide::Source, pair))?;
            let destination_member = self
                .reflector
                .find_readable(&destination_ty, &param.name)
                .ok_or_else(|| unmatched(param, PairSide::Destination, pair))?;

            let read = Expr::source().member(source_member.name.clone());
            let arg = self
                .convert(read, &source_member.ty, &param.ty)?
                .unwrap_or_else(|| {
                    debug!(
                        pair = %pair,
                        parameter = %param.name,
                        from = %source_member.ty,
                        to = %param.ty,
                        "no conversion for constructor argument, passing default"
                    );
                    Expr::Default(param.ty.clone())
                });
            trace!(pair = %pair, parameter = %param.name, "bound constructor argument");
            resolved.args.push(arg);
            resolved.covered.push(destination_member.name.clone());
        }
        Ok(resolved)
    }

    fn configured_constructor(
        &mut self,
        pair: &TypePair,
        destination: &ObjectDesc,
        choice: &ConstructorChoice,
    ) -> Result<ResolvedConstructor, ConfigError> {
        let ctor = destination
            .find_overload(&choice.constructor, choice.overload)
            .filter(|ctor| ctor.params.len() == choice.args.len())
            .ok_or_else(|| ConfigError::NoMatchingConstructor {
                destination_type: pair.destination.to_string(),
                signature: format!(
                    "{} with {} argument(s)",
                    choice.constructor,
                    choice.args.len()
                ),
            })?;
        let env = self.source_env(pair);
        let mut resolved = ResolvedConstructor {
            name: Some(ctor.name.clone()),
            overload: choice.overload,
            ..ResolvedConstructor::default()
        };
        for (arg, param) in choice.args.iter().zip(&ctor.params) {
            let arg_ty = typing::infer(arg, &env)?;
            let converted = self
                .convert(arg.clone(), &arg_ty, &param.ty)?
                .unwrap_or_else(|| Expr::Default(param.ty.clone()));
            resolved.args.push(converted);
            if let Some(member) = destination.find_member(&param.name) {
                resolved.covered.push(member.name.clone());
            }
        }
        Ok(resolved)
    }
}

fn unmatched(param: &ParamDesc, side: PairSide, pair: &TypePair) -> ConfigError {
    let searched = match side {
        PairSide::Source => &pair.source,
        PairSide::Destination => &pair.destination,
    };
    ConfigError::UnmatchedConstructorParameter {
        parameter: param.name.clone(),
        side,
        searched_type: searched.to_string(),
        source_type: pair.source.to_string(),
        destination_type: pair.destination.to_string(),
    }
}
