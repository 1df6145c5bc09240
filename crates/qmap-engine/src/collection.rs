//! Element-wise sequence mapping.

use qmap_model::Ty;
use tracing::debug;

use crate::synth::Synthesizer;
use crate::{ConfigError, Expr, TypePair};

impl Synthesizer<'_> {
    /// Map a sequence element by element into the destination's shape,
    /// dropping null elements. A null source becomes an empty sequence.
    ///
    /// Returns `None` when either element type is unknown or the elements
    /// themselves have no conversion.
    pub(crate) fn collection(
        &mut self,
        value: Expr,
        from: &Ty,
        to: &Ty,
    ) -> Result<Option<Expr>, ConfigError> {
        let (Some(source_element), Some(element), Some(shape)) =
            (from.element(), to.element(), to.seq_shape())
        else {
            debug!(from = %from, to = %to, "sequence element type unknown, skipping");
            return Ok(None);
        };
        let source_element = source_element.unwrap_optional();
        let var = self.fresh_var();
        let item = Expr::Var(var);

        let body = match (source_element, element.unwrap_optional()) {
            (Ty::Object(source), Ty::Object(destination)) if source != destination => {
                let pair = TypePair::new(source.clone(), destination.clone());
                self.ensure(&pair)?;
                Expr::invoke(pair, item)
            }
            _ => match self.convert(item, source_element, element)? {
                Some(body) => body,
                None => {
                    debug!(from = %source_element, to = %element, "no element conversion");
                    return Ok(None);
                }
            },
        };

        Ok(Some(Expr::Collect {
            source: Box::new(value),
            var,
            body: Box::new(body),
            element: element.clone(),
            shape,
        }))
    }
}
