//! Static factory injection

use super::{populate_args, select};
use crate::context::Carrier;
use crate::engine::Session;
use crate::error::PopulateError;
use effigy_trace::NodeKind;
use effigy_types::{TypeDef, Value};

pub(super) fn applicable(def: &TypeDef, session: &Session<'_>) -> bool {
    !select::factories(session.registry(), def).is_empty()
}

pub(super) fn apply(def: &TypeDef, carrier: &Carrier, session: &mut Session<'_>) -> Result<Value, PopulateError> {
    let selection = session.config().factory_selection;
    let Some(factory) = select::factory(session.registry(), def, selection) else {
        return Err(PopulateError::NoMatchingStrategy {
            ty: def.name.clone(),
            attempted: vec!["factory".into()],
        });
    };
    tracing::trace!(ty = %def.name, factory = %factory.name, ?selection, "selected factory");
    let node = session.open(
        NodeKind::Factory {
            method: factory.name.clone(),
        },
        carrier.descriptor().clone(),
        factory.arity(),
    )?;
    let args = populate_args(session, carrier, &factory.params)?;
    let value = factory.invoke_static(args)?;
    session.close(node)?;
    Ok(value)
}
