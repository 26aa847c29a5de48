//! Mutator injection
//!
//! Construct with the constructor picked by the mutator selection rule, then
//! call every mutator-shaped operation once.

use super::{call_operation, populate_args, select};
use crate::context::Carrier;
use crate::engine::Session;
use crate::error::PopulateError;
use effigy_trace::NodeKind;
use effigy_types::{TypeDef, Value};

pub(super) fn applicable(def: &TypeDef, session: &Session<'_>) -> bool {
    let config = session.config();
    select::constructor(def, config.mutator_constructor_selection).is_some()
        && !select::mutators(session.registry(), def, config).is_empty()
}

pub(super) fn apply(def: &TypeDef, carrier: &Carrier, session: &mut Session<'_>) -> Result<Value, PopulateError> {
    let config = session.config();
    let Some(ctor) = select::constructor(def, config.mutator_constructor_selection) else {
        return Err(PopulateError::NoMatchingStrategy {
            ty: def.name.clone(),
            attempted: vec!["mutator".into()],
        });
    };
    let mutators = select::mutators(session.registry(), def, config);
    let owner = carrier.descriptor().clone();

    let node = session.open(
        NodeKind::MutatorBlock {
            ctor: ctor.name.clone(),
            init_args: ctor.arity(),
        },
        owner.clone(),
        ctor.arity() + mutators.len(),
    )?;
    let args = populate_args(session, carrier, &ctor.params)?;
    let mut instance = ctor.invoke(args)?;
    for mutator in mutators {
        call_operation(session, carrier, &owner, &mut instance, mutator)?;
    }
    session.close(node)?;
    Ok(instance)
}
