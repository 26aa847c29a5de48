//! Setter injection

use super::{call_operation, select};
use crate::context::Carrier;
use crate::engine::Session;
use crate::error::PopulateError;
use effigy_trace::NodeKind;
use effigy_types::{TypeDef, Value};

pub(super) fn applicable(def: &TypeDef, session: &Session<'_>) -> bool {
    def.no_arg_constructor().is_some() && !select::setters(session.registry(), def, session.config()).is_empty()
}

pub(super) fn apply(def: &TypeDef, carrier: &Carrier, session: &mut Session<'_>) -> Result<Value, PopulateError> {
    let Some(ctor) = def.no_arg_constructor() else {
        return Err(PopulateError::NoMatchingStrategy {
            ty: def.name.clone(),
            attempted: vec!["setter".into()],
        });
    };
    let setters = select::setters(session.registry(), def, session.config());
    let owner = carrier.descriptor().clone();

    let node = session.open(
        NodeKind::SetterBlock {
            ctor: ctor.name.clone(),
        },
        owner.clone(),
        setters.len(),
    )?;
    let mut instance = ctor.invoke(Vec::new())?;
    for setter in setters {
        call_operation(session, carrier, &owner, &mut instance, setter)?;
    }
    session.close(node)?;
    Ok(instance)
}
