//! Constructor injection

use super::{populate_args, select};
use crate::context::Carrier;
use crate::engine::Session;
use crate::error::PopulateError;
use effigy_trace::NodeKind;
use effigy_types::{TypeDef, Value};

pub(super) fn applicable(def: &TypeDef, session: &Session<'_>) -> bool {
    select::constructor(def, session.config().constructor_selection).is_some()
}

pub(super) fn apply(def: &TypeDef, carrier: &Carrier, session: &mut Session<'_>) -> Result<Value, PopulateError> {
    let Some(ctor) = select::constructor(def, session.config().constructor_selection) else {
        return Err(PopulateError::NoMatchingStrategy {
            ty: def.name.clone(),
            attempted: vec!["constructor".into()],
        });
    };
    let node = session.open(
        NodeKind::Constructor {
            ctor: ctor.name.clone(),
        },
        carrier.descriptor().clone(),
        ctor.arity(),
    )?;
    let args = populate_args(session, carrier, &ctor.params)?;
    let value = ctor.invoke(args)?;
    session.close(node)?;
    Ok(value)
}
