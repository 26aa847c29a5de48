//! Field injection

use super::select;
use crate::context::Carrier;
use crate::engine::Session;
use crate::error::PopulateError;
use effigy_trace::{NodeKind, OperationStyle};
use effigy_types::{TypeDef, Value};

pub(super) fn applicable(def: &TypeDef, session: &Session<'_>) -> bool {
    def.no_arg_constructor().is_some()
        && !select::assignable_fields(session.registry(), def, session.config()).is_empty()
}

pub(super) fn apply(def: &TypeDef, carrier: &Carrier, session: &mut Session<'_>) -> Result<Value, PopulateError> {
    let Some(ctor) = def.no_arg_constructor() else {
        return Err(PopulateError::NoMatchingStrategy {
            ty: def.name.clone(),
            attempted: vec!["field".into()],
        });
    };
    let fields = select::assignable_fields(session.registry(), def, session.config());
    let owner = carrier.descriptor().clone();

    let node = session.open(
        NodeKind::FieldBlock {
            ctor: ctor.name.clone(),
        },
        owner.clone(),
        fields.len(),
    )?;
    let mut instance = ctor.invoke(Vec::new())?;
    for field in fields {
        let op = session.open(
            NodeKind::Operation {
                name: field.name.clone(),
                style: OperationStyle::FieldAssign,
            },
            owner.clone(),
            1,
        )?;
        let value = session.populate_child(carrier, &field.ty)?;
        session.close(op)?;
        instance.set_field(&field.name, value)?;
    }
    session.close(node)?;
    Ok(instance)
}
