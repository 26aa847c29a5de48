//! Builder injection

use super::call_operation;
use crate::context::Carrier;
use crate::engine::Session;
use crate::error::PopulateError;
use effigy_trace::NodeKind;
use effigy_types::{TypeDef, TypeDescriptor, Value};

pub(super) fn applicable(def: &TypeDef, session: &Session<'_>) -> bool {
    session.adapter().locate(session.registry(), def).is_some()
}

pub(super) fn apply(def: &TypeDef, carrier: &Carrier, session: &mut Session<'_>) -> Result<Value, PopulateError> {
    let adapter = session.adapter();
    let registry = session.registry();
    let Some(plan) = adapter.locate(registry, def) else {
        return Err(PopulateError::NoMatchingStrategy {
            ty: def.name.clone(),
            attempted: vec!["builder".into()],
        });
    };
    let operations = adapter.discover_operations(registry, &plan, session.config());
    let builder_ty = TypeDescriptor::Named(plan.builder.name.clone());
    tracing::trace!(ty = %def.name, builder = %plan.builder.name, operations = operations.len(), "located builder");

    let node = session.open(
        NodeKind::BuilderBlock {
            entry: plan.entry.name.clone(),
            terminal: plan.terminal.name.clone(),
        },
        carrier.descriptor().clone(),
        operations.len(),
    )?;
    let mut builder = plan.entry.invoke_static(Vec::new())?;
    for operation in operations {
        call_operation(session, carrier, &builder_ty, &mut builder, operation)?;
    }
    let value = plan.terminal.invoke(&mut builder, Vec::new())?;
    session.close(node)?;
    Ok(value)
}
