//! Collection-like population
//!
//! Sequences, sets, maps, pairs and arrays receive exactly one synthesized
//! element (or key/value pair). An absent element leaves the collection
//! empty; pairs always hold both halves.

use crate::context::Carrier;
use crate::engine::Session;
use crate::error::PopulateError;
use effigy_trace::NodeKind;
use effigy_types::{CollectionDescriptor, CollectionShape, TypeDescriptor, Value};

/// Populate a sequence, set, map or pair
///
/// # Errors
/// [`PopulateError::FailedToCreateCollection`] wrapping the element failure,
/// or a trace error.
pub(crate) fn populate_collection(
    session: &mut Session<'_>,
    carrier: &Carrier,
    collection: &CollectionDescriptor,
) -> Result<Value, PopulateError> {
    let ty = carrier.descriptor();
    let (kind, expected) = match collection.shape {
        CollectionShape::Sequence(_) => (NodeKind::Sequence, 1),
        CollectionShape::Set(_) => (NodeKind::Set, 1),
        CollectionShape::Map(..) => (NodeKind::Map, 2),
        CollectionShape::Pair(..) => (NodeKind::Pair, 2),
    };
    let node = session.open(kind, ty.clone(), expected)?;

    let value = match &collection.shape {
        CollectionShape::Sequence(element) => {
            let element = element_of(session, carrier, element)?;
            Value::Seq(element.into_iter().collect())
        }
        CollectionShape::Set(element) => {
            let element = element_of(session, carrier, element)?;
            Value::Set(element.into_iter().collect())
        }
        CollectionShape::Map(key, value) => {
            let key = element_of(session, carrier, key)?;
            let value = element_of(session, carrier, value)?;
            let mut map = Value::Map(Vec::new());
            if let (Some(key), Some(value)) = (key, value) {
                map.insert_entry(key, value)?;
            }
            map
        }
        CollectionShape::Pair(key, value) => {
            let key = populate_element(session, carrier, key)?;
            let value = populate_element(session, carrier, value)?;
            Value::Pair(Box::new(key), Box::new(value))
        }
    };

    session.close(node)?;
    tracing::debug!(ty = %ty, len = value.len().unwrap_or_default(), "populated collection");
    Ok(value)
}

/// Populate an array with exactly one element, kept even when absent
///
/// # Errors
/// As [`populate_collection`].
pub(crate) fn populate_array(
    session: &mut Session<'_>,
    carrier: &Carrier,
    element: &TypeDescriptor,
) -> Result<Value, PopulateError> {
    let node = session.open(NodeKind::Array, carrier.descriptor().clone(), 1)?;
    let element = populate_element(session, carrier, element)?;
    session.close(node)?;
    Ok(Value::Array(vec![element]))
}

fn populate_element(
    session: &mut Session<'_>,
    carrier: &Carrier,
    ty: &TypeDescriptor,
) -> Result<Value, PopulateError> {
    session
        .populate_child(carrier, ty)
        .map_err(|err| err.in_collection(carrier.descriptor()))
}

/// One element, `None` when it resolved to an absent value
fn element_of(
    session: &mut Session<'_>,
    carrier: &Carrier,
    ty: &TypeDescriptor,
) -> Result<Option<Value>, PopulateError> {
    let value = populate_element(session, carrier, ty)?;
    Ok((!value.is_null()).then_some(value))
}
