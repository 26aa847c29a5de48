//! Construction strategies
//!
//! Provides the closed [`Strategy`] set. Every variant pairs a pure
//! applicability check with an executor; user strategies plug in through
//! [`CustomStrategy`].
//!
//! # Strategy Types
//!
//! - **Constructor**: Invoke a selected constructor with populated arguments
//! - **Field**: No-arg construction, then assign every assignable field
//! - **Setter**: No-arg construction, then call every prefixed setter
//! - **Mutator**: Selected constructor, then every mutator-shaped operation
//! - **Builder**: Builder entry, intermediate operations, terminal
//! - **Factory**: Selected static factory with populated arguments

mod builder;
mod constructor;
mod factory;
mod field;
mod mutator;
pub(crate) mod select;
mod setter;

use crate::config::StrategyName;
use crate::context::Carrier;
use crate::engine::Session;
use crate::error::PopulateError;
use effigy_trace::{NodeKind, OperationStyle};
use effigy_types::{Method, Param, Returns, TypeDef, TypeDescriptor, Value};
use std::fmt;
use std::sync::Arc;

/// User-supplied construction strategy
///
/// Implementations must open exactly one trace node around their work (see
/// [`Session::open`]) and populate constituents through
/// [`Session::populate_child`].
pub trait CustomStrategy: Send + Sync + fmt::Debug {
    /// Name referenced from the strategy order
    fn name(&self) -> &str;

    /// Whether this strategy can construct `def`
    fn applicable(&self, def: &TypeDef, session: &Session<'_>) -> bool;

    /// Construct an instance of `def`
    ///
    /// # Errors
    /// Any [`PopulateError`]; the resolver wraps it with the strategy name.
    fn apply(&self, def: &TypeDef, carrier: &Carrier, session: &mut Session<'_>) -> Result<Value, PopulateError>;
}

/// One way of constructing a composite
#[derive(Debug, Clone)]
pub enum Strategy {
    /// Constructor injection
    Constructor,
    /// Field injection
    Field,
    /// Setter injection
    Setter,
    /// Mutator injection
    Mutator,
    /// Builder injection
    Builder,
    /// Static factory injection
    Factory,
    /// User strategy
    Custom(Arc<dyn CustomStrategy>),
}

impl Strategy {
    /// Resolve a configured name against the built-ins and `customs`
    ///
    /// # Errors
    /// [`PopulateError::UnknownStrategy`] for an unregistered custom name.
    pub fn from_name(name: &StrategyName, customs: &[Arc<dyn CustomStrategy>]) -> Result<Self, PopulateError> {
        Ok(match name {
            StrategyName::Constructor => Self::Constructor,
            StrategyName::Field => Self::Field,
            StrategyName::Setter => Self::Setter,
            StrategyName::Mutator => Self::Mutator,
            StrategyName::Builder => Self::Builder,
            StrategyName::Factory => Self::Factory,
            StrategyName::Custom(custom) => customs
                .iter()
                .find(|s| s.name() == custom)
                .cloned()
                .map(Self::Custom)
                .ok_or_else(|| PopulateError::UnknownStrategy(custom.clone()))?,
        })
    }

    /// Name for logs and errors
    #[must_use]
    pub fn name(&self) -> &str {
        match self {
            Self::Constructor => "constructor",
            Self::Field => "field",
            Self::Setter => "setter",
            Self::Mutator => "mutator",
            Self::Builder => "builder",
            Self::Factory => "factory",
            Self::Custom(custom) => custom.name(),
        }
    }

    /// Whether this strategy can construct `def` under the session's config
    #[must_use]
    pub fn applicable(&self, def: &TypeDef, session: &Session<'_>) -> bool {
        match self {
            Self::Constructor => constructor::applicable(def, session),
            Self::Field => field::applicable(def, session),
            Self::Setter => setter::applicable(def, session),
            Self::Mutator => mutator::applicable(def, session),
            Self::Builder => builder::applicable(def, session),
            Self::Factory => factory::applicable(def, session),
            Self::Custom(custom) => custom.applicable(def, session),
        }
    }

    /// Construct an instance of `def`
    ///
    /// # Errors
    /// The executor's failure, unwrapped; the resolver adds the strategy context.
    pub fn apply(&self, def: &TypeDef, carrier: &Carrier, session: &mut Session<'_>) -> Result<Value, PopulateError> {
        match self {
            Self::Constructor => constructor::apply(def, carrier, session),
            Self::Field => field::apply(def, carrier, session),
            Self::Setter => setter::apply(def, carrier, session),
            Self::Mutator => mutator::apply(def, carrier, session),
            Self::Builder => builder::apply(def, carrier, session),
            Self::Factory => factory::apply(def, carrier, session),
            Self::Custom(custom) => custom.apply(def, carrier, session),
        }
    }
}

/// Populate each parameter in declaration order
pub(crate) fn populate_args(
    session: &mut Session<'_>,
    carrier: &Carrier,
    params: &[Param],
) -> Result<Vec<Value>, PopulateError> {
    params
        .iter()
        .map(|param| session.populate_child(carrier, &param.ty))
        .collect()
}

/// Record and invoke one operation on `receiver`
///
/// The operation node is owned by `owner`, the type declaring `method`.
pub(crate) fn call_operation(
    session: &mut Session<'_>,
    carrier: &Carrier,
    owner: &TypeDescriptor,
    receiver: &mut Value,
    method: &Method,
) -> Result<(), PopulateError> {
    let node = session.open(
        NodeKind::Operation {
            name: method.name.clone(),
            style: OperationStyle::Call,
        },
        owner.clone(),
        method.arity(),
    )?;
    let args = populate_args(session, carrier, &method.params)?;
    session.close(node)?;
    invoke_on(method, receiver, args)?;
    Ok(())
}

/// Invoke `method` on `receiver`, adopting a returned replacement instance
///
/// Operations returning the receiver's own type may hand back a new
/// instance instead of mutating in place; the returned object wins.
pub(crate) fn invoke_on(method: &Method, receiver: &mut Value, args: Vec<Value>) -> Result<(), PopulateError> {
    let owner = receiver.as_object().map(|o| o.ty.clone());
    let out = method.invoke(receiver, args)?;
    let adopts = match &owner {
        Some(owner) => method.returns_owner(owner),
        None => method.returns == Returns::SelfType,
    };
    if adopts && matches!(out, Value::Object(_)) {
        *receiver = out;
    }
    Ok(())
}
