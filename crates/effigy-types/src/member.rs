//! Member descriptors
//!
//! Constructors, fields and operations of registered types. Callable members
//! carry their behaviour as shared closures so the engine can invoke them
//! without knowing how the type was described.

use crate::descriptor::TypeDescriptor;
use crate::name::TypeName;
use crate::value::{Object, Value};
use std::fmt;
use std::sync::Arc;

/// Closure invoked to create an instance
pub type ConstructorFn = Arc<dyn Fn(Vec<Value>) -> Result<Value, InvokeError> + Send + Sync>;

/// Closure invoked on a receiver
pub type InstanceFn =
    Arc<dyn Fn(&mut Value, Vec<Value>) -> Result<Value, InvokeError> + Send + Sync>;

/// Closure invoked without a receiver
pub type StaticFn = Arc<dyn Fn(Vec<Value>) -> Result<Value, InvokeError> + Send + Sync>;

/// Failure raised by a member invocation
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum InvokeError {
    /// Wrong number of arguments
    #[error("{member} expects {expected} arguments, got {actual}")]
    Arity {
        /// Member name
        member: String,
        /// Declared parameter count
        expected: usize,
        /// Supplied argument count
        actual: usize,
    },

    /// Receiver is not an object
    #[error("cannot access member `{member}` on a non-object value")]
    NotAnObject {
        /// Member name
        member: String,
    },

    /// Receiver is not a collection
    #[error("value is not an insertable collection")]
    NotACollection,

    /// Argument rejected by the member
    #[error("invalid argument for {member}: {reason}")]
    InvalidArgument {
        /// Member name
        member: String,
        /// Why it was rejected
        reason: String,
    },

    /// Member-specific failure
    #[error("{0}")]
    Failed(String),
}

fn check_arity(member: &str, expected: usize, args: &[Value]) -> Result<(), InvokeError> {
    if args.len() == expected {
        Ok(())
    } else {
        Err(InvokeError::Arity {
            member: member.to_string(),
            expected,
            actual: args.len(),
        })
    }
}

/// Named, typed parameter
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Param {
    /// Parameter name
    pub name: String,

    /// Parameter type
    pub ty: TypeDescriptor,
}

impl Param {
    /// Create a parameter
    #[inline]
    #[must_use]
    pub fn new(name: impl Into<String>, ty: impl Into<TypeDescriptor>) -> Self {
        Self {
            name: name.into(),
            ty: ty.into(),
        }
    }
}

/// Initializer of a composite type
#[derive(Clone)]
pub struct Constructor {
    /// Name used when rendering (`new`, `with_name`, ...)
    pub name: String,

    /// Declared parameters in order
    pub params: Vec<Param>,

    /// Whether callers may use it
    pub accessible: bool,

    invoke: ConstructorFn,
}

impl Constructor {
    /// Create from a closure
    #[must_use]
    pub fn new<F>(name: impl Into<String>, params: Vec<Param>, invoke: F) -> Self
    where
        F: Fn(Vec<Value>) -> Result<Value, InvokeError> + Send + Sync + 'static,
    {
        Self {
            name: name.into(),
            params,
            accessible: true,
            invoke: Arc::new(invoke),
        }
    }

    /// Constructor assigning each parameter to the field of the same name
    #[must_use]
    pub fn assigning(ty: &TypeName, name: impl Into<String>, params: Vec<Param>) -> Self {
        let name = name.into();
        let ty = ty.clone();
        let field_names: Vec<String> = params.iter().map(|p| p.name.clone()).collect();
        let member = name.clone();
        Self::new(name, params, move |args| {
            check_arity(&member, field_names.len(), &args)?;
            let mut object = Object::new(ty.clone());
            for (field, value) in field_names.iter().zip(args) {
                object.set(field, value);
            }
            Ok(Value::Object(object))
        })
    }

    /// No-argument constructor producing an empty instance
    #[must_use]
    pub fn empty(ty: &TypeName, name: impl Into<String>) -> Self {
        Self::assigning(ty, name, Vec::new())
    }

    /// Mark as inaccessible
    #[inline]
    #[must_use]
    pub fn private(mut self) -> Self {
        self.accessible = false;
        self
    }

    /// Number of parameters
    #[inline]
    #[must_use]
    pub fn arity(&self) -> usize {
        self.params.len()
    }

    /// Invoke with populated arguments
    ///
    /// # Errors
    /// Propagates the closure's [`InvokeError`].
    pub fn invoke(&self, args: Vec<Value>) -> Result<Value, InvokeError> {
        (self.invoke)(args)
    }
}

impl fmt::Debug for Constructor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Constructor")
            .field("name", &self.name)
            .field("params", &self.params)
            .field("accessible", &self.accessible)
            .finish_non_exhaustive()
    }
}

/// Declared field
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Field {
    /// Field name
    pub name: String,

    /// Field type
    pub ty: TypeDescriptor,

    /// Cannot be reassigned after construction
    pub is_final: bool,

    /// Belongs to the type, not the instance
    pub is_static: bool,
}

impl Field {
    /// Mutable instance field
    #[inline]
    #[must_use]
    pub fn new(name: impl Into<String>, ty: impl Into<TypeDescriptor>) -> Self {
        Self {
            name: name.into(),
            ty: ty.into(),
            is_final: false,
            is_static: false,
        }
    }

    /// Mark final
    #[inline]
    #[must_use]
    pub fn final_(mut self) -> Self {
        self.is_final = true;
        self
    }

    /// Mark static
    #[inline]
    #[must_use]
    pub fn static_(mut self) -> Self {
        self.is_static = true;
        self
    }

    /// Whether field injection may assign it
    #[inline]
    #[must_use]
    pub fn is_assignable(&self) -> bool {
        !self.is_final && !self.is_static
    }
}

/// Return shape of an operation
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Returns {
    /// Nothing
    Void,

    /// The declaring type (fluent or factory)
    SelfType,

    /// Some other type
    Type(TypeDescriptor),
}

/// Callable body of an operation
#[derive(Clone)]
pub enum MethodBody {
    /// Needs a receiver
    Instance(InstanceFn),

    /// No receiver
    Static(StaticFn),
}

/// Operation declared on a type
#[derive(Clone)]
pub struct Method {
    /// Operation name
    pub name: String,

    /// Declared parameters in order
    pub params: Vec<Param>,

    /// Return shape
    pub returns: Returns,

    /// Whether callers may use it
    pub accessible: bool,

    body: MethodBody,
}

impl Method {
    /// Instance operation from a closure
    #[must_use]
    pub fn instance<F>(name: impl Into<String>, params: Vec<Param>, returns: Returns, f: F) -> Self
    where
        F: Fn(&mut Value, Vec<Value>) -> Result<Value, InvokeError> + Send + Sync + 'static,
    {
        Self {
            name: name.into(),
            params,
            returns,
            accessible: true,
            body: MethodBody::Instance(Arc::new(f)),
        }
    }

    /// Static operation from a closure
    #[must_use]
    pub fn static_fn<F>(name: impl Into<String>, params: Vec<Param>, returns: Returns, f: F) -> Self
    where
        F: Fn(Vec<Value>) -> Result<Value, InvokeError> + Send + Sync + 'static,
    {
        Self {
            name: name.into(),
            params,
            returns,
            accessible: true,
            body: MethodBody::Static(Arc::new(f)),
        }
    }

    /// Void setter assigning its single argument to `field`
    #[must_use]
    pub fn setter(name: impl Into<String>, field: impl Into<String>, ty: impl Into<TypeDescriptor>) -> Self {
        let field = field.into();
        let param = Param::new(field.clone(), ty);
        Self::assign_field(name.into(), field, param, Returns::Void)
    }

    /// Fluent setter assigning `field` and returning the receiver
    #[must_use]
    pub fn fluent(name: impl Into<String>, field: impl Into<String>, ty: impl Into<TypeDescriptor>) -> Self {
        let field = field.into();
        let param = Param::new(field.clone(), ty);
        Self::assign_field(name.into(), field, param, Returns::SelfType)
    }

    fn assign_field(name: String, field: String, param: Param, returns: Returns) -> Self {
        let fluent = returns == Returns::SelfType;
        let member = name.clone();
        Self::instance(name, vec![param], returns, move |receiver, args| {
            check_arity(&member, 1, &args)?;
            let value = args.into_iter().next().unwrap_or(Value::Null);
            receiver.set_field(&field, value)?;
            Ok(if fluent { receiver.clone() } else { Value::Null })
        })
    }

    /// Void operation appending its argument to the sequence held in `field`
    ///
    /// The field is created as an empty sequence on first use.
    #[must_use]
    pub fn adder(name: impl Into<String>, field: impl Into<String>, element: impl Into<TypeDescriptor>) -> Self {
        let name = name.into();
        let field = field.into();
        let member = name.clone();
        Self::instance(
            name,
            vec![Param::new("element", element)],
            Returns::Void,
            move |receiver, args| {
                check_arity(&member, 1, &args)?;
                let element = args.into_iter().next().unwrap_or(Value::Null);
                let object = receiver.as_object_mut().ok_or_else(|| InvokeError::NotAnObject {
                    member: member.clone(),
                })?;
                let slot = object.fields.entry(field.clone()).or_insert(Value::Seq(Vec::new()));
                if slot.is_null() {
                    *slot = Value::Seq(Vec::new());
                }
                slot.insert(element)?;
                Ok(Value::Null)
            },
        )
    }

    /// Mark as inaccessible
    #[inline]
    #[must_use]
    pub fn private(mut self) -> Self {
        self.accessible = false;
        self
    }

    /// Whether this operation needs no receiver
    #[inline]
    #[must_use]
    pub fn is_static(&self) -> bool {
        matches!(self.body, MethodBody::Static(_))
    }

    /// Number of parameters
    #[inline]
    #[must_use]
    pub fn arity(&self) -> usize {
        self.params.len()
    }

    /// Whether it returns nothing or the declaring type
    #[inline]
    #[must_use]
    pub fn is_mutator_shaped(&self) -> bool {
        matches!(self.returns, Returns::Void | Returns::SelfType)
    }

    /// Whether it returns an instance of `owner`
    #[must_use]
    pub fn returns_owner(&self, owner: &TypeName) -> bool {
        match &self.returns {
            Returns::SelfType => true,
            Returns::Type(ty) => ty.as_named() == Some(owner),
            Returns::Void => false,
        }
    }

    /// Invoke on a receiver
    ///
    /// # Errors
    /// Static operations fail with [`InvokeError::Failed`]; otherwise the
    /// closure's error is propagated.
    pub fn invoke(&self, receiver: &mut Value, args: Vec<Value>) -> Result<Value, InvokeError> {
        match &self.body {
            MethodBody::Instance(f) => f(receiver, args),
            MethodBody::Static(_) => Err(InvokeError::Failed(format!(
                "{} is static and takes no receiver",
                self.name
            ))),
        }
    }

    /// Invoke without a receiver
    ///
    /// # Errors
    /// Instance operations fail with [`InvokeError::Failed`]; otherwise the
    /// closure's error is propagated.
    pub fn invoke_static(&self, args: Vec<Value>) -> Result<Value, InvokeError> {
        match &self.body {
            MethodBody::Static(f) => f(args),
            MethodBody::Instance(_) => Err(InvokeError::Failed(format!(
                "{} requires a receiver",
                self.name
            ))),
        }
    }
}

impl fmt::Debug for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Method")
            .field("name", &self.name)
            .field("params", &self.params)
            .field("returns", &self.returns)
            .field("static", &self.is_static())
            .field("accessible", &self.accessible)
            .finish_non_exhaustive()
    }
}
