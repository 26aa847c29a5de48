//! Testing utilities for Effigy workspace
//!
//! Shared test helpers, a sample `shop` type registry, and populator setup.

#![allow(missing_docs)]

use effigy_core::{PopulateConfig, Populator};
use effigy_types::{
    ConcreteCollection, Constructor, EnumDef, Field, InvokeError, LeafKind, Method, Object, Param,
    Returns, TypeDef, TypeDescriptor, TypeEntry, TypeName, TypeRegistry, Value,
};

pub const PERSON: &str = "shop::Person";
pub const ADDRESS: &str = "shop::Address";
pub const ACCOUNT: &str = "shop::Account";
pub const PROFILE: &str = "shop::Profile";
pub const ORDER: &str = "shop::Order";
pub const ORDER_BUILDER: &str = "shop::OrderBuilder";
pub const STATUS: &str = "shop::Status";
pub const MONEY: &str = "shop::Money";
pub const INVENTORY: &str = "shop::Inventory";
pub const TREE_NODE: &str = "shop::TreeNode";
pub const ALPHA: &str = "shop::Alpha";
pub const BETA: &str = "shop::Beta";
pub const LEDGER: &str = "shop::Ledger";
pub const FLAKY: &str = "shop::Flaky";
pub const CATALOG: &str = "shop::Catalog";

pub fn named(name: &str) -> TypeDescriptor {
    TypeDescriptor::named(name)
}

/// Person built through its widest constructor
pub fn person() -> TypeDef {
    let name = TypeName::new(PERSON);
    TypeDef::new(name.clone())
        .constructor(Constructor::assigning(&name, "named", vec![Param::new("name", LeafKind::String)]))
        .constructor(Constructor::assigning(
            &name,
            "new",
            vec![Param::new("name", LeafKind::String), Param::new("age", LeafKind::I32)],
        ))
}

pub fn address() -> TypeDef {
    let name = TypeName::new(ADDRESS);
    TypeDef::new(name.clone()).constructor(Constructor::assigning(
        &name,
        "new",
        vec![Param::new("street", LeafKind::String), Param::new("city", LeafKind::String)],
    ))
}

/// Account populated field by field; `created` is final and left alone
pub fn account() -> TypeDef {
    let name = TypeName::new(ACCOUNT);
    TypeDef::new(name.clone())
        .constructor(Constructor::empty(&name, "default"))
        .field(Field::new("id", LeafKind::Uuid))
        .field(Field::new("owner", LeafKind::String))
        .field(Field::new("tags", TypeDescriptor::seq(TypeDescriptor::string())))
        .field(Field::new("created", LeafKind::DateTime).final_())
}

/// Profile populated through `set_` operations
pub fn profile() -> TypeDef {
    let name = TypeName::new(PROFILE);
    TypeDef::new(name.clone())
        .constructor(Constructor::empty(&name, "new"))
        .method(Method::setter("set_nickname", "nickname", LeafKind::String))
        .method(Method::setter("set_birthday", "birthday", LeafKind::Date))
        .method(Method::setter("set_address", "address", named(ADDRESS)))
}

/// Order only reachable through `Order::builder()`
pub fn order() -> TypeDef {
    let name = TypeName::new(ORDER);
    let builder = TypeName::new(ORDER_BUILDER);
    TypeDef::new(name.clone())
        .field(Field::new("id", LeafKind::U64))
        .field(Field::new("status", named(STATUS)))
        .field(Field::new("note", LeafKind::String))
        .constructor(Constructor::empty(&name, "new").private())
        .method(Method::static_fn(
            "builder",
            vec![],
            Returns::Type(TypeDescriptor::Named(builder.clone())),
            move |_| Ok(Value::Object(Object::new(builder.clone()))),
        ))
}

pub fn order_builder() -> TypeDef {
    let order = TypeName::new(ORDER);
    let done = order.clone();
    TypeDef::new(ORDER_BUILDER)
        .method(Method::fluent("id", "id", LeafKind::U64))
        .method(Method::fluent("status", "status", named(STATUS)))
        .method(Method::fluent("note", "note", LeafKind::String))
        .method(Method::instance(
            "build",
            vec![],
            Returns::Type(TypeDescriptor::Named(order)),
            move |receiver, _| {
                let fields = receiver
                    .as_object()
                    .map(|o| o.fields.clone())
                    .ok_or_else(|| InvokeError::NotAnObject { member: "build".into() })?;
                let mut built = Object::new(done.clone());
                built.fields = fields;
                Ok(Value::Object(built))
            },
        ))
}

/// Money with a private constructor and static factories
pub fn money() -> TypeDef {
    let name = TypeName::new(MONEY);
    let of = name.clone();
    let zero = name.clone();
    TypeDef::new(name.clone())
        .constructor(Constructor::assigning(&name, "raw", vec![Param::new("cents", LeafKind::I64)]).private())
        .method(Method::static_fn(
            "of",
            vec![Param::new("amount", LeafKind::I64), Param::new("currency", LeafKind::String)],
            Returns::SelfType,
            move |args| {
                let mut args = args.into_iter();
                Ok(Value::Object(
                    Object::new(of.clone())
                        .with("amount", args.next().unwrap_or(Value::Null))
                        .with("currency", args.next().unwrap_or(Value::Null)),
                ))
            },
        ))
        .method(Method::static_fn("zero", vec![], Returns::SelfType, move |_| {
            Ok(Value::Object(
                Object::new(zero.clone())
                    .with("amount", Value::Int(0))
                    .with("currency", Value::Str("EUR".into())),
            ))
        }))
}

/// Inventory populated through mutators; `restock` takes a map
pub fn inventory() -> TypeDef {
    let name = TypeName::new(INVENTORY);
    TypeDef::new(name.clone())
        .constructor(Constructor::empty(&name, "new"))
        .method(Method::setter(
            "restock",
            "counts",
            TypeDescriptor::map(TypeDescriptor::string(), LeafKind::I32.into()),
        ))
        .method(Method::adder("add_item", "items", TypeDescriptor::string()))
}

pub fn tree_node() -> TypeDef {
    let name = TypeName::new(TREE_NODE);
    TypeDef::new(name.clone()).constructor(Constructor::assigning(
        &name,
        "new",
        vec![
            Param::new("label", LeafKind::String),
            Param::new("children", TypeDescriptor::seq(named(TREE_NODE))),
        ],
    ))
}

pub fn alpha() -> TypeDef {
    let name = TypeName::new(ALPHA);
    TypeDef::new(name.clone()).constructor(Constructor::assigning(&name, "new", vec![Param::new("beta", named(BETA))]))
}

pub fn beta() -> TypeDef {
    let name = TypeName::new(BETA);
    TypeDef::new(name.clone()).constructor(Constructor::assigning(
        &name,
        "new",
        vec![Param::new("alpha", named(ALPHA)), Param::new("label", LeafKind::String)],
    ))
}

/// Ledger holding an opaque decimal no provider knows
pub fn ledger() -> TypeDef {
    let name = TypeName::new(LEDGER);
    TypeDef::new(name.clone()).constructor(Constructor::assigning(
        &name,
        "new",
        vec![Param::new("total", named("bigdecimal::BigDecimal"))],
    ))
}

/// Flaky whose only constructor always fails
pub fn flaky() -> TypeDef {
    TypeDef::new(FLAKY).constructor(Constructor::new("new", vec![Param::new("seed", LeafKind::I32)], |_| {
        Err(InvokeError::Failed("flaky constructor".into()))
    }))
}

/// Catalog exercising every collection-like shape
pub fn catalog() -> TypeDef {
    let name = TypeName::new(CATALOG);
    TypeDef::new(name.clone()).constructor(Constructor::assigning(
        &name,
        "new",
        vec![
            Param::new(
                "owners",
                TypeDescriptor::map(TypeDescriptor::string(), TypeDescriptor::seq(named(PERSON))),
            ),
            Param::new(
                "labels",
                TypeDescriptor::set(TypeDescriptor::string()).constructed(ConcreteCollection::btree_set()),
            ),
            Param::new("price", TypeDescriptor::pair(TypeDescriptor::string(), named(MONEY))),
            Param::new("shipping", TypeDescriptor::optional(named(ADDRESS))),
            Param::new("checksum", TypeDescriptor::array(LeafKind::U8.into())),
        ],
    ))
}

pub fn status() -> EnumDef {
    EnumDef::new(STATUS, ["Pending", "Shipped", "Cancelled"])
}

/// Registry holding every sample type
pub fn shop_registry() -> TypeRegistry {
    TypeRegistry::new()
        .with(person())
        .with(address())
        .with(account())
        .with(profile())
        .with(order())
        .with(order_builder())
        .with(status())
        .with(money())
        .with(inventory())
        .with(tree_node())
        .with(alpha())
        .with(beta())
        .with(ledger())
        .with(flaky())
        .with(catalog())
        .with(TypeEntry::Opaque(TypeName::new("bigdecimal::BigDecimal")))
}

pub fn setup_populator() -> Populator {
    Populator::new(shop_registry())
}

pub fn setup_populator_with(config: PopulateConfig) -> Populator {
    Populator::builder(shop_registry()).with_config(config).build().unwrap()
}
