//! Functional tests for strategy selection over the sample `shop` registry.
//!
//! Core guarantees exercised here:
//! - Each composite is built by the first applicable strategy in the order.
//! - Every strategy renders the statement form matching how it built the value.
//! - Custom strategies slot into the order by name and win when listed first.

use effigy_core::{
    Carrier, ConstructorSelection, CustomStrategy, FactorySelection, PopulateConfig, PopulateError,
    Populator, Session, StrategyName,
};
use effigy_test_utils::{
    named, setup_populator, setup_populator_with, shop_registry, ACCOUNT, CATALOG, INVENTORY, MONEY,
    ORDER, PERSON, PROFILE,
};
use effigy_trace::NodeKind;
use effigy_types::{
    Constructor, Field, InvokeError, LeafKind, Method, Object, Param, Returns, TypeDef, TypeDescriptor,
    TypeName, TypeRegistry, Value,
};
use pretty_assertions::assert_eq;
use std::sync::{Arc, OnceLock, Weak};

fn statements(populator: &Populator, ty: &str) -> Vec<String> {
    populator.populate(&named(ty)).unwrap().serialize().unwrap().statements
}

#[test]
fn constructor_strategy_uses_the_widest_constructor() {
    let populator = setup_populator();
    let population = populator.populate(&named(PERSON)).unwrap();

    assert_eq!(population.value.field("name"), Some(&Value::Str("string".into())));
    assert_eq!(population.value.field("age"), Some(&Value::Int(1)));
    assert_eq!(
        population.serialize().unwrap().statements,
        vec![r#"let person_0 = Person::new("string".to_string(), 1);"#.to_string()]
    );
}

#[test]
fn smallest_selection_prefers_the_narrow_constructor() {
    let config = PopulateConfig::new().with_constructor_selection(ConstructorSelection::Smallest);
    let populator = setup_populator_with(config);
    assert_eq!(
        statements(&populator, PERSON),
        vec![r#"let person_0 = Person::named("string".to_string());"#.to_string()]
    );
}

#[test]
fn field_strategy_skips_final_fields() {
    let populator = setup_populator();
    let population = populator.populate(&named(ACCOUNT)).unwrap();

    assert_eq!(population.value.field("created"), None);
    assert_eq!(
        population.serialize().unwrap().statements,
        vec![
            r#"let vec_0 = vec!["string".to_string()];"#.to_string(),
            "let mut account_0 = Account::default();".to_string(),
            r#"account_0.id = Uuid::parse_str("00000000-0000-0000-0000-000000000001").unwrap();"#.to_string(),
            r#"account_0.owner = "string".to_string();"#.to_string(),
            "account_0.tags = vec_0;".to_string(),
        ]
    );
}

#[test]
fn excluded_fields_are_left_unset() {
    let config = PopulateConfig::new().exclude_field("Account::tags");
    let population = setup_populator_with(config).populate(&named(ACCOUNT)).unwrap();
    assert_eq!(population.value.field("tags"), None);
    assert!(population.value.field("owner").is_some());
}

#[test]
fn parent_exclusions_apply_to_inherited_fields() {
    let derived = TypeName::new("t::Derived");
    let registry = TypeRegistry::new()
        .with(
            TypeDef::new("t::Base")
                .field(Field::new("id", LeafKind::String))
                .field(Field::new("secret", LeafKind::String)),
        )
        .with(
            TypeDef::new(derived.clone())
                .extends("t::Base")
                .constructor(Constructor::empty(&derived, "default"))
                .field(Field::new("extra", LeafKind::I32)),
        );
    let populator = Populator::builder(registry)
        .with_config(PopulateConfig::new().exclude_field("Base::secret"))
        .build()
        .unwrap();

    let value = populator.populate_named("t::Derived").unwrap().value;
    assert_eq!(value.field("secret"), None);
    assert_eq!(value.field("id"), Some(&Value::Str("string".into())));
    assert_eq!(value.field("extra"), Some(&Value::Int(1)));
}

#[test]
fn setter_strategy_calls_every_prefixed_setter() {
    let populator = setup_populator();
    let rendered = populator.populate(&named(PROFILE)).unwrap().serialize().unwrap();

    assert_eq!(
        rendered.statements,
        vec![
            r#"let address_0 = Address::new("string".to_string(), "string".to_string());"#.to_string(),
            "let mut profile_0 = Profile::new();".to_string(),
            r#"profile_0.set_nickname("string".to_string());"#.to_string(),
            "profile_0.set_birthday(NaiveDate::from_ymd_opt(1970, 1, 1).unwrap());".to_string(),
            "profile_0.set_address(address_0);".to_string(),
        ]
    );
    assert!(rendered.imports.contains("chrono::NaiveDate"));
    assert!(rendered.imports.contains("shop::Address"));
}

#[test]
fn builder_strategy_chains_operations() {
    let populator = setup_populator();
    let population = populator.populate(&named(ORDER)).unwrap();

    assert!(matches!(
        population.value.field("status"),
        Some(Value::Enum { variant, .. }) if variant == "Pending"
    ));
    let rendered = population.serialize().unwrap();
    assert_eq!(
        rendered.statements,
        vec![
            r#"let order_0 = Order::builder().id(1u64).status(Status::Pending).note("string".to_string()).build();"#
                .to_string()
        ]
    );
    assert!(rendered.imports.contains("shop::Status"));
}

/// `Item` whose builder hands back a fresh builder from every operation
fn immutable_builder_registry() -> TypeRegistry {
    let builder = TypeDescriptor::named("p::ItemBuilder");
    let entry = builder.clone();
    TypeRegistry::new()
        .with(TypeDef::new("p::Item").method(Method::static_fn(
            "builder",
            vec![],
            Returns::Type(entry),
            |_| Ok(Value::Object(Object::new("p::ItemBuilder"))),
        )))
        .with(
            TypeDef::new("p::ItemBuilder")
                .method(Method::instance(
                    "sku",
                    vec![Param::new("sku", LeafKind::String)],
                    Returns::Type(builder),
                    |receiver, mut args| {
                        let mut next = receiver
                            .as_object()
                            .cloned()
                            .ok_or_else(|| InvokeError::NotAnObject { member: "sku".into() })?;
                        next.fields.insert("sku".into(), args.pop().unwrap_or(Value::Null));
                        Ok(Value::Object(next))
                    },
                ))
                .method(Method::instance(
                    "build",
                    vec![],
                    Returns::Type(TypeDescriptor::named("p::Item")),
                    |receiver, _| {
                        let mut item = Object::new("p::Item");
                        if let Some(sku) = receiver.field("sku") {
                            item = item.with("sku", sku.clone());
                        }
                        Ok(Value::Object(item))
                    },
                )),
        )
}

#[test]
fn builder_operations_returning_a_fresh_builder_are_kept() {
    let populator = Populator::new(immutable_builder_registry());
    let population = populator.populate_named("p::Item").unwrap();

    assert_eq!(population.value.field("sku"), Some(&Value::Str("string".into())));
    assert_eq!(
        population.serialize().unwrap().statements,
        vec![r#"let item_0 = Item::builder().sku("string".to_string()).build();"#.to_string()]
    );
    let replayed = populator.replay(population.trace.as_ref().unwrap()).unwrap();
    assert_eq!(replayed, population.value);
}

#[test]
fn acyclic_types_have_no_null_leaves() {
    let populator = setup_populator();
    for ty in [PERSON, ACCOUNT, PROFILE, ORDER, MONEY, INVENTORY, CATALOG] {
        let value = populator.populate(&named(ty)).unwrap().value;
        assert!(!value.contains_null(), "{ty}: {value:?}");
    }
}

#[test]
fn factory_selection_rules() {
    assert_eq!(
        statements(&setup_populator(), MONEY),
        vec!["let money_0 = Money::zero();".to_string()]
    );

    let config = PopulateConfig::new().with_factory_selection(FactorySelection::Largest);
    assert_eq!(
        statements(&setup_populator_with(config), MONEY),
        vec![r#"let money_0 = Money::of(1i64, "string".to_string());"#.to_string()]
    );
}

#[test]
fn mutator_strategy_runs_collection_operations_last() {
    let populator = setup_populator();
    let population = populator.populate(&named(INVENTORY)).unwrap();

    assert_eq!(
        population.value.field("items"),
        Some(&Value::Seq(vec![Value::Str("string".into())]))
    );
    assert_eq!(
        population.serialize().unwrap().statements,
        vec![
            r#"let hash_map_0 = HashMap::from([("string".to_string(), 1)]);"#.to_string(),
            "let mut inventory_0 = Inventory::new();".to_string(),
            r#"inventory_0.add_item("string".to_string());"#.to_string(),
            "inventory_0.restock(hash_map_0);".to_string(),
        ]
    );
}

#[test]
fn strategy_order_decides_between_applicable_strategies() {
    // Person has no no-arg constructor, so field injection never applies.
    let config = PopulateConfig::new().with_strategy_order(["field", "constructor"]);
    assert_eq!(
        statements(&setup_populator_with(config), PERSON),
        vec![r#"let person_0 = Person::new("string".to_string(), 1);"#.to_string()]
    );

    let config = PopulateConfig::new().with_strategy_order(["mutator"]);
    let err = setup_populator_with(config).populate(&named(PERSON)).unwrap_err();
    assert!(matches!(err, PopulateError::NoMatchingStrategy { ref attempted, .. } if attempted == &["mutator"]));
}

/// Stamps only `Person`, via a pseudo constructor named `stamped`
#[derive(Debug)]
struct Stamp;

impl CustomStrategy for Stamp {
    fn name(&self) -> &str {
        "stamp"
    }

    fn applicable(&self, def: &TypeDef, _session: &Session<'_>) -> bool {
        def.name.as_str() == PERSON
    }

    fn apply(&self, def: &TypeDef, carrier: &Carrier, session: &mut Session<'_>) -> Result<Value, PopulateError> {
        let node = session.open(
            NodeKind::Constructor { ctor: "stamped".into() },
            carrier.descriptor().clone(),
            0,
        )?;
        session.close(node)?;
        Ok(Value::Object(Object::new(def.name.clone()).with("stamped", Value::Bool(true))))
    }
}

#[test]
fn custom_strategy_first_in_order_wins() {
    let config = PopulateConfig::new().with_strategy_order([
        StrategyName::Custom("stamp".into()),
        StrategyName::Constructor,
    ]);
    let populator = Populator::builder(shop_registry())
        .with_config(config)
        .with_strategy(Stamp)
        .build()
        .unwrap();

    let population = populator.populate(&named(PERSON)).unwrap();
    assert_eq!(population.value.field("stamped"), Some(&Value::Bool(true)));
    assert_eq!(
        population.serialize().unwrap().statements,
        vec!["let person_0 = Person::stamped();".to_string()]
    );

    // Not applicable to Money, so the order falls through to nothing.
    let err = populator.populate(&named(MONEY)).unwrap_err();
    assert!(matches!(err, PopulateError::NoMatchingStrategy { .. }));
}

#[test]
fn fallback_runs_after_the_order() {
    let populator = Populator::builder(shop_registry())
        .with_config(PopulateConfig::new().with_strategy_order(["field"]))
        .with_fallback(Stamp)
        .build()
        .unwrap();
    let population = populator.populate(&named(PERSON)).unwrap();
    assert_eq!(population.value.field("stamped"), Some(&Value::Bool(true)));
}

/// Builds `Account` by asking its own populator for a `Person` owner
#[derive(Debug, Default)]
struct Nested {
    populator: Arc<OnceLock<Weak<Populator>>>,
}

impl CustomStrategy for Nested {
    fn name(&self) -> &str {
        "nested"
    }

    fn applicable(&self, def: &TypeDef, _session: &Session<'_>) -> bool {
        def.name.as_str() == ACCOUNT
    }

    fn apply(&self, def: &TypeDef, _carrier: &Carrier, _session: &mut Session<'_>) -> Result<Value, PopulateError> {
        let populator = self
            .populator
            .get()
            .and_then(Weak::upgrade)
            .ok_or_else(|| PopulateError::UnknownStrategy("nested".into()))?;
        let owner = populator.populate_named(PERSON)?.value;
        Ok(Value::Object(Object::new(def.name.clone()).with("owner", owner)))
    }
}

#[test]
fn custom_strategy_may_call_back_into_its_populator() {
    let nested = Nested::default();
    let slot = Arc::clone(&nested.populator);
    let populator = Arc::new(
        Populator::builder(shop_registry())
            .with_config(
                PopulateConfig::new()
                    .with_trace(false)
                    .with_strategy_order(["nested", "constructor"]),
            )
            .with_strategy(nested)
            .build()
            .unwrap(),
    );
    slot.set(Arc::downgrade(&populator)).unwrap();

    let value = populator.populate_named(ACCOUNT).unwrap().value;
    let owner = value.field("owner").unwrap();
    assert_eq!(owner.field("name"), Some(&Value::Str("string".into())));
}

#[test]
fn unregistered_custom_strategy_fails_at_build() {
    let err = Populator::builder(TypeRegistry::new())
        .with_config(PopulateConfig::new().with_strategy_order(["stamp"]))
        .build()
        .unwrap_err();
    assert!(matches!(err, PopulateError::UnknownStrategy(name) if name == "stamp"));
}
