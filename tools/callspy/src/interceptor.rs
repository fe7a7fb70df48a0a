use crate::errors::SpyError;
use crate::object::{PropertyDescriptor, Slot};
use crate::realm::Realm;
use crate::spy::{self, Spy};
use crate::types::{AccessKind, InstallSite, PropertyKey, Selector};
use crate::value::{ObjectId, Value};
use serde_json::json;
use std::cell::{Cell, RefCell};
use std::ops::Deref;
use std::rc::Rc;

#[derive(Debug, Clone)]
enum Original {
    Value(Value),
    /// Lazily materialized binding; read through the captured getter.
    LiveGetter(ObjectId),
}

/// One installed replacement, owned by the registry while active.
#[derive(Debug)]
pub struct Interception {
    id: u64,
    target: ObjectId,
    key: PropertyKey,
    kind: AccessKind,
    site: InstallSite,
    /// `None` when the member was inherited; restore then drops the shadow.
    original_descriptor: Option<PropertyDescriptor>,
    original: Original,
    bind_receiver: bool,
    active: Cell<bool>,
    spy: Spy,
}

impl Interception {
    pub fn id(&self) -> u64 {
        self.id
    }

    pub fn is_active(&self) -> bool {
        self.active.get()
    }

    pub(crate) fn restore(&self, realm: &mut Realm) -> Result<(), SpyError> {
        if !self.active.replace(false) {
            return Ok(());
        }
        match &self.original_descriptor {
            Some(descriptor) => {
                realm.install_property(self.target, self.key.clone(), descriptor.clone())?
            }
            None => {
                realm.remove_property(self.target, &self.key)?;
            }
        }
        realm.registry.remove(self.id);
        realm.log(
            "info",
            "interception.restore",
            json!({
                "id": self.id,
                "key": realm.key_label(&self.key),
                "kind": self.kind.as_str(),
                "call_count": self.spy.call_count(),
            }),
        );
        Ok(())
    }

    fn original_value(&self, realm: &mut Realm) -> Result<Value, SpyError> {
        match &self.original {
            Original::Value(value) => Ok(value.clone()),
            Original::LiveGetter(getter) => {
                realm.call(&Value::Object(*getter), Value::Object(self.target), Vec::new())
            }
        }
    }
}

/// A spy installed on an object member. Dereferences to the underlying
/// [`Spy`] for the recording views.
#[derive(Debug, Clone)]
pub struct MemberSpy {
    spy: Spy,
    interception: Rc<Interception>,
}

impl Deref for MemberSpy {
    type Target = Spy;

    fn deref(&self) -> &Spy {
        &self.spy
    }
}

impl MemberSpy {
    pub fn spy(&self) -> &Spy {
        &self.spy
    }

    pub fn access_kind(&self) -> AccessKind {
        self.interception.kind
    }

    pub fn install_site(&self) -> InstallSite {
        self.interception.site
    }

    pub fn is_active(&self) -> bool {
        self.interception.is_active()
    }

    /// Reinstalls the captured descriptor, or removes the shadowing property
    /// when the member was inherited. Calling it again is a no-op.
    pub fn restore(&self, realm: &mut Realm) -> Result<(), SpyError> {
        self.interception.restore(realm)
    }

    /// The member as it was before interception. For a lazily materialized
    /// binding the capturing getter runs again, so the value is current.
    pub fn get_original(&self, realm: &mut Realm) -> Result<Value, SpyError> {
        self.interception.original_value(realm)
    }

    /// Swaps the delegate without touching recorded history.
    pub fn will_call(
        &self,
        realm: &mut Realm,
        implementation: impl Into<Value>,
    ) -> Result<&Self, SpyError> {
        let implementation = implementation.into();
        let unbound = spy::expect_callable(realm, &implementation)?;
        let delegate = if self.interception.bind_receiver {
            let target = Value::Object(self.interception.target);
            realm.bind(unbound, target, Vec::new())?
        } else {
            unbound
        };
        spy::link_prototype(realm, self.spy.function(), unbound)?;
        self.spy.set_implementation(Some(delegate));
        Ok(self)
    }
}

struct Plan {
    kind: AccessKind,
    original: Original,
    materialized: Value,
    complement: Option<ObjectId>,
    lazy: bool,
}

/// Intercepts `selector` on `target`, delegating to `substitute` when given
/// and to the original member otherwise.
///
/// The replacement is always an own property of `target`. An inherited member
/// is shadowed rather than replaced on its ancestor, so other objects sharing
/// that ancestor keep the original. All preconditions are checked before the
/// first write.
pub fn spy_on(
    realm: &mut Realm,
    target: &Value,
    selector: impl Into<Selector>,
    substitute: Option<Value>,
) -> Result<MemberSpy, SpyError> {
    let selector = selector.into();
    let target_id = resolve_target(target)?;
    let key = selector.key().clone();
    let label = realm.key_label(&key);

    let Some((descriptor, owner)) = realm.find_property(target_id, &key) else {
        return Err(SpyError::MemberNotFound(format!("{label} does not exist")));
    };
    if !descriptor.configurable && realm.config().interception.enforce_configurable {
        return Err(SpyError::NotConfigurable(format!(
            "{label} is not configurable"
        )));
    }
    let site = if owner == target_id {
        InstallSite::Own
    } else {
        InstallSite::Ancestor(owner)
    };
    let substitute = substitute.filter(|value| !value.is_undefined());
    if let Some(substitute) = &substitute {
        spy::expect_callable(realm, substitute)?;
    }

    let plan = plan_slot(realm, target, &selector, &descriptor, &label)?;
    let materialized = unwrap_active(realm, plan.materialized.clone())?;
    let original = match plan.original {
        Original::Value(_) => Original::Value(materialized.clone()),
        live => live,
    };
    let bind_receiver = plan.kind == AccessKind::Value;

    let source = substitute.clone().unwrap_or_else(|| materialized.clone());
    let spy = if source.is_undefined() {
        spy::spawn(realm, None, None)?
    } else {
        let unbound = spy::expect_callable(realm, &source)?;
        if bind_receiver {
            let bound = realm.bind(unbound, target.clone(), Vec::new())?;
            spy::spawn(realm, Some(Value::Object(bound)), Some(unbound))?
        } else {
            spy::spawn(realm, Some(source), None)?
        }
    };
    if plan.kind == AccessKind::Value && substitute.is_some() && realm.is_callable(&materialized)
    {
        if let Some(original) = materialized.as_object() {
            spy::wrap(realm, spy.function(), original)?;
        }
    }

    let slot = match plan.kind {
        AccessKind::Value => Slot::Data {
            value: spy.value(),
            writable: descriptor.writable() || descriptor.is_accessor(),
        },
        AccessKind::Get => {
            let getter = if plan.lazy {
                lazy_getter(realm, &spy, &label)
            } else {
                spy.function()
            };
            Slot::Accessor {
                get: Some(getter),
                set: plan.complement,
            }
        }
        AccessKind::Set => Slot::Accessor {
            get: plan.complement,
            set: Some(spy.function()),
        },
    };
    let installed = PropertyDescriptor {
        slot,
        enumerable: descriptor.enumerable,
        configurable: descriptor.configurable,
    };

    let id = realm.registry.allocate_id();
    let interception = Rc::new(Interception {
        id,
        target: target_id,
        key: key.clone(),
        kind: plan.kind,
        site,
        original_descriptor: (site == InstallSite::Own).then_some(descriptor),
        original,
        bind_receiver,
        active: Cell::new(true),
        spy: spy.clone(),
    });
    spy.state().borrow_mut().interception = Rc::downgrade(&interception);
    realm.install_property(target_id, key, installed)?;
    realm.registry.insert(Rc::clone(&interception));
    realm.log(
        "info",
        "interception.install",
        json!({
            "id": id,
            "key": label,
            "kind": plan.kind.as_str(),
            "site": site.as_str(),
            "spy": spy.name(),
        }),
    );
    Ok(MemberSpy { spy, interception })
}

fn resolve_target(target: &Value) -> Result<ObjectId, SpyError> {
    match target {
        Value::Object(id) => Ok(*id),
        Value::Undefined | Value::Null => Err(SpyError::InvalidArgument(
            "could not find an object to spy upon".to_string(),
        )),
        _ => Err(SpyError::InvalidArgument(
            "cannot spy on a primitive value".to_string(),
        )),
    }
}

fn plan_slot(
    realm: &mut Realm,
    target: &Value,
    selector: &Selector,
    descriptor: &PropertyDescriptor,
    label: &str,
) -> Result<Plan, SpyError> {
    let plan = match (selector, &descriptor.slot) {
        (Selector::Value(_), Slot::Accessor { get: Some(getter), set }) => {
            let materialized = realm.call(&Value::Object(*getter), target.clone(), Vec::new())?;
            Plan {
                kind: AccessKind::Get,
                original: Original::LiveGetter(*getter),
                materialized,
                complement: *set,
                lazy: true,
            }
        }
        (Selector::Value(_), Slot::Accessor { get: None, .. }) => {
            value_plan(AccessKind::Value, Value::Undefined, None)
        }
        (Selector::Value(_), Slot::Data { value, .. }) => {
            value_plan(AccessKind::Value, value.clone(), None)
        }
        (Selector::Getter(_), Slot::Accessor { get, set }) => {
            value_plan(AccessKind::Get, optional_function(*get), *set)
        }
        (Selector::Setter(_), Slot::Accessor { get, set }) => {
            value_plan(AccessKind::Set, optional_function(*set), *get)
        }
        (Selector::Getter(_), Slot::Data { value, writable }) => {
            let (getter, setter) = backing_cell(realm, label, value.clone(), *writable);
            value_plan(AccessKind::Get, Value::Object(getter), setter)
        }
        (Selector::Setter(_), Slot::Data { writable: false, .. }) => {
            return Err(SpyError::TypeError(format!(
                "cannot intercept the setter of read only property {label}"
            )));
        }
        (Selector::Setter(_), Slot::Data { value, .. }) => {
            let (getter, setter) = backing_cell(realm, label, value.clone(), true);
            value_plan(AccessKind::Set, optional_function(setter), Some(getter))
        }
    };
    Ok(plan)
}

fn value_plan(kind: AccessKind, materialized: Value, complement: Option<ObjectId>) -> Plan {
    Plan {
        kind,
        original: Original::Value(materialized.clone()),
        materialized,
        complement,
        lazy: false,
    }
}

fn optional_function(id: Option<ObjectId>) -> Value {
    id.map(Value::Object).unwrap_or_default()
}

/// Moves a data value into a cell behind a synthesized accessor pair.
fn backing_cell(
    realm: &mut Realm,
    label: &str,
    value: Value,
    writable: bool,
) -> (ObjectId, Option<ObjectId>) {
    let cell = Rc::new(RefCell::new(value));
    let read = Rc::clone(&cell);
    let getter = realm.create_function(&format!("get {label}"), 0, move |_, _| {
        Ok(read.borrow().clone())
    });
    let setter = writable.then(|| {
        realm.create_function(&format!("set {label}"), 1, move |_, inv| {
            *cell.borrow_mut() = inv.arg(0);
            Ok(Value::Undefined)
        })
    });
    (getter, setter)
}

/// Returns the stable wrapper on every read, re-linking its prototype to the
/// current delegate first.
fn lazy_getter(realm: &mut Realm, spy: &Spy, label: &str) -> ObjectId {
    let handle = spy.clone();
    realm.create_function(&format!("get {label}"), 0, move |realm, _| {
        let wrapper = handle.function();
        if let Some(delegate) = handle.implementation() {
            spy::link_prototype(realm, wrapper, delegate)?;
        }
        Ok(Value::Object(wrapper))
    })
}

/// An original that is itself an active interception's wrapper yields that
/// interception's original instead.
fn unwrap_active(realm: &mut Realm, value: Value) -> Result<Value, SpyError> {
    let Some(existing) = realm.spy_of(&value) else {
        return Ok(value);
    };
    let interception = existing.state().borrow().interception.upgrade();
    match interception {
        Some(interception) if interception.is_active() => interception.original_value(realm),
        _ => Ok(value),
    }
}

impl Realm {
    pub fn spy_on(
        &mut self,
        target: &Value,
        selector: impl Into<Selector>,
        substitute: Option<Value>,
    ) -> Result<MemberSpy, SpyError> {
        spy_on(self, target, selector, substitute)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::CallResult;

    fn greeter(realm: &mut Realm) -> ObjectId {
        let obj = realm.new_object();
        realm.define_value(obj, "greeting", "hi").expect("greeting");
        realm
            .define_method(obj, "greet", 1, |realm, inv| {
                let greeting = realm.get(&inv.this, "greeting")?;
                Ok(Value::from(format!("{greeting} {}", inv.arg(0))))
            })
            .expect("greet");
        obj
    }

    #[test]
    fn own_methods_keep_their_receiver() {
        let mut realm = Realm::new();
        let obj = greeter(&mut realm);
        let target = Value::Object(obj);
        let spy = realm.spy_on(&target, "greet", None).expect("spy_on");

        let detached = realm.get(&target, "greet").expect("get");
        let result = realm
            .call(&detached, Value::Undefined, vec![Value::from("ada")])
            .expect("call");
        assert_eq!(result, Value::from("hi ada"));
        assert_eq!(spy.name(), "greet");
        assert_eq!(spy.length(), 1);
        assert_eq!(spy.install_site(), InstallSite::Own);
        assert_eq!(spy.access_kind(), AccessKind::Value);
    }

    #[test]
    fn target_preconditions_are_reported() {
        let mut realm = Realm::new();
        let undefined = realm.spy_on(&Value::Undefined, "x", None).expect_err("undefined");
        assert_eq!(
            undefined,
            SpyError::InvalidArgument("could not find an object to spy upon".to_string())
        );
        let primitive = realm.spy_on(&Value::from(4), "x", None).expect_err("primitive");
        assert_eq!(
            primitive,
            SpyError::InvalidArgument("cannot spy on a primitive value".to_string())
        );
        let obj = realm.new_object();
        let missing = realm
            .spy_on(&Value::Object(obj), "missing", None)
            .expect_err("missing");
        assert_eq!(
            missing,
            SpyError::MemberNotFound("missing does not exist".to_string())
        );
    }

    #[test]
    fn failed_interception_leaves_the_member_untouched() {
        let mut realm = Realm::new();
        let obj = realm.new_object();
        realm.define_value(obj, "count", 3).expect("count");
        let target = Value::Object(obj);
        let err = realm.spy_on(&target, "count", None).expect_err("not callable");
        assert!(matches!(err, SpyError::InvalidArgument(_)));
        assert_eq!(realm.get(&target, "count").expect("count"), Value::from(3));
        assert_eq!(realm.active_interceptions(), 0);

        let locked = realm.create_function("locked", 0, |_, _| Ok(Value::Null));
        realm
            .define_property(
                obj,
                "locked",
                PropertyDescriptor::data(locked).with_configurable(false),
            )
            .expect("locked");
        let err = realm.spy_on(&target, "locked", None).expect_err("locked");
        assert_eq!(
            err,
            SpyError::NotConfigurable("locked is not configurable".to_string())
        );
    }

    #[test]
    fn inherited_members_are_shadowed_on_the_target() {
        let mut realm = Realm::new();
        let proto = greeter(&mut realm);
        let child = realm.create_object(Some(proto));
        let sibling = realm.create_object(Some(proto));
        let key = PropertyKey::from("greet");
        let inherited = realm.get_own_property(proto, &key).expect("inherited");
        realm.set(&Value::Object(child), "greeting", "yo").expect("greeting");

        let spy = realm
            .spy_on(&Value::Object(child), "greet", None)
            .expect("spy_on");
        assert_eq!(spy.install_site(), InstallSite::Ancestor(proto));
        let shadow = realm.get_own_property(child, &key).expect("shadow");
        assert_eq!(shadow.enumerable, inherited.enumerable);
        assert_eq!(shadow.configurable, inherited.configurable);
        assert_eq!(realm.get_own_property(proto, &key), Some(inherited.clone()));

        let detached = realm.get(&Value::Object(child), "greet").expect("get");
        let result = realm
            .call(&detached, Value::Undefined, vec![Value::from("bo")])
            .expect("call");
        assert_eq!(result, Value::from("yo bo"));
        realm
            .call_method(&Value::Object(sibling), "greet", vec![Value::from("al")])
            .expect("sibling");
        assert_eq!(spy.call_count(), 1);

        spy.restore(&mut realm).expect("restore");
        assert!(realm.get_own_property(child, &key).is_none());
        assert_eq!(realm.get_own_property(proto, &key), Some(inherited));
    }

    #[test]
    fn substituted_lazy_bindings_keep_the_capturing_getter() {
        let mut realm = Realm::new();
        let module = realm.new_object();
        let current = Rc::new(RefCell::new(Value::Undefined));
        let real = realm.create_function("load", 0, |_, _| Ok(Value::from("real")));
        *current.borrow_mut() = Value::Object(real);
        let binding = Rc::clone(&current);
        realm
            .define_getter(module, "load", move |_, _| Ok(binding.borrow().clone()))
            .expect("binding");
        let fake = realm.create_function("fake", 0, |_, _| Ok(Value::from("fake")));
        let target = Value::Object(module);

        let spy = realm
            .spy_on(&target, "load", Some(Value::Object(fake)))
            .expect("spy_on");
        assert_eq!(spy.access_kind(), AccessKind::Get);
        let result = realm.call_method(&target, "load", Vec::new()).expect("call");
        assert_eq!(result, Value::from("fake"));
        assert_eq!(realm.get(&target, "load").expect("read"), spy.value());
        assert_eq!(realm.get(&target, "load").expect("read"), spy.value());
        assert_eq!(spy.call_count(), 1);
        assert_eq!(spy.returns(), vec![Value::from("fake")]);

        let replaced = realm.create_function("load", 0, |_, _| Ok(Value::from("v2")));
        *current.borrow_mut() = Value::Object(replaced);
        assert_eq!(
            spy.get_original(&mut realm).expect("original"),
            Value::Object(replaced)
        );
    }

    #[test]
    fn restore_reinstalls_the_exact_descriptor_once() {
        let mut realm = Realm::new();
        let obj = greeter(&mut realm);
        let key = PropertyKey::from("greet");
        let before = realm.get_own_property(obj, &key).expect("before");
        let spy = realm
            .spy_on(&Value::Object(obj), "greet", None)
            .expect("spy_on");
        assert_ne!(realm.get_own_property(obj, &key), Some(before.clone()));
        assert_eq!(realm.active_interceptions(), 1);

        spy.restore(&mut realm).expect("restore");
        spy.restore(&mut realm).expect("second restore");
        assert_eq!(realm.get_own_property(obj, &key), Some(before));
        assert!(!spy.is_active());
        assert_eq!(realm.active_interceptions(), 0);
    }

    #[test]
    fn substitutes_receive_the_original_statics() {
        let mut realm = Realm::new();
        let obj = realm.new_object();
        let original = realm
            .define_method(obj, "parse", 1, |_, _| Ok(Value::from("original")))
            .expect("parse");
        realm.define_value(original, "strict", true).expect("static");
        let fake = realm.create_function("fake", 1, |_, _| Ok(Value::from("fake")));

        let spy = realm
            .spy_on(&Value::Object(obj), "parse", Some(Value::Object(fake)))
            .expect("spy_on");
        let result = realm
            .call_method(&Value::Object(obj), "parse", vec![Value::from("x")])
            .expect("call");
        assert_eq!(result, Value::from("fake"));
        assert_eq!(spy.name(), "fake");
        assert_eq!(realm.get(&spy.value(), "strict").expect("static"), Value::from(true));
        assert_eq!(
            spy.get_original(&mut realm).expect("original"),
            Value::Object(original)
        );
    }

    #[test]
    fn will_call_swaps_the_delegate_and_keeps_history() {
        let mut realm = Realm::new();
        let obj = greeter(&mut realm);
        let target = Value::Object(obj);
        let spy = realm.spy_on(&target, "greet", None).expect("spy_on");
        realm
            .call_method(&target, "greet", vec![Value::from("a")])
            .expect("first");

        let shout = realm.create_function("shout", 1, |realm, inv| {
            let greeting = realm.get(&inv.this, "greeting")?;
            Ok(Value::from(format!("{greeting}! {}!", inv.arg(0))))
        });
        spy.will_call(&mut realm, shout).expect("will_call");
        let detached = realm.get(&target, "greet").expect("get");
        let second = realm
            .call(&detached, Value::Undefined, vec![Value::from("b")])
            .expect("second");

        assert_eq!(second, Value::from("hi! b!"));
        assert_eq!(spy.call_count(), 2);
        assert_eq!(
            spy.results(),
            vec![
                CallResult::Ok(Value::from("hi a")),
                CallResult::Ok(Value::from("hi! b!")),
            ]
        );
        assert!(spy.will_call(&mut realm, 5).is_err());
    }

    #[test]
    fn getter_and_setter_intents_on_accessors() {
        let mut realm = Realm::new();
        let obj = realm.new_object();
        let store = realm.new_object();
        realm.define_value(store, "value", 1).expect("store");
        let store_value = Value::Object(store);
        let read_store = store_value.clone();
        realm
            .define_getter(obj, "level", move |realm, _| realm.get(&read_store, "value"))
            .expect("getter");
        realm
            .define_setter(obj, "level", move |realm, inv| {
                realm.set(&store_value, "value", inv.arg(0))?;
                Ok(Value::Undefined)
            })
            .expect("setter");
        let target = Value::Object(obj);

        let getter = realm
            .spy_on(&target, Selector::getter("level"), None)
            .expect("getter spy");
        let setter = realm
            .spy_on(&target, Selector::setter("level"), None)
            .expect("setter spy");
        realm.set(&target, "level", 4).expect("set");
        assert_eq!(realm.get(&target, "level").expect("get"), Value::from(4));

        assert_eq!(getter.access_kind(), AccessKind::Get);
        assert_eq!(getter.call_count(), 1);
        assert_eq!(setter.calls(), vec![vec![Value::from(4)]]);
        assert_eq!(realm.get(&Value::Object(store), "value").expect("store"), Value::from(4));
    }

    #[test]
    fn accessor_intent_on_a_data_member_uses_a_backing_cell() {
        let mut realm = Realm::new();
        let obj = realm.new_object();
        realm.define_value(obj, "mode", "dark").expect("mode");
        let target = Value::Object(obj);
        let key = PropertyKey::from("mode");
        let before = realm.get_own_property(obj, &key).expect("before");

        let getter = realm
            .spy_on(&target, Selector::getter("mode"), None)
            .expect("getter spy");
        assert_eq!(realm.get(&target, "mode").expect("read"), Value::from("dark"));
        realm.set(&target, "mode", "light").expect("write");
        assert_eq!(realm.get(&target, "mode").expect("read"), Value::from("light"));
        assert_eq!(getter.call_count(), 2);
        assert_eq!(getter.returns(), vec![Value::from("dark"), Value::from("light")]);

        getter.restore(&mut realm).expect("restore");
        assert_eq!(realm.get_own_property(obj, &key), Some(before));
    }

    #[test]
    fn lazy_bindings_return_a_stable_wrapper() {
        let mut realm = Realm::new();
        let module = realm.new_object();
        let current = Rc::new(RefCell::new(Value::Undefined));
        let first = realm.create_function("load", 0, |_, _| Ok(Value::from("v1")));
        *current.borrow_mut() = Value::Object(first);
        let binding = Rc::clone(&current);
        realm
            .define_getter(module, "load", move |_, _| Ok(binding.borrow().clone()))
            .expect("binding");
        let target = Value::Object(module);

        let spy = realm.spy_on(&target, "load", None).expect("spy_on");
        assert_eq!(spy.access_kind(), AccessKind::Get);
        let read_once = realm.get(&target, "load").expect("read");
        let read_twice = realm.get(&target, "load").expect("read");
        assert_eq!(read_once, spy.value());
        assert_eq!(read_twice, spy.value());
        let result = realm
            .call_method(&target, "load", Vec::new())
            .expect("call");
        assert_eq!(result, Value::from("v1"));
        assert_eq!(spy.call_count(), 1);

        let second = realm.create_function("load", 0, |_, _| Ok(Value::from("v2")));
        *current.borrow_mut() = Value::Object(second);
        assert_eq!(
            spy.get_original(&mut realm).expect("original"),
            Value::Object(second)
        );
    }

    #[test]
    fn double_interception_unwraps_to_the_true_original() {
        let mut realm = Realm::new();
        let obj = greeter(&mut realm);
        let target = Value::Object(obj);
        let original = realm.get(&target, "greet").expect("original");
        let outer = realm.spy_on(&target, "greet", None).expect("first");
        let inner = realm.spy_on(&target, "greet", None).expect("second");

        assert_eq!(inner.get_original(&mut realm).expect("original"), original);
        realm
            .call_method(&target, "greet", vec![Value::from("x")])
            .expect("call");
        assert_eq!(inner.call_count(), 1);
        assert_eq!(outer.call_count(), 0);

        inner.restore(&mut realm).expect("restore inner");
        assert_eq!(realm.get(&target, "greet").expect("outer"), outer.value());
        outer.restore(&mut realm).expect("restore outer");
        assert_eq!(realm.get(&target, "greet").expect("restored"), original);
    }

    #[test]
    fn configurability_check_can_be_disabled() {
        let mut config = crate::config::SpyConfig::default();
        config.interception.enforce_configurable = false;
        let mut realm = Realm::with_config(config).expect("realm");
        let obj = realm.new_object();
        let locked = realm.create_function("locked", 0, |_, _| Ok(Value::from(1)));
        realm
            .define_property(
                obj,
                "locked",
                PropertyDescriptor::data(locked).with_configurable(false),
            )
            .expect("locked");
        let spy = realm
            .spy_on(&Value::Object(obj), "locked", None)
            .expect("spy_on");
        realm
            .call_method(&Value::Object(obj), "locked", Vec::new())
            .expect("call");
        assert_eq!(spy.call_count(), 1);
    }
}
