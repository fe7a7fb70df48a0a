use callspy::{spy, CallResult, ClassSpec, Realm, SpyError, Value};

// ── helpers ───────────────────────────────────────────────────────────────────

fn call(realm: &mut Realm, callee: &Value, args: Vec<Value>) -> Result<Value, SpyError> {
    realm.call(callee, Value::Undefined, args)
}

fn adder(realm: &mut Realm) -> Value {
    Value::Object(realm.create_function("add", 2, |_, inv| {
        let a = inv.arg(0).as_number().unwrap_or(0.0);
        let b = inv.arg(1).as_number().unwrap_or(0.0);
        Ok(Value::from(a + b))
    }))
}

// ── recording ─────────────────────────────────────────────────────────────────

#[test]
fn every_call_is_recorded_with_its_exact_arguments() {
    let mut realm = Realm::new();
    let implementation = adder(&mut realm);
    let spy = spy(&mut realm, Some(implementation)).expect("spy");
    let callee = spy.value();

    for n in 0..5 {
        call(&mut realm, &callee, vec![Value::from(n), Value::from(10)]).expect("call");
    }

    assert_eq!(spy.call_count(), 5);
    assert_eq!(spy.calls().len(), 5);
    assert_eq!(spy.results().len(), 5);
    assert_eq!(spy.calls()[3], vec![Value::from(3), Value::from(10)]);
    assert_eq!(spy.returns()[4], Value::from(14));
}

#[test]
fn throws_are_recorded_then_propagated() {
    let mut realm = Realm::new();
    let error = realm.new_error("disk full");
    let thrown = error.clone();
    let failing = realm.create_function("save", 0, move |_, _| Err(SpyError::thrown(thrown.clone())));
    let spy = realm.spy(Some(Value::Object(failing))).expect("spy");

    let err = call(&mut realm, &spy.value(), Vec::new()).expect_err("propagates");
    assert_eq!(err, SpyError::DelegateFailure(error.clone()));
    assert_eq!(spy.results(), vec![CallResult::Error(error)]);
    assert_eq!(spy.returns(), vec![Value::Undefined]);
    assert!(spy.called());
}

#[test]
fn host_errors_inside_the_implementation_are_recorded_as_messages() {
    let mut realm = Realm::new();
    let broken = realm.create_function("broken", 0, |realm, _| {
        realm.call(&Value::Null, Value::Undefined, Vec::new())
    });
    let spy = realm.spy(Some(Value::Object(broken))).expect("spy");
    let err = call(&mut realm, &spy.value(), Vec::new()).expect_err("type error");
    assert!(matches!(err, SpyError::TypeError(_)));
    assert_eq!(
        spy.results(),
        vec![CallResult::Error(Value::from("type error: null is not a function"))]
    );
}

// ── overrides ─────────────────────────────────────────────────────────────────

#[test]
fn next_result_short_circuits_the_implementation() {
    let mut realm = Realm::new();
    let runs = std::rc::Rc::new(std::cell::Cell::new(0));
    let counter = std::rc::Rc::clone(&runs);
    let tracked = realm.create_function("tracked", 0, move |_, _| {
        counter.set(counter.get() + 1);
        Ok(Value::from("real"))
    });
    let spy = realm.spy(Some(Value::Object(tracked))).expect("spy");

    spy.next_result("forced");
    let value = call(&mut realm, &spy.value(), Vec::new()).expect("call");
    assert_eq!(value, Value::from("forced"));
    assert_eq!(runs.get(), 0);
    assert_eq!(spy.results().last(), Some(&CallResult::Ok(Value::from("forced"))));

    let value = call(&mut realm, &spy.value(), Vec::new()).expect("call");
    assert_eq!(value, Value::from("real"));
    assert_eq!(runs.get(), 1);
}

#[test]
fn next_error_raises_the_queued_value() {
    let mut realm = Realm::new();
    let spy = realm.spy(None).expect("spy");
    spy.next_error("e1").next_error("e2").next_result("ok");
    let callee = spy.value();

    let first = call(&mut realm, &callee, Vec::new()).expect_err("first");
    let second = call(&mut realm, &callee, Vec::new()).expect_err("second");
    let third = call(&mut realm, &callee, Vec::new()).expect("third");
    let fourth = call(&mut realm, &callee, Vec::new()).expect("fourth");

    assert_eq!(first, SpyError::DelegateFailure(Value::from("e1")));
    assert_eq!(second, SpyError::DelegateFailure(Value::from("e2")));
    assert_eq!(third, Value::from("ok"));
    assert_eq!(fourth, Value::Undefined);
    assert_eq!(
        spy.results(),
        vec![
            CallResult::Error(Value::from("e1")),
            CallResult::Error(Value::from("e2")),
            CallResult::Ok(Value::from("ok")),
            CallResult::Ok(Value::Undefined),
        ]
    );
}

// ── identity and passthrough ──────────────────────────────────────────────────

#[test]
fn spy_of_identifies_wrappers_only() {
    let mut realm = Realm::new();
    let implementation = adder(&mut realm);
    let spy = realm.spy(Some(implementation.clone())).expect("spy");
    let found = realm.spy_of(&spy.value()).expect("wrapper");
    assert!(found.same_spy(&spy));
    assert!(realm.spy_of(&implementation).is_none());
    assert!(realm.spy_of(&Value::from("spy")).is_none());
}

#[test]
fn wrapped_classes_keep_statics_and_instances() {
    let mut realm = Realm::new();
    let class = realm
        .create_class(ClassSpec::new("Cache").arity(1).init(|realm, inv| {
            realm.set(&inv.this, "size", inv.arg(0))?;
            Ok(Value::Undefined)
        }))
        .expect("class");
    realm.define_value(class, "DEFAULT_SIZE", 16).expect("static");
    let spy = realm.spy(Some(Value::Object(class))).expect("spy");

    let wrapper = spy.value();
    assert_eq!(
        realm.get(&wrapper, "DEFAULT_SIZE").expect("static"),
        Value::from(16)
    );
    let instance = realm
        .construct(&wrapper, vec![Value::from(8)], None)
        .expect("construct");
    assert!(realm.instance_of(&instance, &Value::Object(class)).expect("instanceof"));
    assert_eq!(realm.get(&instance, "size").expect("size"), Value::from(8));
    assert_eq!(spy.calls(), vec![vec![Value::from(8)]]);
    assert!(call(&mut realm, &wrapper, Vec::new()).is_err());
    assert!(matches!(spy.results().last(), Some(CallResult::Error(_))));
}

#[test]
fn default_name_comes_from_config() {
    let config = callspy::parse_config("[spy]\ndefault_name = \"mockFn\"\n").expect("config");
    let mut realm = Realm::with_config(config).expect("realm");
    let spy = realm.spy(None).expect("spy");
    assert_eq!(spy.name(), "mockFn");
    assert_eq!(realm.function_name(spy.function()), "mockFn");
}

// ── reset ─────────────────────────────────────────────────────────────────────

#[test]
fn reset_between_cases_starts_from_zero() {
    let mut realm = Realm::new();
    let implementation = adder(&mut realm);
    let spy = realm.spy(Some(implementation)).expect("spy");
    call(&mut realm, &spy.value(), vec![Value::from(1), Value::from(2)]).expect("call");
    spy.next_error("pending");
    spy.reset();

    assert!(!spy.called());
    assert_eq!(spy.call_count(), 0);
    assert!(spy.calls().is_empty());
    assert!(spy.results().is_empty());
    assert!(spy.async_results().is_empty());
    assert_eq!(spy.pending_overrides(), 0);

    let value = call(&mut realm, &spy.value(), vec![Value::from(2), Value::from(2)]).expect("call");
    assert_eq!(value, Value::from(4));
    assert_eq!(spy.call_count(), 1);
}

#[test]
fn reset_during_a_call_drops_that_calls_result() {
    let mut realm = Realm::new();
    let holder = realm.new_object();
    let target = Value::Object(holder);
    let resetting = realm.create_function("resetting", 0, move |realm, _| {
        let handle = realm.get(&Value::Object(holder), "spy")?;
        if let Some(spy) = realm.spy_of(&handle) {
            spy.reset();
        }
        Ok(Value::from("done"))
    });
    let spy = realm.spy(Some(Value::Object(resetting))).expect("spy");
    realm.define_value(holder, "spy", spy.value()).expect("holder");

    let value = realm.call_method(&target, "spy", Vec::new()).expect("call");
    assert_eq!(value, Value::from("done"));
    assert_eq!(spy.call_count(), 0);
    assert!(spy.results().is_empty());
}
