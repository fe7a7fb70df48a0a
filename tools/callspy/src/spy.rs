use crate::errors::SpyError;
use crate::interceptor::Interception;
use crate::object::{Behavior, Invocation, PropertyDescriptor};
use crate::realm::Realm;
use crate::types::{CallResult, PropertyKey, ThenablePolicy};
use crate::value::{ObjectId, Value};
use serde_json::json;
use std::cell::RefCell;
use std::collections::{BTreeMap, HashSet, VecDeque};
use std::fmt;
use std::rc::{Rc, Weak};

const PASSTHROUGH_IGNORED: [&str; 3] = ["length", "name", "prototype"];

pub struct SpyState {
    called: bool,
    call_count: usize,
    calls: Vec<Vec<Value>>,
    /// `None` while the matching call is still running.
    results: Vec<Option<CallResult>>,
    pending: VecDeque<CallResult>,
    async_results: BTreeMap<usize, CallResult>,
    implementation: Option<ObjectId>,
    name: String,
    length: u32,
    epoch: u64,
    pub(crate) interception: Weak<Interception>,
}

impl SpyState {
    fn new(implementation: Option<ObjectId>, name: String, length: u32) -> Self {
        Self {
            called: false,
            call_count: 0,
            calls: Vec::new(),
            results: Vec::new(),
            pending: VecDeque::new(),
            async_results: BTreeMap::new(),
            implementation,
            name,
            length,
            epoch: 0,
            interception: Weak::new(),
        }
    }

    fn reset(&mut self) {
        self.called = false;
        self.call_count = 0;
        self.calls.clear();
        self.results.clear();
        self.pending.clear();
        self.async_results.clear();
        self.epoch += 1;
    }
}

/// Handle on a spy wrapper and its recorded state.
#[derive(Clone)]
pub struct Spy {
    function: ObjectId,
    state: Rc<RefCell<SpyState>>,
}

impl fmt::Debug for Spy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.state.borrow();
        f.debug_struct("Spy")
            .field("function", &self.function)
            .field("name", &state.name)
            .field("call_count", &state.call_count)
            .finish()
    }
}

impl Spy {
    pub(crate) fn from_parts(function: ObjectId, state: Rc<RefCell<SpyState>>) -> Self {
        Self { function, state }
    }

    pub(crate) fn state(&self) -> &Rc<RefCell<SpyState>> {
        &self.state
    }

    pub fn function(&self) -> ObjectId {
        self.function
    }

    pub fn value(&self) -> Value {
        Value::Object(self.function)
    }

    pub fn name(&self) -> String {
        self.state.borrow().name.clone()
    }

    pub fn length(&self) -> u32 {
        self.state.borrow().length
    }

    pub fn called(&self) -> bool {
        self.state.borrow().called
    }

    pub fn call_count(&self) -> usize {
        self.state.borrow().call_count
    }

    pub fn calls(&self) -> Vec<Vec<Value>> {
        self.state.borrow().calls.clone()
    }

    /// Completed results in call order.
    pub fn results(&self) -> Vec<CallResult> {
        self.state.borrow().results.iter().flatten().cloned().collect()
    }

    /// Return values paired positionally with `results`; error slots hold
    /// `Undefined`.
    pub fn returns(&self) -> Vec<Value> {
        self.state
            .borrow()
            .results
            .iter()
            .flatten()
            .map(|result| result.ok_value().cloned().unwrap_or_default())
            .collect()
    }

    /// Settlements of promise returns, keyed by call index.
    pub fn async_results(&self) -> BTreeMap<usize, CallResult> {
        self.state.borrow().async_results.clone()
    }

    /// Fulfilled values paired positionally with `calls`; unsettled,
    /// rejected and non-promise slots hold `Undefined`.
    pub fn resolves(&self) -> Vec<Value> {
        let state = self.state.borrow();
        (0..state.calls.len())
            .map(|index| {
                state
                    .async_results
                    .get(&index)
                    .and_then(CallResult::ok_value)
                    .cloned()
                    .unwrap_or_default()
            })
            .collect()
    }

    pub fn implementation(&self) -> Option<ObjectId> {
        self.state.borrow().implementation
    }

    pub fn pending_overrides(&self) -> usize {
        self.state.borrow().pending.len()
    }

    /// Queues a one-shot return value for the next unconsumed call.
    pub fn next_result(&self, value: impl Into<Value>) -> &Self {
        self.state
            .borrow_mut()
            .pending
            .push_back(CallResult::Ok(value.into()));
        self
    }

    /// Queues a one-shot thrown value for the next unconsumed call.
    pub fn next_error(&self, error: impl Into<Value>) -> &Self {
        self.state
            .borrow_mut()
            .pending
            .push_back(CallResult::Error(error.into()));
        self
    }

    pub fn reset(&self) {
        self.state.borrow_mut().reset();
    }

    pub(crate) fn set_implementation(&self, implementation: Option<ObjectId>) {
        self.state.borrow_mut().implementation = implementation;
    }

    pub fn same_spy(&self, other: &Spy) -> bool {
        Rc::ptr_eq(&self.state, &other.state)
    }
}

/// Builds a spy around an optional implementation.
pub fn create_spy(realm: &mut Realm, implementation: Option<Value>) -> Result<Spy, SpyError> {
    spawn(realm, implementation, None)
}

/// `labelled_by` supplies name, arity, statics and prototype link when the
/// implementation itself is a derived callable such as a bound function.
pub(crate) fn spawn(
    realm: &mut Realm,
    implementation: Option<Value>,
    labelled_by: Option<ObjectId>,
) -> Result<Spy, SpyError> {
    let implementation = match implementation {
        None | Some(Value::Undefined) => None,
        Some(value) => Some(expect_callable(realm, &value)?),
    };
    let source = labelled_by.or(implementation);
    let name = source
        .map(|id| realm.function_name(id))
        .filter(|name| !name.is_empty())
        .unwrap_or_else(|| realm.config().spy.default_name.clone());
    let length = source.map(|id| realm.function_length(id)).unwrap_or(0);

    let state = Rc::new(RefCell::new(SpyState::new(implementation, name.clone(), length)));
    let function_prototype = realm.function_prototype();
    let object_prototype = realm.object_prototype();
    let function = realm.create_function_object(
        Behavior::Spy(Rc::clone(&state)),
        true,
        &name,
        length,
        function_prototype,
    );
    realm.attach_prototype_object(function, Some(object_prototype), false);
    if let Some(source) = source {
        link_prototype(realm, function, source)?;
        wrap(realm, function, source)?;
    }
    Ok(Spy { function, state })
}

pub(crate) fn expect_callable(realm: &Realm, value: &Value) -> Result<ObjectId, SpyError> {
    match value.as_object() {
        Some(id) if realm.is_callable(value) => Ok(id),
        _ => Err(SpyError::InvalidArgument(
            "cannot spy on a non-function value".to_string(),
        )),
    }
}

/// Makes the wrapper's `prototype` object inherit from `source.prototype`,
/// so instances built through the wrapper pass `instance_of` checks against
/// the wrapped callable.
pub(crate) fn link_prototype(
    realm: &mut Realm,
    wrapper: ObjectId,
    source: ObjectId,
) -> Result<(), SpyError> {
    let prototype_key = PropertyKey::from("prototype");
    let source_proto = realm
        .get_own_property(source, &prototype_key)
        .and_then(|desc| desc.value().and_then(Value::as_object));
    let wrapper_proto = realm
        .get_own_property(wrapper, &prototype_key)
        .and_then(|desc| desc.value().and_then(Value::as_object));
    match (wrapper_proto, source_proto) {
        (Some(wrapper_proto), Some(source_proto)) if wrapper_proto != source_proto => {
            realm.set_prototype_of(wrapper_proto, Some(source_proto))
        }
        _ => Ok(()),
    }
}

/// Copies the static surface of `original` (its own properties and those of
/// its static parents) onto the wrapper without overriding anything the
/// wrapper already exposes.
pub fn wrap(realm: &mut Realm, wrapper: ObjectId, original: ObjectId) -> Result<(), SpyError> {
    if realm.spy_of(&Value::Object(original)).is_some() {
        return Ok(());
    }
    let stop = [realm.function_prototype(), realm.object_prototype()];
    let mut seen = HashSet::new();
    let mut collected: Vec<(PropertyKey, PropertyDescriptor)> = Vec::new();
    let mut cursor = Some(original);
    while let Some(current) = cursor {
        if stop.contains(&current) {
            break;
        }
        for key in realm.own_keys(current) {
            if is_ignored(&key) || !seen.insert(key.clone()) {
                continue;
            }
            if let Some(desc) = realm.get_own_property(current, &key) {
                collected.push((key, desc));
            }
        }
        cursor = realm.get_prototype_of(current);
    }
    for (key, desc) in collected {
        if realm.has_property(wrapper, &key) {
            continue;
        }
        realm.install_property(wrapper, key, desc)?;
    }
    Ok(())
}

fn is_ignored(key: &PropertyKey) -> bool {
    matches!(key, PropertyKey::String(name) if PASSTHROUGH_IGNORED.contains(&name.as_str()))
}

pub(crate) fn invoke(
    realm: &mut Realm,
    state: &Rc<RefCell<SpyState>>,
    invocation: Invocation,
) -> Result<Value, SpyError> {
    let (index, epoch, forced, implementation) = {
        let mut state = state.borrow_mut();
        state.called = true;
        state.call_count += 1;
        state.calls.push(invocation.args.clone());
        let index = state.calls.len() - 1;
        let forced = state.pending.pop_front();
        state.results.push(forced.clone());
        (index, state.epoch, forced, state.implementation)
    };
    if let Some(forced) = forced {
        return forced.into_outcome();
    }

    let outcome = match implementation {
        None => Ok(Value::Undefined),
        Some(implementation) => {
            let callee = Value::Object(implementation);
            match invocation.new_target {
                Some(new_target) => realm.construct(&callee, invocation.args, Some(new_target)),
                None => realm.call(&callee, invocation.this, invocation.args),
            }
        }
    };

    match outcome {
        Err(err) => {
            complete(state, index, epoch, CallResult::Error(err.thrown_value()));
            Err(err)
        }
        Ok(value) => {
            complete(state, index, epoch, CallResult::Ok(value.clone()));
            track_settlement(realm, state, index, &value);
            Ok(value)
        }
    }
}

fn complete(state: &Rc<RefCell<SpyState>>, index: usize, epoch: u64, result: CallResult) {
    let mut state = state.borrow_mut();
    if state.epoch != epoch {
        return;
    }
    if let Some(slot) = state.results.get_mut(index) {
        *slot = Some(result);
    }
}

fn track_settlement(
    realm: &mut Realm,
    state: &Rc<RefCell<SpyState>>,
    index: usize,
    value: &Value,
) {
    let Some(id) = value.as_object() else {
        return;
    };
    let weak = Rc::downgrade(state);
    if realm.is_promise(value) {
        realm.on_settled(
            id,
            Box::new(move |_: &mut Realm, settlement| record_settlement(&weak, index, settlement)),
        );
        return;
    }
    if realm.config().promises.thenable_policy != ThenablePolicy::DuckTyped {
        return;
    }
    let Ok(then) = realm.get(value, "then") else {
        return;
    };
    if !realm.is_callable(&then) {
        return;
    }
    let fulfilled_weak = weak.clone();
    let on_fulfilled = realm.create_function("", 1, move |_, inv| {
        record_settlement(&fulfilled_weak, index, CallResult::Ok(inv.arg(0)));
        Ok(Value::Undefined)
    });
    let on_rejected = realm.create_function("", 1, move |_, inv| {
        record_settlement(&weak, index, CallResult::Error(inv.arg(0)));
        Ok(Value::Undefined)
    });
    if let Err(err) = realm.call(
        &then,
        value.clone(),
        vec![Value::Object(on_fulfilled), Value::Object(on_rejected)],
    ) {
        let spy = state.borrow().name.clone();
        realm.log(
            "warn",
            "spy.thenable_failed",
            json!({ "spy": spy, "call_index": index, "error": err.to_string() }),
        );
    }
}

fn record_settlement(state: &Weak<RefCell<SpyState>>, index: usize, settlement: CallResult) {
    if let Some(state) = state.upgrade() {
        state
            .borrow_mut()
            .async_results
            .entry(index)
            .or_insert(settlement);
    }
}

impl Realm {
    pub fn spy(&mut self, implementation: Option<Value>) -> Result<Spy, SpyError> {
        create_spy(self, implementation)
    }
}
