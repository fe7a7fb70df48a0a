use crate::config::{validate_config, SpyConfig};
use crate::errors::SpyError;
use crate::logging::{JsonlLogger, LogEvent};
use crate::object::{
    Behavior, FunctionData, Invocation, NativeFn, ObjectData, ObjectKind, PromiseState,
    PropertyDescriptor, Slot,
};
use crate::promise::Job;
use crate::registry::Registry;
use crate::spy::{self, Spy};
use crate::types::PropertyKey;
use crate::value::{format_number, ObjectId, SymbolId, Value};
use std::collections::{HashSet, VecDeque};
use std::rc::Rc;

const DESCRIBE_DEPTH: usize = 2;

/// Declaration of a class constructor.
pub struct ClassSpec {
    pub name: String,
    pub arity: u32,
    pub extends: Option<ObjectId>,
    pub init: Option<NativeFn>,
}

impl ClassSpec {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            arity: 0,
            extends: None,
            init: None,
        }
    }

    pub fn arity(mut self, arity: u32) -> Self {
        self.arity = arity;
        self
    }

    pub fn extends(mut self, parent: ObjectId) -> Self {
        self.extends = Some(parent);
        self
    }

    /// Body run with `this` bound to the instance after any parent
    /// constructor has produced it.
    pub fn init<F>(mut self, init: F) -> Self
    where
        F: Fn(&mut Realm, Invocation) -> Result<Value, SpyError> + 'static,
    {
        self.init = Some(Rc::new(init));
        self
    }
}

/// Object arena, job queue and interception registry for one test session.
pub struct Realm {
    objects: Vec<ObjectData>,
    symbols: Vec<String>,
    object_prototype: ObjectId,
    function_prototype: ObjectId,
    promise_prototype: ObjectId,
    error_prototype: ObjectId,
    pub(crate) jobs: VecDeque<Job>,
    pub(crate) registry: Registry,
    config: SpyConfig,
    logger: Option<JsonlLogger>,
}

impl Realm {
    pub fn new() -> Self {
        Self::bootstrap(SpyConfig::default(), None)
    }

    pub fn with_config(config: SpyConfig) -> Result<Self, SpyError> {
        validate_config(&config)?;
        let logger = config.logging.path.as_ref().map(|path| {
            let mut logger = JsonlLogger::new(path);
            logger.max_payload_bytes = config.logging.max_payload_bytes;
            logger.budget_bytes = config.logging.budget_bytes;
            logger
        });
        Ok(Self::bootstrap(config, logger))
    }

    fn bootstrap(config: SpyConfig, logger: Option<JsonlLogger>) -> Self {
        let mut realm = Self {
            objects: Vec::new(),
            symbols: Vec::new(),
            object_prototype: ObjectId(0),
            function_prototype: ObjectId(0),
            promise_prototype: ObjectId(0),
            error_prototype: ObjectId(0),
            jobs: VecDeque::new(),
            registry: Registry::default(),
            config,
            logger,
        };
        let object_prototype = realm.alloc(ObjectData::new(None, ObjectKind::Ordinary));
        realm.object_prototype = object_prototype;
        realm.function_prototype = realm.create_object(Some(object_prototype));
        realm.promise_prototype = realm.create_object(Some(object_prototype));
        realm.error_prototype = realm.create_object(Some(object_prototype));

        let error_prototype = realm.error_prototype;
        realm.put(error_prototype, "name", PropertyDescriptor::hidden("Error").with_writable(true));
        realm.put(error_prototype, "message", PropertyDescriptor::hidden("").with_writable(true));

        let then = realm.create_function("then", 2, |realm, inv| {
            let Some(promise) = inv.this.as_object().filter(|id| realm.is_promise_id(*id)) else {
                return Err(SpyError::TypeError(
                    "Promise.prototype.then called on a non-promise".to_string(),
                ));
            };
            let derived = realm.then(promise, Some(inv.arg(0)), Some(inv.arg(1)));
            Ok(Value::Object(derived))
        });
        let promise_prototype = realm.promise_prototype;
        realm.put(
            promise_prototype,
            "then",
            PropertyDescriptor::hidden(then).with_writable(true),
        );
        realm
    }

    pub fn config(&self) -> &SpyConfig {
        &self.config
    }

    pub fn object_prototype(&self) -> ObjectId {
        self.object_prototype
    }

    pub fn function_prototype(&self) -> ObjectId {
        self.function_prototype
    }

    pub fn promise_prototype(&self) -> ObjectId {
        self.promise_prototype
    }

    pub(crate) fn log(&self, level: &str, event_type: &str, payload: serde_json::Value) {
        if let Some(logger) = &self.logger {
            let _ = logger.append(&LogEvent {
                level,
                event_type,
                payload,
            });
        }
    }

    // ── Arena ─────────────────────────────────────────────────────────────────

    pub(crate) fn alloc(&mut self, data: ObjectData) -> ObjectId {
        let id = ObjectId(self.objects.len() as u32);
        self.objects.push(data);
        id
    }

    pub(crate) fn object(&self, id: ObjectId) -> Result<&ObjectData, SpyError> {
        self.objects
            .get(id.index())
            .ok_or_else(|| SpyError::TypeError(format!("unknown object #{}", id.0)))
    }

    pub(crate) fn object_mut(&mut self, id: ObjectId) -> Result<&mut ObjectData, SpyError> {
        self.objects
            .get_mut(id.index())
            .ok_or_else(|| SpyError::TypeError(format!("unknown object #{}", id.0)))
    }

    /// Writes a descriptor on an object the realm just created.
    fn put(&mut self, id: ObjectId, key: impl Into<PropertyKey>, desc: PropertyDescriptor) {
        if let Some(data) = self.objects.get_mut(id.index()) {
            data.properties.insert(key.into(), desc);
        }
    }

    pub fn create_object(&mut self, prototype: Option<ObjectId>) -> ObjectId {
        self.alloc(ObjectData::new(prototype, ObjectKind::Ordinary))
    }

    pub fn new_object(&mut self) -> ObjectId {
        let proto = self.object_prototype;
        self.create_object(Some(proto))
    }

    pub fn new_error(&mut self, message: &str) -> Value {
        let proto = self.error_prototype;
        let error = self.create_object(Some(proto));
        self.put(
            error,
            "message",
            PropertyDescriptor::hidden(message).with_writable(true),
        );
        Value::Object(error)
    }

    pub fn symbol(&mut self, description: &str) -> SymbolId {
        let id = SymbolId(self.symbols.len() as u32);
        self.symbols.push(description.to_string());
        id
    }

    pub fn symbol_description(&self, id: SymbolId) -> Option<&str> {
        self.symbols.get(id.0 as usize).map(String::as_str)
    }

    pub fn key_label(&self, key: &PropertyKey) -> String {
        match key {
            PropertyKey::Symbol(id) => {
                format!("Symbol({})", self.symbol_description(*id).unwrap_or_default())
            }
            other => other.to_string(),
        }
    }

    // ── Prototype chain ───────────────────────────────────────────────────────

    pub fn get_prototype_of(&self, id: ObjectId) -> Option<ObjectId> {
        self.objects.get(id.index()).and_then(|data| data.prototype)
    }

    pub fn set_prototype_of(
        &mut self,
        id: ObjectId,
        prototype: Option<ObjectId>,
    ) -> Result<(), SpyError> {
        let mut cursor = prototype;
        while let Some(ancestor) = cursor {
            if ancestor == id {
                return Err(SpyError::TypeError("cyclic prototype chain".to_string()));
            }
            cursor = self.get_prototype_of(ancestor);
        }
        self.object_mut(id)?.prototype = prototype;
        Ok(())
    }

    pub fn get_own_property(&self, id: ObjectId, key: &PropertyKey) -> Option<PropertyDescriptor> {
        self.objects
            .get(id.index())
            .and_then(|data| data.properties.get(key).cloned())
    }

    /// Own descriptor first, then each ancestor; returns the descriptor and
    /// the object it lives on.
    pub fn find_property(
        &self,
        id: ObjectId,
        key: &PropertyKey,
    ) -> Option<(PropertyDescriptor, ObjectId)> {
        let mut cursor = Some(id);
        while let Some(current) = cursor {
            let data = self.objects.get(current.index())?;
            if let Some(desc) = data.properties.get(key) {
                return Some((desc.clone(), current));
            }
            cursor = data.prototype;
        }
        None
    }

    pub fn has_property(&self, id: ObjectId, key: &PropertyKey) -> bool {
        self.find_property(id, key).is_some()
    }

    pub fn own_keys(&self, id: ObjectId) -> Vec<PropertyKey> {
        self.objects
            .get(id.index())
            .map(|data| data.properties.keys().cloned().collect())
            .unwrap_or_default()
    }

    // ── Property definition ───────────────────────────────────────────────────

    pub fn define_property(
        &mut self,
        id: ObjectId,
        key: impl Into<PropertyKey>,
        desc: PropertyDescriptor,
    ) -> Result<(), SpyError> {
        let key = key.into();
        if let Some(current) = self.get_own_property(id, &key) {
            if !current.configurable && current != desc {
                return Err(SpyError::NotConfigurable(format!(
                    "cannot redefine property: {}",
                    self.key_label(&key)
                )));
            }
        }
        self.install_property(id, key, desc)
    }

    /// Writes a descriptor without the configurability check.
    pub(crate) fn install_property(
        &mut self,
        id: ObjectId,
        key: PropertyKey,
        desc: PropertyDescriptor,
    ) -> Result<(), SpyError> {
        self.object_mut(id)?.properties.insert(key, desc);
        Ok(())
    }

    pub(crate) fn remove_property(
        &mut self,
        id: ObjectId,
        key: &PropertyKey,
    ) -> Result<Option<PropertyDescriptor>, SpyError> {
        Ok(self.object_mut(id)?.properties.remove(key))
    }

    pub fn delete_property(&mut self, id: ObjectId, key: &PropertyKey) -> Result<bool, SpyError> {
        match self.get_own_property(id, key) {
            None => Ok(false),
            Some(desc) if !desc.configurable => Err(SpyError::NotConfigurable(format!(
                "cannot delete property: {}",
                self.key_label(key)
            ))),
            Some(_) => {
                self.remove_property(id, key)?;
                Ok(true)
            }
        }
    }

    pub fn define_value(
        &mut self,
        id: ObjectId,
        key: impl Into<PropertyKey>,
        value: impl Into<Value>,
    ) -> Result<(), SpyError> {
        self.define_property(id, key, PropertyDescriptor::data(value))
    }

    /// Defines an object-literal style method and returns the function.
    pub fn define_method<F>(
        &mut self,
        id: ObjectId,
        key: impl Into<PropertyKey>,
        arity: u32,
        body: F,
    ) -> Result<ObjectId, SpyError>
    where
        F: Fn(&mut Realm, Invocation) -> Result<Value, SpyError> + 'static,
    {
        let key = key.into();
        let name = self.key_label(&key);
        let method = self.create_function(&name, arity, body);
        self.define_property(id, key, PropertyDescriptor::data(method))?;
        Ok(method)
    }

    pub fn define_getter<F>(
        &mut self,
        id: ObjectId,
        key: impl Into<PropertyKey>,
        body: F,
    ) -> Result<ObjectId, SpyError>
    where
        F: Fn(&mut Realm, Invocation) -> Result<Value, SpyError> + 'static,
    {
        let key = key.into();
        let name = format!("get {}", self.key_label(&key));
        let getter = self.create_function(&name, 0, body);
        let set = self.get_own_property(id, &key).and_then(|d| d.setter());
        self.define_property(id, key, PropertyDescriptor::accessor(Some(getter), set))?;
        Ok(getter)
    }

    pub fn define_setter<F>(
        &mut self,
        id: ObjectId,
        key: impl Into<PropertyKey>,
        body: F,
    ) -> Result<ObjectId, SpyError>
    where
        F: Fn(&mut Realm, Invocation) -> Result<Value, SpyError> + 'static,
    {
        let key = key.into();
        let name = format!("set {}", self.key_label(&key));
        let setter = self.create_function(&name, 1, body);
        let get = self.get_own_property(id, &key).and_then(|d| d.getter());
        self.define_property(id, key, PropertyDescriptor::accessor(get, Some(setter)))?;
        Ok(setter)
    }

    // ── Property access ───────────────────────────────────────────────────────

    fn expect_object(&self, target: &Value, key: &PropertyKey) -> Result<ObjectId, SpyError> {
        target.as_object().ok_or_else(|| {
            SpyError::TypeError(format!(
                "cannot access property {} of {}",
                self.key_label(key),
                target.type_name()
            ))
        })
    }

    pub fn get(&mut self, target: &Value, key: impl Into<PropertyKey>) -> Result<Value, SpyError> {
        let key = key.into();
        let id = self.expect_object(target, &key)?;
        match self.find_property(id, &key) {
            None => Ok(Value::Undefined),
            Some((desc, _)) => match desc.slot {
                Slot::Data { value, .. } => Ok(value),
                Slot::Accessor {
                    get: Some(getter), ..
                } => self.call(&Value::Object(getter), target.clone(), Vec::new()),
                Slot::Accessor { get: None, .. } => Ok(Value::Undefined),
            },
        }
    }

    pub fn set(
        &mut self,
        target: &Value,
        key: impl Into<PropertyKey>,
        value: impl Into<Value>,
    ) -> Result<(), SpyError> {
        let key = key.into();
        let value = value.into();
        let id = self.expect_object(target, &key)?;
        let Some((desc, owner)) = self.find_property(id, &key) else {
            return self.install_property(id, key, PropertyDescriptor::data(value));
        };
        match desc.slot {
            Slot::Accessor {
                set: Some(setter), ..
            } => {
                self.call(&Value::Object(setter), target.clone(), vec![value])?;
                Ok(())
            }
            Slot::Accessor { set: None, .. } => Err(SpyError::TypeError(format!(
                "cannot set property {} which has only a getter",
                self.key_label(&key)
            ))),
            Slot::Data {
                writable: false, ..
            } => Err(SpyError::TypeError(format!(
                "cannot assign to read only property {}",
                self.key_label(&key)
            ))),
            Slot::Data { .. } if owner == id => {
                let updated = PropertyDescriptor {
                    slot: Slot::Data {
                        value,
                        writable: true,
                    },
                    ..desc
                };
                self.install_property(id, key, updated)
            }
            Slot::Data { .. } => self.install_property(id, key, PropertyDescriptor::data(value)),
        }
    }

    // ── Functions ─────────────────────────────────────────────────────────────

    pub(crate) fn function_data(&self, id: ObjectId) -> Option<FunctionData> {
        self.objects
            .get(id.index())
            .and_then(|data| data.function().cloned())
    }

    pub fn is_callable(&self, value: &Value) -> bool {
        value
            .as_object()
            .and_then(|id| self.objects.get(id.index()))
            .is_some_and(|data| data.function().is_some())
    }

    pub fn is_constructor(&self, value: &Value) -> bool {
        value
            .as_object()
            .and_then(|id| self.function_data(id))
            .is_some_and(|data| data.constructable)
    }

    fn callable_id(&self, value: &Value) -> Result<(ObjectId, FunctionData), SpyError> {
        value
            .as_object()
            .and_then(|id| self.function_data(id).map(|data| (id, data)))
            .ok_or_else(|| {
                SpyError::TypeError(format!("{} is not a function", self.describe(value)))
            })
    }

    pub(crate) fn create_function_object(
        &mut self,
        behavior: Behavior,
        constructable: bool,
        name: &str,
        arity: u32,
        prototype: ObjectId,
    ) -> ObjectId {
        let id = self.alloc(ObjectData::new(
            Some(prototype),
            ObjectKind::Function(FunctionData {
                behavior,
                constructable,
            }),
        ));
        self.put(id, "length", PropertyDescriptor::hidden(arity));
        self.put(id, "name", PropertyDescriptor::hidden(name));
        id
    }

    /// Gives a constructor its `prototype` object with a `constructor`
    /// back-link and returns that object.
    pub(crate) fn attach_prototype_object(
        &mut self,
        function: ObjectId,
        parent: Option<ObjectId>,
        locked: bool,
    ) -> ObjectId {
        let proto = self.create_object(parent);
        self.put(
            proto,
            "constructor",
            PropertyDescriptor::hidden(function).with_writable(true),
        );
        let slot = PropertyDescriptor::hidden(proto)
            .with_writable(!locked)
            .with_configurable(false);
        self.put(function, "prototype", slot);
        proto
    }

    /// A plain callable (arrow or method style); not constructable.
    pub fn create_function<F>(&mut self, name: &str, arity: u32, body: F) -> ObjectId
    where
        F: Fn(&mut Realm, Invocation) -> Result<Value, SpyError> + 'static,
    {
        let proto = self.function_prototype;
        self.create_function_object(Behavior::Native(Rc::new(body)), false, name, arity, proto)
    }

    /// A `function`-style constructor: callable and constructable.
    pub fn create_constructor<F>(&mut self, name: &str, arity: u32, body: F) -> ObjectId
    where
        F: Fn(&mut Realm, Invocation) -> Result<Value, SpyError> + 'static,
    {
        let proto = self.function_prototype;
        let object_prototype = self.object_prototype;
        let id =
            self.create_function_object(Behavior::Native(Rc::new(body)), true, name, arity, proto);
        self.attach_prototype_object(id, Some(object_prototype), false);
        id
    }

    pub fn create_class(&mut self, spec: ClassSpec) -> Result<ObjectId, SpyError> {
        let (static_parent, instance_parent) = match spec.extends {
            Some(parent) => {
                if !self.is_constructor(&Value::Object(parent)) {
                    return Err(SpyError::TypeError(
                        "class extends value is not a constructor".to_string(),
                    ));
                }
                let parent_proto = match self.get(&Value::Object(parent), "prototype")? {
                    Value::Object(proto) => Some(proto),
                    Value::Null => None,
                    _ => {
                        return Err(SpyError::TypeError(
                            "class extends value has an invalid prototype".to_string(),
                        ))
                    }
                };
                (parent, parent_proto)
            }
            None => (self.function_prototype, Some(self.object_prototype)),
        };
        let id = self.create_function_object(
            Behavior::Class {
                parent: spec.extends,
                init: spec.init,
            },
            true,
            &spec.name,
            spec.arity,
            static_parent,
        );
        self.attach_prototype_object(id, instance_parent, true);
        Ok(id)
    }

    pub fn bind(
        &mut self,
        target: ObjectId,
        this: Value,
        args: Vec<Value>,
    ) -> Result<ObjectId, SpyError> {
        let (_, data) = self.callable_id(&Value::Object(target))?;
        let name = format!("bound {}", self.function_name(target));
        let arity = self.function_length(target).saturating_sub(args.len() as u32);
        let proto = self
            .get_prototype_of(target)
            .unwrap_or(self.function_prototype);
        Ok(self.create_function_object(
            Behavior::Bound { target, this, args },
            data.constructable,
            &name,
            arity,
            proto,
        ))
    }

    pub fn function_name(&self, id: ObjectId) -> String {
        self.get_own_property(id, &PropertyKey::from("name"))
            .and_then(|desc| desc.value().and_then(|v| v.as_str().map(str::to_string)))
            .unwrap_or_default()
    }

    pub fn function_length(&self, id: ObjectId) -> u32 {
        self.get_own_property(id, &PropertyKey::from("length"))
            .and_then(|desc| desc.value().and_then(Value::as_number))
            .map(|n| n.max(0.0) as u32)
            .unwrap_or(0)
    }

    pub fn spy_of(&self, value: &Value) -> Option<Spy> {
        let id = value.as_object()?;
        match self.function_data(id)?.behavior {
            Behavior::Spy(state) => Some(Spy::from_parts(id, state)),
            _ => None,
        }
    }

    // ── Calls ─────────────────────────────────────────────────────────────────

    pub fn call(
        &mut self,
        callee: &Value,
        this: Value,
        args: Vec<Value>,
    ) -> Result<Value, SpyError> {
        let (id, data) = self.callable_id(callee)?;
        match data.behavior {
            Behavior::Native(body) => body(self, Invocation::call(this, args)),
            Behavior::Class { .. } => Err(SpyError::TypeError(format!(
                "class constructor {} cannot be invoked without 'new'",
                self.function_name(id)
            ))),
            Behavior::Bound {
                target,
                this: bound_this,
                args: bound_args,
            } => {
                let mut full = bound_args;
                full.extend(args);
                self.call(&Value::Object(target), bound_this, full)
            }
            Behavior::Spy(state) => spy::invoke(self, &state, Invocation::call(this, args)),
        }
    }

    pub fn call_method(
        &mut self,
        target: &Value,
        key: impl Into<PropertyKey>,
        args: Vec<Value>,
    ) -> Result<Value, SpyError> {
        let callee = self.get(target, key)?;
        self.call(&callee, target.clone(), args)
    }

    /// `new callee(...args)`; `new_target` defaults to `callee`.
    pub fn construct(
        &mut self,
        callee: &Value,
        args: Vec<Value>,
        new_target: Option<ObjectId>,
    ) -> Result<Value, SpyError> {
        let (id, data) = self.callable_id(callee)?;
        if !data.constructable {
            return Err(SpyError::TypeError(format!(
                "{} is not a constructor",
                self.describe(callee)
            )));
        }
        let new_target = new_target.unwrap_or(id);
        match data.behavior {
            Behavior::Native(body) => {
                let this = self.instance_for(new_target)?;
                let result = body(
                    self,
                    Invocation {
                        this: this.clone(),
                        args,
                        new_target: Some(new_target),
                    },
                )?;
                Ok(if result.is_object() { result } else { this })
            }
            Behavior::Class { parent, init } => {
                let this = match parent {
                    Some(parent) => {
                        self.construct(&Value::Object(parent), args.clone(), Some(new_target))?
                    }
                    None => self.instance_for(new_target)?,
                };
                if let Some(init) = init {
                    let result = init(
                        self,
                        Invocation {
                            this: this.clone(),
                            args,
                            new_target: Some(new_target),
                        },
                    )?;
                    if result.is_object() {
                        return Ok(result);
                    }
                }
                Ok(this)
            }
            Behavior::Bound {
                target,
                args: bound_args,
                ..
            } => {
                let mut full = bound_args;
                full.extend(args);
                let forwarded = if new_target == id { target } else { new_target };
                self.construct(&Value::Object(target), full, Some(forwarded))
            }
            Behavior::Spy(state) => {
                let this = self.instance_for(new_target)?;
                let result = spy::invoke(
                    self,
                    &state,
                    Invocation {
                        this: this.clone(),
                        args,
                        new_target: Some(new_target),
                    },
                )?;
                Ok(if result.is_object() { result } else { this })
            }
        }
    }

    fn instance_for(&mut self, new_target: ObjectId) -> Result<Value, SpyError> {
        let proto = match self.get(&Value::Object(new_target), "prototype")? {
            Value::Object(proto) => proto,
            _ => self.object_prototype,
        };
        Ok(Value::Object(self.create_object(Some(proto))))
    }

    pub fn instance_of(&mut self, value: &Value, constructor: &Value) -> Result<bool, SpyError> {
        let (id, data) = self.callable_id(constructor)?;
        if let Behavior::Bound { target, .. } = data.behavior {
            return self.instance_of(value, &Value::Object(target));
        }
        let Value::Object(proto) = self.get(&Value::Object(id), "prototype")? else {
            return Err(SpyError::TypeError(
                "constructor has no prototype object".to_string(),
            ));
        };
        let Some(object) = value.as_object() else {
            return Ok(false);
        };
        let mut cursor = self.get_prototype_of(object);
        while let Some(current) = cursor {
            if current == proto {
                return Ok(true);
            }
            cursor = self.get_prototype_of(current);
        }
        Ok(false)
    }

    // ── Rendering ─────────────────────────────────────────────────────────────

    /// Human-readable rendering that never runs getters.
    pub fn describe(&self, value: &Value) -> String {
        let mut seen = HashSet::new();
        self.describe_inner(value, DESCRIBE_DEPTH, &mut seen)
    }

    fn describe_inner(&self, value: &Value, depth: usize, seen: &mut HashSet<ObjectId>) -> String {
        match value {
            Value::String(text) => serde_json::Value::String(text.clone()).to_string(),
            Value::Number(n) => format_number(*n),
            Value::Symbol(id) => {
                format!("Symbol({})", self.symbol_description(*id).unwrap_or_default())
            }
            Value::Object(id) => self.describe_object(*id, depth, seen),
            other => other.to_string(),
        }
    }

    fn describe_object(&self, id: ObjectId, depth: usize, seen: &mut HashSet<ObjectId>) -> String {
        let Some(data) = self.objects.get(id.index()) else {
            return format!("[object #{}]", id.0);
        };
        match &data.kind {
            ObjectKind::Function(function) => {
                let name = self.function_name(id);
                let label = if name.is_empty() { "(anonymous)" } else { &name };
                match function.behavior {
                    Behavior::Class { .. } => format!("[class {label}]"),
                    _ => format!("[Function: {label}]"),
                }
            }
            ObjectKind::Promise(PromiseState::Pending(_)) => "Promise { <pending> }".to_string(),
            ObjectKind::Promise(PromiseState::Settled(result)) => {
                let inner = self.describe_inner(result.value(), depth.saturating_sub(1), seen);
                if result.is_ok() {
                    format!("Promise {{ {inner} }}")
                } else {
                    format!("Promise {{ <rejected> {inner} }}")
                }
            }
            ObjectKind::Ordinary if self.inherits_from(id, self.error_prototype) => {
                let message = data
                    .properties
                    .get(&PropertyKey::from("message"))
                    .and_then(|desc| desc.value().cloned())
                    .unwrap_or_default();
                format!("Error: {message}")
            }
            ObjectKind::Ordinary => {
                if depth == 0 || !seen.insert(id) {
                    return "[Object]".to_string();
                }
                let fields = data
                    .properties
                    .iter()
                    .filter(|(_, desc)| desc.enumerable)
                    .map(|(key, desc)| {
                        let rendered = match &desc.slot {
                            Slot::Data { value, .. } => {
                                self.describe_inner(value, depth - 1, seen)
                            }
                            Slot::Accessor { get, set } => match (get, set) {
                                (Some(_), Some(_)) => "[Getter/Setter]".to_string(),
                                (Some(_), None) => "[Getter]".to_string(),
                                _ => "[Setter]".to_string(),
                            },
                        };
                        format!("{}: {rendered}", self.key_label(key))
                    })
                    .collect::<Vec<_>>();
                seen.remove(&id);
                if fields.is_empty() {
                    "{}".to_string()
                } else {
                    format!("{{ {} }}", fields.join(", "))
                }
            }
        }
    }

    fn inherits_from(&self, id: ObjectId, ancestor: ObjectId) -> bool {
        let mut cursor = self.get_prototype_of(id);
        while let Some(current) = cursor {
            if current == ancestor {
                return true;
            }
            cursor = self.get_prototype_of(current);
        }
        false
    }
}

impl Default for Realm {
    fn default() -> Self {
        Self::new()
    }
}
