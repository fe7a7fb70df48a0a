use crate::errors::SpyError;
use crate::realm::Realm;
use crate::spy::SpyState;
use crate::types::{CallResult, PropertyKey};
use crate::value::{ObjectId, Value};
use std::cell::RefCell;
use std::collections::BTreeMap;
use std::rc::Rc;

#[derive(Debug, Clone, PartialEq)]
pub enum Slot {
    Data { value: Value, writable: bool },
    Accessor {
        get: Option<ObjectId>,
        set: Option<ObjectId>,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub struct PropertyDescriptor {
    pub slot: Slot,
    pub enumerable: bool,
    pub configurable: bool,
}

impl PropertyDescriptor {
    /// Writable, enumerable, configurable data property.
    pub fn data(value: impl Into<Value>) -> Self {
        Self {
            slot: Slot::Data {
                value: value.into(),
                writable: true,
            },
            enumerable: true,
            configurable: true,
        }
    }

    /// Non-writable, non-enumerable, configurable data property, the shape
    /// of a function's `length` and `name`.
    pub fn hidden(value: impl Into<Value>) -> Self {
        Self {
            slot: Slot::Data {
                value: value.into(),
                writable: false,
            },
            enumerable: false,
            configurable: true,
        }
    }

    pub fn accessor(get: Option<ObjectId>, set: Option<ObjectId>) -> Self {
        Self {
            slot: Slot::Accessor { get, set },
            enumerable: true,
            configurable: true,
        }
    }

    pub fn with_enumerable(mut self, enumerable: bool) -> Self {
        self.enumerable = enumerable;
        self
    }

    pub fn with_configurable(mut self, configurable: bool) -> Self {
        self.configurable = configurable;
        self
    }

    pub fn with_writable(mut self, writable: bool) -> Self {
        if let Slot::Data { writable: w, .. } = &mut self.slot {
            *w = writable;
        }
        self
    }

    pub fn value(&self) -> Option<&Value> {
        match &self.slot {
            Slot::Data { value, .. } => Some(value),
            Slot::Accessor { .. } => None,
        }
    }

    pub fn getter(&self) -> Option<ObjectId> {
        match &self.slot {
            Slot::Accessor { get, .. } => *get,
            Slot::Data { .. } => None,
        }
    }

    pub fn setter(&self) -> Option<ObjectId> {
        match &self.slot {
            Slot::Accessor { set, .. } => *set,
            Slot::Data { .. } => None,
        }
    }

    pub fn is_accessor(&self) -> bool {
        matches!(self.slot, Slot::Accessor { .. })
    }

    pub fn writable(&self) -> bool {
        matches!(self.slot, Slot::Data { writable: true, .. })
    }
}

/// Receiver, arguments and construction target of one call.
#[derive(Debug, Clone, Default)]
pub struct Invocation {
    pub this: Value,
    pub args: Vec<Value>,
    pub new_target: Option<ObjectId>,
}

impl Invocation {
    pub fn call(this: Value, args: Vec<Value>) -> Self {
        Self {
            this,
            args,
            new_target: None,
        }
    }

    pub fn arg(&self, index: usize) -> Value {
        self.args.get(index).cloned().unwrap_or_default()
    }

    pub fn is_construct(&self) -> bool {
        self.new_target.is_some()
    }
}

pub type NativeFn = Rc<dyn Fn(&mut Realm, Invocation) -> Result<Value, SpyError>>;

#[derive(Clone)]
pub(crate) enum Behavior {
    Native(NativeFn),
    Class {
        parent: Option<ObjectId>,
        init: Option<NativeFn>,
    },
    Bound {
        target: ObjectId,
        this: Value,
        args: Vec<Value>,
    },
    Spy(Rc<RefCell<SpyState>>),
}

#[derive(Clone)]
pub(crate) struct FunctionData {
    pub behavior: Behavior,
    pub constructable: bool,
}

pub(crate) type Reaction = Box<dyn FnOnce(&mut Realm, CallResult)>;

pub(crate) enum PromiseState {
    Pending(Vec<Reaction>),
    Settled(CallResult),
}

pub(crate) enum ObjectKind {
    Ordinary,
    Function(FunctionData),
    Promise(PromiseState),
}

pub(crate) struct ObjectData {
    /// Iterated in key order (strings, then indices, then symbols), not in
    /// definition order.
    pub properties: BTreeMap<PropertyKey, PropertyDescriptor>,
    pub prototype: Option<ObjectId>,
    pub kind: ObjectKind,
}

impl ObjectData {
    pub fn new(prototype: Option<ObjectId>, kind: ObjectKind) -> Self {
        Self {
            properties: BTreeMap::new(),
            prototype,
            kind,
        }
    }

    pub fn function(&self) -> Option<&FunctionData> {
        match &self.kind {
            ObjectKind::Function(data) => Some(data),
            _ => None,
        }
    }
}
