use crate::object::{ObjectData, ObjectKind, PromiseState, Reaction};
use crate::realm::Realm;
use crate::types::CallResult;
use crate::value::{ObjectId, Value};

pub(crate) type Job = Box<dyn FnOnce(&mut Realm)>;

impl Realm {
    pub fn new_promise(&mut self) -> ObjectId {
        let proto = self.promise_prototype();
        self.alloc(ObjectData::new(
            Some(proto),
            ObjectKind::Promise(PromiseState::Pending(Vec::new())),
        ))
    }

    pub fn resolved_promise(&mut self, value: impl Into<Value>) -> ObjectId {
        let promise = self.new_promise();
        self.resolve_promise(promise, value.into());
        promise
    }

    pub fn rejected_promise(&mut self, reason: impl Into<Value>) -> ObjectId {
        let promise = self.new_promise();
        self.reject_promise(promise, reason.into());
        promise
    }

    pub(crate) fn is_promise_id(&self, id: ObjectId) -> bool {
        self.object(id)
            .is_ok_and(|data| matches!(data.kind, ObjectKind::Promise(_)))
    }

    /// True only for native promise objects; a plain object exposing `then`
    /// does not count.
    pub fn is_promise(&self, value: &Value) -> bool {
        value.as_object().is_some_and(|id| self.is_promise_id(id))
    }

    /// `None` while pending.
    pub fn promise_result(&self, id: ObjectId) -> Option<CallResult> {
        match &self.object(id).ok()?.kind {
            ObjectKind::Promise(PromiseState::Settled(result)) => Some(result.clone()),
            _ => None,
        }
    }

    /// Resolving with another native promise adopts its eventual state.
    pub fn resolve_promise(&mut self, id: ObjectId, value: Value) {
        if let Some(inner) = value.as_object().filter(|inner| self.is_promise_id(*inner)) {
            if inner == id {
                let reason = self.new_error("chaining cycle detected for promise");
                self.settle(id, CallResult::Error(reason));
                return;
            }
            self.on_settled(
                inner,
                Box::new(move |realm: &mut Realm, result| realm.settle(id, result)),
            );
            return;
        }
        self.settle(id, CallResult::Ok(value));
    }

    pub fn reject_promise(&mut self, id: ObjectId, reason: Value) {
        self.settle(id, CallResult::Error(reason));
    }

    fn settle(&mut self, id: ObjectId, result: CallResult) {
        let Ok(data) = self.object_mut(id) else {
            return;
        };
        let reactions = match &mut data.kind {
            ObjectKind::Promise(state) if matches!(state, PromiseState::Pending(_)) => {
                match std::mem::replace(state, PromiseState::Settled(result.clone())) {
                    PromiseState::Pending(reactions) => reactions,
                    PromiseState::Settled(_) => Vec::new(),
                }
            }
            _ => return,
        };
        for reaction in reactions {
            let result = result.clone();
            self.enqueue_job(Box::new(move |realm: &mut Realm| reaction(realm, result)));
        }
    }

    /// Registers a reaction without touching the promise's observable
    /// properties. Already-settled promises schedule the reaction right away.
    pub(crate) fn on_settled(&mut self, id: ObjectId, reaction: Reaction) {
        let Ok(data) = self.object_mut(id) else {
            return;
        };
        match &mut data.kind {
            ObjectKind::Promise(PromiseState::Pending(reactions)) => reactions.push(reaction),
            ObjectKind::Promise(PromiseState::Settled(result)) => {
                let result = result.clone();
                self.enqueue_job(Box::new(move |realm: &mut Realm| reaction(realm, result)));
            }
            _ => {}
        }
    }

    /// `promise.then(on_fulfilled, on_rejected)`; non-callable handlers pass
    /// the settlement through.
    pub fn then(
        &mut self,
        id: ObjectId,
        on_fulfilled: Option<Value>,
        on_rejected: Option<Value>,
    ) -> ObjectId {
        let derived = self.new_promise();
        self.on_settled(
            id,
            Box::new(move |realm: &mut Realm, result: CallResult| {
                let handler = match &result {
                    CallResult::Ok(_) => on_fulfilled,
                    CallResult::Error(_) => on_rejected,
                }
                .filter(|handler| realm.is_callable(handler));
                let Some(handler) = handler else {
                    realm.settle(derived, result);
                    return;
                };
                let argument = result.value().clone();
                match realm.call(&handler, Value::Undefined, vec![argument]) {
                    Ok(value) => realm.resolve_promise(derived, value),
                    Err(err) => realm.reject_promise(derived, err.thrown_value()),
                }
            }),
        );
        derived
    }

    pub(crate) fn enqueue_job(&mut self, job: Job) {
        self.jobs.push_back(job);
    }

    pub fn pending_jobs(&self) -> usize {
        self.jobs.len()
    }

    /// Drains the job queue, including jobs scheduled while draining.
    pub fn run_jobs(&mut self) -> usize {
        let mut ran = 0;
        while let Some(job) = self.jobs.pop_front() {
            job(self);
            ran += 1;
        }
        ran
    }
}
