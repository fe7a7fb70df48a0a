//! Call-recording spies and member interception over an explicit object
//! realm.
//!
//! A [`Realm`] owns every object, function and promise of a test session
//! together with the registry of active interceptions. Spies are function
//! objects in that realm; application code under test reaches them through
//! ordinary property lookups and calls.
//!
//! ```
//! use callspy::{Realm, Value};
//!
//! let mut realm = Realm::new();
//! let obj = realm.new_object();
//! realm
//!     .define_method(obj, "method", 1, |_, inv| Ok(Value::from(format!("{}!", inv.arg(0)))))
//!     .unwrap();
//! let target = Value::Object(obj);
//!
//! let spy = realm.spy_on(&target, "method", None).unwrap();
//! let result = realm.call_method(&target, "method", vec![Value::from("a")]).unwrap();
//! assert_eq!(result, Value::from("a!"));
//! assert_eq!(spy.calls(), vec![vec![Value::from("a")]]);
//!
//! realm.restore_all();
//! let restored = realm.get(&target, "method").unwrap();
//! assert!(realm.spy_of(&restored).is_none());
//! ```

pub mod config;
pub mod errors;
pub mod interceptor;
pub mod log_retention;
pub mod logging;
pub mod object;
pub mod promise;
pub mod realm;
pub mod registry;
pub mod snapshot;
pub mod spy;
pub mod types;
pub mod value;

pub use config::{load_config, parse_config, SpyConfig};
pub use errors::SpyError;
pub use interceptor::{spy_on, MemberSpy};
pub use object::{Invocation, PropertyDescriptor, Slot};
pub use realm::{ClassSpec, Realm};
pub use snapshot::{ResultRecord, SpySnapshot};
pub use spy::{create_spy, Spy};
pub use types::{AccessKind, CallResult, InstallSite, PropertyKey, Selector, ThenablePolicy};
pub use value::{ObjectId, SymbolId, Value};

/// Builds a spy in `realm`; shorthand for [`Realm::spy`].
pub fn spy(realm: &mut Realm, implementation: Option<Value>) -> Result<Spy, SpyError> {
    create_spy(realm, implementation)
}

/// Restores every active interception of `realm`.
pub fn restore_all(realm: &mut Realm) -> usize {
    realm.restore_all()
}
