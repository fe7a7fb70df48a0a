use crate::realm::Realm;
use crate::spy::Spy;
use crate::types::CallResult;
use crate::value::Value;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpySnapshot {
    pub name: String,
    pub length: u32,
    pub called: bool,
    pub call_count: usize,
    pub calls: Vec<Vec<String>>,
    pub results: Vec<ResultRecord>,
    pub async_results: BTreeMap<usize, ResultRecord>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResultRecord {
    /// `ok` or `error`.
    pub kind: String,
    /// Rendered value, or `<hash:sha256:XXXXXXXXXXXXXXXX>` when truncated.
    pub value: String,
    #[serde(default)]
    pub value_truncated: bool,
}

impl Spy {
    pub fn snapshot(&self, realm: &Realm) -> SpySnapshot {
        let limit = realm.config().snapshot.max_value_bytes;
        let render = |value: &Value| render_value(realm, value, limit).0;
        let record = |result: &CallResult| {
            let (value, value_truncated) = render_value(realm, result.value(), limit);
            ResultRecord {
                kind: result.kind().to_string(),
                value,
                value_truncated,
            }
        };
        SpySnapshot {
            name: self.name(),
            length: self.length(),
            called: self.called(),
            call_count: self.call_count(),
            calls: self
                .calls()
                .iter()
                .map(|args| args.iter().map(render).collect())
                .collect(),
            results: self.results().iter().map(record).collect(),
            async_results: self
                .async_results()
                .iter()
                .map(|(index, result)| (*index, record(result)))
                .collect(),
        }
    }
}

fn render_value(realm: &Realm, value: &Value, limit: usize) -> (String, bool) {
    let rendered = realm.describe(value);
    if rendered.len() <= limit {
        return (rendered, false);
    }
    use sha2::{Digest, Sha256};
    let hash = Sha256::digest(rendered.as_bytes());
    (format!("<hash:sha256:{}>", hex_bytes(&hash[..8])), true)
}

fn hex_bytes(bytes: &[u8]) -> String {
    bytes.iter().map(|b| format!("{b:02x}")).collect()
}
