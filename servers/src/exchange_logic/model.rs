use std::collections::HashMap;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Publisher {
    pub id: i64,
    pub name: String,
}

/// An application known to the exchange. Immutable once its snapshot is
/// published.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct App {
    pub id: i64,
    pub name: String,
    pub publisher: Publisher,
}

/// A demand-side platform endpoint. A non-empty `latency` is forwarded as a
/// query parameter so the bidder can simulate slowness.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Dsp {
    pub id: i64,
    pub name: String,
    pub endpoint: String,
    #[serde(default)]
    pub latency: String,
}

/// App lookup snapshot, built in one pass from the JSON source.
#[derive(Debug, Default)]
pub struct Apps {
    by_id: HashMap<i64, App>,
}

impl Apps {
    pub fn from_records(records: Vec<App>) -> Self {
        let mut by_id = HashMap::with_capacity(records.len());
        for app in records {
            by_id.insert(app.id, app);
        }
        Self { by_id }
    }

    pub fn get(&self, id: i64) -> Option<&App> {
        self.by_id.get(&id)
    }

    pub fn len(&self) -> usize {
        self.by_id.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_id.is_empty()
    }
}

/// DSP roster snapshot; iteration order is the fan-out order.
#[derive(Debug, Default)]
pub struct DspRoster {
    entries: Vec<Dsp>,
}

impl DspRoster {
    pub fn from_records(records: Vec<Dsp>) -> Self {
        Self { entries: records }
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Dsp> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_generated_app_records() {
        let raw = r#"[
            {"id":1250,"name":"app-1250","publisher":{"id":1,"name":"publisher-1"}},
            {"id":1251,"name":"app-1251","publisher":{"id":2,"name":"publisher-2"}}
        ]"#;
        let records: Vec<App> = serde_json::from_str(raw).expect("decode");
        let apps = Apps::from_records(records);
        assert_eq!(apps.len(), 2);
        assert_eq!(apps.get(1250).unwrap().publisher.id, 1);
        assert!(apps.get(9999).is_none());
    }

    #[test]
    fn duplicate_app_ids_keep_the_last_record() {
        let records = vec![
            App {
                id: 7,
                name: "first".into(),
                publisher: Publisher { id: 1, name: "p".into() },
            },
            App {
                id: 7,
                name: "second".into(),
                publisher: Publisher { id: 1, name: "p".into() },
            },
        ];
        let apps = Apps::from_records(records);
        assert_eq!(apps.len(), 1);
        assert_eq!(apps.get(7).unwrap().name, "second");
    }

    #[test]
    fn dsp_latency_defaults_to_empty() {
        let raw = r#"[{"id":1001,"name":"dsp1","endpoint":"https://d1/bid"}]"#;
        let records: Vec<Dsp> = serde_json::from_str(raw).expect("decode");
        assert_eq!(records[0].latency, "");
    }

    #[test]
    fn roster_preserves_source_order() {
        let raw = r#"[
            {"id":3,"name":"c","endpoint":"https://c/bid","latency":"5ms"},
            {"id":1,"name":"a","endpoint":"https://a/bid","latency":""},
            {"id":2,"name":"b","endpoint":"https://b/bid","latency":"1s"}
        ]"#;
        let records: Vec<Dsp> = serde_json::from_str(raw).expect("decode");
        let roster = DspRoster::from_records(records);
        let ids: Vec<i64> = roster.iter().map(|d| d.id).collect();
        assert_eq!(ids, vec![3, 1, 2]);
    }
}
