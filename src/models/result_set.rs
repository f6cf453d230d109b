use serde::ser::{Serialize, SerializeMap, Serializer};
use std::collections::HashMap;
use super::record::StatementRecord;

/// Matched records grouped by the client they were requested for.
///
/// Every requested client has a bucket from construction onward, so a
/// client with no matches still shows up with an empty sequence. Records
/// within a bucket keep the order in which they were merged.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResultSet {
    order: Vec<String>,
    buckets: HashMap<String, Vec<StatementRecord>>,
}

impl ResultSet {
    pub fn new(clients: &[String]) -> Self {
        let mut set = Self::default();
        for client in clients {
            if !set.buckets.contains_key(client) {
                set.order.push(client.clone());
                set.buckets.insert(client.clone(), Vec::new());
            }
        }
        set
    }

    /// Append a task's records to its client's bucket. Returns `false` when
    /// the client was never requested; those records are dropped.
    pub fn merge(&mut self, client: &str, records: Vec<StatementRecord>) -> bool {
        match self.buckets.get_mut(client) {
            Some(bucket) => {
                bucket.extend(records);
                true
            }
            None => false,
        }
    }

    pub fn get(&self, client: &str) -> Option<&[StatementRecord]> {
        self.buckets.get(client).map(Vec::as_slice)
    }

    pub fn contains(&self, client: &str) -> bool {
        self.buckets.contains_key(client)
    }

    /// Client names in request order.
    pub fn clients(&self) -> &[String] {
        &self.order
    }

    /// Buckets in request order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &[StatementRecord])> {
        self.order.iter().map(move |client| {
            let records = self.buckets.get(client).map(Vec::as_slice).unwrap_or(&[]);
            (client.as_str(), records)
        })
    }

    /// Clients whose bucket stayed empty.
    pub fn empty_clients(&self) -> Vec<String> {
        self.iter()
            .filter(|(_, records)| records.is_empty())
            .map(|(client, _)| client.to_string())
            .collect()
    }

    pub fn total_records(&self) -> usize {
        self.buckets.values().map(Vec::len).sum()
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }
}

impl Serialize for ResultSet {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.order.len()))?;
        for (client, records) in self.iter() {
            map.serialize_entry(client, records)?;
        }
        map.end()
    }
}
