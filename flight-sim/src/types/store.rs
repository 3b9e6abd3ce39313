use std::collections::BTreeMap;

use driver::ClientError;
use thiserror::Error;

/// Failure of the key-value backend itself, as opposed to missing or bad data.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("key-value store unavailable: {0}")]
    Client(#[from] ClientError),
}

/// Access to the persisted flight documents, keyed by flight number.
///
/// Documents travel as the JSON text the store keeps; decoding them is left
/// to the caller so that a corrupt entry only affects its own flight.
pub trait FlightStore {
    fn get(&mut self, number: &str) -> Result<Option<String>, StoreError>;

    fn get_all(&mut self) -> Result<Vec<(String, String)>, StoreError>;

    fn put(&mut self, number: &str, document: &str) -> Result<(), StoreError>;
}

/// A store kept in process memory, ordered by flight number.
#[derive(Debug, Default, Clone)]
pub struct MemoryStore {
    documents: BTreeMap<String, String>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.documents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }
}

impl FlightStore for MemoryStore {
    fn get(&mut self, number: &str) -> Result<Option<String>, StoreError> {
        Ok(self.documents.get(number).cloned())
    }

    fn get_all(&mut self) -> Result<Vec<(String, String)>, StoreError> {
        Ok(self
            .documents
            .iter()
            .map(|(number, document)| (number.clone(), document.clone()))
            .collect())
    }

    fn put(&mut self, number: &str, document: &str) -> Result<(), StoreError> {
        self.documents
            .insert(number.to_string(), document.to_string());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn put_then_get() {
        let mut store = MemoryStore::new();
        store.put("FV777", "{}").unwrap();

        assert_eq!(store.get("FV777").unwrap(), Some("{}".to_string()));
        assert_eq!(store.get("FV555").unwrap(), None);
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn put_replaces_existing_document() {
        let mut store = MemoryStore::new();
        store.put("FV777", "old").unwrap();
        store.put("FV777", "new").unwrap();

        assert_eq!(store.get("FV777").unwrap(), Some("new".to_string()));
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn get_all_is_ordered_by_flight_number() {
        let mut store = MemoryStore::new();
        store.put("IV4673", "b").unwrap();
        store.put("FFFFFF", "a").unwrap();

        let numbers: Vec<String> = store
            .get_all()
            .unwrap()
            .into_iter()
            .map(|(number, _)| number)
            .collect();

        assert_eq!(numbers, vec!["FFFFFF", "IV4673"]);
    }
}
