//! Parsed record: a value vector plus optional header lookup and origin
//! metadata (spec §3, §4.5).

use crate::error::RecordAccessError;
use ahash::AHashMap;
use std::sync::Arc;

/// Insertion-ordered mapping from header name to 0-based column index,
/// shared (not copied) by every record the parser emits for one input
/// (spec §3 "Header index").
#[derive(Debug, Clone)]
pub struct HeaderIndex {
    names: Vec<String>,
    index_of: AHashMap<String, usize>,
    ignore_case: bool,
}

impl HeaderIndex {
    pub fn new(names: Vec<String>, ignore_case: bool) -> Self {
        let mut index_of = AHashMap::with_capacity(names.len());
        for (i, name) in names.iter().enumerate() {
            let key = if ignore_case {
                name.to_lowercase()
            } else {
                name.clone()
            };
            // First occurrence wins the lookup slot; duplicate-header policy
            // is enforced at dialect-validation / parser-construction time,
            // not here.
            index_of.entry(key).or_insert(i);
        }
        Self {
            names,
            index_of,
            ignore_case,
        }
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    pub fn names(&self) -> &[String] {
        &self.names
    }

    fn key(&self, name: &str) -> String {
        if self.ignore_case {
            name.to_lowercase()
        } else {
            name.to_string()
        }
    }

    pub fn index_of(&self, name: &str) -> Option<usize> {
        self.index_of.get(&self.key(name)).copied()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.index_of.contains_key(&self.key(name))
    }
}

/// One parsed row: values in column order, optional shared header mapping,
/// 1-based record number (header excluded), character position at the
/// start of the record, and any attached comment.
#[derive(Debug, Clone)]
pub struct Record {
    values: Vec<String>,
    header: Option<Arc<HeaderIndex>>,
    record_number: u64,
    character_position: u64,
    comment: Option<String>,
}

impl Record {
    pub fn new(
        values: Vec<String>,
        header: Option<Arc<HeaderIndex>>,
        record_number: u64,
        character_position: u64,
        comment: Option<String>,
    ) -> Self {
        Self {
            values,
            header,
            record_number,
            character_position,
            comment,
        }
    }

    /// Bounds-checked by Rust's slice indexing; an out-of-range `i` is a
    /// caller bug, not a recoverable condition (spec §4.5).
    pub fn get(&self, i: usize) -> &str {
        &self.values[i]
    }

    pub fn get_by_name(&self, name: &str) -> Result<&str, RecordAccessError> {
        let header = self
            .header
            .as_ref()
            .ok_or(RecordAccessError::MissingHeader)?;
        let index = header
            .index_of(name)
            .ok_or_else(|| RecordAccessError::UnknownColumn {
                name: name.to_string(),
            })?;
        self.values
            .get(index)
            .map(|s| s.as_str())
            .ok_or(RecordAccessError::InconsistentRow {
                name: name.to_string(),
                index,
                len: self.values.len(),
            })
    }

    pub fn is_mapped(&self, name: &str) -> bool {
        self.header.as_ref().map_or(false, |h| h.contains(name))
    }

    pub fn is_set(&self, name: &str) -> bool {
        self.header
            .as_ref()
            .and_then(|h| h.index_of(name))
            .map_or(false, |i| i < self.values.len())
    }

    pub fn is_set_index(&self, i: usize) -> bool {
        i < self.values.len()
    }

    /// True when the header width matches this record's width.
    pub fn is_consistent(&self) -> bool {
        self.header
            .as_ref()
            .map_or(true, |h| h.len() == self.values.len())
    }

    pub fn has_comment(&self) -> bool {
        self.comment.is_some()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.values.iter().map(|s| s.as_str())
    }

    /// Copies header name -> value into a fresh map; columns beyond the
    /// value count are omitted.
    pub fn to_map(&self) -> AHashMap<String, String> {
        let mut map = AHashMap::new();
        self.put_in(&mut map);
        map
    }

    /// Populates a caller-supplied map the same way as [`Self::to_map`].
    pub fn put_in(&self, map: &mut AHashMap<String, String>) {
        let Some(header) = &self.header else { return };
        for (name, value) in header.names().iter().zip(self.values.iter()) {
            map.insert(name.clone(), value.clone());
        }
    }

    pub fn size(&self) -> usize {
        self.values.len()
    }

    pub fn record_number(&self) -> u64 {
        self.record_number
    }

    pub fn character_position(&self) -> u64 {
        self.character_position
    }

    pub fn comment(&self) -> Option<&str> {
        self.comment.as_deref()
    }

    pub fn values(&self) -> &[String] {
        &self.values
    }

    pub fn into_mutable(self) -> MutableRecord {
        MutableRecord { inner: self }
    }
}

/// Same shape as [`Record`] but permits in-place cell replacement, useful
/// for transform pipelines (spec §9).
#[derive(Debug, Clone)]
pub struct MutableRecord {
    inner: Record,
}

impl MutableRecord {
    pub fn new(record: Record) -> Self {
        Self { inner: record }
    }

    pub fn set(&mut self, i: usize, value: impl Into<String>) {
        self.inner.values[i] = value.into();
    }

    pub fn set_by_name(&mut self, name: &str, value: impl Into<String>) -> Result<(), RecordAccessError> {
        let header = self
            .inner
            .header
            .as_ref()
            .ok_or(RecordAccessError::MissingHeader)?;
        let index = header
            .index_of(name)
            .ok_or_else(|| RecordAccessError::UnknownColumn {
                name: name.to_string(),
            })?;
        if index >= self.inner.values.len() {
            return Err(RecordAccessError::InconsistentRow {
                name: name.to_string(),
                index,
                len: self.inner.values.len(),
            });
        }
        self.inner.values[index] = value.into();
        Ok(())
    }

    pub fn freeze(self) -> Record {
        self.inner
    }
}

impl std::ops::Deref for MutableRecord {
    type Target = Record;

    fn deref(&self) -> &Self::Target {
        &self.inner
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn header(names: &[&str], ignore_case: bool) -> Arc<HeaderIndex> {
        Arc::new(HeaderIndex::new(
            names.iter().map(|s| s.to_string()).collect(),
            ignore_case,
        ))
    }

    #[test]
    fn get_by_name_round_trips() {
        let h = header(&["a", "b"], false);
        let r = Record::new(
            vec!["1".into(), "2".into()],
            Some(h),
            1,
            0,
            None,
        );
        assert_eq!(r.get_by_name("b").unwrap(), "2");
    }

    #[test]
    fn missing_header_is_an_error() {
        let r = Record::new(vec!["1".into()], None, 1, 0, None);
        assert_eq!(
            r.get_by_name("a").unwrap_err(),
            RecordAccessError::MissingHeader
        );
    }

    #[test]
    fn unknown_column_is_an_error() {
        let h = header(&["a"], false);
        let r = Record::new(vec!["1".into()], Some(h), 1, 0, None);
        assert!(matches!(
            r.get_by_name("z").unwrap_err(),
            RecordAccessError::UnknownColumn { .. }
        ));
    }

    #[test]
    fn inconsistent_row_is_an_error() {
        let h = header(&["a", "b"], false);
        let r = Record::new(vec!["1".into()], Some(h), 1, 0, None);
        assert!(matches!(
            r.get_by_name("b").unwrap_err(),
            RecordAccessError::InconsistentRow { .. }
        ));
        assert!(!r.is_consistent());
    }

    #[test]
    fn case_insensitive_lookup() {
        let h = header(&["Name"], true);
        let r = Record::new(vec!["x".into()], Some(h), 1, 0, None);
        assert_eq!(r.get_by_name("name").unwrap(), "x");
    }

    #[test]
    fn mutable_record_sets_by_index_and_name() {
        let h = header(&["a", "b"], false);
        let r = Record::new(vec!["1".into(), "2".into()], Some(h), 1, 0, None);
        let mut m = r.into_mutable();
        m.set(0, "10");
        m.set_by_name("b", "20").unwrap();
        let frozen = m.freeze();
        assert_eq!(frozen.get(0), "10");
        assert_eq!(frozen.get_by_name("b").unwrap(), "20");
    }
}
