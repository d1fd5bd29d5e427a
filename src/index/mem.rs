//! An in-memory [`IndexAccess`] implementation used as the test double for
//! the external Index Access contract. Not shipped for production use — it
//! exists so this crate's own test suite can exercise prefix scans and
//! lexicographic ordering without a real on-disk store.

use super::{IndexAccess, IndexEntry, IndexName, PositionIterator};
use crate::err::Error;
use crate::model::PositionList;
use std::collections::BTreeMap;

#[derive(Debug, Default)]
pub struct MemIndexSet {
	indexes: BTreeMap<IndexName, BTreeMap<Vec<u8>, PositionList>>,
}

impl MemIndexSet {
	pub fn new() -> Self {
		Self::default()
	}

	/// Defines an index so `has_index`/`iterator` succeed for it even if it
	/// has no entries yet (an empty-but-present unigram index, say).
	pub fn define(&mut self, index: IndexName) -> &mut Self {
		self.indexes.entry(index).or_default();
		self
	}

	pub fn insert(&mut self, index: IndexName, key: impl Into<Vec<u8>>, positions: PositionList) -> &mut Self {
		self.indexes.entry(index).or_default().insert(key.into(), positions);
		self
	}
}

impl IndexAccess for MemIndexSet {
	fn get(&self, index: IndexName, key: &[u8]) -> Result<Option<PositionList>, Error> {
		Ok(self.indexes.get(&index).and_then(|m| m.get(key).cloned()))
	}

	fn iterator<'a>(&'a self, index: IndexName) -> Result<Box<dyn PositionIterator + 'a>, Error> {
		let map = self
			.indexes
			.get(&index)
			.ok_or_else(|| Error::MissingIndex(index.to_string()))?;
		Ok(Box::new(MemIterator {
			entries: map.iter().map(|(k, v)| (k.clone(), v.clone())).collect(),
			pos: 0,
		}))
	}

	fn has_index(&self, index: IndexName) -> bool {
		self.indexes.contains_key(&index)
	}
}

struct MemIterator {
	entries: Vec<IndexEntry>,
	pos: usize,
}

impl PositionIterator for MemIterator {
	fn seek(&mut self, prefix: &[u8]) -> Result<(), Error> {
		self.pos = self.entries.partition_point(|(k, _)| k.as_slice() < prefix);
		Ok(())
	}

	fn next(&mut self) -> Result<Option<IndexEntry>, Error> {
		if self.pos >= self.entries.len() {
			return Ok(None);
		}
		let entry = self.entries[self.pos].clone();
		self.pos += 1;
		Ok(Some(entry))
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::model::Position;

	#[test]
	fn iterates_in_lexicographic_order() {
		let mut idx = MemIndexSet::new();
		idx.insert(IndexName::Unigram, b"banana".to_vec(), PositionList::new());
		idx.insert(IndexName::Unigram, b"apple".to_vec(), PositionList::new());
		let mut it = idx.iterator(IndexName::Unigram).unwrap();
		let (k1, _) = it.next().unwrap().unwrap();
		let (k2, _) = it.next().unwrap().unwrap();
		assert_eq!(k1, b"apple");
		assert_eq!(k2, b"banana");
		assert!(it.next().unwrap().is_none());
	}

	#[test]
	fn seek_skips_to_prefix() {
		let mut idx = MemIndexSet::new();
		idx.insert(IndexName::Ner, b"PERSON\0Alice".to_vec(), PositionList::new());
		idx.insert(IndexName::Ner, b"PERSON\0Bob".to_vec(), PositionList::new());
		idx.insert(IndexName::Ner, b"LOCATION\0Paris".to_vec(), PositionList::new());
		let mut it = idx.iterator(IndexName::Ner).unwrap();
		it.seek(b"PERSON\0").unwrap();
		let (k, _) = it.next().unwrap().unwrap();
		assert_eq!(k, b"PERSON\0Alice");
	}

	#[test]
	fn missing_index_is_an_error() {
		let idx = MemIndexSet::new();
		assert!(idx.iterator(IndexName::Unigram).is_err());
		assert!(!idx.has_index(IndexName::Unigram));
	}

	#[test]
	fn get_is_exact_probe() {
		let mut idx = MemIndexSet::new();
		let mut list = PositionList::new();
		list.push(Position::new_document(1, 0, 5));
		idx.insert(IndexName::Unigram, b"apple".to_vec(), list.clone());
		assert_eq!(idx.get(IndexName::Unigram, b"apple").unwrap(), Some(list));
		assert_eq!(idx.get(IndexName::Unigram, b"missing").unwrap(), None);
	}
}
