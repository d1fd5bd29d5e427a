use crate::err::Error;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// A single occurrence of something in the corpus.
///
/// `sent_id == -1` marks a document-level position. `date` is populated
/// only by the `ner_date` index (entries of type `DATE`); every other index
/// leaves it `None`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Position {
	pub doc_id: u64,
	pub sent_id: i64,
	pub begin: u32,
	pub end: u32,
	pub date: Option<NaiveDate>,
}

pub const DOCUMENT_SENTINEL: i64 = -1;

impl Position {
	pub fn new_document(doc_id: u64, begin: u32, end: u32) -> Self {
		Self {
			doc_id,
			sent_id: DOCUMENT_SENTINEL,
			begin,
			end,
			date: None,
		}
	}

	pub fn new_sentence(doc_id: u64, sent_id: i64, begin: u32, end: u32) -> Self {
		debug_assert!(begin <= end, "Position::begin must not exceed end");
		Self {
			doc_id,
			sent_id,
			begin,
			end,
			date: None,
		}
	}

	pub fn with_date(mut self, date: NaiveDate) -> Self {
		self.date = Some(date);
		self
	}

	pub fn is_document_level(&self) -> bool {
		self.sent_id == DOCUMENT_SENTINEL
	}
}

/// Ordered, insertion-order-preserving sequence of [`Position`].
///
/// Decoded from index bytes by the (external) Index Access layer; the
/// engine only ever reads it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PositionList(pub Vec<Position>);

impl PositionList {
	pub fn new() -> Self {
		Self(Vec::new())
	}

	pub fn push(&mut self, position: Position) {
		self.0.push(position);
	}

	pub fn iter(&self) -> std::slice::Iter<'_, Position> {
		self.0.iter()
	}

	pub fn len(&self) -> usize {
		self.0.len()
	}

	pub fn is_empty(&self) -> bool {
		self.0.is_empty()
	}

	/// Encodes the list using the same fixed-width bincode convention as the
	/// external Index Access store.
	pub fn to_bytes(&self) -> Result<Vec<u8>, Error> {
		bincode::serialize(self).map_err(|e| Error::IndexAccessError(e.to_string()))
	}

	pub fn from_bytes(bytes: &[u8]) -> Result<Self, Error> {
		bincode::deserialize(bytes).map_err(|e| Error::IndexAccessError(e.to_string()))
	}
}

impl FromIterator<Position> for PositionList {
	fn from_iter<T: IntoIterator<Item = Position>>(iter: T) -> Self {
		Self(iter.into_iter().collect())
	}
}

impl IntoIterator for PositionList {
	type Item = Position;
	type IntoIter = std::vec::IntoIter<Position>;

	fn into_iter(self) -> Self::IntoIter {
		self.0.into_iter()
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn round_trips_through_bytes() {
		let mut list = PositionList::new();
		list.push(Position::new_document(1, 0, 5));
		list.push(Position::new_sentence(2, 3, 10, 15));
		let bytes = list.to_bytes().unwrap();
		let back = PositionList::from_bytes(&bytes).unwrap();
		assert_eq!(list, back);
	}

	#[test]
	fn document_sentinel_is_negative_one() {
		let p = Position::new_document(1, 0, 5);
		assert!(p.is_document_level());
		assert_eq!(p.sent_id, DOCUMENT_SENTINEL);
	}
}
