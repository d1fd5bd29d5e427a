//! The Index Access contract: a read-only probe and ordered iteration over a
//! set of named byte-keyed maps. Everything here is an interface the engine
//! consumes — the on-disk store and its concurrent reader are external
//! collaborators this crate does not implement.

pub mod keys;
#[cfg(any(test, feature = "mem-index"))]
pub mod mem;

use crate::err::Error;
use crate::model::PositionList;

/// The well-known index names, as a closed enum rather than a free string —
/// `MISSING_INDEX` is still a runtime error (the index set configured for a
/// query may simply not carry one of these), but an unknown name can never
/// reach an executor in the first place.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum IndexName {
	Unigram,
	Bigram,
	Trigram,
	Ner,
	NerDate,
	Dependency,
	Pos,
}

impl IndexName {
	pub fn as_str(self) -> &'static str {
		match self {
			IndexName::Unigram => "unigram",
			IndexName::Bigram => "bigram",
			IndexName::Trigram => "trigram",
			IndexName::Ner => "ner",
			IndexName::NerDate => "ner_date",
			IndexName::Dependency => "dependency",
			IndexName::Pos => "pos",
		}
	}
}

impl std::fmt::Display for IndexName {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		write!(f, "{}", self.as_str())
	}
}

/// A single (key, value) pair yielded by ordered iteration over an index.
pub type IndexEntry = (Vec<u8>, PositionList);

/// Lazy, bounded enumeration over one index's key space, lexicographic over
/// keys. Callers pull one entry at a time so cancellation can be checked
/// between pulls without the iterator ever materialising more of the index
/// than asked for.
pub trait PositionIterator {
	/// Repositions the iterator so the next `next()` call returns the first
	/// key with the given prefix (or the first key past it, if none
	/// matches).
	fn seek(&mut self, prefix: &[u8]) -> Result<(), Error>;

	fn next(&mut self) -> Result<Option<IndexEntry>, Error>;
}

/// The capability set the engine needs from its storage layer: exact-key
/// probe plus ordered, seekable iteration, over a fixed set of well-known
/// indexes.
pub trait IndexAccess {
	fn get(&self, index: IndexName, key: &[u8]) -> Result<Option<PositionList>, Error>;

	fn iterator<'a>(&'a self, index: IndexName) -> Result<Box<dyn PositionIterator + 'a>, Error>;

	/// Whether `index` is configured for this index set at all. Executors
	/// use this to raise `MISSING_INDEX` before attempting a probe, rather
	/// than trying to distinguish "absent index" from "index present but
	/// key not found" after the fact.
	fn has_index(&self, index: IndexName) -> bool {
		self.iterator(index).is_ok()
	}
}
