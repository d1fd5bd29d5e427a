use super::{Granularity, MatchDetail};
use std::collections::BTreeMap;

/// Bundles a granularity tag, an optional sentence-window size, and an
/// ordered collection of [`MatchDetail`]s indexed by document (and
/// sentence).
///
/// The "indexed by document (and sentence)" part of the invariant is
/// realised lazily via [`QueryResult::group_by_document`] /
/// [`QueryResult::group_by_sentence`] rather than stored redundantly: the
/// `details` vector is the single source of truth. Its order follows spec
/// §4.7 — child order first, then document id, sentence id, and offset
/// within one child's contribution — so a leaf executor's own output is
/// sorted by [`QueryResult::sort_deterministic`], while a composite AND/OR
/// result is built by walking its children in order and must not be
/// re-sorted afterwards, or child order is lost. The grouped views are
/// derived on demand.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryResult {
	pub granularity: Granularity,
	pub window_size: usize,
	pub details: Vec<MatchDetail>,
}

impl QueryResult {
	pub fn empty(granularity: Granularity, window_size: usize) -> Self {
		Self {
			granularity,
			window_size,
			details: Vec::new(),
		}
	}

	pub fn new(granularity: Granularity, window_size: usize, details: Vec<MatchDetail>) -> Self {
		debug_assert!(
			details.iter().all(|d| match granularity {
				Granularity::Document => d.position.is_document_level(),
				Granularity::Sentence => !d.position.is_document_level(),
			}),
			"MatchDetail granularity must match QueryResult granularity"
		);
		Self {
			granularity,
			window_size,
			details,
		}
	}

	pub fn is_empty(&self) -> bool {
		self.details.is_empty()
	}

	pub fn doc_ids(&self) -> std::collections::BTreeSet<u64> {
		self.details.iter().map(|d| d.position.doc_id).collect()
	}

	/// The (docId, sentId) keys present, regardless of granularity — at
	/// DOCUMENT granularity every sentId is the `-1` sentinel.
	pub fn keys(&self) -> std::collections::BTreeSet<(u64, i64)> {
		self.details.iter().map(|d| (d.position.doc_id, d.position.sent_id)).collect()
	}

	pub fn group_by_document(&self) -> BTreeMap<u64, Vec<&MatchDetail>> {
		let mut map: BTreeMap<u64, Vec<&MatchDetail>> = BTreeMap::new();
		for d in &self.details {
			map.entry(d.position.doc_id).or_default().push(d);
		}
		map
	}

	pub fn group_by_sentence(&self) -> BTreeMap<(u64, i64), Vec<&MatchDetail>> {
		let mut map: BTreeMap<(u64, i64), Vec<&MatchDetail>> = BTreeMap::new();
		for d in &self.details {
			map.entry((d.position.doc_id, d.position.sent_id)).or_default().push(d);
		}
		map
	}

	/// Deterministic ordering for a single leaf executor's own output: sorts
	/// by document id, then sentence id, then begin offset. This has no
	/// notion of child order, so it must only be called where there is no
	/// child order to preserve — a composite AND/OR result already emits
	/// `details` in child order (spec §4.7) and calling this on it would
	/// discard that and make document id the primary key instead.
	pub fn sort_deterministic(&mut self) {
		self.details.sort_by_key(|d| (d.position.doc_id, d.position.sent_id, d.position.begin));
	}
}
