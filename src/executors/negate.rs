//! NOT executor. Complementation against a universe U derived from the
//! unigram index rather than a true "everything not matched" predicate,
//! since the engine has no other notion of "every document that exists".

use super::ExecCtx;
use crate::err::Error;
use crate::index::IndexName;
use crate::model::{Granularity, MatchDetail, Position, QueryResult};
use std::collections::BTreeSet;

/// `child` is the already-evaluated excluded set; this function only builds
/// U and subtracts it.
pub fn execute(child: &QueryResult, ctx: &ExecCtx) -> Result<QueryResult, Error> {
	let index = IndexName::Unigram;
	if !ctx.indexes.has_index(index) {
		return Err(Error::MissingIndex(index.to_string()));
	}
	let tag = ctx.tags.next("not");

	let excluded_docs: BTreeSet<u64> = child.doc_ids();
	let excluded_keys: BTreeSet<(u64, i64)> = child.keys();

	debug!(index = %index, granularity = ?ctx.granularity, "not: universe scan");
	let mut it = ctx.indexes.iterator(index)?;
	it.seek(&[])?;
	let mut seen_docs: BTreeSet<u64> = BTreeSet::new();
	let mut seen_keys: BTreeSet<(u64, i64)> = BTreeSet::new();
	let mut cancel_check = crate::cancellation::BatchedCancelCheck::new(ctx.cancel, ctx.config.iterator_batch_size);
	while let Some((_, positions)) = it.next()? {
		cancel_check.tick()?;
		for p in positions.iter() {
			seen_docs.insert(p.doc_id);
			seen_keys.insert((p.doc_id, p.sent_id));
		}
	}

	let mut details = Vec::new();
	match ctx.granularity {
		Granularity::Document => {
			for doc_id in seen_docs.difference(&excluded_docs) {
				details.push(MatchDetail::placeholder(Position::new_document(*doc_id, 0, 0), tag.clone()));
			}
		}
		Granularity::Sentence => {
			for &(doc_id, sent_id) in seen_keys.difference(&excluded_keys) {
				details.push(MatchDetail::placeholder(Position::new_sentence(doc_id, sent_id, 0, 0), tag.clone()));
			}
		}
	}
	let mut result = QueryResult::new(ctx.granularity, ctx.window, details);
	result.sort_deterministic();
	Ok(result)
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::cancellation::CancellationToken;
	use crate::config::EngineConfig;
	use crate::executors::TagAllocator;
	use crate::index::mem::MemIndexSet;
	use crate::model::PositionList;

	fn ctx<'a>(
		indexes: &'a MemIndexSet,
		cancel: &'a CancellationToken,
		config: &'a EngineConfig,
		tags: &'a TagAllocator,
		granularity: Granularity,
	) -> ExecCtx<'a> {
		ExecCtx::new(indexes, granularity, 0, cancel, config, tags)
	}

	fn idx_with_docs(doc_sentences: &[(u64, i64)]) -> MemIndexSet {
		let mut idx = MemIndexSet::new();
		let mut list = PositionList::new();
		for &(doc, sent) in doc_sentences {
			list.push(Position::new_sentence(doc, sent, 0, 1));
		}
		idx.insert(IndexName::Unigram, b"apple".to_vec(), list);
		idx
	}

	#[test_log::test]
	fn document_granularity_complements_against_unigram_universe() {
		let idx = idx_with_docs(&[(1, 0), (2, 0), (3, 0)]);
		let cancel = CancellationToken::new();
		let config = EngineConfig::new("t");
		let tags = TagAllocator::new();
		let c = ctx(&idx, &cancel, &config, &tags, Granularity::Document);
		let excluded = QueryResult::new(
			Granularity::Document,
			0,
			vec![MatchDetail::placeholder(Position::new_document(2, 0, 0), tags.next("x"))],
		);
		let result = execute(&excluded, &c).unwrap();
		assert_eq!(result.doc_ids(), [1, 3].into_iter().collect());
		assert!(result.details.iter().all(|d| d.value.as_str() == Some("")));
	}

	#[test]
	fn sentence_granularity_complements_by_doc_sent_pair() {
		let idx = idx_with_docs(&[(1, 0), (1, 1), (1, 2)]);
		let cancel = CancellationToken::new();
		let config = EngineConfig::new("t");
		let tags = TagAllocator::new();
		let c = ctx(&idx, &cancel, &config, &tags, Granularity::Sentence);
		let excluded = QueryResult::new(
			Granularity::Sentence,
			0,
			vec![MatchDetail::placeholder(Position::new_sentence(1, 1, 0, 0), tags.next("x"))],
		);
		let result = execute(&excluded, &c).unwrap();
		assert_eq!(result.keys(), [(1, 0), (1, 2)].into_iter().collect());
	}

	#[test]
	fn missing_unigram_index_is_an_error() {
		let idx = MemIndexSet::new();
		let cancel = CancellationToken::new();
		let config = EngineConfig::new("t");
		let tags = TagAllocator::new();
		let c = ctx(&idx, &cancel, &config, &tags, Granularity::Document);
		let excluded = QueryResult::empty(Granularity::Document, 0);
		assert!(matches!(execute(&excluded, &c), Err(Error::MissingIndex(_))));
	}
}
