//! AND/OR composition.
//!
//! Each combinator takes its list of sub-conditions plus a callback that
//! evaluates one of them (rather than `crate::dispatch` directly) so this
//! module has no dependency on the dispatcher; `dispatch` passes itself in
//! when it recurses into `And`/`Or`.

use super::ExecCtx;
use crate::ast::Condition;
use crate::err::Error;
use crate::model::{Granularity, MatchDetail, QueryResult};
use std::collections::{BTreeSet, HashSet};

/// Left-to-right, short-circuiting on the first empty intermediate result.
/// A single child is returned unchanged — the window-relaxation rule only
/// makes sense when there's a peer to relax against.
pub fn and<F>(children: &[Condition], ctx: &ExecCtx, mut exec: F) -> Result<QueryResult, Error>
where
	F: FnMut(&Condition, &ExecCtx) -> Result<QueryResult, Error>,
{
	if children.is_empty() {
		return Ok(QueryResult::empty(ctx.granularity, ctx.window));
	}
	let mut results = Vec::with_capacity(children.len());
	for child in children {
		let r = exec(child, ctx)?;
		if r.is_empty() {
			return Ok(QueryResult::empty(ctx.granularity, ctx.window));
		}
		results.push(r);
	}
	if results.len() == 1 {
		return Ok(results.into_iter().next().unwrap());
	}

	let combined = match ctx.granularity {
		Granularity::Document => and_document(&results),
		Granularity::Sentence if ctx.window == 0 => and_sentence_exact(&results),
		Granularity::Sentence => and_sentence_windowed(&results, ctx.window),
	};
	// `combined` is already in spec §4.7 order — child order first (each
	// helper below walks `results` in child order), document id/sentence
	// id/offset second within one child's own run. Re-sorting here would
	// make document id the primary key and discard which child a detail
	// came from, so this is intentionally not `sort_deterministic`'d.
	Ok(QueryResult::new(ctx.granularity, ctx.window, combined))
}

/// Union over the multiset of MatchDetails, collapsing duplicates by
/// `(position, value, variableName)` set identity. No window interaction.
pub fn or<F>(children: &[Condition], ctx: &ExecCtx, mut exec: F) -> Result<QueryResult, Error>
where
	F: FnMut(&Condition, &ExecCtx) -> Result<QueryResult, Error>,
{
	let mut seen = HashSet::new();
	let mut out = Vec::new();
	for child in children {
		let r = exec(child, ctx)?;
		for d in r.details {
			if seen.insert(d.dedup_key()) {
				out.push(d);
			}
		}
	}
	// `out` is already in child order (each child's details are appended in
	// turn, deduped as they go); see the note in `and` about why this must
	// not be re-sorted by document id afterwards.
	Ok(QueryResult::new(ctx.granularity, ctx.window, out))
}

fn and_document(results: &[QueryResult]) -> Vec<MatchDetail> {
	let mut common: BTreeSet<u64> = results[0].doc_ids();
	for r in &results[1..] {
		let ids = r.doc_ids();
		common = common.intersection(&ids).copied().collect();
	}
	let mut out = Vec::new();
	for r in results {
		for d in &r.details {
			if common.contains(&d.position.doc_id) {
				out.push(d.clone());
			}
		}
	}
	out
}

fn and_sentence_exact(results: &[QueryResult]) -> Vec<MatchDetail> {
	let mut common: BTreeSet<(u64, i64)> = results[0].keys();
	for r in &results[1..] {
		let ks = r.keys();
		common = common.intersection(&ks).copied().collect();
	}
	let mut out = Vec::new();
	for r in results {
		for d in &r.details {
			if common.contains(&(d.position.doc_id, d.position.sent_id)) {
				out.push(d.clone());
			}
		}
	}
	out
}

/// Pairwise window relaxation: a child's sentence `s` in doc `d` survives if
/// every *other* child has a sentence `s'` in the same doc with `|s - s'| <=
/// window`. Each surviving child detail is emitted at its own position, not
/// its peer's.
fn and_sentence_windowed(results: &[QueryResult], window: usize) -> Vec<MatchDetail> {
	let n = results.len();
	let sentence_sets: Vec<BTreeSet<(u64, i64)>> = results.iter().map(|r| r.keys()).collect();
	let window = window as i64;
	let mut out = Vec::new();
	for (i, r) in results.iter().enumerate() {
		for d in &r.details {
			let doc = d.position.doc_id;
			let sent = d.position.sent_id;
			let has_peer_in_every_other_child = (0..n).filter(|&j| j != i).all(|j| {
				sentence_sets[j]
					.range((doc, sent.saturating_sub(window))..=(doc, sent.saturating_add(window)))
					.any(|&(dd, _)| dd == doc)
			});
			if has_peer_in_every_other_child {
				out.push(d.clone());
			}
		}
	}
	out
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::cancellation::CancellationToken;
	use crate::config::EngineConfig;
	use crate::executors::TagAllocator;
	use crate::index::mem::MemIndexSet;
	use crate::model::{ConditionTag, MatchValue, Position};

	fn leaf(tag: &str, positions: &[Position]) -> QueryResult {
		let granularity = if positions.iter().all(|p| p.is_document_level()) {
			Granularity::Document
		} else {
			Granularity::Sentence
		};
		let details = positions
			.iter()
			.map(|p| MatchDetail::new(MatchValue::Term(tag.into()), *p, ConditionTag::new(tag)))
			.collect();
		QueryResult::new(granularity, 0, details)
	}

	fn dummy_ctx<'a>(
		idx: &'a MemIndexSet,
		cancel: &'a CancellationToken,
		config: &'a EngineConfig,
		tags: &'a TagAllocator,
		granularity: Granularity,
		window: usize,
	) -> ExecCtx<'a> {
		ExecCtx::new(idx, granularity, window, cancel, config, tags)
	}

	fn marker(n: usize) -> Condition {
		Condition::Contains {
			terms: vec![format!("c{n}")],
			variable: None,
		}
	}

	#[test]
	fn and_document_keeps_all_details_for_common_docs() {
		let a = leaf("a", &[Position::new_document(1, 0, 1), Position::new_document(2, 0, 1)]);
		let b = leaf("b", &[Position::new_document(2, 0, 1), Position::new_document(3, 0, 1)]);
		let leaves = [a, b];
		let idx = MemIndexSet::new();
		let cancel = CancellationToken::new();
		let config = EngineConfig::new("t");
		let tags = TagAllocator::new();
		let c = dummy_ctx(&idx, &cancel, &config, &tags, Granularity::Document, 0);
		let result = and(&[marker(0), marker(1)], &c, |cond, _| {
			let Condition::Contains { terms, .. } = cond else { unreachable!() };
			let n: usize = terms[0][1..].parse().unwrap();
			Ok(leaves[n].clone())
		})
		.unwrap();
		assert_eq!(result.doc_ids(), [2].into_iter().collect());
		assert_eq!(result.details.len(), 2);
	}

	#[test]
	fn and_document_orders_by_child_first_not_doc_id() {
		// Both children share docs {1, 5}; child A (first) only contributes
		// doc 5, child B (second) only contributes doc 1. Per spec §4.7
		// ("child order, then document id, ...") the output must be
		// [A-doc5, B-doc1] — child order primary — not [B-doc1, A-doc5],
		// which is what a doc-id-ascending sort would produce.
		let a = leaf("a", &[Position::new_document(1, 0, 1), Position::new_document(5, 0, 1)]);
		let b = leaf("b", &[Position::new_document(1, 0, 1), Position::new_document(5, 0, 1)]);
		let leaves = [a, b];
		let idx = MemIndexSet::new();
		let cancel = CancellationToken::new();
		let config = EngineConfig::new("t");
		let tags = TagAllocator::new();
		let c = dummy_ctx(&idx, &cancel, &config, &tags, Granularity::Document, 0);
		let result = and(&[marker(0), marker(1)], &c, |cond, _| {
			let Condition::Contains { terms, .. } = cond else { unreachable!() };
			let n: usize = terms[0][1..].parse().unwrap();
			Ok(leaves[n].clone())
		})
		.unwrap();
		let doc_order: Vec<u64> = result.details.iter().map(|d| d.position.doc_id).collect();
		assert_eq!(doc_order, vec![1, 5, 1, 5]);
	}

	#[test]
	fn and_short_circuits_on_empty_child() {
		let idx = MemIndexSet::new();
		let cancel = CancellationToken::new();
		let config = EngineConfig::new("t");
		let tags = TagAllocator::new();
		let c = dummy_ctx(&idx, &cancel, &config, &tags, Granularity::Document, 0);
		let mut calls = 0;
		let result = and(&[marker(0), marker(1), marker(2)], &c, |_, _| {
			calls += 1;
			if calls == 1 {
				Ok(QueryResult::empty(Granularity::Document, 0))
			} else {
				panic!("should have short-circuited after the first empty child");
			}
		})
		.unwrap();
		assert!(result.is_empty());
		assert_eq!(calls, 1);
	}

	#[test]
	fn and_single_child_ignores_window() {
		let only = leaf("a", &[Position::new_sentence(1, 5, 0, 1)]);
		let idx = MemIndexSet::new();
		let cancel = CancellationToken::new();
		let config = EngineConfig::new("t");
		let tags = TagAllocator::new();
		let c = dummy_ctx(&idx, &cancel, &config, &tags, Granularity::Sentence, 2);
		let result = and(&[marker(0)], &c, |_, _| Ok(only.clone())).unwrap();
		assert_eq!(result.details.len(), 1);
	}

	#[test]
	fn and_sentence_window_relaxes_adjacent_sentences() {
		let a = leaf("a", &[Position::new_sentence(1, 5, 0, 1)]);
		let b = leaf("b", &[Position::new_sentence(1, 7, 0, 1)]);
		let leaves = [a, b];
		let idx = MemIndexSet::new();
		let cancel = CancellationToken::new();
		let config = EngineConfig::new("t");
		let tags = TagAllocator::new();
		let c = dummy_ctx(&idx, &cancel, &config, &tags, Granularity::Sentence, 2);
		let result = and(&[marker(0), marker(1)], &c, |cond, _| {
			let Condition::Contains { terms, .. } = cond else { unreachable!() };
			let n: usize = terms[0][1..].parse().unwrap();
			Ok(leaves[n].clone())
		})
		.unwrap();
		assert_eq!(result.details.len(), 2);
	}

	#[test]
	fn and_sentence_window_rejects_distant_sentences() {
		let a = leaf("a", &[Position::new_sentence(1, 1, 0, 1)]);
		let b = leaf("b", &[Position::new_sentence(1, 9, 0, 1)]);
		let leaves = [a, b];
		let idx = MemIndexSet::new();
		let cancel = CancellationToken::new();
		let config = EngineConfig::new("t");
		let tags = TagAllocator::new();
		let c = dummy_ctx(&idx, &cancel, &config, &tags, Granularity::Sentence, 2);
		let result = and(&[marker(0), marker(1)], &c, |cond, _| {
			let Condition::Contains { terms, .. } = cond else { unreachable!() };
			let n: usize = terms[0][1..].parse().unwrap();
			Ok(leaves[n].clone())
		})
		.unwrap();
		assert!(result.is_empty());
	}

	#[test]
	fn or_dedups_by_position_value_variable() {
		let shared_pos = Position::new_document(1, 0, 1);
		let a = leaf("same", &[shared_pos]);
		let b = leaf("same", &[shared_pos, Position::new_document(2, 0, 1)]);
		let leaves = [a, b];
		let idx = MemIndexSet::new();
		let cancel = CancellationToken::new();
		let config = EngineConfig::new("t");
		let tags = TagAllocator::new();
		let c = dummy_ctx(&idx, &cancel, &config, &tags, Granularity::Document, 0);
		let result = or(&[marker(0), marker(1)], &c, |cond, _| {
			let Condition::Contains { terms, .. } = cond else { unreachable!() };
			let n: usize = terms[0][1..].parse().unwrap();
			Ok(leaves[n].clone())
		})
		.unwrap();
		assert_eq!(result.details.len(), 2);
	}
}
