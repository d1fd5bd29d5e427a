//! One executor per predicate kind, each implementing the uniform contract
//! `execute(condition, indexes, granularity, window, corpus) -> QueryResult`.
//! Dispatch among them lives in [`crate::dispatch`]; this module only holds
//! the per-predicate probing algorithms and the grouping rule they all
//! share.

pub mod contains;
pub mod dependency;
pub mod logical;
pub mod negate;
pub mod ner;
pub mod pos;
pub mod temporal;

use crate::cancellation::CancellationToken;
use crate::config::EngineConfig;
use crate::index::IndexAccess;
use crate::model::{ConditionTag, Granularity, MatchDetail, MatchValue, Position, PositionList};
use std::cell::Cell;
use std::collections::BTreeSet;

/// Everything an executor needs besides the condition it was dispatched
/// for. Bundled into one value (rather than a long parameter list) the way
/// the teacher threads `&Context` / `&Options` through its executors.
pub struct ExecCtx<'a> {
	pub indexes: &'a dyn IndexAccess,
	pub granularity: Granularity,
	pub window: usize,
	pub cancel: &'a CancellationToken,
	pub config: &'a EngineConfig,
	pub tags: &'a TagAllocator,
}

impl<'a> ExecCtx<'a> {
	pub fn new(
		indexes: &'a dyn IndexAccess,
		granularity: Granularity,
		window: usize,
		cancel: &'a CancellationToken,
		config: &'a EngineConfig,
		tags: &'a TagAllocator,
	) -> Self {
		Self {
			indexes,
			granularity,
			window,
			cancel,
			config,
			tags,
		}
	}

	pub fn with_granularity_and_window(&self, granularity: Granularity, window: usize) -> ExecCtx<'a> {
		ExecCtx {
			indexes: self.indexes,
			granularity,
			window,
			cancel: self.cancel,
			config: self.config,
			tags: self.tags,
		}
	}
}

/// Hands out a fresh [`ConditionTag`] per condition instance, stable within
/// one query execution. A plain `Cell` counter suffices because the engine
/// is single-threaded per query.
#[derive(Debug, Default)]
pub struct TagAllocator(Cell<u32>);

impl TagAllocator {
	pub fn new() -> Self {
		Self(Cell::new(0))
	}

	pub fn next(&self, kind: &str) -> ConditionTag {
		let n = self.0.get();
		self.0.set(n + 1);
		ConditionTag::new(format!("{kind}#{n}"))
	}
}

/// The grouping rule shared across Contains/Ner/Dependency/Pos: DOCUMENT
/// emits at most one detail per docId (first-seen position kept); SENTENCE
/// emits one detail per (docId, sentId), never merging across sentences.
/// Every detail in one call shares `value` and `variable`, since they all
/// came from the same matched key.
pub fn emit_grouped(
	positions: &PositionList,
	granularity: Granularity,
	value: &MatchValue,
	variable: Option<&str>,
	tag: &ConditionTag,
) -> Vec<MatchDetail> {
	let mut out = Vec::new();
	match granularity {
		Granularity::Document => {
			let mut seen: BTreeSet<u64> = BTreeSet::new();
			for p in positions.iter() {
				if seen.insert(p.doc_id) {
					out.push(new_detail(to_document_position(*p), value.clone(), variable, tag));
				}
			}
		}
		Granularity::Sentence => {
			let mut seen: BTreeSet<(u64, i64)> = BTreeSet::new();
			for p in positions.iter() {
				if seen.insert((p.doc_id, p.sent_id)) {
					out.push(new_detail(*p, value.clone(), variable, tag));
				}
			}
		}
	}
	out
}

fn to_document_position(p: Position) -> Position {
	Position::new_document(p.doc_id, p.begin, p.end)
}

fn new_detail(position: Position, value: MatchValue, variable: Option<&str>, tag: &ConditionTag) -> MatchDetail {
	let mut d = MatchDetail::new(value, position, tag.clone());
	if let Some(v) = variable {
		d = d.with_variable(v);
	}
	d
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::model::ConditionTag;

	#[test]
	fn document_granularity_keeps_first_seen_per_doc() {
		let mut list = PositionList::new();
		list.push(Position::new_sentence(1, 1, 0, 5));
		list.push(Position::new_sentence(1, 2, 6, 9));
		list.push(Position::new_sentence(2, 1, 0, 3));
		let tag = ConditionTag::new("c0");
		let out = emit_grouped(&list, Granularity::Document, &MatchValue::Term("apple".into()), None, &tag);
		assert_eq!(out.len(), 2);
		assert_eq!(out[0].position.doc_id, 1);
		assert_eq!(out[1].position.doc_id, 2);
		assert!(out.iter().all(|d| d.position.is_document_level()));
	}

	#[test]
	fn sentence_granularity_keeps_every_sentence() {
		let mut list = PositionList::new();
		list.push(Position::new_sentence(1, 1, 0, 5));
		list.push(Position::new_sentence(1, 2, 6, 9));
		list.push(Position::new_sentence(1, 1, 10, 12));
		let tag = ConditionTag::new("c0");
		let out = emit_grouped(&list, Granularity::Sentence, &MatchValue::Term("apple".into()), None, &tag);
		assert_eq!(out.len(), 2);
	}
}
