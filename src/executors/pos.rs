//! POS(tag, term). Accepts a wildcard tag symmetrically with a wildcard term
//! (the `pos` index's `posTag\0term` keying supports both with no new index
//! shape).

use super::ExecCtx;
use crate::ast::Arg;
use crate::err::Error;
use crate::index::{keys, IndexName};
use crate::model::{ConditionTag, MatchValue, PositionList, QueryResult};

pub fn execute(tag: &Arg, term: &Arg, ctx: &ExecCtx) -> Result<QueryResult, Error> {
	let index = IndexName::Pos;
	if !ctx.indexes.has_index(index) {
		return Err(Error::MissingIndex(index.to_string()));
	}
	let condition_tag = ctx.tags.next("pos");

	if let (Some(t), Some(w)) = (tag.literal(), term.literal()) {
		let key = keys::join(&[t, w]);
		trace!(index = %index, key_len = key.len(), granularity = ?ctx.granularity, "pos: exact probe");
		let details = match ctx.indexes.get(index, &key)? {
			Some(positions) => super::emit_grouped(
				&positions,
				ctx.granularity,
				&MatchValue::Pos(t.to_owned()),
				None,
				&condition_tag,
			),
			None => Vec::new(),
		};
		let mut result = QueryResult::new(ctx.granularity, ctx.window, details);
		result.sort_deterministic();
		return Ok(result);
	}

	let prefix = match tag.literal() {
		Some(t) => keys::prefix(&[t]),
		None => Vec::new(),
	};
	debug!(index = %index, key_len = prefix.len(), granularity = ?ctx.granularity, "pos: prefix scan");
	let mut it = ctx.indexes.iterator(index)?;
	it.seek(&prefix)?;
	let mut details = Vec::new();
	let mut cancel_check = crate::cancellation::BatchedCancelCheck::new(ctx.cancel, ctx.config.iterator_batch_size);
	while let Some((key, positions)) = it.next()? {
		cancel_check.tick()?;
		if !key.starts_with(&prefix) {
			break;
		}
		let Some((tag_str, term_str)) = split_tag_term(&key) else {
			continue;
		};
		if let Some(expected) = term.literal() {
			if term_str != expected {
				continue;
			}
		}
		details.extend(emit_for_key(&positions, ctx, tag_str, term_str, term, &condition_tag));
	}
	let mut result = QueryResult::new(ctx.granularity, ctx.window, details);
	result.sort_deterministic();
	Ok(result)
}

fn split_tag_term(key: &[u8]) -> Option<(&str, &str)> {
	let pos = key.iter().position(|&b| b == keys::DELIMITER)?;
	let t = std::str::from_utf8(&key[..pos]).ok()?;
	let w = std::str::from_utf8(&key[pos + 1..]).ok()?;
	Some((t, w))
}

fn emit_for_key(
	positions: &PositionList,
	ctx: &ExecCtx,
	tag_str: &str,
	term_str: &str,
	term: &Arg,
	condition_tag: &ConditionTag,
) -> Vec<crate::model::MatchDetail> {
	match term.variable_name() {
		Some(var) => super::emit_grouped(
			positions,
			ctx.granularity,
			&MatchValue::Pos(term_str.to_owned()),
			Some(var),
			condition_tag,
		),
		None => super::emit_grouped(
			positions,
			ctx.granularity,
			&MatchValue::Pos(tag_str.to_owned()),
			None,
			condition_tag,
		),
	}
}
