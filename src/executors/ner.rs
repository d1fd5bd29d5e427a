//! NER(type, target).
//!
//! Key convention: `TYPE\0VALUE`. Entity type and value are used exactly as
//! given by the caller (not case-folded) — the index stores `PERSON\0Alice`
//! verbatim, and folding `Alice` would make the captured variable binding
//! disagree with what's actually in the index, so this executor treats the
//! general lowercasing convention as applying to CONTAINS's term keys, not
//! to entity types/values.

use super::ExecCtx;
use crate::ast::Arg;
use crate::err::Error;
use crate::index::{keys, IndexName};
use crate::model::{ConditionTag, MatchValue, QueryResult};

pub fn execute(entity_type: &Arg, target: &Arg, ctx: &ExecCtx) -> Result<QueryResult, Error> {
	let index = match entity_type.literal() {
		Some(t) if t.eq_ignore_ascii_case("date") => IndexName::NerDate,
		_ => IndexName::Ner,
	};
	if !ctx.indexes.has_index(index) {
		return Err(Error::MissingIndex(index.to_string()));
	}
	let tag = ctx.tags.next("ner");

	// Fixed type + fixed value: a single exact probe.
	if let (Some(t), Some(v)) = (entity_type.literal(), target.literal()) {
		let key = keys::join(&[t, v]);
		trace!(index = %index, key_len = key.len(), granularity = ?ctx.granularity, "ner: exact probe");
		let details = match ctx.indexes.get(index, &key)? {
			Some(positions) => {
				super::emit_grouped(&positions, ctx.granularity, &MatchValue::Entity(t.to_owned()), None, &tag)
			}
			None => Vec::new(),
		};
		let mut result = QueryResult::new(ctx.granularity, ctx.window, details);
		result.sort_deterministic();
		return Ok(result);
	}

	// Every other combination (wildcard type, and/or variable/wildcard
	// target) is a prefix scan. A fixed type narrows it to `TYPE\0`; a
	// wildcard type scans the whole index.
	let prefix = match entity_type.literal() {
		Some(t) => keys::prefix(&[t]),
		None => Vec::new(),
	};
	debug!(index = %index, key_len = prefix.len(), granularity = ?ctx.granularity, "ner: prefix scan");
	let mut it = ctx.indexes.iterator(index)?;
	it.seek(&prefix)?;
	let mut details = Vec::new();
	let mut cancel_check = crate::cancellation::BatchedCancelCheck::new(ctx.cancel, ctx.config.iterator_batch_size);
	while let Some((key, positions)) = it.next()? {
		cancel_check.tick()?;
		if !key.starts_with(&prefix) {
			break;
		}
		let Some((entity_type_str, entity_value)) = split_type_value(&key) else {
			continue;
		};
		if let Some(expected) = target.literal() {
			if entity_value != expected {
				continue;
			}
		}
		details.extend(emit_for_key(&positions, ctx, entity_type_str, entity_value, target, &tag));
	}
	let mut result = QueryResult::new(ctx.granularity, ctx.window, details);
	result.sort_deterministic();
	Ok(result)
}

fn split_type_value(key: &[u8]) -> Option<(&str, &str)> {
	let pos = key.iter().position(|&b| b == keys::DELIMITER)?;
	let t = std::str::from_utf8(&key[..pos]).ok()?;
	let v = std::str::from_utf8(&key[pos + 1..]).ok()?;
	Some((t, v))
}

fn emit_for_key(
	positions: &crate::model::PositionList,
	ctx: &ExecCtx,
	entity_type: &str,
	entity_value: &str,
	target: &Arg,
	tag: &ConditionTag,
) -> Vec<crate::model::MatchDetail> {
	match target.variable_name() {
		Some(var) => super::emit_grouped(
			positions,
			ctx.granularity,
			&MatchValue::Entity(entity_value.to_owned()),
			Some(var),
			tag,
		),
		None => {
			super::emit_grouped(positions, ctx.granularity, &MatchValue::Entity(entity_type.to_owned()), None, tag)
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::cancellation::CancellationToken;
	use crate::config::EngineConfig;
	use crate::executors::TagAllocator;
	use crate::index::mem::MemIndexSet;
	use crate::model::{Granularity, Position, PositionList};

	fn make_ctx<'a>(
		indexes: &'a MemIndexSet,
		cancel: &'a CancellationToken,
		config: &'a EngineConfig,
		tags: &'a TagAllocator,
	) -> ExecCtx<'a> {
		ExecCtx::new(indexes, Granularity::Document, 0, cancel, config, tags)
	}

	#[test]
	fn variable_target_binds_value_from_wildcard_scan() {
		let mut idx = MemIndexSet::new();
		let mut alice = PositionList::new();
		alice.push(Position::new_document(1, 0, 5));
		idx.insert(IndexName::Ner, b"PERSON\0Alice".to_vec(), alice);
		let mut bob = PositionList::new();
		bob.push(Position::new_document(2, 0, 3));
		idx.insert(IndexName::Ner, b"PERSON\0Bob".to_vec(), bob);
		let cancel = CancellationToken::new();
		let config = EngineConfig::new("t");
		let tags = TagAllocator::new();
		let c = make_ctx(&idx, &cancel, &config, &tags);
		let result = execute(&Arg::Literal("PERSON".into()), &Arg::Variable("p".into()), &c).unwrap();
		assert_eq!(result.details.len(), 2);
		let values: std::collections::BTreeSet<String> =
			result.details.iter().map(|d| d.value.to_string()).collect();
		assert!(values.contains("Alice"));
		assert!(values.contains("Bob"));
		assert!(result.details.iter().all(|d| d.variable_name.as_deref() == Some("p")));
	}

	#[test]
	fn no_variable_binds_to_entity_type() {
		let mut idx = MemIndexSet::new();
		let mut list = PositionList::new();
		list.push(Position::new_document(1, 0, 5));
		idx.insert(IndexName::Ner, b"PERSON\0Alice".to_vec(), list);
		let cancel = CancellationToken::new();
		let config = EngineConfig::new("t");
		let tags = TagAllocator::new();
		let c = make_ctx(&idx, &cancel, &config, &tags);
		let result = execute(&Arg::Literal("PERSON".into()), &Arg::Literal("Alice".into()), &c).unwrap();
		assert_eq!(result.details.len(), 1);
		assert_eq!(result.details[0].value.to_string(), "PERSON");
		assert!(result.details[0].variable_name.is_none());
	}
}
