//! CONTAINS(term[, term[, term]]): chooses unigram/bigram/trigram by arity
//! and probes a single composed key, or prefix-scans the bigram index for a
//! trailing wildcard.

use super::{emit_grouped, ExecCtx};
use crate::err::Error;
use crate::index::{keys, IndexName};
use crate::model::{MatchValue, QueryResult};

pub fn execute(terms: &[String], variable: Option<&str>, ctx: &ExecCtx) -> Result<QueryResult, Error> {
	if terms.is_empty() || terms.len() > 3 {
		return Err(Error::InvalidCondition(format!(
			"CONTAINS accepts 1 to 3 terms, got {}",
			terms.len()
		)));
	}

	let lowered: Vec<String> = terms.iter().map(|t| t.to_lowercase()).collect();
	let wildcard_positions: Vec<bool> = lowered.iter().map(|t| t == "*").collect();

	// "* X" is unsupported: a wildcard in any position but the last.
	if wildcard_positions[..wildcard_positions.len() - 1].iter().any(|&w| w) {
		warn!("CONTAINS: unsupported wildcard position, returning empty result");
		return Ok(QueryResult::empty(ctx.granularity, ctx.window));
	}

	let tag = ctx.tags.next("contains");
	let trailing_wildcard = *wildcard_positions.last().unwrap();

	if trailing_wildcard {
		// "X *" triggers a prefix scan; only the bigram case is supported
		// today (trigram prefix scans are future work).
		if lowered.len() != 2 {
			warn!("CONTAINS: trailing wildcard only supported for 2-term bigram scans, returning empty result");
			return Ok(QueryResult::empty(ctx.granularity, ctx.window));
		}
		let index = IndexName::Bigram;
		if !ctx.indexes.has_index(index) {
			return Err(Error::MissingIndex(index.to_string()));
		}
		let prefix = keys::prefix(&[&lowered[0]]);
		debug!(index = %index, key_len = prefix.len(), granularity = ?ctx.granularity, "contains: prefix scan");
		let mut it = ctx.indexes.iterator(index)?;
		it.seek(&prefix)?;
		let mut details = Vec::new();
		let mut cancel_check = crate::cancellation::BatchedCancelCheck::new(ctx.cancel, ctx.config.iterator_batch_size);
		while let Some((key, positions)) = it.next()? {
			cancel_check.tick()?;
			if !key.starts_with(&prefix) {
				break;
			}
			let joined = keys::suffix_after(&key, 1)
				.map(|suffix| format!("{} {}", lowered[0], suffix))
				.unwrap_or_else(|| lowered[0].clone());
			let value = MatchValue::Term(joined);
			details.extend(emit_grouped(&positions, ctx.granularity, &value, variable, &tag));
		}
		let mut result = QueryResult::new(ctx.granularity, ctx.window, details);
		result.sort_deterministic();
		return Ok(result);
	}

	let index = match lowered.len() {
		1 => IndexName::Unigram,
		2 => IndexName::Bigram,
		3 => IndexName::Trigram,
		_ => unreachable!("guarded above"),
	};
	if !ctx.indexes.has_index(index) {
		return Err(Error::MissingIndex(index.to_string()));
	}
	let refs: Vec<&str> = lowered.iter().map(String::as_str).collect();
	let key = keys::join(&refs);
	trace!(index = %index, key_len = key.len(), granularity = ?ctx.granularity, "contains: exact probe");
	let value = MatchValue::Term(lowered.join(" "));
	let details = match ctx.indexes.get(index, &key)? {
		Some(positions) => emit_grouped(&positions, ctx.granularity, &value, variable, &tag),
		None => Vec::new(),
	};
	let mut result = QueryResult::new(ctx.granularity, ctx.window, details);
	result.sort_deterministic();
	Ok(result)
}
