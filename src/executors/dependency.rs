//! DEPENDENCY(relation, governor, dependent).
//!
//! Key convention: `relation\0governor\0dependent`, all three components
//! lowercased. Exact probe only — a wildcard governor or dependent produces
//! an empty result rather than a prefix scan (future work; no bigram-style
//! "search by relation alone" today). Variable binding captures whichever of
//! governor/dependent the caller marked with [`DepArg::Bound`].

use super::ExecCtx;
use crate::ast::DepArg;
use crate::err::Error;
use crate::index::{keys, IndexName};
use crate::model::{MatchValue, QueryResult};

pub fn execute(relation: &str, governor: &DepArg, dependent: &DepArg, ctx: &ExecCtx) -> Result<QueryResult, Error> {
	let index = IndexName::Dependency;
	if !ctx.indexes.has_index(index) {
		return Err(Error::MissingIndex(index.to_string()));
	}

	let (Some(gov), Some(dep)) = (governor.text(), dependent.text()) else {
		warn!("DEPENDENCY: wildcard governor/dependent is unsupported, returning empty result");
		return Ok(QueryResult::empty(ctx.granularity, ctx.window));
	};

	let relation = relation.to_lowercase();
	let gov = gov.to_lowercase();
	let dep = dep.to_lowercase();
	let tag = ctx.tags.next("dependency");

	let key = keys::join(&[&relation, &gov, &dep]);
	trace!(index = %index, key_len = key.len(), granularity = ?ctx.granularity, "dependency: exact probe");
	let value = MatchValue::Dependency(format!("{relation} {gov} {dep}"));
	let variable = governor.bound_variable().or_else(|| dependent.bound_variable());
	let details = match ctx.indexes.get(index, &key)? {
		Some(positions) => super::emit_grouped(&positions, ctx.granularity, &value, variable, &tag),
		None => Vec::new(),
	};
	let mut result = QueryResult::new(ctx.granularity, ctx.window, details);
	result.sort_deterministic();
	Ok(result)
}
