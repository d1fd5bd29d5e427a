//! Subquery table materialisation and temporal joins.

pub mod table;

use crate::ast::{JoinPredicate, JoinType};
use crate::err::Error;
pub use table::{ColumnValue, Table, TableRow};

use chrono::NaiveDate;
use std::collections::HashMap;
use std::time::{Duration, Instant};

/// One pluggable implementation of a join predicate — several
/// implementations may be registered per predicate, with one active.
/// `matches` decides whether a left/right date pair satisfies the
/// predicate; point dates are what this engine has, so CONTAINS/CONTAINED_BY/
/// INTERSECT all degrade to equality for point-dates.
pub trait JoinStrategy: Send + Sync {
	fn matches(&self, left: NaiveDate, right: NaiveDate, predicate: &JoinPredicate) -> bool;
}

/// The default, and currently only shipped, strategy.
pub struct PointDateStrategy;

impl JoinStrategy for PointDateStrategy {
	fn matches(&self, left: NaiveDate, right: NaiveDate, predicate: &JoinPredicate) -> bool {
		match predicate {
			JoinPredicate::Equal | JoinPredicate::Contains | JoinPredicate::ContainedBy | JoinPredicate::Intersect => {
				left == right
			}
			JoinPredicate::Proximity(n) => (left - right).num_days().unsigned_abs() <= u64::from(*n),
		}
	}
}

fn predicate_kind(predicate: &JoinPredicate) -> &'static str {
	match predicate {
		JoinPredicate::Equal => "equal",
		JoinPredicate::Contains => "contains",
		JoinPredicate::ContainedBy => "contained_by",
		JoinPredicate::Intersect => "intersect",
		JoinPredicate::Proximity(_) => "proximity",
	}
}

/// An explicit value holding registered [`JoinStrategy`]s per predicate kind
/// plus which one is active, rather than a global/static registry — this is
/// threaded through the engine explicitly rather than kept as ambient mutable
/// state. `register`/`set_active` are its only mutating operations; it is
/// built once and read-only for the rest of a query's execution.
pub struct JoinStrategyRegistry {
	strategies: HashMap<&'static str, (HashMap<String, Box<dyn JoinStrategy>>, String)>,
}

impl JoinStrategyRegistry {
	/// A registry with `PointDateStrategy` registered and active for every
	/// predicate kind.
	pub fn with_defaults() -> Self {
		let mut registry = Self {
			strategies: HashMap::new(),
		};
		for kind in ["equal", "contains", "contained_by", "intersect", "proximity"] {
			registry.register(kind, "point_date", Box::new(PointDateStrategy));
			registry.set_active(kind, "point_date").expect("just registered");
		}
		registry
	}

	pub fn register(&mut self, predicate_kind: &'static str, name: impl Into<String>, strategy: Box<dyn JoinStrategy>) {
		let entry = self.strategies.entry(predicate_kind).or_insert_with(|| (HashMap::new(), String::new()));
		entry.0.insert(name.into(), strategy);
	}

	pub fn set_active(&mut self, predicate_kind: &str, name: &str) -> Result<(), Error> {
		let entry = self
			.strategies
			.get_mut(predicate_kind)
			.ok_or_else(|| Error::Unsupported(format!("no strategies registered for '{predicate_kind}'")))?;
		if !entry.0.contains_key(name) {
			return Err(Error::Unsupported(format!("strategy '{name}' not registered for '{predicate_kind}'")));
		}
		entry.1 = name.to_owned();
		Ok(())
	}

	fn active(&self, predicate: &JoinPredicate) -> Result<&dyn JoinStrategy, Error> {
		let kind = predicate_kind(predicate);
		let (strategies, active_name) = self
			.strategies
			.get(kind)
			.ok_or_else(|| Error::Unsupported(format!("no strategy registered for '{kind}'")))?;
		strategies
			.get(active_name.as_str())
			.map(|b| b.as_ref())
			.ok_or_else(|| Error::Unsupported(format!("active strategy '{active_name}' missing for '{kind}'")))
	}

	/// Times every registered strategy for `predicate` on the same
	/// left/right table pair.
	pub fn bench_strategies(
		&self,
		predicate: &JoinPredicate,
		left: &Table,
		right: &Table,
		left_key: &str,
		right_key: &str,
	) -> HashMap<String, Duration> {
		let kind = predicate_kind(predicate);
		let mut out = HashMap::new();
		let Some((strategies, _)) = self.strategies.get(kind) else {
			return out;
		};
		for (name, strategy) in strategies {
			let start = Instant::now();
			let _ = run_pairwise(left, right, left_key, right_key, predicate, strategy.as_ref());
			out.insert(name.clone(), start.elapsed());
		}
		out
	}
}

fn run_pairwise(
	left: &Table,
	right: &Table,
	left_key: &str,
	right_key: &str,
	predicate: &JoinPredicate,
	strategy: &dyn JoinStrategy,
) -> Vec<(usize, usize)> {
	let mut out = Vec::new();
	for (li, lrow) in left.rows.iter().enumerate() {
		let Some(ld) = lrow.date(left_key) else { continue };
		for (ri, rrow) in right.rows.iter().enumerate() {
			let Some(rd) = rrow.date(right_key) else { continue };
			if strategy.matches(ld, rd, predicate) {
				out.push((li, ri));
			}
		}
	}
	out
}

/// Joins `left` against `right` under `cond`, using `registry`'s active
/// strategy for `cond.predicate`. Right-side columns are copied into the
/// joined row prefixed with `<rightAlias>_`, except `document_id`/
/// `sentence_id`, which are never copied over — they exist on `TableRow`
/// as row identity, not as named columns, so there is nothing to rename;
/// mixed document/sentence granularity joins on `document_id` alone and
/// the result is document-level.
pub fn execute(
	left: &Table,
	right: &Table,
	right_alias: &str,
	cond: &crate::ast::JoinCondition,
	registry: &JoinStrategyRegistry,
) -> Result<Table, Error> {
	let strategy = registry.active(&cond.predicate)?;
	let mixed_granularity = left.rows.iter().any(|r| r.sentence_id.is_none())
		!= right.rows.iter().any(|r| r.sentence_id.is_none());

	let mut matched_right: Vec<bool> = vec![false; right.rows.len()];
	let mut rows = Vec::new();
	for lrow in &left.rows {
		let Some(ld) = lrow.date(&cond.left_key) else {
			if cond.join_type == JoinType::Left {
				rows.push(lrow.clone());
			}
			continue;
		};
		let mut any_match = false;
		for (ri, rrow) in right.rows.iter().enumerate() {
			if !row_keys_align(lrow, rrow, mixed_granularity) {
				continue;
			}
			let Some(rd) = rrow.date(&cond.right_key) else { continue };
			if strategy.matches(ld, rd, &cond.predicate) {
				any_match = true;
				matched_right[ri] = true;
				rows.push(merge(lrow, rrow, right_alias, mixed_granularity));
			}
		}
		if !any_match && cond.join_type == JoinType::Left {
			rows.push(lrow.clone());
		}
	}
	if cond.join_type == JoinType::Right {
		for (ri, rrow) in right.rows.iter().enumerate() {
			if !matched_right[ri] {
				rows.push(rename_as_left(rrow, right_alias));
			}
		}
	}
	Ok(Table { rows })
}

/// The natural join key beyond the date predicate: `document_id` alone when
/// either side is document-level, `(document_id, sentence_id)` when both
/// sides are sentence-level.
fn row_keys_align(left: &TableRow, right: &TableRow, mixed_granularity: bool) -> bool {
	if mixed_granularity || left.sentence_id.is_none() || right.sentence_id.is_none() {
		left.document_id == right.document_id
	} else {
		left.document_id == right.document_id && left.sentence_id == right.sentence_id
	}
}

fn merge(left: &TableRow, right: &TableRow, right_alias: &str, mixed_granularity: bool) -> TableRow {
	let mut columns = left.columns.clone();
	for (k, v) in &right.columns {
		columns.insert(format!("{right_alias}_{k}"), v.clone());
	}
	TableRow {
		document_id: left.document_id,
		sentence_id: if mixed_granularity { None } else { left.sentence_id },
		columns,
		is_join_result: true,
		right_document_id: Some(right.document_id),
		right_sentence_id: if mixed_granularity { None } else { right.sentence_id },
	}
}

fn rename_as_left(right: &TableRow, right_alias: &str) -> TableRow {
	let columns = right.columns.iter().map(|(k, v)| (format!("{right_alias}_{k}"), v.clone())).collect();
	TableRow {
		document_id: right.document_id,
		sentence_id: right.sentence_id,
		columns,
		is_join_result: true,
		right_document_id: Some(right.document_id),
		right_sentence_id: right.sentence_id,
	}
}
