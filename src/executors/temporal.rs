//! TEMPORAL executor.
//!
//! Operates on `ner_date`: enumerated via a prefix scan over `DATE\0`, every
//! key's trailing field parsed as an ISO calendar date, then filtered by the
//! predicate. There is no exact-probe shortcut here (unlike CONTAINS/NER/POS)
//! because every predicate except `Equal`/`Variable` with an equality op
//! needs to compare the scanned date against a range, not a single key.

use super::ExecCtx;
use crate::ast::{TemporalOp, TemporalSpec};
use crate::err::Error;
use crate::index::{keys, IndexName};
use crate::model::{MatchValue, QueryResult};
use chrono::{Months, NaiveDate};

pub fn execute(spec: &TemporalSpec, ctx: &ExecCtx) -> Result<QueryResult, Error> {
	let index = IndexName::NerDate;
	if !ctx.indexes.has_index(index) {
		return Err(Error::MissingIndex(index.to_string()));
	}
	let tag = ctx.tags.next("temporal");

	let prefix = keys::prefix(&["DATE"]);
	debug!(index = %index, key_len = prefix.len(), granularity = ?ctx.granularity, "temporal: prefix scan");
	let mut it = ctx.indexes.iterator(index)?;
	it.seek(&prefix)?;
	let mut details = Vec::new();
	let mut cancel_check = crate::cancellation::BatchedCancelCheck::new(ctx.cancel, ctx.config.iterator_batch_size);
	while let Some((key, positions)) = it.next()? {
		cancel_check.tick()?;
		if !key.starts_with(&prefix) {
			break;
		}
		let Some(raw) = keys::suffix_after(&key, 1) else {
			continue;
		};
		let Some(date) = parse_date(raw) else {
			continue;
		};

		let (matches, variable) = match spec {
			TemporalSpec::Before(d) => (date < *d, None),
			TemporalSpec::After(d) => (date > *d, None),
			TemporalSpec::Equal(d) => (date == *d, None),
			TemporalSpec::Between(lo, hi) => (date >= *lo && date <= *hi, None),
			TemporalSpec::Near { date: center, radius } => {
				let Some((lo, hi)) = radius_bounds(*center, radius.amount, radius.unit) else {
					return Err(Error::InvalidCondition(format!("unsupported NEAR radius unit: {:?}", radius.unit)));
				};
				(date >= lo && date <= hi, None)
			}
			TemporalSpec::Variable { variable, op } => {
				let matches = match op {
					Some((TemporalOp::Before, d)) => date < *d,
					Some((TemporalOp::After, d)) => date > *d,
					Some((TemporalOp::Equal, d)) => date == *d,
					None => true,
				};
				(matches, Some(variable.as_str()))
			}
		};
		if !matches {
			continue;
		}
		details.extend(super::emit_grouped(&positions, ctx.granularity, &MatchValue::Date(date), variable, &tag));
	}
	let mut result = QueryResult::new(ctx.granularity, ctx.window, details);
	result.sort_deterministic();
	Ok(result)
}

fn parse_date(raw: &str) -> Option<NaiveDate> {
	if let Ok(d) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
		return Some(d);
	}
	raw.parse::<chrono::NaiveDateTime>().ok().map(|dt| dt.date())
}

/// Inclusive `[center - radius, center + radius]` bounds. `day`/`week` are
/// fixed-length; `month`/`year` follow the calendar (28-31 day months,
/// 365/366 day years) via `chrono::Months` rather than an average day count.
fn radius_bounds(center: NaiveDate, amount: i64, unit: crate::ast::RadiusUnit) -> Option<(NaiveDate, NaiveDate)> {
	use crate::ast::RadiusUnit;
	if amount < 0 {
		return None;
	}
	match unit {
		RadiusUnit::Day => {
			let d = chrono::Duration::days(amount);
			Some((center - d, center + d))
		}
		RadiusUnit::Week => {
			let d = chrono::Duration::weeks(amount);
			Some((center - d, center + d))
		}
		RadiusUnit::Month => {
			let months = Months::new(amount as u32);
			Some((center.checked_sub_months(months)?, center.checked_add_months(months)?))
		}
		RadiusUnit::Year => {
			let months = Months::new(amount as u32 * 12);
			Some((center.checked_sub_months(months)?, center.checked_add_months(months)?))
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::ast::{Radius, RadiusUnit};
	use crate::cancellation::CancellationToken;
	use crate::config::EngineConfig;
	use crate::executors::TagAllocator;
	use crate::index::mem::MemIndexSet;
	use crate::model::{Granularity, Position, PositionList};

	fn idx_with(dates: &[(&str, u64)]) -> MemIndexSet {
		let mut idx = MemIndexSet::new();
		for (d, doc) in dates {
			let mut list = PositionList::new();
			list.push(Position::new_document(*doc, 0, 1));
			idx.insert(IndexName::NerDate, keys::join(&["DATE", d]), list);
		}
		idx
	}

	fn ctx<'a>(
		indexes: &'a MemIndexSet,
		cancel: &'a CancellationToken,
		config: &'a EngineConfig,
		tags: &'a TagAllocator,
	) -> ExecCtx<'a> {
		ExecCtx::new(indexes, Granularity::Document, 0, cancel, config, tags)
	}

	#[test]
	fn before_filters_strictly_earlier_dates() {
		let idx = idx_with(&[("2020-01-01", 1), ("2020-06-01", 2), ("2021-01-01", 3)]);
		let cancel = CancellationToken::new();
		let config = EngineConfig::new("t");
		let tags = TagAllocator::new();
		let c = ctx(&idx, &cancel, &config, &tags);
		let spec = TemporalSpec::Before(NaiveDate::from_ymd_opt(2020, 6, 1).unwrap());
		let result = execute(&spec, &c).unwrap();
		assert_eq!(result.doc_ids(), [1].into_iter().collect());
	}

	#[test]
	fn between_is_inclusive() {
		let idx = idx_with(&[("2020-01-01", 1), ("2020-06-01", 2), ("2021-01-01", 3)]);
		let cancel = CancellationToken::new();
		let config = EngineConfig::new("t");
		let tags = TagAllocator::new();
		let c = ctx(&idx, &cancel, &config, &tags);
		let spec = TemporalSpec::Between(
			NaiveDate::from_ymd_opt(2020, 1, 1).unwrap(),
			NaiveDate::from_ymd_opt(2020, 6, 1).unwrap(),
		);
		let result = execute(&spec, &c).unwrap();
		assert_eq!(result.doc_ids(), [1, 2].into_iter().collect());
	}

	#[test]
	fn near_one_month_uses_calendar_months() {
		let idx = idx_with(&[("2020-02-29", 1), ("2020-04-15", 2)]);
		let cancel = CancellationToken::new();
		let config = EngineConfig::new("t");
		let tags = TagAllocator::new();
		let c = ctx(&idx, &cancel, &config, &tags);
		let spec = TemporalSpec::Near {
			date: NaiveDate::from_ymd_opt(2020, 3, 15).unwrap(),
			radius: Radius { amount: 1, unit: RadiusUnit::Month },
		};
		let result = execute(&spec, &c).unwrap();
		assert_eq!(result.doc_ids(), [1].into_iter().collect());
	}

	#[test]
	fn variable_with_no_op_binds_every_date() {
		let idx = idx_with(&[("2020-01-01", 1), ("2020-06-01", 2)]);
		let cancel = CancellationToken::new();
		let config = EngineConfig::new("t");
		let tags = TagAllocator::new();
		let c = ctx(&idx, &cancel, &config, &tags);
		let spec = TemporalSpec::Variable { variable: "d".into(), op: None };
		let result = execute(&spec, &c).unwrap();
		assert_eq!(result.details.len(), 2);
		assert!(result.details.iter().all(|d| d.variable_name.as_deref() == Some("d")));
	}

	#[test]
	fn unparseable_date_entries_are_skipped() {
		let mut idx = MemIndexSet::new();
		idx.insert(IndexName::NerDate, keys::join(&["DATE", "not-a-date"]), PositionList::new());
		idx.insert(IndexName::NerDate, keys::join(&["DATE", "2020-01-01"]), {
			let mut l = PositionList::new();
			l.push(Position::new_document(1, 0, 1));
			l
		});
		let cancel = CancellationToken::new();
		let config = EngineConfig::new("t");
		let tags = TagAllocator::new();
		let c = ctx(&idx, &cancel, &config, &tags);
		let spec = TemporalSpec::Variable { variable: "d".into(), op: None };
		let result = execute(&spec, &c).unwrap();
		assert_eq!(result.details.len(), 1);
	}
}
