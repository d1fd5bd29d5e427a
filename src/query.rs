//! Top-level query execution: the single entry point an embedder calls.
//! Wires together condition dispatch, subquery/join materialisation, and
//! result projection the way [`crate::dispatch::execute`] wires together
//! the per-predicate executors — this module is one level up, owning the
//! things a single condition executor has no business knowing about (the
//! join strategy registry, the corpus collaborators, ORDER BY/LIMIT).

use crate::ast::{Condition, Query, SelectColumn, SubquerySpec};
use crate::cancellation::CancellationToken;
use crate::config::EngineConfig;
use crate::corpus::{CorpusMetadata, SnippetSource};
use crate::err::Error;
use crate::executors::{ExecCtx, TagAllocator};
use crate::index::IndexAccess;
use crate::join::{self, JoinStrategyRegistry, Table};
use crate::model::QueryResult;
use crate::projection::{self, RowSet};
use std::collections::HashMap;
use tracing::instrument;

/// Runs a fully parsed [`Query`] to completion: condition dispatch, any
/// subquery/join layer, then result projection. The engine is embedded
/// behind this `run(query, indexes, ...) -> RowSet` call; parsing a query
/// string into a [`Query`] is a caller concern — `query` arrives here
/// already a validated AST.
#[instrument(skip_all, fields(from = %query.from))]
pub fn run(
	query: &Query,
	indexes: &dyn IndexAccess,
	corpus: &dyn CorpusMetadata,
	snippets: &dyn SnippetSource,
	cancel: &CancellationToken,
) -> Result<RowSet, Error> {
	let config = EngineConfig::new(query.from.clone());
	let tags = TagAllocator::new();
	let registry = JoinStrategyRegistry::with_defaults();
	let table = execute_to_table(query, indexes, &config, &tags, cancel, &registry)?;
	projection::project(&table, &query.select, &query.order_by, query.limit, corpus, snippets)
}

/// The condition-dispatch plus join-layer portion of [`run`], split out so
/// tests can inspect the materialised [`Table`] before projection collapses
/// it to strings.
fn execute_to_table(
	query: &Query,
	indexes: &dyn IndexAccess,
	config: &EngineConfig,
	tags: &TagAllocator,
	cancel: &CancellationToken,
	registry: &JoinStrategyRegistry,
) -> Result<Table, Error> {
	if cancel.is_cancelled() {
		return Err(Error::Cancelled);
	}
	let ctx = ExecCtx::new(indexes, query.granularity, query.window, cancel, config, tags);
	let result = match &query.where_ {
		Some(cond) => crate::dispatch::execute(cond, &ctx)?,
		None => QueryResult::empty(query.granularity, query.window),
	};
	let mut table = Table::from_query_result(&result);
	if query.joins.is_empty() {
		return Ok(table);
	}

	// Every subquery alias reachable from WHERE is a join handle: its result
	// is unique within a query and referenced by join predicates and
	// projection. Each is executed once (subqueries are pure against
	// read-only indexes, so re-running the one also folded
	// into the boolean composition above costs nothing but a second pass)
	// and pivoted into its own table, optionally narrowed to its declared
	// projection list.
	let mut alias_tables: HashMap<String, Table> = HashMap::new();
	if let Some(cond) = &query.where_ {
		collect_subquery_tables(cond, &ctx, &mut alias_tables)?;
	}
	alias_tables.insert(query.from.clone(), table.clone());

	for join_cond in &query.joins {
		if cancel.is_cancelled() {
			return Err(Error::Cancelled);
		}
		let left = alias_tables.get(&join_cond.left_alias).cloned().unwrap_or_default();
		let right = alias_tables.get(&join_cond.right_alias).ok_or_else(|| {
			Error::InvalidCondition(format!("join references unknown alias '{}'", join_cond.right_alias))
		})?;
		let joined = join::execute(&left, right, &join_cond.right_alias, join_cond, registry)?;
		alias_tables.insert(join_cond.left_alias.clone(), joined.clone());
		table = joined;
	}
	Ok(table)
}

fn collect_subquery_tables(cond: &Condition, ctx: &ExecCtx, out: &mut HashMap<String, Table>) -> Result<(), Error> {
	match cond {
		Condition::Subquery(spec) => {
			if !out.contains_key(&spec.alias) {
				let result = run_subquery(spec, ctx)?;
				let mut table = Table::from_query_result(&result);
				if let Some(proj) = &spec.projection {
					restrict_columns(&mut table, proj);
				}
				out.insert(spec.alias.clone(), table);
			}
			Ok(())
		}
		Condition::Not(child) => collect_subquery_tables(child, ctx, out),
		Condition::And(children) | Condition::Or(children) => {
			for child in children {
				collect_subquery_tables(child, ctx, out)?;
			}
			Ok(())
		}
		_ => Ok(()),
	}
}

/// Narrows a subquery's materialised table to the variable columns its
/// optional `projection` list names; select columns that don't name a row
/// column (TITLE, COUNT(*), ...) have nothing to narrow and are left for
/// the final projection stage to evaluate.
fn restrict_columns(table: &mut Table, projection: &[SelectColumn]) {
	let keep: std::collections::HashSet<&str> = projection
		.iter()
		.filter_map(|c| match c {
			SelectColumn::Variable(name) | SelectColumn::Identifier(name) => Some(name.as_str()),
			_ => None,
		})
		.collect();
	if keep.is_empty() {
		return;
	}
	for row in &mut table.rows {
		row.columns.retain(|k, _| keep.contains(k.as_str()));
	}
}

/// Executes a `{ query }` subquery as an ordinary condition: recurses
/// through the same dispatch used for top-level conditions, at the
/// subquery's own granularity/window. Subqueries inherit the outer
/// granularity unless they declare their own, and that inheritance is
/// already resolved upstream of this crate, so `spec.query.granularity`/
/// `window` are always authoritative here. Its result participates in the
/// enclosing AND/OR/NOT exactly like any other condition;
/// [`collect_subquery_tables`] re-executes it separately when a `JOIN`
/// also references its alias.
pub(crate) fn run_subquery(spec: &SubquerySpec, ctx: &ExecCtx) -> Result<QueryResult, Error> {
	let nested = ctx.with_granularity_and_window(spec.query.granularity, spec.query.window);
	match &spec.query.where_ {
		Some(cond) => crate::dispatch::execute(cond, &nested),
		None => Ok(QueryResult::empty(nested.granularity, nested.window)),
	}
}
