//! Maps a [`Condition`] to its executor, recursing into the logical and
//! negation combinators and the subquery layer. This is the single place
//! that knows about every `Condition` variant; executors themselves only
//! know their own predicate.

use crate::ast::Condition;
use crate::err::Error;
use crate::executors::{contains, dependency, logical, negate, ner, pos, temporal, ExecCtx};
use crate::model::QueryResult;

pub fn execute(condition: &Condition, ctx: &ExecCtx) -> Result<QueryResult, Error> {
	let result = execute_inner(condition, ctx);
	result.map_err(|e| e.in_condition("query", condition_tag_hint(condition)))
}

fn execute_inner(condition: &Condition, ctx: &ExecCtx) -> Result<QueryResult, Error> {
	match condition {
		Condition::Contains { terms, variable } => contains::execute(terms, variable.as_deref(), ctx),
		Condition::Ner { entity_type, target } => ner::execute(entity_type, target, ctx),
		Condition::Pos { tag, term } => pos::execute(tag, term, ctx),
		Condition::Dependency {
			relation,
			governor,
			dependent,
		} => dependency::execute(relation, governor, dependent, ctx),
		Condition::Temporal(spec) => temporal::execute(spec, ctx),
		Condition::Not(child) => {
			let excluded = execute(child, ctx)?;
			negate::execute(&excluded, ctx)
		}
		Condition::And(children) => logical::and(children, ctx, execute),
		Condition::Or(children) => logical::or(children, ctx, execute),
		Condition::Subquery(spec) => crate::query::run_subquery(spec, ctx),
	}
}

fn condition_tag_hint(condition: &Condition) -> &'static str {
	match condition {
		Condition::Contains { .. } => "contains",
		Condition::Ner { .. } => "ner",
		Condition::Pos { .. } => "pos",
		Condition::Dependency { .. } => "dependency",
		Condition::Temporal(_) => "temporal",
		Condition::Not(_) => "not",
		Condition::And(_) => "and",
		Condition::Or(_) => "or",
		Condition::Subquery(_) => "subquery",
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::ast::Arg;
	use crate::cancellation::CancellationToken;
	use crate::config::EngineConfig;
	use crate::executors::TagAllocator;
	use crate::index::mem::MemIndexSet;
	use crate::model::{Granularity, Position, PositionList};

	#[test]
	fn dispatches_contains_through_to_its_executor() {
		let mut idx = MemIndexSet::new();
		let mut list = PositionList::new();
		list.push(Position::new_document(1, 0, 5));
		idx.insert(crate::index::IndexName::Unigram, b"apple".to_vec(), list);
		let cancel = CancellationToken::new();
		let config = EngineConfig::new("t");
		let tags = TagAllocator::new();
		let c = ExecCtx::new(&idx, Granularity::Document, 0, &cancel, &config, &tags);
		let cond = Condition::Contains {
			terms: vec!["apple".into()],
			variable: None,
		};
		let result = execute(&cond, &c).unwrap();
		assert_eq!(result.details.len(), 1);
	}

	#[test]
	fn dispatches_not_by_recursing_into_child_then_negate() {
		let mut idx = MemIndexSet::new();
		let mut list = PositionList::new();
		list.push(Position::new_document(1, 0, 5));
		list.push(Position::new_document(2, 0, 5));
		idx.insert(crate::index::IndexName::Unigram, b"apple".to_vec(), list);
		let cancel = CancellationToken::new();
		let config = EngineConfig::new("t");
		let tags = TagAllocator::new();
		let c = ExecCtx::new(&idx, Granularity::Document, 0, &cancel, &config, &tags);
		let cond = Condition::Not(Box::new(Condition::Contains {
			terms: vec!["apple".into()],
			variable: None,
		}));
		let result = execute(&cond, &c).unwrap();
		assert_eq!(result.doc_ids(), std::collections::BTreeSet::new());
	}

	#[test]
	fn missing_index_error_is_wrapped_with_condition_context() {
		let idx = MemIndexSet::new();
		let cancel = CancellationToken::new();
		let config = EngineConfig::new("t");
		let tags = TagAllocator::new();
		let c = ExecCtx::new(&idx, Granularity::Document, 0, &cancel, &config, &tags);
		let cond = Condition::Ner {
			entity_type: Arg::Literal("PERSON".into()),
			target: Arg::Wildcard,
		};
		let err = execute(&cond, &c).unwrap_err();
		assert!(matches!(err, Error::InCondition { .. }));
	}
}
