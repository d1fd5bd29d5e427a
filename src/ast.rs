//! The parsed-query AST this engine consumes. The grammar/parser that
//! produces it is out of scope for this crate; these types are the "Model
//! Builder" boundary between a parser and the execution engine. This crate
//! implements a single canonical grammar (TEMPORAL keyword present,
//! DEPENDENCY spelled out, OR present) — near-duplicate grammar variants
//! present in some corpora's original query syntax are not represented
//! here.

use crate::model::Granularity;
use chrono::NaiveDate;

/// Either a literal value or a captured variable — the shape every
/// wildcard-capable predicate argument takes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Arg {
	Literal(String),
	Variable(String),
	Wildcard,
}

impl Arg {
	pub fn variable_name(&self) -> Option<&str> {
		match self {
			Arg::Variable(v) => Some(v),
			_ => None,
		}
	}

	pub fn literal(&self) -> Option<&str> {
		match self {
			Arg::Literal(s) => Some(s),
			_ => None,
		}
	}

	pub fn is_wildcard(&self) -> bool {
		matches!(self, Arg::Wildcard)
	}
}

/// A governor/dependent slot in a DEPENDENCY predicate. Unlike [`Arg`], a
/// dependency slot can't be an unbound "search for any value" variable —
/// the executor only ever does an exact probe, so both `governor` and
/// `dependent` must supply the literal text that makes up the key. `Bound`
/// is the same literal text, additionally captured into a variable for
/// downstream use (the same "variable term" flag CONTAINS carries, just
/// per-slot here since a dependency triple has two candidate bind
/// positions).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DepArg {
	Literal(String),
	Bound(String, String),
	Wildcard,
}

impl DepArg {
	pub fn text(&self) -> Option<&str> {
		match self {
			DepArg::Literal(s) | DepArg::Bound(s, _) => Some(s),
			DepArg::Wildcard => None,
		}
	}

	pub fn bound_variable(&self) -> Option<&str> {
		match self {
			DepArg::Bound(_, v) => Some(v),
			_ => None,
		}
	}
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RadiusUnit {
	Day,
	Week,
	Month,
	Year,
}

impl std::str::FromStr for RadiusUnit {
	type Err = ();

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		match s {
			"day" => Ok(RadiusUnit::Day),
			"week" => Ok(RadiusUnit::Week),
			"month" => Ok(RadiusUnit::Month),
			"year" => Ok(RadiusUnit::Year),
			_ => Err(()),
		}
	}
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Radius {
	pub amount: i64,
	pub unit: RadiusUnit,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TemporalOp {
	Before,
	After,
	Equal,
}

/// TEMPORAL predicate bodies.
#[derive(Debug, Clone, PartialEq)]
pub enum TemporalSpec {
	Before(NaiveDate),
	After(NaiveDate),
	Between(NaiveDate, NaiveDate),
	Near {
		date: NaiveDate,
		radius: Radius,
	},
	Equal(NaiveDate),
	/// `DATE(?v)` optionally augmented by an operator-date pair.
	Variable {
		variable: String,
		op: Option<(TemporalOp, NaiveDate)>,
	},
}

/// One WHERE-clause predicate or combinator.
#[derive(Debug, Clone, PartialEq)]
pub enum Condition {
	Contains {
		terms: Vec<String>,
		variable: Option<String>,
	},
	Ner {
		entity_type: Arg,
		target: Arg,
	},
	Pos {
		tag: Arg,
		term: Arg,
	},
	Dependency {
		relation: String,
		governor: DepArg,
		dependent: DepArg,
	},
	Temporal(TemporalSpec),
	Not(Box<Condition>),
	And(Vec<Condition>),
	Or(Vec<Condition>),
	Subquery(Box<SubquerySpec>),
}

/// Column selection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SelectColumn {
	Identifier(String),
	Variable(String),
	Snippet {
		variable: String,
		surrounding_sentences: usize,
	},
	CountStar,
	CountUnique(String),
	CountDocuments,
	Title,
	Timestamp,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderSpec {
	pub column: String,
	pub descending: bool,
}

/// Temporal join predicates over two date-bearing columns.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JoinPredicate {
	Equal,
	Contains,
	ContainedBy,
	Intersect,
	Proximity(u32),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JoinType {
	Inner,
	Left,
	Right,
}

/// Joins a left table/alias column against a right one under a temporal
/// predicate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JoinCondition {
	pub left_alias: String,
	pub left_key: String,
	pub right_alias: String,
	pub right_key: String,
	pub join_type: JoinType,
	pub predicate: JoinPredicate,
}

/// A `{ query }` subquery with a join handle.
#[derive(Debug, Clone, PartialEq)]
pub struct SubquerySpec {
	pub query: Query,
	pub alias: String,
	pub projection: Option<Vec<SelectColumn>>,
}

/// A full parsed query. Subqueries inherit the outer granularity unless
/// `granularity` is set explicitly on the nested `Query`; `joins` names
/// how subquery tables combine, referencing aliases declared by
/// `Condition::Subquery` nodes reachable from `where_`.
#[derive(Debug, Clone, PartialEq)]
pub struct Query {
	pub select: Vec<SelectColumn>,
	pub from: String,
	pub where_: Option<Condition>,
	pub order_by: Vec<OrderSpec>,
	pub limit: Option<usize>,
	pub granularity: Granularity,
	pub window: usize,
	pub joins: Vec<JoinCondition>,
}

impl Query {
	pub fn new(from: impl Into<String>, granularity: Granularity) -> Self {
		Self {
			select: Vec::new(),
			from: from.into(),
			where_: None,
			order_by: Vec::new(),
			limit: None,
			granularity,
			window: 0,
			joins: Vec::new(),
		}
	}
}
