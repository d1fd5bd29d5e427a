use super::Position;
use chrono::NaiveDate;
use std::hash::{Hash, Hasher};

/// An opaque identifier of the originating predicate instance. Stable within
/// one query execution; wrapped rather than a bare `String` so it can't be
/// accidentally compared against arbitrary text elsewhere in the engine.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ConditionTag(pub String);

impl ConditionTag {
	pub fn new(tag: impl Into<String>) -> Self {
		Self(tag.into())
	}
}

impl std::fmt::Display for ConditionTag {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		write!(f, "{}", self.0)
	}
}

impl From<&str> for ConditionTag {
	fn from(s: &str) -> Self {
		Self(s.to_owned())
	}
}

/// The typed payload a [`MatchDetail`] carries.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum MatchValue {
	Term(String),
	Entity(String),
	Dependency(String),
	Pos(String),
	Date(NaiveDate),
	Count(u64),
}

impl MatchValue {
	/// The placeholder value NOT emits for synthetic universe members.
	pub fn placeholder() -> Self {
		MatchValue::Term(String::new())
	}

	pub fn as_str(&self) -> Option<&str> {
		match self {
			MatchValue::Term(s) | MatchValue::Entity(s) | MatchValue::Dependency(s) | MatchValue::Pos(s) => {
				Some(s)
			}
			MatchValue::Date(_) | MatchValue::Count(_) => None,
		}
	}
}

impl std::fmt::Display for MatchValue {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		match self {
			MatchValue::Term(s) | MatchValue::Entity(s) | MatchValue::Dependency(s) | MatchValue::Pos(s) => {
				write!(f, "{s}")
			}
			MatchValue::Date(d) => write!(f, "{d}"),
			MatchValue::Count(n) => write!(f, "{n}"),
		}
	}
}

/// A variable binding projected from a [`MatchDetail`]. Variable bindings
/// live directly on `MatchDetail` rather than a separate binding-context
/// object; this type is only materialised when a detail is pivoted into a
/// table or projected.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VariableBinding {
	pub variable_name: String,
	pub value: MatchValue,
	pub position: Position,
}

/// One occurrence of a predicate match. Immutable once constructed; equality
/// is by every field, but hashing (and therefore dedup-by-set-identity in OR)
/// only considers `(position, value, variable_name)` — `condition_tag`,
/// `is_join_result` and the right-side join fields are provenance, not
/// identity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MatchDetail {
	pub value: MatchValue,
	pub position: Position,
	pub condition_tag: ConditionTag,
	pub variable_name: Option<String>,
	pub is_join_result: bool,
	pub right_doc_id: Option<u64>,
	pub right_sent_id: Option<i64>,
}

impl MatchDetail {
	pub fn new(value: MatchValue, position: Position, condition_tag: ConditionTag) -> Self {
		Self {
			value,
			position,
			condition_tag,
			variable_name: None,
			is_join_result: false,
			right_doc_id: None,
			right_sent_id: None,
		}
	}

	pub fn with_variable(mut self, name: impl Into<String>) -> Self {
		self.variable_name = Some(name.into());
		self
	}

	pub fn as_binding(&self) -> Option<VariableBinding> {
		self.variable_name.as_ref().map(|name| VariableBinding {
			variable_name: name.clone(),
			value: self.value.clone(),
			position: self.position,
		})
	}

	/// NOT's synthetic universe markers: `value=""`, no condition-specific
	/// binding.
	pub fn placeholder(position: Position, condition_tag: ConditionTag) -> Self {
		Self::new(MatchValue::placeholder(), position, condition_tag)
	}

	/// The `(position, value, variableName)` triple OR uses as its
	/// set-identity key. `condition_tag` is provenance, not identity, so it
	/// is deliberately excluded here even though it participates in
	/// structural `PartialEq`.
	pub fn dedup_key(&self) -> (Position, MatchValue, Option<String>) {
		(self.position, self.value.clone(), self.variable_name.clone())
	}
}

impl Hash for MatchDetail {
	fn hash<H: Hasher>(&self, state: &mut H) {
		self.position.hash(state);
		self.value.hash(state);
		self.variable_name.hash(state);
	}
}
