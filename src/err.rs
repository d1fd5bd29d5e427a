use thiserror::Error;

/// The error taxonomy for the query engine.
///
/// Executors propagate these unchanged; the top-level [`crate::query::run`]
/// wraps them with query context (source name, condition tag) via
/// [`Error::in_condition`].
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum Error {
	#[error("parse error at offset {offset}: {message}")]
	Parse {
		message: String,
		offset: usize,
	},

	#[error("invalid condition: {0}")]
	InvalidCondition(String),

	#[error("missing index: {0}")]
	MissingIndex(String),

	#[error("index access error: {0}")]
	IndexAccessError(String),

	/// Executors do not return this variant on the wildcard/degrade paths a
	/// partial implementation might hit — those return
	/// `Ok(QueryResult::empty(..))` and `warn!` instead, so an unrecognised
	/// variant degrades the result rather than aborting the query. This
	/// variant exists for the rare case where a caller above this crate
	/// (e.g. the join strategy registry) needs to surface "no implementation
	/// is registered" as a hard error.
	#[error("unsupported: {0}")]
	Unsupported(String),

	#[error("query was cancelled")]
	Cancelled,

	/// A condition tag wraps an error with the originating predicate and
	/// query source, so a failure deep in AND/OR/NOT composition still names
	/// which leaf condition raised it.
	#[error("condition '{condition_tag}' in query '{source}': {source_err}")]
	InCondition {
		source: String,
		condition_tag: String,
		#[source]
		source_err: Box<Error>,
	},
}

impl Error {
	pub fn in_condition(self, source: impl Into<String>, condition_tag: impl Into<String>) -> Self {
		Error::InCondition {
			source: source.into(),
			condition_tag: condition_tag.into(),
			source_err: Box::new(self),
		}
	}

	/// The exit code a CLI wrapper built against this crate should return:
	/// 0 is never produced by this method (callers only consult it on
	/// `Err`), 1 for user-visible errors (parse or `MISSING_INDEX`), 2 for
	/// everything else. The parser and on-disk store that would back a
	/// runnable CLI are out-of-scope collaborators; this method is the seam
	/// such a wrapper maps its `process::exit` call onto.
	pub fn exit_code(&self) -> i32 {
		match self {
			Error::Parse { .. } | Error::MissingIndex(_) => 1,
			Error::InCondition { source_err, .. } => source_err.exit_code(),
			_ => 2,
		}
	}
}
