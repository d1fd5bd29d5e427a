//! Column-oriented materialisation of a [`QueryResult`]. Every executor
//! result and every join output takes this shape, so the projection layer
//! only ever has to know how to read a `Table`.

use crate::model::{Granularity, MatchValue, Position, QueryResult};
use chrono::NaiveDate;
use std::collections::{BTreeMap, HashMap};

/// One value a variable captured at this row's key, paired with the
/// position it was captured at (needed for `SNIPPET`, which renders text
/// surrounding a binding's position).
#[derive(Debug, Clone, PartialEq)]
pub struct ColumnValue {
	pub value: MatchValue,
	pub position: Position,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct TableRow {
	pub document_id: u64,
	pub sentence_id: Option<i64>,
	/// Every value is a `Vec` rather than a single slot: a variable can bind
	/// more than once within the same `(docId, sentId)` group, and
	/// projection expands that into one output row per value.
	pub columns: HashMap<String, Vec<ColumnValue>>,
	/// Set only on rows produced by [`crate::join::execute`]: each produced
	/// joined row carries its right-side document/sentence id alongside the
	/// merged columns.
	pub is_join_result: bool,
	pub right_document_id: Option<u64>,
	pub right_sentence_id: Option<i64>,
}

impl TableRow {
	pub fn date(&self, key: &str) -> Option<NaiveDate> {
		self.columns.get(key)?.first().and_then(|c| match &c.value {
			MatchValue::Date(d) => Some(*d),
			_ => None,
		})
	}

	pub fn first_value(&self, key: &str) -> Option<&MatchValue> {
		self.columns.get(key)?.first().map(|c| &c.value)
	}
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Table {
	pub rows: Vec<TableRow>,
}

impl Table {
	/// Pivots a [`QueryResult`] into one row per `(documentId[, sentenceId])`
	/// key, folding every variable-bound detail at that key into a named
	/// column: at least `document_id`, optionally `sentence_id`, plus one
	/// column per captured variable.
	pub fn from_query_result(result: &QueryResult) -> Self {
		let mut rows: BTreeMap<(u64, Option<i64>), TableRow> = BTreeMap::new();
		for d in &result.details {
			let key = match result.granularity {
				Granularity::Document => (d.position.doc_id, None),
				Granularity::Sentence => (d.position.doc_id, Some(d.position.sent_id)),
			};
			let row = rows.entry(key).or_insert_with(|| TableRow {
				document_id: key.0,
				sentence_id: key.1,
				columns: HashMap::new(),
				is_join_result: false,
				right_document_id: None,
				right_sentence_id: None,
			});
			if let Some(var) = &d.variable_name {
				row.columns.entry(var.clone()).or_default().push(ColumnValue {
					value: d.value.clone(),
					position: d.position,
				});
			}
		}
		Self {
			rows: rows.into_values().collect(),
		}
	}

	pub fn is_empty(&self) -> bool {
		self.rows.is_empty()
	}
}
