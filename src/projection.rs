//! Result projection. Evaluates the SELECT list against a materialised
//! [`Table`] plus the corpus collaborators, then applies ORDER BY and
//! LIMIT.

use crate::ast::{OrderSpec, SelectColumn};
use crate::corpus::{CorpusMetadata, SnippetSource};
use crate::err::Error;
use crate::join::Table;
use crate::model::MatchValue;

/// A fully projected result: column names plus stringified cell values, in
/// final (sorted, limited) row order. Cells are stringified because ORDER BY
/// sorts lexicographically across heterogeneous column types.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RowSet {
	pub columns: Vec<String>,
	pub rows: Vec<Vec<String>>,
}

pub fn project(
	table: &Table,
	select: &[SelectColumn],
	order_by: &[OrderSpec],
	limit: Option<usize>,
	corpus: &dyn CorpusMetadata,
	snippets: &dyn SnippetSource,
) -> Result<RowSet, Error> {
	if select.iter().any(|c| matches!(c, SelectColumn::CountStar | SelectColumn::CountUnique(_) | SelectColumn::CountDocuments))
	{
		return Ok(project_aggregate(table, select));
	}

	let columns: Vec<String> = select.iter().map(column_label).collect();
	let mut rows = Vec::new();
	for row in &table.rows {
		for expanded in expand_row(row, select, corpus, snippets)? {
			rows.push(expanded);
		}
	}

	sort_rows(&columns, &mut rows, order_by);
	if let Some(n) = limit {
		rows.truncate(n);
	}
	Ok(RowSet { columns, rows })
}

fn column_label(column: &SelectColumn) -> String {
	match column {
		SelectColumn::Identifier(name) => name.clone(),
		SelectColumn::Variable(name) => name.clone(),
		SelectColumn::Snippet { variable, .. } => format!("snippet({variable})"),
		SelectColumn::CountStar => "count".into(),
		SelectColumn::CountUnique(name) => format!("count_unique({name})"),
		SelectColumn::CountDocuments => "count_documents".into(),
		SelectColumn::Title => "title".into(),
		SelectColumn::Timestamp => "timestamp".into(),
	}
}

/// Cross-product expansion for multi-valued variables within one
/// `(docId, sentId)` row. Columns that aren't multi-valued
/// (TITLE, TIMESTAMP, a single-valued variable) repeat unchanged across the
/// expansion.
fn expand_row(
	row: &crate::join::TableRow,
	select: &[SelectColumn],
	corpus: &dyn CorpusMetadata,
	snippets: &dyn SnippetSource,
) -> Result<Vec<Vec<String>>, Error> {
	let width = select
		.iter()
		.map(|c| match c {
			SelectColumn::Variable(name) | SelectColumn::Snippet { variable: name, .. } => {
				row.columns.get(name).map(|v| v.len()).unwrap_or(1).max(1)
			}
			_ => 1,
		})
		.max()
		.unwrap_or(1);

	let mut out = Vec::with_capacity(width);
	for i in 0..width {
		let mut cells = Vec::with_capacity(select.len());
		for column in select {
			cells.push(cell_value(row, column, i, corpus, snippets)?);
		}
		out.push(cells);
	}
	Ok(out)
}

fn cell_value(
	row: &crate::join::TableRow,
	column: &SelectColumn,
	index: usize,
	corpus: &dyn CorpusMetadata,
	snippets: &dyn SnippetSource,
) -> Result<String, Error> {
	match column {
		SelectColumn::Title => Ok(corpus.title(row.document_id).unwrap_or_default()),
		SelectColumn::Timestamp => Ok(corpus
			.timestamp(row.document_id)
			.map(|t| t.to_string())
			.unwrap_or_default()),
		// `document_id`/`sentence_id` are row identity, not captured
		// variables; every other IDENTIFIER/VARIABLE name reads the
		// matching captured column.
		SelectColumn::Identifier(name) if name == "document_id" => Ok(row.document_id.to_string()),
		SelectColumn::Identifier(name) if name == "sentence_id" => {
			Ok(row.sentence_id.map(|s| s.to_string()).unwrap_or_default())
		}
		SelectColumn::Identifier(name) | SelectColumn::Variable(name) => {
			let values = row.columns.get(name);
			Ok(values
				.and_then(|v| v.get(index).or_else(|| v.first()))
				.map(|c| c.value.to_string())
				.unwrap_or_default())
		}
		SelectColumn::Snippet {
			variable,
			surrounding_sentences,
		} => {
			let values = row.columns.get(variable);
			let position = values.and_then(|v| v.get(index).or_else(|| v.first())).map(|c| c.position);
			Ok(match position {
				Some(p) => snippets.snippet(&p, *surrounding_sentences).unwrap_or_default(),
				None => String::new(),
			})
		}
		SelectColumn::CountStar | SelectColumn::CountUnique(_) | SelectColumn::CountDocuments => {
			unreachable!("aggregate columns are handled by project_aggregate")
		}
	}
}

/// COUNT(*) / COUNT_UNIQUE(?v) / COUNT_DOCUMENTS each collapse the whole
/// table to a single row; mixing an aggregate with a
/// non-aggregate column is not a shape this engine supports today, so the
/// first aggregate column present wins and any others named alongside it are
/// evaluated independently against the same table.
fn project_aggregate(table: &Table, select: &[SelectColumn]) -> RowSet {
	let columns: Vec<String> = select.iter().map(column_label).collect();
	let mut cells = Vec::with_capacity(select.len());
	for column in select {
		let value = match column {
			SelectColumn::CountStar => table.rows.len(),
			SelectColumn::CountUnique(name) => {
				let mut seen = std::collections::HashSet::new();
				for row in &table.rows {
					if let Some(values) = row.columns.get(name) {
						for v in values {
							seen.insert(v.value.to_string());
						}
					}
				}
				seen.len()
			}
			SelectColumn::CountDocuments => {
				let docs: std::collections::BTreeSet<u64> = table.rows.iter().map(|r| r.document_id).collect();
				docs.len()
			}
			_ => 0,
		};
		cells.push(value.to_string());
	}
	RowSet {
		columns,
		rows: vec![cells],
	}
}

fn sort_rows(columns: &[String], rows: &mut [Vec<String>], order_by: &[OrderSpec]) {
	if order_by.is_empty() {
		return;
	}
	let indices: Vec<(usize, bool)> = order_by
		.iter()
		.filter_map(|spec| columns.iter().position(|c| c == &spec.column).map(|i| (i, spec.descending)))
		.collect();
	rows.sort_by(|a, b| {
		for &(i, descending) in &indices {
			let ord = a[i].cmp(&b[i]);
			let ord = if descending { ord.reverse() } else { ord };
			if ord != std::cmp::Ordering::Equal {
				return ord;
			}
		}
		std::cmp::Ordering::Equal
	});
}
