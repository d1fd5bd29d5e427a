//! Collaborator contracts named but not implemented by this crate: the
//! corpus metadata store and the text access needed to render `SNIPPET`.
//! Both are out of scope for this engine — it only needs a trait-shaped
//! seam to call through, the same way the teacher treats
//! `kvs::Transaction` as consumed-not-reimplemented at module boundaries
//! that fall outside a given crate's concern.

use crate::model::Position;

/// Maps a document id to its title and timestamp.
pub trait CorpusMetadata {
	fn title(&self, doc_id: u64) -> Option<String>;
	fn timestamp(&self, doc_id: u64) -> Option<chrono::NaiveDateTime>;
}

/// Renders the `k` sentences surrounding a binding position for
/// `SNIPPET(?v, k)`. External text access, out of scope.
pub trait SnippetSource {
	fn snippet(&self, position: &Position, surrounding_sentences: usize) -> Option<String>;
}

/// A `CorpusMetadata`/`SnippetSource` with nothing behind it — useful for
/// queries that never select `TITLE`, `TIMESTAMP` or `SNIPPET`, and for
/// tests that only exercise condition execution.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoCorpus;

impl CorpusMetadata for NoCorpus {
	fn title(&self, _doc_id: u64) -> Option<String> {
		None
	}

	fn timestamp(&self, _doc_id: u64) -> Option<chrono::NaiveDateTime> {
		None
	}
}

impl SnippetSource for NoCorpus {
	fn snippet(&self, _position: &Position, _surrounding_sentences: usize) -> Option<String> {
		None
	}
}
