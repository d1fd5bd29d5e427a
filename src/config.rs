/// Engine-wide configuration, constructed once per run and passed by
/// reference through the call chain rather than stored as ambient state.
#[derive(Debug, Clone)]
pub struct EngineConfig {
	/// The index-set name named by the query's `FROM` clause.
	pub index_set_name: String,
	/// Entries pulled per [`crate::index::PositionIterator::next`] batch
	/// before a cancellation check; recommended range 1..=1024.
	pub iterator_batch_size: u32,
}

impl EngineConfig {
	pub fn new(index_set_name: impl Into<String>) -> Self {
		Self {
			index_set_name: index_set_name.into(),
			iterator_batch_size: 256,
		}
	}

	pub fn with_batch_size(mut self, size: u32) -> Self {
		self.iterator_batch_size = size;
		self
	}
}
