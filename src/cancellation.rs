use crate::err::Error;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// A caller-supplied cooperative cancellation signal. Checked between
/// top-level condition evaluations and between iterator batches; the engine
/// has no suspension points of its own, so this is a plain flag rather than
/// anything futures-aware.
#[derive(Debug, Clone, Default)]
pub struct CancellationToken(Arc<AtomicBool>);

impl CancellationToken {
	pub fn new() -> Self {
		Self(Arc::new(AtomicBool::new(false)))
	}

	pub fn cancel(&self) {
		self.0.store(true, Ordering::SeqCst);
	}

	pub fn is_cancelled(&self) -> bool {
		self.0.load(Ordering::Relaxed)
	}
}

/// Checks a [`CancellationToken`] once per configured batch of iterator
/// pulls, rather than on every pull — the batch size an executor's loop
/// runs against is [`crate::config::EngineConfig::iterator_batch_size`].
/// Always checks on the first `tick`, so a token cancelled before the loop
/// starts is still caught immediately.
pub struct BatchedCancelCheck<'a> {
	token: &'a CancellationToken,
	batch_size: u32,
	count: u32,
}

impl<'a> BatchedCancelCheck<'a> {
	pub fn new(token: &'a CancellationToken, batch_size: u32) -> Self {
		Self {
			token,
			batch_size: batch_size.max(1),
			count: 0,
		}
	}

	pub fn tick(&mut self) -> Result<(), Error> {
		self.count += 1;
		if self.count % self.batch_size == 1 && self.token.is_cancelled() {
			return Err(Error::Cancelled);
		}
		Ok(())
	}
}
