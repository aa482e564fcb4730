/// Soft limit for one batch, leaving headroom under the hard Telegram
/// message length limit for one more entry and some markup.
pub const SOFT_BATCH_LIMIT: usize = 4000;

/// Accumulates lines of a listing reply into batches, flushing the current
/// batch whenever adding the next line would take it over the soft limit.
///
/// A single line that is longer than the limit on its own still gets a batch
/// to itself; splitting it further is left to [`SplitOverLength`].
///
/// [`SplitOverLength`]: super::SplitOverLength
#[derive(Clone, Debug)]
pub struct ReplyBatcher {
    soft_limit: usize,
    current: String,
    current_chars: usize,
    batches: Vec<String>,
}

impl ReplyBatcher {
    #[must_use]
    pub fn new(soft_limit: usize) -> Self {
        ReplyBatcher {
            soft_limit,
            current: String::new(),
            current_chars: 0,
            batches: Vec::new(),
        }
    }

    /// Add a line. A newline is inserted between lines of the same batch.
    pub fn push(&mut self, line: &str) {
        let line_chars = line.chars().count();
        let separator = usize::from(!self.current.is_empty());

        if self.current_chars + separator + line_chars > self.soft_limit {
            self.flush();
        }

        if !self.current.is_empty() {
            self.current.push('\n');
            self.current_chars += 1;
        }
        self.current.push_str(line);
        self.current_chars += line_chars;
    }

    /// Returns `true` if nothing was pushed yet.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.current.is_empty() && self.batches.is_empty()
    }

    /// Finish and return all the batches, in order.
    #[must_use]
    pub fn finish(mut self) -> Vec<String> {
        self.flush();
        self.batches
    }

    fn flush(&mut self) {
        if !self.current.is_empty() {
            self.batches.push(std::mem::take(&mut self.current));
            self.current_chars = 0;
        }
    }
}

impl Default for ReplyBatcher {
    fn default() -> Self {
        ReplyBatcher::new(SOFT_BATCH_LIMIT)
    }
}
