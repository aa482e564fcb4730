use std::future::Future;

use teloxide::{
    payloads::SendMessageSetters,
    requests::Requester,
    sugar::request::RequestReplyExt,
    types::{Message, MessageId, ParseMode, Recipient},
    Bot, RequestError,
};

use crate::teloxide_retry;

/// Maximum length of a single Telegram text message, in characters.
pub const MESSAGE_LENGTH_LIMIT: usize = 4096;

pub trait BotSendLong {
    /// Opinionated method to send a message, with HTML markup,
    /// and retries due to flood waiting. Also splits the message into
    /// many if it's longer than the character limit.
    ///
    /// Only the first sent piece replies to `reply_to`.
    fn send_long<'a>(
        &'a self,
        to_where: impl Into<Recipient> + Send,
        text: impl Into<&'a str> + Send,
        reply_to: impl Into<Option<MessageId>> + Send,
    ) -> impl Future<Output = Result<Vec<Message>, RequestError>> + Send;
}

impl BotSendLong for Bot {
    async fn send_long<'a>(
        &'a self,
        to_where: impl Into<Recipient> + Send,
        text: impl Into<&'a str> + Send,
        reply_to: impl Into<Option<MessageId>> + Send,
    ) -> Result<Vec<Message>, RequestError> {
        let to_where: Recipient = to_where.into();
        let mut reply_to = reply_to.into();
        let mut sent_messages = Vec::new();

        for piece in SplitOverLength::new(text.into(), MESSAGE_LENGTH_LIMIT) {
            let message = teloxide_retry!({
                let mut request = self
                    .send_message(to_where.clone(), piece)
                    .parse_mode(ParseMode::Html);
                if let Some(reply_to) = reply_to {
                    request = request.reply_to(reply_to);
                }
                request.await
            })?;

            reply_to = None;
            sent_messages.push(message);
        }

        Ok(sent_messages)
    }
}

/// Iterator that splits text into pieces, all of which are at most
/// a specified amount of characters long.
///
/// Prefers to cut at the last newline that fits, then at the last
/// whitespace, and only then in the middle of a word. Whitespace at the
/// edges of each piece is dropped, and empty pieces are never returned.
#[derive(Clone, Debug)]
pub struct SplitOverLength<'a> {
    data: &'a str,
    max_chars: usize,
}

impl<'a> SplitOverLength<'a> {
    /// Create a new splitter with specified max length in characters.
    ///
    /// # Panics
    /// Panics if a max length of 0 is specified.
    #[must_use]
    pub fn new(data: &'a str, max_chars: usize) -> Self {
        assert!(max_chars > 0, "Max length is too small");
        SplitOverLength { data, max_chars }
    }
}

impl<'a> Iterator for SplitOverLength<'a> {
    type Item = &'a str;

    fn next(&mut self) -> Option<Self::Item> {
        self.data = self.data.trim_start();
        if self.data.is_empty() {
            return None;
        }

        // Byte offset right after the last character that still fits.
        let Some((hard_end, _)) = self.data.char_indices().nth(self.max_chars) else {
            // The whole thing fits.
            let output = self.data.trim_end();
            self.data = "";
            return Some(output);
        };

        let window = &self.data[..hard_end];
        let cut = window
            .rfind('\n')
            .or_else(|| window.rfind(char::is_whitespace))
            .filter(|&at| !window[..at].trim().is_empty())
            .unwrap_or(hard_end);

        let output = self.data[..cut].trim_end();
        self.data = &self.data[cut..];
        Some(output)
    }
}
