use teloxide::types::ChatId;
use url::Url;

use crate::formatting::percent_encode;

/// Links that let people act on a chat's gating.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BlinkLinks {
    /// Solana Action endpoint for the chat and address.
    pub blink: String,
    /// Same action, opened through dial.to.
    pub dialect: String,
}

impl BlinkLinks {
    #[must_use]
    pub fn new(base: &Url, dial_cluster: &str, chat_id: ChatId, address: &str) -> Self {
        let base = base.as_str().trim_end_matches('/');
        let blink = format!(
            "{base}/api/actions/start/{}/{}",
            chat_id,
            percent_encode(address)
        );
        let dialect = format!(
            "https://dial.to/{}?action={}",
            dial_cluster,
            percent_encode(&format!("solana-action:{blink}"))
        );

        BlinkLinks { blink, dialect }
    }
}
