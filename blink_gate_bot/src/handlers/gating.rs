use bot_commons::{
    is_sender_admin,
    useful_methods::{BotStuff, ReplyBatcher},
};
use chrono::{DateTime, Utc};
use html_escape::encode_text;
use teloxide::{types::Message, Bot};

use super::{reply, require_group_admin, Settings, ADMIN_ONLY, GROUP_ONLY};
use crate::{
    blink::BlinkLinks,
    database::{user_id_to_i64, GatingType, GroupGatingRecord, Store},
    error::Error,
    formatting::time_ago_or_fallback,
    misc::{chat_type_name, is_group_chat},
};

/// How gating timestamps are written down: seconds with one decimal.
fn stored_timestamp(date: DateTime<Utc>) -> String {
    format!("{:.1}", date.timestamp() as f64)
}

/// Arguments are joined back with single spaces, however they were typed.
fn address_from_params(params: &str) -> String {
    params.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Base58 length range of a 32 byte Solana public key.
const ADDRESS_LENGTHS: std::ops::RangeInclusive<usize> = 32..=44;

/// Whether this could be a Solana address at all: base58 of the right length.
fn is_plausible_address(address: &str) -> bool {
    ADDRESS_LENGTHS.contains(&address.len())
        && address
            .chars()
            .all(|c| c.is_ascii_alphanumeric() && !matches!(c, '0' | 'O' | 'I' | 'l'))
}

/// Address as shown in listings. Records written before addresses were
/// checked can be arbitrarily long, so those get cut short.
fn shown_address(address: &str) -> String {
    let max = *ADDRESS_LENGTHS.end();
    if address.chars().count() <= max {
        return encode_text(address).into_owned();
    }
    let cut: String = address.chars().take(max).collect();
    format!("{}…", encode_text(&cut))
}

fn gating_listing_line(index: usize, record: &GroupGatingRecord, now: DateTime<Utc>) -> String {
    format!(
        "{}. <code>{}</code> ({}), {}",
        index + 1,
        shown_address(&record.spl_address),
        record.gating_type,
        encode_text(&time_ago_or_fallback(&record.timestamp, now))
    )
}

/// Build the `/gates` reply, batched to fit into messages.
fn gating_listing(records: &[GroupGatingRecord], now: DateTime<Utc>) -> Vec<String> {
    if records.is_empty() {
        return vec![String::from(
            "This group is not gated yet. Use /magic &lt;address&gt; to set it up.",
        )];
    }

    let mut batcher = ReplyBatcher::default();
    batcher.push(&format!("<b>Gating setups of this group ({}):</b>", records.len()));
    for (index, record) in records.iter().enumerate() {
        batcher.push(&gating_listing_line(index, record, now));
    }
    batcher.finish()
}

/// `/magic <address>`: gate this group behind an address and hand out the
/// links for it.
pub async fn handle_magic<S: Store>(
    bot: &Bot,
    message: &Message,
    params: &str,
    store: &S,
    settings: &Settings,
) -> Result<(), Error> {
    bot.typing(message.chat.id).await?;

    let chat = &message.chat;

    if !is_group_chat(chat) {
        reply(bot, message, GROUP_ONLY).await?;
        return Ok(());
    }

    // Telegram doesn't say directly whether a group is private,
    // but public groups are the ones with a username.
    if chat.username().is_some() {
        reply(
            bot,
            message,
            "This command can only be used in private groups. Use /start to know more.",
        )
        .await?;
        return Ok(());
    }

    if !is_sender_admin(bot, message).await? {
        reply(bot, message, ADMIN_ONLY).await?;
        return Ok(());
    }

    let address = address_from_params(params);
    if address.is_empty() {
        reply(bot, message, "Please provide an SPL address.").await?;
        return Ok(());
    }

    if !is_plausible_address(&address) {
        reply(
            bot,
            message,
            &format!(
                "<code>{}</code> doesn't look like an NFT collection or SPL token address.",
                shown_address(&address)
            ),
        )
        .await?;
        return Ok(());
    }

    let gating_type = match &settings.indexer {
        Some(indexer) => match indexer.get_asset(&address).await? {
            Some(asset) => {
                log::debug!(
                    "Address {address} is a {} named {:?}",
                    asset.gating_type,
                    asset.name
                );
                asset.gating_type
            }
            None => {
                reply(
                    bot,
                    message,
                    &format!(
                        concat!(
                            "Could not find <code>{}</code>. ",
                            "Please check that it's an NFT collection or SPL token address."
                        ),
                        encode_text(&address)
                    ),
                )
                .await?;
                return Ok(());
            }
        },
        None => GatingType::Unknown,
    };

    // Anonymous admins have no user to speak of, so note the chat they post as.
    let admin_id = match (&message.from, &message.sender_chat) {
        (_, Some(sender_chat)) => sender_chat.id.0,
        (Some(user), None) => user_id_to_i64(user.id),
        (None, None) => 0,
    };

    let record = GroupGatingRecord {
        chat_id: chat.id.0,
        chat_name: chat.title().map(str::to_string),
        chat_type: chat_type_name(chat).to_string(),
        chat_user_id: admin_id,
        spl_address: address,
        gating_type,
        timestamp: stored_timestamp(message.date),
    };

    store.insert_gating(&record).await?;
    log::info!(
        "Chat {} is now gated behind {} {}",
        chat.id,
        record.gating_type,
        record.spl_address
    );

    let links = BlinkLinks::new(
        &settings.blink_base_url,
        &settings.dial_cluster,
        record.chat_id(),
        &record.spl_address,
    );

    reply(bot, message, &links.blink).await?;
    reply(bot, message, &links.dialect).await?;

    Ok(())
}

/// `/gates`: list the gating setups of this group and how long ago they were
/// made.
pub async fn handle_gates<S: Store>(bot: &Bot, message: &Message, store: &S) -> Result<(), Error> {
    bot.typing(message.chat.id).await?;

    if !require_group_admin(bot, message).await? {
        return Ok(());
    }

    let records = store.gatings_for_chat(message.chat.id).await?;

    for batch in gating_listing(&records, Utc::now()) {
        reply(bot, message, &batch).await?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use bot_commons::useful_methods::{SplitOverLength, MESSAGE_LENGTH_LIMIT};
    use chrono::TimeDelta;
    use teloxide::types::ChatId;

    use super::*;
    use crate::database::UNKNOWN_TIMESTAMP;

    fn now() -> DateTime<Utc> {
        DateTime::from_timestamp(1_720_000_000, 0).unwrap()
    }

    fn record(address: &str, timestamp: &str) -> GroupGatingRecord {
        GroupGatingRecord {
            chat_id: -100,
            chat_name: Some("Gated".to_string()),
            chat_type: "supergroup".to_string(),
            chat_user_id: 1,
            spl_address: address.to_string(),
            gating_type: GatingType::Collection,
            timestamp: timestamp.to_string(),
        }
    }

    #[test]
    fn timestamps_look_like_before() {
        assert_eq!(stored_timestamp(now()), "1720000000.0");
    }

    #[test]
    fn addresses() {
        assert_eq!(address_from_params("  abc  "), "abc");
        assert_eq!(address_from_params("abc\n def"), "abc def");
        assert_eq!(address_from_params(""), "");
    }

    #[test]
    fn plausible_addresses() {
        assert!(is_plausible_address(&format!("So{}2", "1".repeat(40))));
        assert!(is_plausible_address(&"1".repeat(32)));
        assert!(is_plausible_address(
            "J1S9H3QjnRtBbbuD4HjPV6RpRhwuk4zKbxsnCHuTgh9w"
        ));

        assert!(!is_plausible_address("&lt;address&gt;"));
        assert!(!is_plausible_address("<address>"));
        assert!(!is_plausible_address("short"));
        assert!(!is_plausible_address(&"A".repeat(45)));
        assert!(!is_plausible_address(&"A".repeat(4090)));
        assert!(!is_plausible_address(&format!("{}0", "1".repeat(40))));
        assert!(!is_plausible_address(&format!("{} {}", "1".repeat(20), "1".repeat(20))));
        assert!(!is_plausible_address(&"Ё".repeat(40)));
    }

    #[test]
    fn oversized_stored_address_keeps_html_whole() {
        let records = [record(&"A<".repeat(2045), "1.0")];
        let batches = gating_listing(&records, now());
        assert!(batches[0].contains(&format!("<code>{}…</code>", "A&lt;".repeat(22))));

        for batch in &batches {
            for piece in SplitOverLength::new(batch, MESSAGE_LENGTH_LIMIT) {
                assert_eq!(
                    piece.matches("<code>").count(),
                    piece.matches("</code>").count(),
                    "unbalanced piece: {piece}"
                );
            }
        }
    }

    #[test]
    fn listing() {
        let three_days = stored_timestamp(now() - TimeDelta::days(3));
        let records = [
            record("Addr<1>", &three_days),
            record("Addr2", UNKNOWN_TIMESTAMP),
        ];
        let batches = gating_listing(&records, now());
        assert_eq!(
            batches,
            [concat!(
                "<b>Gating setups of this group (2):</b>\n",
                "1. <code>Addr&lt;1&gt;</code> (NFT collection), 3 days ago\n",
                "2. <code>Addr2</code> (NFT collection), Invalid timestamp: Unknown"
            )]
        );
    }

    #[test]
    fn empty_listing() {
        let batches = gating_listing(&[], now());
        assert_eq!(batches.len(), 1);
        assert!(batches[0].contains("not gated yet"));
    }

    #[test]
    fn long_listing_is_batched() {
        let stamp = stored_timestamp(now());
        let address = "A".repeat(44);
        let records: Vec<_> = (0..200).map(|_| record(&address, &stamp)).collect();
        let batches = gating_listing(&records, now());
        assert!(batches.len() > 1);
        assert!(batches.iter().all(|b| b.chars().count() <= 4000));
        let lines: usize = batches.iter().map(|b| b.lines().count()).sum();
        assert_eq!(lines, 201);
    }

    #[tokio::test]
    async fn records_are_stored_per_chat() {
        let store = crate::database::MemoryStore::default();
        store.insert_gating(&record("A", "1.0")).await.unwrap();
        let mut other = record("B", "2.0");
        other.chat_id = -200;
        store.insert_gating(&other).await.unwrap();

        let records = store.gatings_for_chat(ChatId(-100)).await.unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].spl_address, "A");
    }
}
