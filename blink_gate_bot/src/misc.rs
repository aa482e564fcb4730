use html_escape::encode_text;
use teloxide::types::Chat;

use crate::database::UserMembershipRecord;

/// Whether gating makes sense in this chat at all.
#[must_use]
pub fn is_group_chat(chat: &Chat) -> bool {
    chat.is_group() || chat.is_supergroup()
}

/// Telegram's name for the type of this chat.
#[must_use]
pub fn chat_type_name(chat: &Chat) -> &'static str {
    if chat.is_private() {
        "private"
    } else if chat.is_group() {
        "group"
    } else if chat.is_supergroup() {
        "supergroup"
    } else {
        "channel"
    }
}

/// Prints a member record as HTML, with `@username` if it's known, or a link
/// to the user otherwise. Always includes the user ID.
#[must_use]
pub fn member_name_prettyprint(record: &UserMembershipRecord) -> String {
    match &record.username {
        Some(username) => format!(
            "@{} (userid {})",
            encode_text(username.trim_start_matches('@')),
            record.user_id
        ),
        None => format!(
            "<a href=\"tg://user?id={0}\">userid {0}</a>",
            record.user_id
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(username: Option<&str>) -> UserMembershipRecord {
        UserMembershipRecord {
            user_id: 77,
            username: username.map(str::to_string),
            joined: true,
            chat_id: -1,
            transacted: false,
        }
    }

    #[test]
    fn member_names() {
        assert_eq!(
            member_name_prettyprint(&record(Some("alice"))),
            "@alice (userid 77)"
        );
        assert_eq!(
            member_name_prettyprint(&record(Some("@bob"))),
            "@bob (userid 77)"
        );
        assert_eq!(
            member_name_prettyprint(&record(None)),
            "<a href=\"tg://user?id=77\">userid 77</a>"
        );
        assert_eq!(
            member_name_prettyprint(&record(Some("<b>"))),
            "@&lt;b&gt; (userid 77)"
        );
    }
}
