use teloxide::types::BotCommand;

/// A command this bot understands. `callname` may carry a parameter
/// placeholder after the command itself, HTML-escaped.
pub struct Command {
    pub callname: &'static str,
    pub description: &'static str,
    hidden: bool,
}

pub const START: Command = Command {
    callname: "/start",
    description: "Start the bot and see the setup steps",
    hidden: false,
};
pub const HELP: Command = Command {
    callname: "/help",
    description: "Show this help message",
    hidden: false,
};
pub const MAGIC: Command = Command {
    callname: "/magic &lt;address&gt;",
    description: "Gate this group behind an NFT collection or SPL token address",
    hidden: false,
};
pub const GATES: Command = Command {
    callname: "/gates",
    description: "List this group's gating setups",
    hidden: false,
};
pub const AUDIT: Command = Command {
    callname: "/audit",
    description: "List members who joined but haven't completed the transaction",
    hidden: false,
};
pub const PRUNE: Command = Command {
    callname: "/prune",
    description: "Remove members who joined but haven't completed the transaction",
    hidden: false,
};
/// Leftover from the first version of the bot.
pub const COMMANDS_KEYBOARD: Command = Command {
    callname: "/commands",
    description: "",
    hidden: true,
};

pub const COMMANDS: &[Command] = &[START, HELP, MAGIC, GATES, AUDIT, PRUNE, COMMANDS_KEYBOARD];

impl Command {
    /// The command itself, like `/magic`.
    pub fn name(&self) -> &'static str {
        self.callname
            .split_ascii_whitespace()
            .next()
            .unwrap_or(self.callname)
    }

    pub fn is_matching_callname(&self, command: &str) -> bool {
        self.name().eq_ignore_ascii_case(command)
    }

    pub fn generate_help() -> String {
        let mut response = String::from("Available commands:\n\n");
        for command in COMMANDS {
            if command.hidden {
                continue;
            }
            response.push_str(command.callname);
            response.push_str(" - ");
            response.push_str(command.description);
            response.push('\n');
        }
        response.pop();
        response
    }

    pub fn generate_bot_commands() -> Vec<BotCommand> {
        COMMANDS
            .iter()
            .filter(|command| !command.hidden)
            .map(|command| BotCommand {
                // Cut off the /
                command: command.name()[1..].to_string(),
                description: command.description.to_string(),
            })
            .collect()
    }
}

/// A command sent to the bot, split from its parameters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandCall<'a> {
    /// The command in lowercase, without the bot's username, like `/magic`.
    pub command: String,
    /// Everything after the command, like the address in `/magic <address>`.
    pub params: &'a str,
}

impl<'a> CommandCall<'a> {
    /// Parse message text as a command. Returns `None` if it isn't one, or if
    /// it's addressed to some other bot, like `/magic@SomeOtherBot`.
    pub fn parse(text: &'a str, bot_username: &str) -> Option<CommandCall<'a>> {
        if !text.starts_with('/') {
            return None;
        }

        let command = text.split_whitespace().next()?;

        if !command.is_ascii() {
            // Telegram commands must be ASCII.
            // See https://core.telegram.org/bots/api#botcommand
            return None;
        }

        let params = text[command.len()..].trim();

        let command = if let Some(username_start) = command.find('@') {
            // Bot names are guaranteed ASCII, so ignore ASCII case specifically.
            if !command[username_start + 1..].eq_ignore_ascii_case(bot_username) {
                return None;
            }
            &command[..username_start]
        } else {
            command
        };

        Some(CommandCall {
            command: command.to_ascii_lowercase(),
            params,
        })
    }

    /// Whether this is a call of that command.
    pub fn is(&self, command: &Command) -> bool {
        command.is_matching_callname(&self.command)
    }
}
