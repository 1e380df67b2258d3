//! Slack slash-command payloads.
//!
//! Slack delivers slash commands as `application/x-www-form-urlencoded`
//! bodies. Only `token`, `command` and `response_url` drive behaviour; the
//! remaining fields are kept for log context.

use once_cell::sync::Lazy;
use regex::Regex;

static GATE_COMMAND_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)(open)?.*gate").unwrap());

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SlashCommand {
    pub token: Option<String>,
    pub command: Option<String>,
    pub response_url: Option<String>,
    pub text: Option<String>,
    pub user_name: Option<String>,
    pub channel_id: Option<String>,
    pub team_id: Option<String>,
}

impl SlashCommand {
    /// Parse a form-urlencoded body. Unknown fields are ignored; when a field
    /// repeats, the last occurrence wins.
    pub fn from_form(body: &[u8]) -> Self {
        let mut cmd = SlashCommand::default();
        for (key, value) in url::form_urlencoded::parse(body) {
            let value = Some(value.into_owned());
            match key.as_ref() {
                "token" => cmd.token = value,
                "command" => cmd.command = value,
                "response_url" => cmd.response_url = value,
                "text" => cmd.text = value,
                "user_name" => cmd.user_name = value,
                "channel_id" => cmd.channel_id = value,
                "team_id" => cmd.team_id = value,
                _ => {}
            }
        }
        cmd
    }

    /// True when the command asks for the gate to open.
    pub fn is_gate_command(&self) -> bool {
        self.command
            .as_deref()
            .map(|c| !c.is_empty() && GATE_COMMAND_REGEX.is_match(c))
            .unwrap_or(false)
    }

    /// The reply address, with an empty string treated as absent.
    pub fn callback_address(&self) -> Option<String> {
        self.response_url
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(String::from)
    }
}
