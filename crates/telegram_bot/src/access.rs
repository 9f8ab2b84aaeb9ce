//! Allow-list gate in front of every bot interaction.

use std::collections::HashSet;

use teloxide::types::UserId;

/// Reply sent to callers outside the allow-list.
pub const REJECTION: &str = "Seu usuário não está autorizado para este bot.";

/// Decides which Telegram users may talk to the bot.
///
/// An empty allow-list lets everybody in.
#[derive(Clone, Debug, Default)]
pub struct AccessGuard {
    allowed: HashSet<UserId>,
}

impl AccessGuard {
    pub fn new(allowed: impl IntoIterator<Item = UserId>) -> Self {
        Self {
            allowed: allowed.into_iter().collect(),
        }
    }

    /// `true` when no allow-list is configured.
    pub fn is_open(&self) -> bool {
        self.allowed.is_empty()
    }

    pub fn is_allowed(&self, user: UserId) -> bool {
        self.is_open() || self.allowed.contains(&user)
    }
}

/// Parses a comma-separated list of Telegram user ids.
///
/// Blank items are ignored, malformed ones are logged and skipped.
pub fn parse_allow_list(raw: &str) -> Vec<UserId> {
    raw.split(',')
        .map(str::trim)
        .filter(|item| !item.is_empty())
        .filter_map(|item| match item.parse::<u64>() {
            Ok(id) => Some(UserId(id)),
            Err(_) => {
                tracing::warn!("ignoring invalid allowed user id: {item}");
                None
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_and_skips_malformed_items() {
        assert_eq!(
            parse_allow_list(" 111, abc,,222 ,-3"),
            vec![UserId(111), UserId(222)]
        );
        assert!(parse_allow_list("").is_empty());
    }

    #[test]
    fn empty_list_is_open() {
        let guard = AccessGuard::new(parse_allow_list(""));
        assert!(guard.is_open());
        assert!(guard.is_allowed(UserId(42)));
    }

    #[test]
    fn only_listed_users_pass() {
        let guard = AccessGuard::new([UserId(111)]);
        assert!(!guard.is_open());
        assert!(guard.is_allowed(UserId(111)));
        assert!(!guard.is_allowed(UserId(222)));
    }
}
