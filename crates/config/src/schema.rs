use {
    secrecy::{ExposeSecret, Secret},
    serde::{Deserialize, Serialize},
    thiserror::Error,
};

/// A config that cannot run the bot.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("telegram.token is empty — set it in liaison.toml or LIAISON_BOT_TOKEN")]
    MissingToken,

    #[error("telegram.admin_ids is empty — at least one administrator is required")]
    NoAdmins,
}

/// Root configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct LiaisonConfig {
    pub telegram: TelegramConfig,
    pub engine: EngineSettings,
    pub texts: Texts,
}

impl LiaisonConfig {
    /// Fail fast on a config the bot cannot start with.
    pub fn ensure_runnable(&self) -> Result<(), ConfigError> {
        if self.telegram.token.expose_secret().is_empty() {
            return Err(ConfigError::MissingToken);
        }
        if self.telegram.admin_ids.is_empty() {
            return Err(ConfigError::NoAdmins);
        }
        Ok(())
    }

    /// Whether `id` belongs to the configured administrator set.
    pub fn is_admin(&self, id: i64) -> bool {
        self.telegram.admin_ids.contains(&id)
    }
}

/// Telegram transport configuration.
#[derive(Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TelegramConfig {
    /// Bot token from @BotFather.
    #[serde(serialize_with = "serialize_secret")]
    pub token: Secret<String>,

    /// Chat ids recognized as administrators. Everything else is a user.
    pub admin_ids: Vec<i64>,
}

impl std::fmt::Debug for TelegramConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TelegramConfig")
            .field("token", &"[REDACTED]")
            .field("admin_ids", &self.admin_ids)
            .finish()
    }
}

impl Default for TelegramConfig {
    fn default() -> Self {
        Self {
            token: Secret::new(String::new()),
            admin_ids: Vec::new(),
        }
    }
}

fn serialize_secret<S: serde::Serializer>(
    secret: &Secret<String>,
    serializer: S,
) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(secret.expose_secret())
}

/// Matching-engine behavior switches.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineSettings {
    /// Present the next queued question immediately after every answer
    /// instead of waiting for an explicit `/done`.
    pub auto_advance_on_answer: bool,
}

/// Static reply texts for the informational commands.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Texts {
    /// Reply to `/start`.
    pub greeting: String,
    /// Reply to `/info`.
    pub info: String,
    /// Reply to `/lib`.
    pub library: String,
}

impl Default for Texts {
    fn default() -> Self {
        Self {
            greeting: "Hi! I can connect you with an administrator (/chat) or take a question \
                       for them (/ask)."
                .into(),
            info: "We are the reading-room support team.".into(),
            library: "Our library: midashall.notion.site".into(),
        }
    }
}
