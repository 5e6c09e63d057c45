// The `config` module reads the process configuration from the environment.
// There are no CLI flags; a deployment is fixed entirely by its variables.

use crate::mailbox::AuthFlow;
use crate::pipeline::Workflow;
use std::env;
use std::path::PathBuf;
use thiserror::Error;

/// The `ConfigError` enum defines the possible configuration failures. All
/// of them are fatal and surface before any network side effect.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// A required environment variable is not set.
    #[error("required environment variable {0} is not set")]
    MissingVar(&'static str),

    /// An environment variable is set but cannot be used.
    #[error("environment variable {name} is invalid: {reason}")]
    InvalidVar {
        name: &'static str,
        reason: String,
    },
}

/// The validated process configuration.
#[derive(Clone, Debug)]
pub struct Config {
    /// API key for the generative-language endpoint.
    pub gemini_api_key: String,
    /// Bot token for the messaging endpoint.
    pub telegram_token: String,
    /// Destination chat identifier.
    pub telegram_chat_id: i64,
    /// The Gmail credential strategy.
    pub auth: AuthFlow,
    /// The selector strategy and state-transition behavior for this run.
    pub workflow: Workflow,
}

impl Config {
    /// Reads and validates the configuration from the environment.
    ///
    /// The credential flow is service-account based when
    /// `GMAIL_SERVICE_ACCOUNT_PATH` is set, interactive otherwise. The
    /// workflow is label-based when `GMAIL_PENDING_LABEL` is set, in which
    /// case `GMAIL_DONE_LABEL` is required too; otherwise the run polls
    /// unread messages.
    pub fn from_env() -> Result<Self, ConfigError> {
        let gemini_api_key = require("GEMINI_API_KEY")?;
        let telegram_token = require("TELEGRAM_TOKEN")?;
        let telegram_chat_id = require("TELEGRAM_CHAT_ID")?.parse().map_err(
            |e: std::num::ParseIntError| ConfigError::InvalidVar {
                name: "TELEGRAM_CHAT_ID",
                reason: e.to_string(),
            },
        )?;

        let auth = match env::var("GMAIL_SERVICE_ACCOUNT_PATH") {
            Ok(key) => AuthFlow::ServiceAccount {
                key: PathBuf::from(key),
            },
            Err(_) => AuthFlow::Installed {
                credentials: path_or("GMAIL_CREDENTIALS_PATH", "credentials.json"),
                token_cache: path_or("GMAIL_TOKEN_PATH", "token.json"),
            },
        };

        let workflow = match env::var("GMAIL_PENDING_LABEL") {
            Ok(pending) => {
                let done = env::var("GMAIL_DONE_LABEL")
                    .map_err(|_| ConfigError::MissingVar("GMAIL_DONE_LABEL"))?;
                Workflow::Labels { pending, done }
            }
            Err(_) => Workflow::PollUnread,
        };

        Ok(Self {
            gemini_api_key,
            telegram_token,
            telegram_chat_id,
            auth,
            workflow,
        })
    }
}

fn require(name: &'static str) -> Result<String, ConfigError> {
    env::var(name).map_err(|_| ConfigError::MissingVar(name))
}

fn path_or(name: &str, default: &str) -> PathBuf {
    env::var(name)
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from(default))
}

#[cfg(test)]
mod tests {
    use super::*;
    use lazy_static::lazy_static;
    use std::sync::Mutex;

    lazy_static! {
        static ref ENV_LOCK: Mutex<()> = Mutex::new(());
    }

    const ALL_VARS: &[&str] = &[
        "GEMINI_API_KEY",
        "TELEGRAM_TOKEN",
        "TELEGRAM_CHAT_ID",
        "GMAIL_SERVICE_ACCOUNT_PATH",
        "GMAIL_CREDENTIALS_PATH",
        "GMAIL_TOKEN_PATH",
        "GMAIL_PENDING_LABEL",
        "GMAIL_DONE_LABEL",
    ];

    fn with_env(vars: &[(&str, &str)], check: impl FnOnce()) {
        let _lock = ENV_LOCK.lock().unwrap();
        unsafe {
            for name in ALL_VARS {
                std::env::remove_var(name);
            }
            for (name, value) in vars {
                std::env::set_var(name, value);
            }
        }
        check();
        unsafe {
            for name in ALL_VARS {
                std::env::remove_var(name);
            }
        }
    }

    const BASE: &[(&str, &str)] = &[
        ("GEMINI_API_KEY", "gk"),
        ("TELEGRAM_TOKEN", "tt"),
        ("TELEGRAM_CHAT_ID", "-100123"),
    ];

    #[test]
    fn minimal_env_selects_poll_mode_with_installed_flow() {
        with_env(BASE, || {
            let config = Config::from_env().unwrap();
            assert_eq!(config.telegram_chat_id, -100123);
            assert!(matches!(config.workflow, Workflow::PollUnread));
            match config.auth {
                AuthFlow::Installed {
                    credentials,
                    token_cache,
                } => {
                    assert_eq!(credentials, PathBuf::from("credentials.json"));
                    assert_eq!(token_cache, PathBuf::from("token.json"));
                }
                other => panic!("expected the installed flow, got {other:?}"),
            }
        });
    }

    #[test]
    fn service_account_path_selects_the_non_interactive_flow() {
        let mut vars = BASE.to_vec();
        vars.push(("GMAIL_SERVICE_ACCOUNT_PATH", "/etc/mailbrief/sa.json"));
        with_env(&vars, || {
            let config = Config::from_env().unwrap();
            assert!(matches!(config.auth, AuthFlow::ServiceAccount { .. }));
        });
    }

    #[test]
    fn pending_label_selects_the_label_workflow() {
        let mut vars = BASE.to_vec();
        vars.push(("GMAIL_PENDING_LABEL", "pending"));
        vars.push(("GMAIL_DONE_LABEL", "done"));
        with_env(&vars, || {
            let config = Config::from_env().unwrap();
            match config.workflow {
                Workflow::Labels { pending, done } => {
                    assert_eq!(pending, "pending");
                    assert_eq!(done, "done");
                }
                Workflow::PollUnread => panic!("expected the label workflow"),
            }
        });
    }

    #[test]
    fn pending_without_done_is_a_config_error() {
        let mut vars = BASE.to_vec();
        vars.push(("GMAIL_PENDING_LABEL", "pending"));
        with_env(&vars, || {
            match Config::from_env() {
                Err(ConfigError::MissingVar(name)) => assert_eq!(name, "GMAIL_DONE_LABEL"),
                other => panic!("expected MissingVar, got {other:?}"),
            }
        });
    }

    #[test]
    fn missing_api_key_is_a_config_error() {
        with_env(&BASE[1..], || {
            match Config::from_env() {
                Err(ConfigError::MissingVar(name)) => assert_eq!(name, "GEMINI_API_KEY"),
                other => panic!("expected MissingVar, got {other:?}"),
            }
        });
    }

    #[test]
    fn non_numeric_chat_id_is_a_config_error() {
        let vars = [
            ("GEMINI_API_KEY", "gk"),
            ("TELEGRAM_TOKEN", "tt"),
            ("TELEGRAM_CHAT_ID", "not-a-number"),
        ];
        with_env(&vars, || {
            match Config::from_env() {
                Err(ConfigError::InvalidVar { name, .. }) => {
                    assert_eq!(name, "TELEGRAM_CHAT_ID")
                }
                other => panic!("expected InvalidVar, got {other:?}"),
            }
        });
    }
}
