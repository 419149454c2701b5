use rand::Rng;

use nsq_tail_core::{ConsumptionPolicy, InvalidArgument};

use crate::Cli;

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("--topic is required")]
    MissingTopic,

    #[error("--lookupd-http-address is required")]
    MissingLookupd,

    #[error(transparent)]
    InvalidArgument(#[from] InvalidArgument),
}

/// Validated startup configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub topic: String,
    pub channel: String,
    pub lookupd_http_addresses: Vec<String>,
    pub policy: ConsumptionPolicy,
}

/// A channel the broker discards once this tail disconnects.
pub fn ephemeral_channel() -> String {
    let suffix = rand::thread_rng().gen_range(0..999_999);
    format!("tail{suffix:06}#ephemeral")
}

impl std::convert::TryFrom<Cli> for Config {
    type Error = ConfigError;

    fn try_from(cli: Cli) -> Result<Self, Self::Error> {
        let Cli {
            topic,
            channel,
            max_in_flight,
            total_messages,
            lookupd_http_addresses,
        } = cli;

        if topic.is_empty() {
            return Err(ConfigError::MissingTopic);
        }

        let channel = if channel.is_empty() {
            let generated = ephemeral_channel();
            log::info!("No --channel given; using {generated}");
            generated
        } else {
            channel
        };

        if lookupd_http_addresses.is_empty() {
            return Err(ConfigError::MissingLookupd);
        }

        let policy = ConsumptionPolicy::resolve(max_in_flight, total_messages)?;
        log::debug!(
            "Effective max-in-flight {} for up to {} message(s)",
            policy.max_in_flight(),
            policy.total_messages()
        );

        Ok(Self {
            topic,
            channel,
            lookupd_http_addresses,
            policy,
        })
    }
}
