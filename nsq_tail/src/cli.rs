use clap::{ArgAction, Parser};

use nsq_tail_core::DEFAULT_MAX_IN_FLIGHT;

/// Tail an NSQ topic, writing every message body to stdout.
#[derive(Parser, Debug, Clone)]
#[command(version, about)]
pub struct Cli {
    /// NSQ topic to subscribe
    #[arg(long, default_value = "")]
    pub topic: String,

    /// NSQ channel to fetch messages from; an ephemeral one is generated when empty
    #[arg(long, default_value = "")]
    pub channel: String,

    /// Max number of messages to allow in flight
    #[arg(long, default_value_t = DEFAULT_MAX_IN_FLIGHT, allow_negative_numbers = true)]
    pub max_in_flight: i64,

    /// Total messages to show (will wait if starved); 0 shows messages until stopped
    #[arg(long = "n", short = 'n', default_value_t = 0, allow_negative_numbers = true)]
    pub total_messages: i64,

    /// lookupd HTTP address (may be given multiple times)
    #[arg(long = "lookupd-http-address", action = ArgAction::Append)]
    pub lookupd_http_addresses: Vec<String>,
}

#[cfg(test)]
mod tests {
    use clap::Parser;

    use super::Cli;

    #[test]
    fn defaults() {
        let cli = Cli::try_parse_from(["nsq_tail"]).unwrap();
        assert_eq!(cli.topic, "");
        assert_eq!(cli.channel, "");
        assert_eq!(cli.max_in_flight, 200);
        assert_eq!(cli.total_messages, 0);
        assert!(cli.lookupd_http_addresses.is_empty());
    }

    #[test]
    fn all_flags() {
        let cli = Cli::try_parse_from([
            "nsq_tail",
            "--topic=orders",
            "--channel=debug",
            "--n=3",
            "--max-in-flight=200",
            "--lookupd-http-address=127.0.0.1:4161",
            "--lookupd-http-address",
            "10.0.0.2:4161",
        ])
        .unwrap();

        assert_eq!(cli.topic, "orders");
        assert_eq!(cli.channel, "debug");
        assert_eq!(cli.total_messages, 3);
        assert_eq!(cli.max_in_flight, 200);
        assert_eq!(
            cli.lookupd_http_addresses,
            ["127.0.0.1:4161", "10.0.0.2:4161"]
        );
    }

    #[test]
    fn negative_counts_parse() {
        let cli = Cli::try_parse_from(["nsq_tail", "--n", "-1", "--max-in-flight=-5"]).unwrap();
        assert_eq!(cli.total_messages, -1);
        assert_eq!(cli.max_in_flight, -5);
    }

    #[test]
    fn rejects_non_numeric_counts() {
        assert!(Cli::try_parse_from(["nsq_tail", "--n=three"]).is_err());
    }
}
