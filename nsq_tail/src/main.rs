use std::{io, process::ExitCode, sync::Arc};

use clap::Parser;

use nsq_tail::{
    consumer::{Consumer, NsqConsumer},
    signals, Cli, Config, TailError,
};
use nsq_tail_core::TailHandler;

#[tokio::main]
async fn main() -> ExitCode {
    let args = Cli::parse();
    env_logger::init();

    match tail(args).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            log::error!("{e}");
            ExitCode::FAILURE
        }
    }
}

async fn tail(args: Cli) -> Result<(), TailError> {
    let config = Config::try_from(args)?;
    log::debug!("Tailing {config:?}");

    let mut consumer = NsqConsumer::new(&config.topic, &config.channel, config.policy)?;
    consumer.add_handler(Arc::new(TailHandler::new(
        config.policy.total_messages(),
        io::stdout(),
    )));
    consumer.connect_to_lookupds(&config.lookupd_http_addresses)?;

    let signals = signals::listen().map_err(TailError::Signals)?;
    nsq_tail::run(consumer, signals).await
}
