use std::io;

use nsq_tail_core::HandlerError;

use crate::{consumer::ConnectError, ConfigError};

/// Every way a tail can end unsuccessfully. All of them are fatal.
#[derive(thiserror::Error, Debug)]
pub enum TailError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("Failed to connect: {0}")]
    Connect(#[from] ConnectError),

    #[error(transparent)]
    Output(#[from] HandlerError),

    #[error("Failed to listen for OS signals: {0}")]
    Signals(#[source] io::Error),

    #[error("Consumer went away without confirming it stopped")]
    ConsumerVanished,
}
