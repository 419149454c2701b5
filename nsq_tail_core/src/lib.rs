mod policy;
mod shutdown;
mod tail;

pub use policy::{ConsumptionPolicy, InvalidArgument, DEFAULT_MAX_IN_FLIGHT};
pub use shutdown::{Action, Shutdown, ShutdownEvent, ShutdownState, Signal};
pub use tail::{Handled, HandlerError, TailHandler};

use bytes::Bytes;

/// A message as delivered by the broker client.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Message {
    pub body: Bytes,
}

impl std::convert::From<Vec<u8>> for Message {
    fn from(body: Vec<u8>) -> Self {
        Self { body: body.into() }
    }
}

impl std::convert::From<&'static [u8]> for Message {
    fn from(body: &'static [u8]) -> Self {
        Self {
            body: Bytes::from_static(body),
        }
    }
}

/// Callback registered with a broker client; invoked once per delivered message.
///
/// Clients may call this from several workers at once, so implementations must
/// serialize whatever state they keep.
pub trait Handler: Send + Sync {
    fn handle_message(&self, message: &Message) -> Result<Handled, HandlerError>;
}
