use std::{collections::HashSet, sync::Arc};

use nsq_tail_core::{ConsumptionPolicy, Handler, Message};
use tokio::sync::oneshot;
use tokio_nsq::{
    NSQChannel, NSQConfigShared, NSQConsumer, NSQConsumerConfig, NSQConsumerConfigSources,
    NSQConsumerLookupConfig, NSQRequeueDelay, NSQTopic,
};
use tokio_util::sync::CancellationToken;

use super::{lookupd_url, settle, Ack, ConnectError, Consumer, StopCause, StopChan};

/// Sent to `nsqd` in IDENTIFY.
pub const USER_AGENT: &str = concat!("nsq_tail/", env!("CARGO_PKG_VERSION"));

/// [`Consumer`] backed by [`tokio_nsq`], discovering `nsqd` nodes through lookupd.
pub struct NsqConsumer {
    topic: Arc<NSQTopic>,
    channel: Arc<NSQChannel>,
    policy: ConsumptionPolicy,
    handler: Option<Arc<dyn Handler>>,

    stop: CancellationToken,
    /// Taken by the delivery task once connected.
    confirm: Option<oneshot::Sender<StopCause>>,
    stop_chan: StopChan,
}

impl std::fmt::Debug for NsqConsumer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NsqConsumer")
            .field("policy", &self.policy)
            .field("connected", &self.confirm.is_none())
            .field("stopping", &self.stop.is_cancelled())
            .finish()
    }
}

impl NsqConsumer {
    pub fn new(topic: &str, channel: &str, policy: ConsumptionPolicy) -> Result<Self, ConnectError> {
        let topic =
            NSQTopic::new(topic).ok_or_else(|| ConnectError::InvalidTopic(topic.to_string()))?;
        let channel = NSQChannel::new(channel)
            .ok_or_else(|| ConnectError::InvalidChannel(channel.to_string()))?;
        let (confirm, stop_chan) = oneshot::channel();

        Ok(Self {
            topic,
            channel,
            policy,
            handler: None,
            stop: CancellationToken::new(),
            confirm: Some(confirm),
            stop_chan,
        })
    }
}

impl Consumer for NsqConsumer {
    fn add_handler(&mut self, handler: Arc<dyn Handler>) {
        if self.handler.replace(handler).is_some() {
            log::warn!("Replacing previously registered handler");
        }
    }

    fn connect_to_lookupds(&mut self, addresses: &[String]) -> Result<(), ConnectError> {
        let Some(handler) = self.handler.clone() else {
            return Err(ConnectError::NoHandler);
        };
        if addresses.is_empty() {
            return Err(ConnectError::NoLookupds);
        }

        let addresses = addresses
            .iter()
            .map(|address| lookupd_url(address))
            .collect::<Result<HashSet<_>, _>>()?;
        log::info!("Querying lookupd at {addresses:?}");

        let Some(confirm) = self.confirm.take() else {
            return Err(ConnectError::AlreadyConnected);
        };
        // The client would still ask for one message at a time with a budget of 0
        if self.policy.max_in_flight() == 0 {
            tokio::spawn(idle(self.stop.clone(), confirm));
            return Ok(());
        }

        let consumer = NSQConsumerConfig::new(self.topic.clone(), self.channel.clone())
            .set_max_in_flight(u32::from(self.policy.max_in_flight()))
            .set_sources(NSQConsumerConfigSources::Lookup(
                NSQConsumerLookupConfig::new().set_addresses(addresses),
            ))
            .set_shared(NSQConfigShared::new().set_user_agent(USER_AGENT))
            .build();

        tokio::spawn(deliver(consumer, handler, self.stop.clone(), confirm));
        Ok(())
    }

    fn stop(&self) {
        if self.stop.is_cancelled() {
            log::debug!("Stop already requested");
        }
        self.stop.cancel();
    }

    fn stop_chan(&mut self) -> &mut StopChan {
        &mut self.stop_chan
    }
}

/// Hands messages to `handler` one at a time until told to stop.
///
/// Stop requests are only observed between messages, so a message is always
/// either finished or requeued before the connection is dropped.
async fn deliver(
    mut consumer: NSQConsumer,
    handler: Arc<dyn Handler>,
    stop: CancellationToken,
    confirm: oneshot::Sender<StopCause>,
) {
    let cause = loop {
        let message = tokio::select! {
            biased;
            _ = stop.cancelled() => break StopCause::Requested,
            message = consumer.consume_filtered() => message,
        };
        let Some(mut message) = message else {
            log::warn!("NSQ consumer stream ended");
            break StopCause::Disconnected;
        };

        let body = Message::from(std::mem::take(&mut message.body));
        log::trace!("Delivering {body:?}");
        let (ack, stop_cause) = settle(handler.handle_message(&body));
        match ack {
            Ack::Finish => message.finish().await,
            Ack::Requeue => message.requeue(NSQRequeueDelay::NoDelay).await,
            Ack::RequeueDelayed => message.requeue(NSQRequeueDelay::DefaultDelay).await,
        }
        if let Some(cause) = stop_cause {
            break cause;
        }
    };

    log::info!("NSQ consumer stopped: {cause:?}");
    drop(consumer);
    if confirm.send(cause).is_err() {
        log::debug!("Nobody is waiting for the stop confirmation");
    }
}

/// Stands in for delivery when no messages may be in flight.
async fn idle(stop: CancellationToken, confirm: oneshot::Sender<StopCause>) {
    log::info!("Not requesting any messages; waiting to be stopped");
    stop.cancelled().await;
    let _ = confirm.send(StopCause::Requested);
}

#[cfg(test)]
mod tests {
    use std::{sync::Arc, time::Duration};

    use nsq_tail_core::{ConsumptionPolicy, TailHandler};

    use super::NsqConsumer;
    use crate::consumer::{ConnectError, Consumer, StopCause};

    #[test]
    fn user_agent() {
        assert!(super::USER_AGENT.starts_with("nsq_tail/"));
        assert!(super::USER_AGENT.len() > "nsq_tail/".len());
    }

    #[tokio::test]
    async fn zero_max_in_flight_delivers_nothing_until_stopped() {
        let policy = ConsumptionPolicy::resolve(0, 3).unwrap();
        let mut consumer = NsqConsumer::new("orders", "debug", policy).unwrap();
        consumer.add_handler(Arc::new(TailHandler::new(3, Vec::new())));
        consumer
            .connect_to_lookupds(&["127.0.0.1:4161".into()])
            .unwrap();

        tokio::time::sleep(Duration::from_millis(20)).await;
        assert!(consumer.stop_chan().try_recv().is_err());

        consumer.stop();
        let cause = consumer.stop_chan().await.unwrap();
        assert!(matches!(cause, StopCause::Requested), "{cause:?}");

        assert_eq!(
            consumer.connect_to_lookupds(&["127.0.0.1:4161".into()]),
            Err(ConnectError::AlreadyConnected)
        );
    }

    fn consumer() -> NsqConsumer {
        NsqConsumer::new("orders", "debug", ConsumptionPolicy::default()).unwrap()
    }

    #[test]
    fn rejects_invalid_names() {
        assert_eq!(
            NsqConsumer::new("no spaces allowed", "debug", ConsumptionPolicy::default())
                .unwrap_err(),
            ConnectError::InvalidTopic("no spaces allowed".into())
        );
        assert_eq!(
            NsqConsumer::new("orders", "bad/channel", ConsumptionPolicy::default()).unwrap_err(),
            ConnectError::InvalidChannel("bad/channel".into())
        );
    }

    #[test]
    fn accepts_ephemeral_channel() {
        let channel = crate::ephemeral_channel();
        assert!(NsqConsumer::new("orders", &channel, ConsumptionPolicy::default()).is_ok());
    }

    #[test]
    fn connect_requires_handler() {
        let mut consumer = consumer();
        assert_eq!(
            consumer.connect_to_lookupds(&["127.0.0.1:4161".into()]),
            Err(ConnectError::NoHandler)
        );
    }

    #[test]
    fn connect_validates_lookupds() {
        let mut consumer = consumer();
        consumer.add_handler(Arc::new(TailHandler::new(0, Vec::new())));

        assert_eq!(
            consumer.connect_to_lookupds(&[]),
            Err(ConnectError::NoLookupds)
        );
        assert_eq!(
            consumer.connect_to_lookupds(&["127.0.0.1:4161".into(), "nowhere".into()]),
            Err(ConnectError::InvalidLookupd("nowhere".into()))
        );
        // A failed attempt does not count as connected
        assert_eq!(
            consumer.connect_to_lookupds(&["127.0.0.1".into()]),
            Err(ConnectError::InvalidLookupd("127.0.0.1".into()))
        );
    }
}
