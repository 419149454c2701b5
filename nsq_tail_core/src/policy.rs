pub const DEFAULT_MAX_IN_FLIGHT: i64 = 200;

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum InvalidArgument {
    #[error("--max-in-flight must be greater than or equal to 0, got {0}")]
    NegativeMaxInFlight(i64),

    #[error("--max-in-flight must not exceed {}, got {0}", u16::MAX)]
    MaxInFlightTooLarge(i64),

    #[error("--n must be greater than or equal to 0, got {0}")]
    NegativeTotal(i64),
}

/// How many messages may be in flight, and how many are wanted overall.
///
/// Resolved once at startup and handed to the broker client before it connects.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ConsumptionPolicy {
    /// The client's RDY count is a `u16` per connection.
    max_in_flight: u16,
    /// `0` means unbounded.
    total_messages: u64,
}

impl ConsumptionPolicy {
    /// Validates the requested values and clamps max-in-flight down to the total,
    /// so the broker never reserves messages that will not be shown.
    pub fn resolve(max_in_flight: i64, total_messages: i64) -> Result<Self, InvalidArgument> {
        if max_in_flight < 0 {
            return Err(InvalidArgument::NegativeMaxInFlight(max_in_flight));
        }
        if total_messages < 0 {
            return Err(InvalidArgument::NegativeTotal(total_messages));
        }

        let effective = match total_messages {
            0 => max_in_flight,
            total => max_in_flight.min(total),
        };
        let max_in_flight = u16::try_from(effective)
            .map_err(|_| InvalidArgument::MaxInFlightTooLarge(effective))?;

        if max_in_flight == 0 {
            log::warn!("max-in-flight is 0; no messages will be requested from the broker");
        }

        Ok(Self {
            max_in_flight,
            total_messages: total_messages as u64,
        })
    }

    pub fn max_in_flight(&self) -> u16 {
        self.max_in_flight
    }

    pub fn total_messages(&self) -> u64 {
        self.total_messages
    }

    pub fn is_bounded(&self) -> bool {
        self.total_messages > 0
    }
}

impl std::default::Default for ConsumptionPolicy {
    fn default() -> Self {
        Self {
            max_in_flight: DEFAULT_MAX_IN_FLIGHT as u16,
            total_messages: 0,
        }
    }
}
