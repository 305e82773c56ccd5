//! Room configuration and owner-driven updates.

use serde::{Deserialize, Serialize};

use crate::game::entities::{
    Chips, DEFAULT_BIG_BLIND, DEFAULT_SMALL_BLIND, MAX_SEATS, MIN_SEATS, SeatNumber,
};
use crate::game::errors::{RoomError, RoomResult};

/// Room configuration. The big blind is always exactly twice the small
/// blind; updates that would break the ratio are rejected.
#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct RoomConfig {
    pub small_blind: Chips,
    pub big_blind: Chips,
    pub max_seats: SeatNumber,
}

impl Default for RoomConfig {
    fn default() -> Self {
        Self {
            small_blind: DEFAULT_SMALL_BLIND,
            big_blind: DEFAULT_BIG_BLIND,
            max_seats: MAX_SEATS,
        }
    }
}

impl RoomConfig {
    pub fn validate(&self) -> RoomResult<()> {
        if self.small_blind == 0 || self.big_blind != self.small_blind * 2 {
            return Err(RoomError::InvalidBlinds);
        }
        if self.max_seats < MIN_SEATS || self.max_seats > MAX_SEATS {
            return Err(RoomError::InvalidPayload(format!(
                "max_seats must be between {MIN_SEATS} and {MAX_SEATS}"
            )));
        }
        Ok(())
    }

    /// Produce the configuration this update would leave behind, without
    /// applying it. A single given blind derives the other to hold the 2x
    /// ratio; a conflicting explicit pair is rejected.
    pub fn updated(&self, update: &ConfigUpdate) -> RoomResult<RoomConfig> {
        let (small_blind, big_blind) = match (update.small_blind, update.big_blind) {
            (Some(small), Some(big)) => {
                if big != small * 2 {
                    return Err(RoomError::InvalidBlinds);
                }
                (small, big)
            }
            (Some(small), None) => (small, small * 2),
            (None, Some(big)) => {
                if big == 0 || big % 2 != 0 {
                    return Err(RoomError::InvalidBlinds);
                }
                (big / 2, big)
            }
            (None, None) => (self.small_blind, self.big_blind),
        };

        let next = RoomConfig {
            small_blind,
            big_blind,
            max_seats: update.max_seats.unwrap_or(self.max_seats),
        };
        next.validate()?;
        Ok(next)
    }
}

/// Partial configuration change requested by the room owner. Absent fields
/// keep their current values.
#[derive(Clone, Copy, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
pub struct ConfigUpdate {
    pub small_blind: Option<Chips>,
    pub big_blind: Option<Chips>,
    pub max_seats: Option<SeatNumber>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        let config = RoomConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.small_blind, 5);
        assert_eq!(config.big_blind, 10);
        assert_eq!(config.max_seats, 10);
    }

    #[test]
    fn blind_ratio_is_enforced() {
        let config = RoomConfig {
            small_blind: 5,
            big_blind: 15,
            max_seats: 10,
        };
        assert_eq!(config.validate(), Err(RoomError::InvalidBlinds));
    }

    #[test]
    fn single_blind_updates_derive_the_other() {
        let config = RoomConfig::default();

        let next = config
            .updated(&ConfigUpdate {
                small_blind: Some(25),
                ..ConfigUpdate::default()
            })
            .unwrap();
        assert_eq!((next.small_blind, next.big_blind), (25, 50));

        let next = config
            .updated(&ConfigUpdate {
                big_blind: Some(40),
                ..ConfigUpdate::default()
            })
            .unwrap();
        assert_eq!((next.small_blind, next.big_blind), (20, 40));
    }

    #[test]
    fn conflicting_blind_pair_is_rejected() {
        let config = RoomConfig::default();
        let err = config.updated(&ConfigUpdate {
            small_blind: Some(10),
            big_blind: Some(25),
            max_seats: None,
        });
        assert_eq!(err, Err(RoomError::InvalidBlinds));
    }

    #[test]
    fn odd_big_blind_cannot_be_halved() {
        let config = RoomConfig::default();
        let err = config.updated(&ConfigUpdate {
            big_blind: Some(15),
            ..ConfigUpdate::default()
        });
        assert_eq!(err, Err(RoomError::InvalidBlinds));
    }

    #[test]
    fn max_seats_is_bounded() {
        let config = RoomConfig::default();
        assert!(
            config
                .updated(&ConfigUpdate {
                    max_seats: Some(1),
                    ..ConfigUpdate::default()
                })
                .is_err()
        );
        assert!(
            config
                .updated(&ConfigUpdate {
                    max_seats: Some(11),
                    ..ConfigUpdate::default()
                })
                .is_err()
        );
        assert!(
            config
                .updated(&ConfigUpdate {
                    max_seats: Some(6),
                    ..ConfigUpdate::default()
                })
                .is_ok()
        );
    }
}
