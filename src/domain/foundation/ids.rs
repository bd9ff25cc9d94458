//! Strongly-typed identifier value objects.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

use super::ValidationError;

macro_rules! uuid_id {
    ($(#[$doc:meta])* $name:ident) => {
        $(#[$doc])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(Uuid);

        impl $name {
            /// Creates a new random identifier.
            pub fn new() -> Self {
                Self(Uuid::new_v4())
            }

            /// Creates an identifier from an existing UUID.
            pub fn from_uuid(uuid: Uuid) -> Self {
                Self(uuid)
            }

            /// Returns the inner UUID.
            pub fn as_uuid(&self) -> &Uuid {
                &self.0
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::new()
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl FromStr for $name {
            type Err = uuid::Error;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Ok(Self(Uuid::parse_str(s)?))
            }
        }
    };
}

uuid_id!(
    /// Unique identifier for a debate room.
    RoomId
);

uuid_id!(
    /// Unique identifier for a participant within a room.
    ///
    /// Identifiers are totally ordered; the winner tie-break in the result
    /// pipeline relies on this ordering being deterministic.
    ParticipantId
);

uuid_id!(
    /// Unique identifier for a single debate turn.
    TurnId
);

uuid_id!(
    /// Unique identifier for a persisted debate result.
    ResultId
);

uuid_id!(
    /// Unique identifier for an authenticated user.
    ///
    /// Users are owned by the external auth collaborator; this crate only
    /// carries their identity.
    UserId
);

/// Human-shareable join code for a room, stored uppercase.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RoomCode(String);

impl RoomCode {
    /// Creates a room code, normalizing to uppercase.
    pub fn new(code: impl Into<String>) -> Result<Self, ValidationError> {
        let code = code.into().trim().to_uppercase();
        if code.is_empty() {
            return Err(ValidationError::empty_field("room_code"));
        }
        Ok(Self(code))
    }

    /// Returns the code as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RoomCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
