//! Compact text encoding for persisted state (CBOR, then URL-safe base64).

use std::{fmt::Display, str::FromStr};

use base64::engine::general_purpose::URL_SAFE;
use base64::Engine;
use serde::{Deserialize, Serialize};


// Display and FromStr are inverse: the encoded text fits in a URL or a single text column
#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq)]
pub struct EncodedState<T>(pub T);

impl <T> From<T> for EncodedState<T> {
    fn from(value: T) -> Self {
        EncodedState(value)
    }
}

impl<T: Serialize> EncodedState<T> {
    pub fn encode(&self) -> Result<String, StateCodecError> {
        let mut serialized = Vec::new();
        ciborium::into_writer(&self.0, &mut serialized)
            .map_err(|e| StateCodecError::EncodeError(e.to_string()))?;
        Ok(URL_SAFE.encode(serialized))
    }
}

impl<T: Serialize> Display for EncodedState<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if let Ok(encoded) = self.encode() {
            write!(f, "{}", encoded)?;
        }
        Ok(())
    }
}

#[derive(Debug)]
pub enum StateCodecError {
    EncodeError(String),
    DecodeError(base64::DecodeError),
    CiboriumError(ciborium::de::Error<std::io::Error>),
}

impl std::fmt::Display for StateCodecError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EncodeError(err) => write!(f, "Failed to serialize: {}", err),
            Self::DecodeError(err) => write!(f, "Failed to decode base64: {}", err),
            Self::CiboriumError(err) => write!(f, "Failed to deserialize: {}", err),
        }
    }
}

impl std::error::Error for StateCodecError {}

impl<T: for<'de> Deserialize<'de>> FromStr for EncodedState<T> {
    type Err = StateCodecError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let decoded = URL_SAFE
            .decode(s.trim().as_bytes())
            .map_err(StateCodecError::DecodeError)?;
        let parsed = ciborium::from_reader(std::io::Cursor::new(decoded))
            .map_err(StateCodecError::CiboriumError)?;
        Ok(EncodedState(parsed))
    }
}
