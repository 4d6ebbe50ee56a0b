use std::{fmt, str::FromStr};

use rand::Rng;
use serde::{Deserialize, Serialize};

use super::RoomError;

pub const CODE_LEN: usize = 4;

/// Upper-case letters minus `I` and `O`, which read as `1` and `0`.
pub const ALPHABET: &[u8] = b"ABCDEFGHJKLMNPQRSTUVWXYZ";

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct RoomCode(String);

impl RoomCode {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// For codes read back from the store, which only ever holds validated codes.
    pub(super) fn from_stored(code: String) -> Self {
        Self(code)
    }
}

/// Random code from [`ALPHABET`]. Says nothing about whether the code is taken.
pub fn generate() -> RoomCode {
    generate_with(&mut rand::rng())
}

pub fn generate_with<R: Rng + ?Sized>(rng: &mut R) -> RoomCode {
    let code = (0..CODE_LEN)
        .map(|_| ALPHABET[rng.random_range(0..ALPHABET.len())] as char)
        .collect();
    RoomCode(code)
}

impl FromStr for RoomCode {
    type Err = RoomError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        let code = raw.trim().to_ascii_uppercase();
        if code.chars().count() != CODE_LEN {
            return Err(RoomError::InvalidCode(raw.to_owned(), "room codes are 4 characters"));
        }
        if !code.bytes().all(|b| ALPHABET.contains(&b)) {
            return Err(RoomError::InvalidCode(raw.to_owned(), "room codes only use unambiguous letters"));
        }
        Ok(Self(code))
    }
}

impl TryFrom<String> for RoomCode {
    type Error = RoomError;

    fn try_from(raw: String) -> Result<Self, Self::Error> {
        raw.parse()
    }
}

impl From<RoomCode> for String {
    fn from(code: RoomCode) -> Self {
        code.0
    }
}

impl fmt::Display for RoomCode {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(&self.0)
    }
}
