//! Destination-side addresses (`user@server`).

use std::{fmt, str::FromStr};

use serde::{Deserialize, Deserializer, Serialize, Serializer};

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Jid {
    pub user: String,
    pub server: String,
}

impl Jid {
    pub fn new(user: impl Into<String>, server: impl Into<String>) -> Self {
        Self {
            user: user.into(),
            server: server.into(),
        }
    }
}

impl fmt::Display for Jid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}@{}", self.user, self.server)
    }
}

impl FromStr for Jid {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.split_once('@') {
            Some((user, server)) if !user.is_empty() && !server.is_empty() => {
                Ok(Self::new(user, server))
            },
            _ => Err(format!("not a user@server address: {s:?}")),
        }
    }
}

impl Serialize for Jid {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Jid {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_and_displays() {
        let jid: Jid = "100042@msgr".parse().unwrap();
        assert_eq!(jid, Jid::new("100042", "msgr"));
        assert_eq!(jid.to_string(), "100042@msgr");
    }

    #[test]
    fn rejects_missing_parts() {
        assert!("100042".parse::<Jid>().is_err());
        assert!("@msgr".parse::<Jid>().is_err());
        assert!("100042@".parse::<Jid>().is_err());
    }

    #[test]
    fn serializes_as_string() {
        let json = serde_json::to_string(&Jid::new("7", "msgr")).unwrap();
        assert_eq!(json, "\"7@msgr\"");
        let back: Jid = serde_json::from_str(&json).unwrap();
        assert_eq!(back.user, "7");
    }
}
