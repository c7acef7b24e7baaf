use serde::de::{Error, Unexpected};
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt::{Display, Formatter};
use thiserror::Error;

/// Bulb brightness in percent, always within [`Dimming::MIN`]..=[`Dimming::MAX`].
#[derive(PartialEq, Eq, Clone, Copy, Debug, Serialize)]
#[serde(transparent)]
pub struct Dimming(u8);

impl Dimming {
    pub const MIN: u8 = 10;
    pub const MAX: u8 = 100;

    pub fn new(value: u8) -> Result<Self, InvalidDimming> {
        if (Self::MIN..=Self::MAX).contains(&value) {
            Ok(Dimming(value))
        } else {
            Err(InvalidDimming(value))
        }
    }

    pub fn value(&self) -> u8 {
        self.0
    }
}

impl Default for Dimming {
    fn default() -> Self {
        Dimming(Self::MAX)
    }
}

impl Display for Dimming {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}%", self.0)
    }
}

#[derive(Error, Debug, PartialEq)]
#[error("dimming must be between {min} and {max}, got {0}", min = Dimming::MIN, max = Dimming::MAX)]
pub struct InvalidDimming(pub u8);

impl<'de> Deserialize<'de> for Dimming {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = u64::deserialize(deserializer)?;
        let percentage = u8::try_from(value).map_err(|_| D::Error::invalid_value(Unexpected::Unsigned(value), &"a dimming between 10 and 100"))?;

        Dimming::new(percentage).map_err(|_| D::Error::invalid_value(Unexpected::Unsigned(value), &"a dimming between 10 and 100"))
    }
}
