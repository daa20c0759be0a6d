use std::fmt;
use serde::Serialize;

/// Interpreter release a container was written for
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct Version {
    pub major: u8,
    pub minor: u8,
    pub patch: u8,
}

impl Version {
    pub const fn new(major: u8, minor: u8, patch: u8) -> Self {
        Self { major, minor, patch }
    }

    /// Resolve a magic number by exact match against [`MAGIC_NUMBERS`]
    pub fn from_magic(magic: u32) -> Option<Self> {
        MAGIC_NUMBERS
            .iter()
            .find(|(known, _)| *known == magic)
            .map(|(_, version)| *version)
    }

    /// Containers from 3.2 onwards carry a source-size field after the timestamp
    pub fn has_size_field(&self) -> bool {
        *self >= Version::new(3, 2, 0)
    }
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}.{}", self.major, self.minor, self.patch)
    }
}

/// Known magic numbers, as read from the first four bytes of a container
pub const MAGIC_NUMBERS: &[(u32, Version)] = &[
    (0x0A0DF303, Version::new(2, 7, 0)),
    (0x0A0D0C3B, Version::new(3, 0, 0)),
    (0x0A0D0C4F, Version::new(3, 1, 0)),
    (0x0A0D0C6C, Version::new(3, 2, 0)),
    (0x0A0D0C9E, Version::new(3, 3, 0)),
    (0x0A0D0CEE, Version::new(3, 4, 0)),
    (0x0A0D0D16, Version::new(3, 5, 0)),
    (0x0A0D0D17, Version::new(3, 5, 2)),
    (0x0A0D0D33, Version::new(3, 6, 0)),
];
