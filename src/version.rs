use std::fmt;

use serde::{de::Visitor, Deserialize, Deserializer, Serialize, Serializer};

/// Version of the running operating system, as reported by the platform.
///
/// Serialized as a dotted string (`"10.15.0"`). Deserializes from a string or
/// a bare major version number.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct OsVersion {
    pub major: u32,
    pub minor: u32,
    pub patch: u32,
}

impl OsVersion {
    pub const fn new(major: u32, minor: u32, patch: u32) -> Self {
        Self {
            major,
            minor,
            patch,
        }
    }

    /// Parse a dotted version string such as `"13.4.1"`.
    ///
    /// Only the leading digits of each component count, so `"17.0b2"` is 17.0.
    /// A string with no leading digits parses as version 0, which no
    /// minimum version accepts.
    pub fn parse(version: &str) -> Self {
        let mut parts = version.trim().split('.').map(leading_number);

        let major = parts.next().flatten().unwrap_or(0);
        let minor = parts.next().flatten().unwrap_or(0);
        let patch = parts.next().flatten().unwrap_or(0);

        Self::new(major, minor, patch)
    }

    /// True if this version is at least `minimum`. Patch releases are ignored.
    pub fn is_at_least(&self, minimum: &OsVersion) -> bool {
        (self.major, self.minor) >= (minimum.major, minimum.minor)
    }
}

fn leading_number(component: &str) -> Option<u32> {
    let end = component
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(component.len());

    component[..end].parse().ok()
}

impl fmt::Display for OsVersion {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}.{}.{}", self.major, self.minor, self.patch)
    }
}

impl Serialize for OsVersion {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for OsVersion {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_any(OsVersionVisitor)
    }
}

struct OsVersionVisitor;

impl<'de> Visitor<'de> for OsVersionVisitor {
    type Value = OsVersion;

    fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
        formatter.write_str("a version string (\"10.15\") or a major version number (13)")
    }

    fn visit_u64<E>(self, v: u64) -> Result<Self::Value, E>
    where
        E: serde::de::Error,
    {
        let major = u32::try_from(v).map_err(|_| E::custom("major version out of range"))?;
        Ok(OsVersion::new(major, 0, 0))
    }

    fn visit_str<E>(self, v: &str) -> Result<Self::Value, E>
    where
        E: serde::de::Error,
    {
        Ok(OsVersion::parse(v))
    }
}
