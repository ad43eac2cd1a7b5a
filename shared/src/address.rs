//! Platform addresses
//!
//! Every entity on the bus is named by a three part address:
//! ```text
//! <namespace>:<group>:<id>      e.g. DRIV:dev:6ff3a5ff-4650-4ce7-82e1-682a58392316
//! ```
//! The string form is the canonical representation and is what gets stored on
//! pairing records, so comparisons are always done on it verbatim.

use std::fmt;
use std::str::FromStr;

use crate::MessageError;

const SEPARATOR: char = ':';
const WILDCARD: &str = "*";

/// A fully qualified platform address
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Address {
    namespace: String,
    group: String,
    id: String,
}

impl Address {
    /// Build an address from its parts
    pub fn new(
        namespace: impl Into<String>,
        group: impl Into<String>,
        id: impl Into<String>,
    ) -> Self {
        Self {
            namespace: namespace.into(),
            group: group.into(),
            id: id.into(),
        }
    }

    /// Shorthand for a driver-bound device address (`DRIV:dev:<id>`)
    pub fn driver_device(id: impl Into<String>) -> Self {
        Self::new(namespace::DRIVER, group::DEVICE, id)
    }

    /// Parse a canonical representation
    ///
    /// Splits on the first two `:` only; the id keeps any further colons.
    pub fn parse(repr: &str) -> Result<Self, MessageError> {
        let [namespace, group, id] = split_segments(repr)?;
        Ok(Self::new(namespace, group, id))
    }

    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    pub fn group(&self) -> &str {
        &self.group
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    /// Canonical string form, used as the join key against stored records
    pub fn representation(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}{SEPARATOR}{}{SEPARATOR}{}",
            self.namespace, self.group, self.id
        )
    }
}

impl FromStr for Address {
    type Err = MessageError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

/// Well known address namespaces
pub mod namespace {
    /// Devices bound to a driver
    pub const DRIVER: &str = "DRIV";
}

/// Well known address groups
pub mod group {
    pub const DEVICE: &str = "dev";
}

/// Pattern used by subscriptions to select message sources
///
/// Each segment is either a literal or `*`, which matches anything.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct AddressPattern {
    namespace: Segment,
    group: Segment,
    id: Segment,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
enum Segment {
    Any,
    Exact(String),
}

impl Segment {
    fn parse(value: &str) -> Self {
        if value == WILDCARD {
            Segment::Any
        } else {
            Segment::Exact(value.to_string())
        }
    }

    fn matches(&self, value: &str) -> bool {
        match self {
            Segment::Any => true,
            Segment::Exact(expected) => expected == value,
        }
    }
}

impl fmt::Display for Segment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Segment::Any => f.write_str(WILDCARD),
            Segment::Exact(value) => f.write_str(value),
        }
    }
}

impl AddressPattern {
    /// Any driver-bound device (`DRIV:dev:*`)
    pub fn driver_devices() -> Self {
        Self {
            namespace: Segment::Exact(namespace::DRIVER.to_string()),
            group: Segment::Exact(group::DEVICE.to_string()),
            id: Segment::Any,
        }
    }

    /// Parse a pattern such as `DRIV:dev:*`
    pub fn parse(pattern: &str) -> Result<Self, MessageError> {
        let [namespace, group, id] = split_segments(pattern)?;
        Ok(Self {
            namespace: Segment::parse(namespace),
            group: Segment::parse(group),
            id: Segment::parse(id),
        })
    }

    /// Check whether an address falls under this pattern
    pub fn matches(&self, address: &Address) -> bool {
        self.namespace.matches(address.namespace())
            && self.group.matches(address.group())
            && self.id.matches(address.id())
    }
}

impl fmt::Display for AddressPattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}{SEPARATOR}{}{SEPARATOR}{}",
            self.namespace, self.group, self.id
        )
    }
}

impl FromStr for AddressPattern {
    type Err = MessageError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

fn split_segments(repr: &str) -> Result<[&str; 3], MessageError> {
    let mut parts = repr.splitn(3, SEPARATOR);
    match (parts.next(), parts.next(), parts.next()) {
        (Some(namespace), Some(group), Some(id))
            if !namespace.is_empty() && !group.is_empty() && !id.is_empty() =>
        {
            Ok([namespace, group, id])
        }
        _ => Err(MessageError::InvalidAddress(repr.to_string())),
    }
}
