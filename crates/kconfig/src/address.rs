use std::fmt;

use serde::{Deserializer, Serializer, de};

/// A 64-bit address in the configuration file.
///
/// TOML integers are signed 64-bit, so higher-half addresses cannot be written as plain
/// integers. Addresses are accepted as strings (`"0xFFFF_FFFF_8000_0000"`, decimal also works)
/// and as non-negative integers, and are always written back as hex strings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Address(pub u64);

impl Address {
    pub fn parse(text: &str) -> Option<Self> {
        let digits: String = text.trim().chars().filter(|&c| c != '_').collect();
        let value = match digits.strip_prefix("0x").or_else(|| digits.strip_prefix("0X")) {
            Some(hex) => u64::from_str_radix(hex, 16).ok()?,
            None => digits.parse().ok()?,
        };
        Some(Self(value))
    }

    /// Whether bits 48..64 replicate bit 47, as x86_64 requires of every virtual address.
    pub const fn is_canonical(self) -> bool {
        let top = self.0 >> 47;
        top == 0 || top == 0x1_FFFF
    }
}

impl serde::Serialize for Address {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&format!("{:#X}", self.0))
    }
}

impl<'de> serde::Deserialize<'de> for Address {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct AddressVisitor;

        impl de::Visitor<'_> for AddressVisitor {
            type Value = Address;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("an address as a hex string or a non-negative integer")
            }

            fn visit_str<E: de::Error>(self, value: &str) -> Result<Address, E> {
                Address::parse(value).ok_or_else(|| E::invalid_value(de::Unexpected::Str(value), &self))
            }

            fn visit_i64<E: de::Error>(self, value: i64) -> Result<Address, E> {
                u64::try_from(value)
                    .map(Address)
                    .map_err(|_| E::invalid_value(de::Unexpected::Signed(value), &self))
            }

            fn visit_u64<E: de::Error>(self, value: u64) -> Result<Address, E> {
                Ok(Address(value))
            }
        }

        deserializer.deserialize_any(AddressVisitor)
    }
}
