//! `#[serde(with = "...")]` helpers for [`Uid`](crate::Uid) fields.
//!
//! `Uid` itself (de)serializes transparently as a `u64`. These modules add
//! structural validation on the way in, or switch to the 11-character form.

use serde::{Deserialize, Deserializer, Serialize, Serializer};

pub mod as_native {
    use super::{Deserialize, Deserializer, Serialize, Serializer};
    use crate::Uid;

    /// Serialize an identifier as its native integer representation.
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying serializer fails.
    pub fn serialize<S>(id: &Uid, s: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        id.to_raw().serialize(s)
    }

    /// Deserialize an identifier from its native integer representation.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The underlying deserializer fails
    /// - A reserved bit is set (see [`Uid::is_valid`])
    pub fn deserialize<'de, D>(d: D) -> Result<Uid, D::Error>
    where
        D: Deserializer<'de>,
    {
        let id = Uid::from_raw(u64::deserialize(d)?);
        if !id.is_valid() {
            return Err(serde::de::Error::custom(format_args!(
                "reserved bits set in identifier 0x{:016x}",
                id.to_raw()
            )));
        }
        Ok(id)
    }
}

pub mod as_alphanumeric {
    use super::{Deserializer, Serializer};
    use crate::{Uid, alphanumeric::EncodedBuf};

    /// Serialize an identifier as its 11-character alphanumeric form.
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying serializer fails.
    pub fn serialize<S>(id: &Uid, s: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut buf = EncodedBuf::default();
        id.encode_to_buf(&mut buf);
        // The alphabet is ASCII.
        let encoded = core::str::from_utf8(&buf).map_err(serde::ser::Error::custom)?;
        s.serialize_str(encoded)
    }

    /// Deserialize an identifier from its 11-character alphanumeric form.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The underlying deserializer fails
    /// - The string is not a valid alphanumeric identifier
    pub fn deserialize<'de, D>(d: D) -> Result<Uid, D::Error>
    where
        D: Deserializer<'de>,
    {
        struct AlphanumericVisitor;

        impl serde::de::Visitor<'_> for AlphanumericVisitor {
            type Value = Uid;

            fn expecting(&self, formatter: &mut core::fmt::Formatter) -> core::fmt::Result {
                formatter.write_str("an 11-character alphanumeric identifier")
            }

            #[inline]
            fn visit_str<E>(self, v: &str) -> Result<Self::Value, E>
            where
                E: serde::de::Error,
            {
                Uid::decode(v).map_err(serde::de::Error::custom)
            }
        }

        d.deserialize_str(AlphanumericVisitor)
    }
}
