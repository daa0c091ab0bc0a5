use core::{fmt, str::FromStr};

use crate::{
    alphanumeric::{self, EncodedBuf},
    error::{Error, Field, Result},
    id::layout::{self, UrlFields},
    kind::UidType,
    path,
};

/// A 64-bit identifier.
///
/// Standard identifiers carry a type, the source that minted them, the second
/// they were minted in and a sequence within that second. Identifiers of type
/// [`UidType::Url`] carry a domain hash and a file hash instead. See
/// [`layout`](crate::id::layout) for the bit positions.
///
/// `Display` and `FromStr` use the 11-character alphanumeric form.
///
/// # Example
///
/// ```
/// use muid::{Uid, UidType};
///
/// let id = Uid::from_components(UidType::Record, 3, 1_700_000_000, 42).unwrap();
/// let s = id.to_string();
/// assert_eq!(s.len(), 11);
///
/// let back: Uid = s.parse().unwrap();
/// assert_eq!(back, id);
/// assert_eq!(back.uid_type().unwrap(), UidType::Record);
/// assert_eq!(back.source(), 3);
/// assert_eq!(back.timestamp(), 1_700_000_000);
/// assert_eq!(back.sequence(), 42);
/// ```
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(transparent)]
pub struct Uid {
    id: u64,
}

/// The fields of an identifier, decoded according to its layout.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Decoded {
    /// A standard identifier.
    Entity {
        ty: UidType,
        source: u8,
        timestamp: u32,
        sequence: u16,
    },
    /// An interned URL.
    Url(UrlFields),
}

impl Uid {
    /// Builds a standard identifier.
    ///
    /// # Errors
    ///
    /// Returns [`Error::FieldOutOfRange`] if `source` exceeds
    /// [`MAX_SOURCE`](layout::MAX_SOURCE), or if `ty` is [`UidType::Url`],
    /// whose identifiers are built with [`Uid::from_url_hashes`].
    pub fn from_components(ty: UidType, source: u8, timestamp: u32, sequence: u16) -> Result<Self> {
        if ty.is_url() {
            return Err(Error::out_of_range(Field::Type, ty.code(), UidType::Url.code() - 1));
        }
        layout::pack(ty.code(), source, timestamp, sequence).map(Self::from_raw)
    }

    /// Builds a URL identifier.
    #[must_use]
    pub const fn from_url_hashes(domain_hash: u16, file_hash: u32) -> Self {
        Self::from_raw(layout::pack_url(domain_hash, file_hash))
    }

    /// Wraps a raw value without validating it. See [`Uid::is_valid`].
    #[must_use]
    pub const fn from_raw(raw: u64) -> Self {
        Self { id: raw }
    }

    #[must_use]
    pub const fn to_raw(self) -> u64 {
        self.id
    }

    /// The raw 9-bit type code.
    #[must_use]
    pub const fn type_code(self) -> u16 {
        layout::type_code(self.id)
    }

    /// Looks the type code up in the registry.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnknownType`] if the code is not registered.
    pub fn uid_type(self) -> Result<UidType> {
        UidType::from_code(self.type_code())
    }

    #[must_use]
    pub const fn is_url(self) -> bool {
        layout::is_url(self.id)
    }

    /// Checks the reserved bits. See [`layout::is_valid`].
    #[must_use]
    pub const fn is_valid(self) -> bool {
        layout::is_valid(self.id)
    }

    #[must_use]
    pub const fn source(self) -> u8 {
        layout::unpack(self.id).source
    }

    /// Unix second at which the identifier was minted.
    #[must_use]
    pub const fn timestamp(self) -> u32 {
        layout::unpack(self.id).timestamp
    }

    #[must_use]
    pub const fn sequence(self) -> u16 {
        layout::unpack(self.id).sequence
    }

    /// The domain hash. Only meaningful for URL identifiers.
    #[must_use]
    pub const fn domain_hash(self) -> u16 {
        layout::unpack_url(self.id).domain_hash
    }

    /// The file hash. Only meaningful for URL identifiers.
    #[must_use]
    pub const fn file_hash(self) -> u32 {
        layout::unpack_url(self.id).file_hash
    }

    /// Decodes the fields according to the layout selected by the type.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnknownType`] if the type code is not registered.
    pub fn fields(self) -> Result<Decoded> {
        let ty = self.uid_type()?;
        if ty.is_url() {
            return Ok(Decoded::Url(layout::unpack_url(self.id)));
        }
        let fields = layout::unpack(self.id);
        Ok(Decoded::Entity {
            ty,
            source: fields.source,
            timestamp: fields.timestamp,
            sequence: fields.sequence,
        })
    }

    /// Directory fan-out for artifacts stored under this identifier, e.g.
    /// `"3/f/a/"`.
    #[must_use]
    pub fn storage_path(self) -> String {
        path::storage_path(self.id)
    }

    /// Writes the alphanumeric form into `buf` without allocating.
    pub fn encode_to_buf(self, buf: &mut EncodedBuf) {
        alphanumeric::encode_to_buf(self.id, buf);
    }

    /// Returns the 11-character alphanumeric form.
    #[must_use]
    pub fn encode(self) -> String {
        alphanumeric::encode(self.id)
    }

    /// Parses the alphanumeric form. The type code is not checked against
    /// the registry; use [`Uid::uid_type`] or [`Uid::fields`] for that.
    ///
    /// # Errors
    ///
    /// See [`alphanumeric::decode`].
    pub fn decode(s: &str) -> Result<Self> {
        alphanumeric::decode(s).map(Self::from_raw)
    }
}

impl From<Uid> for u64 {
    fn from(id: Uid) -> Self {
        id.to_raw()
    }
}

impl From<u64> for Uid {
    fn from(raw: u64) -> Self {
        Self::from_raw(raw)
    }
}

impl FromStr for Uid {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::decode(s)
    }
}

impl fmt::Display for Uid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut buf = EncodedBuf::default();
        self.encode_to_buf(&mut buf);
        // The alphabet is ASCII.
        for &b in &buf {
            fmt::Write::write_char(f, char::from(b))?;
        }
        Ok(())
    }
}

impl fmt::Debug for Uid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut s = f.debug_struct("Uid");
        s.field("raw", &format_args!("0x{:016x}", self.id));
        match UidType::from_code(self.type_code()) {
            Ok(ty) => s.field("type", &format_args!("{ty} ({})", ty.code())),
            Err(_) => s.field("type", &format_args!("? ({})", self.type_code())),
        };
        if self.is_url() {
            s.field("domain_hash", &format_args!("0x{:04x}", self.domain_hash()))
                .field("file_hash", &format_args!("0x{:08x}", self.file_hash()));
        } else {
            s.field("source", &self.source())
                .field("timestamp", &self.timestamp())
                .field("sequence", &self.sequence());
        }
        if !self.is_valid() {
            s.field("valid", &false);
        }
        s.finish()
    }
}
