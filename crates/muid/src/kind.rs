//! # Type registry
//!
//! Every identifier carries a 9-bit type code naming the kind of entity it
//! refers to. The catalog below is append-only: once an identifier has been
//! persisted, its code must keep meaning the same thing forever. Add new
//! entries at the end and never reorder or reuse codes.

use core::{fmt, str::FromStr};

use crate::error::{Error, Result};

/// Declares the type registry as a fieldless enum with stable codes.
///
/// Codes must be dense and start at zero; the const assertion below rejects
/// gaps so that `from_code` can stay a bounds check plus a table lookup.
macro_rules! define_uid_types {
    (
        $(#[$meta:meta])*
        $vis:vis enum $name:ident {
            $(
                $(#[$vmeta:meta])*
                $variant:ident = ($code:expr, $label:literal)
            ),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
        #[repr(u16)]
        $vis enum $name {
            $(
                $(#[$vmeta])*
                $variant = $code,
            )+
        }

        impl $name {
            /// Every registered type, ordered by code.
            pub const ALL: &'static [Self] = &[$(Self::$variant),+];

            /// Number of registered types. Valid codes are `0..COUNT`.
            pub const COUNT: u16 = Self::ALL.len() as u16;

            /// Returns the stable numeric code.
            #[must_use]
            pub const fn code(self) -> u16 {
                self as u16
            }

            /// Returns the lower-case name used in logs and on the command
            /// line.
            #[must_use]
            pub const fn name(self) -> &'static str {
                match self {
                    $(Self::$variant => $label,)+
                }
            }

            /// Looks up a type by its numeric code.
            ///
            /// # Errors
            ///
            /// Returns [`Error::UnknownType`] if no type has this code.
            pub fn from_code(code: u16) -> Result<Self> {
                if code < Self::COUNT {
                    Ok(Self::ALL[code as usize])
                } else {
                    Err(Error::UnknownType(code))
                }
            }

            /// Looks up a type by its name.
            ///
            /// # Errors
            ///
            /// Returns [`Error::UnknownTypeName`] if no type has this name.
            pub fn from_name(name: &str) -> Result<Self> {
                match name {
                    $($label => Ok(Self::$variant),)+
                    _ => Err(Error::UnknownTypeName(name.to_owned())),
                }
            }
        }

        const _: () = {
            let mut i = 0;
            while i < $name::ALL.len() {
                assert!(
                    $name::ALL[i] as usize == i,
                    "type codes must be dense and ordered"
                );
                i += 1;
            }
            assert!(
                $name::ALL.len() <= crate::id::layout::MAX_TYPE as usize + 1,
                "type registry exceeds the 9-bit type field"
            );
        };
    };
}

define_uid_types! {
    /// The kind of entity an identifier refers to.
    ///
    /// # Example
    ///
    /// ```
    /// use muid::UidType;
    ///
    /// assert_eq!(UidType::Record.code(), 5);
    /// assert_eq!(UidType::from_code(5).unwrap(), UidType::Record);
    /// assert_eq!("venue".parse::<UidType>().unwrap(), UidType::Venue);
    /// assert!(UidType::from_code(UidType::COUNT).is_err());
    /// ```
    pub enum UidType {
        /// A band, linked to a genre.
        Band = (0, "band"),
        /// A city.
        City = (1, "city"),
        /// An event hosted in a venue.
        Event = (2, "event"),
        /// A music genre.
        Genre = (3, "genre"),
        /// A musical instrument.
        Instrument = (4, "instrument"),
        /// A record released by a band.
        Record = (5, "record"),
        /// A collection of events.
        Tour = (6, "tour"),
        /// A track on a record.
        Track = (7, "track"),
        /// A user account.
        User = (8, "user"),
        /// A venue located in a city.
        Venue = (9, "venue"),
        /// An external URL. Identifiers of this type use the URL layout and
        /// are only minted by the interning store.
        Url = (10, "url"),
    }
}

impl UidType {
    /// Returns `true` for the reserved URL type.
    #[must_use]
    pub const fn is_url(self) -> bool {
        matches!(self, Self::Url)
    }
}

impl fmt::Display for UidType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for UidType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::from_name(s)
    }
}

impl TryFrom<u16> for UidType {
    type Error = Error;

    fn try_from(code: u16) -> Result<Self> {
        Self::from_code(code)
    }
}

impl From<UidType> for u16 {
    fn from(ty: UidType) -> Self {
        ty.code()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn codes_are_stable() {
        let expected = [
            (UidType::Band, 0),
            (UidType::City, 1),
            (UidType::Event, 2),
            (UidType::Genre, 3),
            (UidType::Instrument, 4),
            (UidType::Record, 5),
            (UidType::Tour, 6),
            (UidType::Track, 7),
            (UidType::User, 8),
            (UidType::Venue, 9),
            (UidType::Url, 10),
        ];
        for (ty, code) in expected {
            assert_eq!(ty.code(), code);
            assert_eq!(UidType::from_code(code).unwrap(), ty);
        }
        assert_eq!(UidType::COUNT, 11);
    }

    #[test]
    fn names_round_trip() {
        for &ty in UidType::ALL {
            assert_eq!(ty.name().parse::<UidType>().unwrap(), ty);
            assert_eq!(ty.to_string(), ty.name());
        }
    }

    #[test]
    fn unknown_code_is_rejected() {
        assert!(matches!(
            UidType::from_code(11),
            Err(Error::UnknownType(11))
        ));
        assert!(matches!(
            UidType::try_from(511),
            Err(Error::UnknownType(511))
        ));
    }

    #[test]
    fn unknown_name_is_rejected() {
        let err = "Band".parse::<UidType>().unwrap_err();
        assert!(matches!(err, Error::UnknownTypeName(ref n) if n == "Band"));
    }

    #[test]
    fn only_url_is_url() {
        assert!(UidType::Url.is_url());
        assert_eq!(UidType::ALL.iter().filter(|t| t.is_url()).count(), 1);
    }
}
