//! Encoding of a [`Credential`] into the identity record handed to the RPC
//! layer (`COAUTHIDENTITY` on Windows).
//!
//! NT-family hosts take UTF-16 fields. Legacy hosts take fields in the ANSI
//! code page, copied into a fixed `MAX_PATH` working buffer; a field that does
//! not fit is rejected rather than retried with a larger buffer.

use core::fmt::{self, Debug, Display};

use arrayvec::ArrayVec;
use thiserror::Error;
use widestring::U16CString;
use zeroize::Zeroize;

use crate::{Credential, Error, PlatformFamily};

/// Capacity of a narrow field, terminator included.
pub const NARROW_FIELD_CAPACITY: usize = parsing::MAX_PATH;

/// Which credential field an encoding error refers to.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Field {
    /// User name.
    User,
    /// Domain.
    Domain,
    /// Password.
    Password,
}

impl Display for Field {
    #[inline]
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::User => f.write_str("user"),
            Self::Domain => f.write_str("domain"),
            Self::Password => f.write_str("password"),
        }
    }
}

/// Reasons a credential field cannot be encoded.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EncodeError {
    /// The field does not fit the working buffer.
    #[error("{field} too long: max={max}, actual={actual}")]
    FieldTooLong {
        /// Offending field.
        field: Field,
        /// Maximum encoded length.
        max: usize,
        /// Encoded length that was required.
        actual: usize,
    },

    /// The field contains a character with no exact mapping in the ANSI code page.
    #[error("{field} contains U+{code_point:04X} which has no ANSI form")]
    Unrepresentable {
        /// Offending field.
        field: Field,
        /// The character that could not be transcoded.
        code_point: u32,
    },

    /// The field contains a NUL character.
    #[error("{field} contains a NUL character")]
    InteriorNul {
        /// Offending field.
        field: Field,
    },
}

/// Character width of an encoded identity.
///
/// Discriminants are the `SEC_WINNT_AUTH_IDENTITY_*` flag values.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
#[repr(u32)]
pub enum IdentityEncoding {
    /// `SEC_WINNT_AUTH_IDENTITY_ANSI`
    Ansi = 1,
    /// `SEC_WINNT_AUTH_IDENTITY_UNICODE`
    Unicode = 2,
}

impl IdentityEncoding {
    /// Flag value expected in the identity record.
    #[inline]
    #[must_use]
    pub const fn flags(self) -> u32 {
        self as u32
    }
}

/// UTF-16 units of `value` followed by the terminator.
///
/// Capacity is exactly the length, so handing the buffer to `U16CString`
/// never reallocates and leaves no stray copy behind.
fn terminated_utf16(value: &str) -> Result<Vec<u16>, Error> {
    let mut units = Vec::new();
    units
        .try_reserve_exact(value.encode_utf16().count() + 1)
        .map_err(|_| Error::OutOfMemory)?;
    units.extend(value.encode_utf16());
    units.push(0);
    Ok(units)
}

/// NUL-terminated UTF-16 field.
pub struct WideField {
    text: U16CString,
    len: u32,
}

impl WideField {
    fn encode(field: Field, value: &str) -> Result<Self, Error> {
        // A trailing NUL would be taken for the terminator.
        if value.contains('\0') {
            return Err(EncodeError::InteriorNul { field }.into());
        }
        let units = terminated_utf16(value)?;
        let len = u32::try_from(units.len() - 1).map_err(|_| EncodeError::FieldTooLong {
            field,
            max: u32::MAX as usize,
            actual: units.len() - 1,
        })?;
        let text =
            U16CString::from_vec(units).map_err(|_| EncodeError::InteriorNul { field })?;
        Ok(Self { text, len })
    }

    /// Pointer to the first code unit; the buffer is NUL-terminated.
    #[inline]
    #[must_use]
    pub fn as_ptr(&self) -> *const u16 {
        self.text.as_ptr()
    }

    /// Length in code units, terminator excluded.
    #[inline]
    #[must_use]
    pub const fn len(&self) -> u32 {
        self.len
    }

    /// Returns `true` for an empty field.
    #[inline]
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Code units, terminator excluded.
    #[inline]
    #[must_use]
    pub fn as_slice(&self) -> &[u16] {
        self.text.as_slice()
    }
}

impl Drop for WideField {
    fn drop(&mut self) {
        let mut units = core::mem::take(&mut self.text).into_vec();
        units.zeroize();
    }
}

/// Longest encoding of one character in a narrow field.
pub(crate) const MAX_CHAR_BYTES: usize = 4;

cfg_if::cfg_if! {
    if #[cfg(windows)] {
        use crate::windows::encode_ansi_char as encode_narrow_char;
    } else {
        /// ISO-8859-1; hosts without an ANSI code page have nothing closer.
        fn encode_narrow_char(ch: char, out: &mut [u8; MAX_CHAR_BYTES]) -> Option<&[u8]> {
            let [first, ..] = out;
            *first = u8::try_from(ch).ok()?;
            Some(core::slice::from_ref(first))
        }
    }
}

/// ANSI field stored in a fixed working buffer, NUL-terminated.
pub struct NarrowField {
    bytes: ArrayVec<u8, NARROW_FIELD_CAPACITY>,
}

impl NarrowField {
    /// Transcodes `value` to the host's ANSI code page.
    ///
    /// Every character needs an exact mapping (no best-fit substitutes) and
    /// the result must leave room for the terminator.
    fn transcode(field: Field, value: &str) -> Result<Self, EncodeError> {
        let mut bytes = ArrayVec::new();
        let mut needed = 0usize;
        for ch in value.chars() {
            if ch == '\0' {
                return Err(EncodeError::InteriorNul { field });
            }
            let mut scratch = [0u8; MAX_CHAR_BYTES];
            let encoded =
                encode_narrow_char(ch, &mut scratch).ok_or(EncodeError::Unrepresentable {
                    field,
                    code_point: u32::from(ch),
                })?;
            needed += encoded.len();
            if needed < NARROW_FIELD_CAPACITY {
                bytes.extend(encoded.iter().copied());
            }
        }
        if needed >= NARROW_FIELD_CAPACITY {
            return Err(EncodeError::FieldTooLong {
                field,
                max: NARROW_FIELD_CAPACITY - 1,
                actual: needed,
            });
        }
        bytes.push(0);
        Ok(Self { bytes })
    }

    /// Pointer to the first byte; the buffer is NUL-terminated.
    #[inline]
    #[must_use]
    pub fn as_ptr(&self) -> *const u8 {
        self.bytes.as_ptr()
    }

    /// Encoded bytes, terminator excluded.
    #[inline]
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        self.bytes.split_last().map_or(&[], |(_, text)| text)
    }

    /// Length in bytes, terminator excluded.
    #[inline]
    #[must_use]
    #[allow(
        clippy::cast_possible_truncation,
        reason = "bounded by NARROW_FIELD_CAPACITY"
    )]
    pub fn len(&self) -> u32 {
        self.as_bytes().len() as u32
    }

    /// Returns `true` for an empty field.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.as_bytes().is_empty()
    }
}

impl Drop for NarrowField {
    fn drop(&mut self) {
        self.bytes.as_mut_slice().zeroize();
    }
}

/// Encoded user, domain and password; each field is optional.
pub struct EncodedIdentity<F> {
    user: Option<F>,
    domain: Option<F>,
    password: Option<F>,
}

impl<F> EncodedIdentity<F> {
    fn try_encode<E>(
        credential: &Credential,
        encode: impl Fn(Field, &str) -> Result<F, E>,
    ) -> Result<Self, E> {
        Ok(Self {
            user: credential.user().map(|v| encode(Field::User, v)).transpose()?,
            domain: credential
                .domain()
                .map(|v| encode(Field::Domain, v))
                .transpose()?,
            password: credential
                .password()
                .map(|v| encode(Field::Password, v))
                .transpose()?,
        })
    }

    /// Encoded user name.
    #[inline]
    #[must_use]
    pub const fn user(&self) -> Option<&F> {
        self.user.as_ref()
    }

    /// Encoded domain.
    #[inline]
    #[must_use]
    pub const fn domain(&self) -> Option<&F> {
        self.domain.as_ref()
    }

    /// Encoded password.
    #[inline]
    #[must_use]
    pub const fn password(&self) -> Option<&F> {
        self.password.as_ref()
    }
}

impl<F> Debug for EncodedIdentity<F> {
    #[inline]
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EncodedIdentity")
            .field("user", &self.user.is_some())
            .field("domain", &self.domain.is_some())
            .field("password", &self.password.is_some())
            .finish()
    }
}

/// UTF-16 identity for NT-family hosts.
pub type WideIdentity = EncodedIdentity<WideField>;
/// ANSI identity for legacy hosts.
pub type NarrowIdentity = EncodedIdentity<NarrowField>;

/// Identity record in the character width the host expects.
#[derive(Debug)]
pub enum AuthIdentity {
    /// UTF-16 fields.
    Wide(WideIdentity),
    /// ANSI code page fields; boxed, the working buffers are large.
    Narrow(Box<NarrowIdentity>),
}

impl AuthIdentity {
    /// Encodes `credential` for `family`.
    ///
    /// # Errors
    /// - [`Error::InvalidArgument`] with an [`EncodeError`] when a field
    ///   contains NUL, has no exact ANSI mapping, or does not fit
    ///   the narrow working buffer.
    /// - [`Error::OutOfMemory`] when a UTF-16 buffer cannot be allocated.
    #[inline]
    pub fn encode(credential: &Credential, family: PlatformFamily) -> Result<Self, Error> {
        match family {
            PlatformFamily::Modern => {
                EncodedIdentity::try_encode(credential, WideField::encode).map(Self::Wide)
            }
            PlatformFamily::Legacy => {
                EncodedIdentity::try_encode(credential, NarrowField::transcode)
                    .map(|identity| Self::Narrow(Box::new(identity)))
                    .map_err(Error::from)
            }
        }
    }

    /// Character width of the record.
    #[inline]
    #[must_use]
    pub const fn encoding(&self) -> IdentityEncoding {
        match self {
            Self::Wide(_) => IdentityEncoding::Unicode,
            Self::Narrow(_) => IdentityEncoding::Ansi,
        }
    }
}
