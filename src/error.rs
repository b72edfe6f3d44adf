use parsing::CredentialParseError;
use thiserror::Error;

use crate::codes;
use crate::identity::EncodeError;

/// Why an argument was rejected.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InvalidArgument {
    /// The authority/user pair could not be normalized.
    #[error(transparent)]
    Credential(#[from] CredentialParseError),
    /// A credential field could not be encoded for the platform.
    #[error(transparent)]
    Encoding(#[from] EncodeError),
    /// No interface proxy was supplied.
    #[error("interface proxy is null")]
    NullInterface,
}

/// Errors returned by the security helpers.
///
/// Every variant maps to the HRESULT a COM caller would expect, see
/// [`Error::hresult`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[non_exhaustive]
pub enum Error {
    /// Malformed or ambiguous caller input. Never retried.
    #[error("invalid argument: {0}")]
    InvalidArgument(#[from] InvalidArgument),

    /// A required parameter of a query was missing.
    #[error("invalid parameter")]
    InvalidParameter,

    /// A buffer could not be allocated.
    #[error("out of memory")]
    OutOfMemory,

    /// The thread token could not be read, or the access check denied the request.
    ///
    /// Both cases are reported identically.
    #[error("access denied")]
    AccessDenied,

    /// The thread token could not be opened for a reason other than permissions.
    ///
    /// Contains the Win32 error code returned by `GetLastError`.
    #[error("thread token unavailable (error {0})")]
    Failed(u32),

    /// The RPC layer returned a failure HRESULT.
    #[error("platform call failed (HRESULT 0x{0:08X})")]
    Platform(i32),
}

impl Error {
    /// HRESULT equivalent of this error.
    #[inline]
    #[must_use]
    pub const fn hresult(&self) -> i32 {
        match self {
            Self::InvalidArgument(_) => codes::E_INVALIDARG,
            Self::InvalidParameter => codes::WBEM_E_INVALID_PARAMETER,
            Self::OutOfMemory => codes::E_OUTOFMEMORY,
            Self::AccessDenied => codes::WBEM_E_ACCESS_DENIED,
            Self::Failed(_) => codes::WBEM_E_FAILED,
            Self::Platform(code) => *code,
        }
    }
}

impl From<CredentialParseError> for Error {
    #[inline]
    fn from(value: CredentialParseError) -> Self {
        Self::InvalidArgument(value.into())
    }
}

impl From<EncodeError> for Error {
    #[inline]
    fn from(value: EncodeError) -> Self {
        Self::InvalidArgument(value.into())
    }
}

#[cfg(all(windows, feature = "windows_result"))]
impl From<Error> for windows_result::HRESULT {
    #[inline]
    fn from(value: Error) -> Self {
        Self(value.hresult())
    }
}

#[cfg(all(windows, feature = "windows_result"))]
impl From<Error> for windows_result::Error {
    #[inline]
    fn from(value: Error) -> Self {
        let hresult: windows_result::HRESULT = value.into();
        Self::from_hresult(hresult)
    }
}
