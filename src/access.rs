//! Access checks against the calling thread's token.
//!
//! Servers that cannot or should not impersonate their caller (resources not
//! protected by ACLs, or callers connected at identify level) evaluate the
//! caller's rights themselves with [`check_access_with`].

use core::ffi::c_void;
use core::fmt;
use core::ops::{BitOr, BitOrAssign};

use smallvec::SmallVec;
use tracing::{trace, warn};

use crate::Error;
use crate::codes::ERROR_ACCESS_DENIED;
use crate::platform::{AccessCheckStatus, AccessToken, DescriptorOf, ThreadTokenSource};

/// A 32-bit access mask.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default)]
#[repr(transparent)]
pub struct AccessMask(u32);

impl AccessMask {
    /// `GENERIC_READ`
    pub const GENERIC_READ: Self = Self(0x8000_0000);
    /// `GENERIC_WRITE`
    pub const GENERIC_WRITE: Self = Self(0x4000_0000);
    /// `GENERIC_EXECUTE`
    pub const GENERIC_EXECUTE: Self = Self(0x2000_0000);
    /// `GENERIC_ALL`
    pub const GENERIC_ALL: Self = Self(0x1000_0000);

    const GENERIC: u32 = Self::GENERIC_READ.0
        | Self::GENERIC_WRITE.0
        | Self::GENERIC_EXECUTE.0
        | Self::GENERIC_ALL.0;

    /// Wraps raw mask bits.
    #[inline]
    #[must_use]
    pub const fn from_bits(bits: u32) -> Self {
        Self(bits)
    }

    /// Raw mask bits.
    #[inline]
    #[must_use]
    pub const fn bits(self) -> u32 {
        self.0
    }

    /// Returns `true` if every bit of `other` is set in `self`.
    #[inline]
    #[must_use]
    pub const fn contains(self, other: Self) -> bool {
        self.0 & other.0 == other.0
    }

    /// Returns `true` if any generic bit is set.
    #[inline]
    #[must_use]
    pub const fn has_generic(self) -> bool {
        self.0 & Self::GENERIC != 0
    }
}

impl BitOr for AccessMask {
    type Output = Self;

    #[inline]
    fn bitor(self, rhs: Self) -> Self {
        Self(self.0 | rhs.0)
    }
}

impl BitOrAssign for AccessMask {
    #[inline]
    fn bitor_assign(&mut self, rhs: Self) {
        self.0 |= rhs.0;
    }
}

impl fmt::Debug for AccessMask {
    #[inline]
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "AccessMask({:#010x})", self.0)
    }
}

/// Translation of generic rights into the specific rights of an object type
/// (`GENERIC_MAPPING`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct GenericMapping {
    /// Rights granted by `GENERIC_READ`.
    pub read: AccessMask,
    /// Rights granted by `GENERIC_WRITE`.
    pub write: AccessMask,
    /// Rights granted by `GENERIC_EXECUTE`.
    pub execute: AccessMask,
    /// Rights granted by `GENERIC_ALL`.
    pub all: AccessMask,
}

impl GenericMapping {
    /// Replaces the generic bits of `mask` with the rights they map to, like
    /// `MapGenericMask`.
    #[inline]
    #[must_use]
    pub const fn map(&self, mask: AccessMask) -> AccessMask {
        let mut bits = mask.0;
        if bits & AccessMask::GENERIC_READ.0 != 0 {
            bits |= self.read.0;
        }
        if bits & AccessMask::GENERIC_WRITE.0 != 0 {
            bits |= self.write.0;
        }
        if bits & AccessMask::GENERIC_EXECUTE.0 != 0 {
            bits |= self.execute.0;
        }
        if bits & AccessMask::GENERIC_ALL.0 != 0 {
            bits |= self.all.0;
        }
        AccessMask(bits & !AccessMask::GENERIC)
    }
}

/// Caller-owned storage for the privilege set written by an access check.
///
/// Backed by 32-bit words so the platform structure is suitably aligned.
pub struct PrivilegeBuffer {
    words: SmallVec<[u32; 8]>,
    byte_len: u32,
}

impl PrivilegeBuffer {
    /// Largest privilege set accepted, far above any real token's.
    pub const MAX_BYTE_LEN: u32 = 0x1_0000;

    /// Zero-sized buffer used to probe for the required size.
    #[inline]
    #[must_use]
    pub fn empty() -> Self {
        Self {
            words: SmallVec::new(),
            byte_len: 0,
        }
    }

    /// Allocates a zeroed buffer of `byte_len` bytes.
    ///
    /// # Errors
    /// [`Error::OutOfMemory`] if `byte_len` exceeds [`Self::MAX_BYTE_LEN`] or
    /// the allocation fails.
    #[inline]
    pub fn try_with_len(byte_len: u32) -> Result<Self, Error> {
        if byte_len > Self::MAX_BYTE_LEN {
            return Err(Error::OutOfMemory);
        }
        let word_count = byte_len.div_ceil(4) as usize;
        let mut words = SmallVec::new();
        words
            .try_reserve_exact(word_count)
            .map_err(|_| Error::OutOfMemory)?;
        words.resize(word_count, 0);
        Ok(Self { words, byte_len })
    }

    /// Usable size in bytes.
    #[inline]
    #[must_use]
    pub const fn byte_len(&self) -> u32 {
        self.byte_len
    }

    /// Pointer handed to the platform; null for the empty buffer.
    #[inline]
    #[must_use]
    pub fn as_mut_ptr(&mut self) -> *mut c_void {
        if self.byte_len == 0 {
            core::ptr::null_mut()
        } else {
            self.words.as_mut_ptr().cast()
        }
    }
}

impl fmt::Debug for PrivilegeBuffer {
    #[inline]
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PrivilegeBuffer")
            .field("byte_len", &self.byte_len)
            .finish_non_exhaustive()
    }
}

/// Successful access check.
///
/// Only produced when access is granted; a denial is
/// [`Error::AccessDenied`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AccessCheckResult {
    granted_access: AccessMask,
}

impl AccessCheckResult {
    /// Rights granted by the descriptor.
    #[inline]
    #[must_use]
    pub const fn granted_access(&self) -> AccessMask {
        self.granted_access
    }
}

/// Checks whether the calling thread may get `desired` on `descriptor`.
///
/// `desired` is mapped through `mapping` first. The privilege set is sized by
/// a first check with an empty buffer; when the platform reports it too small,
/// a buffer of the reported size is allocated and the check runs once more.
/// The token is released before returning on every path.
///
/// # Errors
/// - [`Error::AccessDenied`] if the token cannot be opened for lack of
///   rights, or the check fails or denies the access for any reason.
/// - [`Error::Failed`] if the token cannot be opened for another reason.
/// - [`Error::OutOfMemory`] if the privilege buffer cannot be allocated.
pub fn check_access_with<S: ThreadTokenSource>(
    source: &S,
    descriptor: &DescriptorOf<S>,
    desired: AccessMask,
    mapping: &GenericMapping,
) -> Result<AccessCheckResult, Error> {
    let token = source.open_thread_token().map_err(|code| {
        warn!(code, "cannot open the thread token for an access check");
        if code == ERROR_ACCESS_DENIED {
            Error::AccessDenied
        } else {
            Error::Failed(code)
        }
    })?;

    let desired = mapping.map(desired);
    let mut probe = PrivilegeBuffer::empty();
    let status = match token.access_check(descriptor, desired, mapping, &mut probe) {
        AccessCheckStatus::BufferTooSmall { required } => {
            trace!(required, "retrying access check with a privilege buffer");
            let mut privileges = PrivilegeBuffer::try_with_len(required)?;
            token.access_check(descriptor, desired, mapping, &mut privileges)
        }
        status => status,
    };

    match status {
        AccessCheckStatus::Granted(granted_access) => Ok(AccessCheckResult { granted_access }),
        AccessCheckStatus::Denied
        | AccessCheckStatus::BufferTooSmall { .. }
        | AccessCheckStatus::Failed(_) => Err(Error::AccessDenied),
    }
}
