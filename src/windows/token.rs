use core::ffi::c_void;
use core::marker::{PhantomData, PhantomPinned};
use core::ptr;
use std::os::windows::io::{AsRawHandle, FromRawHandle, OwnedHandle, RawHandle};

use windows_sys::Win32::Foundation::{ERROR_INSUFFICIENT_BUFFER, GetLastError};
use windows_sys::Win32::Security::{
    AccessCheck, GENERIC_MAPPING, GetTokenInformation, PSECURITY_DESCRIPTOR,
    SECURITY_IMPERSONATION_LEVEL, SecurityAnonymous, TOKEN_QUERY, TokenImpersonationLevel,
};
use windows_sys::Win32::System::Threading::{GetCurrentThread, OpenThreadToken};

use crate::access::{AccessCheckResult, AccessMask, GenericMapping, PrivilegeBuffer};
use crate::platform::{AccessCheckStatus, AccessToken, ThreadTokenSource};
use crate::{Error, ImpersonationLevel};

/// Opaque view of a `SECURITY_DESCRIPTOR`.
///
/// Only ever used behind a reference obtained from [`SecurityDescriptor::from_raw`].
#[repr(C)]
pub struct SecurityDescriptor {
    _data: [u8; 0],
    _marker: PhantomData<(*mut u8, PhantomPinned)>,
}

impl SecurityDescriptor {
    /// Creates a reference to a `SecurityDescriptor` from a raw pointer.
    ///
    /// # Safety
    /// `raw` must point to a valid (absolute or self-relative) security
    /// descriptor that lives at least as long as the returned reference.
    #[inline]
    #[must_use]
    pub const unsafe fn from_raw<'a>(raw: PSECURITY_DESCRIPTOR) -> &'a Self {
        // SAFETY: Same precondition as the public API.
        unsafe { &*raw.cast::<Self>() }
    }

    /// Returns the underlying raw pointer.
    #[inline]
    #[must_use]
    pub const fn as_raw(&self) -> PSECURITY_DESCRIPTOR {
        ptr::from_ref(self).cast_mut().cast()
    }
}

/// The calling thread, as a source of its token.
#[derive(Debug, Default, Clone, Copy)]
pub struct CurrentThread;

/// Thread token opened for query access; closed on drop.
#[derive(Debug)]
pub struct ThreadToken {
    handle: OwnedHandle,
}

impl ThreadTokenSource for CurrentThread {
    type Token = ThreadToken;

    fn open_thread_token(&self) -> Result<ThreadToken, u32> {
        let mut raw_handle: RawHandle = ptr::null_mut();
        // SAFETY: GetCurrentThread has no precondition and returns a pseudo handle.
        let thread = unsafe { GetCurrentThread() };
        // SAFETY: `thread` is valid for the calling thread; the out pointer targets
        // a local. The return value is checked right away.
        let ok = unsafe { OpenThreadToken(thread, TOKEN_QUERY, 1, &raw mut raw_handle) };
        if ok == 0 {
            // SAFETY: GetLastError can be called immediately after a failing FFI call.
            return Err(unsafe { GetLastError() });
        }
        // SAFETY: OpenThreadToken reported success; the handle is owned by us.
        let handle = unsafe { OwnedHandle::from_raw_handle(raw_handle) };
        Ok(ThreadToken { handle })
    }
}

impl From<&GenericMapping> for GENERIC_MAPPING {
    #[inline]
    fn from(mapping: &GenericMapping) -> Self {
        Self {
            GenericRead: mapping.read.bits(),
            GenericWrite: mapping.write.bits(),
            GenericExecute: mapping.execute.bits(),
            GenericAll: mapping.all.bits(),
        }
    }
}

impl AccessToken for ThreadToken {
    type Descriptor = SecurityDescriptor;

    fn access_check(
        &self,
        descriptor: &SecurityDescriptor,
        desired: AccessMask,
        mapping: &GenericMapping,
        privileges: &mut PrivilegeBuffer,
    ) -> AccessCheckStatus {
        let generic = GENERIC_MAPPING::from(mapping);
        let mut length = privileges.byte_len();
        let mut granted = 0u32;
        let mut status = 0;
        // SAFETY: the descriptor is valid per `SecurityDescriptor::from_raw`,
        // the token handle is open, the privilege pointer is null or points to
        // `length` writable bytes, and the remaining pointers target locals.
        let ok = unsafe {
            AccessCheck(
                descriptor.as_raw(),
                self.handle.as_raw_handle(),
                desired.bits(),
                &raw const generic,
                privileges.as_mut_ptr().cast(),
                &raw mut length,
                &raw mut granted,
                &raw mut status,
            )
        };
        if ok == 0 {
            // SAFETY: GetLastError can be called immediately after a failing FFI call.
            let err = unsafe { GetLastError() };
            return if err == ERROR_INSUFFICIENT_BUFFER {
                AccessCheckStatus::BufferTooSmall { required: length }
            } else {
                AccessCheckStatus::Failed(err)
            };
        }
        if status == 0 {
            AccessCheckStatus::Denied
        } else {
            AccessCheckStatus::Granted(AccessMask::from_bits(granted))
        }
    }

    fn impersonation_level(&self) -> Result<i32, u32> {
        #[allow(clippy::cast_possible_truncation, reason = "size of an i32")]
        const LEVEL_SIZE: u32 = size_of::<SECURITY_IMPERSONATION_LEVEL>() as u32;
        let mut level: SECURITY_IMPERSONATION_LEVEL = SecurityAnonymous;
        let mut returned = 0u32;
        // SAFETY: `level` is a writable SECURITY_IMPERSONATION_LEVEL and the
        // length passed matches its size.
        let ok = unsafe {
            GetTokenInformation(
                self.handle.as_raw_handle(),
                TokenImpersonationLevel,
                (&raw mut level).cast::<c_void>(),
                LEVEL_SIZE,
                &raw mut returned,
            )
        };
        if ok == 0 {
            // SAFETY: GetLastError can be called immediately after a failing FFI call.
            return Err(unsafe { GetLastError() });
        }
        Ok(level)
    }
}

/// Checks whether the calling thread may get `desired` on `descriptor`.
///
/// See [`check_access_with`](crate::check_access_with).
///
/// # Errors
/// See [`check_access_with`](crate::check_access_with).
#[inline]
pub fn check_access(
    descriptor: &SecurityDescriptor,
    desired: AccessMask,
    mapping: &GenericMapping,
) -> Result<AccessCheckResult, Error> {
    crate::check_access_with(&CurrentThread, descriptor, desired, mapping)
}

/// Impersonation level of the calling thread.
///
/// See [`current_impersonation_level_with`](crate::current_impersonation_level_with).
#[inline]
#[must_use]
pub fn current_impersonation_level() -> ImpersonationLevel {
    crate::current_impersonation_level_with(&CurrentThread)
}
