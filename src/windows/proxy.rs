use core::ffi::c_void;
use core::marker::PhantomData;
use core::ptr::{self, NonNull};

use windows_sys::Win32::System::Com::{
    COAUTHIDENTITY, CoQueryProxyBlanket, CoSetProxyBlanket,
};
use windows_sys::Win32::System::Rpc::{
    RPC_C_AUTHN_WINNT, RPC_C_AUTHZ_NONE, SEC_WINNT_AUTH_IDENTITY_ANSI,
    SEC_WINNT_AUTH_IDENTITY_UNICODE,
};

use crate::codes::E_UNEXPECTED;
use crate::identity::{NarrowField, WideField};
use crate::platform::{ProxyBlanket, ProxySecurity};
use crate::{AuthIdentity, AuthenticationLevel, Capabilities, ImpersonationLevel};

/// Borrowed COM interface proxy (`IUnknown*`).
///
/// The proxy is not reference counted by this type; the caller keeps its own
/// reference alive for `'a`.
#[derive(Debug)]
pub struct ComProxy<'a> {
    ptr: NonNull<c_void>,
    _marker: PhantomData<&'a c_void>,
}

impl ComProxy<'_> {
    /// Wraps a raw interface pointer; `None` for a null pointer.
    ///
    /// # Safety
    /// A non-null `ptr` must be a valid COM interface proxy that stays alive
    /// for the returned lifetime.
    #[inline]
    #[must_use]
    pub unsafe fn from_raw(ptr: *mut c_void) -> Option<Self> {
        NonNull::new(ptr).map(|ptr| Self {
            ptr,
            _marker: PhantomData,
        })
    }

    /// Returns the underlying interface pointer.
    #[inline]
    #[must_use]
    pub const fn as_raw(&self) -> *mut c_void {
        self.ptr.as_ptr()
    }
}

fn wide(field: Option<&WideField>) -> (*mut u16, u32) {
    field.map_or((ptr::null_mut(), 0), |f| (f.as_ptr().cast_mut(), f.len()))
}

fn narrow(field: Option<&NarrowField>) -> (*mut u16, u32) {
    // COAUTHIDENTITY types every field as USHORT*, whatever the encoding.
    field.map_or((ptr::null_mut(), 0), |f| {
        (f.as_ptr().cast_mut().cast(), f.len())
    })
}

fn auth_identity(identity: &AuthIdentity) -> COAUTHIDENTITY {
    let ((user, user_len), (domain, domain_len), (password, password_len), flags) = match identity
    {
        AuthIdentity::Wide(id) => (
            wide(id.user()),
            wide(id.domain()),
            wide(id.password()),
            SEC_WINNT_AUTH_IDENTITY_UNICODE,
        ),
        AuthIdentity::Narrow(id) => (
            narrow(id.user()),
            narrow(id.domain()),
            narrow(id.password()),
            SEC_WINNT_AUTH_IDENTITY_ANSI,
        ),
    };
    debug_assert_eq!(
        flags,
        identity.encoding().flags(),
        "identity flags must follow the encoding"
    );
    COAUTHIDENTITY {
        User: user,
        UserLength: user_len,
        Domain: domain,
        DomainLength: domain_len,
        Password: password,
        PasswordLength: password_len,
        Flags: flags,
    }
}

impl ProxySecurity for ComProxy<'_> {
    fn set_blanket(&self, blanket: &ProxyBlanket<'_>) -> Result<(), i32> {
        let identity = blanket.identity.map(auth_identity);
        let auth_info = identity
            .as_ref()
            .map_or(ptr::null(), |id| ptr::from_ref(id).cast::<c_void>());
        // SAFETY: the proxy pointer is valid per `from_raw`; `auth_info` is null
        // or points to `identity`, whose field buffers are borrowed from
        // `blanket` and outlive the call.
        let hr = unsafe {
            CoSetProxyBlanket(
                self.as_raw(),
                RPC_C_AUTHN_WINNT,
                RPC_C_AUTHZ_NONE,
                ptr::null(),
                u32::from(blanket.authentication_level),
                u32::from(blanket.impersonation_level),
                auth_info,
                Capabilities::None.bits(),
            )
        };
        if hr < 0 { Err(hr) } else { Ok(()) }
    }

    fn query_blanket(&self) -> Result<(AuthenticationLevel, ImpersonationLevel), i32> {
        let mut authn_service = 0u32;
        let mut authz_service = 0u32;
        let mut authn_level = 0u32;
        let mut imp_level = 0u32;
        let mut capabilities = 0u32;
        // SAFETY: the proxy pointer is valid per `from_raw`; every out pointer
        // targets a local, and the optional outputs are null.
        let hr = unsafe {
            CoQueryProxyBlanket(
                self.as_raw(),
                &raw mut authn_service,
                &raw mut authz_service,
                ptr::null_mut(),
                &raw mut authn_level,
                &raw mut imp_level,
                ptr::null_mut(),
                &raw mut capabilities,
            )
        };
        if hr < 0 {
            return Err(hr);
        }
        let authentication = AuthenticationLevel::try_from(authn_level).map_err(|_| E_UNEXPECTED)?;
        let impersonation = ImpersonationLevel::try_from(imp_level).map_err(|_| E_UNEXPECTED)?;
        Ok((authentication, impersonation))
    }
}
