//! Seams between the security helpers and the host platform.
//!
//! The helpers only ever talk to the RPC layer and to the thread token
//! through these traits. The Windows implementations live in
//! `crate::windows`; tests plug in their own.

use std::sync::OnceLock;

use crate::access::{AccessMask, GenericMapping, PrivilegeBuffer};
use crate::{AuthIdentity, AuthenticationLevel, ImpersonationLevel};

/// Host family, deciding the character width of identity records.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum PlatformFamily {
    /// NT-family host: identity fields are UTF-16.
    Modern,
    /// Pre-NT host: identity fields use the ANSI code page.
    Legacy,
}

impl PlatformFamily {
    /// Family of the running host, probed once per process.
    #[inline]
    #[must_use]
    pub fn current() -> Self {
        static FAMILY: OnceLock<PlatformFamily> = OnceLock::new();
        *FAMILY.get_or_init(Self::probe)
    }

    #[cfg(windows)]
    fn probe() -> Self {
        if crate::windows::is_nt_platform() {
            Self::Modern
        } else {
            Self::Legacy
        }
    }

    #[cfg(not(windows))]
    const fn probe() -> Self {
        Self::Modern
    }

    /// Returns `true` for hosts needing ANSI identities.
    #[inline]
    #[must_use]
    pub const fn is_legacy(self) -> bool {
        matches!(self, Self::Legacy)
    }
}

/// Security settings applied to one interface proxy.
#[derive(Debug, Clone, Copy)]
pub struct ProxyBlanket<'a> {
    /// Authentication level of calls through the proxy.
    pub authentication_level: AuthenticationLevel,
    /// Impersonation level granted to the server.
    pub impersonation_level: ImpersonationLevel,
    /// Explicit identity; `None` uses the identity of the calling process.
    pub identity: Option<&'a AuthIdentity>,
}

/// An interface proxy whose security blanket can be set and queried.
pub trait ProxySecurity {
    /// Applies `blanket` to the proxy.
    ///
    /// # Errors
    /// The failing HRESULT.
    fn set_blanket(&self, blanket: &ProxyBlanket<'_>) -> Result<(), i32>;

    /// Returns the levels currently negotiated on the proxy.
    ///
    /// # Errors
    /// The failing HRESULT.
    fn query_blanket(&self) -> Result<(AuthenticationLevel, ImpersonationLevel), i32>;
}

/// Outcome of one access check attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccessCheckStatus {
    /// The check ran and granted the access.
    Granted(AccessMask),
    /// The check ran and denied the access.
    Denied,
    /// The privilege buffer is too small; `required` bytes are needed.
    BufferTooSmall {
        /// Size the platform asked for.
        required: u32,
    },
    /// The check failed with a Win32 error.
    Failed(u32),
}

/// An open access token.
///
/// Dropping the value releases the underlying handle.
pub trait AccessToken {
    /// Security descriptor type the token is checked against.
    type Descriptor: ?Sized;

    /// Checks `desired` (already mapped to specific rights) against `descriptor`.
    ///
    /// `privileges` receives the privilege set consulted by the check; an empty
    /// buffer probes for the required size.
    fn access_check(
        &self,
        descriptor: &Self::Descriptor,
        desired: AccessMask,
        mapping: &GenericMapping,
        privileges: &mut PrivilegeBuffer,
    ) -> AccessCheckStatus;

    /// Raw `SECURITY_IMPERSONATION_LEVEL` stored in the token.
    ///
    /// # Errors
    /// The Win32 error code of the failing query.
    fn impersonation_level(&self) -> Result<i32, u32>;
}

/// Source of the calling thread's token.
pub trait ThreadTokenSource {
    /// Token handed out.
    type Token: AccessToken;

    /// Opens the thread token for query access, as self.
    ///
    /// # Errors
    /// The Win32 error code of the failing open.
    fn open_thread_token(&self) -> Result<Self::Token, u32>;
}

/// Descriptor type accepted by the tokens of `S`.
pub type DescriptorOf<S> = <<S as ThreadTokenSource>::Token as AccessToken>::Descriptor;
