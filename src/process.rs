//! Process-wide default blanket (`CoInitializeSecurity`).
//!
//! When asynchronous callbacks arrive from a peer where the local system
//! account has no network identity, the process may have to run at
//! [`AuthenticationLevel::None`]; secure references are then turned off as
//! well.

use tracing::debug;

use crate::{AuthenticationLevel, Error, ImpersonationLevel};

/// Authentication capabilities (`EOLE_AUTHENTICATION_CAPABILITIES`) passed
/// along with the process-wide blanket.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
#[repr(u32)]
pub enum Capabilities {
    /// `EOAC_NONE`
    None = 0,
    /// `EOAC_SECURE_REFS`
    SecureRefs = 2,
}

impl Capabilities {
    /// Capabilities matching `level`: none without authentication, secure
    /// references otherwise.
    #[inline]
    #[must_use]
    pub const fn for_level(level: AuthenticationLevel) -> Self {
        match level {
            AuthenticationLevel::None => Self::None,
            _ => Self::SecureRefs,
        }
    }

    /// Raw flag value.
    #[inline]
    #[must_use]
    pub const fn bits(self) -> u32 {
        self as u32
    }
}

/// Entry point setting the process security policy.
pub trait ProcessSecurityPolicy {
    /// Installs the process-wide defaults.
    ///
    /// # Errors
    /// The failing HRESULT.
    fn initialize(
        &self,
        authentication_level: AuthenticationLevel,
        impersonation_level: ImpersonationLevel,
        capabilities: Capabilities,
    ) -> Result<(), i32>;
}

/// Installs process-wide security defaults through `policy`.
///
/// # Errors
/// [`Error::Platform`] with the failing HRESULT.
#[inline]
pub fn initialize_security_with<P: ProcessSecurityPolicy + ?Sized>(
    policy: &P,
    authentication_level: AuthenticationLevel,
    impersonation_level: ImpersonationLevel,
) -> Result<(), Error> {
    let capabilities = Capabilities::for_level(authentication_level);
    debug!(
        ?authentication_level,
        ?impersonation_level,
        ?capabilities,
        "initializing process security"
    );
    policy
        .initialize(authentication_level, impersonation_level, capabilities)
        .map_err(Error::Platform)
}
