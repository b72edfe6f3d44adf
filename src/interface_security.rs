//! Per-proxy security blankets.
//!
//! Clients living in a DLL usually do not control the process-wide COM
//! security settings (`CoInitializeSecurity`). They set the blanket on each
//! interface proxy instead, which is also the only way to call with
//! credentials other than the process identity.

use tracing::debug;

use crate::codes::RPC_E_BINDING_HAS_NO_AUTH;
use crate::error::InvalidArgument;
use crate::platform::{ProxyBlanket, ProxySecurity};
use crate::{
    AuthIdentity, AuthenticationLevel, Credential, Error, ImpersonationLevel, PlatformFamily,
};

fn is_blank(value: Option<&str>) -> bool {
    value.is_none_or(str::is_empty)
}

fn apply<P: ProxySecurity + ?Sized>(proxy: &P, blanket: &ProxyBlanket<'_>) -> Result<(), Error> {
    debug!(
        authentication_level = ?blanket.authentication_level,
        impersonation_level = ?blanket.impersonation_level,
        encoding = ?blanket.identity.map(AuthIdentity::encoding),
        "setting proxy blanket"
    );
    proxy.set_blanket(blanket).map_err(Error::Platform)
}

/// Blanket request for one interface proxy.
///
/// # Examples
/// ```rust
/// use win_com_security::{AuthenticationLevel, ImpersonationLevel, InterfaceSecurity};
///
/// let request = InterfaceSecurity::new(
///     AuthenticationLevel::PacketPrivacy,
///     ImpersonationLevel::Impersonate,
/// )
/// .authority("NTLMDOMAIN:CONTOSO")
/// .user("alice")
/// .password("secret");
/// # let _ = request;
/// ```
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct InterfaceSecurity<'a> {
    authority: Option<&'a str>,
    user: Option<&'a str>,
    password: Option<&'a str>,
    authentication_level: AuthenticationLevel,
    impersonation_level: ImpersonationLevel,
}

impl<'a> InterfaceSecurity<'a> {
    /// Request for the given levels, using the process identity.
    #[inline]
    #[must_use]
    pub const fn new(
        authentication_level: AuthenticationLevel,
        impersonation_level: ImpersonationLevel,
    ) -> Self {
        Self {
            authority: None,
            user: None,
            password: None,
            authentication_level,
            impersonation_level,
        }
    }

    /// Authority argument, empty or `NTLMDOMAIN:<domain>`.
    #[inline]
    #[must_use]
    pub const fn authority(mut self, authority: &'a str) -> Self {
        self.authority = Some(authority);
        self
    }

    /// User name, optionally `domain\user`.
    #[inline]
    #[must_use]
    pub const fn user(mut self, user: &'a str) -> Self {
        self.user = Some(user);
        self
    }

    /// Password.
    #[inline]
    #[must_use]
    pub const fn password(mut self, password: &'a str) -> Self {
        self.password = Some(password);
        self
    }

    /// Applies the request to `proxy`, encoding credentials for the running host.
    ///
    /// # Errors
    /// See [`InterfaceSecurity::apply_for_family`].
    #[inline]
    pub fn apply<P: ProxySecurity + ?Sized>(&self, proxy: Option<&P>) -> Result<(), Error> {
        self.apply_for_family(proxy, PlatformFamily::current())
    }

    /// Applies the request to `proxy`, encoding credentials for `family`.
    ///
    /// With [`AuthenticationLevel::None`] the credentials are ignored and the
    /// proxy gets no authentication with impersonation allowed. When no
    /// credential is given at all, the process identity is used. Otherwise the
    /// credentials are normalized and encoded first, and nothing is applied if
    /// that fails.
    ///
    /// # Errors
    /// - [`Error::InvalidArgument`] if `proxy` is `None`, or the credentials
    ///   cannot be normalized or encoded.
    /// - [`Error::OutOfMemory`] if an identity buffer cannot be allocated.
    /// - [`Error::Platform`] if the proxy rejects the blanket.
    pub fn apply_for_family<P: ProxySecurity + ?Sized>(
        &self,
        proxy: Option<&P>,
        family: PlatformFamily,
    ) -> Result<(), Error> {
        let proxy = proxy.ok_or(InvalidArgument::NullInterface)?;

        if self.authentication_level == AuthenticationLevel::None {
            return apply(
                proxy,
                &ProxyBlanket {
                    authentication_level: AuthenticationLevel::None,
                    impersonation_level: ImpersonationLevel::Impersonate,
                    identity: None,
                },
            );
        }

        if is_blank(self.authority) && is_blank(self.user) && is_blank(self.password) {
            return apply(
                proxy,
                &ProxyBlanket {
                    authentication_level: self.authentication_level,
                    impersonation_level: self.impersonation_level,
                    identity: None,
                },
            );
        }

        let credential = Credential::normalize(self.authority, self.user, self.password)?;
        let identity = AuthIdentity::encode(&credential, family)?;
        apply(
            proxy,
            &ProxyBlanket {
                authentication_level: self.authentication_level,
                impersonation_level: self.impersonation_level,
                identity: Some(&identity),
            },
        )
    }
}

impl core::fmt::Debug for InterfaceSecurity<'_> {
    #[inline]
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("InterfaceSecurity")
            .field("authority", &self.authority)
            .field("user", &self.user)
            .field("password", &self.password.map(|_| "<redacted>"))
            .field("authentication_level", &self.authentication_level)
            .field("impersonation_level", &self.impersonation_level)
            .finish()
    }
}

/// Sets the security blanket of one interface proxy.
///
/// Shorthand for [`InterfaceSecurity::apply`].
///
/// # Errors
/// See [`InterfaceSecurity::apply_for_family`].
#[inline]
pub fn set_interface_security<P: ProxySecurity + ?Sized>(
    proxy: Option<&P>,
    authority: Option<&str>,
    user: Option<&str>,
    password: Option<&str>,
    authentication_level: AuthenticationLevel,
    impersonation_level: ImpersonationLevel,
) -> Result<(), Error> {
    InterfaceSecurity {
        authority,
        user,
        password,
        authentication_level,
        impersonation_level,
    }
    .apply(proxy)
}

/// Returns the authentication and impersonation levels negotiated on `proxy`.
///
/// A peer answering that the binding carries no authentication (a share-level
/// legacy box) is reported as `(None, Identify)` instead of an error.
///
/// # Errors
/// - [`Error::InvalidParameter`] if `proxy` is `None`.
/// - [`Error::Platform`] with the HRESULT of any other query failure.
#[inline]
pub fn query_interface_security<P: ProxySecurity + ?Sized>(
    proxy: Option<&P>,
) -> Result<(AuthenticationLevel, ImpersonationLevel), Error> {
    let proxy = proxy.ok_or(Error::InvalidParameter)?;
    match proxy.query_blanket() {
        Ok(levels) => Ok(levels),
        Err(RPC_E_BINDING_HAS_NO_AUTH) => {
            debug!("peer binding has no authentication, reporting identify level");
            Ok((AuthenticationLevel::None, ImpersonationLevel::Identify))
        }
        Err(code) => Err(Error::Platform(code)),
    }
}
