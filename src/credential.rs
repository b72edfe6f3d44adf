use core::fmt::{self, Debug, Display};

use parsing::{AuthorityPolicy, AuthorityUser};
use zeroize::Zeroizing;

use crate::Error;

/// Caller identity presented to a remote interface.
///
/// Built by [`Credential::normalize`]; owns its strings independently of the
/// raw arguments. The password is wiped when the credential is dropped and
/// never shows up in `Debug` or `Display` output.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct Credential {
    domain: Option<String>,
    user: Option<String>,
    password: Option<Zeroizing<String>>,
}

impl Credential {
    /// Normalizes raw `authority`/`user` arguments with the default policy.
    ///
    /// # Errors
    /// Returns [`Error::InvalidArgument`] when the authority is malformed or
    /// the domain is given twice. See [`parsing::CredentialParseError`].
    ///
    /// # Examples
    /// ```rust
    /// use win_com_security::Credential;
    ///
    /// let cred = Credential::normalize(None, Some("CONTOSO\\alice"), Some("pw")).unwrap();
    /// assert_eq!(cred.domain(), Some("CONTOSO"));
    /// assert_eq!(cred.user(), Some("alice"));
    /// ```
    #[inline]
    pub fn normalize(
        authority: Option<&str>,
        user: Option<&str>,
        password: Option<&str>,
    ) -> Result<Self, Error> {
        Self::normalize_with_policy(&AuthorityPolicy::DEFAULT, authority, user, password)
    }

    /// Normalizes raw arguments with a specific [`AuthorityPolicy`].
    ///
    /// # Errors
    /// See [`Credential::normalize`].
    #[inline]
    pub fn normalize_with_policy(
        policy: &AuthorityPolicy,
        authority: Option<&str>,
        user: Option<&str>,
        password: Option<&str>,
    ) -> Result<Self, Error> {
        let parts = AuthorityUser::parse_with_policy(policy, authority, user)?;
        Ok(Self {
            domain: parts.domain.map(str::to_owned),
            user: parts.user.map(str::to_owned),
            password: password.map(|p| Zeroizing::new(p.to_owned())),
        })
    }

    /// Domain the user belongs to, if any.
    #[inline]
    #[must_use]
    pub fn domain(&self) -> Option<&str> {
        self.domain.as_deref()
    }

    /// User name without domain.
    #[inline]
    #[must_use]
    pub fn user(&self) -> Option<&str> {
        self.user.as_deref()
    }

    /// Password, if one was supplied.
    #[inline]
    #[must_use]
    pub fn password(&self) -> Option<&str> {
        self.password.as_ref().map(|p| p.as_str())
    }
}

impl Debug for Credential {
    #[inline]
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credential")
            .field("domain", &self.domain)
            .field("user", &self.user)
            .field("password", &self.password.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

impl Display for Credential {
    #[inline]
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts = AuthorityUser {
            domain: self.domain(),
            user: self.user(),
        };
        Display::fmt(&parts, f)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, reason = "Unwrap is not an issue in test")]
#[allow(clippy::use_debug, reason = "Debug output is what is tested")]
mod tests {
    use super::*;
    use crate::error::InvalidArgument;
    use parsing::CredentialParseError;

    #[test]
    fn owns_normalized_parts() {
        let raw_user = String::from("dom\\alice");
        let cred = Credential::normalize(Some(""), Some(&raw_user), Some("secret")).unwrap();
        drop(raw_user);
        assert_eq!(cred.domain(), Some("dom"));
        assert_eq!(cred.user(), Some("alice"));
        assert_eq!(cred.password(), Some("secret"));
    }

    #[test]
    fn parse_errors_become_invalid_argument() {
        let err = Credential::normalize(Some("NTLMDOMAIN:dom"), Some("dom2\\alice"), None)
            .unwrap_err();
        assert_eq!(
            err,
            Error::InvalidArgument(InvalidArgument::Credential(
                CredentialParseError::AmbiguousDomain
            ))
        );
    }

    #[test]
    fn password_is_redacted() {
        let cred = Credential::normalize(Some("NTLMDOMAIN:dom"), Some("alice"), Some("hunter2"))
            .unwrap();
        let debug = format!("{cred:?}");
        assert!(!debug.contains("hunter2"), "password leaked: {debug}");
        assert!(debug.contains("<redacted>"), "missing marker: {debug}");
        assert_eq!(cred.to_string(), "dom\\alice");
    }
}
