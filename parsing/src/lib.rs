//! Splitting of `(authority, user)` credential arguments into a domain and a
//! user name.
//!
//! Callers of DCOM helpers hand over credentials in one of four shapes:
//!
//! 1. authority `NTLMDOMAIN:name`, user `User`
//! 2. no authority, user `User`
//! 3. authority `NTLMDOMAIN:`, user `domain\User`
//! 4. no authority, user `domain\User`
//!
//! [`AuthorityUser::parse`] normalizes all of them into an optional domain and
//! an optional user, borrowing from the inputs.
#![cfg_attr(not(feature = "std"), no_std)]

use core::fmt::{self, Display};

use thiserror::Error;

/// Prefix an authority string must start with (ASCII case-insensitive).
pub const DOMAIN_PREFIX: &str = "NTLMDOMAIN:";

/// Size of the working buffer the domain is copied into, terminator included.
pub const MAX_PATH: usize = 260;

/// Separator between the domain and the user inside a user name.
pub const SEPARATOR: char = '\\';

/// Parsing errors for credential arguments.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CredentialParseError {
    /// The authority is neither empty nor prefixed by the domain marker.
    #[error("authority must be empty or start with `{expected}`")]
    UnsupportedAuthority {
        /// The prefix that was expected.
        expected: &'static str,
    },

    /// A domain was given both in the authority and inside the user name.
    #[error("domain specified both in the authority and in the user name")]
    AmbiguousDomain,

    /// The domain embedded in the user name does not fit the working buffer.
    #[error("domain too long: max={max}, actual={actual}")]
    DomainTooLong {
        /// Maximum number of UTF-16 code units.
        max: usize,
        /// Actual number of UTF-16 code units.
        actual: usize,
    },
}

/// Tunables of the parser.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct AuthorityPolicy {
    /// Marker the authority must start with.
    pub prefix: &'static str,
    /// Maximum length, in UTF-16 code units, of a domain taken from the user name.
    pub max_domain_len: usize,
}

impl AuthorityPolicy {
    /// `NTLMDOMAIN:` prefix and a `MAX_PATH` working buffer.
    pub const DEFAULT: Self = Self {
        prefix: DOMAIN_PREFIX,
        max_domain_len: MAX_PATH - 1,
    };

    /// Const constructor for convenience.
    #[inline]
    #[must_use]
    pub const fn new(prefix: &'static str, max_domain_len: usize) -> Self {
        Self {
            prefix,
            max_domain_len,
        }
    }

    /// Returns the text after the prefix, or `None` if `authority` lacks it.
    fn strip_prefix<'a>(&self, authority: &'a str) -> Option<&'a str> {
        let head = authority.get(..self.prefix.len())?;
        if !head.eq_ignore_ascii_case(self.prefix) {
            return None;
        }
        authority.get(self.prefix.len()..)
    }
}

impl Default for AuthorityPolicy {
    #[inline]
    fn default() -> Self {
        Self::DEFAULT
    }
}

/// Byte index of the first separator that is neither the first nor the last
/// character of `user`.
fn embedded_separator(user: &str) -> Option<usize> {
    // The separator is one byte wide, so "not last" is a byte comparison.
    user.match_indices(SEPARATOR)
        .map(|(index, _)| index)
        .find(|&index| index > 0 && index + 1 < user.len())
}

/// Normalized credential parts, borrowed from the parsed arguments.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Default)]
pub struct AuthorityUser<'a> {
    /// Domain, when one was found in the authority or the user name.
    pub domain: Option<&'a str>,
    /// User name without any domain part.
    pub user: Option<&'a str>,
}

impl<'a> AuthorityUser<'a> {
    /// Parses with [`AuthorityPolicy::DEFAULT`].
    ///
    /// # Errors
    /// See [`CredentialParseError`].
    #[inline]
    pub fn parse(
        authority: Option<&'a str>,
        user: Option<&'a str>,
    ) -> Result<Self, CredentialParseError> {
        Self::parse_with_policy(&AuthorityPolicy::DEFAULT, authority, user)
    }

    /// Parses `authority` and `user` with a specific policy.
    ///
    /// # Errors
    /// - [`CredentialParseError::UnsupportedAuthority`] if a non-empty
    ///   authority lacks the policy prefix.
    /// - [`CredentialParseError::AmbiguousDomain`] if both the authority and
    ///   the user name carry a domain.
    /// - [`CredentialParseError::DomainTooLong`] if the domain taken from the
    ///   user name exceeds the policy bound.
    pub fn parse_with_policy(
        policy: &AuthorityPolicy,
        authority: Option<&'a str>,
        user: Option<&'a str>,
    ) -> Result<Self, CredentialParseError> {
        let authority_domain = match authority.filter(|a| !a.is_empty()) {
            None => None,
            Some(authority) => Some(policy.strip_prefix(authority).ok_or(
                CredentialParseError::UnsupportedAuthority {
                    expected: policy.prefix,
                },
            )?),
        }
        .filter(|domain| !domain.is_empty());

        let separator = user.and_then(|u| embedded_separator(u).map(|index| (u, index)));

        match (authority_domain, separator) {
            (Some(_), Some(_)) => Err(CredentialParseError::AmbiguousDomain),
            (Some(domain), None) => Ok(Self {
                domain: Some(domain),
                user,
            }),
            (None, Some((user, index))) => {
                let (domain, rest) = user.split_at(index);
                let actual = domain.encode_utf16().count();
                if actual > policy.max_domain_len {
                    return Err(CredentialParseError::DomainTooLong {
                        max: policy.max_domain_len,
                        actual,
                    });
                }
                let name = rest.get(SEPARATOR.len_utf8()..).filter(|n| !n.is_empty());
                Ok(Self {
                    domain: Some(domain),
                    user: name,
                })
            }
            (None, None) => Ok(Self { domain: None, user }),
        }
    }

    /// Returns `true` when neither a domain nor a user was found.
    #[inline]
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.domain.is_none() && self.user.is_none()
    }
}

impl Display for AuthorityUser<'_> {
    #[inline]
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (self.domain, self.user) {
            (Some(domain), user) => write!(f, "{domain}{SEPARATOR}{}", user.unwrap_or("")),
            (None, user) => f.write_str(user.unwrap_or("")),
        }
    }
}
