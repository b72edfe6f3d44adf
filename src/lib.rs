//! # DCOM security helpers for Rust
//!
//! Client and server building blocks for talking to remote COM objects with
//! explicit security settings:
//! - [`InterfaceSecurity`] / [`set_interface_security`]: set the security
//!   blanket (authentication level, impersonation level, optional explicit
//!   credentials) on one interface proxy.
//! - [`query_interface_security`]: read back the negotiated levels, coping
//!   with peers that do not authenticate at all.
//! - [`Credential`]: normalize an authority/user pair (`NTLMDOMAIN:<domain>`
//!   or `DOMAIN\user`) into domain and user.
//! - [`check_access_with`]: evaluate a security descriptor against the calling
//!   thread's token, mapping generic rights first.
//! - [`current_impersonation_level_with`]: report the level the calling thread
//!   runs at.
//! - [`initialize_security_with`]: install process-wide defaults.
//!
//! ## Platform seams
//! Every call into the RPC layer or the thread token goes through a trait
//! ([`ProxySecurity`], [`ThreadTokenSource`], [`AccessToken`],
//! [`ProcessSecurityPolicy`]). The `*_with` entry points are generic over those
//! traits and run on any host; on Windows the `windows` module binds them to
//! the real APIs and offers the ready-made [`check_access`],
//! [`current_impersonation_level`] and [`initialize_security`].
//!
//! ## Errors
//! All fallible operations return [`Error`]. With the default
//! `windows_result` feature it converts into `windows_result::HRESULT` using
//! the WBEM status codes callers expect.
//!
//! ## Examples
//! ### Normalize credentials
//! ```rust
//! use win_com_security::Credential;
//!
//! let credential = Credential::normalize(None, Some("CONTOSO\\alice"), None)?;
//! assert_eq!(credential.domain(), Some("CONTOSO"));
//! assert_eq!(credential.user(), Some("alice"));
//! # Ok::<(), win_com_security::Error>(())
//! ```
//!
//! ### (Windows) Current impersonation level
//! ```no_run
//! # #[cfg(windows)]
//! # {
//! use win_com_security::{ImpersonationLevel, current_impersonation_level};
//! assert_eq!(current_impersonation_level(), ImpersonationLevel::Delegate);
//! # }
//! ```

#![warn(missing_docs)]
#![cfg_attr(docsrs, feature(doc_auto_cfg, doc_cfg))]

mod access;
pub mod codes;
mod credential;
mod error;
pub mod identity;
mod impersonation;
mod interface_security;
mod levels;
mod platform;
mod process;

pub use access::{AccessCheckResult, AccessMask, GenericMapping, PrivilegeBuffer, check_access_with};
pub use credential::Credential;
pub use error::{Error, InvalidArgument};
pub use identity::{AuthIdentity, IdentityEncoding};
pub use impersonation::current_impersonation_level_with;
pub use interface_security::{InterfaceSecurity, query_interface_security, set_interface_security};
pub use levels::{AuthenticationLevel, ImpersonationLevel, SecurityImpersonationLevel};
pub use platform::{
    AccessCheckStatus, AccessToken, DescriptorOf, PlatformFamily, ProxyBlanket, ProxySecurity,
    ThreadTokenSource,
};
pub use process::{Capabilities, ProcessSecurityPolicy, initialize_security_with};

/// Authority/user parsing, usable without the platform layer.
pub use parsing;
pub use parsing::{AuthorityPolicy, AuthorityUser, CredentialParseError};

cfg_if::cfg_if! {
    if #[cfg(windows)] {
        mod windows;

        #[cfg_attr(docsrs, doc(cfg(windows)))]
        pub use windows::{
            ComProcess, ComProxy, CurrentThread, SecurityDescriptor, ThreadToken, check_access,
            current_impersonation_level, initialize_security,
        };
    }
}
