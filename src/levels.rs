use num_enum::{IntoPrimitive, TryFromPrimitive};

/// Rust representation of `RPC_C_AUTHN_LEVEL`.
///
/// Values are passed through to the platform unchanged.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, TryFromPrimitive, IntoPrimitive,
)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[repr(u32)]
pub enum AuthenticationLevel {
    /// `RPC_C_AUTHN_LEVEL_DEFAULT`: let the platform negotiate.
    Default = 0,
    /// `RPC_C_AUTHN_LEVEL_NONE`
    None = 1,
    /// `RPC_C_AUTHN_LEVEL_CONNECT`
    Connect = 2,
    /// `RPC_C_AUTHN_LEVEL_CALL`
    Call = 3,
    /// `RPC_C_AUTHN_LEVEL_PKT`
    Packet = 4,
    /// `RPC_C_AUTHN_LEVEL_PKT_INTEGRITY`
    PacketIntegrity = 5,
    /// `RPC_C_AUTHN_LEVEL_PKT_PRIVACY`
    PacketPrivacy = 6,
}

/// Rust representation of `RPC_C_IMP_LEVEL`.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, TryFromPrimitive, IntoPrimitive,
)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[repr(u32)]
pub enum ImpersonationLevel {
    /// `RPC_C_IMP_LEVEL_DEFAULT`
    Default = 0,
    /// `RPC_C_IMP_LEVEL_ANONYMOUS`: the server cannot see who the caller is.
    Anonymous = 1,
    /// `RPC_C_IMP_LEVEL_IDENTIFY`: the server may check the caller's identity only.
    Identify = 2,
    /// `RPC_C_IMP_LEVEL_IMPERSONATE`: the server may act as the caller locally.
    Impersonate = 3,
    /// `RPC_C_IMP_LEVEL_DELEGATE`: the server may act as the caller on further hops.
    Delegate = 4,
}

/// Rust representation of `SECURITY_IMPERSONATION_LEVEL`, as stored in a token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, TryFromPrimitive)]
#[repr(i32)]
pub enum SecurityImpersonationLevel {
    /// `SecurityAnonymous`
    Anonymous = 0,
    /// `SecurityIdentification`
    Identification = 1,
    /// `SecurityImpersonation`
    Impersonation = 2,
    /// `SecurityDelegation`
    Delegation = 3,
}

impl From<SecurityImpersonationLevel> for ImpersonationLevel {
    #[inline]
    fn from(value: SecurityImpersonationLevel) -> Self {
        match value {
            SecurityImpersonationLevel::Anonymous => Self::Anonymous,
            SecurityImpersonationLevel::Identification => Self::Identify,
            SecurityImpersonationLevel::Impersonation => Self::Impersonate,
            SecurityImpersonationLevel::Delegation => Self::Delegate,
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, reason = "Unwrap is not an issue in test")]
mod tests {
    use super::*;

    #[test]
    fn raw_values_follow_rpc_constants() {
        assert_eq!(u32::from(AuthenticationLevel::None), 1);
        assert_eq!(u32::from(AuthenticationLevel::PacketPrivacy), 6);
        assert_eq!(u32::from(ImpersonationLevel::Identify), 2);
        assert_eq!(
            ImpersonationLevel::try_from(4u32).unwrap(),
            ImpersonationLevel::Delegate
        );
        assert!(AuthenticationLevel::try_from(7u32).is_err());
    }

    #[test]
    fn token_levels_map_one_to_one() {
        let mapped: Vec<ImpersonationLevel> = (0..4_i32)
            .map(|raw| SecurityImpersonationLevel::try_from(raw).unwrap().into())
            .collect();
        assert_eq!(
            mapped,
            [
                ImpersonationLevel::Anonymous,
                ImpersonationLevel::Identify,
                ImpersonationLevel::Impersonate,
                ImpersonationLevel::Delegate,
            ]
        );
        assert!(SecurityImpersonationLevel::try_from(4_i32).is_err());
    }

    #[cfg(feature = "serde")]
    #[test]
    fn serde_uses_variant_names() {
        use serde_test::{Token, assert_tokens};
        assert_tokens(
            &AuthenticationLevel::PacketIntegrity,
            &[Token::UnitVariant {
                name: "AuthenticationLevel",
                variant: "PacketIntegrity",
            }],
        );
        assert_tokens(
            &ImpersonationLevel::Impersonate,
            &[Token::UnitVariant {
                name: "ImpersonationLevel",
                variant: "Impersonate",
            }],
        );
    }

    #[cfg(windows)]
    #[test]
    fn values_match_platform() {
        use windows_sys::Win32::Security;
        use windows_sys::Win32::System::Com;
        assert_eq!(
            u32::from(AuthenticationLevel::PacketPrivacy),
            Com::RPC_C_AUTHN_LEVEL_PKT_PRIVACY
        );
        assert_eq!(
            u32::from(ImpersonationLevel::Delegate),
            Com::RPC_C_IMP_LEVEL_DELEGATE
        );
        assert_eq!(
            SecurityImpersonationLevel::Delegation as i32,
            Security::SecurityDelegation
        );
    }
}
