// Shared test doubles for the platform seams.
#![allow(dead_code, reason = "not every test binary uses every double")]

use core::cell::{Cell, RefCell};
use std::collections::VecDeque;
use std::rc::Rc;

use win_com_security::{
    AccessCheckStatus, AccessMask, AccessToken, AuthIdentity, AuthenticationLevel,
    GenericMapping, IdentityEncoding, ImpersonationLevel, PrivilegeBuffer, ProxyBlanket,
    ProxySecurity, ThreadTokenSource,
};

/// What one `set_blanket` call received.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppliedBlanket {
    pub authentication_level: AuthenticationLevel,
    pub impersonation_level: ImpersonationLevel,
    pub identity: Option<AppliedIdentity>,
}

/// Decoded copy of the identity record handed to the proxy.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppliedIdentity {
    pub encoding: IdentityEncoding,
    pub user: Option<String>,
    pub domain: Option<String>,
    pub password: Option<String>,
}

impl AppliedIdentity {
    fn capture(identity: &AuthIdentity) -> Self {
        match identity {
            AuthIdentity::Wide(id) => {
                let text = |f: Option<&win_com_security::identity::WideField>| {
                    f.map(|f| String::from_utf16_lossy(f.as_slice()))
                };
                Self {
                    encoding: identity.encoding(),
                    user: text(id.user()),
                    domain: text(id.domain()),
                    password: text(id.password()),
                }
            }
            AuthIdentity::Narrow(id) => {
                let text = |f: Option<&win_com_security::identity::NarrowField>| {
                    f.map(|f| f.as_bytes().iter().copied().map(char::from).collect())
                };
                Self {
                    encoding: identity.encoding(),
                    user: text(id.user()),
                    domain: text(id.domain()),
                    password: text(id.password()),
                }
            }
        }
    }
}

/// Proxy recording every blanket and answering queries from a script.
#[derive(Debug, Default)]
pub struct MockProxy {
    pub applied: RefCell<Vec<AppliedBlanket>>,
    pub set_result: Cell<Option<i32>>,
    pub query_result: Cell<Option<Result<(AuthenticationLevel, ImpersonationLevel), i32>>>,
}

impl MockProxy {
    pub fn failing_set(hr: i32) -> Self {
        let proxy = Self::default();
        proxy.set_result.set(Some(hr));
        proxy
    }

    pub fn answering(result: Result<(AuthenticationLevel, ImpersonationLevel), i32>) -> Self {
        let proxy = Self::default();
        proxy.query_result.set(Some(result));
        proxy
    }

    pub fn applied(&self) -> Vec<AppliedBlanket> {
        self.applied.borrow().clone()
    }
}

impl ProxySecurity for MockProxy {
    fn set_blanket(&self, blanket: &ProxyBlanket<'_>) -> Result<(), i32> {
        self.applied.borrow_mut().push(AppliedBlanket {
            authentication_level: blanket.authentication_level,
            impersonation_level: blanket.impersonation_level,
            identity: blanket.identity.map(AppliedIdentity::capture),
        });
        self.set_result.get().map_or(Ok(()), Err)
    }

    fn query_blanket(&self) -> Result<(AuthenticationLevel, ImpersonationLevel), i32> {
        self.query_result
            .get()
            .unwrap_or(Ok((AuthenticationLevel::Default, ImpersonationLevel::Default)))
    }
}

/// Counters shared between a token source and the tokens it hands out.
#[derive(Debug, Default)]
pub struct TokenCounters {
    pub opened: Cell<u32>,
    pub released: Cell<u32>,
    pub checks: Cell<u32>,
    pub buffer_sizes: RefCell<Vec<u32>>,
    pub desired: RefCell<Vec<AccessMask>>,
}

/// Token source scripted with the outcome of every step.
#[derive(Debug)]
pub struct MockTokenSource {
    pub counters: Rc<TokenCounters>,
    open_error: Option<u32>,
    statuses: RefCell<VecDeque<AccessCheckStatus>>,
    level: Result<i32, u32>,
}

impl MockTokenSource {
    fn scripted(
        open_error: Option<u32>,
        statuses: VecDeque<AccessCheckStatus>,
        level: Result<i32, u32>,
    ) -> Self {
        Self {
            counters: Rc::default(),
            open_error,
            statuses: RefCell::new(statuses),
            level,
        }
    }

    pub fn with_statuses(statuses: impl IntoIterator<Item = AccessCheckStatus>) -> Self {
        Self::scripted(None, statuses.into_iter().collect(), Ok(0))
    }

    pub fn failing_open(code: u32) -> Self {
        Self::scripted(Some(code), VecDeque::new(), Ok(0))
    }

    pub fn with_level(level: Result<i32, u32>) -> Self {
        Self::scripted(None, VecDeque::new(), level)
    }
}

impl ThreadTokenSource for MockTokenSource {
    type Token = MockToken;

    fn open_thread_token(&self) -> Result<MockToken, u32> {
        if let Some(code) = self.open_error {
            return Err(code);
        }
        self.counters.opened.set(self.counters.opened.get() + 1);
        Ok(MockToken {
            counters: Rc::clone(&self.counters),
            statuses: self.statuses.take(),
            level: self.level,
        })
    }
}

/// Descriptor stand-in; the mock token never looks at it.
#[derive(Debug)]
pub struct MockDescriptor;

#[derive(Debug)]
pub struct MockToken {
    counters: Rc<TokenCounters>,
    statuses: VecDeque<AccessCheckStatus>,
    level: Result<i32, u32>,
}

impl AccessToken for MockToken {
    type Descriptor = MockDescriptor;

    fn access_check(
        &self,
        _descriptor: &MockDescriptor,
        desired: AccessMask,
        _mapping: &GenericMapping,
        privileges: &mut PrivilegeBuffer,
    ) -> AccessCheckStatus {
        let counters = &self.counters;
        counters.checks.set(counters.checks.get() + 1);
        counters.buffer_sizes.borrow_mut().push(privileges.byte_len());
        counters.desired.borrow_mut().push(desired);
        let index = counters.checks.get() as usize - 1;
        self.statuses
            .get(index)
            .copied()
            .unwrap_or(AccessCheckStatus::Failed(1))
    }

    fn impersonation_level(&self) -> Result<i32, u32> {
        self.level
    }
}

impl Drop for MockToken {
    fn drop(&mut self) {
        self.counters.released.set(self.counters.released.get() + 1);
    }
}
