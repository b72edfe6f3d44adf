// Windows-only integration test against the calling thread and the real runtime.
#![cfg(windows)]
#![allow(clippy::unwrap_used, reason = "Unwrap is not an issue in tests")]

use win_com_security::{
    CurrentThread, ImpersonationLevel, PlatformFamily, ThreadTokenSource,
    current_impersonation_level,
};
use win_com_security::codes::{ERROR_NO_IMPERSONATION_TOKEN, ERROR_NO_TOKEN};

#[test]
fn test_thread_is_not_impersonating() {
    let code = CurrentThread.open_thread_token().unwrap_err();
    assert!(
        code == ERROR_NO_TOKEN || code == ERROR_NO_IMPERSONATION_TOKEN,
        "unexpected error {code}"
    );
    assert_eq!(current_impersonation_level(), ImpersonationLevel::Delegate);
}

#[test]
fn host_is_nt_family() {
    assert_eq!(PlatformFamily::current(), PlatformFamily::Modern);
    assert!(!PlatformFamily::current().is_legacy());
}
