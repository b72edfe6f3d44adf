// Access checks and impersonation reporting against scripted tokens.
#![allow(clippy::unwrap_used, reason = "Unwrap is not an issue in tests")]

mod common;

use common::{MockDescriptor, MockTokenSource};
use win_com_security::codes::{
    ERROR_ACCESS_DENIED, ERROR_CANT_OPEN_ANONYMOUS, ERROR_NO_IMPERSONATION_TOKEN, ERROR_NO_TOKEN,
};
use win_com_security::{
    AccessCheckStatus, AccessMask, Error, GenericMapping, ImpersonationLevel, check_access_with,
    current_impersonation_level_with,
};

const MAPPING: GenericMapping = GenericMapping {
    read: AccessMask::from_bits(0x0001),
    write: AccessMask::from_bits(0x0002),
    execute: AccessMask::from_bits(0x0004),
    all: AccessMask::from_bits(0x000F),
};

#[test]
fn granted_access_is_returned() {
    let source = MockTokenSource::with_statuses([AccessCheckStatus::Granted(
        AccessMask::from_bits(0x0001),
    )]);
    let result = check_access_with(
        &source,
        &MockDescriptor,
        AccessMask::GENERIC_READ,
        &MAPPING,
    )
    .unwrap();

    assert_eq!(result.granted_access(), AccessMask::from_bits(0x0001));
    assert_eq!(
        *source.counters.desired.borrow(),
        [AccessMask::from_bits(0x0001)],
        "generic rights are mapped before the check"
    );
    assert_eq!(source.counters.opened.get(), 1);
    assert_eq!(source.counters.released.get(), 1);
}

#[test]
fn denial_is_access_denied() {
    let source = MockTokenSource::with_statuses([AccessCheckStatus::Denied]);
    assert_eq!(
        check_access_with(&source, &MockDescriptor, AccessMask::GENERIC_ALL, &MAPPING),
        Err(Error::AccessDenied)
    );
    assert_eq!(source.counters.released.get(), 1);
}

#[test]
fn small_buffer_is_retried_once() {
    let source = MockTokenSource::with_statuses([
        AccessCheckStatus::BufferTooSmall { required: 20 },
        AccessCheckStatus::Granted(AccessMask::from_bits(0x0003)),
    ]);
    let result = check_access_with(
        &source,
        &MockDescriptor,
        AccessMask::GENERIC_READ | AccessMask::GENERIC_WRITE,
        &MAPPING,
    )
    .unwrap();

    assert_eq!(result.granted_access(), AccessMask::from_bits(0x0003));
    assert_eq!(*source.counters.buffer_sizes.borrow(), [0, 20]);
    assert_eq!(source.counters.released.get(), 1);
}

#[test]
fn second_failure_is_not_retried() {
    let source = MockTokenSource::with_statuses([
        AccessCheckStatus::BufferTooSmall { required: 20 },
        AccessCheckStatus::BufferTooSmall { required: 40 },
        AccessCheckStatus::Granted(AccessMask::from_bits(0x0001)),
    ]);
    assert_eq!(
        check_access_with(&source, &MockDescriptor, AccessMask::GENERIC_READ, &MAPPING),
        Err(Error::AccessDenied)
    );
    assert_eq!(source.counters.checks.get(), 2);
    assert_eq!(source.counters.released.get(), 1);
}

#[test]
fn unallocatable_privilege_buffer_is_out_of_memory() {
    let source = MockTokenSource::with_statuses([
        AccessCheckStatus::BufferTooSmall { required: u32::MAX },
        AccessCheckStatus::Granted(AccessMask::from_bits(0x0001)),
    ]);
    assert_eq!(
        check_access_with(&source, &MockDescriptor, AccessMask::GENERIC_READ, &MAPPING),
        Err(Error::OutOfMemory)
    );
    assert_eq!(source.counters.checks.get(), 1, "no retry without a buffer");
    assert_eq!(source.counters.released.get(), 1);
}

#[test]
fn check_failure_is_access_denied() {
    let source = MockTokenSource::with_statuses([AccessCheckStatus::Failed(87)]);
    assert_eq!(
        check_access_with(&source, &MockDescriptor, AccessMask::GENERIC_READ, &MAPPING),
        Err(Error::AccessDenied)
    );
    assert_eq!(source.counters.checks.get(), 1);
    assert_eq!(source.counters.released.get(), 1);
}

#[test]
fn open_failures() {
    let denied = MockTokenSource::failing_open(ERROR_ACCESS_DENIED);
    assert_eq!(
        check_access_with(&denied, &MockDescriptor, AccessMask::GENERIC_READ, &MAPPING),
        Err(Error::AccessDenied)
    );

    let no_token = MockTokenSource::failing_open(ERROR_NO_TOKEN);
    assert_eq!(
        check_access_with(&no_token, &MockDescriptor, AccessMask::GENERIC_READ, &MAPPING),
        Err(Error::Failed(ERROR_NO_TOKEN))
    );
    assert_eq!(no_token.counters.opened.get(), 0);
    assert_eq!(no_token.counters.released.get(), 0);
}

#[test]
fn impersonation_level_of_token() {
    for (raw, expected) in [
        (0, ImpersonationLevel::Anonymous),
        (1, ImpersonationLevel::Identify),
        (2, ImpersonationLevel::Impersonate),
        (3, ImpersonationLevel::Delegate),
    ] {
        let source = MockTokenSource::with_level(Ok(raw));
        assert_eq!(current_impersonation_level_with(&source), expected);
        assert_eq!(source.counters.released.get(), 1);
    }
}

#[test]
fn undeterminable_levels_are_anonymous() {
    for source in [
        MockTokenSource::with_level(Ok(7)),
        MockTokenSource::with_level(Err(ERROR_ACCESS_DENIED)),
        MockTokenSource::failing_open(ERROR_ACCESS_DENIED),
        MockTokenSource::failing_open(ERROR_CANT_OPEN_ANONYMOUS),
    ] {
        assert_eq!(
            current_impersonation_level_with(&source),
            ImpersonationLevel::Anonymous
        );
        assert_eq!(
            source.counters.opened.get(),
            source.counters.released.get(),
            "every opened token is released"
        );
    }
}

#[test]
fn thread_without_token_is_delegate() {
    for code in [ERROR_NO_TOKEN, ERROR_NO_IMPERSONATION_TOKEN] {
        let source = MockTokenSource::failing_open(code);
        assert_eq!(
            current_impersonation_level_with(&source),
            ImpersonationLevel::Delegate
        );
    }
}
