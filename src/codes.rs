//! Raw Win32 error codes and HRESULT values the helpers branch on.
//!
//! They are spelled out here so the platform-neutral logic compiles everywhere;
//! on Windows the test module checks them against `windows-sys`.

/// `ERROR_ACCESS_DENIED`
pub const ERROR_ACCESS_DENIED: u32 = 5;
/// `ERROR_INSUFFICIENT_BUFFER`
pub const ERROR_INSUFFICIENT_BUFFER: u32 = 122;
/// `ERROR_NO_TOKEN`
pub const ERROR_NO_TOKEN: u32 = 1008;
/// `ERROR_NO_IMPERSONATION_TOKEN`
pub const ERROR_NO_IMPERSONATION_TOKEN: u32 = 1309;
/// `ERROR_CANT_OPEN_ANONYMOUS`
pub const ERROR_CANT_OPEN_ANONYMOUS: u32 = 1347;

/// `HRESULT_FROM_WIN32(RPC_S_BINDING_HAS_NO_AUTH)`, returned when the peer is
/// a share-level box that does not authenticate at all.
#[allow(clippy::cast_possible_wrap, reason = "HRESULT bit pattern")]
pub const RPC_E_BINDING_HAS_NO_AUTH: i32 = 0x8007_06D2_u32 as i32;

/// `E_INVALIDARG`
#[allow(clippy::cast_possible_wrap, reason = "HRESULT bit pattern")]
pub const E_INVALIDARG: i32 = 0x8007_0057_u32 as i32;
/// `E_OUTOFMEMORY`
#[allow(clippy::cast_possible_wrap, reason = "HRESULT bit pattern")]
pub const E_OUTOFMEMORY: i32 = 0x8007_000E_u32 as i32;
/// `E_UNEXPECTED`
#[allow(clippy::cast_possible_wrap, reason = "HRESULT bit pattern")]
pub const E_UNEXPECTED: i32 = 0x8000_FFFF_u32 as i32;
/// `WBEM_E_FAILED`
#[allow(clippy::cast_possible_wrap, reason = "HRESULT bit pattern")]
pub const WBEM_E_FAILED: i32 = 0x8004_1001_u32 as i32;
/// `WBEM_E_ACCESS_DENIED`
#[allow(clippy::cast_possible_wrap, reason = "HRESULT bit pattern")]
pub const WBEM_E_ACCESS_DENIED: i32 = 0x8004_1003_u32 as i32;
/// `WBEM_E_INVALID_PARAMETER`
#[allow(clippy::cast_possible_wrap, reason = "HRESULT bit pattern")]
pub const WBEM_E_INVALID_PARAMETER: i32 = 0x8004_1008_u32 as i32;
