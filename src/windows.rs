//! Windows implementations of the platform seams.
mod codepage;
mod process;
mod proxy;
mod token;

use windows_sys::Win32::System::Diagnostics::Debug::VER_PLATFORM_WIN32_NT;
use windows_sys::Win32::System::SystemInformation::{GetVersionExW, OSVERSIONINFOW};

pub(crate) use codepage::encode_ansi_char;
pub use process::{ComProcess, initialize_security};
pub use proxy::ComProxy;
pub use token::{
    CurrentThread, SecurityDescriptor, ThreadToken, check_access, current_impersonation_level,
};

/// Returns `true` when running on an NT-family system.
///
/// A failing version query is treated as NT, since every host Rust supports
/// is. Probes written for Windows 9x read the same failure as non-NT.
pub(crate) fn is_nt_platform() -> bool {
    #[allow(
        clippy::cast_possible_truncation,
        reason = "the structure is a few hundred bytes"
    )]
    let mut info = OSVERSIONINFOW {
        dwOSVersionInfoSize: size_of::<OSVERSIONINFOW>() as u32,
        ..OSVERSIONINFOW::default()
    };
    // SAFETY: `info` is a properly sized and initialized OSVERSIONINFOW.
    let ok = unsafe { GetVersionExW(&raw mut info) };
    ok == 0 || info.dwPlatformId == VER_PLATFORM_WIN32_NT
}
