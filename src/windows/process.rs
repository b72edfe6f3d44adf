use core::ptr;

use windows_sys::Win32::System::Com::CoInitializeSecurity;

use crate::process::{Capabilities, ProcessSecurityPolicy, initialize_security_with};
use crate::{AuthenticationLevel, Error, ImpersonationLevel};

/// The COM runtime of the current process.
#[derive(Debug, Default, Clone, Copy)]
pub struct ComProcess;

impl ProcessSecurityPolicy for ComProcess {
    fn initialize(
        &self,
        authentication_level: AuthenticationLevel,
        impersonation_level: ImpersonationLevel,
        capabilities: Capabilities,
    ) -> Result<(), i32> {
        // SAFETY: every pointer argument is null, asking COM for its defaults.
        let hr = unsafe {
            CoInitializeSecurity(
                ptr::null_mut(),
                -1,
                ptr::null(),
                ptr::null(),
                u32::from(authentication_level),
                u32::from(impersonation_level),
                ptr::null(),
                capabilities.bits(),
                ptr::null(),
            )
        };
        if hr < 0 { Err(hr) } else { Ok(()) }
    }
}

/// Installs process-wide COM security defaults.
///
/// Must run once, after COM initialization and before any interface is
/// marshaled.
///
/// # Errors
/// [`Error::Platform`] with the failing HRESULT (for instance
/// `RPC_E_TOO_LATE`).
#[inline]
pub fn initialize_security(
    authentication_level: AuthenticationLevel,
    impersonation_level: ImpersonationLevel,
) -> Result<(), Error> {
    initialize_security_with(&ComProcess, authentication_level, impersonation_level)
}
