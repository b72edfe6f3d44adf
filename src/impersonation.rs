use tracing::debug;

use crate::codes::{ERROR_NO_IMPERSONATION_TOKEN, ERROR_NO_TOKEN};
use crate::levels::SecurityImpersonationLevel;
use crate::platform::{AccessToken, ThreadTokenSource};
use crate::ImpersonationLevel;

/// Impersonation level the calling thread currently runs at.
///
/// A thread without an impersonation token runs under its own primary
/// identity and is reported as [`ImpersonationLevel::Delegate`]. Any state
/// that cannot be determined is reported as [`ImpersonationLevel::Anonymous`].
#[must_use]
pub fn current_impersonation_level_with<S: ThreadTokenSource>(source: &S) -> ImpersonationLevel {
    match source.open_thread_token() {
        Ok(token) => match token.impersonation_level() {
            Ok(raw) => SecurityImpersonationLevel::try_from(raw)
                .map_or(ImpersonationLevel::Anonymous, ImpersonationLevel::from),
            Err(code) => {
                debug!(code, "cannot read the token impersonation level");
                ImpersonationLevel::Anonymous
            }
        },
        Err(ERROR_NO_IMPERSONATION_TOKEN | ERROR_NO_TOKEN) => ImpersonationLevel::Delegate,
        Err(code) => {
            debug!(code, "cannot open the thread token");
            ImpersonationLevel::Anonymous
        }
    }
}
