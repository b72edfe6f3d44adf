use core::ptr;

use windows_sys::Win32::Globalization::{
    CP_ACP, CP_UTF8, GetACP, WC_NO_BEST_FIT_CHARS, WideCharToMultiByte,
};

use crate::identity::MAX_CHAR_BYTES;

/// Encodes `ch` in the active ANSI code page.
///
/// `None` when the code page has no exact mapping for `ch`; best-fit
/// substitutes are refused.
pub(crate) fn encode_ansi_char(ch: char, out: &mut [u8; MAX_CHAR_BYTES]) -> Option<&[u8]> {
    let mut units = [0u16; 2];
    let units = ch.encode_utf16(&mut units);
    let unit_count = i32::try_from(units.len()).ok()?;
    let out_len = i32::try_from(out.len()).ok()?;

    // SAFETY: GetACP has no precondition.
    let utf8 = unsafe { GetACP() } == CP_UTF8;
    let mut used_default = 0;
    // UTF-8 maps everything and rejects both the flag and the out parameter.
    let (flags, used_default_ptr) = if utf8 {
        (0, ptr::null_mut())
    } else {
        (WC_NO_BEST_FIT_CHARS, &raw mut used_default)
    };
    // SAFETY: `units` holds `unit_count` code units, `out` has room for
    // `out_len` bytes and `used_default_ptr` is null or targets a local.
    let written = unsafe {
        WideCharToMultiByte(
            CP_ACP,
            flags,
            units.as_ptr(),
            unit_count,
            out.as_mut_ptr(),
            out_len,
            ptr::null(),
            used_default_ptr,
        )
    };
    if used_default != 0 {
        return None;
    }
    let written = usize::try_from(written).ok().filter(|&n| n > 0)?;
    out.get(..written)
}
