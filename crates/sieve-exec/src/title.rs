// title.rs — Process name for the command currently running.
//
// Best effort: failures are ignored. The terminal title is set separately
// through `Reporter::title`.

/// Set the process name (as shown by `ps`/`top`) to `title`.
#[cfg(target_os = "linux")]
pub fn set_process_title(title: &str) {
    // PR_SET_NAME keeps at most 15 bytes plus the NUL.
    let bytes: Vec<u8> = title.bytes().filter(|&b| b != 0).take(15).collect();
    let Ok(name) = std::ffi::CString::new(bytes) else {
        return;
    };
    // Safety: PR_SET_NAME reads a NUL-terminated string of at most 16 bytes.
    unsafe {
        libc::prctl(libc::PR_SET_NAME, name.as_ptr() as libc::c_ulong, 0, 0, 0);
    }
}

#[cfg(not(target_os = "linux"))]
pub fn set_process_title(_title: &str) {}
