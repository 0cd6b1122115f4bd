//! Allocation layer: every request either succeeds or aborts the process.
//!
//! The dictionary never sees an allocation error. Requests that go through
//! a fallible reservation report the failed size and abort; plain boxing
//! relies on the global allocation error handler, which also aborts.

use std::io::Write;

/// Report a failed allocation of `bytes` and abort.
#[cold]
#[inline(never)]
pub fn out_of_memory(bytes: usize) -> ! {
    log::error!("out of memory trying to allocate {bytes} bytes");
    let mut stderr = std::io::stderr();
    let _ = writeln!(stderr, "Out of memory trying to allocate <{bytes}>");
    let _ = stderr.flush();
    std::process::abort();
}

/// Box a single value.
#[inline]
pub fn allocate<T>(value: T) -> Box<T> {
    Box::new(value)
}

/// `count` empty slots, ready to be used as chain heads.
pub fn allocate_zeroed<T: Default>(count: usize) -> Box<[T]> {
    let mut slots: Vec<T> = Vec::new();
    if slots.try_reserve_exact(count).is_err() {
        out_of_memory(count.saturating_mul(core::mem::size_of::<T>()));
    }
    slots.resize_with(count, T::default);
    slots.into_boxed_slice()
}

/// Owned copy of `s`.
pub fn duplicate_str(s: &str) -> Box<str> {
    let mut copy = String::new();
    if copy.try_reserve_exact(s.len()).is_err() {
        out_of_memory(s.len());
    }
    copy.push_str(s);
    copy.into_boxed_str()
}

/// Like [`duplicate_str`], passing an absent string through.
pub fn duplicate_opt_str(s: Option<&str>) -> Option<Box<str>> {
    s.map(duplicate_str)
}
