use std::sync::LazyLock;

use nix::sys::utsname::uname;

static MACHINE: LazyLock<String> = LazyLock::new(|| {
    uname()
        .map(|uts| uts.machine().to_string_lossy().into_owned())
        .unwrap_or_else(|_| std::env::consts::ARCH.to_string())
});

/// Returns the machine hardware name reported by `uname(2)` (e.g. `x86_64`).
///
/// The value is read once per process. If the syscall fails the compile-time
/// target architecture is used instead.
pub fn machine() -> &'static str {
    &MACHINE
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_machine() {
        assert!(!machine().is_empty());
        assert!(std::ptr::eq(machine(), machine()));

        #[cfg(target_arch = "x86_64")]
        assert_eq!(machine(), "x86_64");

        #[cfg(target_arch = "aarch64")]
        assert_eq!(machine(), "aarch64");
    }
}
