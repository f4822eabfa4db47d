//! Build metadata embedded by `build.rs`

pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Bumped by `build.rs` on every compile; 0 when built without it
pub const BUILD_NUMBER: u64 = match option_env!("FLAVOURSVERSE_BUILD_NUMBER") {
    Some(raw) => digits_or_zero(raw),
    None => 0,
};

/// RFC 3339 compile time
pub const BUILD_TIMESTAMP: &str = match option_env!("FLAVOURSVERSE_BUILD_TIMESTAMP") {
    Some(raw) => raw,
    None => "unknown",
};

// str::parse is not const
const fn digits_or_zero(raw: &str) -> u64 {
    let bytes = raw.as_bytes();
    let mut value: u64 = 0;
    let mut i = 0;
    while i < bytes.len() {
        if !bytes[i].is_ascii_digit() {
            return 0;
        }
        value = value * 10 + (bytes[i] - b'0') as u64;
        i += 1;
    }
    value
}

/// `1.0.0 (build 42)`
pub fn version_line() -> String {
    format!("{} (build {})", VERSION, BUILD_NUMBER)
}

/// Startup banner, written to stderr so stdout stays free for MCP
pub fn print_startup_banner() {
    eprintln!("-----------------------------------------------");
    eprintln!("  FlavoursVerse {}", version_line());
    eprintln!("  Compiled {}", BUILD_TIMESTAMP);
    eprintln!("-----------------------------------------------");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_number_digits() {
        assert_eq!(digits_or_zero("42"), 42);
        assert_eq!(digits_or_zero(""), 0);
        assert_eq!(digits_or_zero("4x"), 0);
    }

    #[test]
    fn test_version_line() {
        assert!(version_line().starts_with(VERSION));
        assert!(version_line().ends_with(&format!("(build {})", BUILD_NUMBER)));
    }
}
