pub mod audit;
pub mod config_file;
pub mod render;
pub mod seed;

use std::io;

use tracing_subscriber::EnvFilter;

/// Installs the stderr log subscriber. `RUST_LOG` overrides the `warn` default.
pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt().with_env_filter(filter).with_writer(io::stderr).compact().init();
}

/// Format a tower fingerprint as `0x` followed by exactly 16 lowercase hex digits.
pub fn format_fingerprint(hash: u64) -> String {
    format!("0x{hash:016x}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fingerprints_are_zero_padded_hex() {
        assert_eq!(format_fingerprint(0xdead_beef), "0x00000000deadbeef");
        assert_eq!(format_fingerprint(u64::MAX), "0xffffffffffffffff");
    }
}
