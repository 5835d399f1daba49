//! File-naming conventions for exported keys and processed payloads.

/// Suffix appended to encrypted payload file names.
pub const ENCRYPTED_SUFFIX: &str = ".encrypted";

/// File name for an exported key: `{timestamp}.{keyName}.json`.
pub fn key_file_name(timestamp_millis: u64, key_name: &str) -> String {
    format!("{timestamp_millis}.{key_name}.json")
}

/// File name for an encrypted payload.
pub fn encrypted_file_name(name: &str) -> String {
    format!("{name}{ENCRYPTED_SUFFIX}")
}

/// Strip one trailing [`ENCRYPTED_SUFFIX`] from a file name, if present.
pub fn original_file_name(name: &str) -> &str {
    name.strip_suffix(ENCRYPTED_SUFFIX).unwrap_or(name)
}
