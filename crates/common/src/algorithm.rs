//! Algorithm tags for the selectable engine variants.

use std::fmt;

/// Identifies one concrete engine implementation.
///
/// The set is closed: adding an algorithm means extending this enum and the
/// registry match, not registering constructors at runtime.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Algorithm {
    /// RSA-OAEP with SHA-256 and a 2048-bit modulus.
    RsaOaep,
    /// AES-256-GCM with a per-key initialization vector.
    AesGcm,
}

impl Algorithm {
    /// All selectable algorithms, in presentation order.
    pub const ALL: [Algorithm; 2] = [Algorithm::RsaOaep, Algorithm::AesGcm];

    /// Stable name used for algorithm selection and display.
    pub fn name(self) -> &'static str {
        match self {
            Algorithm::RsaOaep => "RSA-OAEP",
            Algorithm::AesGcm => "AES-GCM",
        }
    }

    /// Look an algorithm up by its stable name.
    pub fn from_name(name: &str) -> Option<Algorithm> {
        Algorithm::ALL.into_iter().find(|a| a.name() == name)
    }

    /// Whether this algorithm binds associated data into its operations.
    ///
    /// Hosts use this to enable or disable their associated-data input.
    pub fn supports_associated_data(self) -> bool {
        matches!(self, Algorithm::AesGcm)
    }
}

impl fmt::Display for Algorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn names_are_stable() {
        let names: Vec<&str> = Algorithm::ALL.iter().map(|a| a.name()).collect();
        assert_eq!(names, ["RSA-OAEP", "AES-GCM"]);
    }

    #[test]
    fn from_name_round_trip() {
        for algorithm in Algorithm::ALL {
            assert_eq!(Algorithm::from_name(algorithm.name()), Some(algorithm));
        }
        assert_eq!(Algorithm::from_name("3DES"), None);
    }

    #[test]
    fn associated_data_support() {
        assert!(Algorithm::AesGcm.supports_associated_data());
        assert!(!Algorithm::RsaOaep.supports_associated_data());
    }
}
