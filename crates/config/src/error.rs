//! Configuration errors.

use figment::providers::{Format, Toml};
use std::{collections::HashSet, error::Error, fmt};

/// The message shown when the configuration could not be extracted.
pub const FAILED_TO_EXTRACT_CONFIG_MSG: &str = "failed to extract connect config:";

/// Represents a failed attempt to extract [`ConnectConfig`](crate::ConnectConfig) from a
/// `Figment`.
#[derive(Clone, Debug, PartialEq)]
pub struct ExtractConfigError {
    /// error thrown when extracting the config
    pub(crate) error: figment::Error,
}

impl ExtractConfigError {
    /// Wraps the figment error
    pub fn new(error: figment::Error) -> Self {
        Self { error }
    }
}

impl fmt::Display for ExtractConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut unique_errors = Vec::with_capacity(self.error.count());
        let mut unique = HashSet::with_capacity(self.error.count());
        for err in self.error.clone() {
            let from_toml = err
                .metadata
                .as_ref()
                .map(|meta| meta.name.contains(Toml::NAME))
                .unwrap_or_default();
            let err =
                if from_toml { format!("connect.toml error: {err}") } else { err.to_string() };
            if unique.insert(err.clone()) {
                unique_errors.push(err);
            }
        }
        writeln!(f, "{FAILED_TO_EXTRACT_CONFIG_MSG}")?;
        for err in unique_errors {
            writeln!(f, "{err}")?;
        }
        Ok(())
    }
}

impl Error for ExtractConfigError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        Error::source(&self.error)
    }
}
