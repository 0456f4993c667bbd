//! Version-stamped values derived from mapping state.

/// Wrapper for data computed from a particular [`MappingState`] version.
///
/// The `source_version` field stores `MappingState::version()` at the time
/// the data was computed. Applying data whose version no longer matches is
/// refused, so a slow suggestion fetch cannot overwrite edits made since.
///
/// [`MappingState`]: crate::MappingState
#[derive(Debug, Clone, PartialEq)]
pub struct Versioned<T> {
    /// The computed data
    pub data: T,
    /// Version of the mapping state when this was computed
    pub source_version: u64,
}

impl<T> Versioned<T> {
    /// Stamp data with the version it was computed from.
    pub fn new(data: T, source_version: u64) -> Self {
        Self {
            data,
            source_version,
        }
    }

    /// Returns `true` if the state has changed since this was computed.
    #[inline]
    pub fn is_stale(&self, current_version: u64) -> bool {
        self.source_version != current_version
    }

    /// Check if this value is current.
    #[inline]
    pub fn is_current(&self, current_version: u64) -> bool {
        self.source_version == current_version
    }

    /// Transform the data, keeping the version stamp.
    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Versioned<U> {
        Versioned {
            data: f(self.data),
            source_version: self.source_version,
        }
    }
}
