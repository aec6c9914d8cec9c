//! Load configuration.
//!
//! [`LoadOptions`] carries the host-facing knobs (the frame limit) plus the
//! decoder thread count. The scaling policy is fixed and exposed only as
//! constants.
//!
//! # Example
//!
//! ```no_run
//! use vidframes::LoadOptions;
//!
//! // Iterate at most 25 frames.
//! let options = LoadOptions::new().with_limit(25);
//! assert_eq!(options.limit(), Some(25));
//!
//! // The same, expressed the way a pipeline host passes its inputs.
//! let options = LoadOptions::from_host_inputs(true, 25);
//! assert_eq!(options.limit(), Some(25));
//! ```

use ffmpeg_next::software::scaling::Flags as ScalingFlags;

/// Default frame limit shown to hosts when the limit toggle is enabled.
pub const DEFAULT_LIMIT: u64 = 10;

/// Scaler options passed to the demuxer when the container is opened.
pub const SWS_FLAGS: &str = "lanczos+accurate_rnd+full_chroma_int+full_chroma_inp+bitexact";

/// The scaler flags used for the BGR conversion, matching [`SWS_FLAGS`].
pub fn scaling_flags() -> ScalingFlags {
    ScalingFlags::LANCZOS
        | ScalingFlags::ACCURATE_RND
        | ScalingFlags::FULL_CHR_H_INT
        | ScalingFlags::FULL_CHR_H_INP
        | ScalingFlags::BITEXACT
}

/// Options for [`load_video`](crate::load_video).
///
/// A default-constructed value iterates every frame and lets FFmpeg choose
/// the decoder thread count.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadOptions {
    use_limit: bool,
    limit: u64,
    decode_threads: usize,
}

impl Default for LoadOptions {
    fn default() -> Self {
        Self::new()
    }
}

impl LoadOptions {
    /// Create options with no frame limit.
    pub fn new() -> Self {
        Self {
            use_limit: false,
            limit: DEFAULT_LIMIT,
            decode_threads: 0,
        }
    }

    /// Build options from the two host inputs: the "use limit" toggle and
    /// the limit value. The limit is ignored when the toggle is off.
    pub fn from_host_inputs(use_limit: bool, limit: u64) -> Self {
        let options = Self::new();
        if use_limit {
            options.with_limit(limit)
        } else {
            options
        }
    }

    /// Cap the number of frames iterated. Clamped to a minimum of 1.
    #[must_use]
    pub fn with_limit(mut self, limit: u64) -> Self {
        self.use_limit = true;
        self.limit = limit.max(1);
        self
    }

    /// Remove any frame limit.
    #[must_use]
    pub fn without_limit(mut self) -> Self {
        self.use_limit = false;
        self
    }

    /// Number of frame-decoding threads. `0` lets FFmpeg decide.
    #[must_use]
    pub fn with_decode_threads(mut self, threads: usize) -> Self {
        self.decode_threads = threads;
        self
    }

    /// The configured frame limit, if the limit is enabled.
    pub fn limit(&self) -> Option<u64> {
        self.use_limit.then_some(self.limit)
    }

    pub(crate) fn decode_threads(&self) -> usize {
        self.decode_threads
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn limit_disabled_by_default() {
        assert_eq!(LoadOptions::default().limit(), None);
    }

    #[test]
    fn host_inputs_ignore_limit_when_toggle_off() {
        assert_eq!(LoadOptions::from_host_inputs(false, 3).limit(), None);
        assert_eq!(LoadOptions::from_host_inputs(true, 3).limit(), Some(3));
    }

    #[test]
    fn zero_limit_clamps_to_one() {
        assert_eq!(LoadOptions::new().with_limit(0).limit(), Some(1));
    }

    #[test]
    fn without_limit_clears_toggle() {
        let options = LoadOptions::new().with_limit(4).without_limit();
        assert_eq!(options.limit(), None);
    }
}
