//! Builder configuration.

/// Default bound on frame-state chain length.
pub const DEFAULT_MAX_INLINING_DEPTH: usize = 256;

/// Knobs for one [`DebugInfoBuilder`](crate::DebugInfoBuilder).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DebugInfoConfig {
    /// Maximum number of frame states in one chain. Longer chains (or a
    /// chain that loops back on itself) are rejected.
    pub max_inlining_depth: usize,
    /// Run the virtual-object shape check after filling each descriptor.
    ///
    /// On by default in debug builds only.
    pub verify_shapes: bool,
}

impl Default for DebugInfoConfig {
    fn default() -> Self {
        Self {
            max_inlining_depth: DEFAULT_MAX_INLINING_DEPTH,
            verify_shapes: cfg!(debug_assertions),
        }
    }
}

impl DebugInfoConfig {
    #[must_use]
    pub fn with_max_inlining_depth(mut self, depth: usize) -> Self {
        self.max_inlining_depth = depth;
        self
    }

    #[must_use]
    pub fn with_verify_shapes(mut self, verify: bool) -> Self {
        self.verify_shapes = verify;
        self
    }
}
