//! Stack growth for recursive frame-state walks.
//!
//! Building frame descriptors recurses once per inlining level. Chains are
//! bounded by the configured inlining depth, but each level also resolves
//! every slot of its frame, so a pathological chain can still exhaust a
//! small worker-thread stack.
//!
//! # Platform Support
//!
//! - **Native targets**: `stacker` grows the stack on demand.
//! - **WASM targets**: passthrough.
//!
//! # Configuration
//!
//! - **Red zone**: 64KB. Less than this remaining triggers a growth.
//! - **Growth size**: 1MB per growth.

/// Minimum stack space to keep available.
const RED_ZONE: usize = 64 * 1024;

/// Stack space allocated per growth.
const STACK_PER_RECURSION: usize = 1024 * 1024;

/// Run `f`, first growing the stack if less than the red zone remains.
///
/// Wrap each recursive step:
///
/// ```text
/// fn compute_frame(&mut self, id: FrameStateId) -> DebugInfoResult<FrameDescriptor> {
///     ensure_sufficient_stack(|| self.compute_frame_for_state(id))
/// }
/// ```
#[inline]
#[cfg(not(target_arch = "wasm32"))]
pub fn ensure_sufficient_stack<R>(f: impl FnOnce() -> R) -> R {
    stacker::maybe_grow(RED_ZONE, STACK_PER_RECURSION, f)
}

/// WASM manages its own stack; call `f` directly.
#[inline]
#[cfg(target_arch = "wasm32")]
pub fn ensure_sufficient_stack<R>(f: impl FnOnce() -> R) -> R {
    f()
}

#[cfg(test)]
mod tests {
    use super::ensure_sufficient_stack;

    /// Stand-in for an outer-frame chain: each level holds a few slots.
    fn chain_depth(levels: u32, slots: [u64; 8]) -> u64 {
        ensure_sufficient_stack(|| {
            if levels == 0 {
                slots.iter().sum()
            } else {
                chain_depth(levels - 1, slots) + 1
            }
        })
    }

    #[test]
    fn shallow_chain() {
        assert_eq!(chain_depth(3, [0; 8]), 3);
    }

    #[test]
    fn chain_far_deeper_than_the_inlining_limit() {
        assert_eq!(chain_depth(50_000, [1; 8]), 50_008);
    }

    #[test]
    fn passes_results_through() {
        let result: Result<u8, String> = ensure_sufficient_stack(|| Err("too deep".to_owned()));
        assert_eq!(result, Err("too deep".to_owned()));
    }
}
