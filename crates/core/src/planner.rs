//! Segment planning for multi-segment generation runs.
//!
//! A run is made of one base segment followed by extensions. The base
//! segment covers [`BASE_SEGMENT_SECS`]; each extension adds
//! [`EXTENSION_SEGMENT_SECS`]. When a run continues a clip that already
//! exists, the base is already covered and every step is an extension.

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

/// Duration covered by the first (base) segment of a fresh run.
pub const BASE_SEGMENT_SECS: i64 = 8;

/// Duration added by every extension segment.
pub const EXTENSION_SEGMENT_SECS: i64 = 7;

// ---------------------------------------------------------------------------
// Plan
// ---------------------------------------------------------------------------

/// Number and kind of generation calls required for a target duration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SegmentPlan {
    /// Total generation calls, always at least 1.
    pub total_steps: u32,
    /// Whether step 1 consumes an existing continuation token.
    pub is_first_step_extension: bool,
}

impl SegmentPlan {
    /// Number of extension calls in the plan.
    pub fn extension_count(&self) -> u32 {
        if self.is_first_step_extension {
            self.total_steps
        } else {
            self.total_steps - 1
        }
    }

    /// Whether the 1-based `step` is an extension call.
    pub fn is_extension_step(&self, step: u32) -> bool {
        step > 1 || self.is_first_step_extension
    }

    /// Duration newly generated by this plan, in seconds.
    ///
    /// For extension runs this excludes the pre-existing clip.
    pub fn generated_duration_secs(&self) -> i64 {
        let base = if self.is_first_step_extension {
            0
        } else {
            BASE_SEGMENT_SECS
        };
        base + EXTENSION_SEGMENT_SECS * i64::from(self.extension_count())
    }
}

/// Compute the generation plan for `target_duration_secs`.
///
/// - Fresh run: `1 + max(0, ceil((d - 8) / 7))` steps, first step is a base call.
/// - Extending an existing clip: `max(1, ceil((d - 8) / 7))` steps, all extensions.
///
/// Durations at or below the base length (including negative values) clamp
/// to a single step.
pub fn plan(target_duration_secs: i64, is_extension_of_existing: bool) -> SegmentPlan {
    let extensions = extensions_needed(target_duration_secs);

    let total_steps = if is_extension_of_existing {
        extensions.max(1)
    } else {
        1 + extensions
    };

    SegmentPlan {
        total_steps,
        is_first_step_extension: is_extension_of_existing,
    }
}

/// `ceil((d - base) / extension)`, floored at zero.
fn extensions_needed(target_duration_secs: i64) -> u32 {
    let remaining = target_duration_secs.saturating_sub(BASE_SEGMENT_SECS);
    if remaining <= 0 {
        return 0;
    }
    let count = (remaining - 1) / EXTENSION_SEGMENT_SECS + 1;
    u32::try_from(count).unwrap_or(u32::MAX - 1)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
