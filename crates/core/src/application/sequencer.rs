// Code Sequencer
//
// Pure functions over the last issued code of a lane. Reading and advancing the
// lane counter atomically is the store's job (see IssuanceTransaction).

use crate::domain::CodeNumber;

/// What an entry point does when its lane has never issued a code
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EmptyLane {
    /// Treat the lane as fresh and hand out code 1
    StartAtOne,
    /// The lane must have been seeded; refuse to allocate
    Reject,
}

/// Next code after `last`: 1 for a fresh lane, otherwise +1 wrapping 999 -> 1
pub fn next_code(last: Option<CodeNumber>) -> CodeNumber {
    last.map_or(CodeNumber::MIN, CodeNumber::wrapping_next)
}

/// Apply the entry point's empty-lane policy, `None` means the allocation is refused
pub fn allocate(last: Option<CodeNumber>, empty_lane: EmptyLane) -> Option<CodeNumber> {
    match (last, empty_lane) {
        (None, EmptyLane::Reject) => None,
        (last, _) => Some(next_code(last)),
    }
}
