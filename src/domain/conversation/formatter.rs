//! Turn formatter.
//!
//! Rebuilds the full conversation for every call: the model layer keeps no
//! state between requests. Consecutive turns with the same mapped role are
//! coalesced into one newline-joined block because the model rejects two
//! adjacent blocks of the same role.
//!
//! The pending message is always emitted as its own final requester block,
//! even if the coalesced history also ends with a requester block. Since
//! every accepted message persists a reply, a well-formed history ends with
//! a responder block and the output alternates.
//!
//! History length is not trimmed.

use super::blocks::{BlockRole, ContentBlock};
use crate::domain::encounter::{Turn, TurnRole};

/// Maps a stored role to its generation-facing role. System turns have none.
pub fn block_role(role: TurnRole) -> Option<BlockRole> {
    match role {
        TurnRole::Doctor => Some(BlockRole::Requester),
        TurnRole::Patient => Some(BlockRole::Responder),
        TurnRole::System => None,
    }
}

/// Coalesces chronological history into alternating blocks.
///
/// System turns are skipped.
pub fn coalesce(history: &[Turn]) -> Vec<ContentBlock> {
    let mut blocks: Vec<ContentBlock> = Vec::new();
    let mut current: Option<(BlockRole, Vec<&str>)> = None;

    for turn in history {
        let Some(role) = block_role(turn.role()) else {
            continue;
        };
        if let Some((current_role, parts)) = current.as_mut() {
            if *current_role == role {
                parts.push(turn.content());
                continue;
            }
        }
        if let Some((done_role, parts)) = current.take() {
            blocks.push(ContentBlock {
                role: done_role,
                text: parts.join("\n"),
            });
        }
        current = Some((role, vec![turn.content()]));
    }

    if let Some((role, parts)) = current {
        blocks.push(ContentBlock {
            role,
            text: parts.join("\n"),
        });
    }
    blocks
}

/// Formats history plus the pending message into a complete request body.
pub fn format_turns(history: &[Turn], pending: &str) -> Vec<ContentBlock> {
    let mut blocks = coalesce(history);
    blocks.push(ContentBlock::requester(pending));
    blocks
}
