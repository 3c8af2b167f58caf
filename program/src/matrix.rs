use anchor_lang::prelude::*;
use std::collections::VecDeque;

use crate::{errors::LedgerError, ledger::ParticipantLedger, state::UplineChain};

/// Side of a matrix node
#[derive(AnchorSerialize, AnchorDeserialize, Clone, Copy, Debug, PartialEq, Eq)]
pub enum MatrixSide {
    Left,
    Right,
}

/// Where a newcomer lands in the binary matrix
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Placement {
    pub parent: Pubkey,
    pub side: MatrixSide,
}

/// Finds the first open slot in the sponsor's subtree.
///
/// Breadth-first from the sponsor, left before right, so spillover fills the
/// shallowest level first.
///
/// # Errors
/// Returns `ParticipantNotFound` if the sponsor or a linked child has no record.
pub fn find_placement(participants: &ParticipantLedger, sponsor: &Pubkey) -> Result<Placement> {
    let mut queue = VecDeque::from([*sponsor]);
    while let Some(address) = queue.pop_front() {
        let node = participants.require(&address)?;
        match (node.matrix_left, node.matrix_right) {
            (None, _) => {
                return Ok(Placement {
                    parent: address,
                    side: MatrixSide::Left,
                })
            }
            (Some(_), None) => {
                return Ok(Placement {
                    parent: address,
                    side: MatrixSide::Right,
                })
            }
            (Some(left), Some(right)) => {
                queue.push_back(left);
                queue.push_back(right);
            }
        }
    }
    // A finite binary tree always has an open slot
    Err(LedgerError::ParticipantNotFound.into())
}

/// Places an already-inserted participant under `sponsor`'s subtree.
///
/// Links parent and child, then bumps `team_size` for every matrix ancestor.
pub fn place(
    participants: &mut ParticipantLedger,
    newcomer: &Pubkey,
    sponsor: &Pubkey,
) -> Result<Placement> {
    let placement = find_placement(participants, sponsor)?;

    {
        let parent = participants.require_mut(&placement.parent)?;
        match placement.side {
            MatrixSide::Left => parent.matrix_left = Some(*newcomer),
            MatrixSide::Right => parent.matrix_right = Some(*newcomer),
        }
    }
    participants.require_mut(newcomer)?.matrix_parent = Some(placement.parent);

    let mut cursor = Some(placement.parent);
    while let Some(address) = cursor {
        let ancestor = participants.require_mut(&address)?;
        ancestor.team_size = ancestor
            .team_size
            .checked_add(1)
            .ok_or(LedgerError::ArithmeticError)?;
        cursor = ancestor.matrix_parent;
    }

    tracing::debug!(
        participant = %newcomer,
        parent = %placement.parent,
        side = ?placement.side,
        "matrix placement"
    );
    Ok(placement)
}

/// Upline chain for a participant sponsored by `sponsor`.
pub fn upline_chain_for(participants: &ParticipantLedger, sponsor: &Pubkey) -> Result<UplineChain> {
    let sponsor_record = participants.require(sponsor)?;
    Ok(UplineChain::extend_from(*sponsor, &sponsor_record.upline_chain))
}
