#![cfg_attr(not(test), no_std)]
extern crate alloc;

pub mod hook;

use alloc::{collections::BTreeMap, string::String, vec::Vec};
use core::num::NonZeroU16;

/// Mapping from each voter to the 1-based index of their chosen option.
pub type Ballots = BTreeMap<String, NonZeroU16>;

/// The persisted unit of state.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Poll {
    /// Opaque primary key generated at creation time.
    pub id: String,
    /// The user who created the poll. Only they may end or delete it.
    pub creator: String,
    /// The conversation in which the poll was created.
    pub channel: String,
    /// Question to be displayed in chat.
    pub question: String,
    /// Possible answers to select from. Voters refer to these by 1-based position.
    pub options: Vec<String>,
    /// At most one ballot per voter.
    pub ballots: Ballots,
    /// Whether ballots are still being accepted. Only ever goes from `true` to `false`.
    pub active: bool,
    /// Bumped on every mutation. Writers compare against this before replacing the ballots.
    pub revision: u32,
}

/// Reasons why a ballot may not be cast.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Rejection {
    /// The poll has already been ended by its creator.
    Inactive,
    /// The voter already has a ballot in this poll.
    AlreadyVoted,
    /// The choice does not refer to any of the options.
    NoSuchOption,
}

impl Poll {
    /// Builds a fresh, active poll without ballots. Returns `None` if there are no options or
    /// too many of them to be addressed by a ballot.
    pub fn new(id: String, creator: String, channel: String, question: String, options: Vec<String>) -> Option<Self> {
        if options.is_empty() || u16::try_from(options.len()).is_err() {
            return None;
        }
        Some(Self { id, creator, channel, question, options, ballots: Ballots::new(), active: true, revision: 0 })
    }

    pub fn is_creator(&self, user: &str) -> bool {
        self.creator == user
    }

    /// Records the ballot of `voter`. Re-voting is rejected rather than overwritten.
    pub fn cast(&mut self, voter: &str, choice: NonZeroU16) -> Result<(), Rejection> {
        if !self.active {
            return Err(Rejection::Inactive);
        }

        if usize::from(choice.get()) > self.options.len() {
            return Err(Rejection::NoSuchOption);
        }

        if self.ballots.contains_key(voter) {
            return Err(Rejection::AlreadyVoted);
        }

        self.ballots.insert(voter.into(), choice);
        Ok(())
    }

    /// Counts the ballots per option. The result follows the order of `options`.
    pub fn tally(&self) -> Vec<u32> {
        let mut counts = alloc::vec![0; self.options.len()];
        for choice in self.ballots.values() {
            // Out-of-range ballots cannot be cast, but stored records are not ours to trust.
            if let Some(count) = counts.get_mut(usize::from(choice.get()) - 1) {
                *count += 1;
            }
        }
        counts
    }
}
