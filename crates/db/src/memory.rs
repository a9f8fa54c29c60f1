use crate::{
    error::{Error, Result},
    Ballots, Poll, PollStore,
};
use alloc::string::String;
use dashmap::{mapref::entry::Entry, DashMap};

/// Process-local store. Each key is guarded by its shard lock for the duration of an operation.
#[derive(Default)]
pub struct MemoryStore {
    polls: DashMap<String, Poll>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.polls.len()
    }

    pub fn is_empty(&self) -> bool {
        self.polls.is_empty()
    }
}

impl PollStore for MemoryStore {
    async fn put(&self, poll: &Poll) -> Result<()> {
        match self.polls.entry(poll.id.clone()) {
            Entry::Occupied(_) => Err(Error::DuplicateKey),
            Entry::Vacant(entry) => {
                entry.insert(poll.clone());
                Ok(())
            }
        }
    }

    async fn get(&self, id: &str) -> Result<Poll> {
        self.polls.get(id).map(|poll| poll.clone()).ok_or(Error::NotFound)
    }

    async fn update_ballots(&self, id: &str, ballots: &Ballots, revision: u32) -> Result<u32> {
        let mut poll = self.polls.get_mut(id).ok_or(Error::NotFound)?;
        if poll.revision != revision {
            return Err(Error::Conflict);
        }
        poll.ballots = ballots.clone();
        poll.revision = poll.revision.wrapping_add(1);
        Ok(poll.revision)
    }

    async fn set_active(&self, id: &str, active: bool) -> Result<()> {
        let mut poll = self.polls.get_mut(id).ok_or(Error::NotFound)?;
        poll.active = active;
        poll.revision = poll.revision.wrapping_add(1);
        Ok(())
    }

    async fn delete(&self, id: &str) -> Result<()> {
        self.polls.remove(id).map(drop).ok_or(Error::NotFound)
    }
}
