#![cfg_attr(not(test), no_std)]

extern crate alloc;

pub mod error;

mod memory;
mod postgres;

use core::future::Future;

pub use memory::MemoryStore;
pub use model::{Ballots, Poll};
pub use postgres::Database;
pub use tokio_postgres::Config;

/// Keyed storage over polls. Every operation touches exactly one record and is atomic with
/// respect to other operations on the same key.
pub trait PollStore: Send + Sync {
    /// Inserts a new poll. Fails with [`DuplicateKey`](error::Error::DuplicateKey) if the ID is taken.
    fn put(&self, poll: &Poll) -> impl Future<Output = error::Result<()>> + Send;

    fn get(&self, id: &str) -> impl Future<Output = error::Result<Poll>> + Send;

    /// Replaces the ballots of the poll only if its revision still equals `revision`. Otherwise,
    /// fails with [`Conflict`](error::Error::Conflict) so that the caller may re-read and retry.
    /// Returns the new revision on success.
    fn update_ballots(
        &self,
        id: &str,
        ballots: &Ballots,
        revision: u32,
    ) -> impl Future<Output = error::Result<u32>> + Send;

    fn set_active(&self, id: &str, active: bool) -> impl Future<Output = error::Result<()>> + Send;

    fn delete(&self, id: &str) -> impl Future<Output = error::Result<()>> + Send;
}
