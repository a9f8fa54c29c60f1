use crate::command::Verb;
use core::fmt::{self, Display};

#[derive(Debug, PartialEq, Eq)]
pub enum Error {
    /// Known verb with the wrong arguments.
    Usage(Verb),
    UnknownCommand,
    UnknownPoll,
    InvalidOption,
    /// The poll no longer accepts ballots.
    Closed,
    AlreadyVoted,
    /// Only the creator may end or delete a poll.
    Forbidden,
    /// Gave up after repeatedly losing the race against other voters.
    Contention,
    CreateFailed,
    FetchFailed,
    VoteFailed,
    EndFailed,
    DeleteFailed,
}

impl Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Usage(verb) => verb.usage(),
            Self::UnknownCommand => "Usage: /vote [create|vote|results|end|delete] [arguments]",
            Self::UnknownPoll => "Poll not found. It may have already been deleted.",
            Self::InvalidOption => "Invalid option number. Check the poll for the list of options.",
            Self::Closed => "This poll has already ended.",
            Self::AlreadyVoted => "You have already voted in this poll.",
            Self::Forbidden => "Only the creator of this poll may do that.",
            Self::Contention => "Too many votes are coming in at once. Please try again.",
            Self::CreateFailed => "Oops! We failed to create the poll.",
            Self::FetchFailed => "Oops! We failed to retrieve the poll.",
            Self::VoteFailed => "Oops! We failed to record your vote.",
            Self::EndFailed => "Oops! We failed to end the poll.",
            Self::DeleteFailed => "Oops! We failed to delete the poll.",
        })
    }
}

pub type Result<T> = core::result::Result<T, Error>;
