//! Turns raw message text into a structured command.
//!
//! Arguments are split on whitespace only, so a question cannot contain spaces. There is no
//! quoting convention.

use alloc::vec::Vec;
use core::fmt::{self, Display};

/// Leading token that marks a message as addressed to us.
pub const TRIGGER: &str = "/vote";

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Verb {
    Create,
    Vote,
    Results,
    End,
    Delete,
}

impl Verb {
    fn from_token(token: &str) -> Option<Self> {
        Some(match token {
            "create" => Self::Create,
            "vote" => Self::Vote,
            "results" => Self::Results,
            "end" => Self::End,
            "delete" => Self::Delete,
            _ => return None,
        })
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Create => "create",
            Self::Vote => "vote",
            Self::Results => "results",
            Self::End => "end",
            Self::Delete => "delete",
        }
    }

    /// Usage hint for this verb alone.
    pub const fn usage(self) -> &'static str {
        match self {
            Self::Create => "Usage: /vote create <question> <option> [<option> ...]",
            Self::Vote => "Usage: /vote vote <poll_id> <option_number>",
            Self::Results => "Usage: /vote results <poll_id>",
            Self::End => "Usage: /vote end <poll_id>",
            Self::Delete => "Usage: /vote delete <poll_id>",
        }
    }
}

impl Display for Verb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A well-formed command along with its arguments.
#[derive(Debug, PartialEq, Eq)]
pub enum Command<'txt> {
    Create { question: &'txt str, options: Vec<&'txt str> },
    Vote { poll: &'txt str, choice: &'txt str },
    Results { poll: &'txt str },
    End { poll: &'txt str },
    Delete { poll: &'txt str },
}

impl Command<'_> {
    pub const fn verb(&self) -> Verb {
        match self {
            Self::Create { .. } => Verb::Create,
            Self::Vote { .. } => Verb::Vote,
            Self::Results { .. } => Verb::Results,
            Self::End { .. } => Verb::End,
            Self::Delete { .. } => Verb::Delete,
        }
    }
}

#[derive(Debug, PartialEq, Eq)]
pub enum Malformed<'txt> {
    /// The message does not start with [`TRIGGER`].
    MissingTrigger,
    /// The first token merely starts with [`TRIGGER`], as in `/votes`.
    UnknownTrigger(&'txt str),
    /// Nothing follows the trigger.
    MissingVerb,
    UnknownVerb(&'txt str),
    /// The verb is known but the number of arguments is wrong.
    Arity(Verb),
}

pub fn parse(text: &str) -> Result<Command<'_>, Malformed<'_>> {
    let mut tokens = text.split_whitespace();
    match tokens.next() {
        Some(TRIGGER) => {}
        Some(token) if token.starts_with(TRIGGER) => return Err(Malformed::UnknownTrigger(token)),
        _ => return Err(Malformed::MissingTrigger),
    }

    let token = tokens.next().ok_or(Malformed::MissingVerb)?;
    let verb = Verb::from_token(token).ok_or(Malformed::UnknownVerb(token))?;
    let args: Vec<_> = tokens.collect();

    Ok(match (verb, args.as_slice()) {
        (Verb::Create, [question, options @ ..]) if !options.is_empty() => {
            Command::Create { question: *question, options: options.to_vec() }
        }
        (Verb::Vote, [poll, choice]) => Command::Vote { poll: *poll, choice: *choice },
        (Verb::Results, [poll]) => Command::Results { poll: *poll },
        (Verb::End, [poll]) => Command::End { poll: *poll },
        (Verb::Delete, [poll]) => Command::Delete { poll: *poll },
        _ => return Err(Malformed::Arity(verb)),
    })
}
