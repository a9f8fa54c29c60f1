mod error;

pub use error::{Error, Result};

use crate::command::{self, Command, Malformed, Verb};
use alloc::{
    format,
    string::{String, ToString},
    vec::Vec,
};
use core::{future::Future, num::NonZeroU16, time::Duration};
use db::{error::Error as DbError, Poll, PollStore};
use model::{hook::Post, Rejection};

/// How many times an operation is re-attempted when it loses a race on the same poll.
const MAX_ATTEMPTS: usize = 8;

/// Upper bound on a single store call unless configured otherwise.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(5);

/// Origin of a command.
#[derive(Clone, Copy, Debug)]
pub struct Context<'txt> {
    /// The user who sent the command.
    pub user: &'txt str,
    /// The conversation in which the command was sent.
    pub channel: &'txt str,
    /// The triggering message, under which the reply is threaded.
    pub root: &'txt str,
}

/// Routes commands to their handlers. Apart from the store handle, no state is kept across calls.
pub struct Bot<S> {
    store: S,
    timeout: Duration,
}

fn generate_id() -> String {
    uuid::Uuid::new_v4().simple().to_string()
}

fn render_created(poll: &Poll) -> String {
    let options: String =
        poll.options.iter().zip(1..).map(|(option, index)| format!("{index}. {option}\n")).collect();
    format!("Poll created! ID: {}\nQuestion: {}\nOptions:\n{options}", poll.id, poll.question)
}

fn render_results(poll: &Poll) -> String {
    let counts: String = poll
        .options
        .iter()
        .zip(poll.tally())
        .zip(1..)
        .map(|((option, count), index)| format!("{index}. {option}: {count} votes\n"))
        .collect();
    format!("Results:\nQuestion: {}\n{counts}", poll.question)
}

impl<S: PollStore> Bot<S> {
    pub fn new(store: S, timeout: Duration) -> Self {
        Self { store, timeout }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn into_store(self) -> S {
        self.store
    }

    /// Responds to a posted message. Returns `None` if the message is not addressed to us.
    pub async fn on_post(&self, post: &Post) -> Option<String> {
        let parsed = command::parse(&post.text);
        if let Err(Malformed::MissingTrigger) = parsed {
            return None;
        }

        let ctx = Context { user: &post.user_id, channel: &post.channel_id, root: &post.post_id };
        Some(self.dispatch(&ctx, parsed).await)
    }

    /// Invokes the handler matching the parsed command and renders its outcome as a reply.
    pub async fn dispatch(
        &self,
        ctx: &Context<'_>,
        parsed: core::result::Result<Command<'_>, Malformed<'_>>,
    ) -> String {
        if let Ok(command) = &parsed {
            log::debug!(
                "received `{}` from user {} in channel {} (post {})",
                command.verb(),
                ctx.user,
                ctx.channel,
                ctx.root
            );
        }

        let result = match parsed {
            Ok(Command::Create { question, options }) => self.on_create(ctx, question, &options).await,
            Ok(Command::Vote { poll, choice }) => self.on_vote(ctx, poll, choice).await,
            Ok(Command::Results { poll }) => self.on_results(poll).await,
            Ok(Command::End { poll }) => self.on_end(ctx, poll).await,
            Ok(Command::Delete { poll }) => self.on_delete(ctx, poll).await,
            Err(Malformed::Arity(verb)) => Err(Error::Usage(verb)),
            Err(_) => Err(Error::UnknownCommand),
        };

        match result {
            Ok(text) => text,
            Err(err) => err.to_string(),
        }
    }

    /// Bounds the latency of a store call. An elapsed deadline counts as an unavailable store.
    async fn call<T>(&self, future: impl Future<Output = db::error::Result<T>>) -> db::error::Result<T> {
        match tokio::time::timeout(self.timeout, future).await {
            Ok(result) => result,
            Err(_) => {
                log::error!("store call did not complete within {:?}", self.timeout);
                Err(DbError::Unavailable)
            }
        }
    }

    async fn fetch(&self, id: &str) -> Result<Poll> {
        self.call(self.store.get(id)).await.map_err(|err| match err {
            DbError::NotFound => Error::UnknownPoll,
            err => {
                log::error!("failed to fetch poll {id}: {err}");
                Error::FetchFailed
            }
        })
    }

    async fn on_create(&self, ctx: &Context<'_>, question: &str, options: &[&str]) -> Result<String> {
        let options: Vec<String> = options.iter().map(|&option| option.into()).collect();
        for _ in 0..MAX_ATTEMPTS {
            let poll = Poll::new(generate_id(), ctx.user.into(), ctx.channel.into(), question.into(), options.clone())
                .ok_or(Error::Usage(Verb::Create))?;
            match self.call(self.store.put(&poll)).await {
                Ok(()) => {
                    log::info!("user {} created poll {} in channel {}", ctx.user, poll.id, ctx.channel);
                    return Ok(render_created(&poll));
                }
                Err(DbError::DuplicateKey) => log::warn!("generated poll ID {} is already taken", poll.id),
                Err(err) => {
                    log::error!("failed to create poll {}: {err}", poll.id);
                    return Err(Error::CreateFailed);
                }
            }
        }

        log::error!("could not find a free poll ID after {MAX_ATTEMPTS} attempts");
        Err(Error::CreateFailed)
    }

    async fn on_vote(&self, ctx: &Context<'_>, id: &str, choice: &str) -> Result<String> {
        for attempt in 1..=MAX_ATTEMPTS {
            let mut poll = self.fetch(id).await?;
            let choice: NonZeroU16 = choice.parse().map_err(|_| Error::InvalidOption)?;
            poll.cast(ctx.user, choice).map_err(|rejection| match rejection {
                Rejection::Inactive => Error::Closed,
                Rejection::AlreadyVoted => Error::AlreadyVoted,
                Rejection::NoSuchOption => Error::InvalidOption,
            })?;

            match self.call(self.store.update_ballots(id, &poll.ballots, poll.revision)).await {
                Ok(revision) => {
                    log::info!("user {} voted on poll {id} (revision {revision})", ctx.user);
                    return Ok(String::from("Your vote has been recorded!"));
                }
                Err(DbError::Conflict) => log::debug!("poll {id} changed during vote attempt {attempt}"),
                Err(DbError::NotFound) => return Err(Error::UnknownPoll),
                Err(err) => {
                    log::error!("failed to record ballot of user {} on poll {id}: {err}", ctx.user);
                    return Err(Error::VoteFailed);
                }
            }
        }

        log::warn!("gave up on the ballot of user {} on poll {id} after {MAX_ATTEMPTS} attempts", ctx.user);
        Err(Error::Contention)
    }

    async fn on_results(&self, id: &str) -> Result<String> {
        let poll = self.fetch(id).await?;
        Ok(render_results(&poll))
    }

    async fn on_end(&self, ctx: &Context<'_>, id: &str) -> Result<String> {
        let poll = self.fetch(id).await?;
        if !poll.is_creator(ctx.user) {
            log::warn!("user {} attempted to end poll {id} of user {}", ctx.user, poll.creator);
            return Err(Error::Forbidden);
        }

        if !poll.active {
            return Err(Error::Closed);
        }

        match self.call(self.store.set_active(id, false)).await {
            Ok(()) => {
                log::info!("user {} ended poll {id}", ctx.user);
                Ok(String::from("Poll ended!"))
            }
            Err(DbError::NotFound) => Err(Error::UnknownPoll),
            Err(err) => {
                log::error!("failed to end poll {id}: {err}");
                Err(Error::EndFailed)
            }
        }
    }

    async fn on_delete(&self, ctx: &Context<'_>, id: &str) -> Result<String> {
        let poll = self.fetch(id).await?;
        if !poll.is_creator(ctx.user) {
            log::warn!("user {} attempted to delete poll {id} of user {}", ctx.user, poll.creator);
            return Err(Error::Forbidden);
        }

        match self.call(self.store.delete(id)).await {
            Ok(()) => {
                log::info!("user {} deleted poll {id}", ctx.user);
                Ok(String::from("Poll deleted!"))
            }
            Err(DbError::NotFound) => Err(Error::UnknownPoll),
            Err(err) => {
                log::error!("failed to delete poll {id}: {err}");
                Err(Error::DeleteFailed)
            }
        }
    }
}
