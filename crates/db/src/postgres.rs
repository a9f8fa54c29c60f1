use crate::{
    error::{Error, Result},
    Ballots, Config, Poll, PollStore,
};
use alloc::{string::String, vec::Vec};
use tokio::task::JoinHandle;
use tokio_postgres::{error::SqlState, tls::NoTls, types::Json, Client, Row};

const SCHEMA: &str = include_str!("../schema.sql");

type Driver = JoinHandle<core::result::Result<(), tokio_postgres::Error>>;

/// PostgreSQL-backed store. The connection is driven by a background task that lives until
/// [`Database::close`] is called.
pub struct Database {
    client: Client,
    driver: Driver,
}

fn unavailable(err: tokio_postgres::Error) -> Error {
    log::error!("database request failed: {err}");
    Error::Unavailable
}

/// Revisions are stored as `BIGINT` but wrap around like a `u32`.
const REVISION_MODULUS: i64 = 1 << 32;

fn deserialize_revision_from_row(row: &Row) -> Result<u32> {
    let revision: i64 = row.try_get("revision").map_err(unavailable)?;
    u32::try_from(revision).map_err(|_| {
        log::error!("stored revision {revision} is out of range");
        Error::Unavailable
    })
}

fn deserialize_poll_from_row(row: Row) -> Result<Poll> {
    let revision = deserialize_revision_from_row(&row)?;
    let id = row.try_get("id").map_err(unavailable)?;
    let creator = row.try_get("creator").map_err(unavailable)?;
    let channel = row.try_get("channel").map_err(unavailable)?;
    let question = row.try_get("question").map_err(unavailable)?;
    let options: Vec<String> = row.try_get("options").map_err(unavailable)?;
    let Json(ballots): Json<Ballots> = row.try_get("ballots").map_err(unavailable)?;
    let active = row.try_get("active").map_err(unavailable)?;
    Ok(Poll { id, creator, channel, question, options, ballots, active, revision })
}

impl Database {
    /// Connects to the database, spawns the connection driver, and ensures that the schema exists.
    pub async fn open(config: &Config) -> Result<Self> {
        let (client, conn) = config.connect(NoTls).await.map_err(unavailable)?;
        let driver = tokio::spawn(conn);
        let db = Self { client, driver };
        db.client.batch_execute(SCHEMA).await.map_err(unavailable)?;
        log::info!("connected to the poll database");
        Ok(db)
    }

    /// Drops the client and waits for the connection driver to wind down.
    pub async fn close(self) -> Result<()> {
        let Self { client, driver } = self;
        drop(client);
        match driver.await {
            Ok(Ok(())) => Ok(()),
            Ok(Err(err)) => Err(unavailable(err)),
            Err(err) => {
                log::error!("database driver task failed: {err}");
                Err(Error::Unavailable)
            }
        }
    }
}

impl PollStore for Database {
    async fn put(&self, poll: &Poll) -> Result<()> {
        let revision = i64::from(poll.revision);
        let err = match self
            .client
            .execute(
                "INSERT INTO poll (id, creator, channel, question, options, ballots, active, revision) \
                 VALUES ($1, $2, $3, $4, $5, $6, $7, $8)",
                &[
                    &poll.id,
                    &poll.creator,
                    &poll.channel,
                    &poll.question,
                    &poll.options,
                    &Json(&poll.ballots),
                    &poll.active,
                    &revision,
                ],
            )
            .await
        {
            Ok(1) => return Ok(()),
            Ok(count) => {
                log::error!("insertion of poll {} affected {count} rows", poll.id);
                return Err(Error::Unavailable);
            }
            Err(err) => err,
        };

        if err.code() == Some(&SqlState::UNIQUE_VIOLATION) {
            return Err(Error::DuplicateKey);
        }

        Err(unavailable(err))
    }

    async fn get(&self, id: &str) -> Result<Poll> {
        let row = self
            .client
            .query_opt(
                "SELECT id, creator, channel, question, options, ballots, active, revision FROM poll WHERE id = $1",
                &[&id],
            )
            .await
            .map_err(unavailable)?
            .ok_or(Error::NotFound)?;
        deserialize_poll_from_row(row)
    }

    async fn update_ballots(&self, id: &str, ballots: &Ballots, revision: u32) -> Result<u32> {
        let expected = i64::from(revision);
        let maybe_row = self
            .client
            .query_opt(
                "UPDATE poll SET ballots = $3, revision = (revision + 1) % $4 \
                 WHERE id = $1 AND revision = $2 RETURNING revision",
                &[&id, &expected, &Json(ballots), &REVISION_MODULUS],
            )
            .await
            .map_err(unavailable)?;

        if let Some(row) = maybe_row {
            return deserialize_revision_from_row(&row);
        }

        // Nothing matched. Tell apart a stale revision from a missing poll.
        let exists = self
            .client
            .query_opt("SELECT 1 FROM poll WHERE id = $1", &[&id])
            .await
            .map_err(unavailable)?
            .is_some();
        Err(if exists { Error::Conflict } else { Error::NotFound })
    }

    async fn set_active(&self, id: &str, active: bool) -> Result<()> {
        match self
            .client
            .execute(
                "UPDATE poll SET active = $2, revision = (revision + 1) % $3 WHERE id = $1",
                &[&id, &active, &REVISION_MODULUS],
            )
            .await
        {
            Ok(1) => Ok(()),
            Ok(0) => Err(Error::NotFound),
            Ok(count) => {
                log::error!("update of poll {id} affected {count} rows");
                Err(Error::Unavailable)
            }
            Err(err) => Err(unavailable(err)),
        }
    }

    async fn delete(&self, id: &str) -> Result<()> {
        match self.client.execute("DELETE FROM poll WHERE id = $1", &[&id]).await {
            Ok(1) => Ok(()),
            Ok(0) => Err(Error::NotFound),
            Ok(count) => {
                log::error!("deletion of poll {id} affected {count} rows");
                Err(Error::Unavailable)
            }
            Err(err) => Err(unavailable(err)),
        }
    }
}
