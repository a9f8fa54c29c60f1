use std::{env, time::Duration};

/// Where polls are kept.
pub enum Backend {
    /// Process-local storage. Polls do not survive a restart.
    Memory,
    Postgres(db::Config),
}

pub struct Config {
    pub port: u16,
    /// Shared secret expected on every webhook post.
    pub token: Option<Box<str>>,
    /// Upper bound on each store call.
    pub timeout: Duration,
    pub backend: Backend,
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        let port = env::var("PORT")?.parse()?;
        let token = env::var("WEBHOOK_TOKEN").ok().map(String::into_boxed_str);
        let timeout = match env::var("STORE_TIMEOUT_MS") {
            Ok(millis) => Duration::from_millis(millis.parse()?),
            _ => api::DEFAULT_TIMEOUT,
        };

        let backend = match env::var("PG_HOSTNAME") {
            Ok(host) => {
                let user = env::var("PG_USERNAME")?;
                let pass = env::var("PG_PASSWORD")?;
                let data = env::var("PG_DATABASE")?;
                let pg_port = match env::var("PG_PORT") {
                    Ok(pg_port) => pg_port.parse()?,
                    _ => 5432,
                };
                let mut config = db::Config::new();
                config.user(&user).password(&pass).host(&host).dbname(&data).port(pg_port);
                Backend::Postgres(config)
            }
            _ => Backend::Memory,
        };

        Ok(Self { port, token, timeout, backend })
    }
}
