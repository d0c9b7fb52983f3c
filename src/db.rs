use rand::Rng;
use sqlx::{postgres::PgPoolOptions, Pool, Postgres};
use std::time::Duration;

const MAX_CONNECT_ATTEMPTS: u32 = 4;

pub struct PgPool(pub Pool<Postgres>);

impl PgPool {
    /// Connects with a bounded retry. Transient connection failures back
    /// off exponentially with jitter before the error surfaces; once the
    /// pool exists, acquisition itself is bounded so no caller hangs.
    #[tracing::instrument(skip(db_uri))]
    pub async fn new(db_uri: &str, max_connections: u32) -> Result<Self, sqlx::Error> {
        let mut attempt = 0;

        loop {
            let result = PgPoolOptions::new()
                .max_connections(max_connections)
                .acquire_timeout(Duration::from_secs(5))
                .connect(db_uri)
                .await;

            match result {
                Ok(pool) => return Ok(Self(pool)),
                Err(err) if attempt < MAX_CONNECT_ATTEMPTS => {
                    attempt += 1;

                    let jitter = rand::thread_rng().gen_range(0..100);
                    let backoff = Duration::from_millis(100 * 2u64.pow(attempt) + jitter);

                    tracing::warn!(
                        "database connection attempt {} failed ({}), retrying in {:?}",
                        attempt,
                        err,
                        backoff
                    );

                    tokio::time::sleep(backoff).await;
                }
                Err(err) => return Err(err),
            }
        }
    }
}
