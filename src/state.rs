use std::sync::Arc;

use socketioxide::{layer::SocketIoLayer, SocketIo};

use crate::{
    auth,
    config::Config,
    database::{self, DbPool},
    live,
};

pub type SharedState = Arc<AppState>;

pub struct AppState {
    pub config: Config,
    pub pool: DbPool,
    pub io: SocketIo,
}

impl AppState {
    /// Opens the database, applies migrations, seeds the admin account and
    /// registers the live namespace.
    pub fn new(
        config: Config,
    ) -> Result<(SharedState, SocketIoLayer), Box<dyn std::error::Error + Send + Sync>> {
        let pool = database::establish_pool(&config.database_url)?;

        let mut conn = pool.get()?;
        auth::ensure_admin(&mut conn, &config.admin_username, &config.admin_password)?;
        drop(conn);

        let (layer, io) = live::layer();

        Ok((Arc::new(Self { config, pool, io }), layer))
    }
}
