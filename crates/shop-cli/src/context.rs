use shop_config::config::Config;
use shop_db::{
    models::types::{PaginateReq, SortReq},
    ConnectionOptions, DbConnection, Deadline,
};
use tracing::debug;

use crate::cli::ListArgs;

/// Everything a command needs: the open store, the loaded config and the
/// output mode.
pub struct ShopContext {
    pub db: DbConnection,
    pub config: Config,
    pub json: bool,
}

impl ShopContext {
    pub fn open(config: Config, json: bool) -> miette::Result<Self> {
        let db_path = config.get_db_path()?;
        debug!(path = %db_path.display(), "opening store");

        let db = DbConnection::open(
            &db_path,
            ConnectionOptions {
                busy_timeout: config.busy_timeout(),
                migrate: true,
            },
        )?;

        Ok(Self {
            db,
            config,
            json,
        })
    }

    /// Fresh deadline for one engine call.
    pub fn deadline(&self) -> Deadline {
        self.config
            .query_timeout()
            .map(Deadline::after)
            .unwrap_or_else(Deadline::none)
    }

    pub fn paginate(&self, list: &ListArgs) -> PaginateReq {
        PaginateReq::new(list.page, list.limit.unwrap_or(self.config.page_limit())).normalized()
    }

    pub fn sort(&self, list: &ListArgs) -> SortReq {
        SortReq::new(list.order_by.as_str(), list.sort.as_str())
    }
}
