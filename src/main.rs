#![forbid(unsafe_code)]

use crate::config::{Config, StoreBackend};
use crate::service::IssueService;
use crate::store::memory::MemoryIssueStore;
use crate::store::postgres::{PgIssueStore, SCHEMA};
use crate::store::IssueStore;

use std::sync::Arc;

use actix_web::web::{to, Data};
use actix_web::{App, HttpServer};
use anyhow::{Context, Result};
use log::{info, warn};
use tracker_common::database;
use tracker_common::log::init_logger;

mod config;
mod error;
mod fields;
mod filter;
mod issue;
mod prelude;
mod routes;
mod service;
mod store;
mod utils;

#[actix_web::main]
async fn main() -> Result<()> {
    let _log_guards = init_logger("tracker", &["actix_server=info", "mio=info", "sqlx=warn"])?;

    let config = Config::from_env()?;
    let store = open_store(config.store).await?;

    let service = Data::new(IssueService::new(store));

    let server = HttpServer::new(move || {
        App::new()
            .app_data(service.clone())
            .wrap_fn(routes::allow_any_origin)
            .default_service(to(routes::not_found::default_handler))
            .configure(routes::init)
    }).bind(config.bind_address.as_str()).context("Unable to bind HTTP server.")?;

    info!("Listening on {} using the {} issue store", &config.bind_address, config.store);

    server.run().await.context("Unable to start HTTP server.")?;

    info!("Thank you and goodbye.");

    Ok(())
}

async fn open_store(backend: StoreBackend) -> Result<Arc<dyn IssueStore>> {
    Ok(match backend {
        StoreBackend::Postgres => {
            let db_pool = database::create_postgres_pool("tracker", None).await?;
            database::apply_schema(&db_pool, SCHEMA).await?;

            Arc::new(PgIssueStore::new(db_pool))
        }
        StoreBackend::Memory => {
            warn!("Using the in-memory issue store, issues will be lost on shutdown");

            Arc::new(MemoryIssueStore::default())
        }
    })
}
