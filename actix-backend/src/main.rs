use std::{io, sync::Arc};

use actix_cors::Cors;
use actix_web::{middleware::Logger, web::{self, Data}, App, HttpServer};

use playground::{
    config::{ServerConfig, StorageKind},
    routes,
    store::{MemoryRepository, PgRepository, Repository},
    AppState,
};

#[actix_web::main]
async fn main() -> io::Result<()> {
    dotenv::from_filename(".env")
        .or_else(|_| dotenv::dotenv())
        .ok();

    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config = ServerConfig::from_env().map_err(io::Error::other)?;

    let repo: Arc<dyn Repository> = match (config.storage, config.database_url.as_deref()) {
        (StorageKind::Postgres, Some(database_url)) => {
            let repo = PgRepository::connect(database_url, config.max_connections)
                .await
                .map_err(io::Error::other)?;
            repo.migrate().await.map_err(io::Error::other)?;
            Arc::new(repo)
        }
        (StorageKind::Postgres, None) => {
            return Err(io::Error::other("DATABASE_URL must be set"));
        }
        (StorageKind::Memory, _) => {
            log::warn!("using in-memory storage, records are lost on shutdown");
            Arc::new(MemoryRepository::new())
        }
    };

    let app_data = Data::new(AppState {
        repo,
        identity: config.identity.clone(),
        billing_secret: config.billing_secret.clone(),
    });

    log::info!("listening on {}:{}", config.host, config.port);

    HttpServer::new(move || {
        let cors = Cors::default()
            .allow_any_origin()
            .allow_any_method()
            .allow_any_header()
            .max_age(3600);

        App::new()
            .app_data(app_data.clone())
            .wrap(Logger::default())
            .wrap(cors)
            .service(web::scope("/api").configure(|cfg| routes::configure(cfg, app_data.clone())))
    })
    .bind((config.host.as_str(), config.port))?
    .run()
    .await
}
