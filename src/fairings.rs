use crate::state::AppState;
use log::info;
use rocket::fairing::{Fairing, Info, Kind};
use rocket::{Data, Orbit, Request, Rocket};
use std::sync::Arc;

pub struct RequestLogger;

#[rocket::async_trait]
impl Fairing for RequestLogger {
    fn info(&self) -> Info {
        Info {
            name: "Request Logger",
            kind: Kind::Request,
        }
    }

    async fn on_request(&self, req: &mut Request<'_>, _: &mut Data<'_>) {
        info!(
            "{} {} {}",
            req.method(),
            req.uri(),
            req.headers().get_one("User-Agent").unwrap_or("Unknown")
        );
    }
}

/// Re-reads the configuration from the environment on SIGHUP.
pub struct ConfigReloader;

#[rocket::async_trait]
impl Fairing for ConfigReloader {
    fn info(&self) -> Info {
        Info {
            name: "Config Reloader",
            kind: Kind::Liftoff,
        }
    }

    async fn on_liftoff(&self, rocket: &Rocket<Orbit>) {
        let Some(state) = rocket.state::<AppState>() else {
            return;
        };
        let config = Arc::clone(&state.config);

        #[cfg(unix)]
        tokio::spawn(async move {
            use tokio::signal::unix::{SignalKind, signal};

            let mut hangups = match signal(SignalKind::hangup()) {
                Ok(stream) => stream,
                Err(e) => {
                    log::warn!("Unable to listen for SIGHUP: {}", e);
                    return;
                }
            };
            while hangups.recv().await.is_some() {
                info!("SIGHUP received, reloading configuration");
                config.reload();
            }
        });

        #[cfg(not(unix))]
        drop(config);
    }
}
