mod handlers;

use std::env;
use std::net::SocketAddr;
use std::sync::Arc;

use axum::{
    extract::Extension,
    routing::{get, patch, post, put},
    Router,
};

use crate::api::API;
use crate::external::ObjectStorage;
use crate::realtime::Notifier;
use crate::server::handlers::{bookings, events, messages, profiles, rides};

type DynAPI = Arc<dyn API + Send + Sync>;

pub async fn serve<T: API + Sync + Send + 'static>(
    api: T,
    notifier: Notifier,
    storage: ObjectStorage,
) {
    let api = Arc::new(api) as DynAPI;

    let app = Router::new()
        .route("/rides", post(rides::create).get(rides::list_own))
        .route("/rides/search", get(rides::search))
        .route("/rides/:id", get(rides::find).delete(rides::delete))
        .route("/rides/:id/bookings", get(bookings::list_for_ride))
        .route("/bookings", post(bookings::create).get(bookings::list_own))
        .route("/bookings/:id", get(bookings::find).delete(bookings::cancel))
        .route("/bookings/:id/driver/accept", patch(bookings::driver_accept))
        .route("/bookings/:id/driver/reject", patch(bookings::driver_reject))
        .route("/bookings/:id/rider/accept", patch(bookings::rider_accept))
        .route("/bookings/:id/rider/reject", patch(bookings::rider_reject))
        .route(
            "/bookings/:id/messages",
            post(messages::create).get(messages::list),
        )
        .route("/profiles/me", put(profiles::save))
        .route("/profiles/me/avatar", put(profiles::upload_avatar))
        .route("/profiles/:id", get(profiles::find))
        .route("/events", get(events::subscribe))
        .layer(Extension(api))
        .layer(Extension(notifier))
        .layer(Extension(Arc::new(storage)));

    let addr: SocketAddr = env::var("BIND_ADDR")
        .unwrap_or_else(|_| "127.0.0.1:3000".into())
        .parse()
        .expect("BIND_ADDR must be a socket address");

    tracing::info!("listening on {}", addr);

    axum::Server::bind(&addr)
        .serve(app.into_make_service())
        .await
        .unwrap();
}
