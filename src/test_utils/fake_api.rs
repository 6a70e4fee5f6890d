use axum::Router;
use tokio::net::TcpListener;

/// Serve `router` on a random local port in the background and return its base URL.
///
/// Stands in for the finance API in tests.
pub(crate) async fn spawn_fake_api(router: Router) -> String {
    let listener = TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Could not bind fake API listener");
    let address = listener
        .local_addr()
        .expect("Could not get fake API address");

    tokio::spawn(async move {
        axum::serve(listener, router)
            .await
            .expect("Fake API stopped unexpectedly");
    });

    format!("http://{address}")
}
