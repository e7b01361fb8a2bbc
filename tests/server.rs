use std::time::Duration;

use reqwest::StatusCode;
use serde_json::{Value, json};
use tokio::net::TcpListener;
use tokio::sync::oneshot;

use user_api::{Config, Server, app};

struct TestServer {
    base_url: String,
    shutdown: Option<oneshot::Sender<()>>,
    handle: tokio::task::JoinHandle<Result<(), user_api::Error>>,
}

impl TestServer {
    async fn spawn() -> Self {
        let listener = TcpListener::bind("127.0.0.1:0")
            .await
            .expect("failed to bind ephemeral port");
        let base_url = format!("http://{}", listener.local_addr().unwrap());

        let (tx, rx) = oneshot::channel::<()>();
        let router = app(&Config::default());
        let handle = tokio::spawn(async move {
            Server::from_listener(listener)
                .serve_with_shutdown(router, async {
                    let _ = rx.await;
                })
                .await
        });

        Self { base_url, shutdown: Some(tx), handle }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Fires shutdown and waits, bounded, for `serve` to return.
    async fn stop(mut self) {
        if let Some(tx) = self.shutdown.take() {
            let _ = tx.send(());
        }
        tokio::time::timeout(Duration::from_secs(5), &mut self.handle)
            .await
            .expect("server did not shut down within 5s")
            .unwrap()
            .unwrap();
    }
}

#[tokio::test]
async fn serves_crud_over_tcp_and_shuts_down_cleanly() {
    let srv = TestServer::spawn().await;
    let client = reqwest::Client::new();

    let res = client.get(srv.url("/")).send().await.unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    assert_eq!(res.text().await.unwrap(), "User Management Api is Running!");

    let res = client.get(srv.url("/users/get")).send().await.unwrap();
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);

    let res = client
        .post(srv.url("/users/create"))
        .bearer_auth("my-secret-token")
        .json(&json!({"userName": "Zed", "age": 20}))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let created: Value = res.json().await.unwrap();
    assert_eq!(created, json!({"id": 5, "userName": "Zed", "age": 20}));

    let res = client
        .delete(srv.url("/users/5"))
        .bearer_auth("my-secret-token")
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["message"], "User with ID 5 has been deleted");

    srv.stop().await;
}

#[tokio::test]
async fn idle_keep_alive_connection_does_not_block_shutdown() {
    let srv = TestServer::spawn().await;
    let client = reqwest::Client::new();

    let res = client.get(srv.url("/")).send().await.unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    res.text().await.unwrap();

    // `client` stays alive, so its pooled connection is still open here.
    srv.stop().await;
    drop(client);
}
