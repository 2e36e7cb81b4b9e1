use super::*;
use mockito::Server;

fn endpoint_for(server: &Server) -> ServerEndpoint {
    let (host, port) = server
        .host_with_port()
        .rsplit_once(':')
        .map(|(h, p)| (h.to_string(), p.to_string()))
        .unwrap();
    ServerEndpoint { host, port }
}

#[test]
fn test_reactivation_url() {
    let endpoint = ServerEndpoint {
        host: "localhost".to_string(),
        port: "8000".to_string(),
    };
    assert_eq!(
        reactivation_url(&endpoint),
        "http://localhost:8000/reactivate_restful.php"
    );
}

#[tokio::test]
async fn test_trigger_requests_bootstrap_script() {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("GET", "/reactivate_restful.php")
        .with_status(200)
        .with_body("")
        .expect(1)
        .create_async()
        .await;

    let url = Reactivator::new(Client::new())
        .trigger(&endpoint_for(&server))
        .await
        .unwrap();

    mock.assert_async().await;
    assert!(url.ends_with("/reactivate_restful.php"));
}

#[tokio::test]
async fn test_trigger_ignores_error_status() {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("GET", "/reactivate_restful.php")
        .with_status(500)
        .with_body("Fatal error: Class 'Restful_Plugin' not found")
        .create_async()
        .await;

    let result = Reactivator::new(Client::new())
        .trigger(&endpoint_for(&server))
        .await;

    mock.assert_async().await;
    assert!(result.is_ok());
}

#[tokio::test]
async fn test_trigger_connection_refused() {
    let endpoint = ServerEndpoint {
        host: "127.0.0.1".to_string(),
        port: "9".to_string(),
    };

    let err = Reactivator::new(Client::new())
        .trigger(&endpoint)
        .await
        .unwrap_err();

    assert!(matches!(err, ProvisionError::Reactivate { .. }));
}

#[tokio::test]
async fn test_trigger_does_not_read_body() {
    use tokio::io::{AsyncReadExt, AsyncWriteExt};

    // Promises more body than it sends, then hangs up
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let port = listener.local_addr().unwrap().port();
    let server = tokio::spawn(async move {
        let (mut socket, _) = listener.accept().await.unwrap();
        let mut request = [0u8; 1024];
        let _ = socket.read(&mut request).await.unwrap();
        socket
            .write_all(b"HTTP/1.1 200 OK\r\nContent-Length: 4096\r\n\r\npartial")
            .await
            .unwrap();
    });

    let endpoint = ServerEndpoint {
        host: "127.0.0.1".to_string(),
        port: port.to_string(),
    };

    let result = Reactivator::new(Client::new()).trigger(&endpoint).await;

    server.await.unwrap();
    assert!(result.is_ok(), "got {result:?}");
}
