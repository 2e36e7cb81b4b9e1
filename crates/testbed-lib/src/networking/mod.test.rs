use super::*;
use mockito::Server;

#[test]
fn test_networking_manager_creation() {
    let manager = NetworkingManager::new(NetworkingConfig::default());

    assert!(manager.is_ok(), "Should create networking manager");
}

#[test]
fn test_zero_timeout_rejected() {
    let config = NetworkingConfig {
        timeout_seconds: Some(0),
        ..Default::default()
    };

    assert!(matches!(
        NetworkingManager::new(config),
        Err(NetworkingError::InvalidTimeout { seconds: 0 })
    ));
}

#[tokio::test]
async fn test_client_sends_user_agent() {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("GET", "/")
        .match_header("user-agent", USER_AGENT)
        .with_status(200)
        .create_async()
        .await;

    let manager = NetworkingManager::new(NetworkingConfig {
        timeout_seconds: Some(5),
        ..Default::default()
    })
    .unwrap();

    let response = manager.client().get(server.url()).send().await.unwrap();

    assert!(response.status().is_success());
    mock.assert_async().await;
}
