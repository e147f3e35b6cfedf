mod common;

use authsession::models::Credentials;
use authsession::router::{NavigationError, NavigationGuard, Router, View};
use authsession::storage::{MemoryStorage, TOKEN_KEY};
use common::{build_store, build_store_with, mock_login_ok, mock_me, user_json};
use mockito::Server;

#[tokio::test]
async fn anonymous_visitor_is_sent_to_login() {
    let server = Server::new_async().await;
    let (store, _) = build_store(&server);
    let mut router = Router::new(NavigationGuard::new(store.clone()));

    let navigation = router.navigate("/orders/add").await.unwrap();
    assert_eq!(navigation.location.route.view, View::Login);
    assert_eq!(navigation.redirects, vec!["/login".to_string()]);
}

#[tokio::test]
async fn returning_user_goes_straight_to_protected_page() {
    let mut server = Server::new_async().await;
    let me = mock_me(&mut server, "T1", user_json(1, "ana", "administrador")).await;
    let (store, _) = build_store_with(&server, MemoryStorage::with_entry(TOKEN_KEY, "T1"));
    let mut router = Router::new(NavigationGuard::new(store.clone()));

    let navigation = router.navigate("/orders/7").await.unwrap();
    me.assert_async().await;
    assert!(!navigation.was_redirected());
    assert_eq!(navigation.location.param("id"), Some("7"));
    assert!(store.is_admin());
}

#[tokio::test]
async fn logged_in_user_is_kept_away_from_login() {
    let mut server = Server::new_async().await;
    mock_login_ok(&mut server, "T1", user_json(1, "ana", "tecnico")).await;
    server
        .mock("POST", "/auth/verify-token")
        .with_status(200)
        .create_async()
        .await;
    let (store, _) = build_store(&server);
    store.login(&Credentials::new("ana", "secret")).await.unwrap();
    let mut router = Router::new(NavigationGuard::new(store.clone()));

    let navigation = router.navigate("/login").await.unwrap();
    assert_eq!(navigation.location.route.view, View::Home);
    assert_eq!(router.current().map(|m| m.path.as_str()), Some("/"));
}

#[tokio::test]
async fn revoked_session_is_sent_to_login() {
    let mut server = Server::new_async().await;
    mock_login_ok(&mut server, "T1", user_json(1, "ana", "tecnico")).await;
    server
        .mock("POST", "/auth/verify-token")
        .with_status(401)
        .create_async()
        .await;
    let (store, storage) = build_store(&server);
    store.login(&Credentials::new("ana", "secret")).await.unwrap();
    let mut router = Router::new(NavigationGuard::new(store.clone()));

    let navigation = router.navigate("/users").await.unwrap();
    assert_eq!(navigation.location.route.view, View::Login);
    assert!(!store.is_authenticated());
    assert_eq!(common::stored_token(&storage).await, None);
}

#[tokio::test]
async fn unknown_path_is_not_found() {
    let server = Server::new_async().await;
    let (store, _) = build_store(&server);
    let mut router = Router::new(NavigationGuard::new(store.clone()));

    assert_eq!(
        router.navigate("/reports").await.unwrap_err(),
        NavigationError::NotFound("/reports".to_string())
    );
}
