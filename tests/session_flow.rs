mod support;

use appointment_client::domain::{Credentials, Registration};
use appointment_client::use_cases::{GuardState, UnauthorizedPolicy};

#[tokio::test]
async fn test_login_then_logout() {
    let backend = support::spawn_backend().await;
    let (client, _) = support::client(&backend, UnauthorizedPolicy::RefreshAndRetryOnce);

    client
        .auth
        .login(Credentials::new(support::USERNAME, support::PASSWORD))
        .await
        .expect("login should succeed");
    assert!(client.auth.is_logged_in());

    client.auth.logout();

    assert!(!client.auth.is_logged_in());
    assert!(client.auth.session().is_empty());
}

#[tokio::test]
async fn test_wrong_password_shows_backend_message() {
    let backend = support::spawn_backend().await;
    let (client, _) = support::client(&backend, UnauthorizedPolicy::RefreshAndRetryOnce);

    let err = client
        .auth
        .login(Credentials::new(support::USERNAME, "wrong"))
        .await
        .expect_err("login should fail");

    assert_eq!(err.user_message(), "Invalid username or password");
    assert!(!client.auth.is_logged_in());
}

#[tokio::test]
async fn test_signup_conflict_shows_backend_message() {
    let backend = support::spawn_backend().await;
    let (client, _) = support::client(&backend, UnauthorizedPolicy::RefreshAndRetryOnce);

    let created = client
        .auth
        .signup(Registration {
            username: "new-user".to_string(),
            email: "new@example.com".to_string(),
            password: "pw".to_string(),
        })
        .await
        .expect("signup should succeed");
    let err = client
        .auth
        .signup(Registration {
            username: support::USERNAME.to_string(),
            email: "a@example.com".to_string(),
            password: "pw".to_string(),
        })
        .await
        .expect_err("duplicate signup should fail");

    assert_eq!(created.message.as_deref(), Some("User registered"));
    assert_eq!(err.user_message(), "Username already taken");
    assert!(!client.auth.is_logged_in());
}

#[tokio::test]
async fn test_expired_session_is_refreshed_by_guard() {
    let backend = support::spawn_backend().await;
    backend.set_access_ttl(-10);
    let (client, navigator) = support::client(&backend, UnauthorizedPolicy::RefreshAndRetryOnce);
    client
        .auth
        .login(Credentials::new(support::USERNAME, support::PASSWORD))
        .await
        .expect("login should succeed");
    backend.set_access_ttl(900);

    let state = client.guard.check("/dashboard").await;

    assert_eq!(state, GuardState::Allowed);
    assert_eq!(backend.refresh_calls(), 1);
    assert!(client.auth.is_logged_in());
    assert_eq!(navigator.last_redirect(), None);
}

#[tokio::test]
async fn test_guard_sends_user_to_login_when_refresh_is_rejected() {
    let backend = support::spawn_backend().await;
    backend.set_access_ttl(-10);
    let (client, navigator) = support::client(&backend, UnauthorizedPolicy::RefreshAndRetryOnce);
    client
        .auth
        .login(Credentials::new(support::USERNAME, support::PASSWORD))
        .await
        .expect("login should succeed");
    backend.revoke_refresh_token();

    let state = client.guard.check("/dashboard").await;

    assert_eq!(state, GuardState::Denied);
    assert_eq!(navigator.last_redirect().as_deref(), Some("/login"));
    assert!(client.auth.session().is_empty());
}

#[tokio::test]
async fn test_concurrent_refreshes_share_one_call() {
    let backend = support::spawn_backend().await;
    backend.set_access_ttl(-10);
    let (client, _) = support::client(&backend, UnauthorizedPolicy::RefreshAndRetryOnce);
    client
        .auth
        .login(Credentials::new(support::USERNAME, support::PASSWORD))
        .await
        .expect("login should succeed");
    backend.set_access_ttl(900);

    let (first, second, third) = tokio::join!(
        client.auth.refreshing_token(),
        client.auth.refreshing_token(),
        client.auth.refreshing_token()
    );

    assert!(first && second && third);
    assert_eq!(backend.refresh_calls(), 1);
}
