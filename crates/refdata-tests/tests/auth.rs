//! Login, token rotation and account tests.

use refdata_client::{CreateUserRequest, Error, Role, resources::Users};
use refdata_tests::{
    MASTER_PASSWORD, MASTER_USERNAME, create_test_client, master_client, unique_name,
};

#[tokio::test]
async fn test_login_and_me() {
    let (client, session) = master_client().await;

    assert_eq!(session.token_type, "Bearer");
    assert!(session.expires_in > 0);
    assert_eq!(session.user.role, Role::Master);

    let me = client.me().await.expect("Failed to get profile");
    assert_eq!(me.username, MASTER_USERNAME);
    assert!(me.last_login_at.is_some());
}

#[tokio::test]
async fn test_login_with_bad_credentials() {
    let client = create_test_client().await;

    let result = client.login(MASTER_USERNAME, "not-the-password").await;
    assert!(matches!(result, Err(Error::Unauthorized(_))));

    let result = client.me().await;
    assert!(matches!(result, Err(Error::Unauthorized(_))));
}

#[tokio::test]
async fn test_refresh_rotation_detects_reuse() {
    let client = create_test_client().await;
    let session = client
        .login(MASTER_USERNAME, MASTER_PASSWORD)
        .await
        .expect("Login failed");

    let rotated = client
        .refresh(&session.refresh_token)
        .await
        .expect("Refresh failed");
    assert_ne!(rotated.refresh_token, session.refresh_token);

    // Replaying the first token revokes the rotated one as well.
    let replay = client.refresh(&session.refresh_token).await;
    assert!(matches!(replay, Err(Error::Unauthorized(_))));
    let after = client.refresh(&rotated.refresh_token).await;
    assert!(matches!(after, Err(Error::Unauthorized(_))));
}

#[tokio::test]
async fn test_logout_is_idempotent() {
    let client = create_test_client().await;
    let session = client
        .login(MASTER_USERNAME, MASTER_PASSWORD)
        .await
        .expect("Login failed");

    client
        .logout(&session.refresh_token)
        .await
        .expect("Logout failed");
    client
        .logout(&session.refresh_token)
        .await
        .expect("Second logout failed");

    let result = client.refresh(&session.refresh_token).await;
    assert!(matches!(result, Err(Error::Unauthorized(_))));
}

#[tokio::test]
async fn test_change_password_ends_sessions() {
    let (master, _) = master_client().await;
    let username = unique_name("pw");
    master
        .resource::<Users>()
        .create(&CreateUserRequest {
            username: username.clone(),
            email: format!("{}@example.com", username),
            display_name: None,
            role: Role::Trader,
            password: "first-password".to_string(),
            is_active: true,
        })
        .await
        .expect("Failed to create user");

    let anonymous = create_test_client().await;
    let session = anonymous
        .login(&username, "first-password")
        .await
        .expect("Login failed");
    let user = anonymous.with_token(&session.access_token);

    let wrong = user.change_password("wrong-password", "second-password").await;
    assert_eq!(wrong.unwrap_err().status(), Some(400));

    user.change_password("first-password", "second-password")
        .await
        .expect("Password change failed");

    let result = anonymous.refresh(&session.refresh_token).await;
    assert!(matches!(result, Err(Error::Unauthorized(_))));
    anonymous
        .login(&username, "second-password")
        .await
        .expect("Login with new password failed");
}

#[tokio::test]
async fn test_login_throttling() {
    let client = create_test_client().await;
    let username = unique_name("nobody");

    let mut throttled = None;
    for _ in 0..20 {
        match client.login(&username, "whatever-password").await {
            Err(Error::Unauthorized(_)) => continue,
            other => {
                throttled = Some(other);
                break;
            }
        }
    }

    let err = throttled
        .expect("Login was never throttled")
        .expect_err("Unknown user logged in");
    assert_eq!(err.status(), Some(429));
    assert_eq!(err.code(), Some("RATE_LIMIT_EXCEEDED"));
}
