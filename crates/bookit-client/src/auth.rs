//! Sign-in, registration and sign-out.
//!
//! Every failure here is also shown as an error toast, so callers only need
//! the `Result` for control flow.

use tracing::{info, warn};

use bookit_core::validation::validate_required;
use bookit_core::{PageMarker, User};

use crate::context::ClientContext;
use crate::error::{ClientError, ClientResult};
use crate::store::Session;

/// Signs in and stores the session.
///
/// Empty fields are rejected before any request, email first.
pub async fn login(ctx: &ClientContext, email: &str, password: &str) -> ClientResult<()> {
    ctx.store.page().set(PageMarker::new(PageMarker::LOGIN)).await;

    let result = try_login(ctx, email, password).await;
    if let Err(err) = &result {
        warn!(error = %err, "Login failed");
        ctx.notify_error(err.user_message());
    }
    result
}

async fn try_login(ctx: &ClientContext, email: &str, password: &str) -> ClientResult<()> {
    if email.trim().is_empty() {
        return Err(ClientError::MissingCredentials("Please enter your Email address"));
    }
    if password.is_empty() {
        return Err(ClientError::MissingCredentials("Please enter your Password"));
    }

    let grant = ctx.api.login(email, password).await?;
    let session = Session::from_token(grant.token);
    info!(expires_at = ?session.expires_at(), "Signed in");

    ctx.store.session().set(Some(session)).await;
    if grant.user.is_some() {
        ctx.store.user().set(grant.user).await;
    }
    Ok(())
}

/// Creates an account. Does not sign in.
pub async fn register(
    ctx: &ClientContext,
    username: &str,
    email: &str,
    password: &str,
) -> ClientResult<User> {
    let result: ClientResult<User> = async {
        validate_required("username", username)?;
        validate_required("email", email)?;
        validate_required("password", password)?;
        ctx.api.register(username, email, password).await
    }
    .await;

    match &result {
        Ok(user) => info!(user_id = user.user_id, "Registered"),
        Err(err) => {
            warn!(error = %err, "Registration failed");
            ctx.notify_error(err.user_message());
        }
    }
    result
}

/// Forgets the session and every cached collection.
pub async fn logout(ctx: &ClientContext) {
    ctx.store.session().set(None).await;
    ctx.store.user().set(None).await;
    ctx.store.reset_cache().await;
    ctx.store.flip_update_signal();
    info!("Signed out");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::Harness;
    use bookit_core::{CollectionStatus, ResourceCollection};
    use serde_json::json;

    #[tokio::test]
    async fn test_empty_email_checked_first() {
        let h = Harness::new();

        let err = login(&h.ctx, "", "").await.unwrap_err();

        assert!(matches!(err, ClientError::MissingCredentials(_)));
        assert_eq!(h.notifier.messages(), vec!["Please enter your Email address"]);
        assert!(h.transport.requests().is_empty());
    }

    #[tokio::test]
    async fn test_empty_password_rejected() {
        let h = Harness::new();

        login(&h.ctx, "sam@example.com", "").await.unwrap_err();

        assert_eq!(h.notifier.messages(), vec!["Please enter your Password"]);
    }

    #[tokio::test]
    async fn test_login_stores_session_and_user() {
        let h = Harness::new();
        h.transport.respond(
            "POST /auth",
            200,
            json!({ "token": "abc", "username": "sam", "user_id": 4 }),
        );

        login(&h.ctx, "sam@example.com", "pw").await.unwrap();

        assert_eq!(h.ctx.store.token().await.unwrap(), "abc");
        let user = h.ctx.store.user().get().await.unwrap();
        assert_eq!(user.username.as_deref(), Some("sam"));
        assert_eq!(h.ctx.store.page().get().await.path(), "/login");
    }

    #[tokio::test]
    async fn test_rejected_login_shows_server_error() {
        let h = Harness::new();
        h.transport
            .respond("POST /auth", 401, json!({ "error": "Wrong password" }));

        let err = login(&h.ctx, "sam@example.com", "nope").await.unwrap_err();

        assert!(err.is_session_error());
        assert_eq!(h.notifier.messages(), vec!["Wrong password"]);
        assert!(!h.ctx.store.is_authenticated().await);
    }

    #[tokio::test]
    async fn test_register_requires_username() {
        let h = Harness::new();

        assert!(register(&h.ctx, " ", "a@b.c", "pw").await.is_err());
        assert!(h.transport.requests().is_empty());
        assert_eq!(h.notifier.messages().len(), 1);
    }

    #[tokio::test]
    async fn test_register_returns_user() {
        let h = Harness::new();
        h.transport.respond(
            "POST /users",
            201,
            json!({ "user_id": 8, "username": "alex", "email": "alex@example.com" }),
        );

        let user = register(&h.ctx, "alex", "alex@example.com", "pw").await.unwrap();

        assert_eq!(user.user_id, 8);
        assert!(h.notifier.messages().is_empty());
    }

    #[tokio::test]
    async fn test_logout_clears_everything() {
        let h = Harness::signed_in().await;
        h.ctx
            .store
            .my_listings()
            .set(ResourceCollection::success(Vec::new()))
            .await;

        logout(&h.ctx).await;

        assert!(!h.ctx.store.is_authenticated().await);
        assert_eq!(
            h.ctx.store.my_listings().get().await.status,
            CollectionStatus::Idle
        );
        assert_eq!(h.ctx.store.update_generation(), 1);
    }
}
