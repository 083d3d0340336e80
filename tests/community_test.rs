//! Accounts, submissions, votes and comments against a live database

mod helpers;

use assert_matches::assert_matches;
use helpers::*;
use launchpad::models::{
    CreateCommentRequest, LoginRequest, ProductQuery, ProductSort, ProductStatus, RegisterRequest,
    UpdateProductRequest, UpdateUserRequest,
};
use launchpad::services::AuthContext;
use launchpad::LaunchpadError;
use serial_test::serial;

#[tokio::test]
#[serial]
async fn test_register_login_logout() {
    let Some(db) = TestDatabase::new().await else { return };
    let ctx = TestContext::new(db);
    let auth = &ctx.services.auth_service;

    let request = fake_registration();
    let (user, token) = auth.register(request.clone()).await.unwrap();
    assert_eq!(user.points, 1000);
    assert!(!user.is_admin());
    assert_eq!(auth.authenticate(&token).await.unwrap().id, user.id);

    // Same email in a different case is still taken
    let mut duplicate = fake_registration();
    duplicate.email = request.email.to_uppercase();
    assert_matches!(auth.register(duplicate).await, Err(LaunchpadError::Conflict(_)));

    let (by_username, second_token) = auth
        .login(LoginRequest {
            login: user.username.clone(),
            password: TEST_PASSWORD.to_string(),
        })
        .await
        .unwrap();
    assert_eq!(by_username.id, user.id);
    assert_ne!(second_token, token);

    assert_matches!(
        auth.login(LoginRequest {
            login: user.email.clone(),
            password: "not-the-password".to_string(),
        })
        .await,
        Err(LaunchpadError::Unauthorized)
    );

    auth.logout(&token).await.unwrap();
    assert_matches!(auth.authenticate(&token).await, Err(LaunchpadError::Unauthorized));
    assert!(auth.authenticate(&second_token).await.is_ok());

    let ledger = ctx.services.user_service.points_history(&user, None, None).await.unwrap();
    assert_eq!(ledger.transactions.len(), 1);
    assert_eq!(ledger.transactions[0].delta, 1000);
}

#[tokio::test]
#[serial]
async fn test_registration_validation_and_admin_emails() {
    let Some(db) = TestDatabase::new().await else { return };
    let ctx = TestContext::new(db);
    let auth = &ctx.services.auth_service;

    let short_password = RegisterRequest {
        password: "short".to_string(),
        ..fake_registration()
    };
    assert_matches!(auth.register(short_password).await, Err(LaunchpadError::InvalidInput(_)));

    let bad_username = RegisterRequest {
        username: "no spaces allowed".to_string(),
        ..fake_registration()
    };
    assert_matches!(auth.register(bad_username).await, Err(LaunchpadError::InvalidInput(_)));

    let admin = ctx.register_admin().await;
    assert!(admin.is_admin());
}

#[tokio::test]
#[serial]
async fn test_banned_users_lose_access() {
    let Some(db) = TestDatabase::new().await else { return };
    let ctx = TestContext::new(db);

    let admin = ctx.register_admin().await;
    let (user, token) = ctx.register_user().await;

    let banned = ctx.services.admin_service.set_ban(&admin, user.id, true).await.unwrap();
    assert!(banned.is_banned);

    assert_matches!(
        ctx.services.auth_service.authenticate(&token).await,
        Err(LaunchpadError::UserBanned)
    );
    assert_matches!(
        ctx.services
            .auth_service
            .login(LoginRequest {
                login: user.username.clone(),
                password: TEST_PASSWORD.to_string(),
            })
            .await,
        Err(LaunchpadError::UserBanned)
    );
    assert_matches!(
        ctx.services.admin_service.set_ban(&admin, admin.user_id(), true).await,
        Err(LaunchpadError::InvalidInput(_))
    );

    ctx.services.admin_service.set_ban(&admin, user.id, false).await.unwrap();
    assert!(ctx.services.auth_service.authenticate(&token).await.is_ok());
}

#[tokio::test]
#[serial]
async fn test_submission_moderation_flow() {
    let Some(db) = TestDatabase::new().await else { return };
    let ctx = TestContext::new(db);

    let admin = ctx.register_admin().await;
    let (owner, _) = ctx.register_user().await;
    let owner_ctx = AuthContext::new(owner.clone());

    let product = ctx.submit_product(&owner, fake_product()).await;
    assert_eq!(product.status(), ProductStatus::Pending);

    // Pending products are hidden from the public and visible to their owner
    assert_matches!(
        ctx.services.product_service.get(&product.slug, None).await,
        Err(LaunchpadError::ProductNotFound(_))
    );
    assert!(ctx.services.product_service.get(&product.slug, Some(&owner_ctx)).await.is_ok());

    let queue = ctx.services.admin_service.list_products(&admin, None, None, None).await.unwrap();
    assert_eq!(queue.len(), 1);

    let rejected = ctx
        .services
        .admin_service
        .reject_product(&admin, product.id, "Landing page is down")
        .await
        .unwrap();
    assert_eq!(rejected.status(), ProductStatus::Rejected);
    assert_eq!(rejected.rejection_reason.as_deref(), Some("Landing page is down"));
    assert_matches!(
        ctx.services.admin_service.reject_product(&admin, product.id, "again").await,
        Err(LaunchpadError::InvalidStateTransition { .. })
    );

    // Editing a rejected product sends it back to review
    let resubmitted = ctx
        .services
        .product_service
        .update(
            &owner_ctx,
            product.id,
            UpdateProductRequest {
                tagline: Some("Now with a working landing page".to_string()),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(resubmitted.status(), ProductStatus::Pending);

    let approved = ctx.services.admin_service.approve_product(&admin, product.id).await.unwrap();
    assert_eq!(approved.status(), ProductStatus::Approved);
    assert!(approved.approved_at.is_some());
    assert_eq!(ctx.reload_user(owner.id).await.points, 1050);

    // Reward is paid on the first approval only
    ctx.services.admin_service.reject_product(&admin, product.id, "Spam").await.unwrap();
    ctx.services.admin_service.approve_product(&admin, product.id).await.unwrap();
    assert_eq!(ctx.reload_user(owner.id).await.points, 1050);

    assert_matches!(
        ctx.services.admin_service.approve_product(&admin, product.id).await,
        Err(LaunchpadError::InvalidStateTransition { .. })
    );
    assert_matches!(
        ctx.services.admin_service.approve_product(&owner_ctx, product.id).await,
        Err(LaunchpadError::PermissionDenied(_))
    );

    let page = ctx.services.product_service.list(ProductQuery::default()).await.unwrap();
    assert_eq!(page.total, 1);
    assert_eq!(page.items[0].product.id, product.id);
}

#[tokio::test]
#[serial]
async fn test_duplicate_names_get_distinct_slugs() {
    let Some(db) = TestDatabase::new().await else { return };
    let ctx = TestContext::new(db);
    let (owner, _) = ctx.register_user().await;

    let mut request = fake_product();
    request.name = "Rocket Mail".to_string();
    let first = ctx.submit_product(&owner, request.clone()).await;
    let second = ctx.submit_product(&owner, request).await;
    assert_eq!(first.slug, "rocket-mail");
    assert_eq!(second.slug, "rocket-mail-2");

    let mut reserved = fake_product();
    reserved.name = "ID".to_string();
    assert_eq!(ctx.submit_product(&owner, reserved).await.slug, "id-2");
}

#[tokio::test]
#[serial]
async fn test_votes_are_idempotent_and_reward_the_owner() {
    let Some(db) = TestDatabase::new().await else { return };
    let ctx = TestContext::new(db);

    let admin = ctx.register_admin().await;
    let (owner, _) = ctx.register_user().await;
    let (voter, _) = ctx.register_user().await;
    let product = ctx.approved_product(&owner, &admin).await;
    let votes = &ctx.services.vote_service;

    let first = votes.vote(&voter, product.id).await.unwrap();
    let again = votes.vote(&voter, product.id).await.unwrap();
    assert!(first.voted);
    assert_eq!(first.vote_count, 1);
    assert_eq!(again.vote_count, 1);
    assert_eq!(ctx.reload_user(owner.id).await.points, 1051);

    assert_matches!(
        votes.vote(&owner, product.id).await,
        Err(LaunchpadError::InvalidInput(_))
    );

    let removed = votes.unvote(&voter, product.id).await.unwrap();
    assert!(!removed.voted);
    assert_eq!(removed.vote_count, 0);
    assert_eq!(votes.unvote(&voter, product.id).await.unwrap().vote_count, 0);
    assert_eq!(ctx.reload_user(owner.id).await.points, 1050);

    let pending = ctx.submit_product(&owner, fake_product()).await;
    assert_matches!(votes.vote(&voter, pending.id).await, Err(LaunchpadError::InvalidInput(_)));
}

#[tokio::test]
#[serial]
async fn test_boosted_products_lead_the_listing() {
    let Some(db) = TestDatabase::new().await else { return };
    let ctx = TestContext::new(db);

    let admin = ctx.register_admin().await;
    let (owner, _) = ctx.register_user().await;
    let (voter, _) = ctx.register_user().await;
    let popular = ctx.approved_product(&owner, &admin).await;
    let boosted = ctx.approved_product(&owner, &admin).await;

    ctx.services.vote_service.vote(&voter, popular.id).await.unwrap();
    ctx.services
        .boost_service
        .purchase(&AuthContext::new(owner.clone()), boosted.id, "day")
        .await
        .unwrap();

    let page = ctx
        .services
        .product_service
        .list(ProductQuery {
            sort: ProductSort::Top,
            ..Default::default()
        })
        .await
        .unwrap();

    let ids: Vec<i64> = page.items.iter().map(|view| view.product.id).collect();
    assert_eq!(ids, vec![boosted.id, popular.id]);
    assert!(page.items[0].is_boosted);
    assert!(!page.items[1].is_boosted);
}

#[tokio::test]
#[serial]
async fn test_search_treats_wildcards_literally() {
    let Some(db) = TestDatabase::new().await else { return };
    let ctx = TestContext::new(db);

    let admin = ctx.register_admin().await;
    let (owner, _) = ctx.register_user().await;

    let mut request = fake_product();
    request.name = "100% Uptime".to_string();
    request.tagline = "Status pages for small teams".to_string();
    let uptime = ctx.submit_product(&owner, request).await;
    ctx.services.admin_service.approve_product(&admin, uptime.id).await.unwrap();
    ctx.approved_product(&owner, &admin).await;

    let search = |q: &str| ProductQuery {
        q: Some(q.to_string()),
        ..Default::default()
    };
    let products = &ctx.services.product_service;

    let page = products.list(search("%")).await.unwrap();
    assert_eq!(page.total, 1);
    assert_eq!(page.items[0].product.id, uptime.id);

    assert_eq!(products.list(search("_")).await.unwrap().total, 0);
    assert_eq!(products.list(search("uptime")).await.unwrap().total, 1);
    assert_eq!(products.list(search("")).await.unwrap().total, 2);

    let users = ctx.services.admin_service.list_users(&admin, Some("%"), None, None).await.unwrap();
    assert_eq!(users.total, 0);
}

#[tokio::test]
#[serial]
async fn test_comment_report_and_moderation() {
    let Some(db) = TestDatabase::new().await else { return };
    let ctx = TestContext::new(db);

    let admin = ctx.register_admin().await;
    let (owner, _) = ctx.register_user().await;
    let (author, _) = ctx.register_user().await;
    let (reader, _) = ctx.register_user().await;
    let product = ctx.approved_product(&owner, &admin).await;
    let comments = &ctx.services.comment_service;

    let comment = comments
        .add(
            &author,
            product.id,
            CreateCommentRequest {
                body: "  Love   the onboarding  ".to_string(),
                parent_id: None,
            },
        )
        .await
        .unwrap();
    assert_eq!(comment.body, "Love the onboarding");

    let reply = comments
        .add(
            &owner,
            product.id,
            CreateCommentRequest {
                body: "Thanks!".to_string(),
                parent_id: Some(comment.id),
            },
        )
        .await
        .unwrap();
    assert_eq!(reply.parent_id, Some(comment.id));

    assert_matches!(comments.report(&author, comment.id).await, Err(LaunchpadError::InvalidInput(_)));

    let flagged = comments.report(&reader, comment.id).await.unwrap();
    assert_eq!(flagged.status, "flagged");
    assert_eq!(flagged.report_count, 1);

    let queue = ctx.services.admin_service.list_comments(&admin, None, None, None).await.unwrap();
    assert_eq!(queue.len(), 1);
    assert_eq!(queue[0].comment.id, comment.id);

    let hidden = ctx.services.admin_service.hide_comment(&admin, comment.id).await.unwrap();
    assert_eq!(hidden.status, "hidden");
    assert_matches!(
        comments.report(&reader, comment.id).await,
        Err(LaunchpadError::InvalidStateTransition { .. })
    );

    let visible = comments.list(product.id, None).await.unwrap();
    assert_eq!(visible.len(), 1);
    assert_eq!(visible[0].comment.id, reply.id);

    let restored = ctx.services.admin_service.restore_comment(&admin, comment.id).await.unwrap();
    assert_eq!(restored.status, "visible");
    assert_eq!(restored.report_count, 0);

    assert_matches!(
        comments.delete(&AuthContext::new(reader.clone()), comment.id).await,
        Err(LaunchpadError::PermissionDenied(_))
    );
    comments.delete(&AuthContext::new(author), comment.id).await.unwrap();
    assert!(comments.list(product.id, None).await.unwrap().is_empty());
}

#[tokio::test]
#[serial]
async fn test_profile_and_admin_user_management() {
    let Some(db) = TestDatabase::new().await else { return };
    let ctx = TestContext::new(db);

    let admin = ctx.register_admin().await;
    let (user, _) = ctx.register_user().await;
    ctx.approved_product(&user, &admin).await;
    ctx.submit_product(&user, fake_product()).await;

    let updated = ctx
        .services
        .user_service
        .update_profile(
            &user,
            UpdateUserRequest {
                display_name: None,
                bio: Some("Building tools for makers".to_string()),
                website_url: Some("https://maker.example.com".to_string()),
            },
        )
        .await
        .unwrap();
    assert_eq!(updated.bio.as_deref(), Some("Building tools for makers"));

    let profile = ctx.services.user_service.get_profile(&user.username).await.unwrap();
    assert_eq!(profile.user.id, user.id);
    assert_eq!(profile.products.len(), 1);

    let adjusted = ctx
        .services
        .admin_service
        .adjust_points(&admin, user.id, -5000, Some("refund"))
        .await
        .unwrap();
    assert_eq!(adjusted.points, 0);
    assert_matches!(
        ctx.services.admin_service.adjust_points(&admin, user.id, 0, None).await,
        Err(LaunchpadError::InvalidInput(_))
    );

    let page = ctx
        .services
        .admin_service
        .list_users(&admin, Some(&user.username), None, None)
        .await
        .unwrap();
    assert_eq!(page.total, 1);
    assert_eq!(page.items[0].id, user.id);

    let stats = ctx.services.admin_service.stats(&admin).await.unwrap();
    assert_eq!(stats.users, 2);
    assert_eq!(stats.products.get("approved"), Some(&1));
    assert_eq!(stats.products.get("pending"), Some(&1));
}
