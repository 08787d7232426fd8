//! Current user handlers: profile, account and favorites.

use actix_web::{HttpResponse, web};

use quill_core::domain::{ComposedPost, PostContent, PostParts, UserPosts, UserProfile};
use quill_core::services::{
    ACCOUNT_DELETED, AccountUpdate, FavoriteTarget, UpdateAccountCommand,
};
use quill_shared::dto::{
    AddPostRequest, FavoriteResponse, MessageResponse, PostPartResponse, PostResponse,
    RemoveFavoriteResponse, UpdateUserRequest, UpdateUserResponse, UserPostsResponse,
    UserResponse,
};

use crate::middleware::auth::Identity;
use crate::middleware::error::{AppError, AppResult};
use crate::state::AppState;

/// GET /api/me
pub async fn get_user(state: web::Data<AppState>, identity: Identity) -> AppResult<HttpResponse> {
    let profile = state.accounts.profile(identity.user_id).await?;

    Ok(HttpResponse::Ok().json(user_response(profile)))
}

/// PUT /api/me
pub async fn update_user(
    state: web::Data<AppState>,
    identity: Identity,
    body: web::Json<UpdateUserRequest>,
) -> AppResult<HttpResponse> {
    let req = body.into_inner();
    req.validate().map_err(AppError::Validation)?;

    let update = req.update.unwrap_or_default();
    let command = UpdateAccountCommand {
        email: req.email,
        password: req.password,
        update: AccountUpdate {
            email: update.email,
            password: update.password,
            confirm_password: update.confirm_password,
            firstname: update.firstname,
            lastname: update.lastname,
        },
    };

    let updated = state
        .accounts
        .update_account(identity.user_id, command)
        .await?;

    Ok(HttpResponse::Ok().json(UpdateUserResponse {
        msg: updated.message,
        user: user_response(updated.profile),
    }))
}

/// DELETE /api/me
pub async fn delete_user(
    state: web::Data<AppState>,
    identity: Identity,
) -> AppResult<HttpResponse> {
    state.accounts.delete_account(identity.user_id).await?;

    Ok(HttpResponse::Ok().json(MessageResponse {
        msg: ACCOUNT_DELETED.to_string(),
    }))
}

/// GET /api/me/posts
pub async fn list_posts(
    state: web::Data<AppState>,
    identity: Identity,
) -> AppResult<HttpResponse> {
    let favorites = state.accounts.favorites(identity.user_id).await?;

    Ok(HttpResponse::Ok().json(user_posts_response(favorites)))
}

/// POST /api/me/posts
pub async fn add_post(
    state: web::Data<AppState>,
    identity: Identity,
    body: web::Json<AddPostRequest>,
) -> AppResult<HttpResponse> {
    let req = body.into_inner();
    req.validate().map_err(AppError::Validation)?;

    let target = match req {
        AddPostRequest::Existing { post_id } => FavoriteTarget::Existing(post_id),
        AddPostRequest::Composed {
            introduction_id,
            body_id,
            conclusion_id,
        } => FavoriteTarget::Composed(PostParts {
            introduction_id,
            body_id,
            conclusion_id,
        }),
    };

    let outcome = state.accounts.add_favorite(identity.user_id, target).await?;
    let response = FavoriteResponse {
        msg: outcome.message(),
        post_id: outcome.post.id,
        created: outcome.created,
        saved: outcome.added,
    };

    if outcome.added {
        Ok(HttpResponse::Created().json(response))
    } else {
        Ok(HttpResponse::Ok().json(response))
    }
}

/// DELETE /api/me/posts/{post_id}
pub async fn remove_post(
    state: web::Data<AppState>,
    identity: Identity,
    path: web::Path<i32>,
) -> AppResult<HttpResponse> {
    let post_id = path.into_inner();

    let outcome = state
        .accounts
        .remove_favorite(identity.user_id, post_id)
        .await?;

    Ok(HttpResponse::Ok().json(RemoveFavoriteResponse {
        msg: outcome.message(),
        post_id: outcome.post_id,
        removed: outcome.removed,
    }))
}

fn user_response(profile: UserProfile) -> UserResponse {
    UserResponse {
        firstname: profile.firstname,
        lastname: profile.lastname,
        email: profile.email,
    }
}

fn part_response(part: PostContent) -> PostPartResponse {
    PostPartResponse {
        id: part.id,
        content: part.content,
    }
}

fn post_response(post: ComposedPost) -> PostResponse {
    PostResponse {
        id: post.id,
        updated_at: post.updated_at,
        introduction: part_response(post.introduction),
        body: part_response(post.body),
        conclusion: part_response(post.conclusion),
    }
}

fn user_posts_response(user: UserPosts) -> UserPostsResponse {
    UserPostsResponse {
        id: user.id,
        firstname: user.firstname,
        lastname: user.lastname,
        posts: user.posts.into_iter().map(post_response).collect(),
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use actix_web::http::StatusCode;
    use actix_web::{App, test};
    use serde_json::{Value, json};

    use quill_core::ports::{PasswordService, TokenService, UserRepository};
    use quill_infra::{Argon2PasswordService, InMemoryRepository, JwtConfig, JwtTokenService};

    use super::*;
    use crate::handlers::configure_routes;
    use crate::middleware::error::{json_config, path_config};

    struct Fixture {
        store: InMemoryRepository,
        state: AppState,
        tokens: Arc<dyn TokenService>,
        user_id: i32,
        token: String,
    }

    async fn fixture() -> Fixture {
        let passwords = Argon2PasswordService::with_params(1024, 1, 1).unwrap();
        let store = InMemoryRepository::new();
        let user = store
            .create_user("Ada", "Lovelace", "a@x.com", &passwords.hash("p1").unwrap())
            .await
            .unwrap();
        store
            .create_user("Bob", "Martin", "taken@x.com", &passwords.hash("p2").unwrap())
            .await
            .unwrap();

        let state = AppState::in_memory(store.clone(), Arc::new(passwords));
        let tokens: Arc<dyn TokenService> = Arc::new(JwtTokenService::new(JwtConfig {
            secret: "handler-test-secret".to_string(),
            ..JwtConfig::default()
        }));
        let token = tokens.generate_token(user.id).unwrap();

        Fixture {
            store,
            state,
            tokens,
            user_id: user.id,
            token,
        }
    }

    impl Fixture {
        fn bearer(&self) -> (&'static str, String) {
            ("Authorization", format!("Bearer {}", self.token))
        }
    }

    macro_rules! init_app {
        ($fixture:expr) => {
            test::init_service(
                App::new()
                    .app_data(web::Data::new($fixture.state.clone()))
                    .app_data(web::Data::new($fixture.tokens.clone()))
                    .app_data(json_config())
                    .app_data(path_config())
                    .configure(configure_routes),
            )
            .await
        };
    }

    async fn composed_parts(store: &InMemoryRepository) -> PostParts {
        store
            .create_contents("Il était une fois", "un backend", "qui fonctionnait")
            .await
    }

    #[actix_web::test]
    async fn test_get_user_returns_profile() {
        let f = fixture().await;
        let app = init_app!(f);

        let req = test::TestRequest::get()
            .uri("/api/me")
            .insert_header(f.bearer())
            .to_request();
        let resp = test::call_service(&app, req).await;

        assert_eq!(resp.status(), StatusCode::OK);
        let body: Value = test::read_body_json(resp).await;
        assert_eq!(
            body,
            json!({ "firstname": "Ada", "lastname": "Lovelace", "email": "a@x.com" })
        );
    }

    #[actix_web::test]
    async fn test_missing_token_is_unauthorized() {
        let f = fixture().await;
        let app = init_app!(f);

        let req = test::TestRequest::get().uri("/api/me").to_request();
        let resp = test::call_service(&app, req).await;

        assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body["code"], "missing-token");
    }

    #[actix_web::test]
    async fn test_update_email() {
        let f = fixture().await;
        let app = init_app!(f);

        let req = test::TestRequest::put()
            .uri("/api/me")
            .insert_header(f.bearer())
            .set_json(json!({
                "email": "a@x.com",
                "password": "p1",
                "update": { "email": "b@x.com" }
            }))
            .to_request();
        let resp = test::call_service(&app, req).await;

        assert_eq!(resp.status(), StatusCode::OK);
        let body: Value = test::read_body_json(resp).await;
        assert!(body["msg"].as_str().unwrap().contains("Nouvel email : b@x.com."));
        assert_eq!(body["user"]["email"], "b@x.com");
    }

    #[actix_web::test]
    async fn test_update_with_wrong_password_changes_nothing() {
        let f = fixture().await;
        let app = init_app!(f);

        let req = test::TestRequest::put()
            .uri("/api/me")
            .insert_header(f.bearer())
            .set_json(json!({
                "email": "a@x.com",
                "password": "wrong",
                "update": { "email": "b@x.com", "firstname": "Eve" }
            }))
            .to_request();
        let resp = test::call_service(&app, req).await;

        assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body["code"], "invalid-credentials");
        assert_eq!(body["detail"], "Ancien mot de passe et/ou email invalide");

        let profile = f.state.accounts.profile(f.user_id).await.unwrap();
        assert_eq!(profile.email, "a@x.com");
        assert_eq!(profile.firstname, "Ada");
    }

    #[actix_web::test]
    async fn test_update_to_taken_email_conflicts() {
        let f = fixture().await;
        let app = init_app!(f);

        let req = test::TestRequest::put()
            .uri("/api/me")
            .insert_header(f.bearer())
            .set_json(json!({
                "email": "a@x.com",
                "password": "p1",
                "update": { "email": "taken@x.com" }
            }))
            .to_request();
        let resp = test::call_service(&app, req).await;

        assert_eq!(resp.status(), StatusCode::CONFLICT);
        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body["code"], "email-taken");
    }

    #[actix_web::test]
    async fn test_update_validation_lists_violations() {
        let f = fixture().await;
        let app = init_app!(f);

        let req = test::TestRequest::put()
            .uri("/api/me")
            .insert_header(f.bearer())
            .set_json(json!({
                "email": "a@x.com",
                "password": "p1",
                "update": { "email": "nope", "lastname": "" }
            }))
            .to_request();
        let resp = test::call_service(&app, req).await;

        assert_eq!(resp.status(), StatusCode::UNPROCESSABLE_ENTITY);
        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body["code"], "validation-failed");
        assert_eq!(body["errors"].as_array().unwrap().len(), 2);
    }

    #[actix_web::test]
    async fn test_malformed_body_is_bad_request() {
        let f = fixture().await;
        let app = init_app!(f);

        let req = test::TestRequest::put()
            .uri("/api/me")
            .insert_header(f.bearer())
            .insert_header(("Content-Type", "application/json"))
            .set_payload("{not json")
            .to_request();
        let resp = test::call_service(&app, req).await;

        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body["code"], "malformed-request");
    }

    #[actix_web::test]
    async fn test_delete_user_twice() {
        let f = fixture().await;
        let app = init_app!(f);

        for _ in 0..2 {
            let req = test::TestRequest::delete()
                .uri("/api/me")
                .insert_header(f.bearer())
                .to_request();
            let resp = test::call_service(&app, req).await;

            assert_eq!(resp.status(), StatusCode::OK);
            let body: Value = test::read_body_json(resp).await;
            assert_eq!(body["msg"], "User Deleted");
        }
    }

    #[actix_web::test]
    async fn test_add_same_post_twice() {
        let f = fixture().await;
        let parts = composed_parts(&f.store).await;
        let app = init_app!(f);

        let payload = json!({
            "introductionId": parts.introduction_id,
            "bodyId": parts.body_id,
            "conclusionId": parts.conclusion_id
        });

        let req = test::TestRequest::post()
            .uri("/api/me/posts")
            .insert_header(f.bearer())
            .set_json(&payload)
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::CREATED);
        let first: Value = test::read_body_json(resp).await;
        assert_eq!(first["created"], true);
        assert_eq!(first["saved"], true);

        let post_id = first["postId"].as_i64().unwrap();
        let req = test::TestRequest::post()
            .uri("/api/me/posts")
            .insert_header(f.bearer())
            .set_json(json!({ "postId": post_id }))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::OK);
        let second: Value = test::read_body_json(resp).await;
        assert_eq!(second["saved"], false);
        assert_eq!(
            second["msg"],
            format!("L'utilisateur a déjà enregistré le post {post_id}. Ajout impossible")
        );

        assert_eq!(f.store.favorite_post_ids(f.user_id).await.len(), 1);
    }

    #[actix_web::test]
    async fn test_add_unknown_post_is_not_found() {
        let f = fixture().await;
        let app = init_app!(f);

        let req = test::TestRequest::post()
            .uri("/api/me/posts")
            .insert_header(f.bearer())
            .set_json(json!({ "postId": 999 }))
            .to_request();
        let resp = test::call_service(&app, req).await;

        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body["detail"], "Post introuvable");
    }

    #[actix_web::test]
    async fn test_list_posts_nests_contents() {
        let f = fixture().await;
        let parts = composed_parts(&f.store).await;
        let app = init_app!(f);

        let req = test::TestRequest::post()
            .uri("/api/me/posts")
            .insert_header(f.bearer())
            .set_json(json!({
                "introductionId": parts.introduction_id,
                "bodyId": parts.body_id,
                "conclusionId": parts.conclusion_id
            }))
            .to_request();
        test::call_service(&app, req).await;

        let req = test::TestRequest::get()
            .uri("/api/me/posts")
            .insert_header(f.bearer())
            .to_request();
        let resp = test::call_service(&app, req).await;

        assert_eq!(resp.status(), StatusCode::OK);
        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body["firstname"], "Ada");
        let post = &body["posts"][0];
        assert!(post.get("updatedAt").is_some());
        assert_eq!(post["introduction"]["content"], "Il était une fois");
        assert_eq!(post["body"]["content"], "un backend");
        assert_eq!(post["conclusion"]["content"], "qui fonctionnait");
    }

    #[actix_web::test]
    async fn test_remove_unsaved_post() {
        let f = fixture().await;
        let parts = composed_parts(&f.store).await;
        let app = init_app!(f);

        // Another user saves the post so that it exists.
        let other = f.store.find_by_email("taken@x.com").await.unwrap().unwrap();
        let saved = f
            .state
            .accounts
            .add_favorite(other.id, FavoriteTarget::Composed(parts))
            .await
            .unwrap();

        let req = test::TestRequest::delete()
            .uri(&format!("/api/me/posts/{}", saved.post.id))
            .insert_header(f.bearer())
            .to_request();
        let resp = test::call_service(&app, req).await;

        assert_eq!(resp.status(), StatusCode::OK);
        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body["removed"], false);
        assert_eq!(
            body["msg"],
            "L'utilisateur n'a pas enregistré ce post. Suppression impossible"
        );
    }

    #[actix_web::test]
    async fn test_remove_unknown_post_is_not_found() {
        let f = fixture().await;
        let app = init_app!(f);

        let req = test::TestRequest::delete()
            .uri("/api/me/posts/77")
            .insert_header(f.bearer())
            .to_request();
        let resp = test::call_service(&app, req).await;

        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    }
}
