use actix_web::cookie::{Cookie, SameSite};
use actix_web::{HttpRequest, HttpResponse, HttpResponseBuilder, web};
use tracing::info;

use crate::application::auth_service::AuthService;
use crate::domain::error::DomainError;
use crate::domain::user::User;
use crate::presentation::dto::{
    AuthResponse, LoginFormResponse, LoginRequest, NextQuery, RegisterRequest, UserResponse,
};
use crate::presentation::utils::{TOKEN_COOKIE, request_id, safe_next};

fn session_cookie(token: &str) -> Cookie<'static> {
    Cookie::build(TOKEN_COOKIE, token.to_owned())
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .finish()
}

fn signed_in(
    mut response: HttpResponseBuilder,
    user: User,
    token: String,
    next: String,
) -> HttpResponse {
    response.cookie(session_cookie(&token)).json(AuthResponse {
        access_token: token,
        token_type: "Bearer".to_string(),
        user: UserResponse {
            id: user.id,
            username: user.username,
            email: user.email,
        },
        next,
    })
}

pub async fn signup(
    req: HttpRequest,
    service: web::Data<AuthService>,
    payload: web::Json<RegisterRequest>,
) -> Result<HttpResponse, DomainError> {
    let RegisterRequest {
        username,
        email,
        password,
    } = payload.into_inner();

    let user = service.register(username, email, password).await?;
    info!(
        request_id = %request_id(&req),
        user_id = %user.id,
        username = %user.username,
        "user registered"
    );

    let token = service
        .keys()
        .generate_token(user.id)
        .map_err(|e| DomainError::Internal(e.to_string()))?;
    Ok(signed_in(HttpResponse::Created(), user, token, "/".to_string()))
}

pub async fn login_form(query: web::Query<NextQuery>) -> HttpResponse {
    HttpResponse::Ok().json(LoginFormResponse {
        next: safe_next(query.next.as_deref()),
        fields: ["login", "password"],
    })
}

pub async fn login(
    req: HttpRequest,
    service: web::Data<AuthService>,
    query: web::Query<NextQuery>,
    payload: web::Json<LoginRequest>,
) -> Result<HttpResponse, DomainError> {
    let (user, token) = service.login(&payload.login, &payload.password).await?;

    info!(
        request_id = %request_id(&req),
        username = %user.username,
        "user logged in"
    );

    let next = safe_next(query.next.as_deref());
    Ok(signed_in(HttpResponse::Ok(), user, token, next))
}
