use actix_web::{
    body::BoxBody,
    dev::{Service, ServiceRequest, ServiceResponse, Transform},
    http::Method,
    web, Error, ResponseError,
};
use futures_util::future::{ok, Ready, LocalBoxFuture};
use std::{rc::Rc, task::{Context, Poll}};
use subtle::ConstantTimeEq;

use crate::{errors::AppError, AppState};

/// Bearer-token guard for the routes that change data or expose messages.
/// Must be the innermost `wrap` so it sees the app's boxed body.
pub struct AdminAuth;

impl<S> Transform<S, ServiceRequest> for AdminAuth
where
    S: Service<ServiceRequest, Response = ServiceResponse<BoxBody>, Error = Error> + 'static,
{
    type Response = ServiceResponse<BoxBody>;
    type Error = Error;
    type InitError = ();
    type Transform = AdminAuthService<S>;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ok(AdminAuthService {
            service: Rc::new(service),
        })
    }
}

pub struct AdminAuthService<S> {
    service: Rc<S>,
}

impl<S> Service<ServiceRequest> for AdminAuthService<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<BoxBody>, Error = Error> + 'static,
{
    type Response = ServiceResponse<BoxBody>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    fn poll_ready(&self, ctx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.service.poll_ready(ctx)
    }

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let service = Rc::clone(&self.service);

        Box::pin(async move {
            if !is_admin_route(req.path(), req.method()) {
                return service.call(req).await;
            }

            let Some(state) = req.app_data::<web::Data<AppState>>() else {
                tracing::error!("AppState missing in admin middleware");
                let err = AppError::InternalError("application state unavailable".into());
                return Ok(req.into_response(err.error_response()));
            };

            // No token configured: development mode, admin routes stay open.
            let Some(expected) = state.admin_token.as_deref() else {
                return service.call(req).await;
            };

            let verdict = extract_token(&req).map(|token| tokens_match(token, expected));
            match verdict {
                Some(true) => service.call(req).await,
                Some(false) => {
                    tracing::warn!(path = %req.path(), "Rejected admin request with wrong token");
                    Ok(req.into_response(AppError::UnauthorizedAccess.error_response()))
                }
                None => {
                    tracing::warn!(path = %req.path(), "Missing or malformed Authorization header");
                    Ok(req.into_response(AppError::UnauthorizedAccess.error_response()))
                }
            }
        })
    }
}

/// Writes need the admin token, except the public contact form. Reads are
/// public, except message and resume listings.
pub fn is_admin_route(path: &str, method: &Method) -> bool {
    if method == Method::OPTIONS {
        return false;
    }
    if method == Method::GET || method == Method::HEAD {
        return path.starts_with("/api/messages") || path.starts_with("/api/resumes");
    }
    !(method == Method::POST && path == "/api/contact")
}

fn extract_token(req: &ServiceRequest) -> Option<&str> {
    req.headers()
        .get("Authorization")
        .and_then(|header| header.to_str().ok())
        .and_then(|header| {
            let (scheme, token) = header.split_once(' ')?;
            scheme.eq_ignore_ascii_case("bearer").then(|| token.trim())
        })
}

fn tokens_match(given: &str, expected: &str) -> bool {
    given.as_bytes().ct_eq(expected.as_bytes()).into()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn admin_route_table() {
        assert!(!is_admin_route("/api/contact", &Method::POST));
        assert!(!is_admin_route("/api/projects", &Method::GET));
        assert!(!is_admin_route("/api/projects", &Method::OPTIONS));
        assert!(!is_admin_route("/api/resume/current", &Method::GET));

        assert!(is_admin_route("/api/projects", &Method::POST));
        assert!(is_admin_route("/api/projects/4", &Method::DELETE));
        assert!(is_admin_route("/api/upload-resume", &Method::POST));
        assert!(is_admin_route("/api/messages", &Method::GET));
        assert!(is_admin_route("/api/messages/3/read", &Method::PUT));
        assert!(is_admin_route("/api/resumes", &Method::GET));
        assert!(is_admin_route("/api/github-repos/refresh", &Method::POST));
    }

    #[test]
    fn token_comparison() {
        assert!(tokens_match("s3cret-token-value", "s3cret-token-value"));
        assert!(!tokens_match("s3cret-token-valuX", "s3cret-token-value"));
        assert!(!tokens_match("short", "s3cret-token-value"));
    }
}
