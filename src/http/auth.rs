use std::{
    collections::HashMap,
    future::{ready, Ready},
    rc::Rc,
};

use actix_web::{
    body::{BoxBody, EitherBody},
    dev::{self, Payload, Service, ServiceRequest, ServiceResponse, Transform},
    web, Error, FromRequest, HttpMessage, HttpRequest, HttpResponse,
};
use futures_util::future::LocalBoxFuture;
use log::warn;

use crate::{
    http::response::ApiResponse,
    service::{RequestContext, UserIdentity},
};

/// Bearer token -> user id table, registered as app data.
#[derive(Debug, Clone, Default)]
pub struct SessionTokens(pub HashMap<String, String>);

impl SessionTokens {
    pub fn resolve(&self, token: &str) -> Option<UserIdentity> {
        self.0.get(token).map(|id| UserIdentity { id: id.clone() })
    }
}

/// Resolves the caller's identity and stores it in the request extensions.
///
/// Requests without a known token pass through anonymously; the job service
/// decides whether an identity is required.
pub struct Authentication;

impl<S, B> Transform<S, ServiceRequest> for Authentication
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B, BoxBody>>;
    type Error = Error;
    type InitError = ();
    type Transform = AuthMiddleware<S>;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(AuthMiddleware {
            service: Rc::new(service),
        }))
    }
}

pub struct AuthMiddleware<S> {
    service: Rc<S>,
}

fn token_from_request(req: &ServiceRequest) -> Option<String> {
    if let Some(auth_header) = req.headers().get("Authorization") {
        if let Ok(auth_str) = auth_header.to_str() {
            if let Some(token) = auth_str.strip_prefix("Bearer ") {
                return Some(token.to_string());
            }
        }
    }

    serde_qs::from_str::<HashMap<String, String>>(req.query_string())
        .ok()
        .and_then(|mut query| query.remove("authToken"))
}

impl<S, B> Service<ServiceRequest> for AuthMiddleware<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B, BoxBody>>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    dev::forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let svc = self.service.clone();

        Box::pin(async move {
            let tokens = match req.app_data::<web::Data<SessionTokens>>() {
                Some(tokens) => tokens.clone(),
                None => {
                    warn!("session table not found in app configuration. Denying request.");
                    let (request, _pl) = req.into_parts();
                    let response = HttpResponse::InternalServerError()
                        .json(ApiResponse::error(
                            "INTERNAL_SERVER_ERROR",
                            "internal server error",
                        ))
                        .map_into_right_body();
                    return Ok(ServiceResponse::new(request, response));
                }
            };

            if let Some(token) = token_from_request(&req) {
                match tokens.resolve(&token) {
                    Some(user) => {
                        req.extensions_mut().insert(user);
                    }
                    None => warn!("unknown session token for path: {}", req.path()),
                }
            }

            svc.call(req).await.map(|res| res.map_into_left_body())
        })
    }
}

impl FromRequest for RequestContext {
    type Error = Error;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        ready(Ok(RequestContext {
            user: req.extensions().get::<UserIdentity>().cloned(),
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolves_known_tokens_only() {
        let tokens = SessionTokens(HashMap::from([("abc".to_string(), "alice".to_string())]));
        assert_eq!(
            tokens.resolve("abc"),
            Some(UserIdentity {
                id: "alice".to_string()
            })
        );
        assert_eq!(tokens.resolve("nope"), None);
    }
}
