use actix_web::{
    Error,
    dev::{Service, ServiceRequest, ServiceResponse, Transform, forward_ready},
    http::Method,
    web,
};
use futures_util::future::LocalBoxFuture;
use serde::Deserialize;
use std::{
    future::{Ready, ready},
    rc::Rc,
};

#[derive(Debug, Deserialize)]
struct MethodQuery {
    #[serde(rename = "_method")]
    method: Option<String>,
}

/// Reads the method a `POST` asks to be routed as from its `_method` query
/// parameter. Only `PUT`, `PATCH` and `DELETE` are honoured.
pub fn overridden_method(method: &Method, query: &str) -> Option<Method> {
    if *method != Method::POST {
        return None;
    }

    let requested = web::Query::<MethodQuery>::from_query(query)
        .ok()?
        .into_inner()
        .method?;

    match requested.to_ascii_uppercase().as_str() {
        "PUT" => Some(Method::PUT),
        "PATCH" => Some(Method::PATCH),
        "DELETE" => Some(Method::DELETE),
        _ => None,
    }
}

/// Middleware letting HTML forms, which can only `POST`, reach `PUT`, `PATCH`
/// and `DELETE` routes through `?_method=`.
pub struct MethodOverride;

impl<S, B> Transform<S, ServiceRequest> for MethodOverride
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type InitError = ();
    type Transform = MethodOverrideService<S>;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(MethodOverrideService {
            service: Rc::new(service),
        }))
    }
}

/// Service that implements the method override logic
pub struct MethodOverrideService<S> {
    service: Rc<S>,
}

impl<S, B> Service<ServiceRequest> for MethodOverrideService<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    forward_ready!(service);

    fn call(&self, mut req: ServiceRequest) -> Self::Future {
        if let Some(method) = overridden_method(req.method(), req.query_string()) {
            log::debug!("Routing POST {} as {}", req.path(), method);
            req.head_mut().method = method;
        }

        let service = self.service.clone();
        Box::pin(async move { service.call(req).await })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_post_with_method_param_is_overridden() {
        assert_eq!(
            overridden_method(&Method::POST, "_method=DELETE"),
            Some(Method::DELETE)
        );
        assert_eq!(
            overridden_method(&Method::POST, "_method=put"),
            Some(Method::PUT)
        );
    }

    #[test]
    fn test_other_requests_are_left_alone() {
        assert_eq!(overridden_method(&Method::GET, "_method=DELETE"), None);
        assert_eq!(overridden_method(&Method::POST, ""), None);
        assert_eq!(overridden_method(&Method::POST, "_method=TRACE"), None);
    }
}
