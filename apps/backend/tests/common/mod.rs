#![allow(dead_code)]

use actix_web::body::MessageBody;
use actix_web::dev::{Service, ServiceResponse};
use actix_web::http::StatusCode;
use serde_json::Value;

pub use coinche_backend::test_support::common::{
    test_bootstrap, test_config, test_issue_token, TEST_ADMIN_EMAIL,
};

/// `Authorization` header for a token
pub fn bearer(token: &str) -> (&'static str, String) {
    ("Authorization", format!("Bearer {token}"))
}

/// Call the app and decode the JSON body (`Null` when the body is not JSON)
pub async fn send<S, R, B>(app: &S, req: R) -> (StatusCode, Value)
where
    S: Service<R, Response = ServiceResponse<B>, Error = actix_web::Error>,
    B: MessageBody,
{
    let res = actix_web::test::call_service(app, req).await;
    let status = res.status();
    let body = actix_web::test::read_body(res).await;
    let json = serde_json::from_slice(&body).unwrap_or(Value::Null);
    (status, json)
}
