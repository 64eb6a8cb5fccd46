pub mod cart;
pub mod catalog;
pub mod favourites;
pub mod fulfilment;
pub mod inquiries;
pub mod requests;

use std::sync::Arc;

use actix_web::{web, HttpRequest};
use serde::Serialize;
use utoipa::ToSchema;

use crate::domain::ports::DocumentStore;
use crate::domain::session::{Role, Session};
use crate::errors::AppError;

pub type SharedStore = web::Data<Arc<dyn DocumentStore>>;

/// Body of every `201 Created` response.
#[derive(Debug, Serialize, ToSchema)]
pub struct CreatedResponse {
    pub id: String,
}

/// Build the acting session from identity headers. The auth provider in
/// front of this service verifies the token and forwards the claims as
/// `x-user-id`, `x-user-name` and `x-user-role`; only the id is mandatory.
pub fn session_from_request(req: &HttpRequest) -> Result<Session, AppError> {
    let header = |name: &str| {
        req.headers()
            .get(name)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string)
    };

    let user_id = header("x-user-id")
        .filter(|v| !v.is_empty())
        .ok_or_else(|| AppError::BadRequest("missing x-user-id header".to_string()))?;
    let display_name = header("x-user-name").unwrap_or_else(|| "User".to_string());
    let role = match header("x-user-role") {
        Some(role) if role.eq_ignore_ascii_case("admin") => Role::Admin,
        _ => Role::Customer,
    };

    Ok(Session {
        user_id,
        display_name,
        role,
    })
}

#[cfg(test)]
mod tests {
    use actix_web::test::TestRequest;

    use super::*;

    #[test]
    fn session_requires_a_user_id() {
        let req = TestRequest::default().to_http_request();
        assert!(session_from_request(&req).is_err());
    }

    #[test]
    fn session_defaults_name_and_role() {
        let req = TestRequest::default()
            .insert_header(("x-user-id", "u1"))
            .to_http_request();
        let session = session_from_request(&req).expect("session");
        assert_eq!(session.user_id, "u1");
        assert_eq!(session.display_name, "User");
        assert!(!session.is_admin());
    }

    #[test]
    fn admin_role_header_is_case_insensitive() {
        let req = TestRequest::default()
            .insert_header(("x-user-id", "a1"))
            .insert_header(("x-user-name", "Root"))
            .insert_header(("x-user-role", "ADMIN"))
            .to_http_request();
        let session = session_from_request(&req).expect("session");
        assert!(session.is_admin());
        assert_eq!(session.display_name, "Root");
    }
}
