//! Resolves presented admin tokens to identities. This is the whole
//! authority boundary: session issuance lives outside this service, all we
//! need is "is this caller an authenticated admin, and who are they".

use crate::{config::AccountRole, error::ServiceError, state::SharedState};

/// Identity attached to a request once the admin check passes.
#[derive(Debug, Clone)]
pub struct AdminIdentity {
    /// Email recorded in the audit trail.
    pub email: String,
}

/// Resolve a token to an admin identity.
///
/// Missing or unrecognised tokens are `Unauthorized`; a recognised account
/// without the admin role is `Forbidden`. The check runs before any state
/// read, so denied requests never touch storage.
pub fn authenticate_admin(
    state: &SharedState,
    token: Option<&str>,
) -> Result<AdminIdentity, ServiceError> {
    let token = token.ok_or_else(|| {
        ServiceError::Unauthorized("missing admin token header `X-Admin-Token`".into())
    })?;

    match state.config().identify(token) {
        None => Err(ServiceError::Unauthorized("unrecognized admin token".into())),
        Some(account) if account.role != AccountRole::Admin => Err(ServiceError::Forbidden(
            "admin privileges required".into(),
        )),
        Some(account) => Ok(AdminIdentity {
            email: account.email.clone(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        config::{AccountRole, AdminAccount, AppConfig},
        state::AppState,
    };

    fn state_with_accounts() -> SharedState {
        AppState::new(AppConfig::for_tests(vec![
            AdminAccount {
                token: "admin-token".into(),
                email: "ops@example.com".into(),
                role: AccountRole::Admin,
            },
            AdminAccount {
                token: "viewer-token".into(),
                email: "viewer@example.com".into(),
                role: AccountRole::Viewer,
            },
        ]))
    }

    #[test]
    fn missing_token_is_unauthorized() {
        let state = state_with_accounts();
        assert!(matches!(
            authenticate_admin(&state, None),
            Err(ServiceError::Unauthorized(_))
        ));
    }

    #[test]
    fn unknown_token_is_unauthorized() {
        let state = state_with_accounts();
        assert!(matches!(
            authenticate_admin(&state, Some("nope")),
            Err(ServiceError::Unauthorized(_))
        ));
    }

    #[test]
    fn viewer_token_is_forbidden() {
        let state = state_with_accounts();
        assert!(matches!(
            authenticate_admin(&state, Some("viewer-token")),
            Err(ServiceError::Forbidden(_))
        ));
    }

    #[test]
    fn admin_token_yields_identity() {
        let state = state_with_accounts();
        let identity = authenticate_admin(&state, Some("admin-token")).unwrap();
        assert_eq!(identity.email, "ops@example.com");
    }
}
