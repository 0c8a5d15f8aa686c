//! Ownership rules shared by every client-owned resource.
//!
//! Handlers load the row first (NotFound), then call into this module
//! (Forbidden), so a missing row is always reported as missing.

use tracing::warn;
use uuid::Uuid;

use crate::{auth::extractors::AuthUser, error::AppError};

/// Admins may touch any client's rows; clients only their own.
pub fn ensure_owner_or_admin(user: &AuthUser, client_id: Uuid) -> Result<(), AppError> {
    if user.is_admin() || user.id == client_id {
        return Ok(());
    }
    warn!(user_id = %user.id, %client_id, "ownership check failed");
    Err(AppError::forbidden())
}

/// Effective `clientId` filter for list endpoints.
pub fn scope_client_filter(
    user: &AuthUser,
    requested: Option<Uuid>,
) -> Result<Option<Uuid>, AppError> {
    if user.is_admin() {
        return Ok(requested);
    }
    match requested {
        Some(id) if id != user.id => {
            warn!(user_id = %user.id, requested = %id, "client listed foreign rows");
            Err(AppError::forbidden())
        }
        _ => Ok(Some(user.id)),
    }
}

/// Publication filter for marketing content: non-admins only ever see published rows.
pub fn published_filter(viewer: Option<&AuthUser>, requested: Option<bool>) -> Option<bool> {
    match viewer {
        Some(u) if u.is_admin() => requested,
        _ => Some(true),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::repo_types::Role;

    fn user(role: Role) -> AuthUser {
        AuthUser {
            id: Uuid::new_v4(),
            username: "u".into(),
            email: "u@example.com".into(),
            role,
        }
    }

    #[test]
    fn client_can_only_touch_own_rows() {
        let me = user(Role::Client);
        assert!(ensure_owner_or_admin(&me, me.id).is_ok());
        let err = ensure_owner_or_admin(&me, Uuid::new_v4()).unwrap_err();
        assert!(matches!(err, AppError::Forbidden(_)));
    }

    #[test]
    fn admin_can_touch_any_row() {
        let admin = user(Role::Admin);
        assert!(ensure_owner_or_admin(&admin, Uuid::new_v4()).is_ok());
    }

    #[test]
    fn client_list_is_forced_to_self() {
        let me = user(Role::Client);
        assert_eq!(scope_client_filter(&me, None).unwrap(), Some(me.id));
        assert_eq!(scope_client_filter(&me, Some(me.id)).unwrap(), Some(me.id));
        assert!(scope_client_filter(&me, Some(Uuid::new_v4())).is_err());
    }

    #[test]
    fn admin_list_uses_requested_filter() {
        let admin = user(Role::Admin);
        let other = Uuid::new_v4();
        assert_eq!(scope_client_filter(&admin, None).unwrap(), None);
        assert_eq!(scope_client_filter(&admin, Some(other)).unwrap(), Some(other));
    }

    #[test]
    fn anonymous_and_clients_only_see_published() {
        let client = user(Role::Client);
        assert_eq!(published_filter(None, Some(false)), Some(true));
        assert_eq!(published_filter(Some(&client), None), Some(true));

        let admin = user(Role::Admin);
        assert_eq!(published_filter(Some(&admin), None), None);
        assert_eq!(published_filter(Some(&admin), Some(false)), Some(false));
    }
}
