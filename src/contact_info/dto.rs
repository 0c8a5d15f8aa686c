use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use uuid::Uuid;
use validator::Validate;

use super::repo_types::ContactInfoRow;

/// Every field is optional. Absent fields keep their stored value, `null` clears it.
#[derive(Debug, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct ContactInfoRequest {
    #[serde(default, deserialize_with = "crate::patch::nullable")]
    #[validate(length(max = 30))]
    pub phone: Option<Option<String>>,
    #[serde(default, deserialize_with = "crate::patch::nullable")]
    #[validate(email(message = "Invalid email"))]
    pub email: Option<Option<String>>,
    #[serde(default, deserialize_with = "crate::patch::nullable")]
    #[validate(length(max = 500))]
    pub address: Option<Option<String>>,
    #[serde(default, deserialize_with = "crate::patch::nullable")]
    #[validate(length(max = 500))]
    pub facebook: Option<Option<String>>,
    #[serde(default, deserialize_with = "crate::patch::nullable")]
    #[validate(length(max = 500))]
    pub instagram: Option<Option<String>>,
    #[serde(default, deserialize_with = "crate::patch::nullable")]
    #[validate(length(max = 500))]
    pub zalo: Option<Option<String>>,
    #[serde(default, deserialize_with = "crate::patch::nullable")]
    #[validate(length(max = 200))]
    pub working_hours: Option<Option<String>>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ContactInfoResponse {
    pub id: Uuid,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub address: Option<String>,
    pub facebook: Option<String>,
    pub instagram: Option<String>,
    pub zalo: Option<String>,
    pub working_hours: Option<String>,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
}

impl From<ContactInfoRow> for ContactInfoResponse {
    fn from(r: ContactInfoRow) -> Self {
        Self {
            id: r.id,
            phone: r.phone,
            email: r.email,
            address: r.address,
            facebook: r.facebook,
            instagram: r.instagram,
            zalo: r.zalo,
            working_hours: r.working_hours,
            created_at: r.created_at,
            updated_at: r.updated_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn email_is_checked_only_when_present() {
        assert!(ContactInfoRequest::default().validate().is_ok());
        let bad = ContactInfoRequest {
            email: Some(Some("not-an-email".into())),
            ..Default::default()
        };
        assert!(bad.validate().is_err());

        let cleared: ContactInfoRequest =
            serde_json::from_value(serde_json::json!({ "email": null })).unwrap();
        assert_eq!(cleared.email, Some(None));
        assert!(cleared.validate().is_ok());
    }
}
