use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};
use utoipa::ToSchema;

/// Authorization role carried in the JWT `roles` claim.
#[derive(
    Debug,
    Clone,
    Copy,
    Default,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    ToSchema,
    Display,
    EnumString,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum Role {
    Admin,
    Manager,
    #[default]
    User,
}

impl Role {
    /// Admins and managers run the restaurant.
    pub fn is_staff(&self) -> bool {
        matches!(self, Role::Admin | Role::Manager)
    }
}
