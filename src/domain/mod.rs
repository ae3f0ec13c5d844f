//! Domain layer - accounts, roles and the relations of the record store.
//!
//! Business records (pets, schedules, inventory, appointments...) are passed
//! through as raw JSON rows; only the account model is typed here.

pub mod auth_user;
pub mod profile;
pub mod role;
pub mod tables;

pub use auth_user::{AuthUser, AuthUserUpdate, NewAuthUser};
pub use profile::{
    full_name, NewProfile, PersonnelFields, PersonnelProfile, PetOwnerFields, PetOwnerProfile,
    ProfileKind,
};
pub use role::{ResolvedRole, Role, ADMIN_ONLY, STAFF};
pub use tables::Table;
