//! OpenAPI documentation configuration.
//!
//! Provides Swagger UI for API exploration and testing.

use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};

use crate::api::handlers::{
    admin_handler, appointment_handler, auth_handler, cascade_check_handler,
    distributed_vaccine_handler, notification_handler, overview_handler, personnel_handler,
    pet_owner_handler, pet_record_handler, register_handler, vaccination_record_handler,
    vaccination_schedule_handler, vaccine_inventory_handler,
};
use crate::domain::{PersonnelFields, PersonnelProfile, PetOwnerFields, PetOwnerProfile, Role};
use crate::infra::QueryResult;
use crate::services::statistics::VaccinationStats;
use crate::services::ProvisionedAccount;
use crate::types::{DataEnvelope, DistributedPage, PetOwnerPage, SuccessResponse};

/// OpenAPI documentation for the pet vaccination API
#[derive(OpenApi)]
#[openapi(
    info(
        title = "PetVac API",
        version = "0.1.0",
        description = "Pet vaccination records for the admin, personnel and pet-owner portals",
        license(name = "MIT", url = "https://opensource.org/licenses/MIT")
    ),
    servers(
        (url = "http://localhost:3000", description = "Local development server")
    ),
    paths(
        // Session and credentials
        auth_handler::get_role,
        auth_handler::get_user_email,
        auth_handler::update_credentials,
        register_handler::register_pet_owner,
        // Admin console
        admin_handler::check_role,
        admin_handler::update_personnel_by_body,
        admin_handler::delete_personnel_by_body,
        // Accounts
        pet_owner_handler::list_pet_owners,
        pet_owner_handler::filter_pet_owners,
        pet_owner_handler::search_pet_owners,
        pet_owner_handler::create_pet_owner,
        pet_owner_handler::get_pet_owner,
        pet_owner_handler::update_pet_owner,
        pet_owner_handler::delete_pet_owner,
        personnel_handler::list_personnel,
        personnel_handler::create_personnel,
        personnel_handler::update_personnel,
        personnel_handler::delete_personnel,
        // Records
        appointment_handler::list_appointments,
        appointment_handler::create_appointment,
        appointment_handler::update_appointment_status,
        appointment_handler::delete_appointment,
        vaccination_record_handler::get_vaccination_records,
        vaccination_record_handler::create_vaccination_record,
        vaccine_inventory_handler::list_inventory,
        vaccine_inventory_handler::create_inventory,
        vaccine_inventory_handler::update_inventory,
        vaccine_inventory_handler::delete_inventory,
        vaccination_schedule_handler::list_schedules,
        vaccination_schedule_handler::create_schedule,
        vaccination_schedule_handler::update_schedule,
        vaccination_schedule_handler::delete_schedule,
        distributed_vaccine_handler::get_distributions,
        distributed_vaccine_handler::create_distribution,
        distributed_vaccine_handler::update_distributions,
        notification_handler::list_notifications,
        notification_handler::create_notification,
        notification_handler::delete_notifications,
        cascade_check_handler::run_cascade_check,
        pet_record_handler::list_pet_records,
        pet_record_handler::create_pet_record,
        pet_record_handler::update_pet_record,
        pet_record_handler::delete_pet_record,
        pet_record_handler::pets_by_owner,
        pet_record_handler::pets_for_vaccination,
        overview_handler::get_overview,
    ),
    components(
        schemas(
            // Domain types
            Role,
            PersonnelProfile,
            PetOwnerProfile,
            PersonnelFields,
            PetOwnerFields,
            ProvisionedAccount,
            VaccinationStats,
            // Envelopes
            QueryResult,
            DataEnvelope,
            SuccessResponse,
            PetOwnerPage,
            DistributedPage,
            // Handler types
            auth_handler::RoleUser,
            auth_handler::RoleResponse,
            auth_handler::EmailResponse,
            auth_handler::UpdateCredentialsRequest,
            admin_handler::CheckRoleRequest,
            admin_handler::CheckRoleResponse,
            admin_handler::UpdatePersonnelRequest,
            admin_handler::AccountIdRequest,
            pet_owner_handler::PetOwnerAccountRequest,
            personnel_handler::PersonnelAccountRequest,
            appointment_handler::AppointmentStatusRequest,
            distributed_vaccine_handler::DistributedUpdateRequest,
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "Auth", description = "Caller role and credential changes"),
        (name = "Registration", description = "Pet owner self-registration"),
        (name = "Admin", description = "Admin console account operations"),
        (name = "Pet Owners", description = "Pet owner accounts"),
        (name = "Personnel", description = "Personnel accounts"),
        (name = "Appointments", description = "Vaccination appointments"),
        (name = "Vaccination Records", description = "Administered vaccinations and dashboard stats"),
        (name = "Vaccine Inventory", description = "Vaccine stock batches"),
        (name = "Vaccination Schedule", description = "Vaccination drives"),
        (name = "Distributed Vaccines", description = "Vaccines handed out per barangay"),
        (name = "Notifications", description = "Admin notifications"),
        (name = "Cascade Checks", description = "Dependency lookups before deletes"),
        (name = "Pet Records", description = "Registered pets"),
        (name = "Overview", description = "Dashboard counts")
    )
)]
pub struct ApiDoc;

/// Security scheme modifier for bearer access tokens
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .description(Some("Access token issued by the identity service"))
                        .build(),
                ),
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_document_lists_resource_paths() {
        let doc = ApiDoc::openapi();
        for path in [
            "/api/auth/role",
            "/api/register-pet-owner",
            "/api/pet-owners/{id}",
            "/api/cascade-checks",
            "/api/pet-records/for-vaccination",
        ] {
            assert!(doc.paths.paths.contains_key(path), "missing {}", path);
        }
        assert!(doc
            .components
            .as_ref()
            .is_some_and(|c| c.security_schemes.contains_key("bearer_auth")));
    }
}
