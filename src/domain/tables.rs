//! Tables and views exposed by the relational store.

/// Every relation the API reads or writes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Table {
    PersonnelProfiles,
    PetOwnerProfiles,
    PetRecords,
    VaccinationRecords,
    VaccineInventory,
    VaccinationSchedule,
    DistributedVaccines,
    AppointmentRecords,
    AdminNotifications,
    // Views
    ViewCompleteAppointmentDetails,
    ViewCompleteVaccinationDetails,
    ViewVaccinationRecordsEachBarangay,
    ViewPetRecordsWithOwners,
    ViewPetRecordsForVaccination,
}

impl Table {
    pub fn as_str(&self) -> &'static str {
        match self {
            Table::PersonnelProfiles => "PersonnelProfiles",
            Table::PetOwnerProfiles => "PetOwnerProfiles",
            Table::PetRecords => "PetRecords",
            Table::VaccinationRecords => "VaccinationRecords",
            Table::VaccineInventory => "VaccineInventory",
            Table::VaccinationSchedule => "VaccinationSchedule",
            Table::DistributedVaccines => "DistributedVaccines",
            Table::AppointmentRecords => "AppointmentRecords",
            Table::AdminNotifications => "AdminNotifications",
            Table::ViewCompleteAppointmentDetails => "ViewCompleteAppointmentDetails",
            Table::ViewCompleteVaccinationDetails => "ViewCompleteVaccinationDetails",
            Table::ViewVaccinationRecordsEachBarangay => "ViewVaccinationRecordsEachBarangay",
            Table::ViewPetRecordsWithOwners => "ViewPetRecordsWithOwners",
            Table::ViewPetRecordsForVaccination => "ViewPetRecordsForVaccination",
        }
    }
}

impl std::fmt::Display for Table {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
