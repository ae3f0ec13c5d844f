//! Advisory pre-delete and pre-insert lookups.
//!
//! Clients call these before deleting a pet or an inventory batch, or before
//! booking an appointment. Nothing here guards the write itself.

use std::sync::Arc;

use serde_json::Value;
use uuid::Uuid;

use crate::domain::Table;
use crate::errors::{AppError, AppResult};
use crate::infra::{Query, QueryResult, TableStore};

/// Which dependency to look for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CascadeCheck {
    /// Vaccination records referencing a pet.
    VaccinationPet { pet_id: i64 },
    /// Distribution records drawing from an inventory batch.
    DistributedInventory { inventory_id: i64 },
    /// Remaining quantity of an inventory batch.
    VaccineInventory { inventory_id: i64 },
}

impl CascadeCheck {
    /// Build a check from the `type` discriminator and its id parameter.
    pub fn parse(kind: &str, pet_id: Option<i64>, inventory_id: Option<i64>) -> AppResult<Self> {
        let require = |id: Option<i64>, name: &str| {
            id.ok_or_else(|| AppError::bad_request(format!("{} is required", name)))
        };
        match kind {
            "vaccination-pet" => Ok(CascadeCheck::VaccinationPet {
                pet_id: require(pet_id, "pet_id")?,
            }),
            "distributed-inventory" => Ok(CascadeCheck::DistributedInventory {
                inventory_id: require(inventory_id, "inventory_id")?,
            }),
            "vaccine-inventory" => Ok(CascadeCheck::VaccineInventory {
                inventory_id: require(inventory_id, "inventory_id")?,
            }),
            _ => Err(AppError::bad_request("Invalid type")),
        }
    }

    fn table_and_query(&self) -> (Table, Query) {
        match *self {
            CascadeCheck::VaccinationPet { pet_id } => (
                Table::VaccinationRecords,
                Query::new().select("vaccine_id").eq("pet_id", pet_id),
            ),
            CascadeCheck::DistributedInventory { inventory_id } => (
                Table::DistributedVaccines,
                Query::new()
                    .select("id, num_vaccines")
                    .eq("inventory_id", inventory_id),
            ),
            CascadeCheck::VaccineInventory { inventory_id } => (
                Table::VaccineInventory,
                Query::new().select("id, remaining_qty").eq("id", inventory_id),
            ),
        }
    }
}

pub struct ReferenceChecks {
    tables: Arc<dyn TableStore>,
}

impl ReferenceChecks {
    pub fn new(tables: Arc<dyn TableStore>) -> Self {
        Self { tables }
    }

    /// Rows found by the check; empty means nothing depends on the target.
    pub async fn run(&self, check: CascadeCheck) -> AppResult<Vec<Value>> {
        let (table, query) = check.table_and_query();
        let rows = self.tables.select(table, query).await?.into_rows();
        tracing::debug!(check = ?check, matches = rows.len(), "Cascade check");
        Ok(rows)
    }

    /// Existing appointments for the same owner, pet and schedule.
    pub async fn existing_appointments(
        &self,
        owner_id: Uuid,
        pet_id: i64,
        vaccine_sched_id: i64,
    ) -> AppResult<QueryResult> {
        self.tables
            .select(
                Table::AppointmentRecords,
                Query::new()
                    .select("id")
                    .eq("vaccine_sched_id", vaccine_sched_id)
                    .eq("owner_id", owner_id)
                    .eq("pet_id", pet_id),
            )
            .await
    }
}
