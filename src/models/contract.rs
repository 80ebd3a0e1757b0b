use chrono::{NaiveDate, NaiveDateTime};
use diesel::prelude::*;

use crate::domain::contract::{
    Contract as DomainContract, ContractPatch as DomainContractPatch, ContractRef,
    NewContract as DomainNewContract,
};
use crate::domain::types::{
    ContractNumber, ContractStatus, Money, PartyId, ProjectId, TypeConstraintError,
};
use crate::models::touch;

/// Diesel model representing the `contracts` table.
#[derive(Debug, Clone, Identifiable, Queryable, Selectable)]
#[diesel(table_name = crate::schema::contracts)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct Contract {
    pub id: i32,
    pub project_id: i32,
    pub party_id: i32,
    pub number: String,
    pub description: Option<String>,
    pub value_cents: i64,
    pub status: String,
    pub start_date: NaiveDate,
    pub end_date: Option<NaiveDate>,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

#[derive(Debug, Insertable)]
#[diesel(table_name = crate::schema::contracts)]
pub struct NewContract {
    pub project_id: i32,
    pub party_id: i32,
    pub number: String,
    pub description: Option<String>,
    pub value_cents: i64,
    pub status: String,
    pub start_date: NaiveDate,
    pub end_date: Option<NaiveDate>,
}

#[derive(Debug, AsChangeset)]
#[diesel(table_name = crate::schema::contracts)]
pub struct ContractChangeset {
    pub project_id: Option<i32>,
    pub party_id: Option<i32>,
    pub number: Option<String>,
    pub description: Option<Option<String>>,
    pub value_cents: Option<i64>,
    pub status: Option<String>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<Option<NaiveDate>>,
    pub updated_at: NaiveDateTime,
}

impl TryFrom<Contract> for DomainContract {
    type Error = TypeConstraintError;

    fn try_from(contract: Contract) -> Result<Self, Self::Error> {
        Ok(Self {
            id: contract.id.try_into()?,
            project_id: ProjectId::new(contract.project_id)?,
            party_id: PartyId::new(contract.party_id)?,
            number: ContractNumber::new(contract.number)?,
            description: contract.description,
            value: Money::from_cents(contract.value_cents),
            status: ContractStatus::try_from(contract.status)?,
            start_date: contract.start_date,
            end_date: contract.end_date,
            created_at: contract.created_at,
            updated_at: contract.updated_at,
        })
    }
}

/// Builds the embedded view from an `(id, number)` pair selected by a join.
pub fn contract_ref(id: i32, number: String) -> Result<ContractRef, TypeConstraintError> {
    Ok(ContractRef {
        id: id.try_into()?,
        number: ContractNumber::new(number)?,
    })
}

impl From<&DomainNewContract> for NewContract {
    fn from(contract: &DomainNewContract) -> Self {
        Self {
            project_id: contract.project_id.get(),
            party_id: contract.party_id.get(),
            number: contract.number.to_string(),
            description: contract.description.clone(),
            value_cents: contract.value.cents(),
            status: contract.status.into(),
            start_date: contract.start_date,
            end_date: contract.end_date,
        }
    }
}

impl From<&DomainContractPatch> for ContractChangeset {
    fn from(patch: &DomainContractPatch) -> Self {
        Self {
            project_id: patch.project_id.map(ProjectId::get),
            party_id: patch.party_id.map(PartyId::get),
            number: patch.number.as_ref().map(ToString::to_string),
            description: patch.description.clone(),
            value_cents: patch.value.map(Money::cents),
            status: patch.status.map(String::from),
            start_date: patch.start_date,
            end_date: patch.end_date,
            updated_at: touch(),
        }
    }
}
