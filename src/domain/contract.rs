use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

use crate::domain::record::{Parented, Record};
use crate::domain::types::{ContractId, ContractNumber, ContractStatus, Money, PartyId, ProjectId};

/// Agreement between the business and a party within a project.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Contract {
    pub id: ContractId,
    pub project_id: ProjectId,
    pub party_id: PartyId,
    pub number: ContractNumber,
    pub description: Option<String>,
    pub value: Money,
    pub status: ContractStatus,
    pub start_date: NaiveDate,
    pub end_date: Option<NaiveDate>,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct NewContract {
    pub project_id: ProjectId,
    pub party_id: PartyId,
    pub number: ContractNumber,
    pub description: Option<String>,
    pub value: Money,
    pub status: ContractStatus,
    pub start_date: NaiveDate,
    pub end_date: Option<NaiveDate>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct ContractPatch {
    pub project_id: Option<ProjectId>,
    pub party_id: Option<PartyId>,
    pub number: Option<ContractNumber>,
    pub description: Option<Option<String>>,
    pub value: Option<Money>,
    pub status: Option<ContractStatus>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<Option<NaiveDate>>,
}

/// Embedded read-only view of a contract, populated when joined.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ContractRef {
    pub id: ContractId,
    pub number: ContractNumber,
}

impl Record for Contract {
    type Id = ContractId;
    type New = NewContract;
    type Patch = ContractPatch;

    const ENTITY: &'static str = "contract";

    fn id(&self) -> ContractId {
        self.id
    }

    fn apply_patch(&mut self, patch: &ContractPatch) {
        if let Some(project_id) = patch.project_id {
            self.project_id = project_id;
        }
        if let Some(party_id) = patch.party_id {
            self.party_id = party_id;
        }
        if let Some(number) = &patch.number {
            self.number = number.clone();
        }
        if let Some(description) = &patch.description {
            self.description = description.clone();
        }
        if let Some(value) = patch.value {
            self.value = value;
        }
        if let Some(status) = patch.status {
            self.status = status;
        }
        if let Some(start_date) = patch.start_date {
            self.start_date = start_date;
        }
        if let Some(end_date) = patch.end_date {
            self.end_date = end_date;
        }
    }
}

impl Parented for Contract {
    type ParentId = ProjectId;

    fn parent_id(&self) -> Option<ProjectId> {
        Some(self.project_id)
    }
}
