use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::domain::record::{Parented, Record};
use crate::domain::types::{Capacity, CompanyId, VenueId, VenueName};

/// A physical place where projects take place.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Venue {
    pub id: VenueId,
    pub company_id: Option<CompanyId>,
    pub name: VenueName,
    pub address: Option<String>,
    pub city: Option<String>,
    pub capacity: Capacity,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct NewVenue {
    pub company_id: Option<CompanyId>,
    pub name: VenueName,
    pub address: Option<String>,
    pub city: Option<String>,
    pub capacity: Capacity,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct VenuePatch {
    pub company_id: Option<Option<CompanyId>>,
    pub name: Option<VenueName>,
    pub address: Option<Option<String>>,
    pub city: Option<Option<String>>,
    pub capacity: Option<Capacity>,
}

impl Record for Venue {
    type Id = VenueId;
    type New = NewVenue;
    type Patch = VenuePatch;

    const ENTITY: &'static str = "venue";

    fn id(&self) -> VenueId {
        self.id
    }

    fn apply_patch(&mut self, patch: &VenuePatch) {
        if let Some(company_id) = patch.company_id {
            self.company_id = company_id;
        }
        if let Some(name) = &patch.name {
            self.name = name.clone();
        }
        if let Some(address) = &patch.address {
            self.address = address.clone();
        }
        if let Some(city) = &patch.city {
            self.city = city.clone();
        }
        if let Some(capacity) = patch.capacity {
            self.capacity = capacity;
        }
    }
}

impl Parented for Venue {
    type ParentId = CompanyId;

    fn parent_id(&self) -> Option<CompanyId> {
        self.company_id
    }
}
