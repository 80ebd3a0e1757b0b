use chrono::NaiveDateTime;
use diesel::prelude::*;

use crate::domain::types::{Capacity, CompanyId, TypeConstraintError, VenueName};
use crate::domain::venue::{
    NewVenue as DomainNewVenue, Venue as DomainVenue, VenuePatch as DomainVenuePatch,
};
use crate::models::touch;

/// Diesel model representing the `venues` table.
#[derive(Debug, Clone, Identifiable, Queryable, Selectable)]
#[diesel(table_name = crate::schema::venues)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct Venue {
    pub id: i32,
    pub company_id: Option<i32>,
    pub name: String,
    pub address: Option<String>,
    pub city: Option<String>,
    pub capacity: i32,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

#[derive(Debug, Insertable)]
#[diesel(table_name = crate::schema::venues)]
pub struct NewVenue {
    pub company_id: Option<i32>,
    pub name: String,
    pub address: Option<String>,
    pub city: Option<String>,
    pub capacity: i32,
}

#[derive(Debug, AsChangeset)]
#[diesel(table_name = crate::schema::venues)]
pub struct VenueChangeset {
    pub company_id: Option<Option<i32>>,
    pub name: Option<String>,
    pub address: Option<Option<String>>,
    pub city: Option<Option<String>>,
    pub capacity: Option<i32>,
    pub updated_at: NaiveDateTime,
}

impl TryFrom<Venue> for DomainVenue {
    type Error = TypeConstraintError;

    fn try_from(venue: Venue) -> Result<Self, Self::Error> {
        Ok(Self {
            id: venue.id.try_into()?,
            company_id: venue.company_id.map(CompanyId::new).transpose()?,
            name: VenueName::new(venue.name)?,
            address: venue.address,
            city: venue.city,
            capacity: Capacity::new(venue.capacity)?,
            created_at: venue.created_at,
            updated_at: venue.updated_at,
        })
    }
}

impl From<&DomainNewVenue> for NewVenue {
    fn from(venue: &DomainNewVenue) -> Self {
        Self {
            company_id: venue.company_id.map(CompanyId::get),
            name: venue.name.to_string(),
            address: venue.address.clone(),
            city: venue.city.clone(),
            capacity: venue.capacity.get(),
        }
    }
}

impl From<&DomainVenuePatch> for VenueChangeset {
    fn from(patch: &DomainVenuePatch) -> Self {
        Self {
            company_id: patch.company_id.map(|id| id.map(CompanyId::get)),
            name: patch.name.as_ref().map(ToString::to_string),
            address: patch.address.clone(),
            city: patch.city.clone(),
            capacity: patch.capacity.map(Capacity::get),
            updated_at: touch(),
        }
    }
}
