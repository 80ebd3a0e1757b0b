use chrono::NaiveDateTime;
use diesel::prelude::*;

use crate::domain::party::{
    NewParty as DomainNewParty, Party as DomainParty, PartyPatch as DomainPartyPatch,
};
use crate::domain::types::{Email, PartyKind, PartyName, TypeConstraintError};
use crate::models::touch;

/// Diesel model representing the `parties` table.
#[derive(Debug, Clone, Identifiable, Queryable, Selectable)]
#[diesel(table_name = crate::schema::parties)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct Party {
    pub id: i32,
    pub kind: String,
    pub name: String,
    pub document: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub notes: Option<String>,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

#[derive(Debug, Insertable)]
#[diesel(table_name = crate::schema::parties)]
pub struct NewParty {
    pub kind: String,
    pub name: String,
    pub document: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub notes: Option<String>,
}

#[derive(Debug, AsChangeset)]
#[diesel(table_name = crate::schema::parties)]
pub struct PartyChangeset {
    pub kind: Option<String>,
    pub name: Option<String>,
    pub document: Option<Option<String>>,
    pub email: Option<Option<String>>,
    pub phone: Option<Option<String>>,
    pub notes: Option<Option<String>>,
    pub updated_at: NaiveDateTime,
}

impl TryFrom<Party> for DomainParty {
    type Error = TypeConstraintError;

    fn try_from(party: Party) -> Result<Self, Self::Error> {
        Ok(Self {
            id: party.id.try_into()?,
            kind: PartyKind::try_from(party.kind)?,
            name: PartyName::new(party.name)?,
            document: party.document,
            email: party.email.map(Email::new).transpose()?,
            phone: party.phone,
            notes: party.notes,
            created_at: party.created_at,
            updated_at: party.updated_at,
        })
    }
}

impl From<&DomainNewParty> for NewParty {
    fn from(party: &DomainNewParty) -> Self {
        Self {
            kind: party.kind.into(),
            name: party.name.to_string(),
            document: party.document.clone(),
            email: party.email.as_ref().map(ToString::to_string),
            phone: party.phone.clone(),
            notes: party.notes.clone(),
        }
    }
}

impl From<&DomainPartyPatch> for PartyChangeset {
    fn from(patch: &DomainPartyPatch) -> Self {
        Self {
            kind: patch.kind.map(String::from),
            name: patch.name.as_ref().map(ToString::to_string),
            document: patch.document.clone(),
            email: patch
                .email
                .as_ref()
                .map(|email| email.as_ref().map(ToString::to_string)),
            phone: patch.phone.clone(),
            notes: patch.notes.clone(),
            updated_at: touch(),
        }
    }
}
