use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::domain::record::Record;
use crate::domain::types::{Email, PartyId, PartyKind, PartyName};

/// A client or supplier ("entidade") the business deals with.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Party {
    pub id: PartyId,
    pub kind: PartyKind,
    pub name: PartyName,
    /// CPF/CNPJ or foreign document number.
    pub document: Option<String>,
    pub email: Option<Email>,
    pub phone: Option<String>,
    pub notes: Option<String>,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

impl Party {
    pub fn is_client(&self) -> bool {
        matches!(self.kind, PartyKind::Client | PartyKind::Both)
    }

    pub fn is_supplier(&self) -> bool {
        matches!(self.kind, PartyKind::Supplier | PartyKind::Both)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct NewParty {
    pub kind: PartyKind,
    pub name: PartyName,
    pub document: Option<String>,
    pub email: Option<Email>,
    pub phone: Option<String>,
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct PartyPatch {
    pub kind: Option<PartyKind>,
    pub name: Option<PartyName>,
    pub document: Option<Option<String>>,
    pub email: Option<Option<Email>>,
    pub phone: Option<Option<String>>,
    pub notes: Option<Option<String>>,
}

impl Record for Party {
    type Id = PartyId;
    type New = NewParty;
    type Patch = PartyPatch;

    const ENTITY: &'static str = "party";

    fn id(&self) -> PartyId {
        self.id
    }

    fn apply_patch(&mut self, patch: &PartyPatch) {
        if let Some(kind) = patch.kind {
            self.kind = kind;
        }
        if let Some(name) = &patch.name {
            self.name = name.clone();
        }
        if let Some(document) = &patch.document {
            self.document = document.clone();
        }
        if let Some(email) = &patch.email {
            self.email = email.clone();
        }
        if let Some(phone) = &patch.phone {
            self.phone = phone.clone();
        }
        if let Some(notes) = &patch.notes {
            self.notes = notes.clone();
        }
    }
}
