use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::domain::record::Record;
use crate::domain::types::{CompanyId, CompanyName, Email, TaxId};

/// A company operating venues and projects.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Company {
    pub id: CompanyId,
    pub name: CompanyName,
    pub tax_id: TaxId,
    pub email: Option<Email>,
    pub phone: Option<String>,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

/// Data required to insert a new [`Company`].
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct NewCompany {
    pub name: CompanyName,
    pub tax_id: TaxId,
    pub email: Option<Email>,
    pub phone: Option<String>,
}

/// Partial update of a [`Company`].
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct CompanyPatch {
    pub name: Option<CompanyName>,
    pub tax_id: Option<TaxId>,
    pub email: Option<Option<Email>>,
    pub phone: Option<Option<String>>,
}

impl Record for Company {
    type Id = CompanyId;
    type New = NewCompany;
    type Patch = CompanyPatch;

    const ENTITY: &'static str = "company";

    fn id(&self) -> CompanyId {
        self.id
    }

    fn apply_patch(&mut self, patch: &CompanyPatch) {
        if let Some(name) = &patch.name {
            self.name = name.clone();
        }
        if let Some(tax_id) = &patch.tax_id {
            self.tax_id = tax_id.clone();
        }
        if let Some(email) = &patch.email {
            self.email = email.clone();
        }
        if let Some(phone) = &patch.phone {
            self.phone = phone.clone();
        }
    }
}
