use chrono::NaiveDateTime;
use diesel::prelude::*;

use crate::domain::company::{
    Company as DomainCompany, CompanyPatch as DomainCompanyPatch, NewCompany as DomainNewCompany,
};
use crate::domain::types::{CompanyName, Email, TaxId, TypeConstraintError};
use crate::models::touch;

/// Diesel model representing the `companies` table.
#[derive(Debug, Clone, Identifiable, Queryable, Selectable)]
#[diesel(table_name = crate::schema::companies)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct Company {
    pub id: i32,
    pub name: String,
    pub tax_id: String,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

#[derive(Debug, Insertable)]
#[diesel(table_name = crate::schema::companies)]
pub struct NewCompany {
    pub name: String,
    pub tax_id: String,
    pub email: Option<String>,
    pub phone: Option<String>,
}

#[derive(Debug, AsChangeset)]
#[diesel(table_name = crate::schema::companies)]
pub struct CompanyChangeset {
    pub name: Option<String>,
    pub tax_id: Option<String>,
    pub email: Option<Option<String>>,
    pub phone: Option<Option<String>>,
    pub updated_at: NaiveDateTime,
}

impl TryFrom<Company> for DomainCompany {
    type Error = TypeConstraintError;

    fn try_from(company: Company) -> Result<Self, Self::Error> {
        Ok(Self {
            id: company.id.try_into()?,
            name: CompanyName::new(company.name)?,
            tax_id: TaxId::new(company.tax_id)?,
            email: company.email.map(Email::new).transpose()?,
            phone: company.phone,
            created_at: company.created_at,
            updated_at: company.updated_at,
        })
    }
}

impl From<&DomainNewCompany> for NewCompany {
    fn from(company: &DomainNewCompany) -> Self {
        Self {
            name: company.name.to_string(),
            tax_id: company.tax_id.to_string(),
            email: company.email.as_ref().map(ToString::to_string),
            phone: company.phone.clone(),
        }
    }
}

impl From<&DomainCompanyPatch> for CompanyChangeset {
    fn from(patch: &DomainCompanyPatch) -> Self {
        Self {
            name: patch.name.as_ref().map(ToString::to_string),
            tax_id: patch.tax_id.as_ref().map(ToString::to_string),
            email: patch
                .email
                .as_ref()
                .map(|email| email.as_ref().map(ToString::to_string)),
            phone: patch.phone.clone(),
            updated_at: touch(),
        }
    }
}
