//! Forms for companies, venues and parties.

use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::domain::company::{Company, CompanyPatch, NewCompany};
use crate::domain::party::{NewParty, Party, PartyPatch};
use crate::domain::types::{
    Capacity, CompanyId, CompanyName, PartyKind, PartyName, TaxId, VenueName,
};
use crate::domain::venue::{NewVenue, Venue, VenuePatch};
use crate::forms::{
    FieldCheck, FormError, RelationChoice, blank_to_none, parse_choice, parse_optional_email,
    record_form,
};

#[derive(Debug, Clone, Default, Deserialize, Serialize, Validate)]
pub struct CompanyForm {
    #[validate(length(min = 1, max = 255))]
    pub name: String,
    #[validate(length(min = 1, max = 32))]
    pub tax_id: String,
    pub email: Option<String>,
    pub phone: Option<String>,
}

impl From<&Company> for CompanyForm {
    fn from(company: &Company) -> Self {
        Self {
            name: company.name.to_string(),
            tax_id: company.tax_id.to_string(),
            email: company.email.as_ref().map(ToString::to_string),
            phone: company.phone.clone(),
        }
    }
}

impl CompanyForm {
    pub fn into_new(self) -> Result<NewCompany, FormError> {
        let mut check = FieldCheck::validate(&self);
        let name = check.take("name", CompanyName::new(&self.name));
        let tax_id = check.take("tax_id", TaxId::new(&self.tax_id));
        let email = check.take("email", parse_optional_email(self.email.as_deref()));
        let (Some(name), Some(tax_id), Some(email)) = (name, tax_id, email) else {
            return Err(check.into_error());
        };
        check.finish()?;
        Ok(NewCompany {
            name,
            tax_id,
            email,
            phone: blank_to_none(self.phone.as_deref()),
        })
    }

    pub fn into_patch(self) -> Result<CompanyPatch, FormError> {
        let new = self.into_new()?;
        Ok(CompanyPatch {
            name: Some(new.name),
            tax_id: Some(new.tax_id),
            email: Some(new.email),
            phone: Some(new.phone),
        })
    }
}

#[derive(Debug, Clone, Default, Deserialize, Serialize, Validate)]
pub struct VenueForm {
    pub company_id: RelationChoice,
    #[validate(length(min = 1, max = 255))]
    pub name: String,
    pub address: Option<String>,
    pub city: Option<String>,
    #[validate(range(min = 0, message = "capacity must be zero or greater"))]
    pub capacity: i32,
}

impl From<&Venue> for VenueForm {
    fn from(venue: &Venue) -> Self {
        Self {
            company_id: RelationChoice::from_optional(venue.company_id),
            name: venue.name.to_string(),
            address: venue.address.clone(),
            city: venue.city.clone(),
            capacity: venue.capacity.get(),
        }
    }
}

impl VenueForm {
    pub fn into_new(self) -> Result<NewVenue, FormError> {
        let mut check = FieldCheck::validate(&self);
        let company_id = check.take("company_id", self.company_id.optional(CompanyId::new));
        let name = check.take("name", VenueName::new(&self.name));
        let capacity = check.take("capacity", Capacity::new(self.capacity));
        let (Some(company_id), Some(name), Some(capacity)) = (company_id, name, capacity) else {
            return Err(check.into_error());
        };
        check.finish()?;
        Ok(NewVenue {
            company_id,
            name,
            address: blank_to_none(self.address.as_deref()),
            city: blank_to_none(self.city.as_deref()),
            capacity,
        })
    }

    pub fn into_patch(self) -> Result<VenuePatch, FormError> {
        let new = self.into_new()?;
        Ok(VenuePatch {
            company_id: Some(new.company_id),
            name: Some(new.name),
            address: Some(new.address),
            city: Some(new.city),
            capacity: Some(new.capacity),
        })
    }
}

#[derive(Debug, Clone, Default, Deserialize, Serialize, Validate)]
pub struct PartyForm {
    pub kind: String,
    #[validate(length(min = 1, max = 255))]
    pub name: String,
    pub document: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub notes: Option<String>,
}

impl From<&Party> for PartyForm {
    fn from(party: &Party) -> Self {
        Self {
            kind: party.kind.to_string(),
            name: party.name.to_string(),
            document: party.document.clone(),
            email: party.email.as_ref().map(ToString::to_string),
            phone: party.phone.clone(),
            notes: party.notes.clone(),
        }
    }
}

impl PartyForm {
    pub fn into_new(self) -> Result<NewParty, FormError> {
        let mut check = FieldCheck::validate(&self);
        let kind = check.take("kind", parse_choice::<PartyKind>(&self.kind));
        let name = check.take("name", PartyName::new(&self.name));
        let email = check.take("email", parse_optional_email(self.email.as_deref()));
        let (Some(kind), Some(name), Some(email)) = (kind, name, email) else {
            return Err(check.into_error());
        };
        check.finish()?;
        Ok(NewParty {
            kind,
            name,
            document: blank_to_none(self.document.as_deref()),
            email,
            phone: blank_to_none(self.phone.as_deref()),
            notes: blank_to_none(self.notes.as_deref()),
        })
    }

    pub fn into_patch(self) -> Result<PartyPatch, FormError> {
        let new = self.into_new()?;
        Ok(PartyPatch {
            kind: Some(new.kind),
            name: Some(new.name),
            document: Some(new.document),
            email: Some(new.email),
            phone: Some(new.phone),
            notes: Some(new.notes),
        })
    }
}

record_form!(CompanyForm => Company);
record_form!(VenueForm => Venue);
record_form!(PartyForm => Party);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn company_form_collects_every_field_error() {
        let form = CompanyForm {
            name: " ".into(),
            tax_id: String::new(),
            email: Some("not-an-email".into()),
            phone: None,
        };
        let err = form.into_new().unwrap_err();
        let fields = err.field_errors().unwrap();
        assert!(fields.contains_key("name"));
        assert!(fields.contains_key("tax_id"));
        assert!(fields.contains_key("email"));
    }

    #[test]
    fn blank_optionals_become_none() {
        let form = CompanyForm {
            name: "Arena Eventos".into(),
            tax_id: "12.345.678/0001-90".into(),
            email: Some("  ".into()),
            phone: Some("".into()),
        };
        let new = form.into_new().unwrap();
        assert_eq!(new.email, None);
        assert_eq!(new.phone, None);
    }

    #[test]
    fn venue_requires_explicit_company_choice() {
        let form = VenueForm {
            company_id: RelationChoice::Unselected,
            name: "Teatro".into(),
            capacity: 300,
            ..VenueForm::default()
        };
        let err = form.into_new().unwrap_err();
        assert!(err.field_errors().unwrap().contains_key("company_id"));

        let form = VenueForm {
            company_id: RelationChoice::None,
            name: "Teatro".into(),
            capacity: 300,
            ..VenueForm::default()
        };
        assert_eq!(form.into_new().unwrap().company_id, None);
    }

    #[test]
    fn negative_capacity_is_rejected() {
        let form = VenueForm {
            company_id: RelationChoice::None,
            name: "Teatro".into(),
            capacity: -1,
            ..VenueForm::default()
        };
        let err = form.into_new().unwrap_err();
        assert_eq!(
            err.field_errors().unwrap()["capacity"],
            vec!["capacity must be zero or greater".to_string()]
        );
    }

    #[test]
    fn party_kind_must_come_from_closed_set() {
        let form = PartyForm {
            kind: "partner".into(),
            name: "Som & Luz".into(),
            ..PartyForm::default()
        };
        assert!(form.into_new().is_err());

        let form = PartyForm {
            kind: "supplier".into(),
            name: "Som & Luz".into(),
            ..PartyForm::default()
        };
        assert_eq!(form.into_new().unwrap().kind, PartyKind::Supplier);
    }
}
