//! Forms for projects and contracts.

use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::domain::contract::{Contract, ContractPatch, NewContract};
use crate::domain::project::{NewProject, Project, ProjectPatch};
use crate::domain::types::{
    CompanyId, ContractNumber, ContractStatus, Money, PartyId, ProjectId, ProjectName,
    ProjectStatus, VenueId,
};
use crate::forms::{
    FieldCheck, FormError, RelationChoice, blank_to_none, date_input, money_input, parse_choice,
    parse_date, parse_optional_date, record_form,
};

#[derive(Debug, Clone, Default, Deserialize, Serialize, Validate)]
pub struct ProjectForm {
    pub company_id: RelationChoice,
    pub venue_id: RelationChoice,
    pub client_id: RelationChoice,
    #[validate(length(min = 1, max = 255))]
    pub name: String,
    pub description: Option<String>,
    pub status: String,
    pub start_date: String,
    pub end_date: String,
    #[serde(default)]
    pub budget: String,
}

impl From<&Project> for ProjectForm {
    fn from(project: &Project) -> Self {
        Self {
            company_id: RelationChoice::from_optional(project.company_id),
            venue_id: RelationChoice::from_optional(project.venue_id),
            client_id: RelationChoice::from_optional(project.client_id),
            name: project.name.to_string(),
            description: project.description.clone(),
            status: project.status.to_string(),
            start_date: date_input(project.start_date),
            end_date: date_input(project.end_date),
            budget: money_input(project.budget),
        }
    }
}

impl ProjectForm {
    pub fn into_new(self) -> Result<NewProject, FormError> {
        let mut check = FieldCheck::validate(&self);
        let company_id = check.take("company_id", self.company_id.optional(CompanyId::new));
        let venue_id = check.take("venue_id", self.venue_id.optional(VenueId::new));
        let client_id = check.take("client_id", self.client_id.optional(PartyId::new));
        let name = check.take("name", ProjectName::new(&self.name));
        let status = check.take("status", parse_choice::<ProjectStatus>(&self.status));
        let start_date = check.take("start_date", parse_date(&self.start_date));
        let end_date = check.take("end_date", parse_date(&self.end_date));
        let budget = if self.budget.trim().is_empty() {
            Some(Money::ZERO)
        } else {
            check.take("budget", Money::parse_non_negative(&self.budget, "budget"))
        };
        let (
            Some(company_id),
            Some(venue_id),
            Some(client_id),
            Some(name),
            Some(status),
            Some(start_date),
            Some(end_date),
            Some(budget),
        ) = (
            company_id, venue_id, client_id, name, status, start_date, end_date, budget,
        )
        else {
            return Err(check.into_error());
        };
        if end_date < start_date {
            check.push("end_date", "end date must not be before start date");
        }
        check.finish()?;
        Ok(NewProject {
            company_id,
            venue_id,
            client_id,
            name,
            description: blank_to_none(self.description.as_deref()),
            status,
            start_date,
            end_date,
            budget,
        })
    }

    pub fn into_patch(self) -> Result<ProjectPatch, FormError> {
        let new = self.into_new()?;
        Ok(ProjectPatch {
            company_id: Some(new.company_id),
            venue_id: Some(new.venue_id),
            client_id: Some(new.client_id),
            name: Some(new.name),
            description: Some(new.description),
            status: Some(new.status),
            start_date: Some(new.start_date),
            end_date: Some(new.end_date),
            budget: Some(new.budget),
        })
    }
}

#[derive(Debug, Clone, Default, Deserialize, Serialize, Validate)]
pub struct ContractForm {
    pub project_id: RelationChoice,
    pub party_id: RelationChoice,
    #[validate(length(min = 1, max = 64))]
    pub number: String,
    pub description: Option<String>,
    pub value: String,
    pub status: String,
    pub start_date: String,
    pub end_date: Option<String>,
}

impl From<&Contract> for ContractForm {
    fn from(contract: &Contract) -> Self {
        Self {
            project_id: RelationChoice::Some(contract.project_id.get()),
            party_id: RelationChoice::Some(contract.party_id.get()),
            number: contract.number.to_string(),
            description: contract.description.clone(),
            value: money_input(contract.value),
            status: contract.status.to_string(),
            start_date: date_input(contract.start_date),
            end_date: contract.end_date.map(date_input),
        }
    }
}

impl ContractForm {
    pub fn into_new(self) -> Result<NewContract, FormError> {
        let mut check = FieldCheck::validate(&self);
        let project_id = check.take("project_id", self.project_id.required(ProjectId::new));
        let party_id = check.take("party_id", self.party_id.required(PartyId::new));
        let number = check.take("number", ContractNumber::new(&self.number));
        let value = check.take("value", Money::parse_non_negative(&self.value, "value"));
        let status = check.take("status", parse_choice::<ContractStatus>(&self.status));
        let start_date = check.take("start_date", parse_date(&self.start_date));
        let end_date = check.take("end_date", parse_optional_date(self.end_date.as_deref()));
        let (
            Some(project_id),
            Some(party_id),
            Some(number),
            Some(value),
            Some(status),
            Some(start_date),
            Some(end_date),
        ) = (
            project_id, party_id, number, value, status, start_date, end_date,
        )
        else {
            return Err(check.into_error());
        };
        if end_date.is_some_and(|end| end < start_date) {
            check.push("end_date", "end date must not be before start date");
        }
        check.finish()?;
        Ok(NewContract {
            project_id,
            party_id,
            number,
            description: blank_to_none(self.description.as_deref()),
            value,
            status,
            start_date,
            end_date,
        })
    }

    pub fn into_patch(self) -> Result<ContractPatch, FormError> {
        let new = self.into_new()?;
        Ok(ContractPatch {
            project_id: Some(new.project_id),
            party_id: Some(new.party_id),
            number: Some(new.number),
            description: Some(new.description),
            value: Some(new.value),
            status: Some(new.status),
            start_date: Some(new.start_date),
            end_date: Some(new.end_date),
        })
    }
}

record_form!(ProjectForm => Project);
record_form!(ContractForm => Contract);

#[cfg(test)]
mod tests {
    use super::*;

    fn project_form() -> ProjectForm {
        ProjectForm {
            company_id: RelationChoice::Some(1),
            venue_id: RelationChoice::None,
            client_id: RelationChoice::None,
            name: "Festival de Verão".into(),
            description: Some("".into()),
            status: "planning".into(),
            start_date: "2025-01-10".into(),
            end_date: "2025-01-12".into(),
            budget: "150.000,00".into(),
        }
    }

    #[test]
    fn valid_project_form_maps_to_new_project() {
        let new = project_form().into_new().unwrap();
        assert_eq!(new.company_id, Some(CompanyId::new(1).unwrap()));
        assert_eq!(new.venue_id, None);
        assert_eq!(new.description, None);
        assert_eq!(new.budget, Money::from_cents(15_000_000));
    }

    #[test]
    fn project_end_before_start_is_rejected() {
        let form = ProjectForm {
            end_date: "2025-01-09".into(),
            ..project_form()
        };
        let err = form.into_new().unwrap_err();
        assert!(err.field_errors().unwrap().contains_key("end_date"));
    }

    #[test]
    fn unknown_status_is_rejected() {
        let form = ProjectForm {
            status: "archived".into(),
            ..project_form()
        };
        let err = form.into_new().unwrap_err();
        assert!(err.field_errors().unwrap().contains_key("status"));
    }

    #[test]
    fn contract_requires_project_and_party() {
        let form = ContractForm {
            project_id: RelationChoice::None,
            party_id: RelationChoice::Unselected,
            number: "CT-001".into(),
            value: "10000".into(),
            status: "draft".into(),
            start_date: "2025-01-01".into(),
            ..ContractForm::default()
        };
        let err = form.into_new().unwrap_err();
        let fields = err.field_errors().unwrap();
        assert!(fields.contains_key("project_id"));
        assert!(fields.contains_key("party_id"));
    }

    #[test]
    fn contract_patch_clears_end_date() {
        let form = ContractForm {
            project_id: RelationChoice::Some(1),
            party_id: RelationChoice::Some(2),
            number: "CT-001".into(),
            value: "10000".into(),
            status: "active".into(),
            start_date: "2025-01-01".into(),
            end_date: Some(" ".into()),
            ..ContractForm::default()
        };
        let patch = form.into_patch().unwrap();
        assert_eq!(patch.end_date, Some(None));
        assert_eq!(patch.value, Some(Money::from_cents(1_000_000)));
    }
}
