use diesel::prelude::*;

use crate::domain::company::Company;
use crate::domain::party::Party;
use crate::domain::types::{CompanyId, PartyId, VenueId};
use crate::domain::venue::Venue;
use crate::models::company::{Company as DbCompany, CompanyChangeset, NewCompany as DbNewCompany};
use crate::models::party::{NewParty as DbNewParty, Party as DbParty, PartyChangeset};
use crate::models::venue::{NewVenue as DbNewVenue, Venue as DbVenue, VenueChangeset};
use crate::repository::{
    DieselRepository, ListQuery, RecordReader, RepositoryError, RepositoryResult, diesel_find,
    diesel_record_writer,
};

impl RecordReader<Company> for DieselRepository {
    fn list_records(&self, _query: &ListQuery) -> RepositoryResult<Vec<Company>> {
        use crate::schema::companies;

        let mut conn = self.conn()?;

        companies::table
            .select(DbCompany::as_select())
            .order((companies::name.asc(), companies::id.asc()))
            .load::<DbCompany>(&mut conn)?
            .into_iter()
            .map(TryInto::try_into)
            .collect::<Result<Vec<Company>, _>>()
            .map_err(RepositoryError::from)
    }

    fn get_record(&self, id: CompanyId) -> RepositoryResult<Option<Company>> {
        diesel_find!(self, Company, companies, DbCompany, id)
    }
}

diesel_record_writer!(
    Company,
    companies,
    DbCompany,
    DbNewCompany,
    CompanyChangeset,
    deletable
);

impl RecordReader<Venue> for DieselRepository {
    fn list_records(&self, query: &ListQuery) -> RepositoryResult<Vec<Venue>> {
        use crate::schema::venues;

        let mut conn = self.conn()?;

        let mut items = venues::table
            .select(DbVenue::as_select())
            .into_boxed::<diesel::sqlite::Sqlite>();
        if let Some(company_id) = query.parent_id {
            items = items.filter(venues::company_id.eq(Some(company_id)));
        }

        items
            .order((venues::name.asc(), venues::id.asc()))
            .load::<DbVenue>(&mut conn)?
            .into_iter()
            .map(TryInto::try_into)
            .collect::<Result<Vec<Venue>, _>>()
            .map_err(RepositoryError::from)
    }

    fn get_record(&self, id: VenueId) -> RepositoryResult<Option<Venue>> {
        diesel_find!(self, Venue, venues, DbVenue, id)
    }
}

diesel_record_writer!(
    Venue,
    venues,
    DbVenue,
    DbNewVenue,
    VenueChangeset,
    deletable
);

impl RecordReader<Party> for DieselRepository {
    fn list_records(&self, _query: &ListQuery) -> RepositoryResult<Vec<Party>> {
        use crate::schema::parties;

        let mut conn = self.conn()?;

        parties::table
            .select(DbParty::as_select())
            .order((parties::name.asc(), parties::id.asc()))
            .load::<DbParty>(&mut conn)?
            .into_iter()
            .map(TryInto::try_into)
            .collect::<Result<Vec<Party>, _>>()
            .map_err(RepositoryError::from)
    }

    fn get_record(&self, id: PartyId) -> RepositoryResult<Option<Party>> {
        diesel_find!(self, Party, parties, DbParty, id)
    }
}

diesel_record_writer!(
    Party,
    parties,
    DbParty,
    DbNewParty,
    PartyChangeset,
    deletable
);
