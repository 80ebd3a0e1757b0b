use std::collections::HashMap;

use diesel::prelude::*;

use crate::domain::finance::{Closing, FinancialRecord};
use crate::domain::project::ProjectRef;
use crate::domain::types::{ClosingId, FinancialRecordId};
use crate::models::finance::{
    Closing as DbClosing, ClosingChangeset, FinancialRecord as DbFinancialRecord,
    FinancialRecordChangeset, NewClosing as DbNewClosing,
    NewFinancialRecord as DbNewFinancialRecord,
};
use crate::models::project::project_ref;
use crate::repository::{
    DieselRepository, ListQuery, RecordReader, RepositoryError, RepositoryResult, diesel_find,
    diesel_record_writer,
};

impl RecordReader<FinancialRecord> for DieselRepository {
    fn list_records(&self, query: &ListQuery) -> RepositoryResult<Vec<FinancialRecord>> {
        use crate::schema::{financial_records, projects};

        let mut conn = self.conn()?;

        let mut items = financial_records::table
            .select(DbFinancialRecord::as_select())
            .into_boxed::<diesel::sqlite::Sqlite>();
        if let Some(project_id) = query.parent_id {
            items = items.filter(financial_records::project_id.eq(Some(project_id)));
        }

        let mut records = items
            .order((
                financial_records::due_date.desc(),
                financial_records::id.desc(),
            ))
            .load::<DbFinancialRecord>(&mut conn)?
            .into_iter()
            .map(TryInto::try_into)
            .collect::<Result<Vec<FinancialRecord>, _>>()?;

        if query.with_relations {
            let mut ids: Vec<i32> = records
                .iter()
                .filter_map(|r| r.project_id.map(|id| id.get()))
                .collect();
            ids.sort_unstable();
            ids.dedup();

            let refs = projects::table
                .filter(projects::id.eq_any(&ids))
                .select((projects::id, projects::name))
                .load::<(i32, String)>(&mut conn)?
                .into_iter()
                .map(|(id, name)| -> RepositoryResult<(i32, ProjectRef)> {
                    Ok((id, project_ref(id, name)?))
                })
                .collect::<RepositoryResult<HashMap<_, _>>>()?;

            for record in &mut records {
                record.project = record
                    .project_id
                    .and_then(|id| refs.get(&id.get()).cloned());
            }
        }

        Ok(records)
    }

    fn get_record(&self, id: FinancialRecordId) -> RepositoryResult<Option<FinancialRecord>> {
        diesel_find!(
            self,
            FinancialRecord,
            financial_records,
            DbFinancialRecord,
            id
        )
    }
}

diesel_record_writer!(
    FinancialRecord,
    financial_records,
    DbFinancialRecord,
    DbNewFinancialRecord,
    FinancialRecordChangeset,
    deletable
);

impl RecordReader<Closing> for DieselRepository {
    fn list_records(&self, query: &ListQuery) -> RepositoryResult<Vec<Closing>> {
        use crate::schema::closings;

        let mut conn = self.conn()?;

        let mut items = closings::table
            .select(DbClosing::as_select())
            .into_boxed::<diesel::sqlite::Sqlite>();
        if let Some(project_id) = query.parent_id {
            items = items.filter(closings::project_id.eq(Some(project_id)));
        }

        items
            .order((closings::period_end.desc(), closings::id.desc()))
            .load::<DbClosing>(&mut conn)?
            .into_iter()
            .map(TryInto::try_into)
            .collect::<Result<Vec<Closing>, _>>()
            .map_err(RepositoryError::from)
    }

    fn get_record(&self, id: ClosingId) -> RepositoryResult<Option<Closing>> {
        diesel_find!(self, Closing, closings, DbClosing, id)
    }
}

diesel_record_writer!(
    Closing,
    closings,
    DbClosing,
    DbNewClosing,
    ClosingChangeset,
    deletable
);
