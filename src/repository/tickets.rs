use std::collections::HashMap;

use diesel::prelude::*;
use diesel::sqlite::SqliteConnection;

use crate::domain::contract::ContractRef;
use crate::domain::ticket::{NewTicketSale, TicketRef, TicketSale, TicketSalePatch, TicketType};
use crate::domain::types::{TicketSaleId, TicketTypeId, TicketTypeName};
use crate::models::contract::contract_ref;
use crate::models::ticket::{
    NewTicketSale as DbNewTicketSale, NewTicketType as DbNewTicketType,
    TicketSale as DbTicketSale, TicketSaleChangeset, TicketType as DbTicketType,
    TicketTypeChangeset,
};
use crate::models::touch;
use crate::repository::{
    DieselRepository, ListQuery, RecordDeleter, RecordReader, RecordWriter, RepositoryError,
    RepositoryResult, TicketSalesWriter, diesel_find, diesel_record_writer,
};

impl RecordReader<TicketType> for DieselRepository {
    fn list_records(&self, query: &ListQuery) -> RepositoryResult<Vec<TicketType>> {
        use crate::schema::ticket_types;

        let mut conn = self.conn()?;

        let mut items = ticket_types::table
            .select(DbTicketType::as_select())
            .into_boxed::<diesel::sqlite::Sqlite>();
        if let Some(project_id) = query.parent_id {
            items = items.filter(ticket_types::project_id.eq(project_id));
        }

        items
            .order((ticket_types::name.asc(), ticket_types::id.asc()))
            .load::<DbTicketType>(&mut conn)?
            .into_iter()
            .map(TryInto::try_into)
            .collect::<Result<Vec<TicketType>, _>>()
            .map_err(RepositoryError::from)
    }

    fn get_record(&self, id: TicketTypeId) -> RepositoryResult<Option<TicketType>> {
        diesel_find!(self, TicketType, ticket_types, DbTicketType, id)
    }
}

diesel_record_writer!(
    TicketType,
    ticket_types,
    DbTicketType,
    DbNewTicketType,
    TicketTypeChangeset,
    deletable
);

/// Sets `sold` to the summed quantity of the ticket's sales.
fn recompute_sold(
    conn: &mut SqliteConnection,
    ticket_type_id: i32,
) -> RepositoryResult<TicketType> {
    use crate::schema::{ticket_sales, ticket_types};

    let total: Option<i64> = ticket_sales::table
        .filter(ticket_sales::ticket_type_id.eq(ticket_type_id))
        .select(diesel::dsl::sum(ticket_sales::quantity))
        .first(conn)?;
    let sold = i32::try_from(total.unwrap_or(0))
        .map_err(|_| RepositoryError::Conflict("sold counter overflow".to_string()))?;

    let row = diesel::update(ticket_types::table.find(ticket_type_id))
        .set((
            ticket_types::sold.eq(sold),
            ticket_types::updated_at.eq(touch()),
        ))
        .returning(DbTicketType::as_returning())
        .get_result::<DbTicketType>(conn)?;
    Ok(TicketType::try_from(row)?)
}

fn contract_refs(
    conn: &mut SqliteConnection,
    ids: &[i32],
) -> RepositoryResult<HashMap<i32, ContractRef>> {
    use crate::schema::contracts;

    if ids.is_empty() {
        return Ok(HashMap::new());
    }
    contracts::table
        .filter(contracts::id.eq_any(ids))
        .select((contracts::id, contracts::number))
        .load::<(i32, String)>(conn)?
        .into_iter()
        .map(|(id, number)| -> RepositoryResult<(i32, ContractRef)> {
            Ok((id, contract_ref(id, number)?))
        })
        .collect()
}

/// Embedded ticket views for the given ticket type ids.
fn ticket_refs(
    conn: &mut SqliteConnection,
    ids: &[i32],
) -> RepositoryResult<HashMap<i32, TicketRef>> {
    use crate::schema::ticket_types;

    if ids.is_empty() {
        return Ok(HashMap::new());
    }
    let rows = ticket_types::table
        .filter(ticket_types::id.eq_any(ids))
        .select((
            ticket_types::id,
            ticket_types::name,
            ticket_types::contract_id,
        ))
        .load::<(i32, String, Option<i32>)>(conn)?;

    let contract_ids: Vec<i32> = rows.iter().filter_map(|(_, _, c)| *c).collect();
    let contracts = contract_refs(conn, &contract_ids)?;

    rows.into_iter()
        .map(|(id, name, contract_id)| -> RepositoryResult<(i32, TicketRef)> {
            let view = TicketRef {
                id: TicketTypeId::new(id)?,
                name: TicketTypeName::new(name)?,
                contract: contract_id.and_then(|c| contracts.get(&c).cloned()),
            };
            Ok((id, view))
        })
        .collect()
}

impl RecordReader<TicketSale> for DieselRepository {
    fn list_records(&self, query: &ListQuery) -> RepositoryResult<Vec<TicketSale>> {
        use crate::schema::ticket_sales;

        let mut conn = self.conn()?;

        let mut items = ticket_sales::table
            .select(DbTicketSale::as_select())
            .into_boxed::<diesel::sqlite::Sqlite>();
        if let Some(ticket_type_id) = query.parent_id {
            items = items.filter(ticket_sales::ticket_type_id.eq(ticket_type_id));
        }

        let mut sales = items
            .order((ticket_sales::sold_at.desc(), ticket_sales::id.desc()))
            .load::<DbTicketSale>(&mut conn)?
            .into_iter()
            .map(TryInto::try_into)
            .collect::<Result<Vec<TicketSale>, _>>()?;

        if query.with_relations {
            let mut ids: Vec<i32> = sales.iter().map(|s| s.ticket_type_id.get()).collect();
            ids.sort_unstable();
            ids.dedup();
            let refs = ticket_refs(&mut conn, &ids)?;
            for sale in &mut sales {
                sale.ticket = refs.get(&sale.ticket_type_id.get()).cloned();
            }
        }

        Ok(sales)
    }

    fn get_record(&self, id: TicketSaleId) -> RepositoryResult<Option<TicketSale>> {
        diesel_find!(self, TicketSale, ticket_sales, DbTicketSale, id)
    }
}

/// Sales are always created through [`TicketSalesWriter::record_sale`] so the
/// inventory counter follows.
impl RecordWriter<TicketSale> for DieselRepository {
    fn create_record(&self, new: &NewTicketSale) -> RepositoryResult<TicketSale> {
        self.record_sale(new).map(|(sale, _)| sale)
    }

    fn update_record(
        &self,
        id: TicketSaleId,
        patch: &TicketSalePatch,
    ) -> RepositoryResult<TicketSale> {
        use crate::schema::ticket_sales;

        let mut conn = self.conn()?;
        let row = diesel::update(ticket_sales::table.find(id.get()))
            .set(TicketSaleChangeset::from(patch))
            .returning(DbTicketSale::as_returning())
            .get_result::<DbTicketSale>(&mut conn)?;
        Ok(TicketSale::try_from(row)?)
    }
}

impl RecordDeleter<TicketSale> for DieselRepository {
    fn delete_record(&self, id: TicketSaleId) -> RepositoryResult<()> {
        use crate::schema::ticket_sales;

        let mut conn = self.conn()?;
        conn.immediate_transaction::<_, RepositoryError, _>(|conn| {
            let ticket_type_id = ticket_sales::table
                .find(id.get())
                .select(ticket_sales::ticket_type_id)
                .first::<i32>(conn)?;
            diesel::delete(ticket_sales::table.find(id.get())).execute(conn)?;
            recompute_sold(conn, ticket_type_id)?;
            Ok(())
        })
    }
}

impl TicketSalesWriter for DieselRepository {
    fn record_sale(&self, sale: &NewTicketSale) -> RepositoryResult<(TicketSale, TicketType)> {
        use crate::schema::{ticket_sales, ticket_types};

        let mut conn = self.conn()?;
        conn.immediate_transaction::<_, RepositoryError, _>(|conn| {
            let ticket: TicketType = ticket_types::table
                .find(sale.ticket_type_id.get())
                .select(DbTicketType::as_select())
                .first::<DbTicketType>(conn)?
                .try_into()?;
            ticket
                .check_availability(sale.quantity)
                .map_err(|e| RepositoryError::Conflict(e.to_string()))?;

            let row = diesel::insert_into(ticket_sales::table)
                .values(DbNewTicketSale::from(sale))
                .returning(DbTicketSale::as_returning())
                .get_result::<DbTicketSale>(conn)?;
            let ticket = recompute_sold(conn, ticket.id.get())?;

            let contract = match ticket.contract_id {
                Some(contract_id) => contract_refs(conn, &[contract_id.get()])?
                    .remove(&contract_id.get()),
                None => None,
            };
            let mut recorded = TicketSale::try_from(row)?;
            recorded.ticket = Some(ticket.as_ref_view(contract));
            Ok((recorded, ticket))
        })
    }

    fn resync_sold(&self, ticket_type_id: TicketTypeId) -> RepositoryResult<TicketType> {
        let mut conn = self.conn()?;
        conn.immediate_transaction::<_, RepositoryError, _>(|conn| {
            recompute_sold(conn, ticket_type_id.get())
        })
    }
}
