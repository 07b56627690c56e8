use std::fmt::Display;
use std::pin::Pin;
use std::str::FromStr;

use anyhow::{anyhow, bail, Result};
use async_stream::try_stream;
use futures::{Future, Stream};
use tokio_postgres::types::ToSql;
use tokio_postgres::Row;
use tracing::trace;

use crate::database::client::Client;
use crate::database::errors::client_error::ClientError;
use crate::entities::peptide_row::{Column, PeptideRow, ScalarValue, DEFAULT_COLUMNS};

const TABLE_NAME: &str = "peptides";

const TAXONOMY_TABLE_NAME: &str = "taxonomies";

/// Rank of taxonomies which are assigned to peptides
const SPECIES_RANK: &str = "species";

/// Number of rows fetched per round trip
pub const FETCH_SIZE: i32 = 10_000;

/// Columns which can be used for ordering
///
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum OrderColumn {
    Mass,
    Length,
    Sequence,
    NumberOfMissedCleavages,
}

impl OrderColumn {
    pub const ALL: [OrderColumn; 4] = [
        OrderColumn::Mass,
        OrderColumn::Length,
        OrderColumn::Sequence,
        OrderColumn::NumberOfMissedCleavages,
    ];

    pub fn column(&self) -> Column {
        match self {
            OrderColumn::Mass => Column::Mass,
            OrderColumn::Length => Column::Length,
            OrderColumn::Sequence => Column::Sequence,
            OrderColumn::NumberOfMissedCleavages => Column::NumberOfMissedCleavages,
        }
    }
}

impl FromStr for OrderColumn {
    type Err = anyhow::Error;

    fn from_str(value: &str) -> Result<Self> {
        OrderColumn::ALL
            .into_iter()
            .find(|order_column| order_column.column().name() == value)
            .ok_or_else(|| anyhow!("unsupported order column '{}'", value))
    }
}

impl Display for OrderColumn {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.column())
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum OrderDirection {
    #[default]
    Asc,
    Desc,
}

impl OrderDirection {
    pub const ALL: [OrderDirection; 2] = [OrderDirection::Asc, OrderDirection::Desc];

    pub fn as_str(&self) -> &'static str {
        match self {
            OrderDirection::Asc => "asc",
            OrderDirection::Desc => "desc",
        }
    }
}

impl FromStr for OrderDirection {
    type Err = anyhow::Error;

    fn from_str(value: &str) -> Result<Self> {
        match value {
            "asc" => Ok(OrderDirection::Asc),
            "desc" => Ok(OrderDirection::Desc),
            _ => bail!("unsupported order direction '{}'", value),
        }
    }
}

impl Display for OrderDirection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str().to_uppercase())
    }
}

/// Ordering applied by the row source
///
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct OrderBy {
    pub column: OrderColumn,
    pub direction: OrderDirection,
}

/// Mass range query against the peptide table
///
#[derive(Clone, Debug, PartialEq)]
pub struct PeptideQuery {
    lower_mass: i64,
    upper_mass: i64,
    /// Default columns followed by the modification columns
    columns: Vec<Column>,
    order_by: Option<OrderBy>,
}

impl PeptideQuery {
    /// Creates a new query selecting the default columns and the given modification columns
    ///
    /// # Arguments
    /// * `lower_mass` - Lower mass limit (inclusive)
    /// * `upper_mass` - Upper mass limit (inclusive)
    /// * `modification_columns` - Additional columns, e.g. `c_count`
    /// * `order_by` - Optional ordering
    ///
    pub fn new<'a>(
        lower_mass: i64,
        upper_mass: i64,
        modification_columns: impl Iterator<Item = &'a Column>,
        order_by: Option<OrderBy>,
    ) -> Self {
        let mut columns = DEFAULT_COLUMNS.to_vec();
        for column in modification_columns {
            if !columns.contains(column) {
                columns.push(*column);
            }
        }
        Self {
            lower_mass,
            upper_mass,
            columns,
            order_by,
        }
    }

    pub fn get_lower_mass(&self) -> i64 {
        self.lower_mass
    }

    pub fn get_upper_mass(&self) -> i64 {
        self.upper_mass
    }

    pub fn get_columns(&self) -> &[Column] {
        &self.columns
    }

    pub fn get_order_by(&self) -> Option<&OrderBy> {
        self.order_by.as_ref()
    }

    /// SQL statement, masses are bound to `$1` and `$2`
    ///
    pub fn to_statement(&self) -> String {
        let mut statement = format!(
            "SELECT DISTINCT {} FROM {TABLE_NAME} WHERE mass BETWEEN $1 AND $2",
            self.columns
                .iter()
                .map(|column| column.name())
                .collect::<Vec<_>>()
                .join(", ")
        );
        if let Some(order_by) = self.order_by.as_ref() {
            statement.push_str(&format!(
                " ORDER BY {} {}",
                order_by.column, order_by.direction
            ));
        }
        statement
    }

    /// Converts a database row into a peptide row. Columns are read by position.
    ///
    /// # Arguments
    /// * `row` - Database row of this query
    ///
    pub fn to_peptide_row(&self, row: &Row) -> Result<PeptideRow> {
        let mut peptide_row = PeptideRow::new(
            row.try_get(0)?,
            row.try_get(1)?,
            row.try_get(2)?,
            row.try_get(3)?,
            row.try_get(4)?,
            row.try_get(5)?,
            int_array(row, 6)?,
            int_array(row, 7)?,
            row.try_get(8)?,
        );
        for (idx, column) in self.columns.iter().enumerate().skip(DEFAULT_COLUMNS.len()) {
            let value = match column {
                Column::AminoAcidCount(_) => {
                    ScalarValue::Integer(row.try_get::<_, i16>(idx)? as i64)
                }
                Column::NTerminus | Column::CTerminus => {
                    let residue: String = row.try_get(idx)?;
                    ScalarValue::Residue(
                        residue
                            .chars()
                            .next()
                            .ok_or_else(|| anyhow!("empty {} value", column))?,
                    )
                }
                _ => bail!("{} is not a modification column", column),
            };
            peptide_row.add_modification_column(*column, value);
        }
        Ok(peptide_row)
    }
}

/// Reads an `INTEGER[]`
///
fn int_array(row: &Row, idx: usize) -> Result<Vec<i64>> {
    Ok(row
        .try_get::<_, Vec<i32>>(idx)?
        .into_iter()
        .map(|id| id as i64)
        .collect())
}

/// Stream of row batches. Dropping it releases the underlying cursor.
pub type RowBatches<'a> = Pin<Box<dyn Stream<Item = Result<Vec<PeptideRow>>> + Send + 'a>>;

/// Single connection to a peptide row source, used for one search request.
///
pub trait PeptideRowSession: Send {
    /// Runs the query and returns the matching rows in batches.
    /// Only one batch is held in memory at a time.
    ///
    /// # Arguments
    /// * `query` - Mass range query
    ///
    fn query_batches<'a>(&'a mut self, query: &'a PeptideQuery) -> RowBatches<'a>;

    /// Returns the IDs of all species below (and including) the given taxonomy
    ///
    /// # Arguments
    /// * `taxonomy_id` - Taxonomy ID
    ///
    fn sub_species_ids(&mut self, taxonomy_id: i64)
        -> impl Future<Output = Result<Vec<i64>>> + Send;
}

/// Source of peptide rows
///
pub trait PeptideRowSource: Send + Sync {
    type Session: PeptideRowSession + 'static;

    /// Opens a new session, waits if no connection is available.
    ///
    fn session(&self) -> impl Future<Output = Result<Self::Session>> + Send;
}

/// Session on a pooled PostgreSQL connection.
/// The connection goes back to the pool when the session is dropped.
///
pub struct PostgresPeptideSession {
    connection: deadpool_postgres::Object,
}

impl PeptideRowSource for Client {
    type Session = PostgresPeptideSession;

    async fn session(&self) -> Result<Self::Session> {
        let connection = self.get().await.map_err(ClientError::from)?;
        Ok(PostgresPeptideSession { connection })
    }
}

impl PeptideRowSession for PostgresPeptideSession {
    fn query_batches<'a>(&'a mut self, query: &'a PeptideQuery) -> RowBatches<'a> {
        Box::pin(try_stream! {
            let statement = query.to_statement();
            trace!(
                "{} with $1 = {}, $2 = {}",
                statement,
                query.get_lower_mass(),
                query.get_upper_mass()
            );

            // portals only live inside a transaction, dropping it rolls back and closes the portal
            let transaction = self.connection.transaction().await?;
            let prepared_statement = transaction.prepare_cached(&statement).await?;
            let params: [&(dyn ToSql + Sync); 2] = [&query.lower_mass, &query.upper_mass];
            let portal = transaction.bind(&prepared_statement, &params).await?;

            loop {
                let rows = transaction.query_portal(&portal, FETCH_SIZE).await?;
                let is_last_batch = rows.len() < FETCH_SIZE as usize;
                let batch = rows
                    .iter()
                    .map(|row| query.to_peptide_row(row))
                    .collect::<Result<Vec<PeptideRow>>>()?;
                if !batch.is_empty() {
                    yield batch;
                }
                if is_last_batch {
                    break;
                }
            }
            transaction.commit().await?;
        })
    }

    async fn sub_species_ids(&mut self, taxonomy_id: i64) -> Result<Vec<i64>> {
        let statement = format!(
            "WITH RECURSIVE subtaxonomies AS (\
                SELECT id, parent_id, rank FROM {TAXONOMY_TABLE_NAME} WHERE id = $1 \
                UNION \
                SELECT t.id, t.parent_id, t.rank FROM {TAXONOMY_TABLE_NAME} t \
                INNER JOIN subtaxonomies s ON s.id = t.parent_id\
            ) SELECT id FROM subtaxonomies WHERE rank = $2"
        );
        let taxonomy_id = i32::try_from(taxonomy_id)
            .map_err(|_| anyhow!("taxonomy ID {} is out of range", taxonomy_id))?;
        let prepared_statement = self.connection.prepare_cached(&statement).await?;
        let rows = self
            .connection
            .query(&prepared_statement, &[&taxonomy_id, &SPECIES_RANK])
            .await?;
        rows.iter()
            .map(|row| Ok(row.try_get::<_, i32>(0)? as i64))
            .collect()
    }
}
