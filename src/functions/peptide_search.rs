// std imports
use std::collections::HashSet;
use std::iter::once;

// 3rd party imports
use anyhow::Result;
use async_stream::try_stream;
use futures::{Stream, StreamExt};
use tracing::{debug, trace};

// internal imports
use crate::database::peptide_table::{OrderBy, PeptideQuery, PeptideRowSession};
use crate::entities::peptide_row::{Column, ScalarValue};
use crate::functions::column_condition::{check_row, ColumnCondition};
use crate::functions::modification_collection::ModificationCollection;
use crate::functions::modification_combination::{
    ModificationCombination, ModificationCombinationList,
};
use crate::functions::output_format::{OutputFormat, OutputWriter};

/// Validated parameters of a peptide search
///
#[derive(Clone, Debug)]
pub struct SearchParameters {
    /// Precursor mass as integer
    pub precursor: i64,
    pub lower_tolerance_ppm: u32,
    pub upper_tolerance_ppm: u32,
    pub max_variable_modifications: usize,
    pub modifications: ModificationCollection,
    pub taxonomy_id: Option<i64>,
    pub proteome_id: Option<String>,
    pub is_reviewed: Option<bool>,
    pub order_by: Option<OrderBy>,
    pub offset: u64,
    /// Unlimited if `None`
    pub limit: Option<u64>,
    pub include_count: bool,
}

impl SearchParameters {
    /// Lazily enumerates the modification combinations to search.
    /// Without any modification the unmodified combination is searched.
    ///
    pub fn combinations(&self) -> Box<dyn Iterator<Item = ModificationCombination> + Send> {
        if self.modifications.is_empty() {
            return Box::new(once(ModificationCombination::unmodified(
                self.precursor,
                self.lower_tolerance_ppm,
                self.upper_tolerance_ppm,
            )));
        }
        Box::new(ModificationCombinationList::new(
            &self.modifications,
            self.precursor,
            self.lower_tolerance_ppm,
            self.upper_tolerance_ppm,
            self.max_variable_modifications,
        ))
    }
}

/// Builds the conditions on the metadata columns.
/// A taxonomy is resolved into all of its species using the session.
///
/// # Arguments
/// * `session` - Row source session
/// * `parameters` - Search parameters
///
pub async fn metadata_conditions<S: PeptideRowSession>(
    session: &mut S,
    parameters: &SearchParameters,
) -> Result<Vec<(Column, ColumnCondition)>> {
    let mut conditions = Vec::new();
    if let Some(taxonomy_id) = parameters.taxonomy_id {
        let species_ids: HashSet<i64> = session
            .sub_species_ids(taxonomy_id)
            .await?
            .into_iter()
            .collect();
        debug!(
            "Taxonomy {} resolved to {} species",
            taxonomy_id,
            species_ids.len()
        );
        conditions.push((
            Column::TaxonomyIds,
            ColumnCondition::any_of_integers(species_ids),
        ));
    }
    if let Some(proteome_id) = parameters.proteome_id.as_ref() {
        conditions.push((
            Column::ProteomeIds,
            ColumnCondition::contains(ScalarValue::Text(proteome_id.clone())),
        ));
    }
    match parameters.is_reviewed {
        Some(true) => conditions.push((
            Column::IsSwissProt,
            ColumnCondition::equal(ScalarValue::Boolean(true)),
        )),
        Some(false) => conditions.push((
            Column::IsTrembl,
            ColumnCondition::equal(ScalarValue::Boolean(true)),
        )),
        None => {}
    }
    Ok(conditions)
}

/// Counts matching and written rows across all combinations of a search
///
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct MatchCounter {
    matched: u64,
    written: u64,
}

impl MatchCounter {
    /// Registers a matching row. Returns true if the row has to be written,
    /// i.e. it is behind the offset and the limit is not reached yet.
    ///
    /// # Arguments
    /// * `offset` - Number of matches to skip
    /// * `limit` - Maximum number of written rows, unlimited if `None`
    ///
    pub fn register_match(&mut self, offset: u64, limit: Option<u64>) -> bool {
        self.matched += 1;
        if self.matched > offset && !self.is_limit_reached(limit) {
            self.written += 1;
            return true;
        }
        false
    }

    pub fn is_limit_reached(&self, limit: Option<u64>) -> bool {
        limit.is_some_and(|limit| self.written >= limit)
    }

    pub fn get_matched(&self) -> u64 {
        self.matched
    }

    pub fn get_written(&self) -> u64 {
        self.written
    }
}

/// Searches peptides and streams them in the given format.
/// Each modification combination issues one mass range query, rows are checked against the metadata
/// and modification conditions. Offset and limit apply to the matches of all combinations.
/// Without count the search stops as soon as the limit is reached.
/// Output is emitted once per fetched batch.
///
/// # Arguments
/// * `session` - Row source session, released when the stream is dropped
/// * `parameters` - Search parameters
/// * `metadata_conditions` - Conditions on metadata columns, see `metadata_conditions`
/// * `format` - Output format
///
pub fn search<S: PeptideRowSession + 'static>(
    mut session: S,
    parameters: SearchParameters,
    metadata_conditions: Vec<(Column, ColumnCondition)>,
    format: OutputFormat,
) -> impl Stream<Item = Result<Vec<u8>>> + Send + 'static {
    try_stream! {
        let include_count = parameters.include_count && format.supports_count();
        let order_by = if format.supports_ordering() {
            parameters.order_by
        } else {
            None
        };
        let mut writer = OutputWriter::new(format);
        let mut buffer: Vec<u8> = Vec::new();
        let mut counter = MatchCounter::default();
        let mut num_combinations: usize = 0;

        writer.begin(&mut buffer);

        'combinations: for combination in parameters.combinations() {
            if !include_count && counter.is_limit_reached(parameters.limit) {
                break;
            }
            num_combinations += 1;
            trace!("{}", combination);

            let query = PeptideQuery::new(
                combination.get_precursor_range().get_lower_limit(),
                combination.get_precursor_range().get_upper_limit(),
                combination.get_required_columns(),
                order_by,
            );
            let mut batches = session.query_batches(&query);
            while let Some(batch) = batches.next().await {
                for row in batch? {
                    if !check_row(&row, &metadata_conditions, combination.get_column_conditions()) {
                        continue;
                    }
                    if counter.register_match(parameters.offset, parameters.limit) {
                        writer.write_row(&row, &mut buffer)?;
                    }
                    if !include_count && counter.is_limit_reached(parameters.limit) {
                        break 'combinations;
                    }
                }
                if !buffer.is_empty() {
                    yield std::mem::take(&mut buffer);
                }
            }
        }

        writer.end(include_count.then_some(counter.get_matched()), &mut buffer);
        debug!(
            "Searched {} combinations, {} matches, {} written",
            num_combinations,
            counter.get_matched(),
            counter.get_written()
        );
        if !buffer.is_empty() {
            yield buffer;
        }
    }
}

#[cfg(test)]
mod test {
    use futures::TryStreamExt;
    use tracing_test::traced_test;

    use super::*;
    use crate::database::peptide_table::tests::InMemorySession;
    use crate::database::peptide_table::{OrderColumn, OrderDirection};
    use crate::entities::modification::{Modification, Position};
    use crate::entities::peptide_row::PeptideRow;
    use crate::mass::convert::to_int as mass_to_int;

    const PRECURSOR: f64 = 1000.0;
    const OXIDATION: f64 = 15.994915;

    fn row(mass: i64, sequence: &str, taxonomy_ids: Vec<i64>) -> PeptideRow {
        PeptideRow::new(
            mass,
            sequence.to_string(),
            0,
            sequence.len() as i16,
            true,
            false,
            taxonomy_ids,
            vec![],
            vec!["UP000005640".to_string()],
        )
    }

    /// 10 unmodified peptides PEPTIDE0 to PEPTIDE9 with the precursor mass
    fn numbered_rows() -> Vec<PeptideRow> {
        (0..10)
            .map(|i| row(mass_to_int(PRECURSOR), &format!("PEPTIDE{i}"), vec![9606]))
            .collect()
    }

    fn parameters(modifications: Vec<Modification>, max: usize) -> SearchParameters {
        SearchParameters {
            precursor: mass_to_int(PRECURSOR),
            lower_tolerance_ppm: 5,
            upper_tolerance_ppm: 5,
            max_variable_modifications: max,
            modifications: ModificationCollection::new(modifications).unwrap(),
            taxonomy_id: None,
            proteome_id: None,
            is_reviewed: None,
            order_by: None,
            offset: 0,
            limit: None,
            include_count: false,
        }
    }

    fn oxidation() -> Modification {
        Modification::new(
            "onlinemod:0",
            "onlinemod:0",
            'M',
            Position::Anywhere,
            false,
            mass_to_int(OXIDATION),
        )
        .unwrap()
    }

    async fn run(
        session: InMemorySession,
        parameters: SearchParameters,
        format: OutputFormat,
    ) -> Result<String> {
        let mut session = session;
        let metadata_conditions = metadata_conditions(&mut session, &parameters).await?;
        let chunks: Vec<Vec<u8>> = search(session, parameters, metadata_conditions, format)
            .try_collect()
            .await?;
        Ok(String::from_utf8(chunks.concat())?)
    }

    fn sequences(ndjson: &str) -> Vec<String> {
        ndjson
            .lines()
            .map(|line| {
                let peptide: serde_json::Value = serde_json::from_str(line).unwrap();
                peptide["sequence"].as_str().unwrap().to_string()
            })
            .collect()
    }

    #[test]
    fn test_match_counter() {
        let mut counter = MatchCounter::default();
        let written: Vec<bool> = (0..10)
            .map(|_| counter.register_match(2, Some(3)))
            .collect();
        assert_eq!(
            written,
            vec![false, false, true, true, true, false, false, false, false, false]
        );
        assert_eq!(counter.get_matched(), 10);
        assert_eq!(counter.get_written(), 3);
        assert!(counter.is_limit_reached(Some(3)));
        assert!(!counter.is_limit_reached(None));
    }

    #[tokio::test]
    #[traced_test]
    async fn test_offset_and_limit() {
        let mut parameters = parameters(Vec::new(), 0);
        parameters.offset = 2;
        parameters.limit = Some(3);

        let output = run(
            InMemorySession::new(numbered_rows(), 4),
            parameters.clone(),
            OutputFormat::NdJson,
        )
        .await
        .unwrap();
        assert_eq!(sequences(&output), vec!["PEPTIDE2", "PEPTIDE3", "PEPTIDE4"]);

        parameters.include_count = true;
        let output = run(
            InMemorySession::new(numbered_rows(), 4),
            parameters,
            OutputFormat::Json,
        )
        .await
        .unwrap();
        let document: serde_json::Value = serde_json::from_str(&output).unwrap();
        assert_eq!(document["count"], 10);
        let peptides = document["peptides"].as_array().unwrap();
        assert_eq!(peptides.len(), 3);
        assert_eq!(peptides[0]["sequence"], "PEPTIDE2");
        assert_eq!(peptides[2]["sequence"], "PEPTIDE4");
        assert!(logs_contain("10 matches, 3 written"));
    }

    #[tokio::test]
    async fn test_offset_and_limit_span_combinations() {
        let oxidized_mass = mass_to_int(PRECURSOR) - mass_to_int(OXIDATION);
        let rows = vec![
            // unmodified combination
            row(mass_to_int(PRECURSOR), "PEPTIDEA", vec![9606]),
            row(mass_to_int(PRECURSOR), "PEPTIDEB", vec![9606]),
            // single oxidation, the last one has no methionine
            row(oxidized_mass, "MPEPTIDEC", vec![9606]),
            row(oxidized_mass, "MPEPTIDED", vec![9606]),
            row(oxidized_mass, "PEPTIDEE", vec![9606]),
        ];
        let mut parameters = parameters(vec![oxidation()], 1);
        parameters.offset = 1;
        parameters.limit = Some(2);

        let output = run(
            InMemorySession::new(rows, 10),
            parameters,
            OutputFormat::NdJson,
        )
        .await
        .unwrap();
        assert_eq!(sequences(&output), vec!["PEPTIDEB", "MPEPTIDEC"]);
    }

    #[tokio::test]
    async fn test_stops_after_limit_without_count() {
        let mut parameters = parameters(vec![oxidation()], 2);
        parameters.limit = Some(2);

        let session = InMemorySession::new(numbered_rows(), 1);
        let queries = session.queries.clone();
        let output = run(session, parameters.clone(), OutputFormat::Json)
            .await
            .unwrap();
        let document: serde_json::Value = serde_json::from_str(&output).unwrap();
        assert_eq!(document["peptides"].as_array().unwrap().len(), 2);
        assert!(document.get("count").is_none());
        // the first combination already reached the limit
        assert_eq!(queries.lock().unwrap().len(), 1);

        // counting needs all combinations
        parameters.include_count = true;
        let session = InMemorySession::new(numbered_rows(), 1);
        let queries = session.queries.clone();
        let output = run(session, parameters, OutputFormat::Json).await.unwrap();
        let document: serde_json::Value = serde_json::from_str(&output).unwrap();
        assert_eq!(document["count"], 10);
        assert_eq!(queries.lock().unwrap().len(), 3);
    }

    #[tokio::test]
    async fn test_dropping_stream_releases_session() {
        use std::sync::atomic::Ordering;

        let session = InMemorySession::new(numbered_rows(), 1);
        let queries = session.queries.clone();
        let fetched_batches = session.fetched_batches.clone();
        let released = session.released.clone();

        let mut chunks = Box::pin(search(
            session,
            parameters(Vec::new(), 0),
            Vec::new(),
            OutputFormat::NdJson,
        ));
        let first_chunk = chunks.next().await.unwrap().unwrap();
        assert_eq!(sequences(&String::from_utf8(first_chunk).unwrap()), vec!["PEPTIDE0"]);
        assert_eq!(fetched_batches.load(Ordering::SeqCst), 1);
        assert!(!released.load(Ordering::SeqCst));

        // client went away
        drop(chunks);
        assert!(released.load(Ordering::SeqCst));
        assert_eq!(fetched_batches.load(Ordering::SeqCst), 1);
        assert_eq!(queries.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_zero_limit() {
        let mut parameters = parameters(Vec::new(), 0);
        parameters.limit = Some(0);
        let session = InMemorySession::new(numbered_rows(), 4);
        let queries = session.queries.clone();
        let output = run(session, parameters, OutputFormat::Json).await.unwrap();
        assert_eq!(output, r#"{"peptides":[]}"#);
        assert!(queries.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_metadata_conditions() {
        let rows = vec![
            row(mass_to_int(PRECURSOR), "PEPTIDEA", vec![9606]),
            row(mass_to_int(PRECURSOR), "PEPTIDEB", vec![10090, 1]),
            row(mass_to_int(PRECURSOR), "PEPTIDEC", vec![10091]),
        ];
        let mut parameters = parameters(Vec::new(), 0);
        parameters.taxonomy_id = Some(10090);
        let output = run(
            InMemorySession::new(rows.clone(), 10),
            parameters.clone(),
            OutputFormat::NdJson,
        )
        .await
        .unwrap();
        assert_eq!(sequences(&output), vec!["PEPTIDEB", "PEPTIDEC"]);

        // all rows are Swiss-Prot only
        parameters.is_reviewed = Some(false);
        let output = run(
            InMemorySession::new(rows.clone(), 10),
            parameters.clone(),
            OutputFormat::NdJson,
        )
        .await
        .unwrap();
        assert!(output.is_empty());

        parameters.taxonomy_id = None;
        parameters.is_reviewed = Some(true);
        parameters.proteome_id = Some("UP000005640".to_string());
        let output = run(InMemorySession::new(rows, 10), parameters, OutputFormat::NdJson)
            .await
            .unwrap();
        assert_eq!(sequences(&output).len(), 3);
    }

    #[tokio::test]
    async fn test_fasta_ignores_order_and_count() {
        let mut parameters = parameters(Vec::new(), 0);
        parameters.include_count = true;
        parameters.order_by = Some(OrderBy {
            column: OrderColumn::Mass,
            direction: OrderDirection::Desc,
        });
        let session = InMemorySession::new(numbered_rows(), 3);
        let queries = session.queries.clone();
        let output = run(session, parameters, OutputFormat::Fasta).await.unwrap();
        assert_eq!(output.lines().count(), 20);
        assert!(output.starts_with(">lcl|1000000000000_PEPTIDE0\nPEPTIDE0\n"));
        assert_eq!(queries.lock().unwrap()[0].get_order_by(), None);
    }

    #[tokio::test]
    async fn test_row_source_errors() {
        let mut session = InMemorySession::new(numbered_rows(), 3);
        session.fail = true;
        assert!(run(session, parameters(Vec::new(), 0), OutputFormat::Json)
            .await
            .is_err());

        let mut parameters = parameters(Vec::new(), 0);
        parameters.taxonomy_id = Some(0);
        assert!(
            run(InMemorySession::new(numbered_rows(), 3), parameters, OutputFormat::Json)
                .await
                .is_err()
        );
    }
}
