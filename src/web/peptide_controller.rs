// std imports
use std::sync::Arc;

// 3rd party imports
use axum::body::Body;
use axum::extract::{Json, State};
use axum::http::header::{ACCEPT, CONTENT_TYPE};
use axum::http::HeaderMap;
use axum::response::{IntoResponse, Response};
use futures::{stream, StreamExt, TryStreamExt};
use serde_json::Value;
use tracing::{debug, error};

// internal imports
use crate::database::peptide_table::PeptideRowSource;
use crate::functions::output_format::OutputFormat;
use crate::functions::peptide_search::{metadata_conditions, search};
use crate::web::app_state::AppState;
use crate::web::search_request::parse_search_request;
use crate::web::web_error::WebError;

/// Validates the request, starts the search and streams the result.
/// The first chunk is awaited before the response is created, so failures while
/// acquiring the connection or opening the first cursor still end up in an error response.
///
/// # Arguments
/// * `row_source` - Source of peptide rows
/// * `headers` - Request headers, used for content negotiation
/// * `payload` - Request body
///
pub async fn search_response<R: PeptideRowSource>(
    row_source: &R,
    headers: &HeaderMap,
    payload: Value,
) -> Result<Response, WebError> {
    let parameters = parse_search_request(&payload).map_err(WebError::validation)?;

    let format = OutputFormat::from_accept_header(
        headers
            .get(ACCEPT)
            .and_then(|accept| accept.to_str().ok()),
    );
    debug!("Search for {} as {}", parameters.precursor, format);

    let mut session = row_source.session().await?;
    let conditions = metadata_conditions(&mut session, &parameters).await?;

    let mut chunks = Box::pin(search(session, parameters, conditions, format));
    let first_chunk = match chunks.next().await {
        Some(chunk) => Some(chunk?),
        None => None,
    };

    let body = stream::iter(first_chunk.map(Ok))
        .chain(chunks)
        .inspect_err(|err| error!("Peptide search failed during streaming: {:?}", err));

    Ok((
        [(CONTENT_TYPE, format.content_type())],
        Body::from_stream(body),
    )
        .into_response())
}

/// Peptide search endpoint.
/// Accepts the search parameters as JSON body and returns JSON, NDJSON or FASTA depending on the `Accept` header.
///
pub async fn post_search(
    State(app_state): State<Arc<AppState>>,
    headers: HeaderMap,
    Json(payload): Json<Value>,
) -> Result<Response, WebError> {
    search_response(app_state.get_db_client_as_ref(), &headers, payload).await
}

#[cfg(test)]
mod test {
    use axum::body::to_bytes;
    use axum::http::{HeaderValue, StatusCode};
    use serde_json::json;

    use super::*;
    use crate::database::peptide_table::tests::InMemorySource;
    use crate::entities::peptide_row::PeptideRow;
    use crate::mass::convert::to_int as mass_to_int;

    fn peptide(sequence: &str, mass: f64) -> PeptideRow {
        PeptideRow::new(
            mass_to_int(mass),
            sequence.to_string(),
            0,
            sequence.len() as i16,
            true,
            false,
            vec![9606],
            vec![9606],
            vec!["UP000005640".to_string()],
        )
    }

    fn source(fail: bool) -> InMemorySource {
        InMemorySource {
            rows: vec![
                peptide("PEPTIDEK", 1000.0),
                peptide("PEPTIDER", 1000.000001),
                peptide("DIFFERENT", 1200.0),
            ],
            fail,
        }
    }

    fn body() -> Value {
        json!({
            "precursor": 1000.0,
            "lower_precursor_tolerance_ppm": 5,
            "upper_precursor_tolerance_ppm": 5,
            "variable_modification_maximum": 0,
            "include_count": true
        })
    }

    async fn into_parts(response: Response) -> (StatusCode, String, String) {
        let status = response.status();
        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .unwrap_or_default()
            .to_string();
        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, content_type, String::from_utf8(body.to_vec()).unwrap())
    }

    #[tokio::test]
    async fn test_json_search() {
        let response = search_response(&source(false), &HeaderMap::new(), body())
            .await
            .unwrap();
        let (status, content_type, body) = into_parts(response).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(content_type, "application/json; charset=utf-8");
        let document: Value = serde_json::from_str(&body).unwrap();
        assert_eq!(document["count"], 2);
        assert_eq!(document["peptides"][0]["sequence"], "PEPTIDEK");
        assert_eq!(document["peptides"][1]["sequence"], "PEPTIDER");
    }

    #[tokio::test]
    async fn test_ndjson_search() {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("application/x-ndjson"));
        let response = search_response(&source(false), &headers, body())
            .await
            .unwrap();
        let (status, content_type, body) = into_parts(response).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(content_type, "application/x-ndjson; charset=utf-8");
        assert_eq!(body.lines().count(), 2);
    }

    #[tokio::test]
    async fn test_empty_fasta_search() {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("text/plain"));
        let mut payload = body();
        payload["precursor"] = json!(500.0);
        let response = search_response(&source(false), &headers, payload)
            .await
            .unwrap();
        let (status, content_type, body) = into_parts(response).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(content_type, "text/plain; charset=utf-8");
        assert!(body.is_empty());
    }

    #[tokio::test]
    async fn test_validation_error() {
        let response = search_response(&source(false), &HeaderMap::new(), json!({}))
            .await
            .unwrap_err()
            .into_response();
        let (status, _, body) = into_parts(response).await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        let document: Value = serde_json::from_str(&body).unwrap();
        assert_eq!(
            document["errors"],
            json!([
                "you have to specify lower_precursor_tolerance_ppm",
                "you have to specify upper_precursor_tolerance_ppm",
                "you have to specify variable_modification_maximum",
                "you have to specify a precursor"
            ])
        );
    }

    #[tokio::test]
    async fn test_row_source_error() {
        let response = search_response(&source(true), &HeaderMap::new(), body())
            .await
            .unwrap_err()
            .into_response();
        let (status, _, body) = into_parts(response).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        let document: Value = serde_json::from_str(&body).unwrap();
        assert!(document["errors"]["general"]
            .as_str()
            .unwrap()
            .contains("connection lost"));
    }

    #[tokio::test]
    async fn test_taxonomy_error() {
        let mut payload = body();
        payload["taxonomy_id"] = json!(0);
        let error = search_response(&source(false), &HeaderMap::new(), payload)
            .await
            .unwrap_err();
        assert_eq!(error.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
