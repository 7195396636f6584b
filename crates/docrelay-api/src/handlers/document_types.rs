use axum::Json;
use serde::Serialize;
use utoipa::ToSchema;

use docrelay_core::catalog;

/// One document-type catalog entry.
#[derive(Debug, Serialize, ToSchema)]
pub struct DocumentTypeResponse {
    pub code: String,
    pub description: String,
}

/// Static document-type reference data.
#[utoipa::path(
    get,
    path = "/document/v1/documentTypes",
    tag = "documents",
    responses(
        (status = 200, description = "Known document types", body = [DocumentTypeResponse])
    )
)]
pub async fn document_types() -> Json<Vec<DocumentTypeResponse>> {
    let types = catalog::list_types()
        .into_iter()
        .map(|t| DocumentTypeResponse {
            code: t.code,
            description: t.description,
        })
        .collect();
    Json(types)
}
