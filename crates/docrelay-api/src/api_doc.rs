//! OpenAPI document for the service endpoints.

use utoipa::OpenApi;

use crate::error::{ErrorResponse, SubmitResponse};
use crate::handlers;
use crate::handlers::document_types::DocumentTypeResponse;
use crate::handlers::submit::SubmitPayload;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "docrelay",
        description = "Document ingestion: durable storage plus downstream notification"
    ),
    paths(
        handlers::health::health,
        handlers::document_types::document_types,
        handlers::submit::submit,
        handlers::submit::submit_form,
    ),
    components(schemas(
        SubmitResponse,
        ErrorResponse,
        DocumentTypeResponse,
        SubmitPayload,
    )),
    tags(
        (name = "documents", description = "Document submission and reference data"),
        (name = "system", description = "Service health")
    )
)]
pub struct ApiDoc;
