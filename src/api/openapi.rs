//! OpenAPI document assembled from the handler annotations.

use utoipa::OpenApi;

use crate::api::dto::{
    ApproveRequest, PaginationMeta, RecordKindInfo, RecordListResponse, RejectRequest,
    StatsResponse, TransitionRequest, TransitionResponse,
};
use crate::api::handlers::{records, system, transitions};
use crate::domain::{
    Bucket, Record, RecordKind, RecordStats, SearchField, SortDirection, SortField, StatsScope,
};
use crate::error::{ErrorBody, ErrorResponse};

/// Path the document is served at.
pub const OPENAPI_PATH: &str = "/api-docs/openapi.json";

/// Gateway OpenAPI document.
#[derive(Debug, OpenApi)]
#[openapi(
    info(
        title = "backoffice-gateway",
        description = "Normalized, filterable views over back-office records and their review workflow."
    ),
    paths(
        system::health_handler,
        system::record_kinds_handler,
        records::list_records,
        records::record_stats,
        records::get_record,
        transitions::approve,
        transitions::reject,
        transitions::transition,
    ),
    components(schemas(
        system::HealthResponse,
        Record,
        RecordKind,
        SearchField,
        SortField,
        SortDirection,
        StatsScope,
        Bucket,
        RecordStats,
        RecordKindInfo,
        RecordListResponse,
        StatsResponse,
        PaginationMeta,
        ApproveRequest,
        RejectRequest,
        TransitionRequest,
        TransitionResponse,
        ErrorResponse,
        ErrorBody,
    )),
    tags(
        (name = "System", description = "Health and catalog"),
        (name = "Records", description = "Normalized record views"),
        (name = "Review", description = "Status transitions"),
    )
)]
pub struct ApiDoc;
