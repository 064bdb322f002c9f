use axum::{response::IntoResponse, Json};
use utoipa::OpenApi;
use utoipauto::utoipauto;

#[utoipauto(paths = "./consensus-server/src")]
#[derive(OpenApi)]
#[openapi(info(
    description = "consensus-server exposes endpoints to plan a group outing by voting"
))]
pub struct ApiDoc;

pub async fn docs() -> impl IntoResponse {
    Json(ApiDoc::openapi())
}
