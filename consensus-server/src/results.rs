use axum::{
    extract::{Path, State},
    routing::{get, post},
    Json,
};

use consensus_core::{LobbyId, UserId};

use crate::{
    context::ServerContext,
    errors::ServerResult,
    schemas::{MoveSchema, ValidatedJson},
    serialized::{ItineraryBody, ToSerialized},
    Router,
};

#[utoipa::path(
    get,
    path = "/api/results/lobby/{id}/itinerary",
    tag = "results",
    responses(
        (status = 200, body = ItineraryBody),
        (status = 409, description = "Not every round has completed yet")
    )
)]
async fn itinerary(
    State(context): State<ServerContext>,
    Path(lobby_id): Path<LobbyId>,
) -> ServerResult<Json<ItineraryBody>> {
    let lobby = context.engine.lobbies.lobby_by_id(lobby_id)?;
    let itinerary = lobby.itinerary()?;

    Ok(Json(ItineraryBody {
        activities: itinerary.entries().to_vec().to_serialized(),
    }))
}

#[utoipa::path(
    post,
    path = "/api/results/lobby/{id}/itinerary/move",
    tag = "results",
    request_body = MoveSchema,
    responses(
        (status = 200, body = ItineraryBody),
        (status = 403, description = "Only the host can reorder the itinerary"),
        (status = 409, description = "The move puts an activity outside its open hours")
    )
)]
async fn move_activity(
    State(context): State<ServerContext>,
    Path(lobby_id): Path<LobbyId>,
    ValidatedJson(body): ValidatedJson<MoveSchema>,
) -> ServerResult<Json<ItineraryBody>> {
    let lobby = context.engine.lobbies.lobby_by_id(lobby_id)?;

    let moved = lobby.move_activity(
        UserId::from(body.user_id),
        body.from_index,
        body.to_index,
    )?;

    Ok(Json(ItineraryBody {
        activities: moved.entries().to_vec().to_serialized(),
    }))
}

pub fn router() -> Router {
    Router::new()
        .route("/lobby/:id/itinerary", get(itinerary))
        .route("/lobby/:id/itinerary/move", post(move_activity))
}
