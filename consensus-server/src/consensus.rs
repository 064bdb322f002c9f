use axum::{
    extract::{Path, State},
    routing::{get, post},
    Json,
};

use consensus_core::{LobbyId, UserId};

use crate::{
    context::ServerContext,
    errors::ServerResult,
    schemas::{CompleteSchema, StartSchema, ValidatedJson, VoteSchema},
    serialized::{
        Ack, Completion, RoundOptions, RoundStatus, StartResult, ToSerialized, Waiting,
    },
    Router,
};

#[utoipa::path(
    post,
    path = "/api/consensus/lobby/{id}/start",
    tag = "consensus",
    request_body = StartSchema,
    responses(
        (status = 200, body = StartResult),
        (status = 403, description = "Only the host can start the game"),
        (status = 409, description = "Not every member is ready, or a round has no open venues")
    )
)]
async fn start_game(
    State(context): State<ServerContext>,
    Path(lobby_id): Path<LobbyId>,
    ValidatedJson(body): ValidatedJson<StartSchema>,
) -> ServerResult<Json<StartResult>> {
    let lobby = context
        .engine
        .lobbies
        .start_game(lobby_id, UserId::from(body.user_id))?;

    Ok(Json(StartResult {
        ok: true,
        current_round: 1,
        total_rounds: lobby.total_rounds(),
    }))
}

#[utoipa::path(
    get,
    path = "/api/consensus/lobby/{id}/round/{n}/options",
    tag = "consensus",
    responses(
        (status = 200, body = RoundOptions)
    )
)]
async fn round_options(
    State(context): State<ServerContext>,
    Path((lobby_id, round_number)): Path<(LobbyId, u32)>,
) -> ServerResult<Json<RoundOptions>> {
    let options = context.engine.lobbies.round_options(lobby_id, round_number)?;

    Ok(Json(RoundOptions {
        round: round_number,
        options: options.to_serialized(),
    }))
}

#[utoipa::path(
    post,
    path = "/api/consensus/lobby/{id}/vote",
    tag = "consensus",
    request_body = VoteSchema,
    responses(
        (status = 200, body = Ack),
        (status = 409, description = "The round has already resolved")
    )
)]
async fn submit_vote(
    State(context): State<ServerContext>,
    Path(lobby_id): Path<LobbyId>,
    ValidatedJson(body): ValidatedJson<VoteSchema>,
) -> ServerResult<Json<Ack>> {
    context.engine.lobbies.submit_vote(
        lobby_id,
        UserId::from(body.user_id),
        body.round_number,
        &body.option_id,
        body.vote,
    )?;

    Ok(Json(Ack::ok()))
}

#[utoipa::path(
    get,
    path = "/api/consensus/lobby/{id}/round/{n}/status",
    tag = "consensus",
    responses(
        (status = 200, body = RoundStatus)
    )
)]
async fn round_status(
    State(context): State<ServerContext>,
    Path((lobby_id, round_number)): Path<(LobbyId, u32)>,
) -> ServerResult<Json<RoundStatus>> {
    let lobby = context.engine.lobbies.lobby_by_id(lobby_id)?;

    Ok(Json(lobby.round_status(round_number)?.to_serialized()))
}

#[utoipa::path(
    post,
    path = "/api/consensus/lobby/{id}/round/{n}/complete",
    tag = "consensus",
    request_body = CompleteSchema,
    responses(
        (status = 200, body = Completion),
        (status = 409, description = "The round has not resolved, or the selection does not match")
    )
)]
async fn complete_round(
    State(context): State<ServerContext>,
    Path((lobby_id, round_number)): Path<(LobbyId, u32)>,
    ValidatedJson(body): ValidatedJson<CompleteSchema>,
) -> ServerResult<Json<Completion>> {
    let lobby = context.engine.lobbies.lobby_by_id(lobby_id)?;

    let completion = lobby.complete_round(
        round_number,
        UserId::from(body.user_id),
        &body.selected_option_id,
    )?;

    Ok(Json(completion.to_serialized()))
}

#[utoipa::path(
    get,
    path = "/api/consensus/lobby/{id}/waiting",
    tag = "consensus",
    responses(
        (status = 200, body = Waiting)
    )
)]
async fn waiting_status(
    State(context): State<ServerContext>,
    Path(lobby_id): Path<LobbyId>,
) -> ServerResult<Json<Waiting>> {
    let lobby = context.engine.lobbies.lobby_by_id(lobby_id)?;

    Ok(Json(lobby.waiting_status().to_serialized()))
}

pub fn router() -> Router {
    Router::new()
        .route("/lobby/:id/start", post(start_game))
        .route("/lobby/:id/round/:n/options", get(round_options))
        .route("/lobby/:id/vote", post(submit_vote))
        .route("/lobby/:id/round/:n/status", get(round_status))
        .route("/lobby/:id/round/:n/complete", post(complete_round))
        .route("/lobby/:id/waiting", get(waiting_status))
}
