use axum::{
    extract::{Path, State},
    routing::{get, post},
    Json,
};

use consensus_core::{IdType, LobbyId, NewLobby, UserId};

use crate::{
    context::ServerContext,
    errors::ServerResult,
    schemas::{
        parse_activity_counts, parse_wire_date, JoinSchema, NewLobbySchema, ReadySchema,
        ValidatedJson,
    },
    serialized::{Ack, Lobby, Roster, ToSerialized},
    Router,
};

#[utoipa::path(
    post,
    path = "/api/lobbies",
    tag = "lobbies",
    request_body = NewLobbySchema,
    responses(
        (status = 200, body = Lobby),
        (status = 400, description = "A creation constraint was violated")
    )
)]
async fn create_lobby(
    State(context): State<ServerContext>,
    ValidatedJson(body): ValidatedJson<NewLobbySchema>,
) -> ServerResult<Json<Lobby>> {
    let new_lobby = NewLobby {
        host_id: UserId::from(body.host_id),
        location: (body.location.lat, body.location.lng),
        radius: body.radius,
        date: parse_wire_date(&body.date)?,
        start_hour: body.start_hour,
        end_hour: body.end_hour,
        activity_counts: parse_activity_counts(&body.activity_counts)?,
        max_members: body.max_members,
    };

    let lobby = context.engine.lobbies.create_lobby(new_lobby)?;

    Ok(Json(lobby.to_serialized()))
}

#[utoipa::path(
    post,
    path = "/api/lobbies/join",
    tag = "lobbies",
    request_body = JoinSchema,
    responses(
        (status = 200, body = Lobby),
        (status = 404, description = "No lobby with that code exists")
    )
)]
async fn join_lobby(
    State(context): State<ServerContext>,
    ValidatedJson(body): ValidatedJson<JoinSchema>,
) -> ServerResult<Json<Lobby>> {
    let lobby = context
        .engine
        .lobbies
        .join_lobby(&body.code, UserId::from(body.user_id))?;

    Ok(Json(lobby.to_serialized()))
}

#[utoipa::path(
    get,
    path = "/api/lobbies/{id}/status",
    tag = "lobbies",
    responses(
        (status = 200, body = Roster)
    )
)]
async fn lobby_status(
    State(context): State<ServerContext>,
    Path(lobby_id): Path<LobbyId>,
) -> ServerResult<Json<Roster>> {
    let lobby = context.engine.lobbies.lobby_by_id(lobby_id)?;

    Ok(Json(lobby.roster().to_serialized()))
}

#[utoipa::path(
    post,
    path = "/api/lobbies/{id}/member/{user_id}/ready",
    tag = "lobbies",
    request_body = ReadySchema,
    responses(
        (status = 200, body = Roster)
    )
)]
async fn set_ready(
    State(context): State<ServerContext>,
    Path((lobby_id, user_id)): Path<(LobbyId, IdType)>,
    ValidatedJson(body): ValidatedJson<ReadySchema>,
) -> ServerResult<Json<Roster>> {
    let lobby = context.engine.lobbies.lobby_by_id(lobby_id)?;

    lobby.set_ready(UserId::from(user_id), body.ready)?;

    Ok(Json(lobby.roster().to_serialized()))
}

#[utoipa::path(
    post,
    path = "/api/lobbies/member/{user_id}/leave",
    tag = "lobbies",
    responses(
        (status = 200, body = Ack)
    )
)]
async fn leave_lobby(
    State(context): State<ServerContext>,
    Path(user_id): Path<IdType>,
) -> ServerResult<Json<Ack>> {
    context.engine.lobbies.leave_lobby(UserId::from(user_id))?;

    Ok(Json(Ack::ok()))
}

pub fn router() -> Router {
    Router::new()
        .route("/", post(create_lobby))
        .route("/join", post(join_lobby))
        .route("/:id/status", get(lobby_status))
        .route("/:id/member/:user_id/ready", post(set_ready))
        .route("/member/:user_id/leave", post(leave_lobby))
}
