use axum::Json;
use axum::extract::{Extension, Path, Query, State};
use axum::http::StatusCode;
use uuid::Uuid;
use workhive_core::{ActorContext, UserId, WorkspaceId};

use crate::dto::{
    AddStreamMembersRequest, AddTeamMemberRequest, ChangeMemberRoleRequest, CreateStreamRequest,
    CreateTeamRequest, InviteMemberRequest, ListTeamsQuery, MemberListingResponse, MemberResponse,
    StreamDetailsResponse, StreamMemberResponse, StreamResponse, TeamDetailsResponse,
    TeamMemberResponse, TeamResponse, WorkspaceNameRequest, WorkspaceResponse,
};
use crate::error::ApiResult;
use crate::state::AppState;

pub async fn create_workspace_handler(
    State(state): State<AppState>,
    Extension(actor): Extension<ActorContext>,
    Json(payload): Json<WorkspaceNameRequest>,
) -> ApiResult<(StatusCode, Json<WorkspaceResponse>)> {
    let workspace = state
        .workspace_service
        .create_workspace(&actor, payload.name.as_str())
        .await?;

    Ok((StatusCode::CREATED, Json(WorkspaceResponse::from(workspace))))
}

pub async fn my_workspaces_handler(
    State(state): State<AppState>,
    Extension(actor): Extension<ActorContext>,
) -> ApiResult<Json<Vec<WorkspaceResponse>>> {
    let workspaces = state
        .workspace_service
        .my_workspaces(&actor)
        .await?
        .into_iter()
        .map(WorkspaceResponse::from)
        .collect();

    Ok(Json(workspaces))
}

pub async fn update_workspace_handler(
    State(state): State<AppState>,
    Extension(actor): Extension<ActorContext>,
    Json(payload): Json<WorkspaceNameRequest>,
) -> ApiResult<Json<WorkspaceResponse>> {
    let workspace = state
        .workspace_service
        .update_workspace(&actor, payload.name.as_str())
        .await?;

    Ok(Json(WorkspaceResponse::from(workspace)))
}

pub async fn delete_workspace_handler(
    State(state): State<AppState>,
    Extension(actor): Extension<ActorContext>,
) -> ApiResult<StatusCode> {
    state.workspace_service.delete_workspace(&actor).await?;

    Ok(StatusCode::NO_CONTENT)
}

pub async fn list_members_handler(
    State(state): State<AppState>,
    Extension(actor): Extension<ActorContext>,
) -> ApiResult<Json<Vec<MemberListingResponse>>> {
    let members = state
        .workspace_service
        .list_members(&actor)
        .await?
        .into_iter()
        .map(MemberListingResponse::from)
        .collect();

    Ok(Json(members))
}

pub async fn invite_member_handler(
    State(state): State<AppState>,
    Extension(actor): Extension<ActorContext>,
    Json(payload): Json<InviteMemberRequest>,
) -> ApiResult<(StatusCode, Json<MemberResponse>)> {
    let member = state
        .workspace_service
        .invite_member(&actor, UserId::from_uuid(payload.user_id))
        .await?;

    Ok((StatusCode::CREATED, Json(MemberResponse::from(member))))
}

pub async fn accept_invite_handler(
    State(state): State<AppState>,
    Extension(actor): Extension<ActorContext>,
    Path(workspace_id): Path<Uuid>,
) -> ApiResult<Json<MemberResponse>> {
    let member = state
        .workspace_service
        .accept_invite(&actor, WorkspaceId::from_uuid(workspace_id))
        .await?;

    Ok(Json(MemberResponse::from(member)))
}

pub async fn remove_member_handler(
    State(state): State<AppState>,
    Extension(actor): Extension<ActorContext>,
    Path(user_id): Path<Uuid>,
) -> ApiResult<Json<MemberResponse>> {
    let member = state
        .workspace_service
        .remove_member(&actor, UserId::from_uuid(user_id))
        .await?;

    Ok(Json(MemberResponse::from(member)))
}

pub async fn change_member_role_handler(
    State(state): State<AppState>,
    Extension(actor): Extension<ActorContext>,
    Path(user_id): Path<Uuid>,
    Json(payload): Json<ChangeMemberRoleRequest>,
) -> ApiResult<Json<MemberResponse>> {
    let member = state
        .workspace_service
        .change_member_role(&actor, UserId::from_uuid(user_id), payload.role_id)
        .await?;

    Ok(Json(MemberResponse::from(member)))
}

pub async fn create_stream_handler(
    State(state): State<AppState>,
    Extension(actor): Extension<ActorContext>,
    Json(payload): Json<CreateStreamRequest>,
) -> ApiResult<(StatusCode, Json<StreamResponse>)> {
    let stream = state
        .workspace_service
        .create_stream(&actor, payload.name.as_str())
        .await?;

    Ok((StatusCode::CREATED, Json(StreamResponse::from(stream))))
}

pub async fn list_streams_handler(
    State(state): State<AppState>,
    Extension(actor): Extension<ActorContext>,
) -> ApiResult<Json<Vec<StreamResponse>>> {
    let streams = state
        .workspace_service
        .list_streams(&actor)
        .await?
        .into_iter()
        .map(StreamResponse::from)
        .collect();

    Ok(Json(streams))
}

pub async fn delete_stream_handler(
    State(state): State<AppState>,
    Extension(actor): Extension<ActorContext>,
    Path(stream_id): Path<Uuid>,
) -> ApiResult<StatusCode> {
    state
        .workspace_service
        .delete_stream(&actor, stream_id)
        .await?;

    Ok(StatusCode::NO_CONTENT)
}

pub async fn create_team_handler(
    State(state): State<AppState>,
    Extension(actor): Extension<ActorContext>,
    Json(payload): Json<CreateTeamRequest>,
) -> ApiResult<(StatusCode, Json<TeamResponse>)> {
    let team = state
        .workspace_service
        .create_team(&actor, payload.stream_id, payload.name.as_str())
        .await?;

    Ok((StatusCode::CREATED, Json(TeamResponse::from(team))))
}

pub async fn list_teams_handler(
    State(state): State<AppState>,
    Extension(actor): Extension<ActorContext>,
    Query(query): Query<ListTeamsQuery>,
) -> ApiResult<Json<Vec<TeamResponse>>> {
    let teams = state
        .workspace_service
        .list_teams(&actor, query.stream_id)
        .await?
        .into_iter()
        .map(TeamResponse::from)
        .collect();

    Ok(Json(teams))
}

pub async fn get_stream_handler(
    State(state): State<AppState>,
    Extension(actor): Extension<ActorContext>,
    Path(stream_id): Path<Uuid>,
) -> ApiResult<Json<StreamDetailsResponse>> {
    let details = state
        .workspace_service
        .get_stream(&actor, stream_id)
        .await?;

    Ok(Json(StreamDetailsResponse::from(details)))
}

pub async fn list_stream_members_handler(
    State(state): State<AppState>,
    Extension(actor): Extension<ActorContext>,
    Path(stream_id): Path<Uuid>,
) -> ApiResult<Json<Vec<StreamMemberResponse>>> {
    let members = state
        .workspace_service
        .list_stream_members(&actor, stream_id)
        .await?
        .into_iter()
        .map(StreamMemberResponse::from)
        .collect();

    Ok(Json(members))
}

pub async fn add_stream_members_handler(
    State(state): State<AppState>,
    Extension(actor): Extension<ActorContext>,
    Path(stream_id): Path<Uuid>,
    Json(payload): Json<AddStreamMembersRequest>,
) -> ApiResult<(StatusCode, Json<Vec<StreamMemberResponse>>)> {
    let user_ids = payload
        .user_ids
        .into_iter()
        .map(UserId::from_uuid)
        .collect();
    let members = state
        .workspace_service
        .add_stream_members(&actor, stream_id, user_ids)
        .await?
        .into_iter()
        .map(StreamMemberResponse::from)
        .collect();

    Ok((StatusCode::CREATED, Json(members)))
}

pub async fn remove_stream_member_handler(
    State(state): State<AppState>,
    Extension(actor): Extension<ActorContext>,
    Path((stream_id, user_id)): Path<(Uuid, Uuid)>,
) -> ApiResult<StatusCode> {
    state
        .workspace_service
        .remove_stream_member(&actor, stream_id, UserId::from_uuid(user_id))
        .await?;

    Ok(StatusCode::NO_CONTENT)
}

pub async fn get_team_handler(
    State(state): State<AppState>,
    Extension(actor): Extension<ActorContext>,
    Path(team_id): Path<Uuid>,
) -> ApiResult<Json<TeamDetailsResponse>> {
    let details = state.workspace_service.get_team(&actor, team_id).await?;

    Ok(Json(TeamDetailsResponse::from(details)))
}

pub async fn delete_team_handler(
    State(state): State<AppState>,
    Extension(actor): Extension<ActorContext>,
    Path(team_id): Path<Uuid>,
) -> ApiResult<StatusCode> {
    state.workspace_service.delete_team(&actor, team_id).await?;

    Ok(StatusCode::NO_CONTENT)
}

pub async fn add_team_member_handler(
    State(state): State<AppState>,
    Extension(actor): Extension<ActorContext>,
    Path(team_id): Path<Uuid>,
    Json(payload): Json<AddTeamMemberRequest>,
) -> ApiResult<(StatusCode, Json<TeamMemberResponse>)> {
    let member = state
        .workspace_service
        .add_team_member(&actor, team_id, UserId::from_uuid(payload.user_id))
        .await?;

    Ok((StatusCode::CREATED, Json(TeamMemberResponse::from(member))))
}

pub async fn remove_team_member_handler(
    State(state): State<AppState>,
    Extension(actor): Extension<ActorContext>,
    Path((team_id, user_id)): Path<(Uuid, Uuid)>,
) -> ApiResult<StatusCode> {
    state
        .workspace_service
        .remove_team_member(&actor, team_id, UserId::from_uuid(user_id))
        .await?;

    Ok(StatusCode::NO_CONTENT)
}
