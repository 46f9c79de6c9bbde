use ts_rs::{Config, TS};
use workhive_domain::TaskPriority;

use super::{
    AddChecklistItemRequest, AddDependencyRequest, AddStreamMembersRequest, AddSubtaskRequest,
    AddTeamMemberRequest, AssignProjectTeamRequest, AssignTaskRequest, BacklogResponse,
    BoardResponse, BootstrapRequest, CardEntryResponse, CardResponse, ChangeMemberRoleRequest,
    ChecklistItemResponse, CreatePermissionRequest, CreateProjectRequest, CreateSprintRequest,
    CreateStreamRequest, CreateTaskRequest, CreateTeamRequest, CreatedTaskResponse,
    DependencyResponse, HealthResponse, InviteMemberRequest, MemberListingResponse, MemberResponse,
    MoveCardToColumnRequest, MoveCardToSprintRequest, PermissionResponse, ProjectResponse,
    ProjectSummaryResponse, RoleDefinitionResponse, RoleNameRequest, RoleResponse,
    SetChecklistItemDoneRequest, SprintResponse, StreamDetailsResponse, StreamMemberResponse,
    StreamResponse, TaskDetailsResponse, TaskResponse, TeamDetailsResponse, TeamMemberResponse,
    TeamResponse, UpdatePermissionRequest, UpdateProjectRequest, UpdateSprintRequest,
    UpdateTaskRequest, UserIdentityResponse, WorkspaceNameRequest, WorkspaceResponse,
    parse_priority,
};
use crate::error::ErrorResponse;

#[test]
fn export_ts_bindings() -> Result<(), ts_rs::ExportError> {
    let config = Config::default();

    BootstrapRequest::export(&config)?;
    WorkspaceNameRequest::export(&config)?;
    InviteMemberRequest::export(&config)?;
    ChangeMemberRoleRequest::export(&config)?;
    CreateStreamRequest::export(&config)?;
    CreateTeamRequest::export(&config)?;
    AddStreamMembersRequest::export(&config)?;
    AddTeamMemberRequest::export(&config)?;
    CreateProjectRequest::export(&config)?;
    UpdateProjectRequest::export(&config)?;
    AssignProjectTeamRequest::export(&config)?;
    CreateSprintRequest::export(&config)?;
    UpdateSprintRequest::export(&config)?;
    MoveCardToSprintRequest::export(&config)?;
    MoveCardToColumnRequest::export(&config)?;
    CreateTaskRequest::export(&config)?;
    UpdateTaskRequest::export(&config)?;
    AddSubtaskRequest::export(&config)?;
    AddDependencyRequest::export(&config)?;
    AssignTaskRequest::export(&config)?;
    AddChecklistItemRequest::export(&config)?;
    SetChecklistItemDoneRequest::export(&config)?;
    RoleNameRequest::export(&config)?;
    CreatePermissionRequest::export(&config)?;
    UpdatePermissionRequest::export(&config)?;
    HealthResponse::export(&config)?;
    UserIdentityResponse::export(&config)?;
    WorkspaceResponse::export(&config)?;
    MemberResponse::export(&config)?;
    MemberListingResponse::export(&config)?;
    StreamResponse::export(&config)?;
    TeamResponse::export(&config)?;
    StreamMemberResponse::export(&config)?;
    TeamMemberResponse::export(&config)?;
    StreamDetailsResponse::export(&config)?;
    TeamDetailsResponse::export(&config)?;
    ProjectResponse::export(&config)?;
    SprintResponse::export(&config)?;
    CardResponse::export(&config)?;
    CardEntryResponse::export(&config)?;
    BoardResponse::export(&config)?;
    BacklogResponse::export(&config)?;
    TaskResponse::export(&config)?;
    CreatedTaskResponse::export(&config)?;
    DependencyResponse::export(&config)?;
    ChecklistItemResponse::export(&config)?;
    TaskDetailsResponse::export(&config)?;
    ProjectSummaryResponse::export(&config)?;
    RoleResponse::export(&config)?;
    PermissionResponse::export(&config)?;
    RoleDefinitionResponse::export(&config)?;
    ErrorResponse::export(&config)?;

    Ok(())
}

#[test]
fn sprint_patch_keeps_missing_fields_apart_from_null() {
    let request = serde_json::from_str::<UpdateSprintRequest>(r#"{"goal":null}"#);
    assert!(request.is_ok());
    let request = request.unwrap_or_default();

    assert_eq!(request.goal, Some(None));
    assert_eq!(request.name, None);
    assert_eq!(request.start_date, None);
}

#[test]
fn task_patch_normalizes_priority_and_clears_due_date() {
    let request = serde_json::from_str::<UpdateTaskRequest>(
        r#"{"priority":"high","due_date":null,"labels":["docs"]}"#,
    )
    .unwrap_or_default();

    let update = request.into_update();
    assert!(update.as_ref().is_ok_and(|update| {
        update.priority == Some(TaskPriority::High)
            && update.due_date == Some(None)
            && update.description.is_none()
    }));
}

#[test]
fn unknown_priority_is_rejected() {
    assert!(parse_priority(Some("urgent".to_owned())).is_err());
    assert!(parse_priority(None).is_ok_and(|priority| priority.is_none()));
}

#[test]
fn project_patch_defaults_to_no_changes() {
    let request = serde_json::from_str::<UpdateProjectRequest>("{}").unwrap_or_default();
    assert!(request.name.is_none());
    assert!(request.description.is_none());
}
