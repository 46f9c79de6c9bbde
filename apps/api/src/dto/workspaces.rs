use serde::{Deserialize, Serialize};
use ts_rs::TS;
use uuid::Uuid;
use workhive_application::{MemberListing, StreamDetails, TeamDetails};
use workhive_domain::{Stream, StreamMember, Team, TeamMember, Workspace, WorkspaceMember};

/// Incoming payload for workspace creation and renaming.
#[derive(Debug, Deserialize, TS)]
#[ts(
    export,
    export_to = "../../../../packages/api-types/src/generated/workspace-name-request.ts"
)]
pub struct WorkspaceNameRequest {
    pub name: String,
}

/// Incoming payload for inviting a registered user.
#[derive(Debug, Deserialize, TS)]
#[ts(
    export,
    export_to = "../../../../packages/api-types/src/generated/invite-member-request.ts"
)]
pub struct InviteMemberRequest {
    #[ts(type = "string")]
    pub user_id: Uuid,
}

/// Incoming payload for a member role change.
#[derive(Debug, Deserialize, TS)]
#[ts(
    export,
    export_to = "../../../../packages/api-types/src/generated/change-member-role-request.ts"
)]
pub struct ChangeMemberRoleRequest {
    #[ts(type = "string")]
    pub role_id: Uuid,
}

/// Incoming payload for stream creation.
#[derive(Debug, Deserialize, TS)]
#[ts(
    export,
    export_to = "../../../../packages/api-types/src/generated/create-stream-request.ts"
)]
pub struct CreateStreamRequest {
    pub name: String,
}

/// Incoming payload for team creation.
#[derive(Debug, Deserialize, TS)]
#[ts(
    export,
    export_to = "../../../../packages/api-types/src/generated/create-team-request.ts"
)]
pub struct CreateTeamRequest {
    #[ts(type = "string")]
    pub stream_id: Uuid,
    pub name: String,
}

/// Incoming payload for adding workspace members to a stream.
#[derive(Debug, Deserialize, TS)]
#[ts(
    export,
    export_to = "../../../../packages/api-types/src/generated/add-stream-members-request.ts"
)]
pub struct AddStreamMembersRequest {
    #[ts(type = "Array<string>")]
    pub user_ids: Vec<Uuid>,
}

/// Incoming payload for adding a stream member to a team.
#[derive(Debug, Deserialize, TS)]
#[ts(
    export,
    export_to = "../../../../packages/api-types/src/generated/add-team-member-request.ts"
)]
pub struct AddTeamMemberRequest {
    #[ts(type = "string")]
    pub user_id: Uuid,
}

/// Query string for team listing.
#[derive(Debug, Deserialize)]
pub struct ListTeamsQuery {
    pub stream_id: Option<Uuid>,
}

/// API representation of a workspace.
#[derive(Debug, Serialize, TS)]
#[ts(
    export,
    export_to = "../../../../packages/api-types/src/generated/workspace-response.ts"
)]
pub struct WorkspaceResponse {
    pub workspace_id: String,
    pub name: String,
    pub owner_id: String,
    pub default_role_id: Option<String>,
    pub invite_link: String,
    pub subscription_tier: String,
    pub created_at: String,
}

impl From<Workspace> for WorkspaceResponse {
    fn from(value: Workspace) -> Self {
        Self {
            workspace_id: value.workspace_id().to_string(),
            name: value.name().to_string(),
            owner_id: value.owner_id().to_string(),
            default_role_id: value.default_role_id().map(|role_id| role_id.to_string()),
            invite_link: value.invite_link().to_string(),
            subscription_tier: value.subscription_tier().as_str().to_owned(),
            created_at: value.created_at().to_rfc3339(),
        }
    }
}

/// API representation of a workspace membership.
#[derive(Debug, Serialize, TS)]
#[ts(
    export,
    export_to = "../../../../packages/api-types/src/generated/member-response.ts"
)]
pub struct MemberResponse {
    pub member_id: String,
    pub workspace_id: String,
    pub user_id: String,
    pub role_id: String,
    pub status: String,
    pub joined_at: String,
}

impl From<WorkspaceMember> for MemberResponse {
    fn from(value: WorkspaceMember) -> Self {
        Self {
            member_id: value.member_id.to_string(),
            workspace_id: value.workspace_id.to_string(),
            user_id: value.user_id.to_string(),
            role_id: value.role_id.to_string(),
            status: value.status.as_str().to_owned(),
            joined_at: value.joined_at.to_rfc3339(),
        }
    }
}

/// Membership joined with the member's profile.
#[derive(Debug, Serialize, TS)]
#[ts(
    export,
    export_to = "../../../../packages/api-types/src/generated/member-listing-response.ts"
)]
pub struct MemberListingResponse {
    pub member: MemberResponse,
    pub display_name: String,
    pub email: Option<String>,
}

impl From<MemberListing> for MemberListingResponse {
    fn from(value: MemberListing) -> Self {
        Self {
            member: MemberResponse::from(value.member),
            display_name: value.user.display_name.to_string(),
            email: value.user.email,
        }
    }
}

/// API representation of a stream.
#[derive(Debug, Serialize, TS)]
#[ts(
    export,
    export_to = "../../../../packages/api-types/src/generated/stream-response.ts"
)]
pub struct StreamResponse {
    pub stream_id: String,
    pub name: String,
    pub created_by: String,
    pub created_at: String,
}

impl From<Stream> for StreamResponse {
    fn from(value: Stream) -> Self {
        Self {
            stream_id: value.stream_id.to_string(),
            name: value.name.to_string(),
            created_by: value.created_by.to_string(),
            created_at: value.created_at.to_rfc3339(),
        }
    }
}

/// API representation of a team.
#[derive(Debug, Serialize, TS)]
#[ts(
    export,
    export_to = "../../../../packages/api-types/src/generated/team-response.ts"
)]
pub struct TeamResponse {
    pub team_id: String,
    pub stream_id: String,
    pub name: String,
    pub created_at: String,
}

impl From<Team> for TeamResponse {
    fn from(value: Team) -> Self {
        Self {
            team_id: value.team_id.to_string(),
            stream_id: value.stream_id.to_string(),
            name: value.name.to_string(),
            created_at: value.created_at.to_rfc3339(),
        }
    }
}

#[derive(Debug, Serialize, TS)]
#[ts(
    export,
    export_to = "../../../../packages/api-types/src/generated/stream-member-response.ts"
)]
pub struct StreamMemberResponse {
    pub stream_id: String,
    pub user_id: String,
    pub joined_at: String,
}

impl From<StreamMember> for StreamMemberResponse {
    fn from(value: StreamMember) -> Self {
        Self {
            stream_id: value.stream_id.to_string(),
            user_id: value.user_id.to_string(),
            joined_at: value.joined_at.to_rfc3339(),
        }
    }
}

#[derive(Debug, Serialize, TS)]
#[ts(
    export,
    export_to = "../../../../packages/api-types/src/generated/team-member-response.ts"
)]
pub struct TeamMemberResponse {
    pub team_id: String,
    pub user_id: String,
    pub joined_at: String,
}

impl From<TeamMember> for TeamMemberResponse {
    fn from(value: TeamMember) -> Self {
        Self {
            team_id: value.team_id.to_string(),
            user_id: value.user_id.to_string(),
            joined_at: value.joined_at.to_rfc3339(),
        }
    }
}

/// Stream with its members and teams.
#[derive(Debug, Serialize, TS)]
#[ts(
    export,
    export_to = "../../../../packages/api-types/src/generated/stream-details-response.ts"
)]
pub struct StreamDetailsResponse {
    pub stream: StreamResponse,
    pub members: Vec<StreamMemberResponse>,
    pub teams: Vec<TeamResponse>,
}

impl From<StreamDetails> for StreamDetailsResponse {
    fn from(value: StreamDetails) -> Self {
        Self {
            stream: StreamResponse::from(value.stream),
            members: value
                .members
                .into_iter()
                .map(StreamMemberResponse::from)
                .collect(),
            teams: value.teams.into_iter().map(TeamResponse::from).collect(),
        }
    }
}

/// Team with its members.
#[derive(Debug, Serialize, TS)]
#[ts(
    export,
    export_to = "../../../../packages/api-types/src/generated/team-details-response.ts"
)]
pub struct TeamDetailsResponse {
    pub team: TeamResponse,
    pub members: Vec<TeamMemberResponse>,
}

impl From<TeamDetails> for TeamDetailsResponse {
    fn from(value: TeamDetails) -> Self {
        Self {
            team: TeamResponse::from(value.team),
            members: value
                .members
                .into_iter()
                .map(TeamMemberResponse::from)
                .collect(),
        }
    }
}
