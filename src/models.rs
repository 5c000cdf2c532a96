//! Domain types shared by the store and the API layer.
//!
//! Role and priority enums serialize to the SCREAMING_SNAKE_CASE strings
//! stored in SQLite and carried on the wire; structs serialize camelCase to
//! match the public API.

use std::str::FromStr;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: i64,
    pub email: String,
    pub name: String,
    /// Opaque bearer token identifying this user. Issued once at creation;
    /// only ever serialized back to its owner.
    pub api_token: String,
    pub created_at: String,
}

/// Public projection of a user, embedded in membership listings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserSummary {
    pub id: i64,
    pub email: String,
    pub name: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum WorkspaceRole {
    Owner,
    Admin,
    Member,
}

impl WorkspaceRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Owner => "OWNER",
            Self::Admin => "ADMIN",
            Self::Member => "MEMBER",
        }
    }
}

impl FromStr for WorkspaceRole {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "OWNER" => Ok(Self::Owner),
            "ADMIN" => Ok(Self::Admin),
            "MEMBER" => Ok(Self::Member),
            _ => Err(format!("Invalid workspace role: {}", s)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BoardRole {
    Admin,
    Member,
    Viewer,
}

impl BoardRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Admin => "ADMIN",
            Self::Member => "MEMBER",
            Self::Viewer => "VIEWER",
        }
    }
}

impl FromStr for BoardRole {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "ADMIN" => Ok(Self::Admin),
            "MEMBER" => Ok(Self::Member),
            "VIEWER" => Ok(Self::Viewer),
            _ => Err(format!("Invalid board role: {}", s)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Priority {
    Critical,
    High,
    Medium,
    Low,
}

impl Priority {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Critical => "CRITICAL",
            Self::High => "HIGH",
            Self::Medium => "MEDIUM",
            Self::Low => "LOW",
        }
    }
}

impl FromStr for Priority {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "CRITICAL" => Ok(Self::Critical),
            "HIGH" => Ok(Self::High),
            "MEDIUM" => Ok(Self::Medium),
            "LOW" => Ok(Self::Low),
            _ => Err(format!("Invalid priority: {}", s)),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Workspace {
    pub id: i64,
    pub name: String,
    pub description: Option<String>,
    pub owner_id: i64,
    pub created_at: String,
    pub updated_at: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkspaceMemberView {
    pub user: UserSummary,
    pub role: WorkspaceRole,
    pub joined_at: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Board {
    pub id: i64,
    pub workspace_id: i64,
    pub name: String,
    pub description: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BoardMemberView {
    pub user: UserSummary,
    pub role: BoardRole,
    pub joined_at: String,
}

/// A named column on a board holding an ordered list of tasks.
///
/// `position` is the ordering key among sibling lanes: unique in intent but
/// not enforced unique, and not required to be contiguous. `wip_limit` is
/// enforced at cross-lane move-time only.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Lane {
    pub id: i64,
    pub board_id: i64,
    pub name: String,
    pub position: i64,
    pub wip_limit: Option<i64>,
    pub created_at: String,
    pub updated_at: String,
}

/// A workspace-scoped tag that can be attached to tasks on any of the
/// workspace's boards. Names are unique per workspace.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Label {
    pub id: i64,
    pub workspace_id: i64,
    pub name: String,
    pub color: String,
    pub created_at: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    pub id: i64,
    pub board_id: i64,
    pub lane_id: i64,
    pub title: String,
    pub description: Option<String>,
    pub priority: Priority,
    pub position: i64,
    pub created_by: i64,
    pub created_at: String,
    pub updated_at: String,
}

// API view aggregates

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkspaceDetail {
    #[serde(flatten)]
    pub workspace: Workspace,
    pub members: Vec<WorkspaceMemberView>,
    pub boards: Vec<Board>,
}

/// Single-task view: the task plus its assignees and labels.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskDetail {
    #[serde(flatten)]
    pub task: Task,
    pub assignees: Vec<UserSummary>,
    pub labels: Vec<Label>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LaneWithTasks {
    #[serde(flatten)]
    pub lane: Lane,
    /// Tasks ordered by position ascending.
    pub tasks: Vec<Task>,
}

/// Full board view: lanes ordered by position ascending, each carrying its
/// tasks ordered by position ascending.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BoardDetail {
    #[serde(flatten)]
    pub board: Board,
    pub lanes: Vec<LaneWithTasks>,
    pub members: Vec<BoardMemberView>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_workspace_role_roundtrip() {
        for s in &["OWNER", "ADMIN", "MEMBER"] {
            let parsed: WorkspaceRole = s.parse().unwrap();
            assert_eq!(parsed.as_str(), *s);
        }
        assert!("owner".parse::<WorkspaceRole>().is_err());
    }

    #[test]
    fn test_board_role_roundtrip() {
        for s in &["ADMIN", "MEMBER", "VIEWER"] {
            let parsed: BoardRole = s.parse().unwrap();
            assert_eq!(parsed.as_str(), *s);
        }
        assert!("invalid".parse::<BoardRole>().is_err());
    }

    #[test]
    fn test_priority_roundtrip() {
        for s in &["CRITICAL", "HIGH", "MEDIUM", "LOW"] {
            let parsed: Priority = s.parse().unwrap();
            assert_eq!(parsed.as_str(), *s);
        }
        assert!("urgent".parse::<Priority>().is_err());
    }

    #[test]
    fn test_serde_produces_uppercase_strings() {
        assert_eq!(
            serde_json::to_string(&WorkspaceRole::Owner).unwrap(),
            "\"OWNER\""
        );
        assert_eq!(
            serde_json::to_string(&BoardRole::Viewer).unwrap(),
            "\"VIEWER\""
        );
        assert_eq!(
            serde_json::to_string(&Priority::Medium).unwrap(),
            "\"MEDIUM\""
        );
        assert_eq!(
            serde_json::from_str::<BoardRole>("\"MEMBER\"").unwrap(),
            BoardRole::Member
        );
    }

    #[test]
    fn test_lane_serializes_camel_case() {
        let lane = Lane {
            id: 1,
            board_id: 2,
            name: "To Do".into(),
            position: 0,
            wip_limit: None,
            created_at: "2026-01-01 00:00:00".into(),
            updated_at: "2026-01-01 00:00:00".into(),
        };
        let json = serde_json::to_value(&lane).unwrap();
        assert_eq!(json["boardId"], 2);
        assert!(json["wipLimit"].is_null());
        assert!(json.get("board_id").is_none());
    }

    #[test]
    fn test_board_detail_flattens_board_fields() {
        let board = Board {
            id: 7,
            workspace_id: 1,
            name: "Sprint".into(),
            description: None,
            created_at: "now".into(),
            updated_at: "now".into(),
        };
        let detail = BoardDetail {
            board,
            lanes: vec![],
            members: vec![],
        };
        let json = serde_json::to_value(&detail).unwrap();
        assert_eq!(json["id"], 7);
        assert_eq!(json["workspaceId"], 1);
        assert!(json["lanes"].as_array().unwrap().is_empty());
    }
}
