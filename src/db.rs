//! SQLite persistence layer.
//!
//! `Store` owns the connection and implements every domain operation,
//! including role checks and the transactional ordering operations.
//! `DbHandle` wraps it behind `Arc<Mutex>` and runs all access on tokio's
//! blocking thread pool via `spawn_blocking`, so synchronous SQLite I/O
//! never ties up async worker threads. The mutex also serializes every
//! read-then-write sequence within the process.

use std::path::Path;
use std::str::FromStr;
use std::sync::{Arc, Mutex};

use anyhow::anyhow;
use rusqlite::{params, Connection, OptionalExtension, Row};

use crate::error::DomainError;
use crate::models::{
    Board, BoardDetail, BoardMemberView, BoardRole, Label, Lane, LaneWithTasks, Priority, Task,
    TaskDetail, User, UserSummary, Workspace, WorkspaceDetail, WorkspaceMemberView, WorkspaceRole,
};
use crate::ordering;

pub type DbResult<T> = Result<T, DomainError>;

/// Lanes created on a new board when the caller asks for defaults.
/// Positions are the array indices; the middle-lane WIP limits are a
/// convention, not an invariant.
pub const DEFAULT_LANES: [(&str, Option<i64>); 4] = [
    ("To Do", None),
    ("In Progress", Some(3)),
    ("Review", Some(2)),
    ("Done", None),
];

/// Async-safe handle to the store.
#[derive(Clone)]
pub struct DbHandle {
    inner: Arc<Mutex<Store>>,
}

impl DbHandle {
    pub fn new(store: Store) -> Self {
        Self {
            inner: Arc::new(Mutex::new(store)),
        }
    }

    /// Run a closure with access to the store on a blocking thread.
    /// All data passed into `f` must be owned (`'static`).
    pub async fn call<F, R>(&self, f: F) -> DbResult<R>
    where
        F: FnOnce(&Store) -> DbResult<R> + Send + 'static,
        R: Send + 'static,
    {
        let store = self.inner.clone();
        tokio::task::spawn_blocking(move || {
            let guard = store
                .lock()
                .map_err(|_| DomainError::Internal(anyhow!("store lock poisoned")))?;
            f(&guard)
        })
        .await
        .map_err(|e| DomainError::Internal(anyhow!("store task panicked: {e}")))?
    }
}

pub struct Store {
    conn: Connection,
}

impl Store {
    /// Open (or create) a SQLite database at the given path and run migrations.
    pub fn new(path: &Path) -> anyhow::Result<Self> {
        let conn = Connection::open(path)
            .map_err(|e| anyhow!("Failed to open SQLite database: {e}"))?;
        let store = Self { conn };
        store.init()?;
        Ok(store)
    }

    /// Create an in-memory SQLite database (for testing).
    pub fn new_in_memory() -> anyhow::Result<Self> {
        let conn = Connection::open_in_memory()
            .map_err(|e| anyhow!("Failed to open in-memory SQLite database: {e}"))?;
        let store = Self { conn };
        store.init()?;
        Ok(store)
    }

    fn init(&self) -> anyhow::Result<()> {
        self.conn
            .execute_batch("PRAGMA foreign_keys = ON;")
            .map_err(|e| anyhow!("Failed to enable foreign keys: {e}"))?;
        self.run_migrations()
            .map_err(|e| anyhow!("Failed to run migrations: {e}"))?;
        Ok(())
    }

    fn run_migrations(&self) -> rusqlite::Result<()> {
        self.conn.execute_batch(
            "
            CREATE TABLE IF NOT EXISTS users (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                email TEXT NOT NULL UNIQUE,
                name TEXT NOT NULL,
                api_token TEXT NOT NULL UNIQUE,
                created_at TEXT NOT NULL DEFAULT (datetime('now'))
            );

            CREATE TABLE IF NOT EXISTS workspaces (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                name TEXT NOT NULL,
                description TEXT,
                owner_id INTEGER NOT NULL REFERENCES users(id),
                created_at TEXT NOT NULL DEFAULT (datetime('now')),
                updated_at TEXT NOT NULL DEFAULT (datetime('now'))
            );

            CREATE TABLE IF NOT EXISTS workspace_members (
                workspace_id INTEGER NOT NULL REFERENCES workspaces(id) ON DELETE CASCADE,
                user_id INTEGER NOT NULL REFERENCES users(id) ON DELETE CASCADE,
                role TEXT NOT NULL DEFAULT 'MEMBER',
                joined_at TEXT NOT NULL DEFAULT (datetime('now')),
                PRIMARY KEY (workspace_id, user_id)
            );

            CREATE TABLE IF NOT EXISTS boards (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                workspace_id INTEGER NOT NULL REFERENCES workspaces(id) ON DELETE CASCADE,
                name TEXT NOT NULL,
                description TEXT,
                created_at TEXT NOT NULL DEFAULT (datetime('now')),
                updated_at TEXT NOT NULL DEFAULT (datetime('now'))
            );

            CREATE TABLE IF NOT EXISTS board_members (
                board_id INTEGER NOT NULL REFERENCES boards(id) ON DELETE CASCADE,
                user_id INTEGER NOT NULL REFERENCES users(id) ON DELETE CASCADE,
                role TEXT NOT NULL DEFAULT 'MEMBER',
                joined_at TEXT NOT NULL DEFAULT (datetime('now')),
                PRIMARY KEY (board_id, user_id)
            );

            CREATE TABLE IF NOT EXISTS lanes (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                board_id INTEGER NOT NULL REFERENCES boards(id) ON DELETE CASCADE,
                name TEXT NOT NULL,
                position INTEGER NOT NULL DEFAULT 0,
                wip_limit INTEGER,
                created_at TEXT NOT NULL DEFAULT (datetime('now')),
                updated_at TEXT NOT NULL DEFAULT (datetime('now'))
            );

            CREATE TABLE IF NOT EXISTS tasks (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                board_id INTEGER NOT NULL REFERENCES boards(id) ON DELETE CASCADE,
                lane_id INTEGER NOT NULL REFERENCES lanes(id) ON DELETE CASCADE,
                title TEXT NOT NULL,
                description TEXT,
                priority TEXT NOT NULL DEFAULT 'MEDIUM',
                position INTEGER NOT NULL DEFAULT 0,
                created_by INTEGER NOT NULL REFERENCES users(id),
                created_at TEXT NOT NULL DEFAULT (datetime('now')),
                updated_at TEXT NOT NULL DEFAULT (datetime('now'))
            );

            CREATE TABLE IF NOT EXISTS labels (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                workspace_id INTEGER NOT NULL REFERENCES workspaces(id) ON DELETE CASCADE,
                name TEXT NOT NULL,
                color TEXT NOT NULL,
                created_at TEXT NOT NULL DEFAULT (datetime('now')),
                UNIQUE (workspace_id, name)
            );

            CREATE TABLE IF NOT EXISTS task_assignees (
                task_id INTEGER NOT NULL REFERENCES tasks(id) ON DELETE CASCADE,
                user_id INTEGER NOT NULL REFERENCES users(id) ON DELETE CASCADE,
                assigned_at TEXT NOT NULL DEFAULT (datetime('now')),
                PRIMARY KEY (task_id, user_id)
            );

            CREATE TABLE IF NOT EXISTS task_labels (
                task_id INTEGER NOT NULL REFERENCES tasks(id) ON DELETE CASCADE,
                label_id INTEGER NOT NULL REFERENCES labels(id) ON DELETE CASCADE,
                PRIMARY KEY (task_id, label_id)
            );

            CREATE INDEX IF NOT EXISTS idx_boards_workspace ON boards(workspace_id);
            CREATE INDEX IF NOT EXISTS idx_labels_workspace ON labels(workspace_id);
            CREATE INDEX IF NOT EXISTS idx_lanes_board ON lanes(board_id, position);
            CREATE INDEX IF NOT EXISTS idx_tasks_board ON tasks(board_id);
            CREATE INDEX IF NOT EXISTS idx_tasks_lane ON tasks(lane_id, position);
            ",
        )
    }

    // ── Users ─────────────────────────────────────────────────────────

    pub fn create_user(&self, email: &str, name: &str) -> DbResult<User> {
        let token = uuid::Uuid::new_v4().to_string();
        match self.conn.execute(
            "INSERT INTO users (email, name, api_token) VALUES (?1, ?2, ?3)",
            params![email, name, token],
        ) {
            Ok(_) => {}
            Err(e) if is_unique_violation(&e) => {
                return Err(DomainError::Conflict(
                    "A user with this email already exists".into(),
                ))
            }
            Err(e) => return Err(e.into()),
        }
        let id = self.conn.last_insert_rowid();
        self.get_user(id)?
            .ok_or_else(|| DomainError::Internal(anyhow!("User not found after insert")))
    }

    pub fn get_user(&self, id: i64) -> DbResult<Option<User>> {
        let user = self
            .conn
            .query_row(
                "SELECT id, email, name, api_token, created_at FROM users WHERE id = ?1",
                params![id],
                map_user,
            )
            .optional()?;
        Ok(user)
    }

    pub fn user_by_token(&self, token: &str) -> DbResult<Option<User>> {
        let user = self
            .conn
            .query_row(
                "SELECT id, email, name, api_token, created_at FROM users WHERE api_token = ?1",
                params![token],
                map_user,
            )
            .optional()?;
        Ok(user)
    }

    // ── Workspaces ────────────────────────────────────────────────────

    pub fn create_workspace(
        &self,
        user_id: i64,
        name: &str,
        description: Option<&str>,
    ) -> DbResult<WorkspaceDetail> {
        let tx = self.conn.unchecked_transaction()?;
        tx.execute(
            "INSERT INTO workspaces (name, description, owner_id) VALUES (?1, ?2, ?3)",
            params![name, description, user_id],
        )?;
        let id = tx.last_insert_rowid();
        tx.execute(
            "INSERT INTO workspace_members (workspace_id, user_id, role) VALUES (?1, ?2, 'OWNER')",
            params![id, user_id],
        )?;
        tx.commit()?;
        self.workspace_detail(id)
    }

    pub fn list_workspaces(&self, user_id: i64) -> DbResult<Vec<Workspace>> {
        let mut stmt = self.conn.prepare(
            "SELECT w.id, w.name, w.description, w.owner_id, w.created_at, w.updated_at
             FROM workspaces w
             JOIN workspace_members m ON m.workspace_id = w.id
             WHERE m.user_id = ?1
             ORDER BY w.created_at DESC, w.id DESC",
        )?;
        let rows = stmt.query_map(params![user_id], map_workspace)?;
        collect_rows(rows)
    }

    pub fn get_workspace(&self, workspace_id: i64, user_id: i64) -> DbResult<WorkspaceDetail> {
        let detail = self.workspace_detail(workspace_id)?;
        let is_member = detail
            .members
            .iter()
            .any(|member| member.user.id == user_id);
        if !is_member {
            return Err(DomainError::Forbidden(
                "You do not have access to this workspace".into(),
            ));
        }
        Ok(detail)
    }

    pub fn update_workspace(
        &self,
        workspace_id: i64,
        user_id: i64,
        name: Option<&str>,
        description: Option<Option<&str>>,
    ) -> DbResult<WorkspaceDetail> {
        self.require_workspace_role(
            workspace_id,
            user_id,
            &[WorkspaceRole::Owner, WorkspaceRole::Admin],
        )?;

        let tx = self.conn.unchecked_transaction()?;
        if let Some(n) = name {
            tx.execute(
                "UPDATE workspaces SET name = ?1, updated_at = datetime('now') WHERE id = ?2",
                params![n, workspace_id],
            )?;
        }
        // Tri-state: absent skips, null clears, a value sets.
        if let Some(d) = description {
            tx.execute(
                "UPDATE workspaces SET description = ?1, updated_at = datetime('now') WHERE id = ?2",
                params![d, workspace_id],
            )?;
        }
        tx.commit()?;
        self.workspace_detail(workspace_id)
    }

    pub fn delete_workspace(&self, workspace_id: i64, user_id: i64) -> DbResult<()> {
        self.require_workspace_role(workspace_id, user_id, &[WorkspaceRole::Owner])?;
        self.conn.execute(
            "DELETE FROM workspaces WHERE id = ?1",
            params![workspace_id],
        )?;
        Ok(())
    }

    pub fn workspace_members(
        &self,
        workspace_id: i64,
        user_id: i64,
    ) -> DbResult<Vec<WorkspaceMemberView>> {
        self.require_workspace_role(
            workspace_id,
            user_id,
            &[
                WorkspaceRole::Owner,
                WorkspaceRole::Admin,
                WorkspaceRole::Member,
            ],
        )?;
        self.list_workspace_members(workspace_id)
    }

    pub fn add_workspace_member(
        &self,
        workspace_id: i64,
        user_id: i64,
        new_user_id: i64,
        role: WorkspaceRole,
    ) -> DbResult<WorkspaceMemberView> {
        self.require_workspace_role(
            workspace_id,
            user_id,
            &[WorkspaceRole::Owner, WorkspaceRole::Admin],
        )?;

        if self.get_user(new_user_id)?.is_none() {
            return Err(DomainError::NotFound("User not found".into()));
        }
        if self.workspace_role(workspace_id, new_user_id)?.is_some() {
            return Err(DomainError::Conflict(
                "User is already a member of this workspace".into(),
            ));
        }

        self.conn.execute(
            "INSERT INTO workspace_members (workspace_id, user_id, role) VALUES (?1, ?2, ?3)",
            params![workspace_id, new_user_id, role.as_str()],
        )?;
        self.workspace_member_view(workspace_id, new_user_id)?
            .ok_or_else(|| DomainError::Internal(anyhow!("Member not found after insert")))
    }

    pub fn remove_workspace_member(
        &self,
        workspace_id: i64,
        user_id: i64,
        member_user_id: i64,
    ) -> DbResult<()> {
        self.require_workspace_role(
            workspace_id,
            user_id,
            &[WorkspaceRole::Owner, WorkspaceRole::Admin],
        )?;

        let role = self
            .workspace_role(workspace_id, member_user_id)?
            .ok_or_else(|| {
                DomainError::NotFound("Member not found in this workspace".into())
            })?;
        if role == WorkspaceRole::Owner {
            return Err(DomainError::BadRequest(
                "Cannot remove workspace owner".into(),
            ));
        }

        self.conn.execute(
            "DELETE FROM workspace_members WHERE workspace_id = ?1 AND user_id = ?2",
            params![workspace_id, member_user_id],
        )?;
        Ok(())
    }

    pub fn update_workspace_member_role(
        &self,
        workspace_id: i64,
        user_id: i64,
        member_user_id: i64,
        role: WorkspaceRole,
    ) -> DbResult<WorkspaceMemberView> {
        self.require_workspace_role(workspace_id, user_id, &[WorkspaceRole::Owner])?;

        if self.workspace_role(workspace_id, member_user_id)?.is_none() {
            return Err(DomainError::NotFound(
                "Member not found in this workspace".into(),
            ));
        }

        self.conn.execute(
            "UPDATE workspace_members SET role = ?1 WHERE workspace_id = ?2 AND user_id = ?3",
            params![role.as_str(), workspace_id, member_user_id],
        )?;
        self.workspace_member_view(workspace_id, member_user_id)?
            .ok_or_else(|| DomainError::Internal(anyhow!("Member not found after update")))
    }

    pub fn workspace_role(
        &self,
        workspace_id: i64,
        user_id: i64,
    ) -> DbResult<Option<WorkspaceRole>> {
        let raw: Option<String> = self
            .conn
            .query_row(
                "SELECT role FROM workspace_members WHERE workspace_id = ?1 AND user_id = ?2",
                params![workspace_id, user_id],
                |row| row.get(0),
            )
            .optional()?;
        raw.map(|r| {
            WorkspaceRole::from_str(&r).map_err(|e| DomainError::Internal(anyhow!(e)))
        })
        .transpose()
    }

    fn require_workspace_role(
        &self,
        workspace_id: i64,
        user_id: i64,
        allowed: &[WorkspaceRole],
    ) -> DbResult<WorkspaceRole> {
        let role = self.workspace_role(workspace_id, user_id)?.ok_or_else(|| {
            DomainError::Forbidden("You do not have access to this workspace".into())
        })?;
        if !allowed.contains(&role) {
            return Err(DomainError::Forbidden(
                "You do not have permission to perform this action".into(),
            ));
        }
        Ok(role)
    }

    fn workspace_detail(&self, workspace_id: i64) -> DbResult<WorkspaceDetail> {
        let workspace = self
            .conn
            .query_row(
                "SELECT id, name, description, owner_id, created_at, updated_at
                 FROM workspaces WHERE id = ?1",
                params![workspace_id],
                map_workspace,
            )
            .optional()?
            .ok_or_else(|| DomainError::NotFound("Workspace not found".into()))?;

        let members = self.list_workspace_members(workspace_id)?;

        let mut stmt = self.conn.prepare(
            "SELECT id, workspace_id, name, description, created_at, updated_at
             FROM boards WHERE workspace_id = ?1 ORDER BY created_at DESC, id DESC",
        )?;
        let rows = stmt.query_map(params![workspace_id], map_board)?;
        let boards = collect_rows(rows)?;

        Ok(WorkspaceDetail {
            workspace,
            members,
            boards,
        })
    }

    fn list_workspace_members(&self, workspace_id: i64) -> DbResult<Vec<WorkspaceMemberView>> {
        let mut stmt = self.conn.prepare(
            "SELECT u.id, u.email, u.name, m.role, m.joined_at
             FROM workspace_members m
             JOIN users u ON u.id = m.user_id
             WHERE m.workspace_id = ?1
             ORDER BY m.joined_at, u.id",
        )?;
        let rows = stmt.query_map(params![workspace_id], map_workspace_member)?;
        collect_rows(rows)
    }

    fn workspace_member_view(
        &self,
        workspace_id: i64,
        member_user_id: i64,
    ) -> DbResult<Option<WorkspaceMemberView>> {
        let view = self
            .conn
            .query_row(
                "SELECT u.id, u.email, u.name, m.role, m.joined_at
                 FROM workspace_members m
                 JOIN users u ON u.id = m.user_id
                 WHERE m.workspace_id = ?1 AND m.user_id = ?2",
                params![workspace_id, member_user_id],
                map_workspace_member,
            )
            .optional()?;
        Ok(view)
    }

    // ── Boards ────────────────────────────────────────────────────────

    pub fn create_board(
        &self,
        user_id: i64,
        workspace_id: i64,
        name: &str,
        description: Option<&str>,
        create_default_lanes: bool,
    ) -> DbResult<BoardDetail> {
        // Any workspace member may create a board; the creator becomes
        // its first ADMIN.
        if self.workspace_role(workspace_id, user_id)?.is_none() {
            return Err(DomainError::Forbidden(
                "You do not have access to this workspace".into(),
            ));
        }

        let tx = self.conn.unchecked_transaction()?;
        tx.execute(
            "INSERT INTO boards (workspace_id, name, description) VALUES (?1, ?2, ?3)",
            params![workspace_id, name, description],
        )?;
        let board_id = tx.last_insert_rowid();
        tx.execute(
            "INSERT INTO board_members (board_id, user_id, role) VALUES (?1, ?2, 'ADMIN')",
            params![board_id, user_id],
        )?;
        if create_default_lanes {
            for (position, (lane_name, wip_limit)) in DEFAULT_LANES.iter().enumerate() {
                tx.execute(
                    "INSERT INTO lanes (board_id, name, position, wip_limit) VALUES (?1, ?2, ?3, ?4)",
                    params![board_id, lane_name, position as i64, wip_limit],
                )?;
            }
        }
        tx.commit()?;
        self.board_detail(board_id)
    }

    pub fn list_boards(&self, user_id: i64, workspace_id: Option<i64>) -> DbResult<Vec<Board>> {
        let mut stmt = self.conn.prepare(
            "SELECT b.id, b.workspace_id, b.name, b.description, b.created_at, b.updated_at
             FROM boards b
             JOIN board_members m ON m.board_id = b.id
             WHERE m.user_id = ?1 AND (?2 IS NULL OR b.workspace_id = ?2)
             ORDER BY b.created_at DESC, b.id DESC",
        )?;
        let rows = stmt.query_map(params![user_id, workspace_id], map_board)?;
        collect_rows(rows)
    }

    pub fn get_board(&self, board_id: i64, user_id: i64) -> DbResult<BoardDetail> {
        let detail = self.board_detail(board_id)?;
        let is_member = detail.members.iter().any(|m| m.user.id == user_id);
        if !is_member {
            return Err(DomainError::Forbidden(
                "You do not have access to this board".into(),
            ));
        }
        Ok(detail)
    }

    pub fn update_board(
        &self,
        board_id: i64,
        user_id: i64,
        name: Option<&str>,
        description: Option<Option<&str>>,
    ) -> DbResult<BoardDetail> {
        self.require_board_role(board_id, user_id, &[BoardRole::Admin])?;

        let tx = self.conn.unchecked_transaction()?;
        if let Some(n) = name {
            tx.execute(
                "UPDATE boards SET name = ?1, updated_at = datetime('now') WHERE id = ?2",
                params![n, board_id],
            )?;
        }
        if let Some(d) = description {
            tx.execute(
                "UPDATE boards SET description = ?1, updated_at = datetime('now') WHERE id = ?2",
                params![d, board_id],
            )?;
        }
        tx.commit()?;
        self.board_detail(board_id)
    }

    pub fn delete_board(&self, board_id: i64, user_id: i64) -> DbResult<()> {
        self.require_board_role(board_id, user_id, &[BoardRole::Admin])?;
        self.conn
            .execute("DELETE FROM boards WHERE id = ?1", params![board_id])?;
        Ok(())
    }

    pub fn board_members(&self, board_id: i64, user_id: i64) -> DbResult<Vec<BoardMemberView>> {
        self.require_board_role(
            board_id,
            user_id,
            &[BoardRole::Admin, BoardRole::Member, BoardRole::Viewer],
        )?;
        self.list_board_members(board_id)
    }

    pub fn add_board_member(
        &self,
        board_id: i64,
        user_id: i64,
        new_user_id: i64,
        role: BoardRole,
    ) -> DbResult<BoardMemberView> {
        self.require_board_role(board_id, user_id, &[BoardRole::Admin])?;

        if self.get_user(new_user_id)?.is_none() {
            return Err(DomainError::NotFound("User not found".into()));
        }
        if self.board_role(board_id, new_user_id)?.is_some() {
            return Err(DomainError::Conflict(
                "User is already a member of this board".into(),
            ));
        }

        self.conn.execute(
            "INSERT INTO board_members (board_id, user_id, role) VALUES (?1, ?2, ?3)",
            params![board_id, new_user_id, role.as_str()],
        )?;
        self.board_member_view(board_id, new_user_id)?
            .ok_or_else(|| DomainError::Internal(anyhow!("Member not found after insert")))
    }

    pub fn remove_board_member(
        &self,
        board_id: i64,
        user_id: i64,
        member_user_id: i64,
    ) -> DbResult<()> {
        self.require_board_role(board_id, user_id, &[BoardRole::Admin])?;

        if self.board_role(board_id, member_user_id)?.is_none() {
            return Err(DomainError::NotFound(
                "Member not found in this board".into(),
            ));
        }

        self.conn.execute(
            "DELETE FROM board_members WHERE board_id = ?1 AND user_id = ?2",
            params![board_id, member_user_id],
        )?;
        Ok(())
    }

    pub fn board_role(&self, board_id: i64, user_id: i64) -> DbResult<Option<BoardRole>> {
        let raw: Option<String> = self
            .conn
            .query_row(
                "SELECT role FROM board_members WHERE board_id = ?1 AND user_id = ?2",
                params![board_id, user_id],
                |row| row.get(0),
            )
            .optional()?;
        raw.map(|r| BoardRole::from_str(&r).map_err(|e| DomainError::Internal(anyhow!(e))))
            .transpose()
    }

    fn require_board_role(
        &self,
        board_id: i64,
        user_id: i64,
        allowed: &[BoardRole],
    ) -> DbResult<BoardRole> {
        let role = self.board_role(board_id, user_id)?.ok_or_else(|| {
            DomainError::Forbidden("You do not have access to this board".into())
        })?;
        if !allowed.contains(&role) {
            return Err(DomainError::Forbidden(
                "You do not have permission to perform this action".into(),
            ));
        }
        Ok(role)
    }

    fn board_detail(&self, board_id: i64) -> DbResult<BoardDetail> {
        let board = self
            .conn
            .query_row(
                "SELECT id, workspace_id, name, description, created_at, updated_at
                 FROM boards WHERE id = ?1",
                params![board_id],
                map_board,
            )
            .optional()?
            .ok_or_else(|| DomainError::NotFound("Board not found".into()))?;

        let lanes = self.lanes_for_board(board_id)?;
        let mut lanes_with_tasks = Vec::with_capacity(lanes.len());
        for lane in lanes {
            let tasks = self.tasks_for_lane(lane.id)?;
            lanes_with_tasks.push(LaneWithTasks { lane, tasks });
        }

        let members = self.list_board_members(board_id)?;

        Ok(BoardDetail {
            board,
            lanes: lanes_with_tasks,
            members,
        })
    }

    fn list_board_members(&self, board_id: i64) -> DbResult<Vec<BoardMemberView>> {
        let mut stmt = self.conn.prepare(
            "SELECT u.id, u.email, u.name, m.role, m.joined_at
             FROM board_members m
             JOIN users u ON u.id = m.user_id
             WHERE m.board_id = ?1
             ORDER BY m.joined_at, u.id",
        )?;
        let rows = stmt.query_map(params![board_id], map_board_member)?;
        collect_rows(rows)
    }

    fn board_member_view(
        &self,
        board_id: i64,
        member_user_id: i64,
    ) -> DbResult<Option<BoardMemberView>> {
        let view = self
            .conn
            .query_row(
                "SELECT u.id, u.email, u.name, m.role, m.joined_at
                 FROM board_members m
                 JOIN users u ON u.id = m.user_id
                 WHERE m.board_id = ?1 AND m.user_id = ?2",
                params![board_id, member_user_id],
                map_board_member,
            )
            .optional()?;
        Ok(view)
    }

    // ── Lanes ─────────────────────────────────────────────────────────

    pub fn create_lane(
        &self,
        board_id: i64,
        user_id: i64,
        name: &str,
        position: Option<i64>,
        wip_limit: Option<i64>,
    ) -> DbResult<Lane> {
        self.require_board_role(board_id, user_id, &[BoardRole::Admin, BoardRole::Member])?;

        // Append to the end of the board when no position is supplied.
        let position = match position {
            Some(p) => p,
            None => ordering::append_position(self.lane_positions(board_id)?),
        };

        self.conn.execute(
            "INSERT INTO lanes (board_id, name, position, wip_limit) VALUES (?1, ?2, ?3, ?4)",
            params![board_id, name, position, wip_limit],
        )?;
        let id = self.conn.last_insert_rowid();
        self.get_lane(id)?
            .ok_or_else(|| DomainError::Internal(anyhow!("Lane not found after insert")))
    }

    pub fn update_lane(
        &self,
        board_id: i64,
        lane_id: i64,
        user_id: i64,
        name: Option<&str>,
        position: Option<i64>,
        wip_limit: Option<Option<i64>>,
    ) -> DbResult<Lane> {
        self.require_board_role(board_id, user_id, &[BoardRole::Admin, BoardRole::Member])?;
        self.lane_in_board(board_id, lane_id)?;

        let tx = self.conn.unchecked_transaction()?;
        if let Some(n) = name {
            tx.execute(
                "UPDATE lanes SET name = ?1, updated_at = datetime('now') WHERE id = ?2",
                params![n, lane_id],
            )?;
        }
        if let Some(p) = position {
            tx.execute(
                "UPDATE lanes SET position = ?1, updated_at = datetime('now') WHERE id = ?2",
                params![p, lane_id],
            )?;
        }
        // Tri-state: absent leaves the limit alone, null clears it, a value
        // sets it. Lowering a limit never evicts tasks already in the lane.
        if let Some(limit) = wip_limit {
            tx.execute(
                "UPDATE lanes SET wip_limit = ?1, updated_at = datetime('now') WHERE id = ?2",
                params![limit, lane_id],
            )?;
        }
        tx.commit()?;
        self.get_lane(lane_id)?
            .ok_or_else(|| DomainError::Internal(anyhow!("Lane not found after update")))
    }

    pub fn delete_lane(&self, board_id: i64, lane_id: i64, user_id: i64) -> DbResult<()> {
        self.require_board_role(board_id, user_id, &[BoardRole::Admin])?;
        self.lane_in_board(board_id, lane_id)?;

        let task_count: i64 = self.conn.query_row(
            "SELECT COUNT(*) FROM tasks WHERE lane_id = ?1",
            params![lane_id],
            |row| row.get(0),
        )?;
        if task_count > 0 {
            return Err(DomainError::BadRequest(
                "Cannot delete lane with tasks. Move or delete tasks first.".into(),
            ));
        }

        self.conn
            .execute("DELETE FROM lanes WHERE id = ?1", params![lane_id])?;
        Ok(())
    }

    /// Apply every `(lane_id, position)` pair in one transaction,
    /// all-or-nothing. Every submitted lane must belong to the board; a
    /// foreign or unknown id rejects the whole batch before any update.
    pub fn reorder_lanes(
        &self,
        board_id: i64,
        user_id: i64,
        assignments: &[(i64, i64)],
    ) -> DbResult<Vec<Lane>> {
        self.require_board_role(board_id, user_id, &[BoardRole::Admin, BoardRole::Member])?;

        let tx = self.conn.unchecked_transaction()?;
        for (lane_id, _) in assignments {
            let owner: Option<i64> = tx
                .query_row(
                    "SELECT board_id FROM lanes WHERE id = ?1",
                    params![lane_id],
                    |row| row.get(0),
                )
                .optional()?;
            if owner != Some(board_id) {
                return Err(DomainError::BadRequest(format!(
                    "Lane {} does not belong to this board",
                    lane_id
                )));
            }
        }
        for (lane_id, position) in assignments {
            tx.execute(
                "UPDATE lanes SET position = ?1, updated_at = datetime('now') WHERE id = ?2",
                params![position, lane_id],
            )?;
        }
        tx.commit()?;
        self.lanes_for_board(board_id)
    }

    pub fn get_lane(&self, lane_id: i64) -> DbResult<Option<Lane>> {
        let lane = self
            .conn
            .query_row(
                "SELECT id, board_id, name, position, wip_limit, created_at, updated_at
                 FROM lanes WHERE id = ?1",
                params![lane_id],
                map_lane,
            )
            .optional()?;
        Ok(lane)
    }

    pub fn lanes_for_board(&self, board_id: i64) -> DbResult<Vec<Lane>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, board_id, name, position, wip_limit, created_at, updated_at
             FROM lanes WHERE board_id = ?1 ORDER BY position, id",
        )?;
        let rows = stmt.query_map(params![board_id], map_lane)?;
        collect_rows(rows)
    }

    fn lane_positions(&self, board_id: i64) -> DbResult<Vec<i64>> {
        let mut stmt = self
            .conn
            .prepare("SELECT position FROM lanes WHERE board_id = ?1")?;
        let rows = stmt.query_map(params![board_id], |row| row.get(0))?;
        collect_rows(rows)
    }

    fn lane_in_board(&self, board_id: i64, lane_id: i64) -> DbResult<Lane> {
        match self.get_lane(lane_id)? {
            Some(lane) if lane.board_id == board_id => Ok(lane),
            _ => Err(DomainError::NotFound(
                "Lane not found in this board".into(),
            )),
        }
    }

    // ── Tasks ─────────────────────────────────────────────────────────

    pub fn create_task(&self, user_id: i64, new: NewTask) -> DbResult<Task> {
        let role = self.board_role(new.board_id, user_id)?.ok_or_else(|| {
            DomainError::Forbidden("You do not have access to this board".into())
        })?;
        if role == BoardRole::Viewer {
            return Err(DomainError::Forbidden("Viewers cannot create tasks".into()));
        }

        // Unlike lane update/delete, a bad lane reference here is a caller
        // mistake in the request body, not a missing resource.
        match self.get_lane(new.lane_id)? {
            Some(lane) if lane.board_id == new.board_id => {}
            _ => {
                return Err(DomainError::BadRequest(
                    "Lane not found in this board".into(),
                ))
            }
        }

        let position = match new.position {
            Some(p) => p,
            None => ordering::append_position(self.task_positions(new.lane_id)?),
        };

        self.conn.execute(
            "INSERT INTO tasks (board_id, lane_id, title, description, priority, position, created_by)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
            params![
                new.board_id,
                new.lane_id,
                new.title,
                new.description,
                new.priority.as_str(),
                position,
                user_id
            ],
        )?;
        let id = self.conn.last_insert_rowid();
        self.get_task(id)?
            .ok_or_else(|| DomainError::Internal(anyhow!("Task not found after insert")))
    }

    pub fn list_tasks(
        &self,
        user_id: i64,
        board_id: Option<i64>,
        lane_id: Option<i64>,
    ) -> DbResult<Vec<Task>> {
        let mut stmt = self.conn.prepare(
            "SELECT t.id, t.board_id, t.lane_id, t.title, t.description, t.priority,
                    t.position, t.created_by, t.created_at, t.updated_at
             FROM tasks t
             JOIN board_members m ON m.board_id = t.board_id
             WHERE m.user_id = ?1
               AND (?2 IS NULL OR t.board_id = ?2)
               AND (?3 IS NULL OR t.lane_id = ?3)
             ORDER BY t.board_id, t.lane_id, t.position, t.id",
        )?;
        let rows = stmt.query_map(params![user_id, board_id, lane_id], map_task)?;
        collect_rows(rows)
    }

    pub fn get_task_for_user(&self, task_id: i64, user_id: i64) -> DbResult<(Task, BoardRole)> {
        let task = self
            .get_task(task_id)?
            .ok_or_else(|| DomainError::NotFound("Task not found".into()))?;
        let role = self.board_role(task.board_id, user_id)?.ok_or_else(|| {
            DomainError::Forbidden("You do not have access to this task".into())
        })?;
        Ok((task, role))
    }

    pub fn update_task(&self, task_id: i64, user_id: i64, patch: TaskPatch) -> DbResult<Task> {
        let (_, role) = self.get_task_for_user(task_id, user_id)?;
        if role == BoardRole::Viewer {
            return Err(DomainError::Forbidden("Viewers cannot update tasks".into()));
        }

        let tx = self.conn.unchecked_transaction()?;
        if let Some(title) = &patch.title {
            tx.execute(
                "UPDATE tasks SET title = ?1, updated_at = datetime('now') WHERE id = ?2",
                params![title, task_id],
            )?;
        }
        // Tri-state like the lane's wipLimit: null clears the description.
        if let Some(description) = &patch.description {
            tx.execute(
                "UPDATE tasks SET description = ?1, updated_at = datetime('now') WHERE id = ?2",
                params![description, task_id],
            )?;
        }
        if let Some(priority) = patch.priority {
            tx.execute(
                "UPDATE tasks SET priority = ?1, updated_at = datetime('now') WHERE id = ?2",
                params![priority.as_str(), task_id],
            )?;
        }
        if let Some(position) = patch.position {
            tx.execute(
                "UPDATE tasks SET position = ?1, updated_at = datetime('now') WHERE id = ?2",
                params![position, task_id],
            )?;
        }
        tx.commit()?;
        self.get_task(task_id)?
            .ok_or_else(|| DomainError::Internal(anyhow!("Task not found after update")))
    }

    pub fn delete_task(&self, task_id: i64, user_id: i64) -> DbResult<()> {
        let (_, role) = self.get_task_for_user(task_id, user_id)?;
        if role == BoardRole::Viewer {
            return Err(DomainError::Forbidden("Viewers cannot delete tasks".into()));
        }
        self.conn
            .execute("DELETE FROM tasks WHERE id = ?1", params![task_id])?;
        Ok(())
    }

    /// Move a task to a lane/position, enforcing the target lane's WIP
    /// limit on cross-lane moves. The lane lookup, occupancy count, and
    /// update run in a single transaction, so the admission check cannot
    /// race another mover into an over-limit commit.
    pub fn move_task(
        &self,
        task_id: i64,
        user_id: i64,
        lane_id: i64,
        position: i64,
    ) -> DbResult<Task> {
        let (task, role) = self.get_task_for_user(task_id, user_id)?;
        if role == BoardRole::Viewer {
            return Err(DomainError::Forbidden("Viewers cannot move tasks".into()));
        }

        let tx = self.conn.unchecked_transaction()?;

        let lane: Option<Lane> = tx
            .query_row(
                "SELECT id, board_id, name, position, wip_limit, created_at, updated_at
                 FROM lanes WHERE id = ?1",
                params![lane_id],
                map_lane,
            )
            .optional()?;
        let lane = match lane {
            Some(lane) if lane.board_id == task.board_id => lane,
            _ => {
                return Err(DomainError::BadRequest(
                    "Lane not found in this board".into(),
                ))
            }
        };

        let same_lane = lane.id == task.lane_id;
        if let Some(limit) = lane.wip_limit {
            // Committed occupancy of the target lane, excluding the task
            // being moved (it has not been re-assigned yet).
            let occupancy: i64 = tx.query_row(
                "SELECT COUNT(*) FROM tasks WHERE lane_id = ?1 AND id != ?2",
                params![lane.id, task.id],
                |row| row.get(0),
            )?;
            if !ordering::wip_allows_move(Some(limit), occupancy, same_lane) {
                return Err(DomainError::BadRequest(format!(
                    "Cannot move task. Lane has reached WIP limit of {}",
                    limit
                )));
            }
        }

        tx.execute(
            "UPDATE tasks SET lane_id = ?1, position = ?2, updated_at = datetime('now') WHERE id = ?3",
            params![lane.id, position, task.id],
        )?;
        tx.commit()?;

        self.get_task(task_id)?
            .ok_or_else(|| DomainError::Internal(anyhow!("Task not found after move")))
    }

    pub fn get_task(&self, task_id: i64) -> DbResult<Option<Task>> {
        let task = self
            .conn
            .query_row(
                "SELECT id, board_id, lane_id, title, description, priority,
                        position, created_by, created_at, updated_at
                 FROM tasks WHERE id = ?1",
                params![task_id],
                map_task,
            )
            .optional()?;
        Ok(task)
    }

    pub fn tasks_for_lane(&self, lane_id: i64) -> DbResult<Vec<Task>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, board_id, lane_id, title, description, priority,
                    position, created_by, created_at, updated_at
             FROM tasks WHERE lane_id = ?1 ORDER BY position, id",
        )?;
        let rows = stmt.query_map(params![lane_id], map_task)?;
        collect_rows(rows)
    }

    fn task_positions(&self, lane_id: i64) -> DbResult<Vec<i64>> {
        let mut stmt = self
            .conn
            .prepare("SELECT position FROM tasks WHERE lane_id = ?1")?;
        let rows = stmt.query_map(params![lane_id], |row| row.get(0))?;
        collect_rows(rows)
    }

    // ── Labels ────────────────────────────────────────────────────────

    pub fn create_label(
        &self,
        workspace_id: i64,
        user_id: i64,
        name: &str,
        color: &str,
    ) -> DbResult<Label> {
        // Any workspace member may create labels, mirroring board creation.
        if self.workspace_role(workspace_id, user_id)?.is_none() {
            return Err(DomainError::Forbidden(
                "You do not have access to this workspace".into(),
            ));
        }

        match self.conn.execute(
            "INSERT INTO labels (workspace_id, name, color) VALUES (?1, ?2, ?3)",
            params![workspace_id, name, color],
        ) {
            Ok(_) => {}
            Err(e) if is_unique_violation(&e) => {
                return Err(DomainError::Conflict(
                    "A label with this name already exists in this workspace".into(),
                ))
            }
            Err(e) => return Err(e.into()),
        }
        let id = self.conn.last_insert_rowid();
        self.get_label(id)?
            .ok_or_else(|| DomainError::Internal(anyhow!("Label not found after insert")))
    }

    pub fn list_labels(&self, workspace_id: i64, user_id: i64) -> DbResult<Vec<Label>> {
        if self.workspace_role(workspace_id, user_id)?.is_none() {
            return Err(DomainError::Forbidden(
                "You do not have access to this workspace".into(),
            ));
        }
        let mut stmt = self.conn.prepare(
            "SELECT id, workspace_id, name, color, created_at
             FROM labels WHERE workspace_id = ?1 ORDER BY name, id",
        )?;
        let rows = stmt.query_map(params![workspace_id], map_label)?;
        collect_rows(rows)
    }

    pub fn delete_label(&self, workspace_id: i64, label_id: i64, user_id: i64) -> DbResult<()> {
        self.require_workspace_role(
            workspace_id,
            user_id,
            &[WorkspaceRole::Owner, WorkspaceRole::Admin],
        )?;

        match self.get_label(label_id)? {
            Some(label) if label.workspace_id == workspace_id => {}
            _ => {
                return Err(DomainError::NotFound(
                    "Label not found in this workspace".into(),
                ))
            }
        }

        self.conn
            .execute("DELETE FROM labels WHERE id = ?1", params![label_id])?;
        Ok(())
    }

    pub fn get_label(&self, label_id: i64) -> DbResult<Option<Label>> {
        let label = self
            .conn
            .query_row(
                "SELECT id, workspace_id, name, color, created_at FROM labels WHERE id = ?1",
                params![label_id],
                map_label,
            )
            .optional()?;
        Ok(label)
    }

    // ── Task assignees & labels ───────────────────────────────────────

    pub fn assign_user(
        &self,
        task_id: i64,
        user_id: i64,
        assignee_id: i64,
    ) -> DbResult<Vec<UserSummary>> {
        let (task, role) = self.get_task_for_user(task_id, user_id)?;
        if role == BoardRole::Viewer {
            return Err(DomainError::Forbidden("Viewers cannot assign users".into()));
        }

        // Only board members can be assigned.
        if self.board_role(task.board_id, assignee_id)?.is_none() {
            return Err(DomainError::BadRequest(
                "User is not a member of this board".into(),
            ));
        }
        if self.is_assigned(task_id, assignee_id)? {
            return Err(DomainError::Conflict(
                "User is already assigned to this task".into(),
            ));
        }

        self.conn.execute(
            "INSERT INTO task_assignees (task_id, user_id) VALUES (?1, ?2)",
            params![task_id, assignee_id],
        )?;
        self.task_assignees(task_id)
    }

    pub fn unassign_user(&self, task_id: i64, user_id: i64, assignee_id: i64) -> DbResult<()> {
        let (_, role) = self.get_task_for_user(task_id, user_id)?;
        if role == BoardRole::Viewer {
            return Err(DomainError::Forbidden(
                "Viewers cannot unassign users".into(),
            ));
        }
        if !self.is_assigned(task_id, assignee_id)? {
            return Err(DomainError::NotFound(
                "User is not assigned to this task".into(),
            ));
        }

        self.conn.execute(
            "DELETE FROM task_assignees WHERE task_id = ?1 AND user_id = ?2",
            params![task_id, assignee_id],
        )?;
        Ok(())
    }

    pub fn add_label(&self, task_id: i64, user_id: i64, label_id: i64) -> DbResult<Vec<Label>> {
        let (task, role) = self.get_task_for_user(task_id, user_id)?;
        if role == BoardRole::Viewer {
            return Err(DomainError::Forbidden("Viewers cannot add labels".into()));
        }

        // The label must live in the workspace that owns the task's board.
        let board_workspace: i64 = self.conn.query_row(
            "SELECT workspace_id FROM boards WHERE id = ?1",
            params![task.board_id],
            |row| row.get(0),
        )?;
        match self.get_label(label_id)? {
            Some(label) if label.workspace_id == board_workspace => {}
            _ => {
                return Err(DomainError::BadRequest(
                    "Label not found in this workspace".into(),
                ))
            }
        }

        if self.has_label(task_id, label_id)? {
            return Err(DomainError::Conflict(
                "Label already added to this task".into(),
            ));
        }

        self.conn.execute(
            "INSERT INTO task_labels (task_id, label_id) VALUES (?1, ?2)",
            params![task_id, label_id],
        )?;
        self.task_labels(task_id)
    }

    pub fn remove_label(&self, task_id: i64, user_id: i64, label_id: i64) -> DbResult<()> {
        let (_, role) = self.get_task_for_user(task_id, user_id)?;
        if role == BoardRole::Viewer {
            return Err(DomainError::Forbidden(
                "Viewers cannot remove labels".into(),
            ));
        }
        if !self.has_label(task_id, label_id)? {
            return Err(DomainError::NotFound(
                "Label not found on this task".into(),
            ));
        }

        self.conn.execute(
            "DELETE FROM task_labels WHERE task_id = ?1 AND label_id = ?2",
            params![task_id, label_id],
        )?;
        Ok(())
    }

    pub fn get_task_detail(&self, task_id: i64, user_id: i64) -> DbResult<TaskDetail> {
        let (task, _) = self.get_task_for_user(task_id, user_id)?;
        let assignees = self.task_assignees(task.id)?;
        let labels = self.task_labels(task.id)?;
        Ok(TaskDetail {
            task,
            assignees,
            labels,
        })
    }

    pub fn task_assignees(&self, task_id: i64) -> DbResult<Vec<UserSummary>> {
        let mut stmt = self.conn.prepare(
            "SELECT u.id, u.email, u.name
             FROM task_assignees a
             JOIN users u ON u.id = a.user_id
             WHERE a.task_id = ?1
             ORDER BY a.assigned_at, u.id",
        )?;
        let rows = stmt.query_map(params![task_id], |row| {
            Ok(UserSummary {
                id: row.get(0)?,
                email: row.get(1)?,
                name: row.get(2)?,
            })
        })?;
        collect_rows(rows)
    }

    pub fn task_labels(&self, task_id: i64) -> DbResult<Vec<Label>> {
        let mut stmt = self.conn.prepare(
            "SELECT l.id, l.workspace_id, l.name, l.color, l.created_at
             FROM task_labels t
             JOIN labels l ON l.id = t.label_id
             WHERE t.task_id = ?1
             ORDER BY l.name, l.id",
        )?;
        let rows = stmt.query_map(params![task_id], map_label)?;
        collect_rows(rows)
    }

    fn is_assigned(&self, task_id: i64, assignee_id: i64) -> DbResult<bool> {
        let row: Option<i64> = self
            .conn
            .query_row(
                "SELECT 1 FROM task_assignees WHERE task_id = ?1 AND user_id = ?2",
                params![task_id, assignee_id],
                |row| row.get(0),
            )
            .optional()?;
        Ok(row.is_some())
    }

    fn has_label(&self, task_id: i64, label_id: i64) -> DbResult<bool> {
        let row: Option<i64> = self
            .conn
            .query_row(
                "SELECT 1 FROM task_labels WHERE task_id = ?1 AND label_id = ?2",
                params![task_id, label_id],
                |row| row.get(0),
            )
            .optional()?;
        Ok(row.is_some())
    }
}

/// Fields for a new task; position is appended to the lane when absent.
#[derive(Debug, Clone)]
pub struct NewTask {
    pub board_id: i64,
    pub lane_id: i64,
    pub title: String,
    pub description: Option<String>,
    pub priority: Priority,
    pub position: Option<i64>,
}

/// Partial task update; every field is optional. `description` is
/// tri-state: `Some(None)` clears it.
#[derive(Debug, Clone, Default)]
pub struct TaskPatch {
    pub title: Option<String>,
    pub description: Option<Option<String>>,
    pub priority: Option<Priority>,
    pub position: Option<i64>,
}

// ── Row mapping ───────────────────────────────────────────────────────

fn map_user(row: &Row) -> rusqlite::Result<User> {
    Ok(User {
        id: row.get(0)?,
        email: row.get(1)?,
        name: row.get(2)?,
        api_token: row.get(3)?,
        created_at: row.get(4)?,
    })
}

fn map_workspace(row: &Row) -> rusqlite::Result<Workspace> {
    Ok(Workspace {
        id: row.get(0)?,
        name: row.get(1)?,
        description: row.get(2)?,
        owner_id: row.get(3)?,
        created_at: row.get(4)?,
        updated_at: row.get(5)?,
    })
}

fn map_board(row: &Row) -> rusqlite::Result<Board> {
    Ok(Board {
        id: row.get(0)?,
        workspace_id: row.get(1)?,
        name: row.get(2)?,
        description: row.get(3)?,
        created_at: row.get(4)?,
        updated_at: row.get(5)?,
    })
}

fn map_lane(row: &Row) -> rusqlite::Result<Lane> {
    Ok(Lane {
        id: row.get(0)?,
        board_id: row.get(1)?,
        name: row.get(2)?,
        position: row.get(3)?,
        wip_limit: row.get(4)?,
        created_at: row.get(5)?,
        updated_at: row.get(6)?,
    })
}

fn map_label(row: &Row) -> rusqlite::Result<Label> {
    Ok(Label {
        id: row.get(0)?,
        workspace_id: row.get(1)?,
        name: row.get(2)?,
        color: row.get(3)?,
        created_at: row.get(4)?,
    })
}

fn map_task(row: &Row) -> rusqlite::Result<Task> {
    let raw: String = row.get(5)?;
    let priority = parse_enum(5, &raw)?;
    Ok(Task {
        id: row.get(0)?,
        board_id: row.get(1)?,
        lane_id: row.get(2)?,
        title: row.get(3)?,
        description: row.get(4)?,
        priority,
        position: row.get(6)?,
        created_by: row.get(7)?,
        created_at: row.get(8)?,
        updated_at: row.get(9)?,
    })
}

fn map_workspace_member(row: &Row) -> rusqlite::Result<WorkspaceMemberView> {
    let raw: String = row.get(3)?;
    let role = parse_enum(3, &raw)?;
    Ok(WorkspaceMemberView {
        user: UserSummary {
            id: row.get(0)?,
            email: row.get(1)?,
            name: row.get(2)?,
        },
        role,
        joined_at: row.get(4)?,
    })
}

fn map_board_member(row: &Row) -> rusqlite::Result<BoardMemberView> {
    let raw: String = row.get(3)?;
    let role = parse_enum(3, &raw)?;
    Ok(BoardMemberView {
        user: UserSummary {
            id: row.get(0)?,
            email: row.get(1)?,
            name: row.get(2)?,
        },
        role,
        joined_at: row.get(4)?,
    })
}

fn parse_enum<T>(idx: usize, raw: &str) -> rusqlite::Result<T>
where
    T: FromStr<Err = String>,
{
    raw.parse().map_err(|e: String| {
        rusqlite::Error::FromSqlConversionFailure(idx, rusqlite::types::Type::Text, e.into())
    })
}

fn collect_rows<T>(
    rows: impl Iterator<Item = rusqlite::Result<T>>,
) -> DbResult<Vec<T>> {
    let mut out = Vec::new();
    for row in rows {
        out.push(row?);
    }
    Ok(out)
}

fn is_unique_violation(e: &rusqlite::Error) -> bool {
    matches!(
        e,
        rusqlite::Error::SqliteFailure(err, _)
            if err.code == rusqlite::ErrorCode::ConstraintViolation
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store() -> Store {
        Store::new_in_memory().unwrap()
    }

    fn seed_user(db: &Store, email: &str) -> User {
        db.create_user(email, "Test User").unwrap()
    }

    /// User + workspace + board without default lanes.
    fn seed_board(db: &Store) -> (User, i64) {
        let user = seed_user(db, "owner@example.com");
        let ws = db.create_workspace(user.id, "Acme", None).unwrap();
        let board = db
            .create_board(user.id, ws.workspace.id, "Sprint", None, false)
            .unwrap();
        (user, board.board.id)
    }

    #[test]
    fn file_backed_store_persists_across_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("laneboard.db");

        let user_id = {
            let db = Store::new(&path).unwrap();
            seed_user(&db, "persist@example.com").id
        };

        let db = Store::new(&path).unwrap();
        let user = db.get_user(user_id).unwrap().unwrap();
        assert_eq!(user.email, "persist@example.com");
    }

    #[test]
    fn create_user_duplicate_email_conflicts() {
        let db = store();
        seed_user(&db, "dup@example.com");
        let err = db.create_user("dup@example.com", "Other").unwrap_err();
        assert!(matches!(err, DomainError::Conflict(_)));
    }

    #[test]
    fn workspace_creator_becomes_owner() {
        let db = store();
        let user = seed_user(&db, "owner@example.com");
        let ws = db.create_workspace(user.id, "Acme", Some("desc")).unwrap();
        assert_eq!(ws.members.len(), 1);
        assert_eq!(ws.members[0].role, WorkspaceRole::Owner);
        assert_eq!(ws.members[0].user.id, user.id);
    }

    #[test]
    fn non_member_cannot_read_workspace() {
        let db = store();
        let owner = seed_user(&db, "owner@example.com");
        let outsider = seed_user(&db, "outsider@example.com");
        let ws = db.create_workspace(owner.id, "Acme", None).unwrap();
        let err = db.get_workspace(ws.workspace.id, outsider.id).unwrap_err();
        assert!(matches!(err, DomainError::Forbidden(_)));
    }

    #[test]
    fn cannot_remove_workspace_owner() {
        let db = store();
        let owner = seed_user(&db, "owner@example.com");
        let admin = seed_user(&db, "admin@example.com");
        let ws = db.create_workspace(owner.id, "Acme", None).unwrap();
        db.add_workspace_member(ws.workspace.id, owner.id, admin.id, WorkspaceRole::Admin)
            .unwrap();
        let err = db
            .remove_workspace_member(ws.workspace.id, admin.id, owner.id)
            .unwrap_err();
        assert!(matches!(err, DomainError::BadRequest(_)));
    }

    #[test]
    fn duplicate_workspace_member_conflicts() {
        let db = store();
        let owner = seed_user(&db, "owner@example.com");
        let other = seed_user(&db, "other@example.com");
        let ws = db.create_workspace(owner.id, "Acme", None).unwrap();
        db.add_workspace_member(ws.workspace.id, owner.id, other.id, WorkspaceRole::Member)
            .unwrap();
        let err = db
            .add_workspace_member(ws.workspace.id, owner.id, other.id, WorkspaceRole::Member)
            .unwrap_err();
        assert!(matches!(err, DomainError::Conflict(_)));
    }

    #[test]
    fn default_lanes_bootstrap() {
        let db = store();
        let user = seed_user(&db, "owner@example.com");
        let ws = db.create_workspace(user.id, "Acme", None).unwrap();
        let board = db
            .create_board(user.id, ws.workspace.id, "Sprint", None, true)
            .unwrap();

        let names: Vec<&str> = board
            .lanes
            .iter()
            .map(|l| l.lane.name.as_str())
            .collect();
        assert_eq!(names, vec!["To Do", "In Progress", "Review", "Done"]);
        let positions: Vec<i64> = board.lanes.iter().map(|l| l.lane.position).collect();
        assert_eq!(positions, vec![0, 1, 2, 3]);
        assert_eq!(board.lanes[0].lane.wip_limit, None);
        assert_eq!(board.lanes[1].lane.wip_limit, Some(3));
        assert_eq!(board.lanes[2].lane.wip_limit, Some(2));
        assert_eq!(board.lanes[3].lane.wip_limit, None);
    }

    #[test]
    fn sequential_lane_appends_are_dense() {
        let db = store();
        let (user, board_id) = seed_board(&db);
        for (i, name) in ["a", "b", "c", "d"].iter().enumerate() {
            let lane = db.create_lane(board_id, user.id, name, None, None).unwrap();
            assert_eq!(lane.position, i as i64);
        }
    }

    #[test]
    fn lane_append_skips_gaps_without_compacting() {
        let db = store();
        let (user, board_id) = seed_board(&db);
        db.create_lane(board_id, user.id, "a", Some(0), None).unwrap();
        db.create_lane(board_id, user.id, "b", Some(7), None).unwrap();
        let lane = db.create_lane(board_id, user.id, "c", None, None).unwrap();
        assert_eq!(lane.position, 8);
    }

    #[test]
    fn sequential_task_appends_are_dense() {
        let db = store();
        let (user, board_id) = seed_board(&db);
        let lane = db
            .create_lane(board_id, user.id, "To Do", None, None)
            .unwrap();
        for i in 0..3 {
            let task = db
                .create_task(
                    user.id,
                    NewTask {
                        board_id,
                        lane_id: lane.id,
                        title: format!("task {i}"),
                        description: None,
                        priority: Priority::Medium,
                        position: None,
                    },
                )
                .unwrap();
            assert_eq!(task.position, i);
        }
    }

    #[test]
    fn wip_limit_rejects_cross_lane_move_into_full_lane() {
        let db = store();
        let (user, board_id) = seed_board(&db);
        let todo = db
            .create_lane(board_id, user.id, "ToDo", None, None)
            .unwrap();
        let in_progress = db
            .create_lane(board_id, user.id, "InProgress", None, Some(2))
            .unwrap();

        let new_task = |title: &str, lane_id: i64| NewTask {
            board_id,
            lane_id,
            title: title.into(),
            description: None,
            priority: Priority::Medium,
            position: None,
        };
        db.create_task(user.id, new_task("A", in_progress.id)).unwrap();
        db.create_task(user.id, new_task("B", in_progress.id)).unwrap();
        let c = db.create_task(user.id, new_task("C", todo.id)).unwrap();

        let err = db.move_task(c.id, user.id, in_progress.id, 2).unwrap_err();
        match err {
            DomainError::BadRequest(msg) => {
                assert_eq!(msg, "Cannot move task. Lane has reached WIP limit of 2");
            }
            other => panic!("Expected BadRequest, got {:?}", other),
        }
        // The rejected move must not be applied.
        let c = db.get_task(c.id).unwrap().unwrap();
        assert_eq!(c.lane_id, todo.id);
    }

    #[test]
    fn wip_limit_admits_move_into_lane_with_capacity() {
        let db = store();
        let (user, board_id) = seed_board(&db);
        let todo = db
            .create_lane(board_id, user.id, "ToDo", None, None)
            .unwrap();
        let review = db
            .create_lane(board_id, user.id, "Review", None, Some(2))
            .unwrap();

        let task = db
            .create_task(
                user.id,
                NewTask {
                    board_id,
                    lane_id: todo.id,
                    title: "A".into(),
                    description: None,
                    priority: Priority::High,
                    position: None,
                },
            )
            .unwrap();

        let moved = db.move_task(task.id, user.id, review.id, 0).unwrap();
        assert_eq!(moved.lane_id, review.id);
        assert_eq!(moved.position, 0);
    }

    #[test]
    fn same_lane_reorder_bypasses_wip_check() {
        let db = store();
        let (user, board_id) = seed_board(&db);
        let lane = db
            .create_lane(board_id, user.id, "Tight", None, Some(1))
            .unwrap();
        let task = db
            .create_task(
                user.id,
                NewTask {
                    board_id,
                    lane_id: lane.id,
                    title: "only".into(),
                    description: None,
                    priority: Priority::Medium,
                    position: None,
                },
            )
            .unwrap();

        // Lane is at its limit, but a same-lane reorder must still pass.
        let moved = db.move_task(task.id, user.id, lane.id, 5).unwrap();
        assert_eq!(moved.lane_id, lane.id);
        assert_eq!(moved.position, 5);
    }

    #[test]
    fn move_to_foreign_lane_is_rejected() {
        let db = store();
        let (user, board_id) = seed_board(&db);
        let lane = db
            .create_lane(board_id, user.id, "ToDo", None, None)
            .unwrap();
        let task = db
            .create_task(
                user.id,
                NewTask {
                    board_id,
                    lane_id: lane.id,
                    title: "A".into(),
                    description: None,
                    priority: Priority::Medium,
                    position: None,
                },
            )
            .unwrap();

        // A lane on a different board.
        let ws2 = db.create_workspace(user.id, "Other", None).unwrap();
        let board2 = db
            .create_board(user.id, ws2.workspace.id, "Other board", None, false)
            .unwrap();
        let foreign = db
            .create_lane(board2.board.id, user.id, "Foreign", None, None)
            .unwrap();

        let err = db.move_task(task.id, user.id, foreign.id, 0).unwrap_err();
        match err {
            DomainError::BadRequest(msg) => assert_eq!(msg, "Lane not found in this board"),
            other => panic!("Expected BadRequest, got {:?}", other),
        }
    }

    #[test]
    fn delete_lane_guard() {
        let db = store();
        let (user, board_id) = seed_board(&db);
        let lane = db
            .create_lane(board_id, user.id, "ToDo", None, None)
            .unwrap();
        db.create_task(
            user.id,
            NewTask {
                board_id,
                lane_id: lane.id,
                title: "A".into(),
                description: None,
                priority: Priority::Medium,
                position: None,
            },
        )
        .unwrap();

        let err = db.delete_lane(board_id, lane.id, user.id).unwrap_err();
        assert!(matches!(err, DomainError::BadRequest(_)));
        assert!(db.get_lane(lane.id).unwrap().is_some());

        // Empty lane deletes fine.
        let empty = db
            .create_lane(board_id, user.id, "Empty", None, None)
            .unwrap();
        db.delete_lane(board_id, empty.id, user.id).unwrap();
        assert!(db.get_lane(empty.id).unwrap().is_none());
    }

    #[test]
    fn reorder_lanes_is_all_or_nothing() {
        let db = store();
        let (user, board_id) = seed_board(&db);
        let l1 = db.create_lane(board_id, user.id, "a", None, None).unwrap();
        let l2 = db.create_lane(board_id, user.id, "b", None, None).unwrap();

        // Second assignment references an unknown lane: nothing may change.
        let err = db
            .reorder_lanes(board_id, user.id, &[(l1.id, 5), (9999, 6)])
            .unwrap_err();
        assert!(matches!(err, DomainError::BadRequest(_)));
        assert_eq!(db.get_lane(l1.id).unwrap().unwrap().position, 0);
        assert_eq!(db.get_lane(l2.id).unwrap().unwrap().position, 1);

        // A valid batch applies fully.
        let lanes = db
            .reorder_lanes(board_id, user.id, &[(l1.id, 1), (l2.id, 0)])
            .unwrap();
        let order: Vec<i64> = lanes.iter().map(|l| l.id).collect();
        assert_eq!(order, vec![l2.id, l1.id]);
    }

    #[test]
    fn reorder_rejects_lane_from_another_board() {
        let db = store();
        let (user, board_id) = seed_board(&db);
        let l1 = db.create_lane(board_id, user.id, "a", None, None).unwrap();

        let ws2 = db.create_workspace(user.id, "Other", None).unwrap();
        let board2 = db
            .create_board(user.id, ws2.workspace.id, "Other board", None, false)
            .unwrap();
        let foreign = db
            .create_lane(board2.board.id, user.id, "x", None, None)
            .unwrap();

        let err = db
            .reorder_lanes(board_id, user.id, &[(l1.id, 1), (foreign.id, 0)])
            .unwrap_err();
        assert!(matches!(err, DomainError::BadRequest(_)));
        assert_eq!(db.get_lane(foreign.id).unwrap().unwrap().position, 0);
    }

    #[test]
    fn update_lane_clears_wip_limit_with_explicit_null() {
        let db = store();
        let (user, board_id) = seed_board(&db);
        let lane = db
            .create_lane(board_id, user.id, "Review", None, Some(2))
            .unwrap();

        // Absent leaves the limit alone.
        let lane = db
            .update_lane(board_id, lane.id, user.id, Some("QA"), None, None)
            .unwrap();
        assert_eq!(lane.wip_limit, Some(2));
        assert_eq!(lane.name, "QA");

        // Explicit null clears it.
        let lane = db
            .update_lane(board_id, lane.id, user.id, None, None, Some(None))
            .unwrap();
        assert_eq!(lane.wip_limit, None);
    }

    #[test]
    fn viewers_cannot_move_tasks() {
        let db = store();
        let (owner, board_id) = seed_board(&db);
        let viewer = seed_user(&db, "viewer@example.com");
        db.add_board_member(board_id, owner.id, viewer.id, BoardRole::Viewer)
            .unwrap();

        let lane = db
            .create_lane(board_id, owner.id, "ToDo", None, None)
            .unwrap();
        let other = db
            .create_lane(board_id, owner.id, "Done", None, None)
            .unwrap();
        let task = db
            .create_task(
                owner.id,
                NewTask {
                    board_id,
                    lane_id: lane.id,
                    title: "A".into(),
                    description: None,
                    priority: Priority::Medium,
                    position: None,
                },
            )
            .unwrap();

        let err = db.move_task(task.id, viewer.id, other.id, 0).unwrap_err();
        match err {
            DomainError::Forbidden(msg) => assert_eq!(msg, "Viewers cannot move tasks"),
            other => panic!("Expected Forbidden, got {:?}", other),
        }
    }

    #[test]
    fn board_view_orders_lanes_and_tasks_by_position() {
        let db = store();
        let (user, board_id) = seed_board(&db);
        let l_b = db.create_lane(board_id, user.id, "B", Some(1), None).unwrap();
        let l_a = db.create_lane(board_id, user.id, "A", Some(0), None).unwrap();

        let new_task = |title: &str, position: i64| NewTask {
            board_id,
            lane_id: l_a.id,
            title: title.into(),
            description: None,
            priority: Priority::Medium,
            position: Some(position),
        };
        db.create_task(user.id, new_task("second", 4)).unwrap();
        db.create_task(user.id, new_task("first", 1)).unwrap();

        let detail = db.get_board(board_id, user.id).unwrap();
        assert_eq!(detail.lanes[0].lane.id, l_a.id);
        assert_eq!(detail.lanes[1].lane.id, l_b.id);
        let titles: Vec<&str> = detail.lanes[0]
            .tasks
            .iter()
            .map(|t| t.title.as_str())
            .collect();
        assert_eq!(titles, vec!["first", "second"]);
    }

    #[test]
    fn delete_board_cascades_lanes_and_tasks() {
        let db = store();
        let (user, board_id) = seed_board(&db);
        let lane = db
            .create_lane(board_id, user.id, "ToDo", None, None)
            .unwrap();
        let task = db
            .create_task(
                user.id,
                NewTask {
                    board_id,
                    lane_id: lane.id,
                    title: "A".into(),
                    description: None,
                    priority: Priority::Medium,
                    position: None,
                },
            )
            .unwrap();

        db.delete_board(board_id, user.id).unwrap();
        assert!(db.get_lane(lane.id).unwrap().is_none());
        assert!(db.get_task(task.id).unwrap().is_none());
    }

    #[test]
    fn workspace_description_clears_with_explicit_null() {
        let db = store();
        let user = seed_user(&db, "owner@example.com");
        let ws = db
            .create_workspace(user.id, "Acme", Some("original"))
            .unwrap();

        // Absent leaves it alone.
        let ws = db
            .update_workspace(ws.workspace.id, user.id, Some("Acme 2"), None)
            .unwrap();
        assert_eq!(ws.workspace.description.as_deref(), Some("original"));

        // Explicit null clears it.
        let ws = db
            .update_workspace(ws.workspace.id, user.id, None, Some(None))
            .unwrap();
        assert_eq!(ws.workspace.description, None);
    }

    #[test]
    fn task_description_clears_with_explicit_null() {
        let db = store();
        let (user, board_id) = seed_board(&db);
        let lane = db
            .create_lane(board_id, user.id, "To Do", None, None)
            .unwrap();
        let task = db
            .create_task(
                user.id,
                NewTask {
                    board_id,
                    lane_id: lane.id,
                    title: "A".into(),
                    description: Some("details".into()),
                    priority: Priority::Medium,
                    position: None,
                },
            )
            .unwrap();

        let task = db
            .update_task(
                task.id,
                user.id,
                TaskPatch {
                    title: Some("A2".into()),
                    ..TaskPatch::default()
                },
            )
            .unwrap();
        assert_eq!(task.description.as_deref(), Some("details"));

        let task = db
            .update_task(
                task.id,
                user.id,
                TaskPatch {
                    description: Some(None),
                    ..TaskPatch::default()
                },
            )
            .unwrap();
        assert_eq!(task.description, None);
    }

    #[test]
    fn assignees_must_be_board_members() {
        let db = store();
        let (owner, board_id) = seed_board(&db);
        let outsider = seed_user(&db, "outsider@example.com");
        let lane = db
            .create_lane(board_id, owner.id, "To Do", None, None)
            .unwrap();
        let task = db
            .create_task(
                owner.id,
                NewTask {
                    board_id,
                    lane_id: lane.id,
                    title: "A".into(),
                    description: None,
                    priority: Priority::Medium,
                    position: None,
                },
            )
            .unwrap();

        let err = db.assign_user(task.id, owner.id, outsider.id).unwrap_err();
        match err {
            DomainError::BadRequest(msg) => {
                assert_eq!(msg, "User is not a member of this board");
            }
            other => panic!("Expected BadRequest, got {:?}", other),
        }
    }

    #[test]
    fn duplicate_assignment_conflicts() {
        let db = store();
        let (owner, board_id) = seed_board(&db);
        let lane = db
            .create_lane(board_id, owner.id, "To Do", None, None)
            .unwrap();
        let task = db
            .create_task(
                owner.id,
                NewTask {
                    board_id,
                    lane_id: lane.id,
                    title: "A".into(),
                    description: None,
                    priority: Priority::Medium,
                    position: None,
                },
            )
            .unwrap();

        let assignees = db.assign_user(task.id, owner.id, owner.id).unwrap();
        assert_eq!(assignees.len(), 1);
        assert_eq!(assignees[0].id, owner.id);

        let err = db.assign_user(task.id, owner.id, owner.id).unwrap_err();
        match err {
            DomainError::Conflict(msg) => {
                assert_eq!(msg, "User is already assigned to this task");
            }
            other => panic!("Expected Conflict, got {:?}", other),
        }

        db.unassign_user(task.id, owner.id, owner.id).unwrap();
        let err = db.unassign_user(task.id, owner.id, owner.id).unwrap_err();
        assert!(matches!(err, DomainError::NotFound(_)));
    }

    #[test]
    fn duplicate_label_name_in_workspace_conflicts() {
        let db = store();
        let user = seed_user(&db, "owner@example.com");
        let ws = db.create_workspace(user.id, "Acme", None).unwrap();

        db.create_label(ws.workspace.id, user.id, "Bug", "#ef4444")
            .unwrap();
        let err = db
            .create_label(ws.workspace.id, user.id, "Bug", "#000000")
            .unwrap_err();
        assert!(matches!(err, DomainError::Conflict(_)));

        // Same name in another workspace is fine.
        let ws2 = db.create_workspace(user.id, "Other", None).unwrap();
        db.create_label(ws2.workspace.id, user.id, "Bug", "#ef4444")
            .unwrap();
    }

    #[test]
    fn task_labels_are_workspace_scoped() {
        let db = store();
        let (user, board_id) = seed_board(&db);
        let lane = db
            .create_lane(board_id, user.id, "To Do", None, None)
            .unwrap();
        let task = db
            .create_task(
                user.id,
                NewTask {
                    board_id,
                    lane_id: lane.id,
                    title: "A".into(),
                    description: None,
                    priority: Priority::Medium,
                    position: None,
                },
            )
            .unwrap();

        // A label from an unrelated workspace cannot be attached.
        let ws2 = db.create_workspace(user.id, "Other", None).unwrap();
        let foreign = db
            .create_label(ws2.workspace.id, user.id, "Bug", "#ef4444")
            .unwrap();
        let err = db.add_label(task.id, user.id, foreign.id).unwrap_err();
        match err {
            DomainError::BadRequest(msg) => {
                assert_eq!(msg, "Label not found in this workspace");
            }
            other => panic!("Expected BadRequest, got {:?}", other),
        }

        // A label from the board's own workspace attaches once.
        let board = db.get_board(board_id, user.id).unwrap();
        let label = db
            .create_label(board.board.workspace_id, user.id, "Bug", "#ef4444")
            .unwrap();
        let labels = db.add_label(task.id, user.id, label.id).unwrap();
        assert_eq!(labels.len(), 1);
        assert_eq!(labels[0].name, "Bug");

        let err = db.add_label(task.id, user.id, label.id).unwrap_err();
        match err {
            DomainError::Conflict(msg) => {
                assert_eq!(msg, "Label already added to this task");
            }
            other => panic!("Expected Conflict, got {:?}", other),
        }

        db.remove_label(task.id, user.id, label.id).unwrap();
        let err = db.remove_label(task.id, user.id, label.id).unwrap_err();
        assert!(matches!(err, DomainError::NotFound(_)));
    }

    #[test]
    fn viewers_cannot_manage_assignees_or_labels() {
        let db = store();
        let (owner, board_id) = seed_board(&db);
        let viewer = seed_user(&db, "viewer@example.com");
        db.add_board_member(board_id, owner.id, viewer.id, BoardRole::Viewer)
            .unwrap();
        let lane = db
            .create_lane(board_id, owner.id, "To Do", None, None)
            .unwrap();
        let task = db
            .create_task(
                owner.id,
                NewTask {
                    board_id,
                    lane_id: lane.id,
                    title: "A".into(),
                    description: None,
                    priority: Priority::Medium,
                    position: None,
                },
            )
            .unwrap();

        let err = db.assign_user(task.id, viewer.id, owner.id).unwrap_err();
        match err {
            DomainError::Forbidden(msg) => assert_eq!(msg, "Viewers cannot assign users"),
            other => panic!("Expected Forbidden, got {:?}", other),
        }

        let board = db.get_board(board_id, owner.id).unwrap();
        let label = db
            .create_label(board.board.workspace_id, owner.id, "Bug", "#ef4444")
            .unwrap();
        let err = db.add_label(task.id, viewer.id, label.id).unwrap_err();
        match err {
            DomainError::Forbidden(msg) => assert_eq!(msg, "Viewers cannot add labels"),
            other => panic!("Expected Forbidden, got {:?}", other),
        }
    }

    #[test]
    fn task_detail_carries_assignees_and_labels() {
        let db = store();
        let (user, board_id) = seed_board(&db);
        let lane = db
            .create_lane(board_id, user.id, "To Do", None, None)
            .unwrap();
        let task = db
            .create_task(
                user.id,
                NewTask {
                    board_id,
                    lane_id: lane.id,
                    title: "A".into(),
                    description: None,
                    priority: Priority::Medium,
                    position: None,
                },
            )
            .unwrap();

        db.assign_user(task.id, user.id, user.id).unwrap();
        let board = db.get_board(board_id, user.id).unwrap();
        let label = db
            .create_label(board.board.workspace_id, user.id, "Bug", "#ef4444")
            .unwrap();
        db.add_label(task.id, user.id, label.id).unwrap();

        let detail = db.get_task_detail(task.id, user.id).unwrap();
        assert_eq!(detail.assignees.len(), 1);
        assert_eq!(detail.assignees[0].id, user.id);
        assert_eq!(detail.labels.len(), 1);
        assert_eq!(detail.labels[0].id, label.id);
    }

    #[test]
    fn deleting_label_detaches_it_from_tasks() {
        let db = store();
        let (user, board_id) = seed_board(&db);
        let lane = db
            .create_lane(board_id, user.id, "To Do", None, None)
            .unwrap();
        let task = db
            .create_task(
                user.id,
                NewTask {
                    board_id,
                    lane_id: lane.id,
                    title: "A".into(),
                    description: None,
                    priority: Priority::Medium,
                    position: None,
                },
            )
            .unwrap();

        let board = db.get_board(board_id, user.id).unwrap();
        let workspace_id = board.board.workspace_id;
        let label = db
            .create_label(workspace_id, user.id, "Bug", "#ef4444")
            .unwrap();
        db.add_label(task.id, user.id, label.id).unwrap();

        db.delete_label(workspace_id, label.id, user.id).unwrap();
        assert!(db.task_labels(task.id).unwrap().is_empty());
        assert!(db.list_labels(workspace_id, user.id).unwrap().is_empty());
    }
}
