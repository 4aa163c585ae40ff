mod chat;
mod init;
mod org;
pub use chat::cmd_chat;
pub use init::cmd_init;
pub use org::cmd_org;

use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use chrono::NaiveDate;
use log::{debug, info};
use regex::Regex;

use crate::cli::commands::*;
use crate::cli::output::*;
use crate::io::config_io;
use crate::io::lock::FileLock;
use crate::io::session_io;
use crate::io::workspace::{self, BOARD_DIR, WorkspaceError};
use crate::model::board::Column;
use crate::model::config::{Config, UserConfig};
use crate::model::member::{Member, MemberRef, Role};
use crate::model::project::{Project, ProjectInput};
use crate::model::task::{Priority, TaskInput};
use crate::ops::detail::TaskDetail;
use crate::ops::drag::{Board, DropPlan};
use crate::ops::store::{StoreError, StoreOptions, TaskStore};
use crate::ops::{access, check, search};

type CmdResult = Result<(), Box<dyn std::error::Error>>;

// ---------------------------------------------------------------------------
// Dispatch
// ---------------------------------------------------------------------------

/// Where a command starts looking for the workspace, and how it prints
pub struct Invocation {
    pub start: PathBuf,
    pub json: bool,
}

impl Invocation {
    pub fn from_cli(cli: &Cli) -> Result<Self, Box<dyn std::error::Error>> {
        let start = match &cli.workspace_dir {
            Some(dir) => std::fs::canonicalize(dir)
                .map_err(|e| format!("cannot resolve -C path '{}': {}", dir, e))?,
            None => std::env::current_dir()?,
        };
        Ok(Invocation {
            start,
            json: cli.json,
        })
    }
}

pub fn dispatch(cli: Cli) -> CmdResult {
    let inv = Invocation::from_cli(&cli)?;

    match cli.command {
        Commands::Init(args) => cmd_init(args, &inv),

        // Read commands
        Commands::Projects => cmd_projects(&inv),
        Commands::Board(args) => cmd_board(args, &inv),
        Commands::Show(args) => cmd_show(args, &inv),
        Commands::Check => cmd_check(&inv),
        Commands::Search(args) => cmd_search(args, &inv),

        // Projects and members
        Commands::Project(cmd) => match cmd.action {
            ProjectAction::New(args) => cmd_project_new(args, &inv),
            ProjectAction::Show(args) => cmd_project_show(args, &inv),
            ProjectAction::Edit(args) => cmd_project_edit(args, &inv),
            ProjectAction::Rm(args) => cmd_project_rm(args, &inv),
        },
        Commands::Member(cmd) => match cmd.action {
            MemberAction::Add(args) => cmd_member_add(args, &inv),
            MemberAction::Role(args) => cmd_member_role(args, &inv),
            MemberAction::Rm(args) => cmd_member_rm(args, &inv),
        },
        Commands::Org(cmd) => cmd_org(cmd, &inv),
        Commands::Chat(cmd) => cmd_chat(cmd, &inv),

        // Task writes
        Commands::Add(args) => cmd_add(args, &inv),
        Commands::Edit(args) => cmd_edit(args, &inv),
        Commands::Status(args) => cmd_status(args, &inv),
        Commands::Rm(args) => cmd_rm(args, &inv),
        Commands::Mv(args) => cmd_mv(args, &inv),
        Commands::Comment(cmd) => match cmd.action {
            CommentAction::Add(args) => cmd_comment_add(args, &inv),
            CommentAction::Rm(args) => cmd_comment_rm(args, &inv),
        },

        Commands::Notifications(cmd) => cmd_notifications(cmd, &inv),
        Commands::Compact(args) => cmd_compact(args, &inv),
        Commands::User(args) => cmd_user(args, &inv),
    }
}

/// Default log filter for `start`, read from the workspace config if there
/// is one.
pub fn configured_log_level(start: &Path) -> Option<String> {
    let root = workspace::discover_workspace(start).ok()?;
    let (config, _) = workspace::read_config_file(&root.join(BOARD_DIR)).ok()?;
    Some(config.log.level)
}

// ---------------------------------------------------------------------------
// Session helpers
// ---------------------------------------------------------------------------

/// A loaded workspace with its store ready to use
struct Session {
    board_dir: PathBuf,
    config: Config,
    store: TaskStore,
}

impl Session {
    fn user(&self) -> &UserConfig {
        &self.config.user
    }

    fn save(&self) -> Result<(), WorkspaceError> {
        session_io::save_session(&self.board_dir, self.store.snapshot())
    }
}

fn open_session(root: &Path) -> Result<Session, WorkspaceError> {
    let ws = workspace::load_workspace(root)?;
    let mut store = TaskStore::from_snapshot(ws.snapshot, StoreOptions::from(&ws.config.board));
    store.set_actor(Some(MemberRef::new(
        ws.config.user.id.clone(),
        ws.config.user.full_name.clone(),
    )));
    Ok(Session {
        board_dir: ws.board_dir,
        config: ws.config,
        store,
    })
}

/// Load the workspace for reading. No lock is taken.
fn load_session(inv: &Invocation) -> Result<Session, WorkspaceError> {
    let root = workspace::discover_workspace(&inv.start)?;
    open_session(&root)
}

/// Lock the workspace, load it, run `f`, and save the session if `f`
/// succeeds. Nothing is written on error.
fn write_session<T>(
    inv: &Invocation,
    f: impl FnOnce(&mut Session) -> Result<T, Box<dyn std::error::Error>>,
) -> Result<T, Box<dyn std::error::Error>> {
    let root = workspace::discover_workspace(&inv.start)?;
    let _lock = FileLock::acquire_default(&root.join(BOARD_DIR))?;
    let mut session = open_session(&root)?;
    let out = f(&mut session)?;
    session.save()?;
    Ok(out)
}

/// The configured user as seen by a project: their project role when they are
/// a member, the configured role otherwise.
fn acting_member(project: &Project, user: &UserConfig) -> Member {
    match project.member(&user.id) {
        Some(m) => m.clone(),
        None => user.member(),
    }
}

fn require(allowed: bool, what: &str, who: &Member) -> Result<(), StoreError> {
    if allowed {
        Ok(())
    } else {
        Err(StoreError::Forbidden(format!(
            "{} ({}) cannot {}",
            who.full_name, who.role, what
        )))
    }
}

/// Resolve a project reference: exact id, else case-insensitive name.
fn resolve_project(store: &TaskStore, reference: &str) -> Result<String, StoreError> {
    if let Some(p) = store.get_project(reference) {
        return Ok(p.id.clone());
    }
    let matches: Vec<&Project> = store
        .get_projects()
        .iter()
        .filter(|p| p.name.eq_ignore_ascii_case(reference))
        .collect();
    match matches.as_slice() {
        [one] => Ok(one.id.clone()),
        [] => Err(StoreError::ProjectNotFound(reference.to_string())),
        _ => Err(StoreError::Validation(format!(
            "more than one project is named '{}', use its id",
            reference
        ))),
    }
}

/// Resolve a task reference: exact id, else a unique id prefix.
fn resolve_task(store: &TaskStore, reference: &str) -> Result<String, StoreError> {
    if store.find_task(reference).is_some() {
        return Ok(reference.to_string());
    }
    let matches: Vec<&str> = store
        .get_projects()
        .iter()
        .flat_map(|p| p.tasks.iter())
        .filter(|t| t.id.starts_with(reference))
        .map(|t| t.id.as_str())
        .collect();
    match matches.as_slice() {
        [one] => Ok(one.to_string()),
        [] => Err(StoreError::TaskNotFound(reference.to_string())),
        _ => Err(StoreError::Validation(format!(
            "task id prefix '{}' is ambiguous ({} matches)",
            reference,
            matches.len()
        ))),
    }
}

/// Project owning `task_id`, cloned so the store can be mutated afterwards
fn owner_of(store: &TaskStore, task_id: &str) -> Result<Project, StoreError> {
    store
        .find_task(task_id)
        .map(|(p, _)| p.clone())
        .ok_or_else(|| StoreError::TaskNotFound(task_id.to_string()))
}

fn assignee_ref(project: &Project, member_id: &str) -> Result<MemberRef, StoreError> {
    project
        .member(member_id)
        .map(Member::to_ref)
        .ok_or_else(|| {
            StoreError::Validation(format!(
                "{} is not a member of project {}",
                member_id, project.name
            ))
        })
}

fn parse_due(s: &str) -> Result<NaiveDate, String> {
    NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d")
        .map_err(|_| format!("invalid due date: {} (expected YYYY-MM-DD)", s))
}

fn print_json<T: serde::Serialize + ?Sized>(value: &T) -> CmdResult {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

// ---------------------------------------------------------------------------
// Read command handlers
// ---------------------------------------------------------------------------

fn cmd_projects(inv: &Invocation) -> CmdResult {
    let session = load_session(inv)?;
    let projects = session.store.get_projects();
    if inv.json {
        let list: Vec<ProjectSummaryJson> = projects.iter().map(project_summary).collect();
        return print_json(&list);
    }
    if projects.is_empty() {
        println!("no projects (create one with `tb project new`)");
    }
    for p in projects {
        let s = project_summary(p);
        println!(
            "{}  {} ({}) - {}/{} done, {} members",
            short_id(&s.id),
            s.name,
            s.organization,
            s.done,
            s.tasks,
            s.members
        );
    }
    Ok(())
}

fn cmd_board(args: BoardArgs, inv: &Invocation) -> CmdResult {
    let session = load_session(inv)?;
    let pid = resolve_project(&session.store, &args.project)?;
    let board = Board::load(&session.store, &pid)?;
    let Some(project) = session.store.get_project(&pid) else {
        return Err(StoreError::ProjectNotFound(pid).into());
    };

    let mut columns = board.columns().clone();
    if let Some(member_id) = &args.assignee {
        for column in Column::ALL {
            let kept: Vec<String> = columns
                .ids(column)
                .iter()
                .filter(|id| project.task(id).is_some_and(|t| t.is_assigned_to(member_id)))
                .cloned()
                .collect();
            columns.set_ids(column, kept);
        }
    }

    if inv.json {
        return print_json(&board_to_json(project, &columns));
    }
    for line in format_board(project, &columns) {
        println!("{}", line);
    }
    Ok(())
}

fn cmd_show(args: TaskIdArg, inv: &Invocation) -> CmdResult {
    let session = load_session(inv)?;
    let id = resolve_task(&session.store, &args.id)?;
    let Some((project, task)) = session.store.find_task(&id) else {
        return Err(StoreError::TaskNotFound(id).into());
    };
    if inv.json {
        return print_json(task);
    }
    for line in format_task_detail(project, task) {
        println!("{}", line);
    }
    Ok(())
}

fn cmd_check(inv: &Invocation) -> CmdResult {
    let session = load_session(inv)?;
    let result = check::check_snapshot(session.store.snapshot());

    if inv.json {
        return print_json(&result);
    }
    if !result.errors.is_empty() {
        println!("Errors:");
        for err in &result.errors {
            match err {
                check::CheckError::DuplicateId {
                    task_id,
                    project_ids,
                } => {
                    println!(
                        "  {} is duplicated in projects: {}",
                        task_id,
                        project_ids.join(", ")
                    );
                }
                check::CheckError::AssigneeNotMember {
                    project_id,
                    task_id,
                    member_id,
                } => {
                    println!(
                        "  [{}] {} is assigned to non-member {}",
                        short_id(project_id),
                        short_id(task_id),
                        member_id
                    );
                }
                check::CheckError::CommentWithoutAuthor {
                    project_id,
                    task_id,
                    comment_id,
                } => {
                    println!(
                        "  [{}] {} has comment {} with no author",
                        short_id(project_id),
                        short_id(task_id),
                        short_id(comment_id)
                    );
                }
            }
        }
    }
    if !result.warnings.is_empty() {
        if !result.errors.is_empty() {
            println!();
        }
        println!("Warnings:");
        for warn in &result.warnings {
            match warn {
                check::CheckWarning::OrderGap {
                    project_id,
                    column,
                    orders,
                } => {
                    let orders: Vec<String> = orders.iter().map(u32::to_string).collect();
                    println!(
                        "  [{}] {} orders have gaps: {}",
                        short_id(project_id),
                        column,
                        orders.join(", ")
                    );
                }
                check::CheckWarning::DuplicateOrder {
                    project_id,
                    column,
                    order,
                    task_ids,
                } => {
                    println!(
                        "  [{}] {} order {} shared by {} tasks",
                        short_id(project_id),
                        column,
                        order,
                        task_ids.len()
                    );
                }
            }
        }
    }
    if result.valid {
        println!("✓ board is valid");
    } else {
        println!("✗ board has errors");
    }
    Ok(())
}

fn cmd_search(args: SearchArgs, inv: &Invocation) -> CmdResult {
    let session = load_session(inv)?;
    let re = Regex::new(&args.pattern)?;
    let project_id = match &args.project {
        Some(reference) => Some(resolve_project(&session.store, reference)?),
        None => None,
    };
    let hits = search::search_tasks(session.store.snapshot(), &re, project_id.as_deref());

    if inv.json {
        let list: Vec<SearchHitJson> = hits
            .iter()
            .filter_map(|hit| {
                let (_, task) = session.store.find_task(&hit.task_id)?;
                Some(SearchHitJson {
                    project_id: hit.project_id.clone(),
                    task_id: hit.task_id.clone(),
                    title: task.title.clone(),
                    field: hit.field.as_str().to_string(),
                    comment_id: hit.comment_id.clone(),
                })
            })
            .collect();
        return print_json(&list);
    }

    // One line per task, even when several fields matched
    let mut seen = HashSet::new();
    for hit in &hits {
        if seen.insert(&hit.task_id)
            && let Some((project, task)) = session.store.find_task(&hit.task_id)
        {
            println!("[{}] {}", project.name, format_task_line(task));
        }
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Project and member handlers
// ---------------------------------------------------------------------------

fn cmd_project_new(args: ProjectNewArgs, inv: &Invocation) -> CmdResult {
    let project = write_session(inv, |s| {
        let user = s.user().member();
        let org_id = org::resolve_org(&s.store, &args.org).unwrap_or(args.org);
        let mut input = ProjectInput::new(args.name, org_id);
        input.description = args.desc.unwrap_or_default();
        input.organization_name = args.org_name;
        input.created_by = Some(user.to_ref());
        input.members = vec![user];
        Ok(s.store.add_project(input)?)
    })?;
    info!("created project {}", project.id);
    if inv.json {
        return print_json(&project);
    }
    println!("{}", project.id);
    Ok(())
}

fn cmd_project_show(args: ProjectArg, inv: &Invocation) -> CmdResult {
    let session = load_session(inv)?;
    let pid = resolve_project(&session.store, &args.project)?;
    let Some(project) = session.store.get_project(&pid) else {
        return Err(StoreError::ProjectNotFound(pid).into());
    };
    if inv.json {
        return print_json(project);
    }
    for line in format_project_detail(project) {
        println!("{}", line);
    }
    Ok(())
}

fn cmd_project_edit(args: ProjectEditArgs, inv: &Invocation) -> CmdResult {
    write_session(inv, |s| {
        let pid = resolve_project(&s.store, &args.project)?;
        let mut project = s
            .store
            .get_project(&pid)
            .cloned()
            .ok_or_else(|| StoreError::ProjectNotFound(pid.clone()))?;
        let actor = acting_member(&project, s.user());
        require(access::can_manage_members(actor.role), "edit this project", &actor)?;
        if let Some(name) = args.name {
            project.name = name;
        }
        if let Some(desc) = args.desc {
            project.description = desc;
        }
        s.store.update_project(project)?;
        Ok(())
    })
}

fn cmd_project_rm(args: ProjectArg, inv: &Invocation) -> CmdResult {
    write_session(inv, |s| {
        let pid = match resolve_project(&s.store, &args.project) {
            Ok(pid) => pid,
            Err(StoreError::ProjectNotFound(_)) => {
                debug!("project {} already absent", args.project);
                return Ok(());
            }
            Err(e) => return Err(e.into()),
        };
        if let Some(project) = s.store.get_project(&pid) {
            let actor = acting_member(project, s.user());
            require(access::can_manage_members(actor.role), "delete this project", &actor)?;
        }
        s.store.delete_project(&pid);
        Ok(())
    })
}

fn cmd_member_add(args: MemberAddArgs, inv: &Invocation) -> CmdResult {
    let role = Role::from_str(&args.role)?;
    write_session(inv, |s| {
        let pid = resolve_project(&s.store, &args.project)?;
        if let Some(project) = s.store.get_project(&pid) {
            let actor = acting_member(project, s.user());
            require(access::can_manage_members(actor.role), "add members", &actor)?;
        }
        s.store.add_member(&pid, Member::new(args.id, args.name, role))?;
        Ok(())
    })
}

fn cmd_member_role(args: MemberRoleArgs, inv: &Invocation) -> CmdResult {
    let role = Role::from_str(&args.role)?;
    write_session(inv, |s| {
        let pid = resolve_project(&s.store, &args.project)?;
        if let Some(project) = s.store.get_project(&pid) {
            let actor = acting_member(project, s.user());
            require(access::can_manage_members(actor.role), "change roles", &actor)?;
        }
        s.store.update_member_role(&pid, &args.id, role)?;
        Ok(())
    })
}

fn cmd_member_rm(args: MemberRmArgs, inv: &Invocation) -> CmdResult {
    write_session(inv, |s| {
        let pid = resolve_project(&s.store, &args.project)?;
        if let Some(project) = s.store.get_project(&pid) {
            let actor = acting_member(project, s.user());
            require(access::can_manage_members(actor.role), "remove members", &actor)?;
        }
        s.store.remove_member(&pid, &args.id)?;
        Ok(())
    })
}

// ---------------------------------------------------------------------------
// Task write handlers
// ---------------------------------------------------------------------------

fn cmd_add(args: AddArgs, inv: &Invocation) -> CmdResult {
    let priority = args.priority.as_deref().map(Priority::from_str).transpose()?;
    let column = args.status.as_deref().map(Column::from_str).transpose()?;
    let due_date = args.due.as_deref().map(parse_due).transpose()?;

    let task = write_session(inv, |s| {
        let pid = resolve_project(&s.store, &args.project)?;
        let project = s
            .store
            .get_project(&pid)
            .cloned()
            .ok_or_else(|| StoreError::ProjectNotFound(pid.clone()))?;
        let actor = acting_member(&project, s.user());
        require(access::can_manage_tasks(actor.role), "add tasks", &actor)?;

        let mut input = TaskInput::new(args.title);
        input.description = args.desc.unwrap_or_default();
        input.priority = priority;
        input.status = column.map(Column::status);
        input.due_date = due_date;
        input.created_by = Some(actor.to_ref());
        if let Some(member_id) = &args.assign {
            input.assigned_to = Some(assignee_ref(&project, member_id)?);
        }
        Ok(s.store.add_task(&pid, input)?)
    })?;
    if inv.json {
        return print_json(&task);
    }
    println!("{}", task.id);
    Ok(())
}

fn cmd_edit(args: EditArgs, inv: &Invocation) -> CmdResult {
    let priority = args.priority.as_deref().map(Priority::from_str).transpose()?;
    let column = args.status.as_deref().map(Column::from_str).transpose()?;
    let due_date = match args.due.as_deref() {
        Some("none") => Some(None),
        Some(s) => Some(Some(parse_due(s)?)),
        None => None,
    };

    let task = write_session(inv, |s| {
        let id = resolve_task(&s.store, &args.id)?;
        let project = owner_of(&s.store, &id)?;
        let actor = acting_member(&project, s.user());
        require(access::can_manage_tasks(actor.role), "edit tasks", &actor)?;

        let mut detail = TaskDetail::open(&s.store, &id, actor)?;
        if let Some(title) = args.title {
            detail.draft.title = title;
        }
        if let Some(desc) = args.desc {
            detail.draft.description = desc;
        }
        if let Some(priority) = priority {
            detail.draft.priority = priority;
        }
        if let Some(due) = due_date {
            detail.draft.due_date = due;
        }
        if args.unassign {
            detail.draft.assigned_to = None;
        } else if let Some(member_id) = &args.assign {
            detail.draft.assigned_to = Some(assignee_ref(&project, member_id)?);
        }
        if detail.is_dirty() {
            detail.save(&mut s.store)?;
        }

        // A column change goes through the board so the task lands at the
        // end of its new column instead of keeping a stale order.
        if let Some(column) = column {
            let mut board = Board::load(&s.store, &project.id)?;
            board.move_task(&mut s.store, &id, column, None)?;
        }
        let (_, task) = s
            .store
            .find_task(&id)
            .ok_or_else(|| StoreError::TaskNotFound(id.clone()))?;
        Ok(task.clone())
    })?;
    if inv.json {
        return print_json(&task);
    }
    println!("updated {}", short_id(&task.id));
    Ok(())
}

/// Shared by `status` and `mv`: a drag from the task's current slot.
fn move_on_board(
    inv: &Invocation,
    reference: &str,
    column: Column,
    index: Option<usize>,
) -> Result<(String, DropPlan), Box<dyn std::error::Error>> {
    write_session(inv, |s| {
        let id = resolve_task(&s.store, reference)?;
        let project = owner_of(&s.store, &id)?;
        let actor = acting_member(&project, s.user());
        if let Some(task) = project.task(&id) {
            require(access::can_change_status(&actor, task), "move this task", &actor)?;
        }
        let mut board = Board::load(&s.store, &project.id)?;
        let plan = board.move_task(&mut s.store, &id, column, index)?;
        Ok((id, plan))
    })
}

fn report_move(id: &str, column: Column, plan: &DropPlan, inv: &Invocation) -> CmdResult {
    if inv.json {
        return print_json(plan);
    }
    match plan {
        DropPlan::Unchanged | DropPlan::Invalid => {
            println!("{} already there", short_id(id));
        }
        DropPlan::SameColumn { ids, .. } => {
            let pos = ids.iter().position(|t| t == id).unwrap_or(0);
            println!("{} moved to position {} in {}", short_id(id), pos, column.title());
        }
        DropPlan::CrossColumn { destination, .. } => {
            println!("{} moved to {}", short_id(id), destination.title());
        }
    }
    Ok(())
}

fn cmd_status(args: StatusArgs, inv: &Invocation) -> CmdResult {
    let column = Column::from_str(&args.status)?;
    let (id, plan) = move_on_board(inv, &args.id, column, None)?;
    report_move(&id, column, &plan, inv)
}

fn cmd_mv(args: MvArgs, inv: &Invocation) -> CmdResult {
    let column = Column::from_str(&args.column)?;
    let (id, plan) = move_on_board(inv, &args.id, column, args.index)?;
    report_move(&id, column, &plan, inv)
}

fn cmd_rm(args: TaskIdArg, inv: &Invocation) -> CmdResult {
    write_session(inv, |s| {
        let id = match resolve_task(&s.store, &args.id) {
            Ok(id) => id,
            Err(StoreError::TaskNotFound(_)) => {
                debug!("task {} already absent", args.id);
                return Ok(());
            }
            Err(e) => return Err(e.into()),
        };
        let project = owner_of(&s.store, &id)?;
        let actor = acting_member(&project, s.user());
        require(access::can_manage_tasks(actor.role), "delete tasks", &actor)?;
        s.store.delete_task(&id);
        Ok(())
    })
}

fn cmd_comment_add(args: CommentAddArgs, inv: &Invocation) -> CmdResult {
    let comment = write_session(inv, |s| {
        let id = resolve_task(&s.store, &args.id)?;
        let project = owner_of(&s.store, &id)?;
        let actor = acting_member(&project, s.user());
        require(
            project.is_member(&actor.id) || access::can_moderate_comments(actor.role),
            "comment on this project",
            &actor,
        )?;
        let mut detail = TaskDetail::open(&s.store, &id, actor)?;
        Ok(detail.add_comment(&mut s.store, &args.text)?)
    })?;
    if inv.json {
        return print_json(&comment);
    }
    match comment {
        Some(c) => println!("{}", c.id),
        None => println!("empty comment ignored"),
    }
    Ok(())
}

fn cmd_comment_rm(args: CommentRmArgs, inv: &Invocation) -> CmdResult {
    write_session(inv, |s| {
        let id = resolve_task(&s.store, &args.id)?;
        let project = owner_of(&s.store, &id)?;
        let actor = acting_member(&project, s.user());
        let mut detail = TaskDetail::open(&s.store, &id, actor)?;

        let matches: Vec<String> = detail
            .comments()
            .iter()
            .filter(|c| c.id.starts_with(&args.comment_id))
            .map(|c| c.id.clone())
            .collect();
        let comment_id = match matches.as_slice() {
            [one] => one.clone(),
            _ if detail.comments().iter().any(|c| c.id == args.comment_id) => {
                args.comment_id.clone()
            }
            [] => return Err(StoreError::CommentNotFound(args.comment_id.clone()).into()),
            _ => {
                return Err(StoreError::Validation(format!(
                    "comment id prefix '{}' is ambiguous",
                    args.comment_id
                ))
                .into());
            }
        };
        detail.delete_comment(&mut s.store, &comment_id)?;
        Ok(())
    })
}

// ---------------------------------------------------------------------------
// Notifications
// ---------------------------------------------------------------------------

fn cmd_notifications(cmd: NotificationsCmd, inv: &Invocation) -> CmdResult {
    match cmd.action {
        None => cmd_notifications_list(cmd.all, inv),
        Some(NotificationsAction::Read(args)) => cmd_notifications_read(args, inv),
        Some(NotificationsAction::Dismiss(args)) => cmd_notifications_dismiss(args, inv),
    }
}

fn cmd_notifications_list(all: bool, inv: &Invocation) -> CmdResult {
    let session = load_session(inv)?;
    let user_id = &session.user().id;
    let list: Vec<_> = session
        .store
        .notifications_for(user_id)
        .into_iter()
        .filter(|n| all || !n.is_read)
        .collect();
    let unread = session.store.unread_count(user_id);

    if inv.json {
        return print_json(&NotificationListJson {
            unread,
            notifications: list,
        });
    }
    if list.is_empty() {
        println!("no notifications");
    }
    for n in &list {
        println!("{}", format_notification_line(n));
    }
    Ok(())
}

fn cmd_notifications_read(args: NotificationsReadArgs, inv: &Invocation) -> CmdResult {
    let changed = write_session(inv, |s| {
        let user_id = s.user().id.clone();
        if args.all {
            return Ok(s.store.mark_all_read(&user_id));
        }
        let id = resolve_notification(&s.store, &user_id, &args.id.unwrap_or_default())?;
        Ok(usize::from(s.store.mark_read(&id)))
    })?;
    if !inv.json {
        println!("marked {} read", changed);
    } else {
        print_json(&serde_json::json!({ "marked_read": changed }))?;
    }
    Ok(())
}

fn cmd_notifications_dismiss(args: NotificationIdArg, inv: &Invocation) -> CmdResult {
    write_session(inv, |s| {
        let user_id = s.user().id.clone();
        let id = resolve_notification(&s.store, &user_id, &args.id)?;
        s.store.dismiss(&id);
        Ok(())
    })
}

/// Only the acting user's own notifications can be referenced.
fn resolve_notification(
    store: &TaskStore,
    user_id: &str,
    reference: &str,
) -> Result<String, Box<dyn std::error::Error>> {
    let matches: Vec<String> = store
        .notifications_for(user_id)
        .iter()
        .filter(|n| n.id.starts_with(reference))
        .map(|n| n.id.clone())
        .collect();
    match matches.as_slice() {
        [one] => Ok(one.clone()),
        [] => Err(format!("notification not found: {}", reference).into()),
        _ => Err(format!("notification id prefix '{}' is ambiguous", reference).into()),
    }
}

// ---------------------------------------------------------------------------
// Maintenance
// ---------------------------------------------------------------------------

fn cmd_compact(args: ProjectArg, inv: &Invocation) -> CmdResult {
    let changed = write_session(inv, |s| {
        let pid = resolve_project(&s.store, &args.project)?;
        if let Some(project) = s.store.get_project(&pid) {
            let actor = acting_member(project, s.user());
            require(access::can_manage_tasks(actor.role), "compact this board", &actor)?;
        }
        Ok(s.store.compact_project(&pid)?)
    })?;
    if inv.json {
        return print_json(&serde_json::json!({ "renumbered": changed }));
    }
    println!("renumbered {} tasks", changed);
    Ok(())
}

fn cmd_user(args: UserArgs, inv: &Invocation) -> CmdResult {
    let root = workspace::discover_workspace(&inv.start)?;
    let board_dir = root.join(BOARD_DIR);

    if args.id.is_none() && args.name.is_none() && args.role.is_none() {
        let (config, _) = workspace::read_config_file(&board_dir)?;
        if inv.json {
            return print_json(&config.user);
        }
        println!("{} {} [{}]", config.user.id, config.user.full_name, config.user.role);
        return Ok(());
    }

    let _lock = FileLock::acquire_default(&board_dir)?;
    let (config, mut doc) = config_io::read_config(&board_dir)?;
    let user = UserConfig {
        id: args.id.unwrap_or(config.user.id),
        full_name: args.name.unwrap_or(config.user.full_name),
        role: match args.role {
            Some(r) => Role::from_str(&r)?,
            None => config.user.role,
        },
    };
    config_io::set_user(&mut doc, &user);
    config_io::write_config(&board_dir, &doc)?;
    info!("acting user is now {}", user.id);
    if inv.json {
        return print_json(&user);
    }
    println!("now acting as {} [{}]", user.full_name, user.role);
    Ok(())
}
