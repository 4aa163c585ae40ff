//! Integration tests for the `tb` CLI.
//!
//! Each test creates a temp workspace, runs `tb` as a subprocess,
//! and verifies stdout and/or the saved session.

use std::fs;
use std::path::Path;
use std::process::Command;

use pretty_assertions::assert_eq;
use serde_json::Value;

/// Run `tb` with the given args in the given directory, returning (stdout, stderr, success).
fn run_tb(dir: &Path, args: &[&str]) -> (String, String, bool) {
    let output = Command::new(env!("CARGO_BIN_EXE_tb"))
        .args(args)
        .current_dir(dir)
        .env_remove("RUST_LOG")
        .output()
        .expect("failed to run tb");

    let stdout = String::from_utf8_lossy(&output.stdout).to_string();
    let stderr = String::from_utf8_lossy(&output.stderr).to_string();
    (stdout, stderr, output.status.success())
}

/// Run `tb` expecting success, return stdout.
fn run_tb_ok(dir: &Path, args: &[&str]) -> String {
    let (stdout, stderr, success) = run_tb(dir, args);
    if !success {
        panic!(
            "tb {:?} failed:\nstdout: {}\nstderr: {}",
            args, stdout, stderr
        );
    }
    stdout
}

fn run_tb_json(dir: &Path, args: &[&str]) -> Value {
    let mut full = args.to_vec();
    full.push("--json");
    let out = run_tb_ok(dir, &full);
    serde_json::from_str(&out).unwrap()
}

/// A workspace seeded with the demo projects, acting as user1.
fn demo_workspace() -> tempfile::TempDir {
    let tmp = tempfile::TempDir::new().unwrap();
    run_tb_ok(tmp.path(), &["init", "--name", "acme", "--demo"]);
    tmp
}

/// Task ids in one column of a board, top to bottom
fn column_ids(board: &Value, column: &str) -> Vec<String> {
    board["columns"]
        .as_array()
        .unwrap()
        .iter()
        .find(|c| c["id"] == column)
        .unwrap()["tasks"]
        .as_array()
        .unwrap()
        .iter()
        .map(|t| t["id"].as_str().unwrap().to_string())
        .collect()
}

fn add_task(dir: &Path, args: &[&str]) -> String {
    let mut full = vec!["add", "Website Redesign"];
    full.extend_from_slice(args);
    run_tb_ok(dir, &full).trim().to_string()
}

// ---------------------------------------------------------------------------
// Init and workspace discovery
// ---------------------------------------------------------------------------

#[test]
fn test_init_creates_workspace() {
    let tmp = tempfile::TempDir::new().unwrap();
    let out = run_tb_ok(tmp.path(), &["init", "--name", "acme"]);
    assert!(out.contains("Initialized taskboard workspace: acme"));

    let board_dir = tmp.path().join("taskboard");
    let config = fs::read_to_string(board_dir.join("config.toml")).unwrap();
    assert!(config.contains("name = \"acme\""));
    assert!(config.contains("role = \"admin\""));

    let session: Value =
        serde_json::from_str(&fs::read_to_string(board_dir.join("session.json")).unwrap()).unwrap();
    assert_eq!(session["projects"], serde_json::json!([]));
}

#[test]
fn test_init_twice_requires_force() {
    let tmp = tempfile::TempDir::new().unwrap();
    run_tb_ok(tmp.path(), &["init"]);

    let (_stdout, stderr, success) = run_tb(tmp.path(), &["init"]);
    assert!(!success);
    assert!(stderr.contains("already initialized"));

    run_tb_ok(tmp.path(), &["init", "--force", "--demo"]);
    let projects = run_tb_json(tmp.path(), &["projects"]);
    assert_eq!(projects.as_array().unwrap().len(), 2);
}

#[test]
fn test_not_a_workspace() {
    let tmp = tempfile::TempDir::new().unwrap();
    let (_stdout, stderr, success) = run_tb(tmp.path(), &["projects"]);
    assert!(!success);
    assert!(stderr.starts_with("error: not a taskboard workspace"));
}

#[test]
fn test_discovers_workspace_from_subdirectory() {
    let tmp = demo_workspace();
    let sub = tmp.path().join("docs/notes");
    fs::create_dir_all(&sub).unwrap();
    let out = run_tb_ok(&sub, &["projects"]);
    assert!(out.contains("Website Redesign (Acme Corp)"));
}

#[test]
fn test_workspace_dir_flag() {
    let tmp = demo_workspace();
    let elsewhere = tempfile::TempDir::new().unwrap();
    let ws = tmp.path().to_str().unwrap();
    let out = run_tb_ok(elsewhere.path(), &["-C", ws, "projects"]);
    assert!(out.contains("Mobile App (TechFlow)"));
}

// ---------------------------------------------------------------------------
// Read commands
// ---------------------------------------------------------------------------

#[test]
fn test_projects_json() {
    let tmp = demo_workspace();
    let projects = run_tb_json(tmp.path(), &["projects"]);
    let first = &projects[0];
    assert_eq!(first["name"], "Website Redesign");
    assert_eq!(first["organization"], "Acme Corp");
    assert_eq!(first["members"], 2);
    assert_eq!(first["tasks"], 3);
    assert_eq!(first["done"], 1);
}

#[test]
fn test_board_text() {
    let tmp = demo_workspace();
    let out = run_tb_ok(tmp.path(), &["board", "website redesign"]);
    assert!(out.starts_with("Website Redesign (Acme Corp)"));
    assert!(out.contains("To Do [1]"));
    assert!(out.contains("In Progress [1]"));
    assert!(out.contains("Done [1]"));
    assert!(out.contains("Create wireframes @Jane Smith"));
}

#[test]
fn test_board_json_and_assignee_filter() {
    let tmp = demo_workspace();
    let board = run_tb_json(tmp.path(), &["board", "Website Redesign"]);
    let titles: Vec<&str> = board["columns"]
        .as_array()
        .unwrap()
        .iter()
        .map(|c| c["title"].as_str().unwrap())
        .collect();
    assert_eq!(titles, vec!["To Do", "In Progress", "Done"]);

    let filtered = run_tb_json(tmp.path(), &["board", "Website Redesign", "--assignee", "user2"]);
    assert!(column_ids(&filtered, "todo").is_empty());
    assert_eq!(column_ids(&filtered, "in-progress").len(), 1);
    assert_eq!(column_ids(&filtered, "done").len(), 1);
}

#[test]
fn test_board_unknown_project() {
    let tmp = demo_workspace();
    let (_stdout, stderr, success) = run_tb(tmp.path(), &["board", "Nope"]);
    assert!(!success);
    assert!(stderr.contains("project not found: Nope"));
}

#[test]
fn test_show_by_prefix() {
    let tmp = demo_workspace();
    let id = add_task(tmp.path(), &["Write tests", "--desc", "cover the CLI"]);
    let out = run_tb_ok(tmp.path(), &["show", &id[..8]]);
    assert!(out.contains("Write tests"));
    assert!(out.contains("status:   To Do (todo)"));
    assert!(out.contains("cover the CLI"));
}

#[test]
fn test_show_not_found() {
    let tmp = demo_workspace();
    let (_stdout, stderr, success) = run_tb(tmp.path(), &["show", "zzzz"]);
    assert!(!success);
    assert!(stderr.contains("task not found"));
}

#[test]
fn test_search() {
    let tmp = demo_workspace();
    let out = run_tb_ok(tmp.path(), &["search", "(?i)wireframe"]);
    assert!(out.contains("[Website Redesign]"));
    assert!(out.contains("Create wireframes"));
    assert!(out.contains("Design mockups"));

    let hits = run_tb_json(tmp.path(), &["search", "stack", "--project", "Mobile App"]);
    let hits = hits.as_array().unwrap();
    assert_eq!(hits.len(), 1);
    assert_eq!(hits[0]["title"], "App architecture");
    assert_eq!(hits[0]["field"], "description");
}

#[test]
fn test_check_demo_is_valid() {
    let tmp = demo_workspace();
    let out = run_tb_ok(tmp.path(), &["check"]);
    assert!(out.contains("✓ board is valid"));

    let result = run_tb_json(tmp.path(), &["check"]);
    assert_eq!(result["valid"], true);
}

// ---------------------------------------------------------------------------
// Task writes
// ---------------------------------------------------------------------------

#[test]
fn test_add_appends_to_column() {
    let tmp = demo_workspace();
    let id = add_task(
        tmp.path(),
        &["Audit links", "--priority", "high", "--assign", "user2", "--due", "2024-05-01"],
    );

    let board = run_tb_json(tmp.path(), &["board", "Website Redesign"]);
    let todo = column_ids(&board, "todo");
    assert_eq!(todo.len(), 2);
    assert_eq!(todo[1], id);

    let task = run_tb_json(tmp.path(), &["show", &id]);
    assert_eq!(task["priority"], "high");
    assert_eq!(task["order"], 1);
    assert_eq!(task["assigned_to"]["id"], "user2");
    assert_eq!(task["due_date"], "2024-05-01");
    assert_eq!(task["created_by"]["id"], "user1");
}

#[test]
fn test_add_rejects_non_member_assignee() {
    let tmp = demo_workspace();
    let (_stdout, stderr, success) =
        run_tb(tmp.path(), &["add", "Website Redesign", "Ghost work", "--assign", "user42"]);
    assert!(!success);
    assert!(stderr.contains("not a member"));

    let board = run_tb_json(tmp.path(), &["board", "Website Redesign"]);
    assert_eq!(column_ids(&board, "todo").len(), 1);
}

#[test]
fn test_add_blank_title_fails() {
    let tmp = demo_workspace();
    let (_stdout, stderr, success) = run_tb(tmp.path(), &["add", "Website Redesign", "   "]);
    assert!(!success);
    assert!(stderr.contains("validation failed"));
}

#[test]
fn test_mv_within_and_across_columns() {
    let tmp = demo_workspace();
    let a = add_task(tmp.path(), &["A"]);
    let b = add_task(tmp.path(), &["B"]);

    // Reorder within todo: B to the top
    run_tb_ok(tmp.path(), &["mv", &b, "todo", "--index", "0"]);
    let board = run_tb_json(tmp.path(), &["board", "Website Redesign"]);
    let todo = column_ids(&board, "todo");
    assert_eq!(todo[0], b);
    assert_eq!(todo[2], a);

    // Across columns: A to the top of in-progress
    let out = run_tb_ok(tmp.path(), &["mv", &a, "in-progress", "--index", "0"]);
    assert!(out.contains("moved to In Progress"));
    let board = run_tb_json(tmp.path(), &["board", "Website Redesign"]);
    assert_eq!(column_ids(&board, "in-progress")[0], a);
    assert_eq!(column_ids(&board, "todo").len(), 2);

    let task = run_tb_json(tmp.path(), &["show", &a]);
    assert_eq!(task["status"], "in_progress");
    assert_eq!(task["order"], 0);
}

#[test]
fn test_mv_json_reports_plan() {
    let tmp = demo_workspace();
    let a = add_task(tmp.path(), &["A"]);
    let plan = run_tb_json(tmp.path(), &["mv", &a, "done"]);
    assert_eq!(plan["outcome"], "cross-column");
    assert_eq!(plan["destination"], "done");
}

#[test]
fn test_status_moves_to_end_of_column() {
    let tmp = demo_workspace();
    let a = add_task(tmp.path(), &["A"]);
    run_tb_ok(tmp.path(), &["status", &a, "completed"]);

    let board = run_tb_json(tmp.path(), &["board", "Website Redesign"]);
    let done = column_ids(&board, "done");
    assert_eq!(done.len(), 2);
    assert_eq!(done[1], a);

    let out = run_tb_ok(tmp.path(), &["status", &a, "done"]);
    assert!(out.contains("already there"));
}

#[test]
fn test_status_to_same_column_keeps_order() {
    let tmp = demo_workspace();
    let a = add_task(tmp.path(), &["A"]);
    let b = add_task(tmp.path(), &["B"]);
    let board = run_tb_json(tmp.path(), &["board", "Website Redesign"]);
    let before = column_ids(&board, "todo");
    assert_eq!(before.len(), 3);
    assert_eq!(before[1], a);

    let out = run_tb_ok(tmp.path(), &["status", &a, "todo"]);
    assert!(out.contains("already there"));
    run_tb_ok(tmp.path(), &["edit", &a, "--status", "todo"]);

    let board = run_tb_json(tmp.path(), &["board", "Website Redesign"]);
    assert_eq!(column_ids(&board, "todo"), before);
    assert_eq!(column_ids(&board, "todo")[2], b);
}

#[test]
fn test_edit_fields() {
    let tmp = demo_workspace();
    let a = add_task(tmp.path(), &["Draft", "--assign", "user2", "--due", "2024-01-01"]);
    run_tb_ok(
        tmp.path(),
        &["edit", &a, "--title", "Final", "--priority", "low", "--unassign", "--due", "none"],
    );
    let task = run_tb_json(tmp.path(), &["show", &a]);
    assert_eq!(task["title"], "Final");
    assert_eq!(task["priority"], "low");
    assert_eq!(task["assigned_to"], Value::Null);
    assert_eq!(task["due_date"], Value::Null);
    assert_eq!(task["status"], "todo");
}

#[test]
fn test_edit_status_goes_through_board() {
    let tmp = demo_workspace();
    let a = add_task(tmp.path(), &["A"]);
    run_tb_ok(tmp.path(), &["edit", &a, "--status", "in-progress"]);
    let board = run_tb_json(tmp.path(), &["board", "Website Redesign"]);
    let in_progress = column_ids(&board, "in-progress");
    assert_eq!(in_progress.len(), 2);
    assert_eq!(in_progress[1], a);
}

#[test]
fn test_rm_compacts_column() {
    let tmp = demo_workspace();
    let a = add_task(tmp.path(), &["A"]);
    let b = add_task(tmp.path(), &["B"]);
    run_tb_ok(tmp.path(), &["rm", &a]);

    let (_stdout, stderr, success) = run_tb(tmp.path(), &["show", &a]);
    assert!(!success);
    assert!(stderr.contains("task not found"));

    let task = run_tb_json(tmp.path(), &["show", &b]);
    assert_eq!(task["order"], 1);

    // Deleting again is not an error
    run_tb_ok(tmp.path(), &["rm", &a]);
}

#[test]
fn test_rm_ambiguous_reference_fails() {
    let tmp = demo_workspace();
    add_task(tmp.path(), &["A"]);

    // An empty prefix matches every task
    let (_stdout, stderr, success) = run_tb(tmp.path(), &["rm", ""]);
    assert!(!success);
    assert!(stderr.contains("ambiguous"));
    let board = run_tb_json(tmp.path(), &["board", "Website Redesign"]);
    assert_eq!(column_ids(&board, "todo").len(), 2);

    run_tb_ok(tmp.path(), &["project", "new", "Twin", "--org", "org1"]);
    run_tb_ok(tmp.path(), &["project", "new", "twin", "--org", "org1"]);
    let (_stdout, stderr, success) = run_tb(tmp.path(), &["project", "rm", "Twin"]);
    assert!(!success);
    assert!(stderr.contains("more than one project"));
    let projects = run_tb_json(tmp.path(), &["projects"]);
    assert_eq!(projects.as_array().unwrap().len(), 4);
}

#[test]
fn test_compact() {
    let tmp = demo_workspace();
    let out = run_tb_ok(tmp.path(), &["compact", "Website Redesign"]);
    assert!(out.contains("renumbered 0 tasks"));
}

// ---------------------------------------------------------------------------
// Comments
// ---------------------------------------------------------------------------

#[test]
fn test_comment_add_and_rm() {
    let tmp = demo_workspace();
    let a = add_task(tmp.path(), &["A"]);
    let comment_id = run_tb_ok(tmp.path(), &["comment", "add", &a, "Looks good"])
        .trim()
        .to_string();

    let out = run_tb_ok(tmp.path(), &["show", &a]);
    assert!(out.contains("comments (1):"));
    assert!(out.contains("John Doe: Looks good"));

    run_tb_ok(tmp.path(), &["comment", "rm", &a, &comment_id[..8]]);
    let task = run_tb_json(tmp.path(), &["show", &a]);
    assert_eq!(task["comments"], serde_json::json!([]));
}

#[test]
fn test_blank_comment_ignored() {
    let tmp = demo_workspace();
    let a = add_task(tmp.path(), &["A"]);
    let out = run_tb_ok(tmp.path(), &["comment", "add", &a, "   "]);
    assert!(out.contains("empty comment ignored"));
    let task = run_tb_json(tmp.path(), &["show", &a]);
    assert_eq!(task["comments"], serde_json::json!([]));
}

// ---------------------------------------------------------------------------
// Users, roles, and notifications
// ---------------------------------------------------------------------------

#[test]
fn test_user_switch_keeps_config_comments() {
    let tmp = demo_workspace();
    let out = run_tb_ok(tmp.path(), &["user"]);
    assert!(out.contains("user1 John Doe [admin]"));

    run_tb_ok(
        tmp.path(),
        &["user", "--id", "user2", "--name", "Jane Smith", "--role", "employee"],
    );
    let user = run_tb_json(tmp.path(), &["user"]);
    assert_eq!(user["id"], "user2");
    assert_eq!(user["role"], "employee");

    let config = fs::read_to_string(tmp.path().join("taskboard/config.toml")).unwrap();
    assert!(config.contains("# Who `tb` acts as"));
}

#[test]
fn test_employee_cannot_add_tasks() {
    let tmp = demo_workspace();
    run_tb_ok(
        tmp.path(),
        &["user", "--id", "user2", "--name", "Jane Smith", "--role", "employee"],
    );
    let (_stdout, stderr, success) = run_tb(tmp.path(), &["add", "Website Redesign", "Sneaky"]);
    assert!(!success);
    assert!(stderr.contains("not allowed"));
}

#[test]
fn test_employee_moves_own_task_only() {
    let tmp = demo_workspace();
    let mine = add_task(tmp.path(), &["Mine", "--assign", "user2"]);
    let theirs = add_task(tmp.path(), &["Theirs"]);
    run_tb_ok(
        tmp.path(),
        &["user", "--id", "user2", "--name", "Jane Smith", "--role", "employee"],
    );

    run_tb_ok(tmp.path(), &["status", &mine, "in_progress"]);
    let (_stdout, stderr, success) = run_tb(tmp.path(), &["status", &theirs, "in_progress"]);
    assert!(!success);
    assert!(stderr.contains("not allowed"));
}

#[test]
fn test_assignment_notifies_assignee() {
    let tmp = demo_workspace();
    add_task(tmp.path(), &["For Jane", "--assign", "user2"]);

    // The actor is never notified
    let mine = run_tb_json(tmp.path(), &["notifications"]);
    assert_eq!(mine["unread"], 0);

    run_tb_ok(
        tmp.path(),
        &["user", "--id", "user2", "--name", "Jane Smith", "--role", "employee"],
    );
    let theirs = run_tb_json(tmp.path(), &["notifications"]);
    assert_eq!(theirs["unread"], 1);
    assert_eq!(theirs["notifications"][0]["kind"], "task_assigned");

    run_tb_ok(tmp.path(), &["notifications", "read", "--all"]);
    let after = run_tb_json(tmp.path(), &["notifications"]);
    assert_eq!(after["unread"], 0);
    assert_eq!(after["notifications"], serde_json::json!([]));

    let all = run_tb_json(tmp.path(), &["notifications", "--all"]);
    assert_eq!(all["notifications"].as_array().unwrap().len(), 1);

    let id = all["notifications"][0]["id"].as_str().unwrap();
    run_tb_ok(tmp.path(), &["notifications", "dismiss", &id[..8]]);
    let gone = run_tb_json(tmp.path(), &["notifications", "--all"]);
    assert_eq!(gone["notifications"], serde_json::json!([]));
}

// ---------------------------------------------------------------------------
// Projects and members
// ---------------------------------------------------------------------------

#[test]
fn test_project_lifecycle() {
    let tmp = tempfile::TempDir::new().unwrap();
    run_tb_ok(tmp.path(), &["init"]);

    let pid = run_tb_ok(
        tmp.path(),
        &["project", "new", "Backend", "--org", "org9", "--org-name", "Initech"],
    )
    .trim()
    .to_string();

    let project = run_tb_json(tmp.path(), &["project", "show", "backend"]);
    assert_eq!(project["id"], pid.as_str());
    assert_eq!(project["organization"]["name"], "Initech");
    assert_eq!(project["members"][0]["id"], "user1");

    run_tb_ok(tmp.path(), &["member", "add", &pid, "user7", "Sam Lee"]);
    run_tb_ok(tmp.path(), &["member", "role", &pid, "user7", "manager"]);
    let project = run_tb_json(tmp.path(), &["project", "show", &pid]);
    assert_eq!(project["members"][1]["role"], "manager");

    run_tb_ok(tmp.path(), &["project", "edit", &pid, "--name", "Platform"]);
    let out = run_tb_ok(tmp.path(), &["project", "show", "Platform"]);
    assert!(out.contains("Sam Lee [manager]"));

    run_tb_ok(tmp.path(), &["project", "rm", &pid]);
    let projects = run_tb_json(tmp.path(), &["projects"]);
    assert_eq!(projects, serde_json::json!([]));
}

#[test]
fn test_member_rm_unassigns_tasks() {
    let tmp = demo_workspace();
    let a = add_task(tmp.path(), &["A", "--assign", "user2"]);
    run_tb_ok(tmp.path(), &["member", "rm", "Website Redesign", "user2"]);
    let task = run_tb_json(tmp.path(), &["show", &a]);
    assert_eq!(task["assigned_to"], Value::Null);
}

// ---------------------------------------------------------------------------
// Organizations and conversations
// ---------------------------------------------------------------------------

fn act_as_jane(dir: &Path) {
    run_tb_ok(
        dir,
        &["user", "--id", "user2", "--name", "Jane Smith", "--role", "employee"],
    );
}

#[test]
fn test_org_list_and_show() {
    let tmp = demo_workspace();
    let orgs = run_tb_json(tmp.path(), &["org", "list"]);
    assert_eq!(orgs[0]["id"], "org1");
    assert_eq!(orgs[0]["members"], 2);
    assert_eq!(orgs[0]["projects"], 1);

    let out = run_tb_ok(tmp.path(), &["org", "show", "acme corp"]);
    assert!(out.contains("Jane Smith [employee]"));
    assert!(out.contains("Website Redesign"));
}

#[test]
fn test_org_lifecycle_cascades_projects() {
    let tmp = tempfile::TempDir::new().unwrap();
    run_tb_ok(tmp.path(), &["init"]);
    let org = run_tb_ok(tmp.path(), &["org", "new", "Initech", "--desc", "Printers"])
        .trim()
        .to_string();
    let shown = run_tb_json(tmp.path(), &["org", "show", &org]);
    assert_eq!(shown["members"][0]["id"], "user1");
    assert_eq!(shown["members"][0]["role"], "admin");

    // Projects created against the org pick up its name
    run_tb_ok(tmp.path(), &["project", "new", "Backend", "--org", "initech"]);
    run_tb_ok(tmp.path(), &["project", "new", "Elsewhere", "--org", "org9"]);
    let project = run_tb_json(tmp.path(), &["project", "show", "Backend"]);
    assert_eq!(project["organization"]["id"], org.as_str());
    assert_eq!(project["organization"]["name"], "Initech");

    run_tb_ok(tmp.path(), &["org", "edit", "Initech", "--name", "Initrode"]);
    let project = run_tb_json(tmp.path(), &["project", "show", "Backend"]);
    assert_eq!(project["organization"]["name"], "Initrode");

    run_tb_ok(tmp.path(), &["org", "member", "add", &org, "user7", "Sam Lee"]);
    run_tb_ok(tmp.path(), &["org", "member", "role", &org, "user7", "manager"]);
    let shown = run_tb_json(tmp.path(), &["org", "show", &org]);
    assert_eq!(shown["members"][1]["role"], "manager");
    run_tb_ok(tmp.path(), &["org", "member", "rm", &org, "user7"]);

    let out = run_tb_json(tmp.path(), &["org", "rm", &org]);
    assert_eq!(out["projects_deleted"], 1);
    let projects = run_tb_json(tmp.path(), &["projects"]);
    assert_eq!(projects.as_array().unwrap().len(), 1);
    assert_eq!(projects[0]["name"], "Elsewhere");

    // Deleting again is not an error
    run_tb_ok(tmp.path(), &["org", "rm", &org]);
}

#[test]
fn test_org_invite_and_accept() {
    let tmp = demo_workspace();
    let invite = run_tb_ok(tmp.path(), &["org", "invite", "TechFlow", "user2", "Jane Smith"])
        .trim()
        .to_string();
    let out = run_tb_ok(tmp.path(), &["org", "show", "TechFlow"]);
    assert!(out.contains("open invites (1)"));

    // Only the invitee may accept
    let (_stdout, stderr, success) = run_tb(tmp.path(), &["org", "accept", "TechFlow", &invite]);
    assert!(!success);
    assert!(stderr.contains("not allowed"));

    act_as_jane(tmp.path());
    let notes = run_tb_json(tmp.path(), &["notifications"]);
    assert_eq!(notes["notifications"][0]["kind"], "organization_invite");

    let out = run_tb_ok(tmp.path(), &["org", "accept", "TechFlow", &invite[..8]]);
    assert!(out.contains("joined as Jane Smith [employee]"));
    let org = run_tb_json(tmp.path(), &["org", "show", "org2"]);
    assert_eq!(org["members"][1]["id"], "user2");
    assert_eq!(org["invites"][0]["accepted"], true);
}

#[test]
fn test_employee_cannot_manage_org() {
    let tmp = demo_workspace();
    act_as_jane(tmp.path());
    let (_stdout, stderr, success) = run_tb(tmp.path(), &["org", "rm", "Acme Corp"]);
    assert!(!success);
    assert!(stderr.contains("not allowed"));
    let orgs = run_tb_json(tmp.path(), &["org", "list"]);
    assert_eq!(orgs.as_array().unwrap().len(), 2);
}

#[test]
fn test_chat_start_send_show() {
    let tmp = demo_workspace();
    let chats = run_tb_json(tmp.path(), &["chat", "list"]);
    assert_eq!(chats[0]["with"][0], "Jane Smith");
    assert_eq!(chats[0]["last_message"], "Mockups are up for review");

    // Starting again with the same person reuses the conversation
    let id = run_tb_ok(tmp.path(), &["chat", "start", "user2", "Jane Smith"])
        .trim()
        .to_string();
    assert_eq!(chats[0]["id"], id.as_str());

    run_tb_ok(tmp.path(), &["chat", "send", &id[..8], "Looks great"]);
    let out = run_tb_ok(tmp.path(), &["chat", "send", &id, "   "]);
    assert!(out.contains("empty message ignored"));

    let conversation = run_tb_json(tmp.path(), &["chat", "show", &id]);
    assert_eq!(conversation["messages"].as_array().unwrap().len(), 2);
    assert_eq!(conversation["messages"][1]["sender"]["id"], "user1");

    act_as_jane(tmp.path());
    let out = run_tb_ok(tmp.path(), &["chat", "show", &id]);
    assert!(out.contains("John Doe: Looks great"));
}

#[test]
fn test_chat_outsider_cannot_read() {
    let tmp = demo_workspace();
    let id = run_tb_ok(tmp.path(), &["chat", "start", "user2", "Jane Smith"])
        .trim()
        .to_string();
    run_tb_ok(
        tmp.path(),
        &["user", "--id", "user3", "--name", "Jim Beam", "--role", "employee"],
    );
    let (_stdout, stderr, success) = run_tb(tmp.path(), &["chat", "show", &id]);
    assert!(!success);
    assert!(stderr.contains("conversation not found"));
    let chats = run_tb_json(tmp.path(), &["chat", "list"]);
    assert_eq!(chats, serde_json::json!([]));
}
