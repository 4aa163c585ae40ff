use std::fs;
use std::str::FromStr;

use chrono::NaiveDate;
use log::info;

use super::Invocation;
use crate::cli::commands::InitArgs;
use crate::io::session_io;
use crate::io::workspace::{self, BOARD_DIR, WorkspaceError};
use crate::model::config::BoardConfig;
use crate::model::member::{Member, Role};
use crate::model::organization::OrganizationInput;
use crate::model::project::ProjectInput;
use crate::model::task::{Priority, TaskInput, TaskStatus};
use crate::ops::store::{StoreError, StoreOptions, TaskStore};

const CONFIG_TEMPLATE: &str = r##"[workspace]
name = {name}

# Who `tb` acts as. Switch with: tb user --id <id> --name <name> --role <role>
[user]
id = {user_id}
full_name = {user_name}
role = "{role}"

# --- Board behavior ---
# Uncomment and edit to override defaults.
#
# [board]
# compact_on_delete = true       # renumber a column after a task is deleted
# default_priority = "medium"    # low, medium, high

# --- Logging ---
# RUST_LOG takes precedence when set.
#
# [log]
# level = "warn"
"##;

/// Infer a workspace name from a directory name: replace hyphens with spaces, title-case.
fn infer_name(dir_name: &str) -> String {
    dir_name
        .split('-')
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                None => String::new(),
                Some(c) => {
                    let upper: String = c.to_uppercase().collect();
                    upper + &chars.collect::<String>()
                }
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

/// A TOML basic string, quoted and escaped
fn quote(s: &str) -> String {
    toml::Value::String(s.to_string()).to_string()
}

fn render_config(name: &str, user_id: &str, user_name: &str, role: Role) -> String {
    CONFIG_TEMPLATE
        .replace("{name}", &quote(name))
        .replace("{user_id}", &quote(user_id))
        .replace("{user_name}", &quote(user_name))
        .replace("{role}", role.as_str())
}

fn due(y: i32, m: u32, d: u32) -> Option<NaiveDate> {
    NaiveDate::from_ymd_opt(y, m, d)
}

/// Two sample organizations, each with a project, plus a short conversation.
fn seed_demo(store: &mut TaskStore) -> Result<(), StoreError> {
    let john = Member::new("user1", "John Doe", Role::Manager);
    let jane = Member::new("user2", "Jane Smith", Role::Employee);

    let orgs = [
        ("org1", "Acme Corp", "Design and web for Acme", vec![Role::Admin, Role::Employee]),
        ("org2", "TechFlow", "Mobile development", vec![Role::Admin]),
    ];
    for (id, name, desc, roles) in orgs {
        let mut input = OrganizationInput::new(name);
        input.id = Some(id.to_string());
        input.description = desc.into();
        input.members = [&john, &jane]
            .into_iter()
            .zip(roles)
            .map(|(m, role)| Member::new(m.id.clone(), m.full_name.clone(), role))
            .collect();
        store.add_organization(input)?;
    }

    let mut website = ProjectInput::new("Website Redesign", "org1");
    website.description = "Redesign the company website with a modern look and feel".into();
    website.created_by = Some(john.to_ref());
    website.members = vec![john.clone(), jane.clone()];
    let website = store.add_project(website)?;

    let tasks = [
        (
            "Create wireframes",
            "Design wireframes for homepage and product pages",
            TaskStatus::Completed,
            Priority::High,
            Some(&jane),
            due(2023, 6, 15),
        ),
        (
            "Design mockups",
            "High-fidelity mockups based on wireframes",
            TaskStatus::InProgress,
            Priority::Medium,
            Some(&jane),
            due(2023, 6, 30),
        ),
        (
            "Write launch copy",
            "Homepage hero text and product blurbs",
            TaskStatus::Todo,
            Priority::Low,
            None,
            None,
        ),
    ];
    for (title, desc, status, priority, assignee, due_date) in tasks {
        let mut input = TaskInput::new(title).with_status(status);
        input.description = desc.into();
        input.priority = Some(priority);
        input.created_by = Some(john.to_ref());
        input.assigned_to = assignee.map(Member::to_ref);
        input.due_date = due_date;
        store.add_task(&website.id, input)?;
    }

    let admin = Member::new("user1", "John Doe", Role::Admin);
    let mut mobile = ProjectInput::new("Mobile App", "org2");
    mobile.description = "iOS and Android app development".into();
    mobile.created_by = Some(admin.to_ref());
    mobile.members = vec![admin.clone()];
    let mobile = store.add_project(mobile)?;

    let mut arch = TaskInput::new("App architecture").with_status(TaskStatus::InProgress);
    arch.description = "Plan architecture and stack".into();
    arch.priority = Some(Priority::Low);
    arch.created_by = Some(admin.to_ref());
    arch.assigned_to = Some(admin.to_ref());
    arch.due_date = due(2023, 6, 20);
    store.add_task(&mobile.id, arch)?;

    let chat = store.start_conversation(jane.to_ref(), john.to_ref(), Some("org1"))?;
    store.send_message(&chat.id, &jane.to_ref(), "Mockups are up for review")?;

    Ok(())
}

pub fn cmd_init(args: InitArgs, inv: &Invocation) -> Result<(), Box<dyn std::error::Error>> {
    let root = inv.start.clone();
    let board_dir = root.join(BOARD_DIR);

    if board_dir.join("config.toml").is_file() && !args.force {
        return Err(WorkspaceError::AlreadyInitialized(board_dir).into());
    }

    // Nested workspaces are allowed, but worth pointing out
    if let Some(parent) = root.parent()
        && let Ok(parent_root) = workspace::discover_workspace(parent)
    {
        eprintln!(
            "Note: parent workspace found at {}/",
            parent_root.join(BOARD_DIR).display()
        );
        eprintln!("Creating new workspace in ./{}/", BOARD_DIR);
    }

    let name = args.name.unwrap_or_else(|| {
        root.file_name()
            .and_then(|n| n.to_str())
            .map(infer_name)
            .unwrap_or_else(|| "Untitled".to_string())
    });
    let role = match args.role.as_deref() {
        Some(r) => Role::from_str(r)?,
        None => Role::Admin,
    };
    let user_id = args.user_id.unwrap_or_else(|| "user1".to_string());
    let user_name = args.user_name.unwrap_or_else(|| "John Doe".to_string());

    fs::create_dir_all(&board_dir)?;
    fs::write(
        board_dir.join("config.toml"),
        render_config(&name, &user_id, &user_name, role),
    )?;

    let mut store = TaskStore::new(StoreOptions::from(&BoardConfig::default()));
    if args.demo {
        seed_demo(&mut store)?;
    }
    session_io::save_session(&board_dir, store.snapshot())?;
    info!("initialized workspace at {}", board_dir.display());

    println!("Initialized taskboard workspace: {}", name);
    println!("  acting as {} ({}) [{}]", user_name, user_id, role);
    if args.demo {
        for o in store.get_organizations() {
            println!("  organization: {} ({} members)", o.name, o.members.len());
        }
        for p in store.get_projects() {
            println!("  project: {} ({} tasks)", p.name, p.tasks.len());
        }
    }
    Ok(())
}
