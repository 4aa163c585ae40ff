use clap::{Args, Parser, Subcommand};

#[derive(Parser)]
#[command(name = "tb", about = concat!("taskboard v", env!("CARGO_PKG_VERSION"), " - kanban boards for small teams"), version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Output as JSON
    #[arg(long, global = true)]
    pub json: bool,

    /// Run against a different workspace directory
    #[arg(short = 'C', long = "workspace-dir", global = true)]
    pub workspace_dir: Option<String>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Initialize a new workspace in the current directory
    Init(InitArgs),
    /// List projects
    Projects,
    /// Create, show, edit, or delete a project
    Project(ProjectCmd),
    /// Manage project members
    Member(MemberCmd),
    /// Manage organizations, their members, and invites
    Org(OrgCmd),
    /// Direct conversations with other members
    Chat(ChatCmd),
    /// Show a project's board
    Board(BoardArgs),
    /// Add a task to a project (bottom of its column)
    Add(AddArgs),
    /// Show task details
    Show(TaskIdArg),
    /// Edit task fields
    Edit(EditArgs),
    /// Change task status (moves it to the end of the new column)
    Status(StatusArgs),
    /// Delete a task
    Rm(TaskIdArg),
    /// Move a task on the board (reorder or change column)
    Mv(MvArgs),
    /// Add or remove comments
    Comment(CommentCmd),
    /// List notifications, or mark them read
    Notifications(NotificationsCmd),
    /// Validate board integrity
    Check,
    /// Renumber task order in every column of a project
    Compact(ProjectArg),
    /// Search tasks by regex
    Search(SearchArgs),
    /// Show or switch the acting user
    User(UserArgs),
}

// ---------------------------------------------------------------------------
// Init args
// ---------------------------------------------------------------------------

#[derive(Args)]
pub struct InitArgs {
    /// Workspace name (default: inferred from directory name)
    #[arg(long)]
    pub name: Option<String>,
    /// Acting user id
    #[arg(long)]
    pub user_id: Option<String>,
    /// Acting user full name
    #[arg(long)]
    pub user_name: Option<String>,
    /// Acting user role (admin, manager, employee)
    #[arg(long)]
    pub role: Option<String>,
    /// Seed the board with sample projects
    #[arg(long)]
    pub demo: bool,
    /// Reinitialize even if taskboard/ already exists
    #[arg(long)]
    pub force: bool,
}

// ---------------------------------------------------------------------------
// Projects and members
// ---------------------------------------------------------------------------

#[derive(Args)]
pub struct ProjectArg {
    /// Project id or name
    pub project: String,
}

#[derive(Args)]
pub struct ProjectCmd {
    #[command(subcommand)]
    pub action: ProjectAction,
}

#[derive(Subcommand)]
pub enum ProjectAction {
    /// Create a project (you become its first member)
    New(ProjectNewArgs),
    /// Show project details and members
    Show(ProjectArg),
    /// Change name or description
    Edit(ProjectEditArgs),
    /// Delete a project and all its tasks
    Rm(ProjectArg),
}

#[derive(Args)]
pub struct ProjectNewArgs {
    /// Project name
    pub name: String,
    /// Organization id
    #[arg(long)]
    pub org: String,
    /// Organization display name
    #[arg(long)]
    pub org_name: Option<String>,
    #[arg(long)]
    pub desc: Option<String>,
}

#[derive(Args)]
pub struct ProjectEditArgs {
    /// Project id or name
    pub project: String,
    #[arg(long)]
    pub name: Option<String>,
    #[arg(long)]
    pub desc: Option<String>,
}

#[derive(Args)]
pub struct MemberCmd {
    #[command(subcommand)]
    pub action: MemberAction,
}

#[derive(Subcommand)]
pub enum MemberAction {
    /// Add a member to a project
    Add(MemberAddArgs),
    /// Change a member's role
    Role(MemberRoleArgs),
    /// Remove a member (their tasks become unassigned)
    Rm(MemberRmArgs),
}

#[derive(Args)]
pub struct MemberAddArgs {
    /// Project id or name
    pub project: String,
    /// Member id
    pub id: String,
    /// Member full name
    pub name: String,
    /// Role (admin, manager, employee)
    #[arg(long, default_value = "employee")]
    pub role: String,
}

#[derive(Args)]
pub struct MemberRoleArgs {
    /// Project id or name
    pub project: String,
    /// Member id
    pub id: String,
    /// New role (admin, manager, employee)
    pub role: String,
}

#[derive(Args)]
pub struct MemberRmArgs {
    /// Project id or name
    pub project: String,
    /// Member id
    pub id: String,
}

// ---------------------------------------------------------------------------
// Organizations
// ---------------------------------------------------------------------------

#[derive(Args)]
pub struct OrgArg {
    /// Organization id or name
    pub org: String,
}

#[derive(Args)]
pub struct OrgCmd {
    #[command(subcommand)]
    pub action: OrgAction,
}

#[derive(Subcommand)]
pub enum OrgAction {
    /// List organizations
    List,
    /// Create an organization (you become its admin)
    New(OrgNewArgs),
    /// Show an organization, its members, projects, and open invites
    Show(OrgArg),
    /// Change name or description
    Edit(OrgEditArgs),
    /// Delete an organization together with its projects
    Rm(OrgArg),
    /// Manage organization members
    Member(OrgMemberCmd),
    /// Invite someone to an organization
    Invite(OrgInviteArgs),
    /// Accept an invite addressed to you
    Accept(OrgAcceptArgs),
}

#[derive(Args)]
pub struct OrgNewArgs {
    /// Organization name
    pub name: String,
    /// Use this id instead of a generated one
    #[arg(long)]
    pub id: Option<String>,
    #[arg(long)]
    pub desc: Option<String>,
}

#[derive(Args)]
pub struct OrgEditArgs {
    /// Organization id or name
    pub org: String,
    #[arg(long)]
    pub name: Option<String>,
    #[arg(long)]
    pub desc: Option<String>,
}

#[derive(Args)]
pub struct OrgMemberCmd {
    #[command(subcommand)]
    pub action: OrgMemberAction,
}

#[derive(Subcommand)]
pub enum OrgMemberAction {
    /// Add a member directly, without an invite
    Add(OrgMemberAddArgs),
    /// Change a member's role
    Role(OrgMemberRoleArgs),
    /// Remove a member
    Rm(OrgMemberRmArgs),
}

#[derive(Args)]
pub struct OrgMemberAddArgs {
    /// Organization id or name
    pub org: String,
    /// Member id
    pub id: String,
    /// Member full name
    pub name: String,
    /// Role (admin, manager, employee)
    #[arg(long, default_value = "employee")]
    pub role: String,
}

#[derive(Args)]
pub struct OrgMemberRoleArgs {
    /// Organization id or name
    pub org: String,
    /// Member id
    pub id: String,
    /// New role (admin, manager, employee)
    pub role: String,
}

#[derive(Args)]
pub struct OrgMemberRmArgs {
    /// Organization id or name
    pub org: String,
    /// Member id
    pub id: String,
}

#[derive(Args)]
pub struct OrgInviteArgs {
    /// Organization id or name
    pub org: String,
    /// Invitee id
    pub id: String,
    /// Invitee full name
    pub name: String,
    /// Role granted on acceptance
    #[arg(long, default_value = "employee")]
    pub role: String,
}

#[derive(Args)]
pub struct OrgAcceptArgs {
    /// Organization id or name
    pub org: String,
    /// Invite id (or a unique prefix)
    pub invite: String,
}

// ---------------------------------------------------------------------------
// Conversations
// ---------------------------------------------------------------------------

#[derive(Args)]
pub struct ChatCmd {
    #[command(subcommand)]
    pub action: ChatAction,
}

#[derive(Subcommand)]
pub enum ChatAction {
    /// List your conversations, most recent first
    List,
    /// Open a conversation with someone (reuses an existing one)
    Start(ChatStartArgs),
    /// Send a message
    Send(ChatSendArgs),
    /// Show a conversation's messages
    Show(ConversationArg),
}

#[derive(Args)]
pub struct ChatStartArgs {
    /// Member id of the other person
    pub id: String,
    /// Their full name
    pub name: String,
    /// Organization the conversation belongs to (id or name)
    #[arg(long)]
    pub org: Option<String>,
}

#[derive(Args)]
pub struct ChatSendArgs {
    /// Conversation id (or a unique prefix)
    pub conversation: String,
    /// Message text
    pub text: String,
}

#[derive(Args)]
pub struct ConversationArg {
    /// Conversation id (or a unique prefix)
    pub conversation: String,
}

// ---------------------------------------------------------------------------
// Board and tasks
// ---------------------------------------------------------------------------

#[derive(Args)]
pub struct BoardArgs {
    /// Project id or name
    pub project: String,
    /// Show only tasks assigned to this member id
    #[arg(long)]
    pub assignee: Option<String>,
}

#[derive(Args)]
pub struct TaskIdArg {
    /// Task id (or a unique prefix)
    pub id: String,
}

#[derive(Args)]
pub struct AddArgs {
    /// Project id or name
    pub project: String,
    /// Task title
    pub title: String,
    #[arg(long)]
    pub desc: Option<String>,
    /// low, medium, high
    #[arg(long)]
    pub priority: Option<String>,
    /// Assignee member id
    #[arg(long)]
    pub assign: Option<String>,
    /// Due date (YYYY-MM-DD)
    #[arg(long)]
    pub due: Option<String>,
    /// Starting status or column
    #[arg(long)]
    pub status: Option<String>,
}

#[derive(Args)]
pub struct EditArgs {
    /// Task id (or a unique prefix)
    pub id: String,
    #[arg(long)]
    pub title: Option<String>,
    #[arg(long)]
    pub desc: Option<String>,
    /// Status or column
    #[arg(long)]
    pub status: Option<String>,
    /// low, medium, high
    #[arg(long)]
    pub priority: Option<String>,
    /// Assignee member id
    #[arg(long, conflicts_with = "unassign")]
    pub assign: Option<String>,
    /// Clear the assignee
    #[arg(long)]
    pub unassign: bool,
    /// Due date (YYYY-MM-DD), or "none" to clear
    #[arg(long)]
    pub due: Option<String>,
}

#[derive(Args)]
pub struct StatusArgs {
    /// Task id (or a unique prefix)
    pub id: String,
    /// New status (todo, in_progress, completed) or column (todo, in-progress, done)
    pub status: String,
}

#[derive(Args)]
pub struct MvArgs {
    /// Task id (or a unique prefix)
    pub id: String,
    /// Destination column (todo, in-progress, done)
    pub column: String,
    /// Position in the destination column (0-indexed, default: end)
    #[arg(long)]
    pub index: Option<usize>,
}

// ---------------------------------------------------------------------------
// Comments and notifications
// ---------------------------------------------------------------------------

#[derive(Args)]
pub struct CommentCmd {
    #[command(subcommand)]
    pub action: CommentAction,
}

#[derive(Subcommand)]
pub enum CommentAction {
    /// Add a comment to a task
    Add(CommentAddArgs),
    /// Delete a comment (author or manager only)
    Rm(CommentRmArgs),
}

#[derive(Args)]
pub struct CommentAddArgs {
    /// Task id (or a unique prefix)
    pub id: String,
    /// Comment text
    pub text: String,
}

#[derive(Args)]
pub struct CommentRmArgs {
    /// Task id (or a unique prefix)
    pub id: String,
    /// Comment id
    pub comment_id: String,
}

#[derive(Args)]
pub struct NotificationsCmd {
    #[command(subcommand)]
    pub action: Option<NotificationsAction>,
    /// Include notifications already read
    #[arg(long)]
    pub all: bool,
}

#[derive(Subcommand)]
pub enum NotificationsAction {
    /// Mark one notification, or all of yours, as read
    Read(NotificationsReadArgs),
    /// Delete a notification
    Dismiss(NotificationIdArg),
}

#[derive(Args)]
pub struct NotificationIdArg {
    /// Notification id (or a unique prefix)
    pub id: String,
}

#[derive(Args)]
pub struct NotificationsReadArgs {
    /// Notification id
    #[arg(required_unless_present = "all")]
    pub id: Option<String>,
    /// Mark every notification as read
    #[arg(long, conflicts_with = "id")]
    pub all: bool,
}

// ---------------------------------------------------------------------------
// Maintenance
// ---------------------------------------------------------------------------

#[derive(Args)]
pub struct SearchArgs {
    /// Regex pattern
    pub pattern: String,
    /// Limit to one project (id or name)
    #[arg(long)]
    pub project: Option<String>,
}

#[derive(Args)]
pub struct UserArgs {
    /// New user id
    #[arg(long)]
    pub id: Option<String>,
    /// New full name
    #[arg(long)]
    pub name: Option<String>,
    /// New role (admin, manager, employee)
    #[arg(long)]
    pub role: Option<String>,
}
