use std::str::FromStr;

use log::{debug, info};

use super::{CmdResult, Invocation, load_session, print_json, require, write_session};
use crate::cli::commands::*;
use crate::cli::output::*;
use crate::model::config::UserConfig;
use crate::model::member::{Member, MemberRef, Role};
use crate::model::organization::{Organization, OrganizationInput};
use crate::ops::access;
use crate::ops::store::{StoreError, TaskStore};

pub fn cmd_org(cmd: OrgCmd, inv: &Invocation) -> CmdResult {
    match cmd.action {
        OrgAction::List => cmd_org_list(inv),
        OrgAction::New(args) => cmd_org_new(args, inv),
        OrgAction::Show(args) => cmd_org_show(args, inv),
        OrgAction::Edit(args) => cmd_org_edit(args, inv),
        OrgAction::Rm(args) => cmd_org_rm(args, inv),
        OrgAction::Member(cmd) => match cmd.action {
            OrgMemberAction::Add(args) => cmd_org_member_add(args, inv),
            OrgMemberAction::Role(args) => cmd_org_member_role(args, inv),
            OrgMemberAction::Rm(args) => cmd_org_member_rm(args, inv),
        },
        OrgAction::Invite(args) => cmd_org_invite(args, inv),
        OrgAction::Accept(args) => cmd_org_accept(args, inv),
    }
}

/// Resolve an organization reference: exact id, else case-insensitive name.
pub(super) fn resolve_org(store: &TaskStore, reference: &str) -> Result<String, StoreError> {
    if let Some(org) = store.get_organization(reference) {
        return Ok(org.id.clone());
    }
    let matches: Vec<&Organization> = store
        .get_organizations()
        .iter()
        .filter(|o| o.name.eq_ignore_ascii_case(reference))
        .collect();
    match matches.as_slice() {
        [one] => Ok(one.id.clone()),
        [] => Err(StoreError::OrganizationNotFound(reference.to_string())),
        _ => Err(StoreError::Validation(format!(
            "more than one organization is named '{}', use its id",
            reference
        ))),
    }
}

/// The configured user as seen by an organization
fn acting_org_member(org: &Organization, user: &UserConfig) -> Member {
    match org.member(&user.id) {
        Some(m) => m.clone(),
        None => user.member(),
    }
}

/// Resolve `reference` and check the acting user's role there passes `allowed`.
fn managed_org(
    store: &TaskStore,
    user: &UserConfig,
    reference: &str,
    allowed: fn(Role) -> bool,
    what: &str,
) -> Result<String, StoreError> {
    let org_id = resolve_org(store, reference)?;
    if let Some(org) = store.get_organization(&org_id) {
        let actor = acting_org_member(org, user);
        require(allowed(actor.role), what, &actor)?;
    }
    Ok(org_id)
}

fn cmd_org_list(inv: &Invocation) -> CmdResult {
    let session = load_session(inv)?;
    let store = &session.store;
    let list: Vec<OrganizationSummaryJson> = store
        .get_organizations()
        .iter()
        .map(|o| organization_summary(o, store.organization_projects(&o.id).len()))
        .collect();
    if inv.json {
        return print_json(&list);
    }
    if list.is_empty() {
        println!("no organizations (create one with `tb org new`)");
    }
    for o in list {
        println!(
            "{}  {} - {} members, {} projects",
            short_id(&o.id),
            o.name,
            o.members,
            o.projects
        );
    }
    Ok(())
}

fn cmd_org_new(args: OrgNewArgs, inv: &Invocation) -> CmdResult {
    let org = write_session(inv, |s| {
        let mut creator = s.user().member();
        creator.role = Role::Admin;
        let mut input = OrganizationInput::new(args.name);
        input.id = args.id;
        input.description = args.desc.unwrap_or_default();
        input.members = vec![creator];
        Ok(s.store.add_organization(input)?)
    })?;
    info!("created organization {}", org.id);
    if inv.json {
        return print_json(&org);
    }
    println!("{}", org.id);
    Ok(())
}

fn cmd_org_show(args: OrgArg, inv: &Invocation) -> CmdResult {
    let session = load_session(inv)?;
    let org_id = resolve_org(&session.store, &args.org)?;
    let Some(org) = session.store.get_organization(&org_id) else {
        return Err(StoreError::OrganizationNotFound(org_id).into());
    };
    if inv.json {
        return print_json(org);
    }
    let projects = session.store.organization_projects(&org_id);
    for line in format_organization_detail(org, &projects) {
        println!("{}", line);
    }
    Ok(())
}

fn cmd_org_edit(args: OrgEditArgs, inv: &Invocation) -> CmdResult {
    write_session(inv, |s| {
        let org_id = managed_org(
            &s.store,
            s.user(),
            &args.org,
            access::can_manage_members,
            "edit this organization",
        )?;
        let mut org = s
            .store
            .get_organization(&org_id)
            .cloned()
            .ok_or_else(|| StoreError::OrganizationNotFound(org_id.clone()))?;
        if let Some(name) = args.name {
            org.name = name;
        }
        if let Some(desc) = args.desc {
            org.description = desc;
        }
        s.store.update_organization(org)?;
        Ok(())
    })
}

fn cmd_org_rm(args: OrgArg, inv: &Invocation) -> CmdResult {
    let removed = write_session(inv, |s| {
        let org_id = match managed_org(
            &s.store,
            s.user(),
            &args.org,
            access::can_delete_organization,
            "delete this organization",
        ) {
            Ok(id) => id,
            Err(StoreError::OrganizationNotFound(_)) => {
                debug!("organization {} already absent", args.org);
                return Ok(0);
            }
            Err(e) => return Err(e.into()),
        };
        Ok(s.store.delete_organization(&org_id))
    })?;
    if inv.json {
        return print_json(&serde_json::json!({ "projects_deleted": removed }));
    }
    if removed > 0 {
        println!("deleted {} projects with the organization", removed);
    }
    Ok(())
}

fn cmd_org_member_add(args: OrgMemberAddArgs, inv: &Invocation) -> CmdResult {
    let role = Role::from_str(&args.role)?;
    write_session(inv, |s| {
        let org_id = managed_org(
            &s.store,
            s.user(),
            &args.org,
            access::can_manage_members,
            "add members",
        )?;
        s.store
            .add_organization_member(&org_id, Member::new(args.id, args.name, role))?;
        Ok(())
    })
}

fn cmd_org_member_role(args: OrgMemberRoleArgs, inv: &Invocation) -> CmdResult {
    let role = Role::from_str(&args.role)?;
    write_session(inv, |s| {
        let org_id = managed_org(
            &s.store,
            s.user(),
            &args.org,
            access::can_manage_members,
            "change roles",
        )?;
        s.store.update_organization_member_role(&org_id, &args.id, role)?;
        Ok(())
    })
}

fn cmd_org_member_rm(args: OrgMemberRmArgs, inv: &Invocation) -> CmdResult {
    write_session(inv, |s| {
        let org_id = managed_org(
            &s.store,
            s.user(),
            &args.org,
            access::can_manage_members,
            "remove members",
        )?;
        s.store.remove_organization_member(&org_id, &args.id)?;
        Ok(())
    })
}

fn cmd_org_invite(args: OrgInviteArgs, inv: &Invocation) -> CmdResult {
    let role = Role::from_str(&args.role)?;
    let invite = write_session(inv, |s| {
        let org_id = managed_org(
            &s.store,
            s.user(),
            &args.org,
            access::can_manage_members,
            "invite members",
        )?;
        let invitee = MemberRef::new(args.id, args.name);
        Ok(s.store.invite_member(&org_id, invitee, role)?)
    })?;
    if inv.json {
        return print_json(&invite);
    }
    println!("{}", invite.id);
    Ok(())
}

fn cmd_org_accept(args: OrgAcceptArgs, inv: &Invocation) -> CmdResult {
    let member = write_session(inv, |s| {
        let org_id = resolve_org(&s.store, &args.org)?;
        let org = s
            .store
            .get_organization(&org_id)
            .ok_or_else(|| StoreError::OrganizationNotFound(org_id.clone()))?;
        let matches: Vec<String> = org
            .invites
            .iter()
            .filter(|i| !i.accepted && i.id.starts_with(&args.invite))
            .map(|i| i.id.clone())
            .collect();
        let invite_id = match matches.as_slice() {
            [one] => one.clone(),
            [] => return Err(StoreError::InviteNotFound(args.invite.clone()).into()),
            _ => {
                return Err(StoreError::Validation(format!(
                    "invite id prefix '{}' is ambiguous",
                    args.invite
                ))
                .into());
            }
        };
        let user = s.user().member();
        let addressed_to_user = org
            .invite(&invite_id)
            .is_some_and(|i| i.invitee.id == user.id);
        require(addressed_to_user, "accept an invite addressed to someone else", &user)?;
        Ok(s.store.accept_invite(&org_id, &invite_id)?)
    })?;
    if inv.json {
        return print_json(&member);
    }
    println!("joined as {} [{}]", member.full_name, member.role);
    Ok(())
}
