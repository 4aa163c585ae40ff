use super::org::resolve_org;
use super::{CmdResult, Invocation, load_session, print_json, write_session};
use crate::cli::commands::*;
use crate::cli::output::*;
use crate::model::member::MemberRef;
use crate::ops::store::{StoreError, TaskStore};

pub fn cmd_chat(cmd: ChatCmd, inv: &Invocation) -> CmdResult {
    match cmd.action {
        ChatAction::List => cmd_chat_list(inv),
        ChatAction::Start(args) => cmd_chat_start(args, inv),
        ChatAction::Send(args) => cmd_chat_send(args, inv),
        ChatAction::Show(args) => cmd_chat_show(args, inv),
    }
}

/// Resolve a conversation by id prefix among the user's own conversations
fn resolve_conversation(
    store: &TaskStore,
    user_id: &str,
    reference: &str,
) -> Result<String, StoreError> {
    let matches: Vec<String> = store
        .conversations_for(user_id)
        .iter()
        .filter(|c| c.id.starts_with(reference))
        .map(|c| c.id.clone())
        .collect();
    match matches.as_slice() {
        [one] => Ok(one.clone()),
        [] => Err(StoreError::ConversationNotFound(reference.to_string())),
        _ => Err(StoreError::Validation(format!(
            "conversation id prefix '{}' is ambiguous",
            reference
        ))),
    }
}

fn cmd_chat_list(inv: &Invocation) -> CmdResult {
    let session = load_session(inv)?;
    let user_id = &session.user().id;
    let list = session.store.conversations_for(user_id);
    if inv.json {
        let out: Vec<ConversationSummaryJson> = list
            .iter()
            .map(|c| conversation_summary(c, user_id))
            .collect();
        return print_json(&out);
    }
    if list.is_empty() {
        println!("no conversations (start one with `tb chat start`)");
    }
    for c in list {
        println!("{}", format_conversation_line(c, user_id));
    }
    Ok(())
}

fn cmd_chat_start(args: ChatStartArgs, inv: &Invocation) -> CmdResult {
    let conversation = write_session(inv, |s| {
        let org_id = args
            .org
            .as_deref()
            .map(|r| resolve_org(&s.store, r))
            .transpose()?;
        let me = s.user().member().to_ref();
        Ok(s.store.start_conversation(
            me,
            MemberRef::new(args.id, args.name),
            org_id.as_deref(),
        )?)
    })?;
    if inv.json {
        return print_json(&conversation);
    }
    println!("{}", conversation.id);
    Ok(())
}

fn cmd_chat_send(args: ChatSendArgs, inv: &Invocation) -> CmdResult {
    let message = write_session(inv, |s| {
        let me = s.user().member().to_ref();
        let id = resolve_conversation(&s.store, &me.id, &args.conversation)?;
        Ok(s.store.send_message(&id, &me, &args.text)?)
    })?;
    if inv.json {
        return print_json(&message);
    }
    match message {
        Some(m) => println!("{}", m.id),
        None => println!("empty message ignored"),
    }
    Ok(())
}

fn cmd_chat_show(args: ConversationArg, inv: &Invocation) -> CmdResult {
    let session = load_session(inv)?;
    let user_id = &session.user().id;
    let id = resolve_conversation(&session.store, user_id, &args.conversation)?;
    let Some(conversation) = session.store.get_conversation(&id) else {
        return Err(StoreError::ConversationNotFound(id).into());
    };
    if inv.json {
        return print_json(conversation);
    }
    for line in format_conversation(conversation, user_id) {
        println!("{}", line);
    }
    Ok(())
}
