mod parse;

pub use parse::{parse_command, Command};

use crate::platform::{Embed, EmbedField, RenameError, ReplyBody, RoomRenamer, REASON_TITLE_CREATED};
use crate::shared::names::{leading_symbol, normalize_label};
use crate::title::{Title, TitleEntry, TitleRegistry};
use crate::types::{CommandContext, Member, MemberId, RoomSnapshot};
use serde::Deserialize;
use std::sync::Arc;

pub const COMMAND_NAME: &str = "/title";

#[derive(Debug, Clone, Deserialize)]
pub struct CommandRequest {
    #[serde(flatten)]
    pub context: CommandContext,
    pub author: Member,
    #[serde(rename = "inGuild", default = "default_in_guild")]
    pub in_guild: bool,
    #[serde(default)]
    pub room: Option<RoomSnapshot>,
    #[serde(default)]
    pub argument: String,
    #[serde(default)]
    pub mentions: Vec<Member>,
}

fn default_in_guild() -> bool {
    true
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    Accept,
    Deny,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandOutcome {
    pub verdict: Option<Verdict>,
    pub replies: Vec<ReplyBody>,
}

impl CommandOutcome {
    fn ignored() -> Self {
        Self {
            verdict: None,
            replies: Vec::new(),
        }
    }

    fn accept() -> Self {
        Self {
            verdict: Some(Verdict::Accept),
            replies: Vec::new(),
        }
    }

    fn deny() -> Self {
        Self {
            verdict: Some(Verdict::Deny),
            replies: Vec::new(),
        }
    }

    fn with_reply(mut self, body: ReplyBody) -> Self {
        self.replies.push(body);
        self
    }

    fn with_text(self, text: impl Into<String>) -> Self {
        self.with_reply(ReplyBody::text(text))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum LabelMode {
    // `<label>`: a new label takes the owner set over.
    Claim,
    // `edit <label>`: a new label keeps the current owners.
    Edit,
}

#[derive(Clone)]
pub struct CommandEngine {
    registry: Arc<TitleRegistry>,
    renamer: Arc<dyn RoomRenamer>,
    max_name_length: usize,
}

impl CommandEngine {
    pub fn new(
        registry: Arc<TitleRegistry>,
        renamer: Arc<dyn RoomRenamer>,
        max_name_length: usize,
    ) -> Self {
        Self {
            registry,
            renamer,
            max_name_length,
        }
    }

    pub async fn execute(&self, request: &CommandRequest) -> CommandOutcome {
        if request.author.bot {
            return CommandOutcome::ignored();
        }

        let command = parse_command(&request.argument);
        if command == Command::Help {
            return CommandOutcome::accept().with_reply(ReplyBody::Embed(help_embed()));
        }
        if !request.in_guild {
            return CommandOutcome::deny().with_text("Direct messages are not supported.");
        }
        let Some(room) = &request.room else {
            tracing::debug!(member_id = %request.author.id, "command from outside a voice room");
            return CommandOutcome::deny().with_text("Join a voice room and try again.");
        };

        match command {
            Command::Help => CommandOutcome::accept().with_reply(ReplyBody::Embed(help_embed())),
            Command::Info => self.info(room, &request.author).await,
            Command::Join => self.join(room, &request.author, &request.mentions).await,
            Command::Edit(label) => {
                self.apply_label(request, room, &label, LabelMode::Edit).await
            }
            Command::Claim(label) => {
                self.apply_label(request, room, &label, LabelMode::Claim).await
            }
        }
    }

    async fn info(&self, room: &RoomSnapshot, invoker: &Member) -> CommandOutcome {
        let Some(title) = self.registry.get(room.id).await else {
            return no_label(room);
        };

        let mut owner_list = title
            .owners()
            .iter()
            .map(|owner| format!("`{}`", owner_name(room, *owner)))
            .collect::<Vec<_>>()
            .join("\n");
        if owner_list.is_empty() {
            owner_list = "None\nRestoring the room name may have failed.".to_string();
        }
        if !title.is_owner(invoker.id) {
            owner_list.push_str(&format!("\n➡️ `{COMMAND_NAME} join` to claim ownership"));
        }

        CommandOutcome::accept().with_reply(ReplyBody::Embed(Embed {
            title: "👤 Label owners".to_string(),
            description: format!("Owners: {}", title.owners().len()),
            fields: vec![
                EmbedField {
                    name: "Room name".to_string(),
                    value: title.default_name().to_string(),
                    inline: false,
                },
                EmbedField {
                    name: "Label".to_string(),
                    value: title.label().to_string(),
                    inline: false,
                },
                EmbedField {
                    name: "Owners".to_string(),
                    value: owner_list,
                    inline: false,
                },
            ],
        }))
    }

    async fn join(&self, room: &RoomSnapshot, invoker: &Member, mentions: &[Member]) -> CommandOutcome {
        let mut entry = self.registry.entry(room.id).await;
        let Some(title) = entry.get_mut() else {
            return no_label(room);
        };

        let mut targets: Vec<&Member> = Vec::new();
        for mention in mentions {
            if !targets.iter().any(|target| target.id == mention.id) {
                targets.push(mention);
            }
        }
        if targets.is_empty() {
            targets.push(invoker);
        }

        let mut replies = Vec::new();
        let mut added = Vec::new();
        for target in targets {
            if title.is_owner(target.id) {
                replies.push(already_joined(target, invoker));
            } else if !room.is_present(target.id) {
                replies.push(format!("`{}` is not in the voice room.", target.label()));
            } else {
                title.add_owner(target.id);
                added.push(target.id);
            }
        }
        drop(entry);

        let mut outcome = if added.is_empty() {
            CommandOutcome::deny()
        } else {
            tracing::info!(room_id = %room.id, ?added, "owners joined label");
            CommandOutcome::accept()
        };
        outcome.replies.extend(replies.into_iter().map(ReplyBody::Text));
        outcome
    }

    async fn apply_label(
        &self,
        request: &CommandRequest,
        room: &RoomSnapshot,
        raw_label: &str,
        mode: LabelMode,
    ) -> CommandOutcome {
        let label = normalize_label(raw_label);
        if label.is_empty() {
            return CommandOutcome::deny().with_text("The label must not be empty.");
        }
        let invoker = &request.author;

        let mut entry = self.registry.entry(room.id).await;
        if entry.get().is_none() {
            if mode == LabelMode::Edit {
                return CommandOutcome::deny().with_text(format!(
                    "`{}` has no label to edit.",
                    room.name
                ));
            }
            return self.create(entry, request, room, label).await;
        }
        let Some(title) = entry.get_mut() else {
            return no_label(room);
        };

        if title.label() == label {
            if !title.add_owner(invoker.id) {
                return CommandOutcome::deny().with_text(already_joined(invoker, invoker));
            }
            tracing::info!(room_id = %room.id, member_id = %invoker.id, "owner joined label by name");
            return CommandOutcome::accept();
        }

        let titled_name = title.titled_name_with(&label);
        if let Some(denial) = self.check_length(&titled_name) {
            return denial;
        }
        let previous = title.clone();
        title.set_label(label);
        if mode == LabelMode::Claim || title.is_stuck() || title.owners().is_empty() {
            title.reset_owners(invoker.id);
        }
        let candidate = title.clone();
        match self.rename(&candidate).await {
            Ok(()) => {
                tracing::info!(room_id = %room.id, titled_name = %titled_name, ?mode, "label renamed");
                CommandOutcome::accept()
            }
            Err(error) => {
                entry.insert(previous);
                rename_failed(room, error)
            }
        }
    }

    async fn create(
        &self,
        mut entry: TitleEntry<'_>,
        request: &CommandRequest,
        room: &RoomSnapshot,
        label: String,
    ) -> CommandOutcome {
        let titled_name = format!("{}{label}", leading_symbol(&room.name));
        if let Some(denial) = self.check_length(&titled_name) {
            return denial;
        }
        let title = Title::new(
            room.id,
            &room.name,
            request.context.channel,
            label,
            request.author.id,
        );
        match self.rename(&title).await {
            Ok(()) => {
                tracing::info!(room_id = %room.id, titled_name = %titled_name, "label created");
                entry.insert(title);
                CommandOutcome::accept()
            }
            Err(error) => rename_failed(room, error),
        }
    }

    async fn rename(&self, title: &Title) -> Result<(), RenameError> {
        self.renamer
            .rename_room(title.room_id(), &title.titled_name(), REASON_TITLE_CREATED)
            .await
    }

    fn check_length(&self, titled_name: &str) -> Option<CommandOutcome> {
        if titled_name.chars().count() <= self.max_name_length {
            return None;
        }
        Some(CommandOutcome::deny().with_text(format!(
            "Room names are limited to {} characters.",
            self.max_name_length
        )))
    }
}

fn help_embed() -> Embed {
    Embed {
        title: "ℹ️ Usage".to_string(),
        description: [
            format!("`{COMMAND_NAME} <label>` label the voice room you are in"),
            format!("`{COMMAND_NAME}`, `{COMMAND_NAME} help` show this help"),
            format!("`{COMMAND_NAME} join [@members]` claim ownership of the label"),
            format!("`{COMMAND_NAME} edit <label>` change the label and keep its owners"),
            format!("`{COMMAND_NAME} info` show who owns the label"),
            "Leaving the voice room releases ownership.".to_string(),
            "The room name is restored once no owners remain.".to_string(),
        ]
        .join("\n"),
        fields: Vec::new(),
    }
}

fn no_label(room: &RoomSnapshot) -> CommandOutcome {
    tracing::debug!(room_id = %room.id, "no label for room");
    CommandOutcome::deny().with_text(format!("`{}` has no label.", room.name))
}

fn already_joined(target: &Member, invoker: &Member) -> String {
    if target.id == invoker.id {
        "You have already joined.".to_string()
    } else {
        format!("`{}` has already joined.", target.label())
    }
}

fn owner_name(room: &RoomSnapshot, owner: MemberId) -> String {
    room.member(owner)
        .map(Member::label)
        .unwrap_or_else(|| format!("<@{owner}>"))
}

fn rename_failed(room: &RoomSnapshot, error: RenameError) -> CommandOutcome {
    tracing::warn!(room_id = %room.id, ?error, "failed to rename room");
    CommandOutcome::deny().with_text(format!("Could not rename the room: {error}"))
}
