//! Rules turning domain events into notifications.
//!
//! Each rule returns one [`NewNotification`] per recipient, never including
//! the user who triggered the event. Hand the result to
//! [`NotificationDispatcher::dispatch_all`](super::dispatcher::NotificationDispatcher::dispatch_all).

use std::collections::BTreeSet;

use taskhub_entity::notification::{NewNotification, NotificationType};

/// Longest comment excerpt carried in a mention, in characters.
pub const MENTION_EXCERPT_CHARS: usize = 100;

/// The user who triggered an event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Actor {
    pub id: i64,
    /// Nickname, falling back to the username.
    pub name: String,
}

impl Actor {
    pub fn new(id: i64, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
        }
    }
}

/// The entity an event is about.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Subject {
    pub id: i64,
    pub name: String,
}

impl Subject {
    pub fn new(id: i64, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
        }
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct NotificationRules;

impl NotificationRules {
    /// Users @-mentioned in a project comment.
    pub fn mention(
        actor: &Actor,
        project: &Subject,
        mentioned: &[i64],
        comment_html: &str,
    ) -> Vec<NewNotification> {
        let excerpt = excerpt(&strip_html(comment_html), MENTION_EXCERPT_CHARS);
        recipients(mentioned, Some(actor.id))
            .map(|user_id| {
                NewNotification::new(
                    user_id,
                    NotificationType::Mention,
                    format!("You were mentioned in project \"{}\"", project.name),
                )
                .with_content(format!("{} mentioned you in a comment: {excerpt}", actor.name))
                .related_to("project", project.id)
            })
            .collect()
    }

    pub fn task_assigned(actor: &Actor, task: &Subject, assignees: &[i64]) -> Vec<NewNotification> {
        recipients(assignees, Some(actor.id))
            .map(|user_id| {
                NewNotification::new(user_id, NotificationType::TaskAssigned, "You were assigned a new task")
                    .with_content(format!("{} assigned you the task: {}", actor.name, task.name))
                    .related_to("task", task.id)
            })
            .collect()
    }

    pub fn team_member_added(actor: &Actor, team: &Subject, members: &[i64]) -> Vec<NewNotification> {
        recipients(members, Some(actor.id))
            .map(|user_id| {
                NewNotification::new(
                    user_id,
                    NotificationType::TeamInvite,
                    format!("You were added to team \"{}\"", team.name),
                )
                .with_content(format!("{} added you to team \"{}\"", actor.name, team.name))
                .related_to("team", team.id)
            })
            .collect()
    }

    /// Members added to a project. Without an actor the members were
    /// assigned as owners when the project was created.
    pub fn project_member_added(
        actor: Option<&Actor>,
        project: &Subject,
        members: &[i64],
    ) -> Vec<NewNotification> {
        recipients(members, actor.map(|a| a.id))
            .map(|user_id| {
                let (title, content) = match actor {
                    Some(actor) => (
                        format!("You were assigned to project \"{}\"", project.name),
                        format!("{} added you to project \"{}\"", actor.name, project.name),
                    ),
                    None => {
                        let text = format!("You were made an owner of project \"{}\"", project.name);
                        (text.clone(), text)
                    }
                };
                NewNotification::new(user_id, NotificationType::ProjectAssigned, title)
                    .with_content(content)
                    .related_to("project", project.id)
            })
            .collect()
    }

    /// Every member of a team that was assigned to a project.
    pub fn team_project_assigned(
        actor: Option<&Actor>,
        project: &Subject,
        team_members: &[i64],
    ) -> Vec<NewNotification> {
        recipients(team_members, actor.map(|a| a.id))
            .map(|user_id| {
                NewNotification::new(
                    user_id,
                    NotificationType::ProjectAssigned,
                    "Your team was assigned a new project",
                )
                .with_content(format!("Your team was assigned project \"{}\"", project.name))
                .related_to("project", project.id)
            })
            .collect()
    }
}

/// Distinct recipients in first-seen order, minus the actor.
fn recipients(ids: &[i64], actor: Option<i64>) -> impl Iterator<Item = i64> + '_ {
    let mut seen = BTreeSet::new();
    ids.iter()
        .copied()
        .filter(move |id| Some(*id) != actor && seen.insert(*id))
}

/// Remove `<...>` tags and collapse whitespace runs. A `<` without a
/// closing `>` (or an empty `<>`) is kept as text.
pub fn strip_html(html: &str) -> String {
    let mut text = String::with_capacity(html.len());
    let mut rest = html;
    while let Some(start) = rest.find('<') {
        text.push_str(&rest[..start]);
        let after = &rest[start + 1..];
        match after.find('>') {
            Some(end) if end > 0 => rest = &after[end + 1..],
            _ => {
                text.push('<');
                rest = after;
            }
        }
    }
    text.push_str(rest);
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn excerpt(text: &str, max_chars: usize) -> String {
    match text.char_indices().nth(max_chars) {
        Some((cut, _)) => format!("{}...", &text[..cut]),
        None => text.to_string(),
    }
}
