//! GetPresenceHandler - lists who is currently in a channel.

use std::sync::Arc;

use serde::Serialize;

use crate::domain::foundation::AuthenticatedUser;
use crate::domain::realtime::{ChannelName, Participant, RealtimeError};
use crate::ports::RoomMembership;

use super::ChannelAuthorizer;

#[derive(Debug, Clone)]
pub struct GetPresenceQuery {
    pub user: AuthenticatedUser,
    pub channel: ChannelName,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PresenceView {
    pub channel: ChannelName,
    pub participant_count: usize,
    pub participants: Vec<Participant>,
}

/// Presence query. Same access rules as joining the channel.
pub struct GetPresenceHandler {
    authorizer: ChannelAuthorizer,
    membership: Arc<dyn RoomMembership>,
}

impl GetPresenceHandler {
    pub fn new(authorizer: ChannelAuthorizer, membership: Arc<dyn RoomMembership>) -> Self {
        Self {
            authorizer,
            membership,
        }
    }

    pub async fn handle(&self, query: GetPresenceQuery) -> Result<PresenceView, RealtimeError> {
        self.authorizer.authorize(&query.user, &query.channel).await?;

        let participants = self.membership.participants(&query.channel).await;
        Ok(PresenceView {
            channel: query.channel,
            participant_count: participants.len(),
            participants,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::enrollment::InMemoryEnrollmentDirectory;
    use crate::adapters::websocket::{PresenceTracker, RoomRegistry};
    use crate::domain::foundation::{ConnectionId, CourseId, UserId};
    use crate::ports::CourseRole;
    use tokio::sync::mpsc;

    fn user(id: &str) -> AuthenticatedUser {
        AuthenticatedUser::new(UserId::new(id).unwrap(), format!("{}@campus.edu", id), None)
    }

    fn cs101() -> ChannelName {
        ChannelName::class(CourseId::new("CS101").unwrap())
    }

    async fn handler_with_members(members: &[&str]) -> GetPresenceHandler {
        let course = CourseId::new("CS101").unwrap();
        let mut directory = InMemoryEnrollmentDirectory::new();
        for id in ["u", "v", "w"] {
            directory = directory.with_enrollment(
                course.clone(),
                UserId::new(id).unwrap(),
                CourseRole::Student,
            );
        }

        let registry = Arc::new(RoomRegistry::new());
        for id in members {
            let connection_id = ConnectionId::new();
            let (tx, _rx) = mpsc::unbounded_channel();
            registry.register(connection_id, user(id), tx).await;
            registry.join(connection_id, &cs101()).await.unwrap();
        }

        GetPresenceHandler::new(
            ChannelAuthorizer::new(Arc::new(directory)),
            Arc::new(PresenceTracker::new(registry)),
        )
    }

    #[tokio::test]
    async fn lists_current_participants() {
        let handler = handler_with_members(&["u", "v"]).await;

        let view = handler
            .handle(GetPresenceQuery {
                user: user("w"),
                channel: cs101(),
            })
            .await
            .unwrap();

        assert_eq!(view.participant_count, 2);
        let mut ids: Vec<String> = view.participants.iter().map(|p| p.user_id.to_string()).collect();
        ids.sort();
        assert_eq!(ids, vec!["u", "v"]);
    }

    #[tokio::test]
    async fn empty_channel_has_no_participants() {
        let handler = handler_with_members(&[]).await;

        let view = handler
            .handle(GetPresenceQuery {
                user: user("u"),
                channel: cs101(),
            })
            .await
            .unwrap();

        assert_eq!(view.participant_count, 0);
        assert!(view.participants.is_empty());
    }

    #[tokio::test]
    async fn unenrolled_user_cannot_look() {
        let handler = handler_with_members(&["u"]).await;

        let result = handler
            .handle(GetPresenceQuery {
                user: user("stranger"),
                channel: cs101(),
            })
            .await;

        assert!(matches!(result, Err(RealtimeError::Forbidden(_))));
    }
}
