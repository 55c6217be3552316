//! JoinChannelHandler - adds a connection to one or more channels after authorization.

use std::sync::Arc;

use crate::domain::foundation::{AuthenticatedUser, ConnectionId, CourseId};
use crate::domain::realtime::{ChannelKind, ChannelName, MembershipChange, RealtimeError};
use crate::ports::RoomMembership;

use super::ChannelAuthorizer;

/// What a client asked to join.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum JoinTarget {
    /// The caller's own notification feed.
    Notifications,
    /// The caller's own direct-message inbox.
    Chat,
    Class(CourseId),
    /// Course announcements plus the global channel, or only the global
    /// channel when no course is given.
    Announcements(Option<CourseId>),
}

impl JoinTarget {
    /// Channels this request resolves to for the given principal.
    pub fn channels(&self, user: &AuthenticatedUser) -> Vec<ChannelName> {
        match self {
            JoinTarget::Notifications => vec![ChannelName::notifications(user.id.clone())],
            JoinTarget::Chat => vec![ChannelName::chat(user.id.clone())],
            JoinTarget::Class(course_id) => vec![ChannelName::class(course_id.clone())],
            JoinTarget::Announcements(Some(course_id)) => vec![
                ChannelName::announcements(course_id.clone()),
                ChannelName::GlobalAnnouncements,
            ],
            JoinTarget::Announcements(None) => vec![ChannelName::GlobalAnnouncements],
        }
    }

    pub fn kind(&self) -> ChannelKind {
        match self {
            JoinTarget::Notifications => ChannelKind::Notifications,
            JoinTarget::Chat => ChannelKind::Chat,
            JoinTarget::Class(_) => ChannelKind::Class,
            JoinTarget::Announcements(_) => ChannelKind::Announcements,
        }
    }
}

#[derive(Debug, Clone)]
pub struct JoinChannelCommand {
    pub connection_id: ConnectionId,
    pub user: AuthenticatedUser,
    pub target: JoinTarget,
}

#[derive(Debug, Clone)]
pub struct JoinChannelResult {
    pub target: JoinTarget,
    /// One entry per resolved channel, in resolution order.
    pub changes: Vec<MembershipChange>,
}

impl JoinChannelResult {
    pub fn channels(&self) -> Vec<ChannelName> {
        self.changes.iter().map(|c| c.channel.clone()).collect()
    }

    /// Member count of the class channel, for class joins.
    pub fn participant_count(&self) -> Option<usize> {
        self.changes
            .iter()
            .find(|c| c.channel.is_presence_tracked())
            .map(|c| c.member_count)
    }
}

/// Handler for joins.
///
/// All channels of a request are authorized before any is joined, so a
/// refused request leaves membership untouched.
pub struct JoinChannelHandler {
    authorizer: ChannelAuthorizer,
    membership: Arc<dyn RoomMembership>,
}

impl JoinChannelHandler {
    pub fn new(authorizer: ChannelAuthorizer, membership: Arc<dyn RoomMembership>) -> Self {
        Self {
            authorizer,
            membership,
        }
    }

    pub async fn handle(&self, cmd: JoinChannelCommand) -> Result<JoinChannelResult, RealtimeError> {
        let channels = cmd.target.channels(&cmd.user);

        for channel in &channels {
            if let Err(err) = self.authorizer.authorize(&cmd.user, channel).await {
                tracing::info!(
                    connection_id = %cmd.connection_id,
                    user_id = %cmd.user.id,
                    %channel,
                    code = %err.code(),
                    "join refused"
                );
                return Err(err);
            }
        }

        let mut changes = Vec::with_capacity(channels.len());
        for channel in &channels {
            let change = self.membership.join(cmd.connection_id, channel).await?;
            tracing::debug!(
                connection_id = %cmd.connection_id,
                user_id = %cmd.user.id,
                %channel,
                applied = change.applied,
                members = change.member_count,
                "joined channel"
            );
            changes.push(change);
        }

        Ok(JoinChannelResult {
            target: cmd.target,
            changes,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::enrollment::InMemoryEnrollmentDirectory;
    use crate::domain::foundation::UserId;
    use crate::domain::realtime::Participant;
    use crate::ports::CourseRole;
    use async_trait::async_trait;
    use std::collections::HashMap;
    use std::sync::Mutex;

    #[derive(Default)]
    struct RecordingMembership {
        members: Mutex<HashMap<ChannelName, Vec<ConnectionId>>>,
        closed: bool,
    }

    #[async_trait]
    impl RoomMembership for RecordingMembership {
        async fn join(
            &self,
            connection_id: ConnectionId,
            channel: &ChannelName,
        ) -> Result<MembershipChange, RealtimeError> {
            if self.closed {
                return Err(RealtimeError::ConnectionClosed(connection_id));
            }
            let mut members = self.members.lock().unwrap();
            let list = members.entry(channel.clone()).or_default();
            let applied = !list.contains(&connection_id);
            if applied {
                list.push(connection_id);
            }
            Ok(MembershipChange {
                channel: channel.clone(),
                applied,
                member_count: list.len(),
            })
        }

        async fn leave(&self, _: ConnectionId, channel: &ChannelName) -> MembershipChange {
            MembershipChange::unchanged(channel.clone(), 0)
        }

        async fn drop_connection(&self, _: ConnectionId) -> Vec<MembershipChange> {
            vec![]
        }

        async fn member_count(&self, channel: &ChannelName) -> usize {
            self.members.lock().unwrap().get(channel).map_or(0, Vec::len)
        }

        async fn participants(&self, _: &ChannelName) -> Vec<Participant> {
            vec![]
        }
    }

    fn user(id: &str) -> AuthenticatedUser {
        AuthenticatedUser::new(UserId::new(id).unwrap(), format!("{}@campus.edu", id), None)
    }

    fn course(id: &str) -> CourseId {
        CourseId::new(id).unwrap()
    }

    fn setup() -> (JoinChannelHandler, Arc<RecordingMembership>) {
        let directory = InMemoryEnrollmentDirectory::new()
            .with_enrollment(course("CS101"), UserId::new("u").unwrap(), CourseRole::Student)
            .with_enrollment(course("CS101"), UserId::new("v").unwrap(), CourseRole::Student)
            .with_course(course("MA200"));
        let membership = Arc::new(RecordingMembership::default());
        let handler = JoinChannelHandler::new(
            ChannelAuthorizer::new(Arc::new(directory)),
            membership.clone(),
        );
        (handler, membership)
    }

    fn cmd(who: &str, target: JoinTarget) -> JoinChannelCommand {
        JoinChannelCommand {
            connection_id: ConnectionId::new(),
            user: user(who),
            target,
        }
    }

    #[test]
    fn targets_resolve_to_canonical_channels() {
        let u = user("u");
        assert_eq!(
            JoinTarget::Notifications.channels(&u),
            vec![ChannelName::notifications(u.id.clone())]
        );
        assert_eq!(
            JoinTarget::Announcements(Some(course("CS101"))).channels(&u),
            vec![
                ChannelName::announcements(course("CS101")),
                ChannelName::GlobalAnnouncements
            ]
        );
        assert_eq!(
            JoinTarget::Announcements(None).channels(&u),
            vec![ChannelName::GlobalAnnouncements]
        );
    }

    #[tokio::test]
    async fn class_join_reports_participant_count() {
        let (handler, _) = setup();

        let first = handler
            .handle(cmd("u", JoinTarget::Class(course("CS101"))))
            .await
            .unwrap();
        let second = handler
            .handle(cmd("v", JoinTarget::Class(course("CS101"))))
            .await
            .unwrap();

        assert_eq!(first.participant_count(), Some(1));
        assert_eq!(second.participant_count(), Some(2));
    }

    #[tokio::test]
    async fn course_announcement_join_includes_global() {
        let (handler, membership) = setup();

        let result = handler
            .handle(cmd("u", JoinTarget::Announcements(Some(course("CS101")))))
            .await
            .unwrap();

        assert_eq!(result.changes.len(), 2);
        assert_eq!(result.participant_count(), None);
        assert_eq!(membership.member_count(&ChannelName::GlobalAnnouncements).await, 1);
    }

    #[tokio::test]
    async fn refused_join_touches_nothing() {
        let (handler, membership) = setup();

        let err = handler
            .handle(cmd("u", JoinTarget::Announcements(Some(course("MA200")))))
            .await
            .unwrap_err();

        assert!(matches!(err, RealtimeError::Forbidden(_)));
        // global was authorized but must not be joined either
        assert_eq!(membership.member_count(&ChannelName::GlobalAnnouncements).await, 0);
        assert_eq!(
            membership
                .member_count(&ChannelName::announcements(course("MA200")))
                .await,
            0
        );
    }

    #[tokio::test]
    async fn unknown_course_is_not_found() {
        let (handler, _) = setup();

        let err = handler
            .handle(cmd("u", JoinTarget::Class(course("XX1"))))
            .await
            .unwrap_err();

        assert_eq!(err.code().as_str(), "NOT_FOUND");
    }

    #[tokio::test]
    async fn closed_connection_is_reported() {
        let directory = InMemoryEnrollmentDirectory::new();
        let handler = JoinChannelHandler::new(
            ChannelAuthorizer::new(Arc::new(directory)),
            Arc::new(RecordingMembership {
                closed: true,
                ..Default::default()
            }),
        );

        let err = handler.handle(cmd("u", JoinTarget::Chat)).await.unwrap_err();

        assert!(matches!(err, RealtimeError::ConnectionClosed(_)));
    }
}
