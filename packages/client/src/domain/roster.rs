//! Presence policy: roster ordering.

use super::entity::User;

/// Sort the roster for display: online users first, offline users after.
///
/// Within each partition the server-provided order is preserved (stable sort,
/// no secondary key). The acting user's own entry participates like any other;
/// labeling it "You" is a rendering concern.
pub fn sorted_by_presence(roster: &[User]) -> Vec<User> {
    let mut sorted = roster.to_vec();
    sorted.sort_by_key(|user| !user.online);
    sorted
}
