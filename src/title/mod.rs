mod registry;

pub use registry::{TitleEntry, TitleRegistry};

use crate::shared::names::leading_symbol;
use crate::types::{ChannelId, MemberId, RoomId};
use serde::Serialize;
use std::collections::BTreeSet;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Title {
    #[serde(rename = "roomId")]
    room_id: RoomId,
    #[serde(rename = "defaultSymbol")]
    default_symbol: String,
    #[serde(rename = "defaultName")]
    default_name: String,
    #[serde(rename = "requestChannel")]
    request_channel: ChannelId,
    label: String,
    owners: BTreeSet<MemberId>,
    #[serde(rename = "reclaimFailed")]
    reclaim_failed: bool,
}

impl Title {
    pub fn new(
        room_id: RoomId,
        default_name: &str,
        request_channel: ChannelId,
        label: String,
        owner: MemberId,
    ) -> Self {
        Self {
            room_id,
            default_symbol: leading_symbol(default_name),
            default_name: default_name.to_string(),
            request_channel,
            label,
            owners: BTreeSet::from([owner]),
            reclaim_failed: false,
        }
    }

    pub fn room_id(&self) -> RoomId {
        self.room_id
    }

    pub fn default_name(&self) -> &str {
        &self.default_name
    }

    pub fn request_channel(&self) -> ChannelId {
        self.request_channel
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn owners(&self) -> &BTreeSet<MemberId> {
        &self.owners
    }

    pub fn is_owner(&self, member: MemberId) -> bool {
        self.owners.contains(&member)
    }

    pub fn is_stuck(&self) -> bool {
        self.reclaim_failed
    }

    pub fn titled_name(&self) -> String {
        Self::titled_name_for(&self.default_symbol, &self.label)
    }

    pub fn titled_name_with(&self, label: &str) -> String {
        Self::titled_name_for(&self.default_symbol, label)
    }

    fn titled_name_for(symbol: &str, label: &str) -> String {
        format!("{symbol}{label}")
    }

    // Returns false when the member already owned the label. Adding an owner to a stuck
    // title clears the stuck flag: the room still carries the titled name.
    pub fn add_owner(&mut self, member: MemberId) -> bool {
        let added = self.owners.insert(member);
        if added {
            self.reclaim_failed = false;
        }
        added
    }

    pub fn remove_owner(&mut self, member: MemberId) -> bool {
        self.owners.remove(&member)
    }

    pub fn set_label(&mut self, label: String) {
        self.label = label;
    }

    pub fn reset_owners(&mut self, owner: MemberId) {
        self.owners = BTreeSet::from([owner]);
        self.reclaim_failed = false;
    }

    pub fn mark_stuck(&mut self) {
        self.reclaim_failed = true;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn title() -> Title {
        Title::new(RoomId(1), "General", ChannelId(10), "foo".to_string(), MemberId(7))
    }

    #[test]
    fn titled_name_prefixes_label_with_default_symbol() {
        let title = title();
        assert_eq!(title.titled_name(), "Gfoo");
        assert_eq!(title.titled_name_with("bar"), "Gbar");
    }

    #[test]
    fn add_owner_reports_existing_membership() {
        let mut title = title();
        assert!(!title.add_owner(MemberId(7)));
        assert!(title.add_owner(MemberId(8)));
        assert_eq!(title.owners().len(), 2);
    }

    #[test]
    fn adding_an_owner_clears_stuck_state() {
        let mut title = title();
        assert!(title.remove_owner(MemberId(7)));
        title.mark_stuck();
        assert!(title.is_stuck());
        assert!(title.add_owner(MemberId(9)));
        assert!(!title.is_stuck());
    }
}
