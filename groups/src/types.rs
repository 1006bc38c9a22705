//! Voting group types.

use serde::{Deserialize, Serialize};
use zkvote_types::{AccountAddress, ObjectId};

/// Where the voting package and group live on the ledger.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct VotingConfig {
    #[serde(default = "default_package")]
    pub package: ObjectId,
    #[serde(default = "default_group")]
    pub group: ObjectId,
    /// Index of the group inside the groups table.
    #[serde(default)]
    pub group_index: u64,
}

fn default_package() -> ObjectId {
    ObjectId::new(hex_id(
        "715b8f1de858b9779f515cd166a438991627f3adbc229565bc57733995a900c8",
    ))
}

fn default_group() -> ObjectId {
    ObjectId::new(hex_id(
        "ecd7a8a4e42ee7f939d6067722e1f9a88c39ec12ce7796e4f7fe74685ee6d50d",
    ))
}

/// Decode a 64-char hex constant.
const fn hex_id(s: &str) -> [u8; 32] {
    const fn nibble(c: u8) -> u8 {
        match c {
            b'0'..=b'9' => c - b'0',
            b'a'..=b'f' => c - b'a' + 10,
            _ => panic!("invalid hex constant"),
        }
    }
    let bytes = s.as_bytes();
    let mut out = [0u8; 32];
    let mut i = 0;
    while i < 32 {
        out[i] = (nibble(bytes[2 * i]) << 4) | nibble(bytes[2 * i + 1]);
        i += 1;
    }
    out
}

impl Default for VotingConfig {
    fn default() -> Self {
        Self {
            package: default_package(),
            group: default_group(),
            group_index: 0,
        }
    }
}

impl VotingConfig {
    /// Move type of the voting pass object.
    pub fn voting_pass_type(&self) -> String {
        format!("{}::vote::VotingPass", self.package.to_hex())
    }
}

/// The user's standing in the voting group.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VotingContext {
    /// The user's voting pass, if they own one.
    pub voting_pass_id: Option<ObjectId>,
    /// Members the user can vote for, never including the user.
    pub eligible_member_addresses: Vec<AccountAddress>,
    /// Member voted for in this session.
    pub voted_address: Option<AccountAddress>,
}

impl VotingContext {
    pub fn can_vote(&self) -> bool {
        self.voting_pass_id.is_some()
    }

    /// Record a successful vote and drop the candidate from the list.
    pub fn record_vote(&mut self, candidate: AccountAddress) {
        self.voted_address = Some(candidate);
        self.eligible_member_addresses.retain(|a| *a != candidate);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_ids_decode() {
        let config = VotingConfig::default();
        assert_eq!(
            config.group.to_hex(),
            "0xecd7a8a4e42ee7f939d6067722e1f9a88c39ec12ce7796e4f7fe74685ee6d50d"
        );
        assert_eq!(
            config.voting_pass_type(),
            "0x715b8f1de858b9779f515cd166a438991627f3adbc229565bc57733995a900c8::vote::VotingPass"
        );
    }

    #[test]
    fn config_from_toml_overrides_group() {
        let config: VotingConfig = toml::from_str("group = \"0x5\"\ngroup_index = 2").unwrap();
        assert_eq!(config.group, "0x5".parse().unwrap());
        assert_eq!(config.group_index, 2);
        assert_eq!(config.package, VotingConfig::default().package);
    }

    #[test]
    fn record_vote_removes_candidate() {
        let a = AccountAddress::new([1u8; 32]);
        let b = AccountAddress::new([2u8; 32]);
        let mut ctx = VotingContext {
            voting_pass_id: Some(ObjectId::new([9u8; 32])),
            eligible_member_addresses: vec![a, b],
            voted_address: None,
        };
        ctx.record_vote(a);
        assert_eq!(ctx.voted_address, Some(a));
        assert_eq!(ctx.eligible_member_addresses, vec![b]);
    }
}
