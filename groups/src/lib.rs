//! Voting groups.
//!
//! A voting group is an on-chain object of the voting package. Its groups
//! live in a table keyed by `u64` index; each group holds a members table
//! keyed by member address. A member may vote once they own a `VotingPass`.
//!
//! Layout walked by the reader:
//! - `group.content.fields.groups.fields.id.id` → groups table id
//! - table[`u64` index] `.content.fields.value.fields.members.fields.id.id` → members table id
//! - dynamic fields of the members table → member addresses

pub mod error;
pub mod reader;
pub mod types;

pub use error::GroupError;
pub use reader::VotingGroupReader;
pub use types::{VotingConfig, VotingContext};
