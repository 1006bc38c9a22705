//! Reads the user's voting pass and the group's members from the ledger.

use serde_json::Value;
use std::sync::Arc;
use zkvote_ledger::{DynamicFieldName, LedgerClient, ObjectData};
use zkvote_types::{AccountAddress, ObjectId};

use crate::{GroupError, VotingConfig, VotingContext};

pub struct VotingGroupReader {
    ledger: Arc<dyn LedgerClient>,
    config: VotingConfig,
}

impl VotingGroupReader {
    pub fn new(ledger: Arc<dyn LedgerClient>, config: VotingConfig) -> Self {
        Self { ledger, config }
    }

    pub fn config(&self) -> &VotingConfig {
        &self.config
    }

    /// The voting pass owned by `owner`, if any.
    pub async fn voting_pass(&self, owner: &AccountAddress) -> Result<Option<ObjectId>, GroupError> {
        let pass_type = self.config.voting_pass_type();
        let owned = self
            .ledger
            .get_owned_objects(owner, Some(&pass_type))
            .await?;
        // The filter is applied by the node; double-check the type anyway.
        Ok(owned
            .into_iter()
            .find(|o| o.type_.as_deref().map_or(true, |t| t == pass_type))
            .map(|o| o.object_id))
    }

    /// Addresses of all members of the configured group.
    pub async fn members(&self) -> Result<Vec<AccountAddress>, GroupError> {
        let group = self.ledger.get_object(&self.config.group).await?;
        let groups_table = id_at(&group, "/groups/fields/id/id")?;

        let entry = self
            .ledger
            .get_dynamic_field_object(&groups_table, &DynamicFieldName::u64(self.config.group_index))
            .await?;
        let members_table = id_at(&entry, "/value/fields/members/fields/id/id")?;

        let fields = self.ledger.get_dynamic_fields(&members_table).await?;
        let mut members = Vec::with_capacity(fields.len());
        for field in &fields {
            match field.name_as_address() {
                Some(address) => members.push(address),
                None => tracing::warn!(name = %field.name.value, "skipping non-address member key"),
            }
        }
        Ok(members)
    }

    /// Build the voting context for `self_address`. Members are only looked
    /// up when the user holds a voting pass.
    pub async fn voting_context(
        &self,
        self_address: &AccountAddress,
    ) -> Result<VotingContext, GroupError> {
        let Some(pass) = self.voting_pass(self_address).await? else {
            tracing::info!(address = %self_address, "no voting pass");
            return Ok(VotingContext::default());
        };

        let eligible = self
            .members()
            .await?
            .into_iter()
            .filter(|m| m != self_address)
            .collect::<Vec<_>>();
        tracing::info!(address = %self_address, candidates = eligible.len(), "voting pass found");

        Ok(VotingContext {
            voting_pass_id: Some(pass),
            eligible_member_addresses: eligible,
            voted_address: None,
        })
    }
}

/// Object id stored at a JSON pointer below `content.fields`.
fn id_at(object: &ObjectData, pointer: &str) -> Result<ObjectId, GroupError> {
    object
        .fields()
        .and_then(|f| f.pointer(pointer))
        .and_then(Value::as_str)
        .and_then(|s| s.parse().ok())
        .ok_or_else(|| {
            GroupError::InvalidGroup(format!("object {} has no id at {pointer}", object.object_id))
        })
}
