//! Voting context population against the nullable ledger.

use std::sync::Arc;
use zkvote_groups::{GroupError, VotingConfig, VotingContext, VotingGroupReader};
use zkvote_nullables::NullLedger;
use zkvote_types::{AccountAddress, ObjectId};

fn addr(n: u8) -> AccountAddress {
    AccountAddress::new([n; 32])
}

fn setup(members: &[AccountAddress]) -> (Arc<NullLedger>, VotingConfig) {
    let ledger = Arc::new(NullLedger::new());
    let group = ledger.add_voting_group(0, members);
    let config = VotingConfig {
        group,
        ..VotingConfig::default()
    };
    (ledger, config)
}

#[tokio::test]
async fn member_with_pass_sees_other_members() {
    let me = addr(1);
    let (ledger, config) = setup(&[addr(2), me, addr(3)]);
    let pass = ledger.give_object(&me, &config.voting_pass_type());

    let reader = VotingGroupReader::new(ledger.clone(), config);
    let ctx = reader.voting_context(&me).await.unwrap();

    assert_eq!(ctx.voting_pass_id, Some(pass));
    assert_eq!(ctx.eligible_member_addresses, vec![addr(2), addr(3)]);
    assert!(ctx.voted_address.is_none());
    assert!(ctx.can_vote());
}

#[tokio::test]
async fn no_pass_means_empty_context_and_no_member_lookup() {
    let me = addr(1);
    let (ledger, config) = setup(&[addr(2)]);
    // An unrelated object does not count as a pass.
    ledger.give_object(&me, "0x2::coin::Coin<0x2::sui::SUI>");

    let reader = VotingGroupReader::new(ledger.clone(), config);
    let ctx = reader.voting_context(&me).await.unwrap();

    assert_eq!(ctx, VotingContext::default());
    assert_eq!(ledger.call_count("get_dynamic_fields"), 0);
}

#[tokio::test]
async fn missing_group_object_is_a_ledger_error() {
    let me = addr(1);
    let ledger = Arc::new(NullLedger::new());
    let config = VotingConfig {
        group: ObjectId::new([0xEE; 32]),
        ..VotingConfig::default()
    };
    ledger.give_object(&me, &config.voting_pass_type());

    let reader = VotingGroupReader::new(ledger, config);
    assert!(matches!(
        reader.voting_context(&me).await,
        Err(GroupError::Ledger(_))
    ));
}

#[tokio::test]
async fn group_without_table_layout_is_invalid() {
    let me = addr(1);
    let ledger = Arc::new(NullLedger::new());
    // A plain owned object stands in for a malformed group.
    let bogus = ledger.give_object(&addr(9), "0x1::other::Thing");
    let config = VotingConfig {
        group: bogus,
        ..VotingConfig::default()
    };
    ledger.give_object(&me, &config.voting_pass_type());

    let reader = VotingGroupReader::new(ledger, config);
    assert!(matches!(
        reader.voting_context(&me).await,
        Err(GroupError::InvalidGroup(_))
    ));
}
