//! Duplicate vote under retransmission: a
//! retransmitted `TpcVoteY` from the same sender must not be recounted
//! towards the commit decision.

use crate::prelude::*;
use dao_core::operation_type::OperationType;
use dao_core::subtree::{PeerAddr, Subtree, SubtreeEntry};
use dao_wire::Event;
use std::time::Duration;

#[tokio::test]
async fn retransmitted_vote_from_same_sender_does_not_double_count() {
    let network = InMemoryNetwork::new();
    let mut coord = live_node(&network, "coord", fast_config()).await;

    // p1 and p2 are bare peers on the network, not full `Dao` instances:
    // this test drives their votes by hand to control exactly how many
    // times each one is "received" by the coordinator.
    let p1 = PeerAddr::new("p1");
    let p2 = PeerAddr::new("p2");
    let (_p1_inbox, p1_transport) = network.join(p1.clone()).await;
    let (_p2_inbox, p2_transport) = network.join(p2.clone()).await;

    let participants = vec![Subtree::new(p1.clone(), SubtreeEntry(1)), Subtree::new(p2.clone(), SubtreeEntry(2))];
    let op_id = coord.dao.start_coordinator(OperationType::CreateINode, vec![b'x'], participants, SubtreeEntry(10)).await.unwrap();

    // p1 votes yes twice in a row (retransmission).
    p1_transport.send(&coord.addr, Event::TpcVoteYes { op_id }).await.ok();
    p1_transport.send(&coord.addr, Event::TpcVoteYes { op_id }).await.ok();

    // A correct dedup set must still be waiting on p2 alone: no client
    // result has been emitted yet.
    assert!(
        tokio::time::timeout(Duration::from_millis(15), coord.client_results.recv()).await.is_err(),
        "commit decided after only one distinct vote was ever counted"
    );

    // p2's vote arrives: now both distinct senders are in and the
    // coordinator commits.
    p2_transport.send(&coord.addr, Event::TpcVoteYes { op_id }).await.ok();
    let result = wait_for_client_result(&mut coord.client_results).await;
    assert!(result.success);
}
