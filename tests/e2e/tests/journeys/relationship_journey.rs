//! Relationship journey
//!
//! Feed stored experiences through the relationship network and verify
//! the graph: entity extraction, strength evolution across repeated
//! mentions, aggregation, and insight rendering.

use reverie_core::relationships::{EntityType, NetworkHealth, RelationshipNetwork};
use reverie_e2e_tests::harness::TestStoreManager;
use reverie_e2e_tests::mocks::ExperienceFactory;

/// Replay a user's stored messages into the network, oldest first
fn replay(manager: &TestStoreManager, network: &RelationshipNetwork, user_id: &str) {
    let mut records = manager.store().retrieve(user_id, 100).unwrap();
    records.reverse();
    for record in records {
        if let Some(message) = record.message() {
            network
                .update_from_interaction(user_id, message, &record.emotional_context)
                .unwrap();
        }
    }
}

#[test]
fn stored_messages_build_the_graph() {
    let manager = TestStoreManager::new_temp();
    ExperienceFactory::seed(
        manager.store().as_ref(),
        ExperienceFactory::relationship_mentions("alex"),
    );

    let network = RelationshipNetwork::new();
    replay(&manager, &network, "alex");

    let boss = network.get("alex", "boss").unwrap().expect("boss tracked");
    assert_eq!(boss.entity_type, EntityType::Person);
    assert_eq!(boss.total_interactions, 3);
    // Two positive mentions after a stressful first one
    assert_eq!(boss.positive_interactions, 2);
    assert_eq!(boss.negative_interactions, 1);

    assert!(network.get("alex", "office").unwrap().is_some());
    assert!(network.get("alex", "gym").unwrap().is_some());
    assert!(network.get("alex", "friend").unwrap().is_some());
}

#[test]
fn repeated_mentions_grow_familiarity_and_strength() {
    let manager = TestStoreManager::new_temp();
    ExperienceFactory::seed(
        manager.store().as_ref(),
        ExperienceFactory::relationship_mentions("alex"),
    );

    let network = RelationshipNetwork::new();
    replay(&manager, &network, "alex");

    let boss = network.get("alex", "boss").unwrap().unwrap();
    let friend = network.get("alex", "friend").unwrap().unwrap();

    // Three mentions beat one
    assert!(boss.familiarity > friend.familiarity);
    assert!(boss.relationship_strength > friend.relationship_strength);
    assert!(boss.familiarity <= 1.0);
}

#[test]
fn network_summary_aggregates_the_graph() {
    let manager = TestStoreManager::new_temp();
    ExperienceFactory::seed(
        manager.store().as_ref(),
        ExperienceFactory::relationship_mentions("alex"),
    );

    let network = RelationshipNetwork::new();
    replay(&manager, &network, "alex");

    let summary = network.network("alex").unwrap();
    assert!(summary.total_relationships >= 5);
    assert!(summary.by_type.get("person").copied().unwrap_or(0) >= 2);
    assert!(summary.by_type.get("place").copied().unwrap_or(0) >= 2);
    assert_ne!(summary.network_health, NetworkHealth::NoData);

    // Boss leads the interaction ranking
    assert_eq!(summary.most_interacted[0].name, "boss");

    // Emotional profile is a normalized distribution
    let total: f64 = summary.emotional_profile.values().sum();
    assert!((total - 1.0).abs() < 1e-9);
}

#[test]
fn insights_render_from_the_aggregate() {
    let manager = TestStoreManager::new_temp();
    ExperienceFactory::seed(
        manager.store().as_ref(),
        ExperienceFactory::relationship_mentions("alex"),
    );

    let network = RelationshipNetwork::new();
    replay(&manager, &network, "alex");

    let insights = network.insights("alex").unwrap();
    assert!(!insights.is_empty());
    assert!(insights.len() <= 4);

    // Nothing tracked for an unseen user
    assert_eq!(
        network.insights("sam").unwrap(),
        vec!["Continue interacting to build relationship intelligence"]
    );
}
