//! Session engine integration tests
//!
//! Drives the executor, ledger, parser and merchant protocol together
//! through the public API with scripted collaborators.

use std::io::Write;
use std::sync::Arc;

use loathing::coinmaster::{Affordability, CoinmasterProtocol, CoinmasterRegistry};
use loathing::domain::{AdventureResult, Character, ResultKind, RunOutcome};
use loathing::error::{Result, SessionError};
use loathing::executor::mock::{CountingRefresher, RecordingNotifier, ScriptedTransport};
use loathing::executor::{Adventure, RequestExecutor, Severity, SkillCast};
use loathing::parser::{parse_block, parse_line};
use loathing::recovery::{RecoveryPolicy, RestoreSource};
use loathing::session::Session;
use tempfile::NamedTempFile;

fn executor_with(transport: Arc<ScriptedTransport>, notifier: Arc<RecordingNotifier>) -> RequestExecutor {
    RequestExecutor::new(transport, Arc::new(CountingRefresher::new()), notifier)
}

fn explorer() -> Session {
    Session::login(
        "1234",
        Character {
            name: "Tester".to_string(),
            class: "Pastamancer".to_string(),
            level: 8,
            path: Some("Kingdom of Exploathing".to_string()),
            current_hp: 60,
            maximum_hp: 60,
            current_mp: 30,
            maximum_mp: 30,
            adventures_left: 20,
            meat: 2500,
            substats: [100, 100, 100],
            inventory: vec![AdventureResult::item("white pixel", 65)],
            ..Default::default()
        },
    )
}

/// Five requested iterations stop after the third satisfies the goal
#[tokio::test]
async fn test_early_stop_after_goal_met() -> Result<()> {
    let transport = Arc::new(ScriptedTransport::new(
        "<table><tr><td>You acquire an item: <b>bat wing</b></td></tr></table>",
    ));
    let notifier = Arc::new(RecordingNotifier::new());
    let executor = executor_with(transport.clone(), notifier.clone());

    let mut session = explorer();
    session.ledger.add_condition(&AdventureResult::item("bat wing", 3));

    let report = executor
        .run(&mut session, &Adventure::new("The Bat Hole Entrance", 30), 5)
        .await?;

    assert_eq!(report.outcome, RunOutcome::EarlyStop);
    assert_eq!(report.completed, 3);
    assert_eq!(transport.calls(), 3);
    assert_eq!(session.character.item_count("bat wing"), 3);
    assert_eq!(session.character.adventures_left, 17);
    assert_eq!(session.ledger.tally().count_of("bat wing", ResultKind::Item), 3);
    assert!(notifier.saw(Severity::Normal, "Conditions satisfied."));
    Ok(())
}

/// Substat goals decrement per component and finish at zero
#[tokio::test]
async fn test_substat_goal_tracks_vector() -> Result<()> {
    let transport = Arc::new(ScriptedTransport::new("<p>You gain 2 Beefiness.</p>"));
    let notifier = Arc::new(RecordingNotifier::new());
    let executor = executor_with(transport.clone(), notifier);

    let mut session = explorer();
    session.ledger.add_condition(&AdventureResult::substats([5, 0, 0]));

    let report = executor
        .run(&mut session, &Adventure::new("The Haunted Gallery", 106), 10)
        .await?;

    assert_eq!(report.outcome, RunOutcome::EarlyStop);
    assert_eq!(report.completed, 3);
    assert_eq!(session.character.substats, [106, 100, 100]);
    Ok(())
}

/// A restore source that never changes MP stalls instead of looping
#[tokio::test]
async fn test_mana_stall_ends_run() -> Result<()> {
    let transport = Arc::new(ScriptedTransport::new("Nothing happens."));
    let notifier = Arc::new(RecordingNotifier::new());

    let source = RestoreSource {
        name: "broken soda machine".to_string(),
        path: "inv_use.php".to_string(),
        fields: Default::default(),
        item: None,
        daily_limit: None,
        adventures_used: 0,
    };
    let recovery = RecoveryPolicy {
        mp_sources: vec![source],
        ..Default::default()
    };
    let executor = executor_with(transport.clone(), notifier.clone()).with_recovery(recovery);

    let mut session = explorer();
    session.character.current_mp = 2;

    let report = executor
        .run(&mut session, &SkillCast::new("Cannelloni Cannon", 3004, 8), 1)
        .await?;

    assert!(matches!(report.outcome, RunOutcome::Errored(_)));
    assert_eq!(report.completed, 0);
    assert_eq!(transport.calls(), 2);
    assert!(notifier.saw(
        Severity::Error,
        "Detected no MP change.  Refreshing status to verify..."
    ));
    Ok(())
}

/// Buying through the executor debits the override currency, not the token
#[tokio::test]
async fn test_purchase_run_uses_override_currency() -> Result<()> {
    let registry = CoinmasterRegistry::bundled()?;
    let protocol = CoinmasterProtocol::new(registry.get("Cosmic Ray's Bazaar").expect("bundled merchant"));
    let purchase = protocol.build_purchase(2, 1)?;

    let transport = Arc::new(ScriptedTransport::new(
        "<td>You acquire an item: <b>digital key</b></td><p>You have 14 rare Meat isotopes.</p>",
    ));
    let notifier = Arc::new(RecordingNotifier::new());
    let executor = executor_with(transport.clone(), notifier);

    let mut session = explorer();
    let report = executor.run(&mut session, &purchase, 2).await?;

    assert_eq!(report.outcome, RunOutcome::Complete);
    assert_eq!(session.character.item_count("white pixel"), 5);
    assert_eq!(session.character.item_count("digital key"), 2);
    assert_eq!(session.balance("Cosmic Ray's Bazaar"), Some(14));

    let sent = transport.requests();
    assert_eq!(
        sent[0].to_url(),
        "shop.php?whichshop=exploathing&action=buyitem&whichrow=2&quantity=1"
    );
    Ok(())
}

/// A merchant page without the success marker or a balance is fatal
#[tokio::test]
async fn test_purchase_without_balance_errors() -> Result<()> {
    let registry = CoinmasterRegistry::bundled()?;
    let protocol = CoinmasterProtocol::new(registry.get("Isotope Smithery").expect("bundled merchant"));
    let purchase = protocol.build_purchase(4173, 1)?;

    let transport = Arc::new(ScriptedTransport::new("You are not allowed in here."));
    let notifier = Arc::new(RecordingNotifier::new());
    let executor = executor_with(transport, notifier);

    let mut session = explorer();
    let report = executor.run(&mut session, &purchase, 3).await?;

    match report.outcome {
        RunOutcome::Errored(message) => assert!(message.contains("lunar isotope")),
        other => panic!("expected errored run, got {:?}", other),
    }
    assert_eq!(report.completed, 0);
    Ok(())
}

#[test]
fn test_purchase_validation_before_any_request() -> Result<()> {
    let registry = CoinmasterRegistry::bundled()?;
    let protocol = CoinmasterProtocol::new(registry.get("hermit").expect("case-insensitive lookup"));

    match protocol.build_purchase(24, 0) {
        Err(SessionError::Validation(message)) => assert_eq!(message, "Zero is not a valid quantity."),
        other => panic!("expected validation error, got {:?}", other.map(|p| p.item().clone())),
    }
    Ok(())
}

#[test]
fn test_balance_and_affordability() -> Result<()> {
    let registry = CoinmasterRegistry::bundled()?;
    let protocol = CoinmasterProtocol::new(registry.get("Isotope Smithery").expect("bundled merchant"));
    let session = explorer();

    assert_eq!(protocol.parse_balance("Welcome, spaceman."), None);
    let balance = protocol.parse_balance("You have 70 lunar isotopes.");
    assert_eq!(balance, Some(70));

    let sunglasses = protocol.item_costs(4170).expect("listed item");
    let kutte = protocol.item_costs(4172).expect("listed item");
    assert_eq!(
        protocol.affordability(&session.character, balance, &sunglasses),
        Affordability::Affordable
    );
    assert_eq!(
        protocol.affordability(&session.character, balance, &kutte),
        Affordability::Unaffordable
    );
    assert_eq!(
        protocol.affordability(&session.character, None, &kutte),
        Affordability::Unknown
    );
    Ok(())
}

#[test]
fn test_gates_block_purchase() -> Result<()> {
    let registry = CoinmasterRegistry::bundled()?;
    let grocery = CoinmasterProtocol::new(registry.get("Gouda's Grimoire and Grocery").expect("bundled merchant"));

    let mut session = explorer();
    assert!(grocery.is_purchasable(315, &session.character));

    session.character.class = "Accordion Thief".to_string();
    assert!(!grocery.is_purchasable(315, &session.character));
    session.character.level = 9;
    assert!(grocery.is_purchasable(315, &session.character));
    Ok(())
}

#[test]
fn test_user_table_overrides_bundled_merchant() -> Result<()> {
    let mut file = NamedTempFile::new()?;
    write!(
        file,
        r#"
merchants:
  - name: Hermit
    path: hermit.php
    buy_action: trade
    token: Hermit Permit
    balance_pattern: "You have ([\\d,]+) Hermit Permits?"
    currency: Hermit Permit
    items:
      - id: 42
        name: worthless trinket
        price: 2
"#
    )?;

    let registry = CoinmasterRegistry::load(Some(file.path()))?;
    let hermit = CoinmasterProtocol::new(registry.get("Hermit").expect("merged merchant"));
    assert_eq!(
        hermit.item_costs(42),
        Some(vec![AdventureResult::item("Hermit Permit", 2)])
    );
    assert_eq!(hermit.item_costs(24), None);
    assert!(registry.get("Dimemaster").is_some());
    Ok(())
}

#[test]
fn test_vague_quantities_are_dropped() {
    assert_eq!(parse_line("You gain a clue"), None);
    assert_eq!(parse_line("You gain some luck"), None);
    assert_eq!(parse_line("You lose 15 hit points"), Some(AdventureResult::health(-15)));
}

#[test]
fn test_block_parse_serializes() -> Result<()> {
    let parse = parse_block("<b>You acquire an item: <b>ketchup (2)</b></b><p>You gain 1,024 Meat.</p>");
    assert_eq!(
        parse.results,
        vec![AdventureResult::item("ketchup", 2), AdventureResult::meat(1024)]
    );
    let json = serde_json::to_value(&parse).expect("serializable parse");
    assert_eq!(json["had_results"], serde_json::json!(true));
    Ok(())
}

#[test]
fn test_login_logout_lifecycle() {
    let mut session = explorer();
    session.process_result(&AdventureResult::meat(100));
    session.log.register_encounter("Ghuol Whelp");
    session.set_balance("Hermit", Some(3));

    assert_eq!(session.players.player_id("Tester"), "1234");
    assert_eq!(session.ledger.tally().count_of("Meat", ResultKind::Currency), 100);

    session.logout();
    assert!(!session.permits_continue());
    assert!(session.log.encounters().is_empty());
    assert_eq!(session.balance("Hermit"), None);
    assert_eq!(session.players.player_id("Some Player"), "Some_Player");
}
