use blackjack_sim::{
    Action, BasicStrategy, BetSizing, Casino, HiLoAgent, MdpAgent, MdpConfig, RandomAgent, Seat,
    Strategy, TableRules,
};

fn lineup() -> Vec<Seat> {
    let agents: Vec<(&str, Box<dyn Strategy>)> = vec![
        (
            "mdp",
            Box::new(MdpAgent::new("mdp", MdpConfig::bucketed(4, 20)).unwrap()),
        ),
        (
            "basic",
            Box::new(BasicStrategy::new("basic", BetSizing::default())),
        ),
        ("hilo", Box::new(HiLoAgent::new("hilo", BetSizing::default()))),
        ("random", Box::new(RandomAgent::new("random", 1, Some(5)))),
    ];
    agents
        .into_iter()
        .map(|(name, agent)| Seat::new(name, 1000, agent))
        .collect()
}

#[test]
fn test_mixed_table_session() {
    let mut casino = Casino::new(TableRules::default(), lineup(), Some(2024)).unwrap();
    let mut reports = Vec::new();
    let summary = casino
        .play_session_with(40, |report| reports.push(report.clone()))
        .unwrap();

    assert_eq!(summary.rounds_played, reports.len() as u64);
    for (summary_seat, seat) in summary.seats.iter().zip(casino.seats()) {
        assert_eq!(summary_seat.final_capital, seat.player.capital);
    }

    for report in &reports {
        for seat in &report.seats {
            assert_eq!(
                seat.net,
                seat.capital_after as i64 - seat.capital_before as i64
            );
        }
        for decision in report.decisions.iter().filter(|d| d.seat == 0) {
            assert!(decision.legal, "mdp chose an illegal {}", decision.action);
            if decision.total == 21 {
                assert_eq!(decision.action, Action::Stand);
            }
        }
    }
}

#[test]
fn test_round_reports_serialize() {
    let mut casino = Casino::new(TableRules::six_deck_h17(), lineup(), Some(9)).unwrap();
    let report = casino.play_round().unwrap();
    let line = serde_json::to_string(&report).unwrap();
    assert!(line.contains("\"dealer_cards\""));
    assert!(line.contains("\"decisions\""));

    let value: serde_json::Value = serde_json::from_str(&line).unwrap();
    assert_eq!(value["round"], 1);
    assert_eq!(value["seats"].as_array().map(Vec::len), Some(report.seats.len()));
}
