use blackjack_sim::{
    BasicStrategy, BetSizing, Casino, CompositionKeying, HiLoAgent, MdpAgent, MdpConfig,
    PayoutRatio, RandomAgent, RefreshPolicy, Seat, Strategy, TableRules,
};
use clap::Parser;

#[derive(Parser)]
#[command(
    name = "session",
    about = "Play a blackjack session with a lineup of agents"
)]
struct Args {
    /// Use a preset: default, single_deck, six_deck_h17
    #[arg(long)]
    preset: Option<String>,

    /// Rounds to play
    #[arg(long, default_value = "1000")]
    rounds: u64,

    /// Number of decks in the shoe
    #[arg(long, default_value = "4")]
    num_decks: u8,

    /// Fraction of the shoe dealt before reshuffling
    #[arg(long, default_value = "0.75")]
    penetration: f64,

    /// Dealer hits soft 17
    #[arg(long, default_value_t = false, action = clap::ArgAction::Set)]
    dealer_hits_soft_17: bool,

    /// Blackjack payout ratio (e.g. "3:2", "6:5", "1:1")
    #[arg(long, default_value = "3:2")]
    blackjack_payout: String,

    /// Seed for a reproducible session
    #[arg(long)]
    seed: Option<u64>,

    /// Starting capital of every seat
    #[arg(long, default_value = "1000")]
    capital: u64,

    /// Comma-separated lineup: basic, hilo, random, mdp, mdp-exact
    #[arg(long, value_delimiter = ',', default_value = "basic,hilo,mdp")]
    agents: Vec<String>,

    /// Composition bucket precision for `mdp` seats
    #[arg(long, default_value = "20")]
    precision: u32,

    /// Hi-Lo blend weight for `mdp` seats
    #[arg(long, default_value = "0.0")]
    risk_scale: f64,

    /// Refresh the MDP deck model only at half-count thresholds
    #[arg(long, default_value_t = false)]
    thresholds: bool,

    /// Print every round report as a JSON line
    #[arg(long, default_value_t = false)]
    report: bool,
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();
    let args = Args::parse();

    let rules = if let Some(preset) = &args.preset {
        match preset.as_str() {
            "default" => TableRules::default(),
            "single_deck" => TableRules::single_deck(),
            "six_deck_h17" => TableRules::six_deck_h17(),
            _ => {
                eprintln!("Unknown preset '{preset}'. Available: default, single_deck, six_deck_h17");
                std::process::exit(1);
            }
        }
    } else {
        TableRules {
            num_decks: args.num_decks,
            penetration: args.penetration,
            dealer_hits_soft_17: args.dealer_hits_soft_17,
            blackjack_payout: parse_payout(&args.blackjack_payout),
            ..TableRules::default()
        }
    };

    eprintln!("Configuration:");
    eprintln!("  Decks:          {}", rules.num_decks);
    eprintln!("  Penetration:    {}", rules.penetration);
    eprintln!(
        "  Dealer soft 17: {}",
        if rules.dealer_hits_soft_17 {
            "hits"
        } else {
            "stands"
        }
    );
    eprintln!(
        "  BJ payout:      {}:{}",
        rules.blackjack_payout.numerator, rules.blackjack_payout.denominator
    );
    eprintln!("  Rounds:         {}", args.rounds);
    eprintln!("  Lineup:         {}", args.agents.join(", "));

    let seats = args
        .agents
        .iter()
        .enumerate()
        .map(|(index, kind)| {
            let name = format!("{kind}-{index}");
            let agent = build_agent(kind, index, &name, &args, &rules);
            Seat::new(name, args.capital, agent)
        })
        .collect();

    let mut casino = Casino::new(rules, seats, args.seed).unwrap_or_else(|e| {
        eprintln!("Invalid table: {e}");
        std::process::exit(1);
    });

    let result = casino.play_session_with(args.rounds, |report| {
        if args.report {
            match serde_json::to_string(report) {
                Ok(line) => println!("{line}"),
                Err(e) => eprintln!("Could not encode round {}: {e}", report.round),
            }
        }
    });
    let summary = match result {
        Ok(summary) => summary,
        Err(e) => {
            eprintln!("Session aborted: {e}");
            std::process::exit(1);
        }
    };

    println!("Rounds played: {}", summary.rounds_played);
    for seat in &summary.seats {
        println!(
            "{:<14} capital {:>8} net {:>+8}  W {:>5} L {:>5} P {:>5} BJ {:>4} SUR {:>4}",
            seat.name,
            seat.final_capital,
            seat.net(),
            seat.wins,
            seat.losses,
            seat.pushes,
            seat.blackjacks,
            seat.surrenders
        );
    }
}

fn build_agent(
    kind: &str,
    index: usize,
    name: &str,
    args: &Args,
    rules: &TableRules,
) -> Box<dyn Strategy> {
    let sizing = BetSizing::default();
    match kind {
        "basic" => Box::new(BasicStrategy::new(name, sizing)),
        "hilo" => Box::new(HiLoAgent::new(name, sizing)),
        "random" => {
            // each seat gets its own stream
            let seed = args.seed.map(|s| s.wrapping_add(index as u64 + 1));
            Box::new(RandomAgent::new(name, sizing.min, seed))
        }
        "mdp" | "mdp-exact" => {
            let keying = if kind == "mdp" {
                CompositionKeying::Bucketed {
                    precision: args.precision,
                }
            } else {
                CompositionKeying::Exact
            };
            let config = MdpConfig {
                num_decks: rules.num_decks,
                keying,
                refresh: if args.thresholds {
                    RefreshPolicy::Thresholds
                } else {
                    RefreshPolicy::EveryCard
                },
                risk_scale: args.risk_scale,
                dealer_hits_soft_17: rules.dealer_hits_soft_17,
                ..MdpConfig::default()
            };
            match MdpAgent::new(name, config) {
                Ok(agent) => Box::new(agent),
                Err(e) => {
                    eprintln!("Invalid MDP configuration: {e}");
                    std::process::exit(1);
                }
            }
        }
        _ => {
            eprintln!("Unknown agent '{kind}'. Available: basic, hilo, random, mdp, mdp-exact");
            std::process::exit(1);
        }
    }
}

fn parse_payout(s: &str) -> PayoutRatio {
    let Some((num, den)) = s.split_once(':') else {
        eprintln!("Invalid payout ratio '{s}', expected N:D (e.g. 3:2)");
        std::process::exit(1);
    };
    let num: u16 = num.parse().unwrap_or_else(|_| {
        eprintln!("Invalid numerator in payout ratio '{s}'");
        std::process::exit(1);
    });
    let den: u16 = den.parse().unwrap_or_else(|_| {
        eprintln!("Invalid denominator in payout ratio '{s}'");
        std::process::exit(1);
    });
    PayoutRatio::new(num, den).unwrap_or_else(|e| {
        eprintln!("Invalid payout ratio: {e}");
        std::process::exit(1);
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_random_seats_draw_independently() {
        let args = Args::parse_from(["session", "--seed", "7", "--agents", "random,random"]);
        let rules = TableRules::default();
        let mut first = build_agent("random", 0, "random-0", &args, &rules);
        let mut second = build_agent("random", 1, "random-1", &args, &rules);

        let bets = |agent: &mut Box<dyn Strategy>| -> Vec<u64> {
            (0..10).map(|_| agent.decide_bet(100_000)).collect()
        };
        assert_ne!(bets(&mut first), bets(&mut second));

        // same seat, same seed, same stream
        let mut again = build_agent("random", 0, "random-0", &args, &rules);
        let mut first = build_agent("random", 0, "random-0", &args, &rules);
        assert_eq!(bets(&mut first), bets(&mut again));
    }
}
