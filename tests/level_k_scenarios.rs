//! End-to-end solver scenarios on the built-in stimuli

use levelk::{
    Battery, Error, Game, GameConfig, InequalityAversion, LevelKSolver, PerPlayer, Player,
    Reciprocity, Selfish, StateId,
    analysis::{PowerMetrics, outcome_distribution},
    sharing_game,
};

fn pivotal(solver: &mut LevelKSolver<'_>, game: &Game, level: usize) -> (f64, f64) {
    let p_in = solver
        .solve(Player::One, level)
        .probability_of(game, StateId::new(1), "In")
        .expect("player 1 decides at state 1");
    let p_right = solver
        .solve(Player::Two, level)
        .probability_of(game, StateId::new(3), "Right")
        .expect("player 2 decides at state 3");
    (p_in, p_right)
}

#[test]
fn test_common_interest_level_two_goes_in() {
    let battery = Battery::builtin("exp1").expect("exp1 is built in");
    let game = battery
        .get("common_interest")
        .expect("common_interest is in exp1")
        .build()
        .expect("valid game");
    let mut solver =
        LevelKSolver::new(&game, &Selfish, PerPlayer::new(1.0, 1.0)).expect("valid betas");

    let (p_in, p_right) = pivotal(&mut solver, &game, 1);
    assert!((p_in - 0.5).abs() < 1e-12, "level-1 leader expects a uniform follower");
    assert!(p_right < 1e-4, "level-1 follower picks the joint payoff");

    let (p_in, _) = pivotal(&mut solver, &game, 2);
    assert!(
        (p_in - 0.9933).abs() < 1e-4,
        "level-2 leader trusts the follower, got {p_in}"
    );
}

#[test]
fn test_every_builtin_game_yields_distributions() {
    for name in Battery::BUILTIN {
        let games = Battery::builtin(name)
            .and_then(|battery| battery.build())
            .expect("built-in batteries are valid");
        assert!(!games.is_empty());

        for game in &games {
            let mut solver = LevelKSolver::new(game, &Selfish, PerPlayer::new(0.5, 1.0))
                .expect("valid betas");
            for level in 0..=3 {
                for player in Player::BOTH {
                    let policy = solver.solve(player, level).clone();
                    for state in game.decision_states(player) {
                        let dist = policy.distribution(state).expect("every decision state");
                        let total: f64 = dist.iter().sum();
                        assert!((total - 1.0).abs() < 1e-12, "{}: sum {total}", game.name());
                        assert!(dist.iter().all(|p| (0.0..=1.0).contains(p)));
                    }
                }
            }
        }
    }
}

#[test]
fn test_neutral_variants_match_selfish_on_builtins() {
    let betas = PerPlayer::new(0.6, 1.4);
    let ia = InequalityAversion::neutral();
    let reciprocity = Reciprocity::neutral();

    for name in Battery::BUILTIN {
        let games = Battery::builtin(name)
            .and_then(|battery| battery.build())
            .expect("built-in batteries are valid");
        for game in &games {
            let selfish = LevelKSolver::new(game, &Selfish, betas)
                .expect("valid betas")
                .profile(2);
            let with_ia = LevelKSolver::new(game, &ia, betas)
                .expect("valid betas")
                .profile(2);
            let with_reciprocity = LevelKSolver::new(game, &reciprocity, betas)
                .expect("valid betas")
                .profile(2);
            assert_eq!(with_ia, selfish, "{}", game.name());
            assert_eq!(with_reciprocity, selfish, "{}", game.name());
        }
    }
}

#[test]
fn test_envy_lowers_trust() {
    // Right is generous to player 2 only; an envious leader should stay out
    // more often than a selfish one at the same temperature.
    let config = sharing_game((5.0, 5.0), (6.0, 6.0), (4.0, 12.0));
    let game = Game::from_config("envy", &config).expect("valid game");
    let betas = PerPlayer::new(1.0, 1.0);

    let mut selfish = LevelKSolver::new(&game, &Selfish, betas).expect("valid betas");
    let envious = InequalityAversion::new(PerPlayer::new(1.0, 0.0), PerPlayer::new(0.0, 0.0));
    let mut averse = LevelKSolver::new(&game, &envious, betas).expect("valid betas");

    let (selfish_in, _) = pivotal(&mut selfish, &game, 2);
    let (averse_in, _) = pivotal(&mut averse, &game, 2);
    assert!(averse_in < selfish_in, "{averse_in} >= {selfish_in}");
}

#[test]
fn test_power_metrics_on_uniform_play() {
    let config = sharing_game((5.0, 3.0), (10.0, 5.0), (3.0, 10.0));
    let game = Game::from_config("trust_game", &config).expect("valid game");
    let profile = LevelKSolver::new(&game, &Selfish, PerPlayer::new(0.0, 0.0))
        .expect("valid betas")
        .profile(2);
    let metrics = PowerMetrics::compute(&game, &profile);

    // Out 1/2, Left 1/4, Right 1/4
    let eu1 = 0.5 * 5.0 + 0.25 * 10.0 + 0.25 * 3.0;
    let eu2 = 0.5 * 3.0 + 0.25 * 5.0 + 0.25 * 10.0;
    assert!((metrics.expected_utility[Player::One] - eu1).abs() < 1e-12);
    assert!((metrics.expected_utility[Player::Two] - eu2).abs() < 1e-12);
    assert!((metrics.reu - (eu2 - eu1)).abs() < 1e-12);
}

#[test]
fn test_malformed_games_are_rejected() {
    let dangling = GameConfig::new(1)
        .with_decision(1, Player::One, [("Out", 2), ("In", 9)])
        .with_reward(2, 1.0, 1.0);
    assert!(matches!(
        Game::from_config("dangling", &dangling),
        Err(Error::DanglingTransition { target: 9, .. })
    ));

    let mut unrewarded = GameConfig::new(1)
        .with_decision(1, Player::One, [("Out", 2), ("In", 3)])
        .with_reward(2, 1.0, 1.0);
    unrewarded.actions.entry(StateId::new(3)).or_default();
    assert!(matches!(
        Game::from_config("unrewarded", &unrewarded),
        Err(Error::MissingReward { state: 3, .. })
    ));

    let mut missing_root = sharing_game((1.0, 1.0), (1.0, 1.0), (1.0, 1.0));
    missing_root.initial_state = StateId::new(42);
    assert!(matches!(
        Game::from_config("missing_root", &missing_root),
        Err(Error::UnknownInitialState { state: 42, .. })
    ));
}

#[test]
fn test_cyclic_game_is_bounded_by_ply() {
    // 1 -Go-> 2 -Back-> 1
    let config = GameConfig::new(1)
        .with_decision(1, Player::One, [("Stop", 3), ("Go", 2)])
        .with_decision(2, Player::Two, [("Back", 1), ("End", 4)])
        .with_reward(3, 2.0, 2.0)
        .with_reward(4, 6.0, 1.0);
    let game = Game::from_config("cycle", &config).expect("valid game");
    assert_eq!(game.depth(), None);

    let mut solver =
        LevelKSolver::new(&game, &Selfish, PerPlayer::new(1.0, 1.0)).expect("valid betas");
    for level in 0..=4 {
        for player in Player::BOTH {
            let policy = solver.solve(player, level).clone();
            for state in game.decision_states(player) {
                let dist = policy.distribution(state).expect("every decision state");
                let total: f64 = dist.iter().sum();
                assert!((total - 1.0).abs() < 1e-12, "level {level}: sum {total}");
            }
        }

        let profile = solver.profile(level);
        let mass: f64 = outcome_distribution(&game, &profile)
            .iter()
            .map(|(_, p)| p)
            .sum();
        assert!(mass <= 1.0 + 1e-12, "level {level}: mass {mass}");
        let metrics = PowerMetrics::compute(&game, &profile);
        assert!(metrics.reu.is_finite() && metrics.rcr.is_finite());
    }
}

#[test]
fn test_follower_punishes_forgone_cooperation() {
    let battery = Battery::builtin("exp3").expect("exp3 is built in");
    let p_right_at = |name: &str, theta: f64| {
        let game = battery
            .get(name)
            .expect("game is in exp3")
            .build()
            .expect("valid game");
        let preference = Reciprocity::new(PerPlayer::splat(0.0), PerPlayer::splat(0.0), theta);
        let mut solver =
            LevelKSolver::new(&game, &preference, PerPlayer::new(1.0, 1.0)).expect("valid betas");
        pivotal(&mut solver, &game, 1).1
    };

    // Out = (10, 15) is the best joint outcome and player 2's best payoff,
    // so going In forgoes it: U(Left) = 1.5·5 − 0.5·3 = 6, U(Right) = 1.5·3 − 0.5·10 = −0.5
    let neutral = p_right_at("rational_punish_A", 0.0);
    assert!((neutral - 1.0 / (1.0 + 2f64.exp())).abs() < 1e-12, "{neutral}");
    let punishing = p_right_at("rational_punish_A", 0.5);
    assert!((punishing - 1.0 / (1.0 + 6.5f64.exp())).abs() < 1e-12, "{punishing}");

    // Out = (2, 7) is not the best joint outcome: θ has no effect
    assert_eq!(
        p_right_at("rational_punish_B", 0.5),
        p_right_at("rational_punish_B", 0.0)
    );
}
