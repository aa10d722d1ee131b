//! Provenance of a terminal outcome

use crate::{
    game::{Decision, Game, Player},
    identifiers::StateIndex,
};

/// Everything a preference may know about how a terminal state was reached.
#[derive(Debug, Clone, Copy)]
pub struct TerminalContext<'a> {
    pub game: &'a Game,
    /// Player whose utility is being evaluated
    pub player: Player,
    pub terminal: StateIndex,
    /// Decisions from the initial state down to `terminal`
    pub path: &'a [Decision],
}

impl<'a> TerminalContext<'a> {
    pub fn new(
        game: &'a Game,
        player: Player,
        terminal: StateIndex,
        path: &'a [Decision],
    ) -> Self {
        Self {
            game,
            player,
            terminal,
            path,
        }
    }

    /// True when the opponent, somewhere on the path, passed up an action that
    /// would have ended the game at the outcome that maximizes both the joint
    /// payoff and this player's own payoff.
    ///
    /// In the stimuli this is player 1 choosing `In` when `Out` was the best
    /// outcome for everyone.
    pub fn opponent_forwent_cooperation(&self) -> bool {
        let summary = self.game.payoff_summary();
        let opponent = self.player.opponent();

        self.path
            .iter()
            .filter(|decision| decision.player == opponent)
            .any(|decision| {
                self.game
                    .available(decision.state)
                    .iter()
                    .enumerate()
                    .filter(|&(position, _)| position != decision.action)
                    .map(|(_, action)| action.target)
                    .filter(|&target| self.game.is_terminal(target))
                    .any(|target| {
                        let reward = self.game.reward(target);
                        reward[Player::One] + reward[Player::Two] == summary.max_joint
                            && reward[self.player] == summary.max_payoff[self.player]
                    })
            })
    }
}
