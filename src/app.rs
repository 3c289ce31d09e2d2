//! Command dispatch shared by every input path.
//!
//! Keyboard, voice transcripts and remote commands all end up as calls on the
//! same [`App`], so they obey the same rules: one session, moves that change
//! nothing are rejected, and every change produces one observation.

use crate::adapter::{
    build_observation, create_ack, AckStatus, ClientCommand, InboundCommand, InboundPayload,
    ObservationMessage, OutboundMessage,
};
use crate::core::{GameSession, GameSnapshot, GameStore};
use crate::input::{InputCommand, KeywordExtractor};
use crate::types::Direction;

pub struct App<S: GameStore> {
    session: GameSession<S>,
    extractor: KeywordExtractor,
    snapshot: GameSnapshot,
    observation_seq: u64,
}

impl<S: GameStore> App<S> {
    /// Wrap a session; call `resume` or `start_new_game` on it first.
    pub fn new(session: GameSession<S>) -> Self {
        let snapshot = session.snapshot();
        Self {
            session,
            extractor: KeywordExtractor,
            snapshot,
            observation_seq: 0,
        }
    }

    pub fn session(&self) -> &GameSession<S> {
        &self.session
    }

    /// Snapshot after the latest change
    pub fn snapshot(&self) -> &GameSnapshot {
        &self.snapshot
    }

    /// Swipe. Returns true if the grid changed.
    pub fn apply_direction(&mut self, direction: Direction) -> bool {
        let before = self.session.last_direction();
        let applied = self.session.apply_move(direction).is_some();
        // A rejected move still updates the last requested direction.
        if applied || before != self.session.last_direction() {
            self.refresh();
        }
        applied
    }

    pub fn new_game(&mut self) {
        self.session.start_new_game();
        self.refresh();
    }

    /// Handle a spoken utterance. Returns true if it named a direction,
    /// whether or not the move changed anything.
    pub fn apply_voice_text(&mut self, text: &str) -> bool {
        let moves_before = self.session.move_count();
        let recognized = self.session.apply_voice_command(text, &self.extractor);
        if recognized {
            log::debug!(
                "voice {text:?}: {}",
                if self.session.move_count() != moves_before { "applied" } else { "blocked" }
            );
            self.refresh();
        }
        recognized
    }

    /// Handle a key command. Returns true if the game changed.
    ///
    /// `ToggleVoice` is not a game command and is left to the caller.
    pub fn apply_input(&mut self, command: InputCommand) -> bool {
        match command {
            InputCommand::Move(direction) => self.apply_direction(direction),
            InputCommand::NewGame => {
                self.new_game();
                true
            }
            InputCommand::ToggleVoice => false,
        }
    }

    /// Handle a remote controller command.
    pub fn apply_remote(&mut self, command: &ClientCommand) -> AckStatus {
        let changed = match command {
            ClientCommand::Move(direction) => self.apply_direction(*direction),
            ClientCommand::Voice(text) => {
                let moves_before = self.session.move_count();
                self.apply_voice_text(text) && self.session.move_count() != moves_before
            }
            ClientCommand::NewGame => {
                self.new_game();
                true
            }
        };
        if changed {
            AckStatus::Applied
        } else {
            AckStatus::Ignored
        }
    }

    /// Answer one queued remote message through `send`.
    ///
    /// Returns true only when a command was applied; observers are not told
    /// about ignored commands.
    pub fn handle_inbound(
        &mut self,
        cmd: InboundCommand,
        send: &mut dyn FnMut(OutboundMessage),
    ) -> bool {
        match cmd.payload {
            InboundPayload::Command(command) => {
                let status = self.apply_remote(&command);
                send(OutboundMessage::ToClientAck {
                    client_id: cmd.client_id,
                    ack: create_ack(cmd.seq, status),
                });
                status == AckStatus::Applied
            }
            InboundPayload::SnapshotRequest => {
                send(OutboundMessage::ToClientObservation {
                    client_id: cmd.client_id,
                    obs: self.observation(),
                });
                false
            }
        }
    }

    /// Observation of the current state with the next observation number.
    pub fn observation(&mut self) -> ObservationMessage {
        self.observation_seq += 1;
        build_observation(&self.snapshot, self.observation_seq)
    }

    fn refresh(&mut self) {
        self.session.snapshot_into(&mut self.snapshot);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{MemoryStore, SavedGame};

    fn app_with(tiles: [[u32; 4]; 4]) -> App<MemoryStore> {
        let store = MemoryStore::with_saved(SavedGame {
            tiles,
            current_score: 0,
            best_score: 0,
        });
        let mut session = GameSession::new(store, 9);
        session.resume();
        App::new(session)
    }

    #[test]
    fn test_remote_move_acks() {
        let mut app = app_with([[2, 2, 0, 0], [0; 4], [0; 4], [0; 4]]);

        assert_eq!(app.apply_remote(&ClientCommand::Move(Direction::North)), AckStatus::Ignored);
        assert_eq!(app.snapshot().last_direction, Some(Direction::North));

        assert_eq!(app.apply_remote(&ClientCommand::Move(Direction::West)), AckStatus::Applied);
        assert_eq!(app.snapshot().current_score, 4);
        assert_eq!(app.snapshot().move_count, 1);
    }

    #[test]
    fn test_remote_voice_acks() {
        let mut app = app_with([[2, 2, 0, 0], [0; 4], [0; 4], [0; 4]]);

        assert_eq!(app.apply_remote(&ClientCommand::Voice("hello".into())), AckStatus::Ignored);
        assert_eq!(app.apply_remote(&ClientCommand::Voice("go up".into())), AckStatus::Ignored);
        assert_eq!(app.apply_remote(&ClientCommand::Voice("Left!".into())), AckStatus::Applied);
        assert_eq!(app.snapshot().grid[0][0], 4);
    }

    #[test]
    fn test_new_game_keeps_best() {
        let mut app = app_with([[2, 2, 0, 0], [0; 4], [0; 4], [0; 4]]);
        app.apply_input(InputCommand::Move(Direction::West));
        assert_eq!(app.apply_remote(&ClientCommand::NewGame), AckStatus::Applied);

        let snap = app.snapshot();
        assert_eq!(snap.current_score, 0);
        assert_eq!(snap.best_score, 4);
        assert_eq!(snap.grid.iter().flatten().filter(|&&v| v != 0).count(), 2);
    }

    #[test]
    fn test_toggle_voice_is_not_a_game_command() {
        let mut app = app_with([[2, 0, 0, 0], [0; 4], [0; 4], [0; 4]]);
        assert!(!app.apply_input(InputCommand::ToggleVoice));
        assert_eq!(app.snapshot().move_count, 0);
    }

    fn inbound(seq: u64, payload: InboundPayload) -> InboundCommand {
        InboundCommand {
            client_id: 3,
            seq,
            payload,
        }
    }

    #[test]
    fn test_ignored_remote_command_only_acks() {
        let mut app = app_with([[2, 2, 0, 0], [0; 4], [0; 4], [0; 4]]);
        let mut sent = Vec::new();

        let changed = app.handle_inbound(
            inbound(1, InboundPayload::Command(ClientCommand::Move(Direction::North))),
            &mut |m| sent.push(m),
        );
        assert!(!changed);
        assert_eq!(sent.len(), 1);
        assert!(matches!(
            &sent[0],
            OutboundMessage::ToClientAck { client_id: 3, ack } if ack.seq == 1 && ack.status == AckStatus::Ignored
        ));

        let changed = app.handle_inbound(
            inbound(2, InboundPayload::Command(ClientCommand::Move(Direction::West))),
            &mut |m| sent.push(m),
        );
        assert!(changed);
        assert!(matches!(
            &sent[1],
            OutboundMessage::ToClientAck { ack, .. } if ack.status == AckStatus::Applied
        ));
    }

    #[test]
    fn test_snapshot_request_answers_requester_only() {
        let mut app = app_with([[2, 0, 0, 0], [0; 4], [0; 4], [0; 4]]);
        let mut sent = Vec::new();

        assert!(!app.handle_inbound(inbound(0, InboundPayload::SnapshotRequest), &mut |m| sent.push(m)));
        assert!(matches!(
            &sent[..],
            [OutboundMessage::ToClientObservation { client_id: 3, obs }] if obs.grid[0][0] == 2
        ));
    }

    #[test]
    fn test_observation_numbers_increase() {
        let mut app = app_with([[2, 0, 0, 0], [0; 4], [0; 4], [0; 4]]);
        let first = app.observation();
        let second = app.observation();
        assert_eq!(first.seq + 1, second.seq);
        assert_eq!(first.grid[0][0], 2);
        assert_eq!(first.movements.len(), 1);
    }
}
