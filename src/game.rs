use std::time::{Duration, Instant};

use minesweeper_common::{
    models::{BoardSize, GameParams, Pos, Preset},
    protocol::{CellUpdate, GameEvent, GameStatus, RevealOutcome},
};
use rand::Rng;
use tokio::sync::mpsc;
use tracing::{debug, info, instrument, warn};

use crate::{
    config::Config,
    data::Field,
    error::GameError,
    ledger::{ScoreLedger, storage::FileStorage, storage::Storage},
};

/// Monotonic game clock that freezes when stopped.
#[derive(Debug, Default, Clone, Copy)]
pub struct Stopwatch {
    started: Option<Instant>,
    frozen: Option<Duration>,
}

impl Stopwatch {
    pub fn start(&mut self) {
        self.started = Some(Instant::now());
        self.frozen = None;
    }

    pub fn stop(&mut self) {
        if self.frozen.is_none() {
            self.frozen = Some(self.elapsed());
        }
    }

    pub fn elapsed(&self) -> Duration {
        match (self.frozen, self.started) {
            (Some(frozen), _) => frozen,
            (None, Some(started)) => started.elapsed(),
            (None, None) => Duration::ZERO,
        }
    }

    pub fn is_running(&self) -> bool {
        self.started.is_some() && self.frozen.is_none()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct RevealReport {
    pub outcome: RevealOutcome,
    pub updates: Vec<CellUpdate>,
}

pub struct Game<S> {
    field: Option<Field>,
    status: GameStatus,
    stopwatch: Stopwatch,
    exploded: Option<Pos>,
    pending_time: Option<f64>,
    ledger: ScoreLedger<S>,
    event_sender: Option<mpsc::UnboundedSender<GameEvent>>,
}

impl Game<FileStorage> {
    /// Opens the file-backed ledger described by `config`.
    pub fn from_config(config: &Config) -> Self {
        Self::new(ScoreLedger::open(config.file_storage(), &config.scores_key))
    }
}

impl<S: Storage> Game<S> {
    pub fn new(ledger: ScoreLedger<S>) -> Self {
        Self {
            field: None,
            status: GameStatus::Idle,
            stopwatch: Stopwatch::default(),
            exploded: None,
            pending_time: None,
            ledger,
            event_sender: None,
        }
    }

    /// Subscribe to lifecycle events. Replaces any earlier subscriber.
    pub fn subscribe_to_events(&mut self) -> mpsc::UnboundedReceiver<GameEvent> {
        let (sender, receiver) = mpsc::unbounded_channel();
        self.event_sender = Some(sender);
        receiver
    }

    fn emit(&self, event: GameEvent) {
        if let Some(ref sender) = self.event_sender {
            let _ = sender.send(event);
        }
    }

    #[instrument(level = "trace", skip(self))]
    pub fn start(&mut self, params: GameParams) -> Result<(), GameError> {
        self.start_with_rng(params, &mut rand::rng())
    }

    pub fn start_preset(&mut self, preset: Preset) -> Result<(), GameError> {
        self.start(preset.params())
    }

    pub fn start_with_rng<R: Rng>(
        &mut self,
        params: GameParams,
        rng: &mut R,
    ) -> Result<(), GameError> {
        let field = Field::generate(params, rng).inspect_err(|e| {
            warn!("Refusing to start game: {}", e);
        })?;
        self.start_with_field(field);
        Ok(())
    }

    /// Starts a game on a prepared field, discarding any game in progress.
    ///
    /// The field is reset first, so a previously played field starts hidden.
    pub fn start_with_field(&mut self, mut field: Field) {
        field.reset();
        let params = field.params();
        info!(
            "Starting game: {}x{} with {} mines",
            params.rows, params.cols, params.mines
        );

        self.field = Some(field);
        self.status = GameStatus::Active;
        self.exploded = None;
        self.pending_time = None;
        self.stopwatch.start();
        self.emit(GameEvent::GameInitialized { params });
    }

    /// Starts a fresh field with the last parameters.
    #[instrument(level = "trace", skip(self))]
    pub fn restart(&mut self) -> Result<(), GameError> {
        let params = self.field.as_ref().ok_or(GameError::NotStarted)?.params();
        info!("Restarting game");
        self.start(params)
    }

    #[instrument(level = "trace", skip(self), fields(row = pos.row, col = pos.col))]
    pub fn reveal(&mut self, pos: Pos) -> Option<RevealReport> {
        if self.status != GameStatus::Active {
            debug!("Ignoring reveal at {} while {:?}", pos, self.status);
            return None;
        }
        let field = self.field.as_mut()?;

        let mut updates = Vec::new();
        let outcome = field.reveal(pos, &mut updates);

        if !updates.is_empty() {
            self.emit(GameEvent::BoardUpdated {
                changed_positions: updates.iter().map(|u| u.pos).collect(),
            });
        }

        match outcome {
            RevealOutcome::Continue => {}
            RevealOutcome::Loss => {
                self.stopwatch.stop();
                self.status = GameStatus::Lost;
                self.exploded = Some(pos);
                warn!("Player hit mine at {} - game over!", pos);
                self.emit(GameEvent::GameLost { exploded: pos });
            }
            RevealOutcome::Win => {
                self.stopwatch.stop();
                self.status = GameStatus::Won;
                let elapsed = self.elapsed_seconds();
                self.pending_time = Some(elapsed);
                info!("Game won in {:.3}s", elapsed);
                self.emit(GameEvent::GameWon {
                    elapsed_seconds: elapsed,
                });
            }
        }

        Some(RevealReport { outcome, updates })
    }

    #[instrument(level = "trace", skip(self), fields(row = pos.row, col = pos.col))]
    pub fn toggle_flag(&mut self, pos: Pos) -> Option<bool> {
        if self.status != GameStatus::Active {
            debug!("Ignoring flag at {} while {:?}", pos, self.status);
            return None;
        }

        let flagged = self.field.as_mut()?.toggle_flag(pos)?;
        self.emit(GameEvent::BoardUpdated {
            changed_positions: vec![pos],
        });
        Some(flagged)
    }

    /// Records the pending winning time under `candidate`.
    ///
    /// An invalid name keeps the time pending so the caller can prompt again.
    #[instrument(level = "trace", skip(self))]
    pub fn submit_name(&mut self, candidate: &str) -> Result<Option<usize>, GameError> {
        let time = self.pending_time.ok_or(GameError::NoPendingScore)?;
        let rank = self.ledger.record(candidate, time)?;
        self.pending_time = None;
        self.emit(GameEvent::ScoreRecorded { rank });
        Ok(rank)
    }

    /// Reports whether the current board fits in `available` cells.
    ///
    /// Never regenerates or otherwise touches the field.
    pub fn resize(&self, available: BoardSize) -> bool {
        let fits = self
            .field
            .as_ref()
            .is_none_or(|field| field.rows() <= available.rows && field.cols() <= available.cols);
        debug!(
            "Resized to {}x{} cells, board fits: {}",
            available.rows, available.cols, fits
        );
        fits
    }

    pub fn elapsed_seconds(&self) -> f64 {
        self.stopwatch.elapsed().as_secs_f64()
    }

    pub fn status(&self) -> GameStatus {
        self.status
    }

    pub fn field(&self) -> Option<&Field> {
        self.field.as_ref()
    }

    pub fn revealed_count(&self) -> usize {
        self.field.as_ref().map_or(0, Field::revealed_count)
    }

    pub fn flag_count(&self) -> usize {
        self.field.as_ref().map_or(0, Field::flag_count)
    }

    /// Every mine position, available only once the game is lost.
    pub fn mine_coordinates(&self) -> Option<Vec<Pos>> {
        if self.status != GameStatus::Lost {
            return None;
        }
        self.field.as_ref().map(Field::mine_positions)
    }

    pub fn exploded(&self) -> Option<Pos> {
        self.exploded
    }

    pub fn pending_time(&self) -> Option<f64> {
        self.pending_time
    }

    pub fn ledger(&self) -> &ScoreLedger<S> {
        &self.ledger
    }
}
