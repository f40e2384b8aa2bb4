//! StickController: the single control loop tying sensors, calibration and HID output together.

use crate::angle::wrap_diff;
use crate::config::StickConfig;
use crate::input::{AngleSource, GripSource};
use crate::output::{OutputCache, OutputError, OutputSink};
use crate::recenter::{CommitKind, RecenterDecision, RecenterInputs, RecenterSession};
use crate::storage::{AngleCalibrationStore, BootstrapOutcome, Calibration, CalibrationStorage};
use embedded_hal_async::delay::DelayNs;
use stick_proto::{angle_to_degrees, EncoderStatus, GripFrame, GripState, StickState};

/// Monotonic millisecond counter. Allowed to wrap; callers only subtract.
pub trait Clock {
    fn now_ms(&self) -> u32;
}

/// Error type for controller operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ControllerError {
    /// Error from the output sink.
    Output(OutputError),
}

/// Last good reading of one axis.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct AxisTrack {
    /// Last CRC-valid angle, sensor counts.
    pub angle: u32,
    /// `angle` in degrees.
    pub degrees: f32,
    pub status: EncoderStatus,
    /// Whether this cycle's reading was valid.
    pub crc_ok: bool,
}

impl AxisTrack {
    fn seed(&mut self, angle: u32) {
        self.angle = angle;
        self.degrees = angle_to_degrees(angle);
    }
}

/// Reads a sensor into `track`, keeping the previous value unless the reading is valid.
fn sample<A: AngleSource>(source: &mut A, track: &mut AxisTrack) {
    track.crc_ok = match source.read_angle() {
        Ok(reading) if reading.crc_ok => {
            track.angle = reading.angle;
            track.degrees = reading.degrees();
            track.status = reading.status;
            true
        }
        Ok(reading) => {
            trace!("CRC mismatch, holding last angle (raw {})", reading.angle);
            false
        }
        Err(e) => {
            trace!("Sensor read failed: {:?}", e);
            false
        }
    };
}

/// Owns every peripheral and all mutable state of the stick.
///
/// One call to [`process_one`](Self::process_one) is one control cycle:
///
/// 1. read both angle sensors (a failed read keeps that axis' last good angle)
/// 2. compute each axis' wrapped delta from its center
/// 3. read and decode the grip frame
/// 4. advance the recenter session, committing new centers if it says so
/// 5. map both axes
/// 6. send the fields that changed since the last successful send
pub struct StickController<A, G, S, O, C> {
    roll_sensor: A,
    pitch_sensor: A,
    grip: G,
    store: AngleCalibrationStore<S>,
    output: O,
    clock: C,
    config: StickConfig,

    calibration: Calibration,
    roll: AxisTrack,
    pitch: AxisTrack,
    frame: GripFrame,
    grip_state: GripState,
    session: RecenterSession,
    cache: OutputCache,
    current: StickState,
    last_diagnostic_ms: Option<u32>,
}

impl<A, G, S, O, C> StickController<A, G, S, O, C>
where
    A: AngleSource,
    G: GripSource,
    S: CalibrationStorage,
    O: OutputSink,
    C: Clock,
{
    /// Create a controller. The calibration starts invalid until
    /// [`bootstrap`](Self::bootstrap) runs.
    pub fn new(
        roll_sensor: A,
        pitch_sensor: A,
        grip: G,
        storage: S,
        output: O,
        clock: C,
        config: StickConfig,
    ) -> Self {
        Self {
            roll_sensor,
            pitch_sensor,
            grip,
            store: AngleCalibrationStore::new(storage),
            output,
            clock,
            config,
            calibration: Calibration::default(),
            roll: AxisTrack::default(),
            pitch: AxisTrack::default(),
            frame: GripFrame::RELEASED,
            grip_state: GripState::default(),
            session: RecenterSession::new(),
            cache: OutputCache::new(),
            current: StickState::neutral(),
            last_diagnostic_ms: None,
        }
    }

    /// Load the stored calibration, or sample one if none is valid.
    pub async fn bootstrap<D: DelayNs>(&mut self, delay: &mut D) -> BootstrapOutcome {
        let (calibration, outcome) = self
            .store
            .bootstrap(
                &mut self.roll_sensor,
                &mut self.pitch_sensor,
                self.config.bootstrap_samples,
                self.config.bootstrap_sample_delay_us,
                delay,
            )
            .await;

        self.calibration = calibration;
        // Until the first good reading arrives, hold the stick at center.
        self.roll.seed(calibration.roll_center);
        self.pitch.seed(calibration.pitch_center);
        outcome
    }

    /// Run the control loop forever.
    pub async fn run<D: DelayNs>(&mut self, delay: &mut D) -> ! {
        loop {
            if let Err(e) = self.process_one().await {
                error!("Output error: {:?}", e);
            }
            delay.delay_ms(self.config.cycle_delay_ms).await;
        }
    }

    /// Run one control cycle.
    pub async fn process_one(&mut self) -> Result<(), ControllerError> {
        let now = self.clock.now_ms();

        sample(&mut self.roll_sensor, &mut self.roll);
        sample(&mut self.pitch_sensor, &mut self.pitch);
        let (roll_delta, pitch_delta) = self.deltas();

        match self.grip.read_frame() {
            Ok(frame) => {
                self.frame = frame;
                self.grip_state = frame.decode();
            }
            Err(e) => trace!("Grip read failed: {:?}", e),
        }

        let inputs = RecenterInputs {
            combo_pressed: self.grip_state.buttons.contains(self.config.recenter.combo),
            now_ms: now,
            calibration_valid: self.calibration.valid,
            roll_error_deg: roll_delta,
            pitch_error_deg: pitch_delta,
            crc_ok: self.roll.crc_ok && self.pitch.crc_ok,
        };
        let decision = self.session.evaluate(&inputs, &self.config.recenter);
        let (roll_delta, pitch_delta) = match decision {
            RecenterDecision::Commit(kind) => {
                self.commit(kind);
                self.deltas()
            }
            RecenterDecision::Refused => {
                warn!(
                    "Recenter refused: roll off by {}, pitch off by {}",
                    roll_delta, pitch_delta
                );
                (roll_delta, pitch_delta)
            }
            RecenterDecision::ForceSkipped => {
                warn!("Forced recenter skipped: sensor readings invalid");
                (roll_delta, pitch_delta)
            }
            RecenterDecision::Idle | RecenterDecision::Holding => (roll_delta, pitch_delta),
        };

        self.current = StickState {
            roll: self.config.roll.map(roll_delta),
            pitch: self.config.pitch.map(pitch_delta),
            buttons: self.grip_state.buttons,
            hat: self.grip_state.hat,
        };

        self.diagnostics(now, roll_delta, pitch_delta);

        let updates = self.cache.changes(&self.current);
        if !updates.is_empty() {
            self.output
                .send(&updates)
                .await
                .map_err(ControllerError::Output)?;
            self.cache.commit(&self.current);
        }

        Ok(())
    }

    /// Signed distance of each axis from its center, sensor degrees.
    fn deltas(&self) -> (f32, f32) {
        (
            wrap_diff(self.roll.degrees, angle_to_degrees(self.calibration.roll_center)),
            wrap_diff(self.pitch.degrees, angle_to_degrees(self.calibration.pitch_center)),
        )
    }

    /// Adopt the current angles as centers and persist them together.
    fn commit(&mut self, kind: CommitKind) {
        let (roll_center, pitch_center) = (self.roll.angle, self.pitch.angle);
        if let Err(e) = self.store.save(roll_center, pitch_center) {
            error!("Saving calibration failed: {:?}", e);
        }
        self.calibration = Calibration {
            roll_center,
            pitch_center,
            valid: true,
        };
        info!(
            "Recenter committed ({:?}): roll={} pitch={}",
            kind, roll_center, pitch_center
        );
    }

    fn diagnostics(&mut self, now: u32, roll_delta: f32, pitch_delta: f32) {
        let Some(interval) = self.config.diagnostics_interval_ms else {
            return;
        };
        if let Some(last) = self.last_diagnostic_ms {
            if now.wrapping_sub(last) < interval {
                return;
            }
        }
        self.last_diagnostic_ms = Some(now);

        debug!(
            "roll {}deg d={} crc={} st={} | pitch {}deg d={} crc={} st={} | grip {:x}",
            self.roll.degrees,
            roll_delta,
            self.roll.crc_ok,
            self.roll.status.0,
            self.pitch.degrees,
            pitch_delta,
            self.pitch.crc_ok,
            self.pitch.status.0,
            self.frame.0
        );
    }

    /// Current in-memory calibration.
    pub fn calibration(&self) -> &Calibration {
        &self.calibration
    }

    /// State computed by the most recent cycle.
    pub fn state(&self) -> &StickState {
        &self.current
    }

    /// Last good reading of the roll axis.
    pub fn roll(&self) -> &AxisTrack {
        &self.roll
    }

    /// Last good reading of the pitch axis.
    pub fn pitch(&self) -> &AxisTrack {
        &self.pitch
    }

    /// Recenter session of the current combo hold.
    pub fn session(&self) -> &RecenterSession {
        &self.session
    }

    /// Get a reference to the calibration store.
    pub fn store(&self) -> &AngleCalibrationStore<S> {
        &self.store
    }

    /// Get a reference to the output sink.
    pub fn output(&self) -> &O {
        &self.output
    }

    /// Get a mutable reference to the output sink.
    pub fn output_mut(&mut self) -> &mut O {
        &mut self.output
    }

    /// Get a mutable reference to the roll and pitch sensors.
    pub fn sensors_mut(&mut self) -> (&mut A, &mut A) {
        (&mut self.roll_sensor, &mut self.pitch_sensor)
    }

    /// Get a mutable reference to the grip source.
    pub fn grip_mut(&mut self) -> &mut G {
        &mut self.grip
    }
}
