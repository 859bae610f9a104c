//! Transceiver Monitor - presence change detection
//!
//! Owns the last observed presence snapshot for a board and reports which
//! ports changed since the previous poll. Each poll decodes the presence
//! registers, applies the reset handshake, diffs the result against the
//! snapshot, and replaces the snapshot in one step together with the change
//! set it returns.

use sfpmon_core::{
    BoardLayout, ChangeSet, MonitorConfig, PollOutcome, PortIndex, PresenceChange, Result,
    SfpMonError,
};
use std::sync::Arc;
use std::time::Duration;
use tokio::time::{sleep, Instant};
use tracing::{debug, info, warn};

use crate::decoder::PresenceDecoder;
use crate::hooks::{hooks_for, TransitionHook};
use crate::register_source::RegisterSource;
use crate::reset_tracker::ResetHandshakeTracker;

/// Delay before the first poll, letting registers become valid after power-up
pub const DEFAULT_SETTLE_DELAY: Duration = Duration::from_secs(5);

/// Interval between polls while waiting for a change
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(1);

/// Monitor timing parameters
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MonitorTiming {
    pub settle_delay: Duration,
    pub poll_interval: Duration,
}

impl Default for MonitorTiming {
    fn default() -> Self {
        Self {
            settle_delay: DEFAULT_SETTLE_DELAY,
            poll_interval: DEFAULT_POLL_INTERVAL,
        }
    }
}

impl From<&MonitorConfig> for MonitorTiming {
    fn from(config: &MonitorConfig) -> Self {
        Self {
            settle_delay: config.settle_delay(),
            poll_interval: config.poll_interval(),
        }
    }
}

/// Presence monitor for one board
///
/// Polled by exactly one caller loop; every method takes `&mut self` or
/// `&self` and there is no internal concurrency.
pub struct TransceiverMonitor {
    layout: Arc<BoardLayout>,
    source: Arc<dyn RegisterSource>,
    decoder: PresenceDecoder,
    reset_tracker: Option<ResetHandshakeTracker>,
    hooks: Vec<Box<dyn TransitionHook>>,
    timing: MonitorTiming,
    snapshot: Vec<bool>,
    /// Pending transitions whose hooks already ran in a failed poll
    hooked: ChangeSet,
}

impl TransceiverMonitor {
    /// Create a monitor with the default 5 s settle delay and 1 s poll interval
    pub fn new(layout: BoardLayout, source: Arc<dyn RegisterSource>) -> Result<Self> {
        Self::with_timing(layout, source, MonitorTiming::default())
    }

    /// Create a monitor with explicit timing
    ///
    /// # Errors
    ///
    /// Returns an error if the layout does not validate or the poll
    /// interval is zero.
    pub fn with_timing(
        layout: BoardLayout,
        source: Arc<dyn RegisterSource>,
        timing: MonitorTiming,
    ) -> Result<Self> {
        layout.validate()?;

        if timing.poll_interval.is_zero() {
            return Err(SfpMonError::InvalidInput(
                "Poll interval must be greater than zero".to_string(),
            ));
        }

        let decoder = PresenceDecoder::new(&layout);
        let reset_tracker = ResetHandshakeTracker::from_layout(&layout);
        let hooks = hooks_for(&layout);
        let snapshot = vec![false; layout.port_count];

        Ok(Self {
            layout: Arc::new(layout),
            source,
            decoder,
            reset_tracker,
            hooks,
            timing,
            snapshot,
            hooked: ChangeSet::new(),
        })
    }

    /// Register an additional transition hook
    pub fn with_hook(mut self, hook: Box<dyn TransitionHook>) -> Self {
        self.hooks.push(hook);
        self
    }

    pub fn layout(&self) -> &Arc<BoardLayout> {
        &self.layout
    }

    pub fn port_count(&self) -> usize {
        self.layout.port_count
    }

    /// Last observed presence, indexed by `port - 1`
    pub fn snapshot(&self) -> &[bool] {
        &self.snapshot
    }

    /// Presence of one port as of the last poll
    pub fn is_present(&self, port: PortIndex) -> Result<bool> {
        self.layout.validate_port(port)?;
        Ok(self.snapshot[port - 1])
    }

    /// Ports present as of the last poll
    pub fn present_ports(&self) -> Vec<PortIndex> {
        self.snapshot
            .iter()
            .enumerate()
            .filter(|(_, &present)| present)
            .map(|(i, _)| i + 1)
            .collect()
    }

    /// Decode presence and apply the reset handshake
    async fn read_state(&self) -> Result<Vec<bool>> {
        let mut state = self.decoder.decode(self.source.as_ref()).await?;
        if let Some(tracker) = &self.reset_tracker {
            tracker.apply(self.source.as_ref(), &mut state).await?;
        }
        Ok(state)
    }

    /// Wait for the hardware to settle and take the baseline snapshot
    ///
    /// No change set is produced for the baseline. Board hooks get a chance
    /// to act on the ports already present at boot.
    pub async fn initialize(&mut self) -> Result<()> {
        info!(
            "Initializing {} ({} ports) via {}; settling for {:?}",
            self.layout.name,
            self.layout.port_count,
            self.source.describe(),
            self.timing.settle_delay
        );
        sleep(self.timing.settle_delay).await;

        let state = self.read_state().await?;
        for hook in &self.hooks {
            debug!("Running init hook '{}'", hook.name());
            hook.on_initialized(self.source.as_ref(), &state).await?;
        }
        self.snapshot = state;
        self.hooked.clear();

        info!(
            "Baseline taken: {} of {} ports present",
            self.present_ports().len(),
            self.layout.port_count
        );
        Ok(())
    }

    /// Poll once and record any transitions into `changes`
    ///
    /// Returns whether anything changed. Hooks run for each transition
    /// before the snapshot is replaced; if one fails, the snapshot is left
    /// as it was and the same transition is reported by the next poll.
    /// Ports whose hooks all succeeded in the failed poll are remembered and
    /// not hooked again while that transition stays pending.
    async fn poll_once(&mut self, changes: &mut ChangeSet) -> Result<bool> {
        let state = self.read_state().await?;

        let snapshot = &self.snapshot;
        self.hooked.retain(|&port, change| {
            let i = port - 1;
            snapshot[i] != state[i] && change.is_present() == state[i]
        });

        let mut found = ChangeSet::new();
        for (i, (&old, &new)) in self.snapshot.iter().zip(&state).enumerate() {
            if old == new {
                continue;
            }
            let port = i + 1;
            let change = PresenceChange::from_presence(new);
            if !self.hooked.contains_key(&port) {
                for hook in &self.hooks {
                    hook.on_transition(self.source.as_ref(), port, change)
                        .await?;
                }
                self.hooked.insert(port, change);
            }
            found.insert(port, change);
        }

        if found.is_empty() {
            return Ok(false);
        }

        debug!("Poll found {} transition(s): {:?}", found.len(), found);
        self.snapshot = state;
        self.hooked.clear();
        changes.extend(found);
        Ok(true)
    }

    /// Wait for presence changes
    ///
    /// `changes` is an accumulator: transitions found by this call are added
    /// to it, overwriting earlier entries for the same port.
    ///
    /// * `timeout_ms == 0` - poll once per interval until a change occurs.
    /// * `timeout_ms > 0` - poll until a change or the deadline; the last
    ///   sleep is shortened to land on the deadline. Reaching the deadline
    ///   returns `Ok(true)` with nothing added.
    /// * `timeout_ms < 0` - rejected immediately with `Ok(false)`.
    ///
    /// Only one poll's worth of transitions is returned per call, but every
    /// port that flipped in that poll is included.
    ///
    /// # Errors
    ///
    /// Register failures are returned as-is; the caller owns retry policy.
    pub async fn check_status(&mut self, changes: &mut ChangeSet, timeout_ms: i64) -> Result<bool> {
        if timeout_ms < 0 {
            warn!("Rejecting negative timeout {} ms", timeout_ms);
            return Ok(false);
        }

        if timeout_ms == 0 {
            loop {
                if self.poll_once(changes).await? {
                    return Ok(true);
                }
                sleep(self.timing.poll_interval).await;
            }
        }

        // Instant is monotonic so `start <= end` holds once the deadline is
        // representable; an unrepresentable deadline is the only anomaly left.
        let start = Instant::now();
        let Some(end) = start.checked_add(Duration::from_millis(timeout_ms as u64)) else {
            warn!("Timeout {} ms overflows the clock, rejecting", timeout_ms);
            return Ok(false);
        };

        loop {
            if self.poll_once(changes).await? {
                return Ok(true);
            }

            let now = Instant::now();
            if now >= end {
                debug!("No transitions within {} ms", timeout_ms);
                return Ok(true);
            }
            sleep((end - now).min(self.timing.poll_interval)).await;
        }
    }

    /// Wait for presence changes and return them as a fresh outcome
    pub async fn poll(&mut self, timeout_ms: i64) -> Result<PollOutcome> {
        let mut changes = ChangeSet::new();
        let found = self.check_status(&mut changes, timeout_ms).await?;
        Ok(PollOutcome { found, changes })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock::MockRegisterSource;
    use async_trait::async_trait;
    use sfpmon_core::{BitOrder, BoardType};
    use std::sync::Mutex;

    /// Write active-low presence words for `present` into the mock
    fn set_present(mock: &MockRegisterSource, layout: &BoardLayout, present: &[PortIndex]) {
        let mut first_port = 1;
        for register in &layout.presence.registers {
            let mut word: u64 = if register.width == 64 {
                u64::MAX
            } else {
                (1u64 << register.width) - 1
            };
            for offset in 0..register.width {
                let port = first_port + offset as usize;
                if present.contains(&port) {
                    let shift = match layout.presence.bit_order {
                        BitOrder::LsbFirst => offset,
                        BitOrder::MsbFirst => register.width - 1 - offset,
                    };
                    word &= !(1u64 << shift);
                }
            }
            mock.set(&register.path, format!("{:#x}", word));
            first_port += register.width as usize;
        }
    }

    /// Put every handshake port in phase `None`
    fn arm_handshake(mock: &MockRegisterSource, layout: &BoardLayout) {
        if let Some(reset) = &layout.reset_handshake {
            for &port in &reset.ports {
                mock.set(&BoardLayout::register_path(&reset.phase_register, port), "0");
            }
        }
    }

    fn setup(board: BoardType, present: &[PortIndex]) -> (Arc<MockRegisterSource>, TransceiverMonitor) {
        let layout = board.to_layout().unwrap();
        let mock = Arc::new(MockRegisterSource::new());
        set_present(&mock, &layout, present);
        arm_handshake(&mock, &layout);
        let monitor = TransceiverMonitor::new(layout, mock.clone()).unwrap();
        (mock, monitor)
    }

    fn expected(entries: &[(PortIndex, char)]) -> ChangeSet {
        entries
            .iter()
            .map(|&(port, code)| (port, PresenceChange::from_code(code).unwrap()))
            .collect()
    }

    #[tokio::test(start_paused = true)]
    async fn test_initialize_waits_for_settle_delay() {
        let (_mock, mut monitor) = setup(BoardType::Qsfp36, &[2, 36]);

        let start = Instant::now();
        monitor.initialize().await.unwrap();

        assert!(start.elapsed() >= DEFAULT_SETTLE_DELAY);
        assert_eq!(monitor.present_ports(), vec![2, 36]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_baseline_then_single_insertion() {
        let (mock, mut monitor) = setup(BoardType::Qsfp36, &[]);
        monitor.initialize().await.unwrap();
        assert!(monitor.snapshot().iter().all(|p| !p));

        set_present(&mock, monitor.layout(), &[5]);
        let outcome = monitor.poll(1000).await.unwrap();

        assert!(outcome.found);
        assert_eq!(outcome.changes, expected(&[(5, '1')]));
        assert!(monitor.is_present(5).unwrap());
        assert_eq!(monitor.snapshot().len(), 36);
    }

    #[tokio::test(start_paused = true)]
    async fn test_second_call_without_change_is_empty() {
        let (mock, mut monitor) = setup(BoardType::Qsfp36, &[]);
        monitor.initialize().await.unwrap();

        set_present(&mock, monitor.layout(), &[5]);
        assert_eq!(monitor.poll(1000).await.unwrap().changes.len(), 1);

        let outcome = monitor.poll(1000).await.unwrap();
        assert!(outcome.is_timeout());
    }

    #[tokio::test(start_paused = true)]
    async fn test_removal_reported() {
        let (mock, mut monitor) = setup(BoardType::Qsfp32Sfp2, &[1, 2]);
        monitor.initialize().await.unwrap();

        set_present(&mock, monitor.layout(), &[2]);
        let outcome = monitor.poll(500).await.unwrap();
        assert_eq!(outcome.changes, expected(&[(1, '0')]));
        assert!(!monitor.is_present(1).unwrap());
    }

    #[tokio::test(start_paused = true)]
    async fn test_simultaneous_flips_reported_together() {
        let (mock, mut monitor) = setup(BoardType::Osfp64Sfp2, &[1, 40]);
        monitor.initialize().await.unwrap();

        set_present(&mock, monitor.layout(), &[2, 33, 40, 66]);
        let outcome = monitor.poll(1000).await.unwrap();
        assert_eq!(
            outcome.changes,
            expected(&[(1, '0'), (2, '1'), (33, '1'), (66, '1')])
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_negative_timeout_is_rejected_without_polling() {
        let (mock, mut monitor) = setup(BoardType::Qsfp36, &[]);
        monitor.initialize().await.unwrap();
        mock.clear_reads();
        set_present(&mock, monitor.layout(), &[3]);

        let start = Instant::now();
        let outcome = monitor.poll(-5).await.unwrap();

        assert_eq!(outcome, PollOutcome::rejected());
        assert!(mock.reads().is_empty());
        assert!(start.elapsed() < Duration::from_millis(1));
        assert!(!monitor.is_present(3).unwrap());
    }

    #[tokio::test(start_paused = true)]
    async fn test_positive_timeout_without_change() {
        let (_mock, mut monitor) = setup(BoardType::Qsfp36, &[7]);
        monitor.initialize().await.unwrap();

        let start = Instant::now();
        let outcome = monitor.poll(2500).await.unwrap();
        let elapsed = start.elapsed();

        assert_eq!(outcome, PollOutcome::timed_out());
        assert!(elapsed >= Duration::from_millis(2500), "{:?}", elapsed);
        assert!(elapsed < Duration::from_millis(3000), "{:?}", elapsed);
    }

    #[tokio::test(start_paused = true)]
    async fn test_sub_second_timeout_sleeps_only_the_remainder() {
        let (_mock, mut monitor) = setup(BoardType::Qsfp36, &[]);
        monitor.initialize().await.unwrap();

        let start = Instant::now();
        let outcome = monitor.poll(300).await.unwrap();

        let elapsed = start.elapsed();
        assert!(outcome.is_timeout());
        assert!(elapsed >= Duration::from_millis(300), "{:?}", elapsed);
        assert!(elapsed < Duration::from_millis(400), "{:?}", elapsed);
    }

    #[tokio::test(start_paused = true)]
    async fn test_change_detected_before_deadline() {
        let (mock, mut monitor) = setup(BoardType::Qsfp36, &[]);
        monitor.initialize().await.unwrap();

        let layout = monitor.layout().clone();
        let flipper = mock.clone();
        tokio::spawn(async move {
            sleep(Duration::from_millis(1500)).await;
            set_present(&flipper, &layout, &[9]);
        });

        let start = Instant::now();
        let outcome = monitor.poll(10_000).await.unwrap();

        let elapsed = start.elapsed();
        assert_eq!(outcome.changes, expected(&[(9, '1')]));
        assert!(elapsed >= Duration::from_secs(2), "{:?}", elapsed);
        assert!(elapsed < Duration::from_millis(2100), "{:?}", elapsed);
    }

    #[tokio::test(start_paused = true)]
    async fn test_zero_timeout_blocks_until_change() {
        let (mock, mut monitor) = setup(BoardType::Qsfp36, &[]);
        monitor.initialize().await.unwrap();

        let layout = monitor.layout().clone();
        let flipper = mock.clone();
        tokio::spawn(async move {
            sleep(Duration::from_millis(3500)).await;
            set_present(&flipper, &layout, &[12]);
        });

        let start = Instant::now();
        let outcome = monitor.poll(0).await.unwrap();

        let elapsed = start.elapsed();
        assert_eq!(outcome, PollOutcome::changed(expected(&[(12, '1')])));
        assert!(elapsed >= Duration::from_millis(3500), "{:?}", elapsed);
        assert!(elapsed < Duration::from_millis(4100), "{:?}", elapsed);
    }

    #[tokio::test(start_paused = true)]
    async fn test_accumulator_is_augmented() {
        let (mock, mut monitor) = setup(BoardType::Qsfp36, &[]);
        monitor.initialize().await.unwrap();

        let mut changes = expected(&[(30, '0'), (4, '0')]);
        set_present(&mock, monitor.layout(), &[4]);
        assert!(monitor.check_status(&mut changes, 1000).await.unwrap());

        assert_eq!(changes, expected(&[(4, '1'), (30, '0')]));
    }

    #[tokio::test(start_paused = true)]
    async fn test_reset_handshake_suppresses_presence() {
        let (mock, mut monitor) = setup(BoardType::Osfp64, &[]);
        monitor.initialize().await.unwrap();

        // Module inserted while the hardware requests a reset
        mock.set("port3/reset_status", "1");
        set_present(&mock, monitor.layout(), &[3]);
        let outcome = monitor.poll(2000).await.unwrap();
        assert!(outcome.is_timeout());
        assert!(!monitor.is_present(3).unwrap());
        assert_eq!(mock.writes_to("port3/reset_status"), vec!["2".to_string()]);

        // Still resetting: no further writes, still suppressed
        let outcome = monitor.poll(2000).await.unwrap();
        assert!(outcome.is_timeout());
        assert_eq!(mock.writes_to("port3/reset_status").len(), 1);

        // Hardware posts completion: port becomes present and the handshake re-arms
        mock.set("port3/reset_status", "3");
        let outcome = monitor.poll(2000).await.unwrap();
        assert_eq!(outcome.changes, expected(&[(3, '1')]));
        assert_eq!(
            mock.writes_to("port3/reset_status"),
            vec!["2".to_string(), "0".to_string()]
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_reset_of_present_port_reports_removal() {
        let (mock, mut monitor) = setup(BoardType::Osfp64, &[8]);
        monitor.initialize().await.unwrap();
        assert!(monitor.is_present(8).unwrap());

        mock.set("port8/reset_status", "1");
        let outcome = monitor.poll(1000).await.unwrap();
        assert_eq!(outcome.changes, expected(&[(8, '0')]));
    }

    #[tokio::test(start_paused = true)]
    async fn test_tx_enable_hook_on_wired_port() {
        let (mock, mut monitor) = setup(BoardType::Osfp64Sfp2, &[]);
        monitor.initialize().await.unwrap();
        assert!(mock.writes().is_empty());

        set_present(&mock, monitor.layout(), &[65]);
        monitor.poll(1000).await.unwrap();
        assert_eq!(mock.writes_to("port65/tx_enable"), vec!["1".to_string()]);

        set_present(&mock, monitor.layout(), &[]);
        monitor.poll(1000).await.unwrap();
        assert_eq!(
            mock.writes_to("port65/tx_enable"),
            vec!["1".to_string(), "0".to_string()]
        );
        assert!(mock.writes_to("port66/tx_enable").is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_tx_enable_hook_ignores_other_ports() {
        let (mock, mut monitor) = setup(BoardType::Osfp64Sfp2, &[]);
        monitor.initialize().await.unwrap();

        set_present(&mock, monitor.layout(), &[10, 64]);
        monitor.poll(1000).await.unwrap();
        assert!(mock
            .writes()
            .iter()
            .all(|(path, _)| !path.ends_with("tx_enable")));
    }

    #[tokio::test(start_paused = true)]
    async fn test_init_enables_tx_for_ports_present_at_boot() {
        let (mock, mut monitor) = setup(BoardType::Osfp64Sfp2, &[66]);
        monitor.initialize().await.unwrap();

        assert_eq!(
            mock.writes(),
            vec![("port66/tx_enable".to_string(), "1".to_string())]
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_read_failure_propagates_and_keeps_snapshot() {
        let (mock, mut monitor) = setup(BoardType::Osfp64, &[1]);
        monitor.initialize().await.unwrap();

        set_present(&mock, monitor.layout(), &[1, 50]);
        mock.fail_reads("present_hi");
        assert!(monitor.poll(1000).await.is_err());
        assert!(!monitor.is_present(50).unwrap());

        mock.restore("present_hi");
        let outcome = monitor.poll(1000).await.unwrap();
        assert_eq!(outcome.changes, expected(&[(50, '1')]));
    }

    /// Hook that fails a configurable number of times, then records calls
    struct FlakyHook {
        failures_left: Mutex<u32>,
        calls: Arc<Mutex<Vec<(PortIndex, PresenceChange)>>>,
    }

    #[async_trait]
    impl TransitionHook for FlakyHook {
        fn name(&self) -> &'static str {
            "flaky"
        }

        async fn on_transition(
            &self,
            _source: &dyn RegisterSource,
            port: PortIndex,
            change: PresenceChange,
        ) -> Result<()> {
            let mut failures = self.failures_left.lock().unwrap();
            if *failures > 0 {
                *failures -= 1;
                return Err(SfpMonError::Other("hook failed".to_string()));
            }
            self.calls.lock().unwrap().push((port, change));
            Ok(())
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_hook_failure_leaves_snapshot_for_retry() {
        let (mock, monitor) = setup(BoardType::Qsfp36, &[]);
        let calls = Arc::new(Mutex::new(Vec::new()));
        let mut monitor = monitor.with_hook(Box::new(FlakyHook {
            failures_left: Mutex::new(1),
            calls: calls.clone(),
        }));
        monitor.initialize().await.unwrap();

        set_present(&mock, monitor.layout(), &[20]);
        assert!(monitor.poll(1000).await.is_err());
        assert!(!monitor.is_present(20).unwrap());

        let outcome = monitor.poll(1000).await.unwrap();
        assert_eq!(outcome.changes, expected(&[(20, '1')]));
        assert_eq!(*calls.lock().unwrap(), vec![(20, PresenceChange::Inserted)]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_largest_timeout_has_a_deadline() {
        let (mock, mut monitor) = setup(BoardType::Qsfp36, &[]);
        monitor.initialize().await.unwrap();

        set_present(&mock, monitor.layout(), &[2]);
        let outcome = monitor.poll(i64::MAX).await.unwrap();
        assert!(outcome.found);
        assert_eq!(outcome.changes, expected(&[(2, '1')]));
    }

    #[tokio::test(start_paused = true)]
    async fn test_failed_hook_write_does_not_repeat_completed_ports() {
        let (mock, mut monitor) = setup(BoardType::Osfp64Sfp2, &[]);
        monitor.initialize().await.unwrap();

        set_present(&mock, monitor.layout(), &[65, 66]);
        mock.fail_writes("port66/tx_enable");
        assert!(monitor.poll(1000).await.is_err());
        assert!(!monitor.is_present(65).unwrap());

        mock.restore("port66/tx_enable");
        let outcome = monitor.poll(1000).await.unwrap();
        assert_eq!(outcome.changes, expected(&[(65, '1'), (66, '1')]));
        assert_eq!(mock.writes_to("port65/tx_enable"), vec!["1".to_string()]);
        assert_eq!(mock.writes_to("port66/tx_enable"), vec!["1".to_string()]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_reverted_transition_is_hooked_again() {
        let (mock, mut monitor) = setup(BoardType::Osfp64Sfp2, &[]);
        monitor.initialize().await.unwrap();

        set_present(&mock, monitor.layout(), &[65, 66]);
        mock.fail_writes("port66/tx_enable");
        assert!(monitor.poll(1000).await.is_err());

        // Port 65 pulled before the retry, then inserted again
        set_present(&mock, monitor.layout(), &[66]);
        assert!(monitor.poll(1000).await.is_err());
        mock.restore("port66/tx_enable");
        set_present(&mock, monitor.layout(), &[65, 66]);
        let outcome = monitor.poll(1000).await.unwrap();

        assert_eq!(outcome.changes, expected(&[(65, '1'), (66, '1')]));
        assert_eq!(
            mock.writes_to("port65/tx_enable"),
            vec!["1".to_string(), "1".to_string()]
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_every_port_pair_flips_together() {
        let (mock, mut monitor) = setup(BoardType::Qsfp32Sfp2, &[]);
        monitor.initialize().await.unwrap();

        for port in (1..34).step_by(2) {
            let pair = [port, port + 1];
            set_present(&mock, monitor.layout(), &pair);
            let outcome = monitor.poll(1000).await.unwrap();
            assert_eq!(outcome.changes, expected(&[(port, '1'), (port + 1, '1')]));

            set_present(&mock, monitor.layout(), &[]);
            let outcome = monitor.poll(1000).await.unwrap();
            assert_eq!(outcome.changes, expected(&[(port, '0'), (port + 1, '0')]));
        }
    }

    #[test]
    fn test_zero_poll_interval_rejected() {
        let layout = BoardType::Qsfp36.to_layout().unwrap();
        let timing = MonitorTiming {
            settle_delay: Duration::ZERO,
            poll_interval: Duration::ZERO,
        };
        let result = TransceiverMonitor::with_timing(layout, Arc::new(MockRegisterSource::new()), timing);
        assert!(matches!(result, Err(SfpMonError::InvalidInput(_))));
    }

    #[test]
    fn test_invalid_layout_rejected() {
        let mut layout = BoardType::Qsfp36.to_layout().unwrap();
        layout.port_count = 0;
        assert!(TransceiverMonitor::new(layout, Arc::new(MockRegisterSource::new())).is_err());
    }

    #[test]
    fn test_is_present_out_of_range() {
        let layout = BoardType::Qsfp36.to_layout().unwrap();
        let monitor = TransceiverMonitor::new(layout, Arc::new(MockRegisterSource::new())).unwrap();
        assert!(matches!(
            monitor.is_present(37),
            Err(SfpMonError::InvalidPort { port: 37, max: 36 })
        ));
    }

    #[test]
    fn test_timing_from_config() {
        let config = MonitorConfig {
            settle_delay_ms: 250,
            poll_interval_ms: 100,
            check_timeout_ms: 0,
        };
        let timing = MonitorTiming::from(&config);
        assert_eq!(timing.settle_delay, Duration::from_millis(250));
        assert_eq!(timing.poll_interval, Duration::from_millis(100));
    }
}
