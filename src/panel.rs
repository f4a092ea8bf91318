use std::time::{Duration, Instant};

use tracing::debug;

use crate::audio::{AudioManager, Cue, PlayOptions};
use crate::config;
use crate::sched::{Scheduler, Slot};
use crate::state::{
    Banner, IffStatus, OptionGroup, PanelState, Readouts, Selections, WeaponStatus,
};

/// Firing cadence for a target profile.
#[derive(Clone, Copy, Debug)]
pub struct FireRate {
    pub fire_interval: Duration,
    /// Shots per burst; `None` fires without pausing.
    pub burst_size: Option<u32>,
    pub pause_after_burst: Option<Duration>,
}

/// Displayed values and gauge levels captured before a self-test, restored
/// verbatim when the sequence completes.
#[derive(Clone, Copy, Debug)]
struct TestSnapshot {
    readouts: Readouts,
    temp_level: f64,
    rxm_level: f64,
}

/// The weapon-system controller: owns the panel state, the cue dispatcher,
/// and one scheduler slot per timer-driven loop. All mutation happens in
/// response to `activate` (UI events) or `pump` (due timers).
pub struct WeaponSystem {
    pub state: PanelState,
    pub selections: Selections,
    sched: Scheduler,
    audio: AudioManager,
    shot_counter: u32,
    test_step: u32,
    test_snapshot: Option<TestSnapshot>,
}

impl WeaponSystem {
    pub fn new(audio: AudioManager) -> Self {
        WeaponSystem {
            state: PanelState::default(),
            selections: Selections::default(),
            sched: Scheduler::new(),
            audio,
            shot_counter: 0,
            test_step: 0,
            test_snapshot: None,
        }
    }

    /// Earliest pending timer, for the event-loop poll timeout.
    pub fn next_deadline(&self) -> Option<Instant> {
        self.sched.next_deadline()
    }

    /// Activates an option, exactly as a pointer click or Enter/Space on
    /// the focused option would.
    pub fn activate(&mut self, group: OptionGroup, index: usize, now: Instant) {
        self.audio.play(Cue::ButtonClick, PlayOptions::default());
        self.selections.select_index(group, index);
        match group {
            OptionGroup::IffStatus => {
                if self.selections.iff == IffStatus::Test {
                    self.run_test_sequence(now);
                } else {
                    self.simulate_engagement(now);
                }
            }
            // Scan-band tint is derived from these selections by the view;
            // nothing else reacts to them.
            OptionGroup::SpectralProfile | OptionGroup::TargetSelect => {}
            _ => self.simulate_engagement(now),
        }
    }

    /// Runs every timer loop that has come due.
    pub fn pump(&mut self, now: Instant) {
        for slot in self.sched.pop_due(now) {
            match slot {
                Slot::Firing => self.fire_tick(now),
                Slot::BurstPause => self.start_firing(now),
                Slot::Cooldown => self.cooldown_tick(),
                Slot::TestRamp => self.test_ramp_tick(),
                Slot::TestFinish => self.test_finish(now),
                Slot::TestHide => self.test_hide(),
            }
        }
    }

    /// Re-evaluates the weapon/IFF combination after a selection change.
    fn simulate_engagement(&mut self, now: Instant) {
        let armed = self.selections.weapon == WeaponStatus::Armed;
        let engaged = self.selections.iff == IffStatus::Engaged;
        if armed && engaged {
            self.state.temp_level = config::FIRING_TEMP_LEVEL;
            self.state.paused = false;
            self.start_firing(now);
            // Low ammo is flagged the moment the weapon goes hot, not only
            // after the first shot.
            self.check_critical_status();
        } else if self.selections.weapon == WeaponStatus::Safe {
            self.stop_firing(now);
            self.state.paused = true;
            self.selections.iff = IffStatus::Search;
            self.state.rxm_level = 0.0;
            self.state.temp_level = config::DEFAULT_TEMP_LEVEL;
        } else {
            self.stop_firing(now);
            self.state.paused = true;
            self.state.rxm_level = 0.0;
        }
    }

    /// Cadence for the currently selected target profile.
    pub fn fire_rate(&self) -> FireRate {
        use crate::state::TargetProfile::*;
        match self.selections.target_profile {
            Soft => FireRate {
                fire_interval: Duration::from_millis(500),
                burst_size: Some(1),
                pause_after_burst: None,
            },
            Standard => FireRate {
                fire_interval: Duration::from_millis(100),
                burst_size: Some(3),
                pause_after_burst: Some(Duration::from_millis(200)),
            },
            Hard => FireRate {
                fire_interval: Duration::from_millis(50),
                burst_size: None,
                pause_after_burst: None,
            },
            Default => FireRate {
                fire_interval: Duration::from_millis(300),
                burst_size: Some(1),
                pause_after_burst: None,
            },
        }
    }

    /// Starts (or restarts) the firing loop. The scheduler slot guarantees
    /// at most one active loop regardless of how this is reached.
    fn start_firing(&mut self, now: Instant) {
        self.sched.cancel(Slot::BurstPause);
        if !self.state.paused {
            self.state.target_rounds = 0;
            self.state.target_time = 0.0;
        }
        self.shot_counter = 0;
        let rate = self.fire_rate();
        self.sched.schedule_repeating(Slot::Firing, rate.fire_interval, now);
        debug!(interval_ms = rate.fire_interval.as_millis() as u64, "firing loop armed");
    }

    /// One firing tick: spend a round, derive time, heat the gauges.
    fn fire_tick(&mut self, now: Instant) {
        let rate = self.fire_rate();
        if !self.state.paused && self.state.current_rounds > 0 {
            self.state.current_rounds -= 1;
            self.state.current_time = config::DEFAULT_TIME * self.state.current_rounds as f64
                / config::DEFAULT_ROUNDS as f64;
            self.state.readouts.rounds = self.state.current_rounds;
            self.state.readouts.time = self.state.current_time;
            self.state.rxm_level = (self.state.rxm_level + config::RXM_PER_SHOT).min(100.0);
            self.state.temp_level =
                (self.state.temp_level + config::TEMP_PER_SHOT).min(config::MAX_FIRING_TEMP);
            self.check_critical_status();
            self.shot_counter += 1;
            if let (Some(burst), Some(pause)) = (rate.burst_size, rate.pause_after_burst) {
                if self.shot_counter >= burst {
                    self.sched.cancel(Slot::Firing);
                    self.sched.schedule_once(Slot::BurstPause, pause, now);
                    self.shot_counter = 0;
                }
            }
        }
        if self.state.current_rounds == 0 {
            self.state.current_time = 0.0;
            self.state.readouts.rounds = 0;
            self.state.readouts.time = 0.0;
            self.stop_firing(now);
            self.selections.weapon = WeaponStatus::Safe;
            self.selections.iff = IffStatus::Search;
        }
    }

    /// Stops firing and always (re)starts the cooldown decay.
    fn stop_firing(&mut self, now: Instant) {
        self.sched.cancel(Slot::Firing);
        self.sched.cancel(Slot::BurstPause);
        self.sched.schedule_repeating(
            Slot::Cooldown,
            Duration::from_millis(config::GAUGE_UPDATE_INTERVAL_MS),
            now,
        );
        if self.state.current_rounds == 0 {
            self.deactivate_critical_warning();
            self.audio.play(Cue::GameOver, PlayOptions::default());
        }
    }

    /// Linear decay toward the gauge floors; self-cancels once both arrive.
    fn cooldown_tick(&mut self) {
        self.state.temp_level =
            (self.state.temp_level - config::COOLDOWN_TEMP_STEP).max(config::DEFAULT_TEMP_LEVEL);
        self.state.rxm_level =
            (self.state.rxm_level - config::COOLDOWN_RXM_STEP).max(config::DEFAULT_RXM_LEVEL);
        if self.state.temp_level <= config::DEFAULT_TEMP_LEVEL
            && self.state.rxm_level <= config::DEFAULT_RXM_LEVEL
        {
            self.sched.cancel(Slot::Cooldown);
        }
    }

    fn check_critical_status(&mut self) {
        if self.state.current_rounds <= config::LOW_AMMO_THRESHOLD && self.state.current_rounds > 0
        {
            self.activate_critical_warning();
        } else if self.state.current_rounds == 0 {
            self.deactivate_critical_warning();
        }
    }

    fn activate_critical_warning(&mut self) {
        if self.state.warning_active {
            return;
        }
        self.state.warning_active = true;
        self.audio.play(
            Cue::CriticalWarning,
            PlayOptions {
                looped: true,
                volume: 1.0,
            },
        );
        self.state.banner = Banner::Critical;
    }

    fn deactivate_critical_warning(&mut self) {
        if !self.state.warning_active {
            return;
        }
        self.state.warning_active = false;
        self.audio.stop(Cue::CriticalWarning);
        if self.state.banner == Banner::Critical {
            self.state.banner = Banner::Hidden;
        }
    }

    /// Starts the timed self-test: gauges ramp up and back down while the
    /// readouts blink, then everything displayed is restored. Re-entering
    /// while a test is running is a no-op.
    fn run_test_sequence(&mut self, now: Instant) {
        if self.state.in_test_mode {
            return;
        }
        self.state.in_test_mode = true;
        self.test_snapshot = Some(TestSnapshot {
            readouts: self.state.readouts,
            temp_level: self.state.temp_level,
            rxm_level: self.state.rxm_level,
        });
        self.stop_firing(now);
        // The ramp owns the gauges for the duration of the test.
        self.sched.cancel(Slot::Cooldown);
        self.deactivate_critical_warning();
        self.state.readouts.blinking = true;
        self.state.banner = Banner::Testing;
        self.test_step = 0;
        self.sched.schedule_repeating(
            Slot::TestRamp,
            Duration::from_millis(config::TEST_STEP_INTERVAL_MS),
            now,
        );
        self.sched.schedule_once(
            Slot::TestFinish,
            Duration::from_millis(config::TEST_SEQUENCE_DURATION_MS),
            now,
        );
        debug!("self-test started");
    }

    /// Discrete gauge steps: up for ten ticks, back down for ten more.
    fn test_ramp_tick(&mut self) {
        let Some(snapshot) = self.test_snapshot else {
            self.sched.cancel(Slot::TestRamp);
            return;
        };
        self.test_step += 1;
        let step = self.test_step;
        if step <= 10 {
            self.state.temp_level = (snapshot.temp_level + step as f64 * 7.0).min(100.0);
            self.state.rxm_level = (step as f64 * 10.0).min(100.0);
        } else if step <= 20 {
            self.state.temp_level = (100.0 - (step - 10) as f64 * 7.0).max(snapshot.temp_level);
            self.state.rxm_level = (100.0 - (step - 10) as f64 * 10.0).max(snapshot.rxm_level);
        }
        if step >= 20 {
            self.sched.cancel(Slot::TestRamp);
        }
    }

    /// End of the ramp window: show the completion styling briefly.
    fn test_finish(&mut self, now: Instant) {
        self.sched.cancel(Slot::TestRamp);
        self.state.banner = Banner::Complete;
        self.sched.schedule_once(
            Slot::TestHide,
            Duration::from_millis(config::TEST_COMPLETE_DISPLAY_MS),
            now,
        );
    }

    /// Tear-down: restore what was displayed before the test and return the
    /// IFF group to SEARCH.
    fn test_hide(&mut self) {
        self.state.banner = Banner::Hidden;
        if let Some(snapshot) = self.test_snapshot.take() {
            self.state.readouts = snapshot.readouts;
            self.state.temp_level = snapshot.temp_level;
            self.state.rxm_level = snapshot.rxm_level;
        }
        self.state.readouts.blinking = false;
        self.selections.iff = IffStatus::Search;
        self.state.in_test_mode = false;
        debug!("self-test complete");
    }

    #[cfg(test)]
    fn is_scheduled(&self, slot: Slot) -> bool {
        self.sched.is_scheduled(slot)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::TargetProfile;

    fn ms(n: u64) -> Duration {
        Duration::from_millis(n)
    }

    fn armed_system(now: Instant) -> WeaponSystem {
        let mut system = WeaponSystem::new(AudioManager::muted());
        system.activate(OptionGroup::WeaponStatus, 0, now); // ARMED
        system.activate(OptionGroup::IffStatus, 1, now); // ENGAGED
        system
    }

    #[test]
    fn standard_burst_fires_three_then_pauses() {
        let t0 = Instant::now();
        let mut system = armed_system(t0);
        assert_eq!(system.selections.target_profile, TargetProfile::Standard);

        system.pump(t0 + ms(100));
        system.pump(t0 + ms(200));
        system.pump(t0 + ms(300));
        assert_eq!(system.state.current_rounds, 497);
        let expected = config::DEFAULT_TIME * 497.0 / config::DEFAULT_ROUNDS as f64;
        assert!((system.state.current_time - expected).abs() < 1e-9);

        // Firing is paused for 200 ms after the burst; no shot at 400 ms.
        assert!(!system.is_scheduled(Slot::Firing));
        assert!(system.is_scheduled(Slot::BurstPause));
        system.pump(t0 + ms(400));
        assert_eq!(system.state.current_rounds, 497);

        // Pause elapses at 500 ms, the next shot lands one interval later.
        system.pump(t0 + ms(500));
        assert!(system.is_scheduled(Slot::Firing));
        system.pump(t0 + ms(600));
        assert_eq!(system.state.current_rounds, 496);
    }

    #[test]
    fn firing_heats_gauges_with_caps() {
        let t0 = Instant::now();
        let mut system = armed_system(t0);
        assert_eq!(system.state.temp_level, config::FIRING_TEMP_LEVEL);
        system.pump(t0 + ms(100));
        assert_eq!(system.state.temp_level, config::FIRING_TEMP_LEVEL + 0.5);
        assert_eq!(system.state.rxm_level, 1.0);

        system.state.temp_level = config::MAX_FIRING_TEMP;
        system.state.rxm_level = 100.0;
        system.pump(t0 + ms(200));
        assert_eq!(system.state.temp_level, config::MAX_FIRING_TEMP);
        assert_eq!(system.state.rxm_level, 100.0);
    }

    #[test]
    fn low_ammo_warning_is_inclusive_of_threshold() {
        let t0 = Instant::now();
        let mut system = WeaponSystem::new(AudioManager::muted());
        system.state.current_rounds = config::LOW_AMMO_THRESHOLD;
        system.activate(OptionGroup::WeaponStatus, 0, t0);
        system.activate(OptionGroup::IffStatus, 1, t0);
        assert!(system.state.warning_active, "warning must trip at exactly 100 rounds");
        assert_eq!(system.state.banner, Banner::Critical);
    }

    #[test]
    fn ammo_never_goes_negative_and_forces_safe() {
        let t0 = Instant::now();
        let mut system = WeaponSystem::new(AudioManager::muted());
        system.state.current_rounds = 1;
        system.activate(OptionGroup::TargetProfile, 2, t0); // HARD, no pauses
        system.activate(OptionGroup::WeaponStatus, 0, t0);
        system.activate(OptionGroup::IffStatus, 1, t0);

        system.pump(t0 + ms(50));
        assert_eq!(system.state.current_rounds, 0);
        assert_eq!(system.state.readouts.rounds, 0);
        assert_eq!(system.state.readouts.time, 0.0);
        assert_eq!(system.selections.weapon, WeaponStatus::Safe);
        assert_eq!(system.selections.iff, IffStatus::Search);
        assert!(!system.is_scheduled(Slot::Firing));
        assert!(!system.state.warning_active);

        // Depletion stops the loop outright; later ticks change nothing.
        system.pump(t0 + ms(100));
        assert_eq!(system.state.current_rounds, 0);
    }

    #[test]
    fn cooldown_reaches_floors_and_self_cancels() {
        let t0 = Instant::now();
        let mut system = WeaponSystem::new(AudioManager::muted());
        system.state.temp_level = 90.0;
        system.state.rxm_level = 100.0;
        system.stop_firing(t0);

        let mut ticks = 0;
        let mut now = t0;
        while system.is_scheduled(Slot::Cooldown) {
            now += ms(config::GAUGE_UPDATE_INTERVAL_MS);
            system.pump(now);
            ticks += 1;
            assert!(ticks < 100, "cooldown must terminate");
        }
        assert_eq!(system.state.temp_level, config::DEFAULT_TEMP_LEVEL);
        assert_eq!(system.state.rxm_level, config::DEFAULT_RXM_LEVEL);
        assert_eq!(ticks, 12);
    }

    #[test]
    fn safe_resets_iff_and_gauges() {
        let t0 = Instant::now();
        let mut system = armed_system(t0);
        system.pump(t0 + ms(100));
        system.activate(OptionGroup::WeaponStatus, 1, t0 + ms(150)); // SAFE
        assert_eq!(system.selections.iff, IffStatus::Search);
        assert_eq!(system.state.rxm_level, 0.0);
        assert_eq!(system.state.temp_level, config::DEFAULT_TEMP_LEVEL);
        assert!(!system.is_scheduled(Slot::Firing));
        assert!(system.is_scheduled(Slot::Cooldown));
        assert!(system.state.paused);
    }

    #[test]
    fn armed_without_engagement_zeroes_rxm_but_keeps_temp() {
        let t0 = Instant::now();
        let mut system = armed_system(t0);
        for i in 1..=3 {
            system.pump(t0 + ms(100 * i));
        }
        let temp = system.state.temp_level;
        system.activate(OptionGroup::IffStatus, 0, t0 + ms(350)); // SEARCH
        assert_eq!(system.state.rxm_level, 0.0);
        assert_eq!(system.state.temp_level, temp);
        assert!(!system.is_scheduled(Slot::Firing));
    }

    #[test]
    fn test_sequence_ramps_and_restores_displays() {
        let t0 = Instant::now();
        let mut system = WeaponSystem::new(AudioManager::muted());
        let original = system.state.readouts;
        system.activate(OptionGroup::IffStatus, 2, t0); // TEST
        assert!(system.state.in_test_mode);
        assert_eq!(system.state.banner, Banner::Testing);
        assert!(system.state.readouts.blinking);

        // Ramp up: ten steps of +7 temp / +10 rxm.
        let mut now = t0;
        for _ in 0..10 {
            now += ms(config::TEST_STEP_INTERVAL_MS);
            system.pump(now);
        }
        assert_eq!(system.state.temp_level, 100.0);
        assert_eq!(system.state.rxm_level, 100.0);

        // Completion styling after the full duration.
        system.pump(t0 + ms(config::TEST_SEQUENCE_DURATION_MS));
        assert_eq!(system.state.banner, Banner::Complete);

        // Banner hides and the pre-test displays come back.
        system.pump(
            t0 + ms(config::TEST_SEQUENCE_DURATION_MS + config::TEST_COMPLETE_DISPLAY_MS),
        );
        assert_eq!(system.state.banner, Banner::Hidden);
        assert_eq!(system.state.readouts, original);
        assert_eq!(system.state.temp_level, config::DEFAULT_TEMP_LEVEL);
        assert_eq!(system.state.rxm_level, config::DEFAULT_RXM_LEVEL);
        assert_eq!(system.selections.iff, IffStatus::Search);
        assert!(!system.state.in_test_mode);
    }

    #[test]
    fn reentering_test_mode_is_a_no_op() {
        let t0 = Instant::now();
        let mut system = WeaponSystem::new(AudioManager::muted());
        system.activate(OptionGroup::IffStatus, 2, t0);
        system.pump(t0 + ms(config::TEST_STEP_INTERVAL_MS));
        let mid_test = system.state.clone();
        system.activate(OptionGroup::IffStatus, 2, t0 + ms(200));
        assert_eq!(system.state.temp_level, mid_test.temp_level);
        assert_eq!(system.state.banner, Banner::Testing);
        // The original sequence still finishes on its own schedule.
        system.pump(t0 + ms(config::TEST_SEQUENCE_DURATION_MS));
        assert_eq!(system.state.banner, Banner::Complete);
    }

    #[test]
    fn restarting_firing_replaces_the_loop() {
        let t0 = Instant::now();
        let mut system = armed_system(t0);
        // Re-activating ENGAGED restarts the loop instead of stacking one.
        system.activate(OptionGroup::IffStatus, 1, t0 + ms(50));
        system.pump(t0 + ms(100));
        assert_eq!(system.state.current_rounds, config::DEFAULT_ROUNDS,
            "restart moved the first shot to 150 ms");
        system.pump(t0 + ms(150));
        assert_eq!(system.state.current_rounds, config::DEFAULT_ROUNDS - 1);
    }
}
