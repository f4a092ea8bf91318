use crate::config;

/// Weapon master status.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum WeaponStatus {
    Armed,
    Safe,
}

/// IFF interrogation status.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum IffStatus {
    Search,
    Engaged,
    Test,
}

/// Target hardness profile; controls the fire rate.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum TargetProfile {
    Soft,
    Standard,
    Hard,
    Default,
}

/// Which target the scan band tracks.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum TargetSelect {
    InfraRed,
    Uv,
    MultiSpec,
}

/// Spectral imaging profile.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum SpectralProfile {
    Inert,
    InfraRed,
    Uv,
    MultiSpec,
}

impl WeaponStatus {
    pub const ALL: [WeaponStatus; 2] = [WeaponStatus::Armed, WeaponStatus::Safe];

    pub fn label(self) -> &'static str {
        match self {
            WeaponStatus::Armed => "ARMED",
            WeaponStatus::Safe => "SAFE",
        }
    }
}

impl IffStatus {
    pub const ALL: [IffStatus; 3] = [IffStatus::Search, IffStatus::Engaged, IffStatus::Test];

    pub fn label(self) -> &'static str {
        match self {
            IffStatus::Search => "SEARCH",
            IffStatus::Engaged => "ENGAGED",
            IffStatus::Test => "TEST",
        }
    }
}

impl TargetProfile {
    pub const ALL: [TargetProfile; 4] = [
        TargetProfile::Soft,
        TargetProfile::Standard,
        TargetProfile::Hard,
        TargetProfile::Default,
    ];

    pub fn label(self) -> &'static str {
        match self {
            TargetProfile::Soft => "SOFT",
            TargetProfile::Standard => "STANDARD",
            TargetProfile::Hard => "HARD",
            TargetProfile::Default => "DEFAULT",
        }
    }
}

impl TargetSelect {
    pub const ALL: [TargetSelect; 3] = [
        TargetSelect::InfraRed,
        TargetSelect::Uv,
        TargetSelect::MultiSpec,
    ];

    pub fn label(self) -> &'static str {
        match self {
            TargetSelect::InfraRed => "INFRA RED",
            TargetSelect::Uv => "UV",
            TargetSelect::MultiSpec => "MULTI SPEC",
        }
    }
}

impl SpectralProfile {
    pub const ALL: [SpectralProfile; 4] = [
        SpectralProfile::Inert,
        SpectralProfile::InfraRed,
        SpectralProfile::Uv,
        SpectralProfile::MultiSpec,
    ];

    pub fn label(self) -> &'static str {
        match self {
            SpectralProfile::Inert => "INERT",
            SpectralProfile::InfraRed => "INFRA RED",
            SpectralProfile::Uv => "UV",
            SpectralProfile::MultiSpec => "MULTI SPEC",
        }
    }
}

/// The five mutually exclusive option groups on the panel.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum OptionGroup {
    WeaponStatus,
    IffStatus,
    TargetProfile,
    TargetSelect,
    SpectralProfile,
}

impl OptionGroup {
    pub const ALL: [OptionGroup; 5] = [
        OptionGroup::WeaponStatus,
        OptionGroup::IffStatus,
        OptionGroup::TargetProfile,
        OptionGroup::TargetSelect,
        OptionGroup::SpectralProfile,
    ];

    pub fn title(self) -> &'static str {
        match self {
            OptionGroup::WeaponStatus => "WEAPON STATUS",
            OptionGroup::IffStatus => "IFF STATUS",
            OptionGroup::TargetProfile => "TARGET PROFILE",
            OptionGroup::TargetSelect => "TARGET SELECT",
            OptionGroup::SpectralProfile => "SPECTRAL PROFILE",
        }
    }

    pub fn len(self) -> usize {
        match self {
            OptionGroup::WeaponStatus => WeaponStatus::ALL.len(),
            OptionGroup::IffStatus => IffStatus::ALL.len(),
            OptionGroup::TargetProfile => TargetProfile::ALL.len(),
            OptionGroup::TargetSelect => TargetSelect::ALL.len(),
            OptionGroup::SpectralProfile => SpectralProfile::ALL.len(),
        }
    }

    pub fn label(self, index: usize) -> &'static str {
        match self {
            OptionGroup::WeaponStatus => WeaponStatus::ALL[index].label(),
            OptionGroup::IffStatus => IffStatus::ALL[index].label(),
            OptionGroup::TargetProfile => TargetProfile::ALL[index].label(),
            OptionGroup::TargetSelect => TargetSelect::ALL[index].label(),
            OptionGroup::SpectralProfile => SpectralProfile::ALL[index].label(),
        }
    }
}

/// Selection state of every mutually exclusive option group. This is the
/// source of truth; the view renders from it rather than the other way
/// around.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct Selections {
    pub weapon: WeaponStatus,
    pub iff: IffStatus,
    pub target_profile: TargetProfile,
    pub target_select: TargetSelect,
    pub spectral: SpectralProfile,
}

impl Default for Selections {
    fn default() -> Self {
        Selections {
            weapon: WeaponStatus::Safe,
            iff: IffStatus::Search,
            target_profile: TargetProfile::Standard,
            target_select: TargetSelect::MultiSpec,
            spectral: SpectralProfile::Inert,
        }
    }
}

impl Selections {
    /// Index of the selected option within a group.
    pub fn selected_index(&self, group: OptionGroup) -> usize {
        match group {
            OptionGroup::WeaponStatus => {
                WeaponStatus::ALL.iter().position(|v| *v == self.weapon)
            }
            OptionGroup::IffStatus => IffStatus::ALL.iter().position(|v| *v == self.iff),
            OptionGroup::TargetProfile => {
                TargetProfile::ALL.iter().position(|v| *v == self.target_profile)
            }
            OptionGroup::TargetSelect => {
                TargetSelect::ALL.iter().position(|v| *v == self.target_select)
            }
            OptionGroup::SpectralProfile => {
                SpectralProfile::ALL.iter().position(|v| *v == self.spectral)
            }
        }
        .unwrap_or(0)
    }

    /// Moves the selection marker; exactly one option per group is selected.
    pub fn select_index(&mut self, group: OptionGroup, index: usize) {
        match group {
            OptionGroup::WeaponStatus => self.weapon = WeaponStatus::ALL[index],
            OptionGroup::IffStatus => self.iff = IffStatus::ALL[index],
            OptionGroup::TargetProfile => self.target_profile = TargetProfile::ALL[index],
            OptionGroup::TargetSelect => self.target_select = TargetSelect::ALL[index],
            OptionGroup::SpectralProfile => self.spectral = SpectralProfile::ALL[index],
        }
    }
}

/// Readout text state. Kept separate from the live counters because the
/// self-test blinks and then restores what was *displayed*, not what the
/// counters hold.
#[derive(Clone, Copy, PartialEq, Debug)]
pub struct Readouts {
    pub rounds: u32,
    pub time: f64,
    pub blinking: bool,
}

/// Critical-warning banner contents.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Banner {
    Hidden,
    Critical,
    Testing,
    Complete,
}

/// Mutable weapon-system record. Created once at startup and mutated only
/// by the controller in response to UI events and scheduler ticks.
#[derive(Clone, Debug)]
pub struct PanelState {
    pub current_rounds: u32,
    pub current_time: f64,
    pub temp_level: f64,
    pub rxm_level: f64,
    pub target_rounds: u32,
    pub target_time: f64,
    pub warning_active: bool,
    pub in_test_mode: bool,
    pub paused: bool,
    pub readouts: Readouts,
    pub banner: Banner,
}

impl Default for PanelState {
    fn default() -> Self {
        PanelState {
            current_rounds: config::DEFAULT_ROUNDS,
            current_time: config::DEFAULT_TIME,
            temp_level: config::DEFAULT_TEMP_LEVEL,
            rxm_level: config::DEFAULT_RXM_LEVEL,
            target_rounds: config::DEFAULT_ROUNDS,
            target_time: config::DEFAULT_TIME,
            warning_active: false,
            in_test_mode: false,
            paused: false,
            readouts: Readouts {
                rounds: config::DEFAULT_ROUNDS,
                time: config::DEFAULT_TIME,
                blinking: false,
            },
            banner: Banner::Hidden,
        }
    }
}

/// Formats elapsed time as zero-padded seconds and centiseconds.
pub fn format_time(time: f64) -> String {
    format!("{:05.2}", time.max(0.0))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn time_formatting_pads_both_fields() {
        assert_eq!(format_time(33.33), "33.33");
        assert_eq!(format_time(7.05), "07.05");
        assert_eq!(format_time(0.0), "00.00");
        assert_eq!(format_time(9.5), "09.50");
    }
}
