use directories::UserDirs;
use log::info;
use serde::{Deserialize, Serialize};
use std::{
    fs,
    path::{Path, PathBuf},
};

use crate::axis::{AXIS_MAX, AXIS_MID, AXIS_MIN, AxisMapper, AxisRange, DEFAULT_DRAG_SPAN};
use crate::error::ConfigError;
use crate::frame::TouchWidth;

/// Highest user GPIO on the RP2040.
pub const MAX_PIN: u8 = 29;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Meta {
    pub name: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PinMap {
    pub dpad_up: u8,
    pub dpad_down: u8,
    pub dpad_left: u8,
    pub dpad_right: u8,
    pub button_b1: u8,
    pub button_b2: u8,
    pub button_b3: u8,
    pub button_b4: u8,
    pub button_l1: u8,
    pub button_r1: u8,
    pub button_l2: u8,
    pub button_r2: u8,
    pub button_s1: u8,
    pub button_s2: u8,
    pub button_l3: u8,
    pub button_r3: u8,
    pub button_a1: u8,
    pub button_a2: u8,
}

impl PinMap {
    fn named(&self) -> [(&'static str, u8); 18] {
        [
            ("dpad_up", self.dpad_up),
            ("dpad_down", self.dpad_down),
            ("dpad_left", self.dpad_left),
            ("dpad_right", self.dpad_right),
            ("button_b1", self.button_b1),
            ("button_b2", self.button_b2),
            ("button_b3", self.button_b3),
            ("button_b4", self.button_b4),
            ("button_l1", self.button_l1),
            ("button_r1", self.button_r1),
            ("button_l2", self.button_l2),
            ("button_r2", self.button_r2),
            ("button_s1", self.button_s1),
            ("button_s2", self.button_s2),
            ("button_l3", self.button_l3),
            ("button_r3", self.button_r3),
            ("button_a1", self.button_a1),
            ("button_a2", self.button_a2),
        ]
    }
}

impl Default for PinMap {
    fn default() -> Self {
        Self {
            dpad_up: 2,
            dpad_down: 3,
            dpad_right: 4,
            dpad_left: 5,
            button_b1: 6,
            button_b2: 7,
            button_r2: 8,
            button_l2: 9,
            button_b3: 10,
            button_b4: 11,
            button_r1: 12,
            button_l1: 13,
            button_s1: 16,
            button_s2: 17,
            button_l3: 18,
            button_r3: 19,
            button_a1: 20,
            button_a2: 21,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BoardOptions {
    /// 12 for one sensor, 32 for three.
    pub touch_width: u8,
    #[serde(default)]
    pub invert_y_axis: bool,
    #[serde(default)]
    pub settings_pin: Option<u8>,
    pub pins: PinMap,
}

impl Default for BoardOptions {
    fn default() -> Self {
        Self {
            touch_width: 12,
            invert_y_axis: false,
            settings_pin: None,
            pins: PinMap::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SliderOptions {
    pub drag_span: u8,
    pub axis_min: u16,
    pub axis_mid: u16,
    pub axis_max: u16,
}

impl Default for SliderOptions {
    fn default() -> Self {
        Self {
            drag_span: DEFAULT_DRAG_SPAN,
            axis_min: AXIS_MIN,
            axis_mid: AXIS_MID,
            axis_max: AXIS_MAX,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Profile {
    pub meta: Meta,
    pub board: BoardOptions,
    #[serde(default)]
    pub slider: SliderOptions,
}

impl Default for Profile {
    fn default() -> Self {
        Self {
            meta: Meta {
                name: Some("default".to_string()),
            },
            board: BoardOptions::default(),
            slider: SliderOptions::default(),
        }
    }
}

impl Profile {
    pub fn parse(text: &str, path: &Path) -> Result<Self, ConfigError> {
        let profile: Profile = toml::from_str(text).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        validate_profile(&profile)?;
        Ok(profile)
    }

    pub fn load_file(path: &Path) -> Result<Self, ConfigError> {
        let txt = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::parse(&txt, path)
    }

    /// Falls back to one sensor if the width was never validated.
    pub fn touch_width(&self) -> TouchWidth {
        TouchWidth::from_electrodes(self.board.touch_width).unwrap_or(TouchWidth::Single)
    }

    pub fn axis_mapper(&self) -> AxisMapper {
        AxisMapper::new(
            AxisRange {
                min: self.slider.axis_min,
                mid: self.slider.axis_mid,
                max: self.slider.axis_max,
            },
            self.slider.drag_span,
        )
    }
}

fn validate_profile(p: &Profile) -> Result<(), ConfigError> {
    let width = TouchWidth::from_electrodes(p.board.touch_width).ok_or_else(|| {
        ConfigError::Invalid(format!(
            "board.touch_width must be 12 or 32, got {}",
            p.board.touch_width
        ))
    })?;

    let s = &p.slider;
    if s.drag_span == 0 || s.drag_span > width.half() {
        return Err(ConfigError::Invalid(format!(
            "slider.drag_span must be in 1..={}, got {}",
            width.half(),
            s.drag_span
        )));
    }
    if !(s.axis_min < s.axis_mid && s.axis_mid < s.axis_max) {
        return Err(ConfigError::Invalid(format!(
            "slider axis range must satisfy min < mid < max, got {}/{}/{}",
            s.axis_min, s.axis_mid, s.axis_max
        )));
    }

    for (name, pin) in p.board.pins.named() {
        if pin > MAX_PIN {
            return Err(ConfigError::Invalid(format!(
                "board.pins.{name} = {pin} is not a GPIO (0..={MAX_PIN})"
            )));
        }
    }
    if let Some(pin) = p.board.settings_pin {
        if pin > MAX_PIN {
            return Err(ConfigError::Invalid(format!(
                "board.settings_pin = {pin} is not a GPIO (0..={MAX_PIN})"
            )));
        }
    }
    Ok(())
}

fn check_profile_name(name: &str) -> Result<(), ConfigError> {
    if name.is_empty() || name.starts_with('.') || name.contains(['/', '\\']) {
        return Err(ConfigError::Invalid(format!("invalid profile name '{name}'")));
    }
    Ok(())
}

fn default_profile_text() -> &'static str {
    include_str!("../profiles/default.toml")
}

/// Profiles on disk plus the name of the active one.
#[derive(Debug, Clone)]
pub struct ProfileStore {
    pub active_name: String,
    pub profile: Profile,
    pub profiles_dir: PathBuf,
    pub active_ptr: PathBuf,
}

pub fn config_dir() -> Result<PathBuf, ConfigError> {
    let dirs = UserDirs::new().ok_or(ConfigError::NoHome)?;
    Ok(dirs.home_dir().join(".config").join("slidepad"))
}

impl ProfileStore {
    pub fn load_or_install_default() -> Result<Self, ConfigError> {
        Self::open(config_dir()?)
    }

    /// Opens a store rooted at `cfgdir`, creating the default profile and the
    /// active pointer if they are missing.
    pub fn open(cfgdir: PathBuf) -> Result<Self, ConfigError> {
        let profdir = cfgdir.join("profiles");
        fs::create_dir_all(&profdir)?;

        let def_path = profdir.join("default.toml");
        if !def_path.exists() {
            fs::write(&def_path, default_profile_text())?;
            info!("installed default profile at {}", def_path.display());
        }

        let active_ptr = cfgdir.join("active");
        if !active_ptr.exists() {
            fs::write(&active_ptr, b"default")?;
        }

        let active_name = fs::read_to_string(&active_ptr)?.trim().to_string();
        check_profile_name(&active_name)?;
        let profile = Profile::load_file(&profdir.join(format!("{active_name}.toml")))?;
        info!("loaded profile '{active_name}'");

        Ok(Self {
            active_name,
            profile,
            profiles_dir: profdir,
            active_ptr,
        })
    }

    /// Path of profile `name`. Names are bare file stems; anything that could
    /// leave the profiles directory is rejected.
    pub fn profile_path(&self, name: &str) -> Result<PathBuf, ConfigError> {
        check_profile_name(name)?;
        Ok(self.profiles_dir.join(format!("{name}.toml")))
    }

    /// Loads a named profile without changing the active one.
    pub fn load(&self, name: &str) -> Result<Profile, ConfigError> {
        let p = self.profile_path(name)?;
        if !p.exists() {
            return Err(ConfigError::NotFound(p));
        }
        Profile::load_file(&p)
    }

    /// Switches the active profile. The pointer only moves if the profile
    /// parses and validates.
    pub fn set_active(&mut self, name: &str) -> Result<(), ConfigError> {
        let profile = self.load(name)?;
        fs::write(&self.active_ptr, name.as_bytes())?;
        self.active_name = name.to_string();
        self.profile = profile;
        info!("switched active profile to '{name}'");
        Ok(())
    }

    pub fn list_profiles(&self) -> Vec<String> {
        let mut v = Vec::new();
        if let Ok(rd) = fs::read_dir(&self.profiles_dir) {
            for e in rd.flatten() {
                let path = e.path();
                if path.extension().is_some_and(|ext| ext == "toml") {
                    if let Some(stem) = path.file_stem().and_then(|s| s.to_str()) {
                        v.push(stem.to_string());
                    }
                }
            }
        }
        v.sort();
        v
    }
}
