use std::path::Path;

use serde::Deserialize;

/// What clears the "new" badge on grades. The original left the flags sticky
/// forever; the policy is explicit here so the choice is configuration, not
/// accident.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum GradeAckPolicy {
    /// `grades.acknowledge` clears the flags.
    Explicit,
    /// Listing the grades clears the flags after they are reported once.
    OnView,
    /// Flags stay set.
    Never,
}

impl GradeAckPolicy {
    fn parse(s: &str) -> Result<Self, String> {
        match s {
            "explicit" => Ok(Self::Explicit),
            "on-view" => Ok(Self::OnView),
            "never" => Ok(Self::Never),
            _ => Err(format!(
                "{:?} is not a grade_ack policy (explicit, on-view, never)",
                s
            )),
        }
    }
}

#[derive(Deserialize)]
struct ConfigFile {
    grade_ack: Option<String>,
}

#[derive(Debug, Clone)]
pub struct Cfg {
    pub grade_ack: GradeAckPolicy,
}

impl Default for Cfg {
    fn default() -> Self {
        Self {
            grade_ack: GradeAckPolicy::Explicit,
        }
    }
}

impl Cfg {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, String> {
        let file_contents = std::fs::read_to_string(path.as_ref())
            .map_err(|e| format!("Unable to read config file: {}", &e))?;
        let cf: ConfigFile = toml::from_str(&file_contents)
            .map_err(|e| format!("Unable to deserialize config file: {}", &e))?;

        let mut c = Self::default();
        if let Some(s) = cf.grade_ack {
            c.grade_ack = GradeAckPolicy::parse(&s)?;
        }
        Ok(c)
    }

    /// `$DNEVNIKD_CONFIG` wins; otherwise `./dnevnikd.toml` when present;
    /// otherwise defaults. A broken config file is logged and ignored rather
    /// than taking the daemon down.
    pub fn load() -> Self {
        let path = match std::env::var("DNEVNIKD_CONFIG") {
            Ok(p) => p,
            Err(_) => {
                if Path::new("dnevnikd.toml").is_file() {
                    "dnevnikd.toml".to_owned()
                } else {
                    return Self::default();
                }
            }
        };
        match Self::from_file(&path) {
            Ok(cfg) => cfg,
            Err(e) => {
                log::warn!("config {:?} ignored: {}", &path, &e);
                Self::default()
            }
        }
    }
}
