use thiserror::Error;

#[derive(Error, Debug)]
pub enum LaneJudgeError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse settings: {0}")]
    SettingsParse(#[from] toml::de::Error),

    #[error("Failed to write settings: {0}")]
    SettingsWrite(#[from] toml::ser::Error),

    #[error("Replay encode error: {0}")]
    ReplayEncode(#[from] bincode::error::EncodeError),

    #[error("Replay decode error: {0}")]
    ReplayDecode(#[from] bincode::error::DecodeError),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("No replay stored for beatmap {0}")]
    ReplayNotFound(String),
}

pub type Result<T> = std::result::Result<T, LaneJudgeError>;
