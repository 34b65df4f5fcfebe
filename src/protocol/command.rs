#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Ping,
    ModelsList,
    Analyze,
    Unknown,
}

impl From<&str> for Command {
    fn from(s: &str) -> Self {
        match s {
            "ping" => Command::Ping,
            "models.list" => Command::ModelsList,
            "analyze" => Command::Analyze,
            _ => Command::Unknown,
        }
    }
}
