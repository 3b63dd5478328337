use std::fmt;

/// Where a finished action may send the user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Location {
    BriefingDetail(String),
}

impl Location {
    pub fn path(&self) -> String {
        match self {
            Self::BriefingDetail(id) => format!("/briefings/{id}"),
        }
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.path())
    }
}

/// Switches the current view. Implemented by the application shell.
pub trait Navigator: Send + Sync {
    fn navigate(&self, location: &Location) -> anyhow::Result<()>;
}
