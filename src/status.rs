use std::fmt;
use std::str::FromStr;

use serde_derive::{Deserialize, Serialize};

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[serde(rename_all = "UPPERCASE")]
pub enum Status {
    Attentive,
    Writing,
    Inattentive,
    Sleeping,
}

impl Status {
    pub const ALL: [Status; 4] = [
        Status::Attentive,
        Status::Writing,
        Status::Inattentive,
        Status::Sleeping,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Status::Attentive => "ATTENTIVE",
            Status::Writing => "WRITING",
            Status::Inattentive => "INATTENTIVE",
            Status::Sleeping => "SLEEPING",
        }
    }

    /// Attentive and writing both count as engaged.
    #[inline]
    pub fn is_engaged(&self) -> bool {
        matches!(self, Status::Attentive | Status::Writing)
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Status {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Status::ALL
            .iter()
            .copied()
            .find(|st| st.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| format!("unknown status `{}`", s))
    }
}
