// src/status.rs
use serde::{Deserialize, Serialize};
use std::fmt;

/// Attendance outcome for one shift, always derived from the raw fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Status {
    OnTime,
    Late,
    Missed,
    Abandoned,
    NotStarted,
}

/// How a status is presented in tables and exports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct StatusDisplay {
    pub label: &'static str,
    pub background_hex: &'static str,
    pub rgb: (u8, u8, u8),
    pub icon: &'static str,
}

impl Status {
    pub const ALL: [Status; 5] = [
        Status::OnTime,
        Status::Late,
        Status::Missed,
        Status::Abandoned,
        Status::NotStarted,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            Status::OnTime => "On Time",
            Status::Late => "Late",
            Status::Missed => "Missed",
            Status::Abandoned => "Abandoned",
            Status::NotStarted => "Not started",
        }
    }

    pub fn display(&self) -> StatusDisplay {
        let label = self.label();
        match self {
            Status::OnTime => StatusDisplay {
                label,
                background_hex: "#D4F3D1",
                rgb: (212, 243, 209),
                icon: "check-circle",
            },
            Status::Late => StatusDisplay {
                label,
                background_hex: "#FFE2B8",
                rgb: (255, 226, 184),
                icon: "clock",
            },
            Status::Missed => StatusDisplay {
                label,
                background_hex: "#F8B4B4",
                rgb: (248, 180, 180),
                icon: "x-circle",
            },
            Status::Abandoned => StatusDisplay {
                label,
                background_hex: "#F8B4B4",
                rgb: (248, 180, 180),
                icon: "circle-minus",
            },
            Status::NotStarted => StatusDisplay {
                label,
                background_hex: "#D1D5DB",
                rgb: (209, 213, 219),
                icon: "x-circle",
            },
        }
    }

    /// Counted under the dashboard's "Absent" figure.
    pub fn is_absent(&self) -> bool {
        matches!(self, Status::Missed | Status::NotStarted)
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}
