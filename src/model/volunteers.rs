//! Volunteer registration row for the `volunteers` table.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub const TABLE: &str = "volunteers";

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Volunteer {
    pub id: Uuid,
    pub owner_id: Uuid,
    pub full_name: String,
    pub roll_no: String,
    pub campus: Campus,
    pub event: String,
    /// Free-text availability, e.g. "weekends, after 5pm".
    pub availability: String,
    pub hours_available: u32,
    /// Blob store key of the profile photo.
    pub profile_image_key: Option<String>,
    pub status: VolunteerStatus,
    pub created_at: NaiveDateTime,
}

/// The fixed set of campuses volunteers register against.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Campus {
    #[serde(rename = "Main Campus - Korangi")]
    KorangiMain,
    #[serde(rename = "North Nazimabad")]
    NorthNazimabad,
    Gulshan,
    Malir,
    #[serde(rename = "FB Area")]
    FbArea,
    Saddar,
    Landhi,
    #[serde(rename = "Orangi Town")]
    OrangiTown,
    #[serde(rename = "Shah Faisal")]
    ShahFaisal,
    #[serde(rename = "Surjani Town")]
    SurjaniTown,
}

impl Campus {
    pub const ALL: [Campus; 10] = [
        Campus::KorangiMain,
        Campus::NorthNazimabad,
        Campus::Gulshan,
        Campus::Malir,
        Campus::FbArea,
        Campus::Saddar,
        Campus::Landhi,
        Campus::OrangiTown,
        Campus::ShahFaisal,
        Campus::SurjaniTown,
    ];

    pub fn as_str(&self) -> &str {
        match self {
            Self::KorangiMain => "Main Campus - Korangi",
            Self::NorthNazimabad => "North Nazimabad",
            Self::Gulshan => "Gulshan",
            Self::Malir => "Malir",
            Self::FbArea => "FB Area",
            Self::Saddar => "Saddar",
            Self::Landhi => "Landhi",
            Self::OrangiTown => "Orangi Town",
            Self::ShahFaisal => "Shah Faisal",
            Self::SurjaniTown => "Surjani Town",
        }
    }
}

impl std::fmt::Display for Campus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum VolunteerStatus {
    Pending,
    Approved,
    Rejected,
}

impl VolunteerStatus {
    pub const INITIAL: VolunteerStatus = VolunteerStatus::Pending;

    pub fn as_str(&self) -> &str {
        match self {
            Self::Pending => "Pending",
            Self::Approved => "Approved",
            Self::Rejected => "Rejected",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "Pending" => Some(Self::Pending),
            "Approved" => Some(Self::Approved),
            "Rejected" => Some(Self::Rejected),
            _ => None,
        }
    }
}

impl std::fmt::Display for VolunteerStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
