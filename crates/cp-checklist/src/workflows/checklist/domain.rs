use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Substituted for any answer that is absent or blank.
pub const PLACEHOLDER: &str = "N/A";

/// Identifier assigned to each accepted submission.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SubmissionId(pub String);

impl fmt::Display for SubmissionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Checklist answers exactly as posted by the inspection form.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChecklistSubmission {
    #[serde(default)]
    pub business_name: Option<String>,
    #[serde(default)]
    pub property_address: Option<String>,
    #[serde(default)]
    pub fire_safety_measures: Option<String>,
    #[serde(default)]
    pub security_systems: Option<String>,
    #[serde(default)]
    pub maintenance_schedule: Option<String>,
    #[serde(default)]
    pub selected_property: Option<String>,
    /// Identifier posted by the older form (`property1`..`property3`).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub property_id: Option<String>,
    #[serde(default)]
    pub parking_lot_lights: Option<String>,
    #[serde(default)]
    pub under_canopy_lights: Option<String>,
    #[serde(default)]
    pub parking_bumpers: Option<String>,
    #[serde(default)]
    pub dumpsters: Option<String>,
    #[serde(default)]
    pub water_leaks: Option<String>,
    #[serde(default)]
    pub dangerous_trees: Option<String>,
    #[serde(default)]
    pub trash_cans: Option<String>,
    #[serde(default)]
    pub broken_curbs: Option<String>,
    #[serde(default)]
    pub potholes: Option<String>,
    #[serde(default)]
    pub additional_notes: Option<String>,
}

fn answered(value: &Option<String>) -> Option<&str> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|text| !text.is_empty())
}

impl ChecklistSubmission {
    pub fn business_name(&self) -> Option<&str> {
        answered(&self.business_name)
    }

    pub fn property_address(&self) -> Option<&str> {
        answered(&self.property_address)
    }

    /// `selectedProperty` when answered, otherwise the legacy `propertyId`.
    pub fn selected_property(&self) -> Option<&str> {
        answered(&self.selected_property).or_else(|| answered(&self.property_id))
    }

    pub fn additional_notes(&self) -> Option<&str> {
        answered(&self.additional_notes)
    }

    pub fn risk_mitigation(&self, item: RiskMitigationItem) -> Option<&str> {
        match item {
            RiskMitigationItem::FireSafetyMeasures => answered(&self.fire_safety_measures),
            RiskMitigationItem::SecuritySystems => answered(&self.security_systems),
            RiskMitigationItem::MaintenanceSchedule => answered(&self.maintenance_schedule),
        }
    }

    pub fn condition(&self, check: ConditionCheck) -> Option<&str> {
        let value = match check {
            ConditionCheck::ParkingLotLights => &self.parking_lot_lights,
            ConditionCheck::UnderCanopyLights => &self.under_canopy_lights,
            ConditionCheck::ParkingBumpers => &self.parking_bumpers,
            ConditionCheck::Dumpsters => &self.dumpsters,
            ConditionCheck::WaterLeaks => &self.water_leaks,
            ConditionCheck::DangerousTrees => &self.dangerous_trees,
            ConditionCheck::TrashCans => &self.trash_cans,
            ConditionCheck::BrokenCurbs => &self.broken_curbs,
            ConditionCheck::Potholes => &self.potholes,
        };
        answered(value)
    }

    pub fn required(&self, field: RequiredField) -> Option<&str> {
        match field {
            RequiredField::BusinessName => self.business_name(),
            RequiredField::PropertyAddress => self.property_address(),
            RequiredField::FireSafetyMeasures => {
                self.risk_mitigation(RiskMitigationItem::FireSafetyMeasures)
            }
            RequiredField::SecuritySystems => {
                self.risk_mitigation(RiskMitigationItem::SecuritySystems)
            }
            RequiredField::MaintenanceSchedule => {
                self.risk_mitigation(RiskMitigationItem::MaintenanceSchedule)
            }
        }
    }
}

/// Fields that must be answered before a submission is accepted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum RequiredField {
    BusinessName,
    PropertyAddress,
    FireSafetyMeasures,
    SecuritySystems,
    MaintenanceSchedule,
}

impl RequiredField {
    pub const fn ordered() -> [Self; 5] {
        [
            Self::BusinessName,
            Self::PropertyAddress,
            Self::FireSafetyMeasures,
            Self::SecuritySystems,
            Self::MaintenanceSchedule,
        ]
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::BusinessName => "Business Name",
            Self::PropertyAddress => "Property Address",
            Self::FireSafetyMeasures => "Fire Safety Measures",
            Self::SecuritySystems => "Security Systems",
            Self::MaintenanceSchedule => "Maintenance Schedule",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum RiskMitigationItem {
    FireSafetyMeasures,
    SecuritySystems,
    MaintenanceSchedule,
}

impl RiskMitigationItem {
    pub const fn ordered() -> [Self; 3] {
        [
            Self::FireSafetyMeasures,
            Self::SecuritySystems,
            Self::MaintenanceSchedule,
        ]
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::FireSafetyMeasures => "Fire Safety Measures",
            Self::SecuritySystems => "Security Systems",
            Self::MaintenanceSchedule => "Maintenance Schedule",
        }
    }
}

/// Site walk-through checks captured by the inspection form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ConditionCheck {
    ParkingLotLights,
    UnderCanopyLights,
    ParkingBumpers,
    Dumpsters,
    WaterLeaks,
    DangerousTrees,
    TrashCans,
    BrokenCurbs,
    Potholes,
}

impl ConditionCheck {
    pub const fn ordered() -> [Self; 9] {
        [
            Self::ParkingLotLights,
            Self::UnderCanopyLights,
            Self::ParkingBumpers,
            Self::Dumpsters,
            Self::WaterLeaks,
            Self::DangerousTrees,
            Self::TrashCans,
            Self::BrokenCurbs,
            Self::Potholes,
        ]
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::ParkingLotLights => "Parking Lot Lights",
            Self::UnderCanopyLights => "Under Canopy Lights",
            Self::ParkingBumpers => "Parking Bumpers",
            Self::Dumpsters => "Dumpsters",
            Self::WaterLeaks => "Water Leaks",
            Self::DangerousTrees => "Trees Requiring Attention",
            Self::TrashCans => "Trash Cans",
            Self::BrokenCurbs => "Broken Curbs",
            Self::Potholes => "Potholes",
        }
    }

    /// Question shown to the inspector for this check.
    pub const fn prompt(self) -> &'static str {
        match self {
            Self::ParkingLotLights => "Parking lot lights - any burned out?",
            Self::UnderCanopyLights => {
                "Under canopy lights / tenant signs, are they illuminated?"
            }
            Self::ParkingBumpers => "Parking bumpers, any out of place or rebar sticking up?",
            Self::Dumpsters => "Dumpsters, trash thrown about?",
            Self::WaterLeaks => "Water leaks?",
            Self::DangerousTrees => {
                "Trees that look like they are going to fall or need trimming?"
            }
            Self::TrashCans => "Trash cans, overflowing?",
            Self::BrokenCurbs => "Broken parking lot curbing?",
            Self::Potholes => "Major potholes in the asphalt or other major repairs?",
        }
    }
}

/// The accepted submission held by the store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmissionRecord {
    pub submission_id: SubmissionId,
    pub received_at: DateTime<Local>,
    pub submission: ChecklistSubmission,
}

impl SubmissionRecord {
    pub fn property_label(&self) -> &str {
        self.submission
            .selected_property()
            .unwrap_or("Unknown Property")
    }
}
