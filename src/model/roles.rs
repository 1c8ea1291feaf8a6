use serde::Serialize;

/// Caregiver tier, resolved once per request by `classify_caregiver`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CaregiverRole {
    Admin,
    Specialist,
    GeneralPractitioner,
    Nurse,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Capability {
    VerdictBanner,
    StageCard,
    PerModelBreakdown,
    ExplanationDashboard,
    NursingChecklist,
    UserManagement,
}

pub fn capability_order() -> &'static [Capability] {
    &[
        Capability::VerdictBanner,
        Capability::StageCard,
        Capability::PerModelBreakdown,
        Capability::ExplanationDashboard,
        Capability::NursingChecklist,
        Capability::UserManagement,
    ]
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CapabilitySet {
    bits: u8,
}

impl CapabilitySet {
    pub fn empty() -> Self {
        Self { bits: 0 }
    }

    pub fn all() -> Self {
        capability_order().iter().copied().collect()
    }

    fn bit(cap: Capability) -> u8 {
        1 << (cap as u8)
    }

    pub fn with(mut self, cap: Capability) -> Self {
        self.bits |= Self::bit(cap);
        self
    }

    pub fn without(mut self, cap: Capability) -> Self {
        self.bits &= !Self::bit(cap);
        self
    }

    pub fn contains(&self, cap: Capability) -> bool {
        self.bits & Self::bit(cap) != 0
    }

    pub fn is_empty(&self) -> bool {
        self.bits == 0
    }

    pub fn to_vec(&self) -> Vec<Capability> {
        capability_order()
            .iter()
            .copied()
            .filter(|c| self.contains(*c))
            .collect()
    }
}

impl FromIterator<Capability> for CapabilitySet {
    fn from_iter<I: IntoIterator<Item = Capability>>(iter: I) -> Self {
        iter.into_iter().fold(Self::empty(), |set, cap| set.with(cap))
    }
}

impl Serialize for CapabilitySet {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.to_vec().serialize(serializer)
    }
}
