//! Child domain model.
//!
//! # Responsibility
//! - Define the child read model (with derived age) and the write payload.
//! - Own the text forms of `estado_fisico` / `condicion_pago`.
//!
//! # Invariants
//! - `edad` is derived from `fecha_nacimiento` at read time.
//! - Every write carries a `team_id`; only rows migrated from legacy files
//!   may read back without one.

use crate::model::team::TeamId;
use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

/// Storage-assigned child identifier.
pub type ChildId = i64;

/// Physical condition of a player.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum PhysicalState {
    #[default]
    #[serde(rename = "En forma")]
    EnForma,
    #[serde(rename = "Lesionado")]
    Lesionado,
}

impl PhysicalState {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::EnForma => "En forma",
            Self::Lesionado => "Lesionado",
        }
    }

    /// Case-insensitive parse of the stored/display text.
    pub fn parse(value: &str) -> Option<Self> {
        match fold(value).as_str() {
            "en forma" => Some(Self::EnForma),
            "lesionado" => Some(Self::Lesionado),
            _ => None,
        }
    }
}

/// Fee payment status.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum PaymentStatus {
    #[default]
    #[serde(rename = "Al dia")]
    AlDia,
    #[serde(rename = "En deuda")]
    EnDeuda,
}

impl PaymentStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::AlDia => "Al dia",
            Self::EnDeuda => "En deuda",
        }
    }

    /// Case-insensitive parse; the accented spelling `Al día` is accepted.
    pub fn parse(value: &str) -> Option<Self> {
        match fold(value).as_str() {
            "al dia" | "al día" => Some(Self::AlDia),
            "en deuda" => Some(Self::EnDeuda),
            _ => None,
        }
    }
}

fn fold(value: &str) -> String {
    value
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}

/// Child read model, joined with its team's display fields.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Child {
    pub id: ChildId,
    pub nombre: String,
    pub apellido: String,
    /// Serialized as `YYYY-MM-DD`.
    pub fecha_nacimiento: NaiveDate,
    /// Whole years, computed when the row was read.
    pub edad: u32,
    pub estado_fisico: PhysicalState,
    pub condicion_pago: PaymentStatus,
    pub team_id: Option<TeamId>,
    pub team_nombre: Option<String>,
    pub team_color: Option<String>,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

/// Mutable child fields, used for create, full-replace update and import.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewChild {
    pub nombre: String,
    pub apellido: String,
    pub fecha_nacimiento: NaiveDate,
    #[serde(default)]
    pub estado_fisico: PhysicalState,
    #[serde(default)]
    pub condicion_pago: PaymentStatus,
    pub team_id: TeamId,
}

impl NewChild {
    /// Payload with default physical state and payment status.
    pub fn new(
        nombre: impl Into<String>,
        apellido: impl Into<String>,
        fecha_nacimiento: NaiveDate,
        team_id: TeamId,
    ) -> Self {
        Self {
            nombre: nombre.into(),
            apellido: apellido.into(),
            fecha_nacimiento,
            estado_fisico: PhysicalState::default(),
            condicion_pago: PaymentStatus::default(),
            team_id,
        }
    }
}

/// Collapses runs of whitespace and trims both ends.
pub fn normalize_person_name(value: &str) -> String {
    value.split_whitespace().collect::<Vec<_>>().join(" ")
}

#[cfg(test)]
mod tests {
    use super::{normalize_person_name, PaymentStatus, PhysicalState};

    #[test]
    fn enum_parse_is_case_and_space_insensitive() {
        assert_eq!(
            PhysicalState::parse(" en  FORMA "),
            Some(PhysicalState::EnForma)
        );
        assert_eq!(
            PhysicalState::parse("Lesionado"),
            Some(PhysicalState::Lesionado)
        );
        assert_eq!(PhysicalState::parse("cansado"), None);

        assert_eq!(PaymentStatus::parse("Al día"), Some(PaymentStatus::AlDia));
        assert_eq!(
            PaymentStatus::parse("en deuda"),
            Some(PaymentStatus::EnDeuda)
        );
        assert_eq!(PaymentStatus::parse("pagado"), None);
    }

    #[test]
    fn enum_text_roundtrips_through_parse() {
        for state in [PhysicalState::EnForma, PhysicalState::Lesionado] {
            assert_eq!(PhysicalState::parse(state.as_str()), Some(state));
        }
        for status in [PaymentStatus::AlDia, PaymentStatus::EnDeuda] {
            assert_eq!(PaymentStatus::parse(status.as_str()), Some(status));
        }
    }

    #[test]
    fn person_name_whitespace_is_collapsed() {
        assert_eq!(normalize_person_name("  María   José \t"), "María José");
        assert_eq!(normalize_person_name(""), "");
    }
}
