//! Raw request payloads and their validation into repository inputs.
//!
//! # Invariants
//! - Validation trims/normalizes before measuring lengths.
//! - Lengths are counted in characters, not bytes.
//! - A child must name its team; there is no fallback team.

use crate::model::age::{parse_birth_date, today_local};
use crate::model::child::{normalize_person_name, NewChild, PaymentStatus, PhysicalState};
use crate::model::team::{NewTeam, TeamId, DEFAULT_TEAM_COLOR};
use chrono::NaiveDate;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::Deserialize;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::ops::RangeInclusive;

const TEAM_NAME_CHARS: RangeInclusive<usize> = 2..=100;
const TEAM_DESCRIPTION_MAX_CHARS: usize = 500;
const PERSON_NAME_CHARS: RangeInclusive<usize> = 2..=50;

static HEX_COLOR: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^#[0-9A-Fa-f]{6}$").expect("hex color pattern is valid"));

static PERSON_NAME: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[a-zA-ZáéíóúÁÉÍÓÚàèìòùÀÈÌÒÙäëïöüÄËÏÖÜâêîôûÂÊÎÔÛñÑçÇ\s'\-]+$")
        .expect("person name pattern is valid")
});

/// Input-level rule violations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    TeamNameLength { chars: usize },
    DescriptionTooLong { chars: usize },
    InvalidColor(String),
    PersonNameLength { field: &'static str, chars: usize },
    PersonNameCharacters { field: &'static str },
    InvalidBirthDate(String),
    BirthDateInFuture(NaiveDate),
    UnknownPhysicalState(String),
    UnknownPaymentStatus(String),
    MissingTeam,
    SameTeam(TeamId),
}

impl Display for ValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::TeamNameLength { chars } => write!(
                f,
                "team name must have {}-{} characters, got {chars}",
                TEAM_NAME_CHARS.start(),
                TEAM_NAME_CHARS.end()
            ),
            Self::DescriptionTooLong { chars } => write!(
                f,
                "description must have at most {TEAM_DESCRIPTION_MAX_CHARS} characters, got {chars}"
            ),
            Self::InvalidColor(value) => write!(f, "color `{value}` is not #RRGGBB"),
            Self::PersonNameLength { field, chars } => write!(
                f,
                "{field} must have {}-{} characters, got {chars}",
                PERSON_NAME_CHARS.start(),
                PERSON_NAME_CHARS.end()
            ),
            Self::PersonNameCharacters { field } => write!(
                f,
                "{field} may only contain letters, spaces, hyphens and apostrophes"
            ),
            Self::InvalidBirthDate(value) => write!(f, "`{value}` is not a valid date"),
            Self::BirthDateInFuture(date) => write!(f, "birth date {date} is in the future"),
            Self::UnknownPhysicalState(value) => write!(f, "unknown estado_fisico `{value}`"),
            Self::UnknownPaymentStatus(value) => write!(f, "unknown condicion_pago `{value}`"),
            Self::MissingTeam => write!(f, "team_id is required"),
            Self::SameTeam(id) => write!(f, "source and destination team are both {id}"),
        }
    }
}

impl Error for ValidationError {}

/// Team create/update payload as received from callers.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct TeamInput {
    pub nombre: String,
    #[serde(default)]
    pub descripcion: Option<String>,
    #[serde(default)]
    pub color: Option<String>,
}

impl TeamInput {
    pub fn validate(&self) -> Result<NewTeam, ValidationError> {
        let nombre = self.nombre.trim().to_string();
        let chars = nombre.chars().count();
        if !TEAM_NAME_CHARS.contains(&chars) {
            return Err(ValidationError::TeamNameLength { chars });
        }

        let descripcion = self
            .descripcion
            .as_deref()
            .map(str::trim)
            .filter(|value| !value.is_empty())
            .map(str::to_string);
        if let Some(value) = descripcion.as_deref() {
            let chars = value.chars().count();
            if chars > TEAM_DESCRIPTION_MAX_CHARS {
                return Err(ValidationError::DescriptionTooLong { chars });
            }
        }

        let color = match self.color.as_deref().map(str::trim) {
            None | Some("") => DEFAULT_TEAM_COLOR.to_string(),
            Some(value) if HEX_COLOR.is_match(value) => value.to_ascii_uppercase(),
            Some(value) => return Err(ValidationError::InvalidColor(value.to_string())),
        };

        Ok(NewTeam {
            nombre,
            descripcion,
            color,
        })
    }
}

/// Child create/update/import payload as received from callers.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct ChildInput {
    pub nombre: String,
    pub apellido: String,
    pub fecha_nacimiento: String,
    #[serde(default)]
    pub estado_fisico: Option<String>,
    #[serde(default)]
    pub condicion_pago: Option<String>,
    #[serde(default)]
    pub team_id: Option<TeamId>,
}

impl ChildInput {
    pub fn validate(&self) -> Result<NewChild, ValidationError> {
        self.validate_on(today_local())
    }

    /// Validates with `today` as the latest acceptable birth date.
    pub fn validate_on(&self, today: NaiveDate) -> Result<NewChild, ValidationError> {
        let nombre = validate_person_name("nombre", &self.nombre)?;
        let apellido = validate_person_name("apellido", &self.apellido)?;

        let fecha_nacimiento = parse_birth_date(&self.fecha_nacimiento)
            .ok_or_else(|| ValidationError::InvalidBirthDate(self.fecha_nacimiento.clone()))?;
        if fecha_nacimiento > today {
            return Err(ValidationError::BirthDateInFuture(fecha_nacimiento));
        }

        let estado_fisico = match non_blank(self.estado_fisico.as_deref()) {
            Some(value) => PhysicalState::parse(value)
                .ok_or_else(|| ValidationError::UnknownPhysicalState(value.to_string()))?,
            None => PhysicalState::default(),
        };
        let condicion_pago = match non_blank(self.condicion_pago.as_deref()) {
            Some(value) => PaymentStatus::parse(value)
                .ok_or_else(|| ValidationError::UnknownPaymentStatus(value.to_string()))?,
            None => PaymentStatus::default(),
        };

        let team_id = self.team_id.ok_or(ValidationError::MissingTeam)?;

        Ok(NewChild {
            nombre,
            apellido,
            fecha_nacimiento,
            estado_fisico,
            condicion_pago,
            team_id,
        })
    }
}

fn validate_person_name(field: &'static str, value: &str) -> Result<String, ValidationError> {
    let normalized = normalize_person_name(value);
    let chars = normalized.chars().count();
    if !PERSON_NAME_CHARS.contains(&chars) {
        return Err(ValidationError::PersonNameLength { field, chars });
    }
    if !PERSON_NAME.is_match(&normalized) {
        return Err(ValidationError::PersonNameCharacters { field });
    }
    Ok(normalized)
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|value| !value.is_empty())
}
