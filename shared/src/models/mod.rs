use chrono::{NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::text::fold;

/// Current time as an RFC 3339 string, the format every record timestamp uses.
pub fn now_str() -> String {
    Utc::now().to_rfc3339()
}

/// Minimum number of fixed-choice options a question (or sub-question) needs.
pub const MIN_OPCIONES: usize = 2;

/// Minimum length of a broadcast list name.
pub const MIN_NOMBRE_LISTA: usize = 3;

/// The wedding event. Owns guests, questions, lists and templates.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Boda {
    #[serde(rename = "_id")]
    pub id: String,
    pub nombre: String,
    #[serde(default)]
    pub fecha: Option<NaiveDate>,
    #[serde(default)]
    pub ubicacion: Option<String>,
    #[serde(default)]
    pub telefono_contacto: Option<String>,
    #[serde(default)]
    pub detalles: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

/// Which side of the couple invited a guest.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum InvitadoPor {
    Novio,
    Novia,
}

impl FromStr for InvitadoPor {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match fold(s.trim()).as_str() {
            "novio" => Ok(InvitadoPor::Novio),
            "novia" => Ok(InvitadoPor::Novia),
            other => Err(format!("Invalid invitadoPor value: {}", other)),
        }
    }
}

/// Single-level follow-up question shown when the parent answer matches `condicion`.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SubPregunta {
    pub pregunta: String,
    pub opciones: Vec<String>,
    #[serde(default = "default_condicion")]
    pub condicion: String,
}

fn default_condicion() -> String {
    "si".to_string()
}

impl SubPregunta {
    /// Whether the follow-up applies to the given parent answer.
    /// Both sides are case and accent folded, so "Sí, claro" triggers "si".
    pub fn applies_to(&self, respuesta: &str) -> bool {
        fold(respuesta.trim()).starts_with(&fold(self.condicion.trim()))
    }
}

/// A question asked to guests.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Pregunta {
    #[serde(rename = "_id")]
    pub id: String,
    pub boda_id: String,
    pub pregunta: String,
    pub opciones: Vec<String>,
    #[serde(default)]
    pub obligatoria: bool,
    #[serde(default)]
    pub es_confirmacion: bool,
    #[serde(default)]
    pub subpregunta: Option<SubPregunta>,
    #[serde(default)]
    pub version: u64,
    pub created_at: String,
    pub updated_at: String,
}

impl Pregunta {
    pub fn has_option(&self, opcion: &str) -> bool {
        let wanted = fold(opcion.trim());
        self.opciones.iter().any(|o| fold(o.trim()) == wanted)
    }
}

/// Checks the structural rules every question must satisfy before it is stored:
/// non-empty prompt, at least two non-empty options, and a sub-question with its
/// own prompt and options when present.
pub fn validate_pregunta(
    pregunta: &str,
    opciones: &[String],
    subpregunta: Option<&SubPregunta>,
) -> Result<(), String> {
    if pregunta.trim().is_empty() {
        return Err("La pregunta no puede estar vacía".to_string());
    }

    let opciones_validas = opciones.iter().filter(|o| !o.trim().is_empty()).count();
    if opciones_validas < MIN_OPCIONES || opciones_validas != opciones.len() {
        return Err(format!(
            "La pregunta necesita al menos {} opciones y ninguna vacía",
            MIN_OPCIONES
        ));
    }

    if let Some(sub) = subpregunta {
        if sub.pregunta.trim().is_empty() {
            return Err("La subpregunta no puede estar vacía".to_string());
        }
        let sub_validas = sub.opciones.iter().filter(|o| !o.trim().is_empty()).count();
        if sub_validas < MIN_OPCIONES || sub_validas != sub.opciones.len() {
            return Err(format!(
                "La subpregunta necesita al menos {} opciones propias",
                MIN_OPCIONES
            ));
        }
    }

    Ok(())
}

/// A guest's answer record for one assigned question. Carries a snapshot of the
/// question as it was when assigned.
///
/// `preguntaId` is the canonical key. Older records stored the question id under
/// `_id`; those still deserialize and are written back with `preguntaId`.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Respuesta {
    #[serde(alias = "_id")]
    pub pregunta_id: String,
    pub pregunta: String,
    #[serde(default)]
    pub opciones: Vec<String>,
    #[serde(default)]
    pub obligatoria: bool,
    #[serde(default)]
    pub respuesta: Option<String>,
    #[serde(default)]
    pub subpregunta: Option<SubPregunta>,
    #[serde(default)]
    pub subrespuesta: Option<String>,
    #[serde(default)]
    pub asignada_at: Option<String>,
}

impl Respuesta {
    pub fn snapshot(pregunta: &Pregunta) -> Self {
        Self {
            pregunta_id: pregunta.id.clone(),
            pregunta: pregunta.pregunta.clone(),
            opciones: pregunta.opciones.clone(),
            obligatoria: pregunta.obligatoria,
            respuesta: None,
            subpregunta: pregunta.subpregunta.clone(),
            subrespuesta: None,
            asignada_at: Some(now_str()),
        }
    }
}

/// A guest of one wedding.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Invitado {
    #[serde(rename = "_id")]
    pub id: String,
    pub boda_id: String,
    pub nombre: String,
    pub telefono: String,
    #[serde(default)]
    pub invitado_por: Option<InvitadoPor>,
    /// `Some(true)` confirmed, `Some(false)` declined, `None` pending.
    #[serde(default)]
    pub confirmado: Option<bool>,
    #[serde(default)]
    pub num_acompanantes: u32,
    #[serde(default)]
    pub listas: Vec<String>,
    #[serde(default)]
    pub respuestas: Vec<Respuesta>,
    pub created_at: String,
    pub updated_at: String,
}

impl Invitado {
    pub fn new(boda_id: &str, nombre: &str, telefono: &str) -> Self {
        let now = now_str();
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            boda_id: boda_id.to_string(),
            nombre: nombre.trim().to_string(),
            telefono: telefono.to_string(),
            invitado_por: None,
            confirmado: None,
            num_acompanantes: 0,
            listas: vec![],
            respuestas: vec![],
            created_at: now.clone(),
            updated_at: now,
        }
    }

    pub fn respuesta(&self, pregunta_id: &str) -> Option<&Respuesta> {
        self.respuestas.iter().find(|r| r.pregunta_id == pregunta_id)
    }

    /// Adds the question to this guest, or refreshes the snapshot of an existing
    /// assignment while keeping the answer already given.
    /// Returns true when a new record was added.
    pub fn assign(&mut self, pregunta: &Pregunta) -> bool {
        let snapshot = Respuesta::snapshot(pregunta);
        match self
            .respuestas
            .iter_mut()
            .find(|r| r.pregunta_id == pregunta.id)
        {
            Some(existing) => {
                existing.pregunta = snapshot.pregunta;
                existing.opciones = snapshot.opciones;
                existing.obligatoria = snapshot.obligatoria;
                existing.subpregunta = snapshot.subpregunta;
                false
            }
            None => {
                self.respuestas.push(snapshot);
                true
            }
        }
    }

    /// Removes every answer record for the question. Returns true if any was removed.
    pub fn unassign(&mut self, pregunta_id: &str) -> bool {
        let before = self.respuestas.len();
        self.respuestas.retain(|r| r.pregunta_id != pregunta_id);
        before != self.respuestas.len()
    }
}

/// A named subset of a wedding's guests used to address messages and questions.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ListaDifusion {
    #[serde(rename = "_id")]
    pub id: String,
    pub boda_id: String,
    pub nombre: String,
    #[serde(default)]
    pub invitados: Vec<String>,
    #[serde(default)]
    pub version: u64,
    pub created_at: String,
    pub updated_at: String,
}

/// Reserved template kinds. At most one template per system slug and wedding.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "kebab-case")]
pub enum PlantillaSlug {
    PrimerContacto,
    Recordatorio,
    #[default]
    Custom,
}

impl PlantillaSlug {
    pub fn is_system(&self) -> bool {
        !matches!(self, PlantillaSlug::Custom)
    }
}

impl fmt::Display for PlantillaSlug {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let s = match self {
            PlantillaSlug::PrimerContacto => "primer-contacto",
            PlantillaSlug::Recordatorio => "recordatorio",
            PlantillaSlug::Custom => "custom",
        };
        write!(f, "{}", s)
    }
}

/// Message template with shortcode placeholders.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Plantilla {
    #[serde(rename = "_id")]
    pub id: String,
    pub boda_id: String,
    pub usuario_id: String,
    pub nombre: String,
    pub contenido: String,
    #[serde(default)]
    pub slug: PlantillaSlug,
    pub created_at: String,
    pub updated_at: String,
}

/// Roles carried in tokens. Stored users are only ever `Admin` or `Novio`;
/// `Invitado` identities come from magic links.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Rol {
    Admin,
    Novio,
    Invitado,
}

impl fmt::Display for Rol {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let s = match self {
            Rol::Admin => "admin",
            Rol::Novio => "novio",
            Rol::Invitado => "invitado",
        };
        write!(f, "{}", s)
    }
}

/// Dashboard user as stored. Never serialized to clients directly, see [`UsuarioPublico`].
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Usuario {
    #[serde(rename = "_id")]
    pub id: String,
    pub nombre: String,
    pub email: String,
    pub tipo_usuario: Rol,
    #[serde(default)]
    pub boda_id: Option<String>,
    pub password_hash: String,
    pub salt: String,
    pub created_at: String,
}

/// The user record as clients see and cache it.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct UsuarioPublico {
    #[serde(rename = "_id")]
    pub id: String,
    pub nombre: String,
    pub tipo_usuario: Rol,
    #[serde(default)]
    pub boda_id: Option<String>,
}

impl From<Usuario> for UsuarioPublico {
    fn from(u: Usuario) -> Self {
        Self {
            id: u.id,
            nombre: u.nombre,
            tipo_usuario: u.tipo_usuario,
            boda_id: u.boda_id,
        }
    }
}
