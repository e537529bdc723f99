use boda_shared::models::{Invitado, InvitadoPor, PlantillaSlug, Rol, SubPregunta, UsuarioPublico};
use chrono::NaiveDate;
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::BTreeMap;

/// Distinguishes "field absent" (`None`) from "field explicitly null"
/// (`Some(OptionalField::Null)`) in PATCH payloads.
#[derive(Debug, Clone, PartialEq)]
pub enum OptionalField<T> {
    Value(T),
    Null,
}

impl<'de, T: Deserialize<'de>> Deserialize<'de> for OptionalField<T> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Ok(match Option::<T>::deserialize(deserializer)? {
            Some(value) => OptionalField::Value(value),
            None => OptionalField::Null,
        })
    }
}

impl<T> OptionalField<T> {
    pub fn into_option(self) -> Option<T> {
        match self {
            OptionalField::Value(v) => Some(v),
            OptionalField::Null => None,
        }
    }
}

fn deserialize_optional_field<'de, D, T>(deserializer: D) -> Result<Option<OptionalField<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Ok(Some(OptionalField::deserialize(deserializer)?))
}

// Auth

#[derive(Deserialize, Debug)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Serialize, Debug)]
pub struct LoginResponse {
    pub token: String,
    pub usuario: UsuarioPublico,
}

#[derive(Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct CreateUserRequest {
    pub nombre: String,
    pub email: String,
    pub password: String,
    pub tipo_usuario: Rol,
    #[serde(default)]
    pub boda_id: Option<String>,
}

// Bodas

#[derive(Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct CreateBodaRequest {
    pub nombre: String,
    #[serde(default)]
    pub fecha: Option<NaiveDate>,
    #[serde(default)]
    pub ubicacion: Option<String>,
    #[serde(default)]
    pub telefono_contacto: Option<String>,
    #[serde(default)]
    pub detalles: Option<String>,
}

#[derive(Deserialize, Debug, Default)]
#[serde(rename_all = "camelCase")]
pub struct UpdateBodaRequest {
    #[serde(default)]
    pub nombre: Option<String>,
    #[serde(default, deserialize_with = "deserialize_optional_field")]
    pub fecha: Option<OptionalField<NaiveDate>>,
    #[serde(default, deserialize_with = "deserialize_optional_field")]
    pub ubicacion: Option<OptionalField<String>>,
    #[serde(default, deserialize_with = "deserialize_optional_field")]
    pub telefono_contacto: Option<OptionalField<String>>,
    #[serde(default, deserialize_with = "deserialize_optional_field")]
    pub detalles: Option<OptionalField<String>>,
}

// Guests

#[derive(Deserialize, Debug, Default)]
pub struct PageQuery {
    #[serde(default)]
    pub page: Option<usize>,
    #[serde(default)]
    pub limit: Option<usize>,
    #[serde(default)]
    pub search: Option<String>,
}

#[derive(Serialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct GuestPageResponse {
    pub invitados: Vec<Invitado>,
    pub total: usize,
    pub pagina: usize,
    pub limite: usize,
    pub total_paginas: usize,
}

#[derive(Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct CreateGuestRequest {
    pub boda_id: String,
    pub nombre: String,
    pub telefono: String,
    #[serde(default)]
    pub invitado_por: Option<InvitadoPor>,
    #[serde(default)]
    pub num_acompanantes: Option<u32>,
}

#[derive(Deserialize, Debug, Default)]
#[serde(rename_all = "camelCase")]
pub struct UpdateGuestRequest {
    #[serde(default)]
    pub nombre: Option<String>,
    #[serde(default)]
    pub telefono: Option<String>,
    #[serde(default, deserialize_with = "deserialize_optional_field")]
    pub invitado_por: Option<OptionalField<InvitadoPor>>,
    #[serde(default, deserialize_with = "deserialize_optional_field")]
    pub confirmado: Option<OptionalField<bool>>,
    #[serde(default)]
    pub num_acompanantes: Option<u32>,
}

/// What a guest may change about themselves from the panel.
#[derive(Deserialize, Debug, Default)]
#[serde(rename_all = "camelCase")]
pub struct PanelUpdateRequest {
    #[serde(default, deserialize_with = "deserialize_optional_field")]
    pub confirmado: Option<OptionalField<bool>>,
    #[serde(default)]
    pub num_acompanantes: Option<u32>,
}

#[derive(Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct FilterRequest {
    pub boda_id: String,
    pub pregunta_id: String,
    pub respuesta: String,
}

#[derive(Deserialize, Serialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct AnswerInput {
    pub pregunta_id: String,
    pub respuesta: String,
    #[serde(default)]
    pub subrespuesta: Option<String>,
}

#[derive(Deserialize, Debug)]
pub struct AnswersRequest {
    pub respuestas: Vec<AnswerInput>,
}

#[derive(Serialize, Debug)]
pub struct MagicLinkResponse {
    pub enlace: String,
    pub token: String,
}

#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct DuplicateGuest {
    pub nombre: String,
    pub telefono: String,
}

#[derive(Serialize, Debug)]
pub struct RowError {
    pub fila: usize,
    pub motivo: String,
}

#[derive(Serialize, Debug)]
pub struct ImportResponse {
    pub creados: Vec<Invitado>,
    pub duplicados: Vec<DuplicateGuest>,
    pub errores: Vec<RowError>,
}

/// The wedding details a guest sees in their panel.
#[derive(Serialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct PanelBoda {
    pub nombre: String,
    pub fecha: Option<NaiveDate>,
    pub ubicacion: Option<String>,
    pub detalles: Option<String>,
}

// Questions

#[derive(Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct CreatePreguntaRequest {
    pub boda_id: String,
    pub pregunta: String,
    pub opciones: Vec<String>,
    #[serde(default)]
    pub obligatoria: bool,
    #[serde(default)]
    pub es_confirmacion: bool,
    #[serde(default)]
    pub subpregunta: Option<SubPregunta>,
}

/// Full replacement of a question. `version`, when sent, must match the stored one.
#[derive(Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct UpdatePreguntaRequest {
    pub pregunta: String,
    pub opciones: Vec<String>,
    #[serde(default)]
    pub obligatoria: bool,
    #[serde(default)]
    pub es_confirmacion: bool,
    #[serde(default)]
    pub subpregunta: Option<SubPregunta>,
    #[serde(default)]
    pub version: Option<u64>,
}

#[derive(Deserialize, Serialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ModoAsignacion {
    Todos,
    Lista,
    Invitado,
}

#[derive(Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct AssignRequest {
    pub modo: ModoAsignacion,
    #[serde(default)]
    pub lista_id: Option<String>,
    #[serde(default)]
    pub invitado_id: Option<String>,
}

#[derive(Serialize, Debug)]
pub struct AssignResponse {
    pub asignados: usize,
    pub actualizados: usize,
    pub total: usize,
}

// Broadcast lists

#[derive(Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct CreateListaRequest {
    pub boda_id: String,
    pub nombre: String,
    pub invitados: Vec<String>,
}

/// Full replacement of name and membership.
#[derive(Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct UpdateListaRequest {
    pub nombre: String,
    pub invitados: Vec<String>,
    #[serde(default)]
    pub version: Option<u64>,
}

// Templates

#[derive(Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct CreatePlantillaRequest {
    pub boda_id: String,
    pub nombre: String,
    pub contenido: String,
    #[serde(default)]
    pub slug: PlantillaSlug,
}

#[derive(Deserialize, Debug, Default)]
#[serde(rename_all = "camelCase")]
pub struct UpdatePlantillaRequest {
    #[serde(default)]
    pub nombre: Option<String>,
    #[serde(default)]
    pub contenido: Option<String>,
    #[serde(default)]
    pub slug: Option<PlantillaSlug>,
}

#[derive(Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct RenderRequest {
    pub invitado_id: String,
}

// Invitations

#[derive(Deserialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct InvitationTarget {
    pub nombre: String,
    pub telefono: String,
    #[serde(default)]
    pub invitado_por: Option<InvitadoPor>,
}

#[derive(Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct SendInvitationsRequest {
    pub boda_id: String,
    #[serde(default)]
    pub plantilla_id: Option<String>,
    #[serde(default)]
    pub mensaje: Option<String>,
    pub invitados: Vec<InvitationTarget>,
}

#[derive(Serialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct InvitationResult {
    pub nombre: String,
    pub telefono: String,
    pub invitado_id: Option<String>,
    pub ok: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[derive(Serialize, Debug)]
pub struct SendInvitationsResponse {
    pub enviados: usize,
    pub fallidos: usize,
    pub resultados: Vec<InvitationResult>,
}

// Statistics

#[derive(Serialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct PreguntaStats {
    pub pregunta_id: String,
    pub pregunta: String,
    pub sin_responder: usize,
    pub conteo: BTreeMap<String, usize>,
}

#[derive(Serialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct BodaStats {
    pub total_invitados: usize,
    pub confirmados: usize,
    pub rechazados: usize,
    pub pendientes: usize,
    /// Confirmed guests plus their companions.
    pub asistentes_confirmados: u32,
    pub preguntas: Vec<PreguntaStats>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_optional_field_distinguishes_null_from_absent() {
        let absent: UpdateGuestRequest = serde_json::from_str("{}").unwrap();
        assert!(absent.confirmado.is_none());

        let null: UpdateGuestRequest = serde_json::from_str(r#"{"confirmado": null}"#).unwrap();
        assert_eq!(null.confirmado, Some(OptionalField::Null));

        let value: UpdateGuestRequest = serde_json::from_str(r#"{"confirmado": true}"#).unwrap();
        assert_eq!(value.confirmado, Some(OptionalField::Value(true)));
    }
}
