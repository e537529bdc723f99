//! Question editing and assignment, validated before anything reaches the network.

use boda_shared::models::{validate_pregunta, Pregunta, SubPregunta};
use serde::Serialize;

use crate::error::{ClientError, Result};

#[derive(Serialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CreateQuestionInput {
    pub boda_id: String,
    pub pregunta: String,
    pub opciones: Vec<String>,
    pub obligatoria: bool,
    pub es_confirmacion: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub subpregunta: Option<SubPregunta>,
}

/// Full replacement of an existing question.
#[derive(Serialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct EditQuestionInput {
    #[serde(skip)]
    pub id: String,
    pub pregunta: String,
    pub opciones: Vec<String>,
    pub obligatoria: bool,
    pub es_confirmacion: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub subpregunta: Option<SubPregunta>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub version: Option<u64>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum QuestionInput {
    Create(CreateQuestionInput),
    Edit(EditQuestionInput),
}

impl QuestionInput {
    pub fn validate(&self) -> Result<()> {
        let (pregunta, opciones, subpregunta) = match self {
            QuestionInput::Create(c) => (&c.pregunta, &c.opciones, c.subpregunta.as_ref()),
            QuestionInput::Edit(e) => (&e.pregunta, &e.opciones, e.subpregunta.as_ref()),
        };
        validate_pregunta(pregunta, opciones, subpregunta).map_err(ClientError::Validation)
    }
}

/// Local editing state of a question form. Options are edited in place and
/// only trimmed when the draft is turned into an input.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct QuestionDraft {
    pub id: Option<String>,
    pub version: Option<u64>,
    pub pregunta: String,
    pub opciones: Vec<String>,
    pub obligatoria: bool,
    pub es_confirmacion: bool,
    pub subpregunta: Option<SubPregunta>,
}

impl QuestionDraft {
    /// An empty form with two blank options.
    pub fn new() -> Self {
        Self {
            opciones: vec![String::new(), String::new()],
            ..Default::default()
        }
    }

    pub fn from_pregunta(pregunta: &Pregunta) -> Self {
        Self {
            id: Some(pregunta.id.clone()),
            version: Some(pregunta.version),
            pregunta: pregunta.pregunta.clone(),
            opciones: pregunta.opciones.clone(),
            obligatoria: pregunta.obligatoria,
            es_confirmacion: pregunta.es_confirmacion,
            subpregunta: pregunta.subpregunta.clone(),
        }
    }

    pub fn set_option(&mut self, index: usize, text: &str) -> Result<()> {
        let slot = self
            .opciones
            .get_mut(index)
            .ok_or_else(|| ClientError::validation(format!("No option at position {}", index)))?;
        *slot = text.to_string();
        Ok(())
    }

    pub fn add_option(&mut self, text: &str) {
        self.opciones.push(text.to_string());
    }

    pub fn remove_option(&mut self, index: usize) -> Result<String> {
        if index >= self.opciones.len() {
            return Err(ClientError::validation(format!(
                "No option at position {}",
                index
            )));
        }
        Ok(self.opciones.remove(index))
    }

    pub fn set_subpregunta(&mut self, pregunta: &str, opciones: Vec<String>, condicion: &str) {
        self.subpregunta = Some(SubPregunta {
            pregunta: pregunta.to_string(),
            opciones,
            condicion: condicion.to_string(),
        });
    }

    pub fn clear_subpregunta(&mut self) {
        self.subpregunta = None;
    }

    fn trimmed_subpregunta(&self) -> Option<SubPregunta> {
        self.subpregunta.as_ref().map(|s| SubPregunta {
            pregunta: s.pregunta.trim().to_string(),
            opciones: s.opciones.iter().map(|o| o.trim().to_string()).collect(),
            condicion: s.condicion.trim().to_string(),
        })
    }

    /// A create input for a new draft, an edit input for a loaded one.
    pub fn to_input(&self, boda_id: &str) -> QuestionInput {
        let pregunta = self.pregunta.trim().to_string();
        let opciones: Vec<String> = self.opciones.iter().map(|o| o.trim().to_string()).collect();
        let subpregunta = self.trimmed_subpregunta();

        match &self.id {
            Some(id) => QuestionInput::Edit(EditQuestionInput {
                id: id.clone(),
                pregunta,
                opciones,
                obligatoria: self.obligatoria,
                es_confirmacion: self.es_confirmacion,
                subpregunta,
                version: self.version,
            }),
            None => QuestionInput::Create(CreateQuestionInput {
                boda_id: boda_id.to_string(),
                pregunta,
                opciones,
                obligatoria: self.obligatoria,
                es_confirmacion: self.es_confirmacion,
                subpregunta,
            }),
        }
    }
}

/// Who a question gets assigned to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AssignTarget {
    All,
    List(String),
    Guest(String),
}

#[derive(Serialize, Debug)]
#[serde(rename_all = "camelCase")]
pub(crate) struct AssignBody<'a> {
    modo: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    lista_id: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    invitado_id: Option<&'a str>,
}

impl AssignTarget {
    pub(crate) fn body(&self) -> AssignBody<'_> {
        match self {
            AssignTarget::All => AssignBody {
                modo: "todos",
                lista_id: None,
                invitado_id: None,
            },
            AssignTarget::List(id) => AssignBody {
                modo: "lista",
                lista_id: Some(id),
                invitado_id: None,
            },
            AssignTarget::Guest(id) => AssignBody {
                modo: "invitado",
                lista_id: None,
                invitado_id: Some(id),
            },
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AssignMode {
    #[default]
    All,
    List,
    Guest,
}

/// The assignment form as the user fills it in.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct AssignmentSelection {
    pub mode: AssignMode,
    pub lista_id: Option<String>,
    pub invitado_id: Option<String>,
}

impl AssignmentSelection {
    pub fn target(&self) -> Result<AssignTarget> {
        let picked = |id: &Option<String>| {
            id.as_deref()
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(str::to_string)
        };
        match self.mode {
            AssignMode::All => Ok(AssignTarget::All),
            AssignMode::List => picked(&self.lista_id)
                .map(AssignTarget::List)
                .ok_or_else(|| ClientError::validation("Choose a list to assign the question to")),
            AssignMode::Guest => picked(&self.invitado_id)
                .map(AssignTarget::Guest)
                .ok_or_else(|| ClientError::validation("Choose a guest to assign the question to")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_draft_edits_options_in_place() {
        let mut draft = QuestionDraft::new();
        draft.pregunta = " ¿Menú? ".to_string();
        draft.set_option(0, "Carne ").unwrap();
        draft.set_option(1, "Pescado").unwrap();
        draft.add_option("Vegetariano");
        assert_eq!(draft.remove_option(2).unwrap(), "Vegetariano");
        assert!(draft.set_option(5, "x").is_err());

        let input = draft.to_input("boda-1");
        input.validate().unwrap();
        match input {
            QuestionInput::Create(c) => {
                assert_eq!(c.pregunta, "¿Menú?");
                assert_eq!(c.opciones, vec!["Carne", "Pescado"]);
            }
            other => panic!("expected create input, got {:?}", other),
        }
    }

    #[test]
    fn test_single_option_is_rejected_locally() {
        let mut draft = QuestionDraft::new();
        draft.pregunta = "¿Vienes?".to_string();
        draft.set_option(0, "Sí").unwrap();
        draft.remove_option(1).unwrap();

        let err = draft.to_input("boda-1").validate().unwrap_err();
        assert!(matches!(err, ClientError::Validation(_)));
    }

    #[test]
    fn test_subpregunta_needs_own_options() {
        let mut draft = QuestionDraft::new();
        draft.pregunta = "¿Vienes?".to_string();
        draft.opciones = vec!["Sí".to_string(), "No".to_string()];
        draft.set_subpregunta("¿Autobús?", vec!["Ida".to_string()], "si");
        assert!(draft.to_input("boda-1").validate().is_err());

        draft.clear_subpregunta();
        assert!(draft.to_input("boda-1").validate().is_ok());
    }

    #[test]
    fn test_loaded_draft_becomes_edit_with_version() {
        let pregunta = Pregunta {
            id: "p-1".to_string(),
            boda_id: "boda-1".to_string(),
            pregunta: "¿Vienes?".to_string(),
            opciones: vec!["Sí".to_string(), "No".to_string()],
            obligatoria: true,
            es_confirmacion: true,
            subpregunta: None,
            version: 3,
            created_at: String::new(),
            updated_at: String::new(),
        };
        match QuestionDraft::from_pregunta(&pregunta).to_input("boda-1") {
            QuestionInput::Edit(e) => {
                assert_eq!(e.id, "p-1");
                assert_eq!(e.version, Some(3));
                let body = serde_json::to_value(&e).unwrap();
                assert!(body.get("id").is_none());
                assert_eq!(body["esConfirmacion"], true);
            }
            other => panic!("expected edit input, got {:?}", other),
        }
    }

    #[test]
    fn test_assignment_selection_requires_target_id() {
        let selection = AssignmentSelection {
            mode: AssignMode::List,
            lista_id: Some("  ".to_string()),
            invitado_id: None,
        };
        assert!(selection.target().is_err());

        let selection = AssignmentSelection {
            mode: AssignMode::Guest,
            lista_id: None,
            invitado_id: Some("g-1".to_string()),
        };
        assert_eq!(selection.target().unwrap(), AssignTarget::Guest("g-1".to_string()));
        assert_eq!(AssignmentSelection::default().target().unwrap(), AssignTarget::All);

        let body = serde_json::to_value(AssignTarget::List("l-1".to_string()).body()).unwrap();
        assert_eq!(body, serde_json::json!({"modo": "lista", "listaId": "l-1"}));
    }
}
