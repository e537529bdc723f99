use async_trait::async_trait;
use aws_sdk_dynamodb::operation::delete_item::DeleteItemError;
use aws_sdk_dynamodb::operation::put_item::PutItemError;
use aws_sdk_dynamodb::types::AttributeValue;
use aws_sdk_dynamodb::Client;
use log::{debug, error, info};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_dynamo::{from_item, from_items, to_item};
use std::collections::HashMap;

use super::{BodaStore, InvitadoStore, ListaStore, PlantillaStore, PreguntaStore, UsuarioStore};
use crate::error::{Result, StoreError};
use crate::models::{Boda, Invitado, ListaDifusion, Plantilla, Pregunta, Usuario};

const ID_ATTR: &str = "_id";
pub const BODA_INDEX: &str = "bodaId-index";
pub const EMAIL_INDEX: &str = "email-index";

type Item = HashMap<String, AttributeValue>;

/// Table names, one table per record type.
#[derive(Debug, Clone)]
pub struct TableNames {
    pub bodas: String,
    pub invitados: String,
    pub preguntas: String,
    pub listas: String,
    pub plantillas: String,
    pub usuarios: String,
}

impl TableNames {
    pub fn from_env() -> Self {
        let var = |key: &str, default: &str| std::env::var(key).unwrap_or_else(|_| default.to_string());
        Self {
            bodas: var("BODAS_TABLE", "bodas"),
            invitados: var("INVITADOS_TABLE", "invitados"),
            preguntas: var("PREGUNTAS_TABLE", "preguntas"),
            listas: var("LISTAS_TABLE", "listas"),
            plantillas: var("PLANTILLAS_TABLE", "plantillas"),
            usuarios: var("USUARIOS_TABLE", "usuarios"),
        }
    }
}

#[derive(Debug, Clone, Copy)]
enum PutCondition {
    Create,
    Replace,
    Version(u64),
}

/// DynamoDB-backed store. Every table is keyed by `_id`; per-wedding tables
/// carry a `bodaId-index` GSI and the users table an `email-index` GSI.
#[derive(Debug, Clone)]
pub struct DynamoStore {
    client: Client,
    tables: TableNames,
}

impl DynamoStore {
    pub async fn new() -> Self {
        let config = aws_config::defaults(aws_config::BehaviorVersion::latest())
            .load()
            .await;
        let tables = TableNames::from_env();
        info!("Using DynamoDB tables: {:?}", tables);
        Self::with_client_and_tables(Client::new(&config), tables)
    }

    pub fn with_client_and_tables(client: Client, tables: TableNames) -> Self {
        Self { client, tables }
    }

    async fn get_record<T: DeserializeOwned>(&self, table: &str, id: &str, what: &str) -> Result<T> {
        let output = self
            .client
            .get_item()
            .table_name(table)
            .key(ID_ATTR, AttributeValue::S(id.to_string()))
            .send()
            .await
            .map_err(|e| {
                error!("Failed to get {} {} from {}: {}", what, id, table, e);
                StoreError::Internal(format!("Failed to get {}: {}", what, e))
            })?;

        match output.item {
            Some(item) => from_item(item).map_err(|e| {
                StoreError::Internal(format!("Failed to deserialize {}: {}", what, e))
            }),
            None => Err(StoreError::NotFound(format!("{} {}", what, id))),
        }
    }

    async fn put_record<T: Serialize>(
        &self,
        table: &str,
        record: &T,
        condition: PutCondition,
        what: &str,
    ) -> Result<()> {
        let item: Item = to_item(record)
            .map_err(|e| StoreError::Internal(format!("Failed to serialize {}: {}", what, e)))?;

        let request = self
            .client
            .put_item()
            .table_name(table)
            .set_item(Some(item))
            .expression_attribute_names("#id", ID_ATTR);

        let request = match condition {
            PutCondition::Create => request.condition_expression("attribute_not_exists(#id)"),
            PutCondition::Replace => request.condition_expression("attribute_exists(#id)"),
            PutCondition::Version(expected) => request
                .condition_expression("attribute_exists(#id) AND #version = :version")
                .expression_attribute_names("#version", "version")
                .expression_attribute_values(":version", AttributeValue::N(expected.to_string())),
        };

        request
            .send()
            .await
            .map_err(|e| match e.into_service_error() {
                PutItemError::ConditionalCheckFailedException(_) => match condition {
                    PutCondition::Create => {
                        StoreError::Conflict(format!("{} already exists", what))
                    }
                    PutCondition::Replace => StoreError::NotFound(what.to_string()),
                    PutCondition::Version(expected) => StoreError::Conflict(format!(
                        "{} was modified since version {}",
                        what, expected
                    )),
                },
                other => {
                    error!("Failed to put {} into {}: {}", what, table, other);
                    StoreError::Internal(format!("Failed to save {}: {}", what, other))
                }
            })?;

        debug!("Stored {} in {}", what, table);
        Ok(())
    }

    async fn delete_record(&self, table: &str, id: &str, what: &str) -> Result<()> {
        self.client
            .delete_item()
            .table_name(table)
            .key(ID_ATTR, AttributeValue::S(id.to_string()))
            .condition_expression("attribute_exists(#id)")
            .expression_attribute_names("#id", ID_ATTR)
            .send()
            .await
            .map_err(|e| match e.into_service_error() {
                DeleteItemError::ConditionalCheckFailedException(_) => {
                    StoreError::NotFound(format!("{} {}", what, id))
                }
                other => StoreError::Internal(format!("Failed to delete {}: {}", what, other)),
            })?;
        Ok(())
    }

    async fn query_index<T: DeserializeOwned>(
        &self,
        table: &str,
        index: &str,
        key_attr: &str,
        key_value: &str,
    ) -> Result<Vec<T>> {
        let mut items: Vec<Item> = Vec::new();
        let mut start_key: Option<Item> = None;

        loop {
            let output = self
                .client
                .query()
                .table_name(table)
                .index_name(index)
                .key_condition_expression("#k = :v")
                .expression_attribute_names("#k", key_attr)
                .expression_attribute_values(":v", AttributeValue::S(key_value.to_string()))
                .set_exclusive_start_key(start_key.take())
                .send()
                .await
                .map_err(|e| {
                    error!("Query on {}.{} failed: {}", table, index, e);
                    StoreError::Internal(format!("Query failed: {}", e))
                })?;

            if let Some(page) = output.items {
                items.extend(page);
            }

            match output.last_evaluated_key {
                Some(key) if !key.is_empty() => start_key = Some(key),
                _ => break,
            }
        }

        from_items(items)
            .map_err(|e| StoreError::Internal(format!("Failed to deserialize items: {}", e)))
    }

    async fn scan_table<T: DeserializeOwned>(&self, table: &str) -> Result<Vec<T>> {
        let mut items: Vec<Item> = Vec::new();
        let mut start_key: Option<Item> = None;

        loop {
            let output = self
                .client
                .scan()
                .table_name(table)
                .set_exclusive_start_key(start_key.take())
                .send()
                .await
                .map_err(|e| StoreError::Internal(format!("Scan failed: {}", e)))?;

            if let Some(page) = output.items {
                items.extend(page);
            }

            match output.last_evaluated_key {
                Some(key) if !key.is_empty() => start_key = Some(key),
                _ => break,
            }
        }

        from_items(items)
            .map_err(|e| StoreError::Internal(format!("Failed to deserialize items: {}", e)))
    }
}

#[async_trait]
impl BodaStore for DynamoStore {
    async fn get_boda(&self, id: &str) -> Result<Boda> {
        self.get_record(&self.tables.bodas, id, "Boda").await
    }

    async fn get_bodas(&self) -> Result<Vec<Boda>> {
        self.scan_table(&self.tables.bodas).await
    }

    async fn create_boda(&self, boda: Boda) -> Result<Boda> {
        self.put_record(&self.tables.bodas, &boda, PutCondition::Create, "Boda")
            .await?;
        Ok(boda)
    }

    async fn update_boda(&self, boda: Boda) -> Result<Boda> {
        self.put_record(&self.tables.bodas, &boda, PutCondition::Replace, "Boda")
            .await?;
        Ok(boda)
    }
}

#[async_trait]
impl InvitadoStore for DynamoStore {
    async fn get_invitado(&self, id: &str) -> Result<Invitado> {
        self.get_record(&self.tables.invitados, id, "Invitado").await
    }

    async fn get_invitados_by_boda(&self, boda_id: &str) -> Result<Vec<Invitado>> {
        self.query_index(&self.tables.invitados, BODA_INDEX, "bodaId", boda_id)
            .await
    }

    async fn create_invitado(&self, invitado: Invitado) -> Result<Invitado> {
        self.put_record(
            &self.tables.invitados,
            &invitado,
            PutCondition::Create,
            "Invitado",
        )
        .await?;
        Ok(invitado)
    }

    async fn update_invitado(&self, invitado: Invitado) -> Result<Invitado> {
        self.put_record(
            &self.tables.invitados,
            &invitado,
            PutCondition::Replace,
            "Invitado",
        )
        .await?;
        Ok(invitado)
    }

    async fn delete_invitado(&self, id: &str) -> Result<()> {
        self.delete_record(&self.tables.invitados, id, "Invitado")
            .await
    }
}

#[async_trait]
impl PreguntaStore for DynamoStore {
    async fn get_pregunta(&self, id: &str) -> Result<Pregunta> {
        self.get_record(&self.tables.preguntas, id, "Pregunta").await
    }

    async fn get_preguntas_by_boda(&self, boda_id: &str) -> Result<Vec<Pregunta>> {
        self.query_index(&self.tables.preguntas, BODA_INDEX, "bodaId", boda_id)
            .await
    }

    async fn create_pregunta(&self, pregunta: Pregunta) -> Result<Pregunta> {
        self.put_record(
            &self.tables.preguntas,
            &pregunta,
            PutCondition::Create,
            "Pregunta",
        )
        .await?;
        Ok(pregunta)
    }

    async fn update_pregunta(&self, mut pregunta: Pregunta) -> Result<Pregunta> {
        let expected = pregunta.version;
        pregunta.version = expected + 1;
        self.put_record(
            &self.tables.preguntas,
            &pregunta,
            PutCondition::Version(expected),
            "Pregunta",
        )
        .await?;
        Ok(pregunta)
    }

    async fn delete_pregunta(&self, id: &str) -> Result<()> {
        self.delete_record(&self.tables.preguntas, id, "Pregunta")
            .await
    }
}

#[async_trait]
impl ListaStore for DynamoStore {
    async fn get_lista(&self, id: &str) -> Result<ListaDifusion> {
        self.get_record(&self.tables.listas, id, "Lista").await
    }

    async fn get_listas_by_boda(&self, boda_id: &str) -> Result<Vec<ListaDifusion>> {
        self.query_index(&self.tables.listas, BODA_INDEX, "bodaId", boda_id)
            .await
    }

    async fn create_lista(&self, lista: ListaDifusion) -> Result<ListaDifusion> {
        self.put_record(&self.tables.listas, &lista, PutCondition::Create, "Lista")
            .await?;
        Ok(lista)
    }

    async fn update_lista(&self, mut lista: ListaDifusion) -> Result<ListaDifusion> {
        let expected = lista.version;
        lista.version = expected + 1;
        self.put_record(
            &self.tables.listas,
            &lista,
            PutCondition::Version(expected),
            "Lista",
        )
        .await?;
        Ok(lista)
    }

    async fn delete_lista(&self, id: &str) -> Result<()> {
        self.delete_record(&self.tables.listas, id, "Lista").await
    }
}

#[async_trait]
impl PlantillaStore for DynamoStore {
    async fn get_plantilla(&self, id: &str) -> Result<Plantilla> {
        self.get_record(&self.tables.plantillas, id, "Plantilla")
            .await
    }

    async fn get_plantillas_by_boda(&self, boda_id: &str) -> Result<Vec<Plantilla>> {
        self.query_index(&self.tables.plantillas, BODA_INDEX, "bodaId", boda_id)
            .await
    }

    async fn create_plantilla(&self, plantilla: Plantilla) -> Result<Plantilla> {
        self.put_record(
            &self.tables.plantillas,
            &plantilla,
            PutCondition::Create,
            "Plantilla",
        )
        .await?;
        Ok(plantilla)
    }

    async fn update_plantilla(&self, plantilla: Plantilla) -> Result<Plantilla> {
        self.put_record(
            &self.tables.plantillas,
            &plantilla,
            PutCondition::Replace,
            "Plantilla",
        )
        .await?;
        Ok(plantilla)
    }

    async fn delete_plantilla(&self, id: &str) -> Result<()> {
        self.delete_record(&self.tables.plantillas, id, "Plantilla")
            .await
    }
}

#[async_trait]
impl UsuarioStore for DynamoStore {
    async fn get_usuario(&self, id: &str) -> Result<Usuario> {
        self.get_record(&self.tables.usuarios, id, "Usuario").await
    }

    async fn get_usuario_by_email(&self, email: &str) -> Result<Usuario> {
        let email = email.trim().to_lowercase();
        let mut usuarios: Vec<Usuario> = self
            .query_index(&self.tables.usuarios, EMAIL_INDEX, "email", &email)
            .await?;
        usuarios
            .pop()
            .ok_or_else(|| StoreError::NotFound(format!("Usuario {}", email)))
    }

    async fn get_usuarios(&self) -> Result<Vec<Usuario>> {
        self.scan_table(&self.tables.usuarios).await
    }

    async fn create_usuario(&self, usuario: Usuario) -> Result<Usuario> {
        self.put_record(
            &self.tables.usuarios,
            &usuario,
            PutCondition::Create,
            "Usuario",
        )
        .await?;
        Ok(usuario)
    }
}
