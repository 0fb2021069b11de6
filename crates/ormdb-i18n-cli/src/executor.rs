//! Command execution.

use std::path::Path;

use ormdb_i18n::I18n;
use ormdb_model::{
    AsyncDatabase, CallOptions, Database, EntityDef, Row, ScalarType, StorageConfig, Value,
};
use tracing::{debug, info};

use crate::error::CliError;
use crate::formatter::{ColumnInfo, Formatter, TableInfo};
use crate::schema::SchemaFile;
use crate::Command;

/// An open database with the extension installed and the schema defined.
pub struct Session {
    db: AsyncDatabase,
    i18n: I18n,
}

impl Session {
    /// Open the database at `data_path` and define every model of the schema.
    pub fn open(data_path: &Path, schema: SchemaFile) -> Result<Self, CliError> {
        let db = Database::open(StorageConfig::new(data_path))?;
        Self::with_database(db, schema)
    }

    /// Install the extension on an existing database and define the schema.
    pub fn with_database(db: Database, schema: SchemaFile) -> Result<Self, CliError> {
        let defs = schema.entity_defs()?;
        let i18n = I18n::new(schema.i18n)?;
        i18n.init(&db);

        for def in defs {
            db.define(def)?;
        }
        info!(models = db.model_names().len(), "schema loaded");

        Ok(Self {
            db: AsyncDatabase::new(db),
            i18n,
        })
    }

    fn database(&self) -> &Database {
        self.db.inner()
    }

    fn options(&self, lang: Option<&str>) -> Result<CallOptions, CliError> {
        match lang {
            Some(text) => {
                let language = self.i18n.language_set().parse(text)?.clone();
                Ok(self.i18n.options(language))
            }
            None => Ok(CallOptions::new()),
        }
    }

    /// Flush pending writes.
    pub fn flush(&self) -> Result<(), CliError> {
        Ok(self.database().flush()?)
    }
}

/// Execute a command and return formatted output.
pub async fn execute(
    session: &Session,
    command: Command,
    formatter: &dyn Formatter,
) -> Result<String, CliError> {
    match command {
        Command::Tables => Ok(formatter.format_tables(&table_infos(session)?)),

        Command::Create { model, set, lang } => {
            let def = session.database().model(&model)?;
            let values = parse_assignments(&def, &set)?;
            let options = session.options(lang.as_deref())?;

            let instance = session.db.create(model, values, options).await?;
            debug!(model = %instance.model(), id = %instance.id(), "created");
            Ok(formatter.format_instance(
                &columns(&def),
                &instance,
                session.i18n.translations(&instance),
            ))
        }

        Command::Get { model, id, lang } => {
            let def = session.database().model(&model)?;
            let key = parse_id(&def, &id)?;
            let options = session.options(lang.as_deref())?;

            let instance = session
                .db
                .find_by_id(model.clone(), key, options)
                .await?
                .ok_or(CliError::NotFound { model, id })?;
            Ok(formatter.format_instance(
                &columns(&def),
                &instance,
                session.i18n.translations(&instance),
            ))
        }

        Command::List { model, lang } => {
            let def = session.database().model(&model)?;
            let options = session.options(lang.as_deref())?;

            let instances = session.db.find_all(model, Row::new(), options).await?;
            Ok(formatter.format_instances(&columns(&def), &instances))
        }

        Command::Update {
            model,
            id,
            set,
            lang,
        } => {
            let def = session.database().model(&model)?;
            let key = parse_id(&def, &id)?;
            let changes = parse_assignments(&def, &set)?;
            let options = session.options(lang.as_deref())?;

            let instance = session
                .db
                .find_by_id(model.clone(), key, options.clone())
                .await?
                .ok_or(CliError::NotFound { model, id })?;
            let instance = session.db.update(instance, changes, options).await?;
            Ok(formatter.format_instance(
                &columns(&def),
                &instance,
                session.i18n.translations(&instance),
            ))
        }

        Command::Delete { model, id } => {
            let def = session.database().model(&model)?;
            let key = parse_id(&def, &id)?;

            let instance = session
                .db
                .find_by_id(model.clone(), key, CallOptions::new())
                .await?
                .ok_or_else(|| CliError::NotFound {
                    model: model.clone(),
                    id: id.clone(),
                })?;
            session.db.destroy(instance, CallOptions::new()).await?;
            Ok(formatter.format_message(&format!("deleted {} {}", model, id)))
        }
    }
}

fn columns(def: &EntityDef) -> Vec<String> {
    def.fields.iter().map(|f| f.name.clone()).collect()
}

fn table_infos(session: &Session) -> Result<Vec<TableInfo>, CliError> {
    let db = session.database();
    let registry = session.i18n.registry();

    let mut tables = Vec::new();
    for name in db.model_names() {
        let def = db.model(&name)?;
        let translates = registry
            .model_names()
            .into_iter()
            .find(|base| registry.get(base).is_some_and(|d| d.table_name() == name));

        tables.push(TableInfo {
            name,
            translates,
            columns: def
                .fields
                .iter()
                .map(|f| ColumnInfo {
                    name: f.name.clone(),
                    column_type: f.field_type.to_string(),
                    stored: f.is_stored(),
                })
                .collect(),
        });
    }
    Ok(tables)
}

/// Parse `field=value` arguments against a model definition.
pub fn parse_assignments(def: &EntityDef, assignments: &[String]) -> Result<Row, CliError> {
    let mut row = Row::new();
    for assignment in assignments {
        let (field, text) = assignment
            .split_once('=')
            .filter(|(field, _)| !field.trim().is_empty())
            .ok_or_else(|| CliError::Assignment(assignment.clone()))?;
        let field = field.trim();
        let scalar = def.get_field(field).map(|f| f.scalar_type());
        row.set(field, parse_value(text, scalar));
    }
    Ok(row)
}

/// Parse a command-line value.
///
/// With a known column type the text is read as that type when it can be;
/// otherwise integers, floats, booleans and `null` are recognised and anything
/// else is a string. Values the column rejects are reported by the model.
pub fn parse_value(text: &str, scalar: Option<ScalarType>) -> Value {
    if text == "null" {
        return Value::Null;
    }

    match scalar {
        Some(ScalarType::String | ScalarType::Text) => Value::from(text),
        Some(ScalarType::Int64 | ScalarType::Timestamp) => text
            .parse::<i64>()
            .map(Value::Int)
            .unwrap_or_else(|_| Value::from(text)),
        Some(ScalarType::Float64) => text
            .parse::<f64>()
            .map(Value::Float)
            .unwrap_or_else(|_| Value::from(text)),
        Some(ScalarType::Bool) => text
            .parse::<bool>()
            .map(Value::Bool)
            .unwrap_or_else(|_| Value::from(text)),
        None => guess_value(text),
    }
}

fn guess_value(text: &str) -> Value {
    if let Ok(i) = text.parse::<i64>() {
        return Value::Int(i);
    }
    if let Ok(f) = text.parse::<f64>() {
        return Value::Float(f);
    }
    if let Ok(b) = text.parse::<bool>() {
        return Value::Bool(b);
    }
    Value::from(text)
}

/// Parse a primary key typed on the command line.
pub fn parse_id(def: &EntityDef, text: &str) -> Result<Value, CliError> {
    let scalar = def
        .get_identity_field()
        .map(|f| f.scalar_type())
        .unwrap_or(ScalarType::String);

    match scalar {
        ScalarType::Int64 => text
            .parse::<i64>()
            .map(Value::Int)
            .map_err(|_| CliError::InvalidId {
                model: def.name.clone(),
                id: text.to_string(),
            }),
        _ => Ok(Value::from(text)),
    }
}

#[cfg(test)]
mod tests {
    use ormdb_model::FieldDef;

    use super::*;
    use crate::formatter::JsonFormatter;

    const SCHEMA: &str = r#"{
        "i18n": { "languages": ["FR", "EN"] },
        "models": [
            {
                "name": "product",
                "fields": [
                    { "name": "id", "type": "int64", "auto_increment": true },
                    { "name": "name", "type": "string", "translatable": true },
                    { "name": "reference", "type": "string" }
                ]
            }
        ]
    }"#;

    fn session() -> Session {
        let schema = SchemaFile::from_json_str(SCHEMA).unwrap();
        Session::with_database(Database::temporary().unwrap(), schema).unwrap()
    }

    async fn run(session: &Session, command: Command) -> serde_json::Value {
        let output = execute(session, command, &JsonFormatter).await.unwrap();
        serde_json::from_str(&output).unwrap()
    }

    fn product() -> EntityDef {
        EntityDef::new("product", "id")
            .with_field(FieldDef::scalar("id", ScalarType::Int64))
            .with_field(FieldDef::scalar("name", ScalarType::String))
            .with_field(FieldDef::scalar("price", ScalarType::Float64))
            .with_field(FieldDef::scalar("active", ScalarType::Bool))
    }

    #[test]
    fn test_parse_value_by_type() {
        assert_eq!(parse_value("12", Some(ScalarType::String)), Value::from("12"));
        assert_eq!(parse_value("12", Some(ScalarType::Int64)), Value::Int(12));
        assert_eq!(parse_value("12", Some(ScalarType::Float64)), Value::Float(12.0));
        assert_eq!(parse_value("true", Some(ScalarType::Bool)), Value::Bool(true));
        assert_eq!(parse_value("null", Some(ScalarType::String)), Value::Null);
        assert_eq!(parse_value("abc", Some(ScalarType::Int64)), Value::from("abc"));
    }

    #[test]
    fn test_guess_value() {
        assert_eq!(parse_value("7", None), Value::Int(7));
        assert_eq!(parse_value("1.5", None), Value::Float(1.5));
        assert_eq!(parse_value("false", None), Value::Bool(false));
        assert_eq!(parse_value("hello", None), Value::from("hello"));
    }

    #[test]
    fn test_parse_assignments() {
        let row = parse_assignments(
            &product(),
            &["name=a=b".to_string(), "price=2".to_string(), "active=false".to_string()],
        )
        .unwrap();
        assert_eq!(row.get("name"), Some(&Value::from("a=b")));
        assert_eq!(row.get("price"), Some(&Value::Float(2.0)));
        assert_eq!(row.get("active"), Some(&Value::Bool(false)));

        assert!(matches!(
            parse_assignments(&product(), &["name".to_string()]),
            Err(CliError::Assignment(_))
        ));
        assert!(matches!(
            parse_assignments(&product(), &["=x".to_string()]),
            Err(CliError::Assignment(_))
        ));
    }

    #[test]
    fn test_parse_id() {
        assert_eq!(parse_id(&product(), "3").unwrap(), Value::Int(3));
        assert!(matches!(
            parse_id(&product(), "x"),
            Err(CliError::InvalidId { id, .. }) if id == "x"
        ));

        let page = EntityDef::new("page", "slug")
            .with_field(FieldDef::scalar("slug", ScalarType::String));
        assert_eq!(parse_id(&page, "home").unwrap(), Value::from("home"));
    }

    #[tokio::test]
    async fn test_session_lifecycle() {
        let session = session();

        let created = run(
            &session,
            Command::Create {
                model: "product".into(),
                set: vec!["name=chaise".into(), "reference=C1".into()],
                lang: None,
            },
        )
        .await;
        assert_eq!(created["id"], 1);
        assert_eq!(created["associations"]["product_i18n"].as_array().unwrap().len(), 2);

        run(
            &session,
            Command::Update {
                model: "product".into(),
                id: "1".into(),
                set: vec!["name=chair".into()],
                lang: Some("EN".into()),
            },
        )
        .await;

        let english = run(
            &session,
            Command::Get {
                model: "product".into(),
                id: "1".into(),
                lang: Some("EN".into()),
            },
        )
        .await;
        assert_eq!(english["values"]["name"], "chair");

        let listed = run(
            &session,
            Command::List {
                model: "product".into(),
                lang: None,
            },
        )
        .await;
        assert_eq!(listed[0]["values"]["name"], "chaise");

        let tables = run(&session, Command::Tables).await;
        assert_eq!(tables[1]["name"], "product_i18n");
        assert_eq!(tables[1]["translates"], "product");

        run(
            &session,
            Command::Delete {
                model: "product".into(),
                id: "1".into(),
            },
        )
        .await;
        assert!(session
            .database()
            .select_rows("product_i18n", &Row::new())
            .unwrap()
            .is_empty());
    }

    #[tokio::test]
    async fn test_unknown_language() {
        let session = session();
        let err = execute(
            &session,
            Command::List {
                model: "product".into(),
                lang: Some("DE".into()),
            },
            &JsonFormatter,
        )
        .await
        .unwrap_err();
        assert!(matches!(
            err,
            CliError::I18n(ormdb_i18n::Error::UnknownLanguage(_))
        ));
    }

    #[tokio::test]
    async fn test_missing_record() {
        let session = session();
        let err = execute(
            &session,
            Command::Get {
                model: "product".into(),
                id: "9".into(),
                lang: None,
            },
            &JsonFormatter,
        )
        .await
        .unwrap_err();
        assert!(matches!(err, CliError::NotFound { .. }));
    }
}
