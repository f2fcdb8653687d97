use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};

use tracing::info;

use super::template::{QueryTemplate, RenderContext, Template};
use crate::catalog::Catalog;
use crate::config::{Config, SqlTarget};
use crate::error::{Error, Result};
use crate::helpers::Helpers;

/// Writes one query file per catalog table for every configured target
pub struct Generator<T = QueryTemplate> {
    pub config: Config,
    pub catalog: Catalog,
    pub template: T,
}

impl Generator {
    pub fn new(config: Config, catalog: Catalog) -> Self {
        Self::with_template(config, catalog, QueryTemplate)
    }
}

impl<T: Template> Generator<T> {
    pub fn with_template(config: Config, catalog: Catalog, template: T) -> Self {
        Self {
            config,
            catalog,
            template,
        }
    }

    /// Generate every target, stopping at the first error.
    ///
    /// Files written before a failure stay on disk. Returns the written
    /// paths in generation order.
    pub fn generate(&self) -> Result<Vec<PathBuf>> {
        let mut written = Vec::new();
        for target in &self.config.sql {
            self.generate_target(target, &mut written)?;
        }
        Ok(written)
    }

    fn generate_target(&self, target: &SqlTarget, written: &mut Vec<PathBuf>) -> Result<()> {
        fs::create_dir_all(&target.queries).map_err(|source| Error::OutputDir {
            path: target.queries.clone(),
            source,
        })?;

        info!(
            engine = %target.engine,
            queries = %target.queries.display(),
            "Generating queries"
        );

        let skip_queries = target.skip_queries_set();
        let helpers = Helpers::new(&self.catalog, &skip_queries);

        for schema in &self.catalog.schemas {
            for table in &schema.tables {
                let ctx = RenderContext {
                    engine: &target.engine,
                    schema,
                    table,
                    helpers,
                };
                let content = self.template.render(&ctx)?;

                let path = target.queries.join(format!("{}.sql", table.name));
                write_file(&path, &content)?;

                info!(
                    schema = %schema.name,
                    table = %table.name,
                    path = %path.display(),
                    "Wrote queries"
                );
                written.push(path);
            }
        }

        Ok(())
    }
}

/// Create, write and close one output file
fn write_file(path: &Path, content: &str) -> Result<()> {
    let write_err = |source| Error::Write {
        path: path.to_path_buf(),
        source,
    };

    let mut file = File::create(path).map_err(write_err)?;
    file.write_all(content.as_bytes()).map_err(write_err)?;
    file.sync_all().map_err(write_err)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use tempfile::TempDir;

    const CATALOG: &str = r#"{
        "schemas": [
            {"name": "public", "tables": [{"name": "users"}, {"name": "posts"}]},
            {"name": "analytics", "tables": [{"name": "events"}]}
        ]
    }"#;

    /// Records the tables it was asked to render
    #[derive(Default)]
    struct RecordingTemplate {
        seen: RefCell<Vec<String>>,
    }

    impl Template for RecordingTemplate {
        fn render(&self, ctx: &RenderContext<'_>) -> Result<String> {
            let id = format!("{}.{}:{}", ctx.schema.name, ctx.table.name, ctx.engine);
            self.seen.borrow_mut().push(id.clone());
            Ok(id)
        }
    }

    fn config(queries: PathBuf) -> Config {
        Config {
            version: "2".into(),
            sql: vec![SqlTarget {
                schema: "schema.sql".into(),
                queries,
                engine: "postgresql".into(),
                skip_queries: Vec::new(),
            }],
        }
    }

    #[test]
    fn test_tables_rendered_in_catalog_order() {
        let dir = TempDir::new().unwrap();
        let generator = Generator::with_template(
            config(dir.path().join("queries")),
            Catalog::from_json(CATALOG).unwrap(),
            RecordingTemplate::default(),
        );

        let written = generator.generate().unwrap();

        assert_eq!(
            *generator.template.seen.borrow(),
            vec![
                "public.users:postgresql",
                "public.posts:postgresql",
                "analytics.events:postgresql"
            ]
        );
        let names: Vec<_> = written
            .iter()
            .map(|p| p.file_name().unwrap().to_str().unwrap())
            .collect();
        assert_eq!(names, vec!["users.sql", "posts.sql", "events.sql"]);
        assert_eq!(
            fs::read_to_string(&written[2]).unwrap(),
            "analytics.events:postgresql"
        );
    }

    #[test]
    fn test_output_directory_failure() {
        let dir = TempDir::new().unwrap();
        let blocker = dir.path().join("file");
        fs::write(&blocker, "").unwrap();

        let generator = Generator::new(
            config(blocker.join("queries")),
            Catalog::from_json(CATALOG).unwrap(),
        );

        assert!(matches!(generator.generate(), Err(Error::OutputDir { .. })));
    }
}
