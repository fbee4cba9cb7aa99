//! # Integration Tests
//!
//! End-to-end scenarios across the workspace crates:
//! - template files on disk -> compiler -> runner -> built-in adapters
//! - fan-out, overrides and credentials
//! - telemetry report contents

#[cfg(test)]
mod support {
    use std::fs;
    use std::path::Path;

    use adapters::builtin_registry;
    use runner::PipeRunner;
    use template_registry::FsTemplateRegistry;

    /// Write `<dir>/<name>` and return its path as a string
    pub fn write(dir: &Path, name: &str, content: &str) -> String {
        let path = dir.join(name);
        fs::write(&path, content).unwrap();
        path.display().to_string()
    }

    pub fn fs_runner(templates: &Path) -> PipeRunner<FsTemplateRegistry> {
        PipeRunner::new(FsTemplateRegistry::new(templates), builtin_registry())
    }

    pub fn read(path: impl AsRef<Path>) -> String {
        fs::read_to_string(path).unwrap()
    }
}

#[cfg(test)]
mod e2e_tests {
    use pretty_assertions::assert_eq;
    use serde_json::json;
    use tempfile::tempdir;

    use contracts::RuntimeConfig;

    use crate::support::{fs_runner, read, write};

    const DAILY: &str = r#"
name = "daily"

[parameters]
input = "missing.csv"
out_dir = "out"

[[sources]]
type = "csv"
name = "src1"
sink_names = ["snk1"]
path = "${input}"
blocksize = 2
object_id = "orders"
sep = ","

[[sinks]]
type = "local_file"
name = "snk1"
directory = "${out_dir}"
"#;

    /// csv file -> local_file sink, template resolved from a directory
    #[test]
    fn test_csv_to_local_file() {
        let dir = tempdir().unwrap();
        let input = write(dir.path(), "orders.csv", "id,city\n1,Paris\n2,Oslo\n3,Rome\n");
        write(dir.path(), "daily.toml", DAILY);
        let out_dir = dir.path().join("out");

        let config = RuntimeConfig::new("daily")
            .with_param("input", input)
            .with_param("out_dir", out_dir.display().to_string());
        let report = fs_runner(dir.path()).run_from_config(&config).unwrap();

        assert_eq!(read(out_dir.join("orders")), "1,Paris\n2,Oslo\n3,Rome\n");

        let snk1 = &report["snk1"];
        assert_eq!(snk1["rows_written"], json!(3));
        assert_eq!(snk1["blocks_written"], json!(2));
        assert_eq!(snk1["bytes_written"], json!(22));
        assert_eq!(snk1["objects"], json!({"orders": 3}));
        assert_eq!(snk1["columns"], json!(["id", "city"]));
    }

    /// One source writing the same blocks to two sinks
    #[test]
    fn test_fan_out_to_two_sinks() {
        let dir = tempdir().unwrap();
        write(
            dir.path(),
            "tee.json",
            &json!({
                "parameters": {"root": "unset"},
                "sources": [{
                    "type": "static",
                    "name": "cities",
                    "sink_names": ["left", "right"],
                    "rows": [[1, "Paris"], [2, "Oslo"]],
                    "blocksize": 1
                }],
                "sinks": [
                    {"type": "local_file", "name": "left", "directory": "${root}/left"},
                    {"type": "local_file", "name": "right", "directory": "${root}/right"}
                ]
            })
            .to_string(),
        );

        let root = dir.path().join("data");
        let config = RuntimeConfig::new("tee").with_param("root", root.display().to_string());
        let report = fs_runner(dir.path()).run_from_config(&config).unwrap();

        let expected = "1\tParis\n2\tOslo\n";
        assert_eq!(read(root.join("left/cities")), expected);
        assert_eq!(read(root.join("right/cities")), expected);
        assert_eq!(report.keys().collect::<Vec<_>>(), vec!["left", "right"]);
        for name in ["left", "right"] {
            assert_eq!(report[name]["rows_written"], json!(2));
            assert_eq!(report[name]["blocks_written"], json!(2));
        }
    }

    /// Running the same config twice yields the same output and report
    #[test]
    fn test_rerun_is_repeatable() {
        let dir = tempdir().unwrap();
        let input = write(dir.path(), "orders.csv", "id,city\n1,Paris\n");
        write(dir.path(), "daily.toml", DAILY);
        let out_dir = dir.path().join("out");

        let config = RuntimeConfig::new("daily")
            .with_param("input", input)
            .with_param("out_dir", out_dir.display().to_string());
        let runner = fs_runner(dir.path());

        let first = runner.run_from_config(&config).unwrap();
        let second = runner.run_from_config(&config).unwrap();

        assert_eq!(first, second);
        assert_eq!(read(out_dir.join("orders")), "1,Paris\n");
    }

    #[test]
    fn test_unknown_template() {
        let dir = tempdir().unwrap();
        let err = fs_runner(dir.path())
            .run_from_config(&RuntimeConfig::new("ghost"))
            .unwrap_err();

        assert!(err.is_template_not_found());
        assert!(err.to_string().contains("ghost"));
    }

    #[test]
    fn test_missing_input_fails_on_connect() {
        let dir = tempdir().unwrap();
        write(dir.path(), "daily.toml", DAILY);
        let out_dir = dir.path().join("out");

        let config = RuntimeConfig::new("daily").with_param("out_dir", out_dir.display().to_string());
        let err = fs_runner(dir.path()).run_from_config(&config).unwrap_err();

        assert!(matches!(err, runner::PipelineError::ConnectFailure { ref component, .. } if component == "src1"));
        assert!(!out_dir.exists());
    }

    /// A bad block size is caught at compile time, before any source writes
    #[test]
    fn test_zero_blocksize_fails_before_running() {
        let dir = tempdir().unwrap();
        let out_dir = dir.path().join("out");
        write(
            dir.path(),
            "two.json",
            &json!({
                "sources": [
                    {"type": "static", "name": "first", "sink_names": ["snk1"], "rows": [["a"]]},
                    {"type": "static", "name": "second", "sink_names": ["snk1"], "rows": [["b"]], "blocksize": 0}
                ],
                "sinks": [{"type": "local_file", "name": "snk1", "directory": out_dir.display().to_string()}]
            })
            .to_string(),
        );

        let err = fs_runner(dir.path())
            .run_from_config(&RuntimeConfig::new("two"))
            .unwrap_err();

        match err {
            runner::PipelineError::Compile(compiler::CompileError::ComponentConfiguration {
                component,
                key,
                ..
            }) => {
                assert_eq!(component, "second");
                assert_eq!(key, "blocksize");
            }
            other => panic!("unexpected: {other}"),
        }
        assert!(!out_dir.exists());
    }
}

#[cfg(test)]
mod compile_tests {
    use std::sync::Arc;

    use parking_lot::Mutex;
    use pretty_assertions::assert_eq;
    use serde_json::json;
    use tempfile::tempdir;

    use compiler::{CompileError, PluginRegistry, TemplateCompiler};
    use contracts::{
        BlockRecord, BlockRequest, ContractError, Row, RuntimeConfig, Sink, SinkBase,
        TemplateDefinition,
    };
    use runner::PipeRunner;
    use template_registry::{FsTemplateRegistry, TemplateRegistry};

    use crate::support::write;

    type Captured = Arc<Mutex<Vec<Row>>>;

    /// Sink that needs a credential and keeps rows in memory
    struct VaultSink {
        base: SinkBase,
        rows: Captured,
    }

    impl VaultSink {
        fn new(mut base: SinkBase, rows: Captured) -> Result<Self, ContractError> {
            base.required_credential("token")?;
            Ok(Self { base, rows })
        }
    }

    impl Sink for VaultSink {
        fn base(&self) -> &SinkBase {
            &self.base
        }

        fn base_mut(&mut self) -> &mut SinkBase {
            &mut self.base
        }

        fn write_block(
            &mut self,
            rows: &mut dyn Iterator<Item = Row>,
            request: &BlockRequest<'_>,
        ) -> Result<usize, ContractError> {
            let block: Vec<Row> = rows.take(request.blocksize.limit()).collect();
            let n = block.len();
            self.rows.lock().extend(block);
            self.base.record_block(&BlockRecord {
                object_id: request.object_id,
                rows: n,
                bytes: 0,
                columns: request.columns,
            });
            Ok(n)
        }
    }

    fn plugins(captured: &Captured) -> PluginRegistry {
        let mut plugins = adapters::builtin_registry();
        let rows = Arc::clone(captured);
        plugins.register_sink("vault", move |base| {
            Ok(Box::new(VaultSink::new(base, Arc::clone(&rows))?) as Box<dyn Sink>)
        });
        plugins
    }

    fn definition() -> TemplateDefinition {
        serde_json::from_value(json!({
            "name": "secure",
            "parameters": {"blocksize": 100},
            "sources": [{
                "type": "static",
                "name": "src1",
                "sink_names": ["safe", "logged"],
                "rows": [["a"], ["b"], ["c"]],
                "blocksize": "${blocksize}"
            }],
            "sinks": [
                {"type": "vault", "name": "safe"},
                {"type": "log", "name": "logged"}
            ]
        }))
        .unwrap()
    }

    /// Global override replaces the parameter, scoped override inserts,
    /// and the credential is consumed only by the sink that asked for it
    #[test]
    fn test_overrides_and_credentials() {
        let captured = Captured::default();
        let compiler = TemplateCompiler::new(plugins(&captured));
        let config = RuntimeConfig::new("secure")
            .with_param("blocksize", 1)
            .with_param("logged.preview", 2)
            .with_credential("token", "s3cret");

        let compiled = compiler.compile(&definition(), &config).unwrap();

        let safe = compiled.sink("safe").unwrap().lock();
        assert!(safe.base().params().credential("token").is_none());
        drop(safe);
        let logged = compiled.sink("logged").unwrap().lock();
        assert_eq!(logged.base().params().credential("token"), Some("s3cret"));
        drop(logged);

        let runner = PipeRunner::new(InlineTemplates(definition()), plugins(&captured));
        let report = runner.run(compiled).unwrap();

        assert_eq!(captured.lock().len(), 3);
        assert_eq!(report["safe"]["blocks_written"], json!(3));
        assert_eq!(report["logged"]["rows_written"], json!(3));
    }

    #[test]
    fn test_missing_credential_is_a_configuration_error() {
        let compiler = TemplateCompiler::new(plugins(&Captured::default()));
        let err = compiler
            .compile(&definition(), &RuntimeConfig::new("secure"))
            .unwrap_err();

        match err {
            CompileError::ComponentConfiguration { component, key, .. } => {
                assert_eq!(component, "safe");
                assert_eq!(key, "token");
            }
            other => panic!("unexpected: {other}"),
        }
    }

    /// Compiling does not mutate the definition or the runtime config
    #[test]
    fn test_compile_is_repeatable() {
        let compiler = TemplateCompiler::new(plugins(&Captured::default()));
        let definition = definition();
        let config = RuntimeConfig::new("secure")
            .with_param("blocksize", 2)
            .with_credential("token", "s3cret");
        let (definition_before, config_before) = (definition.clone(), config.clone());

        let first = compiler.compile(&definition, &config).unwrap().to_string();
        let second = compiler.compile(&definition, &config).unwrap().to_string();

        assert_eq!(first, second);
        assert_eq!(definition, definition_before);
        assert_eq!(config, config_before);
    }

    #[test]
    fn test_unknown_type_and_dangling_sink() {
        let compiler = TemplateCompiler::new(adapters::builtin_registry());

        let mut unknown = definition();
        unknown.sinks[0].kind = "s3".into();
        let err = compiler.compile(&unknown, &RuntimeConfig::new("secure")).unwrap_err();
        assert!(matches!(err, CompileError::UnknownPluginType { ref plugin_type, .. } if plugin_type == "s3"));

        let mut dangling = definition();
        dangling.sources[0].sink_names.push("nowhere".into());
        dangling.sinks[0].kind = "log".into();
        let err = compiler.compile(&dangling, &RuntimeConfig::new("secure")).unwrap_err();
        assert!(matches!(err, CompileError::DanglingSinkReference { ref sink, .. } if sink == "nowhere"));
    }

    #[test]
    fn test_duplicate_names_rejected_by_registry() {
        let dir = tempdir().unwrap();
        write(
            dir.path(),
            "dup.json",
            &json!({
                "sources": [{"type": "static", "name": "x", "rows": []}],
                "sinks": [{"type": "log", "name": "x"}]
            })
            .to_string(),
        );

        let err = FsTemplateRegistry::new(dir.path())
            .get_template_by_name("dup")
            .unwrap_err();
        assert!(err.to_string().contains("x"));
    }

    struct InlineTemplates(TemplateDefinition);

    impl TemplateRegistry for InlineTemplates {
        fn get_template_by_name(&self, name: &str) -> template_registry::Result<TemplateDefinition> {
            if name == self.0.name {
                Ok(self.0.clone())
            } else {
                Err(template_registry::RegistryError::not_found(name))
            }
        }
    }
}
