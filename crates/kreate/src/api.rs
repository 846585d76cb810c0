use kreate_core::{CommandDetails, EditorState, SimplifiedSpec};
use kreate_k8s::{Kubeconfig, SchemaError, Transport, UreqTransport};

use crate::commands;
use crate::error::{Error, Result};
use crate::host::{DialogOptions, Host};
use crate::reader::{ManifestReader, ReaderState};

/// Depth of the subtree returned by [`KreateApi::get_spec_from_yaml_manifest`].
pub const SPEC_MAX_DEPTH: usize = 2;

/// Operations the form invokes on the backend.
pub trait KreateApi: Send + Sync {
    fn get_commands(&self, parent: Option<&str>) -> Result<Vec<String>>;

    fn get_command_details(&self, path: &[String]) -> Result<CommandDetails>;

    /// Run `argv[0]` with the remaining arguments and return its stdout.
    fn execute_command(&self, argv: &[String]) -> Result<String>;

    fn open_dialog(&self, options: &DialogOptions) -> Result<Option<Vec<String>>>;

    /// Create every manifest in `content` in the current context.
    fn create(&self, content: &str) -> Result<()>;

    /// The simplified schema of the first manifest in `content`, cut at `path`.
    fn get_spec_from_yaml_manifest(&self, content: &str, path: &[String])
    -> Result<SimplifiedSpec>;

    fn get_path_at_position(&self, content: &str, position: usize) -> Result<Vec<String>>;

    fn get_state(&self) -> EditorState;
}

pub struct KreateApiImpl<H, T = UreqTransport> {
    host: H,
    reader: ManifestReader<T>,
}

impl<H: Host> KreateApiImpl<H, UreqTransport> {
    #[must_use]
    pub fn with_host(host: H) -> Self {
        Self::new(host, UreqTransport)
    }
}

impl<H: Host, T: Transport> KreateApiImpl<H, T> {
    /// Build the API and seed its reader from the host's kubeconfig.
    pub fn new(host: H, transport: T) -> Self {
        let reader = ManifestReader::new(transport);
        reader.init(&host);
        Self { host, reader }
    }

    pub fn host(&self) -> &H {
        &self.host
    }

    pub fn reader(&self) -> &ManifestReader<T> {
        &self.reader
    }

    #[must_use]
    pub fn state(&self) -> ReaderState {
        self.reader.state()
    }

    fn current_context(&self) -> Result<String> {
        let path = self
            .host
            .kubeconfig_path()
            .ok_or(SchemaError::NoActiveContext)?;
        let kubeconfig = Kubeconfig::load(&path)?;
        let context = kubeconfig
            .current_context
            .filter(|context| !context.is_empty())
            .ok_or(SchemaError::NoActiveContext)?;
        Ok(context)
    }
}

impl<H: Host, T: Transport> KreateApi for KreateApiImpl<H, T> {
    fn get_commands(&self, parent: Option<&str>) -> Result<Vec<String>> {
        commands::command_names(commands::command_tree()?, parent)
    }

    fn get_command_details(&self, path: &[String]) -> Result<CommandDetails> {
        commands::command_details(commands::command_tree()?, path).cloned()
    }

    fn execute_command(&self, argv: &[String]) -> Result<String> {
        let (program, args) = argv.split_first().ok_or(Error::EmptyCommand)?;
        tracing::debug!(%program, ?args, "executing command");
        Ok(self.host.exec(program, args)?)
    }

    fn open_dialog(&self, options: &DialogOptions) -> Result<Option<Vec<String>>> {
        Ok(self.host.open_dialog(options)?)
    }

    fn create(&self, content: &str) -> Result<()> {
        let manifests = kreate_yaml::load_manifests(content)?;
        if !manifests.iter().any(|manifest| manifest.contains_key("kind")) {
            return Err(Error::manifest_invalid(
                "No valid Kubernetes resources found in content",
            ));
        }
        let context = self.current_context()?;
        tracing::info!(%context, count = manifests.len(), "creating resources");
        self.host.create_resources(&context, &manifests)?;
        Ok(())
    }

    fn get_spec_from_yaml_manifest(
        &self,
        content: &str,
        path: &[String],
    ) -> Result<SimplifiedSpec> {
        let schema = self.reader.get_spec_from_yaml_manifest(content)?;
        let tree = kreate_spec::simplify(&schema.spec, &schema.kind)?;
        Ok(kreate_spec::project(&tree, path, SPEC_MAX_DEPTH)?)
    }

    fn get_path_at_position(&self, content: &str, position: usize) -> Result<Vec<String>> {
        self.reader.get_path_at_position(content, position)
    }

    fn get_state(&self) -> EditorState {
        self.reader.get_state()
    }
}
