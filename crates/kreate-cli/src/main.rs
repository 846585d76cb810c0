use std::io::BufReader;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use clap::{Parser, Subcommand, ValueEnum};
use color_eyre::eyre::{self, WrapErr};
use kreate::logging::{LogFormat, setup_logging};
use kreate::{KreateApi, KreateApiImpl, SPEC_MAX_DEPTH};
use kreate_cli::{CliHost, rpc, watch};
use kreate_k8s::Kubeconfig;

#[derive(Parser, Debug)]
#[command(
    name = "kreate",
    version,
    about = "Resolve Kubernetes manifest schemas and create resources from forms"
)]
struct Cli {
    /// Log level used when RUST_LOG is not set
    #[arg(long, global = true, env = "KREATE_LOG_LEVEL")]
    log_level: Option<tracing::Level>,

    /// Log format (json, pretty, pretty-compact)
    #[arg(long, global = true)]
    log_format: Option<LogFormat>,

    #[arg(long, global = true, value_enum, default_value_t = Color::Auto)]
    color: Color,

    /// Kubeconfig to use (defaults to the first entry of $KUBECONFIG, then ~/.kube/config)
    #[arg(long, global = true)]
    kubeconfig: Option<PathBuf>,

    #[command(subcommand)]
    cmd: Command,
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
enum Color {
    Auto,
    Always,
    Never,
}

impl From<Color> for termcolor::ColorChoice {
    fn from(color: Color) -> Self {
        match color {
            Color::Auto => Self::Auto,
            Color::Always => Self::Always,
            Color::Never => Self::Never,
        }
    }
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Answer JSON-lines requests on stdin and watch the kubeconfig
    Serve,

    /// Print the document path at a byte offset of a manifest
    PathAt {
        file: PathBuf,

        #[arg(long)]
        offset: usize,
    },

    /// Print the simplified schema of the first manifest in a file
    Spec {
        file: PathBuf,

        /// Dotted path into the schema, e.g. spec.template.spec
        #[arg(long)]
        path: Option<String>,

        #[arg(long, default_value_t = SPEC_MAX_DEPTH)]
        max_depth: usize,
    },

    /// List top level commands, or the subcommands of PARENT
    Commands { parent: Option<String> },

    /// Print the details of a command
    CommandDetails {
        #[arg(required = true)]
        path: Vec<String>,
    },

    /// Create every manifest of a file in the current context
    Create { file: PathBuf },
}

fn read_file(path: &Path) -> eyre::Result<String> {
    std::fs::read_to_string(path).wrap_err_with(|| format!("read {}", path.display()))
}

fn print_json<T: serde::Serialize>(value: &T) -> eyre::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn main() -> eyre::Result<()> {
    color_eyre::install()?;
    let cli = Cli::parse();
    setup_logging(cli.log_level, cli.log_format, cli.color.into())?;

    let kubeconfig = cli.kubeconfig.or_else(Kubeconfig::default_path);
    let api = Arc::new(KreateApiImpl::with_host(CliHost::new(kubeconfig.clone())));

    match cli.cmd {
        Command::Serve => {
            let _watcher = match kubeconfig {
                Some(path) => {
                    let api = Arc::clone(&api);
                    Some(watch::watch_kubeconfig(path, move |event| {
                        api.reader().on_kubeconfig_update(&event);
                    })?)
                }
                None => {
                    tracing::warn!("no kubeconfig location, cluster changes are not tracked");
                    None
                }
            };
            let stdin = std::io::stdin();
            rpc::serve(&*api, BufReader::new(stdin.lock()), std::io::stdout())?;
        }
        Command::PathAt { file, offset } => {
            let content = read_file(&file)?;
            print_json(&api.get_path_at_position(&content, offset)?)?;
        }
        Command::Spec {
            file,
            path,
            max_depth,
        } => {
            let content = read_file(&file)?;
            let path: Vec<&str> = path
                .as_deref()
                .map(|path| path.split('.').filter(|s| !s.is_empty()).collect())
                .unwrap_or_default();
            let schema = api.reader().get_spec_from_yaml_manifest(&content)?;
            let tree = kreate_spec::simplify(&schema.spec, &schema.kind)?;
            print_json(&kreate_spec::project(&tree, &path, max_depth)?)?;
        }
        Command::Commands { parent } => {
            for name in api.get_commands(parent.as_deref())? {
                println!("{name}");
            }
        }
        Command::CommandDetails { path } => {
            print_json(&api.get_command_details(&path)?)?;
        }
        Command::Create { file } => {
            let content = read_file(&file)?;
            api.create(&content)
                .wrap_err_with(|| format!("create resources from {}", file.display()))?;
        }
    }
    Ok(())
}
