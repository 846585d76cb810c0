//! Just enough of the kubeconfig format to reach the current cluster.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

#[derive(thiserror::Error, Debug)]
pub enum KubeconfigError {
    #[error("failed to read kubeconfig {path}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse kubeconfig")]
    Parse(#[from] serde_yaml::Error),
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct Kubeconfig {
    #[serde(default)]
    pub current_context: Option<String>,
    #[serde(default)]
    pub clusters: Option<Vec<NamedCluster>>,
    #[serde(default)]
    pub contexts: Option<Vec<NamedContext>>,
    #[serde(default)]
    pub users: Option<Vec<NamedUser>>,
    /// Directory relative file references are resolved against.
    #[serde(skip)]
    pub base_dir: Option<PathBuf>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NamedCluster {
    pub name: String,
    pub cluster: Cluster,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct Cluster {
    pub server: String,
    #[serde(default)]
    pub certificate_authority: Option<PathBuf>,
    #[serde(default)]
    pub certificate_authority_data: Option<String>,
    #[serde(default)]
    pub insecure_skip_tls_verify: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NamedContext {
    pub name: String,
    pub context: Context,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Context {
    pub cluster: String,
    #[serde(default)]
    pub user: Option<String>,
    #[serde(default)]
    pub namespace: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NamedUser {
    pub name: String,
    #[serde(default)]
    pub user: User,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct User {
    #[serde(default)]
    pub token: Option<String>,
    #[serde(default)]
    pub token_file: Option<PathBuf>,
    #[serde(default)]
    pub client_certificate: Option<PathBuf>,
    #[serde(default)]
    pub client_certificate_data: Option<String>,
    #[serde(default)]
    pub client_key: Option<PathBuf>,
    #[serde(default)]
    pub client_key_data: Option<String>,
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub password: Option<String>,
}

impl Kubeconfig {
    /// Parse kubeconfig YAML.
    pub fn from_yaml(content: &str) -> Result<Self, KubeconfigError> {
        Ok(serde_yaml::from_str(content)?)
    }

    /// Read and parse the kubeconfig at `path`.
    pub fn load(path: &Path) -> Result<Self, KubeconfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| KubeconfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let mut config = Self::from_yaml(&content)?;
        config.base_dir = path.parent().map(Path::to_path_buf);
        Ok(config)
    }

    /// `$KUBECONFIG` (first entry) or `~/.kube/config`.
    #[must_use]
    pub fn default_path() -> Option<PathBuf> {
        if let Some(value) = std::env::var_os("KUBECONFIG")
            && let Some(first) = std::env::split_paths(&value).find(|p| !p.as_os_str().is_empty())
        {
            return Some(first);
        }
        std::env::var_os("HOME").map(|home| PathBuf::from(home).join(".kube").join("config"))
    }

    #[must_use]
    pub fn current_context(&self) -> Option<&NamedContext> {
        let name = self.current_context.as_deref()?;
        self.contexts.as_ref()?.iter().find(|ctx| ctx.name == name)
    }

    /// The cluster of the current context, if it names a known cluster.
    #[must_use]
    pub fn current_cluster(&self) -> Option<&Cluster> {
        let context = self.current_context()?;
        self.clusters
            .as_ref()?
            .iter()
            .find(|cluster| cluster.name == context.context.cluster)
            .map(|named| &named.cluster)
    }

    #[must_use]
    pub fn current_user(&self) -> Option<&User> {
        let context = self.current_context()?;
        let user = context.context.user.as_deref()?;
        self.users
            .as_ref()?
            .iter()
            .find(|named| named.name == user)
            .map(|named| &named.user)
    }

    /// Resolve a file reference relative to the kubeconfig's directory.
    #[must_use]
    pub fn resolve_path(&self, path: &Path) -> PathBuf {
        match &self.base_dir {
            Some(base) if path.is_relative() => base.join(path),
            _ => path.to_path_buf(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use indoc::indoc;

    const CONFIG: &str = indoc! {"
        apiVersion: v1
        kind: Config
        current-context: dev
        clusters:
        - name: dev-cluster
          cluster:
            server: https://127.0.0.1:6443
            insecure-skip-tls-verify: true
        - name: prod-cluster
          cluster:
            server: https://prod.example.com
            certificate-authority: certs/ca.crt
        contexts:
        - name: dev
          context:
            cluster: dev-cluster
            user: dev-user
            namespace: team
        - name: prod
          context:
            cluster: prod-cluster
        users:
        - name: dev-user
          user:
            token: abc
    "};

    #[test]
    fn current_context_selects_cluster_and_user() {
        let config = Kubeconfig::from_yaml(CONFIG).expect("parse");
        let cluster = config.current_cluster().expect("cluster");
        assert_eq!(cluster.server, "https://127.0.0.1:6443");
        assert!(cluster.insecure_skip_tls_verify);
        assert_eq!(
            config.current_user().and_then(|u| u.token.as_deref()),
            Some("abc")
        );
        assert_eq!(
            config
                .current_context()
                .and_then(|c| c.context.namespace.as_deref()),
            Some("team")
        );
    }

    #[test]
    fn missing_current_context_has_no_cluster() {
        let mut config = Kubeconfig::from_yaml(CONFIG).expect("parse");
        config.current_context = None;
        assert!(config.current_cluster().is_none());

        config.current_context = Some("unknown".to_string());
        assert!(config.current_cluster().is_none());

        let empty = Kubeconfig::from_yaml("apiVersion: v1\nkind: Config\nusers: null\n")
            .expect("parse");
        assert!(empty.current_cluster().is_none());
    }

    #[test]
    fn relative_files_resolve_against_the_config_directory() {
        let mut config = Kubeconfig::from_yaml(CONFIG).expect("parse");
        config.base_dir = Some(PathBuf::from("/home/user/.kube"));
        assert_eq!(
            config.resolve_path(Path::new("certs/ca.crt")),
            PathBuf::from("/home/user/.kube/certs/ca.crt")
        );
        assert_eq!(
            config.resolve_path(Path::new("/etc/ca.crt")),
            PathBuf::from("/etc/ca.crt")
        );
    }
}
