//! Turns filesystem notifications about the kubeconfig into [`KubeconfigEvent`]s.

use std::path::{Path, PathBuf};

use kreate::{KubeconfigEvent, KubeconfigEventKind};
use notify::{Event, EventKind, RecommendedWatcher, RecursiveMode, Watcher};

use crate::error::{CliError, CliResult};

/// The kubeconfig event carried by `event`, if it touches `kubeconfig`.
#[must_use]
pub fn classify(event: &Event, kubeconfig: &Path) -> Option<KubeconfigEvent> {
    let kind = match event.kind {
        EventKind::Create(_) => KubeconfigEventKind::Create,
        EventKind::Modify(_) => KubeconfigEventKind::Update,
        EventKind::Remove(_) => KubeconfigEventKind::Delete,
        _ => return None,
    };
    let file_name = kubeconfig.file_name()?;
    event
        .paths
        .iter()
        .any(|path| path.file_name() == Some(file_name))
        .then(|| KubeconfigEvent::new(kind, kubeconfig))
}

/// Watch the directory of `kubeconfig` and call `on_event` for changes of the file.
///
/// Renames that replace the file are seen as a create of the new name.
/// The returned watcher stops when dropped.
pub fn watch_kubeconfig<F>(kubeconfig: PathBuf, on_event: F) -> CliResult<RecommendedWatcher>
where
    F: Fn(KubeconfigEvent) + Send + 'static,
{
    let dir = kubeconfig
        .parent()
        .filter(|dir| !dir.as_os_str().is_empty())
        .map_or_else(|| PathBuf::from("."), Path::to_path_buf);

    let target = kubeconfig.clone();
    let handler = move |res: notify::Result<Event>| match res {
        Ok(event) => {
            if let Some(event) = classify(&event, &target) {
                tracing::debug!(kind = ?event.kind, path = %event.path.display(), "kubeconfig changed");
                on_event(event);
            }
        }
        Err(err) => tracing::warn!(?err, "kubeconfig watch error"),
    };

    let watch_err = |source| CliError::Watch {
        path: dir.clone(),
        source,
    };
    let mut watcher = notify::recommended_watcher(handler).map_err(watch_err)?;
    watcher
        .watch(&dir, RecursiveMode::NonRecursive)
        .map_err(watch_err)?;
    tracing::info!(path = %kubeconfig.display(), "watching kubeconfig");
    Ok(watcher)
}

#[cfg(test)]
mod tests {
    use super::*;
    use notify::event::{CreateKind, DataChange, ModifyKind, RemoveKind};

    fn event(kind: EventKind, path: &str) -> Event {
        Event::new(kind).add_path(PathBuf::from(path))
    }

    #[test]
    fn kubeconfig_changes_are_classified() {
        let config = Path::new("/home/user/.kube/config");
        let cases = [
            (EventKind::Create(CreateKind::File), KubeconfigEventKind::Create),
            (
                EventKind::Modify(ModifyKind::Data(DataChange::Content)),
                KubeconfigEventKind::Update,
            ),
            (EventKind::Remove(RemoveKind::File), KubeconfigEventKind::Delete),
        ];
        for (kind, expected) in cases {
            let classified = classify(&event(kind, "/home/user/.kube/config"), config);
            assert_eq!(classified, Some(KubeconfigEvent::new(expected, config)));
        }
    }

    #[test]
    fn unrelated_events_are_ignored() {
        let config = Path::new("/home/user/.kube/config");
        let other = event(EventKind::Create(CreateKind::File), "/home/user/.kube/cache");
        assert_eq!(classify(&other, config), None);
        let access = event(
            EventKind::Access(notify::event::AccessKind::Any),
            "/home/user/.kube/config",
        );
        assert_eq!(classify(&access, config), None);
    }
}
