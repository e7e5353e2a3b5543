use std::ffi::OsString;
use std::path::Path;
use std::sync::mpsc::{self, Receiver};

use anyhow::{Context, Result};
use notify::{Event, RecommendedWatcher, RecursiveMode, Watcher as NotifyWatcher};
use tracing::{debug, error, info};

fn touches_scene(event: &Event, file_name: &OsString) -> bool {
    (event.kind.is_modify() || event.kind.is_create())
        && event.paths.iter().any(|path| path.file_name() == Some(file_name.as_os_str()))
}

/// Watches the directory holding `scene` and signals on the returned
/// channel whenever the scene file is written or replaced.
pub fn start(scene: &Path) -> Result<(RecommendedWatcher, Receiver<()>)> {
    let file_name = scene
        .file_name()
        .with_context(|| format!("{} is not a file path", scene.display()))?
        .to_os_string();
    let directory = match scene.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };

    let (tx, rx) = mpsc::channel();
    let mut watcher = notify::recommended_watcher(move |res: notify::Result<Event>| match res {
        Ok(event) => {
            if touches_scene(&event, &file_name) && tx.send(()).is_err() {
                debug!("scene change dropped, runtime is shutting down");
            }
        }
        Err(e) => error!("Error watching scene file: {e:?}"),
    })?;

    // editors replace files on save, so watch the directory instead of the file
    watcher.watch(directory, RecursiveMode::NonRecursive)?;
    info!("Watching {} for changes", scene.display());
    Ok((watcher, rx))
}

#[cfg(test)]
mod tests {
    use super::*;
    use notify::event::{AccessKind, CreateKind, ModifyKind};
    use notify::EventKind;
    use std::path::PathBuf;

    #[test]
    fn only_writes_to_the_scene_count() {
        let name = OsString::from("drop.json");
        let write = Event::new(EventKind::Modify(ModifyKind::Any)).add_path(PathBuf::from("scenes/drop.json"));
        let create = Event::new(EventKind::Create(CreateKind::File)).add_path(PathBuf::from("drop.json"));
        let other = Event::new(EventKind::Modify(ModifyKind::Any)).add_path(PathBuf::from("scenes/stack.json"));
        let read = Event::new(EventKind::Access(AccessKind::Any)).add_path(PathBuf::from("scenes/drop.json"));

        assert!(touches_scene(&write, &name));
        assert!(touches_scene(&create, &name));
        assert!(!touches_scene(&other, &name));
        assert!(!touches_scene(&read, &name));
    }
}
