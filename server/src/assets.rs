//! Static file lookup for browser pages

use crate::config::AssetConfig;
use std::path::{Component, Path, PathBuf};

/// Maps a request path to a file on disk.
///
/// Returning a path does not promise the file exists; the transport answers
/// 404 when it cannot be read.
pub trait AssetStore: Send + Sync + 'static {
    fn resolve(&self, request_path: &str) -> Option<PathBuf>;
}

/// Serves the simulator pages and a root directory from the local filesystem.
#[derive(Debug, Clone, Default)]
pub struct FsAssetStore {
    simulator_page: Option<PathBuf>,
    master_page: Option<PathBuf>,
    normal_page: Option<PathBuf>,
    root_dir: Option<PathBuf>,
}

impl FsAssetStore {
    pub fn new(config: &AssetConfig) -> Self {
        let root_dir = config.root_dir.clone().or_else(|| {
            config
                .master_page
                .as_deref()
                .and_then(Path::parent)
                .map(Path::to_path_buf)
        });

        Self {
            simulator_page: config.simulator_page.clone(),
            master_page: config.master_page.clone(),
            normal_page: config.normal_page.clone(),
            root_dir,
        }
    }
}

impl AssetStore for FsAssetStore {
    fn resolve(&self, request_path: &str) -> Option<PathBuf> {
        match request_path {
            "/" | "/index.html" => self.simulator_page.clone(),
            "/master" => self.master_page.clone(),
            "/normal" => self.normal_page.clone(),
            other => {
                let root = self.root_dir.as_ref()?;
                let relative = Path::new(other.trim_start_matches('/'));
                // Only plain names below the root.
                if relative
                    .components()
                    .all(|c| matches!(c, Component::Normal(_)))
                {
                    Some(root.join(relative))
                } else {
                    None
                }
            }
        }
    }
}

pub fn content_type(path: &Path) -> &'static str {
    let name = path
        .file_name()
        .and_then(|name| name.to_str())
        .unwrap_or_default()
        .to_ascii_lowercase();

    if name.ends_with(".html") || name.ends_with(".html.txt") || name.ends_with(".htm") {
        "text/html"
    } else if name.ends_with(".css") {
        "text/css"
    } else if name.ends_with(".js") {
        "text/javascript"
    } else {
        "application/octet-stream"
    }
}
