//! Scratch theme trees shared by the unit and behavioural suites.

use std::path::{Path, PathBuf};

use cap_std::ambient_authority;
use cap_std::fs::Dir;
use rstest::fixture;
use tempfile::TempDir;

/// A temporary `site/` tree with a theme root, a sibling directory sharing
/// the root's name prefix, and a secret file above both.
pub(crate) struct ThemeTree {
    temp_dir: TempDir,
    theme: Dir,
}

impl ThemeTree {
    pub(crate) fn new() -> Self {
        let temp_dir = TempDir::new().expect("create temp dir");
        let site = Dir::open_ambient_dir(temp_dir.path(), ambient_authority()).expect("open site");
        site.create_dir_all("site/theme/css").expect("create theme");
        site.create_dir_all("site/theme-evil").expect("create sibling");
        site.write("secret.txt", "top secret").expect("write secret");
        site.write("site/theme-evil/style.css", "evil{}").expect("write sibling file");
        let theme = site.open_dir("site/theme").expect("open theme");
        Self { temp_dir, theme }
    }

    /// Configured root directory.
    pub(crate) fn root(&self) -> PathBuf {
        self.temp_dir.path().join("site/theme")
    }

    /// Absolute path of the scratch directory holding `site/`.
    pub(crate) fn base(&self) -> &Path {
        self.temp_dir.path()
    }

    /// Writes a file beneath the theme root.
    pub(crate) fn write(&self, relative: &str, content: &str) {
        self.theme.write(relative, content).expect("write theme file");
    }

    /// Reads a file beneath the theme root.
    pub(crate) fn read(&self, relative: &str) -> String {
        self.theme.read_to_string(relative).expect("read theme file")
    }

    /// Whether the tests run as the superuser, whom permission bits do not
    /// bind. The scratch directory is created by the current user.
    #[cfg(unix)]
    pub(crate) fn created_by_root(&self) -> bool {
        use std::os::unix::fs::MetadataExt;

        std::fs::metadata(self.base())
            .expect("stat scratch directory")
            .uid()
            == 0
    }
}

#[fixture]
pub(crate) fn tree() -> ThemeTree {
    let tree = ThemeTree::new();
    tree.write("style.css", "body{}");
    tree
}
