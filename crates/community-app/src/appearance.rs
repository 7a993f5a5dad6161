use std::sync::Mutex;

use tracing::{info, warn};

use community_view::Effect;
use community_view::theme::Theme;

use crate::lock;
use crate::page::PageHandle;
use crate::state_file::StateFile;

/// Current theme, persisted on every change.
pub struct Appearance {
    store: StateFile,
    theme: Mutex<Theme>,
    page: PageHandle,
}

impl Appearance {
    /// Restore the stored theme and apply it to the page.
    pub fn restore(store: StateFile, page: PageHandle) -> Self {
        let theme = store.load_theme();
        page.apply([Effect::SetTheme(theme)]);
        Self { store, theme: Mutex::new(theme), page }
    }

    pub fn theme(&self) -> Theme {
        *lock(&self.theme)
    }

    pub fn toggle(&self) -> Theme {
        let next = {
            let mut theme = lock(&self.theme);
            *theme = theme.toggled();
            *theme
        };
        if let Err(e) = self.store.save_theme(next) {
            warn!("Failed to persist theme: {e:#}");
        }
        self.page.apply([Effect::SetTheme(next)]);
        info!(theme = %next, "theme changed");
        next
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::page::Page;

    #[test]
    fn toggle_persists_and_applies() {
        let dir = tempfile::tempdir().unwrap();
        let page = PageHandle::new(Page::default());
        let appearance = Appearance::restore(StateFile::in_dir(dir.path()), page.clone());
        assert_eq!(appearance.theme(), Theme::Dark);

        assert_eq!(appearance.toggle(), Theme::Light);
        assert_eq!(page.read(|p| p.theme()), Theme::Light);

        let again = Appearance::restore(StateFile::in_dir(dir.path()), page.clone());
        assert_eq!(again.theme(), Theme::Light);
    }
}
