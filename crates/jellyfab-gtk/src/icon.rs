use freedesktop_icons::lookup;
use gdk_pixbuf::Pixbuf;
use jellyfab::IconRef;
use std::collections::HashMap;
use std::path::{Path, PathBuf};

pub const ICON_SIZE: i32 = 128;

pub fn find_icon_path(icon: &IconRef) -> Option<PathBuf> {
    if icon.is_empty() {
        return None;
    }

    let path = Path::new(icon.as_str());
    if path.is_absolute() && path.exists() {
        return Some(path.to_path_buf());
    }

    lookup(icon.as_str()).with_size(128).with_scale(1).find()
}

fn load_icon(icon: &IconRef) -> Option<Pixbuf> {
    let path = find_icon_path(icon)?;
    match Pixbuf::from_file_at_scale(&path, ICON_SIZE, ICON_SIZE, true) {
        Ok(pixbuf) => Some(pixbuf),
        Err(e) => {
            log::warn!("Failed to load icon {}: {}", path.display(), e);
            None
        }
    }
}

/// Pixbufs for the menu items, `None` where the icon could not be found.
#[derive(Default)]
pub struct IconCache {
    icons: HashMap<IconRef, Option<Pixbuf>>,
}

impl IconCache {
    pub fn load<'a>(refs: impl IntoIterator<Item = &'a IconRef>) -> Self {
        let mut icons = HashMap::new();
        for icon in refs {
            icons
                .entry(icon.clone())
                .or_insert_with(|| load_icon(icon));
        }
        Self { icons }
    }

    pub fn get(&self, icon: &IconRef) -> Option<&Pixbuf> {
        self.icons.get(icon).and_then(Option::as_ref)
    }
}
