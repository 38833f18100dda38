// src/save/name.rs
//! Default output names derived from a sheet's provenance.

use crate::model::{Sheet, SheetSource};
use crate::options::ExportOptions;

/// The name a save prompt offers for `sheet`.
///
/// Network origins keep their own name and suffix. Filesystem paths are
/// reused as-is unless the sheet explicitly overrides `save_filetype`, in
/// which case the extension is swapped. Everything else falls back to the
/// sheet's name plus its filetype (or the global default).
pub fn default_save_name(sheet: &Sheet, global: &ExportOptions) -> String {
    let resolved = sheet.options().resolve(global);
    match sheet.source() {
        SheetSource::NetworkOrigin { name, suffix } => format!("{}{}", name, suffix),
        SheetSource::FilesystemPath(path) => {
            if resolved.save_filetype_is_set() {
                path.with_extension(resolved.save_filetype())
                    .to_string_lossy()
                    .into_owned()
            } else {
                path.to_string_lossy().into_owned()
            }
        }
        SheetSource::Synthetic { name } => {
            format!("{}.{}", name, filetype_suffix(sheet, global))
        }
        SheetSource::Unset => {
            format!("{}.{}", sheet.name(), filetype_suffix(sheet, global))
        }
    }
}

fn filetype_suffix<'a>(sheet: &'a Sheet, global: &'a ExportOptions) -> &'a str {
    sheet.filetype().unwrap_or(&global.save_filetype)
}
