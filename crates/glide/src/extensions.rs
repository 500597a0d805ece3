//! Extensions that can be named in `glide.toml`.

use glide_renderer::{Extension, Registry};
use glide_speaker::SpeakerNotes;

use crate::error::CliError;

/// Built-in extensions, by name.
static BUILTIN: &[&dyn Extension] = &[&SpeakerNotes];

/// Load the named extensions into `registry`, in order.
pub(crate) fn load(registry: &mut Registry, names: &[String]) -> Result<(), CliError> {
    for name in names {
        let name = name.trim();
        let extension = BUILTIN
            .iter()
            .find(|extension| extension.name() == name)
            .ok_or_else(|| CliError::UnknownExtension {
                name: name.to_owned(),
                available: BUILTIN
                    .iter()
                    .map(|extension| extension.name())
                    .collect::<Vec<_>>()
                    .join(", "),
            })?;
        let metadata = registry.setup_extension(*extension);
        tracing::debug!(extension = name, version = metadata.version, "Extension ready");
    }
    Ok(())
}
