// filter.rs — Label filtering (`--only` / `--except`).

use sieve_config::RunOptions;

use crate::manifest::ManifestCommand;

/// Narrow `commands` to the ones a run should execute.
///
/// A non-empty `only` keeps commands whose label is listed; otherwise a
/// non-empty `except` drops them; otherwise everything runs. Order is kept.
pub fn apply_filter(commands: &[ManifestCommand], options: &RunOptions) -> Vec<ManifestCommand> {
    if !options.only.is_empty() {
        commands
            .iter()
            .filter(|c| options.only.contains(&c.label))
            .cloned()
            .collect()
    } else if !options.except.is_empty() {
        commands
            .iter()
            .filter(|c| !options.except.contains(&c.label))
            .cloned()
            .collect()
    } else {
        commands.to_vec()
    }
}
