// workdir.rs — Where a command runs.
//
// Most tools run from the sandbox root, where the shared lint configs were
// copied. A few (`rspec`, `kitchen` by default) only work from inside the
// package, so any command that mentions one of them runs from
// `<sandbox>/<package>` instead.

use std::path::PathBuf;

use sieve_config::SieveConfig;
use sieve_sandbox::Package;

/// Whether `command` mentions any of the package-scoped tools.
pub fn is_package_scoped(command: &str, scoped: &[String]) -> bool {
    scoped
        .iter()
        .any(|tool| !tool.is_empty() && command.contains(tool.as_str()))
}

/// Working directory for `command` run against `package`.
pub fn working_dir_for(command: &str, package: &Package, config: &SieveConfig) -> PathBuf {
    if is_package_scoped(command, &config.package_scoped_commands) {
        tracing::debug!(command, "running from inside the package");
        config.sandbox_root.join(&package.name)
    } else {
        tracing::debug!(command, "running from the sandbox root");
        config.sandbox_root.clone()
    }
}
