//! Configuration lifecycle: load file config and merge CLI overrides.

use std::path::PathBuf;

use anyhow::Result;

use crate::app::config_runtime::{self, CliValueSources};
use crate::app_config::load_default_file_config;
use crate::cli::Args;

/// Effective settings for one run.
pub(crate) struct ResolvedConfig {
    pub(crate) args: Args,
    /// Config file that contributed values, if one was loaded.
    pub(crate) loaded_from: Option<PathBuf>,
}

/// Load file config and merge CLI overrides into one resolved bundle.
pub(crate) fn resolve_config(args: Args, cli_sources: &CliValueSources) -> Result<ResolvedConfig> {
    let loaded_config = load_default_file_config()?;
    let args =
        config_runtime::apply_config_defaults(args, cli_sources, loaded_config.config.as_ref())?;
    let loaded_from = loaded_config
        .config
        .is_some()
        .then_some(loaded_config.path)
        .flatten();
    Ok(ResolvedConfig { args, loaded_from })
}

#[cfg(test)]
mod tests {
    use super::resolve_config;
    use crate::app::config_runtime::CliValueSources;
    use crate::cli::Args;
    use clap::Parser;
    use tempfile::TempDir;

    /// Points XDG_CONFIG_HOME at a temp dir, first empty, then holding a
    /// config file. Kept as one test so no other test observes the env change.
    #[test]
    fn test_resolve_config_reads_xdg_config_file() {
        let temp = TempDir::new().unwrap();
        let prev = std::env::var_os("XDG_CONFIG_HOME");
        // SAFETY: test isolates env change and restores on drop.
        unsafe {
            std::env::set_var("XDG_CONFIG_HOME", temp.path());
        }
        let _restore = RestoreEnv::new("XDG_CONFIG_HOME", prev);

        let args = Args::try_parse_from(["media-export"]).unwrap();
        let resolved = resolve_config(args.clone(), &CliValueSources::default()).unwrap();
        assert_eq!(resolved.args.count, 10, "count should be default when no config");
        assert!(resolved.loaded_from.is_none());

        let config_dir = temp.path().join("media-export");
        std::fs::create_dir_all(&config_dir).unwrap();
        std::fs::write(config_dir.join("config.toml"), "count = 42\nconcurrency = 2\n").unwrap();

        let resolved = resolve_config(args.clone(), &CliValueSources::default()).unwrap();
        assert_eq!(resolved.args.count, 42);
        assert_eq!(resolved.args.concurrency, 2);
        assert_eq!(
            resolved.loaded_from.as_deref(),
            Some(config_dir.join("config.toml").as_path())
        );

        std::fs::write(config_dir.join("config.toml"), "count = 0\n").unwrap();
        assert!(
            resolve_config(args, &CliValueSources::default()).is_err(),
            "invalid config file must abort the run"
        );
    }

    /// Restores an env var to its previous value (or removes it) when dropped.
    struct RestoreEnv {
        key: &'static str,
        value: Option<std::ffi::OsString>,
    }
    impl RestoreEnv {
        fn new(key: &'static str, value: Option<std::ffi::OsString>) -> Self {
            Self { key, value }
        }
    }
    impl Drop for RestoreEnv {
        fn drop(&mut self) {
            // SAFETY: test restores env to prior state.
            match &self.value {
                Some(v) => unsafe { std::env::set_var(self.key, v) },
                None => unsafe { std::env::remove_var(self.key) },
            }
        }
    }
}
